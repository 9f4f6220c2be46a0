//! Floor identifiers and the axis they live on (spec §3, §4.C, GLOSSARY).

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::ElevatorError;

/// A validated floor token: `B1`..`B99` (basement) or `1`..`999` (surface).
///
/// Ordering follows the floor axis directly: basements sort below every
/// surface floor, and within basements a higher number is lower
/// (`B2 < B1`). There is no floor `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Floor {
    Basement(u16),
    Surface(u16),
}

impl Floor {
    /// Signed position on the floor axis: `B1 = -1`, `B2 = -2`, …,
    /// `1 = +1`, `2 = +2`, …
    pub fn axis(self) -> i32 {
        match self {
            Floor::Basement(n) => -(n as i32),
            Floor::Surface(n) => n as i32,
        }
    }

    /// Reconstruct a `Floor` from an axis value. `axis` must be nonzero and
    /// within `[-99, 999]`; callers that only ever derive axis values via
    /// [`Floor::axis`] or [`Floor::step_toward`] satisfy this by
    /// construction.
    pub fn from_axis(axis: i32) -> Option<Floor> {
        match axis.cmp(&0) {
            Ordering::Less if axis >= -99 => Some(Floor::Basement((-axis) as u16)),
            Ordering::Greater if axis <= 999 => Some(Floor::Surface(axis as u16)),
            _ => None,
        }
    }

    /// The call direction (`U`/`D`) implied by traveling from `self` to
    /// `dest`, or `None` if they're the same floor.
    pub fn direction_to(self, dest: Floor) -> Option<Direction> {
        match self.axis().cmp(&dest.axis()) {
            Ordering::Less => Some(Direction::Up),
            Ordering::Greater => Some(Direction::Down),
            Ordering::Equal => None,
        }
    }

    /// One axis step from `self` toward `dest`, skipping the invalid `0`
    /// (so the up-neighbor of `B1` is `1`, and the down-neighbor of `1` is
    /// `B1`). Returns `self` unchanged if already at `dest`.
    pub fn step_toward(self, dest: Floor) -> Floor {
        let Some(dir) = self.direction_to(dest) else { return self };
        let mut next = self.axis() + dir.sign();
        if next == 0 {
            next += dir.sign();
        }
        Floor::from_axis(next).unwrap_or(self)
    }

    /// Whether `self` lies within `[lo, hi]` on the floor axis.
    pub fn within(self, lo: Floor, hi: Floor) -> bool {
        lo.axis() <= self.axis() && self.axis() <= hi.axis()
    }
}

impl PartialOrd for Floor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Floor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.axis().cmp(&other.axis())
    }
}

impl fmt::Display for Floor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Floor::Basement(n) => write!(f, "B{n}"),
            Floor::Surface(n) => write!(f, "{n}"),
        }
    }
}

impl FromStr for Floor {
    type Err = ElevatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_floor(s).ok_or_else(|| ElevatorError::Validation(format!("Invalid floor: {s}")))
    }
}

fn parse_floor(s: &str) -> Option<Floor> {
    if s.len() > 3 || s.is_empty() {
        return None;
    }
    if let Some(digits) = s.strip_prefix('B') {
        let n = parse_digits(digits, 2)?;
        (1..=99).contains(&n).then_some(Floor::Basement(n))
    } else {
        let n = parse_digits(s, 3)?;
        (1..=999).contains(&n).then_some(Floor::Surface(n))
    }
}

/// Parses `digits` as a no-leading-zero, length-bounded decimal run.
fn parse_digits(digits: &str, max_len: usize) -> Option<u16> {
    if digits.is_empty() || digits.len() > max_len {
        return None;
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if digits.as_bytes()[0] == b'0' {
        return None;
    }
    digits.parse().ok()
}

/// Travel direction of a call or a SCAN queue run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    fn sign(self) -> i32 {
        match self {
            Direction::Up => 1,
            Direction::Down => -1,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Up => "U",
            Direction::Down => "D",
        })
    }
}

#[cfg(test)]
#[path = "floor_tests.rs"]
mod tests;
