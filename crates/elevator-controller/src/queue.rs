//! The per-car SCAN stop queue (spec §3 "Controller call queue", §4.E
//! "Queue insertion (SCAN)"; grounded on the insertion/dedup logic in
//! `original_source/controller.c::add_call_request`, generalized from its
//! hand-rolled linked list to a run-searching `Vec`).

use elevator_core::{Direction, Floor};

/// One stop the car still owes a visit, tagged with the travel direction
/// of the call that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stop {
    pub direction: Direction,
    pub floor: Floor,
}

/// An ordered sequence of stops decomposed into at most three contiguous
/// runs (U-asc, D-desc, U-asc) — the classical SCAN schedule with one
/// direction reversal (spec §3, P5).
#[derive(Debug, Default, Clone)]
pub struct CallQueue {
    stops: Vec<Stop>,
}

impl CallQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn peek(&self) -> Option<Stop> {
        self.stops.first().copied()
    }

    /// Removes the head, if any. Callers pop only after successfully
    /// sending the `FLOOR` frame for it (spec §4.E dispatch rule).
    pub fn pop_front(&mut self) -> Option<Stop> {
        if self.stops.is_empty() {
            None
        } else {
            Some(self.stops.remove(0))
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn as_slice(&self) -> &[Stop] {
        &self.stops
    }

    /// Inserts `stop` maintaining the run structure, coalescing exact
    /// `(direction, floor)` duplicates. Finds the last (rightmost) run
    /// whose direction matches and splices `stop` into its sorted
    /// position; if no run matches, a new one-stop run is appended at the
    /// tail.
    pub fn insert(&mut self, stop: Stop) {
        if self.stops.contains(&stop) {
            return;
        }
        if let Some((start, end)) = self.last_run_with_direction(stop.direction) {
            let slice = &self.stops[start..end];
            let offset = match stop.direction {
                Direction::Up => slice.partition_point(|s| s.floor.axis() < stop.floor.axis()),
                Direction::Down => slice.partition_point(|s| s.floor.axis() > stop.floor.axis()),
            };
            self.stops.insert(start + offset, stop);
        } else {
            self.stops.push(stop);
        }
    }

    /// The contiguous runs currently in the queue, as `(start, end,
    /// direction)` half-open index ranges — exposed for tests asserting
    /// P5 (at most three runs).
    pub fn runs(&self) -> Vec<(usize, usize, Direction)> {
        let mut runs = Vec::new();
        let mut i = 0;
        while i < self.stops.len() {
            let dir = self.stops[i].direction;
            let mut j = i + 1;
            while j < self.stops.len() && self.stops[j].direction == dir {
                j += 1;
            }
            runs.push((i, j, dir));
            i = j;
        }
        runs
    }

    fn last_run_with_direction(&self, direction: Direction) -> Option<(usize, usize)> {
        self.runs()
            .into_iter()
            .rev()
            .find(|&(_, _, d)| d == direction)
            .map(|(start, end, _)| (start, end))
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
