//! The framed, length-prefixed text protocol shared by every binary
//! (spec §4.A, §4.D, §6).
//!
//! A frame is `[u32 big-endian length][length bytes of ASCII text]`. This
//! module owns both halves: the byte-level framing ([`send`]/[`recv`]) and
//! the message grammar ([`Message`]).

use std::fmt;
use std::str::FromStr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::error::ElevatorError;
use crate::floor::Floor;

/// Frames larger than this are rejected as malformed rather than trusted —
/// the grammar never produces anything close to this size.
const MAX_FRAME_LEN: u32 = 256;

/// Writes one length-prefixed frame. Loops on partial writes; the caller
/// decides whether a write error is fatal (cars ignore it per §7's
/// broken-pipe rule, the controller treats it as a peer close).
pub async fn send<W: AsyncWriteExt + Unpin>(w: &mut W, text: &str) -> Result<(), ElevatorError> {
    let bytes = text.as_bytes();
    let len = u32::try_from(bytes.len()).map_err(|_| {
        ElevatorError::Protocol(format!("message too long: {} bytes", bytes.len()))
    })?;
    w.write_all(&len.to_be_bytes()).await?;
    w.write_all(bytes).await?;
    w.flush().await?;
    Ok(())
}

/// Reads one length-prefixed frame. Returns `Ok(None)` on a clean peer
/// close (zero bytes read for the length prefix); any other I/O failure,
/// or a length prefix exceeding [`MAX_FRAME_LEN`], is a [`ElevatorError`].
pub async fn recv<R: AsyncReadExt + Unpin>(r: &mut R) -> Result<Option<String>, ElevatorError> {
    let mut len_buf = [0u8; 4];
    match r.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }
    let len = u32::from_be_bytes(len_buf);
    if len > MAX_FRAME_LEN {
        return Err(ElevatorError::Protocol(format!("frame too large: {len} bytes")));
    }
    let mut buf = vec![0u8; len as usize];
    r.read_exact(&mut buf).await?;
    String::from_utf8(buf)
        .map(Some)
        .map_err(|e| ElevatorError::Protocol(format!("non-UTF-8 frame: {e}")))
}

/// The car door/status token (spec §3, §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarStatus {
    Opening,
    Open,
    Closing,
    Closed,
    Between,
}

impl fmt::Display for CarStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CarStatus::Opening => "Opening",
            CarStatus::Open => "Open",
            CarStatus::Closing => "Closing",
            CarStatus::Closed => "Closed",
            CarStatus::Between => "Between",
        })
    }
}

impl FromStr for CarStatus {
    type Err = ElevatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Opening" => Ok(CarStatus::Opening),
            "Open" => Ok(CarStatus::Open),
            "Closing" => Ok(CarStatus::Closing),
            "Closed" => Ok(CarStatus::Closed),
            "Between" => Ok(CarStatus::Between),
            other => Err(ElevatorError::Protocol(format!("unknown status: {other}"))),
        }
    }
}

/// Every message shape in the wire grammar (spec §6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// `CAR <name> <lo> <hi>` — car → controller greeting.
    CarGreeting { name: String, lowest: Floor, highest: Floor },
    /// `STATUS <status> <cur> <dst>` — car → controller.
    Status { status: CarStatus, current: Floor, destination: Floor },
    /// `CALL <src> <dst>` — call-pad → controller.
    Call { src: Floor, dst: Floor },
    /// `FLOOR <f>` — controller → car dispatch.
    Floor(Floor),
    /// `CAR <name>` — controller → call-pad reply (car assigned).
    CarReply { name: String },
    /// `UNAVAILABLE` — controller → call-pad reply (no car available).
    Unavailable,
    /// `EMERGENCY` — car → controller terminal notification.
    Emergency,
    /// `INDIVIDUAL SERVICE` — car → controller terminal notification.
    IndividualService,
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::CarGreeting { name, lowest, highest } => {
                write!(f, "CAR {name} {lowest} {highest}")
            }
            Message::Status { status, current, destination } => {
                write!(f, "STATUS {status} {current} {destination}")
            }
            Message::Call { src, dst } => write!(f, "CALL {src} {dst}"),
            Message::Floor(floor) => write!(f, "FLOOR {floor}"),
            Message::CarReply { name } => write!(f, "CAR {name}"),
            Message::Unavailable => f.write_str("UNAVAILABLE"),
            Message::Emergency => f.write_str("EMERGENCY"),
            Message::IndividualService => f.write_str("INDIVIDUAL SERVICE"),
        }
    }
}

impl FromStr for Message {
    type Err = ElevatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = s.split(' ').filter(|t| !t.is_empty()).collect();
        let bad = || ElevatorError::Protocol(format!("malformed message: {s:?}"));
        match tokens.as_slice() {
            ["CAR", name, lo, hi] => Ok(Message::CarGreeting {
                name: (*name).to_owned(),
                lowest: lo.parse()?,
                highest: hi.parse()?,
            }),
            ["CAR", name] => Ok(Message::CarReply { name: (*name).to_owned() }),
            ["STATUS", status, cur, dst] => Ok(Message::Status {
                status: status.parse()?,
                current: cur.parse()?,
                destination: dst.parse()?,
            }),
            ["CALL", src, dst] => Ok(Message::Call { src: src.parse()?, dst: dst.parse()? }),
            ["FLOOR", f] => Ok(Message::Floor(f.parse()?)),
            ["UNAVAILABLE"] => Ok(Message::Unavailable),
            ["EMERGENCY"] => Ok(Message::Emergency),
            ["INDIVIDUAL", "SERVICE"] => Ok(Message::IndividualService),
            _ => Err(bad()),
        }
    }
}

#[cfg(test)]
#[path = "wire_tests.rs"]
mod tests;
