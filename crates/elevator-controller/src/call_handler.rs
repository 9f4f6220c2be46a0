//! Handles a single `CALL <src> <dst>` connection from a call pad (spec
//! §4.E "Call admission", §6 call-pad reply contract).

use tokio::io::{AsyncRead, AsyncWrite};

use elevator_core::wire::send;
use elevator_core::{ElevatorError, Floor, Message};

use crate::queue::Stop;
use crate::registry::Registry;

/// Looks up a serviceable car, enqueues the two stops, and replies with
/// either `CAR <name>` or `UNAVAILABLE`. The connection is single-shot:
/// callers close it right after this returns (spec supplementary
/// behavior, grounded on `original_source/call.c`).
pub async fn handle_call<S: AsyncRead + AsyncWrite + Unpin>(
    registry: &Registry,
    src: Floor,
    dst: Floor,
    stream: &mut S,
) -> Result<(), ElevatorError> {
    let Some(direction) = src.direction_to(dst) else {
        return send(stream, &Message::Unavailable.to_string()).await;
    };

    match registry.select(src, dst).await {
        Some(car) => {
            {
                let mut queue = car.queue.lock().await;
                queue.insert(Stop { direction, floor: src });
                queue.insert(Stop { direction, floor: dst });
            }
            car.notify.notify_one();
            send(stream, &Message::CarReply { name: car.descriptor.name.clone() }.to_string()).await
        }
        None => send(stream, &Message::Unavailable.to_string()).await,
    }
}

#[cfg(test)]
#[path = "call_handler_tests.rs"]
mod tests;
