//! The per-car worker: a status-checker subtask that keeps the registry
//! mirror current, and a dispatcher subtask that sends `FLOOR` frames when
//! the car is ready (spec §4.E "Connection lifecycle", "Dispatch rule").

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use elevator_core::wire::{recv, send};
use elevator_core::Message;

use crate::registry::{CarEntry, Registry};

/// How long the dispatcher sleeps between idle checks when not woken by a
/// mirror/queue change — the spec leaves the exact cadence unspecified
/// (§5 "per-car dispatcher short sleep (or condvar on registry change)").
const DISPATCH_POLL: Duration = Duration::from_millis(25);

/// Runs the status-checker and dispatcher for one connected car until the
/// car declares `EMERGENCY`/`INDIVIDUAL SERVICE` or its connection closes.
pub async fn run_car_worker<S>(
    registry: Arc<Registry>,
    entry: Arc<CarEntry>,
    shutdown: CancellationToken,
    stream: S,
) where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let (reader, writer) = tokio::io::split(stream);
    let checker = status_checker(registry, Arc::clone(&entry), shutdown.clone(), reader);
    let dispatcher = dispatcher(entry, shutdown, writer);
    tokio::join!(checker, dispatcher);
}

async fn status_checker<R: AsyncRead + Unpin>(
    registry: Arc<Registry>,
    entry: Arc<CarEntry>,
    shutdown: CancellationToken,
    mut reader: R,
) {
    let name = entry.descriptor.name.clone();
    loop {
        let frame = tokio::select! {
            _ = shutdown.cancelled() => break,
            frame = recv(&mut reader) => frame,
        };
        match frame {
            Ok(Some(text)) => match text.parse::<Message>() {
                Ok(Message::Status { status, current, destination }) => {
                    let mut mirror = entry.mirror.write().await;
                    mirror.current_floor = current;
                    mirror.destination_floor = destination;
                    mirror.status = status;
                    drop(mirror);
                    entry.notify.notify_one();
                }
                Ok(Message::Emergency) => {
                    info!(car = %name, "car declared emergency, removing from dispatch grid");
                    break;
                }
                Ok(Message::IndividualService) => {
                    info!(car = %name, "car entered individual service, removing from dispatch grid");
                    break;
                }
                Ok(other) => {
                    warn!(car = %name, ?other, "unexpected message from car");
                }
                Err(e) => {
                    warn!(car = %name, error = %e, "malformed message from car, closing connection");
                    break;
                }
            },
            Ok(None) => {
                info!(car = %name, "car connection closed");
                break;
            }
            Err(e) => {
                warn!(car = %name, error = %e, "error reading from car");
                break;
            }
        }
    }
    registry.remove(&name).await;
    shutdown.cancel();
    entry.notify.notify_one();
}

async fn dispatcher<W: AsyncWrite + Unpin>(
    entry: Arc<CarEntry>,
    shutdown: CancellationToken,
    mut writer: W,
) {
    loop {
        let ready_stop = {
            let mirror = entry.mirror.read().await;
            if mirror.ready_for_dispatch() {
                entry.queue.lock().await.peek()
            } else {
                None
            }
        };

        if let Some(stop) = ready_stop {
            let text = Message::Floor(stop.floor).to_string();
            if send(&mut writer, &text).await.is_ok() {
                entry.queue.lock().await.pop_front();
            } else {
                break;
            }
        }

        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = entry.notify.notified() => {}
            _ = tokio::time::sleep(DISPATCH_POLL) => {}
        }
    }
    let _ = writer.shutdown().await;
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
