//! The controller connection sub-loop (spec §4.C "Controller connection
//! sub-loop", §4.D wire grammar, §7 error handling: broken pipe and
//! protocol errors never kill the car).

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::io::{AsyncWriteExt, ReadHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use elevator_core::config::CONTROLLER_CONNECT_ADDR;
use elevator_core::shm::{CarFields, CarRegion};
use elevator_core::wire::{recv, send};
use elevator_core::{CarStatus, ElevatorError, Floor, Message};

enum PumpEvent {
    Status(CarFields),
    Emergency,
    IndividualService,
}

/// Connects to the controller with a fixed backoff, runs one session until
/// it ends, and reconnects — except after an emergency latch, which is
/// terminal for this car's controller link (spec §4.C "Emergency mode").
pub async fn run(
    region: Arc<CarRegion>,
    name: String,
    lowest: Floor,
    highest: Floor,
    delay: Duration,
    shutdown: CancellationToken,
) {
    loop {
        if shutdown.is_cancelled() {
            return;
        }
        match TcpStream::connect(CONTROLLER_CONNECT_ADDR).await {
            Ok(stream) => {
                if let Err(e) =
                    run_session(&region, &name, lowest, highest, delay, stream, shutdown.clone()).await
                {
                    warn!(car = %name, error = %e, "controller session ended");
                }
            }
            Err(e) => {
                warn!(car = %name, error = %e, "failed to connect to controller, retrying");
            }
        }

        if shutdown.is_cancelled() || region.snapshot().emergency_mode == 1 {
            return;
        }
        tokio::time::sleep(delay).await;
    }
}

async fn run_session(
    region: &Arc<CarRegion>,
    name: &str,
    lowest: Floor,
    highest: Floor,
    delay: Duration,
    stream: TcpStream,
    shutdown: CancellationToken,
) -> Result<(), ElevatorError> {
    let (mut reader, mut writer) = tokio::io::split(stream);

    send(&mut writer, &Message::CarGreeting { name: name.to_owned(), lowest, highest }.to_string()).await?;
    send_status(&mut writer, &region.snapshot()).await?;
    info!(car = %name, "connected to controller");

    let (tx, mut rx) = mpsc::channel::<PumpEvent>(8);
    let pump_region = Arc::clone(region);
    let pump_shutdown = shutdown.clone();
    let pump_delay = delay;
    tokio::task::spawn_blocking(move || status_pump(&pump_region, pump_delay, &pump_shutdown, tx));

    let writer_task = async move {
        while let Some(event) = rx.recv().await {
            match event {
                PumpEvent::Status(fields) => {
                    if send_status(&mut writer, &fields).await.is_err() {
                        break;
                    }
                }
                PumpEvent::Emergency => {
                    let _ = send(&mut writer, &Message::Emergency.to_string()).await;
                    break;
                }
                PumpEvent::IndividualService => {
                    let _ = send(&mut writer, &Message::IndividualService.to_string()).await;
                    break;
                }
            }
        }
        let _ = writer.shutdown().await;
    };

    let reader_region = Arc::clone(region);
    let dispatch_task = dispatch_reader(reader_region, reader);

    tokio::select! {
        _ = shutdown.cancelled() => {}
        _ = writer_task => {}
        _ = dispatch_task => {}
    }
    Ok(())
}

/// Reads `FLOOR` frames and applies the dispatch rule from the car's side
/// (spec §4.C "Dispatch reader"). Exits on any non-`FLOOR` message,
/// malformed frame, or peer close.
async fn dispatch_reader(region: Arc<CarRegion>, mut reader: ReadHalf<TcpStream>) {
    loop {
        match recv(&mut reader).await {
            Ok(Some(text)) => match text.parse::<Message>() {
                Ok(Message::Floor(f)) => apply_dispatch(&region, f),
                _ => return,
            },
            _ => return,
        }
    }
}

fn apply_dispatch(region: &CarRegion, target: Floor) {
    region.mutate(|fields| {
        let current: Floor = fields.current_floor.parse().unwrap_or(target);
        let status: CarStatus = fields.status.parse().unwrap_or(CarStatus::Closed);
        if current == target && status == CarStatus::Closed {
            fields.status = CarStatus::Opening.to_string();
        } else if status != CarStatus::Between {
            fields.destination_floor = target.to_string();
        }
        // status == Between: ignored, the dispatch rule never sends FLOOR
        // to a car mid-move (spec §4.E "Backpressure and deduplication").
    });
}

/// Blocking status pump: wakes on every shared-region broadcast (or the
/// heartbeat timeout) and reports status changes, or the one-time
/// terminal notification, through `tx`.
fn status_pump(region: &CarRegion, delay: Duration, shutdown: &CancellationToken, tx: mpsc::Sender<PumpEvent>) {
    let mut last_tuple: Option<(String, String, String)> = None;
    let mut last_sent = Instant::now();
    loop {
        if shutdown.is_cancelled() {
            return;
        }
        let fields = region.wait(Some(delay));

        if fields.emergency_mode == 1 {
            let _ = tx.blocking_send(PumpEvent::Emergency);
            return;
        }
        if fields.individual_service_mode == 1 {
            let _ = tx.blocking_send(PumpEvent::IndividualService);
            return;
        }

        let tuple = (fields.status.clone(), fields.current_floor.clone(), fields.destination_floor.clone());
        let heartbeat_elapsed = last_sent.elapsed() >= delay;
        if Some(&tuple) != last_tuple.as_ref() || heartbeat_elapsed {
            if tx.blocking_send(PumpEvent::Status(fields)).is_err() {
                return;
            }
            last_tuple = Some(tuple);
            last_sent = Instant::now();
        }
    }
}

async fn send_status<W: AsyncWriteExt + Unpin>(w: &mut W, fields: &CarFields) -> Result<(), ElevatorError> {
    let status: CarStatus = fields.status.parse()?;
    let current: Floor = fields.current_floor.parse()?;
    let destination: Floor = fields.destination_floor.parse()?;
    send(w, &Message::Status { status, current, destination }.to_string()).await
}

#[cfg(test)]
#[path = "link_tests.rs"]
mod tests;
