// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The dispatch controller: accepts car and call-pad connections on
//! `:3000`, maintains the car registry, and runs each car's status/
//! dispatch worker (spec §4.E).

pub mod call_handler;
pub mod config;
pub mod dispatch;
pub mod queue;
pub mod registry;

use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use elevator_core::wire::recv;
use elevator_core::{config as core_config, ElevatorError, Floor, Message};

use registry::{CarDescriptor, CarEntry, CarMirror, Registry};

/// Runs the controller until `shutdown` is cancelled.
pub async fn run(shutdown: CancellationToken) -> anyhow::Result<()> {
    let registry = Arc::new(Registry::new());
    let listener = TcpListener::bind(core_config::CONTROLLER_BIND_ADDR).await?;
    info!(addr = core_config::CONTROLLER_BIND_ADDR, "controller listening");

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                info!("controller shutting down");
                break;
            }
            accepted = listener.accept() => {
                let (stream, peer) = accepted?;
                let registry = Arc::clone(&registry);
                let child_shutdown = shutdown.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(registry, stream, child_shutdown).await {
                        warn!(%peer, error = %e, "connection handler failed");
                    }
                });
            }
        }
    }
    Ok(())
}

/// Reads the opening frame and routes to either the car-registration path
/// or the single-shot call-pad path (spec §4.A framing, §4.E admission).
async fn handle_connection(
    registry: Arc<Registry>,
    mut stream: TcpStream,
    shutdown: CancellationToken,
) -> Result<(), ElevatorError> {
    let Some(text) = recv(&mut stream).await? else {
        return Ok(());
    };
    match text.parse::<Message>()? {
        Message::CarGreeting { name, lowest, highest } => {
            register_car(registry, name, lowest, highest, stream, shutdown).await
        }
        Message::Call { src, dst } => call_handler::handle_call(&registry, src, dst, &mut stream).await,
        other => Err(ElevatorError::Protocol(format!("unexpected opening frame: {other:?}"))),
    }
}

async fn register_car(
    registry: Arc<Registry>,
    name: String,
    lowest: Floor,
    highest: Floor,
    mut stream: TcpStream,
    shutdown: CancellationToken,
) -> Result<(), ElevatorError> {
    let Some(text) = recv(&mut stream).await? else {
        return Ok(());
    };
    let Message::Status { status, current, destination } = text.parse::<Message>()? else {
        return Err(ElevatorError::Protocol("expected initial STATUS after CAR greeting".into()));
    };

    info!(car = %name, lowest = %lowest, highest = %highest, "car connected");
    let entry = Arc::new(CarEntry {
        descriptor: CarDescriptor { name: name.clone(), lowest, highest },
        mirror: tokio::sync::RwLock::new(CarMirror {
            current_floor: current,
            destination_floor: destination,
            status,
        }),
        queue: tokio::sync::Mutex::new(queue::CallQueue::new()),
        notify: tokio::sync::Notify::new(),
    });
    registry.register(Arc::clone(&entry)).await;

    // A child token, not a clone: the worker cancels itself on disconnect
    // (dispatch.rs's `status_checker`), and that must never reach back up
    // to the root token the accept loop in `run` selects on (spec §7: the
    // controller never exits on a per-connection failure).
    dispatch::run_car_worker(registry, entry, shutdown.child_token(), stream).await;
    Ok(())
}
