// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The call pad: validates the request locally, then opens exactly one
//! connection to the controller and prints exactly one reply (spec §6,
//! §8 scenarios 2-4).

pub mod config;

use tokio::net::{TcpStream, ToSocketAddrs};

use elevator_core::config::CONTROLLER_CONNECT_ADDR;
use elevator_core::wire::{recv, send};
use elevator_core::{ElevatorError, Message};

use config::Config;

pub async fn run(config: Config) -> Result<String, ElevatorError> {
    call(config, CONTROLLER_CONNECT_ADDR).await
}

/// Does the actual validate-connect-send-reply work against `addr`,
/// parameterized so tests can point it at an ephemeral listener instead
/// of the fixed controller port.
async fn call(config: Config, addr: impl ToSocketAddrs) -> Result<String, ElevatorError> {
    if config.src.direction_to(config.dst).is_none() {
        return Err(ElevatorError::Validation("You are already on that floor!".into()));
    }

    let mut stream = TcpStream::connect(addr).await.map_err(ElevatorError::Connect)?;

    send(&mut stream, &Message::Call { src: config.src, dst: config.dst }.to_string()).await?;

    let reply = recv(&mut stream)
        .await?
        .ok_or_else(|| ElevatorError::Protocol("controller closed the connection".into()))?;

    match reply.parse::<Message>() {
        Ok(Message::CarReply { name }) => Ok(format!("Car {name} is arriving.")),
        // Not an ElevatorError::Protocol: §8 scenario 2 still wants this exact
        // message on stdout, just with the non-zero exit a failed call needs.
        Ok(Message::Unavailable) => {
            Err(ElevatorError::Validation("Sorry, no car is available to take this request.".into()))
        }
        _ => Ok(format!("Unexpected response: {reply}")),
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
