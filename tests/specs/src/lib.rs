// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test harness for end-to-end scenarios (spec §8): spawns the real
//! `controller`, `car`, `safety`, `internal`, and `call` binaries as
//! subprocesses and drives them the way an operator would.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output, Stdio};
use std::sync::atomic::{AtomicU32, Ordering::Relaxed};
use std::time::Duration;

use elevator_core::shm::CarRegion;
use elevator_core::Floor;

fn workspace_root() -> PathBuf {
    let manifest = Path::new(env!("CARGO_MANIFEST_DIR"));
    // tests/specs → tests → workspace root
    manifest.parent().and_then(|p| p.parent()).unwrap_or(manifest).to_path_buf()
}

fn binary(name: &str) -> PathBuf {
    workspace_root().join("target").join("debug").join(name)
}

static COUNTER: AtomicU32 = AtomicU32::new(0);

/// A car name unique to this test process, so concurrently running tests
/// never collide on the same `/car<name>` shared region.
pub fn unique_car_name(prefix: &str) -> String {
    format!("{prefix}{}_{}", std::process::id(), COUNTER.fetch_add(1, Relaxed))
}

/// A running `controller` process, killed on drop.
pub struct ControllerProcess {
    child: Child,
}

impl ControllerProcess {
    pub fn start() -> anyhow::Result<Self> {
        let child = Command::new(binary("controller"))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        // The controller binds :3000 immediately on startup; give it a
        // moment before any car or call pad tries to connect.
        std::thread::sleep(Duration::from_millis(150));
        Ok(Self { child })
    }
}

impl Drop for ControllerProcess {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// A running `car` process plus a read-only handle onto its shared
/// region, killed on drop.
pub struct CarProcess {
    child: Child,
    pub name: String,
    region: CarRegion,
}

impl CarProcess {
    pub fn start(name: &str, lowest: Floor, highest: Floor, delay_ms: u64) -> anyhow::Result<Self> {
        let child = Command::new(binary("car"))
            .args([name, &lowest.to_string(), &highest.to_string(), &delay_ms.to_string()])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        let region = wait_for_region(name, Duration::from_secs(2))?;
        Ok(Self { child, name: name.to_owned(), region })
    }

    pub fn snapshot(&self) -> elevator_core::shm::CarFields {
        self.region.snapshot()
    }

    /// Mutates the car's shared region directly, as a peer process (a
    /// button press or sensor) would.
    pub fn region_mutate(&self, f: impl FnOnce(&mut elevator_core::shm::CarFields)) {
        self.region.mutate(f);
    }

    /// Polls the region until `predicate` holds or `timeout` elapses.
    pub fn wait_until(
        &self,
        timeout: Duration,
        predicate: impl Fn(&elevator_core::shm::CarFields) -> bool,
    ) -> anyhow::Result<elevator_core::shm::CarFields> {
        let deadline = std::time::Instant::now() + timeout;
        loop {
            let fields = self.snapshot();
            if predicate(&fields) {
                return Ok(fields);
            }
            if std::time::Instant::now() > deadline {
                anyhow::bail!("condition not met within {timeout:?}; last fields: {fields:?}");
            }
            std::thread::sleep(Duration::from_millis(20));
        }
    }
}

impl Drop for CarProcess {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn wait_for_region(name: &str, timeout: Duration) -> anyhow::Result<CarRegion> {
    let deadline = std::time::Instant::now() + timeout;
    loop {
        if let Ok(region) = CarRegion::attach(name) {
            return Ok(region);
        }
        if std::time::Instant::now() > deadline {
            anyhow::bail!("car {name} never created its shared region within {timeout:?}");
        }
        std::thread::sleep(Duration::from_millis(20));
    }
}

/// A running `safety` process for `name`, killed on drop.
pub struct SafetyProcess {
    child: Child,
}

impl SafetyProcess {
    pub fn start(name: &str) -> anyhow::Result<Self> {
        let child = Command::new(binary("safety"))
            .args([name])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        // Give the monitor a moment to attach before the test mutates state.
        std::thread::sleep(Duration::from_millis(50));
        Ok(Self { child })
    }
}

impl Drop for SafetyProcess {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Runs `internal <name> <verb>` to completion and returns its output.
pub fn run_internal(name: &str, verb: &str) -> anyhow::Result<Output> {
    Ok(Command::new(binary("internal")).args([name, verb]).output()?)
}

/// Runs `call <src> <dst>` to completion and returns its output.
pub fn run_call(src: &str, dst: &str) -> anyhow::Result<Output> {
    Ok(Command::new(binary("call")).args([src, dst]).output()?)
}

pub fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim().to_owned()
}
