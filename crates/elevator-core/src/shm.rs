//! The per-car shared-memory region (spec §3, §4.B, §9).
//!
//! `/car<name>` is a small `repr(C)` struct holding a process-shared
//! `pthread_mutex_t` + `pthread_cond_t` pair followed by the car's live
//! state. Every writer locks, mutates, broadcasts, unlocks; every reader
//! either takes a point-in-time [`CarFields`] snapshot under the lock or
//! blocks on [`CarRegion::wait`] until the next broadcast.
//!
//! This is the one module in the workspace that needs raw syscalls: POSIX
//! doesn't expose process-shared mutexes through safe Rust, so the car,
//! safety monitor, and internal-panel binaries all link against the same
//! struct definition here rather than each rolling their own layout.

use std::ffi::c_void;
use std::mem::MaybeUninit;
use std::num::NonZeroUsize;
use std::path::Path;
use std::time::Duration;

use nix::fcntl::OFlag;
use nix::sys::mman::{self, MapFlags, ProtFlags};
use nix::sys::stat::Mode;

use crate::error::ElevatorError;
use crate::floor::Floor;

const CURRENT_FLOOR_LEN: usize = 4;
const DESTINATION_FLOOR_LEN: usize = 4;
const STATUS_LEN: usize = 8;

/// The stable, cross-process byte layout. Field order matches spec §3: the
/// mutex and condvar first, then floors, then status, then the bit fields.
#[repr(C)]
struct RawCarRegion {
    mutex: libc::pthread_mutex_t,
    cond: libc::pthread_cond_t,
    current_floor: [u8; CURRENT_FLOOR_LEN],
    destination_floor: [u8; DESTINATION_FLOOR_LEN],
    status: [u8; STATUS_LEN],
    open_button: u8,
    close_button: u8,
    door_obstruction: u8,
    overload: u8,
    emergency_stop: u8,
    individual_service_mode: u8,
    emergency_mode: u8,
    /// Auxiliary bit co-broadcast with the condvar so the door loop can
    /// observe a close-button abort no later than its next wake (§9).
    early_exit: u8,
    /// Set once at creation. Carried in the region (rather than only in
    /// the controller's registry) so the safety monitor — which attaches
    /// only by name (§6) — can evaluate invariant I5 without a second
    /// side channel for the car's range.
    lowest_floor: [u8; CURRENT_FLOOR_LEN],
    highest_floor: [u8; CURRENT_FLOOR_LEN],
}

/// A point-in-time, typed view of [`RawCarRegion`]'s contents, taken or
/// applied under the region's lock.
#[derive(Debug, Clone)]
pub struct CarFields {
    pub current_floor: String,
    pub destination_floor: String,
    pub status: String,
    pub open_button: u8,
    pub close_button: u8,
    pub door_obstruction: u8,
    pub overload: u8,
    pub emergency_stop: u8,
    pub individual_service_mode: u8,
    pub emergency_mode: u8,
    pub early_exit: u8,
    pub lowest_floor: Floor,
    pub highest_floor: Floor,
}

/// An owning handle to a mapped `/car<name>` region.
pub struct CarRegion {
    ptr: *mut RawCarRegion,
    name: String,
    /// Whether this handle created the region and should unlink it on drop.
    owner: bool,
}

// The region is explicitly designed for concurrent cross-process access
// guarded by its own embedded mutex; sharing the handle across threads
// within one process is likewise safe.
unsafe impl Send for CarRegion {}
unsafe impl Sync for CarRegion {}

fn shm_path(name: &str) -> String {
    format!("/car{name}")
}

impl CarRegion {
    /// Creates `/car<name>`, unlinking any stale region of the same name
    /// first (§4.B, §9: "unlink any prior name, recreate"). Initializes the
    /// mutex/condvar as process-shared and the fields to their startup
    /// values: parked closed at `initial_floor`, every bit clear.
    pub fn create(
        name: &str,
        lowest: Floor,
        highest: Floor,
    ) -> Result<CarRegion, ElevatorError> {
        let path = shm_path(name);
        let _ = mman::shm_unlink(Path::new(&path));

        let fd = mman::shm_open(
            Path::new(&path),
            OFlag::O_CREAT | OFlag::O_RDWR | OFlag::O_EXCL,
            Mode::S_IRUSR | Mode::S_IWUSR | Mode::S_IRGRP | Mode::S_IWGRP,
        )
        .map_err(|e| ElevatorError::Attach { car: name.to_owned(), source: e.into() })?;
        let file = std::fs::File::from(fd);

        let size = std::mem::size_of::<RawCarRegion>();
        file.set_len(size as u64)
            .map_err(|e| ElevatorError::Attach { car: name.to_owned(), source: e })?;

        let ptr = map(&file, size)
            .map_err(|e| ElevatorError::Attach { car: name.to_owned(), source: e.into() })?
            .cast::<RawCarRegion>();

        unsafe {
            init_pshared_mutex(&mut (*ptr).mutex);
            init_pshared_cond(&mut (*ptr).cond);
            write_floor(&mut (*ptr).current_floor, lowest);
            write_floor(&mut (*ptr).destination_floor, lowest);
            write_floor(&mut (*ptr).lowest_floor, lowest);
            write_floor(&mut (*ptr).highest_floor, highest);
            write_status(&mut (*ptr).status, "Closed");
            (*ptr).open_button = 0;
            (*ptr).close_button = 0;
            (*ptr).door_obstruction = 0;
            (*ptr).overload = 0;
            (*ptr).emergency_stop = 0;
            (*ptr).individual_service_mode = 0;
            (*ptr).emergency_mode = 0;
            (*ptr).early_exit = 0;
        }

        Ok(CarRegion { ptr, name: name.to_owned(), owner: true })
    }

    /// Attaches to an existing `/car<name>` region without creating it
    /// (safety monitor, internal panel).
    pub fn attach(name: &str) -> Result<CarRegion, ElevatorError> {
        let path = shm_path(name);
        let fd = mman::shm_open(Path::new(&path), OFlag::O_RDWR, Mode::empty())
            .map_err(|e| ElevatorError::Attach { car: name.to_owned(), source: e.into() })?;
        let file = std::fs::File::from(fd);
        let size = std::mem::size_of::<RawCarRegion>();
        let ptr = map(&file, size)
            .map_err(|e| ElevatorError::Attach { car: name.to_owned(), source: e.into() })?
            .cast::<RawCarRegion>();
        Ok(CarRegion { ptr, name: name.to_owned(), owner: false })
    }

    /// Takes a snapshot of every field under the lock. Does not broadcast
    /// — reads never mutate.
    pub fn snapshot(&self) -> CarFields {
        unsafe {
            lock(&mut (*self.ptr).mutex);
            let fields = read_fields(&*self.ptr);
            unlock(&mut (*self.ptr).mutex);
            fields
        }
    }

    /// Locks, applies `f` to a mutable [`CarFields`], writes the result
    /// back, broadcasts on the condvar, then unlocks. This is the only way
    /// any component may mutate the region (§4.B, §5).
    pub fn mutate(&self, f: impl FnOnce(&mut CarFields)) {
        unsafe {
            lock(&mut (*self.ptr).mutex);
            let mut fields = read_fields(&*self.ptr);
            f(&mut fields);
            write_fields(&mut *self.ptr, &fields);
            broadcast(&mut (*self.ptr).cond);
            unlock(&mut (*self.ptr).mutex);
        }
    }

    /// Blocks on the condvar for up to `timeout` (or indefinitely if
    /// `None`), then returns the fields observed on wake. Used by the door
    /// loop's timed waits and the safety monitor's `cond_wait` (§4.C, §4.F,
    /// §5). The wait is absolute: the deadline is computed once by the
    /// caller-visible timeout, not re-armed per spurious wake.
    pub fn wait(&self, timeout: Option<Duration>) -> CarFields {
        unsafe {
            lock(&mut (*self.ptr).mutex);
            match timeout {
                None => {
                    let _ = libc::pthread_cond_wait(&mut (*self.ptr).cond, &mut (*self.ptr).mutex);
                }
                Some(d) => {
                    let deadline = deadline_timespec(d);
                    let _ = libc::pthread_cond_timedwait(
                        &mut (*self.ptr).cond,
                        &mut (*self.ptr).mutex,
                        &deadline,
                    );
                }
            }
            let fields = read_fields(&*self.ptr);
            unlock(&mut (*self.ptr).mutex);
            fields
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for CarRegion {
    fn drop(&mut self) {
        let size = std::mem::size_of::<RawCarRegion>();
        unsafe {
            let _ = mman::munmap(
                std::ptr::NonNull::new_unchecked(self.ptr.cast::<c_void>()),
                size,
            );
        }
        if self.owner {
            let _ = mman::shm_unlink(Path::new(&shm_path(&self.name)));
        }
    }
}

fn map(file: &std::fs::File, size: usize) -> nix::Result<*mut c_void> {
    let len = NonZeroUsize::new(size).expect("RawCarRegion is never zero-sized");
    unsafe {
        mman::mmap(
            None,
            len,
            ProtFlags::PROT_READ | ProtFlags::PROT_WRITE,
            MapFlags::MAP_SHARED,
            file,
            0,
        )
        .map(std::ptr::NonNull::as_ptr)
    }
}

unsafe fn init_pshared_mutex(mutex: &mut libc::pthread_mutex_t) {
    let mut attr = MaybeUninit::<libc::pthread_mutexattr_t>::uninit();
    libc::pthread_mutexattr_init(attr.as_mut_ptr());
    let mut attr = attr.assume_init();
    libc::pthread_mutexattr_setpshared(&mut attr, libc::PTHREAD_PROCESS_SHARED);
    libc::pthread_mutex_init(mutex, &attr);
    libc::pthread_mutexattr_destroy(&mut attr);
}

unsafe fn init_pshared_cond(cond: &mut libc::pthread_cond_t) {
    let mut attr = MaybeUninit::<libc::pthread_condattr_t>::uninit();
    libc::pthread_condattr_init(attr.as_mut_ptr());
    let mut attr = attr.assume_init();
    libc::pthread_condattr_setpshared(&mut attr, libc::PTHREAD_PROCESS_SHARED);
    libc::pthread_cond_init(cond, &attr);
    libc::pthread_condattr_destroy(&mut attr);
}

unsafe fn lock(mutex: &mut libc::pthread_mutex_t) {
    let _ = libc::pthread_mutex_lock(mutex);
}

unsafe fn unlock(mutex: &mut libc::pthread_mutex_t) {
    let _ = libc::pthread_mutex_unlock(mutex);
}

unsafe fn broadcast(cond: &mut libc::pthread_cond_t) {
    let _ = libc::pthread_cond_broadcast(cond);
}

fn deadline_timespec(from_now: Duration) -> libc::timespec {
    let mut now = libc::timespec { tv_sec: 0, tv_nsec: 0 };
    unsafe {
        libc::clock_gettime(libc::CLOCK_REALTIME, &mut now);
    }
    let total_nanos = now.tv_nsec as i64 + from_now.subsec_nanos() as i64;
    libc::timespec {
        tv_sec: now.tv_sec + from_now.as_secs() as i64 + total_nanos / 1_000_000_000,
        tv_nsec: total_nanos % 1_000_000_000,
    }
}

fn write_floor(buf: &mut [u8], floor: Floor) {
    write_nul_terminated(buf, &floor.to_string());
}

fn write_status(buf: &mut [u8], status: &str) {
    write_nul_terminated(buf, status);
}

fn write_nul_terminated(buf: &mut [u8], text: &str) {
    let bytes = text.as_bytes();
    let n = bytes.len().min(buf.len() - 1);
    buf[..n].copy_from_slice(&bytes[..n]);
    buf[n] = 0;
    for b in &mut buf[n + 1..] {
        *b = 0;
    }
}

fn read_nul_terminated(buf: &[u8]) -> String {
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    String::from_utf8_lossy(&buf[..end]).into_owned()
}

unsafe fn read_fields(raw: &RawCarRegion) -> CarFields {
    CarFields {
        current_floor: read_nul_terminated(&raw.current_floor),
        destination_floor: read_nul_terminated(&raw.destination_floor),
        status: read_nul_terminated(&raw.status),
        open_button: raw.open_button,
        close_button: raw.close_button,
        door_obstruction: raw.door_obstruction,
        overload: raw.overload,
        emergency_stop: raw.emergency_stop,
        individual_service_mode: raw.individual_service_mode,
        emergency_mode: raw.emergency_mode,
        early_exit: raw.early_exit,
        lowest_floor: read_nul_terminated(&raw.lowest_floor).parse().unwrap_or(Floor::Surface(1)),
        highest_floor: read_nul_terminated(&raw.highest_floor).parse().unwrap_or(Floor::Surface(1)),
    }
}

unsafe fn write_fields(raw: &mut RawCarRegion, fields: &CarFields) {
    write_nul_terminated(&mut raw.current_floor, &fields.current_floor);
    write_nul_terminated(&mut raw.destination_floor, &fields.destination_floor);
    write_nul_terminated(&mut raw.status, &fields.status);
    raw.open_button = fields.open_button;
    raw.close_button = fields.close_button;
    raw.door_obstruction = fields.door_obstruction;
    raw.overload = fields.overload;
    raw.emergency_stop = fields.emergency_stop;
    raw.individual_service_mode = fields.individual_service_mode;
    raw.emergency_mode = fields.emergency_mode;
    raw.early_exit = fields.early_exit;
}

#[cfg(test)]
#[path = "shm_tests.rs"]
mod tests;
