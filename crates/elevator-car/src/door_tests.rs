use std::sync::atomic::{AtomicU32, Ordering::Relaxed};
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use elevator_core::shm::CarRegion;
use elevator_core::{CarStatus, Floor};

use super::run;

static COUNTER: AtomicU32 = AtomicU32::new(0);

fn unique_name() -> String {
    format!("door{}_{}", std::process::id(), COUNTER.fetch_add(1, Relaxed))
}

fn spawn_door(region: Arc<CarRegion>, delay: Duration, shutdown: CancellationToken) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || run(&region, delay, &shutdown))
}

#[test]
fn automatic_sequence_cycles_through_all_four_states() {
    let region = Arc::new(CarRegion::create(&unique_name(), Floor::Surface(1), Floor::Surface(10)).unwrap());
    region.mutate(|f| f.status = CarStatus::Opening.to_string());
    let shutdown = CancellationToken::new();
    let handle = spawn_door(Arc::clone(&region), Duration::from_millis(15), shutdown.clone());

    std::thread::sleep(Duration::from_millis(200));
    assert_eq!(region.snapshot().status, CarStatus::Closed.to_string());

    shutdown.cancel();
    region.mutate(|_| {});
    handle.join().unwrap();
}

#[test]
fn open_button_from_closed_starts_the_opening_sequence() {
    let region = Arc::new(CarRegion::create(&unique_name(), Floor::Surface(1), Floor::Surface(10)).unwrap());
    let shutdown = CancellationToken::new();
    let handle = spawn_door(Arc::clone(&region), Duration::from_millis(200), shutdown.clone());

    region.mutate(|f| f.open_button = 1);
    std::thread::sleep(Duration::from_millis(50));
    let fields = region.snapshot();
    assert_eq!(fields.status, CarStatus::Opening.to_string());
    assert_eq!(fields.open_button, 0);

    shutdown.cancel();
    region.mutate(|_| {});
    handle.join().unwrap();
}

#[test]
fn close_button_during_open_aborts_the_dwell_immediately() {
    let region = Arc::new(CarRegion::create(&unique_name(), Floor::Surface(1), Floor::Surface(10)).unwrap());
    region.mutate(|f| f.status = CarStatus::Open.to_string());
    let shutdown = CancellationToken::new();
    let handle = spawn_door(Arc::clone(&region), Duration::from_millis(500), shutdown.clone());

    std::thread::sleep(Duration::from_millis(20));
    region.mutate(|f| {
        f.close_button = 1;
        f.early_exit = 1;
    });
    std::thread::sleep(Duration::from_millis(50));

    let fields = region.snapshot();
    assert_eq!(fields.status, CarStatus::Closing.to_string(), "close button must abort the Open dwell, not wait out the full delay");

    shutdown.cancel();
    region.mutate(|_| {});
    handle.join().unwrap();
}

#[test]
fn individual_service_buttons_jump_directly_between_open_and_closed() {
    let region = Arc::new(CarRegion::create(&unique_name(), Floor::Surface(1), Floor::Surface(10)).unwrap());
    region.mutate(|f| f.individual_service_mode = 1);
    let shutdown = CancellationToken::new();
    let handle = spawn_door(Arc::clone(&region), Duration::from_millis(500), shutdown.clone());

    region.mutate(|f| f.open_button = 1);
    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(region.snapshot().status, CarStatus::Open.to_string(), "service mode must skip the Opening intermediate");

    region.mutate(|f| f.close_button = 1);
    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(region.snapshot().status, CarStatus::Closed.to_string(), "service mode must skip the Closing intermediate");

    shutdown.cancel();
    region.mutate(|_| {});
    handle.join().unwrap();
}

#[test]
fn open_button_during_opening_is_a_true_no_op_and_does_not_extend_the_dwell() {
    let region = Arc::new(CarRegion::create(&unique_name(), Floor::Surface(1), Floor::Surface(10)).unwrap());
    region.mutate(|f| f.status = CarStatus::Opening.to_string());
    let shutdown = CancellationToken::new();
    let handle = spawn_door(Arc::clone(&region), Duration::from_millis(100), shutdown.clone());

    // Halfway through the Opening dwell, a spurious open_button press must
    // not restart the timer: the door should still land on schedule.
    std::thread::sleep(Duration::from_millis(50));
    region.mutate(|f| f.open_button = 1);

    std::thread::sleep(Duration::from_millis(70));
    assert_eq!(
        region.snapshot().status,
        CarStatus::Open.to_string(),
        "the dwell must complete on its original schedule, not be restarted by the no-op press"
    );

    shutdown.cancel();
    region.mutate(|_| {});
    handle.join().unwrap();
}

#[test]
fn close_button_while_not_open_is_a_true_no_op_and_does_not_extend_the_dwell() {
    let region = Arc::new(CarRegion::create(&unique_name(), Floor::Surface(1), Floor::Surface(10)).unwrap());
    region.mutate(|f| f.status = CarStatus::Closing.to_string());
    let shutdown = CancellationToken::new();
    let handle = spawn_door(Arc::clone(&region), Duration::from_millis(100), shutdown.clone());

    // A close_button press while already Closing has nothing to abort; it
    // must not restart the Closing->Closed dwell either.
    std::thread::sleep(Duration::from_millis(50));
    region.mutate(|f| f.close_button = 1);

    std::thread::sleep(Duration::from_millis(70));
    assert_eq!(
        region.snapshot().status,
        CarStatus::Closed.to_string(),
        "the dwell must complete on its original schedule, not be restarted by the no-op press"
    );

    shutdown.cancel();
    region.mutate(|_| {});
    handle.join().unwrap();
}

#[test]
fn latched_emergency_mode_stops_the_loop() {
    let region = Arc::new(CarRegion::create(&unique_name(), Floor::Surface(1), Floor::Surface(10)).unwrap());
    region.mutate(|f| f.emergency_mode = 1);
    let shutdown = CancellationToken::new();
    let handle = spawn_door(Arc::clone(&region), Duration::from_millis(20), shutdown);

    handle.join().unwrap();
}
