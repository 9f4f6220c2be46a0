use super::*;
use elevator_core::Floor;

fn entry(name: &str, lo: u16, hi: u16) -> Arc<CarEntry> {
    Arc::new(CarEntry {
        descriptor: CarDescriptor {
            name: name.to_owned(),
            lowest: Floor::Surface(lo),
            highest: Floor::Surface(hi),
        },
        mirror: RwLock::new(CarMirror {
            current_floor: Floor::Surface(lo),
            destination_floor: Floor::Surface(lo),
            status: CarStatus::Closed,
        }),
        queue: Mutex::new(CallQueue::new()),
        notify: tokio::sync::Notify::new(),
    })
}

#[test]
fn descriptor_serviceable_requires_both_floors_in_range() {
    let d = CarDescriptor { name: "A".into(), lowest: Floor::Surface(1), highest: Floor::Surface(3) };
    assert!(d.serviceable(Floor::Surface(2), Floor::Surface(3)));
    assert!(!d.serviceable(Floor::Surface(2), Floor::Surface(5)));
}

#[test]
fn mirror_ready_when_idle_or_opening() {
    let mut m = CarMirror {
        current_floor: Floor::Surface(1),
        destination_floor: Floor::Surface(1),
        status: CarStatus::Closed,
    };
    assert!(m.ready_for_dispatch());
    m.destination_floor = Floor::Surface(2);
    assert!(!m.ready_for_dispatch());
    m.status = CarStatus::Opening;
    assert!(m.ready_for_dispatch());
}

#[tokio::test]
async fn select_picks_first_serviceable_in_registration_order() {
    let reg = Registry::new();
    reg.register(entry("A", 1, 3)).await;
    reg.register(entry("B", 1, 10)).await;

    let picked = reg.select(Floor::Surface(2), Floor::Surface(8)).await;
    assert_eq!(picked.unwrap().descriptor.name, "B");

    let picked = reg.select(Floor::Surface(2), Floor::Surface(3)).await;
    assert_eq!(picked.unwrap().descriptor.name, "A");
}

#[tokio::test]
async fn select_returns_none_when_no_car_covers_the_call() {
    let reg = Registry::new();
    reg.register(entry("A", 1, 3)).await;
    assert!(reg.select(Floor::Surface(2), Floor::Surface(5)).await.is_none());
}

#[tokio::test]
async fn remove_drops_car_from_future_selection() {
    let reg = Registry::new();
    reg.register(entry("A", 1, 10)).await;
    reg.remove("A").await;
    assert!(reg.select(Floor::Surface(1), Floor::Surface(2)).await.is_none());
}
