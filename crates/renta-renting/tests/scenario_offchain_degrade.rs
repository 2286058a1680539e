use renta_hub::{DeviceHub, HubError};
use renta_ledger::{Feature, FeatureCache};
use renta_renting::{Device, RentingEngine};
use renta_testkit::{DeviceFixture, FixtureHub, FixtureLedger};
use renta_types::{Address, BookingInterval, DeviceId};

fn addr(n: u8) -> Address {
    let mut bytes = [0u8; 20];
    bytes[19] = n;
    Address(bytes)
}

fn contract() -> Address {
    addr(1)
}

fn id() -> DeviceId {
    DeviceId::from_parts([7u8; 24], 1)
}

fn device(user: Address) -> Device {
    Device::new(contract(), id(), "bike#1@myCompany", user, Address::ZERO)
}

fn ledger_with(fixture: DeviceFixture, now: u64) -> FixtureLedger {
    let ledger = FixtureLedger::new(now);
    ledger.insert_device(contract(), id(), fixture);
    ledger
}

#[tokio::test]
async fn hub_states_and_clock_win_when_the_hub_answers() {
    let renter = addr(9);
    let ledger = ledger_with(DeviceFixture::default(), 1_000);
    let hub = FixtureHub::answering(2_000, vec![BookingInterval::new(renter, 1_900, 2_500)]);
    let cache = FeatureCache::new();
    let engine = RentingEngine::new(&ledger, Some(&hub as &dyn DeviceHub), &cache);

    let state = engine.renting_state(&device(addr(2)), true).await.unwrap();
    assert_eq!(state.timestamp, 2_000, "device clock is the time oracle");
    assert_eq!(state.states.len(), 1);
    assert_eq!(state.controller, Some(renter));
    assert_eq!(state.rented_until, 2_500);
    assert!(!state.free);
    assert_eq!(state.free, state.rented_until == 0);
    assert_eq!(hub.reads(), vec!["bike#1@myCompany".to_string()]);
}

#[tokio::test]
async fn failed_hub_read_degrades_to_ledger_truth() {
    let renter = addr(9);
    let ledger = ledger_with(
        DeviceFixture {
            controller: renter,
            rented_from: 900,
            rented_until: 1_500,
            ..DeviceFixture::default()
        },
        1_000,
    );
    let hub = FixtureHub::failing(HubError::Transport("hub unreachable".to_string()));
    let cache = FeatureCache::new();
    let engine = RentingEngine::new(&ledger, Some(&hub as &dyn DeviceHub), &cache);

    let state = engine.renting_state(&device(addr(2)), true).await.unwrap();
    assert_eq!(state.timestamp, 1_000, "block time when the hub is silent");
    assert_eq!(state.states.len(), 1, "ledger booking materialised as a list");
    assert_eq!(state.controller, Some(renter));
    assert!(!state.free);
}

#[tokio::test]
async fn expired_ledger_booking_projects_to_free() {
    let ledger = ledger_with(
        DeviceFixture {
            controller: addr(9),
            rented_from: 100,
            rented_until: 500,
            ..DeviceFixture::default()
        },
        1_000,
    );
    let cache = FeatureCache::new();
    let engine = RentingEngine::new(&ledger, None, &cache);

    let state = engine.renting_state(&device(addr(2)), true).await.unwrap();
    assert_eq!(state.controller, None, "the interval already ended");
    assert_eq!(state.rented_until, 0);
    assert_eq!(state.rented_from, 0);
    assert!(state.free);
    assert_eq!(state.states.len(), 1, "the raw list keeps the old interval");
}

#[tokio::test]
async fn include_off_chain_false_never_consults_the_hub() {
    let ledger = ledger_with(DeviceFixture::default(), 1_000);
    let hub = FixtureHub::answering(9_999, vec![BookingInterval::new(addr(9), 0, u64::MAX)]);
    let cache = FeatureCache::new();
    let engine = RentingEngine::new(&ledger, Some(&hub as &dyn DeviceHub), &cache);

    let state = engine.renting_state(&device(addr(2)), false).await.unwrap();
    assert!(hub.reads().is_empty());
    assert_eq!(state.timestamp, 1_000);
    assert!(state.free);
}

#[tokio::test]
async fn booking_list_shape_depends_on_rent_for() {
    let user = addr(2);
    let cache = FeatureCache::new();

    // No booking, no rentFor: nothing to list.
    let ledger = ledger_with(DeviceFixture::default(), 1_000);
    let engine = RentingEngine::new(&ledger, None, &cache);
    let state = engine.renting_state(&device(user), true).await.unwrap();
    assert!(state.states.is_empty());
    assert!(state.free);

    // Same ledger state, but rentFor contracts always surface their slot.
    let ledger = ledger_with(DeviceFixture::default(), 1_000);
    ledger.set_feature(contract(), Feature::RentFor, true);
    let cache = FeatureCache::new();
    let engine = RentingEngine::new(&ledger, None, &cache);
    let state = engine.renting_state(&device(user), true).await.unwrap();
    assert_eq!(state.states.len(), 1);
    assert!(state.free, "the empty slot is not an active booking");
}

#[tokio::test]
async fn hub_soft_booking_not_on_the_ledger_is_respected() {
    // The ledger thinks the device is free; the device itself reports a
    // pending booking. The reconciled view must not offer the slot.
    let soft_renter = addr(9);
    let ledger = ledger_with(DeviceFixture::default(), 1_000);
    let hub = FixtureHub::answering(1_000, vec![BookingInterval::new(soft_renter, 950, 1_800)]);
    let cache = FeatureCache::new();
    let engine = RentingEngine::new(&ledger, Some(&hub as &dyn DeviceHub), &cache);

    let state = engine.renting_state(&device(addr(2)), true).await.unwrap();
    assert_eq!(state.controller, Some(soft_renter));
    assert!(!state.free);
}
