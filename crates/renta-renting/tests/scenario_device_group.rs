use renta_ledger::FeatureCache;
use renta_renting::{Device, RentingEngine};
use renta_testkit::{DeviceFixture, FixtureLedger};
use renta_types::{Address, DeviceId};

fn addr(n: u8) -> Address {
    let mut bytes = [0u8; 20];
    bytes[19] = n;
    Address(bytes)
}

fn contract() -> Address {
    addr(1)
}

fn unit(counter: u64) -> DeviceId {
    DeviceId::from_parts([7u8; 24], counter)
}

fn occupied(now: u64) -> DeviceFixture {
    DeviceFixture {
        controller: addr(9),
        rented_from: now - 100,
        rented_until: now + 1_000,
        ..DeviceFixture::default()
    }
}

#[tokio::test]
async fn scan_finds_the_first_free_sibling() {
    let now = 10_000;
    let ledger = FixtureLedger::new(now);
    ledger.insert_device(contract(), unit(1), occupied(now));
    ledger.insert_device(contract(), unit(2), occupied(now));
    ledger.insert_device(contract(), unit(3), DeviceFixture::default());
    let cache = FeatureCache::new();
    let engine = RentingEngine::new(&ledger, None, &cache);

    let device = Device::new(contract(), unit(1), "bike#1@myCompany", addr(2), Address::ZERO);
    let found = engine.find_next_rentable(&device, 10).await.unwrap();
    let found = found.expect("unit 3 is free");
    assert_eq!(found.id, unit(3));
    assert_eq!(found.url, "bike#3@myCompany");
}

#[tokio::test]
async fn scan_stops_at_the_end_of_the_group() {
    let now = 10_000;
    let ledger = FixtureLedger::new(now);
    ledger.insert_device(contract(), unit(1), occupied(now));
    ledger.insert_device(contract(), unit(2), occupied(now));
    // Counter 3 does not exist; the scan must stop there, not probe on
    // to max_steps.
    let cache = FeatureCache::new();
    let engine = RentingEngine::new(&ledger, None, &cache);

    let device = Device::new(contract(), unit(1), "bike#1@myCompany", addr(2), Address::ZERO);
    let found = engine.find_next_rentable(&device, 100).await.unwrap();
    assert_eq!(found, None);
}

#[tokio::test]
async fn unrentable_free_units_are_skipped() {
    let now = 10_000;
    let ledger = FixtureLedger::new(now);
    ledger.insert_device(
        contract(),
        unit(1),
        DeviceFixture {
            rentable: false,
            ..DeviceFixture::default()
        },
    );
    ledger.insert_device(contract(), unit(2), DeviceFixture::default());
    let cache = FeatureCache::new();
    let engine = RentingEngine::new(&ledger, None, &cache);

    let device = Device::new(contract(), unit(1), "bike#1@myCompany", addr(2), Address::ZERO);
    let found = engine.find_next_rentable(&device, 10).await.unwrap();
    assert_eq!(found.map(|d| d.id), Some(unit(2)));
}
