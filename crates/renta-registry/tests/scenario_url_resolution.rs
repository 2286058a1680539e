use renta_registry::{node_id, parse_url, resolve_url};
use renta_testkit::FixtureLedger;
use renta_types::{Address, Bytes32};

fn addr(n: u8) -> Address {
    let mut bytes = [0u8; 20];
    bytes[19] = n;
    Address(bytes)
}

#[tokio::test]
async fn unregistered_name_fails_with_name_not_registered() {
    let ledger = FixtureLedger::new(1_000);
    let err = resolve_url(&ledger, Bytes32::ZERO, "bike#3@myCompany.usn")
        .await
        .unwrap_err();
    assert_eq!(err.key(), "name_not_registered");
}

#[tokio::test]
async fn registered_name_resolves_to_its_contract() {
    let root = Bytes32::ZERO;
    let ledger = FixtureLedger::new(1_000);
    let contract = addr(5);
    ledger.register_name(node_id("myCompany.usn", root), contract);

    let resolved = resolve_url(&ledger, root, "bike#3@myCompany.usn")
        .await
        .unwrap();
    assert_eq!(resolved.contract, contract);
    assert_eq!(resolved.url, "bike#3@myCompany.usn");
    assert_eq!(resolved.parsed.counter, 3);
    assert_eq!(
        resolved.parsed,
        parse_url("bike#3@myCompany.usn").unwrap(),
        "resolution derives the same identifiers as offline parsing"
    );
}

#[tokio::test]
async fn hex_contract_skips_the_registry_derivation() {
    let ledger = FixtureLedger::new(1_000);
    let contract = addr(6);
    let node = Bytes32::from_hex_padded("0xbeef").unwrap();
    ledger.register_name(node, contract);

    let resolved = resolve_url(&ledger, Bytes32::ZERO, "bike@0xbeef").await.unwrap();
    assert_eq!(resolved.contract, contract);
    assert_eq!(resolved.parsed.node_id, node);
}

#[tokio::test]
async fn malformed_inputs_surface_typed_keys() {
    let ledger = FixtureLedger::new(1_000);
    let root = Bytes32::ZERO;

    let err = resolve_url(&ledger, root, "not a url").await.unwrap_err();
    assert_eq!(err.key(), "invalid_url");

    let err = resolve_url(&ledger, root, "bike#99999999999@c").await.unwrap_err();
    assert_eq!(err.key(), "wrong_counter");

    let err = resolve_url(&ledger, root, "bike@0xzz").await.unwrap_err();
    assert_eq!(err.key(), "invalid_id");
}

#[tokio::test]
async fn different_roots_resolve_to_different_nodes() {
    let ledger = FixtureLedger::new(1_000);
    let root_a = Bytes32::ZERO;
    let root_b = Bytes32([1u8; 32]);
    ledger.register_name(node_id("myCompany.usn", root_a), addr(5));

    assert!(resolve_url(&ledger, root_a, "bike@myCompany.usn").await.is_ok());
    let err = resolve_url(&ledger, root_b, "bike@myCompany.usn").await.unwrap_err();
    assert_eq!(err.key(), "name_not_registered");
}
