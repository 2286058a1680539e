//! Declarative fixture files.
//!
//! A whole in-memory ledger described as one JSON document, so CLI commands
//! and tests can share the same scenario definitions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use renta_ledger::Feature;
use renta_types::{Address, Bytes32, DeviceId};

use crate::ledger::{DeviceFixture, FixtureLedger};

/// One device entry in a fixture file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureDevice {
    pub contract: Address,
    pub device: DeviceId,
    #[serde(flatten)]
    pub fixture: DeviceFixture,
}

/// One balance entry in a fixture file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureBalance {
    pub user: Address,
    #[serde(default)]
    pub token: Address,
    pub amount: u128,
}

/// A complete ledger scenario.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LedgerFixture {
    /// Block time the scenario starts at, unix seconds.
    pub now: u64,
    /// Registered names: namehash node to contract address.
    pub names: BTreeMap<Bytes32, Address>,
    /// Features each contract supports.
    pub features: BTreeMap<Address, Vec<Feature>>,
    pub devices: Vec<FixtureDevice>,
    pub balances: Vec<FixtureBalance>,
}

impl LedgerFixture {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl FixtureLedger {
    /// Build a ledger pre-populated from a fixture document.
    pub fn from_fixture(fixture: &LedgerFixture) -> Self {
        let ledger = FixtureLedger::new(fixture.now);
        for (node, contract) in &fixture.names {
            ledger.register_name(*node, *contract);
        }
        for (contract, features) in &fixture.features {
            for feature in features {
                ledger.set_feature(*contract, *feature, true);
            }
        }
        for entry in &fixture.devices {
            ledger.insert_device(entry.contract, entry.device, entry.fixture.clone());
        }
        for balance in &fixture.balances {
            ledger.set_balance(balance.user, balance.token, balance.amount);
        }
        ledger
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use renta_ledger::RentingLedger;

    #[tokio::test]
    async fn fixture_document_round_trips_into_a_working_ledger() {
        let json = r#"{
            "now": 1000,
            "names": {
                "0x0000000000000000000000000000000000000000000000000000000000000002":
                    "0x0000000000000000000000000000000000000001"
            },
            "features": {
                "0x0000000000000000000000000000000000000001": ["renting", "offChain"]
            },
            "devices": [{
                "contract": "0x0000000000000000000000000000000000000001",
                "device": "0x0707070707070707070707070707070707070707070707070000000000000001",
                "pricePerHour": 10,
                "rentable": true
            }],
            "balances": [{
                "user": "0x0000000000000000000000000000000000000009",
                "amount": 100
            }]
        }"#;
        let fixture = LedgerFixture::from_json(json).unwrap();
        let ledger = FixtureLedger::from_fixture(&fixture);

        assert_eq!(ledger.block_time().await.unwrap(), 1000);
        let node = Bytes32::from_hex_padded("0x02").unwrap();
        let contract = ledger.resolve_addr(node).await.unwrap();
        assert!(!contract.is_zero());
        assert!(ledger
            .supports_feature(contract, Feature::OffChain)
            .await
            .unwrap());
        let device = DeviceId::from_parts([7u8; 24], 1);
        let state = ledger
            .renting_state(contract, device, Address::ZERO)
            .await
            .unwrap();
        assert!(state.rentable);
    }
}
