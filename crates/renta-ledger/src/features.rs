//! Contract capability model.
//!
//! A deployed contract either implements a feature interface or it does not,
//! and that never changes for its lifetime.  The engine therefore probes each
//! `(contract, feature)` pair at most once and caches the answer forever in
//! an explicit, caller-owned [`FeatureCache`] — there is deliberately no
//! invalidation and no process-global state.  Concurrent callers may race to
//! populate the same entry; the first write wins and every racer would have
//! written the same value, so the race is benign.

use std::collections::BTreeMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use renta_types::Address;

use crate::{LedgerError, RentingLedger};

/// Feature interfaces a renting contract may implement, with their
/// EIP-165-style 4-byte interface ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Feature {
    Renting,
    RentFor,
    Deposit,
    OffChain,
    Owner,
    Meta,
    TimeRange,
    MultiTokens,
}

impl Feature {
    pub fn interface_id(&self) -> [u8; 4] {
        match self {
            Feature::Renting => [0xb2, 0xa8, 0x0d, 0xea],
            Feature::RentFor => [0xbf, 0x89, 0xd2, 0xac],
            Feature::Deposit => [0xd8, 0x53, 0x3f, 0x34],
            Feature::OffChain => [0x3d, 0x8a, 0x1e, 0x6b],
            Feature::Owner => [0xb4, 0x76, 0x2f, 0xab],
            Feature::Meta => [0xfb, 0x4c, 0xa7, 0xb3],
            Feature::TimeRange => [0x51, 0x53, 0x3f, 0xb7],
            Feature::MultiTokens => [0xe1, 0xca, 0xe6, 0xfe],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Feature::Renting => "renting",
            Feature::RentFor => "rentFor",
            Feature::Deposit => "deposit",
            Feature::OffChain => "offChain",
            Feature::Owner => "owner",
            Feature::Meta => "meta",
            Feature::TimeRange => "timeRange",
            Feature::MultiTokens => "multiTokens",
        }
    }
}

/// The capability snapshot the renting workflows branch on.
///
/// Fetched once per workflow and passed as data, so call sites branch on
/// plain bools instead of probing mid-flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureSet {
    pub renting: bool,
    pub rent_for: bool,
    pub deposit: bool,
    pub off_chain: bool,
}

/// Write-once probe cache, keyed by `(contract, feature)`.
///
/// Precondition (asserted, not assumed): a cached value is never replaced by
/// a different one.  That holds because interface support is immutable for a
/// deployed contract; if a ledger client ever reported otherwise the cache
/// keeps the first answer.
#[derive(Debug, Default)]
pub struct FeatureCache {
    entries: Mutex<BTreeMap<(Address, Feature), bool>>,
}

impl FeatureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached answer, if this pair was probed before.
    pub fn get(&self, contract: Address, feature: Feature) -> Option<bool> {
        self.entries
            .lock()
            .expect("feature cache poisoned")
            .get(&(contract, feature))
            .copied()
    }

    /// Record a probe result.  First write wins; returns the stored value.
    pub fn record(&self, contract: Address, feature: Feature, supported: bool) -> bool {
        *self
            .entries
            .lock()
            .expect("feature cache poisoned")
            .entry((contract, feature))
            .or_insert(supported)
    }

    /// Probe through the cache: ask the ledger only on a miss.
    pub async fn has_feature(
        &self,
        ledger: &dyn RentingLedger,
        contract: Address,
        feature: Feature,
    ) -> Result<bool, LedgerError> {
        if let Some(cached) = self.get(contract, feature) {
            return Ok(cached);
        }
        let supported = ledger.supports_feature(contract, feature).await?;
        Ok(self.record(contract, feature, supported))
    }

    /// Fetch the full capability snapshot the renting workflows need.
    pub async fn feature_set(
        &self,
        ledger: &dyn RentingLedger,
        contract: Address,
    ) -> Result<FeatureSet, LedgerError> {
        Ok(FeatureSet {
            renting: self.has_feature(ledger, contract, Feature::Renting).await?,
            rent_for: self.has_feature(ledger, contract, Feature::RentFor).await?,
            deposit: self.has_feature(ledger, contract, Feature::Deposit).await?,
            off_chain: self
                .has_feature(ledger, contract, Feature::OffChain)
                .await?,
        })
    }
}
