//! renta-ledger
//!
//! Ledger collaborator boundary.  This crate defines **only** the typed
//! contract-call surface the reconciliation engine consumes, the capability
//! (feature) model, and the boundary error type.  No transport, no wire
//! encoding, no engine logic belongs here — concrete clients live elsewhere
//! (the in-memory fixture in `renta-testkit`, a JSON-RPC client in a
//! deployment crate).

pub mod error;
pub mod features;

pub use error::LedgerError;
pub use features::{Feature, FeatureCache, FeatureSet};

use serde::{Deserialize, Serialize};

use renta_types::{Address, Bytes32, DeviceId};

// ---------------------------------------------------------------------------
// Typed call results
// ---------------------------------------------------------------------------

/// Raw renting-state query result as the ledger contract reports it.
///
/// This is source material for reconciliation, not the reconciled view:
/// `free` here is whatever the contract said, and there is no interval list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerRentingState {
    pub rentable: bool,
    pub open: bool,
    pub free: bool,
    pub controller: Address,
    pub rented_until: u64,
    pub rented_from: u64,
}

/// A deposit already held by the contract for `(user, device)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StoredDeposit {
    pub amount: u128,
    pub token: Address,
    /// Unix seconds until which the deposit stays locked.
    pub access: u64,
}

/// Inputs to the off-chain rent-rule simulation entry point.
///
/// The `*_before` fields are the caller's view of the previous state; the
/// contract evaluates the rent against exactly these values so the caller
/// learns whether its view would be accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulateRentCall {
    pub device: DeviceId,
    pub seconds: u64,
    pub amount: u128,
    pub token: Address,
    pub user: Address,
    pub token_receiver: Address,
    pub controller_before: Address,
    pub rented_until_before: u64,
    pub deposit_before: u128,
}

/// Simulation output: `(errorCode, rentedUntilAfter, usedDeposit, depositAccess)`.
///
/// `error_code == 0` means the rent would be accepted; non-zero codes map to
/// the fixed reason table (see `renta-renting`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SimulationOutcome {
    pub error_code: u16,
    pub rented_until_after: u64,
    pub used_deposit: u128,
    pub deposit_access: u64,
}

// ---------------------------------------------------------------------------
// The ledger trait
// ---------------------------------------------------------------------------

/// Typed read/write surface of the renting/ownership/price contract family.
///
/// Implementations must be `Send + Sync` and object-safe: the engine holds a
/// `&dyn RentingLedger`.  Calls are synchronous-looking futures and may fail;
/// the trait performs no retries — retry policy belongs to the client.
///
/// Amounts are `u128` integer token units throughout.  Conversions to any
/// external decimal representation happen at the client wire boundary only.
#[async_trait::async_trait]
pub trait RentingLedger: Send + Sync {
    /// Resolve a namehash node to the registered contract address.
    /// Returns [`Address::ZERO`] when the name is not registered.
    async fn resolve_addr(&self, node: Bytes32) -> Result<Address, LedgerError>;

    /// EIP-165-style interface-support probe for a deployed contract.
    async fn supports_feature(
        &self,
        contract: Address,
        feature: Feature,
    ) -> Result<bool, LedgerError>;

    /// Timestamp of the latest block, unix seconds. Fallback time oracle.
    async fn block_time(&self) -> Result<u64, LedgerError>;

    async fn renting_state(
        &self,
        contract: Address,
        device: DeviceId,
        user: Address,
    ) -> Result<LedgerRentingState, LedgerError>;

    /// Rent price for `seconds`, in `token` units.
    async fn price(
        &self,
        contract: Address,
        device: DeviceId,
        user: Address,
        seconds: u64,
        token: Address,
    ) -> Result<u128, LedgerError>;

    /// Deposit required for a fresh rent of `seconds`, in `token` units.
    async fn deposit(
        &self,
        contract: Address,
        device: DeviceId,
        user: Address,
        seconds: u64,
        token: Address,
    ) -> Result<u128, LedgerError>;

    async fn stored_deposit(
        &self,
        contract: Address,
        user: Address,
        device: DeviceId,
    ) -> Result<StoredDeposit, LedgerError>;

    /// Address that receives the payment for `token` rents of `device`.
    async fn token_receiver(
        &self,
        contract: Address,
        device: DeviceId,
        token: Address,
    ) -> Result<Address, LedgerError>;

    /// Balance of `user`: native currency when `token` is the zero address,
    /// ERC-20-style balance otherwise.
    async fn balance(&self, user: Address, token: Address) -> Result<u128, LedgerError>;

    /// ERC-20 approve, required before a non-native-token rent.
    async fn approve(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
        amount: u128,
    ) -> Result<(), LedgerError>;

    /// Off-chain rent-rule simulation mirroring the contract's own
    /// arithmetic.  Never mutates state.
    async fn simulate_rent(
        &self,
        contract: Address,
        call: SimulateRentCall,
    ) -> Result<SimulationOutcome, LedgerError>;

    /// Submit a rent transaction starting now. Returns the transaction hash.
    /// `value` is the attached native payment (zero for token rents).
    async fn rent(
        &self,
        contract: Address,
        device: DeviceId,
        seconds: u64,
        token: Address,
        from: Address,
        value: u128,
    ) -> Result<Bytes32, LedgerError>;

    /// Submit a rent for another controller and/or start time
    /// (`rentFor` feature).
    #[allow(clippy::too_many_arguments)]
    async fn rent_for(
        &self,
        contract: Address,
        device: DeviceId,
        seconds: u64,
        token: Address,
        controller: Address,
        rented_from: u64,
        payer: Address,
        value: u128,
    ) -> Result<Bytes32, LedgerError>;

    /// Ledger-side availability check for a future interval
    /// (`rentFor` feature).
    async fn can_be_rented(
        &self,
        contract: Address,
        device: DeviceId,
        user: Address,
        start: u64,
        seconds: u64,
    ) -> Result<bool, LedgerError>;

    /// Remove a pending future booking owned by `from` (`rentFor` feature).
    async fn remove_booking(
        &self,
        contract: Address,
        device: DeviceId,
        start: u64,
        from: Address,
    ) -> Result<(), LedgerError>;

    /// Return the device, ending the caller's active booking.
    async fn return_object(
        &self,
        contract: Address,
        device: DeviceId,
        from: Address,
    ) -> Result<(), LedgerError>;

    async fn device_owner(
        &self,
        contract: Address,
        device: DeviceId,
    ) -> Result<Address, LedgerError>;

    /// Tokens accepted as payment for `device`, preference-ordered.
    async fn supported_tokens(
        &self,
        contract: Address,
        device: DeviceId,
    ) -> Result<Vec<Address>, LedgerError>;
}
