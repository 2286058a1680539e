//! In-memory ledger double.

use std::collections::BTreeMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use renta_ledger::{
    Feature, LedgerError, LedgerRentingState, RentingLedger, SimulateRentCall, SimulationOutcome,
    StoredDeposit,
};
use renta_types::{Address, Bytes32, DeviceId};

// Rent-rule simulation error codes, in the contract's reason table order.
const SIM_OK: u16 = 0;
const SIM_NO_REFUND: u16 = 1;
const SIM_NOT_RENTABLE: u16 = 2;
const SIM_CALENDAR_CLOSED: u16 = 3;
const SIM_TOKEN_UNSUPPORTED: u16 = 4;
const SIM_WRONG_RECEIVER: u16 = 5;
const SIM_ALREADY_RENTED: u16 = 6;
const SIM_EXTENSION_NOT_ALLOWED: u16 = 7;
const SIM_INCORRECT_PRICE: u16 = 8;
const SIM_TOO_SHORT: u16 = 9;
const SIM_TOO_LONG: u16 = 10;

/// Declarative per-device fixture state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceFixture {
    pub rentable: bool,
    pub open: bool,
    pub controller: Address,
    pub rented_from: u64,
    pub rented_until: u64,
    /// Rent price in token units per hour; price scales linearly by second.
    pub price_per_hour: u128,
    /// Flat deposit required for a fresh (non-extension) rent.
    pub deposit: u128,
    pub min_seconds: u64,
    /// Zero means unbounded.
    pub max_seconds: u64,
    pub owner: Address,
    pub token_receiver: Address,
    pub tokens: Vec<Address>,
    pub calendar_closed: bool,
    pub allow_extension: bool,
    /// Mirrors the contract's no-refund guard for tokens it cannot pay back.
    pub refund_blocked: bool,
}

impl Default for DeviceFixture {
    fn default() -> Self {
        Self {
            rentable: true,
            open: true,
            controller: Address::ZERO,
            rented_from: 0,
            rented_until: 0,
            price_per_hour: 0,
            deposit: 0,
            min_seconds: 0,
            max_seconds: 0,
            owner: Address::ZERO,
            token_receiver: Address::ZERO,
            tokens: vec![Address::ZERO],
            calendar_closed: false,
            allow_extension: true,
            refund_blocked: false,
        }
    }
}

impl DeviceFixture {
    /// Linear hourly pricing, integer token units.
    pub fn price(&self, seconds: u64) -> u128 {
        seconds as u128 * self.price_per_hour / 3600
    }
}

/// A rent transaction the fixture accepted, kept for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RentRecord {
    pub contract: Address,
    pub device: DeviceId,
    pub seconds: u64,
    pub token: Address,
    pub controller: Address,
    pub rented_from: u64,
    pub payer: Address,
    pub value: u128,
}

#[derive(Debug, Default)]
struct Inner {
    now: u64,
    names: BTreeMap<Bytes32, Address>,
    features: BTreeMap<(Address, Feature), bool>,
    devices: BTreeMap<(Address, DeviceId), DeviceFixture>,
    balances: BTreeMap<(Address, Address), u128>,
    deposits: BTreeMap<(Address, Address, DeviceId), StoredDeposit>,
    approvals: Vec<(Address, Address, Address, u128)>,
    rents: Vec<RentRecord>,
    fail_next: Option<LedgerError>,
    tx_count: u8,
}

/// In-memory [`RentingLedger`] built from declarative fixtures.
///
/// All state sits behind one mutex; every trait method locks, reads or
/// mutates, and returns. `fail_next` injects a one-shot error into whichever
/// call comes next.
#[derive(Debug, Default)]
pub struct FixtureLedger {
    inner: Mutex<Inner>,
}

impl FixtureLedger {
    pub fn new(now: u64) -> Self {
        let ledger = Self::default();
        ledger.lock().now = now;
        ledger
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("fixture ledger poisoned")
    }

    pub fn set_now(&self, now: u64) {
        self.lock().now = now;
    }

    pub fn register_name(&self, node: Bytes32, contract: Address) {
        self.lock().names.insert(node, contract);
    }

    pub fn set_feature(&self, contract: Address, feature: Feature, supported: bool) {
        self.lock().features.insert((contract, feature), supported);
    }

    pub fn insert_device(&self, contract: Address, device: DeviceId, fixture: DeviceFixture) {
        self.lock().devices.insert((contract, device), fixture);
    }

    pub fn update_device(
        &self,
        contract: Address,
        device: DeviceId,
        apply: impl FnOnce(&mut DeviceFixture),
    ) {
        if let Some(fixture) = self.lock().devices.get_mut(&(contract, device)) {
            apply(fixture);
        }
    }

    pub fn set_balance(&self, user: Address, token: Address, amount: u128) {
        self.lock().balances.insert((user, token), amount);
    }

    pub fn set_stored_deposit(
        &self,
        contract: Address,
        user: Address,
        device: DeviceId,
        deposit: StoredDeposit,
    ) {
        self.lock().deposits.insert((contract, user, device), deposit);
    }

    /// Make the next trait call fail with `err`, whatever it is.
    pub fn fail_next(&self, err: LedgerError) {
        self.lock().fail_next = Some(err);
    }

    pub fn approvals(&self) -> Vec<(Address, Address, Address, u128)> {
        self.lock().approvals.clone()
    }

    pub fn rents(&self) -> Vec<RentRecord> {
        self.lock().rents.clone()
    }

    fn take_failure(inner: &mut Inner) -> Result<(), LedgerError> {
        match inner.fail_next.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn device(
        inner: &Inner,
        contract: Address,
        device: DeviceId,
        method: &'static str,
    ) -> Result<DeviceFixture, LedgerError> {
        inner
            .devices
            .get(&(contract, device))
            .cloned()
            .ok_or(LedgerError::Call {
                method,
                message: format!("unknown device {device} at {contract}"),
            })
    }

    fn next_tx(inner: &mut Inner) -> Bytes32 {
        inner.tx_count += 1;
        let mut bytes = [0u8; 32];
        bytes[31] = inner.tx_count;
        Bytes32(bytes)
    }

    fn simulate(fixture: &DeviceFixture, now: u64, call: &SimulateRentCall) -> SimulationOutcome {
        let failed = |code: u16| SimulationOutcome {
            error_code: code,
            ..SimulationOutcome::default()
        };

        let extending =
            call.controller_before == call.user && call.rented_until_before > now;

        if fixture.refund_blocked {
            return failed(SIM_NO_REFUND);
        }
        if !fixture.rentable {
            return failed(SIM_NOT_RENTABLE);
        }
        if fixture.calendar_closed {
            return failed(SIM_CALENDAR_CLOSED);
        }
        if !fixture.tokens.contains(&call.token) {
            return failed(SIM_TOKEN_UNSUPPORTED);
        }
        if call.token_receiver != fixture.token_receiver {
            return failed(SIM_WRONG_RECEIVER);
        }
        if !call.controller_before.is_zero() && call.rented_until_before > now && !extending {
            return failed(SIM_ALREADY_RENTED);
        }
        if extending && !fixture.allow_extension {
            return failed(SIM_EXTENSION_NOT_ALLOWED);
        }
        let expected = fixture.price(call.seconds)
            + if extending {
                0
            } else {
                fixture.deposit.saturating_sub(call.deposit_before)
            };
        if call.amount != expected {
            return failed(SIM_INCORRECT_PRICE);
        }
        if call.seconds < fixture.min_seconds {
            return failed(SIM_TOO_SHORT);
        }
        if fixture.max_seconds > 0 && call.seconds > fixture.max_seconds {
            return failed(SIM_TOO_LONG);
        }

        let start = if extending { call.rented_until_before } else { now };
        SimulationOutcome {
            error_code: SIM_OK,
            rented_until_after: start + call.seconds,
            used_deposit: if extending {
                0
            } else {
                fixture.deposit.min(call.deposit_before)
            },
            deposit_access: start + call.seconds,
        }
    }
}

#[async_trait::async_trait]
impl RentingLedger for FixtureLedger {
    async fn resolve_addr(&self, node: Bytes32) -> Result<Address, LedgerError> {
        let mut inner = self.lock();
        Self::take_failure(&mut inner)?;
        Ok(inner.names.get(&node).copied().unwrap_or(Address::ZERO))
    }

    async fn supports_feature(
        &self,
        contract: Address,
        feature: Feature,
    ) -> Result<bool, LedgerError> {
        let mut inner = self.lock();
        Self::take_failure(&mut inner)?;
        Ok(inner.features.get(&(contract, feature)).copied().unwrap_or(false))
    }

    async fn block_time(&self) -> Result<u64, LedgerError> {
        let mut inner = self.lock();
        Self::take_failure(&mut inner)?;
        Ok(inner.now)
    }

    async fn renting_state(
        &self,
        contract: Address,
        device: DeviceId,
        _user: Address,
    ) -> Result<LedgerRentingState, LedgerError> {
        let mut inner = self.lock();
        Self::take_failure(&mut inner)?;
        let fixture = Self::device(&inner, contract, device, "renting_state")?;
        Ok(LedgerRentingState {
            rentable: fixture.rentable,
            open: fixture.open,
            free: fixture.rented_until == 0,
            controller: fixture.controller,
            rented_until: fixture.rented_until,
            rented_from: fixture.rented_from,
        })
    }

    async fn price(
        &self,
        contract: Address,
        device: DeviceId,
        _user: Address,
        seconds: u64,
        _token: Address,
    ) -> Result<u128, LedgerError> {
        let mut inner = self.lock();
        Self::take_failure(&mut inner)?;
        Ok(Self::device(&inner, contract, device, "price")?.price(seconds))
    }

    async fn deposit(
        &self,
        contract: Address,
        device: DeviceId,
        _user: Address,
        _seconds: u64,
        _token: Address,
    ) -> Result<u128, LedgerError> {
        let mut inner = self.lock();
        Self::take_failure(&mut inner)?;
        Ok(Self::device(&inner, contract, device, "deposit")?.deposit)
    }

    async fn stored_deposit(
        &self,
        contract: Address,
        user: Address,
        device: DeviceId,
    ) -> Result<StoredDeposit, LedgerError> {
        let mut inner = self.lock();
        Self::take_failure(&mut inner)?;
        Ok(inner
            .deposits
            .get(&(contract, user, device))
            .copied()
            .unwrap_or_default())
    }

    async fn token_receiver(
        &self,
        contract: Address,
        device: DeviceId,
        _token: Address,
    ) -> Result<Address, LedgerError> {
        let mut inner = self.lock();
        Self::take_failure(&mut inner)?;
        Ok(Self::device(&inner, contract, device, "token_receiver")?.token_receiver)
    }

    async fn balance(&self, user: Address, token: Address) -> Result<u128, LedgerError> {
        let mut inner = self.lock();
        Self::take_failure(&mut inner)?;
        Ok(inner.balances.get(&(user, token)).copied().unwrap_or(0))
    }

    async fn approve(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
        amount: u128,
    ) -> Result<(), LedgerError> {
        let mut inner = self.lock();
        Self::take_failure(&mut inner)?;
        inner.approvals.push((token, owner, spender, amount));
        Ok(())
    }

    async fn simulate_rent(
        &self,
        contract: Address,
        call: SimulateRentCall,
    ) -> Result<SimulationOutcome, LedgerError> {
        let mut inner = self.lock();
        Self::take_failure(&mut inner)?;
        let fixture = Self::device(&inner, contract, call.device, "simulate_rent")?;
        Ok(Self::simulate(&fixture, inner.now, &call))
    }

    async fn rent(
        &self,
        contract: Address,
        device: DeviceId,
        seconds: u64,
        token: Address,
        from: Address,
        value: u128,
    ) -> Result<Bytes32, LedgerError> {
        let mut inner = self.lock();
        Self::take_failure(&mut inner)?;
        let now = inner.now;
        let fixture = inner
            .devices
            .get_mut(&(contract, device))
            .ok_or(LedgerError::Call {
                method: "rent",
                message: format!("unknown device {device} at {contract}"),
            })?;
        fixture.controller = from;
        fixture.rented_from = now;
        fixture.rented_until = now + seconds;
        inner.rents.push(RentRecord {
            contract,
            device,
            seconds,
            token,
            controller: from,
            rented_from: now,
            payer: from,
            value,
        });
        Ok(Self::next_tx(&mut inner))
    }

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
    ) -> Result<Bytes32, LedgerError> {
        let mut inner = self.lock();
        Self::take_failure(&mut inner)?;
        let now = inner.now;
        let start = if rented_from == 0 { now } else { rented_from };
        let fixture = inner
            .devices
            .get_mut(&(contract, device))
            .ok_or(LedgerError::Call {
                method: "rent_for",
                message: format!("unknown device {device} at {contract}"),
            })?;
        fixture.controller = controller;
        fixture.rented_from = start;
        fixture.rented_until = start + seconds;
        inner.rents.push(RentRecord {
            contract,
            device,
            seconds,
            token,
            controller,
            rented_from: start,
            payer,
            value,
        });
        Ok(Self::next_tx(&mut inner))
    }

    async fn can_be_rented(
        &self,
        contract: Address,
        device: DeviceId,
        _user: Address,
        start: u64,
        seconds: u64,
    ) -> Result<bool, LedgerError> {
        let mut inner = self.lock();
        Self::take_failure(&mut inner)?;
        let fixture = Self::device(&inner, contract, device, "can_be_rented")?;
        if !fixture.rentable {
            return Ok(false);
        }
        // Half-open interval check against the single recorded booking.
        let end = start + seconds;
        Ok(fixture.rented_until <= start || fixture.rented_from >= end)
    }

    async fn remove_booking(
        &self,
        contract: Address,
        device: DeviceId,
        start: u64,
        from: Address,
    ) -> Result<(), LedgerError> {
        let mut inner = self.lock();
        Self::take_failure(&mut inner)?;
        let fixture = inner
            .devices
            .get_mut(&(contract, device))
            .ok_or(LedgerError::Call {
                method: "remove_booking",
                message: format!("unknown device {device} at {contract}"),
            })?;
        if fixture.controller != from || fixture.rented_from != start {
            return Err(LedgerError::Call {
                method: "remove_booking",
                message: "no matching booking".to_string(),
            });
        }
        fixture.controller = Address::ZERO;
        fixture.rented_from = 0;
        fixture.rented_until = 0;
        Ok(())
    }

    async fn return_object(
        &self,
        contract: Address,
        device: DeviceId,
        from: Address,
    ) -> Result<(), LedgerError> {
        let mut inner = self.lock();
        Self::take_failure(&mut inner)?;
        let fixture = inner
            .devices
            .get_mut(&(contract, device))
            .ok_or(LedgerError::Call {
                method: "return_object",
                message: format!("unknown device {device} at {contract}"),
            })?;
        if fixture.controller != from {
            return Err(LedgerError::Call {
                method: "return_object",
                message: "caller does not control the booking".to_string(),
            });
        }
        fixture.controller = Address::ZERO;
        fixture.rented_from = 0;
        fixture.rented_until = 0;
        Ok(())
    }

    async fn device_owner(
        &self,
        contract: Address,
        device: DeviceId,
    ) -> Result<Address, LedgerError> {
        let mut inner = self.lock();
        Self::take_failure(&mut inner)?;
        Ok(Self::device(&inner, contract, device, "device_owner")?.owner)
    }

    async fn supported_tokens(
        &self,
        contract: Address,
        device: DeviceId,
    ) -> Result<Vec<Address>, LedgerError> {
        let mut inner = self.lock();
        Self::take_failure(&mut inner)?;
        Ok(Self::device(&inner, contract, device, "supported_tokens")?.tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u8) -> Address {
        let mut bytes = [0u8; 20];
        bytes[19] = n;
        Address(bytes)
    }

    fn device() -> DeviceId {
        DeviceId::from_parts([7u8; 24], 1)
    }

    fn call(fixture: &DeviceFixture, seconds: u64, amount: u128, user: Address) -> SimulateRentCall {
        SimulateRentCall {
            device: device(),
            seconds,
            amount,
            token: Address::ZERO,
            user,
            token_receiver: fixture.token_receiver,
            controller_before: Address::ZERO,
            rented_until_before: 0,
            deposit_before: 0,
        }
    }

    #[test]
    fn simulation_accepts_the_exact_price_plus_deposit() {
        let fixture = DeviceFixture {
            price_per_hour: 10,
            deposit: 5,
            ..DeviceFixture::default()
        };
        let user = addr(9);
        let outcome = FixtureLedger::simulate(&fixture, 1_000, &call(&fixture, 3600, 15, user));
        assert_eq!(outcome.error_code, SIM_OK);
        assert_eq!(outcome.rented_until_after, 1_000 + 3600);

        let outcome = FixtureLedger::simulate(&fixture, 1_000, &call(&fixture, 3600, 14, user));
        assert_eq!(outcome.error_code, SIM_INCORRECT_PRICE);
    }

    #[test]
    fn simulation_rejects_occupied_device_but_allows_extension() {
        let fixture = DeviceFixture {
            price_per_hour: 10,
            ..DeviceFixture::default()
        };
        let user = addr(9);
        let other = addr(8);
        let mut c = call(&fixture, 3600, 10, user);
        c.controller_before = other;
        c.rented_until_before = 2_000;
        assert_eq!(
            FixtureLedger::simulate(&fixture, 1_000, &c).error_code,
            SIM_ALREADY_RENTED
        );

        c.controller_before = user;
        let outcome = FixtureLedger::simulate(&fixture, 1_000, &c);
        assert_eq!(outcome.error_code, SIM_OK);
        assert_eq!(outcome.rented_until_after, 2_000 + 3600);
    }

    #[test]
    fn simulation_enforces_duration_bounds() {
        let fixture = DeviceFixture {
            price_per_hour: 3600,
            min_seconds: 100,
            max_seconds: 7200,
            ..DeviceFixture::default()
        };
        let user = addr(9);
        assert_eq!(
            FixtureLedger::simulate(&fixture, 0, &call(&fixture, 99, 99, user)).error_code,
            SIM_TOO_SHORT
        );
        assert_eq!(
            FixtureLedger::simulate(&fixture, 0, &call(&fixture, 7201, 7201, user)).error_code,
            SIM_TOO_LONG
        );
    }

    #[tokio::test]
    async fn fail_next_hits_exactly_one_call() {
        let ledger = FixtureLedger::new(100);
        ledger.fail_next(LedgerError::Transport("rpc down".to_string()));
        assert!(ledger.block_time().await.is_err());
        assert_eq!(ledger.block_time().await.unwrap(), 100);
    }
}
