//! Price/deposit validation against the ledger's own rent rules.

use tracing::debug;

use renta_ledger::{Feature, LedgerError, SimulateRentCall};
use renta_types::Address;

use crate::conflict::ConflictReason;
use crate::device::Device;
use crate::engine::RentingEngine;
use crate::error::EngineError;

/// The caller's view of the state the rent is evaluated against.
///
/// Absent fields are filled from the collaborators: the reconciled state for
/// controller and end time, the stored deposit for `deposit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PrevState {
    /// Current controller; [`Address::ZERO`] when free.
    pub controller: Address,
    pub rented_until: u64,
    pub deposit: Option<u128>,
}

/// The state the ledger simulation says the rent would produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostState {
    pub controller: Address,
    pub rented_until: u64,
    /// Stored deposit consumed by this rent.
    pub deposit: u128,
    /// Unix seconds until which the deposit stays locked.
    pub deposit_access: u64,
}

/// A validated rent offer.  Advisory and ephemeral: the ledger re-evaluates
/// everything at submission time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RentQuote {
    pub seconds: u64,
    pub amount: u128,
    pub balance: u128,
    pub receiver: Address,
    /// The previous state the quote was computed against, fully filled.
    pub prev_controller: Address,
    pub prev_rented_until: u64,
    pub prev_deposit: u128,
    pub post: PostState,
}

/// Inputs to [`RentingEngine::check_rent`]; every field is optional and
/// filled from the collaborators when absent.  At least one of `seconds`
/// and `amount` must be given.
#[derive(Debug, Clone, Copy, Default)]
pub struct RentCheckArgs {
    pub seconds: Option<u64>,
    pub amount: Option<u128>,
    pub balance: Option<u128>,
    pub receiver: Option<Address>,
    pub prev: Option<PrevState>,
}

/// The ledger's rejection reasons, in the contract's reason-table order
/// (codes 1 through 10).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimReason {
    RefundUnsupported,
    NotRentable,
    CalendarClosed,
    TokenUnsupported,
    WrongReceiver,
    AlreadyRented,
    ExtensionNotAllowed,
    IncorrectPrice,
    TooShort,
    TooLong,
}

impl SimReason {
    pub fn from_code(code: u16) -> Option<SimReason> {
        Some(match code {
            1 => SimReason::RefundUnsupported,
            2 => SimReason::NotRentable,
            3 => SimReason::CalendarClosed,
            4 => SimReason::TokenUnsupported,
            5 => SimReason::WrongReceiver,
            6 => SimReason::AlreadyRented,
            7 => SimReason::ExtensionNotAllowed,
            8 => SimReason::IncorrectPrice,
            9 => SimReason::TooShort,
            10 => SimReason::TooLong,
            _ => return None,
        })
    }

    pub fn key(&self) -> &'static str {
        match self {
            SimReason::RefundUnsupported => "no_refund_not_supported",
            SimReason::NotRentable => "not_rentable",
            SimReason::CalendarClosed => "calendar_closed",
            SimReason::TokenUnsupported => "token_not_supported",
            SimReason::WrongReceiver => "wrong_token_receiver",
            SimReason::AlreadyRented => "already_rented",
            SimReason::ExtensionNotAllowed => "extension_not_allowed",
            SimReason::IncorrectPrice => "incorrect_price",
            SimReason::TooShort => "too_short",
            SimReason::TooLong => "too_long",
        }
    }
}

/// Why a rent request cannot produce a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    /// The contract cannot evaluate rents off-chain; nothing to validate.
    OffChainUnsupported,
    /// The stored deposit is in a different token than this rent.
    WrongToken,
    /// Neither seconds nor amount were given.
    NoAmount,
    /// The amount does not even cover the fresh deposit.
    AmountTooLow,
    BalanceTooLow,
    /// The ledger simulation rejected the rent.
    Simulation(SimReason),
}

impl InvalidReason {
    pub fn key(&self) -> &'static str {
        match self {
            InvalidReason::OffChainUnsupported => "offchain_not_supported",
            InvalidReason::WrongToken => "wrong_token",
            InvalidReason::NoAmount => "no_amount",
            InvalidReason::AmountTooLow => "amount_too_low",
            InvalidReason::BalanceTooLow => "balance_too_low",
            InvalidReason::Simulation(reason) => reason.key(),
        }
    }
}

/// Outcome of [`RentingEngine::check_rent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RentCheck {
    Quote(RentQuote),
    /// The device is taken (or the extension is blocked) for the interval.
    Conflict(ConflictReason),
    /// The request itself cannot be accepted as posed.
    Invalid(InvalidReason),
}

impl RentingEngine<'_> {
    /// Validate a prospective rent without touching chain state.
    ///
    /// Fills the missing pieces (previous state, deposit, receiver, derived
    /// seconds or amount, balance), then replays the ledger's rent rules via
    /// its read-only simulation entry point.  All rejections are values;
    /// `Err` means a collaborator failed.
    pub async fn check_rent(
        &self,
        device: &Device,
        args: RentCheckArgs,
    ) -> Result<RentCheck, EngineError> {
        if !self.feature(device.contract, Feature::OffChain).await? {
            return Ok(RentCheck::Invalid(InvalidReason::OffChainUnsupported));
        }
        let deposit_supported = self.feature(device.contract, Feature::Deposit).await?;

        let prev = match args.prev {
            Some(prev) => prev,
            None => {
                let state = self.renting_state(device, true).await?;
                PrevState {
                    controller: state.controller.unwrap_or(Address::ZERO),
                    rented_until: state.rented_until,
                    deposit: None,
                }
            }
        };
        let prev_deposit = match prev.deposit {
            Some(deposit) => deposit,
            None if deposit_supported => {
                let stored = self
                    .ledger
                    .stored_deposit(device.contract, device.user, device.id)
                    .await?;
                if stored.amount > 0 && stored.token != device.token {
                    return Ok(RentCheck::Invalid(InvalidReason::WrongToken));
                }
                stored.amount
            }
            None => 0,
        };

        let receiver = match args.receiver {
            Some(receiver) => receiver,
            None => {
                self.ledger
                    .token_receiver(device.contract, device.id, device.token)
                    .await?
            }
        };

        let now = self.ledger.block_time().await?;
        let extending = prev.controller == device.user && prev.rented_until > now;

        let seconds = match args.seconds {
            Some(seconds) => seconds,
            None => {
                let Some(amount) = args.amount else {
                    return Ok(RentCheck::Invalid(InvalidReason::NoAmount));
                };
                // Invert the hourly rate.  A fresh rent pays the deposit
                // shortfall out of the amount first.
                let fresh_deposit = if deposit_supported && !extending {
                    let deposit = self
                        .ledger
                        .deposit(device.contract, device.id, device.user, 3600, device.token)
                        .await?;
                    deposit.saturating_sub(prev_deposit)
                } else {
                    0
                };
                let Some(basis) = amount.checked_sub(fresh_deposit) else {
                    return Ok(RentCheck::Invalid(InvalidReason::AmountTooLow));
                };
                let per_hour = self
                    .ledger
                    .price(device.contract, device.id, device.user, 3600, device.token)
                    .await?;
                if per_hour == 0 {
                    return Ok(RentCheck::Invalid(InvalidReason::AmountTooLow));
                }
                // Round to nearest, matching the forward price computation.
                ((basis * 3600 + per_hour / 2) / per_hour) as u64
            }
        };

        let amount = match args.amount {
            Some(amount) => amount,
            None => {
                let price = self
                    .ledger
                    .price(device.contract, device.id, device.user, seconds, device.token)
                    .await?;
                let top_up = if deposit_supported && !extending {
                    let deposit = self
                        .ledger
                        .deposit(device.contract, device.id, device.user, seconds, device.token)
                        .await?;
                    deposit.saturating_sub(prev_deposit)
                } else {
                    0
                };
                price + top_up
            }
        };

        let balance = match args.balance {
            Some(balance) => balance,
            None => self.ledger.balance(device.user, device.token).await?,
        };
        if balance < amount {
            return Ok(RentCheck::Invalid(InvalidReason::BalanceTooLow));
        }

        let outcome = self
            .ledger
            .simulate_rent(
                device.contract,
                SimulateRentCall {
                    device: device.id,
                    seconds,
                    amount,
                    token: device.token,
                    user: device.user,
                    token_receiver: receiver,
                    controller_before: prev.controller,
                    rented_until_before: prev.rented_until,
                    deposit_before: prev_deposit,
                },
            )
            .await?;
        debug!(
            target: "renta::engine",
            url = %device.url,
            seconds,
            amount,
            code = outcome.error_code,
            "rent simulation"
        );

        match outcome.error_code {
            0 => Ok(RentCheck::Quote(RentQuote {
                seconds,
                amount,
                balance,
                receiver,
                prev_controller: prev.controller,
                prev_rented_until: prev.rented_until,
                prev_deposit,
                post: PostState {
                    controller: device.user,
                    rented_until: outcome.rented_until_after,
                    deposit: outcome.used_deposit,
                    deposit_access: outcome.deposit_access,
                },
            })),
            6 => Ok(RentCheck::Conflict(ConflictReason::AlreadyRented)),
            7 => Ok(RentCheck::Conflict(ConflictReason::ExtensionBlocked)),
            code => match SimReason::from_code(code) {
                Some(reason) => Ok(RentCheck::Invalid(InvalidReason::Simulation(reason))),
                None => Err(EngineError::Ledger(LedgerError::Decode(format!(
                    "unknown rent simulation error code {code}"
                )))),
            },
        }
    }
}
