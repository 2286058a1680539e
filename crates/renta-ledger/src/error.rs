//! Boundary error type for ledger clients.

use std::fmt;

/// Errors a [`crate::RentingLedger`] implementation may return.
///
/// These are collaborator failures: the engine propagates them as fatal and
/// never converts them into recoverable rent outcomes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Network or transport failure reaching the ledger node.
    Transport(String),
    /// The node accepted the request but the call itself failed
    /// (revert, out of gas, bad method).
    Call {
        method: &'static str,
        message: String,
    },
    /// A response payload could not be decoded into the typed result.
    Decode(String),
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerError::Transport(msg) => write!(f, "ledger transport error: {msg}"),
            LedgerError::Call { method, message } => {
                write!(f, "ledger call '{method}' failed: {message}")
            }
            LedgerError::Decode(msg) => write!(f, "ledger decode error: {msg}"),
        }
    }
}

impl std::error::Error for LedgerError {}
