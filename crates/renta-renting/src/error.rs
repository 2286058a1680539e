//! Engine errors.

use std::fmt;

use renta_ledger::LedgerError;

/// A collaborator failure the engine cannot recover from.
///
/// Only the ledger is load-bearing: hub failures degrade to ledger-only
/// truth inside the reconciler and never surface here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    Ledger(LedgerError),
}

impl EngineError {
    pub fn key(&self) -> &'static str {
        match self {
            EngineError::Ledger(_) => "ledger_failed",
        }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Ledger(err) => write!(f, "ERRKEY: {} : {err}", self.key()),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Ledger(err) => Some(err),
        }
    }
}

impl From<LedgerError> for EngineError {
    fn from(err: LedgerError) -> Self {
        EngineError::Ledger(err)
    }
}
