//! Error taxonomy for the ledger.
//!
//! Every error that reaches a caller falls into one of four kinds:
//! - Validation: malformed or out-of-range input, never retried
//! - Business: expected outcomes of correct code (insufficient funds, missing accounts)
//! - System: storage or infrastructure failures, safe to retry
//! - Timeout: the unit of work did not finish before its deadline
//!
//! Each variant carries a stable numeric code that is independent of the
//! transport status code. Code `0` is reserved for success.

use thiserror::Error;

pub type Result<T, E = LedgerError> = std::result::Result<T, E>;

pub const SUCCESS_CODE: i32 = 0;
pub const SUCCESS_MESSAGE: &str = "success";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Business,
    System,
    Timeout,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("system error: {0}")]
    System(String),

    #[error("{0}")]
    InvalidParams(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("request timeout")]
    Timeout,

    #[error("initial balance cannot be negative")]
    NegativeBalance,

    #[error("account with this ID already exists")]
    AccountExists,

    #[error("account ID must be a positive integer")]
    InvalidAccountId,

    #[error("account not found")]
    AccountNotFound,

    #[error("cannot transfer to the same account")]
    SameAccountTransfer,

    #[error("insufficient funds for transfer")]
    InsufficientFunds,

    #[error("source account not found")]
    SourceAccountNotFound,

    #[error("destination account not found")]
    DestinationAccountNotFound,
}

impl LedgerError {
    pub fn code(&self) -> i32 {
        match self {
            LedgerError::System(_) => 1,
            LedgerError::InvalidParams(_) | LedgerError::InvalidAmount(_) => 2,
            LedgerError::Timeout => 3,
            LedgerError::NegativeBalance => 4,
            LedgerError::AccountExists => 5,
            LedgerError::InvalidAccountId => 6,
            LedgerError::AccountNotFound => 7,
            LedgerError::SameAccountTransfer => 8,
            LedgerError::InsufficientFunds => 9,
            LedgerError::SourceAccountNotFound => 10,
            LedgerError::DestinationAccountNotFound => 11,
        }
    }

    /// Message safe to hand back to a caller.
    /// System errors collapse to a generic message; their context is only logged.
    pub fn message(&self) -> String {
        match self {
            LedgerError::System(_) => "system error".to_string(),
            other => other.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::InvalidParams(_)
            | LedgerError::InvalidAmount(_)
            | LedgerError::NegativeBalance
            | LedgerError::InvalidAccountId => ErrorKind::Validation,
            LedgerError::AccountExists
            | LedgerError::AccountNotFound
            | LedgerError::SameAccountTransfer
            | LedgerError::InsufficientFunds
            | LedgerError::SourceAccountNotFound
            | LedgerError::DestinationAccountNotFound => ErrorKind::Business,
            LedgerError::System(_) => ErrorKind::System,
            LedgerError::Timeout => ErrorKind::Timeout,
        }
    }

    /// Only infrastructure failures may be retried, and only by the caller.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::System | ErrorKind::Timeout)
    }

    pub fn http_status(&self) -> u16 {
        match self {
            LedgerError::InvalidParams(_)
            | LedgerError::InvalidAmount(_)
            | LedgerError::NegativeBalance
            | LedgerError::InvalidAccountId
            | LedgerError::SameAccountTransfer
            | LedgerError::InsufficientFunds => 400,
            LedgerError::AccountNotFound
            | LedgerError::SourceAccountNotFound
            | LedgerError::DestinationAccountNotFound => 404,
            LedgerError::Timeout => 408,
            LedgerError::AccountExists => 409,
            LedgerError::System(_) => 500,
        }
    }
}
