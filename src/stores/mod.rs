//! Storage layer for the ledger. Provides storage for:
//! - Account balances ([`AccountsStore`])
//! - Completed transfer records ([`TransfersStore`])
//!
//! Account rows are individually lockable so that units of work touching
//! disjoint accounts never contend.

mod accounts;
mod transfers;

pub use accounts::{Account, AccountId, AccountsStore, LockedAccount};
pub use transfers::{Transfer, TransferId, TransfersStore};
