pub mod amount;
pub mod config;
mod csv_utils;
pub mod dto;
pub mod engine;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod runner;
pub mod service;
pub mod stores;

pub use config::Config;
pub use engine::{Engine, TransferReceipt};
pub use error::{ErrorKind, LedgerError, Result};
pub use runner::{
    load_transfer_log, seed_accounts, write_snapshot, write_transfer_log, SeedSummary,
};
pub use service::LedgerService;
pub use stores::{Account, AccountId, AccountsStore, Transfer, TransferId, TransfersStore};
