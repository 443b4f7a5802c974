//! Start-up and shutdown jobs around the ledger: seeding accounts from a CSV
//! file, and saving and reloading balances and the transfer log.
//!
//! Seeding streams the file through a bounded channel to a creator task.
//! Snapshot and log are written synchronously once the server has stopped;
//! a snapshot file is itself a valid seed file.

mod journal;
mod seed;
mod snapshot;

pub use journal::{load_transfer_log, write_transfer_log};
pub use seed::{seed_accounts, SeedSummary};
pub use snapshot::write_snapshot;
