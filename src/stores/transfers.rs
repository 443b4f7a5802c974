//! Append-only record of completed transfers.
//!
//! Records are written only by the transfer engine while it holds the row
//! locks of both accounts, and are never updated or removed.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rust_decimal::Decimal;

use super::AccountId;

pub type TransferId = u64;

#[derive(Debug, Clone, PartialEq)]
pub struct Transfer {
    pub id: TransferId,
    pub source_account_id: AccountId,
    pub destination_account_id: AccountId,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct TransfersStore {
    /// Ids are assigned from the position in this log, starting at 1.
    records: Mutex<Vec<Transfer>>,
}

impl TransfersStore {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
        }
    }

    /// Appends a record and returns it with its assigned id.
    /// Only called from inside an open transfer unit of work.
    pub(crate) fn append(
        &self,
        source_account_id: AccountId,
        destination_account_id: AccountId,
        amount: Decimal,
        at: DateTime<Utc>,
    ) -> Transfer {
        let mut records = self.records.lock();
        let transfer = Transfer {
            id: records.len() as TransferId + 1,
            source_account_id,
            destination_account_id,
            amount,
            created_at: at,
            updated_at: at,
        };
        records.push(transfer.clone());
        transfer
    }

    /// Puts back a record read from a transfer log. Records must arrive in
    /// id order with no gaps; returns `false` otherwise and stores nothing.
    pub(crate) fn restore(&self, transfer: Transfer) -> bool {
        let mut records = self.records.lock();
        if transfer.id != records.len() as TransferId + 1 {
            return false;
        }
        records.push(transfer);
        true
    }

    /// Copy of every record in id order.
    pub fn records(&self) -> Vec<Transfer> {
        self.records.lock().clone()
    }

    pub fn get(&self, id: TransferId) -> Option<Transfer> {
        let index = usize::try_from(id.checked_sub(1)?).ok()?;
        self.records.lock().get(index).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
