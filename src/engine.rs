//! The transfer protocol.
//!
//! A transfer runs as one unit of work:
//! 1. lock both account rows, lower id first, whichever side is the source
//! 2. check the source covers the amount and both new balances are exact
//! 3. debit, credit and append the transfer record
//! 4. release both rows
//!
//! Locking in ascending id order means two transfers over the same pair
//! always queue on the same row first, so no wait cycle can form.
//! Steps 3 and 4 contain no await points: a unit of work that is cancelled
//! (for example by a deadline) is always cancelled before it wrote anything.

use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::debug;

use crate::amount::{ensure_positive, exact_add, exact_sub};
use crate::error::{LedgerError, Result};
use crate::stores::{AccountId, AccountsStore, LockedAccount, Transfer, TransfersStore};

#[derive(Debug, Clone, PartialEq)]
pub struct TransferReceipt {
    pub transfer: Transfer,
    pub source_balance: Decimal,
    pub destination_balance: Decimal,
}

/// Stateless between calls; cloning shares the underlying stores.
#[derive(Clone)]
pub struct Engine {
    accounts: Arc<AccountsStore>,
    transfers: Arc<TransfersStore>,
}

impl Engine {
    pub fn new(accounts: Arc<AccountsStore>, transfers: Arc<TransfersStore>) -> Self {
        Self {
            accounts,
            transfers,
        }
    }

    pub fn accounts(&self) -> &Arc<AccountsStore> {
        &self.accounts
    }

    pub fn transfers(&self) -> &Arc<TransfersStore> {
        &self.transfers
    }

    /// Moves `amount` from `source` to `destination`.
    ///
    /// # Errors
    /// * `SameAccountTransfer`, `InvalidAmount` - rejected before any storage access
    /// * `SourceAccountNotFound`, `DestinationAccountNotFound` - a side does not exist
    /// * `InsufficientFunds` - the source balance is below `amount`
    /// * `InvalidAmount` - a new balance would overflow or need rounding
    ///
    /// On any error no balance changes and no record is written.
    pub async fn transfer(
        &self,
        source: AccountId,
        destination: AccountId,
        amount: Decimal,
    ) -> Result<TransferReceipt> {
        check_preconditions(source, destination, amount)?;

        let unit = UnitOfWork::begin(&self.accounts, source, destination).await?;
        unit.commit(&self.transfers, amount)
    }
}

fn check_preconditions(source: AccountId, destination: AccountId, amount: Decimal) -> Result<()> {
    if source == destination {
        return Err(LedgerError::SameAccountTransfer);
    }
    ensure_positive(amount)
}

/// Both rows of a transfer, held under their exclusive locks.
/// Dropping it without committing aborts the transfer.
struct UnitOfWork {
    source: LockedAccount,
    destination: LockedAccount,
}

impl UnitOfWork {
    async fn begin(
        accounts: &AccountsStore,
        source: AccountId,
        destination: AccountId,
    ) -> Result<Self> {
        let (first, second) = lock_order(source, destination);

        let first_row = lock_side(accounts, first, source).await?;
        debug!(account_id = first, "locked first account");
        let second_row = lock_side(accounts, second, source).await?;
        debug!(account_id = second, "locked second account");

        let (source, destination) = if first == source {
            (first_row, second_row)
        } else {
            (second_row, first_row)
        };
        Ok(Self {
            source,
            destination,
        })
    }

    fn commit(mut self, ledger: &TransfersStore, amount: Decimal) -> Result<TransferReceipt> {
        let source_before = self.source.balance();
        let destination_before = self.destination.balance();

        if source_before < amount {
            return Err(LedgerError::InsufficientFunds);
        }
        // Both sides must move by exactly `amount`, or neither moves.
        let source_after = exact_sub(source_before, amount).ok_or_else(|| {
            LedgerError::InvalidAmount("amount is below the precision of the source balance".into())
        })?;
        let destination_after = exact_add(destination_before, amount).ok_or_else(|| {
            LedgerError::InvalidAmount("destination balance out of range".into())
        })?;

        let now = Utc::now();
        let transfer = ledger.append(self.source.id(), self.destination.id(), amount, now);
        self.source.set_balance(source_after, now);
        self.destination.set_balance(destination_after, now);

        Ok(TransferReceipt {
            transfer,
            source_balance: source_after,
            destination_balance: destination_after,
        })
    }
}

/// Ascending id order, independent of transfer direction.
fn lock_order(a: AccountId, b: AccountId) -> (AccountId, AccountId) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

async fn lock_side(
    accounts: &AccountsStore,
    id: AccountId,
    source: AccountId,
) -> Result<LockedAccount> {
    accounts.lock_for_update(id).await.ok_or(if id == source {
        LedgerError::SourceAccountNotFound
    } else {
        LedgerError::DestinationAccountNotFound
    })
}
