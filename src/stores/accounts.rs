use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

pub type AccountId = u64;

#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: AccountId,
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A row is its committed value plus the exclusive lock a unit of work holds
/// while deciding how to change it. Readers only ever see `committed`, which
/// is written by the lock holder in one step at commit time.
struct Row {
    lock: Arc<Mutex<()>>,
    committed: RwLock<Account>,
}

impl Row {
    fn new(account: Account) -> Self {
        Self {
            lock: Arc::new(Mutex::new(())),
            committed: RwLock::new(account),
        }
    }
}

#[derive(Default)]
pub struct AccountsStore {
    rows: RwLock<HashMap<AccountId, Arc<Row>>>,
}

impl AccountsStore {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
        }
    }

    /// Inserts a new account unless one with the same id exists.
    /// Returns `false` for a duplicate and leaves the existing row untouched.
    ///
    /// Callers validate the id and reject negative balances before calling.
    pub fn create(&self, id: AccountId, initial_balance: Decimal) -> bool {
        let now = Utc::now();
        match self.rows.write().entry(id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(Row::new(Account {
                    id,
                    balance: initial_balance,
                    created_at: now,
                    updated_at: now,
                })));
                true
            }
        }
    }

    /// Point lookup of the last committed state. Does not take the row lock,
    /// so it never queues behind an in-flight transfer.
    pub fn get(&self, id: AccountId) -> Option<Account> {
        let row = self.row(id)?;
        let account = row.committed.read().clone();
        Some(account)
    }

    /// Acquires the exclusive lock on a row for the caller's unit of work.
    /// The lock is released when the returned handle is dropped.
    pub async fn lock_for_update(&self, id: AccountId) -> Option<LockedAccount> {
        let row = self.row(id)?;
        let guard = Arc::clone(&row.lock).lock_owned().await;
        Some(LockedAccount { row, _guard: guard })
    }

    /// Committed state of every account, in no particular order.
    pub fn snapshot(&self) -> Vec<Account> {
        self.rows
            .read()
            .values()
            .map(|row| row.committed.read().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // The map lock is never held across an await.
    fn row(&self, id: AccountId) -> Option<Arc<Row>> {
        self.rows.read().get(&id).cloned()
    }
}

/// An account row held under its exclusive lock.
pub struct LockedAccount {
    row: Arc<Row>,
    _guard: OwnedMutexGuard<()>,
}

impl LockedAccount {
    pub fn id(&self) -> AccountId {
        self.row.committed.read().id
    }

    /// Only the lock holder writes the row, so this is current.
    pub fn balance(&self) -> Decimal {
        self.row.committed.read().balance
    }

    /// Commits a new balance. `updated_at` never moves backwards.
    pub(crate) fn set_balance(&mut self, balance: Decimal, at: DateTime<Utc>) {
        let mut account = self.row.committed.write();
        account.balance = balance;
        account.updated_at = at.max(account.updated_at);
    }
}
