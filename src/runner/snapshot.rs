use std::io::Write;

use crate::csv_utils::write_csv;
use crate::dto::AccountRow;
use crate::stores::AccountsStore;

/// Writes the committed balance of every account to `writer`, sorted by
/// account id for deterministic output. Returns the number of rows written.
///
/// The file can be fed back through `seed_accounts` to restore balances.
///
/// # Errors
/// Returns an error if writing to the output fails.
pub fn write_snapshot<W>(accounts: &AccountsStore, writer: W) -> csv::Result<usize>
where
    W: Write,
{
    let mut snapshot = accounts.snapshot();
    snapshot.sort_by_key(|account| account.id);

    write_csv(writer, snapshot.iter().map(AccountRow::from))
}
