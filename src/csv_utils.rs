//! CSV output helpers.

use serde::Serialize;
use std::io::Write;

/// Serializes every record to `writer` as CSV with a header row.
/// Returns the number of records written.
pub fn write_csv<T, W>(writer: W, records: impl IntoIterator<Item = T>) -> csv::Result<usize>
where
    T: Serialize,
    W: Write,
{
    let mut wtr = csv::Writer::from_writer(writer);
    let mut written = 0;
    for record in records {
        wtr.serialize(record)?;
        written += 1;
    }
    wtr.flush()?;
    Ok(written)
}
