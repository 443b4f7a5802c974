use std::error::Error;
use std::io::Write;
use std::path::Path;

use csv_async::AsyncReaderBuilder;
use tokio::fs::File;
use tokio_stream::StreamExt;
use tracing::info;

use crate::csv_utils::write_csv;
use crate::dto::TransferRow;
use crate::stores::{Transfer, TransfersStore};

type Result<T, E = Box<dyn Error + Send + Sync>> = std::result::Result<T, E>;

/// Writes every completed transfer to `writer` in id order.
/// Returns the number of rows written.
///
/// # Errors
/// Returns an error if writing to the output fails.
pub fn write_transfer_log<W>(transfers: &TransfersStore, writer: W) -> csv::Result<usize>
where
    W: Write,
{
    write_csv(writer, transfers.records().iter().map(TransferRow::from))
}

/// Loads a transfer log written by [`write_transfer_log`] into an empty
/// store, so that new transfers continue the id sequence.
///
/// # Errors
/// Returns an error if the file cannot be read, a row is malformed, or the
/// ids are not consecutive from the store's next id.
pub async fn load_transfer_log<P>(input_path: P, transfers: &TransfersStore) -> Result<usize>
where
    P: AsRef<Path>,
{
    let input_path = input_path.as_ref();
    let file = File::open(input_path).await?;
    let mut csv_reader = AsyncReaderBuilder::new()
        .has_headers(true)
        .create_deserializer(file);

    let mut loaded = 0;
    let mut rows = csv_reader.deserialize::<TransferRow>();
    while let Some(result) = rows.next().await {
        let transfer = Transfer::try_from(result?)?;
        let id = transfer.id;
        if !transfers.restore(transfer) {
            return Err(format!("transfer {} is out of sequence", id).into());
        }
        loaded += 1;
    }

    info!(path = %input_path.display(), transfers = loaded, "Loaded transfer log");
    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_log_reloads_into_fresh_store() -> Result<()> {
        let original = TransfersStore::new();
        let now = Utc::now();
        original.append(1, 2, dec!(100.12345678), now);
        original.append(2, 1, dec!(0.50), now);

        let mut file = tempfile::NamedTempFile::new()?;
        assert_eq!(write_transfer_log(&original, &mut file)?, 2);
        file.flush()?;

        let restored = TransfersStore::new();
        assert_eq!(load_transfer_log(file.path(), &restored).await?, 2);
        assert_eq!(restored.records(), original.records());
        assert_eq!(restored.append(1, 2, dec!(1), now).id, 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_out_of_sequence_log_is_rejected() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(
            file,
            "transfer_id,source_account_id,destination_account_id,amount,created_at,updated_at"
        )?;
        writeln!(file, "2,1,2,5,2024-05-01T12:00:00Z,2024-05-01T12:00:00Z")?;
        file.flush()?;

        let store = TransfersStore::new();
        assert!(load_transfer_log(file.path(), &store).await.is_err());
        assert!(store.is_empty());
        Ok(())
    }
}
