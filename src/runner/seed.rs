use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use csv_async::{AsyncReaderBuilder, Error as CsvError, Trim};
use tokio::fs::File;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tracing::{info, warn};

use crate::dto::{AccountSeedRow, CreateAccountRequest};
use crate::error::LedgerError;
use crate::service::LedgerService;

const BUFFER_SIZE: usize = 1024;

type Result<T, E = Box<dyn Error + Send + Sync>> = std::result::Result<T, E>;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub created: usize,
    pub duplicates: usize,
    pub rejected: usize,
}

/// Creates the accounts listed in a CSV file (`account_id,initial_balance`,
/// or a balance snapshot).
/// Spawns two tasks:
/// * CSV reader - streams rows from the file and sends them to the creator via channel.
/// * Creator - creates each account through the service until the channel is closed.
///
/// Rows failing validation or naming an existing account are counted and skipped.
///
/// # Errors
/// Returns an error if the file cannot be read or the CSV is malformed.
pub async fn seed_accounts<P>(input_path: P, service: Arc<LedgerService>) -> Result<SeedSummary>
where
    P: AsRef<Path>,
{
    let (tx, rx) = mpsc::channel(BUFFER_SIZE);
    let input_path = input_path.as_ref().to_owned();

    let reader_handle = tokio::spawn(read_seed_rows(input_path.clone(), tx));
    let creator_handle = tokio::spawn(create_accounts(rx, service));

    // Wait for reader to finish and propagate any errors
    reader_handle.await??;
    let summary = creator_handle.await?;

    info!(
        path = %input_path.display(),
        created = summary.created,
        duplicates = summary.duplicates,
        rejected = summary.rejected,
        "Seeded accounts"
    );
    Ok(summary)
}

async fn read_seed_rows(
    input_path: impl AsRef<Path> + Send,
    tx: mpsc::Sender<AccountSeedRow>,
) -> Result<(), CsvError> {
    let file = File::open(input_path).await?;
    let mut csv_reader = AsyncReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .create_deserializer(file);

    let mut records = csv_reader.deserialize::<AccountSeedRow>();
    while let Some(result) = records.next().await {
        let row = result?;
        if tx.send(row).await.is_err() {
            // Creator gone, nothing left to do
            break;
        }
    }
    Ok(())
}

async fn create_accounts(
    mut rx: mpsc::Receiver<AccountSeedRow>,
    service: Arc<LedgerService>,
) -> SeedSummary {
    let mut summary = SeedSummary::default();
    while let Some(row) = rx.recv().await {
        let req = CreateAccountRequest {
            account_id: row.account_id,
            initial_balance: row.initial_balance,
        };
        match service.create_account(&req).await {
            Ok(()) => summary.created += 1,
            Err(LedgerError::AccountExists) => summary.duplicates += 1,
            Err(e) => {
                warn!(account_id = req.account_id, error = %e, "Skipping seed row");
                summary.rejected += 1;
            }
        }
    }
    summary
}
