use std::error::Error;
use std::fs::File;
use std::io::BufWriter;
use std::process;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::{error, info, warn};

use ledger_transfers::logging::init_logging;
use ledger_transfers::{
    gateway, load_transfer_log, seed_accounts, write_snapshot, write_transfer_log, AccountsStore,
    Config, Engine, LedgerService, TransfersStore,
};

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = Config::from_env()?;
    init_logging(&config.log);

    info!(listen_addr = %config.listen_addr, "Starting ledger transfers service");

    let accounts = Arc::new(AccountsStore::new());
    let transfers = Arc::new(TransfersStore::new());
    let engine = Engine::new(Arc::clone(&accounts), Arc::clone(&transfers));
    let service = Arc::new(LedgerService::new(
        Arc::clone(&accounts),
        engine,
        config.request_timeout(),
    ));

    if let Some(path) = &config.seed_accounts_path {
        seed_accounts(path, Arc::clone(&service)).await?;
    }
    if let Some(path) = &config.transfer_log_path {
        if path.exists() {
            load_transfer_log(path, &transfers).await?;
        }
    }

    let listener = TcpListener::bind(&config.listen_addr).await?;
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let mut server = tokio::spawn(gateway::serve(
        listener,
        gateway::router(Arc::clone(&service)),
        async move {
            let _ = stop_rx.await;
        },
    ));

    tokio::select! {
        result = &mut server => result??,
        _ = shutdown_signal() => {
            info!("Shutting down server...");
            let _ = stop_tx.send(());
            match tokio::time::timeout(config.shutdown_grace(), &mut server).await {
                Ok(result) => result??,
                Err(_) => {
                    warn!("In-flight requests did not drain in time");
                    server.abort();
                }
            }
        }
    }

    if let Some(path) = &config.snapshot_path {
        let written = write_snapshot(&accounts, BufWriter::new(File::create(path)?))?;
        info!(path = %path.display(), accounts = written, "Wrote balance snapshot");
    }
    if let Some(path) = &config.transfer_log_path {
        let written = write_transfer_log(&transfers, BufWriter::new(File::create(path)?))?;
        info!(path = %path.display(), transfers = written, "Wrote transfer log");
    }

    info!("Gracefully shutdown");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
