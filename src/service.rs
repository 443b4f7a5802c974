//! Request-level operations on the ledger.
//!
//! Validates raw inputs, runs each unit of work under a deadline and logs
//! the outcome. Business rejections are logged at `warn`, system failures at
//! `error`.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::amount::{format_decimal, parse_initial_balance, parse_transfer_amount};
use crate::dto::{CreateAccountRequest, TransferRequest};
use crate::engine::{Engine, TransferReceipt};
use crate::error::{ErrorKind, LedgerError, Result};
use crate::stores::{Account, AccountId, AccountsStore};

pub struct LedgerService {
    accounts: Arc<AccountsStore>,
    engine: Engine,
    deadline: Duration,
}

impl LedgerService {
    pub fn new(accounts: Arc<AccountsStore>, engine: Engine, deadline: Duration) -> Self {
        Self {
            accounts,
            engine,
            deadline,
        }
    }

    pub async fn create_account(&self, req: &CreateAccountRequest) -> Result<()> {
        let id = account_id(req.account_id)?;
        let balance = parse_initial_balance(&req.initial_balance).inspect_err(|e| {
            warn!(account_id = req.account_id, error = %e, "Rejected create account request");
        })?;

        info!(account_id = id, balance = %format_decimal(balance), "Attempting to create account");

        let created = self
            .with_deadline(async { Ok(self.accounts.create(id, balance)) })
            .await?;
        if !created {
            warn!(account_id = id, "Account already exists");
            return Err(LedgerError::AccountExists);
        }

        info!(account_id = id, balance = %format_decimal(balance), "Account created successfully");
        Ok(())
    }

    pub async fn get_account(&self, raw_id: i64) -> Result<Account> {
        let id = account_id(raw_id)?;
        let account = self.accounts.get(id).ok_or_else(|| {
            warn!(account_id = id, "Account not found");
            LedgerError::AccountNotFound
        })?;

        info!(account_id = id, balance = %format_decimal(account.balance), "Account retrieved");
        Ok(account)
    }

    pub async fn transfer(&self, req: &TransferRequest) -> Result<TransferReceipt> {
        let source = transfer_side(req.source_account_id, "source_account_id")?;
        let destination = transfer_side(req.destination_account_id, "destination_account_id")?;
        if source == destination {
            return Err(LedgerError::SameAccountTransfer);
        }
        let amount = parse_transfer_amount(&req.amount)?;

        info!(
            source_account_id = source,
            destination_account_id = destination,
            amount = %format_decimal(amount),
            "Processing transfer request"
        );

        let receipt = self
            .with_deadline(self.engine.transfer(source, destination, amount))
            .await
            .inspect_err(|e| {
                log_failure(e, "Transfer processing failed");
            })?;

        info!(
            transfer_id = receipt.transfer.id,
            source_account_id = source,
            destination_account_id = destination,
            amount = %format_decimal(amount),
            source_balance = %format_decimal(receipt.source_balance),
            destination_balance = %format_decimal(receipt.destination_balance),
            "Transfer completed successfully"
        );
        Ok(receipt)
    }

    /// Abandoning the future on expiry drops any row locks it holds.
    async fn with_deadline<T, F>(&self, work: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::time::timeout(self.deadline, work)
            .await
            .map_err(|_| LedgerError::Timeout)?
    }
}

fn account_id(raw: i64) -> Result<AccountId> {
    match AccountId::try_from(raw) {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(LedgerError::InvalidAccountId),
    }
}

fn transfer_side(raw: i64, field: &str) -> Result<AccountId> {
    account_id(raw)
        .map_err(|_| LedgerError::InvalidParams(format!("{} must be a positive integer", field)))
}

fn log_failure(err: &LedgerError, context: &str) {
    match err.kind() {
        ErrorKind::System | ErrorKind::Timeout => error!(error = %err, "{}", context),
        ErrorKind::Business | ErrorKind::Validation => warn!(error = %err, "{}", context),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::TransfersStore;
    use rust_decimal_macros::dec;

    fn service_with_deadline(deadline: Duration) -> LedgerService {
        let accounts = Arc::new(AccountsStore::new());
        let engine = Engine::new(Arc::clone(&accounts), Arc::new(TransfersStore::new()));
        LedgerService::new(accounts, engine, deadline)
    }

    fn service() -> LedgerService {
        service_with_deadline(Duration::from_secs(5))
    }

    fn create(id: i64, balance: &str) -> CreateAccountRequest {
        CreateAccountRequest {
            account_id: id,
            initial_balance: balance.to_string(),
        }
    }

    fn transfer(source: i64, destination: i64, amount: &str) -> TransferRequest {
        TransferRequest {
            source_account_id: source,
            destination_account_id: destination,
            amount: amount.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let service = service();
        service.create_account(&create(1, "100.12345678")).await.unwrap();
        assert_eq!(
            service.get_account(1).await.unwrap().balance,
            dec!(100.12345678)
        );
    }

    #[tokio::test]
    async fn test_create_validation() {
        let service = service();
        assert_eq!(
            service.create_account(&create(0, "1")).await,
            Err(LedgerError::InvalidAccountId)
        );
        assert_eq!(
            service.create_account(&create(-4, "1")).await,
            Err(LedgerError::InvalidAccountId)
        );
        assert_eq!(
            service.create_account(&create(1, "-50.00")).await,
            Err(LedgerError::NegativeBalance)
        );
        assert!(matches!(
            service.create_account(&create(1, "ten")).await,
            Err(LedgerError::InvalidParams(_))
        ));
        assert_eq!(
            service.get_account(1).await,
            Err(LedgerError::AccountNotFound)
        );
    }

    #[tokio::test]
    async fn test_duplicate_create_reports_exists() {
        let service = service();
        service.create_account(&create(3, "1")).await.unwrap();
        assert_eq!(
            service.create_account(&create(3, "2")).await,
            Err(LedgerError::AccountExists)
        );
        assert_eq!(service.get_account(3).await.unwrap().balance, dec!(1));
    }

    #[tokio::test]
    async fn test_get_rejects_non_positive_id() {
        let service = service();
        assert_eq!(
            service.get_account(0).await,
            Err(LedgerError::InvalidAccountId)
        );
    }

    #[tokio::test]
    async fn test_transfer_validation() {
        let service = service();
        assert!(matches!(
            service.transfer(&transfer(0, 2, "1")).await,
            Err(LedgerError::InvalidParams(_))
        ));
        assert_eq!(
            service.transfer(&transfer(2, 2, "1")).await,
            Err(LedgerError::SameAccountTransfer)
        );
        assert!(matches!(
            service.transfer(&transfer(1, 2, "x")).await,
            Err(LedgerError::InvalidParams(_))
        ));
        assert!(matches!(
            service.transfer(&transfer(1, 2, "0")).await,
            Err(LedgerError::InvalidAmount(_))
        ));
    }

    #[tokio::test]
    async fn test_transfer_times_out_while_row_is_held() {
        let service = service_with_deadline(Duration::from_millis(20));
        service.create_account(&create(1, "10")).await.unwrap();
        service.create_account(&create(2, "10")).await.unwrap();

        let held = service.accounts.lock_for_update(1).await.unwrap();
        assert_eq!(
            service.transfer(&transfer(1, 2, "5")).await,
            Err(LedgerError::Timeout)
        );
        drop(held);

        assert_eq!(service.get_account(1).await.unwrap().balance, dec!(10));
        assert_eq!(service.get_account(2).await.unwrap().balance, dec!(10));
    }

    #[tokio::test]
    async fn test_get_account_does_not_wait_for_held_row() {
        let service = service_with_deadline(Duration::from_millis(20));
        service.create_account(&create(1, "10")).await.unwrap();

        let _held = service.accounts.lock_for_update(1).await.unwrap();
        assert_eq!(service.get_account(1).await.unwrap().balance, dec!(10));
    }
}
