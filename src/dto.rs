use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::amount::{format_decimal, parse_transfer_amount, serialize_normalized};
use crate::engine::TransferReceipt;
use crate::error::LedgerError;
use crate::stores::{Account, AccountId, Transfer, TransferId};

/// Ids arrive signed so that zero and negative values can be rejected with a
/// domain error instead of a decoding failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateAccountRequest {
    pub account_id: i64,
    pub initial_balance: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct CreateAccountResponse {}

#[derive(Debug, Serialize, PartialEq)]
pub struct GetAccountResponse {
    pub account_id: AccountId,
    #[serde(serialize_with = "serialize_normalized")]
    pub balance: Decimal,
}

impl From<Account> for GetAccountResponse {
    fn from(account: Account) -> Self {
        Self {
            account_id: account.id,
            balance: account.balance,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransferRequest {
    pub source_account_id: i64,
    pub destination_account_id: i64,
    pub amount: String,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransferStatus {
    Completed,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct TransferResponse {
    pub transfer_id: TransferId,
    pub status: TransferStatus,
    #[serde(serialize_with = "serialize_normalized")]
    pub source_balance: Decimal,
    #[serde(serialize_with = "serialize_normalized")]
    pub destination_balance: Decimal,
    #[serde(serialize_with = "serialize_normalized")]
    pub amount: Decimal,
    pub created_at: String,
}

impl From<TransferReceipt> for TransferResponse {
    fn from(receipt: TransferReceipt) -> Self {
        Self {
            transfer_id: receipt.transfer.id,
            status: TransferStatus::Completed,
            source_balance: receipt.source_balance,
            destination_balance: receipt.destination_balance,
            amount: receipt.transfer.amount,
            created_at: rfc3339(receipt.transfer.created_at),
        }
    }
}

/// One line of an account seed file: `account_id,initial_balance`.
/// A balance snapshot (`account_id,balance,...`) is accepted as well.
#[derive(Debug, Deserialize, PartialEq)]
pub struct AccountSeedRow {
    pub account_id: i64,
    #[serde(alias = "balance")]
    pub initial_balance: String,
}

/// One line of a balance snapshot.
#[derive(Debug, Serialize, PartialEq)]
pub struct AccountRow {
    pub account_id: AccountId,
    #[serde(serialize_with = "serialize_normalized")]
    pub balance: Decimal,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Account> for AccountRow {
    fn from(account: &Account) -> Self {
        Self {
            account_id: account.id,
            balance: account.balance,
            created_at: rfc3339(account.created_at),
            updated_at: rfc3339(account.updated_at),
        }
    }
}

/// One line of the transfer log. The amount stays a string on the way in so
/// it is parsed exactly.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct TransferRow {
    pub transfer_id: TransferId,
    pub source_account_id: AccountId,
    pub destination_account_id: AccountId,
    pub amount: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Transfer> for TransferRow {
    fn from(transfer: &Transfer) -> Self {
        Self {
            transfer_id: transfer.id,
            source_account_id: transfer.source_account_id,
            destination_account_id: transfer.destination_account_id,
            amount: format_decimal(transfer.amount),
            created_at: transfer.created_at,
            updated_at: transfer.updated_at,
        }
    }
}

impl TryFrom<TransferRow> for Transfer {
    type Error = LedgerError;

    fn try_from(row: TransferRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.transfer_id,
            source_account_id: row.source_account_id,
            destination_account_id: row.destination_account_id,
            amount: parse_transfer_amount(&row.amount)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn rfc3339(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn parse_csv_row(row: &str) -> Result<AccountSeedRow, csv::Error> {
        let data_with_header = format!("account_id,initial_balance\n{}", row);
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(data_with_header.as_bytes());
        reader.deserialize().next().unwrap()
    }

    #[test]
    fn test_parse_seed_row() {
        assert_eq!(
            parse_csv_row("1, 100.12345678").unwrap(),
            AccountSeedRow {
                account_id: 1,
                initial_balance: "100.12345678".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_snapshot_row_as_seed() {
        let data = "account_id,balance,created_at,updated_at\n\
                    4,925.43209877,2024-05-01T12:00:00Z,2024-05-01T12:00:00Z\n";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let row: AccountSeedRow = reader.deserialize().next().unwrap().unwrap();
        assert_eq!(
            row,
            AccountSeedRow {
                account_id: 4,
                initial_balance: "925.43209877".to_string(),
            }
        );
    }

    #[test]
    fn test_transfer_row_amount_parsed_exactly() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let row = TransferRow {
            transfer_id: 3,
            source_account_id: 1,
            destination_account_id: 2,
            amount: "0.10000001".to_string(),
            created_at: at,
            updated_at: at,
        };
        let transfer = Transfer::try_from(row).unwrap();
        assert_eq!(transfer.amount, dec!(0.10000001));
        assert_eq!(TransferRow::from(&transfer).amount, "0.10000001");

        let bad = TransferRow {
            amount: "0".to_string(),
            ..TransferRow::from(&transfer)
        };
        assert!(Transfer::try_from(bad).is_err());
    }

    #[test]
    fn test_parse_seed_row_keeps_negative_id_for_validation() {
        assert_eq!(parse_csv_row("-3,1").unwrap().account_id, -3);
    }

    #[test]
    fn test_parse_seed_row_rejects_non_numeric_id() {
        assert!(parse_csv_row("abc,1").is_err());
    }

    #[test]
    fn test_transfer_request_from_json() {
        let req: TransferRequest = serde_json::from_str(
            r#"{"source_account_id":1,"destination_account_id":2,"amount":"10.50"}"#,
        )
        .unwrap();
        assert_eq!(req.source_account_id, 1);
        assert_eq!(req.amount, "10.50");
    }

    #[test]
    fn test_create_response_serializes_as_empty_object() {
        assert_eq!(
            serde_json::to_string(&CreateAccountResponse {}).unwrap(),
            "{}"
        );
    }

    #[test]
    fn test_account_response_normalizes_balance() {
        let response = GetAccountResponse {
            account_id: 4,
            balance: dec!(100.00),
        };
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            serde_json::json!({"account_id": 4, "balance": "100"})
        );
    }

    #[test]
    fn test_transfer_response_shape() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let receipt = TransferReceipt {
            transfer: Transfer {
                id: 17,
                source_account_id: 1,
                destination_account_id: 2,
                amount: dec!(25.50),
                created_at: at,
                updated_at: at,
            },
            source_balance: dec!(74.5),
            destination_balance: dec!(125.50),
        };

        assert_eq!(
            serde_json::to_value(TransferResponse::from(receipt)).unwrap(),
            serde_json::json!({
                "transfer_id": 17,
                "status": "COMPLETED",
                "source_balance": "74.5",
                "destination_balance": "125.5",
                "amount": "25.5",
                "created_at": "2024-05-01T12:00:00Z",
            })
        );
    }
}
