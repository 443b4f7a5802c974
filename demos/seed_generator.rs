//! Generates an account seed CSV for a number of accounts supplied as a
//! command-line argument, and prints the expected total balance to stderr.
//!
//! Example (100 accounts):
//! ```bash
//! cargo run --example seed_generator 100 > data/100_accounts.csv
//! LEDGER_SEED_ACCOUNTS=data/100_accounts.csv cargo run
//! ```
//! ### Balances
//! Account `i` starts with `BASE_BALANCE * i` plus a fractional part of
//! `FRACTION * i`, so every balance carries the full 8 fractional digits:
//! - account 1: `1000.12345678`
//! - account 2: `2000.24691356`
//!
//! The sum over `n` accounts is `(BASE_BALANCE + FRACTION) * n(n+1)/2`, and
//! stays constant under any sequence of successful transfers.

use csv::Writer;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::{env, error::Error};

const BASE_BALANCE: Decimal = dec!(1000);
const FRACTION: Decimal = dec!(0.12345678);

#[derive(Serialize)]
struct SeedRow {
    account_id: u64,
    initial_balance: Decimal,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: cargo run --example seed_generator <num_accounts>");
        std::process::exit(1);
    }

    let num_accounts: u64 = match args[1].parse() {
        Ok(n) if n > 0 => n,
        _ => {
            eprintln!("Error: <num_accounts> must be a positive integer.");
            std::process::exit(1);
        }
    };

    let mut wtr = Writer::from_writer(std::io::stdout());
    for id in 1..=num_accounts {
        let scale = Decimal::from(id);
        wtr.serialize(SeedRow {
            account_id: id,
            initial_balance: BASE_BALANCE * scale + FRACTION * scale,
        })?;
    }
    wtr.flush()?;

    let n = Decimal::from(num_accounts);
    let total = (BASE_BALANCE + FRACTION) * n * (n + Decimal::ONE) / Decimal::TWO;
    eprintln!("Generated {} accounts, total balance {}", num_accounts, total);
    Ok(())
}
