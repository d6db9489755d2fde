use anyhow::{ensure, Result};
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

use crate::powens_api::{FetchWindow, MAX_TRANSACTION_LIMIT};

/// Copy bank transactions from Powens into Firefly III.
#[derive(Parser, Debug)]
pub struct Args {
    /// Path to the credentials yaml file
    #[clap(long = "credentials_path", default_value = "credentials.yml")]
    pub credentials_path: PathBuf,

    /// Automatic mode, fail instead of asking when user action is required (e.g. redoing any authentication)
    #[clap(long)]
    pub auto: bool,

    /// Only transfer transactions on or after this date (YYYY-MM-DD)
    #[clap(long)]
    pub min_date: Option<NaiveDate>,

    /// Only transfer transactions on or before this date (YYYY-MM-DD)
    #[clap(long)]
    pub max_date: Option<NaiveDate>,

    /// Maximum number of transactions fetched per bank account
    #[clap(
        long,
        default_value_t = MAX_TRANSACTION_LIMIT,
        value_parser = clap::value_parser!(u32).range(1..=MAX_TRANSACTION_LIMIT as i64),
    )]
    pub transaction_limit: u32,

    /// Store both sides of a transfer between two mapped accounts as a single Firefly transfer.
    /// Off by default, each Powens transaction becomes its own Firefly transaction
    /// (this replaces the former `--no-transfers-combine`, which had combining on by default).
    #[clap(long)]
    pub combine_transfers: bool,

    /// Don't transfer transactions the bank hasn't booked yet ("coming" in Powens).
    /// Their date and wording may change once booked, which Firefly then stores as a new transaction.
    #[clap(long)]
    pub skip_coming: bool,
}

impl Args {
    pub fn validate(&self) -> Result<()> {
        if let (Some(min_date), Some(max_date)) = (self.min_date, self.max_date) {
            ensure!(
                min_date <= max_date,
                "--min-date {min_date} is after --max-date {max_date}"
            );
        }
        Ok(())
    }

    pub fn fetch_window(&self) -> FetchWindow {
        FetchWindow {
            min_date: self.min_date,
            max_date: self.max_date,
            limit: self.transaction_limit,
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}
