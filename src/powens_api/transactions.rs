use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use crate::credentials::PowensAccountId;

use super::{client::Powens, date_format, Currency};

/// Powens refuses to return more than this many transactions per request
pub const MAX_TRANSACTION_LIMIT: u32 = 1000;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct PowensTransactionId(pub u64);

impl Display for PowensTransactionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Transfer,
    Order,
    Check,
    /// Mandatory/voluntary deposits, contributions, money transfers
    Deposit,
    Payback,
    Withdrawal,
    LoanRepayment,
    /// Bank fees
    Bank,
    Card,
    DeferredCard,
    /// Monthly debit of a deferred card
    SummaryCard,
    MarketOrder,
    MarketFee,
    Arbitrage,
    /// Interests, coupons, dividends
    Profit,
    Refund,
    /// From an e-commerce account (e.g. Stripe) to the bank account
    Payout,
    /// Payment with something other than a card
    Payment,
    Fee,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CounterParty {
    pub label: Option<String>,
    pub account_scheme_name: Option<String>,
    /// The IBAN when `account_scheme_name` is `iban`
    pub account_identification: Option<String>,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PowensTransaction {
    pub id: PowensTransactionId,
    pub id_account: PowensAccountId,
    /// Debit date as shown on the bank statement
    pub date: NaiveDate,
    #[serde(default, with = "date_format::optional_datetime")]
    pub datetime: Option<NaiveDateTime>,
    /// Value date
    pub vdate: Option<NaiveDate>,
    #[serde(default, with = "date_format::optional_datetime")]
    pub vdatetime: Option<NaiveDateTime>,
    pub value: Option<Decimal>,
    #[serde(rename = "type", default)]
    pub type_: TransactionType,
    pub original_wording: Option<String>,
    pub simplified_wording: Option<String>,
    pub wording: Option<String>,
    /// Not yet booked by the bank
    #[serde(default)]
    pub coming: bool,
    pub counterparty: Option<CounterParty>,
    /// Amount in the currency the transaction was made in, if that isn't the account currency
    pub original_value: Option<Decimal>,
    pub original_currency: Option<Currency>,
}

impl PowensTransaction {
    /// Best available human readable label
    pub fn description(&self) -> Option<&str> {
        [
            &self.wording,
            &self.original_wording,
            &self.simplified_wording,
        ]
        .into_iter()
        .filter_map(|wording| wording.as_deref())
        .map(str::trim)
        .find(|wording| !wording.is_empty())
    }

    pub fn counterparty_iban(&self) -> Option<&str> {
        self.counterparty
            .as_ref()
            .and_then(|counterparty| counterparty.account_identification.as_deref())
    }
}

/// Which transactions to request for an account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchWindow {
    pub min_date: Option<NaiveDate>,
    pub max_date: Option<NaiveDate>,
    pub limit: u32,
}

impl Default for FetchWindow {
    fn default() -> Self {
        Self {
            min_date: None,
            max_date: None,
            limit: MAX_TRANSACTION_LIMIT,
        }
    }
}

impl FetchWindow {
    fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![("limit", self.limit.to_string())];
        if let Some(min_date) = self.min_date {
            query.push(("min_date", min_date.format("%Y-%m-%d").to_string()));
        }
        if let Some(max_date) = self.max_date {
            query.push(("max_date", max_date.format("%Y-%m-%d").to_string()));
        }
        query
    }
}

#[derive(Deserialize)]
struct TransactionsResponse {
    transactions: Vec<PowensTransaction>,
}

pub async fn get_transactions(
    client: &Powens,
    account_id: PowensAccountId,
    window: &FetchWindow,
) -> Result<Vec<PowensTransaction>> {
    log::info!("Requesting transactions for account {account_id}...");

    let user_id = client.user_id()?;
    let response = client
        .authorized_get(&format!(
            "/users/{user_id}/accounts/{account_id}/transactions"
        ))?
        .query(&window.query())
        .send()
        .await?;
    let response: TransactionsResponse = crate::http::read_json(response).await?;

    log::info!(
        "Requesting transactions for account {account_id}...done ({} transactions)",
        response.transactions.len(),
    );
    Ok(response.transactions)
}
