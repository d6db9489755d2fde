use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use crate::transfer::{AccountRef, TransferKind, TransferRequest};

use super::client::Firefly;

/// Firefly's validation message when `error_if_duplicate_hash` rejects a transaction
const DUPLICATE_MESSAGE: &str = "Duplicate of transaction";

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct FireflyTransactionId(pub String);

impl Display for FireflyTransactionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreResult {
    Created(FireflyTransactionId),
    Duplicate,
}

#[derive(Serialize, Debug)]
struct TransactionStore<'a> {
    error_if_duplicate_hash: bool,
    apply_rules: bool,
    fire_webhooks: bool,
    transactions: Vec<TransactionSplitStore<'a>>,
}

#[derive(Serialize, Debug)]
struct TransactionSplitStore<'a> {
    #[serde(rename = "type")]
    type_: &'static str,
    date: NaiveDate,
    #[serde(with = "rust_decimal::serde::str")]
    amount: Decimal,
    description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    destination_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    destination_name: Option<&'a str>,
    external_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<&'a str>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::str_option"
    )]
    foreign_amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    foreign_currency_code: Option<&'a str>,
}

impl<'a> TransactionSplitStore<'a> {
    fn new(request: &'a TransferRequest) -> Self {
        let (source_id, source_name) = split_account_ref(&request.source);
        let (destination_id, destination_name) = split_account_ref(&request.destination);
        Self {
            type_: match request.kind {
                TransferKind::Withdrawal => "withdrawal",
                TransferKind::Deposit => "deposit",
                TransferKind::Transfer => "transfer",
            },
            date: request.date,
            amount: request.amount,
            description: &request.description,
            source_id,
            source_name,
            destination_id,
            destination_name,
            external_id: request.external_id(),
            notes: request.notes.as_deref(),
            foreign_amount: request
                .foreign_amount
                .as_ref()
                .map(|foreign| foreign.amount),
            foreign_currency_code: request
                .foreign_amount
                .as_ref()
                .map(|foreign| foreign.currency_code.as_str()),
        }
    }
}

fn split_account_ref(account: &AccountRef) -> (Option<String>, Option<&str>) {
    match account {
        AccountRef::Id(id) => (Some(id.to_string()), None),
        AccountRef::Name(name) => (None, Some(name.as_str())),
    }
}

#[derive(Deserialize)]
struct StoreResponse {
    data: StoredTransaction,
}

#[derive(Deserialize)]
struct StoredTransaction {
    id: FireflyTransactionId,
}

pub async fn store_transaction(client: &Firefly, request: &TransferRequest) -> Result<StoreResult> {
    let body = TransactionStore {
        error_if_duplicate_hash: true,
        apply_rules: true,
        fire_webhooks: true,
        transactions: vec![TransactionSplitStore::new(request)],
    };
    let response = client.post("transactions")?.json(&body).send().await?;

    if response.status() == StatusCode::UNPROCESSABLE_ENTITY {
        let body = response.text().await?;
        if is_duplicate_error(&body) {
            return Ok(StoreResult::Duplicate);
        }
        return Err(anyhow!(crate::http::ApiError {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            body,
        }));
    }

    let response: StoreResponse = crate::http::read_json(response).await?;
    Ok(StoreResult::Created(response.data.id))
}

/// Firefly answers duplicates with a 422 like
/// `{"message": "...", "errors": {"transactions.0.description": ["Duplicate of transaction #12."]}}`
fn is_duplicate_error(body: &str) -> bool {
    #[derive(Deserialize)]
    struct ValidationError {
        #[serde(default)]
        errors: std::collections::HashMap<String, Vec<String>>,
    }

    match serde_json::from_str::<ValidationError>(body) {
        Ok(error) => error
            .errors
            .values()
            .flatten()
            .any(|message| message.contains(DUPLICATE_MESSAGE)),
        Err(_) => body.contains(DUPLICATE_MESSAGE),
    }
}
