use anyhow::{anyhow, ensure, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::fmt::{Display, Formatter};

use crate::credentials::{AccountMapping, FireflyAccountId, PowensAccountId};
use crate::powens_api::{PowensTransaction, PowensTransactionId};

const NO_DESCRIPTION: &str = "(no description)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferKind {
    /// Money leaves a mapped account
    Withdrawal,
    /// Money arrives in a mapped account
    Deposit,
    /// Money moves between two mapped accounts
    Transfer,
}

/// One side of a transfer request. Mapped accounts are referenced by id,
/// everything else by name and Firefly creates or reuses an expense/revenue account for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountRef {
    Id(FireflyAccountId),
    Name(String),
}

impl Display for AccountRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountRef::Id(id) => write!(f, "#{id}"),
            AccountRef::Name(name) => write!(f, "{name:?}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignAmount {
    pub amount: Decimal,
    pub currency_code: String,
}

/// A transaction to be created in Firefly
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub kind: TransferKind,
    pub source: AccountRef,
    pub destination: AccountRef,
    /// Always positive, the direction is given by source and destination
    pub amount: Decimal,
    pub date: NaiveDate,
    pub description: String,
    pub notes: Option<String>,
    /// Powens transactions this request was built from
    pub origin_transactions: Vec<PowensTransactionId>,
    pub foreign_amount: Option<ForeignAmount>,
}

impl TransferRequest {
    pub fn external_id(&self) -> String {
        self.origin_transactions
            .iter()
            .map(|id| format!("powens:{id}"))
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translation {
    Request(TransferRequest),
    /// The transaction belongs to an account without mapping and must not be transferred
    Unmapped(PowensAccountId),
}

/// Build the Firefly request for a single Powens transaction.
pub fn translate(mapping: &AccountMapping, transaction: &PowensTransaction) -> Result<Translation> {
    let Some(account) = mapping.lookup(transaction.id_account) else {
        return Ok(Translation::Unmapped(transaction.id_account));
    };
    let value = nonzero_value(transaction)?;

    let description = description(transaction);
    let counterparty = AccountRef::Name(counterparty_name(transaction, &description));
    let (kind, source, destination) = if value < Decimal::ZERO {
        (TransferKind::Withdrawal, AccountRef::Id(account), counterparty)
    } else {
        (TransferKind::Deposit, counterparty, AccountRef::Id(account))
    };

    Ok(Translation::Request(TransferRequest {
        kind,
        source,
        destination,
        amount: value.abs(),
        date: transaction.date,
        notes: notes(transaction, &description),
        description,
        origin_transactions: vec![transaction.id],
        foreign_amount: foreign_amount(transaction),
    }))
}

/// Build a single Firefly transfer for the two legs of a transfer between mapped accounts.
pub fn translate_internal_transfer(
    mapping: &AccountMapping,
    debit: &PowensTransaction,
    credit: &PowensTransaction,
) -> Result<Translation> {
    let Some(source) = mapping.lookup(debit.id_account) else {
        return Ok(Translation::Unmapped(debit.id_account));
    };
    let Some(destination) = mapping.lookup(credit.id_account) else {
        return Ok(Translation::Unmapped(credit.id_account));
    };
    let debit_value = nonzero_value(debit)?;
    let credit_value = nonzero_value(credit)?;
    ensure!(
        debit_value < Decimal::ZERO && debit_value == -credit_value,
        "Transactions {} ({debit_value}) and {} ({credit_value}) are not two legs of the same transfer",
        debit.id,
        credit.id,
    );

    let description = description(debit);
    Ok(Translation::Request(TransferRequest {
        kind: TransferKind::Transfer,
        source: AccountRef::Id(source),
        destination: AccountRef::Id(destination),
        amount: credit_value,
        date: debit.date,
        notes: notes(debit, &description),
        description,
        origin_transactions: vec![debit.id, credit.id],
        foreign_amount: foreign_amount(debit),
    }))
}

fn nonzero_value(transaction: &PowensTransaction) -> Result<Decimal> {
    let value = transaction
        .value
        .ok_or_else(|| anyhow!("Transaction {} has no value", transaction.id))?;
    ensure!(
        !value.is_zero(),
        "Transaction {} has a zero value",
        transaction.id
    );
    Ok(value)
}

fn description(transaction: &PowensTransaction) -> String {
    transaction
        .description()
        .unwrap_or(NO_DESCRIPTION)
        .to_string()
}

fn counterparty_name(transaction: &PowensTransaction, description: &str) -> String {
    transaction
        .counterparty
        .as_ref()
        .and_then(|counterparty| counterparty.label.as_deref())
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .unwrap_or(description)
        .to_string()
}

fn notes(transaction: &PowensTransaction, description: &str) -> Option<String> {
    transaction
        .original_wording
        .as_deref()
        .map(str::trim)
        .filter(|wording| !wording.is_empty() && *wording != description)
        .map(str::to_string)
}

fn foreign_amount(transaction: &PowensTransaction) -> Option<ForeignAmount> {
    match (&transaction.original_value, &transaction.original_currency) {
        (Some(amount), Some(currency)) => Some(ForeignAmount {
            amount: amount.abs(),
            currency_code: currency.id.clone(),
        }),
        _ => None,
    }
}
