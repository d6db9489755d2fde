use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::credentials::PowensAccountId;
use crate::firefly_api::FireflyTransactionId;
use crate::powens_api::{PowensTransaction, PowensTransactionId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferStatus {
    Created(FireflyTransactionId),
    /// Firefly already has this transaction, most likely from an earlier run
    Duplicate,
    Skipped(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionOutcome {
    pub account: PowensAccountId,
    pub transaction: PowensTransactionId,
    pub date: NaiveDate,
    pub value: Option<Decimal>,
    pub description: Option<String>,
    /// Not booked by the bank yet
    pub coming: bool,
    pub status: TransferStatus,
}

impl TransactionOutcome {
    pub fn new(transaction: &PowensTransaction, status: TransferStatus) -> Self {
        Self {
            account: transaction.id_account,
            transaction: transaction.id,
            date: transaction.date,
            value: transaction.value,
            description: transaction.description().map(str::to_string),
            coming: transaction.coming,
            status,
        }
    }
}

/// A mapped account whose transactions couldn't be fetched at all
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountFailure {
    pub account: PowensAccountId,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferReport {
    pub outcomes: Vec<TransactionOutcome>,
    pub account_failures: Vec<AccountFailure>,
}

impl TransferReport {
    pub fn num_created(&self) -> usize {
        self.count(|status| matches!(status, TransferStatus::Created(_)))
    }

    pub fn num_duplicates(&self) -> usize {
        self.count(|status| matches!(status, TransferStatus::Duplicate))
    }

    pub fn num_skipped(&self) -> usize {
        self.count(|status| matches!(status, TransferStatus::Skipped(_)))
    }

    pub fn num_failed(&self) -> usize {
        self.count(|status| matches!(status, TransferStatus::Failed(_)))
    }

    pub fn has_failures(&self) -> bool {
        self.num_failed() > 0 || !self.account_failures.is_empty()
    }

    /// Outcomes of one account, in the order they were processed
    pub fn outcomes_for(
        &self,
        account: PowensAccountId,
    ) -> impl Iterator<Item = &TransactionOutcome> {
        self.outcomes
            .iter()
            .filter(move |outcome| outcome.account == account)
    }

    fn count(&self, predicate: impl Fn(&TransferStatus) -> bool) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| predicate(&outcome.status))
            .count()
    }
}
