use anyhow::{Context as _, Result};
use std::collections::HashSet;

use crate::credentials::{AccountMapping, PowensAccountId};
use crate::firefly_api::StoreResult;
use crate::powens_api::{FetchWindow, PowensAccount, PowensTransaction};

use super::matching::{find_internal_transfers, AccountTransactions, TransactionRef};
use super::report::{AccountFailure, TransactionOutcome, TransferReport, TransferStatus};
use super::request::{translate, translate_internal_transfer, TransferRequest, Translation};

/// Where transactions come from. Implemented by the Powens client.
#[allow(async_fn_in_trait)]
pub trait TransactionSource {
    /// All accounts linked for the user
    async fn accounts(&self) -> Result<Vec<PowensAccount>>;

    async fn transactions(
        &self,
        account: PowensAccountId,
        window: &FetchWindow,
    ) -> Result<Vec<PowensTransaction>>;
}

/// Where transfer requests go. Implemented by the Firefly client.
#[allow(async_fn_in_trait)]
pub trait TransferSink {
    async fn submit(&self, request: &TransferRequest) -> Result<StoreResult>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TransferOptions {
    pub window: FetchWindow,
    /// Store the two legs of a transfer between mapped accounts as one Firefly transfer
    pub combine_transfers: bool,
    /// Don't submit transactions the bank hasn't booked yet
    pub skip_coming: bool,
}

const NOT_BOOKED: &str = "Not booked by the bank yet";

/// Copy the transactions of every mapped account from `source` to `sink`.
///
/// Only listing the Powens accounts is fatal. A failure to fetch one account or to
/// submit one transaction is recorded in the report and the run continues.
pub async fn transfer_transactions(
    mapping: &AccountMapping,
    source: &impl TransactionSource,
    sink: &impl TransferSink,
    options: &TransferOptions,
) -> Result<TransferReport> {
    let mut report = TransferReport::default();
    let mut accounts = fetch_mapped_accounts(mapping, source, &options.window, &mut report).await?;
    if options.skip_coming {
        skip_coming_transactions(&mut accounts, &mut report);
    }

    let internal_transfers = if options.combine_transfers {
        find_internal_transfers(&accounts)
    } else {
        Vec::new()
    };
    let lookup = |tref: TransactionRef| &accounts[tref.account].transactions[tref.transaction];

    let mut combined = HashSet::new();
    for internal_transfer in &internal_transfers {
        let debit = lookup(internal_transfer.debit);
        let credit = lookup(internal_transfer.credit);
        let status = match translate_internal_transfer(mapping, debit, credit) {
            Ok(translation) => process(sink, translation).await,
            Err(err) => failed(err),
        };
        report
            .outcomes
            .push(TransactionOutcome::new(debit, status.clone()));
        report.outcomes.push(TransactionOutcome::new(credit, status));
        combined.insert(internal_transfer.debit);
        combined.insert(internal_transfer.credit);
    }

    for (account_index, account) in accounts.iter().enumerate() {
        for (transaction_index, transaction) in account.transactions.iter().enumerate() {
            let tref = TransactionRef {
                account: account_index,
                transaction: transaction_index,
            };
            if combined.contains(&tref) {
                continue;
            }
            let status = match translate(mapping, transaction) {
                Ok(translation) => process(sink, translation).await,
                Err(err) => failed(err),
            };
            report
                .outcomes
                .push(TransactionOutcome::new(transaction, status));
        }
    }

    log::info!(
        "Transfer done: {} created, {} duplicates, {} skipped, {} failed, {} accounts failed",
        report.num_created(),
        report.num_duplicates(),
        report.num_skipped(),
        report.num_failed(),
        report.account_failures.len(),
    );
    Ok(report)
}

async fn fetch_mapped_accounts(
    mapping: &AccountMapping,
    source: &impl TransactionSource,
    window: &FetchWindow,
    report: &mut TransferReport,
) -> Result<Vec<AccountTransactions>> {
    let linked_accounts = source
        .accounts()
        .await
        .context("Failed to list Powens accounts")?;

    let mut result = Vec::with_capacity(mapping.len());
    for origin in mapping.origins() {
        let Some(account) = linked_accounts.iter().find(|account| account.id == origin) else {
            log::warn!("Mapped Powens account {origin} is not linked in Powens");
            report.account_failures.push(AccountFailure {
                account: origin,
                reason: "Account is not linked in Powens".to_string(),
            });
            continue;
        };
        match source.transactions(origin, window).await {
            Ok(transactions) => result.push(AccountTransactions {
                account_id: origin,
                iban: account.iban.clone(),
                transactions,
            }),
            Err(err) => {
                log::warn!("Failed to fetch transactions for Powens account {origin}: {err:#}");
                report.account_failures.push(AccountFailure {
                    account: origin,
                    reason: format!("{err:#}"),
                });
            }
        }
    }
    Ok(result)
}

/// Moves coming transactions out of `accounts` and reports them as skipped.
/// Their date and wording can still change once the bank books them.
fn skip_coming_transactions(accounts: &mut [AccountTransactions], report: &mut TransferReport) {
    for account in accounts {
        let (coming, booked): (Vec<_>, Vec<_>) = std::mem::take(&mut account.transactions)
            .into_iter()
            .partition(|transaction| transaction.coming);
        account.transactions = booked;
        for transaction in &coming {
            log::debug!("Skipping coming transaction {}", transaction.id);
            report.outcomes.push(TransactionOutcome::new(
                transaction,
                TransferStatus::Skipped(NOT_BOOKED.to_string()),
            ));
        }
    }
}

async fn process(sink: &impl TransferSink, translation: Translation) -> TransferStatus {
    match translation {
        Translation::Unmapped(account) => {
            log::debug!("Skipping transaction of unmapped Powens account {account}");
            TransferStatus::Skipped(format!("Powens account {account} has no mapping"))
        }
        Translation::Request(request) => submit(sink, &request).await,
    }
}

async fn submit(sink: &impl TransferSink, request: &TransferRequest) -> TransferStatus {
    let external_id = request.external_id();
    match sink.submit(request).await {
        Ok(StoreResult::Created(id)) => {
            log::info!("Stored {external_id} as Firefly transaction {id}");
            TransferStatus::Created(id)
        }
        Ok(StoreResult::Duplicate) => {
            log::debug!("Firefly already has {external_id}");
            TransferStatus::Duplicate
        }
        Err(err) => {
            log::warn!("Failed to store {external_id}: {err:#}");
            TransferStatus::Failed(format!("{err:#}"))
        }
    }
}

fn failed(err: anyhow::Error) -> TransferStatus {
    log::warn!("{err:#}");
    TransferStatus::Failed(format!("{err:#}"))
}
