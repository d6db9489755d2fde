mod matching;
mod orchestrator;
mod remote;
mod report;
mod request;

#[cfg(test)]
mod testutils;

pub use matching::{find_internal_transfers, AccountTransactions, InternalTransfer, TransactionRef};
pub use orchestrator::{transfer_transactions, TransactionSource, TransferOptions, TransferSink};
pub use report::{AccountFailure, TransactionOutcome, TransferReport, TransferStatus};
pub use request::{
    translate, translate_internal_transfer, AccountRef, ForeignAmount, TransferKind,
    TransferRequest, Translation,
};
