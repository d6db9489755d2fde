//! Connects the orchestrator to the real APIs

use anyhow::Result;

use crate::credentials::PowensAccountId;
use crate::firefly_api::{self, Firefly, StoreResult};
use crate::powens_api::{self, FetchWindow, Powens, PowensAccount, PowensTransaction};

use super::{TransactionSource, TransferRequest, TransferSink};

impl TransactionSource for Powens {
    async fn accounts(&self) -> Result<Vec<PowensAccount>> {
        powens_api::get_accounts(self).await
    }

    async fn transactions(
        &self,
        account: PowensAccountId,
        window: &FetchWindow,
    ) -> Result<Vec<PowensTransaction>> {
        powens_api::get_transactions(self, account, window).await
    }
}

impl TransferSink for Firefly {
    async fn submit(&self, request: &TransferRequest) -> Result<StoreResult> {
        firefly_api::store_transaction(self, request).await
    }
}
