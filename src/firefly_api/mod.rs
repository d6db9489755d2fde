mod about;
mod accounts;
mod client;
mod transactions;

pub use about::test_connection;
pub use accounts::{get_accounts, FireflyAccount};
pub use client::Firefly;
pub use transactions::{store_transaction, FireflyTransactionId, StoreResult};
