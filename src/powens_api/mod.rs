mod accounts;
mod auth;
mod client;
mod connections;
mod connectors;
mod currency;
mod date_format;
mod transactions;

pub use accounts::{get_accounts, normalize_iban, PowensAccount};
pub use auth::{create_user, generate_webview_code, webview_url};
pub use client::Powens;
pub use connections::{get_connections, Connection};
pub use connectors::{get_connectors, Connector};
pub use currency::Currency;
pub use transactions::{
    get_transactions, CounterParty, FetchWindow, PowensTransaction, PowensTransactionId,
    TransactionType, MAX_TRANSACTION_LIMIT,
};
