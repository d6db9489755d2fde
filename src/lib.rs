pub mod args;
pub mod cli;
pub mod credentials;
pub mod firefly_api;
mod http;
pub mod powens_api;
pub mod terminal;
pub mod transfer;
