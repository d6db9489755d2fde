use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};

mod access_token;
mod account_id;
mod file;
mod firefly_auth;
mod mapping;
mod powens_auth;

pub use access_token::AccessToken;
pub use account_id::{FireflyAccountId, PowensAccountId, PowensUserId};
pub use file::{load, save};
pub use firefly_auth::{FireflyAuth, FireflyTokenType};
pub use mapping::AccountMapping;
pub use powens_auth::PowensAuth;

/// Everything stored in the credentials file.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub struct Credentials {
    pub powens: PowensAuth,
    pub firefly: FireflyAuth,
    #[serde(default)]
    pub mapping: AccountMapping,
}

impl Credentials {
    pub fn new(powens: PowensAuth, firefly: FireflyAuth) -> Self {
        Self {
            powens,
            firefly,
            mapping: AccountMapping::new_empty(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.powens
            .validate()
            .context("Invalid powens section")?;
        self.firefly
            .validate()
            .context("Invalid firefly section")?;
        Ok(())
    }
}
