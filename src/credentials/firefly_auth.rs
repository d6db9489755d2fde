use anyhow::{anyhow, ensure, Context as _, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};

use super::AccessToken;

/// Both kinds are sent as `Authorization: Bearer`, the distinction only
/// records where in the Firefly UI the token was created.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireflyTokenType {
    /// "Personal Access Token" in Firefly
    BearerToken,
    /// OAuth client token in Firefly
    AccessToken,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub struct FireflyAuth {
    pub url: String,
    pub token: AccessToken,
    pub token_type: FireflyTokenType,
}

impl FireflyAuth {
    pub fn base_url(&self) -> Result<Url> {
        let url = Url::parse(&self.url)
            .with_context(|| anyhow!("Firefly url {:?} is not a valid url", self.url))?;
        ensure!(
            matches!(url.scheme(), "http" | "https"),
            "Firefly url {:?} must start with http:// or https://",
            self.url,
        );
        Ok(url)
    }

    pub fn validate(&self) -> Result<()> {
        self.base_url()?;
        ensure!(!self.token.is_empty(), "Firefly token is empty");
        Ok(())
    }
}
