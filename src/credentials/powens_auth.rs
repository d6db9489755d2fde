use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

use super::{AccessToken, PowensUserId};

#[derive(Serialize, Deserialize, Debug, Clone)]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub struct PowensAuth {
    /// e.g. `mycompany-sandbox.biapi.pro`
    pub domain: String,
    pub client_id: String,
    pub user_id: PowensUserId,
    pub token: AccessToken,
}

impl PowensAuth {
    pub fn validate(&self) -> Result<()> {
        ensure!(!self.domain.trim().is_empty(), "Powens domain is empty");
        ensure!(
            !self.domain.contains("://"),
            "Powens domain must be a bare host name without scheme, got {:?}",
            self.domain,
        );
        ensure!(!self.client_id.trim().is_empty(), "Powens client_id is empty");
        ensure!(!self.token.is_empty(), "Powens token is empty");
        Ok(())
    }
}
