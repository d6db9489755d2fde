use anyhow::{anyhow, Result};
use reqwest::{Client, RequestBuilder};

use crate::credentials::{AccessToken, PowensAuth, PowensUserId};

pub struct Powens {
    client: Client,
    domain: String,
    api_base: String,
    user: Option<PowensUser>,
}

struct PowensUser {
    user_id: PowensUserId,
    token: AccessToken,
}

impl Powens {
    /// Client without a user, only good for creating one with [super::create_user]
    pub fn new(domain: &str) -> Result<Powens> {
        Ok(Powens {
            client: crate::http::new_client()?,
            domain: domain.to_string(),
            api_base: format!("https://{domain}/2.0"),
            user: None,
        })
    }

    pub fn with_auth(auth: &PowensAuth) -> Result<Powens> {
        let mut client = Self::new(&auth.domain)?;
        client.user = Some(PowensUser {
            user_id: auth.user_id,
            token: auth.token.clone(),
        });
        Ok(client)
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub(super) fn user_id(&self) -> Result<PowensUserId> {
        Ok(self.user()?.user_id)
    }

    pub(super) fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(format!("{}{path}", self.api_base))
    }

    pub(super) fn authorized_get(&self, path: &str) -> Result<RequestBuilder> {
        let user = self.user()?;
        Ok(self
            .client
            .get(format!("{}{path}", self.api_base))
            .bearer_auth(user.token.get()))
    }

    fn user(&self) -> Result<&PowensUser> {
        self.user
            .as_ref()
            .ok_or_else(|| anyhow!("Powens client has no user token"))
    }
}
