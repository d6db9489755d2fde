use anyhow::Result;
use reqwest::{header, Client, RequestBuilder, Url};

use crate::credentials::{AccessToken, FireflyAuth};

pub struct Firefly {
    client: Client,
    api_base: Url,
    token: AccessToken,
}

impl Firefly {
    pub fn new(auth: &FireflyAuth) -> Result<Firefly> {
        let mut api_base = auth.base_url()?;
        // Url::join would drop the last path segment of e.g. `https://example.com/firefly`
        if !api_base.path().ends_with('/') {
            api_base.set_path(&format!("{}/", api_base.path()));
        }
        Ok(Firefly {
            client: crate::http::new_client()?,
            api_base: api_base.join("api/v1/")?,
            token: auth.token.clone(),
        })
    }

    pub(super) fn get(&self, path: &str) -> Result<RequestBuilder> {
        Ok(self.authorize(self.client.get(self.api_base.join(path)?)))
    }

    pub(super) fn post(&self, path: &str) -> Result<RequestBuilder> {
        Ok(self.authorize(self.client.post(self.api_base.join(path)?)))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(self.token.get())
            .header(header::ACCEPT, "application/json")
    }

    #[cfg(test)]
    pub(super) fn api_base(&self) -> &Url {
        &self.api_base
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use crate::credentials::FireflyTokenType;

    use super::*;

    #[rstest]
    #[case("https://firefly.example.com", "https://firefly.example.com/api/v1/")]
    #[case("https://firefly.example.com/", "https://firefly.example.com/api/v1/")]
    #[case("http://nas.local:8080/firefly", "http://nas.local:8080/firefly/api/v1/")]
    fn api_base_from_url(#[case] url: &str, #[case] expected: &str) {
        let client = Firefly::new(&FireflyAuth {
            url: url.to_string(),
            token: AccessToken::new("token".to_string()),
            token_type: FireflyTokenType::BearerToken,
        })
        .unwrap();
        assert_eq!(expected, client.api_base().as_str());
    }
}
