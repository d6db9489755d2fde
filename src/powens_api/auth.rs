use anyhow::Result;
use reqwest::Url;
use serde::Deserialize;

use crate::credentials::{AccessToken, PowensUserId};

use super::client::Powens;

const WEBVIEW_URL: &str = "https://webview.powens.com/en/manage";
const WEBVIEW_TOKEN_TYPE: &str = "singleAccess";

#[derive(Deserialize)]
struct AuthInitResponse {
    auth_token: String,
    id_user: PowensUserId,
}

#[derive(Deserialize)]
struct TokenCodeResponse {
    code: String,
}

/// Create a new Powens user for this client and return its permanent token.
/// A single client can have many users.
pub async fn create_user(
    client: &Powens,
    client_id: &str,
    client_secret: &str,
) -> Result<(AccessToken, PowensUserId)> {
    log::info!("Creating Powens user...");

    let response = client
        .post("/auth/init")
        .form(&[("client_id", client_id), ("client_secret", client_secret)])
        .send()
        .await?;
    let response: AuthInitResponse = crate::http::read_json(response).await?;

    log::info!("Creating Powens user...done");
    Ok((AccessToken::new(response.auth_token), response.id_user))
}

/// Temporary code that lets the webview act on behalf of the user
pub async fn generate_webview_code(client: &Powens) -> Result<String> {
    log::info!("Requesting webview code...");

    let response = client
        .authorized_get("/auth/token/code")?
        .query(&[("type", WEBVIEW_TOKEN_TYPE)])
        .send()
        .await?;
    let response: TokenCodeResponse = crate::http::read_json(response).await?;

    log::info!("Requesting webview code...done");
    Ok(response.code)
}

/// URL of the page where the user links new bank connections
pub fn webview_url(client: &Powens, client_id: &str, code: &str) -> Result<Url> {
    Ok(Url::parse_with_params(
        WEBVIEW_URL,
        &[
            ("domain", client.domain()),
            ("client_id", client_id),
            ("code", code),
        ],
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_webview_url() {
        let client = Powens::new("example-sandbox.biapi.pro").unwrap();
        let url = webview_url(&client, "client-1", "code/with+chars").unwrap();
        assert_eq!(
            "https://webview.powens.com/en/manage?domain=example-sandbox.biapi.pro&client_id=client-1&code=code%2Fwith%2Bchars",
            url.as_str(),
        );
    }

    #[test]
    fn parse_auth_init_response() {
        let response: AuthInitResponse =
            serde_json::from_str(r#"{"auth_token": "tok", "type": "permanent", "id_user": 17}"#)
                .unwrap();
        assert_eq!("tok", response.auth_token);
        assert_eq!(PowensUserId(17), response.id_user);
    }
}
