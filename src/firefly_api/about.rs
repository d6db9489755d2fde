use anyhow::Result;
use serde::Deserialize;

use super::client::Firefly;

#[derive(Deserialize)]
struct AboutResponse {
    data: About,
}

#[derive(Deserialize, Debug)]
struct About {
    version: String,
    api_version: String,
}

/// Checks url and token, returns the Firefly version
pub async fn test_connection(client: &Firefly) -> Result<String> {
    log::info!("Requesting Firefly version...");

    let response = client.get("about")?.send().await?;
    let response: AboutResponse = crate::http::read_json(response).await?;

    log::info!(
        "Requesting Firefly version...done (Firefly {}, API {})",
        response.data.version,
        response.data.api_version,
    );
    Ok(response.data.version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_about() {
        let response: AboutResponse = serde_json::from_str(
            r#"{"data": {"version": "6.1.18", "api_version": "2.1.0", "php_version": "8.3.4", "os": "Linux", "driver": "mysql"}}"#,
        )
        .unwrap();
        assert_eq!("6.1.18", response.data.version);
        assert_eq!("2.1.0", response.data.api_version);
    }
}
