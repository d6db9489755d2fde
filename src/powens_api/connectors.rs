use anyhow::Result;
use serde::Deserialize;

use super::client::Powens;

/// A bank (or other institution) that Powens can connect to
#[derive(Deserialize, Debug, Clone)]
pub struct Connector {
    pub id: u64,
    pub name: String,
}

#[derive(Deserialize)]
struct ConnectorsResponse {
    connectors: Vec<Connector>,
}

pub async fn get_connectors(client: &Powens) -> Result<Vec<Connector>> {
    log::info!("Requesting connectors...");

    let response = client.authorized_get("/connectors")?.send().await?;
    let response: ConnectorsResponse = crate::http::read_json(response).await?;

    log::info!("Requesting connectors...done");
    Ok(response.connectors)
}
