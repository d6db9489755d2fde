use anyhow::Result;
use serde::Deserialize;

use super::client::Powens;

/// A link between the Powens user and one bank login
#[derive(Deserialize, Debug, Clone)]
pub struct Connection {
    pub id: u64,
    pub id_connector: Option<u64>,
    pub created: Option<String>,
    pub last_update: Option<String>,
    pub next_try: Option<String>,
    pub expire: Option<String>,
    /// `None` when the connection is healthy, otherwise e.g. `SCARequired` or `wrongpass`
    pub state: Option<String>,
}

#[derive(Deserialize)]
struct ConnectionsResponse {
    connections: Vec<Connection>,
}

pub async fn get_connections(client: &Powens) -> Result<Vec<Connection>> {
    log::info!("Requesting connections...");

    let user_id = client.user_id()?;
    let response = client
        .authorized_get(&format!("/users/{user_id}/connections"))?
        .send()
        .await?;
    let response: ConnectionsResponse = crate::http::read_json(response).await?;

    log::info!("Requesting connections...done");
    Ok(response.connections)
}
