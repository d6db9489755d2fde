use serde::Deserialize;

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Currency {
    /// ISO code, e.g. `EUR`
    pub id: String,
    pub symbol: Option<String>,
    pub precision: Option<u32>,
}
