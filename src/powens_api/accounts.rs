use anyhow::Result;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::credentials::PowensAccountId;

use super::{client::Powens, Currency};

#[derive(Deserialize, Debug, Clone)]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub struct PowensAccount {
    pub id: PowensAccountId,
    pub name: String,
    pub iban: Option<String>,
    pub balance: Option<Decimal>,
    pub formatted_balance: Option<String>,
    pub currency: Currency,
}

#[derive(Deserialize)]
struct AccountsResponse {
    accounts: Vec<PowensAccount>,
}

pub async fn get_accounts(client: &Powens) -> Result<Vec<PowensAccount>> {
    log::info!("Requesting accounts...");

    let user_id = client.user_id()?;
    let response = client
        .authorized_get(&format!("/users/{user_id}/accounts"))?
        .send()
        .await?;
    let response: AccountsResponse = crate::http::read_json(response).await?;

    log::info!("Requesting accounts...done");
    Ok(response.accounts)
}

/// IBANs show up both grouped (`FR76 3000 ...`) and ungrouped, in any case
pub fn normalize_iban(iban: &str) -> String {
    iban.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accounts() {
        let response: AccountsResponse = serde_json::from_str(
            r#"{
                "accounts": [
                    {
                        "id": 12,
                        "id_connection": 3,
                        "id_user": 1,
                        "number": "3002900000",
                        "webid": null,
                        "original_name": "Compte Cheque",
                        "name": "Compte Cheque",
                        "balance": 1234.56,
                        "coming": null,
                        "display": true,
                        "iban": "FR7630004000031234567890143",
                        "currency": {"id": "EUR", "symbol": "€", "prefix": false, "crypto": false, "precision": 2, "marketcap": null, "datetime": null, "name": "Euro"},
                        "formatted_balance": "1 234,56 €",
                        "type": "checking",
                        "usage": "PRIV"
                    }
                ],
                "total": 1
            }"#,
        )
        .unwrap();

        assert_eq!(
            vec![PowensAccount {
                id: PowensAccountId(12),
                name: "Compte Cheque".to_string(),
                iban: Some("FR7630004000031234567890143".to_string()),
                balance: Some(Decimal::new(123456, 2)),
                formatted_balance: Some("1 234,56 €".to_string()),
                currency: Currency {
                    id: "EUR".to_string(),
                    symbol: Some("€".to_string()),
                    precision: Some(2),
                },
            }],
            response.accounts,
        );
    }

    #[test]
    fn normalize_grouped_iban() {
        assert_eq!(
            "FR7630004000031234567890143",
            normalize_iban("fr76 3000 4000 0312 3456 7890 143")
        );
    }
}
