use anyhow::Result;
use serde::{Deserialize, Deserializer};

use crate::credentials::FireflyAccountId;

use super::client::Firefly;

/// Account types (as reported in `attributes.type`) a Powens account can sensibly be mapped to
const ACCOUNT_TYPES: &[&str] = &[
    "asset",
    "cash",
    "expense",
    "revenue",
    "liability",
    "liabilities",
];

const PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone)]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub struct FireflyAccount {
    pub id: FireflyAccountId,
    pub name: String,
    pub type_: String,
    pub currency_code: Option<String>,
}

#[derive(Deserialize)]
struct AccountsPage {
    data: Vec<AccountResource>,
    meta: Meta,
}

#[derive(Deserialize)]
struct AccountResource {
    #[serde(deserialize_with = "deserialize_account_id")]
    id: FireflyAccountId,
    attributes: AccountAttributes,
}

#[derive(Deserialize)]
struct AccountAttributes {
    name: String,
    #[serde(rename = "type")]
    type_: String,
    currency_code: Option<String>,
}

#[derive(Deserialize)]
struct Meta {
    pagination: Pagination,
}

#[derive(Deserialize, Debug, Clone, Copy)]
struct Pagination {
    current_page: u32,
    total_pages: u32,
}

impl Pagination {
    fn next_page(self) -> Option<u32> {
        (self.current_page < self.total_pages).then_some(self.current_page + 1)
    }
}

impl AccountResource {
    fn into_account(self) -> Option<FireflyAccount> {
        if !ACCOUNT_TYPES.contains(&self.attributes.type_.as_str()) {
            return None;
        }
        Some(FireflyAccount {
            id: self.id,
            name: self.attributes.name,
            type_: self.attributes.type_,
            currency_code: self.attributes.currency_code,
        })
    }
}

fn deserialize_account_id<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<FireflyAccountId, D::Error> {
    let id = String::deserialize(deserializer)?;
    FireflyAccountId::parse(&id).map_err(serde::de::Error::custom)
}

/// All accounts a Powens account can be mapped to, across all result pages
pub async fn get_accounts(client: &Firefly) -> Result<Vec<FireflyAccount>> {
    log::info!("Requesting Firefly accounts...");

    let mut accounts = Vec::new();
    let mut page = 1;
    loop {
        let response = client
            .get("accounts")?
            .query(&[("type", "all")])
            .query(&[("page", page), ("limit", PAGE_SIZE)])
            .send()
            .await?;
        let response: AccountsPage = crate::http::read_json(response).await?;
        let next_page = response.meta.pagination.next_page();
        let page_is_empty = response.data.is_empty();
        accounts.extend(
            response
                .data
                .into_iter()
                .filter_map(AccountResource::into_account),
        );
        match next_page {
            Some(next_page) if !page_is_empty => page = next_page,
            _ => break,
        }
    }

    log::info!(
        "Requesting Firefly accounts...done ({} accounts)",
        accounts.len()
    );
    Ok(accounts)
}
