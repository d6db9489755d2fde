use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr as _;

use crate::credentials::PowensAccountId;
use crate::powens_api::{
    CounterParty, Currency, PowensAccount, PowensTransaction, PowensTransactionId,
    TransactionType,
};

pub fn date(date: &str) -> NaiveDate {
    NaiveDate::from_str(date).unwrap()
}

pub fn amount(amount: &str) -> Decimal {
    Decimal::from_str(amount).unwrap()
}

pub fn account(id: u64, iban: Option<&str>) -> PowensAccount {
    PowensAccount {
        id: PowensAccountId(id),
        name: format!("Account {id}"),
        iban: iban.map(str::to_string),
        balance: None,
        formatted_balance: None,
        currency: Currency {
            id: "EUR".to_string(),
            symbol: Some("€".to_string()),
            precision: Some(2),
        },
    }
}

/// A card payment (or income for positive values) without counterparty
pub fn transaction(id: u64, account: u64, value: &str, on: &str) -> PowensTransaction {
    PowensTransaction {
        id: PowensTransactionId(id),
        id_account: PowensAccountId(account),
        date: date(on),
        datetime: None,
        vdate: Some(date(on)),
        vdatetime: None,
        value: Some(amount(value)),
        type_: TransactionType::Card,
        original_wording: Some(format!("ORIGINAL WORDING {id}")),
        simplified_wording: None,
        wording: Some(format!("Transaction {id}")),
        coming: false,
        counterparty: None,
        original_value: None,
        original_currency: None,
    }
}

/// One leg of a bank transfer to or from the account with `counterparty_iban`
pub fn transfer_leg(
    id: u64,
    account: u64,
    value: &str,
    on: &str,
    counterparty_iban: Option<&str>,
) -> PowensTransaction {
    PowensTransaction {
        type_: TransactionType::Transfer,
        counterparty: Some(CounterParty {
            label: Some(format!("Counterparty of {id}")),
            account_scheme_name: counterparty_iban.map(|_| "iban".to_string()),
            account_identification: counterparty_iban.map(str::to_string),
        }),
        ..transaction(id, account, value, on)
    }
}
