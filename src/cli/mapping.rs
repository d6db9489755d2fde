use anyhow::{ensure, Context as _, Result};
use std::fmt::Write as _;

use crate::credentials::{AccountMapping, FireflyAccountId, PowensAccountId};
use crate::firefly_api::FireflyAccount;
use crate::powens_api::PowensAccount;

/// A mapping entry pointing to an account that doesn't exist (anymore)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaleEntry {
    pub origin: PowensAccountId,
    pub destination: FireflyAccountId,
    pub reason: String,
}

pub fn find_stale_entries(
    mapping: &AccountMapping,
    powens_accounts: &[PowensAccount],
    firefly_accounts: &[FireflyAccount],
) -> Vec<StaleEntry> {
    mapping
        .iter()
        .filter_map(|(origin, destination)| {
            let reason = check_entry(origin, destination, powens_accounts, firefly_accounts).err()?;
            Some(StaleEntry {
                origin,
                destination,
                reason: reason.to_string(),
            })
        })
        .collect()
}

/// Answer assumed when the user just presses enter. An incomplete account
/// listing also makes accounts look missing.
pub const REMOVE_STALE_ENTRY_BY_DEFAULT: bool = false;

/// Asks `confirm` for every stale entry and removes the confirmed ones
pub fn remove_confirmed_entries(
    mapping: &mut AccountMapping,
    stale: Vec<StaleEntry>,
    mut confirm: impl FnMut(&StaleEntry) -> Result<bool>,
) -> Result<()> {
    for entry in stale {
        if confirm(&entry)? {
            mapping.remove(entry.origin);
        }
    }
    Ok(())
}

fn check_entry(
    origin: PowensAccountId,
    destination: FireflyAccountId,
    powens_accounts: &[PowensAccount],
    firefly_accounts: &[FireflyAccount],
) -> Result<()> {
    ensure!(
        powens_accounts.iter().any(|account| account.id == origin),
        "Powens account {origin} doesn't exist"
    );
    ensure!(
        firefly_accounts
            .iter()
            .any(|account| account.id == destination),
        "Firefly account {destination} doesn't exist"
    );
    Ok(())
}

/// Text the user edits in `$EDITOR`: the current mapping as YAML, preceded by
/// a comment listing all known accounts.
pub fn mapping_template(
    mapping: &AccountMapping,
    powens_accounts: &[PowensAccount],
    firefly_accounts: &[FireflyAccount],
) -> Result<String> {
    let mut text = String::new();
    writeln!(text, "# Map Powens accounts (left) to Firefly accounts (right), one per line:")?;
    writeln!(text, "#   <powens account id>: <firefly account id>")?;
    writeln!(text, "#")?;
    writeln!(text, "# Powens accounts:")?;
    for account in powens_accounts {
        match &account.iban {
            Some(iban) => writeln!(text, "#   {}: {} ({iban})", account.id, account.name)?,
            None => writeln!(text, "#   {}: {}", account.id, account.name)?,
        }
    }
    writeln!(text, "#")?;
    writeln!(text, "# Firefly accounts:")?;
    for account in firefly_accounts {
        writeln!(text, "#   {}: {} [{}]", account.id, account.name, account.type_)?;
    }
    if !mapping.is_empty() {
        text.push_str(&serde_yaml::to_string(mapping)?);
    }
    Ok(text)
}

/// Parse what the user wrote and make sure every entry refers to known accounts
pub fn parse_mapping(
    text: &str,
    powens_accounts: &[PowensAccount],
    firefly_accounts: &[FireflyAccount],
) -> Result<AccountMapping> {
    let is_blank = text
        .lines()
        .map(str::trim)
        .all(|line| line.is_empty() || line.starts_with('#'));
    if is_blank {
        return Ok(AccountMapping::new_empty());
    }

    let mapping: AccountMapping =
        serde_yaml::from_str(text).context("Mapping is not valid YAML")?;
    for (origin, destination) in mapping.iter() {
        check_entry(origin, destination, powens_accounts, firefly_accounts)?;
    }
    Ok(mapping)
}
