use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Confirm, Editor, Input, Password, Select};

pub fn prompt(prompt: &str) -> Result<String> {
    Ok(Input::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .interact_text()?)
}

/// Like [prompt], but doesn't echo the input
pub fn prompt_secret(prompt: &str) -> Result<String> {
    Ok(Password::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .interact()?)
}

pub fn prompt_yes_no(prompt: &str, default: bool) -> Result<bool> {
    Ok(Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(default)
        .interact()?)
}

pub fn prompt_select(prompt: &str, options: &[&str], default: usize) -> Result<usize> {
    Ok(Select::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .items(options)
        .default(default)
        .interact()?)
}

/// Opens `$EDITOR` with `text`. Returns None if the user didn't save.
pub fn edit(text: &str) -> Result<Option<String>> {
    Ok(Editor::new().extension(".yml").edit(text)?)
}
