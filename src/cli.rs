use anyhow::{bail, Context as _, Result};
use console::{pad_str, style, Alignment, StyledObject};
use indicatif::{ProgressBar, ProgressStyle};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::args::Args;
use crate::credentials::{self, Credentials, FireflyAuth, FireflyTokenType, PowensAuth};
use crate::firefly_api::{self, Firefly, FireflyAccount, StoreResult};
use crate::powens_api::{self, Connection, Powens, PowensAccount};
use crate::terminal::{self, BulletPointPrinter};
use crate::transfer::{
    transfer_transactions, TransactionOutcome, TransferOptions, TransferReport, TransferRequest,
    TransferSink, TransferStatus,
};

mod mapping;

use mapping::{
    find_stale_entries, mapping_template, parse_mapping, remove_confirmed_entries,
    REMOVE_STALE_ENTRY_BY_DEFAULT,
};

const COLUMN_WIDTH: usize = 50;

pub async fn main(args: Args) -> Result<()> {
    args.validate()?;

    let mut cli = Cli::new(&args.credentials_path, args.auto).await?;
    if !args.auto {
        cli.main_setup().await?;
    }
    cli.main_list_connections().await?;
    let report = cli
        .main_sync(&TransferOptions {
            window: args.fetch_window(),
            combine_transfers: args.combine_transfers,
            skip_coming: args.skip_coming,
        })
        .await?;

    if report.has_failures() {
        bail!(
            "{} transactions and {} accounts failed to transfer",
            report.num_failed(),
            report.account_failures.len(),
        );
    }
    Ok(())
}

pub struct Cli {
    credentials_path: PathBuf,
    credentials: Credentials,
    powens_api: Powens,
    firefly_api: Firefly,
}

impl Cli {
    pub async fn new(credentials_path: &Path, auto: bool) -> Result<Self> {
        let credentials = load_or_create_credentials(credentials_path, auto).await?;
        let powens_api = Powens::with_auth(&credentials.powens)?;
        let firefly_api = Firefly::new(&credentials.firefly)?;
        Ok(Self {
            credentials_path: credentials_path.to_path_buf(),
            credentials,
            powens_api,
            firefly_api,
        })
    }

    async fn save_credentials(&self) -> Result<()> {
        credentials::save(&self.credentials, &self.credentials_path)
            .await
            .context("Failed to save credentials")
    }

    pub async fn main_setup(&mut self) -> Result<()> {
        let mut powens_accounts = self.list_powens_accounts().await?;
        if terminal::prompt_yes_no("Link another bank?", false)? {
            self.link_banks().await?;
            powens_accounts = self.list_powens_accounts().await?;
        }

        let firefly_accounts = firefly_api::get_accounts(&self.firefly_api)
            .await
            .context("Failed to list Firefly accounts")?;
        println!();
        print_accounts_side_by_side(&powens_accounts, &firefly_accounts);

        self.remove_stale_mapping_entries(&powens_accounts, &firefly_accounts)?;
        println!();
        print_mapping(&self.credentials, &powens_accounts, &firefly_accounts);
        if terminal::prompt_yes_no("Edit the account mapping?", self.credentials.mapping.is_empty())? {
            self.edit_mapping(&powens_accounts, &firefly_accounts)?;
            print_mapping(&self.credentials, &powens_accounts, &firefly_accounts);
        }

        self.save_credentials().await
    }

    async fn list_powens_accounts(&self) -> Result<Vec<PowensAccount>> {
        let accounts = powens_api::get_accounts(&self.powens_api)
            .await
            .context("Failed to list Powens accounts")?;
        println!();
        println!("{}", style_header("Powens accounts:"));
        let printer = BulletPointPrinter::new_stdout();
        if accounts.is_empty() {
            printer.print_item(style("(none)").italic());
        }
        for account in &accounts {
            printer.print_item(format!(
                "{} {}",
                style_powens_account(account),
                style(account.formatted_balance.as_deref().unwrap_or_default()).bold(),
            ));
        }
        Ok(accounts)
    }

    async fn link_banks(&self) -> Result<()> {
        let connectors = powens_api::get_connectors(&self.powens_api)
            .await
            .context("Failed to list Powens connectors")?;
        println!();
        println!("{}", style_header("Banks available in Powens:"));
        let printer = BulletPointPrinter::new_stdout();
        for connector in &connectors {
            printer.print_item(style(&connector.name).cyan());
        }

        let code = powens_api::generate_webview_code(&self.powens_api).await?;
        let url = powens_api::webview_url(
            &self.powens_api,
            &self.credentials.powens.client_id,
            &code,
        )?;
        println!();
        println!("Link your banks at:");
        println!("{}", style(url.as_str()).blue().underlined());
        if let Err(err) = open::that(url.as_str()) {
            log::warn!("Failed to open browser: {err}");
        }
        while !terminal::prompt_yes_no("Done linking banks?", true)? {}
        Ok(())
    }

    fn remove_stale_mapping_entries(
        &mut self,
        powens_accounts: &[PowensAccount],
        firefly_accounts: &[FireflyAccount],
    ) -> Result<()> {
        let stale = find_stale_entries(&self.credentials.mapping, powens_accounts, firefly_accounts);
        remove_confirmed_entries(&mut self.credentials.mapping, stale, |entry| {
            println!(
                "{} {}",
                style(format!("Mapping {} -> {}:", entry.origin, entry.destination)).yellow(),
                entry.reason,
            );
            terminal::prompt_yes_no("Remove this mapping entry?", REMOVE_STALE_ENTRY_BY_DEFAULT)
        })
    }

    fn edit_mapping(
        &mut self,
        powens_accounts: &[PowensAccount],
        firefly_accounts: &[FireflyAccount],
    ) -> Result<()> {
        let mut text = mapping_template(&self.credentials.mapping, powens_accounts, firefly_accounts)?;
        loop {
            let Some(edited) = terminal::edit(&text)? else {
                println!("Mapping unchanged");
                return Ok(());
            };
            match parse_mapping(&edited, powens_accounts, firefly_accounts) {
                Ok(mapping) => {
                    self.credentials.mapping = mapping;
                    return Ok(());
                }
                Err(err) => {
                    println!("{} {err:#}", style("Invalid mapping:").red().bold());
                    if !terminal::prompt_yes_no("Edit again?", true)? {
                        println!("Mapping unchanged");
                        return Ok(());
                    }
                    text = edited;
                }
            }
        }
    }

    pub async fn main_list_connections(&self) -> Result<()> {
        let connections = powens_api::get_connections(&self.powens_api)
            .await
            .context("Failed to list Powens connections")?;
        println!();
        println!("{}", style_header("Powens connections:"));
        let printer = BulletPointPrinter::new_stdout();
        if connections.is_empty() {
            printer.print_item(style("(none)").italic());
        }
        for connection in &connections {
            print_connection(&printer, connection);
        }
        Ok(())
    }

    pub async fn main_sync(&self, options: &TransferOptions) -> Result<TransferReport> {
        let version = firefly_api::test_connection(&self.firefly_api)
            .await
            .context("Firefly API connection failed")?;
        log::info!("Connected to Firefly III {version}");

        if self.credentials.mapping.is_empty() {
            log::warn!("No accounts are mapped, nothing will be transferred");
        }

        println!();
        println!("{}", style_header("Transferring transactions:"));
        let progress_bar = ProgressBar::new_spinner();
        progress_bar.set_style(ProgressStyle::with_template(
            "{spinner} {pos} submitted {wide_msg}",
        )?);
        progress_bar.enable_steady_tick(Duration::from_millis(100));
        let sink = ProgressSink {
            firefly: &self.firefly_api,
            progress_bar: &progress_bar,
        };
        let report = transfer_transactions(
            &self.credentials.mapping,
            &self.powens_api,
            &sink,
            options,
        )
        .await;
        progress_bar.finish_and_clear();
        let report = report?;

        print_report(&self.credentials, &report);
        Ok(report)
    }
}

/// Submits to Firefly while keeping a spinner updated
struct ProgressSink<'a> {
    firefly: &'a Firefly,
    progress_bar: &'a ProgressBar,
}

impl TransferSink for ProgressSink<'_> {
    async fn submit(&self, request: &TransferRequest) -> Result<StoreResult> {
        self.progress_bar
            .set_message(format!("{} {}", request.date, request.description));
        let result = self.firefly.submit(request).await;
        self.progress_bar.inc(1);
        if let Ok(StoreResult::Created(id)) = &result {
            BulletPointPrinter::new_progress_bar(self.progress_bar).print_item(format!(
                "{} {} {}",
                style_date(&request.date),
                style_transaction(&request.description),
                style(format!("(#{id})")).dim(),
            ));
        }
        result
    }
}

async fn load_or_create_credentials(path: &Path, auto: bool) -> Result<Credentials> {
    if let Some(credentials) = credentials::load(path)
        .await
        .with_context(|| format!("Failed to load credentials from {}", path.display()))?
    {
        return Ok(credentials);
    }

    if auto {
        bail!(
            "Credentials file {} not found. Run without --auto to create it.",
            path.display()
        );
    }
    if !terminal::prompt_yes_no(
        &format!("Credentials file {} not found. Create it?", path.display()),
        true,
    )? {
        bail!("Credentials file {} not found", path.display());
    }

    println!("{}", style_header("Powens:"));
    let powens = create_powens_auth().await?;
    println!("{}", style_header("Firefly III:"));
    let firefly = prompt_firefly_auth()?;

    let credentials = Credentials::new(powens, firefly);
    credentials.validate()?;
    credentials::save(&credentials, path)
        .await
        .context("Failed to save credentials")?;
    println!("Saved credentials to {}", path.display());
    Ok(credentials)
}

async fn create_powens_auth() -> Result<PowensAuth> {
    let domain = terminal::prompt("Powens domain (e.g. mycompany-sandbox.biapi.pro)")?;
    let client_id = terminal::prompt("Powens client id")?;
    let client_secret = terminal::prompt_secret("Powens client secret")?;

    let client = Powens::new(&domain)?;
    let (token, user_id) = powens_api::create_user(&client, &client_id, &client_secret)
        .await
        .context("Failed to create Powens user")?;
    Ok(PowensAuth {
        domain,
        client_id,
        user_id,
        token,
    })
}

fn prompt_firefly_auth() -> Result<FireflyAuth> {
    let url = terminal::prompt("Firefly III url (e.g. https://firefly.example.com)")?;
    let token_type = match terminal::prompt_select(
        "Firefly III token type",
        &["Personal access token", "OAuth access token"],
        0,
    )? {
        0 => FireflyTokenType::BearerToken,
        _ => FireflyTokenType::AccessToken,
    };
    let token = terminal::prompt_secret("Firefly III token")?;
    Ok(FireflyAuth {
        url,
        token: credentials::AccessToken::new(token),
        token_type,
    })
}

fn print_accounts_side_by_side(
    powens_accounts: &[PowensAccount],
    firefly_accounts: &[FireflyAccount],
) {
    println!(
        "{}{}",
        pad_str(
            &style_header("Powens").to_string(),
            COLUMN_WIDTH,
            Alignment::Left,
            None
        ),
        style_header("Firefly III"),
    );
    let rows = powens_accounts.len().max(firefly_accounts.len());
    for row in 0..rows {
        let powens = powens_accounts
            .get(row)
            .map(|account| format!("{} {}", account.id, account.name))
            .unwrap_or_default();
        let firefly = firefly_accounts
            .get(row)
            .map(|account| format!("{} {} [{}]", account.id, account.name, account.type_))
            .unwrap_or_default();
        println!(
            "{}{}",
            pad_str(&powens, COLUMN_WIDTH, Alignment::Left, Some("…")),
            firefly,
        );
    }
}

fn print_mapping(
    credentials: &Credentials,
    powens_accounts: &[PowensAccount],
    firefly_accounts: &[FireflyAccount],
) {
    println!("{}", style_header("Account mapping:"));
    let printer = BulletPointPrinter::new_stdout();
    if credentials.mapping.is_empty() {
        printer.print_item(style("(none)").italic());
    }
    for (origin, destination) in credentials.mapping.iter() {
        let powens_name = powens_accounts
            .iter()
            .find(|account| account.id == origin)
            .map(|account| account.name.as_str())
            .unwrap_or("?");
        let firefly_name = firefly_accounts
            .iter()
            .find(|account| account.id == destination)
            .map(|account| account.name.as_str())
            .unwrap_or("?");
        printer.print_item(format!(
            "{} -> {}",
            style(format!("{origin} {powens_name}")).magenta(),
            style(format!("{destination} {firefly_name}")).cyan(),
        ));
    }
}

fn print_connection(
    printer: &BulletPointPrinter<impl terminal::LineWriter + Clone>,
    connection: &Connection,
) {
    let state = match &connection.state {
        None => style("ok".to_string()).green(),
        Some(state) => style(state.clone()).yellow().bold(),
    };
    printer.print_item(format!(
        "{} {state}",
        style(format!("Connection {}", connection.id)).cyan().bold(),
    ));
    let printer = printer.indent();
    for detail in connection_details(connection) {
        printer.print_item(style(detail).dim());
    }
}

fn connection_details(connection: &Connection) -> Vec<String> {
    [
        ("created", &connection.created),
        ("last update", &connection.last_update),
        ("next update", &connection.next_try),
        ("expires", &connection.expire),
    ]
    .into_iter()
    .filter_map(|(label, value)| Some(format!("{label}: {}", value.as_deref()?)))
    .collect()
}

fn print_report(credentials: &Credentials, report: &TransferReport) {
    let printer = BulletPointPrinter::new_stdout();
    for (origin, destination) in credentials.mapping.iter() {
        printer.print_item(style_account(&format!(
            "Powens account {origin} -> Firefly account {destination}"
        )));
        let printer = printer.indent();
        if let Some(failure) = report
            .account_failures
            .iter()
            .find(|failure| failure.account == origin)
        {
            printer.print_item(style_failure(&failure.reason));
            continue;
        }
        let mut outcomes = report.outcomes_for(origin).peekable();
        if outcomes.peek().is_none() {
            printer.print_item(style("(no transactions)").italic());
        }
        for outcome in outcomes {
            print_outcome(&printer, outcome);
        }
    }

    println!();
    println!(
        "{} created, {} already present, {} skipped, {} failed",
        style(report.num_created()).green().bold(),
        style(report.num_duplicates()).bold(),
        style(report.num_skipped()).bold(),
        style(report.num_failed()).red().bold(),
    );
}

fn print_outcome(
    printer: &BulletPointPrinter<impl terminal::LineWriter + Clone>,
    outcome: &TransactionOutcome,
) {
    let status = match &outcome.status {
        TransferStatus::Created(id) => style(format!("created #{id}")).green(),
        TransferStatus::Duplicate => style("already present".to_string()).dim(),
        TransferStatus::Skipped(reason) => style(format!("skipped: {reason}")).yellow(),
        TransferStatus::Failed(reason) => style_failure(reason),
    };
    let pending = if outcome.coming {
        style(" (pending)").yellow().italic().to_string()
    } else {
        String::new()
    };
    printer.print_item(format!(
        "{} {} {}{pending} {status}",
        pad_str(
            &style_date(&outcome.date).to_string(),
            10,
            Alignment::Left,
            None
        ),
        pad_str(
            &style_amount(outcome.value).to_string(),
            12,
            Alignment::Right,
            None
        ),
        style_transaction(outcome.description.as_deref().unwrap_or("(no description)")),
    ));
}

fn style_header(header: &str) -> StyledObject<&str> {
    style(header).bold().underlined()
}

fn style_powens_account(account: &PowensAccount) -> StyledObject<String> {
    match &account.iban {
        Some(iban) => style(format!("{} {} ({iban})", account.id, account.name)).magenta(),
        None => style(format!("{} {}", account.id, account.name)).magenta(),
    }
}

fn style_account(account: &str) -> StyledObject<&str> {
    style(account).magenta()
}

fn style_transaction(transaction: &str) -> StyledObject<&str> {
    style(transaction).italic()
}

fn style_date(date: &chrono::NaiveDate) -> StyledObject<String> {
    style(date.format("%Y-%m-%d").to_string())
}

fn style_amount(amount: Option<Decimal>) -> StyledObject<String> {
    match amount {
        None => style("?".to_string()).bold(),
        Some(amount) if amount < Decimal::ZERO => style(amount.to_string()).bold().red(),
        Some(amount) => style(amount.to_string()).bold().green(),
    }
}

fn style_failure(reason: &str) -> StyledObject<String> {
    style(format!("failed: {reason}")).red()
}
