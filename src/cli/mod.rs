use std::fs::File;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::application::BalanceService;
use crate::domain::{
    AccountId, Cents, DEFAULT_LIMIT, DEFAULT_PAGE, PageRequest, Sort, format_cents, parse_cents,
};
use crate::io::Exporter;
use crate::rates::HttpRateProvider;
use crate::server;
use crate::settings::{DEFAULT_CONFIG_PATH, Settings};

/// Saldo - account balances and transaction ledger
#[derive(Parser)]
#[command(name = "saldo")]
#[command(about = "Account balances with an append-only transaction ledger")]
#[command(version)]
pub struct Cli {
    /// Settings file (TOML); missing files are ignored
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// Database file path (overrides the settings file)
    #[arg(short, long, global = true)]
    pub database: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Run the HTTP server
    Serve {
        /// Port to listen on (overrides the settings file)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Account management commands
    #[command(subcommand)]
    Account(AccountCommands),

    /// Credit an account from a bank card
    TopUp {
        account_id: AccountId,

        /// Amount (e.g., "50.00" or "50")
        amount: String,
    },

    /// Debit an account for a purchase
    Debit {
        account_id: AccountId,

        /// Amount (e.g., "50.00" or "50")
        amount: String,
    },

    /// Transfer money between accounts
    Transfer {
        /// Amount to transfer (e.g., "50.00" or "50")
        amount: String,

        /// Source account id
        #[arg(long)]
        from: AccountId,

        /// Destination account id
        #[arg(long)]
        to: AccountId,
    },

    /// Show the balance of an account
    Balance {
        account_id: AccountId,

        /// Convert to this currency (e.g., USD)
        #[arg(long)]
        currency: Option<String>,
    },

    /// List transactions of an account
    Transactions {
        account_id: AccountId,

        #[arg(long, default_value_t = DEFAULT_PAGE)]
        page: u32,

        #[arg(short, long, default_value_t = DEFAULT_LIMIT)]
        limit: u32,

        /// Sort by id, date or amount; prefix with '-' for descending
        #[arg(short, long, default_value = "date", allow_hyphen_values = true)]
        sort: String,
    },

    /// Export the full history of an account as CSV
    Export {
        account_id: AccountId,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum AccountCommands {
    /// Create a new account
    Create {
        /// Opening balance, recorded as a top-up
        #[arg(short, long)]
        balance: Option<String>,
    },

    /// Show account details
    Show { account_id: AccountId },
}

impl Cli {
    fn settings(&self) -> Result<Settings> {
        let mut settings = Settings::load(&self.config)
            .with_context(|| format!("Failed to load settings from '{}'", self.config))?;
        if let Some(database) = &self.database {
            settings.database.path = database.clone();
        }
        if self.verbose {
            settings.app.level = "debug".to_string();
        }
        Ok(settings)
    }

    async fn service(settings: &Settings) -> Result<BalanceService> {
        let rates = HttpRateProvider::new(
            settings.rates.base_url.clone(),
            settings.rates.access_key.clone(),
            &settings.rates.base_currency,
            settings.rates.timeout(),
        )
        .context("Invalid exchange rate settings")?;

        let service = BalanceService::init(
            &settings.database.path,
            settings.database.store_options(),
            Arc::new(rates),
        )
        .await?;
        Ok(service)
    }

    pub async fn run(self) -> Result<()> {
        let settings = self.settings()?;
        init_tracing(&settings.app.level);

        let service = Self::service(&settings).await?;

        match self.command {
            Commands::Init => {
                println!("Database initialized: {}", settings.database.path);
            }

            Commands::Serve { port } => {
                let mut server_settings = settings.server.clone();
                if let Some(port) = port {
                    server_settings.port = port;
                }
                let listener = tokio::net::TcpListener::bind(server_settings.address())
                    .await
                    .with_context(|| format!("Failed to bind {}", server_settings.address()))?;
                server::run_with_listener(service, listener).await?;
            }

            Commands::Account(account_cmd) => {
                run_account_command(&service, account_cmd).await?;
            }

            Commands::TopUp { account_id, amount } => {
                let amount = parse_amount(&amount)?;
                let balance = service.top_up(account_id, amount).await?;
                println!(
                    "Topped up account {}: +{} (balance {})",
                    account_id,
                    format_cents(amount),
                    format_cents(balance)
                );
            }

            Commands::Debit { account_id, amount } => {
                let amount = parse_amount(&amount)?;
                let balance = service.debit(account_id, amount).await?;
                println!(
                    "Debited account {}: -{} (balance {})",
                    account_id,
                    format_cents(amount),
                    format_cents(balance)
                );
            }

            Commands::Transfer { amount, from, to } => {
                let amount = parse_amount(&amount)?;
                let balance = service.transfer(from, to, amount).await?;
                println!(
                    "Transferred {} from account {} to account {} (balance of {}: {})",
                    format_cents(amount),
                    from,
                    to,
                    to,
                    format_cents(balance)
                );
            }

            Commands::Balance {
                account_id,
                currency,
            } => {
                let view = service.get_balance(account_id, currency.as_deref()).await?;
                println!(
                    "Account {}: {} {}",
                    view.account_id, view.balance, view.currency
                );
            }

            Commands::Transactions {
                account_id,
                page,
                limit,
                sort,
            } => {
                let sort: Sort = sort.parse()?;
                let records = service
                    .get_transactions(account_id, PageRequest::new(page, limit, sort))
                    .await?;

                if records.is_empty() {
                    println!("No transactions found.");
                    return Ok(());
                }

                println!(
                    "{:<8} {:<26} {:>12}  {}",
                    "ID", "DATE", "AMOUNT", "OPERATION"
                );
                println!("{}", "-".repeat(72));
                for record in records {
                    println!(
                        "{:<8} {:<26} {:>12}  {}",
                        record.id,
                        record.date.format("%Y-%m-%d %H:%M:%S"),
                        format_cents(record.amount),
                        record.operation
                    );
                }
            }

            Commands::Export { account_id, output } => {
                let exporter = Exporter::new(&service);
                let count = match output {
                    Some(path) => {
                        let file = File::create(&path)
                            .with_context(|| format!("Failed to create '{path}'"))?;
                        exporter.export_transactions_csv(account_id, file).await?
                    }
                    None => {
                        exporter
                            .export_transactions_csv(account_id, std::io::stdout())
                            .await?
                    }
                };
                eprintln!("Exported {count} transaction(s)");
            }
        }

        Ok(())
    }
}

async fn run_account_command(service: &BalanceService, cmd: AccountCommands) -> Result<()> {
    match cmd {
        AccountCommands::Create { balance } => {
            let opening = balance.as_deref().map(parse_amount).transpose()?;
            let account_id = service.open_account().await?;
            match opening {
                Some(amount) if amount > 0 => {
                    let balance = service.top_up(account_id, amount).await?;
                    println!(
                        "Created account {} (balance {})",
                        account_id,
                        format_cents(balance)
                    );
                }
                _ => println!("Created account {account_id}"),
            }
        }

        AccountCommands::Show { account_id } => {
            let account = service
                .store()
                .get_account(account_id)
                .await?
                .with_context(|| format!("Account not found: {account_id}"))?;
            let records = service.store().count_transactions(account_id).await?;

            println!("Account:      {}", account.id);
            println!(
                "Balance:      {} {}",
                format_cents(account.balance),
                service.base_currency()
            );
            println!(
                "Created:      {}",
                account.created_at.format("%Y-%m-%d %H:%M:%S")
            );
            println!("Transactions: {records}");
        }
    }
    Ok(())
}

fn parse_amount(input: &str) -> Result<Cents> {
    parse_cents(input).with_context(|| format!("Invalid amount '{input}'. Use '50.00' or '50'"))
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("saldo={level}")));

    // Ignore the error when a subscriber is already installed.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
