use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde::Deserialize;
use time::{Date, PrimitiveDateTime};

use crate::models::{timestamp, PaymentMethod};

#[derive(Parser, Debug)]
#[command(name = "padibook", about = "Padibook - double-entry bookkeeping for rice farmers")]
pub struct CliArgs {
    /// Path to config file
    #[arg(short, long, global = true, default_value = "padibook.toml")]
    pub config: String,

    /// Data directory (overrides config file)
    #[arg(short, long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Log level (overrides config file)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Username, required when auth is enabled
    #[arg(short, long, global = true)]
    pub user: Option<String>,

    /// Password, required when auth is enabled
    #[arg(short, long, global = true)]
    pub password: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Register a new user (uses --user and --password)
    Register,
    /// Record income
    Income(IncomeArgs),
    /// Record an expense
    Expense(ExpenseArgs),
    /// Show the general journal
    Journal(RangeArgs),
    /// Show the ledger with running balances per account
    Ledger(LedgerArgs),
    /// Show revenue, expense and net income
    IncomeStatement(RangeArgs),
    /// Show assets, liabilities and equity
    BalanceSheet(RangeArgs),
    /// Show income and expense totals from recorded transactions
    Summary(RangeArgs),
    /// Show revenue and expense per day
    Trend(RangeArgs),
    /// Show the most recent transactions
    Recent(RecentArgs),
    /// Report journal entries that do not balance
    Check,
    /// List income sources and expense categories
    Categories,
}

#[derive(Args, Debug)]
pub struct IncomeArgs {
    /// Income source, e.g. "Penjualan Padi"
    #[arg(long)]
    pub source: String,

    #[arg(long)]
    pub amount: rust_decimal::Decimal,

    /// cash, transfer, receivable or receivable-settlement
    #[arg(long, default_value = "cash")]
    pub method: PaymentMethod,

    #[arg(long)]
    pub note: Option<String>,

    /// Timestamp (YYYY-MM-DD or "YYYY-MM-DD HH:MM:SS"), defaults to now
    #[arg(long, value_parser = parse_timestamp_arg)]
    pub at: Option<PrimitiveDateTime>,
}

#[derive(Args, Debug)]
pub struct ExpenseArgs {
    /// Expense category, e.g. "Pupuk"
    #[arg(long)]
    pub category: String,

    /// Subcategory, e.g. "Urea"; the expense is booked against it when given
    #[arg(long)]
    pub subcategory: Option<String>,

    #[arg(long)]
    pub amount: rust_decimal::Decimal,

    /// cash, transfer, payable or payable-settlement
    #[arg(long, default_value = "cash")]
    pub method: PaymentMethod,

    #[arg(long)]
    pub note: Option<String>,

    /// Timestamp (YYYY-MM-DD or "YYYY-MM-DD HH:MM:SS"), defaults to now
    #[arg(long, value_parser = parse_timestamp_arg)]
    pub at: Option<PrimitiveDateTime>,
}

#[derive(Args, Debug, Clone, Copy)]
pub struct RangeArgs {
    /// First date to include (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date_arg)]
    pub from: Option<Date>,

    /// Last date to include (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date_arg)]
    pub to: Option<Date>,
}

#[derive(Args, Debug)]
pub struct LedgerArgs {
    #[command(flatten)]
    pub range: RangeArgs,

    /// Only print per-account totals
    #[arg(long)]
    pub totals: bool,
}

#[derive(Args, Debug)]
pub struct RecentArgs {
    /// income or expense
    #[arg(long, default_value = "income", value_parser = ["income", "expense"])]
    pub kind: String,

    #[arg(short = 'n', long, default_value_t = 5)]
    pub limit: usize,
}

fn parse_date_arg(s: &str) -> Result<Date, String> {
    timestamp::parse_date(s).ok_or_else(|| format!("expected YYYY-MM-DD, got {:?}", s))
}

fn parse_timestamp_arg(s: &str) -> Result<PrimitiveDateTime, String> {
    timestamp::parse_timestamp(s).ok_or_else(|| format!("expected YYYY-MM-DD[ HH:MM:SS], got {:?}", s))
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub json: bool,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AuthConfig {
    /// When true, every command except `register` and `categories` needs a
    /// valid --user/--password and works on that user's records.
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CatalogConfig {
    /// Reject sources and categories that are not in the catalog.
    #[serde(default)]
    pub strict: bool,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            data_dir: default_data_dir(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Config {
    pub fn load(cli: &CliArgs) -> Self {
        let mut config = match std::fs::read_to_string(&cli.config) {
            Ok(contents) => Self::parse(&contents).unwrap_or_else(|e| {
                eprintln!("Warning: Failed to parse config file: {}", e);
                Config::default()
            }),
            Err(_) => Config::default(),
        };

        // CLI overrides
        if let Some(ref dir) = cli.data_dir {
            config.storage.data_dir = dir.clone();
        }
        if let Some(ref level) = cli.log_level {
            config.logging.level = level.clone();
        }

        config
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.storage.data_dir, PathBuf::from("data"));
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
        assert!(!config.auth.enabled);
        assert!(!config.catalog.strict);
    }

    #[test]
    fn reads_all_sections() {
        let config = Config::parse(
            r#"
            [storage]
            data_dir = "/var/lib/padibook"

            [logging]
            level = "debug"
            json = true

            [auth]
            enabled = true

            [catalog]
            strict = true
            "#,
        )
        .unwrap();
        assert_eq!(config.storage.data_dir, PathBuf::from("/var/lib/padibook"));
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
        assert!(config.auth.enabled);
        assert!(config.catalog.strict);
    }

    #[test]
    fn cli_overrides_config() {
        let cli = CliArgs::parse_from([
            "padibook",
            "--config",
            "/nonexistent/padibook.toml",
            "--data-dir",
            "/tmp/books",
            "--log-level",
            "warn",
            "summary",
        ]);
        let config = Config::load(&cli);
        assert_eq!(config.storage.data_dir, PathBuf::from("/tmp/books"));
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn parses_record_commands() {
        let cli = CliArgs::parse_from([
            "padibook",
            "expense",
            "--category",
            "Pupuk",
            "--subcategory",
            "Urea",
            "--amount",
            "50000",
            "--method",
            "Pelunasan Utang",
            "--at",
            "2024-03-02",
        ]);
        match cli.command {
            Command::Expense(args) => {
                assert_eq!(args.method, PaymentMethod::PayableSettlement);
                assert_eq!(args.amount, rust_decimal::Decimal::from(50000));
                assert_eq!(args.at.map(|t| t.date()), time::Date::from_calendar_date(2024, time::Month::March, 2).ok());
            }
            other => panic!("Expected Expense, got {:?}", other),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = CliArgs::parse_from([
            "padibook",
            "ledger",
            "--json",
            "--user",
            "budi",
            "--password",
            "padi1",
            "--data-dir",
            "/tmp/books",
        ]);
        assert!(cli.json);
        assert_eq!(cli.user.as_deref(), Some("budi"));
        assert_eq!(cli.password.as_deref(), Some("padi1"));
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/books")));
        assert!(matches!(cli.command, Command::Ledger(_)));
    }

    #[test]
    fn rejects_bad_dates() {
        assert!(CliArgs::try_parse_from(["padibook", "ledger", "--from", "01-03-2024"]).is_err());
    }
}
