use std::{ops::Bound, process::ExitCode, sync::Arc};

use clap::Parser;
use serde::Serialize;
use time::{Date, OffsetDateTime, PrimitiveDateTime};
use tracing_subscriber::EnvFilter;

use padibook::{
    auth::{AuthError, Authenticator, Session},
    bookkeeper::Bookkeeper,
    catalog::Catalog,
    config::{CliArgs, Command, Config, RangeArgs},
    models::{
        write::{RecordExpenseCommand, RecordIncomeCommand},
        TransactionKind, TransactionList,
    },
    storage::{CsvStore, RecordStore},
};

type AnyError = Box<dyn std::error::Error>;

fn main() -> ExitCode {
    let cli = CliArgs::parse();
    let config = Config::load(&cli);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if config.logging.json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    match run(&cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &CliArgs, config: &Config) -> Result<(), AnyError> {
    let storage: Arc<dyn RecordStore> = Arc::new(CsvStore::new(config.storage.data_dir.clone()));
    let auth = Authenticator::new(storage.clone());
    let bookkeeper = Bookkeeper::new(storage).with_catalog(Catalog::default(), config.catalog.strict);

    tracing::debug!(data_dir = %config.storage.data_dir.display(), "Using CSV store");

    match &cli.command {
        Command::Register => {
            let (user, password) = credentials(cli)?;
            auth.register(user, password)?;
            println!("Registered {}", user.trim());
            return Ok(());
        }
        Command::Categories => return emit(cli, bookkeeper.catalog()),
        _ => {}
    }

    let session = if config.auth.enabled {
        let (user, password) = credentials(cli)?;
        auth.login(user, password)?
    } else {
        Session::anonymous()
    };

    match &cli.command {
        Command::Income(args) => {
            let command = RecordIncomeCommand {
                timestamp: args.at.unwrap_or_else(now),
                source: args.source.as_str().into(),
                amount: args.amount,
                method: args.method,
                note: args.note.as_deref().map(Into::into),
            };
            let txn = bookkeeper.record_income(&session, &command)?;
            emit(cli, &TransactionList(vec![txn]))
        }
        Command::Expense(args) => {
            let command = RecordExpenseCommand {
                timestamp: args.at.unwrap_or_else(now),
                category: args.category.as_str().into(),
                subcategory: args.subcategory.as_deref().map(Into::into),
                amount: args.amount,
                method: args.method,
                note: args.note.as_deref().map(Into::into),
            };
            let txn = bookkeeper.record_expense(&session, &command)?;
            emit(cli, &TransactionList(vec![txn]))
        }
        Command::Journal(range) => {
            let (from, to) = bounds(range);
            emit(cli, &bookkeeper.journal(&session, from, to)?)
        }
        Command::Ledger(args) => {
            let (from, to) = bounds(&args.range);
            let ledger = bookkeeper.ledger(&session, from, to)?;
            if args.totals {
                emit(cli, &ledger.totals())
            } else {
                emit(cli, &ledger)
            }
        }
        Command::IncomeStatement(range) => {
            let (from, to) = bounds(range);
            emit(cli, &bookkeeper.income_statement(&session, from, to)?)
        }
        Command::BalanceSheet(range) => {
            let (from, to) = bounds(range);
            emit(cli, &bookkeeper.balance_sheet(&session, from, to)?)
        }
        Command::Summary(range) => {
            let (from, to) = bounds(range);
            emit(cli, &bookkeeper.summary(&session, from, to)?)
        }
        Command::Trend(range) => {
            let (from, to) = bounds(range);
            emit(cli, &bookkeeper.trend(&session, from, to)?)
        }
        Command::Recent(args) => {
            let kind = match args.kind.as_str() {
                "expense" => TransactionKind::Expense,
                _ => TransactionKind::Income,
            };
            emit(cli, &bookkeeper.recent(&session, kind, args.limit)?)
        }
        Command::Check => {
            let report = bookkeeper.check(&session)?;
            emit(cli, &report)?;
            if report.is_clean() {
                Ok(())
            } else {
                Err(format!("{} unbalanced journal entries", report.0.len()).into())
            }
        }
        Command::Register | Command::Categories => Ok(()),
    }
}

fn credentials(cli: &CliArgs) -> Result<(&str, &str), AuthError> {
    match (cli.user.as_deref(), cli.password.as_deref()) {
        (Some(user), Some(password)) => Ok((user, password)),
        _ => Err(AuthError::BlankCredentials),
    }
}

fn bounds(range: &RangeArgs) -> (Bound<Date>, Bound<Date>) {
    let bound = |d: Option<Date>| d.map_or(Bound::Unbounded, Bound::Included);
    (bound(range.from), bound(range.to))
}

fn now() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    PrimitiveDateTime::new(now.date(), now.time())
}

fn emit<T: Serialize + std::fmt::Display>(cli: &CliArgs, value: &T) -> Result<(), AnyError> {
    if cli.json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", value);
    }
    Ok(())
}
