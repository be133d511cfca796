use std::{ops::Bound, sync::Arc};

use thiserror::Error;
use time::Date;
use uuid::Uuid;

use crate::{
    auth::Session,
    catalog::Catalog,
    journal::{derive_from_transaction, JournalError},
    ledger::{build_ledger, filter_range},
    models::{
        write::{RecordExpenseCommand, RecordIncomeCommand},
        BalanceSheet, GeneralJournal, IncomeStatement, IntegrityReport, JournalLine, Ledger, Summary, Transaction,
        TransactionKind, TransactionList, Trend,
    },
    reports,
    storage::{Record, RecordStore, RecordStoreExt, Resource, StorageError},
};

#[derive(Debug, Error)]
pub enum BookkeepingError {
    #[error(transparent)]
    Journal(#[from] JournalError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("{field} {value:?} is not in the catalog")]
    NotInCatalog { field: &'static str, value: String },
}

fn trimmed(value: &Option<Arc<str>>) -> Option<Arc<str>> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(Arc::from)
}

/// Records transactions with their journal entries and reads reports back,
/// always within the session's partition.
pub struct Bookkeeper {
    storage: Arc<dyn RecordStore>,
    catalog: Catalog,
    strict_catalog: bool,
}

impl Bookkeeper {
    pub fn new(storage: Arc<dyn RecordStore>) -> Self {
        Self {
            storage,
            catalog: Catalog::default(),
            strict_catalog: false,
        }
    }

    /// Replaces the catalog; with `strict`, entries outside it are rejected.
    pub fn with_catalog(mut self, catalog: Catalog, strict: bool) -> Self {
        self.catalog = catalog;
        self.strict_catalog = strict;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn record_income(&self, session: &Session, command: &RecordIncomeCommand) -> Result<Transaction, BookkeepingError> {
        if self.strict_catalog && !self.catalog.has_income_source(&command.source) {
            return Err(BookkeepingError::NotInCatalog {
                field: "source",
                value: command.source.to_string(),
            });
        }

        let txn = Transaction {
            id: Some(Uuid::new_v4()),
            timestamp: command.timestamp,
            kind: TransactionKind::Income,
            category: Arc::from(command.source.trim()),
            subcategory: None,
            amount: command.amount,
            method: command.method,
            note: trimmed(&command.note),
            owner: session.owner(),
        };
        self.post(session, txn)
    }

    pub fn record_expense(&self, session: &Session, command: &RecordExpenseCommand) -> Result<Transaction, BookkeepingError> {
        if command.category.trim().is_empty() {
            return Err(JournalError::BlankField("category").into());
        }
        let subcategory = trimmed(&command.subcategory);

        if self.strict_catalog {
            if !self.catalog.has_expense_category(&command.category) {
                return Err(BookkeepingError::NotInCatalog {
                    field: "category",
                    value: command.category.to_string(),
                });
            }
            if let Some(sub) = &subcategory {
                if !self.catalog.has_subcategory(&command.category, sub) {
                    return Err(BookkeepingError::NotInCatalog {
                        field: "subcategory",
                        value: sub.to_string(),
                    });
                }
            }
        }

        let txn = Transaction {
            id: Some(Uuid::new_v4()),
            timestamp: command.timestamp,
            kind: TransactionKind::Expense,
            category: Arc::from(command.category.trim()),
            subcategory,
            amount: command.amount,
            method: command.method,
            note: trimmed(&command.note),
            owner: session.owner(),
        };
        self.post(session, txn)
    }

    /// Derives the journal pair first so invalid input is never stored, then
    /// appends the transaction followed by its two lines.
    fn post(&self, session: &Session, txn: Transaction) -> Result<Transaction, BookkeepingError> {
        let lines = derive_from_transaction(&txn)?;
        let tenant = session.tenant();

        self.storage.append(&[Record::Transaction(txn.clone())], Resource::for_kind(txn.kind), tenant)?;
        let journal: Vec<Record> = lines.into_iter().map(Record::JournalLine).collect();
        self.storage.append(&journal, Resource::Journal, tenant)?;

        tracing::info!(
            user = %session.identity.name,
            kind = %txn.kind,
            amount = %txn.amount,
            method = %txn.method,
            "Recorded transaction"
        );
        Ok(txn)
    }

    fn journal_lines(&self, session: &Session, from: Bound<Date>, to: Bound<Date>) -> Result<Vec<JournalLine>, BookkeepingError> {
        let lines = self.storage.load_journal(session.tenant())?;
        Ok(filter_range(&lines, from, to))
    }

    /// The general journal within the bounds, ordered by timestamp.
    pub fn journal(&self, session: &Session, from: Bound<Date>, to: Bound<Date>) -> Result<GeneralJournal, BookkeepingError> {
        let mut lines = self.journal_lines(session, from, to)?;
        lines.sort_by_key(|l| l.timestamp);
        Ok(GeneralJournal(lines))
    }

    pub fn ledger(&self, session: &Session, from: Bound<Date>, to: Bound<Date>) -> Result<Ledger, BookkeepingError> {
        let lines = self.storage.load_journal(session.tenant())?;
        Ok(build_ledger(&lines, from, to))
    }

    pub fn income_statement(&self, session: &Session, from: Bound<Date>, to: Bound<Date>) -> Result<IncomeStatement, BookkeepingError> {
        let lines = self.journal_lines(session, from, to)?;
        Ok(reports::compute_income_statement(&lines))
    }

    pub fn balance_sheet(&self, session: &Session, from: Bound<Date>, to: Bound<Date>) -> Result<BalanceSheet, BookkeepingError> {
        let lines = self.journal_lines(session, from, to)?;
        Ok(reports::compute_balance_sheet(&lines))
    }

    pub fn summary(&self, session: &Session, from: Bound<Date>, to: Bound<Date>) -> Result<Summary, BookkeepingError> {
        let mut txns = self.storage.load_transactions(TransactionKind::Income, session.tenant())?;
        txns.extend(self.storage.load_transactions(TransactionKind::Expense, session.tenant())?);
        Ok(reports::summarize(&txns, from, to))
    }

    pub fn trend(&self, session: &Session, from: Bound<Date>, to: Bound<Date>) -> Result<Trend, BookkeepingError> {
        let lines = self.journal_lines(session, from, to)?;
        Ok(reports::daily_trend(&lines))
    }

    /// The `limit` most recent transactions of a kind, newest first.
    pub fn recent(&self, session: &Session, kind: TransactionKind, limit: usize) -> Result<TransactionList, BookkeepingError> {
        let mut txns = self.storage.load_transactions(kind, session.tenant())?;
        // Newest first; among equal timestamps the later-recorded one wins.
        txns.reverse();
        txns.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        txns.truncate(limit);
        Ok(TransactionList(txns))
    }

    pub fn check(&self, session: &Session) -> Result<IntegrityReport, BookkeepingError> {
        let lines = self.storage.load_journal(session.tenant())?;
        let report = reports::find_unbalanced(&lines);
        if !report.is_clean() {
            tracing::warn!(user = %session.identity.name, entries = report.0.len(), "Journal has unbalanced entries");
        }
        Ok(report)
    }
}
