//! Core types and traits for padibook record stores.
//!
//! This crate provides the `RecordStore` trait and the bookkeeping model
//! (transactions, journal lines, accounts and report values), so storage
//! backends can live in separate crates.

pub mod models;
pub mod storage;
pub mod timestamp;

// Re-export key types at crate root for convenience
pub use models::{Account, AccountType, Credential, JournalLine, PaymentMethod, Transaction, TransactionKind};
pub use models::write::{RecordExpenseCommand, RecordIncomeCommand};
pub use models::read::{
    AccountTotals, BalanceSheet, DailyTotals, EntryKey, GeneralJournal, IncomeStatement, IntegrityReport,
    Ledger, LedgerRow, LedgerTotals, Summary, TransactionList, Trend, UnbalancedEntry,
};
pub use storage::{Record, RecordStore, RecordStoreExt, Resource, StorageError, TenantKey};
