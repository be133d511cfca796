use std::{fmt::Display, sync::Arc};

use thiserror::Error;

use crate::models::{Credential, JournalLine, Transaction, TransactionKind};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(String),
    #[error("invalid tenant key: {0:?}")]
    InvalidTenant(String),
    #[error("record does not belong in resource {0}")]
    ResourceMismatch(Resource),
    #[error("{path} has {rows} unreadable rows; fix or remove them before recording to it")]
    UnreadableRows { path: String, rows: usize },
    #[error("{0}")]
    Other(String),
}

/// A named set of records. Each resource is stored separately, per tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Resource {
    IncomeTransactions,
    ExpenseTransactions,
    Journal,
    Credentials,
}

impl Resource {
    pub fn for_kind(kind: TransactionKind) -> Self {
        match kind {
            TransactionKind::Income => Resource::IncomeTransactions,
            TransactionKind::Expense => Resource::ExpenseTransactions,
        }
    }

    pub fn accepts(&self, record: &Record) -> bool {
        match (self, record) {
            (Resource::IncomeTransactions, Record::Transaction(t)) => t.kind == TransactionKind::Income,
            (Resource::ExpenseTransactions, Record::Transaction(t)) => t.kind == TransactionKind::Expense,
            (Resource::Journal, Record::JournalLine(_)) => true,
            (Resource::Credentials, Record::Credential(_)) => true,
            _ => false,
        }
    }
}

impl Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Resource::IncomeTransactions => "income-transactions",
            Resource::ExpenseTransactions => "expense-transactions",
            Resource::Journal => "journal",
            Resource::Credentials => "credentials",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Transaction(Transaction),
    JournalLine(JournalLine),
    Credential(Credential),
}

/// Partition key for one owner's records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TenantKey(Arc<str>);

impl TenantKey {
    pub fn new(key: &str) -> Result<Self, StorageError> {
        let valid = !key.is_empty()
            && key != "."
            && key != ".."
            && key.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.');
        if !valid {
            return Err(StorageError::InvalidTenant(key.to_string()));
        }
        Ok(Self(Arc::from(key)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TenantKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Flat record persistence. `None` as tenant selects the shared partition.
///
/// Implementations treat a resource that was never written as empty.
pub trait RecordStore: Send + Sync {
    fn load(&self, resource: Resource, tenant: Option<&TenantKey>) -> Result<Vec<Record>, StorageError>;
    fn append(&self, records: &[Record], resource: Resource, tenant: Option<&TenantKey>) -> Result<(), StorageError>;
    fn save(&self, records: &[Record], resource: Resource, tenant: Option<&TenantKey>) -> Result<(), StorageError>;
}

/// Typed accessors over [`RecordStore::load`].
pub trait RecordStoreExt: RecordStore {
    fn load_transactions(&self, kind: TransactionKind, tenant: Option<&TenantKey>) -> Result<Vec<Transaction>, StorageError> {
        Ok(self.load(Resource::for_kind(kind), tenant)?
            .into_iter()
            .filter_map(|r| match r {
                Record::Transaction(t) if t.kind == kind => Some(t),
                _ => None,
            })
            .collect())
    }

    fn load_journal(&self, tenant: Option<&TenantKey>) -> Result<Vec<JournalLine>, StorageError> {
        Ok(self.load(Resource::Journal, tenant)?
            .into_iter()
            .filter_map(|r| match r {
                Record::JournalLine(l) => Some(l),
                _ => None,
            })
            .collect())
    }

    fn load_credentials(&self) -> Result<Vec<Credential>, StorageError> {
        Ok(self.load(Resource::Credentials, None)?
            .into_iter()
            .filter_map(|r| match r {
                Record::Credential(c) => Some(c),
                _ => None,
            })
            .collect())
    }
}

impl<T: RecordStore + ?Sized> RecordStoreExt for T {}

/// Checks that every record belongs in `resource`.
pub fn check_records(records: &[Record], resource: Resource) -> Result<(), StorageError> {
    match records.iter().find(|r| !resource.accepts(r)) {
        Some(_) => Err(StorageError::ResourceMismatch(resource)),
        None => Ok(()),
    }
}
