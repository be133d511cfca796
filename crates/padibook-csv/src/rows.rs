//! On-disk row layouts. Writers use English headers; readers also accept the
//! Indonesian headers of older data files.

use std::{str::FromStr, sync::Arc};

use padibook_core::{
    timestamp::{format_timestamp, parse_timestamp},
    Account, Credential, JournalLine, PaymentMethod, Record, Resource, Transaction, TransactionKind,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const INCOME_HEADERS: [&str; 7] = ["id", "timestamp", "source", "amount", "method", "note", "owner"];
pub const EXPENSE_HEADERS: [&str; 8] = ["id", "timestamp", "category", "subcategory", "amount", "method", "note", "owner"];
pub const JOURNAL_HEADERS: [&str; 8] = ["entry_id", "timestamp", "account", "kind", "debit", "kredit", "memo", "owner"];
pub const CREDENTIAL_HEADERS: [&str; 2] = ["username", "password_hash"];

pub fn headers(resource: Resource) -> &'static [&'static str] {
    match resource {
        Resource::IncomeTransactions => &INCOME_HEADERS,
        Resource::ExpenseTransactions => &EXPENSE_HEADERS,
        Resource::Journal => &JOURNAL_HEADERS,
        Resource::Credentials => &CREDENTIAL_HEADERS,
    }
}

#[derive(Debug, Deserialize)]
pub struct IncomeRow {
    #[serde(default)]
    id: Option<String>,
    #[serde(alias = "Tanggal")]
    timestamp: String,
    #[serde(alias = "Sumber")]
    source: String,
    #[serde(alias = "Jumlah")]
    amount: String,
    #[serde(alias = "Metode")]
    method: String,
    #[serde(default, alias = "Keterangan")]
    note: Option<String>,
    #[serde(default, alias = "Username")]
    owner: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExpenseRow {
    #[serde(default)]
    id: Option<String>,
    #[serde(alias = "Tanggal")]
    timestamp: String,
    #[serde(alias = "Kategori")]
    category: String,
    #[serde(default, alias = "Sub Kategori")]
    subcategory: Option<String>,
    #[serde(alias = "Jumlah")]
    amount: String,
    // Older expense files have no method column; those expenses were paid in cash.
    #[serde(default, alias = "Metode")]
    method: Option<String>,
    #[serde(default, alias = "Keterangan")]
    note: Option<String>,
    #[serde(default, alias = "Username")]
    owner: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct JournalRow {
    #[serde(default)]
    entry_id: Option<String>,
    #[serde(alias = "Tanggal")]
    timestamp: String,
    #[serde(default, alias = "Akun")]
    account: Option<String>,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default, alias = "Debit")]
    debit: Option<String>,
    #[serde(default, alias = "Kredit")]
    kredit: Option<String>,
    #[serde(default, alias = "Keterangan")]
    memo: Option<String>,
    #[serde(default, alias = "Username")]
    owner: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CredentialRow {
    #[serde(alias = "Username")]
    username: String,
    #[serde(alias = "Password")]
    password_hash: String,
}

#[derive(Serialize)]
struct IncomeOut<'a> {
    id: Option<String>,
    timestamp: String,
    source: &'a str,
    amount: String,
    method: &'a str,
    note: Option<&'a str>,
    owner: Option<&'a str>,
}

#[derive(Serialize)]
struct ExpenseOut<'a> {
    id: Option<String>,
    timestamp: String,
    category: &'a str,
    subcategory: Option<&'a str>,
    amount: String,
    method: &'a str,
    note: Option<&'a str>,
    owner: Option<&'a str>,
}

#[derive(Serialize)]
struct JournalOut<'a> {
    entry_id: Option<String>,
    timestamp: String,
    account: &'a str,
    kind: &'a str,
    debit: String,
    kredit: String,
    memo: &'a str,
    owner: Option<&'a str>,
}

#[derive(Serialize)]
struct CredentialOut<'a> {
    username: &'a str,
    password_hash: &'a str,
}

fn parse_amount(field: &str, value: &str) -> Result<Decimal, String> {
    let value = value.trim();
    Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .map_err(|e| format!("{}: {:?} is not a number ({})", field, value, e))
}

fn parse_optional_amount(field: &str, value: Option<&str>) -> Result<Decimal, String> {
    match value.map(str::trim) {
        None | Some("") => Ok(Decimal::ZERO),
        Some(v) => parse_amount(field, v),
    }
}

fn parse_id(value: Option<&str>) -> Result<Option<Uuid>, String> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => Uuid::parse_str(v)
            .map(Some)
            .map_err(|e| format!("id: {:?} ({})", v, e)),
    }
}

fn text(value: Option<String>) -> Option<Arc<str>> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(Arc::from)
}

fn required(field: &str, value: &str) -> Result<Arc<str>, String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(format!("{} is blank", field));
    }
    Ok(Arc::from(value))
}

fn positive_amount(value: &str) -> Result<Decimal, String> {
    let amount = parse_amount("amount", value)?;
    if amount <= Decimal::ZERO {
        return Err(format!("amount {} is not positive", amount));
    }
    Ok(amount)
}

fn timestamp(value: &str) -> Result<time::PrimitiveDateTime, String> {
    parse_timestamp(value).ok_or_else(|| format!("timestamp: {:?} is not a timestamp", value))
}

impl IncomeRow {
    pub fn decode(self) -> Result<Transaction, String> {
        Ok(Transaction {
            id: parse_id(self.id.as_deref())?,
            timestamp: timestamp(&self.timestamp)?,
            kind: TransactionKind::Income,
            category: required("source", &self.source)?,
            subcategory: None,
            amount: positive_amount(&self.amount)?,
            method: PaymentMethod::from_str(&self.method)?,
            note: text(self.note),
            owner: text(self.owner),
        })
    }
}

impl ExpenseRow {
    pub fn decode(self) -> Result<Transaction, String> {
        Ok(Transaction {
            id: parse_id(self.id.as_deref())?,
            timestamp: timestamp(&self.timestamp)?,
            kind: TransactionKind::Expense,
            category: required("category", &self.category)?,
            subcategory: text(self.subcategory),
            amount: positive_amount(&self.amount)?,
            method: match text(self.method) {
                Some(method) => PaymentMethod::from_str(&method)?,
                None => PaymentMethod::Cash,
            },
            note: text(self.note),
            owner: text(self.owner),
        })
    }
}

impl JournalRow {
    pub fn decode(self) -> Result<JournalLine, String> {
        let name = self.account.as_deref().unwrap_or("");
        let account = match self.kind.as_deref().map(str::trim) {
            Some(tag) if !tag.is_empty() => Account::from_tag(tag, name),
            _ => Account::classify(name),
        }
        .ok_or_else(|| format!("account missing or unknown: {:?}", name))?;

        let line = JournalLine {
            entry_id: parse_id(self.entry_id.as_deref())?,
            timestamp: timestamp(&self.timestamp)?,
            account,
            debit: parse_optional_amount("debit", self.debit.as_deref())?,
            kredit: parse_optional_amount("kredit", self.kredit.as_deref())?,
            memo: text(self.memo).unwrap_or_else(|| Arc::from("")),
            owner: text(self.owner),
        };

        if !line.is_well_formed() {
            return Err(format!("line has debit {} and kredit {}", line.debit, line.kredit));
        }
        Ok(line)
    }
}

impl CredentialRow {
    pub fn decode(self) -> Result<Credential, String> {
        Ok(Credential {
            username: required("username", &self.username)?,
            password_hash: required("password_hash", &self.password_hash)?,
        })
    }
}

/// Reads one record of `resource` from a CSV row.
pub fn decode(resource: Resource, row: &csv::StringRecord, headers: &csv::StringRecord) -> Result<Record, String> {
    let err = |e: csv::Error| e.to_string();
    match resource {
        Resource::IncomeTransactions => row
            .deserialize::<IncomeRow>(Some(headers))
            .map_err(err)?
            .decode()
            .map(Record::Transaction),
        Resource::ExpenseTransactions => row
            .deserialize::<ExpenseRow>(Some(headers))
            .map_err(err)?
            .decode()
            .map(Record::Transaction),
        Resource::Journal => row
            .deserialize::<JournalRow>(Some(headers))
            .map_err(err)?
            .decode()
            .map(Record::JournalLine),
        Resource::Credentials => row
            .deserialize::<CredentialRow>(Some(headers))
            .map_err(err)?
            .decode()
            .map(Record::Credential),
    }
}

/// Writes one record in the current layout.
pub fn encode<W: std::io::Write>(writer: &mut csv::Writer<W>, record: &Record) -> Result<(), csv::Error> {
    match record {
        Record::Transaction(t) => match t.kind {
            TransactionKind::Income => writer.serialize(IncomeOut {
                id: t.id.map(|id| id.to_string()),
                timestamp: format_timestamp(t.timestamp),
                source: &t.category,
                amount: t.amount.to_string(),
                method: t.method.as_str(),
                note: t.note.as_deref(),
                owner: t.owner.as_deref(),
            }),
            TransactionKind::Expense => writer.serialize(ExpenseOut {
                id: t.id.map(|id| id.to_string()),
                timestamp: format_timestamp(t.timestamp),
                category: &t.category,
                subcategory: t.subcategory.as_deref(),
                amount: t.amount.to_string(),
                method: t.method.as_str(),
                note: t.note.as_deref(),
                owner: t.owner.as_deref(),
            }),
        },
        Record::JournalLine(l) => writer.serialize(JournalOut {
            entry_id: l.entry_id.map(|id| id.to_string()),
            timestamp: format_timestamp(l.timestamp),
            account: l.account.name(),
            kind: l.account.tag(),
            debit: l.debit.to_string(),
            kredit: l.kredit.to_string(),
            memo: &l.memo,
            owner: l.owner.as_deref(),
        }),
        Record::Credential(c) => writer.serialize(CredentialOut {
            username: &c.username,
            password_hash: &c.password_hash,
        }),
    }
}
