use std::{collections::BTreeMap, fmt::Display, sync::Arc};

use prettytable::{row, Table};
use rust_decimal::Decimal;
use serde::Serialize;
use time::{Date, PrimitiveDateTime};
use uuid::Uuid;

use crate::timestamp::{format_date, format_timestamp};

use super::{Account, JournalLine, Transaction};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerRow {
    #[serde(flatten)]
    pub line: JournalLine,
    pub running_balance: Decimal,
}

/// Journal lines grouped per account, each group ordered by timestamp.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Ledger {
    pub accounts: BTreeMap<Account, Vec<LedgerRow>>,
}

impl Ledger {
    pub fn get(&self, account: &Account) -> Option<&[LedgerRow]> {
        self.accounts.get(account).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Closing balance of an account, zero when it has no lines.
    pub fn balance(&self, account: &Account) -> Decimal {
        self.get(account)
            .and_then(|rows| rows.last())
            .map(|row| row.running_balance)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn totals(&self) -> LedgerTotals {
        let totals = self
            .accounts
            .iter()
            .map(|(account, rows)| {
                let debit: Decimal = rows.iter().map(|r| r.line.debit).sum();
                let kredit: Decimal = rows.iter().map(|r| r.line.kredit).sum();
                AccountTotals {
                    account: account.clone(),
                    debit,
                    kredit,
                    balance: debit - kredit,
                }
            })
            .collect();
        LedgerTotals(totals)
    }
}

impl Display for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.accounts.is_empty() {
            return writeln!(f, "(no journal lines in range)");
        }

        for (account, rows) in &self.accounts {
            let mut table = Table::new();
            table.add_row(row!["Timestamp", "Memo", "Debit", "Kredit", "Balance"]);
            table.add_empty_row();

            for r in rows {
                table.add_row(row![
                    format_timestamp(r.line.timestamp),
                    r.line.memo,
                    r.line.debit,
                    r.line.kredit,
                    r.running_balance
                ]);
            }

            writeln!(f, "Account: {} ({:?})", account, account.account_type())?;
            writeln!(f, "{}", table)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountTotals {
    pub account: Account,
    pub debit: Decimal,
    pub kredit: Decimal,
    pub balance: Decimal,
}

/// Debit, kredit and closing balance per account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LedgerTotals(pub Vec<AccountTotals>);

impl Display for LedgerTotals {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut table = Table::new();
        table.add_row(row!["Account", "Debit", "Kredit", "Balance"]);
        table.add_empty_row();
        for t in &self.0 {
            table.add_row(row![t.account, r->t.debit, r->t.kredit, r->t.balance]);
        }
        write!(f, "\n{}\n", table)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IncomeStatement {
    pub revenue: Decimal,
    pub expense: Decimal,
    pub net: Decimal,
}

impl Display for IncomeStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut table = Table::new();
        table.add_row(row!["Revenue", r->self.revenue]);
        table.add_row(row!["Expense", r->self.expense]);
        table.add_empty_row();
        table.add_row(row!["Net income", r->self.net]);
        write!(f, "\n{}\n", table)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BalanceSheet {
    pub assets: Decimal,
    pub liabilities: Decimal,
    pub equity: Decimal,
}

impl Display for BalanceSheet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut table = Table::new();
        table.add_row(row!["Assets", r->self.assets]);
        table.add_row(row!["Liabilities", r->self.liabilities]);
        table.add_row(row!["Equity", r->self.equity]);
        write!(f, "\n{}\n", table)
    }
}

/// Income and expense totals taken from the transaction records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub balance: Decimal,
}

impl Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut table = Table::new();
        table.add_row(row!["Total income", r->self.total_income]);
        table.add_row(row!["Total expense", r->self.total_expense]);
        table.add_empty_row();
        table.add_row(row!["Balance", r->self.balance]);
        write!(f, "\n{}\n", table)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyTotals {
    #[serde(serialize_with = "crate::timestamp::serialize_date")]
    pub date: Date,
    pub revenue: Decimal,
    pub expense: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Trend(pub Vec<DailyTotals>);

impl Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut table = Table::new();
        table.add_row(row!["Date", "Revenue", "Expense"]);
        table.add_empty_row();
        for day in &self.0 {
            table.add_row(row![format_date(day.date), r->day.revenue, r->day.expense]);
        }
        write!(f, "\n{}\n", table)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct GeneralJournal(pub Vec<JournalLine>);

impl Display for GeneralJournal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut table = Table::new();
        table.add_row(row!["Timestamp", "Account", "Debit", "Kredit", "Memo"]);
        table.add_empty_row();
        for line in &self.0 {
            table.add_row(row![format_timestamp(line.timestamp), line.account, r->line.debit, r->line.kredit, line.memo]);
        }
        write!(f, "\n{}\n", table)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TransactionList(pub Vec<Transaction>);

impl Display for TransactionList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut table = Table::new();
        table.add_row(row!["Timestamp", "Kind", "Category", "Amount", "Method", "Note"]);
        table.add_empty_row();
        for txn in &self.0 {
            let category = match &txn.subcategory {
                Some(sub) => format!("{} / {}", txn.category, sub),
                None => txn.category.to_string(),
            };
            table.add_row(row![
                format_timestamp(txn.timestamp),
                txn.kind,
                category,
                r->txn.amount,
                txn.method,
                txn.note.as_deref().unwrap_or("")
            ]);
        }
        write!(f, "\n{}\n", table)
    }
}

/// Identifies the lines that belong to one journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum EntryKey {
    Id(Uuid),
    Legacy {
        #[serde(serialize_with = "crate::timestamp::serialize")]
        timestamp: PrimitiveDateTime,
        memo: Arc<str>,
    },
}

impl EntryKey {
    pub fn of(line: &JournalLine) -> Self {
        match line.entry_id {
            Some(id) => EntryKey::Id(id),
            None => EntryKey::Legacy {
                timestamp: line.timestamp,
                memo: line.memo.clone(),
            },
        }
    }
}

impl Display for EntryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryKey::Id(id) => write!(f, "{}", id),
            EntryKey::Legacy { timestamp, memo } => write!(f, "{} '{}'", format_timestamp(*timestamp), memo),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnbalancedEntry {
    pub entry: EntryKey,
    pub lines: usize,
    pub debit: Decimal,
    pub kredit: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct IntegrityReport(pub Vec<UnbalancedEntry>);

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for IntegrityReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "journal is balanced");
        }

        let mut table = Table::new();
        table.add_row(row!["Entry", "Lines", "Debit", "Kredit"]);
        table.add_empty_row();
        for e in &self.0 {
            table.add_row(row![e.entry, r->e.lines, r->e.debit, r->e.kredit]);
        }
        write!(f, "\n{}\n", table)
    }
}
