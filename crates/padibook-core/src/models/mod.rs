use std::{fmt::Display, str::FromStr, sync::Arc};

use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use time::PrimitiveDateTime;
use uuid::Uuid;

pub mod write;
pub mod read;

/// Keywords that mark an untagged account name as revenue.
const REVENUE_KEYWORDS: [&str; 4] = ["pendapatan", "penjualan", "revenue", "sales"];

#[derive(Debug, Clone, Copy, PartialEq, Hash, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Asset,
    Liability,
    Equity,
    Income,
    Expense,
}

/// Account a journal line posts to. The variant is fixed when the line is
/// derived, so reports never classify by name.
#[derive(Debug, Clone, PartialEq, Hash, Eq, PartialOrd, Ord)]
pub enum Account {
    Cash,
    Bank,
    AccountsReceivable,
    AccountsPayable,
    Revenue,
    Expense(Arc<str>),
}

impl Account {
    pub fn name(&self) -> &str {
        match self {
            Account::Cash => "Cash",
            Account::Bank => "Bank",
            Account::AccountsReceivable => "Accounts-Receivable",
            Account::AccountsPayable => "Accounts-Payable",
            Account::Revenue => "Revenue",
            Account::Expense(name) => name,
        }
    }

    pub fn account_type(&self) -> AccountType {
        match self {
            Account::Cash | Account::Bank | Account::AccountsReceivable => AccountType::Asset,
            Account::AccountsPayable => AccountType::Liability,
            Account::Revenue => AccountType::Income,
            Account::Expense(_) => AccountType::Expense,
        }
    }

    /// One of the fixed accounts (everything except expense categories).
    pub fn is_balance_sheet(&self) -> bool {
        !matches!(self, Account::Expense(_))
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Account::Cash => "cash",
            Account::Bank => "bank",
            Account::AccountsReceivable => "receivable",
            Account::AccountsPayable => "payable",
            Account::Revenue => "revenue",
            Account::Expense(_) => "expense",
        }
    }

    /// Rebuilds an account from its stored tag and name.
    pub fn from_tag(tag: &str, name: &str) -> Option<Account> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "cash" => Some(Account::Cash),
            "bank" => Some(Account::Bank),
            "receivable" => Some(Account::AccountsReceivable),
            "payable" => Some(Account::AccountsPayable),
            "revenue" => Some(Account::Revenue),
            "expense" => {
                let name = name.trim();
                if name.is_empty() {
                    None
                } else {
                    Some(Account::Expense(name.into()))
                }
            }
            _ => None,
        }
    }

    /// Classifies an untagged account name, as found in legacy journal files.
    /// Returns `None` for a blank name.
    pub fn classify(name: &str) -> Option<Account> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let lower = name.to_lowercase();
        let account = match lower.as_str() {
            "cash" | "kas" => Account::Cash,
            "bank" => Account::Bank,
            "accounts-receivable" | "accounts receivable" | "piutang dagang" | "piutang" => Account::AccountsReceivable,
            "accounts-payable" | "accounts payable" | "utang dagang" | "utang" | "hutang" => Account::AccountsPayable,
            _ if REVENUE_KEYWORDS.iter().any(|k| lower.contains(k)) => Account::Revenue,
            _ => Account::Expense(name.into()),
        };
        Some(account)
    }
}

impl Display for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Account {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Hash, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionKind::Income => f.write_str("income"),
            TransactionKind::Expense => f.write_str("expense"),
        }
    }
}

/// How money moved. Receivable methods belong to income, payable methods to
/// expenses; cash and transfer work for both.
#[derive(Debug, Clone, Copy, PartialEq, Hash, Eq)]
pub enum PaymentMethod {
    Cash,
    Transfer,
    Receivable,
    ReceivableSettlement,
    Payable,
    PayableSettlement,
}

impl PaymentMethod {
    pub fn is_valid_for(&self, kind: TransactionKind) -> bool {
        match self {
            PaymentMethod::Cash | PaymentMethod::Transfer => true,
            PaymentMethod::Receivable | PaymentMethod::ReceivableSettlement => kind == TransactionKind::Income,
            PaymentMethod::Payable | PaymentMethod::PayableSettlement => kind == TransactionKind::Expense,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Transfer => "transfer",
            PaymentMethod::Receivable => "receivable",
            PaymentMethod::ReceivableSettlement => "receivable-settlement",
            PaymentMethod::Payable => "payable",
            PaymentMethod::PayableSettlement => "payable-settlement",
        }
    }
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', '_'], " ");
        match normalized.as_str() {
            "cash" | "tunai" => Ok(PaymentMethod::Cash),
            "transfer" => Ok(PaymentMethod::Transfer),
            "receivable" | "piutang" => Ok(PaymentMethod::Receivable),
            "receivable settlement" | "pelunasan piutang" => Ok(PaymentMethod::ReceivableSettlement),
            "payable" | "utang" | "hutang" => Ok(PaymentMethod::Payable),
            "payable settlement" | "pelunasan utang" | "pelunasan hutang" => Ok(PaymentMethod::PayableSettlement),
            _ => Err(format!("unknown payment method: {}", s)),
        }
    }
}

impl Serialize for PaymentMethod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A recorded income or expense. For income, `category` is the source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub id: Option<Uuid>,
    #[serde(serialize_with = "crate::timestamp::serialize")]
    pub timestamp: PrimitiveDateTime,
    pub kind: TransactionKind,
    pub category: Arc<str>,
    pub subcategory: Option<Arc<str>>,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub note: Option<Arc<str>>,
    pub owner: Option<Arc<str>>,
}

impl Transaction {
    /// Name of the account an expense is booked against.
    pub fn expense_account_name(&self) -> &str {
        self.subcategory.as_deref().unwrap_or(&self.category)
    }

    /// Memo carried by the derived journal lines.
    pub fn memo(&self) -> &str {
        match self.kind {
            TransactionKind::Income => &*self.category,
            TransactionKind::Expense => match self.note.as_deref() {
                Some(note) if !note.trim().is_empty() => note,
                _ => &*self.category,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Hash, Eq, Serialize)]
pub struct JournalLine {
    pub entry_id: Option<Uuid>,
    #[serde(serialize_with = "crate::timestamp::serialize")]
    pub timestamp: PrimitiveDateTime,
    pub account: Account,
    pub debit: Decimal,
    pub kredit: Decimal,
    pub memo: Arc<str>,
    pub owner: Option<Arc<str>>,
}

impl JournalLine {
    pub fn debit(timestamp: PrimitiveDateTime, account: Account, amount: Decimal, memo: Arc<str>) -> Self {
        Self {
            entry_id: None,
            timestamp,
            account,
            debit: amount,
            kredit: Decimal::ZERO,
            memo,
            owner: None,
        }
    }

    pub fn credit(timestamp: PrimitiveDateTime, account: Account, amount: Decimal, memo: Arc<str>) -> Self {
        Self {
            entry_id: None,
            timestamp,
            account,
            debit: Decimal::ZERO,
            kredit: amount,
            memo,
            owner: None,
        }
    }

    /// Debit minus kredit.
    pub fn net(&self) -> Decimal {
        self.debit - self.kredit
    }

    /// Non-negative sides with exactly one of them nonzero.
    pub fn is_well_formed(&self) -> bool {
        self.debit >= Decimal::ZERO
            && self.kredit >= Decimal::ZERO
            && (self.debit.is_zero() != self.kredit.is_zero())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub username: Arc<str>,
    pub password_hash: Arc<str>,
}
