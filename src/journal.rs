use std::sync::Arc;

use rust_decimal::Decimal;
use thiserror::Error;
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::models::{Account, JournalLine, PaymentMethod, Transaction, TransactionKind};

#[derive(Debug, Error, PartialEq)]
pub enum JournalError {
    #[error("amount must be greater than zero, got {0}")]
    NonPositiveAmount(Decimal),
    #[error("{0} must not be blank")]
    BlankField(&'static str),
    #[error("payment method {method} cannot be used for {kind}")]
    MethodNotAllowed { kind: TransactionKind, method: PaymentMethod },
}

/// The two lines of one journal entry: debit first, kredit second.
pub type JournalPair = [JournalLine; 2];

fn income_debit_account(method: PaymentMethod) -> Account {
    match method {
        PaymentMethod::Transfer => Account::Bank,
        PaymentMethod::Receivable => Account::AccountsReceivable,
        _ => Account::Cash,
    }
}

fn expense_credit_account(method: PaymentMethod) -> Account {
    match method {
        PaymentMethod::Transfer => Account::Bank,
        PaymentMethod::Payable => Account::AccountsPayable,
        _ => Account::Cash,
    }
}

/// Maps one income or expense to its balanced pair of journal lines.
///
/// For income `category` is the source; for expenses it is the account the
/// expense is booked against. Both lines share a fresh entry id.
pub fn derive_journal(
    kind: TransactionKind,
    amount: Decimal,
    method: PaymentMethod,
    category: &str,
    memo: &str,
    timestamp: PrimitiveDateTime,
) -> Result<JournalPair, JournalError> {
    if amount <= Decimal::ZERO {
        return Err(JournalError::NonPositiveAmount(amount));
    }

    let category = category.trim();
    if category.is_empty() {
        return Err(match kind {
            TransactionKind::Income => JournalError::BlankField("source"),
            TransactionKind::Expense => JournalError::BlankField("category"),
        });
    }

    if !method.is_valid_for(kind) {
        return Err(JournalError::MethodNotAllowed { kind, method });
    }

    let (debit_account, credit_account) = match kind {
        TransactionKind::Income => {
            let credit = match method {
                PaymentMethod::ReceivableSettlement => Account::AccountsReceivable,
                _ => Account::Revenue,
            };
            (income_debit_account(method), credit)
        }
        TransactionKind::Expense => {
            let debit = match method {
                PaymentMethod::PayableSettlement => Account::AccountsPayable,
                _ => Account::Expense(category.into()),
            };
            (debit, expense_credit_account(method))
        }
    };

    let memo: Arc<str> = Arc::from(memo.trim());
    let entry_id = Some(Uuid::new_v4());

    let mut debit = JournalLine::debit(timestamp, debit_account, amount, memo.clone());
    let mut credit = JournalLine::credit(timestamp, credit_account, amount, memo);
    debit.entry_id = entry_id;
    credit.entry_id = entry_id;

    Ok([debit, credit])
}

/// Derives the journal pair for a stored transaction, carrying its id and
/// owner onto both lines.
pub fn derive_from_transaction(txn: &Transaction) -> Result<JournalPair, JournalError> {
    let category = match txn.kind {
        TransactionKind::Income => &*txn.category,
        TransactionKind::Expense => txn.expense_account_name(),
    };

    let mut lines = derive_journal(txn.kind, txn.amount, txn.method, category, txn.memo(), txn.timestamp)?;
    for line in lines.iter_mut() {
        if txn.id.is_some() {
            line.entry_id = txn.id;
        }
        line.owner = txn.owner.clone();
    }
    Ok(lines)
}
