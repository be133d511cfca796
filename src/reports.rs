use std::{
    collections::{BTreeMap, HashMap},
    ops::Bound,
};

use rust_decimal::Decimal;
use time::Date;

use crate::{
    ledger::in_range,
    models::{
        Account, AccountType, BalanceSheet, DailyTotals, EntryKey, IncomeStatement, IntegrityReport, JournalLine,
        Summary, Transaction, TransactionKind, Trend, UnbalancedEntry,
    },
};

fn is_revenue(line: &JournalLine) -> bool {
    line.account.account_type() == AccountType::Income
}

/// Everything outside the fixed balance-sheet accounts is an expense.
fn is_expense(line: &JournalLine) -> bool {
    !line.account.is_balance_sheet()
}

/// Revenue, expense and net income over the given lines.
pub fn compute_income_statement(lines: &[JournalLine]) -> IncomeStatement {
    let revenue: Decimal = lines.iter().filter(|l| is_revenue(l)).map(|l| l.kredit).sum();
    let expense: Decimal = lines.iter().filter(|l| is_expense(l)).map(|l| l.debit).sum();
    IncomeStatement {
        revenue,
        expense,
        net: revenue - expense,
    }
}

/// Assets, liabilities and equity over the given lines. Equity is the net
/// income of the same lines.
pub fn compute_balance_sheet(lines: &[JournalLine]) -> BalanceSheet {
    let mut assets = Decimal::ZERO;
    let mut liabilities = Decimal::ZERO;

    for line in lines {
        match line.account {
            Account::Cash | Account::Bank | Account::AccountsReceivable => assets += line.debit - line.kredit,
            Account::AccountsPayable => liabilities += line.kredit - line.debit,
            Account::Revenue | Account::Expense(_) => {}
        }
    }

    BalanceSheet {
        assets,
        liabilities,
        equity: compute_income_statement(lines).net,
    }
}

/// Totals of recorded income and expense transactions dated within the bounds.
pub fn summarize(transactions: &[Transaction], from: Bound<Date>, to: Bound<Date>) -> Summary {
    let mut summary = Summary::default();
    for txn in transactions.iter().filter(|t| in_range(t.timestamp, from, to)) {
        match txn.kind {
            TransactionKind::Income => summary.total_income += txn.amount,
            TransactionKind::Expense => summary.total_expense += txn.amount,
        }
    }
    summary.balance = summary.total_income - summary.total_expense;
    summary
}

/// Revenue and expense per calendar day, ordered by date. Days without
/// either are omitted.
pub fn daily_trend(lines: &[JournalLine]) -> Trend {
    let mut days: BTreeMap<Date, DailyTotals> = BTreeMap::new();
    for line in lines {
        let (revenue, expense) = match (is_revenue(line), is_expense(line)) {
            (true, _) => (line.kredit, Decimal::ZERO),
            (_, true) => (Decimal::ZERO, line.debit),
            _ => continue,
        };
        let date = line.timestamp.date();
        let day = days.entry(date).or_insert(DailyTotals {
            date,
            revenue: Decimal::ZERO,
            expense: Decimal::ZERO,
        });
        day.revenue += revenue;
        day.expense += expense;
    }

    Trend(
        days.into_values()
            .filter(|d| !d.revenue.is_zero() || !d.expense.is_zero())
            .collect(),
    )
}

/// Journal entries that are not exactly two lines with equal debit and
/// kredit totals, ordered by entry.
pub fn find_unbalanced(lines: &[JournalLine]) -> IntegrityReport {
    let mut entries: HashMap<EntryKey, (usize, Decimal, Decimal)> = HashMap::new();
    for line in lines {
        let e = entries.entry(EntryKey::of(line)).or_insert((0, Decimal::ZERO, Decimal::ZERO));
        e.0 += 1;
        e.1 += line.debit;
        e.2 += line.kredit;
    }

    let mut result: Vec<UnbalancedEntry> = entries
        .into_iter()
        .filter(|(_, (count, debit, kredit))| *count != 2 || debit != kredit)
        .map(|(entry, (lines, debit, kredit))| UnbalancedEntry {
            entry,
            lines,
            debit,
            kredit,
        })
        .collect();
    result.sort_by(|a, b| a.entry.cmp(&b.entry));

    IntegrityReport(result)
}
