use std::{collections::BTreeMap, ops::Bound};

use rust_decimal::Decimal;
use time::{Date, PrimitiveDateTime};

use crate::models::{JournalLine, Ledger, LedgerRow};

/// Whether `ts` falls within the date bounds; bounds apply to the calendar
/// date of the timestamp.
pub fn in_range(ts: PrimitiveDateTime, from: Bound<Date>, to: Bound<Date>) -> bool {
    let date = ts.date();
    let after_start = match from {
        Bound::Included(d) => date >= d,
        Bound::Excluded(d) => date > d,
        Bound::Unbounded => true,
    };
    let before_end = match to {
        Bound::Included(d) => date <= d,
        Bound::Excluded(d) => date < d,
        Bound::Unbounded => true,
    };
    after_start && before_end
}

/// Lines dated within the bounds, in input order.
pub fn filter_range(lines: &[JournalLine], from: Bound<Date>, to: Bound<Date>) -> Vec<JournalLine> {
    lines
        .iter()
        .filter(|l| in_range(l.timestamp, from, to))
        .cloned()
        .collect()
}

/// Groups lines by account and computes the running balance of each group.
///
/// Lines are ordered by timestamp with ties kept in input order, and the
/// running balance is the prefix sum of debit minus kredit.
pub fn build_ledger(lines: &[JournalLine], from: Bound<Date>, to: Bound<Date>) -> Ledger {
    let mut groups: BTreeMap<_, Vec<&JournalLine>> = BTreeMap::new();
    for line in lines.iter().filter(|l| in_range(l.timestamp, from, to)) {
        groups.entry(line.account.clone()).or_default().push(line);
    }

    let accounts = groups
        .into_iter()
        .map(|(account, mut group)| {
            // sort_by_key is stable: lines with equal timestamps keep their input order.
            group.sort_by_key(|l| l.timestamp);

            let mut balance = Decimal::ZERO;
            let rows = group
                .into_iter()
                .map(|line| {
                    balance += line.net();
                    LedgerRow {
                        line: line.clone(),
                        running_balance: balance,
                    }
                })
                .collect();
            (account, rows)
        })
        .collect();

    Ledger { accounts }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Account;
    use rust_decimal_macros::dec;
    use time::macros::{date, datetime};

    fn line(ts: PrimitiveDateTime, account: Account, debit: Decimal, kredit: Decimal, memo: &str) -> JournalLine {
        if debit > Decimal::ZERO {
            JournalLine::debit(ts, account, debit, memo.into())
        } else {
            JournalLine::credit(ts, account, kredit, memo.into())
        }
    }

    #[test]
    fn cash_running_balance() {
        let lines = vec![
            line(datetime!(2024-01-01 08:00:00), Account::Cash, dec!(100000), dec!(0), "t1"),
            line(datetime!(2024-01-02 08:00:00), Account::Cash, dec!(0), dec!(50000), "t2"),
        ];
        let ledger = build_ledger(&lines, Bound::Unbounded, Bound::Unbounded);
        let balances: Vec<_> = ledger.get(&Account::Cash).unwrap().iter().map(|r| r.running_balance).collect();
        assert_eq!(balances, vec![dec!(100000), dec!(50000)]);
        assert_eq!(ledger.balance(&Account::Cash), dec!(50000));
    }

    #[test]
    fn orders_by_timestamp_with_stable_ties() {
        let lines = vec![
            line(datetime!(2024-01-03 08:00:00), Account::Bank, dec!(30), dec!(0), "late"),
            line(datetime!(2024-01-01 08:00:00), Account::Bank, dec!(10), dec!(0), "first"),
            line(datetime!(2024-01-01 08:00:00), Account::Bank, dec!(0), dec!(5), "second"),
        ];
        let ledger = build_ledger(&lines, Bound::Unbounded, Bound::Unbounded);
        let rows = ledger.get(&Account::Bank).unwrap();
        let memos: Vec<_> = rows.iter().map(|r| r.line.memo.to_string()).collect();
        assert_eq!(memos, vec!["first", "second", "late"]);
        let balances: Vec<_> = rows.iter().map(|r| r.running_balance).collect();
        assert_eq!(balances, vec![dec!(10), dec!(5), dec!(35)]);
    }

    #[test]
    fn groups_by_exact_account() {
        let lines = vec![
            line(datetime!(2024-01-01 08:00:00), Account::Expense("Urea".into()), dec!(10), dec!(0), "a"),
            line(datetime!(2024-01-01 08:00:00), Account::Cash, dec!(0), dec!(10), "a"),
            line(datetime!(2024-01-02 08:00:00), Account::Expense("urea".into()), dec!(4), dec!(0), "b"),
        ];
        let ledger = build_ledger(&lines, Bound::Unbounded, Bound::Unbounded);
        assert_eq!(ledger.accounts.len(), 3);
        assert_eq!(ledger.balance(&Account::Expense("Urea".into())), dec!(10));
        assert_eq!(ledger.balance(&Account::Cash), dec!(-10));
    }

    #[test]
    fn range_is_inclusive_by_date() {
        let lines = vec![
            line(datetime!(2024-01-31 23:59:59), Account::Cash, dec!(1), dec!(0), "before"),
            line(datetime!(2024-02-01 00:00:00), Account::Cash, dec!(2), dec!(0), "start"),
            line(datetime!(2024-02-29 18:30:00), Account::Cash, dec!(4), dec!(0), "end"),
            line(datetime!(2024-03-01 00:00:00), Account::Cash, dec!(8), dec!(0), "after"),
        ];
        let ledger = build_ledger(&lines, Bound::Included(date!(2024-02-01)), Bound::Included(date!(2024-02-29)));
        let memos: Vec<_> = ledger.get(&Account::Cash).unwrap().iter().map(|r| r.line.memo.to_string()).collect();
        assert_eq!(memos, vec!["start", "end"]);
        assert_eq!(ledger.balance(&Account::Cash), dec!(6));

        let excluded = build_ledger(&lines, Bound::Excluded(date!(2024-02-01)), Bound::Excluded(date!(2024-03-01)));
        assert_eq!(excluded.balance(&Account::Cash), dec!(4));
    }

    #[test]
    fn empty_input_gives_empty_ledger() {
        let ledger = build_ledger(&[], Bound::Unbounded, Bound::Unbounded);
        assert!(ledger.is_empty());
        assert!(ledger.totals().0.is_empty());
    }

    #[test]
    fn building_twice_is_identical() {
        let lines = vec![
            line(datetime!(2024-01-02 08:00:00), Account::Revenue, dec!(0), dec!(7), "x"),
            line(datetime!(2024-01-01 08:00:00), Account::Cash, dec!(7), dec!(0), "x"),
        ];
        let first = build_ledger(&lines, Bound::Unbounded, Bound::Unbounded);
        let second = build_ledger(&lines, Bound::Unbounded, Bound::Unbounded);
        assert_eq!(first, second);
    }

    #[test]
    fn totals_per_account() {
        let lines = vec![
            line(datetime!(2024-01-01 08:00:00), Account::Cash, dec!(100), dec!(0), "a"),
            line(datetime!(2024-01-02 08:00:00), Account::Cash, dec!(0), dec!(30), "b"),
        ];
        let totals = build_ledger(&lines, Bound::Unbounded, Bound::Unbounded).totals().0;
        assert_eq!(totals.len(), 1);
        assert_eq!(totals[0].debit, dec!(100));
        assert_eq!(totals[0].kredit, dec!(30));
        assert_eq!(totals[0].balance, dec!(70));
    }
}
