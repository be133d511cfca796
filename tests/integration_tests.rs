use std::{ops::Bound, sync::Arc};

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use time::macros::{date, datetime};
use time::PrimitiveDateTime;

use padibook::auth::{Authenticator, Session};
use padibook::bookkeeper::{Bookkeeper, BookkeepingError};
use padibook::catalog::Catalog;
use padibook::journal::JournalError;
use padibook::models::write::{RecordExpenseCommand, RecordIncomeCommand};
use padibook::models::{Account, JournalLine, PaymentMethod, TransactionKind};
use padibook::storage::{CsvStore, MemoryStore, Record, RecordStore, RecordStoreExt, Resource};

const ALL: (Bound<time::Date>, Bound<time::Date>) = (Bound::Unbounded, Bound::Unbounded);

fn setup() -> (Arc<MemoryStore>, Bookkeeper, Session) {
    let storage = Arc::new(MemoryStore::new());
    let bookkeeper = Bookkeeper::new(storage.clone());
    (storage, bookkeeper, Session::anonymous())
}

fn income(ts: PrimitiveDateTime, source: &str, amount: Decimal, method: PaymentMethod) -> RecordIncomeCommand {
    RecordIncomeCommand {
        timestamp: ts,
        source: source.into(),
        amount,
        method,
        note: None,
    }
}

fn expense(ts: PrimitiveDateTime, category: &str, subcategory: Option<&str>, amount: Decimal, method: PaymentMethod) -> RecordExpenseCommand {
    RecordExpenseCommand {
        timestamp: ts,
        category: category.into(),
        subcategory: subcategory.map(Into::into),
        amount,
        method,
        note: None,
    }
}

fn record_season(bookkeeper: &Bookkeeper, session: &Session) {
    bookkeeper
        .record_income(session, &income(datetime!(2024-03-01 08:00:00), "Penjualan Padi", dec!(100000), PaymentMethod::Cash))
        .unwrap();
    bookkeeper
        .record_expense(session, &expense(datetime!(2024-03-02 09:00:00), "Pupuk", Some("Urea"), dec!(30000), PaymentMethod::Cash))
        .unwrap();
    bookkeeper
        .record_income(session, &income(datetime!(2024-03-03 08:00:00), "Penjualan Padi", dec!(40000), PaymentMethod::Receivable))
        .unwrap();
    bookkeeper
        .record_expense(session, &expense(datetime!(2024-03-04 09:00:00), "Tenaga Kerja", None, dec!(20000), PaymentMethod::Payable))
        .unwrap();
}

#[test]
fn test_record_income_posts_balanced_entry() {
    let (storage, bookkeeper, session) = setup();
    let txn = bookkeeper
        .record_income(&session, &income(datetime!(2024-03-01 08:00:00), "Penjualan Padi", dec!(500000), PaymentMethod::Cash))
        .unwrap();

    let stored = storage.load_transactions(TransactionKind::Income, None).unwrap();
    assert_eq!(stored, vec![txn.clone()]);

    let journal = storage.load_journal(None).unwrap();
    assert_eq!(journal.len(), 2);
    assert_eq!(journal[0].account, Account::Cash);
    assert_eq!(journal[0].debit, dec!(500000));
    assert_eq!(journal[1].account, Account::Revenue);
    assert_eq!(journal[1].kredit, dec!(500000));
    assert_eq!(journal[0].entry_id, txn.id);
    assert_eq!(journal[1].entry_id, txn.id);
    assert_eq!(&*journal[0].memo, "Penjualan Padi");
}

#[test]
fn test_ledger_running_balances() {
    let (_, bookkeeper, session) = setup();
    record_season(&bookkeeper, &session);

    let ledger = bookkeeper.ledger(&session, ALL.0, ALL.1).unwrap();
    let cash = ledger.get(&Account::Cash).unwrap();
    assert_eq!(cash.len(), 2);
    assert_eq!(cash[0].running_balance, dec!(100000));
    assert_eq!(cash[1].running_balance, dec!(70000));

    assert_eq!(ledger.balance(&Account::AccountsReceivable), dec!(40000));
    assert_eq!(ledger.balance(&Account::AccountsPayable), dec!(-20000));
    assert_eq!(ledger.balance(&Account::Expense("Urea".into())), dec!(30000));
    assert_eq!(ledger.balance(&Account::Expense("Tenaga Kerja".into())), dec!(20000));
    assert_eq!(ledger.balance(&Account::Bank), Decimal::ZERO);
}

#[test]
fn test_reports() {
    let (_, bookkeeper, session) = setup();
    record_season(&bookkeeper, &session);

    let statement = bookkeeper.income_statement(&session, ALL.0, ALL.1).unwrap();
    assert_eq!(statement.revenue, dec!(140000));
    assert_eq!(statement.expense, dec!(50000));
    assert_eq!(statement.net, dec!(90000));

    let sheet = bookkeeper.balance_sheet(&session, ALL.0, ALL.1).unwrap();
    assert_eq!(sheet.assets, dec!(110000));
    assert_eq!(sheet.liabilities, dec!(20000));
    assert_eq!(sheet.equity, dec!(90000));

    let summary = bookkeeper.summary(&session, ALL.0, ALL.1).unwrap();
    assert_eq!(summary.total_income, dec!(140000));
    assert_eq!(summary.total_expense, dec!(50000));
    assert_eq!(summary.balance, dec!(90000));
}

#[test]
fn test_reports_respect_date_range() {
    let (_, bookkeeper, session) = setup();
    record_season(&bookkeeper, &session);

    let from = Bound::Included(date!(2024-03-02));
    let to = Bound::Included(date!(2024-03-03));

    let statement = bookkeeper.income_statement(&session, from, to).unwrap();
    assert_eq!(statement.revenue, dec!(40000));
    assert_eq!(statement.expense, dec!(30000));

    let journal = bookkeeper.journal(&session, from, to).unwrap();
    assert_eq!(journal.0.len(), 4);
    assert!(journal.0.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));

    let trend = bookkeeper.trend(&session, from, to).unwrap();
    assert_eq!(trend.0.len(), 2);
    assert_eq!(trend.0[0].date, date!(2024-03-02));
    assert_eq!(trend.0[0].expense, dec!(30000));
    assert_eq!(trend.0[1].revenue, dec!(40000));
}

#[test]
fn test_invalid_input_is_not_stored() {
    let (storage, bookkeeper, session) = setup();

    let err = bookkeeper
        .record_income(&session, &income(datetime!(2024-03-01 08:00:00), "Penjualan Padi", dec!(0), PaymentMethod::Cash))
        .unwrap_err();
    assert!(matches!(err, BookkeepingError::Journal(JournalError::NonPositiveAmount(_))));

    let err = bookkeeper
        .record_income(&session, &income(datetime!(2024-03-01 08:00:00), "Penjualan Padi", dec!(10), PaymentMethod::Payable))
        .unwrap_err();
    assert!(matches!(err, BookkeepingError::Journal(JournalError::MethodNotAllowed { .. })));

    let err = bookkeeper
        .record_expense(&session, &expense(datetime!(2024-03-01 08:00:00), "  ", None, dec!(10), PaymentMethod::Cash))
        .unwrap_err();
    assert!(matches!(err, BookkeepingError::Journal(JournalError::BlankField("category"))));

    assert!(storage.load_transactions(TransactionKind::Income, None).unwrap().is_empty());
    assert!(storage.load_transactions(TransactionKind::Expense, None).unwrap().is_empty());
    assert!(storage.load_journal(None).unwrap().is_empty());
}

#[test]
fn test_strict_catalog() {
    let storage = Arc::new(MemoryStore::new());
    let bookkeeper = Bookkeeper::new(storage).with_catalog(Catalog::default(), true);
    let session = Session::anonymous();

    let err = bookkeeper
        .record_income(&session, &income(datetime!(2024-03-01 08:00:00), "Penjualan Jagung", dec!(10), PaymentMethod::Cash))
        .unwrap_err();
    assert!(matches!(err, BookkeepingError::NotInCatalog { field: "source", .. }));

    let err = bookkeeper
        .record_expense(&session, &expense(datetime!(2024-03-01 08:00:00), "Pupuk", Some("Sabit"), dec!(10), PaymentMethod::Cash))
        .unwrap_err();
    assert!(matches!(err, BookkeepingError::NotInCatalog { field: "subcategory", .. }));

    bookkeeper
        .record_expense(&session, &expense(datetime!(2024-03-01 08:00:00), "Pupuk", Some("NPK"), dec!(10), PaymentMethod::Cash))
        .unwrap();
}

#[test]
fn test_tenants_are_isolated() {
    let storage = Arc::new(MemoryStore::new());
    let auth = Authenticator::new(storage.clone());
    let bookkeeper = Bookkeeper::new(storage.clone());

    auth.register("budi", "padi1").unwrap();
    auth.register("siti", "padi2").unwrap();
    let budi = auth.login("budi", "padi1").unwrap();
    let siti = auth.login("siti", "padi2").unwrap();

    let txn = bookkeeper
        .record_income(&budi, &income(datetime!(2024-03-01 08:00:00), "Penjualan Padi", dec!(750), PaymentMethod::Transfer))
        .unwrap();
    assert_eq!(txn.owner.as_deref(), Some("budi"));

    assert_eq!(bookkeeper.income_statement(&budi, ALL.0, ALL.1).unwrap().revenue, dec!(750));
    assert_eq!(bookkeeper.income_statement(&siti, ALL.0, ALL.1).unwrap().revenue, Decimal::ZERO);
    assert!(bookkeeper.ledger(&Session::anonymous(), ALL.0, ALL.1).unwrap().is_empty());

    let journal = storage.load_journal(budi.tenant()).unwrap();
    assert!(journal.iter().all(|l| l.owner.as_deref() == Some("budi")));
}

#[test]
fn test_recent_is_newest_first() {
    let (_, bookkeeper, session) = setup();
    for (day, amount) in [(3, dec!(30)), (1, dec!(10)), (5, dec!(50)), (2, dec!(20)), (4, dec!(40)), (6, dec!(60))] {
        let ts = PrimitiveDateTime::new(
            time::Date::from_calendar_date(2024, time::Month::March, day).unwrap(),
            time::Time::MIDNIGHT,
        );
        bookkeeper
            .record_income(&session, &income(ts, "Penjualan Padi", amount, PaymentMethod::Cash))
            .unwrap();
    }

    let recent = bookkeeper.recent(&session, TransactionKind::Income, 5).unwrap();
    let amounts: Vec<Decimal> = recent.0.iter().map(|t| t.amount).collect();
    assert_eq!(amounts, vec![dec!(60), dec!(50), dec!(40), dec!(30), dec!(20)]);

    assert!(bookkeeper.recent(&session, TransactionKind::Expense, 5).unwrap().0.is_empty());
}

#[test]
fn test_check_detects_partial_write() {
    let (storage, bookkeeper, session) = setup();
    record_season(&bookkeeper, &session);
    assert!(bookkeeper.check(&session).unwrap().is_clean());

    // A crash between the two journal appends leaves a lone debit.
    let mut orphan = JournalLine::debit(datetime!(2024-03-05 10:00:00), Account::Cash, dec!(999), "Penjualan Padi".into());
    orphan.entry_id = Some(uuid::Uuid::new_v4());
    storage.append(&[Record::JournalLine(orphan)], Resource::Journal, None).unwrap();

    let report = bookkeeper.check(&session).unwrap();
    assert_eq!(report.0.len(), 1);
    assert_eq!(report.0[0].lines, 1);
    assert_eq!(report.0[0].debit, dec!(999));
    assert_eq!(report.0[0].kredit, Decimal::ZERO);
}

#[test]
fn test_csv_store_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let session = Session::anonymous();

    {
        let bookkeeper = Bookkeeper::new(Arc::new(CsvStore::new(dir.path())));
        record_season(&bookkeeper, &session);
    }

    assert!(dir.path().join("pemasukan.csv").exists());
    assert!(dir.path().join("pengeluaran.csv").exists());
    assert!(dir.path().join("jurnal.csv").exists());

    let bookkeeper = Bookkeeper::new(Arc::new(CsvStore::new(dir.path())));
    let ledger = bookkeeper.ledger(&session, ALL.0, ALL.1).unwrap();
    assert_eq!(ledger.balance(&Account::Cash), dec!(70000));
    assert_eq!(ledger.balance(&Account::Expense("Urea".into())), dec!(30000));

    let sheet = bookkeeper.balance_sheet(&session, ALL.0, ALL.1).unwrap();
    assert_eq!(sheet.assets, sheet.liabilities + sheet.equity);
    assert!(bookkeeper.check(&session).unwrap().is_clean());

    let recent = bookkeeper.recent(&session, TransactionKind::Expense, 5).unwrap();
    assert_eq!(recent.0.len(), 2);
    assert_eq!(recent.0[0].subcategory, None);
    assert_eq!(recent.0[1].subcategory.as_deref(), Some("Urea"));
}
