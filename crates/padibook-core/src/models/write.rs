use std::sync::Arc;

use rust_decimal::Decimal;
use time::PrimitiveDateTime;

use super::PaymentMethod;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordIncomeCommand {
    pub timestamp: PrimitiveDateTime,
    pub source: Arc<str>,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub note: Option<Arc<str>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordExpenseCommand {
    pub timestamp: PrimitiveDateTime,
    pub category: Arc<str>,
    pub subcategory: Option<Arc<str>>,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub note: Option<Arc<str>>,
}
