//! Income sources and expense categories offered to the user.

use std::{collections::BTreeMap, fmt::Display};

use prettytable::{row, Table};
use serde::Serialize;

const EXPENSE_CATEGORIES: [(&str, &[&str]); 6] = [
    ("Bibit", &["Intani", "Inpari", "Ciherang"]),
    ("Pupuk", &["Urea", "NPK", "Organik"]),
    ("Pestisida", &["Furadan", "BPMC", "Dursban"]),
    ("Alat Tani", &["Sabit", "Cangkul", "Karung"]),
    ("Tenaga Kerja", &["Upah Harian", "Borongan"]),
    ("Lainnya", &["Lain-lain"]),
];

const INCOME_SOURCES: [&str; 2] = ["Penjualan Padi", "Lain-lain"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Catalog {
    pub income_sources: Vec<String>,
    pub expense_categories: BTreeMap<String, Vec<String>>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            income_sources: INCOME_SOURCES.iter().map(|s| s.to_string()).collect(),
            expense_categories: EXPENSE_CATEGORIES
                .iter()
                .map(|(category, subs)| (category.to_string(), subs.iter().map(|s| s.to_string()).collect()))
                .collect(),
        }
    }
}

impl Catalog {
    pub fn has_income_source(&self, source: &str) -> bool {
        self.income_sources.iter().any(|s| s == source.trim())
    }

    pub fn has_expense_category(&self, category: &str) -> bool {
        self.expense_categories.contains_key(category.trim())
    }

    pub fn has_subcategory(&self, category: &str, subcategory: &str) -> bool {
        self.expense_categories
            .get(category.trim())
            .map(|subs| subs.iter().any(|s| s == subcategory.trim()))
            .unwrap_or(false)
    }
}

impl Display for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut table = Table::new();
        table.add_row(row!["Kind", "Category", "Subcategories"]);
        table.add_empty_row();
        for source in &self.income_sources {
            table.add_row(row!["income", source, ""]);
        }
        for (category, subs) in &self.expense_categories {
            table.add_row(row!["expense", category, subs.join(", ")]);
        }
        write!(f, "\n{}\n", table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_vocabulary() {
        let catalog = Catalog::default();
        assert!(catalog.has_income_source("Penjualan Padi"));
        assert!(!catalog.has_income_source("Penjualan Jagung"));
        assert!(catalog.has_expense_category("Alat Tani"));
        assert!(catalog.has_subcategory("Pupuk", "NPK"));
        assert!(!catalog.has_subcategory("Pupuk", "Cangkul"));
        assert!(!catalog.has_subcategory("Traktor", "Solar"));
        assert_eq!(catalog.expense_categories.len(), 6);
    }
}
