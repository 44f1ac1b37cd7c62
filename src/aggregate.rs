//! Pure aggregation over fetched records.
//!
//! Nothing here mutates its inputs; every function returns a freshly built
//! structure so the view can recompute on each request.

use crate::models::{BudgetDetail, CategorizedAmount, CategoryRef, CategoryTotals, Frequency, Ratios};
use std::collections::BTreeSet;

/// Sums record amounts per resolved category name.
pub fn aggregate_by_category<R: CategorizedAmount>(records: &[R]) -> CategoryTotals {
    let mut totals = CategoryTotals::new();
    for record in records {
        let name = CategoryRef::resolve(record.category());
        *totals.entry(name.to_string()).or_insert(0.0) += record.amount();
    }
    totals
}

/// Every category present in either mapping, deduplicated and sorted.
pub fn union_categories(a: &CategoryTotals, b: &CategoryTotals) -> Vec<String> {
    a.keys()
        .chain(b.keys())
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Looks up each category in `totals`, zero-filling the ones it lacks.
pub fn values_for(categories: &[String], totals: &CategoryTotals) -> Vec<f64> {
    categories
        .iter()
        .map(|category| totals.get(category).copied().unwrap_or(0.0))
        .collect()
}

pub fn filter_by_frequency(details: &[BudgetDetail], frequency: Frequency) -> Vec<&BudgetDetail> {
    details
        .iter()
        .filter(|detail| detail.frequency == frequency.as_str())
        .collect()
}

/// Expense ratio and savings rate. A missing or zero budget yields zeros.
///
/// Values are left unclamped so overspend (`expense_ratio > 1`) stays visible.
pub fn compute_ratios(total_budget: Option<f64>, total_expense: f64) -> Ratios {
    match total_budget {
        Some(budget) if budget != 0.0 && !budget.is_nan() => Ratios {
            expense_ratio: total_expense / budget,
            savings_rate: (budget - total_expense) / budget,
        },
        _ => Ratios {
            expense_ratio: 0.0,
            savings_rate: 0.0,
        },
    }
}
