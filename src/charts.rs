use crate::aggregate::{
    aggregate_by_category, compute_ratios, filter_by_frequency, union_categories, values_for,
};
use crate::gauge::{clamp_percent, needle_angle};
use crate::models::{
    BudgetDetail, BudgetRecord, ChartData, Dataset, ExpenseRecord, Frequency, GaugeBand,
    GaugeData, Gauges, LineCharts, Ratios,
};

pub const PIE_PALETTE: [&str; 15] = [
    "#FF5722", "#FF9800", "#FFC107", "#FFCD88", "#FFB855", "#B37626", "#F4C78B", "#FFE492",
    "#8E44AD", "#3498DB", "#2ECC71", "#E74C3C", "#95A5A6", "#34495E", "#16A085",
];

pub const GAUGE_BANDS: [&str; 3] = ["#FF5722", "#FFEB3B", "#00E676"];

const BUDGET_BAR_COLOR: &str = "#FFC107";
const EXPENSE_BAR_COLOR: &str = "#E040FB";
const BUDGET_LINE_COLOR: &str = "#00C8FF";
const EXPENSE_LINE_COLOR: &str = "#1E1E99";

pub const EXPENSE_RATIO_LABEL: &str = "Expense Ratio";
pub const SAVINGS_RATE_LABEL: &str = "Savings Rate";

/// Expense breakdown by category.
pub fn pie_chart(expenses: &[ExpenseRecord]) -> ChartData {
    let totals = aggregate_by_category(expenses);
    let labels: Vec<String> = totals.keys().cloned().collect();
    let background_color = (0..labels.len())
        .map(|index| PIE_PALETTE[index % PIE_PALETTE.len()].to_string())
        .collect();

    ChartData {
        labels,
        datasets: vec![Dataset {
            label: None,
            data: totals.into_values().collect(),
            background_color,
            border_color: None,
            border_width: Some(0),
        }],
    }
}

/// Budget vs expense per category over the union of both category sets.
pub fn bar_chart(expenses: &[ExpenseRecord], budgets: &[BudgetRecord]) -> ChartData {
    let expense_totals = aggregate_by_category(expenses);
    let budget_totals = aggregate_by_category(budgets);
    let labels = union_categories(&budget_totals, &expense_totals);

    let budget = solid_dataset(
        "Budget",
        values_for(&labels, &budget_totals),
        BUDGET_BAR_COLOR,
        false,
    );
    let expense = solid_dataset(
        "Expense",
        values_for(&labels, &expense_totals),
        EXPENSE_BAR_COLOR,
        false,
    );

    ChartData {
        labels,
        datasets: vec![budget, expense],
    }
}

pub fn line_charts(details: &[BudgetDetail], frequency: Frequency) -> LineCharts {
    let filtered = filter_by_frequency(details, frequency);
    let labels: Vec<String> = filtered.iter().map(|d| d.category_name.clone()).collect();
    let amounts = filtered.iter().map(|d| d.amount).collect();
    let spent = filtered.iter().map(|d| d.total_spent).collect();

    LineCharts {
        frequency,
        is_empty: filtered.is_empty(),
        budget: ChartData {
            labels: labels.clone(),
            datasets: vec![solid_dataset("Budget", amounts, BUDGET_LINE_COLOR, true)],
        },
        expense: ChartData {
            labels,
            datasets: vec![solid_dataset("Total Spent", spent, EXPENSE_LINE_COLOR, true)],
        },
    }
}

pub fn gauges(total_budget: Option<f64>, total_expense: f64) -> Gauges {
    let Ratios {
        expense_ratio,
        savings_rate,
    } = compute_ratios(total_budget, total_expense);

    Gauges {
        expense_ratio: gauge(EXPENSE_RATIO_LABEL, expense_ratio, expense_ratio > 1.0),
        savings_rate: gauge(SAVINGS_RATE_LABEL, savings_rate, savings_rate < 0.0),
    }
}

pub fn gauge(label: &str, raw: f64, overspent: bool) -> GaugeData {
    let percent = clamp_percent(raw);
    GaugeData {
        percent,
        raw,
        label: label.to_string(),
        display: format!("{label}: {}%", (percent * 100.0).round()),
        overspent,
        needle_angle: needle_angle(percent),
        bands: GAUGE_BANDS
            .iter()
            .map(|&color| GaugeBand { value: 33.3, color })
            .collect(),
    }
}

fn solid_dataset(label: &str, data: Vec<f64>, color: &str, with_border: bool) -> Dataset {
    Dataset {
        label: Some(label.to_string()),
        data,
        background_color: vec![color.to_string()],
        border_color: with_border.then(|| color.to_string()),
        border_width: None,
    }
}
