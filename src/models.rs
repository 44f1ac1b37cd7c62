use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub const UNCATEGORIZED: &str = "Uncategorized";

/// Category reference as nested by the backend (`categoryId: { name }`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRef {
    #[serde(default)]
    pub name: Option<String>,
}

impl CategoryRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }

    /// Resolves an optional reference to a bucket name. Missing references and
    /// blank names fall into [`UNCATEGORIZED`].
    pub fn resolve(category: Option<&CategoryRef>) -> &str {
        category
            .and_then(|category| category.name.as_deref())
            .filter(|name| !name.is_empty())
            .unwrap_or(UNCATEGORIZED)
    }
}

/// Backends disagree on `_id` vs `id` and on `date` vs `createdAt`, and some
/// send both. Each key is kept as its own loosely typed field so a record never
/// fails to decode over bookkeeping data the dashboard does not aggregate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseRecord {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub amount: f64,
    #[serde(rename = "categoryId", default)]
    pub category: Option<CategoryRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Value>,
}

impl ExpenseRecord {
    pub fn record_id(&self) -> Option<String> {
        record_id(&self.object_id, &self.id)
    }

    /// First of `date` / `createdAt` that reads as a point in time.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        [&self.date, &self.created_at]
            .into_iter()
            .flatten()
            .find_map(parse_timestamp)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetRecord {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub amount: f64,
    #[serde(rename = "categoryId", default)]
    pub category: Option<CategoryRef>,
}

impl BudgetRecord {
    pub fn record_id(&self) -> Option<String> {
        record_id(&self.object_id, &self.id)
    }
}

fn record_id(object_id: &Option<Value>, id: &Option<Value>) -> Option<String> {
    object_id
        .as_ref()
        .or(id.as_ref())
        .and_then(|value| match value {
            Value::Null => None,
            Value::String(text) => Some(text.clone()),
            other => Some(other.to_string()),
        })
}

/// Accepts RFC 3339, naive date-times, plain dates and epoch milliseconds.
fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(text) => {
            let text = text.trim();
            DateTime::parse_from_rfc3339(text)
                .map(|parsed| parsed.with_timezone(&Utc))
                .ok()
                .or_else(|| {
                    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
                        .ok()
                        .map(|parsed| parsed.and_utc())
                })
                .or_else(|| {
                    NaiveDate::parse_from_str(text, "%Y-%m-%d")
                        .ok()
                        .and_then(|date| date.and_hms_opt(0, 0, 0))
                        .map(|parsed| parsed.and_utc())
                })
        }
        Value::Number(number) => number.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetDetail {
    pub category_name: String,
    pub amount: f64,
    #[serde(default)]
    pub total_spent: f64,
    pub frequency: String,
}

/// Anything that contributes an amount to a category bucket.
pub trait CategorizedAmount {
    fn amount(&self) -> f64;
    fn category(&self) -> Option<&CategoryRef>;
}

impl CategorizedAmount for ExpenseRecord {
    fn amount(&self) -> f64 {
        self.amount
    }

    fn category(&self) -> Option<&CategoryRef> {
        self.category.as_ref()
    }
}

impl CategorizedAmount for BudgetRecord {
    fn amount(&self) -> f64 {
        self.amount
    }

    fn category(&self) -> Option<&CategoryRef> {
        self.category.as_ref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    #[default]
    Monthly,
}

impl Frequency {
    pub const ALL: [Frequency; 3] = [Frequency::Daily, Frequency::Weekly, Frequency::Monthly];

    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFrequency(pub String);

impl fmt::Display for UnknownFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "frequency must be 'daily', 'weekly' or 'monthly', got '{}'",
            self.0
        )
    }
}

impl std::error::Error for UnknownFrequency {}

impl FromStr for Frequency {
    type Err = UnknownFrequency;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Frequency::ALL
            .into_iter()
            .find(|frequency| frequency.as_str() == value)
            .ok_or_else(|| UnknownFrequency(value.to_string()))
    }
}

/// Category name → summed amount.
pub type CategoryTotals = BTreeMap<String, f64>;

/// Raw (unclamped) derived metrics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Ratios {
    pub expense_ratio: f64,
    pub savings_rate: f64,
}

// Backend payloads.

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpensesPayload {
    #[serde(default)]
    pub expenses: Vec<ExpenseRecord>,
    #[serde(default)]
    pub total_expense: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetsPayload {
    #[serde(default)]
    pub budgets: Vec<BudgetRecord>,
    #[serde(default)]
    pub total_budget: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetDetailsPayload {
    #[serde(default)]
    pub budget_details: Vec<BudgetDetail>,
}

// Chart-facing shapes.

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub data: Vec<f64>,
    pub background_color: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_width: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GaugeBand {
    pub value: f64,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GaugeData {
    /// Clamped to `[0, 1]`.
    pub percent: f64,
    pub raw: f64,
    pub label: String,
    pub display: String,
    pub overspent: bool,
    pub needle_angle: f64,
    pub bands: Vec<GaugeBand>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Gauges {
    pub expense_ratio: GaugeData,
    pub savings_rate: GaugeData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineCharts {
    pub frequency: Frequency,
    pub is_empty: bool,
    pub budget: ChartData,
    pub expense: ChartData,
}

/// Each total follows its own fetch, so one failing side never hides the other.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Totals {
    pub total_budget: Panel<f64>,
    pub total_expense: Panel<f64>,
}

/// A dashboard section as rendered: loading, ready with data, or failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Panel<T> {
    Loading,
    Ready { data: T },
    Error { message: String },
}

impl<T> Panel<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Panel::Ready { data } => Some(data),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResponse {
    pub generation: u64,
    pub generated_at: DateTime<Utc>,
    pub frequency: Frequency,
    pub totals: Totals,
    pub gauges: Panel<Gauges>,
    pub pie: Panel<ChartData>,
    pub bar: Panel<ChartData>,
    pub lines: Panel<LineCharts>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionStatus {
    Loading,
    Ready,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub generation: u64,
    pub expenses: SectionStatus,
    pub budgets: SectionStatus,
    pub details: SectionStatus,
}

#[derive(Debug, Deserialize)]
pub struct AnalysisQuery {
    pub frequency: Option<String>,
}
