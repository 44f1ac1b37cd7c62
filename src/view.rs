//! Dashboard view-model and the fetch tasks that feed it.
//!
//! All fetched data lives in one [`AnalysisView`]. Each fetch completion goes
//! through [`AnalysisView::apply`], tagged with the generation of the mount
//! that spawned it; completions from an older mount are dropped.

use crate::charts;
use crate::client::BackendClient;
use crate::errors::FetchError;
use crate::models::{
    AnalysisResponse, BudgetDetail, BudgetRecord, ChartData, ExpenseRecord, Frequency, Gauges,
    LineCharts, Panel, SectionStatus, StatusResponse, Totals,
};
use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum Section<T> {
    Loading,
    Ready { data: T, loaded_at: DateTime<Utc> },
    Failed { message: String },
}

impl<T> Default for Section<T> {
    fn default() -> Self {
        Section::Loading
    }
}

impl<T> Section<T> {
    pub fn status(&self) -> SectionStatus {
        match self {
            Section::Loading => SectionStatus::Loading,
            Section::Ready { .. } => SectionStatus::Ready,
            Section::Failed { .. } => SectionStatus::Error,
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Section::Ready { data, .. } => Some(data),
            _ => None,
        }
    }

    fn error(&self) -> Option<&str> {
        match self {
            Section::Failed { message } => Some(message.as_str()),
            _ => None,
        }
    }

    fn settle<E: std::fmt::Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Section::Ready {
                data,
                loaded_at: Utc::now(),
            },
            Err(err) => Section::Failed {
                message: err.to_string(),
            },
        }
    }

    fn to_panel<U>(&self, build: impl FnOnce(&T) -> U) -> Panel<U> {
        match self {
            Section::Loading => Panel::Loading,
            Section::Ready { data, .. } => Panel::Ready { data: build(data) },
            Section::Failed { message } => Panel::Error {
                message: message.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpensesData {
    pub records: Vec<ExpenseRecord>,
    pub reported_total: Option<f64>,
}

impl ExpensesData {
    /// The backend's total, or the record sum when it sent none.
    pub fn total(&self) -> f64 {
        self.reported_total
            .unwrap_or_else(|| self.records.iter().map(|r| r.amount).sum())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BudgetsData {
    pub records: Vec<BudgetRecord>,
    pub reported_total: Option<f64>,
}

impl BudgetsData {
    pub fn total(&self) -> f64 {
        self.reported_total
            .unwrap_or_else(|| self.records.iter().map(|r| r.amount).sum())
    }
}

#[derive(Debug)]
pub enum FetchOutcome {
    Expenses(Result<(Vec<ExpenseRecord>, Option<f64>), FetchError>),
    Budgets(Result<(Option<f64>, Vec<BudgetRecord>), FetchError>),
    Details(Result<Vec<BudgetDetail>, FetchError>),
}

#[derive(Debug, Default)]
pub struct AnalysisView {
    generation: u64,
    expenses: Section<ExpensesData>,
    budgets: Section<BudgetsData>,
    details: Section<Vec<BudgetDetail>>,
}

impl AnalysisView {
    /// Starts a new mount: every section goes back to loading.
    pub fn remount(&mut self) -> u64 {
        self.generation += 1;
        self.expenses = Section::Loading;
        self.budgets = Section::Loading;
        self.details = Section::Loading;
        self.generation
    }

    /// Detaches in-flight fetches without touching the current sections.
    pub fn retire(&mut self) {
        self.generation += 1;
    }

    /// Records one fetch completion. Returns `false` if it came from a
    /// retired mount and was ignored.
    pub fn apply(&mut self, generation: u64, outcome: FetchOutcome) -> bool {
        if generation != self.generation {
            debug!(
                "dropping stale fetch result (generation {generation}, current {})",
                self.generation
            );
            return false;
        }

        match outcome {
            FetchOutcome::Expenses(result) => {
                self.expenses = Section::settle(result.map(|(records, reported_total)| {
                    ExpensesData {
                        records,
                        reported_total,
                    }
                }));
            }
            FetchOutcome::Budgets(result) => {
                self.budgets = Section::settle(result.map(|(reported_total, records)| {
                    BudgetsData {
                        records,
                        reported_total,
                    }
                }));
            }
            FetchOutcome::Details(result) => {
                self.details = Section::settle(result);
            }
        }
        true
    }

    pub fn details(&self) -> &Section<Vec<BudgetDetail>> {
        &self.details
    }

    pub fn status(&self) -> StatusResponse {
        StatusResponse {
            generation: self.generation,
            expenses: self.expenses.status(),
            budgets: self.budgets.status(),
            details: self.details.status(),
        }
    }

    pub fn pie(&self) -> Panel<ChartData> {
        self.expenses.to_panel(|data| charts::pie_chart(&data.records))
    }

    /// Renders with whichever side has loaded; a pending side counts as empty.
    pub fn bar(&self) -> Panel<ChartData> {
        self.partial(|expenses, budgets| {
            charts::bar_chart(
                expenses.map(|d| d.records.as_slice()).unwrap_or_default(),
                budgets.map(|d| d.records.as_slice()).unwrap_or_default(),
            )
        })
    }

    pub fn totals(&self) -> Totals {
        Totals {
            total_budget: self.budgets.to_panel(BudgetsData::total),
            total_expense: self.expenses.to_panel(ExpensesData::total),
        }
    }

    /// Both totals are needed; a gauge from half the data would mislead.
    pub fn gauges(&self) -> Panel<Gauges> {
        if let Some(message) = self.first_error() {
            return Panel::Error { message };
        }
        match (self.expenses.data(), self.budgets.data()) {
            (Some(expenses), Some(budgets)) => Panel::Ready {
                data: charts::gauges(Some(budgets.total()), expenses.total()),
            },
            _ => Panel::Loading,
        }
    }

    pub fn lines(&self, frequency: Frequency) -> Panel<LineCharts> {
        self.details
            .to_panel(|details| charts::line_charts(details, frequency))
    }

    pub fn analysis(&self, frequency: Frequency) -> AnalysisResponse {
        AnalysisResponse {
            generation: self.generation,
            generated_at: Utc::now(),
            frequency,
            totals: self.totals(),
            gauges: self.gauges(),
            pie: self.pie(),
            bar: self.bar(),
            lines: self.lines(frequency),
        }
    }

    fn first_error(&self) -> Option<String> {
        self.expenses
            .error()
            .or_else(|| self.budgets.error())
            .map(str::to_string)
    }

    fn partial<U>(
        &self,
        build: impl FnOnce(Option<&ExpensesData>, Option<&BudgetsData>) -> U,
    ) -> Panel<U> {
        if let Some(message) = self.first_error() {
            return Panel::Error { message };
        }
        let expenses = self.expenses.data();
        let budgets = self.budgets.data();
        if expenses.is_none() && budgets.is_none() {
            return Panel::Loading;
        }
        Panel::Ready {
            data: build(expenses, budgets),
        }
    }
}

/// Runs `fetch` until it completes or `token` is cancelled, then hands the
/// outcome to the view.
pub fn spawn_fetch<F>(
    view: Arc<Mutex<AnalysisView>>,
    token: CancellationToken,
    generation: u64,
    name: &'static str,
    fetch: F,
) -> JoinHandle<()>
where
    F: Future<Output = FetchOutcome> + Send + 'static,
{
    tokio::spawn(async move {
        tokio::select! {
            _ = token.cancelled() => {
                debug!("{name} fetch cancelled (generation {generation})");
            }
            outcome = fetch => {
                if let FetchOutcome::Expenses(Err(err))
                | FetchOutcome::Budgets(Err(err))
                | FetchOutcome::Details(Err(err)) = &outcome
                {
                    warn!("{name} fetch failed: {err}");
                } else {
                    info!("{name} loaded (generation {generation})");
                }
                view.lock().await.apply(generation, outcome);
            }
        }
    })
}

/// The live dashboard: the view-model plus the fetches feeding it.
#[derive(Clone)]
pub struct Dashboard {
    client: BackendClient,
    view: Arc<Mutex<AnalysisView>>,
    cancel: Arc<Mutex<CancellationToken>>,
}

impl Dashboard {
    pub fn new(client: BackendClient) -> Self {
        Self {
            client,
            view: Arc::new(Mutex::new(AnalysisView::default())),
            cancel: Arc::new(Mutex::new(CancellationToken::new())),
        }
    }

    pub fn view(&self) -> &Arc<Mutex<AnalysisView>> {
        &self.view
    }

    /// Cancels whatever is in flight and starts the three fetches afresh.
    pub async fn mount(&self) -> u64 {
        let mut cancel = self.cancel.lock().await;
        cancel.cancel();
        let token = CancellationToken::new();
        *cancel = token.clone();

        let generation = self.view.lock().await.remount();
        info!("mounting dashboard (generation {generation})");

        let client = self.client.clone();
        spawn_fetch(self.view.clone(), token.clone(), generation, "expenses", async move {
            FetchOutcome::Expenses(client.get_all_expense().await)
        });

        let client = self.client.clone();
        spawn_fetch(self.view.clone(), token.clone(), generation, "budgets", async move {
            FetchOutcome::Budgets(client.get_all_budget().await)
        });

        let client = self.client.clone();
        spawn_fetch(self.view.clone(), token, generation, "budget details", async move {
            FetchOutcome::Details(client.get_budget_details().await)
        });

        generation
    }

    pub async fn teardown(&self) {
        self.cancel.lock().await.cancel();
        self.view.lock().await.retire();
        info!("dashboard torn down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CategoryRef, UNCATEGORIZED};
    use std::time::Duration;

    fn expense(amount: f64, category: Option<&str>) -> ExpenseRecord {
        ExpenseRecord {
            amount,
            category: category.map(CategoryRef::named),
            ..Default::default()
        }
    }

    fn budget(amount: f64, category: &str) -> BudgetRecord {
        BudgetRecord {
            amount,
            category: Some(CategoryRef::named(category)),
            ..Default::default()
        }
    }

    fn status_error() -> FetchError {
        FetchError::Status {
            url: "http://backend/budget".into(),
            status: 502,
        }
    }

    #[test]
    fn fresh_view_is_loading_everywhere() {
        let mut view = AnalysisView::default();
        let generation = view.remount();
        assert_eq!(generation, 1);
        assert_eq!(view.pie(), Panel::Loading);
        assert_eq!(view.bar(), Panel::Loading);
        assert_eq!(view.gauges(), Panel::Loading);
        assert_eq!(view.lines(Frequency::Monthly), Panel::Loading);
    }

    #[test]
    fn partial_data_renders_without_expenses() {
        let mut view = AnalysisView::default();
        let generation = view.remount();
        view.apply(
            generation,
            FetchOutcome::Budgets(Ok((Some(100.0), vec![budget(100.0, "Food")]))),
        );

        let bar = view.bar();
        let chart = bar.ready().expect("bar should render");
        assert_eq!(chart.labels, vec!["Food"]);
        assert_eq!(chart.datasets[1].data, vec![0.0]);

        let totals = view.totals();
        assert_eq!(totals.total_budget, Panel::Ready { data: 100.0 });
        assert_eq!(totals.total_expense, Panel::Loading);

        assert_eq!(view.gauges(), Panel::Loading);
        assert_eq!(view.pie(), Panel::Loading);
    }

    #[test]
    fn full_data_feeds_every_panel() {
        let mut view = AnalysisView::default();
        let generation = view.remount();
        view.apply(
            generation,
            FetchOutcome::Expenses(Ok((
                vec![expense(50.0, Some("Food")), expense(30.0, None)],
                Some(80.0),
            ))),
        );
        view.apply(
            generation,
            FetchOutcome::Budgets(Ok((Some(200.0), vec![budget(200.0, "Food")]))),
        );
        view.apply(generation, FetchOutcome::Details(Ok(Vec::new())));

        let pie = view.pie();
        assert_eq!(pie.ready().unwrap().labels, vec!["Food", UNCATEGORIZED]);

        let gauges = view.gauges();
        let gauges = gauges.ready().unwrap();
        assert_eq!(gauges.expense_ratio.raw, 0.4);
        assert_eq!(gauges.savings_rate.raw, 0.6);

        let lines = view.lines(Frequency::Weekly);
        assert!(lines.ready().unwrap().is_empty);

        let status = view.status();
        assert_eq!(status.details, SectionStatus::Ready);
    }

    #[test]
    fn missing_reported_total_falls_back_to_record_sum() {
        let data = ExpensesData {
            records: vec![expense(5.0, None), expense(7.5, Some("Fuel"))],
            reported_total: None,
        };
        assert_eq!(data.total(), 12.5);
    }

    #[test]
    fn failed_section_only_breaks_its_panels() {
        let mut view = AnalysisView::default();
        let generation = view.remount();
        view.apply(generation, FetchOutcome::Budgets(Err(status_error())));
        view.apply(
            generation,
            FetchOutcome::Expenses(Ok((vec![expense(10.0, Some("Food"))], Some(10.0)))),
        );

        assert!(matches!(view.bar(), Panel::Error { .. }));
        assert!(matches!(view.gauges(), Panel::Error { .. }));
        assert!(view.pie().ready().is_some());
        assert_eq!(view.status().budgets, SectionStatus::Error);
    }

    #[test]
    fn each_total_follows_its_own_section() {
        let mut view = AnalysisView::default();
        let generation = view.remount();
        view.apply(
            generation,
            FetchOutcome::Expenses(Ok((vec![expense(80.0, Some("Food"))], Some(80.0)))),
        );
        view.apply(generation, FetchOutcome::Budgets(Err(status_error())));

        let totals = view.totals();
        assert_eq!(totals.total_expense, Panel::Ready { data: 80.0 });
        assert_eq!(
            totals.total_budget,
            Panel::Error {
                message: "http://backend/budget answered 502".into()
            }
        );

        view.remount();
        assert_eq!(view.totals().total_expense, Panel::Loading);
    }

    #[test]
    fn stale_generation_is_ignored() {
        let mut view = AnalysisView::default();
        let first = view.remount();
        let second = view.remount();

        let applied = view.apply(first, FetchOutcome::Details(Ok(Vec::new())));
        assert!(!applied);
        assert_eq!(view.details().status(), SectionStatus::Loading);

        assert!(view.apply(second, FetchOutcome::Details(Ok(Vec::new()))));
        assert_eq!(view.details().status(), SectionStatus::Ready);
    }

    #[tokio::test]
    async fn cancelled_fetch_never_reaches_the_view() {
        let view = Arc::new(Mutex::new(AnalysisView::default()));
        let generation = view.lock().await.remount();
        let token = CancellationToken::new();

        let handle = spawn_fetch(view.clone(), token.clone(), generation, "details", async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            FetchOutcome::Details(Ok(Vec::new()))
        });
        token.cancel();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("cancelled task should finish promptly")
            .unwrap();
        assert_eq!(view.lock().await.details().status(), SectionStatus::Loading);
    }

    #[tokio::test]
    async fn completed_fetch_is_applied() {
        let view = Arc::new(Mutex::new(AnalysisView::default()));
        let generation = view.lock().await.remount();

        spawn_fetch(
            view.clone(),
            CancellationToken::new(),
            generation,
            "details",
            async { FetchOutcome::Details(Ok(Vec::new())) },
        )
        .await
        .unwrap();

        assert_eq!(view.lock().await.details().status(), SectionStatus::Ready);
    }
}
