use crate::charts::GAUGE_BANDS;
use crate::gauge::{self, GaugeLayout};
use crate::models::{AnalysisResponse, Frequency, GaugeData, Panel};
use askama::Template;

const LOADING: &str = "…";

/// The dashboard page. The script re-renders every section from
/// `/api/analysis`, so this first paint only has to match it.
#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate<'a> {
    total_budget: TotalCell,
    total_expense: TotalCell,
    gauges: Vec<GaugeCard>,
    frequencies: Vec<FrequencyOption>,
    frequency: &'a str,
    backend_url: &'a str,
    center_x: f64,
    center_y: f64,
    outer_radius: f64,
    inner_radius: f64,
}

struct TotalCell {
    text: String,
    failed: bool,
}

impl TotalCell {
    fn from_panel(panel: &Panel<f64>) -> Self {
        match panel {
            Panel::Ready { data } => Self {
                text: format!("${data:.2}"),
                failed: false,
            },
            Panel::Loading => Self {
                text: LOADING.to_string(),
                failed: false,
            },
            Panel::Error { .. } => Self {
                text: "--".to_string(),
                failed: true,
            },
        }
    }
}

/// One gauge slot. Without a layout the caption is a status line instead.
struct GaugeCard {
    key: &'static str,
    caption: String,
    overspent: bool,
    layout: Option<GaugeLayout>,
}

impl GaugeCard {
    fn ready(key: &'static str, gauge: &GaugeData) -> Self {
        let mut caption = gauge.display.clone();
        if gauge.overspent {
            caption.push_str(" (over budget)");
        }
        Self {
            key,
            caption,
            overspent: gauge.overspent,
            layout: Some(gauge::layout(gauge.percent, &GAUGE_BANDS)),
        }
    }

    fn placeholder(key: &'static str, message: &str) -> Self {
        Self {
            key,
            caption: message.to_string(),
            overspent: false,
            layout: None,
        }
    }
}

struct FrequencyOption {
    value: &'static str,
    label: String,
    selected: bool,
}

pub fn render_index(
    analysis: &AnalysisResponse,
    backend_url: &str,
) -> Result<String, askama::Error> {
    let gauges = match &analysis.gauges {
        Panel::Ready { data } => vec![
            GaugeCard::ready("expense_ratio", &data.expense_ratio),
            GaugeCard::ready("savings_rate", &data.savings_rate),
        ],
        Panel::Loading => vec![
            GaugeCard::placeholder("expense_ratio", "Loading…"),
            GaugeCard::placeholder("savings_rate", "Loading…"),
        ],
        Panel::Error { message } => vec![
            GaugeCard::placeholder("expense_ratio", message),
            GaugeCard::placeholder("savings_rate", message),
        ],
    };

    IndexTemplate {
        total_budget: TotalCell::from_panel(&analysis.totals.total_budget),
        total_expense: TotalCell::from_panel(&analysis.totals.total_expense),
        gauges,
        frequencies: frequency_options(analysis.frequency),
        frequency: analysis.frequency.as_str(),
        backend_url,
        center_x: gauge::CENTER_X,
        center_y: gauge::CENTER_Y,
        outer_radius: gauge::OUTER_RADIUS,
        inner_radius: gauge::INNER_RADIUS,
    }
    .render()
}

fn frequency_options(selected: Frequency) -> Vec<FrequencyOption> {
    Frequency::ALL
        .into_iter()
        .map(|frequency| {
            let value = frequency.as_str();
            let mut label = value.to_string();
            label[..1].make_ascii_uppercase();
            FrequencyOption {
                value,
                label,
                selected: frequency == selected,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts;
    use crate::models::{Gauges, Totals};
    use chrono::Utc;

    fn analysis(totals: Totals, gauges: Panel<Gauges>) -> AnalysisResponse {
        AnalysisResponse {
            generation: 1,
            generated_at: Utc::now(),
            frequency: Frequency::Weekly,
            totals,
            gauges,
            pie: Panel::Loading,
            bar: Panel::Loading,
            lines: Panel::Loading,
        }
    }

    fn loading_totals() -> Totals {
        Totals {
            total_budget: Panel::Loading,
            total_expense: Panel::Loading,
        }
    }

    #[test]
    fn index_shows_totals_and_selected_frequency() {
        let page = render_index(
            &analysis(
                Totals {
                    total_budget: Panel::Ready { data: 200.0 },
                    total_expense: Panel::Ready { data: 80.0 },
                },
                Panel::Ready {
                    data: charts::gauges(Some(200.0), 80.0),
                },
            ),
            "http://backend/api",
        )
        .unwrap();
        assert!(page.contains("$200.00"));
        assert!(page.contains("$80.00"));
        assert!(page.contains(r#"<option value="weekly" selected>Weekly</option>"#));
        assert!(page.contains(r#"<option value="daily">Daily</option>"#));
        assert!(page.contains("Expense Ratio: 40%"));
        assert!(page.contains("Savings Rate: 60%"));
        assert!(page.contains(r#"id="gauge-expense_ratio""#));
        assert_eq!(page.matches(r##"fill="#FFEB3B""##).count(), 2);
    }

    #[test]
    fn one_failed_total_leaves_the_other_visible() {
        let page = render_index(
            &analysis(
                Totals {
                    total_budget: Panel::Error {
                        message: "budget service down".into(),
                    },
                    total_expense: Panel::Ready { data: 80.0 },
                },
                Panel::Loading,
            ),
            "http://backend/api",
        )
        .unwrap();
        assert!(page.contains(r#"<div class="value error" id="total-budget">--</div>"#));
        assert!(page.contains(r#"<div class="value" id="total-expense">$80.00</div>"#));
    }

    #[test]
    fn overspend_is_marked_on_the_gauge() {
        let page = render_index(
            &analysis(
                loading_totals(),
                Panel::Ready {
                    data: charts::gauges(Some(100.0), 150.0),
                },
            ),
            "http://backend/api",
        )
        .unwrap();
        assert!(page.contains("gauge-card overspent"));
        assert!(page.contains("Expense Ratio: 100% (over budget)"));
    }

    #[test]
    fn error_messages_are_escaped() {
        let page = render_index(
            &analysis(
                loading_totals(),
                Panel::Error {
                    message: "<script>alert(1)</script>".into(),
                },
            ),
            "http://backend/api?a=<b>",
        )
        .unwrap();
        assert!(page.contains("&lt;script&gt;alert(1)"));
        assert!(!page.contains("<script>alert(1)"));
        assert!(!page.contains("a=<b>"));
    }

    #[test]
    fn script_reads_the_shared_gauge_frame() {
        let page = render_index(&analysis(loading_totals(), Panel::Loading), "").unwrap();
        assert!(page.contains("const GAUGE = { cx: 100, cy: 100, outer: 80, inner: 60 };"));
        assert!(page.contains("setTotal('total-budget', analysis.totals.total_budget);"));
        assert!(page.contains("clearTimeout(pollTimer);"));
    }
}
