use crate::config::Config;
use crate::errors::FetchError;
use crate::models::{
    BudgetDetail, BudgetDetailsPayload, BudgetRecord, BudgetsPayload, ExpenseRecord,
    ExpensesPayload,
};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

/// HTTP client for the expense/budget backend.
#[derive(Clone)]
pub struct BackendClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl BackendClient {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(config.fetch_timeout).build()?;
        Ok(Self {
            http,
            base_url: config.backend_url.clone(),
            token: config.backend_token.clone(),
        })
    }

    /// All expenses plus the backend's total.
    pub async fn get_all_expense(&self) -> Result<(Vec<ExpenseRecord>, Option<f64>), FetchError> {
        let payload: ExpensesPayload = self.get_json("/expense").await?;
        Ok((payload.expenses, payload.total_expense))
    }

    /// The backend's total budget plus all budgets.
    pub async fn get_all_budget(&self) -> Result<(Option<f64>, Vec<BudgetRecord>), FetchError> {
        let payload: BudgetsPayload = self.get_json("/budget").await?;
        Ok((payload.total_budget, payload.budgets))
    }

    pub async fn get_budget_details(&self) -> Result<Vec<BudgetDetail>, FetchError> {
        let payload: BudgetDetailsPayload = self.get_json("/budget/details").await?;
        Ok(payload.budget_details)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        let url = format!("{}{path}", self.base_url);
        debug!("GET {url}");

        let mut request = self.http.get(&url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|source| FetchError::Transport {
            url: url.clone(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|source| FetchError::Decode { url, source })
    }
}
