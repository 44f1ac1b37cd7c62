use crate::errors::AppError;
use crate::models::{AnalysisQuery, AnalysisResponse, Frequency, StatusResponse};
use crate::state::AppState;
use crate::ui::render_index;
use axum::{
    extract::{Query, State},
    response::Html,
    Json,
};

pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<AnalysisQuery>,
) -> Result<Html<String>, AppError> {
    let frequency = parse_frequency(&query)?;
    let analysis = state.dashboard.view().lock().await.analysis(frequency);
    Ok(Html(render_index(&analysis, &state.config.backend_url)?))
}

pub async fn get_analysis(
    State(state): State<AppState>,
    Query(query): Query<AnalysisQuery>,
) -> Result<Json<AnalysisResponse>, AppError> {
    let frequency = parse_frequency(&query)?;
    let view = state.dashboard.view().lock().await;
    Ok(Json(view.analysis(frequency)))
}

pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(state.dashboard.view().lock().await.status())
}

pub async fn refresh(State(state): State<AppState>) -> Json<StatusResponse> {
    state.dashboard.mount().await;
    Json(state.dashboard.view().lock().await.status())
}

fn parse_frequency(query: &AnalysisQuery) -> Result<Frequency, AppError> {
    match query.frequency.as_deref().map(str::trim) {
        None | Some("") => Ok(Frequency::default()),
        Some(value) => Ok(value.parse::<Frequency>()?),
    }
}
