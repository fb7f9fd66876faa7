use std::sync::Arc;

use crate::{error::ApiResult, main_lib::AppState};
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use quotebook_core::constants::{ALL_CATEGORIES, EXPORT_FILE_NAME};
use quotebook_core::quotes::{ImportSummary, NewQuote, Quote};
use quotebook_core::session::DisplayedQuote;
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
struct QuotesQuery {
    category: Option<String>,
}

async fn list_quotes(
    State(state): State<Arc<AppState>>,
    Query(query): Query<QuotesQuery>,
) -> ApiResult<Json<Vec<Quote>>> {
    let category = query
        .category
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| ALL_CATEGORIES.to_string());
    Ok(Json(state.quote_service.filtered(&category)))
}

async fn add_quote(
    State(state): State<Arc<AppState>>,
    Json(new_quote): Json<NewQuote>,
) -> ApiResult<(StatusCode, Json<DisplayedQuote>)> {
    let quote = state.quote_service.add_quote(new_quote).await?;
    let shown = state.session_service.show_quote(quote.id).await?;
    Ok((StatusCode::CREATED, Json(shown)))
}

/// 200 with the quote, or 204 when the view is empty.
fn displayed(shown: Option<DisplayedQuote>) -> Response {
    match shown {
        Some(quote) => Json(quote).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

async fn random_quote(State(state): State<Arc<AppState>>) -> ApiResult<Response> {
    let shown = state.session_service.show_random().await?;
    Ok(displayed(shown))
}

async fn current_quote(State(state): State<Arc<AppState>>) -> ApiResult<Response> {
    let shown = state.session_service.restore_last_viewed().await?;
    Ok(displayed(shown))
}

async fn export_quotes(State(state): State<Arc<AppState>>) -> ApiResult<Response> {
    let json = state.quote_service.export_quotes()?;
    let disposition = format!("attachment; filename=\"{}\"", EXPORT_FILE_NAME);
    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        json,
    )
        .into_response())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImportResponse {
    #[serde(flatten)]
    summary: ImportSummary,
    /// Random quote shown after the filter was reset to all
    quote: Option<DisplayedQuote>,
}

async fn import_quotes(
    State(state): State<Arc<AppState>>,
    body: String,
) -> ApiResult<Json<ImportResponse>> {
    let summary = state.quote_service.import_quotes(&body).await?;
    let quote = state.session_service.reset_to_all_and_show_random().await?;
    Ok(Json(ImportResponse { summary, quote }))
}

async fn list_categories(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(state.quote_service.all_categories()))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/quotes", get(list_quotes).post(add_quote))
        .route("/quotes/random", get(random_quote))
        .route("/quotes/current", get(current_quote))
        .route("/quotes/export", get(export_quotes))
        .route("/quotes/import", post(import_quotes))
        .route("/categories", get(list_categories))
}
