use std::sync::Arc;

use crate::{error::ApiResult, main_lib::AppState};
use axum::{extract::State, routing::get, Json, Router};
use quotebook_core::session::DisplayedQuote;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FilterResponse {
    /// Filter as selected
    category: String,
    /// Filter actually applied
    effective: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    quote: Option<DisplayedQuote>,
}

#[derive(Deserialize)]
struct FilterUpdate {
    #[serde(default)]
    category: String,
}

async fn get_filter(State(state): State<Arc<AppState>>) -> ApiResult<Json<FilterResponse>> {
    Ok(Json(FilterResponse {
        category: state.session_service.current_filter(),
        effective: state.session_service.effective_filter(),
        quote: None,
    }))
}

async fn update_filter(
    State(state): State<Arc<AppState>>,
    Json(update): Json<FilterUpdate>,
) -> ApiResult<Json<FilterResponse>> {
    state.session_service.set_filter(update.category.trim()).await?;
    let quote = state.session_service.show_random().await?;
    Ok(Json(FilterResponse {
        category: state.session_service.current_filter(),
        effective: state.session_service.effective_filter(),
        quote,
    }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/filter", get(get_filter).put(update_filter))
}
