use crate::server::ApiError;
use crate::web::error::WebError;
use crate::web::state::SharedState;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use axum_extra::extract::cookie::CookieJar;
use minijinja::context;
use serde::Deserialize;

const RECENT_LIMIT: usize = 10;

pub async fn patents_page(
    State(state): State<SharedState>,
    jar: CookieJar,
) -> Result<Response, WebError> {
    let visitor = state.visitor(jar).await?;
    let (registered, error) = match state.related.recently_registered(RECENT_LIMIT).await {
        Ok(registered) => (Some(registered), None),
        Err(e) => {
            tracing::warn!("⚠️ Related patent service unavailable: {}", e);
            (None, Some(e.user_friendly_message()))
        }
    };
    let page = state.views.render(
        "patents.html",
        context! { wallet => &visitor.wallet, registered, error },
    )?;
    Ok((visitor.jar, page).into_response())
}

#[derive(Debug, Deserialize)]
pub struct KeywordForm {
    #[serde(default)]
    pub keyword: Option<String>,
}

pub async fn validate_keyword(Form(form): Form<KeywordForm>) -> Json<serde_json::Value> {
    let valid = form
        .keyword
        .as_deref()
        .is_some_and(|keyword| !keyword.trim().is_empty());
    Json(serde_json::json!({ "valid": valid }))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: String,
    pub top_k: Option<usize>,
    pub threshold: Option<f64>,
}

pub async fn search(
    State(state): State<SharedState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let query = params.query.trim();
    if query.is_empty() {
        return Err(ApiError::BadRequest("Keyword is required.".to_string()));
    }
    let results = state
        .related
        .search(query, params.top_k, params.threshold)
        .await?;
    Ok(Json(results))
}

#[derive(Debug, Deserialize)]
pub struct RegisteredParams {
    pub limit: Option<usize>,
}

pub async fn registered(
    State(state): State<SharedState>,
    Query(params): Query<RegisteredParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let limit = params.limit.unwrap_or(RECENT_LIMIT);
    Ok(Json(state.related.recently_registered(limit).await?))
}
