use crate::web::error::WebError;
use crate::web::state::SharedState;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;
use minijinja::context;

pub async fn dashboard(
    State(state): State<SharedState>,
    jar: CookieJar,
) -> Result<Response, WebError> {
    let visitor = state.visitor(jar).await?;

    let (overview, error) = match state.moralis.overview(&visitor.wallet).await {
        Ok(overview) => (Some(overview), None),
        Err(e) => {
            tracing::warn!("⚠️ Wallet overview for {} failed: {}", visitor.wallet, e);
            (None, Some(e.user_friendly_message()))
        }
    };

    let page = state.views.render(
        "dashboard.html",
        context! { wallet => visitor.wallet, overview, error },
    )?;
    Ok((visitor.jar, page).into_response())
}
