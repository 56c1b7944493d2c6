use crate::domain::wallet::{ChallengeRequest, ChallengeResponse, VerifyRequest};
use crate::server::{ApiError, ApiJson};
use crate::utils::error::RegistryError;
use crate::utils::validation::is_wallet_address;
use crate::web::error::WebError;
use crate::web::session::SessionStore;
use crate::web::state::SharedState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use minijinja::context;

pub async fn index(State(state): State<SharedState>, jar: CookieJar) -> Redirect {
    match state.sessions.load(&jar).await {
        Some((_, session)) if session.wallet_address.is_some() => Redirect::to("/dashboard"),
        _ => Redirect::to("/login"),
    }
}

pub async fn login_page(
    State(state): State<SharedState>,
    jar: CookieJar,
) -> Result<Response, WebError> {
    if let Some((_, session)) = state.sessions.load(&jar).await {
        if session.wallet_address.is_some() {
            return Ok(Redirect::to("/dashboard").into_response());
        }
    }
    let page: Html<String> = state.views.render(
        "login.html",
        context! { domain => &state.config.domain, uri => &state.config.uri },
    )?;
    Ok(page.into_response())
}

/// 向 Moralis 取得要給 MetaMask 簽名的訊息
pub async fn challenge(
    State(state): State<SharedState>,
    ApiJson(request): ApiJson<ChallengeRequest>,
) -> Result<Json<ChallengeResponse>, ApiError> {
    if !is_wallet_address(&request.address) {
        return Err(ApiError::BadRequest("A valid wallet address is required.".to_string()));
    }

    match state
        .moralis
        .request_challenge(&request, &state.config.domain, &state.config.uri)
        .await
    {
        Ok(challenge) => Ok(Json(challenge)),
        Err(RegistryError::UpstreamError { body, .. }) => Err(ApiError::BadRequest(body)),
        Err(e) => Err(e.into()),
    }
}

pub async fn authenticate(
    State(state): State<SharedState>,
    jar: CookieJar,
    ApiJson(request): ApiJson<VerifyRequest>,
) -> Result<Response, ApiError> {
    let verified = state.moralis.verify_challenge(&request).await?;
    let Some(signer) = verified.filter(|signer| signer.eq_ignore_ascii_case(&request.address))
    else {
        tracing::warn!("🔒 Sign-in refused for claimed wallet {}", request.address);
        return Ok((
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "error": "Signature verification failed." })),
        )
            .into_response());
    };

    if let Some(id) = SessionStore::session_id(&jar) {
        state.sessions.end(id).await;
    }
    let (id, _) = state.sessions.start(Some(signer.clone())).await;
    tracing::info!("🔓 Wallet {} signed in", signer);

    let jar = jar.add(state.sessions.cookie(id));
    let body = Json(serde_json::json!({ "success": true, "redirectUrl": "/dashboard" }));
    Ok((jar, body).into_response())
}

pub async fn logout(State(state): State<SharedState>, jar: CookieJar) -> (CookieJar, Redirect) {
    if let Some(id) = SessionStore::session_id(&jar) {
        state.sessions.end(id).await;
    }
    (jar.remove(SessionStore::removal_cookie()), Redirect::to("/login"))
}
