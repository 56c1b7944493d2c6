use crate::utils::validation::is_wallet_address;
use crate::web::error::WebError;
use crate::web::state::SharedState;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Form;
use axum_extra::extract::cookie::CookieJar;
use minijinja::context;
use serde::Deserialize;

pub async fn wallet_page(
    State(state): State<SharedState>,
    jar: CookieJar,
) -> Result<Response, WebError> {
    let visitor = state.visitor(jar).await?;
    let flash = state.take(&visitor, |session| session.flash.take()).await;

    let (tokens, error) = match state.desk.chain().tokens(&visitor.wallet).await {
        Ok(tokens) => (tokens, None),
        Err(e) => (Vec::new(), Some(e.user_friendly_message())),
    };
    let page = state.views.render(
        "wallet.html",
        context! { wallet => &visitor.wallet, tokens, flash, error },
    )?;
    Ok((visitor.jar, page).into_response())
}

pub async fn history_page(
    State(state): State<SharedState>,
    jar: CookieJar,
    Path(token_id): Path<String>,
) -> Result<Response, WebError> {
    let visitor = state.visitor(jar).await?;
    let (history, error) = match state.desk.chain().history(&token_id).await {
        Ok(history) => (history, None),
        Err(e) => (Vec::new(), Some(e.user_friendly_message())),
    };
    let page = state.views.render(
        "history.html",
        context! { wallet => &visitor.wallet, token_id, history, error },
    )?;
    Ok((visitor.jar, page).into_response())
}

#[derive(Debug, Deserialize)]
pub struct TransferForm {
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub token_id: String,
}

pub async fn transfer_page(
    State(state): State<SharedState>,
    jar: CookieJar,
) -> Result<Response, WebError> {
    let visitor = state.visitor(jar).await?;
    let page = state
        .views
        .render("transfer.html", context! { wallet => &visitor.wallet })?;
    Ok((visitor.jar, page).into_response())
}

pub async fn transfer_submit(
    State(state): State<SharedState>,
    jar: CookieJar,
    Form(form): Form<TransferForm>,
) -> Result<Response, WebError> {
    let visitor = state.visitor(jar).await?;
    let to = form.to.trim();
    let token_id = form.token_id.trim();

    let context = if !is_wallet_address(to) || token_id.is_empty() {
        context! {
            wallet => &visitor.wallet,
            error => "A valid recipient address and token id are required.",
        }
    } else {
        match state.desk.chain().transfer(&visitor.wallet, to, token_id).await {
            Ok(transfer) => {
                tracing::info!("🔁 Token {} transferred to {}", token_id, to);
                context! {
                    wallet => &visitor.wallet,
                    success => transfer.success,
                    tx_hash => transfer.tx_hash,
                    token_id,
                    to,
                }
            }
            Err(e) => context! { wallet => &visitor.wallet, error => e.user_friendly_message() },
        }
    };

    let page = state.views.render("transfer.html", context)?;
    Ok((visitor.jar, page).into_response())
}
