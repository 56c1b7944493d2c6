use crate::core::screening::require_below;
use crate::domain::model::AssetKind;
use crate::server::UploadForm;
use crate::utils::error::RegistryError;
use crate::web::error::WebError;
use crate::web::session::PendingDocument;
use crate::web::state::SharedState;
use axum::extract::{Multipart, State};
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use minijinja::context;

const ALL_FIELDS_REQUIRED: &str = "All fields are required.";

pub async fn pdf_page(
    State(state): State<SharedState>,
    jar: CookieJar,
) -> Result<Response, WebError> {
    let visitor = state.visitor(jar).await?;
    let page = state
        .views
        .render("pdf.html", context! { wallet => &visitor.wallet })?;
    Ok((visitor.jar, page).into_response())
}

/// 一次完成：檢查 → 拒絕過於相似 → IPFS → 合約
pub async fn pdf_submit(
    State(state): State<SharedState>,
    jar: CookieJar,
    multipart: Multipart,
) -> Result<Response, WebError> {
    let visitor = state.visitor(jar).await?;
    let mut form = UploadForm::read(multipart).await?;

    let title = form.text("title");
    let author = form.text("author");
    let upload = form.take_file(AssetKind::Pdf.form_field());
    let (Some(title), Some(author), Some(upload)) = (title, author, upload) else {
        let page = state.views.render(
            "pdf.html",
            context! { wallet => &visitor.wallet, error => ALL_FIELDS_REQUIRED },
        )?;
        return Ok((visitor.jar, page).into_response());
    };

    let context = match state
        .desk
        .register_document(&upload, &title, &author, &visitor.wallet)
        .await
    {
        Ok(registration) => {
            tracing::info!(
                "✅ PDF {} registered as token {}",
                upload.file_name,
                registration.token_id
            );
            context! {
                wallet => &visitor.wallet,
                success => true,
                token_id => registration.token_id,
                ipfs => registration.ipfs_hash,
            }
        }
        Err(e) => context! { wallet => &visitor.wallet, error => e.user_friendly_message() },
    };

    let page = state.views.render("pdf.html", context)?;
    Ok((visitor.jar, page).into_response())
}

pub async fn textual_page(
    State(state): State<SharedState>,
    jar: CookieJar,
) -> Result<Response, WebError> {
    let visitor = state.visitor(jar).await?;
    let page = state
        .views
        .render("textual.html", context! { wallet => &visitor.wallet })?;
    Ok((visitor.jar, page).into_response())
}

/// 顯示所有相似結果，文件留在 session 等待登記
pub async fn textual_check(
    State(state): State<SharedState>,
    jar: CookieJar,
    multipart: Multipart,
) -> Result<Response, WebError> {
    let mut visitor = state.visitor(jar).await?;
    let mut form = UploadForm::read(multipart).await?;

    let fields = (
        form.text("title"),
        form.text("author"),
        form.text("language"),
        form.take_file(AssetKind::Pdf.form_field()),
    );
    let (Some(title), Some(author), Some(language), Some(upload)) = fields else {
        let page = state.views.render(
            "textual.html",
            context! { wallet => &visitor.wallet, error => ALL_FIELDS_REQUIRED },
        )?;
        return Ok((visitor.jar, page).into_response());
    };

    let screening = match state.desk.screen_document(&upload).await {
        Ok(screening) => screening,
        Err(e) => {
            let page = state.views.render(
                "textual.html",
                context! { wallet => &visitor.wallet, error => e.user_friendly_message() },
            )?;
            return Ok((visitor.jar, page).into_response());
        }
    };

    let page = state.views.render(
        "textual_similarity.html",
        context! {
            wallet => &visitor.wallet,
            results => &screening.report.matches,
            top_score => screening.top_score,
            threshold => screening.threshold,
            cleared => screening.is_clear(),
            title => &title,
            author => &author,
            language => &language,
        },
    )?;

    let document = PendingDocument {
        upload,
        title,
        author,
        language,
        top_score: screening.top_score,
        checked_at: Utc::now(),
    };
    state
        .remember(&mut visitor, |session| {
            session.pending_document = Some(document)
        })
        .await;
    Ok((visitor.jar, page).into_response())
}

pub async fn textual_register(
    State(state): State<SharedState>,
    jar: CookieJar,
) -> Result<Response, WebError> {
    let visitor = state.visitor(jar).await?;
    let pending = state
        .take(&visitor, |session| session.pending_document.take())
        .await
        .filter(|document| !document.is_stale(Utc::now()));

    let result = async {
        let document = pending.ok_or_else(|| {
            RegistryError::session("No PDF found to register. Please run similarity check first.")
        })?;
        require_below(AssetKind::Pdf.label(), document.top_score, state.desk.threshold())?;
        tracing::debug!(
            "Registering checked document {} ({})",
            document.title,
            document.language
        );
        state
            .desk
            .pin_and_register_document(
                &document.upload,
                &document.title,
                &document.author,
                &visitor.wallet,
            )
            .await
    }
    .await;

    let context = match result {
        Ok(registration) => context! {
            wallet => &visitor.wallet,
            success => true,
            token_id => registration.token_id,
            ipfs => registration.ipfs_hash,
        },
        Err(e) => context! { wallet => &visitor.wallet, error => e.user_friendly_message() },
    };
    let page = state.views.render("textual.html", context)?;
    Ok((visitor.jar, page).into_response())
}
