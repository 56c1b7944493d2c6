use crate::core::screening::require_below;
use crate::domain::model::{AssetKind, AssetMetadata, Upload};
use crate::server::UploadForm;
use crate::utils::error::RegistryError;
use crate::web::error::WebError;
use crate::web::session::PendingAsset;
use crate::web::state::{SharedState, Visitor};
use axum::extract::{Multipart, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use minijinja::context;

/// 表單欄位轉成描述資料；缺少必填欄位或檔案時回傳 None
fn read_asset(
    form: &mut UploadForm,
    kind: AssetKind,
    wallet: &str,
) -> Option<(AssetMetadata, Upload)> {
    let upload = form.take_file(kind.form_field())?;
    let metadata = AssetMetadata {
        filename: Some(upload.file_name.clone()),
        title: Some(form.text("title")?),
        category: Some(form.text("category")?),
        creator: Some(form.text("creator")?),
        description: form.text("description"),
        published_source: form.text("published_source"),
        date_of_creation: form.text("date_of_creation"),
        wallet_address: Some(wallet.to_string()),
    };
    Some((metadata, upload))
}

/// 圖片服務中已訓練的全部描述資料
pub async fn image_index(
    State(state): State<SharedState>,
    jar: CookieJar,
) -> Result<Response, WebError> {
    let visitor = state.visitor(jar).await?;
    let (catalog, error) = match state.desk.similarity().image_catalog().await {
        Ok(catalog) => (Some(catalog), None),
        Err(e) => (None, Some(e.user_friendly_message())),
    };
    let page = state.views.render(
        "image_index.html",
        context! { wallet => &visitor.wallet, catalog, error },
    )?;
    Ok((visitor.jar, page).into_response())
}

pub async fn image_upload_page(
    State(state): State<SharedState>,
    jar: CookieJar,
) -> Result<Response, WebError> {
    let visitor = state.visitor(jar).await?;
    let page = state
        .views
        .render("image_upload.html", context! { wallet => &visitor.wallet })?;
    Ok((visitor.jar, page).into_response())
}

/// 檢查並訓練後導向結果頁
pub async fn image_upload(
    State(state): State<SharedState>,
    jar: CookieJar,
    multipart: Multipart,
) -> Result<Response, WebError> {
    let mut visitor = state.visitor(jar).await?;
    let mut form = UploadForm::read(multipart).await?;

    let Some((metadata, upload)) = read_asset(&mut form, AssetKind::Image, &visitor.wallet) else {
        let page = state.views.render(
            "image_upload.html",
            context! { wallet => &visitor.wallet, error => "Title, category, creator and image are required." },
        )?;
        return Ok((visitor.jar, page).into_response());
    };

    match state.desk.intake_image(&upload, &metadata).await {
        Ok(intake) => {
            let pending = PendingAsset::new(metadata, intake.screening, Some(intake.train_message));
            state
                .remember(&mut visitor, |session| session.pending_image = Some(pending))
                .await;
            Ok((visitor.jar, Redirect::to("/image/results")).into_response())
        }
        Err(e) => {
            let page = state.views.render(
                "image_upload.html",
                context! { wallet => &visitor.wallet, error => e.user_friendly_message() },
            )?;
            Ok((visitor.jar, page).into_response())
        }
    }
}

pub async fn image_results(
    State(state): State<SharedState>,
    jar: CookieJar,
) -> Result<Response, WebError> {
    let visitor = state.visitor(jar).await?;
    let Some(pending) = visitor.session.pending_image.as_ref() else {
        return Ok((visitor.jar, Redirect::to("/image/upload")).into_response());
    };
    let page = state.views.render(
        "image_results.html",
        context! {
            wallet => &visitor.wallet,
            pending,
            threshold => state.desk.threshold(),
        },
    )?;
    Ok((visitor.jar, page).into_response())
}

/// 描述資料 → IPFS → 合約；成功訊息顯示在錢包頁
async fn register_pending(
    state: &SharedState,
    visitor: &Visitor,
    kind: AssetKind,
) -> Result<String, RegistryError> {
    let pending = match kind {
        AssetKind::Video => visitor.session.pending_video.clone(),
        _ => visitor.session.pending_image.clone(),
    }
    .ok_or_else(|| {
        RegistryError::session(format!(
            "No {} found to register. Please upload it first.",
            kind.label().to_lowercase()
        ))
    })?;
    require_below(kind.label(), pending.top_score, state.desk.threshold())?;

    let registration = state.desk.register_asset(kind, &pending.metadata).await?;
    state
        .take(visitor, |session| match kind {
            AssetKind::Video => session.pending_video.take(),
            _ => session.pending_image.take(),
        })
        .await;
    tracing::info!(
        "✅ {} {} registered as token {}",
        kind.label(),
        pending.metadata.filename.as_deref().unwrap_or_default(),
        registration.token_id
    );
    Ok(format!(
        "{} registered on the blockchain as token {} (IPFS {}).",
        kind.label(),
        registration.token_id,
        registration.ipfs_hash
    ))
}

pub async fn image_register(
    State(state): State<SharedState>,
    jar: CookieJar,
) -> Result<Response, WebError> {
    let mut visitor = state.visitor(jar).await?;
    match register_pending(&state, &visitor, AssetKind::Image).await {
        Ok(message) => {
            state
                .remember(&mut visitor, |session| session.flash = Some(message))
                .await;
            Ok((visitor.jar, Redirect::to("/wallet")).into_response())
        }
        Err(e) => {
            let page = match visitor.session.pending_image.as_ref() {
                Some(pending) => state.views.render(
                    "image_results.html",
                    context! {
                        wallet => &visitor.wallet,
                        pending,
                        threshold => state.desk.threshold(),
                        error => e.user_friendly_message(),
                    },
                )?,
                None => state.views.render(
                    "image_upload.html",
                    context! { wallet => &visitor.wallet, error => e.user_friendly_message() },
                )?,
            };
            Ok((visitor.jar, page).into_response())
        }
    }
}

pub async fn video_page(
    State(state): State<SharedState>,
    jar: CookieJar,
) -> Result<Response, WebError> {
    let visitor = state.visitor(jar).await?;
    let page = state.views.render(
        "video.html",
        context! { wallet => &visitor.wallet, pending => &visitor.session.pending_video },
    )?;
    Ok((visitor.jar, page).into_response())
}

/// 檢查影片；低於門檻才加入訓練集並開放登記
pub async fn video_submit(
    State(state): State<SharedState>,
    jar: CookieJar,
    multipart: Multipart,
) -> Result<Response, WebError> {
    let mut visitor = state.visitor(jar).await?;
    let mut form = UploadForm::read(multipart).await?;

    let Some((metadata, upload)) = read_asset(&mut form, AssetKind::Video, &visitor.wallet) else {
        let page = state.views.render(
            "video.html",
            context! { wallet => &visitor.wallet, error => "All fields are required." },
        )?;
        return Ok((visitor.jar, page).into_response());
    };

    let context = match state.desk.intake_video(&upload, &metadata).await {
        Ok(intake) => {
            let trained = intake.trained;
            let pending = PendingAsset::new(metadata, intake.screening, None);
            let context = context! {
                wallet => &visitor.wallet,
                success => true,
                trained,
                pending => &pending,
                threshold => state.desk.threshold(),
            };
            if trained {
                state
                    .remember(&mut visitor, |session| session.pending_video = Some(pending))
                    .await;
            } else {
                state
                    .take(&visitor, |session| session.pending_video.take())
                    .await;
            }
            context
        }
        Err(e) => context! { wallet => &visitor.wallet, error => e.user_friendly_message() },
    };

    let page = state.views.render("video.html", context)?;
    Ok((visitor.jar, page).into_response())
}

pub async fn video_register(
    State(state): State<SharedState>,
    jar: CookieJar,
) -> Result<Response, WebError> {
    let mut visitor = state.visitor(jar).await?;
    match register_pending(&state, &visitor, AssetKind::Video).await {
        Ok(message) => {
            state
                .remember(&mut visitor, |session| session.flash = Some(message))
                .await;
            Ok((visitor.jar, Redirect::to("/wallet")).into_response())
        }
        Err(e) => {
            let page = state.views.render(
                "video.html",
                context! {
                    wallet => &visitor.wallet,
                    pending => &visitor.session.pending_video,
                    error => e.user_friendly_message(),
                },
            )?;
            Ok((visitor.jar, page).into_response())
        }
    }
}
