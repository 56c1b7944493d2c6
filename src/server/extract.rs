use crate::server::ApiError;
use axum::extract::FromRequest;

/// JSON 請求本體；格式錯誤時同樣回傳 `{"error": "..."}`
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
