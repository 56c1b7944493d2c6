use crate::domain::model::Upload;
use crate::utils::error::{RegistryError, Result};
use reqwest::{multipart, Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

pub fn build_client(timeout: Duration) -> Result<Client> {
    let client = Client::builder()
        .timeout(timeout)
        .user_agent(concat!("ip-registry/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// 上游回應原文，閘道直接轉送
#[derive(Debug, Clone)]
pub struct UpstreamReply {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl UpstreamReply {
    pub async fn read(response: Response) -> Result<Self> {
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await?;
        Ok(Self {
            status,
            content_type,
            body,
        })
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 非 2xx 轉成錯誤
    pub fn into_success(self, service: &str) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            tracing::warn!("❌ {} answered {}: {}", service, self.status, self.body);
            Err(RegistryError::upstream(service, self.status, self.body))
        }
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// 送出請求；非 2xx 時帶著回應本文回報錯誤，成功則反序列化
pub async fn expect_json<T: DeserializeOwned>(service: &str, response: Response) -> Result<T> {
    let reply = UpstreamReply::read(response).await?.into_success(service)?;
    reply.json()
}

pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

pub fn file_part(upload: &Upload, fallback_content_type: &str) -> Result<multipart::Part> {
    let content_type = upload
        .content_type
        .as_deref()
        .filter(|ct| !ct.is_empty())
        .unwrap_or(fallback_content_type);
    let part = multipart::Part::stream_with_length(
        reqwest::Body::from(upload.bytes.clone()),
        upload.bytes.len() as u64,
    )
    .file_name(upload.file_name.clone())
    .mime_str(content_type)?;
    Ok(part)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("http://localhost:5000/", "/check_similarity"),
            "http://localhost:5000/check_similarity"
        );
        assert_eq!(
            join_url("https://api.pinata.cloud", "pinning/pinJSONToIPFS"),
            "https://api.pinata.cloud/pinning/pinJSONToIPFS"
        );
    }

    #[test]
    fn test_reply_into_success() {
        let reply = UpstreamReply {
            status: 500,
            content_type: None,
            body: "{\"error\":\"boom\"}".to_string(),
        };
        let err = reply.into_success("pdf-similarity").unwrap_err();
        assert!(err.to_string().contains("boom"));
    }
}
