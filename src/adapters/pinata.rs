use crate::adapters::http::{build_client, expect_json, file_part, join_url};
use crate::config::PinataConfig;
use crate::domain::model::Upload;
use crate::domain::ports::IpfsPinner;
use crate::utils::error::{RegistryError, Result};
use async_trait::async_trait;
use reqwest::{multipart, Client};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct PinResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

/// Pinata 釘選 API (JWT bearer)
#[derive(Debug, Clone)]
pub struct PinataClient {
    client: Client,
    api_base: String,
    gateway_base: String,
    jwt: String,
}

impl PinataClient {
    pub fn new(config: &PinataConfig) -> Result<Self> {
        let jwt = config
            .jwt
            .clone()
            .ok_or_else(|| RegistryError::MissingConfigError {
                field: "pinata.jwt".to_string(),
            })?;
        Ok(Self {
            // 大檔案上傳需要較長時間
            client: build_client(Duration::from_secs(30 * 60))?,
            api_base: config.api_base.clone(),
            gateway_base: config.gateway_base.clone(),
            jwt,
        })
    }
}

#[async_trait]
impl IpfsPinner for PinataClient {
    async fn pin_file(&self, upload: &Upload) -> Result<String> {
        let url = join_url(&self.api_base, "/pinning/pinFileToIPFS");
        let form = multipart::Form::new().part(
            "file",
            file_part(upload, "application/octet-stream")?,
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.jwt)
            .multipart(form)
            .send()
            .await?;
        let pinned: PinResponse = expect_json("pinata", response).await?;
        tracing::info!("📌 Pinned file {} as {}", upload.file_name, pinned.ipfs_hash);
        Ok(pinned.ipfs_hash)
    }

    async fn pin_json(&self, name: &str, content: &serde_json::Value) -> Result<String> {
        let url = join_url(&self.api_base, "/pinning/pinJSONToIPFS");
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.jwt)
            .json(content)
            .send()
            .await?;
        let pinned: PinResponse = expect_json("pinata", response).await?;
        tracing::info!("📌 Pinned metadata {} as {}", name, pinned.ipfs_hash);
        Ok(pinned.ipfs_hash)
    }

    fn gateway_url(&self, hash: &str) -> String {
        join_url(&self.gateway_base, hash)
    }
}
