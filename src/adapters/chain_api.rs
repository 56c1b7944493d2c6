use crate::adapters::http::{build_client, expect_json, file_part, join_url};
use crate::config::ChainGatewayConfig;
use crate::domain::model::{
    AssetKind, AssetMetadata, DocumentPin, HistoryEntry, PinReceipt, RegisterRequest,
    RegisterResponse, TokenRecord, TransferRequest, TransferResponse, Upload,
};
use crate::utils::error::{RegistryError, Result};
use reqwest::{multipart, Client};
use std::time::Duration;

const SERVICE: &str = "chain-gateway";

/// Web 端呼叫 chain gateway 的客戶端
#[derive(Debug, Clone)]
pub struct ChainApiClient {
    client: Client,
    endpoint: String,
}

impl ChainApiClient {
    pub fn new(config: &ChainGatewayConfig) -> Result<Self> {
        Ok(Self {
            // 交易需等待出塊
            client: build_client(Duration::from_secs(config.timeout_seconds))?,
            endpoint: config.endpoint.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.endpoint, path)
    }

    /// 上傳文件與 {title, author} 描述資料，回傳描述資料的 CID
    pub async fn upload_document(&self, upload: &Upload, title: &str, author: &str) -> Result<String> {
        let form = multipart::Form::new()
            .part("file", file_part(upload, AssetKind::Pdf.default_content_type())?)
            .text("title", title.to_string())
            .text("author", author.to_string());

        let response = self
            .client
            .post(self.url("/ipfs/upload"))
            .multipart(form)
            .send()
            .await?;
        let pin: DocumentPin = expect_json(SERVICE, response).await?;
        Ok(pin.hash)
    }

    /// 圖片或影片描述資料上 IPFS
    pub async fn register_metadata(&self, kind: AssetKind, metadata: &AssetMetadata) -> Result<PinReceipt> {
        let path = match kind {
            AssetKind::Video => "/ipfs/registerVideo",
            AssetKind::Image => "/ipfs/registerImage",
            AssetKind::Pdf => {
                return Err(RegistryError::validation(
                    "PDF documents are pinned through the document upload",
                ))
            }
        };

        let response = self.client.post(self.url(path)).json(metadata).send().await?;
        let receipt: PinReceipt = expect_json(SERVICE, response).await?;
        if receipt.ipfs_hash.is_empty() {
            return Err(RegistryError::upstream(
                SERVICE,
                200,
                "IPFS upload succeeded but ipfsHash is empty",
            ));
        }
        Ok(receipt)
    }

    /// 上鏈登記，回傳 token id
    pub async fn register_token(
        &self,
        ipfs_hash: &str,
        wallet_address: &str,
        property_type: Option<&str>,
    ) -> Result<String> {
        let request = RegisterRequest {
            ipfs_hash: Some(ipfs_hash.to_string()),
            wallet_address: Some(wallet_address.to_string()),
            property_type: property_type.map(str::to_string),
        };
        let response = self
            .client
            .post(self.url("/blockchain/register"))
            .json(&request)
            .send()
            .await?;
        let registered: RegisterResponse = expect_json(SERVICE, response).await?;
        tracing::info!(
            "⛓️ Registered {} for {} as token {}",
            ipfs_hash,
            wallet_address,
            registered.token_id
        );
        Ok(registered.token_id)
    }

    pub async fn tokens(&self, wallet_address: &str) -> Result<Vec<TokenRecord>> {
        let response = self
            .client
            .get(self.url(&format!("/blockchain/tokens/{}", wallet_address)))
            .send()
            .await?;
        expect_json(SERVICE, response).await
    }

    pub async fn transfer(&self, from: &str, to: &str, token_id: &str) -> Result<TransferResponse> {
        let request = TransferRequest {
            from: Some(from.to_string()),
            to: Some(to.to_string()),
            token_id: Some(token_id.to_string()),
        };
        let response = self
            .client
            .post(self.url("/blockchain/transfer"))
            .json(&request)
            .send()
            .await?;
        expect_json(SERVICE, response).await
    }

    pub async fn history(&self, token_id: &str) -> Result<Vec<HistoryEntry>> {
        let response = self
            .client
            .get(self.url(&format!("/blockchain/history/{}", token_id)))
            .send()
            .await?;
        expect_json(SERVICE, response).await
    }
}
