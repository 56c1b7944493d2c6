use crate::domain::model::{
    AssetKind, AssetMetadata, HistoryEntry, PinReceipt, TokenRecord, Upload,
};
use crate::domain::ports::{IpfsPinner, PropertyRegistry};
use crate::utils::error::{RegistryError, Result};
use crate::utils::validation::validate_wallet_address;
use futures_util::stream::{self, StreamExt};
use serde_json::{json, Map, Value};
use std::sync::Arc;

const SCAN_CONCURRENCY: usize = 8;

/// chain gateway 的業務邏輯：IPFS 釘選與合約操作
#[derive(Clone)]
pub struct Ledger {
    pinner: Arc<dyn IpfsPinner>,
    registry: Arc<dyn PropertyRegistry>,
}

impl Ledger {
    pub fn new(pinner: Arc<dyn IpfsPinner>, registry: Arc<dyn PropertyRegistry>) -> Self {
        Self { pinner, registry }
    }

    /// 先釘選檔案，再釘選指向它的描述資料；回傳描述資料的 CID
    pub async fn pin_document(
        &self,
        upload: &Upload,
        title: Option<&str>,
        author: Option<&str>,
    ) -> Result<String> {
        let file_hash = self.pinner.pin_file(upload).await?;
        let metadata = strip_nulls(json!({
            "title": title,
            "author": author,
            "file": format!("ipfs://{}", file_hash),
        }));
        self.pinner.pin_json(&upload.file_name, &metadata).await
    }

    pub async fn pin_asset_metadata(
        &self,
        kind: AssetKind,
        metadata: &AssetMetadata,
    ) -> Result<PinReceipt> {
        if metadata.missing_required() {
            return Err(RegistryError::validation("Missing required fields."));
        }

        let name = metadata.filename.as_deref().unwrap_or("metadata");
        let content = strip_nulls(serde_json::to_value(metadata)?);
        let hash = self.pinner.pin_json(name, &content).await?;

        Ok(PinReceipt {
            message: format!("{} metadata registered successfully", kind.label()),
            ipfs_url: format!("ipfs://{}", hash),
            gateway_url: self.pinner.gateway_url(&hash),
            ipfs_hash: hash,
        })
    }

    /// 送出登記交易並等待上鏈，回傳目前的 token 計數
    pub async fn register(&self, ipfs_hash: &str, wallet_address: &str) -> Result<u64> {
        if ipfs_hash.trim().is_empty() || wallet_address.trim().is_empty() {
            return Err(RegistryError::validation(
                "ipfsHash and walletAddress are required.",
            ));
        }

        let tx_hash = self
            .registry
            .register_property(ipfs_hash, wallet_address)
            .await?;
        tracing::info!("✅ Transaction mined: {}", tx_hash);

        // 併發登記時計數可能已超過本筆
        let token_id = self.registry.token_id_counter().await?;
        tracing::info!("🪙 Token: {}", token_id);
        Ok(token_id)
    }

    /// 掃描 1..=counter，查詢失敗的 token 直接略過；結果依 token id 排序
    pub async fn tokens_of(&self, wallet_address: &str) -> Result<Vec<TokenRecord>> {
        let max_token_id = self.registry.token_id_counter().await?;

        let tokens: Vec<TokenRecord> = stream::iter(1..=max_token_id)
            .map(|token_id| self.owned_token(token_id, wallet_address))
            .buffered(SCAN_CONCURRENCY)
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .flatten()
            .collect();

        tracing::debug!(
            "🔎 {} owns {} of {} tokens",
            wallet_address,
            tokens.len(),
            max_token_id
        );
        Ok(tokens)
    }

    async fn owned_token(&self, token_id: u64, wallet_address: &str) -> Option<TokenRecord> {
        let owner = match self.registry.owner_of(token_id).await {
            Ok(owner) => owner,
            Err(e) => {
                tracing::debug!("Skipping token {}: {}", token_id, e);
                return None;
            }
        };
        if !owner.eq_ignore_ascii_case(wallet_address) {
            return None;
        }
        match self.registry.property_details(token_id).await {
            Ok(details) => Some(TokenRecord {
                token_id: token_id.to_string(),
                ipfs_hash: details.ipfs_hash,
                owner: details.owner,
                timestamp: details.timestamp.to_string(),
            }),
            Err(e) => {
                tracing::debug!("Skipping token {}: {}", token_id, e);
                None
            }
        }
    }

    /// `from` 僅供紀錄，實際由閘道錢包送出交易
    pub async fn transfer(&self, from: Option<&str>, to: &str, token_id: &str) -> Result<String> {
        validate_wallet_address("to", to)?;
        let token_id = parse_token_id(token_id)?;
        tracing::info!(
            "🔁 Transfer token {} from {} to {}",
            token_id,
            from.unwrap_or("<gateway>"),
            to
        );
        self.registry.transfer_property(to, token_id).await
    }

    pub async fn history(&self, token_id: &str) -> Result<Vec<HistoryEntry>> {
        let token_id = parse_token_id(token_id)?;
        self.registry.transfer_history(token_id).await
    }
}

pub fn parse_token_id(raw: &str) -> Result<u64> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| RegistryError::validation(format!("Invalid token id: {}", raw)))
}

fn strip_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .collect::<Map<String, Value>>(),
        ),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::PropertyDetails;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingPinner {
        pinned: Mutex<Vec<Value>>,
    }

    #[async_trait]
    impl IpfsPinner for RecordingPinner {
        async fn pin_file(&self, _upload: &Upload) -> Result<String> {
            Ok("QmFile".to_string())
        }

        async fn pin_json(&self, _name: &str, content: &Value) -> Result<String> {
            self.pinned.lock().unwrap().push(content.clone());
            Ok("QmMeta".to_string())
        }

        fn gateway_url(&self, hash: &str) -> String {
            format!("https://gateway.test/ipfs/{}", hash)
        }
    }

    struct FixedRegistry {
        counter: u64,
        owners: HashMap<u64, String>,
    }

    #[async_trait]
    impl PropertyRegistry for FixedRegistry {
        async fn register_property(&self, _ipfs_hash: &str, _owner: &str) -> Result<String> {
            Ok("0xtx".to_string())
        }

        async fn token_id_counter(&self) -> Result<u64> {
            Ok(self.counter)
        }

        async fn owner_of(&self, token_id: u64) -> Result<String> {
            self.owners
                .get(&token_id)
                .cloned()
                .ok_or_else(|| RegistryError::contract("ERC721: invalid token ID"))
        }

        async fn property_details(&self, token_id: u64) -> Result<PropertyDetails> {
            Ok(PropertyDetails {
                ipfs_hash: format!("Qm{}", token_id),
                owner: self.owners[&token_id].clone(),
                timestamp: 1_700_000_000 + token_id,
            })
        }

        async fn transfer_property(&self, _to: &str, _token_id: u64) -> Result<String> {
            Ok("0xtransfer".to_string())
        }

        async fn transfer_history(&self, _token_id: u64) -> Result<Vec<HistoryEntry>> {
            Ok(Vec::new())
        }
    }

    fn ledger(pinner: Arc<RecordingPinner>) -> Ledger {
        let owners = HashMap::from([
            (1, "0xAbC0000000000000000000000000000000000001".to_string()),
            (3, "0xabc0000000000000000000000000000000000001".to_string()),
            (4, "0x9990000000000000000000000000000000000009".to_string()),
        ]);
        Ledger::new(pinner, Arc::new(FixedRegistry { counter: 4, owners }))
    }

    #[tokio::test]
    async fn test_tokens_of_matches_case_insensitively_and_skips_failures() {
        let ledger = ledger(Arc::new(RecordingPinner::default()));
        let tokens = ledger
            .tokens_of("0xABC0000000000000000000000000000000000001")
            .await
            .unwrap();
        let ids: Vec<_> = tokens.iter().map(|t| t.token_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
        assert_eq!(tokens[1].timestamp, "1700000003");
    }

    #[tokio::test]
    async fn test_pin_document_links_file_hash() {
        let pinner = Arc::new(RecordingPinner::default());
        let ledger = ledger(pinner.clone());
        let hash = ledger
            .pin_document(&Upload::new("a.pdf", b"%PDF".to_vec()), Some("Paper"), None)
            .await
            .unwrap();

        assert_eq!(hash, "QmMeta");
        let pinned = pinner.pinned.lock().unwrap();
        assert_eq!(pinned[0], json!({"title": "Paper", "file": "ipfs://QmFile"}));
    }

    #[tokio::test]
    async fn test_pin_asset_metadata_requires_fields() {
        let ledger = ledger(Arc::new(RecordingPinner::default()));
        let err = ledger
            .pin_asset_metadata(AssetKind::Image, &AssetMetadata::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::ValidationError { ref message } if message == "Missing required fields."
        ));

        let receipt = ledger
            .pin_asset_metadata(
                AssetKind::Video,
                &AssetMetadata {
                    filename: Some("clip.mp4".to_string()),
                    title: Some("Clip".to_string()),
                    creator: Some("Ada".to_string()),
                    wallet_address: Some("0xabc".to_string()),
                    ..AssetMetadata::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(receipt.message, "Video metadata registered successfully");
        assert_eq!(receipt.ipfs_url, "ipfs://QmMeta");
        assert_eq!(receipt.gateway_url, "https://gateway.test/ipfs/QmMeta");
    }

    #[tokio::test]
    async fn test_register_returns_counter() {
        let ledger = ledger(Arc::new(RecordingPinner::default()));
        assert_eq!(ledger.register("QmMeta", "0xabc").await.unwrap(), 4);
        assert!(ledger.register("", "0xabc").await.is_err());
    }

    #[test]
    fn test_parse_token_id() {
        assert_eq!(parse_token_id(" 12 ").unwrap(), 12);
        assert!(parse_token_id("twelve").is_err());
    }
}
