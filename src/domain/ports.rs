use crate::domain::model::{HistoryEntry, PropertyDetails, Upload};
use crate::utils::error::Result;
use async_trait::async_trait;

/// IPFS 釘選服務
#[async_trait]
pub trait IpfsPinner: Send + Sync {
    /// 釘選檔案，回傳 CID
    async fn pin_file(&self, upload: &Upload) -> Result<String>;

    /// 釘選 JSON 描述資料，回傳 CID
    async fn pin_json(&self, name: &str, content: &serde_json::Value) -> Result<String>;

    fn gateway_url(&self, hash: &str) -> String;
}

/// 鏈上 PropertyRegistry 合約
#[async_trait]
pub trait PropertyRegistry: Send + Sync {
    /// 送出 `registerProperty` 並等待上鏈，回傳交易雜湊
    async fn register_property(&self, ipfs_hash: &str, owner: &str) -> Result<String>;

    async fn token_id_counter(&self) -> Result<u64>;

    async fn owner_of(&self, token_id: u64) -> Result<String>;

    async fn property_details(&self, token_id: u64) -> Result<PropertyDetails>;

    /// 送出 `transferProperty` 並等待上鏈，回傳交易雜湊
    async fn transfer_property(&self, to: &str, token_id: u64) -> Result<String>;

    /// 從區塊 0 起的 `PropertyTransferred` 事件
    async fn transfer_history(&self, token_id: u64) -> Result<Vec<HistoryEntry>>;
}
