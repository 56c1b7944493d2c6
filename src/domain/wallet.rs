//! Moralis wallet API shapes. Every field is optional: the API omits
//! whatever it has no data for.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletNetWorth {
    pub total_networth_usd: Option<String>,
    pub chains: Vec<ChainNetWorth>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainNetWorth {
    pub chain: Option<String>,
    pub native_balance: Option<String>,
    pub native_balance_formatted: Option<String>,
    pub native_balance_usd: Option<String>,
    pub token_balance_usd: Option<String>,
    pub networth_usd: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Page<T> {
    pub cursor: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub result: Vec<T>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenBalance {
    pub token_address: Option<String>,
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub logo: Option<String>,
    pub thumbnail: Option<String>,
    pub decimals: Option<u32>,
    pub balance: Option<String>,
    pub balance_formatted: Option<String>,
    pub usd_price: Option<f64>,
    pub usd_value: Option<f64>,
    pub native_token: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenTransfer {
    pub token_name: Option<String>,
    pub token_symbol: Option<String>,
    pub token_logo: Option<String>,
    pub token_decimals: Option<String>,
    pub from_address: Option<String>,
    pub to_address: Option<String>,
    pub address: Option<String>,
    pub block_hash: Option<String>,
    pub block_number: Option<String>,
    pub block_timestamp: Option<String>,
    pub transaction_hash: Option<String>,
    pub value: Option<String>,
    pub value_decimal: Option<String>,
    pub possible_spam: bool,
    pub verified_contract: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Transaction {
    pub hash: Option<String>,
    pub nonce: Option<String>,
    pub transaction_index: Option<String>,
    pub from_address: Option<String>,
    pub to_address: Option<String>,
    pub value: Option<String>,
    pub gas: Option<String>,
    pub gas_price: Option<String>,
    pub receipt_status: Option<String>,
    pub block_timestamp: Option<String>,
    pub block_number: Option<String>,
    pub block_hash: Option<String>,
    pub transaction_fee: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NftOwned {
    pub amount: Option<String>,
    pub token_id: Option<String>,
    pub token_address: Option<String>,
    pub contract_type: Option<String>,
    pub owner_of: Option<String>,
    pub block_number: Option<String>,
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub list_price: Option<NftListPrice>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NftListPrice {
    pub listed: bool,
    pub price: Option<String>,
    pub price_currency: Option<String>,
    pub price_usd: Option<String>,
    pub marketplace: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NftTransfer {
    pub block_number: Option<String>,
    pub block_timestamp: Option<String>,
    pub block_hash: Option<String>,
    pub transaction_hash: Option<String>,
    pub value: Option<String>,
    pub contract_type: Option<String>,
    pub transaction_type: Option<String>,
    pub token_address: Option<String>,
    pub token_id: Option<String>,
    pub from_address: Option<String>,
    pub from_address_label: Option<String>,
    pub to_address: Option<String>,
    pub to_address_label: Option<String>,
    pub amount: Option<String>,
    pub possible_spam: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletStats {
    pub nfts: Option<String>,
    pub collections: Option<String>,
    pub transactions: Option<TotalCount>,
    pub nft_transfers: Option<TotalCount>,
    pub token_transfers: Option<TotalCount>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TotalCount {
    pub total: Option<String>,
}

/// 儀表板一次取得的全部錢包資料
#[derive(Debug, Clone, Default, Serialize)]
pub struct WalletOverview {
    pub address: String,
    pub net_worth: WalletNetWorth,
    pub tokens: Vec<TokenBalance>,
    pub transactions: Vec<Transaction>,
    pub nfts: Vec<NftOwned>,
    pub stats: WalletStats,
    pub token_transfers: Vec<TokenTransfer>,
    pub nft_transfers: Vec<NftTransfer>,
}

/// Sign-in-with-Ethereum 挑戰請求 (瀏覽器送來)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeRequest {
    pub domain: Option<String>,
    pub chain_id: Option<u64>,
    pub address: String,
    pub uri: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub profile_id: Option<String>,
}

/// MetaMask 簽名後的驗證請求
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    pub message: String,
    pub signature: String,
    pub address: String,
}

/// Moralis 驗證成功後回傳的簽名者資料
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedChallenge {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub profile_id: Option<String>,
}
