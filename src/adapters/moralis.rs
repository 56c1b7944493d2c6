use crate::adapters::http::{expect_json, join_url, UpstreamReply};
use crate::config::MoralisConfig;
use crate::domain::wallet::{
    ChallengeRequest, ChallengeResponse, NftOwned, NftTransfer, Page, TokenBalance,
    TokenTransfer, Transaction, VerifiedChallenge, VerifyRequest, WalletNetWorth, WalletOverview,
    WalletStats,
};
use crate::utils::error::{RegistryError, Result};
use chrono::{Duration as ChronoDuration, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

const SIGN_IN_STATEMENT: &str = "Sign in with your Ethereum wallet";

/// Moralis 錢包資料 API 與登入挑戰 API
#[derive(Debug, Clone)]
pub struct MoralisClient {
    client: Client,
    config: MoralisConfig,
}

impl MoralisClient {
    pub fn new(config: MoralisConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .ok_or_else(|| RegistryError::MissingConfigError {
                field: "moralis.api_key".to_string(),
            })?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let mut key = HeaderValue::from_str(api_key).map_err(|e| RegistryError::InvalidConfigValueError {
            field: "moralis.api_key".to_string(),
            value: "<redacted>".to_string(),
            reason: e.to_string(),
        })?;
        key.set_sensitive(true);
        headers.insert("X-API-Key", key);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self { client, config })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = join_url(&self.config.api_base, path);
        tracing::debug!("🌐 Moralis GET {}", url);
        let response = self.client.get(&url).query(query).send().await?;
        expect_json("moralis", response).await
    }

    pub async fn net_worth(&self, address: &str) -> Result<WalletNetWorth> {
        self.get(
            &format!("/wallets/{}/net-worth", address),
            &[("chain", &self.config.chain)],
        )
        .await
    }

    pub async fn token_balances(&self, address: &str) -> Result<Page<TokenBalance>> {
        self.get(
            &format!("/wallets/{}/tokens", address),
            &[("chain", &self.config.chain)],
        )
        .await
    }

    pub async fn token_transfers(&self, address: &str) -> Result<Page<TokenTransfer>> {
        self.get(
            &format!("/{}/erc20/transfers", address),
            &[("chain", &self.config.chain), ("order", "DESC")],
        )
        .await
    }

    pub async fn transactions(&self, address: &str) -> Result<Page<Transaction>> {
        self.get(
            &format!("/{}", address),
            &[("chain", &self.config.chain), ("order", "DESC")],
        )
        .await
    }

    pub async fn nfts(&self, address: &str) -> Result<Page<NftOwned>> {
        self.get(
            &format!("/{}/nft", address),
            &[
                ("chain", &self.config.chain),
                ("format", "decimal"),
                ("normalizeMetadata", "true"),
                ("media_items", "false"),
                ("include_prices", "false"),
            ],
        )
        .await
    }

    pub async fn nft_transfers(&self, address: &str) -> Result<Page<NftTransfer>> {
        self.get(
            &format!("/{}/nft/transfers", address),
            &[
                ("chain", &self.config.chain),
                ("format", "decimal"),
                ("order", "DESC"),
            ],
        )
        .await
    }

    pub async fn wallet_stats(&self, address: &str) -> Result<WalletStats> {
        self.get(
            &format!("/wallets/{}/stats", address),
            &[("chain", &self.config.chain)],
        )
        .await
    }

    /// 儀表板所需的七個查詢同時送出
    pub async fn overview(&self, address: &str) -> Result<WalletOverview> {
        let (net_worth, tokens, transactions, nfts, stats, token_transfers, nft_transfers) = tokio::try_join!(
            self.net_worth(address),
            self.token_balances(address),
            self.transactions(address),
            self.nfts(address),
            self.wallet_stats(address),
            self.token_transfers(address),
            self.nft_transfers(address),
        )?;

        Ok(WalletOverview {
            address: address.to_string(),
            net_worth,
            tokens: tokens.result,
            transactions: transactions.result,
            nfts: nfts.result,
            stats,
            token_transfers: token_transfers.result,
            nft_transfers: nft_transfers.result,
        })
    }

    /// 建立 EVM 登入挑戰，五分鐘後失效
    pub async fn request_challenge(
        &self,
        request: &ChallengeRequest,
        default_domain: &str,
        default_uri: &str,
    ) -> Result<ChallengeResponse> {
        let url = join_url(&self.config.auth_base, "/challenge/request/evm");
        let expiration = (Utc::now() + ChronoDuration::minutes(5)).to_rfc3339();
        let payload = serde_json::json!({
            "domain": request.domain.as_deref().unwrap_or(default_domain),
            "chainId": request.chain_id.unwrap_or(self.config.chain_id),
            "address": request.address,
            "statement": SIGN_IN_STATEMENT,
            "uri": request.uri.as_deref().unwrap_or(default_uri),
            "version": "1",
            "expirationTime": expiration,
            "timeout": 30,
        });

        let response = self.client.post(&url).json(&payload).send().await?;
        expect_json("moralis-auth", response).await
    }

    /// 驗證簽名，回傳 Moralis 確認的簽名地址；拒絕時回傳 `Ok(None)`
    pub async fn verify_challenge(&self, request: &VerifyRequest) -> Result<Option<String>> {
        let url = join_url(&self.config.auth_base, "/challenge/verify/evm");
        let payload = serde_json::json!({
            "message": request.message,
            "signature": request.signature,
            "account": request.address,
        });

        let response = self.client.post(&url).json(&payload).send().await?;
        let reply = UpstreamReply::read(response).await?;
        if !reply.is_success() {
            tracing::warn!(
                "🔒 Signature verification rejected for {}: {}",
                request.address,
                reply.body
            );
            return Ok(None);
        }

        let verified: VerifiedChallenge = reply.json()?;
        Ok(verified.address.filter(|address| !address.trim().is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn moralis_for(server: &MockServer) -> MoralisClient {
        MoralisClient::new(MoralisConfig {
            api_base: server.base_url(),
            auth_base: server.base_url(),
            api_key: Some("moralis-key".to_string()),
            ..MoralisConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_net_worth_sends_api_key_and_chain() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/wallets/0xabc/net-worth")
                .query_param("chain", "sepolia")
                .header("x-api-key", "moralis-key");
            then.status(200).json_body(serde_json::json!({
                "total_networth_usd": "12.50",
                "chains": [{"chain": "sepolia", "networth_usd": "12.50"}]
            }));
        });

        let worth = moralis_for(&server).net_worth("0xabc").await.unwrap();
        mock.assert();
        assert_eq!(worth.total_networth_usd.as_deref(), Some("12.50"));
        assert_eq!(worth.chains.len(), 1);
    }

    #[tokio::test]
    async fn test_error_body_is_surfaced() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/wallets/0xabc/stats");
            then.status(400).body("{\"message\":\"Invalid address\"}");
        });

        let err = moralis_for(&server).wallet_stats("0xabc").await.unwrap_err();
        assert!(err.to_string().contains("Invalid address"));
    }

    #[tokio::test]
    async fn test_verify_challenge_maps_rejection_to_false() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST)
                .path("/challenge/verify/evm")
                .json_body(serde_json::json!({
                    "message": "msg",
                    "signature": "0xsig",
                    "account": "0xabc"
                }));
            then.status(400).body("{\"message\":\"bad signature\"}");
        });

        let verified = moralis_for(&server)
            .verify_challenge(&VerifyRequest {
                message: "msg".to_string(),
                signature: "0xsig".to_string(),
                address: "0xabc".to_string(),
            })
            .await
            .unwrap();
        assert!(verified.is_none());
    }

    #[tokio::test]
    async fn test_verify_challenge_returns_signer_address() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/challenge/verify/evm");
            then.status(200).json_body(serde_json::json!({
                "id": "v1",
                "address": "0xSigner",
                "profileId": "p1"
            }));
        });

        let verified = moralis_for(&server)
            .verify_challenge(&VerifyRequest {
                message: "msg".to_string(),
                signature: "0xsig".to_string(),
                address: "0xsigner".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(verified.as_deref(), Some("0xSigner"));
    }

    #[tokio::test]
    async fn test_challenge_request_fills_defaults() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/challenge/request/evm")
                .body_contains("\"domain\":\"localhost\"")
                .body_contains("\"chainId\":11155111")
                .body_contains(SIGN_IN_STATEMENT);
            then.status(200)
                .json_body(serde_json::json!({"id": "c1", "message": "Sign this", "profileId": "p1"}));
        });

        let challenge = moralis_for(&server)
            .request_challenge(
            &ChallengeRequest {
                domain: None,
                chain_id: None,
                address: "0xabc".to_string(),
                uri: None,
            },
            "localhost",
            "http://localhost:5080",
        )
        .await
        .unwrap();

        mock.assert();
        assert_eq!(challenge.message, "Sign this");
    }

    #[test]
    fn test_missing_api_key() {
        assert!(MoralisClient::new(MoralisConfig::default()).is_err());
    }
}
