#[cfg(feature = "cli")]
pub mod cli;

use crate::utils::error::{RegistryError, Result};
use crate::utils::validation;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Sepolia 測試網
pub const DEFAULT_CHAIN_ID: u64 = 11_155_111;

/// 單次上傳上限 (MB)
pub const MAX_UPLOAD_MB: usize = 4096;

/// 登入狀態最長保留天數
pub const MAX_SESSION_DAYS: i64 = 365;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub similarity: SimilarityConfig,
    pub related_patent: RelatedPatentConfig,
    pub chain_gateway: ChainGatewayConfig,
    pub pinata: PinataConfig,
    pub moralis: MoralisConfig,
    pub ethereum: EthereumConfig,
    pub web: WebConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub web_addr: String,
    pub upload_gateway_addr: String,
    pub chain_gateway_addr: String,
    pub max_upload_mb: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            web_addr: "0.0.0.0:5080".to_string(),
            upload_gateway_addr: "0.0.0.0:5090".to_string(),
            chain_gateway_addr: "0.0.0.0:4000".to_string(),
            max_upload_mb: 200,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityConfig {
    pub pdf_endpoint: String,
    pub video_endpoint: String,
    pub image_endpoint: String,
    pub patent_endpoint: String,
    /// 相似度達到此值即拒絕註冊
    pub threshold: f64,
    pub timeout_seconds: u64,
    pub video_timeout_seconds: u64,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            pdf_endpoint: "http://localhost:5000".to_string(),
            video_endpoint: "http://localhost:6000".to_string(),
            image_endpoint: "http://localhost:7000".to_string(),
            patent_endpoint: "http://localhost:8000".to_string(),
            threshold: 0.6,
            timeout_seconds: 100,
            video_timeout_seconds: 600,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelatedPatentConfig {
    pub endpoint: String,
    pub top_k: usize,
    pub distance_threshold: f64,
}

impl Default for RelatedPatentConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8001".to_string(),
            top_k: 5,
            distance_threshold: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainGatewayConfig {
    pub endpoint: String,
    pub timeout_seconds: u64,
}

impl Default for ChainGatewayConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:4000".to_string(),
            timeout_seconds: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PinataConfig {
    pub api_base: String,
    pub gateway_base: String,
    pub jwt: Option<String>,
}

impl Default for PinataConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.pinata.cloud".to_string(),
            gateway_base: "https://gateway.pinata.cloud/ipfs".to_string(),
            jwt: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MoralisConfig {
    pub api_base: String,
    pub auth_base: String,
    pub api_key: Option<String>,
    pub chain: String,
    pub chain_id: u64,
}

impl Default for MoralisConfig {
    fn default() -> Self {
        Self {
            api_base: "https://deep-index.moralis.io/api/v2.2".to_string(),
            auth_base: "https://authapi.moralis.io".to_string(),
            api_key: None,
            chain: "sepolia".to_string(),
            chain_id: DEFAULT_CHAIN_ID,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EthereumConfig {
    pub rpc_url: Option<String>,
    pub private_key: Option<String>,
    pub contract_address: Option<String>,
    pub chain_id: u64,
}

impl Default for EthereumConfig {
    fn default() -> Self {
        Self {
            rpc_url: None,
            private_key: None,
            contract_address: None,
            chain_id: DEFAULT_CHAIN_ID,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    pub session_days: i64,
    pub domain: String,
    pub uri: String,
    /// 未登入時使用的錢包地址；未設定則導向登入頁
    pub fallback_wallet: Option<String>,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            session_days: 7,
            domain: "localhost".to_string(),
            uri: "http://localhost:5080".to_string(),
            fallback_wallet: None,
        }
    }
}

/// 三個執行檔各自需要的設定不同
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Web,
    UploadGateway,
    ChainGateway,
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(RegistryError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| RegistryError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 檔案不存在時退回預設值
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            tracing::warn!(
                "⚠️ Config file {} not found, using defaults",
                path.as_ref().display()
            );
            Ok(Self::default())
        }
    }

    /// 替換環境變數 (例如 ${PINATA_JWT})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| RegistryError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.server.max_upload_mb.saturating_mul(1024 * 1024)
    }

    /// 依服務驗證所需欄位
    pub fn validate_for(&self, service: Service) -> Result<()> {
        validation::validate_range("server.max_upload_mb", self.server.max_upload_mb, 1, MAX_UPLOAD_MB)?;

        match service {
            Service::UploadGateway => self.validate_similarity(),
            Service::ChainGateway => {
                validation::validate_url("pinata.api_base", &self.pinata.api_base)?;
                validation::validate_url("pinata.gateway_base", &self.pinata.gateway_base)?;
                validation::validate_secret("pinata.jwt", &self.pinata.jwt)?;
                let rpc_url = validation::validate_secret("ethereum.rpc_url", &self.ethereum.rpc_url)?;
                validation::validate_url("ethereum.rpc_url", rpc_url)?;
                validation::validate_secret("ethereum.private_key", &self.ethereum.private_key)?;
                let contract = validation::validate_secret(
                    "ethereum.contract_address",
                    &self.ethereum.contract_address,
                )?;
                if !validation::is_wallet_address(contract) {
                    return Err(RegistryError::InvalidConfigValueError {
                        field: "ethereum.contract_address".to_string(),
                        value: contract.to_string(),
                        reason: "Expected a 0x-prefixed 20-byte hex address".to_string(),
                    });
                }
                Ok(())
            }
            Service::Web => {
                self.validate_similarity()?;
                validation::validate_url("chain_gateway.endpoint", &self.chain_gateway.endpoint)?;
                validation::validate_url("related_patent.endpoint", &self.related_patent.endpoint)?;
                validation::validate_url("moralis.api_base", &self.moralis.api_base)?;
                validation::validate_url("moralis.auth_base", &self.moralis.auth_base)?;
                validation::validate_secret("moralis.api_key", &self.moralis.api_key)?;
                validation::validate_non_empty_string("moralis.chain", &self.moralis.chain)?;
                validation::validate_range(
                    "web.session_days",
                    self.web.session_days,
                    1,
                    MAX_SESSION_DAYS,
                )?;
                if let Some(wallet) = &self.web.fallback_wallet {
                    validation::validate_wallet_address("web.fallback_wallet", wallet)?;
                }
                Ok(())
            }
        }
    }

    fn validate_similarity(&self) -> Result<()> {
        validation::validate_url("similarity.pdf_endpoint", &self.similarity.pdf_endpoint)?;
        validation::validate_url("similarity.video_endpoint", &self.similarity.video_endpoint)?;
        validation::validate_url("similarity.image_endpoint", &self.similarity.image_endpoint)?;
        validation::validate_url("similarity.patent_endpoint", &self.similarity.patent_endpoint)?;
        validation::validate_range("similarity.threshold", self.similarity.threshold, 0.0, 1.0)?;
        validation::validate_positive_number(
            "similarity.timeout_seconds",
            self.similarity.timeout_seconds as usize,
            1,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_match_local_layout() {
        let config = AppConfig::default();
        assert_eq!(config.similarity.pdf_endpoint, "http://localhost:5000");
        assert_eq!(config.similarity.image_endpoint, "http://localhost:7000");
        assert_eq!(config.chain_gateway.endpoint, "http://localhost:4000");
        assert_eq!(config.similarity.threshold, 0.6);
        assert_eq!(config.max_upload_bytes(), 200 * 1024 * 1024);
        assert!(config.validate_for(Service::UploadGateway).is_ok());
    }

    #[test]
    fn test_parse_partial_toml_config() {
        let toml_content = r#"
[similarity]
pdf_endpoint = "http://pdf.internal:5000"
threshold = 0.75

[web]
fallback_wallet = "0x87dc98819FAe36Ec910852D901f3eb4EBE8b024a"
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.similarity.pdf_endpoint, "http://pdf.internal:5000");
        assert_eq!(config.similarity.threshold, 0.75);
        assert_eq!(config.similarity.video_endpoint, "http://localhost:6000");
        assert_eq!(config.web.session_days, 7);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("IPREG_TEST_PINATA_JWT", "jwt-from-env");

        let toml_content = r#"
[pinata]
jwt = "${IPREG_TEST_PINATA_JWT}"
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.pinata.jwt.as_deref(), Some("jwt-from-env"));

        std::env::remove_var("IPREG_TEST_PINATA_JWT");
    }

    #[test]
    fn test_unresolved_secret_fails_chain_validation() {
        let toml_content = r#"
[pinata]
jwt = "${IPREG_TEST_UNSET_VARIABLE}"

[ethereum]
rpc_url = "https://sepolia.infura.io/v3/key"
private_key = "0xabc"
contract_address = "0x87dc98819FAe36Ec910852D901f3eb4EBE8b024a"
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();
        let err = config.validate_for(Service::ChainGateway).unwrap_err();
        assert!(matches!(err, RegistryError::MissingConfigError { ref field } if field == "pinata.jwt"));
    }

    #[test]
    fn test_threshold_out_of_range() {
        let config = AppConfig::from_toml_str("[similarity]\nthreshold = 1.4\n").unwrap();
        assert!(config.validate_for(Service::UploadGateway).is_err());
    }

    #[test]
    fn test_web_requires_moralis_key() {
        let config = AppConfig::default();
        assert!(config.validate_for(Service::Web).is_err());

        let mut config = AppConfig::default();
        config.moralis.api_key = Some("key".to_string());
        assert!(config.validate_for(Service::Web).is_ok());
    }

    #[test]
    fn test_session_days_must_stay_bounded() {
        let mut config = AppConfig::default();
        config.moralis.api_key = Some("key".to_string());

        config.web.session_days = i64::MAX;
        let err = config.validate_for(Service::Web).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidConfigValueError { ref field, .. } if field == "web.session_days"));

        config.web.session_days = 0;
        assert!(config.validate_for(Service::Web).is_err());

        config.web.session_days = MAX_SESSION_DAYS;
        assert!(config.validate_for(Service::Web).is_ok());
    }

    #[test]
    fn test_upload_limit_must_stay_bounded() {
        let mut config = AppConfig::default();
        config.server.max_upload_mb = usize::MAX;
        assert_eq!(config.max_upload_bytes(), usize::MAX);

        let err = config.validate_for(Service::ChainGateway).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidConfigValueError { ref field, .. } if field == "server.max_upload_mb"));

        config.server.max_upload_mb = 0;
        assert!(config.validate_for(Service::UploadGateway).is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[server]\nweb_addr = \"127.0.0.1:9000\"\n")
            .unwrap();

        let config = AppConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.server.web_addr, "127.0.0.1:9000");
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = AppConfig::load_or_default("/nonexistent/ip-registry.toml").unwrap();
        assert_eq!(config.server.chain_gateway_addr, "0.0.0.0:4000");
    }
}
