use crate::config::EthereumConfig;
use crate::domain::model::{HistoryEntry, PropertyDetails};
use crate::domain::ports::PropertyRegistry;
use crate::utils::error::{RegistryError, Result};
use async_trait::async_trait;
use ethers::prelude::*;
use ethers::utils::to_checksum;
use std::sync::Arc;

abigen!(
    PropertyRegistryContract,
    r#"[
        function registerProperty(string ipfsHash, address owner) external returns (uint256)
        function tokenIdCounter() external view returns (uint256)
        function balanceOf(address owner) external view returns (uint256)
        function ownerOf(uint256 tokenId) external view returns (address)
        function getPropertyDetails(uint256 tokenId) external view returns (string ipfsHash, address owner, uint256 timestamp)
        function transferProperty(address to, uint256 tokenId) external
        event PropertyTransferred(uint256 indexed tokenId, address indexed from, address indexed to, uint256 timestamp)
    ]"#,
);

type SignedClient = SignerMiddleware<Provider<Http>, LocalWallet>;

/// 以本機私鑰簽名的 PropertyRegistry 合約連線
pub struct EthersRegistry {
    contract: PropertyRegistryContract<SignedClient>,
}

impl EthersRegistry {
    pub fn connect(config: &EthereumConfig) -> Result<Self> {
        let rpc_url = required(&config.rpc_url, "ethereum.rpc_url")?;
        let private_key = required(&config.private_key, "ethereum.private_key")?;
        let contract_address = required(&config.contract_address, "ethereum.contract_address")?;

        let provider = Provider::<Http>::try_from(rpc_url).map_err(|e| {
            RegistryError::InvalidConfigValueError {
                field: "ethereum.rpc_url".to_string(),
                value: rpc_url.to_string(),
                reason: e.to_string(),
            }
        })?;
        let wallet = private_key
            .trim_start_matches("0x")
            .parse::<LocalWallet>()
            .map_err(|e| RegistryError::InvalidConfigValueError {
                field: "ethereum.private_key".to_string(),
                value: "<redacted>".to_string(),
                reason: e.to_string(),
            })?
            .with_chain_id(config.chain_id);
        let address = contract_address.parse::<Address>().map_err(|e| {
            RegistryError::InvalidConfigValueError {
                field: "ethereum.contract_address".to_string(),
                value: contract_address.to_string(),
                reason: e.to_string(),
            }
        })?;

        tracing::info!(
            "🔗 Contract {} via signer {} (chain {})",
            to_checksum(&address, None),
            to_checksum(&wallet.address(), None),
            config.chain_id
        );

        let client = Arc::new(SignerMiddleware::new(provider, wallet));
        Ok(Self {
            contract: PropertyRegistryContract::new(address, client),
        })
    }
}

fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| RegistryError::MissingConfigError {
            field: field.to_string(),
        })
}

fn parse_address(value: &str) -> Result<Address> {
    value
        .trim()
        .parse::<Address>()
        .map_err(|_| RegistryError::validation(format!("Invalid wallet address: {}", value)))
}

fn token_topic(token_id: u64) -> H256 {
    let mut bytes = [0u8; 32];
    U256::from(token_id).to_big_endian(&mut bytes);
    H256::from(bytes)
}

fn mined(receipt: Option<TransactionReceipt>, tx_hash: H256) -> Result<String> {
    match receipt {
        Some(receipt) if receipt.status == Some(U64::from(1)) => Ok(format!("{:?}", tx_hash)),
        Some(_) => Err(RegistryError::contract(format!(
            "Transaction {:?} reverted",
            tx_hash
        ))),
        None => Err(RegistryError::contract(format!(
            "Transaction {:?} dropped before mining",
            tx_hash
        ))),
    }
}

#[async_trait]
impl PropertyRegistry for EthersRegistry {
    async fn register_property(&self, ipfs_hash: &str, owner: &str) -> Result<String> {
        let owner = parse_address(owner)?;
        let call = self.contract.register_property(ipfs_hash.to_string(), owner);
        let pending = call
            .send()
            .await
            .map_err(|e| RegistryError::contract(e.to_string()))?;
        let tx_hash = pending.tx_hash();
        tracing::info!("⏳ registerProperty sent: {:?}", tx_hash);

        let receipt = pending
            .await
            .map_err(|e| RegistryError::contract(e.to_string()))?;
        mined(receipt, tx_hash)
    }

    async fn token_id_counter(&self) -> Result<u64> {
        let counter = self
            .contract
            .token_id_counter()
            .call()
            .await
            .map_err(|e| RegistryError::contract(e.to_string()))?;
        if counter > U256::from(u64::MAX) {
            return Err(RegistryError::contract(format!(
                "tokenIdCounter out of range: {}",
                counter
            )));
        }
        Ok(counter.as_u64())
    }

    async fn owner_of(&self, token_id: u64) -> Result<String> {
        let owner = self
            .contract
            .owner_of(U256::from(token_id))
            .call()
            .await
            .map_err(|e| RegistryError::contract(e.to_string()))?;
        Ok(to_checksum(&owner, None))
    }

    async fn property_details(&self, token_id: u64) -> Result<PropertyDetails> {
        let (ipfs_hash, owner, timestamp) = self
            .contract
            .get_property_details(U256::from(token_id))
            .call()
            .await
            .map_err(|e| RegistryError::contract(e.to_string()))?;
        Ok(PropertyDetails {
            ipfs_hash,
            owner: to_checksum(&owner, None),
            timestamp: timestamp.low_u64(),
        })
    }

    async fn transfer_property(&self, to: &str, token_id: u64) -> Result<String> {
        let to = parse_address(to)?;
        let call = self.contract.transfer_property(to, U256::from(token_id));
        let pending = call
            .send()
            .await
            .map_err(|e| RegistryError::contract(e.to_string()))?;
        let tx_hash = pending.tx_hash();
        tracing::info!("⏳ transferProperty sent: {:?}", tx_hash);

        let receipt = pending
            .await
            .map_err(|e| RegistryError::contract(e.to_string()))?;
        mined(receipt, tx_hash)
    }

    async fn transfer_history(&self, token_id: u64) -> Result<Vec<HistoryEntry>> {
        let events = self
            .contract
            .property_transferred_filter()
            .topic1(token_topic(token_id))
            .from_block(0u64)
            .query_with_meta()
            .await
            .map_err(|e| RegistryError::contract(e.to_string()))?;

        Ok(events
            .into_iter()
            .map(|(event, meta)| HistoryEntry {
                from: to_checksum(&event.from, None),
                to: to_checksum(&event.to, None),
                token_id: event.token_id.to_string(),
                timestamp: event.timestamp.to_string(),
                tx_hash: format!("{:?}", meta.transaction_hash),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_topic_is_big_endian() {
        let topic = token_topic(258);
        assert_eq!(topic.as_bytes()[30], 1);
        assert_eq!(topic.as_bytes()[31], 2);
        assert!(topic.as_bytes()[..30].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_mined_receipt_status() {
        let hash = H256::repeat_byte(0xab);
        let ok = TransactionReceipt {
            status: Some(U64::from(1)),
            ..Default::default()
        };
        assert!(mined(Some(ok), hash).unwrap().starts_with("0xabab"));

        let reverted = TransactionReceipt {
            status: Some(U64::from(0)),
            ..Default::default()
        };
        assert!(matches!(
            mined(Some(reverted), hash),
            Err(RegistryError::ContractError { .. })
        ));
        assert!(mined(None, hash).is_err());
    }

    #[test]
    fn test_connect_requires_settings() {
        let err = EthersRegistry::connect(&EthereumConfig::default()).err().unwrap();
        assert!(matches!(err, RegistryError::MissingConfigError { .. }));
    }

    #[test]
    fn test_parse_address_rejects_garbage() {
        assert!(parse_address("0x1234").is_err());
        assert!(parse_address("0x00000000000000000000000000000000000000aa").is_ok());
    }
}
