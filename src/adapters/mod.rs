// Adapters layer: concrete clients for the external systems (ML services, IPFS, Moralis, chain)

pub mod chain_api;
pub mod contract;
pub mod http;
pub mod moralis;
pub mod pinata;
pub mod related_patent;
pub mod similarity;

pub use chain_api::ChainApiClient;
pub use contract::EthersRegistry;
pub use moralis::MoralisClient;
pub use pinata::PinataClient;
pub use related_patent::RelatedPatentClient;
pub use similarity::SimilarityClient;
