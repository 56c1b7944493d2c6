// HTTP gateways in front of the similarity services and the chain

pub mod chain;
pub mod upload;
