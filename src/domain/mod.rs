// Domain layer: transient DTOs and the ports implemented by adapters.

pub mod model;
pub mod ports;
pub mod wallet;
