pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod gateway;
pub mod server;
pub mod utils;
pub mod web;

pub use config::{AppConfig, Service};
pub use core::{Ledger, RegistrationDesk, Screening};
pub use utils::error::{RegistryError, Result};
