use clap::Parser;
use ip_registry::adapters::{EthersRegistry, PinataClient};
use ip_registry::config::cli::{report_failure, ServiceArgs};
use ip_registry::config::Service;
use ip_registry::server;
use ip_registry::utils::error::Result;
use ip_registry::utils::logger;
use ip_registry::{gateway, Ledger};
use std::sync::Arc;

const SERVICE: &str = "chain gateway";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let args = ServiceArgs::parse();
    logger::init(args.verbose, args.log_json);
    tracing::info!("Starting {} v{}", SERVICE, env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(&args).await {
        std::process::exit(report_failure(SERVICE, &e));
    }
}

async fn run(args: &ServiceArgs) -> Result<()> {
    let config = args.load_config(Service::ChainGateway)?;

    // 私鑰與 JWT 只在此處讀取
    let pinner = PinataClient::new(&config.pinata)?;
    let registry = EthersRegistry::connect(&config.ethereum)?;
    let ledger = Ledger::new(Arc::new(pinner), Arc::new(registry));

    if args.check {
        println!("✅ Configuration OK");
        return Ok(());
    }

    let app = gateway::chain::router(ledger, config.max_upload_bytes());
    server::serve(&config.server.chain_gateway_addr, app).await
}
