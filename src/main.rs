use clap::Parser;
use ip_registry::config::cli::{report_failure, ServiceArgs};
use ip_registry::config::{AppConfig, Service};
use ip_registry::utils::error::Result;
use ip_registry::utils::logger;
use ip_registry::web::{self, WebState};
use ip_registry::server;
use std::time::Duration;

const SERVICE: &str = "ip-registry web";
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let args = ServiceArgs::parse();

    // 初始化日誌
    logger::init(args.verbose, args.log_json);
    tracing::info!("Starting {} v{}", SERVICE, env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(&args).await {
        std::process::exit(report_failure(SERVICE, &e));
    }
}

async fn run(args: &ServiceArgs) -> Result<()> {
    let config: AppConfig = args.load_config(Service::Web)?;
    if args.verbose {
        tracing::debug!("Similarity threshold: {}", config.similarity.threshold);
        tracing::debug!("Chain gateway endpoint: {}", config.chain_gateway.endpoint);
    }

    let state = WebState::from_config(&config)?;
    if args.check {
        println!("✅ Configuration OK");
        return Ok(());
    }

    if config.web.fallback_wallet.is_some() {
        tracing::warn!("⚠️ Fallback wallet enabled, anonymous visitors act as that wallet");
    }

    let _reaper = state.sessions.spawn_reaper(SESSION_SWEEP_INTERVAL);
    let app = web::router(state, config.max_upload_bytes());
    server::serve(&config.server.web_addr, app).await
}
