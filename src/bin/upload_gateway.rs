use clap::Parser;
use ip_registry::adapters::SimilarityClient;
use ip_registry::config::cli::{report_failure, ServiceArgs};
use ip_registry::config::Service;
use ip_registry::gateway;
use ip_registry::server;
use ip_registry::utils::error::Result;
use ip_registry::utils::logger;

const SERVICE: &str = "upload gateway";

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
    let config = args.load_config(Service::UploadGateway)?;
    let similarity = SimilarityClient::new(config.similarity.clone())?;
    tracing::info!(
        "🔀 Relaying to pdf={} image={} video={} patent={}",
        config.similarity.pdf_endpoint,
        config.similarity.image_endpoint,
        config.similarity.video_endpoint,
        config.similarity.patent_endpoint
    );

    if args.check {
        println!("✅ Configuration OK");
        return Ok(());
    }

    let app = gateway::upload::router(similarity, config.max_upload_bytes());
    server::serve(&config.server.upload_gateway_addr, app).await
}
