use crate::config::{AppConfig, Service};
use crate::utils::error::{ErrorSeverity, RegistryError, Result};
use clap::Parser;

/// 三個服務共用的命令列參數
#[derive(Debug, Clone, Parser)]
pub struct ServiceArgs {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "ip-registry.toml")]
    pub config: String,

    /// Override the listen address from the config file
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,

    /// Validate the configuration and exit without serving
    #[arg(long)]
    pub check: bool,
}

impl ServiceArgs {
    /// 載入並驗證設定，套用命令列覆蓋
    pub fn load_config(&self, service: Service) -> Result<AppConfig> {
        let mut config = AppConfig::load_or_default(&self.config)?;

        if let Some(bind) = &self.bind {
            let slot = match service {
                Service::Web => &mut config.server.web_addr,
                Service::UploadGateway => &mut config.server.upload_gateway_addr,
                Service::ChainGateway => &mut config.server.chain_gateway_addr,
            };
            tracing::info!("🔧 Listen address overridden to: {}", bind);
            *slot = bind.clone();
        }

        config.validate_for(service)?;
        Ok(config)
    }
}

/// 依錯誤嚴重程度決定退出碼；服務無法啟動時 Low 也視為失敗
pub fn exit_code(severity: ErrorSeverity) -> i32 {
    match severity {
        ErrorSeverity::Low => 1,
        ErrorSeverity::Medium => 2, // 上游暫時不可用，可重試
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

/// 記錄錯誤細節並輸出使用者訊息，回傳退出碼
pub fn report_failure(service: &str, e: &RegistryError) -> i32 {
    tracing::error!(
        "❌ {} failed: {} (Category: {:?}, Severity: {:?})",
        service,
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());

    exit_code(e.severity())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_override() {
        let args = ServiceArgs::parse_from([
            "upload-gateway",
            "--config",
            "/nonexistent/ip-registry.toml",
            "--bind",
            "127.0.0.1:7777",
        ]);
        let config = args.load_config(Service::UploadGateway).unwrap();
        assert_eq!(config.server.upload_gateway_addr, "127.0.0.1:7777");
        assert_eq!(config.server.web_addr, "0.0.0.0:5080");
    }

    #[test]
    fn test_exit_codes_follow_severity() {
        assert_eq!(exit_code(ErrorSeverity::Low), 1);
        assert_eq!(exit_code(ErrorSeverity::Medium), 2);
        assert_eq!(exit_code(ErrorSeverity::Critical), 3);

        let missing = RegistryError::MissingConfigError {
            field: "pinata.jwt".to_string(),
        };
        assert_eq!(report_failure("chain-gateway", &missing), exit_code(missing.severity()));
    }

    #[test]
    fn test_check_flag() {
        let args = ServiceArgs::parse_from(["ip-registry", "--check", "-v"]);
        assert!(args.check);
        assert!(args.verbose);
        assert_eq!(args.config, "ip-registry.toml");
    }
}
