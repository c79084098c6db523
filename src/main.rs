use clap::Parser;
use multiport_mock::utils::logger::{self, utc_timestamp};
use multiport_mock::{CliConfig, MockServer, ServerSettings, ShutdownCoordinator};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::debug!("CLI config: {:?}", cli);

    let settings = match cli.load_settings() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    display_config_summary(&settings);

    let coordinator = Arc::new(ShutdownCoordinator::new());
    coordinator.install_signal_handlers()?;

    let server = MockServer::new(settings)
        .with_bind_address(cli.bind)
        .with_drain_timeout(cli.drain_timeout());

    let bound = match server.bind().await {
        Ok(bound) => bound,
        Err(e) => {
            tracing::error!("❌ Startup aborted: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    if let Err(e) = bound.run(&coordinator).await {
        tracing::error!("❌ Server stopped after a fault: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

fn display_config_summary(settings: &ServerSettings) {
    tracing::info!(
        "🚀 Starting Multi-Port Configurable Web Server at {}",
        utc_timestamp()
    );
    for profile in &settings.profiles {
        tracing::info!(
            "📋 Port {}: response={:?} status={} delay={}s",
            profile.port,
            profile.response_body,
            profile.status_code,
            profile.response_delay_secs
        );
    }
    tracing::info!("⏱️ Startup delay: {}s", settings.startup_delay.as_secs());
}
