use anyhow::Result;
use clap::Parser;
use scenedna_rs::{cli, logging::PromptPipelineFormatter, ConfigManager, PromptBuilderApp};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scenedna=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .event_format(PromptPipelineFormatter::new()),
        )
        .init();

    let cli = cli::Cli::parse();

    let config_manager = ConfigManager::load()?;
    let config = config_manager.get();
    debug!(
        storage_key = %config.storage_key,
        default_aspect_ratio = %config.default_aspect_ratio,
        "Configuration loaded"
    );

    let mut app = PromptBuilderApp::new(&config_manager)?;
    cli::run(cli, &mut app, &config_manager)
}
