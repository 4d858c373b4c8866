//! Cubemon main entry point

use cubemon_api::start_server;
use cubemon_config::{Config, ConfigError};
use cubemon_core::Monitor;
use cubemon_source::MockTransactionSource;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "cubemon")]
#[command(version = "0.1.0")]
#[command(about = "Robot warehouse transaction monitoring dashboard", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Print a default configuration file and exit
    #[arg(long)]
    generate_config: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.generate_config {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    let (config, missing) = match Config::load(args.config.clone()) {
        Ok(config) => (config, false),
        Err(ConfigError::FileNotFound { .. }) => (Config::default(), true),
        Err(e) => anyhow::bail!("Failed to load configuration\n{}", e.to_details()),
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    if missing {
        log::warn!(
            "Config file not found: {}, using defaults",
            args.config.display()
        );
    } else {
        log::info!("Config loaded from {}", args.config.display());
    }

    let rt = Runtime::new()?;
    rt.block_on(async {
        let source = MockTransactionSource::new(
            config.data.record_count,
            config.data.days_back,
            config.data.seed,
        );
        let monitor = Monitor::load(config.clone(), Arc::new(source)).await?;

        start_server(config, Arc::new(monitor)).await
    })
}
