use anyhow::Result;
use clap::Parser;
use tracing::info;

use shorturl::cli::{Cli, Commands};
use shorturl::config::AppConfig;
use shorturl::runtime;
use shorturl::system::init_logging;

#[actix_web::main]
async fn main() {
    if let Err(e) = run().await {
        // 日志可能还没初始化，直接打到 stderr
        eprintln!("{:?}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::GenerateConfig { output } => {
            let config = AppConfig::default();
            config.save_to_file(&output)?;
            println!("Configuration written to {}", output);
            Ok(())
        }
        Commands::Serve => {
            let config = match AppConfig::load(&cli.config) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("{}", e.format_colored());
                    std::process::exit(1);
                }
            };

            let _guard = init_logging(&config.logging)?;
            info!("shorturl {} starting", env!("CARGO_PKG_VERSION"));

            runtime::run_server(config).await
        }
    }
}
