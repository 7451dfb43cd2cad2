use clap::Parser;
use oddsmith::cli::{self, Cli, Command};
use oddsmith::config::Config;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let args = Cli::parse();

    match args.command {
        Command::Convert { value, from, to } => {
            if let Err(e) = cli::convert(&value, &from, &to) {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
        Command::Run { config } => {
            let config = if config.exists() {
                match Config::load(&config) {
                    Ok(c) => c,
                    Err(e) => {
                        eprintln!("Failed to load config: {e}");
                        std::process::exit(1);
                    }
                }
            } else {
                Config::default()
            };

            config.init_logging();
            info!("oddsmith starting");

            tokio::select! {
                result = cli::run(config) => {
                    if let Err(e) = result {
                        error!(error = %e, "Fatal error");
                        std::process::exit(1);
                    }
                }
                _ = signal::ctrl_c() => {
                    info!("Shutdown signal received");
                }
            }

            info!("oddsmith stopped");
        }
    }
}
