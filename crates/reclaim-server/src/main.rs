mod config;
mod gateway;
mod serve;
mod store;

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use reclaim_core::payment::PaymentGateway;

use config::{ConfigFile, PaymentConfig, ServerConfig};
use gateway::{HttpPaymentGateway, MockPaymentGateway};
use serve::AppState;
use store::SessionStore;

#[derive(Parser)]
#[command(name = "reclaim", about = "Consultation-booking API for the recovery consultancy")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
    /// Run the booking API server
    Serve {
        /// Address to bind (overrides RECLAIM_BIND and the config file)
        #[arg(long)]
        bind: Option<String>,
        /// Port to listen on (overrides RECLAIM_PORT and the config file)
        #[arg(long)]
        port: Option<u16>,
        /// Use the mock payment gateway regardless of configuration
        #[arg(long)]
        mock_payments: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { force } => {
            let path = config::config_path();
            if path.exists() && !force {
                anyhow::bail!(
                    "config file already exists at {} (use --force to overwrite)",
                    path.display()
                );
            }
            config::save_config(&ConfigFile::default())
                .context("failed to write config file")?;
            println!("wrote {}", path.display());
            Ok(())
        }
        Commands::Serve {
            bind,
            port,
            mock_payments,
        } => {
            let resolved = ServerConfig::resolve(bind, port, mock_payments)
                .context("failed to resolve server configuration")?;

            let gateway: Arc<dyn PaymentGateway> = match &resolved.payment {
                PaymentConfig::Mock => {
                    tracing::info!("using mock payment gateway");
                    Arc::new(MockPaymentGateway)
                }
                PaymentConfig::Http { base_url, api_key } => {
                    tracing::info!(base_url = %base_url, "using http payment gateway");
                    Arc::new(HttpPaymentGateway::new(base_url.clone(), api_key.clone()))
                }
            };

            let state = AppState {
                store: Arc::new(SessionStore::new()),
                gateway,
            };

            serve::run_serve(state, &resolved.bind, resolved.port).await
        }
    }
}
