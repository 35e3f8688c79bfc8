mod check;
mod inspect;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "pricecheck")]
#[command(about = "Configurator price reconciliation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Walk every configuration of the given SKUs and compare quoted against reference prices
    Check {
        /// Comma-separated SKU list (e.g., ABC123,M100)
        #[arg(long)]
        skus: String,
        /// Catalog fixture to search (defaults to `PRICECHECK_CATALOG_PATH`)
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Write the HTML report to this file
        #[arg(long)]
        html_out: Option<PathBuf>,
        /// Print the full report as JSON instead of the text summary
        #[arg(long)]
        json: bool,
    },
    /// Print the variant code of an article in its default configuration
    VariantCode {
        #[arg(long)]
        sku: String,
        #[arg(
            long,
            env = "PRICECHECK_CATALOG_PATH",
            default_value = "./config/catalog.yaml"
        )]
        catalog: PathBuf,
    },
    /// Compare two prices as the reconciler would
    Compare { first: String, second: String },
}

/// `RUST_LOG` wins; otherwise `level` is used as the filter directive.
fn init_tracing(level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    match cli.command {
        Commands::Check {
            skus,
            catalog,
            html_out,
            json,
        } => {
            let config = pricecheck_core::load_app_config_from_env()?;
            init_tracing(&config.log_level)?;
            tracing::debug!(?config, "configuration loaded");
            check::run_check(
                &config,
                &skus,
                catalog.as_deref(),
                html_out.as_deref(),
                json,
            )
            .await?;
        }
        Commands::VariantCode { sku, catalog } => {
            init_tracing("warn")?;
            inspect::run_variant_code(&sku, &catalog).await?;
        }
        Commands::Compare { first, second } => {
            println!("{}", inspect::compare_report(&first, &second));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests;
