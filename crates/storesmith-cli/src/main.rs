use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "storesmith-cli")]
#[command(about = "Scrape a product page into a normalized record")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scrape one product URL and print the normalized record as JSON.
    Scrape {
        /// Product-page URL on any supported platform.
        url: String,
        /// Pretty-print the JSON output.
        #[arg(long)]
        pretty: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Scrape { url, pretty } => {
            let config = storesmith_core::load_config_from_env()?;
            let client = storesmith_scraper::fetch::build_client(config.connect_timeout_secs)?;
            let record = storesmith_scraper::scrape(&client, &config, &url).await;

            if record.is_demo {
                tracing::warn!(url, "extraction was insufficient; emitting demo record");
            }

            let json = if pretty {
                serde_json::to_string_pretty(&record)?
            } else {
                serde_json::to_string(&record)?
            };
            println!("{json}");
        }
    }

    Ok(())
}
