mod seller;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use wmkt_client::workflow::PLACEHOLDER_TRACKING_NUMBER;
use wmkt_client::MarketplaceClient;
use wmkt_core::{AppConfig, Environment};

#[derive(Debug, Parser)]
#[command(name = "wmkt")]
#[command(about = "Walmart Marketplace seller operations")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Exchange the client credentials for an access token
    Token,
    /// Submit the item and inventory feeds for the configured listing
    List {
        /// Count an accepted submission as success without polling the feed
        #[arg(long)]
        no_wait: bool,
    },
    /// Ship the first released order and attach tracking
    Orders {
        /// Only consider orders created on or after this date (YYYY-MM-DD).
        /// Defaults to the first day of the current month.
        #[arg(long)]
        created_start_date: Option<NaiveDate>,
        #[arg(long, default_value = PLACEHOLDER_TRACKING_NUMBER)]
        tracking_number: String,
        /// Look the order up without posting any shipment
        #[arg(long)]
        dry_run: bool,
    },
    /// Full seller sequence: token, listing, inventory, order shipment
    Run {
        #[arg(long)]
        no_wait: bool,
        #[arg(long, default_value = PLACEHOLDER_TRACKING_NUMBER)]
        tracking_number: String,
    },
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Run {
            no_wait: false,
            tracking_number: PLACEHOLDER_TRACKING_NUMBER.to_string(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = wmkt_core::load_app_config()?;
    init_tracing(&config)?;
    tracing::debug!(?config, "configuration loaded");

    let client = MarketplaceClient::from_app_config(&config)?;

    match cli.command.unwrap_or_default() {
        Commands::Token => seller::run_token(&client).await,
        Commands::List { no_wait } => seller::run_list(&client, &config, no_wait).await?,
        Commands::Orders {
            created_start_date,
            tracking_number,
            dry_run,
        } => {
            seller::run_orders(
                &client,
                &config,
                seller::OrderArgs {
                    created_start_date,
                    tracking_number,
                    dry_run,
                },
            )
            .await;
        }
        Commands::Run {
            no_wait,
            tracking_number,
        } => seller::run_all(&client, &config, no_wait, tracking_number).await?,
    }

    Ok(())
}

/// `RUST_LOG` wins over `WMKT_LOG_LEVEL`. Logs go to stderr so the run
/// report on stdout stays readable; production logs are JSON.
fn init_tracing(config: &AppConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);
    if config.env == Environment::Production {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}
