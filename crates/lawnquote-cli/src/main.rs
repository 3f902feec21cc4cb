mod lookup;
mod price;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "lawnquote-cli")]
#[command(about = "Lawn property analysis and pricing from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Resolve an address and estimate its lawn metrics
    Analyze {
        /// Free-text street address
        address: String,
        /// Print the full analysis as JSON
        #[arg(long)]
        json: bool,
    },
    /// List service-area address suggestions for a partial address
    Suggest {
        query: String,
        /// Print the candidates as JSON
        #[arg(long)]
        json: bool,
    },
    /// Price a visit from known property metrics
    Price(price::PriceArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = lawnquote_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Analyze { address, json }) => {
            lookup::run_analyze(&config, &address, json).await?;
        }
        Some(Commands::Suggest { query, json }) => {
            lookup::run_suggest(&config, &query, json).await?;
        }
        Some(Commands::Price(args)) => price::run_price(&config, &args)?,
        None => println!("nothing to do; try `lawnquote-cli --help`"),
    }

    Ok(())
}
