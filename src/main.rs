mod client;
mod config;
mod error;
mod fetch;
mod models;
mod output;
mod pipeline;
mod resolver;
mod watchlist;

use anyhow::Result;
use clap::Parser;

use crate::config::Settings;

#[derive(Debug, Parser)]
#[command(name = "narrative-watchlists", version)]
#[command(about = "Build TradingView watchlists from CoinGecko narrative categories")]
struct Cli {
    /// Limit the number of categories to process.
    #[arg(short = 'l', long = "category_limit")]
    category_limit: Option<usize>,

    /// Maximum number of coins to fetch per category.
    #[arg(short = 'm', long = "max_coins")]
    max_coins: Option<usize>,

    /// Combine all categories into one watchlist per exchange.
    #[arg(
        short = 'c',
        long = "combined",
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    combined: Option<bool>,

    /// Override the output directory (WATCHLIST_DIR).
    #[arg(long)]
    out_dir: Option<String>,
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut settings = Settings::load()?;
    if let Some(l) = cli.category_limit {
        settings.category_limit = l;
    }
    if let Some(m) = cli.max_coins {
        settings.max_coins = m;
    }
    if let Some(c) = cli.combined {
        settings.combined = c;
    }
    if let Some(d) = cli.out_dir {
        settings.output_dir = d;
    }
    settings.validate()?;

    log::info!(
        "app.start categories={} max_coins={} combined={} exchanges={}",
        settings.category_limit,
        settings.max_coins,
        settings.combined,
        settings.exchanges.len()
    );

    pipeline::run(settings).await
}
