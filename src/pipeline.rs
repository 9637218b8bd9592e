//! End-to-end run: fetch categories and coins, resolve exchange
//! pairs, write watchlists. Everything is sequential; the request
//! pacing in the client dominates the runtime.

use anyhow::{Context, Result};

use crate::client::GeckoClient;
use crate::config::Settings;
use crate::fetch;
use crate::models::{CategoryListing, MarketCoin};
use crate::output::Writer;
use crate::resolver::{self, PairBook};
use crate::watchlist;

pub async fn run(settings: Settings) -> Result<()> {
    let client = GeckoClient::new(&settings).context("building HTTP client")?;

    let categories = fetch::fetch_categories(&client, settings.category_limit)
        .await
        .context("fetching categories")?;

    let mut fetched: Vec<(CategoryListing, Vec<MarketCoin>)> = Vec::new();
    for category in categories {
        let coins =
            fetch::fetch_category_coins(&client, &category, settings.max_coins, settings.per_page)
                .await
                .with_context(|| format!("fetching coins for category {}", category.id))?;
        fetched.push((category, coins));
    }

    let mut books: Vec<PairBook> = Vec::new();
    for exchange in &settings.exchanges {
        let book = resolver::resolve_exchange_pairs(&client, exchange, &settings.quote)
            .await
            .with_context(|| format!("resolving tickers for exchange {}", exchange.api_id))?;
        books.push(book);
    }

    log_resolution_gaps(&fetched, &books);

    let writer = Writer::new(&settings.output_dir);
    for (exchange, book) in settings.exchanges.iter().zip(&books) {
        let cats = watchlist::resolve_categories(&fetched, book);
        if cats.is_empty() {
            log::warn!("pipeline.no_pairs exchange={}", exchange.api_id);
            continue;
        }

        if settings.combined {
            if let Some((name, lines)) = watchlist::combined_file(&exchange.label, &cats) {
                writer.write(&name, &lines)?;
            }
        } else {
            for (name, lines) in watchlist::individual_files(&exchange.label, &cats) {
                writer.write(&name, &lines)?;
            }
        }
        if let Some((name, lines)) = watchlist::indices_file(&exchange.label, &cats) {
            writer.write(&name, &lines)?;
        }
    }

    log::info!("app.done");
    Ok(())
}

/// Coins that resolved on no configured exchange are dropped from
/// every output; say so once rather than failing the run.
fn log_resolution_gaps(fetched: &[(CategoryListing, Vec<MarketCoin>)], books: &[PairBook]) {
    let mut gaps = 0usize;
    for (category, coins) in fetched {
        for coin in coins {
            if !books.iter().any(|b| b.contains(&coin.id)) {
                log::debug!(
                    "resolver.gap coin={} symbol={} category={}",
                    coin.id,
                    coin.symbol,
                    category.id
                );
                gaps += 1;
            }
        }
    }
    if gaps > 0 {
        log::info!("resolver.gaps count={gaps}");
    }
}
