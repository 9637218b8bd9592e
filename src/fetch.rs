//! Category and per-category coin retrieval.

use crate::client::GeckoClient;
use crate::error::Result;
use crate::models::{CategoryListing, MarketCoin};

/// Fetches the market-cap ranked category list, truncated to `limit`.
/// A shorter upstream list is returned as-is.
pub async fn fetch_categories(client: &GeckoClient, limit: usize) -> Result<Vec<CategoryListing>> {
    log::info!("fetch.categories limit={limit}");
    let mut categories: Vec<CategoryListing> = client
        .get("/coins/categories", &[("order", "market_cap_desc".into())])
        .await?;
    categories.truncate(limit);
    log::info!("fetch.categories.done count={}", categories.len());
    Ok(categories)
}

/// Lazy page sequence over `/coins/markets` for one category. The
/// producer never learns the caller's cap; it just hands out pages
/// until the upstream runs dry.
pub struct CoinPages<'a> {
    client: &'a GeckoClient,
    category_id: String,
    per_page: usize,
    page: u32,
    done: bool,
}

impl<'a> CoinPages<'a> {
    pub fn new(client: &'a GeckoClient, category_id: &str, per_page: usize) -> Self {
        Self {
            client,
            category_id: category_id.to_string(),
            per_page,
            page: 1,
            done: false,
        }
    }

    /// Next page of coins, or `None` once the listing is exhausted.
    /// A short page marks the sequence done; the page itself is still
    /// returned.
    pub async fn next_page(&mut self) -> Result<Option<Vec<MarketCoin>>> {
        if self.done {
            return Ok(None);
        }
        let query = [
            ("vs_currency", "usd".to_string()),
            ("category", self.category_id.clone()),
            ("order", "market_cap_desc".to_string()),
            ("per_page", self.per_page.to_string()),
            ("page", self.page.to_string()),
        ];
        let coins: Vec<MarketCoin> = self.client.get("/coins/markets", &query).await?;
        log::debug!(
            "fetch.coins.page category={} page={} count={}",
            self.category_id,
            self.page,
            coins.len()
        );
        if coins.len() < self.per_page {
            self.done = true;
        }
        self.page += 1;
        if coins.is_empty() {
            return Ok(None);
        }
        Ok(Some(coins))
    }
}

/// Collects up to `max_coins` coins for one category, rank order
/// preserved. Stops paging as soon as the cap is met.
pub async fn fetch_category_coins(
    client: &GeckoClient,
    category: &CategoryListing,
    max_coins: usize,
    per_page: usize,
) -> Result<Vec<MarketCoin>> {
    log::info!("fetch.coins category={} max={max_coins}", category.id);
    let mut pages = CoinPages::new(client, &category.id, per_page);
    let mut coins: Vec<MarketCoin> = Vec::new();
    while coins.len() < max_coins {
        let Some(batch) = pages.next_page().await? else {
            break;
        };
        let room = max_coins - coins.len();
        coins.extend(batch.into_iter().take(room));
    }
    log::info!(
        "fetch.coins.done category={} count={}",
        category.id,
        coins.len()
    );
    Ok(coins)
}
