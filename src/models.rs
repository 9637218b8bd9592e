//! Response shapes for the CoinGecko endpoints we touch. Fields the
//! tool never reads are left out; serde ignores the rest.

use serde::Deserialize;

/// One entry of `/coins/categories?order=market_cap_desc`. The
/// upstream sorts by market cap; we trust the order rather than carry
/// the number around.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryListing {
    pub id: String,
    pub name: String,
}

/// One entry of `/coins/markets` (market-cap ranked coin listing).
#[derive(Debug, Clone, Deserialize)]
pub struct MarketCoin {
    pub id: String,
    pub symbol: String,
}

/// `/exchanges/{id}/tickers` response body.
#[derive(Debug, Deserialize)]
pub struct TickersPage {
    pub tickers: Vec<Ticker>,
}

/// One ticker: `base` traded against `target` on the exchange, with
/// `coin_id` identifying the base asset in CoinGecko terms.
#[derive(Debug, Clone, Deserialize)]
pub struct Ticker {
    pub base: String,
    pub target: String,
    pub coin_id: String,
}
