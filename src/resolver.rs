//! Resolves which coins trade on an exchange and under which pair
//! symbol, by walking the exchange's ticker listing.

use std::collections::HashMap;

use crate::client::GeckoClient;
use crate::config::{ExchangeSpec, QuoteCoin};
use crate::error::Result;
use crate::models::TickersPage;

/// Coin id -> watchlist pair reference ("BINANCE:BTCUSDT") for one
/// exchange. First listing wins if the upstream repeats a coin.
#[derive(Debug, Default)]
pub struct PairBook {
    pairs: HashMap<String, String>,
}

impl PairBook {
    pub fn get(&self, coin_id: &str) -> Option<&str> {
        self.pairs.get(coin_id).map(String::as_str)
    }

    pub fn contains(&self, coin_id: &str) -> bool {
        self.pairs.contains_key(coin_id)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    fn insert_first(&mut self, coin_id: String, pair: String) {
        self.pairs.entry(coin_id).or_insert(pair);
    }

    #[cfg(test)]
    pub(crate) fn from_pairs(pairs: HashMap<String, String>) -> Self {
        Self { pairs }
    }
}

/// Pages through `/exchanges/{id}/tickers`, keeping spot pairs quoted
/// in the configured quote asset. Stops on the first empty page.
pub async fn resolve_exchange_pairs(
    client: &GeckoClient,
    exchange: &ExchangeSpec,
    quote: &QuoteCoin,
) -> Result<PairBook> {
    log::info!(
        "resolver.tickers exchange={} quote={}",
        exchange.api_id,
        quote.symbol
    );
    let path = format!("/exchanges/{}/tickers", exchange.api_id);
    let label = exchange.label.to_uppercase();

    let mut book = PairBook::default();
    let mut page: u32 = 1;
    loop {
        let query = [
            ("coin_ids", quote.coin_id.clone()),
            ("page", page.to_string()),
        ];
        let body: TickersPage = client.get(&path, &query).await?;
        if body.tickers.is_empty() {
            break;
        }
        for t in body.tickers {
            if t.target != quote.symbol {
                continue;
            }
            book.insert_first(t.coin_id, format!("{label}:{}{}", t.base, t.target));
        }
        page += 1;
    }

    log::info!(
        "resolver.tickers.done exchange={} pairs={}",
        exchange.api_id,
        book.len()
    );
    Ok(book)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::settings;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn ticker(base: &str, target: &str, coin_id: &str) -> serde_json::Value {
        serde_json::json!({"base": base, "target": target, "coin_id": coin_id})
    }

    fn exchange() -> ExchangeSpec {
        ExchangeSpec {
            api_id: "binance".into(),
            label: "Binance".into(),
        }
    }

    fn quote() -> QuoteCoin {
        QuoteCoin {
            coin_id: "tether".into(),
            symbol: "USDT".into(),
        }
    }

    async fn client_for(server: &MockServer) -> GeckoClient {
        let mut s = settings();
        s.request_interval_ms = 0;
        GeckoClient::new(&s).unwrap().with_base_url(&server.uri())
    }

    #[tokio::test]
    async fn walks_pages_and_filters_quote() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/exchanges/binance/tickers"))
            .and(query_param("coin_ids", "tether"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "tickers": [
                    ticker("BTC", "USDT", "bitcoin"),
                    ticker("ETH", "BTC", "ethereum"),
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/exchanges/binance/tickers"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "tickers": [ticker("ETH", "USDT", "ethereum")]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/exchanges/binance/tickers"))
            .and(query_param("page", "3"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"tickers": []})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let book = resolve_exchange_pairs(&client, &exchange(), &quote())
            .await
            .unwrap();

        assert_eq!(book.len(), 2);
        assert_eq!(book.get("bitcoin"), Some("BINANCE:BTCUSDT"));
        // The ETH/BTC ticker on page 1 is not quoted in USDT and must
        // not shadow the page-2 USDT listing.
        assert_eq!(book.get("ethereum"), Some("BINANCE:ETHUSDT"));
    }

    #[tokio::test]
    async fn first_listing_wins_on_repeats() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/exchanges/binance/tickers"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "tickers": [
                    ticker("BTC", "USDT", "bitcoin"),
                    ticker("WBTC", "USDT", "bitcoin"),
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/exchanges/binance/tickers"))
            .and(query_param("page", "2"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"tickers": []})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let book = resolve_exchange_pairs(&client, &exchange(), &quote())
            .await
            .unwrap();
        assert_eq!(book.get("bitcoin"), Some("BINANCE:BTCUSDT"));
    }

    #[tokio::test]
    async fn empty_exchange_yields_empty_book() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/exchanges/binance/tickers"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"tickers": []})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let book = resolve_exchange_pairs(&client, &exchange(), &quote())
            .await
            .unwrap();
        assert!(book.is_empty());
    }
}
