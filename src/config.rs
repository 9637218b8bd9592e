use std::env;

use anyhow::{anyhow, Result};

fn get_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn get_env_bool(key: &str, default: bool) -> bool {
    match get_env(key) {
        None => default,
        Some(v) => matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "y" | "on"),
    }
}

fn get_env_usize(key: &str, default: usize) -> Result<usize> {
    match get_env(key) {
        None => Ok(default),
        Some(v) => Ok(v
            .parse::<usize>()
            .map_err(|e| anyhow!("{key} invalid int: {e}"))?),
    }
}

fn get_env_u64(key: &str, default: u64) -> Result<u64> {
    match get_env(key) {
        None => Ok(default),
        Some(v) => Ok(v
            .parse::<u64>()
            .map_err(|e| anyhow!("{key} invalid int: {e}"))?),
    }
}

fn get_env_string(key: &str, default: &str) -> String {
    get_env(key).unwrap_or_else(|| default.to_string())
}

/// One exchange to resolve pairs on: the CoinGecko API identifier plus
/// the label used in watchlist lines and file names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeSpec {
    pub api_id: String,
    pub label: String,
}

/// The quote asset every pair must trade against (e.g. tether/USDT).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteCoin {
    pub coin_id: String,
    pub symbol: String,
}

#[derive(Debug, Clone)]
pub struct Settings {
    // Credentials / upstream
    pub api_key: String,
    pub base_url: String,

    // Selection limits
    pub category_limit: usize,
    pub max_coins: usize,

    // Output
    pub combined: bool,
    pub output_dir: String,

    // Exchanges / quote asset
    pub exchanges: Vec<ExchangeSpec>,
    pub quote: QuoteCoin,

    // Request pacing and 429 recovery
    pub request_interval_ms: u64,
    pub rate_limit_delay_secs: u64,
    pub rate_limit_retries: u32,
    pub per_page: usize,
}

impl Settings {
    pub fn load() -> Result<Self> {
        // Fail on the key before anything else; no network call should
        // ever be attempted without it.
        let api_key = get_env("COINGECKO_API_KEY")
            .ok_or_else(|| anyhow!("COINGECKO_API_KEY is not set"))?;

        let s = Self {
            api_key,
            base_url: get_env_string("COINGECKO_BASE_URL", "https://api.coingecko.com/api/v3"),
            category_limit: get_env_usize("CATEGORY_LIMIT", 500)?,
            max_coins: get_env_usize("MAX_COINS", 1000)?,
            combined: get_env_bool("COMBINED", false),
            output_dir: get_env_string("WATCHLIST_DIR", "Watchlists"),
            exchanges: parse_exchanges(&get_env_string(
                "EXCHANGES",
                "binance:Binance,bybit_spot:Bybit",
            ))?,
            quote: parse_quote(&get_env_string("QUOTE_COIN", "tether:USDT"))?,
            request_interval_ms: get_env_u64("REQUEST_INTERVAL_MS", 2000)?,
            rate_limit_delay_secs: get_env_u64("RATE_LIMIT_DELAY_SECS", 10)?,
            rate_limit_retries: get_env_usize("RATE_LIMIT_RETRIES", 30)? as u32,
            per_page: get_env_usize("PER_PAGE", 250)?,
        };

        s.validate()?;
        Ok(s)
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(anyhow!("COINGECKO_API_KEY is empty"));
        }
        if self.category_limit < 1 {
            return Err(anyhow!(
                "category_limit must be >= 1 (got {})",
                self.category_limit
            ));
        }
        if self.max_coins < 1 {
            return Err(anyhow!("max_coins must be >= 1 (got {})", self.max_coins));
        }
        if !(1..=250).contains(&self.per_page) {
            return Err(anyhow!("PER_PAGE must be 1..=250 (got {})", self.per_page));
        }
        if self.rate_limit_retries < 1 {
            return Err(anyhow!(
                "RATE_LIMIT_RETRIES must be >= 1 (got {})",
                self.rate_limit_retries
            ));
        }
        if self.exchanges.is_empty() {
            return Err(anyhow!("EXCHANGES must name at least one exchange"));
        }
        Ok(())
    }
}

/// Parses "api_id:Label,api_id:Label" into exchange specs.
fn parse_exchanges(raw: &str) -> Result<Vec<ExchangeSpec>> {
    let mut out = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (api_id, label) = part
            .split_once(':')
            .ok_or_else(|| anyhow!("EXCHANGES entry {part:?} must be api_id:Label"))?;
        let (api_id, label) = (api_id.trim(), label.trim());
        if api_id.is_empty() || label.is_empty() {
            return Err(anyhow!("EXCHANGES entry {part:?} must be api_id:Label"));
        }
        out.push(ExchangeSpec {
            api_id: api_id.to_string(),
            label: label.to_string(),
        });
    }
    Ok(out)
}

/// Parses "coin_id:SYMBOL" (e.g. "tether:USDT").
fn parse_quote(raw: &str) -> Result<QuoteCoin> {
    let (coin_id, symbol) = raw
        .split_once(':')
        .ok_or_else(|| anyhow!("QUOTE_COIN {raw:?} must be coin_id:SYMBOL"))?;
    let (coin_id, symbol) = (coin_id.trim(), symbol.trim());
    if coin_id.is_empty() || symbol.is_empty() {
        return Err(anyhow!("QUOTE_COIN {raw:?} must be coin_id:SYMBOL"));
    }
    Ok(QuoteCoin {
        coin_id: coin_id.to_string(),
        symbol: symbol.to_string(),
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn settings() -> Settings {
        Settings {
            api_key: "k".into(),
            base_url: "https://api.coingecko.com/api/v3".into(),
            category_limit: 500,
            max_coins: 1000,
            combined: false,
            output_dir: "Watchlists".into(),
            exchanges: parse_exchanges("binance:Binance,bybit_spot:Bybit").unwrap(),
            quote: parse_quote("tether:USDT").unwrap(),
            request_interval_ms: 2000,
            rate_limit_delay_secs: 10,
            rate_limit_retries: 30,
            per_page: 250,
        }
    }

    #[test]
    fn default_settings_validate() {
        assert!(settings().validate().is_ok());
    }

    #[test]
    fn empty_api_key_rejected() {
        let mut s = settings();
        s.api_key = String::new();
        let err = s.validate().unwrap_err();
        assert!(err.to_string().contains("COINGECKO_API_KEY"));
    }

    #[test]
    fn load_fails_without_api_key_env() {
        // load() never touches the network, so an unset key must be
        // the first thing it rejects.
        env::remove_var("COINGECKO_API_KEY");
        let err = Settings::load().unwrap_err();
        assert!(err.to_string().contains("COINGECKO_API_KEY"));
    }

    #[test]
    fn zero_limits_rejected() {
        let mut s = settings();
        s.category_limit = 0;
        assert!(s.validate().is_err());

        let mut s = settings();
        s.max_coins = 0;
        assert!(s.validate().is_err());

        let mut s = settings();
        s.per_page = 0;
        assert!(s.validate().is_err());
    }

    #[test]
    fn parse_exchanges_splits_pairs() {
        let ex = parse_exchanges("binance:Binance, bybit_spot:Bybit").unwrap();
        assert_eq!(ex.len(), 2);
        assert_eq!(ex[0].api_id, "binance");
        assert_eq!(ex[0].label, "Binance");
        assert_eq!(ex[1].api_id, "bybit_spot");
        assert_eq!(ex[1].label, "Bybit");
    }

    #[test]
    fn parse_exchanges_rejects_bare_id() {
        assert!(parse_exchanges("binance").is_err());
        assert!(parse_exchanges("binance:").is_err());
    }

    #[test]
    fn parse_quote_splits_id_and_symbol() {
        let q = parse_quote("tether:USDT").unwrap();
        assert_eq!(q.coin_id, "tether");
        assert_eq!(q.symbol, "USDT");
        assert!(parse_quote("tether").is_err());
    }
}
