use crate::client_ext::{predictor, yahoo_finance as yf};
use std::env;
use std::time::Duration;

pub const DEFAULT_TICKER: &str = "AAPL";
pub const DEFAULT_CORS_PROXY: &str = "https://corsproxy.io/?";
pub const DEFAULT_PREDICT_URL: &str = "https://stock-prediction-backend-xpts.onrender.com";
pub const DEFAULT_USER_AGENT: &str = concat!("whatif/", env!("CARGO_PKG_VERSION"));

/// A cold-starting predictor can take this long to wake up.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Runtime settings, read from the environment (and so from `.env`).
///
/// | variable                 | default                     |
/// |--------------------------|-----------------------------|
/// | `WHATIF_TICKER`          | `AAPL`                      |
/// | `WHATIF_INTERVAL`        | `1d`                        |
/// | `WHATIF_RANGE`           | `3mo`                       |
/// | `WHATIF_CORS_PROXY`      | `https://corsproxy.io/?`; empty string disables it |
/// | `WHATIF_PREDICT_URL`     | the hosted backend          |
/// | `WHATIF_TIMEOUT_SECS`    | `30`                        |
/// | `WHATIF_RETRIES`         | `0`                         |
/// | `WHATIF_RETRY_DELAY_SECS`| `5`                         |
/// | `USER_AGENT`             | `whatif/<version>`          |
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub ticker: String,
    pub interval: String,
    pub range: String,
    pub cors_proxy: Option<String>,
    pub predict_url: String,
    pub user_agent: String,
    pub timeout: Duration,
    /// Extra attempts at the predictor after a `BackendUnavailable`.
    pub retries: u32,
    pub retry_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ticker: DEFAULT_TICKER.to_string(),
            interval: yf::INTERVAL.to_string(),
            range: yf::RANGE.to_string(),
            cors_proxy: Some(DEFAULT_CORS_PROXY.to_string()),
            predict_url: DEFAULT_PREDICT_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retries: 0,
            retry_delay: Duration::from_secs(5),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key/value source; unset or unparsable values keep their default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(ticker) = lookup("WHATIF_TICKER") {
            config.ticker = ticker;
        }
        if let Some(interval) = lookup("WHATIF_INTERVAL") {
            config.interval = interval;
        }
        if let Some(range) = lookup("WHATIF_RANGE") {
            config.range = range;
        }
        if let Some(proxy) = lookup("WHATIF_CORS_PROXY") {
            config.cors_proxy = (!proxy.is_empty()).then_some(proxy);
        }
        if let Some(url) = lookup("WHATIF_PREDICT_URL") {
            config.predict_url = url;
        }
        if let Some(agent) = lookup("USER_AGENT") {
            config.user_agent = agent;
        }
        if let Some(secs) = parse(&lookup, "WHATIF_TIMEOUT_SECS") {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(retries) = parse(&lookup, "WHATIF_RETRIES") {
            config.retries = retries;
        }
        if let Some(secs) = parse(&lookup, "WHATIF_RETRY_DELAY_SECS") {
            config.retry_delay = Duration::from_secs(secs);
        }

        config
    }

    /// Where the daily price history is fetched from, through the relay if one is set.
    pub fn market_url(&self) -> String {
        let target = yf::chart_url(&self.ticker, &self.interval, &self.range);
        match &self.cors_proxy {
            Some(proxy) => yf::proxied(proxy, &target),
            None => target,
        }
    }

    pub fn predict_endpoint(&self) -> String {
        predictor::predict_url(&self.predict_url)
    }
}

fn parse<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("Ignoring {key}={raw:?}: not a valid number");
            None
        }
    }
}
