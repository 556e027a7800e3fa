use super::unavailable;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;
use whatif_core::{Error, OhlcvRecord, Result, Series};

pub const INTERVAL: &str = "1d";
pub const RANGE: &str = "3mo";

pub fn chart_url(ticker: &str, interval: &str, range: &str) -> String {
    let tckr = ticker.to_uppercase();
    format!("https://query1.finance.yahoo.com/v8/finance/chart/{tckr}?interval={interval}&range={range}")
}

/// Route `target` through a CORS relay, e.g. `https://corsproxy.io/?`, which
/// expects the target URL-encoded and appended verbatim.
pub fn proxied(proxy: &str, target: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(target.as_bytes()).collect();
    format!("{proxy}{encoded}")
}

pub trait ClientYahooExt {
    fn fetch_series(&self, url: &str) -> impl Future<Output = Result<Series>> + Send;
}

/// Add-on methods for [`reqwest::Client`].
///
/// [`reqwest::Client`]: https://docs.rs/reqwest/latest/reqwest/struct.Client.html
impl ClientYahooExt for Client {
    /// GET a chart document and turn it into a series of complete days.
    async fn fetch_series(&self, url: &str) -> Result<Series> {
        log::trace!("Fetching price data from {url}");
        let response = self.get(url).send().await.map_err(|e| {
            log::error!("Price fetching error: {e}\nURL: {url}");
            unavailable(url, e)
        })?;
        let status = response.status();
        let body = response.bytes().await.map_err(|e| unavailable(url, e))?;

        if !status.is_success() {
            // Yahoo explains unknown tickers in the body of a 404
            let detail = serde_json::from_slice::<PriceHistory>(&body)
                .ok()
                .and_then(|history| history.chart.error)
                .map(|e| format!(" ({}: {})", e.code, e.description))
                .unwrap_or_default();
            return Err(Error::BackendUnavailable(format!(
                "{url} answered {status}{detail}"
            )));
        }

        log::trace!("Deserializing price data");
        let history = serde_json::from_slice::<PriceHistory>(&body).map_err(|e| {
            log::error!("Price deserialization error: {e}\nURL: {url}");
            Error::from(e)
        })?;
        extran(history)
    }
}

/// Zip the timestamps with the quote arrays, dropping every day that is
/// missing a field or breaks a value invariant. Order is preserved.
pub fn extran(history: PriceHistory) -> Result<Series> {
    if let Some(e) = history.chart.error {
        return Err(Error::MalformedResponse(format!(
            "chart error {}: {}",
            e.code, e.description
        )));
    }
    let base = history
        .chart
        .result
        .and_then(|result| result.into_iter().next())
        .ok_or_else(|| Error::MalformedResponse("chart.result is empty".into()))?;
    let quote = base
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| Error::MalformedResponse("indicators.quote is empty".into()))?;

    let timestamps = required(base.timestamp, "timestamp")?;
    let opens = required(quote.open, "open")?;
    let highs = required(quote.high, "high")?;
    let lows = required(quote.low, "low")?;
    let closes = required(quote.close, "close")?;
    let volumes = required(quote.volume, "volume")?;

    let mut series = Series::new();
    let mut incomplete = 0;
    let mut invalid = 0;
    for (i, timestamp) in timestamps.iter().enumerate() {
        let field = |column: &[Option<f64>]| column.get(i).copied().flatten();
        let (Some(open), Some(high), Some(low), Some(close), Some(volume)) = (
            field(&opens[..]),
            field(&highs[..]),
            field(&lows[..]),
            field(&closes[..]),
            field(&volumes[..]),
        ) else {
            incomplete += 1;
            continue;
        };

        let record = OhlcvRecord {
            timestamp: *timestamp,
            open,
            high,
            low,
            close,
            volume: if volume.is_finite() { volume.round() as i64 } else { -1 },
        };
        if !record.is_well_formed() {
            invalid += 1;
            continue;
        }
        series.push(record);
    }

    if incomplete > 0 {
        log::debug!("Dropped {incomplete} incomplete day(s) from the price feed");
    }
    if invalid > 0 {
        log::warn!("Dropped {invalid} day(s) with non-positive prices or negative volume");
    }
    log::trace!("Price data transformed: {} complete days", series.len());
    Ok(series)
}

fn required<T>(column: Option<T>, name: &str) -> Result<T> {
    column.ok_or_else(|| Error::MalformedResponse(format!("missing {name} array")))
}

// `chart` schema
#[derive(Deserialize, Serialize, Debug)]
pub struct PriceHistory {
    pub chart: PriceResponse,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct PriceResponse {
    pub result: Option<Vec<PriceCategories>>,
    #[serde(default)]
    pub error: Option<ChartError>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct ChartError {
    pub code: String,
    pub description: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct PriceCategories {
    pub timestamp: Option<Vec<i64>>,
    pub indicators: Indicators,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct Indicators {
    pub quote: Vec<Quote>,
}

/// Yahoo reports a day it has no data for as `null` in every column.
/// A column that is absent altogether is a broken response, not a quiet day.
#[derive(Deserialize, Serialize, Debug, Default)]
pub struct Quote {
    pub open: Option<Vec<Option<f64>>>,
    pub high: Option<Vec<Option<f64>>>,
    pub low: Option<Vec<Option<f64>>>,
    pub close: Option<Vec<Option<f64>>>,
    pub volume: Option<Vec<Option<f64>>>,
}
