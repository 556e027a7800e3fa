use crate::client_ext::predictor::ClientPredictExt;
use crate::client_ext::yahoo_finance::ClientYahooExt;
use crate::config::Config;
use crate::prelude::build_client;
use reqwest::Client;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use whatif_core::chart::ChartFrame;
use whatif_core::prediction::{PredictionRequest, PredictionResult};
use whatif_core::{Result, Series, SeriesStore, WhatIf};

/// Where daily price history comes from.
pub trait MarketSource {
    fn fetch_series(&self) -> impl Future<Output = Result<Series>> + Send;
}

/// Whatever turns a trailing window into a forecast.
pub trait Predictor {
    fn predict(
        &self,
        request: &PredictionRequest,
    ) -> impl Future<Output = Result<PredictionResult>> + Send;
}

/// The Yahoo! Finance chart endpoint, possibly behind a CORS relay.
#[derive(Debug, Clone)]
pub struct HttpMarketSource {
    pub client: Client,
    pub url: String,
}

impl MarketSource for HttpMarketSource {
    async fn fetch_series(&self) -> Result<Series> {
        self.client.fetch_series(&self.url).await
    }
}

/// The hosted `/predict` endpoint, with a fixed back-off between retries.
#[derive(Debug, Clone)]
pub struct HttpPredictor {
    pub client: Client,
    pub url: String,
    pub retries: u32,
    pub retry_delay: Duration,
}

impl Predictor for HttpPredictor {
    async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult> {
        let mut attempt = 0;
        loop {
            match self.client.predict(&self.url, request).await {
                Err(e) if e.is_transient() && attempt < self.retries => {
                    attempt += 1;
                    log::warn!(
                        "{e}; retrying ({attempt}/{}) in {:?}",
                        self.retries,
                        self.retry_delay
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                outcome => return outcome,
            }
        }
    }
}

/// State of the market-data feed, as shown next to the headline price.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedStatus {
    Loading,
    Ready,
    DataError(String),
}

impl fmt::Display for FeedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loading => write!(f, "Loading"),
            Self::Ready => write!(f, "System Ready"),
            Self::DataError(detail) => write!(f, "Data Error ({detail})"),
        }
    }
}

/// One fetch → what-if → predict → render cycle over a single [`SeriesStore`].
///
/// Both operations take `&mut self`, so a second prediction cannot start while
/// one is outstanding.
pub struct Dashboard<S, P> {
    source: S,
    predictor: P,
    store: SeriesStore,
    status: FeedStatus,
    prediction: Option<PredictionResult>,
}

impl Dashboard<HttpMarketSource, HttpPredictor> {
    /// Wire both collaborators to one HTTP client built from `config`.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let client = build_client(&config.user_agent, config.timeout)?;
        let source = HttpMarketSource {
            client: client.clone(),
            url: config.market_url(),
        };
        let predictor = HttpPredictor {
            client,
            url: config.predict_endpoint(),
            retries: config.retries,
            retry_delay: config.retry_delay,
        };
        Ok(Self::new(source, predictor))
    }
}

impl<S: MarketSource, P: Predictor> Dashboard<S, P> {
    pub fn new(source: S, predictor: P) -> Self {
        Self {
            source,
            predictor,
            store: SeriesStore::new(),
            status: FeedStatus::Loading,
            prediction: None,
        }
    }

    pub fn store(&self) -> &SeriesStore {
        &self.store
    }

    pub fn status(&self) -> &FeedStatus {
        &self.status
    }

    pub fn prediction(&self) -> Option<&PredictionResult> {
        self.prediction.as_ref()
    }

    /// Fetch fresh history, replace `live` and reset `sim` to it.
    ///
    /// On failure the status turns into a data error and the last good series
    /// stay in place.
    pub async fn refresh(&mut self) -> Result<()> {
        match self.load().await {
            Ok(store) => {
                log::info!(
                    "Loaded {} days; latest close {:.2}",
                    store.live().len(),
                    store.latest_close().unwrap_or_default()
                );
                self.store = store;
                self.prediction = None;
                self.status = FeedStatus::Ready;
                Ok(())
            }
            Err(e) => {
                log::error!("Error fetching market data: {e}");
                self.status = FeedStatus::DataError(e.to_string());
                Err(e)
            }
        }
    }

    async fn load(&self) -> Result<SeriesStore> {
        let series = self.source.fetch_series().await?;
        let mut store = self.store.clone();
        store.ingest(series)?;
        store.reset_to_live()?;
        Ok(store)
    }

    /// The what-if that would leave the last `sim` day as it is.
    pub fn current_what_if(&self) -> Option<WhatIf> {
        self.store
            .sim()
            .last()
            .map(|day| WhatIf::new(day.open, day.high, day.low, day.volume as f64))
    }

    /// Apply `what_if` to the last `sim` day and ask for a forecast.
    ///
    /// The edit is staged on a copy: if validation or the predictor fails,
    /// `sim`, the previous prediction and therefore the chart are untouched.
    pub async fn predict(&mut self, what_if: WhatIf) -> Result<PredictionResult> {
        let mut staged = self.store.clone();
        staged.apply_what_if(what_if)?;
        let request = staged.prediction_request()?;

        let result = self.predictor.predict(&request).await.map_err(|e| {
            log::error!("Prediction failed: {e}");
            e
        })?;
        log::info!(
            "Predicted {:.2} ({:+.2}%, {} confidence)",
            result.predicted_price,
            result.predicted_return_pct,
            result.confidence
        );

        self.store = staged;
        self.prediction = Some(result);
        Ok(result)
    }

    pub fn chart_frame(&self) -> Result<ChartFrame> {
        ChartFrame::build(self.store.sim(), self.prediction.as_ref())
    }
}
