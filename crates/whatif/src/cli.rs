use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use whatif_client::config::Config;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Sets the level of logging (`RUST_LOG` still wins)
    #[arg(long, value_enum, default_value = "warn")]
    pub trace: TraceLevel,

    /// Ticker symbol; overrides `WHATIF_TICKER`
    #[arg(long)]
    pub ticker: Option<String>,

    /// Base URL of the prediction backend; overrides `WHATIF_PREDICT_URL`
    #[arg(long)]
    pub predict_url: Option<String>,

    /// Query Yahoo! Finance directly instead of through the CORS relay
    #[arg(long)]
    pub no_proxy: bool,

    /// Seconds before a request counts as failed; overrides `WHATIF_TIMEOUT_SECS`
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Extra attempts when the predictor is unreachable; overrides `WHATIF_RETRIES`
    #[arg(long)]
    pub retries: Option<u32>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the latest close and the most recent trading days.
    Quote {
        /// How many trailing days to list.
        #[arg(long, default_value_t = 10)]
        days: usize,
    },

    /// Override the last trading day and ask the model for tomorrow's price.
    ///
    /// Any value left out keeps the last day's actual figure.
    Predict {
        #[arg(long)]
        open: Option<f64>,

        #[arg(long)]
        high: Option<f64>,

        #[arg(long)]
        low: Option<f64>,

        #[arg(long)]
        volume: Option<f64>,

        /// Also write the chart frame (candles, SMA, forecast, gauge) as JSON.
        #[arg(long)]
        chart: Option<PathBuf>,

        /// Print the prediction as JSON instead of a panel.
        #[arg(long)]
        json: bool,
    },

    /// Write the chart frame of the current series as JSON.
    Chart {
        /// Destination file; stdout when omitted.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum TraceLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<TraceLevel> for log::LevelFilter {
    fn from(level: TraceLevel) -> Self {
        match level {
            TraceLevel::Trace => log::LevelFilter::Trace,
            TraceLevel::Debug => log::LevelFilter::Debug,
            TraceLevel::Info => log::LevelFilter::Info,
            TraceLevel::Warn => log::LevelFilter::Warn,
            TraceLevel::Error => log::LevelFilter::Error,
        }
    }
}

impl Cli {
    /// Layer command-line flags over the environment's settings.
    pub fn configure(&self, mut config: Config) -> Config {
        if let Some(ticker) = &self.ticker {
            config.ticker = ticker.clone();
        }
        if let Some(url) = &self.predict_url {
            config.predict_url = url.clone();
        }
        if self.no_proxy {
            config.cors_proxy = None;
        }
        if let Some(secs) = self.timeout {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(retries) = self.retries {
            config.retries = retries;
        }
        config
    }
}
