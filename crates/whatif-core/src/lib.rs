/// Error kinds shared by the store, the analytics and the HTTP collaborators.
pub mod error;

/// Daily OHLCV records and the ordered `Series` container.
pub mod series;

/// The live/simulated pair of series and the what-if edit.
pub mod store;

/// Pure functions over closing prices: SMA, percentage return, signal bands.
pub mod analytics;

/// Prediction request/result types exchanged with the remote model.
pub mod prediction;

/// Values handed to the renderer: candles, SMA overlay, forecast marker, gauge.
pub mod chart;

pub use error::{Error, Result};
pub use series::{OhlcvRecord, Series};
pub use store::{SeriesStore, WhatIf, PREDICTION_WINDOW};
