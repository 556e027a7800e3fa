use crate::analytics::{classify_signal, simple_moving_average, Signal};
use crate::error::Result;
use crate::prediction::PredictionResult;
use crate::series::Series;
use serde::{Deserialize, Serialize};

/// Window of the moving-average overlay.
pub const SMA_WINDOW: usize = 20;

/// The gauge dial spans `[-GAUGE_RANGE, GAUGE_RANGE]` percent.
pub const GAUGE_RANGE: f64 = 5.0;

/// Everything the renderer needs to draw one frame.
///
/// ```json
/// {
///     "candles": [{ "index": 0, "timestamp": 1717421400, "open": 192.9, ... }, ...],
///     "sma": [null, null, ..., 191.3],
///     "forecast": { "index": 62, "price": 196.4 },
///     "gauge": { "value": 1.2, "needle": 1.2, "signal": "STRONG_BUY" }
/// }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChartFrame {
    pub candles: Vec<Candle>,
    /// Aligned index-for-index with `candles`.
    pub sma: Vec<Option<f64>>,
    pub forecast: Option<ForecastMarker>,
    pub gauge: Option<Gauge>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Candle {
    pub index: usize,
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

/// A single predicted point, one step past the last candle.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ForecastMarker {
    pub index: usize,
    pub price: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Gauge {
    /// Predicted return, in percent.
    pub value: f64,
    /// `value` clamped to the dial.
    pub needle: f64,
    /// Colour band; same boundaries as [`classify_signal()`].
    pub signal: Signal,
}

impl Gauge {
    pub fn new(percent_change: f64) -> Self {
        Self {
            value: percent_change,
            needle: percent_change.clamp(-GAUGE_RANGE, GAUGE_RANGE),
            signal: classify_signal(percent_change),
        }
    }
}

impl ChartFrame {
    /// Build a frame for `sim`, with a forecast marker and gauge when a
    /// prediction is available.
    pub fn build(sim: &Series, prediction: Option<&PredictionResult>) -> Result<Self> {
        let candles = sim
            .iter()
            .enumerate()
            .map(|(index, record)| Candle {
                index,
                timestamp: record.timestamp,
                open: record.open,
                high: record.high,
                low: record.low,
                close: record.close,
                volume: record.volume,
            })
            .collect();
        let sma = simple_moving_average(&sim.closes(), SMA_WINDOW)?;

        Ok(Self {
            candles,
            sma,
            forecast: prediction.map(|p| ForecastMarker {
                index: sim.len(),
                price: p.predicted_price,
            }),
            gauge: prediction.map(|p| Gauge::new(p.predicted_return_pct)),
        })
    }
}
