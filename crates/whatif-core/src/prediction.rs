use crate::analytics::{classify_signal, Signal};
use crate::series::Series;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Body of the `/predict` call: rows of `[open, high, low, close, volume]`,
/// oldest first, sent without any normalisation.
///
/// ```json
/// {
///     "recent_data": [
///         [192.9, 194.99, 192.52, 194.03, 50080500.0],
///         // ...
///     ]
/// }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PredictionRequest {
    pub recent_data: Vec<[f64; 5]>,
}

impl From<&Series> for PredictionRequest {
    fn from(window: &Series) -> Self {
        Self {
            recent_data: window.iter().map(|record| record.row()).collect(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

/// What the predictor said about the day after the last `sim` record.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct PredictionResult {
    pub predicted_price: f64,
    pub predicted_return_pct: f64,
    pub confidence: Confidence,
}

impl PredictionResult {
    pub fn signal(&self) -> Signal {
        classify_signal(self.predicted_return_pct)
    }
}
