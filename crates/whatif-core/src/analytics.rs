use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Percentage change beyond which a prediction stops being neutral.
pub const SIGNAL_THRESHOLD: f64 = 0.5;

/// Trading signal derived from a predicted percentage change.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Signal {
    StrongBuy,
    StrongSell,
    Neutral,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StrongBuy => write!(f, "STRONG BUY"),
            Self::StrongSell => write!(f, "STRONG SELL"),
            Self::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

/// Simple moving average, aligned with its input.
///
/// The first `window - 1` entries are `None` so that the overlay can be
/// plotted index-for-index against the closes. A window longer than the
/// series yields nothing but `None`.
///
/// ```rust
/// use whatif_core::analytics::simple_moving_average;
///
/// let sma = simple_moving_average(&[1.0, 2.0, 3.0, 4.0], 2).unwrap();
/// assert_eq!(sma, vec![None, Some(1.5), Some(2.5), Some(3.5)]);
/// ```
pub fn simple_moving_average(closes: &[f64], window: usize) -> Result<Vec<Option<f64>>> {
    if window == 0 {
        return Err(Error::InvalidInput("SMA window must be at least 1".into()));
    }
    if window > closes.len() {
        return Ok(vec![None; closes.len()]);
    }

    let means = closes
        .windows(window)
        .map(|w| Some(w.iter().sum::<f64>() / window as f64));
    Ok(std::iter::repeat(None)
        .take(window - 1)
        .chain(means)
        .collect())
}

/// `(predicted - base) / base * 100`.
pub fn percentage_return(base_price: f64, predicted_price: f64) -> Result<f64> {
    if base_price == 0.0 {
        return Err(Error::InvalidInput(
            "cannot compute a return from a base price of 0".into(),
        ));
    }
    Ok((predicted_price - base_price) / base_price * 100.0)
}

/// `> 0.5` buys, `< -0.5` sells, anything in `[-0.5, 0.5]` is neutral.
pub fn classify_signal(percent_change: f64) -> Signal {
    if percent_change > SIGNAL_THRESHOLD {
        Signal::StrongBuy
    } else if percent_change < -SIGNAL_THRESHOLD {
        Signal::StrongSell
    } else {
        Signal::Neutral
    }
}
