use crate::error::{Error, Result};
use crate::prediction::PredictionRequest;
use crate::series::Series;

/// Days of `sim` sent to the predictor. The model needs 60 returns, so 70 raw
/// days leaves some slack.
pub const PREDICTION_WINDOW: usize = 70;

/// The user's override of the most recent trading day. `close` is not part of
/// it: the model predicts relative to the last known close.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WhatIf {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub volume: f64,
}

impl WhatIf {
    pub fn new(open: f64, high: f64, low: f64, volume: f64) -> Self {
        Self {
            open,
            high,
            low,
            volume,
        }
    }

    fn validate(&self) -> Result<i64> {
        for (name, value) in [("open", self.open), ("high", self.high), ("low", self.low)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidInput(format!(
                    "{name} must be a finite positive price, got {value}"
                )));
            }
        }
        if !self.volume.is_finite() || self.volume < 0.0 {
            return Err(Error::InvalidInput(format!(
                "volume must be finite and >= 0, got {}",
                self.volume
            )));
        }
        let volume = self.volume.round();
        if volume > i64::MAX as f64 {
            return Err(Error::InvalidInput(format!(
                "volume {} does not fit a share count",
                self.volume
            )));
        }
        Ok(volume as i64)
    }
}

/// Owns the `live` series, as last delivered by the market-data feed, and the
/// `sim` series the user edits and sends for prediction.
///
/// `live` is only ever replaced wholesale. `sim` is a deep copy of `live` that
/// diverges at its last record only.
#[derive(Debug, Clone, Default)]
pub struct SeriesStore {
    live: Series,
    sim: Series,
}

impl SeriesStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live(&self) -> &Series {
        &self.live
    }

    pub fn sim(&self) -> &Series {
        &self.sim
    }

    /// Close of the most recent live day.
    pub fn latest_close(&self) -> Option<f64> {
        self.live.last().map(|record| record.close)
    }

    /// Replace `live` with a freshly fetched series. `sim` is left alone; call
    /// [`reset_to_live()`] to refresh it.
    ///
    /// [`reset_to_live()`]: SeriesStore::reset_to_live
    pub fn ingest(&mut self, records: Series) -> Result<()> {
        if records.is_empty() {
            log::warn!("Refusing to ingest an empty series; keeping {} live records", self.live.len());
            return Err(Error::EmptySeries);
        }
        log::debug!("Ingested {} live records", records.len());
        self.live = records;
        Ok(())
    }

    /// Discard every what-if edit: `sim` becomes a fresh copy of `live`.
    pub fn reset_to_live(&mut self) -> Result<()> {
        if self.live.is_empty() {
            return Err(Error::NoLiveData);
        }
        self.sim = self.live.clone();
        Ok(())
    }

    /// Overwrite `open`, `high`, `low` and `volume` of the last `sim` record.
    ///
    /// Nothing is written unless every input is valid. OHLC ordering is not
    /// enforced (a `high` below `low` is a legitimate question to ask the model)
    /// but it is logged.
    pub fn apply_what_if(&mut self, what_if: WhatIf) -> Result<()> {
        let last = self.sim.last_mut().ok_or(Error::EmptySeries)?;
        let volume = what_if.validate()?;

        if what_if.high < what_if.low
            || what_if.open < what_if.low
            || what_if.open > what_if.high
        {
            log::warn!(
                "What-if day is not ordered (open {}, high {}, low {}); sending it as-is",
                what_if.open,
                what_if.high,
                what_if.low
            );
        }

        last.open = what_if.open;
        last.high = what_if.high;
        last.low = what_if.low;
        last.volume = volume;
        log::trace!("Applied what-if to last sim record: {last:?}");
        Ok(())
    }

    /// Independent copy of the last `min(n, len(sim))` records of `sim`.
    pub fn trailing_window(&self, n: usize) -> Result<Series> {
        if n == 0 {
            return Err(Error::InvalidInput("window length must be at least 1".into()));
        }
        Ok(self.sim.tail(n))
    }

    /// The payload for the predictor: the trailing [`PREDICTION_WINDOW`] of `sim`.
    pub fn prediction_request(&self) -> Result<PredictionRequest> {
        if self.sim.is_empty() {
            return Err(Error::EmptySeries);
        }
        let window = self.trailing_window(PREDICTION_WINDOW)?;
        Ok(PredictionRequest::from(&window))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::OhlcvRecord;

    fn series(len: usize) -> Series {
        (0..len)
            .map(|i| {
                let close = 100.0 + i as f64;
                OhlcvRecord {
                    timestamp: 1_700_000_000 + i as i64 * 86_400,
                    open: close - 0.5,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    volume: 1_000_000 + i as i64,
                }
            })
            .collect()
    }

    fn loaded(len: usize) -> SeriesStore {
        let mut store = SeriesStore::new();
        store.ingest(series(len)).unwrap();
        store.reset_to_live().unwrap();
        store
    }

    #[test]
    fn ingest_does_not_touch_sim() {
        let mut store = loaded(3);
        store.ingest(series(5)).unwrap();

        assert_eq!(store.live().len(), 5);
        assert_eq!(store.sim().len(), 3);
    }

    #[test]
    fn ingest_rejects_empty_and_keeps_previous_live() {
        let mut store = loaded(3);

        assert_eq!(store.ingest(Series::new()), Err(Error::EmptySeries));
        assert_eq!(store.live(), &series(3));
    }

    #[test]
    fn reset_without_live_data_fails() {
        let mut store = SeriesStore::new();
        assert_eq!(store.reset_to_live(), Err(Error::NoLiveData));
    }

    #[test]
    fn sim_edits_never_reach_live() {
        let mut store = loaded(10);
        let before = store.live().clone();

        store
            .apply_what_if(WhatIf::new(1.0, 2.0, 0.5, 42.0))
            .unwrap();

        assert_eq!(store.live(), &before);
        assert_ne!(store.sim(), &before);
    }

    #[test]
    fn what_if_only_touches_the_last_record_and_keeps_close() {
        let mut store = loaded(10);
        let baseline = store.sim().clone();

        store.apply_what_if(WhatIf::new(1.0, 2.0, 0.5, 42.0)).unwrap();
        store.apply_what_if(WhatIf::new(3.0, 4.0, 2.5, 7.4)).unwrap();

        let changed: Vec<usize> = baseline
            .iter()
            .zip(store.sim().iter())
            .enumerate()
            .filter(|(_, (a, b))| a != b)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(changed, vec![9]);

        let last = store.sim().last().unwrap();
        assert_eq!((last.open, last.high, last.low, last.volume), (3.0, 4.0, 2.5, 7));
        assert_eq!(last.close, baseline.last().unwrap().close);
    }

    #[test]
    fn invalid_what_if_leaves_sim_unchanged() {
        let mut store = loaded(4);
        let before = store.sim().clone();

        for bad in [
            WhatIf::new(f64::NAN, 2.0, 1.0, 10.0),
            WhatIf::new(1.0, f64::INFINITY, 1.0, 10.0),
            WhatIf::new(1.0, 2.0, 1.0, -1.0),
            WhatIf::new(1.0, 2.0, 1.0, f64::NAN),
            WhatIf::new(0.0, 2.0, 1.0, 10.0),
        ] {
            assert!(matches!(store.apply_what_if(bad), Err(Error::InvalidInput(_))));
        }
        assert_eq!(store.sim(), &before);
    }

    #[test]
    fn what_if_on_empty_sim_fails() {
        let mut store = SeriesStore::new();
        assert_eq!(
            store.apply_what_if(WhatIf::new(1.0, 2.0, 0.5, 1.0)),
            Err(Error::EmptySeries)
        );
    }

    #[test]
    fn empty_sim_is_reported_before_bad_input() {
        let mut store = SeriesStore::new();
        assert_eq!(
            store.apply_what_if(WhatIf::new(f64::NAN, 2.0, 0.5, -1.0)),
            Err(Error::EmptySeries)
        );
    }

    #[test]
    fn unordered_what_if_is_permitted() {
        let mut store = loaded(2);
        store.apply_what_if(WhatIf::new(5.0, 1.0, 3.0, 0.0)).unwrap();
        assert_eq!(store.sim().last().unwrap().high, 1.0);
    }

    #[test]
    fn trailing_window_clamps_to_sim_length() {
        let short = loaded(50);
        assert_eq!(short.trailing_window(70).unwrap(), *short.sim());

        let long = loaded(100);
        let window = long.trailing_window(70).unwrap();
        assert_eq!(window.len(), 70);
        assert_eq!(window.records(), &long.sim().records()[30..]);
    }

    #[test]
    fn trailing_window_of_zero_is_invalid() {
        let store = loaded(5);
        assert!(matches!(store.trailing_window(0), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn prediction_request_needs_sim() {
        let mut store = SeriesStore::new();
        store.ingest(series(3)).unwrap();
        assert_eq!(store.prediction_request(), Err(Error::EmptySeries));

        store.reset_to_live().unwrap();
        assert_eq!(store.prediction_request().unwrap().recent_data.len(), 3);
    }

    #[test]
    fn latest_close_follows_live() {
        let mut store = SeriesStore::new();
        assert_eq!(store.latest_close(), None);
        store.ingest(series(3)).unwrap();
        assert_eq!(store.latest_close(), Some(102.0));
    }
}
