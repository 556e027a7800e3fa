use serde::{Deserialize, Serialize};

/// One trading day.
///
/// ```json
/// {
///     "timestamp": 1717421400,
///     "open": 192.9,
///     "high": 194.99,
///     "low": 192.52,
///     "close": 194.03,
///     "volume": 50080500
/// }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct OhlcvRecord {
    /// Unix seconds, as attached by the market-data feed. The analytics never read it.
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl OhlcvRecord {
    /// `[open, high, low, close, volume]`, the row layout the predictor expects.
    pub fn row(&self) -> [f64; 5] {
        [
            self.open,
            self.high,
            self.low,
            self.close,
            self.volume as f64,
        ]
    }

    /// Prices finite and strictly positive, volume non-negative.
    pub fn is_well_formed(&self) -> bool {
        [self.open, self.high, self.low, self.close]
            .iter()
            .all(|price| price.is_finite() && *price > 0.0)
            && self.volume >= 0
    }
}

/// Ordered sequence of daily records; position is chronological order.
///
/// The container never sorts or deduplicates: whatever order the feed delivered
/// is the order every consumer sees.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct Series(Vec<OhlcvRecord>);

impl Series {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn records(&self) -> &[OhlcvRecord] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, OhlcvRecord> {
        self.0.iter()
    }

    pub fn last(&self) -> Option<&OhlcvRecord> {
        self.0.last()
    }

    /// Appends in chronological order.
    pub fn push(&mut self, record: OhlcvRecord) {
        self.0.push(record);
    }

    pub fn closes(&self) -> Vec<f64> {
        self.0.iter().map(|record| record.close).collect()
    }

    /// Independent copy of the last `min(n, len)` records.
    pub fn tail(&self, n: usize) -> Series {
        let start = self.0.len().saturating_sub(n);
        Self(self.0[start..].to_vec())
    }

    pub(crate) fn last_mut(&mut self) -> Option<&mut OhlcvRecord> {
        self.0.last_mut()
    }
}

impl From<Vec<OhlcvRecord>> for Series {
    fn from(records: Vec<OhlcvRecord>) -> Self {
        Self(records)
    }
}

impl FromIterator<OhlcvRecord> for Series {
    fn from_iter<I: IntoIterator<Item = OhlcvRecord>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Series {
    type Item = OhlcvRecord;
    type IntoIter = std::vec::IntoIter<OhlcvRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Series {
    type Item = &'a OhlcvRecord;
    type IntoIter = std::slice::Iter<'a, OhlcvRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
