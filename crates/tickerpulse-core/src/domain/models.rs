use serde::{Deserialize, Serialize};

/// Fixed-point rendering used for every numeric field of a [`QuoteRecord`].
pub const ZERO_FIXED: &str = "0.00";

/// One observation of a daily (or intraday) close.
///
/// `close` is `None` for sessions the provider reports without a price
/// (holidays, halted symbols, partially populated intraday buckets).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Unix timestamp in seconds.
    pub timestamp: i64,
    pub close: Option<f64>,
}

impl PricePoint {
    pub fn new(timestamp: i64, close: Option<f64>) -> Self {
        Self {
            timestamp,
            close: close.filter(|value| value.is_finite()),
        }
    }
}

/// Chronologically ascending price observations for one symbol.
///
/// Deserialization goes through [`TimeSeries::new`], so the ordering holds for
/// series read back from JSON too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<PricePoint>", into = "Vec<PricePoint>")]
pub struct TimeSeries {
    points: Vec<PricePoint>,
}

impl TimeSeries {
    /// Builds a series from provider points in any order.
    ///
    /// Points are stably sorted oldest first; non-finite closes become absent.
    pub fn new(points: impl IntoIterator<Item = PricePoint>) -> Self {
        let mut points: Vec<PricePoint> = points
            .into_iter()
            .map(|point| PricePoint::new(point.timestamp, point.close))
            .collect();
        points.sort_by_key(|point| point.timestamp);
        Self { points }
    }

    /// Builds a series from closes listed oldest first, one session per day.
    pub fn from_closes(closes: impl IntoIterator<Item = Option<f64>>) -> Self {
        const SECONDS_PER_DAY: i64 = 86_400;
        Self::new(
            closes
                .into_iter()
                .enumerate()
                .map(|(index, close)| PricePoint::new(index as i64 * SECONDS_PER_DAY, close)),
        )
    }

    pub fn empty() -> Self {
        Self { points: Vec::new() }
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of sessions that carry a close.
    pub fn present_len(&self) -> usize {
        self.points.iter().filter(|point| point.close.is_some()).count()
    }
}

impl From<Vec<PricePoint>> for TimeSeries {
    fn from(points: Vec<PricePoint>) -> Self {
        Self::new(points)
    }
}

impl From<TimeSeries> for Vec<PricePoint> {
    fn from(series: TimeSeries) -> Self {
        series.points
    }
}

/// Normalized per-symbol quote served to the ticker and article views.
///
/// Every numeric field is a two-decimal fixed-point string and is never null,
/// so consumers can render it without branching on missing data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRecord {
    pub symbol: String,
    pub price: String,
    pub change: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub five_day_change: Option<String>,
}

impl QuoteRecord {
    /// Zero-filled record returned whenever a symbol cannot be resolved.
    pub fn unavailable(symbol: impl Into<String>, with_long_change: bool) -> Self {
        Self {
            symbol: symbol.into(),
            price: String::from(ZERO_FIXED),
            change: String::from(ZERO_FIXED),
            five_day_change: with_long_change.then(|| String::from(ZERO_FIXED)),
        }
    }

    pub fn is_unavailable(&self) -> bool {
        self.price == ZERO_FIXED
            && self.change == ZERO_FIXED
            && self
                .five_day_change
                .as_deref()
                .map_or(true, |value| value == ZERO_FIXED)
    }
}
