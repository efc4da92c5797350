//! Quote delta calculation.
//!
//! Turns a gappy close series into a [`QuoteRecord`]: the latest close, the
//! percent change against the previous close, and optionally the percent
//! change across a trailing window of sessions.
//!
//! Any figure that cannot be resolved (too few closes, a zero reference price,
//! a window longer than the series) collapses the whole record to
//! [`QuoteRecord::unavailable`]. The calculator never fails.

use serde::{Deserialize, Serialize};

use crate::domain::{QuoteRecord, TimeSeries, ZERO_FIXED};
use crate::ValidationError;

/// Session counts used to derive change figures.
///
/// `short_lookback` counts closes back from the latest one (1 = previous
/// close). `long_lookback` counts trailing sessions including the latest, so
/// a five-session window over `[90, 95, 98, 102, 105]` compares 105 with 90.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawLookbackWindow")]
pub struct LookbackWindow {
    short_lookback: usize,
    long_lookback: Option<usize>,
}

#[derive(Deserialize)]
struct RawLookbackWindow {
    short_lookback: usize,
    long_lookback: Option<usize>,
}

impl TryFrom<RawLookbackWindow> for LookbackWindow {
    type Error = ValidationError;

    fn try_from(raw: RawLookbackWindow) -> Result<Self, Self::Error> {
        if raw.short_lookback == 0 {
            return Err(ValidationError::LookbackTooShort { value: 0 });
        }
        let window = match raw.long_lookback {
            Some(sessions) => Self::with_long_lookback(sessions)?,
            None => Self::daily(),
        };
        Ok(Self {
            short_lookback: raw.short_lookback,
            ..window
        })
    }
}

impl Default for LookbackWindow {
    fn default() -> Self {
        Self::five_day()
    }
}

impl LookbackWindow {
    /// Day-over-day change only.
    pub const fn daily() -> Self {
        Self {
            short_lookback: 1,
            long_lookback: None,
        }
    }

    /// Day-over-day change plus the five-session change shown on the ticker.
    pub const fn five_day() -> Self {
        Self {
            short_lookback: 1,
            long_lookback: Some(5),
        }
    }

    pub fn with_long_lookback(sessions: usize) -> Result<Self, ValidationError> {
        if sessions < 2 {
            return Err(ValidationError::LookbackTooShort { value: sessions });
        }
        Ok(Self {
            long_lookback: Some(sessions),
            ..Self::daily()
        })
    }

    pub const fn short_lookback(&self) -> usize {
        self.short_lookback
    }

    pub const fn long_lookback(&self) -> Option<usize> {
        self.long_lookback
    }

    pub const fn includes_long_change(&self) -> bool {
        self.long_lookback.is_some()
    }

    /// Sessions a provider must return for every figure to be computable.
    pub fn sessions_required(&self) -> usize {
        let short = self.short_lookback + 1;
        self.long_lookback.map_or(short, |long| long.max(short))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ResolvedPrices {
    current: f64,
    previous: f64,
    base: Option<f64>,
}

/// Computes the quote record for `symbol` from `series`.
///
/// Pure and deterministic: the same series and window always produce the same
/// record.
pub fn compute_quote(symbol: &str, series: &TimeSeries, window: LookbackWindow) -> QuoteRecord {
    let with_long = window.includes_long_change();
    let Some(prices) = resolve_prices(series, window) else {
        return QuoteRecord::unavailable(symbol, with_long);
    };

    let Some(change) = percent_change(prices.current, prices.previous) else {
        return QuoteRecord::unavailable(symbol, with_long);
    };

    let five_day_change = match prices.base {
        Some(base) => match percent_change(prices.current, base) {
            Some(value) => Some(format_fixed2(value)),
            None => return QuoteRecord::unavailable(symbol, with_long),
        },
        None => None,
    };

    QuoteRecord {
        symbol: symbol.to_owned(),
        price: format_fixed2(prices.current),
        change: format_fixed2(change),
        five_day_change,
    }
}

fn resolve_prices(series: &TimeSeries, window: LookbackWindow) -> Option<ResolvedPrices> {
    let points = series.points();

    // Newest first, absent sessions skipped.
    let mut present = points
        .iter()
        .enumerate()
        .rev()
        .filter_map(|(index, point)| point.close.map(|close| (index, close)));

    let (current_index, current) = present.next()?;
    let (_, previous) = present.nth(window.short_lookback.saturating_sub(1))?;

    let base = match window.long_lookback {
        None => None,
        Some(sessions) => {
            if points.len() < sessions {
                return None;
            }
            let start = points.len() - sessions;
            let (base_index, base) = points[start..]
                .iter()
                .enumerate()
                .find_map(|(offset, point)| point.close.map(|close| (start + offset, close)))?;
            // The window must hold a close older than the current one.
            if base_index >= current_index {
                return None;
            }
            Some(base)
        }
    };

    Some(ResolvedPrices {
        current,
        previous,
        base,
    })
}

/// Percent difference from `reference` to `current`; `None` for a zero
/// reference or a non-finite result.
pub fn percent_change(current: f64, reference: f64) -> Option<f64> {
    if reference == 0.0 || !reference.is_finite() || !current.is_finite() {
        return None;
    }
    let value = (current - reference) / reference * 100.0;
    value.is_finite().then_some(value)
}

/// Renders `value` with exactly two fraction digits.
///
/// Values that round to zero render as `0.00`, never `-0.00`.
pub fn format_fixed2(value: f64) -> String {
    let rendered = format!("{value:.2}");
    if rendered == "-0.00" {
        String::from(ZERO_FIXED)
    } else {
        rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialized_windows_are_validated() {
        let window: LookbackWindow =
            serde_json::from_str(r#"{"short_lookback":1,"long_lookback":5}"#).expect("valid");
        assert_eq!(window, LookbackWindow::five_day());

        let too_short =
            serde_json::from_str::<LookbackWindow>(r#"{"short_lookback":1,"long_lookback":1}"#);
        assert!(too_short.is_err());
        let zero_short =
            serde_json::from_str::<LookbackWindow>(r#"{"short_lookback":0,"long_lookback":null}"#);
        assert!(zero_short.is_err());
    }

    fn series(closes: &[Option<f64>]) -> TimeSeries {
        TimeSeries::from_closes(closes.iter().copied())
    }

    #[test]
    fn skips_absent_sessions_between_current_and_previous() {
        let record = compute_quote(
            "AAPL",
            &series(&[Some(100.0), None, Some(105.0)]),
            LookbackWindow::daily(),
        );

        assert_eq!(record.price, "105.00");
        assert_eq!(record.change, "5.00");
        assert_eq!(record.five_day_change, None);
    }

    #[test]
    fn five_session_window_compares_against_oldest_close() {
        let record = compute_quote(
            "MSFT",
            &series(&[Some(90.0), Some(95.0), Some(98.0), Some(102.0), Some(105.0)]),
            LookbackWindow::five_day(),
        );

        assert_eq!(record.price, "105.00");
        assert_eq!(record.change, "2.94");
        assert_eq!(record.five_day_change.as_deref(), Some("16.67"));
    }

    #[test]
    fn window_ignores_sessions_older_than_the_lookback() {
        let record = compute_quote(
            "MSFT",
            &series(&[
                Some(10.0),
                Some(90.0),
                Some(95.0),
                Some(98.0),
                Some(102.0),
                Some(105.0),
            ]),
            LookbackWindow::five_day(),
        );

        assert_eq!(record.five_day_change.as_deref(), Some("16.67"));
    }

    #[test]
    fn window_base_skips_leading_absent_sessions() {
        let record = compute_quote(
            "TSLA",
            &series(&[None, Some(100.0), Some(98.0), None, Some(110.0)]),
            LookbackWindow::five_day(),
        );

        assert_eq!(record.change, "12.24");
        assert_eq!(record.five_day_change.as_deref(), Some("10.00"));
    }

    #[test]
    fn window_longer_than_series_falls_back_to_defaults() {
        let record = compute_quote(
            "NVDA",
            &series(&[Some(100.0), Some(101.0), Some(102.0)]),
            LookbackWindow::five_day(),
        );

        assert_eq!(record, QuoteRecord::unavailable("NVDA", true));
    }

    #[test]
    fn all_absent_series_yields_zeroes() {
        let record = compute_quote("ZZZZ", &series(&[None, None]), LookbackWindow::daily());
        assert_eq!(record.price, "0.00");
        assert_eq!(record.change, "0.00");
    }

    #[test]
    fn single_close_is_insufficient() {
        let record = compute_quote("ZZZZ", &series(&[None, Some(42.0)]), LookbackWindow::daily());
        assert!(record.is_unavailable());
    }

    #[test]
    fn zero_previous_close_avoids_division_by_zero() {
        let record = compute_quote(
            "PENNY",
            &series(&[Some(0.0), Some(1.5)]),
            LookbackWindow::daily(),
        );
        assert!(record.is_unavailable());
    }

    #[test]
    fn negative_change_keeps_its_sign_without_explicit_plus() {
        let record = compute_quote(
            "INTC",
            &series(&[Some(50.0), Some(45.0)]),
            LookbackWindow::daily(),
        );
        assert_eq!(record.change, "-10.00");

        let up = compute_quote("INTC", &series(&[Some(45.0), Some(50.0)]), LookbackWindow::daily());
        assert_eq!(up.change, "11.11");
    }

    #[test]
    fn tiny_negative_change_renders_as_unsigned_zero() {
        assert_eq!(format_fixed2(-0.001), "0.00");
        assert_eq!(format_fixed2(0.004), "0.00");
        assert_eq!(format_fixed2(-0.006), "-0.01");
    }

    #[test]
    fn long_lookback_must_span_two_sessions() {
        assert_eq!(
            LookbackWindow::with_long_lookback(1),
            Err(ValidationError::LookbackTooShort { value: 1 })
        );
        let window = LookbackWindow::with_long_lookback(10).expect("valid window");
        assert_eq!(window.sessions_required(), 10);
        assert_eq!(LookbackWindow::daily().sessions_required(), 2);
    }
}
