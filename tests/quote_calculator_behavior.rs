//! Behavior-driven tests for the quote delta calculator.
//!
//! These tests describe what the ticker sees for a given close series: the
//! formatted price, the day-over-day change and the optional long change.

use tickerpulse_core::{
    compute_quote, format_fixed2, percent_change, LookbackWindow, PricePoint, QuoteRecord,
    TimeSeries,
};

fn series(closes: &[Option<f64>]) -> TimeSeries {
    TimeSeries::from_closes(closes.iter().copied())
}

// =============================================================================
// Day-over-day change
// =============================================================================

#[test]
fn when_a_session_has_no_close_the_previous_traded_close_is_used() {
    // Given: a series with a halted session between two closes
    let closes = series(&[Some(100.0), None, Some(105.0)]);

    // When: the quote is computed
    let record = compute_quote("AAPL", &closes, LookbackWindow::daily());

    // Then: the change compares against the last traded close
    assert_eq!(record.price, "105.00");
    assert_eq!(record.change, "5.00");
    assert_eq!(record.five_day_change, None);
}

#[test]
fn when_fewer_than_two_closes_exist_the_record_is_zeroed() {
    // Given: series without two usable closes
    let cases = [
        series(&[None, None]),
        series(&[Some(101.5)]),
        TimeSeries::empty(),
    ];

    for closes in &cases {
        // When / Then: the default record is served
        let record = compute_quote("AAPL", closes, LookbackWindow::daily());
        assert_eq!(record, QuoteRecord::unavailable("AAPL", false));
        assert_eq!(record.price, "0.00");
        assert_eq!(record.change, "0.00");
    }
}

#[test]
fn when_the_price_falls_the_change_is_negative() {
    let record = compute_quote("MSFT", &series(&[Some(50.0), Some(45.0)]), LookbackWindow::daily());

    assert_eq!(record.price, "45.00");
    assert_eq!(record.change, "-10.00");
}

#[test]
fn when_the_previous_close_is_zero_no_change_is_invented() {
    let record = compute_quote("PENNY", &series(&[Some(0.0), Some(0.5)]), LookbackWindow::daily());

    assert_eq!(record, QuoteRecord::unavailable("PENNY", false));
}

// =============================================================================
// Five-session change
// =============================================================================

#[test]
fn when_five_sessions_are_available_both_changes_are_reported() {
    // Given: five consecutive closes
    let closes = series(&[Some(90.0), Some(95.0), Some(98.0), Some(102.0), Some(105.0)]);

    // When: the quote uses the five-session window
    let record = compute_quote("AAPL", &closes, LookbackWindow::five_day());

    // Then: change is 105 vs 102 and the long change is 105 vs 90
    assert_eq!(record.change, "2.94");
    assert_eq!(record.five_day_change.as_deref(), Some("16.67"));
}

#[test]
fn when_the_long_window_cannot_be_filled_every_figure_is_zeroed() {
    // Given: only three sessions for a five-session window
    let closes = series(&[Some(100.0), None, Some(105.0)]);

    // When
    let record = compute_quote("AAPL", &closes, LookbackWindow::five_day());

    // Then: the consumer gets the full default shape
    assert_eq!(record, QuoteRecord::unavailable("AAPL", true));
    assert_eq!(record.five_day_change.as_deref(), Some("0.00"));
}

#[test]
fn when_the_window_length_is_configurable_it_is_validated() {
    assert!(LookbackWindow::with_long_lookback(1).is_err());

    let window = LookbackWindow::with_long_lookback(3).expect("valid window");
    let closes = series(&[Some(90.0), Some(95.0), Some(98.0), Some(102.0), Some(105.0)]);
    let record = compute_quote("AAPL", &closes, window);

    assert_eq!(window.sessions_required(), 3);
    // 105 vs 98
    assert_eq!(record.five_day_change.as_deref(), Some("7.14"));
}

// =============================================================================
// Determinism and provider ordering
// =============================================================================

#[test]
fn when_the_provider_lists_sessions_newest_first_the_result_is_unchanged() {
    // Given: the same sessions in both orders
    let closes = [90.0, 95.0, 98.0, 102.0, 105.0];
    let ascending: Vec<PricePoint> = closes
        .iter()
        .enumerate()
        .map(|(day, close)| PricePoint::new(1_700_000_000 + day as i64 * 86_400, Some(*close)))
        .collect();
    let mut descending = ascending.clone();
    descending.reverse();

    // When
    let forward = compute_quote("AAPL", &TimeSeries::new(ascending), LookbackWindow::five_day());
    let backward = compute_quote("AAPL", &TimeSeries::new(descending), LookbackWindow::five_day());

    // Then
    assert_eq!(forward, backward);
}

#[test]
fn when_computed_twice_the_same_record_is_produced() {
    let closes = series(&[Some(12.34), Some(12.56), None, Some(12.01)]);

    let first = compute_quote("F", &closes, LookbackWindow::daily());
    let second = compute_quote("F", &closes, LookbackWindow::daily());

    assert_eq!(first, second);
}

#[test]
fn when_formatting_figures_two_decimals_are_always_shown() {
    assert_eq!(format_fixed2(5.0), "5.00");
    assert_eq!(format_fixed2(2.941_176), "2.94");
    assert_eq!(format_fixed2(-0.001), "0.00");
    assert_eq!(percent_change(105.0, 100.0), Some(5.0));
    assert_eq!(percent_change(1.0, 0.0), None);
}

#[test]
fn when_serialized_the_record_uses_the_consumer_field_names() {
    let closes = series(&[Some(90.0), Some(95.0), Some(98.0), Some(102.0), Some(105.0)]);
    let record = compute_quote("AAPL", &closes, LookbackWindow::five_day());

    let json = serde_json::to_value(&record).expect("record serializes");

    assert_eq!(
        json,
        serde_json::json!({
            "symbol": "AAPL",
            "price": "105.00",
            "change": "2.94",
            "fiveDayChange": "16.67"
        })
    );

    let daily = compute_quote("AAPL", &closes, LookbackWindow::daily());
    let json = serde_json::to_value(&daily).expect("record serializes");
    assert!(json.get("fiveDayChange").is_none());
}
