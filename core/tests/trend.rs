//! Trend estimator tests.

use chrono::NaiveDate;
use shopinsight_core::{
    records::SaleRecord,
    trend::{cumulative_revenue, daily_buckets, estimate_trend, TrendDirection},
    window::DayRange,
    InsightConfig,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn march() -> DayRange {
    DayRange::new(d(2024, 3, 1), d(2024, 3, 30)).unwrap()
}

/// One 100.00 sale on each listed day of March 2024.
fn daily_sales(days: impl IntoIterator<Item = u32>) -> Vec<SaleRecord> {
    days.into_iter()
        .map(|day| SaleRecord::new(d(2024, 3, day), "Coffee", 1, 40.0, 100.0))
        .collect()
}

#[test]
fn no_sales_is_flat_with_zero_projection() {
    let sales: Vec<SaleRecord> = Vec::new();

    let trend = estimate_trend(&sales, &march(), &InsightConfig::default());

    assert_eq!(trend.window_days, 30);
    assert_eq!(trend.trend_direction, TrendDirection::Flat);
    assert_eq!(trend.daily_average, 0.0);
    assert_eq!(trend.recent_7day_average, 0.0);
    assert_eq!(trend.projected_period_revenue, 0.0);
    assert_eq!(trend.buckets.len(), 30, "buckets stay dense even with no sales");
}

#[test]
fn steady_sales_are_flat() {
    let sales = daily_sales(1..=30);

    let trend = estimate_trend(&sales, &march(), &InsightConfig::default());

    assert_eq!(trend.trend_direction, TrendDirection::Flat);
    assert!((trend.daily_average - 100.0).abs() < 1e-9);
    assert!((trend.recent_7day_average - 100.0).abs() < 1e-9);
    // March has 31 days.
    assert!(
        (trend.projected_period_revenue - 3100.0).abs() < 1e-9,
        "projection {}",
        trend.projected_period_revenue
    );
}

#[test]
fn late_burst_reads_as_up() {
    let sales = daily_sales(24..=30);

    let trend = estimate_trend(&sales, &march(), &InsightConfig::default());

    assert_eq!(trend.trend_direction, TrendDirection::Up);
    assert!(trend.recent_7day_average > trend.daily_average);
}

#[test]
fn quiet_last_week_reads_as_down() {
    let sales = daily_sales(1..=23);

    let trend = estimate_trend(&sales, &march(), &InsightConfig::default());

    assert_eq!(trend.trend_direction, TrendDirection::Down);
    assert_eq!(trend.recent_7day_average, 0.0);
}

/// A recent average inside the band stays flat.
#[test]
fn band_absorbs_small_moves() {
    // 25 days at 100, the last five at 105: recent avg ~103.6 vs daily ~100.8.
    let mut sales = daily_sales(1..=25);
    sales.extend((26..=30).map(|day| SaleRecord::new(d(2024, 3, day), "Coffee", 1, 40.0, 105.0)));

    let trend = estimate_trend(&sales, &march(), &InsightConfig::default());

    assert_eq!(trend.trend_direction, TrendDirection::Flat);
}

#[test]
fn daily_average_times_days_equals_total() {
    let sales = daily_sales([2, 3, 5, 8, 13, 21]);
    let range = march();

    let trend = estimate_trend(&sales, &range, &InsightConfig::default());

    let rebuilt = trend.daily_average * f64::from(trend.window_days);
    assert!(
        (rebuilt - trend.total_revenue).abs() < 1e-6,
        "daily_average × days = {rebuilt}, total = {}",
        trend.total_revenue
    );
}

#[test]
fn estimate_is_idempotent() {
    let sales = daily_sales([1, 9, 17, 29]);
    let config = InsightConfig::default();

    let first = estimate_trend(&sales, &march(), &config);
    let second = estimate_trend(&sales, &march(), &config);

    assert_eq!(first, second);
}

/// Windows shorter than a week average over the days they have.
#[test]
fn short_window_uses_every_bucket() {
    let range = DayRange::new(d(2024, 3, 1), d(2024, 3, 3)).unwrap();
    let sales = daily_sales([1, 2, 3]);

    let trend = estimate_trend(&sales, &range, &InsightConfig::default());

    assert_eq!(trend.buckets.len(), 3);
    assert!((trend.recent_7day_average - 100.0).abs() < 1e-9);
    assert_eq!(trend.trend_direction, TrendDirection::Flat);
}

#[test]
fn buckets_are_zero_filled_and_cumulative_is_monotone() {
    let sales = daily_sales([3, 3, 10]);
    let buckets = daily_buckets(&sales, &march());

    assert_eq!(buckets.len(), 30);
    assert_eq!(buckets[0].revenue, 0.0);
    assert_eq!(buckets[2].revenue, 200.0, "same-day sales share one bucket");
    assert_eq!(buckets[2].profit, 120.0);

    let running = cumulative_revenue(&buckets);
    assert!(running.windows(2).all(|w| w[0].1 <= w[1].1), "cumulative revenue must not decrease");
    assert_eq!(running.last().map(|p| p.1), Some(300.0));
}

/// Thresholds come from config, not constants.
#[test]
fn custom_band_changes_direction() {
    let mut sales = daily_sales(1..=25);
    sales.extend((26..=30).map(|day| SaleRecord::new(d(2024, 3, day), "Coffee", 1, 40.0, 105.0)));
    let tight = InsightConfig::default()
        .with_override("trend_up_factor", 1.01)
        .unwrap();

    let trend = estimate_trend(&sales, &march(), &tight);

    assert_eq!(trend.trend_direction, TrendDirection::Up);
}
