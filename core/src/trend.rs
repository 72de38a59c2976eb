//! Trend estimator: daily buckets, averages, a linear projection.
//!
//! Buckets are dense over the window's DayRange. A day with no sales
//! is a zero bucket, so a sparse history does not bias the averages
//! upward. The projection is daily_average × days in the month of
//! the range's last day: a heuristic, not a forecast.

use crate::{
    config::InsightConfig,
    metrics::ratio,
    records::SaleRecord,
    types::{Amount, DayCount},
    window::DayRange,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How many trailing buckets make up the recent average.
pub const RECENT_BUCKETS: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Up,
    Down,
    Flat,
}

impl TrendDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            TrendDirection::Up   => "up",
            TrendDirection::Down => "down",
            TrendDirection::Flat => "flat",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyBucket {
    pub date:    NaiveDate,
    pub revenue: Amount,
    pub profit:  Amount,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendReport {
    pub window_days:              DayCount,
    pub total_revenue:            Amount,
    pub daily_average:            Amount,
    pub recent_7day_average:      Amount,
    pub trend_direction:          TrendDirection,
    pub projected_period_revenue: Amount,
    pub buckets:                  Vec<DailyBucket>,
}

/// Revenue and profit per calendar day over `range`, zero-filled.
/// Sales dated outside the range are ignored.
pub fn daily_buckets<'a, I>(sales: I, range: &DayRange) -> Vec<DailyBucket>
where
    I: IntoIterator<Item = &'a SaleRecord>,
{
    let mut by_day: BTreeMap<NaiveDate, (Amount, Amount)> = BTreeMap::new();
    for sale in sales.into_iter().filter(|s| range.contains(s.date)) {
        let entry = by_day.entry(sale.date).or_insert((0.0, 0.0));
        entry.0 += sale.revenue();
        entry.1 += sale.profit();
    }

    range
        .days()
        .map(|date| {
            let (revenue, profit) = by_day.get(&date).copied().unwrap_or((0.0, 0.0));
            DailyBucket { date, revenue, profit }
        })
        .collect()
}

pub fn estimate_trend<'a, I>(sales: I, range: &DayRange, config: &InsightConfig) -> TrendReport
where
    I: IntoIterator<Item = &'a SaleRecord>,
{
    let buckets = daily_buckets(sales, range);
    let window_days = range.len_days();
    let total_revenue: Amount = buckets.iter().map(|b| b.revenue).sum();

    if total_revenue <= 0.0 {
        return TrendReport {
            window_days,
            total_revenue: 0.0,
            daily_average: 0.0,
            recent_7day_average: 0.0,
            trend_direction: TrendDirection::Flat,
            projected_period_revenue: 0.0,
            buckets,
        };
    }

    let daily_average = ratio(total_revenue, f64::from(window_days.max(1)));

    let recent = &buckets[buckets.len().saturating_sub(RECENT_BUCKETS)..];
    let recent_7day_average = ratio(
        recent.iter().map(|b| b.revenue).sum(),
        recent.len() as f64,
    );

    let trend_direction = classify(recent_7day_average, daily_average, config);
    let projected_period_revenue = daily_average * f64::from(range.days_in_last_month());

    log::debug!(
        "trend: days={window_days} daily_avg={daily_average:.2} recent_avg={recent_7day_average:.2} direction={}",
        trend_direction.as_str(),
    );

    TrendReport {
        window_days,
        total_revenue,
        daily_average,
        recent_7day_average,
        trend_direction,
        projected_period_revenue,
        buckets,
    }
}

/// The hysteresis band keeps small day-to-day noise reading as flat.
fn classify(recent: f64, baseline: f64, config: &InsightConfig) -> TrendDirection {
    if baseline <= 0.0 {
        TrendDirection::Flat
    } else if recent > baseline * config.trend_up_factor {
        TrendDirection::Up
    } else if recent < baseline * config.trend_down_factor {
        TrendDirection::Down
    } else {
        TrendDirection::Flat
    }
}

/// Running revenue total, one point per bucket.
pub fn cumulative_revenue(buckets: &[DailyBucket]) -> Vec<(NaiveDate, Amount)> {
    buckets
        .iter()
        .scan(0.0, |running, bucket| {
            *running += bucket.revenue;
            Some((bucket.date, *running))
        })
        .collect()
}
