//! Date windows: which records a dashboard render looks at.
//!
//! A WindowSpec is what the caller asks for ("last 30 days").
//! It resolves against an explicit `today` into a Window (the date
//! filter) and a DayRange (the dense calendar the trend estimator
//! buckets over). Nothing here reads the system clock.

use crate::{
    error::{EngineError, EngineResult},
    records::{normalize_label, DebtRecord, InventoryItem, OrderRecord, SaleRecord, TenantRecords},
    types::DayCount,
};
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowPreset {
    Last7Days,
    Last30Days,
    Last90Days,
    AllTime,
}

impl WindowPreset {
    /// Length in calendar days, or None for all time.
    pub fn days(self) -> Option<DayCount> {
        match self {
            WindowPreset::Last7Days  => Some(7),
            WindowPreset::Last30Days => Some(30),
            WindowPreset::Last90Days => Some(90),
            WindowPreset::AllTime    => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WindowPreset::Last7Days  => "Last 7 Days",
            WindowPreset::Last30Days => "Last 30 Days",
            WindowPreset::Last90Days => "Last 90 Days",
            WindowPreset::AllTime    => "All Time",
        }
    }
}

impl FromStr for WindowPreset {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "7" | "7d" | "last_7_days"    => Ok(WindowPreset::Last7Days),
            "30" | "30d" | "last_30_days" => Ok(WindowPreset::Last30Days),
            "90" | "90d" | "last_90_days" => Ok(WindowPreset::Last90Days),
            "all" | "all_time"            => Ok(WindowPreset::AllTime),
            _ => Err(EngineError::invalid("period", format!("unknown window preset '{s}'"))),
        }
    }
}

/// What the caller asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowSpec {
    Preset(WindowPreset),
    /// Inclusive on both ends.
    Range { start: NaiveDate, end: NaiveDate },
}

impl From<WindowPreset> for WindowSpec {
    fn from(preset: WindowPreset) -> Self {
        WindowSpec::Preset(preset)
    }
}

impl WindowSpec {
    /// Resolve against `today`. `Last N days` covers N calendar days
    /// ending on and including `today`.
    pub fn resolve(self, today: NaiveDate) -> EngineResult<Window> {
        match self {
            WindowSpec::Preset(preset) => Ok(match preset.days() {
                Some(days) => Window {
                    start: Some(today - Duration::days(i64::from(days) - 1)),
                    end:   Some(today),
                },
                None => Window::all_time(),
            }),
            WindowSpec::Range { start, end } => Window::between(start, end),
        }
    }
}

/// A resolved date filter. Either bound may be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub start: Option<NaiveDate>,
    pub end:   Option<NaiveDate>,
}

impl Window {
    pub fn all_time() -> Self {
        Self { start: None, end: None }
    }

    pub fn between(start: NaiveDate, end: NaiveDate) -> EngineResult<Self> {
        if start > end {
            return Err(EngineError::invalid(
                "window",
                format!("start {start} is after end {end}"),
            ));
        }
        Ok(Self { start: Some(start), end: Some(end) })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |s| date >= s) && self.end.map_or(true, |e| date <= e)
    }

    /// The calendar the trend estimator buckets over. Open bounds close
    /// on the data: the earliest supplied date for the start, the later
    /// of `today` and the latest date for the end. With no dates at all
    /// an open window collapses to the single day `today`.
    pub fn day_range<I>(&self, dates: I, today: NaiveDate) -> DayRange
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        let (mut earliest, mut latest) = (None::<NaiveDate>, None::<NaiveDate>);
        for date in dates {
            earliest = Some(earliest.map_or(date, |e| e.min(date)));
            latest = Some(latest.map_or(date, |l| l.max(date)));
        }

        let last = self
            .end
            .unwrap_or_else(|| latest.map_or(today, |l| l.max(today)));
        let first = self.start.or(earliest).unwrap_or(last);

        DayRange {
            first: first.min(last),
            last,
        }
    }
}

/// A dense, inclusive run of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRange {
    pub first: NaiveDate,
    pub last:  NaiveDate,
}

impl DayRange {
    pub fn new(first: NaiveDate, last: NaiveDate) -> EngineResult<Self> {
        if first > last {
            return Err(EngineError::invalid(
                "day_range",
                format!("first {first} is after last {last}"),
            ));
        }
        Ok(Self { first, last })
    }

    /// Inclusive day count; never 0.
    pub fn len_days(&self) -> DayCount {
        let span = (self.last - self.first).num_days().max(0) + 1;
        DayCount::try_from(span).unwrap_or(DayCount::MAX)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.first && date <= self.last
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        self.first.iter_days().take(self.len_days() as usize)
    }

    /// Days in the calendar month of the range's last day.
    pub fn days_in_last_month(&self) -> DayCount {
        days_in_month(self.last)
    }
}

pub fn days_in_month(date: NaiveDate) -> DayCount {
    let (year, month) = (date.year(), date.month());
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        .map_or(30, |last_of_month| last_of_month.day())
}

/// Borrowed view of a tenant's records after the window filter.
/// Inventory is a point-in-time snapshot and is never filtered.
#[derive(Debug, Clone)]
pub struct WindowedRecords<'a> {
    pub sales:     Vec<&'a SaleRecord>,
    pub inventory: &'a [InventoryItem],
    pub orders:    Vec<&'a OrderRecord>,
    pub debts:     Vec<&'a DebtRecord>,
}

impl<'a> WindowedRecords<'a> {
    pub fn select(records: &'a TenantRecords, window: &Window) -> Self {
        Self {
            sales:     records.sales.iter().filter(|s| window.contains(s.date)).collect(),
            inventory: &records.inventory,
            orders:    records.orders.iter().filter(|o| window.contains(o.due_date)).collect(),
            debts:     records.debts.iter().filter(|d| window.contains(d.due_date)).collect(),
        }
    }
}
