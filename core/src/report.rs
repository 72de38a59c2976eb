//! Dashboard report: the complete output of one engine evaluation.
//!
//! Freshly built on every call and owned by the caller. Serializes to
//! JSON for shells that render out of process.

use crate::{
    breakdowns::{DebtSummary, InventorySummary, OrderSummary, ProductPerformance, WeekdayRevenue},
    error::EngineResult,
    metrics::KpiSnapshot,
    rules::{Insight, Severity},
    trend::TrendReport,
    types::TenantId,
    window::{DayRange, Window},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakdowns {
    pub products:  Vec<ProductPerformance>,
    pub weekdays:  Vec<WeekdayRevenue>,
    pub inventory: InventorySummary,
    pub debts:     DebtSummary,
    pub orders:    OrderSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardReport {
    pub tenant_id:  TenantId,
    pub today:      NaiveDate,
    pub window:     Window,
    /// The dense day range the trend was bucketed over.
    pub period:     DayRange,
    pub kpis:       KpiSnapshot,
    pub trend:      TrendReport,
    /// Ranked: most severe first.
    pub insights:   Vec<Insight>,
    pub breakdowns: Breakdowns,
}

impl DashboardReport {
    pub fn to_json(&self) -> EngineResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> EngineResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn count_by_severity(&self, severity: Severity) -> usize {
        self.insights.iter().filter(|i| i.severity == severity).count()
    }

    /// The most severe insight, if any fired.
    pub fn headline(&self) -> Option<&Insight> {
        self.insights.first()
    }
}
