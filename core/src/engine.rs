//! The insight engine: one dashboard render, start to finish.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   1. Validate the tenant's records
//!   2. Resolve the window against `today`
//!   3. Metric aggregator      (metrics.rs)
//!   4. Trend estimator        (trend.rs)
//!   5. Breakdowns             (breakdowns.rs)
//!   6. Insight rule engine    (rules.rs)
//!
//! RULES:
//!   - Every stage is a pure function of its inputs.
//!   - The engine owns nothing but its config; no state survives a call.
//!   - `today` is always passed in. Nothing here reads the clock.

use crate::{
    breakdowns,
    config::InsightConfig,
    error::EngineResult,
    metrics,
    records::TenantRecords,
    report::{Breakdowns, DashboardReport},
    rules::{self, RuleContext},
    trend,
    window::{WindowSpec, WindowedRecords},
};
use chrono::NaiveDate;

#[derive(Debug, Clone, Default)]
pub struct InsightEngine {
    config: InsightConfig,
}

impl InsightEngine {
    /// Build an engine around a validated config.
    pub fn new(config: InsightConfig) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &InsightConfig {
        &self.config
    }

    /// Evaluate one tenant's records over one window.
    pub fn evaluate(
        &self,
        records: &TenantRecords,
        spec: WindowSpec,
        today: NaiveDate,
    ) -> EngineResult<DashboardReport> {
        // 1. Contract check. A bad record fails the whole render.
        records.validate().map_err(|e| {
            log::warn!("tenant={} rejected: {e}", records.tenant_id);
            e
        })?;

        // 2. Window
        let window = spec.resolve(today)?;
        let view = WindowedRecords::select(records, &window);
        let period = window.day_range(view.sales.iter().map(|s| s.date), today);

        // 3. KPIs
        let kpis = metrics::aggregate(&view);

        // 4. Trend
        let trend = trend::estimate_trend(view.sales.iter().copied(), &period, &self.config);

        // 5. Breakdowns
        let breakdowns = Breakdowns {
            products:  breakdowns::product_performance(view.sales.iter().copied()),
            weekdays:  breakdowns::weekday_distribution(view.sales.iter().copied()),
            inventory: breakdowns::inventory_summary(&records.inventory),
            debts:     breakdowns::debt_summary(&records.debts, today),
            orders:    breakdowns::order_summary(&records.orders, today),
        };

        // 6. Insights
        let ctx = RuleContext {
            kpis:        &kpis,
            trend:       &trend,
            sales:       &view.sales,
            inventory:   view.inventory,
            debts:       &view.debts,
            window_days: period.len_days(),
        };
        let insights = rules::evaluate(&ctx, &self.config);

        log::info!(
            "tenant={} window={}..{} sales={} insights={}",
            records.tenant_id,
            period.first,
            period.last,
            kpis.sales_count,
            insights.len(),
        );
        for insight in &insights {
            log::debug!(
                "tenant={} insight: {} ({}) {}",
                records.tenant_id,
                insight.rule.as_str(),
                insight.severity.as_str(),
                insight.message,
            );
        }

        Ok(DashboardReport {
            tenant_id: records.tenant_id.clone(),
            today,
            window,
            period,
            kpis,
            trend,
            insights,
            breakdowns,
        })
    }
}
