//! Metric aggregator: scalar KPIs for one tenant over one window.
//!
//! Pure. Inputs are the tenant's records and a resolved Window; the
//! output is a fresh KpiSnapshot. Empty inputs give an all-zero
//! snapshot, never an error.
//!
//! Sign convention: pending receivables are uncollected cash, so they
//! reduce net_position. The debt-alert rule compares the same
//! pending_receivables figure against revenue.

use crate::{
    error::EngineResult,
    records::{DebtKind, OrderStatus, TenantRecords},
    types::Amount,
    window::{Window, WindowedRecords},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KpiSnapshot {
    pub total_revenue:        Amount,
    pub total_cost:           Amount,
    pub total_profit:         Amount,
    /// total_profit / total_revenue, or 0 when there is no revenue.
    pub profit_margin:        f64,
    pub inventory_value:      Amount,
    pub pending_orders_value: Amount,
    pub pending_receivables:  Amount,
    pub pending_payables:     Amount,
    /// total_revenue − pending_receivables
    pub net_position:         Amount,
    pub sales_count:          usize,
}

impl KpiSnapshot {
    pub const METRIC_NAMES: [&'static str; 10] = [
        "total_revenue",
        "total_cost",
        "total_profit",
        "profit_margin",
        "inventory_value",
        "pending_orders_value",
        "pending_receivables",
        "pending_payables",
        "net_position",
        "sales_count",
    ];

    /// Look a metric up by name.
    pub fn get(&self, name: &str) -> Option<f64> {
        let value = match name {
            "total_revenue"        => self.total_revenue,
            "total_cost"           => self.total_cost,
            "total_profit"         => self.total_profit,
            "profit_margin"        => self.profit_margin,
            "inventory_value"      => self.inventory_value,
            "pending_orders_value" => self.pending_orders_value,
            "pending_receivables"  => self.pending_receivables,
            "pending_payables"     => self.pending_payables,
            "net_position"         => self.net_position,
            "sales_count"          => self.sales_count as f64,
            _ => return None,
        };
        Some(value)
    }

    /// The snapshot as a name → value mapping, for shells that render
    /// metrics generically.
    pub fn as_map(&self) -> BTreeMap<&'static str, f64> {
        Self::METRIC_NAMES
            .iter()
            .filter_map(|&name| self.get(name).map(|value| (name, value)))
            .collect()
    }
}

/// Validate the tenant's records, filter them to `window`, aggregate.
pub fn compute_kpis(records: &TenantRecords, window: &Window) -> EngineResult<KpiSnapshot> {
    records.validate()?;
    Ok(aggregate(&WindowedRecords::select(records, window)))
}

/// Aggregate an already-filtered view. Assumes validated records.
pub fn aggregate(view: &WindowedRecords<'_>) -> KpiSnapshot {
    let mut kpis = KpiSnapshot {
        sales_count: view.sales.len(),
        ..KpiSnapshot::default()
    };

    for sale in &view.sales {
        kpis.total_revenue += sale.revenue();
        kpis.total_cost += sale.cost();
        kpis.total_profit += sale.profit();
    }
    kpis.profit_margin = ratio(kpis.total_profit, kpis.total_revenue);

    kpis.inventory_value = view.inventory.iter().map(|item| item.value()).sum();

    kpis.pending_orders_value = view
        .orders
        .iter()
        .filter(|o| o.status == OrderStatus::Pending)
        .map(|o| o.amount)
        .sum();

    for debt in view.debts.iter().filter(|d| d.is_outstanding()) {
        match debt.kind {
            DebtKind::Receivable => kpis.pending_receivables += debt.amount,
            DebtKind::Payable    => kpis.pending_payables += debt.amount,
        }
    }

    kpis.net_position = kpis.total_revenue - kpis.pending_receivables;

    log::debug!(
        "kpis: revenue={:.2} profit={:.2} margin={:.3} sales={}",
        kpis.total_revenue,
        kpis.total_profit,
        kpis.profit_margin,
        kpis.sales_count,
    );

    kpis
}

/// numerator / denominator, or 0 when the denominator is not positive.
pub(crate) fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}
