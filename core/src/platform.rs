//! Platform overview: cross-tenant totals for the operator's admin view.
//!
//! Takes every tenant's records explicitly; tenants stay isolated, the
//! overview only ever sums them. Unlike the per-tenant engine this is
//! all-time: no window is applied.

use crate::{
    error::EngineResult,
    records::TenantRecords,
    types::{Amount, TenantId},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantRevenue {
    pub tenant_id:  TenantId,
    pub revenue:    Amount,
    pub sale_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlatformOverview {
    pub business_count:      usize,
    pub total_sales_records: usize,
    pub platform_revenue:    Amount,
    /// Highest revenue first; ties by tenant id.
    pub top_businesses:      Vec<TenantRevenue>,
    /// Sparse: only days with at least one sale, oldest first.
    pub daily_revenue:       Vec<(NaiveDate, Amount)>,
}

/// Every tenant is validated first; the first bad record fails the
/// whole overview, with the tenant id in the error location.
pub fn platform_overview(tenants: &[TenantRecords], top_n: usize) -> EngineResult<PlatformOverview> {
    for tenant in tenants {
        tenant
            .validate()
            .map_err(|e| e.within(&format!("tenant[{}]", tenant.tenant_id)))?;
    }

    let mut per_tenant: Vec<TenantRevenue> = tenants
        .iter()
        .map(|t| TenantRevenue {
            tenant_id:  t.tenant_id.clone(),
            revenue:    t.sales.iter().map(|s| s.revenue()).sum(),
            sale_count: t.sales.len(),
        })
        .collect();

    let mut daily: BTreeMap<NaiveDate, Amount> = BTreeMap::new();
    for sale in tenants.iter().flat_map(|t| &t.sales) {
        *daily.entry(sale.date).or_insert(0.0) += sale.revenue();
    }

    let total_sales_records: usize = per_tenant.iter().map(|t| t.sale_count).sum();
    let platform_revenue: Amount = per_tenant.iter().map(|t| t.revenue).sum();

    per_tenant.sort_by(|a, b| {
        b.revenue
            .total_cmp(&a.revenue)
            .then_with(|| a.tenant_id.cmp(&b.tenant_id))
    });
    per_tenant.truncate(top_n);

    log::debug!(
        "platform: businesses={} sales={} revenue={platform_revenue:.2}",
        tenants.len(),
        total_sales_records,
    );

    Ok(PlatformOverview {
        business_count: tenants.len(),
        total_sales_records,
        platform_revenue,
        top_businesses: per_tenant,
        daily_revenue: daily.into_iter().collect(),
    })
}
