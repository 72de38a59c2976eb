//! Per-product, per-weekday and per-status breakdowns behind the
//! dashboard's detail tables.

use crate::{
    metrics::ratio,
    records::{DebtKind, DebtRecord, InventoryItem, OrderRecord, OrderStatus, SaleRecord},
    types::Amount,
};
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Outstanding items due within this many days count as due soon.
pub const DUE_SOON_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPerformance {
    pub product:  String,
    pub quantity: u64,
    pub revenue:  Amount,
    pub profit:   Amount,
    /// profit / revenue, or 0 for a product sold at zero price.
    pub margin:   f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekdayRevenue {
    pub weekday:    String,
    pub revenue:    Amount,
    pub sale_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventorySummary {
    pub total_items:        usize,
    pub total_value:        Amount,
    pub low_stock_count:    usize,
    pub out_of_stock_count: usize,
    pub value_by_category:  BTreeMap<String, Amount>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DebtSummary {
    pub pending_receivables: Amount,
    pub pending_payables:    Amount,
    pub total_receivables:   Amount,
    pub total_payables:      Amount,
    pub overdue_count:       usize,
    pub due_soon_count:      usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub total:           usize,
    pub pending_count:   usize,
    pub completed_count: usize,
    pub cancelled_count: usize,
    pub pending_value:   Amount,
    pub overdue_count:   usize,
}

/// Per-product totals, highest revenue first; ties by product name.
pub fn product_performance<'a, I>(sales: I) -> Vec<ProductPerformance>
where
    I: IntoIterator<Item = &'a SaleRecord>,
{
    let mut by_product: BTreeMap<&str, (u64, Amount, Amount)> = BTreeMap::new();
    for sale in sales {
        let entry = by_product.entry(sale.product.as_str()).or_insert((0, 0.0, 0.0));
        entry.0 += u64::from(sale.quantity);
        entry.1 += sale.revenue();
        entry.2 += sale.profit();
    }

    let mut rows: Vec<ProductPerformance> = by_product
        .into_iter()
        .map(|(product, (quantity, revenue, profit))| ProductPerformance {
            product: product.to_string(),
            quantity,
            revenue,
            profit,
            margin: ratio(profit, revenue),
        })
        .collect();

    // BTreeMap order is by name, and the sort is stable.
    rows.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
    rows
}

/// Revenue per weekday, Monday first. All seven days are present.
pub fn weekday_distribution<'a, I>(sales: I) -> Vec<WeekdayRevenue>
where
    I: IntoIterator<Item = &'a SaleRecord>,
{
    let mut totals = [(0.0f64, 0usize); 7];
    for sale in sales {
        let slot = &mut totals[sale.date.weekday().num_days_from_monday() as usize];
        slot.0 += sale.revenue();
        slot.1 += 1;
    }

    WEEK.iter()
        .zip(totals)
        .map(|(&day, (revenue, sale_count))| WeekdayRevenue {
            weekday: weekday_name(day).to_string(),
            revenue,
            sale_count,
        })
        .collect()
}

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

pub fn inventory_summary(items: &[InventoryItem]) -> InventorySummary {
    let mut summary = InventorySummary {
        total_items: items.len(),
        ..InventorySummary::default()
    };
    for item in items {
        let value = item.value();
        summary.total_value += value;
        *summary.value_by_category.entry(item.category.clone()).or_insert(0.0) += value;
        if item.is_low_stock() {
            summary.low_stock_count += 1;
        }
        if item.is_out_of_stock() {
            summary.out_of_stock_count += 1;
        }
    }
    summary
}

/// Debt position as of `today`. Covers every record, not just a window:
/// an overdue debt from last quarter is still overdue.
pub fn debt_summary(debts: &[DebtRecord], today: NaiveDate) -> DebtSummary {
    let mut summary = DebtSummary::default();
    for debt in debts {
        match debt.kind {
            DebtKind::Receivable => summary.total_receivables += debt.amount,
            DebtKind::Payable    => summary.total_payables += debt.amount,
        }
        if !debt.is_outstanding() {
            continue;
        }
        match debt.kind {
            DebtKind::Receivable => summary.pending_receivables += debt.amount,
            DebtKind::Payable    => summary.pending_payables += debt.amount,
        }
        match due_status(debt.due_date, today) {
            DueStatus::Overdue => summary.overdue_count += 1,
            DueStatus::DueSoon => summary.due_soon_count += 1,
            DueStatus::Later   => {}
        }
    }
    summary
}

pub fn order_summary(orders: &[OrderRecord], today: NaiveDate) -> OrderSummary {
    let mut summary = OrderSummary {
        total: orders.len(),
        ..OrderSummary::default()
    };
    for order in orders {
        match order.status {
            OrderStatus::Pending => {
                summary.pending_count += 1;
                summary.pending_value += order.amount;
                if due_status(order.due_date, today) == DueStatus::Overdue {
                    summary.overdue_count += 1;
                }
            }
            OrderStatus::Completed => summary.completed_count += 1,
            OrderStatus::Cancelled => summary.cancelled_count += 1,
        }
    }
    summary
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DueStatus {
    Overdue,
    DueSoon,
    Later,
}

fn due_status(due_date: NaiveDate, today: NaiveDate) -> DueStatus {
    match (due_date - today).num_days() {
        days if days < 0              => DueStatus::Overdue,
        days if days <= DUE_SOON_DAYS => DueStatus::DueSoon,
        _                             => DueStatus::Later,
    }
}
