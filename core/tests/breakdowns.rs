//! Breakdown tests: products, stock, debts and orders.

use chrono::NaiveDate;
use shopinsight_core::{
    breakdowns::{debt_summary, inventory_summary, order_summary, product_performance},
    records::{DebtKind, DebtRecord, DebtStatus, InventoryItem, OrderRecord, OrderStatus, SaleRecord},
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[test]
fn products_sorted_by_revenue_with_margins() {
    let sales = vec![
        SaleRecord::new(d(2024, 5, 1), "Tea", 10, 1.0, 2.0),
        SaleRecord::new(d(2024, 5, 2), "Cake", 1, 6.0, 15.0),
        SaleRecord::new(d(2024, 5, 3), "Tea", 5, 1.0, 2.0),
    ];

    let rows = product_performance(&sales);

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].product, "Tea");
    assert_eq!(rows[0].quantity, 15);
    assert_eq!(rows[0].revenue, 30.0);
    assert_eq!(rows[0].profit, 15.0);
    assert_eq!(rows[0].margin, 0.5);
    assert_eq!(rows[1].product, "Cake");
    assert_eq!(rows[1].margin, 0.6);
}

#[test]
fn inventory_counts_low_and_out_of_stock() {
    let items = vec![
        InventoryItem::new("Flour", "Baking", 0, 2.0, 5),
        InventoryItem::new("Sugar", "Baking", 5, 1.0, 5),
        InventoryItem::new("Cups", "Supplies", 100, 0.1, 20),
    ];

    let summary = inventory_summary(&items);

    assert_eq!(summary.total_items, 3);
    assert_eq!(summary.low_stock_count, 2, "at-level stock is low");
    assert_eq!(summary.out_of_stock_count, 1);
    assert!((summary.total_value - 15.0).abs() < 1e-9, "total value {}", summary.total_value);
    assert_eq!(summary.value_by_category.get("Baking"), Some(&5.0));
}

#[test]
fn debt_summary_ages_outstanding_balances() {
    let today = d(2024, 5, 10);
    let debts = vec![
        DebtRecord::new(DebtKind::Receivable, "Ada", 100.0, d(2024, 5, 1), DebtStatus::Outstanding),
        DebtRecord::new(DebtKind::Receivable, "Ben", 50.0, d(2024, 5, 14), DebtStatus::Outstanding),
        DebtRecord::new(DebtKind::Receivable, "Cy", 20.0, d(2024, 4, 1), DebtStatus::Paid),
        DebtRecord::new(DebtKind::Payable, "Mill", 70.0, d(2024, 6, 30), DebtStatus::Outstanding),
    ];

    let summary = debt_summary(&debts, today);

    assert_eq!(summary.pending_receivables, 150.0);
    assert_eq!(summary.total_receivables, 170.0);
    assert_eq!(summary.pending_payables, 70.0);
    assert_eq!(summary.overdue_count, 1, "paid debts are never overdue");
    assert_eq!(summary.due_soon_count, 1);
}

#[test]
fn order_summary_counts_by_status() {
    let today = d(2024, 5, 10);
    let orders = vec![
        OrderRecord::new("Ada", 10.0, d(2024, 5, 1), OrderStatus::Pending),
        OrderRecord::new("Ben", 15.0, d(2024, 5, 20), OrderStatus::Pending),
        OrderRecord::new("Cy", 99.0, d(2024, 5, 1), OrderStatus::Completed),
        OrderRecord::new("Di", 5.0, d(2024, 5, 1), OrderStatus::Cancelled),
    ];

    let summary = order_summary(&orders, today);

    assert_eq!(summary.total, 4);
    assert_eq!(summary.pending_count, 2);
    assert_eq!(summary.completed_count, 1);
    assert_eq!(summary.cancelled_count, 1);
    assert_eq!(summary.pending_value, 25.0);
    assert_eq!(summary.overdue_count, 1, "only pending orders can be overdue");
}
