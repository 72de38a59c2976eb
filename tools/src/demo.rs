//! Deterministic demo tenant, for running the engine without a record file.
//!
//! Same seed, same records: every draw comes from a single Pcg64Mcg
//! stream seeded from the --seed value. Nothing reads the clock;
//! dates count back from the `today` the caller passes.

use chrono::{Duration, NaiveDate};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;
use shopinsight_core::records::{
    DebtKind, DebtRecord, DebtStatus, InventoryItem, OrderRecord, OrderStatus, SaleRecord,
    TenantRecords,
};

struct CatalogEntry {
    product:    &'static str,
    category:   &'static str,
    unit_cost:  f64,
    unit_price: f64,
}

const CATALOG: [CatalogEntry; 6] = [
    CatalogEntry { product: "Basmati Rice 5kg",   category: "Food",        unit_cost: 410.0, unit_price: 495.0 },
    CatalogEntry { product: "Sunflower Oil 1L",   category: "Food",        unit_cost: 130.0, unit_price: 155.0 },
    CatalogEntry { product: "Cotton T-Shirt",     category: "Clothing",    unit_cost: 180.0, unit_price: 349.0 },
    CatalogEntry { product: "USB-C Cable",        category: "Electronics", unit_cost: 90.0,  unit_price: 249.0 },
    CatalogEntry { product: "Steel Water Bottle", category: "Accessories", unit_cost: 220.0, unit_price: 399.0 },
    CatalogEntry { product: "Notebook A5",        category: "Other",       unit_cost: 35.0,  unit_price: 60.0 },
];

const CUSTOMERS: [&str; 6] = [
    "Asha Traders",
    "Mehta & Sons",
    "R. Iyer",
    "Green Leaf Cafe",
    "K. Fernandes",
    "Northside Hostel",
];

/// Build `days` days of history ending on `today`.
pub fn generate_tenant(tenant_id: &str, seed: u64, today: NaiveDate, days: u32) -> TenantRecords {
    let mut rng = Pcg64Mcg::seed_from_u64(seed);
    let mut records = TenantRecords::new(tenant_id);

    for offset in (0..days).rev() {
        let date = today - Duration::days(i64::from(offset));
        // Roughly one day in five has no sales at all.
        if rng.gen_bool(0.2) {
            continue;
        }
        let sales_today: u32 = rng.gen_range(1..=4);
        for _ in 0..sales_today {
            let entry = &CATALOG[rng.gen_range(0..CATALOG.len())];
            let mut sale = SaleRecord::new(
                date,
                entry.product,
                rng.gen_range(1..=5),
                entry.unit_cost,
                entry.unit_price,
            );
            if rng.gen_bool(0.5) {
                sale = sale.with_customer(CUSTOMERS[rng.gen_range(0..CUSTOMERS.len())]);
            }
            records.sales.push(sale);
        }
    }

    for entry in &CATALOG {
        records.inventory.push(InventoryItem::new(
            entry.product,
            entry.category,
            rng.gen_range(0..40),
            entry.unit_cost,
            10,
        ));
    }

    for _ in 0..8 {
        let status = match rng.gen_range(0..3) {
            0 => OrderStatus::Pending,
            1 => OrderStatus::Completed,
            _ => OrderStatus::Cancelled,
        };
        records.orders.push(OrderRecord::new(
            CUSTOMERS[rng.gen_range(0..CUSTOMERS.len())],
            cents(rng.gen_range(500.0..5_000.0)),
            today + Duration::days(rng.gen_range(-20..20)),
            status,
        ));
    }

    for _ in 0..6 {
        let kind = if rng.gen_bool(0.6) { DebtKind::Receivable } else { DebtKind::Payable };
        let status = if rng.gen_bool(0.7) { DebtStatus::Outstanding } else { DebtStatus::Paid };
        records.debts.push(DebtRecord::new(
            kind,
            CUSTOMERS[rng.gen_range(0..CUSTOMERS.len())],
            cents(rng.gen_range(1_000.0..20_000.0)),
            today + Duration::days(rng.gen_range(-25..5)),
            status,
        ));
    }

    records
}

fn cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
