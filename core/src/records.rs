//! Tenant business records: the engine's only input data.
//!
//! RULE: The engine never owns or mutates records. The record shell
//! loads and validates them before calling in; the engine re-checks
//! the contract with validate() and surfaces any violation as
//! InvalidInput instead of coercing it.

use crate::{
    error::{EngineError, EngineResult},
    types::{Amount, TenantId},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ── Label parsing ────────────────────────────────────────────────────────────

/// Fold a shell-supplied label ("Partially Paid", "partially-paid")
/// into the snake_case key the enums match on.
pub(crate) fn normalize_label(raw: &str) -> String {
    raw.trim()
        .to_ascii_lowercase()
        .replace(|c: char| c == ' ' || c == '-', "_")
}

/// Parse an ISO `YYYY-MM-DD` date supplied by the record shell.
pub fn parse_date(field: &str, raw: &str) -> EngineResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| EngineError::invalid(field, format!("unparseable date '{raw}': {e}")))
}

fn check_amount(field: &str, value: Amount) -> EngineResult<()> {
    if !value.is_finite() {
        return Err(EngineError::invalid(field, format!("must be finite, got {value}")));
    }
    if value < 0.0 {
        return Err(EngineError::invalid(field, format!("must be non-negative, got {value}")));
    }
    Ok(())
}

fn check_name(field: &str, value: &str) -> EngineResult<()> {
    if value.trim().is_empty() {
        return Err(EngineError::invalid(field, "must not be empty"));
    }
    Ok(())
}

// ── Status and kind enums ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum OrderStatus {
    Pending,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending   => "pending",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for OrderStatus {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "pending"                => Ok(OrderStatus::Pending),
            "completed"              => Ok(OrderStatus::Completed),
            "cancelled" | "canceled" => Ok(OrderStatus::Cancelled),
            _ => Err(EngineError::invalid("status", format!("unknown order status '{s}'"))),
        }
    }
}

impl TryFrom<String> for OrderStatus {
    type Error = EngineError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Which way the money flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum DebtKind {
    /// The counterparty owes the business.
    Receivable,
    /// The business owes the counterparty.
    Payable,
}

impl DebtKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DebtKind::Receivable => "receivable",
            DebtKind::Payable    => "payable",
        }
    }
}

impl FromStr for DebtKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // The shell's long labels look like "Receivable (They owe you)".
        let key = normalize_label(s);
        if key.starts_with("receivable") {
            Ok(DebtKind::Receivable)
        } else if key.starts_with("payable") {
            Ok(DebtKind::Payable)
        } else {
            Err(EngineError::invalid("kind", format!("unknown debt kind '{s}'")))
        }
    }
}

impl TryFrom<String> for DebtKind {
    type Error = EngineError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum DebtStatus {
    /// Not yet settled in full. Partial payments stay outstanding.
    Outstanding,
    Paid,
}

impl DebtStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DebtStatus::Outstanding => "outstanding",
            DebtStatus::Paid        => "paid",
        }
    }
}

impl FromStr for DebtStatus {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "outstanding" | "pending" | "partially_paid" | "unpaid" => Ok(DebtStatus::Outstanding),
            "paid" => Ok(DebtStatus::Paid),
            _ => Err(EngineError::invalid("status", format!("unknown debt status '{s}'"))),
        }
    }
}

impl TryFrom<String> for DebtStatus {
    type Error = EngineError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

// ── Records ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleRecord {
    pub date:       NaiveDate,
    pub product:    String,
    pub quantity:   u32,
    pub unit_cost:  Amount,
    pub unit_price: Amount,
    #[serde(default)]
    pub customer:   Option<String>,
}

impl SaleRecord {
    pub fn new(
        date: NaiveDate,
        product: impl Into<String>,
        quantity: u32,
        unit_cost: Amount,
        unit_price: Amount,
    ) -> Self {
        Self {
            date,
            product: product.into(),
            quantity,
            unit_cost,
            unit_price,
            customer: None,
        }
    }

    pub fn with_customer(mut self, customer: impl Into<String>) -> Self {
        self.customer = Some(customer.into());
        self
    }

    /// quantity × unit_price
    pub fn revenue(&self) -> Amount {
        f64::from(self.quantity) * self.unit_price
    }

    /// quantity × unit_cost
    pub fn cost(&self) -> Amount {
        f64::from(self.quantity) * self.unit_cost
    }

    /// quantity × (unit_price − unit_cost). Negative when sold below cost.
    pub fn profit(&self) -> Amount {
        f64::from(self.quantity) * (self.unit_price - self.unit_cost)
    }

    pub fn validate(&self) -> EngineResult<()> {
        check_name("product", &self.product)?;
        if self.quantity == 0 {
            return Err(EngineError::invalid("quantity", "must be at least 1"));
        }
        check_amount("unit_cost", self.unit_cost)?;
        check_amount("unit_price", self.unit_price)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub product:          String,
    pub category:         String,
    pub quantity_on_hand: u32,
    pub unit_cost:        Amount,
    pub reorder_level:    u32,
}

impl InventoryItem {
    pub fn new(
        product: impl Into<String>,
        category: impl Into<String>,
        quantity_on_hand: u32,
        unit_cost: Amount,
        reorder_level: u32,
    ) -> Self {
        Self {
            product: product.into(),
            category: category.into(),
            quantity_on_hand,
            unit_cost,
            reorder_level,
        }
    }

    /// Stock valuation at cost.
    pub fn value(&self) -> Amount {
        f64::from(self.quantity_on_hand) * self.unit_cost
    }

    pub fn is_low_stock(&self) -> bool {
        self.quantity_on_hand <= self.reorder_level
    }

    pub fn is_out_of_stock(&self) -> bool {
        self.quantity_on_hand == 0
    }

    pub fn validate(&self) -> EngineResult<()> {
        check_name("product", &self.product)?;
        check_amount("unit_cost", self.unit_cost)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub customer: String,
    pub amount:   Amount,
    pub due_date: NaiveDate,
    pub status:   OrderStatus,
}

impl OrderRecord {
    pub fn new(
        customer: impl Into<String>,
        amount: Amount,
        due_date: NaiveDate,
        status: OrderStatus,
    ) -> Self {
        Self {
            customer: customer.into(),
            amount,
            due_date,
            status,
        }
    }

    pub fn validate(&self) -> EngineResult<()> {
        check_name("customer", &self.customer)?;
        check_amount("amount", self.amount)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtRecord {
    pub kind:         DebtKind,
    pub counterparty: String,
    pub amount:       Amount,
    pub due_date:     NaiveDate,
    pub status:       DebtStatus,
}

impl DebtRecord {
    pub fn new(
        kind: DebtKind,
        counterparty: impl Into<String>,
        amount: Amount,
        due_date: NaiveDate,
        status: DebtStatus,
    ) -> Self {
        Self {
            kind,
            counterparty: counterparty.into(),
            amount,
            due_date,
            status,
        }
    }

    pub fn is_outstanding(&self) -> bool {
        self.status == DebtStatus::Outstanding
    }

    pub fn validate(&self) -> EngineResult<()> {
        check_name("counterparty", &self.counterparty)?;
        check_amount("amount", self.amount)?;
        Ok(())
    }
}

// ── Tenant record set ────────────────────────────────────────────────────────

/// The full record set of one business, as supplied by the record shell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TenantRecords {
    pub tenant_id: TenantId,
    #[serde(default)]
    pub sales:     Vec<SaleRecord>,
    #[serde(default)]
    pub inventory: Vec<InventoryItem>,
    #[serde(default)]
    pub orders:    Vec<OrderRecord>,
    #[serde(default)]
    pub debts:     Vec<DebtRecord>,
}

impl TenantRecords {
    pub fn new(tenant_id: impl Into<TenantId>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sales.is_empty()
            && self.inventory.is_empty()
            && self.orders.is_empty()
            && self.debts.is_empty()
    }

    /// Check every record. The first violation wins and names its
    /// location, e.g. `sales[3].quantity`.
    pub fn validate(&self) -> EngineResult<()> {
        for (i, sale) in self.sales.iter().enumerate() {
            sale.validate().map_err(|e| e.within(&format!("sales[{i}]")))?;
        }
        for (i, item) in self.inventory.iter().enumerate() {
            item.validate().map_err(|e| e.within(&format!("inventory[{i}]")))?;
        }
        for (i, order) in self.orders.iter().enumerate() {
            order.validate().map_err(|e| e.within(&format!("orders[{i}]")))?;
        }
        for (i, debt) in self.debts.iter().enumerate() {
            debt.validate().map_err(|e| e.within(&format!("debts[{i}]")))?;
        }
        Ok(())
    }

    /// Decode a record set from the shell's JSON and validate it.
    /// Malformed values (bad dates, unknown statuses) are InvalidInput;
    /// syntactically broken JSON stays a Serialization error.
    pub fn from_json(json: &str) -> EngineResult<Self> {
        let records: Self = serde_json::from_str(json).map_err(|e| {
            if e.is_data() {
                EngineError::invalid("records", e.to_string())
            } else {
                EngineError::Serialization(e)
            }
        })?;
        records.validate()?;
        Ok(records)
    }
}
