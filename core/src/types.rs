//! Shared primitive types used across the engine.

/// Identifies one registered business. Every record set is scoped to one.
pub type TenantId = String;

/// A monetary amount in the tenant's currency.
pub type Amount = f64;

/// A count of calendar days.
pub type DayCount = u32;
