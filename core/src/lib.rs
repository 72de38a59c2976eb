//! Analytics and insight engine for small-business records.
//!
//! The caller supplies one tenant's sales, inventory, orders and
//! debts; the engine returns KPIs, a trend estimate, ranked insights
//! and detail breakdowns. See engine.rs for the pipeline.

pub mod breakdowns;
pub mod config;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod platform;
pub mod records;
pub mod report;
pub mod rules;
pub mod trend;
pub mod types;
pub mod window;

pub use config::InsightConfig;
pub use engine::InsightEngine;
pub use error::{EngineError, EngineResult};
pub use records::TenantRecords;
pub use report::DashboardReport;
pub use window::{WindowPreset, WindowSpec};
