//! Insight rule engine.
//!
//! RULES is a table. Each row pairs a rule id and category with an
//! evaluate fn that yields at most one Finding. evaluate() runs every
//! row against the same context, then ranks the results: severity
//! first (critical > warning > info), declaration order second.
//! Adding a rule means adding a RuleId variant and a table row.
//!
//! RULE: A row never panics and never errors. Empty or degenerate
//! input short-circuits to None.

use crate::{
    breakdowns::product_performance,
    config::InsightConfig,
    error::EngineError,
    metrics::KpiSnapshot,
    records::{normalize_label, DebtKind, DebtRecord, InventoryItem, SaleRecord},
    trend::{TrendDirection, TrendReport},
    types::DayCount,
};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, str::FromStr};

// ── Public types ─────────────────────────────────────────────────────────────

/// Ordered least to most severe, so `Ord` ranks critical highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info     => "info",
            Severity::Warning  => "warning",
            Severity::Critical => "critical",
        }
    }
}

impl FromStr for Severity {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "info"     => Ok(Severity::Info),
            "warning"  => Ok(Severity::Warning),
            "critical" => Ok(Severity::Critical),
            _ => Err(EngineError::invalid("severity", format!("unknown severity '{s}'"))),
        }
    }
}

impl TryFrom<String> for Severity {
    type Error = EngineError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Stable rule identity. Variant order is the tie-break order when
/// two insights share a severity; never reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    TopPerformer,
    MarginAlert,
    TrendAlert,
    DebtAlert,
    LowStock,
    ProductDiversity,
}

impl RuleId {
    pub fn as_str(self) -> &'static str {
        match self {
            RuleId::TopPerformer     => "top_performer",
            RuleId::MarginAlert      => "margin_alert",
            RuleId::TrendAlert       => "trend_alert",
            RuleId::DebtAlert        => "debt_alert",
            RuleId::LowStock         => "low_stock",
            RuleId::ProductDiversity => "product_diversity",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub rule:     RuleId,
    pub severity: Severity,
    pub category: String,
    pub title:    String,
    pub message:  String,
}

/// What a rule row returns when it fires.
#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    pub severity: Severity,
    pub title:    &'static str,
    pub message:  String,
}

impl Finding {
    pub fn info(title: &'static str, message: String) -> Self {
        Self { severity: Severity::Info, title, message }
    }

    pub fn warning(title: &'static str, message: String) -> Self {
        Self { severity: Severity::Warning, title, message }
    }

    pub fn critical(title: &'static str, message: String) -> Self {
        Self { severity: Severity::Critical, title, message }
    }
}

/// Everything a rule may look at. Sales and debts are already
/// filtered to the window; inventory is the current snapshot.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub kpis:        &'a KpiSnapshot,
    pub trend:       &'a TrendReport,
    pub sales:       &'a [&'a SaleRecord],
    pub inventory:   &'a [InventoryItem],
    pub debts:       &'a [&'a DebtRecord],
    pub window_days: DayCount,
}

pub type RuleFn = fn(&RuleContext<'_>, &InsightConfig) -> Option<Finding>;

pub struct InsightRule {
    pub id:       RuleId,
    pub category: &'static str,
    pub evaluate: RuleFn,
}

// ── Rule table ───────────────────────────────────────────────────────────────

pub const RULES: &[InsightRule] = &[
    InsightRule { id: RuleId::TopPerformer,     category: "sales",         evaluate: top_performer },
    InsightRule { id: RuleId::MarginAlert,      category: "profitability", evaluate: margin_alert },
    InsightRule { id: RuleId::TrendAlert,       category: "trend",         evaluate: trend_alert },
    InsightRule { id: RuleId::DebtAlert,        category: "debt",          evaluate: debt_alert },
    InsightRule { id: RuleId::LowStock,         category: "inventory",     evaluate: low_stock },
    InsightRule { id: RuleId::ProductDiversity, category: "diversity",     evaluate: product_diversity },
];

/// Run the standard table and rank the results.
pub fn evaluate(ctx: &RuleContext<'_>, config: &InsightConfig) -> Vec<Insight> {
    evaluate_rules(RULES, ctx, config)
}

/// Run `rules` and rank the results: severity first, then the row's
/// position in `rules`.
pub fn evaluate_rules(
    rules: &[InsightRule],
    ctx: &RuleContext<'_>,
    config: &InsightConfig,
) -> Vec<Insight> {
    let mut insights: Vec<Insight> = rules
        .iter()
        .filter_map(|rule| {
            (rule.evaluate)(ctx, config).map(|finding| Insight {
                rule:     rule.id,
                severity: finding.severity,
                category: rule.category.to_string(),
                title:    finding.title.to_string(),
                message:  finding.message,
            })
        })
        .collect();
    // Collected in table order, so a stable sort keeps the caller's
    // row order within each severity.
    insights.sort_by(|a, b| b.severity.cmp(&a.severity));
    insights
}

/// Severity descending, then RuleId order. For insights gathered
/// outside evaluate_rules, where no table order exists. Stable.
pub fn rank(insights: &mut [Insight]) {
    insights.sort_by(|a, b| b.severity.cmp(&a.severity).then(a.rule.cmp(&b.rule)));
}

// ── Rules ────────────────────────────────────────────────────────────────────

fn top_performer(ctx: &RuleContext<'_>, _config: &InsightConfig) -> Option<Finding> {
    let top = product_performance(ctx.sales.iter().copied()).into_iter().next()?;
    Some(Finding::info(
        "Top performer",
        format!(
            "'{}' is your best-seller with {:.2} in revenue from {} units sold.",
            top.product, top.revenue, top.quantity
        ),
    ))
}

fn margin_alert(ctx: &RuleContext<'_>, config: &InsightConfig) -> Option<Finding> {
    // No revenue means no margin to judge, not a thin one.
    if ctx.kpis.total_revenue <= 0.0 {
        return None;
    }
    let margin = ctx.kpis.profit_margin;
    if margin < config.margin_low {
        Some(Finding::warning(
            "Margin too thin",
            format!(
                "Your profit margin is {:.1}%, below the {:.1}% floor. Consider reviewing pricing or reducing costs.",
                margin * 100.0,
                config.margin_low * 100.0
            ),
        ))
    } else if margin > config.margin_high {
        Some(Finding::info(
            "Excellent margin",
            format!("Outstanding profit margin of {:.1}%. Keep up the good work.", margin * 100.0),
        ))
    } else {
        None
    }
}

fn trend_alert(ctx: &RuleContext<'_>, _config: &InsightConfig) -> Option<Finding> {
    let trend = ctx.trend;
    let delta_pct = if trend.daily_average > 0.0 {
        (trend.recent_7day_average / trend.daily_average - 1.0) * 100.0
    } else {
        0.0
    };
    match trend.trend_direction {
        TrendDirection::Up => Some(Finding::info(
            "Sales trending up",
            format!(
                "Your recent 7-day average of {:.2} is {:.1}% above the window's daily average.",
                trend.recent_7day_average, delta_pct
            ),
        )),
        TrendDirection::Down => Some(Finding::warning(
            "Sales declining",
            format!(
                "Your recent 7-day average of {:.2} is {:.1}% below the window's daily average. Consider promotions or customer outreach.",
                trend.recent_7day_average,
                -delta_pct
            ),
        )),
        TrendDirection::Flat => None,
    }
}

fn debt_alert(ctx: &RuleContext<'_>, config: &InsightConfig) -> Option<Finding> {
    let receivables = ctx.kpis.pending_receivables;
    let limit = ctx.kpis.total_revenue * config.debt_ratio;
    if receivables <= 0.0 || receivables <= limit {
        return None;
    }

    let outstanding: Vec<&DebtRecord> = ctx
        .debts
        .iter()
        .copied()
        .filter(|d| d.kind == DebtKind::Receivable && d.is_outstanding())
        .collect();
    let largest = outstanding
        .iter()
        .max_by(|a, b| a.amount.total_cmp(&b.amount))
        .map(|d| format!(", starting with {}", d.counterparty))
        .unwrap_or_default();

    Some(Finding::critical(
        "High receivables",
        format!(
            "Pending receivables of {:.2} across {} account(s) exceed {:.0}% of revenue ({:.2}). Prioritize collections{}.",
            receivables,
            outstanding.len(),
            config.debt_ratio * 100.0,
            limit,
            largest
        ),
    ))
}

fn low_stock(ctx: &RuleContext<'_>, config: &InsightConfig) -> Option<Finding> {
    let low: Vec<&InventoryItem> = ctx.inventory.iter().filter(|i| i.is_low_stock()).collect();
    if low.is_empty() {
        return None;
    }

    let named: Vec<&str> = low
        .iter()
        .take(config.low_stock_cap)
        .map(|i| i.product.as_str())
        .collect();
    let hidden = low.len() - named.len();

    let message = match (named.is_empty(), hidden) {
        (true, _) => format!("{} item(s) at or below their reorder level.", low.len()),
        (false, 0) => format!(
            "{} item(s) at or below their reorder level. Restock: {}.",
            low.len(),
            named.join(", ")
        ),
        (false, more) => format!(
            "{} item(s) at or below their reorder level. Restock: {} and {} more.",
            low.len(),
            named.join(", "),
            more
        ),
    };
    Some(Finding::warning("Low stock", message))
}

fn product_diversity(ctx: &RuleContext<'_>, config: &InsightConfig) -> Option<Finding> {
    if ctx.sales.is_empty() || ctx.window_days < config.diversity_window_days {
        return None;
    }
    let distinct: BTreeSet<&str> = ctx.sales.iter().map(|s| s.product.as_str()).collect();
    if distinct.len() >= config.diversity_min {
        return None;
    }
    Some(Finding::info(
        "Product diversity",
        format!(
            "You sold {} distinct product(s) over {} days. Consider expanding your product range to attract more customers.",
            distinct.len(),
            ctx.window_days
        ),
    ))
}
