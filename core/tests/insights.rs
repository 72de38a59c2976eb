//! Insight rule tests, driven end to end through the engine.

use chrono::NaiveDate;
use shopinsight_core::{
    metrics::KpiSnapshot,
    records::{DebtKind, DebtRecord, DebtStatus, InventoryItem, SaleRecord},
    report::DashboardReport,
    rules::{evaluate_rules, rank, Finding, Insight, InsightRule, RuleContext, RuleId, Severity, RULES},
    trend::{TrendDirection, TrendReport},
    InsightConfig, InsightEngine, TenantRecords, WindowPreset, WindowSpec,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// Evaluate over March 2024 with `today` on the last day.
fn evaluate_march(engine: &InsightEngine, records: &TenantRecords) -> DashboardReport {
    let spec = WindowSpec::Range { start: d(2024, 3, 1), end: d(2024, 3, 31) };
    engine.evaluate(records, spec, d(2024, 3, 31)).unwrap()
}

fn rules_fired(report: &DashboardReport) -> Vec<RuleId> {
    report.insights.iter().map(|i| i.rule).collect()
}

/// Revenue 1000 at a 40% margin, with 600 still owed by a customer.
fn receivables_heavy() -> TenantRecords {
    let mut records = TenantRecords::new("receivables");
    records.sales.push(SaleRecord::new(d(2024, 3, 15), "Widget", 10, 60.0, 100.0));
    records.debts.push(DebtRecord::new(
        DebtKind::Receivable,
        "Acme Ltd",
        600.0,
        d(2024, 3, 20),
        DebtStatus::Outstanding,
    ));
    records
}

#[test]
fn empty_tenant_gets_no_insights() {
    let report = evaluate_march(&InsightEngine::default(), &TenantRecords::new("empty"));

    assert!(report.insights.is_empty(), "Expected no insights, got {:?}", report.insights);
    assert!(report.headline().is_none());
}

#[test]
fn high_receivables_raise_critical_alert() {
    let report = evaluate_march(&InsightEngine::default(), &receivables_heavy());

    let headline = report.headline().expect("Should have a headline insight");
    assert_eq!(headline.rule, RuleId::DebtAlert);
    assert_eq!(headline.severity, Severity::Critical);
    assert_eq!(headline.category, "debt");
    assert!(headline.message.contains("Acme Ltd"), "message should name the debtor: {}", headline.message);
}

/// 40% sits between the 10% floor and the 50% ceiling: nothing to say.
#[test]
fn healthy_margin_is_silent() {
    let report = evaluate_march(&InsightEngine::default(), &receivables_heavy());

    assert!(
        !rules_fired(&report).contains(&RuleId::MarginAlert),
        "No margin insight expected at 40%: {:?}",
        report.insights
    );
}

#[test]
fn insights_ranked_by_severity_then_rule_order() {
    let report = evaluate_march(&InsightEngine::default(), &receivables_heavy());

    // Debt (critical), quiet last week (warning), best-seller and a
    // single-product catalogue (info).
    assert_eq!(
        rules_fired(&report),
        vec![RuleId::DebtAlert, RuleId::TrendAlert, RuleId::TopPerformer, RuleId::ProductDiversity]
    );
    assert!(report.insights.len() <= RULES.len(), "at most one insight per rule");
    assert_eq!(report.count_by_severity(Severity::Info), 2);
}

#[test]
fn receivables_under_ratio_do_not_alert() {
    let mut records = receivables_heavy();
    records.debts[0].amount = 400.0;

    let report = evaluate_march(&InsightEngine::default(), &records);

    assert!(!rules_fired(&report).contains(&RuleId::DebtAlert));
}

#[test]
fn paid_receivables_do_not_alert() {
    let mut records = receivables_heavy();
    records.debts[0].status = DebtStatus::Paid;

    let report = evaluate_march(&InsightEngine::default(), &records);

    assert!(!rules_fired(&report).contains(&RuleId::DebtAlert));
}

#[test]
fn debt_ratio_comes_from_config() {
    let config = InsightConfig::default().with_override("debt_ratio", 0.7).unwrap();
    let engine = InsightEngine::new(config).unwrap();

    let report = evaluate_march(&engine, &receivables_heavy());

    assert!(
        !rules_fired(&report).contains(&RuleId::DebtAlert),
        "600 is under 70% of 1000; no alert expected"
    );
}

#[test]
fn thin_margin_warns() {
    let mut records = TenantRecords::new("thin");
    records.sales.push(SaleRecord::new(d(2024, 3, 28), "Bread", 20, 4.8, 5.0));

    let report = evaluate_march(&InsightEngine::default(), &records);

    let margin = report
        .insights
        .iter()
        .find(|i| i.rule == RuleId::MarginAlert)
        .expect("Expected a margin insight at 4%");
    assert_eq!(margin.severity, Severity::Warning);
    assert_eq!(margin.category, "profitability");
}

#[test]
fn wide_margin_is_praised() {
    let mut records = TenantRecords::new("wide");
    records.sales.push(SaleRecord::new(d(2024, 3, 28), "Art print", 2, 5.0, 50.0));

    let report = evaluate_march(&InsightEngine::default(), &records);

    let margin = report
        .insights
        .iter()
        .find(|i| i.rule == RuleId::MarginAlert)
        .expect("Expected a margin insight at 90%");
    assert_eq!(margin.severity, Severity::Info);
}

/// Seven items at or below reorder level collapse into one warning
/// that names the first five.
#[test]
fn low_stock_aggregates_into_one_warning() {
    let mut records = TenantRecords::new("low-stock");
    for i in 0..7 {
        records.inventory.push(InventoryItem::new(format!("Item {i}"), "Pantry", i, 1.0, 10));
    }
    records.inventory.push(InventoryItem::new("Plenty", "Pantry", 50, 1.0, 10));

    let report = evaluate_march(&InsightEngine::default(), &records);

    assert_eq!(report.insights.len(), 1, "Expected only the low-stock insight: {:?}", report.insights);
    let insight = &report.insights[0];
    assert_eq!(insight.rule, RuleId::LowStock);
    assert_eq!(insight.severity, Severity::Warning);
    assert!(insight.message.starts_with("7 item(s)"), "message: {}", insight.message);
    assert!(insight.message.contains("Item 4"));
    assert!(!insight.message.contains("Item 5"), "only low_stock_cap items are named");
    assert!(insight.message.contains("and 2 more"));
    assert!(!insight.message.contains("Plenty"));
}

/// Stock exactly at the reorder level counts as low.
#[test]
fn reorder_level_is_inclusive() {
    let mut records = TenantRecords::new("at-level");
    records.inventory.push(InventoryItem::new("Flour", "Pantry", 10, 1.0, 10));

    let report = evaluate_march(&InsightEngine::default(), &records);

    assert_eq!(rules_fired(&report), vec![RuleId::LowStock]);
}

#[test]
fn diversity_hint_needs_a_month_of_window() {
    let mut records = TenantRecords::new("short-window");
    records.sales.push(SaleRecord::new(d(2024, 3, 28), "Widget", 1, 6.0, 10.0));
    let spec = WindowSpec::Range { start: d(2024, 3, 25), end: d(2024, 3, 31) };

    let report = InsightEngine::default().evaluate(&records, spec, d(2024, 3, 31)).unwrap();

    assert!(!rules_fired(&report).contains(&RuleId::ProductDiversity));
}

#[test]
fn three_products_satisfy_diversity() {
    let mut records = TenantRecords::new("diverse");
    for product in ["Tea", "Coffee", "Cake"] {
        records.sales.push(SaleRecord::new(d(2024, 3, 10), product, 1, 2.0, 4.0));
    }

    let report = evaluate_march(&InsightEngine::default(), &records);

    assert!(!rules_fired(&report).contains(&RuleId::ProductDiversity));
}

#[test]
fn top_performer_names_highest_revenue_product() {
    let mut records = TenantRecords::new("top");
    records.sales.push(SaleRecord::new(d(2024, 3, 10), "Tea", 10, 1.0, 2.0));
    records.sales.push(SaleRecord::new(d(2024, 3, 11), "Cake", 1, 10.0, 30.0));

    let report = evaluate_march(&InsightEngine::default(), &records);

    let top = report
        .insights
        .iter()
        .find(|i| i.rule == RuleId::TopPerformer)
        .expect("Expected a top performer insight");
    assert!(top.message.contains("'Cake'"), "message: {}", top.message);
}

#[test]
fn rank_is_severity_first_then_rule_order() {
    let insight = |rule, severity| Insight {
        rule,
        severity,
        category: String::new(),
        title:    String::new(),
        message:  String::new(),
    };
    let mut insights = vec![
        insight(RuleId::ProductDiversity, Severity::Info),
        insight(RuleId::LowStock, Severity::Warning),
        insight(RuleId::TopPerformer, Severity::Info),
        insight(RuleId::DebtAlert, Severity::Critical),
        insight(RuleId::TrendAlert, Severity::Warning),
    ];

    rank(&mut insights);

    let order: Vec<RuleId> = insights.iter().map(|i| i.rule).collect();
    assert_eq!(
        order,
        vec![
            RuleId::DebtAlert,
            RuleId::TrendAlert,
            RuleId::LowStock,
            RuleId::TopPerformer,
            RuleId::ProductDiversity,
        ]
    );
}

/// One small sale in a week: margin 40% is in band, so no margin note.
#[test]
fn single_small_sale_in_a_week() {
    let mut records = TenantRecords::new("one-sale");
    records.sales.push(SaleRecord::new(d(2024, 3, 31), "Widget", 2, 3.0, 5.0));

    let report = InsightEngine::default()
        .evaluate(&records, WindowPreset::Last7Days.into(), d(2024, 3, 31))
        .unwrap();

    assert_eq!(report.kpis.total_revenue, 10.0);
    assert_eq!(report.kpis.total_profit, 4.0);
    assert!((report.kpis.profit_margin - 0.4).abs() < 1e-9);
    assert!(!rules_fired(&report).contains(&RuleId::MarginAlert));
}

#[test]
fn single_item_under_reorder_level_warns() {
    let mut records = TenantRecords::new("one-item");
    records.inventory.push(InventoryItem::new("Candles", "Home", 1, 2.0, 5));

    let report = evaluate_march(&InsightEngine::default(), &records);

    let insight = report.headline().expect("Expected a low-stock insight");
    assert_eq!(insight.rule, RuleId::LowStock);
    assert_eq!(insight.severity, Severity::Warning);
    assert!(insight.message.contains("Candles"));
}

#[test]
fn no_sales_in_thirty_days_has_no_trend_insight() {
    let mut records = TenantRecords::new("quiet");
    records.sales.push(SaleRecord::new(d(2023, 12, 1), "Widget", 1, 6.0, 10.0));

    let report = InsightEngine::default()
        .evaluate(&records, WindowPreset::Last30Days.into(), d(2024, 3, 31))
        .unwrap();

    assert_eq!(report.trend.projected_period_revenue, 0.0);
    assert!(!rules_fired(&report).contains(&RuleId::TrendAlert));
}

/// A receivable due before the window is not part of the window's
/// position, though the debt summary still reports it.
#[test]
fn debt_alert_ignores_receivables_due_before_window() {
    let mut records = receivables_heavy();
    records.debts[0].amount = 100.0;
    records.debts.push(DebtRecord::new(
        DebtKind::Receivable,
        "Old Co",
        900.0,
        d(2024, 1, 1),
        DebtStatus::Outstanding,
    ));

    let report = evaluate_march(&InsightEngine::default(), &records);

    assert_eq!(report.kpis.pending_receivables, 100.0);
    assert!(
        !rules_fired(&report).contains(&RuleId::DebtAlert),
        "100 in-window receivables are under half of revenue: {:?}",
        report.insights
    );
    assert_eq!(report.breakdowns.debts.pending_receivables, 1000.0);
}

/// With no revenue any outstanding receivable is over the ratio.
#[test]
fn receivables_without_revenue_are_critical() {
    let mut records = TenantRecords::new("no-revenue");
    records.debts.push(DebtRecord::new(
        DebtKind::Receivable,
        "Acme Ltd",
        9.0,
        d(2024, 3, 20),
        DebtStatus::Outstanding,
    ));

    let report = evaluate_march(&InsightEngine::default(), &records);

    assert_eq!(rules_fired(&report), vec![RuleId::DebtAlert]);
    assert_eq!(report.insights[0].severity, Severity::Critical);
}

#[test]
fn severity_labels_parse_or_fail_as_invalid_input() {
    assert_eq!("Critical".parse::<Severity>().unwrap(), Severity::Critical);

    let err = "urgent".parse::<Severity>().unwrap_err();
    assert!(err.is_invalid_input(), "Expected InvalidInput, got {err}");
}

fn always_info(_ctx: &RuleContext<'_>, _config: &InsightConfig) -> Option<Finding> {
    Some(Finding::info("Info", String::new()))
}

fn always_warning(_ctx: &RuleContext<'_>, _config: &InsightConfig) -> Option<Finding> {
    Some(Finding::warning("Warning", String::new()))
}

/// Within a severity, a custom table keeps its own row order.
#[test]
fn custom_table_ties_follow_row_order() {
    let table = [
        InsightRule { id: RuleId::ProductDiversity, category: "custom", evaluate: always_info },
        InsightRule { id: RuleId::TopPerformer,     category: "custom", evaluate: always_info },
        InsightRule { id: RuleId::LowStock,         category: "custom", evaluate: always_warning },
    ];
    let kpis = KpiSnapshot::default();
    let trend = TrendReport {
        window_days:              1,
        total_revenue:            0.0,
        daily_average:            0.0,
        recent_7day_average:      0.0,
        trend_direction:          TrendDirection::Flat,
        projected_period_revenue: 0.0,
        buckets:                  Vec::new(),
    };
    let ctx = RuleContext {
        kpis:        &kpis,
        trend:       &trend,
        sales:       &[],
        inventory:   &[],
        debts:       &[],
        window_days: 1,
    };

    let insights = evaluate_rules(&table, &ctx, &InsightConfig::default());

    let order: Vec<RuleId> = insights.iter().map(|i| i.rule).collect();
    assert_eq!(order, vec![RuleId::LowStock, RuleId::ProductDiversity, RuleId::TopPerformer]);
}
