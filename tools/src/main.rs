//! insight-runner: headless shell for the ShopInsight engine.
//!
//! Usage:
//!   insight-runner --records shop.json --period 30
//!   insight-runner --demo --seed 7 --period all --json
//!   insight-runner --demo --set margin_low=0.15 --set debt_ratio=0.3
//!   insight-runner --ipc-mode

mod demo;

use anyhow::Result;
use chrono::NaiveDate;
use shopinsight_core::{
    platform::{platform_overview, PlatformOverview},
    records::parse_date,
    rules::Severity,
    DashboardReport, InsightConfig, InsightEngine, TenantRecords, WindowPreset, WindowSpec,
};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    Evaluate {
        records: TenantRecords,
        #[serde(default)]
        period: Option<String>,
        #[serde(default)]
        today: Option<NaiveDate>,
    },
    Platform {
        tenants: Vec<TenantRecords>,
        #[serde(default = "default_top_n")]
        top_n: usize,
    },
    GetConfig,
    Quit,
}

fn default_top_n() -> usize {
    10
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ipc_mode = has_flag(&args, "--ipc-mode");
    let engine = InsightEngine::new(build_config(&args)?)?;
    let today = match arg_value(&args, "--today") {
        Some(raw) => parse_date("--today", raw)?,
        None => chrono::Local::now().date_naive(),
    };

    if ipc_mode {
        return run_ipc_loop(&engine, today);
    }

    let period: WindowPreset = arg_value(&args, "--period").unwrap_or("30").parse()?;
    let records = if has_flag(&args, "--demo") {
        let seed = parse_arg(&args, "--seed", 42u64);
        let days = parse_arg(&args, "--days", 120u32);
        demo::generate_tenant(&format!("demo-{seed}"), seed, today, days)
    } else {
        let path = arg_value(&args, "--records")
            .ok_or_else(|| anyhow::anyhow!("either --records <file> or --demo is required"))?;
        load_records(path)?
    };

    let report = engine.evaluate(&records, WindowSpec::Preset(period), today)?;

    if has_flag(&args, "--json") {
        println!("{}", report.to_json_pretty()?);
    } else {
        print_summary(&report, period);
    }
    Ok(())
}

fn build_config(args: &[String]) -> Result<InsightConfig> {
    let base = match arg_value(args, "--config") {
        Some(path) => InsightConfig::load(path)?,
        None => InsightConfig::default(),
    };
    let overrides = args
        .windows(2)
        .filter(|w| w[0] == "--set")
        .map(|w| parse_override(&w[1]))
        .collect::<Result<Vec<_>>>()?;
    Ok(base.with_overrides(overrides.iter().map(|(name, value)| (name.as_str(), *value)))?)
}

fn parse_override(raw: &str) -> Result<(String, f64)> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("--set expects name=value, got '{raw}'"))?;
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|e| anyhow::anyhow!("--set {name}: {e}"))?;
    Ok((name.trim().to_string(), value))
}

fn load_records(path: &str) -> Result<TenantRecords> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
    Ok(TenantRecords::from_json(&content)?)
}

fn run_ipc_loop(engine: &InsightEngine, today: NaiveDate) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("unrecognised ipc command: {e}");
                write_error(&mut stdout, &e.to_string())?;
                continue;
            }
        };

        if matches!(cmd, IpcCommand::Quit) {
            break;
        }

        match handle_command(engine, today, cmd) {
            Ok(reply) => writeln!(stdout, "{reply}")?,
            Err(e) => {
                log::warn!("ipc command failed: {e:#}");
                write_error(&mut stdout, &format!("{e:#}"))?;
                continue;
            }
        }
        stdout.flush()?;
    }
    Ok(())
}

fn handle_command(engine: &InsightEngine, today: NaiveDate, cmd: IpcCommand) -> Result<String> {
    match cmd {
        IpcCommand::Evaluate { records, period, today: requested } => {
            let period: WindowPreset = period.as_deref().unwrap_or("30").parse()?;
            let report = engine.evaluate(&records, WindowSpec::Preset(period), requested.unwrap_or(today))?;
            Ok(report.to_json()?)
        }
        IpcCommand::Platform { tenants, top_n } => {
            let overview: PlatformOverview = platform_overview(&tenants, top_n)?;
            Ok(serde_json::to_string(&overview)?)
        }
        IpcCommand::GetConfig => Ok(serde_json::to_string(engine.config())?),
        IpcCommand::Quit => Ok(String::new()),
    }
}

fn write_error(stdout: &mut io::Stdout, message: &str) -> Result<()> {
    let err_json = serde_json::json!({ "error": message });
    writeln!(stdout, "{err_json}")?;
    stdout.flush()?;
    Ok(())
}

fn print_summary(report: &DashboardReport, period: WindowPreset) {
    let kpis = &report.kpis;
    let trend = &report.trend;

    println!("=== {} | {} ===", report.tenant_id, period.label());
    println!("  window:          {} .. {} ({} days)", report.period.first, report.period.last, trend.window_days);
    println!("  sales:           {}", kpis.sales_count);
    println!("  revenue:         {:.2}", kpis.total_revenue);
    println!("  profit:          {:.2}", kpis.total_profit);
    println!("  margin:          {:.1}%", kpis.profit_margin * 100.0);
    println!("  inventory value: {:.2}", kpis.inventory_value);
    println!("  pending orders:  {:.2}", kpis.pending_orders_value);
    println!("  receivables:     {:.2}", kpis.pending_receivables);
    println!("  payables:        {:.2}", kpis.pending_payables);
    println!("  net position:    {:.2}", kpis.net_position);

    println!();
    println!("=== TREND ===");
    println!("  daily average:   {:.2}", trend.daily_average);
    println!("  recent 7 days:   {:.2}", trend.recent_7day_average);
    println!("  direction:       {}", trend.trend_direction.as_str());
    println!("  projected month: {:.2}", trend.projected_period_revenue);

    println!();
    println!(
        "=== INSIGHTS ({} critical, {} warning, {} info) ===",
        report.count_by_severity(Severity::Critical),
        report.count_by_severity(Severity::Warning),
        report.count_by_severity(Severity::Info),
    );
    if report.insights.is_empty() {
        println!("  (Add more sales data to receive insights)");
    }
    for insight in &report.insights {
        println!("  [{:<8}] {}: {}", insight.severity.as_str(), insight.title, insight.message);
    }

    println!();
    println!("=== TOP PRODUCTS ===");
    for p in report.breakdowns.products.iter().take(5) {
        println!(
            "  {:<20} | Qty: {:>4} | Revenue: {:.2} | Margin: {:.1}%",
            p.product,
            p.quantity,
            p.revenue,
            p.margin * 100.0
        );
    }
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
