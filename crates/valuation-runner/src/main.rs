//! valuation-runner: Value companies from a JSON file of extracted financials.
//!
//! The input is either one company (`{"companyId": ..., "documents": [...]}`)
//! or an array of them. Reports are written to stdout as JSON in the same
//! shape (object in, object out; array in, array out). Tunables come from
//! `VALUATION_*` environment variables, optionally via `.env`.
//!
//! Usage:
//!   cargo run -p valuation-runner -- companies.json
//!   cargo run -p valuation-runner -- companies.json --pretty
//!   VALUATION_WEIGHTING_SCOPE=document cargo run -p valuation-runner -- acme.json

use anyhow::Context;
use equity_valuation::{ValuationConfig, ValuationEngine};
use serde_json::Value;
use valuation_core::{
    CompanyFinancials, ValuationError, ValuationReport, ValuationResult, ValuationStatus,
};

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "valuation_runner=info,equity_valuation=info".into())
    };
    // Logs go to stderr so stdout stays valid JSON
    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter())
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter())
            .with_writer(std::io::stderr)
            .init();
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let pretty = args.iter().any(|a| a == "--pretty");
    let Some(input_path) = args.iter().find(|a| !a.starts_with("--")) else {
        eprintln!("Usage:");
        eprintln!("  valuation-runner <input.json> [--pretty]");
        eprintln!();
        eprintln!("Environment:");
        eprintln!("  VALUATION_GROWTH_ALPHA, VALUATION_CYCLICAL_ALPHA, VALUATION_STABLE_ALPHA");
        eprintln!("  VALUATION_GROWTH_THRESHOLD, VALUATION_VOLATILITY_THRESHOLD, VALUATION_RANGE_BAND");
        eprintln!("  VALUATION_WEIGHTING_SCOPE     company | document (default: company)");
        eprintln!("  VALUATION_DEPRECIATION_SIGN   as_stored | expense (default: as_stored)");
        std::process::exit(1);
    };

    let config = ValuationConfig::from_env().context("invalid valuation configuration")?;
    let engine = ValuationEngine::new(config).context("invalid valuation configuration")?;

    let raw = std::fs::read_to_string(input_path)
        .with_context(|| format!("failed to read {}", input_path))?;
    let input: Value =
        serde_json::from_str(&raw).with_context(|| format!("{} is not valid JSON", input_path))?;
    let batch = input.is_array();
    let companies = decode_companies(input)
        .with_context(|| format!("{} does not contain company financials", input_path))?;

    tracing::info!(
        "valuation-runner: {} companies from {}, scope={:?}",
        companies.len(),
        input_path,
        engine.config().weighting_scope
    );

    let reports = engine.value_companies(&companies);
    for (i, report) in reports.iter().enumerate() {
        log_summary(i + 1, reports.len(), report);
    }

    let output = if batch {
        serde_json::to_value(&reports)?
    } else {
        match reports.into_iter().next() {
            Some(report) => serde_json::to_value(&report)?,
            None => Value::Null,
        }
    };
    let rendered = if pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{}", rendered);

    Ok(())
}

fn decode_companies(input: Value) -> ValuationResult<Vec<CompanyFinancials>> {
    match input {
        Value::Array(items) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(ValuationError::from))
            .collect(),
        object @ Value::Object(_) => Ok(vec![serde_json::from_value(object)?]),
        other => Err(ValuationError::InvalidInput(format!(
            "expected a company object or an array of them, found {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn log_summary(position: usize, total: usize, report: &ValuationReport) {
    let as_of = report
        .newest_period()
        .and_then(|p| p.period_range())
        .map_or_else(|| "undated".to_string(), |r| r.end.to_string());
    match (report.status, report.metrics.as_ref()) {
        (ValuationStatus::Valued, Some(metrics)) => tracing::info!(
            "[{}/{}] {} as of {} => {:.0} ({:.0} - {:.0}) from {} methods, {} periods",
            position,
            total,
            report.company_id,
            as_of,
            metrics.average_equity_valuation,
            metrics.equity_valuation_range.low,
            metrics.equity_valuation_range.high,
            metrics.methods_included_count,
            report.periods.len()
        ),
        (status, _) => tracing::warn!(
            "[{}/{}] {} => {:?}, {} periods",
            position,
            total,
            report.company_id,
            status,
            report.periods.len()
        ),
    }
}
