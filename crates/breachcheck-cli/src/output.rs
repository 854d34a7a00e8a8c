//! Text rendering for command results.

use breachcheck_core::models::{AccountBreach, SourceVerdict};
use breachcheck_core::offline::{ActivationReport, CacheStatus, InstallReport};
use breachcheck_core::{
    AccountReport, BreachSummary, DataClassCount, ExposureResult, ExposureSource, NotifyReceipt,
    SiteStats,
};
use serde::Serialize;
use std::fmt::Write;

/// Shown wherever the backend left a value out.
const MISSING: &str = "—";

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// `1234567` -> `1,234,567`.
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn count_or_missing(n: Option<u64>) -> String {
    n.map(format_count).unwrap_or_else(|| MISSING.to_string())
}

pub fn exposure(result: &ExposureResult) -> String {
    let via = match result.source {
        ExposureSource::Primary => "breach API",
        ExposureSource::RangeFallback => "range lookup",
    };
    match (result.pwned, result.occurrence_count) {
        (true, Some(count)) => format!(
            "Password found in breaches {} times ({}). Do not use it.",
            format_count(count),
            via
        ),
        (true, None) => format!("Password found in breaches ({}). Do not use it.", via),
        (false, _) => format!("Password not found in known breaches ({}).", via),
    }
}

fn verdict_line(name: &str, verdict: &SourceVerdict) -> String {
    let state = if let Some(error) = &verdict.error {
        format!("error: {}", error)
    } else if verdict.is_hit() {
        match verdict.total {
            Some(total) => format!("found ({})", format_count(total)),
            None => "found".to_string(),
        }
    } else {
        "clean".to_string()
    };
    match &verdict.message {
        Some(message) if verdict.error.is_none() => format!("  {:<12} {} - {}", name, state, message),
        _ => format!("  {:<12} {}", name, state),
    }
}

pub fn account(account: &str, report: &AccountReport) -> String {
    let mut out = String::new();
    if report.found {
        let _ = writeln!(out, "{} appears in {} breach record(s).", account, report.breaches.len());
    } else {
        let _ = writeln!(out, "{} was not found in any known breach.", account);
    }

    for breach in &report.breaches {
        match breach {
            AccountBreach::Catalog(summary) => {
                let _ = writeln!(out, "  - {}", breach_line(summary));
            }
            AccountBreach::Sourced { source, .. } => {
                let _ = writeln!(out, "  - reported by {}", source);
            }
        }
    }

    if !report.sources.is_empty() {
        let _ = writeln!(out, "Sources:");
        for (name, verdict) in &report.sources {
            let _ = writeln!(out, "{}", verdict_line(name, verdict));
        }
    }
    out.trim_end().to_string()
}

pub fn breach_line(breach: &BreachSummary) -> String {
    format!(
        "{} ({}) - {} accounts{}",
        breach.display_title(),
        breach.breach_date.as_deref().unwrap_or(MISSING),
        count_or_missing(breach.pwn_count),
        if breach.is_verified { "" } else { " [unverified]" }
    )
}

pub fn breach_list(breaches: &[BreachSummary]) -> String {
    if breaches.is_empty() {
        return "No breaches in the catalog.".to_string();
    }
    breaches
        .iter()
        .map(breach_line)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn breach_detail(breach: &BreachSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", breach.display_title());
    let _ = writeln!(out, "  Domain:       {}", breach.domain.as_deref().unwrap_or(MISSING));
    let _ = writeln!(out, "  Breach date:  {}", breach.breach_date.as_deref().unwrap_or(MISSING));
    let _ = writeln!(out, "  Accounts:     {}", count_or_missing(breach.pwn_count));
    let _ = writeln!(out, "  Verified:     {}", if breach.is_verified { "yes" } else { "no" });
    if !breach.data_classes.is_empty() {
        let _ = writeln!(out, "  Data leaked:  {}", breach.data_classes.join(", "));
    }
    if let Some(description) = &breach.description {
        let _ = writeln!(out, "\n{}", description);
    }
    out.trim_end().to_string()
}

pub fn stats(stats: &SiteStats, classes: &[DataClassCount]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Breaches:         {}", count_or_missing(stats.total_breaches));
    let _ = writeln!(out, "Pwned accounts:   {}", count_or_missing(stats.total_accounts));
    let _ = writeln!(out, "Pwned passwords:  {}", count_or_missing(stats.total_pwned_passwords));
    if !classes.is_empty() {
        let _ = writeln!(out, "Most leaked data:");
        for class in classes {
            let _ = writeln!(out, "  {:<24} {}", class.name, format_count(class.count));
        }
    }
    out.trim_end().to_string()
}

pub fn receipt(target: &str, receipt: &NotifyReceipt) -> String {
    let default = if receipt.ok {
        format!("Subscribed to breach notifications for {}.", target)
    } else {
        format!("Subscription for {} was not accepted.", target)
    };
    receipt.message.clone().unwrap_or(default)
}

pub fn installed(install: &InstallReport, activation: &ActivationReport) -> String {
    let mut out = format!(
        "Installed {} ({} assets, {} bytes)",
        install.version, install.asset_count, format_count(install.total_size_bytes)
    );
    if !activation.superseded.is_empty() {
        let _ = write!(out, "; removed {}", activation.superseded.join(", "));
    }
    out
}

pub fn cache_status(status: &CacheStatus) -> String {
    match &status.current {
        Some(meta) => format!(
            "Current generation: {} ({} assets, {} bytes)",
            meta.version,
            meta.entry_count,
            format_count(meta.total_size_bytes)
        ),
        None if status.generations.is_empty() => "Offline cache is empty.".to_string(),
        None => format!(
            "No active generation; staged: {}",
            status.generations.join(", ")
        ),
    }
}
