//! Command implementations.

use crate::output;
use crate::server::{self, ProxyState};
use anyhow::Result;
use breachcheck_core::{BreachCheck, CacheGeneration, OfflineCache};
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

/// First line of stdin without its line ending.
pub async fn read_password_line() -> Result<String> {
    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await?;
    Ok(line.trim_end_matches(|c| c == '\r' || c == '\n').to_string())
}

pub async fn password(client: &BreachCheck, password: &str, json: bool) -> Result<()> {
    let result = client.check_password(password).await?;
    if json {
        return output::print_json(&result);
    }
    println!("{}", output::exposure(&result));
    Ok(())
}

pub async fn account(client: &BreachCheck, account: &str, json: bool) -> Result<()> {
    let report = client.check_account(account).await?;
    if json {
        return output::print_json(&report);
    }
    println!("{}", output::account(account.trim(), &report));
    Ok(())
}

pub async fn breaches(client: &BreachCheck, json: bool) -> Result<()> {
    let breaches = client.list_breaches().await?;
    if json {
        return output::print_json(&breaches);
    }
    println!("{}", output::breach_list(&breaches));
    Ok(())
}

pub async fn breach(client: &BreachCheck, id: &str, json: bool) -> Result<()> {
    let breach = client.get_breach(id).await?;
    if json {
        return output::print_json(&breach);
    }
    println!("{}", output::breach_detail(&breach));
    Ok(())
}

pub async fn stats(client: &BreachCheck, json: bool) -> Result<()> {
    let stats = client.stats().await?;
    let classes = client.top_data_classes().await.unwrap_or_else(|e| {
        warn!("Top data classes unavailable: {}", e);
        Vec::new()
    });
    if json {
        return output::print_json(&json!({ "stats": stats, "top_data_classes": classes }));
    }
    println!("{}", output::stats(&stats, &classes));
    Ok(())
}

pub async fn notify(
    client: &BreachCheck,
    target: &str,
    contact: Option<&str>,
    json: bool,
) -> Result<()> {
    let receipt = client.notify(target, contact).await?;
    if json {
        return output::print_json(&receipt);
    }
    println!("{}", output::receipt(target.trim(), &receipt));
    Ok(())
}

pub async fn status(client: &BreachCheck, json: bool) -> Result<()> {
    let status = client.service_status().await?;
    let sources = client.sources().await.unwrap_or_else(|e| {
        warn!("Source list unavailable: {}", e);
        serde_json::Value::Null
    });
    if json {
        return output::print_json(&json!({ "status": status, "sources": sources }));
    }
    println!("{}", serde_json::to_string_pretty(&status)?);
    if !sources.is_null() {
        println!("{}", serde_json::to_string_pretty(&sources)?);
    }
    Ok(())
}

pub async fn cache_install(cache: &OfflineCache, version: &str, json: bool) -> Result<()> {
    let generation = CacheGeneration::shell(version);
    let install = cache.install(&generation).await?;
    let activation = cache.activate(version).await?;
    if json {
        return output::print_json(&json!({ "install": install, "activation": activation }));
    }
    println!("{}", output::installed(&install, &activation));
    Ok(())
}

pub fn cache_status(cache: &OfflineCache, json: bool) -> Result<()> {
    let status = cache.status()?;
    if json {
        return output::print_json(&status);
    }
    println!("{}", output::cache_status(&status));
    Ok(())
}

pub fn cache_clear(cache: &OfflineCache, json: bool) -> Result<()> {
    cache.clear()?;
    if json {
        return output::print_json(&json!({ "cleared": true }));
    }
    println!("Offline cache cleared.");
    Ok(())
}

/// Install the shell, then proxy requests until Ctrl-C.
///
/// A failed install is not fatal: whatever generation was already stored
/// keeps serving.
pub async fn serve(
    client: &BreachCheck,
    cache: OfflineCache,
    origin: &str,
    version: &str,
    host: &str,
    port: u16,
) -> Result<()> {
    match cache.install_and_activate(&CacheGeneration::shell(version)).await {
        Ok(report) => info!("Offline shell {} active", report.version),
        Err(e) => warn!("Offline shell not installed: {}", e),
    }

    let state = ProxyState::new(cache, client.http().inner().clone(), origin)?;
    let addr = server::start_server(state, host, port).await?;

    println!("Offline proxy for {} listening on http://{}", origin, addr);

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received, exiting");

    Ok(())
}
