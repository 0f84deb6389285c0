use anyhow::{anyhow, bail, Context, Result};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::process::Command;

use crate::hosts::Host;
use crate::resolve::{resolve_category, resolve_host};
use crate::settings::{Category, Settings};
use crate::store::Store;
use crate::ui;

pub fn execute(store: &Store, category_token: &str, host_token: &str) -> Result<()> {
    let settings = store.load()?;

    let category = resolve_category(&settings.categories, category_token)
        .ok_or_else(|| anyhow!("no category matches '{category_token}'"))?;
    let table = store.read_table(&category.name)?;
    let host = resolve_host(&table, host_token)
        .ok_or_else(|| anyhow!("no host matches '{host_token}' in '{}'", category.name))?;

    let destination = match host.effective_user(category) {
        Some(user) => format!("{user}@{}", host.effective_address()),
        None => host.effective_address().to_string(),
    };

    if settings.welcome {
        let label = if category.emoji.is_empty() {
            category.name.clone()
        } else {
            format!("{} {}", category.emoji, category.name)
        };
        ui::status("Roster", format!("{label} / {}", host.name));
    }

    log_connection(store, &settings, category, host, &destination)?;

    let mut command = Command::new(&settings.ssh_binary);
    if let Some(port) = host.effective_port(category) {
        command.arg("-p").arg(port.to_string());
    }
    command.arg(&destination);

    tracing::debug!(ssh = %settings.ssh_binary, %destination, "dispatching ssh");

    // Block until the delegated session ends
    let status = command
        .status()
        .with_context(|| format!("Failed to run '{}'", settings.ssh_binary))?;
    if !status.success() {
        bail!("'{}' exited with {}", settings.ssh_binary, status);
    }
    Ok(())
}

/// Append one line per connection when logging is enabled.
fn log_connection(
    store: &Store,
    settings: &Settings,
    category: &Category,
    host: &Host,
    destination: &str,
) -> Result<()> {
    if !settings.logging.enabled {
        return Ok(());
    }

    let path = settings
        .logging
        .path
        .clone()
        .unwrap_or_else(|| store.log_path());
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {:?}", parent))?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open connection log {:?}", path))?;
    writeln!(
        file,
        "{} {}/{} {}",
        chrono::Utc::now().to_rfc3339(),
        category.name,
        host.name,
        destination
    )
    .with_context(|| format!("Failed to write connection log {:?}", path))?;
    Ok(())
}
