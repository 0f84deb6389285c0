use anyhow::{anyhow, Result};

use crate::cli::HostAction;
use crate::hosts::Host;
use crate::resolve::resolve_category;
use crate::store::Store;
use crate::ui;

pub fn execute(store: &Store, action: HostAction) -> Result<()> {
    match action {
        HostAction::Add {
            category,
            name,
            address,
            user,
            port,
            aliases,
        } => {
            let category = resolve(store, &category)?;
            store.add_host(
                &category,
                Host {
                    name: name.clone(),
                    address,
                    user,
                    port,
                    aliases,
                },
            )?;
            ui::success("Added", format!("host '{name}' to '{category}'"));
            Ok(())
        }

        HostAction::List { category } => list(store, &category),

        HostAction::Remove { category, name } => {
            let category = resolve(store, &category)?;
            store.remove_host(&category, &name)?;
            ui::success("Removed", format!("host '{name}' from '{category}'"));
            Ok(())
        }
    }
}

/// Turn a user-typed token into a canonical category name.
fn resolve(store: &Store, token: &str) -> Result<String> {
    let settings = store.load()?;
    resolve_category(&settings.categories, token)
        .map(|c| c.name.clone())
        .ok_or_else(|| anyhow!("no category matches '{token}'"))
}

fn list(store: &Store, token: &str) -> Result<()> {
    let settings = store.load()?;
    let category = resolve_category(&settings.categories, token)
        .ok_or_else(|| anyhow!("no category matches '{token}'"))?;

    let table = store.read_table(&category.name)?;
    if table.hosts.is_empty() {
        ui::info(format!("No hosts in category '{}'", category.name));
        return Ok(());
    }

    for host in &table.hosts {
        let mut line = format!("{} -> {}", host.name, host.effective_address());
        if let Some(user) = host.effective_user(category) {
            line.push_str(&format!(" user={user}"));
        }
        if let Some(port) = host.effective_port(category) {
            line.push_str(&format!(" port={port}"));
        }
        if !host.aliases.is_empty() {
            line.push_str(&format!(" ({})", host.aliases.join(", ")));
        }
        println!("{line}");
    }
    Ok(())
}
