use anyhow::Result;
use std::path::Path;

use crate::archive;
use crate::error::Error;
use crate::hosts::HostTable;
use crate::merge::{SettingsPatch, TablePatch};
use crate::settings::Settings;
use crate::store::Store;
use crate::ui;

/// Merge an exported archive into the local inventory.
///
/// Everything is unpacked, parsed, and merged in memory first; the first
/// malformed entry aborts with the on-disk state untouched. Writes go
/// through the store's snapshot-then-replace path.
pub fn execute(store: &Store, archive_path: &Path) -> Result<()> {
    let files = archive::unpack(archive_path)?;
    if files.is_empty() {
        ui::info("Archive contains no inventory files");
        return Ok(());
    }

    let base = store.load()?;

    // Stage the settings merge first so table merges for newly imported
    // categories still validate against the updated registry.
    let mut merged_settings: Option<Settings> = None;
    let mut merged_tables: Vec<(String, HostTable)> = Vec::new();

    for (name, contents) in &files {
        if name == "settings.toml" {
            let patch: SettingsPatch = toml::from_str(contents)
                .map_err(|err| Error::ImportMalformed(format!("{name}: {err}")))?;
            let mut settings = base.clone();
            patch.apply(&mut settings);
            settings
                .validate()
                .map_err(|reason| Error::ImportMalformed(format!("{name}: {reason}")))?;
            merged_settings = Some(settings);
            continue;
        }

        // archive::unpack only lets categories/<key>.toml through
        let key = name
            .trim_start_matches("categories/")
            .trim_end_matches(".toml");
        let patch: TablePatch = toml::from_str(contents)
            .map_err(|err| Error::ImportMalformed(format!("{name}: {err}")))?;

        // a table with no counterpart on disk is imported as a new file;
        // it is NOT auto-registered in the category registry
        let table = if store.table_path(key).exists() {
            let mut table = store.read_table(key)?;
            patch.apply(&mut table);
            table
        } else {
            patch.into_table()
        };
        table
            .validate()
            .map_err(|reason| Error::ImportMalformed(format!("{name}: {reason}")))?;
        merged_tables.push((key.to_string(), table));
    }

    // Everything validated - now touch the disk.
    let count = merged_tables.len() + usize::from(merged_settings.is_some());
    let settings = match merged_settings {
        Some(settings) => {
            store.write_settings(&settings)?;
            settings
        }
        None => base,
    };
    for (key, table) in merged_tables {
        store.write_table(&settings, &key, &table)?;
    }

    ui::success("Imported", format!("{count} file(s) from {:?}", archive_path));
    Ok(())
}
