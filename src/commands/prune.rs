use anyhow::Result;

use crate::backup;
use crate::store::Store;
use crate::ui;

pub fn execute(store: &Store) -> Result<()> {
    let settings = store.load()?;
    let removed = backup::purge(&store.backups_dir(), settings.backup_retention_days)?;

    if removed == 0 {
        ui::info(format!(
            "No backups older than {} day(s)",
            settings.backup_retention_days
        ));
    } else {
        ui::success("Pruned", format!("{removed} backup(s)"));
    }
    Ok(())
}
