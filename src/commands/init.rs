use anyhow::Result;

use crate::settings::Settings;
use crate::store::Store;
use crate::ui;

pub fn execute(store: &Store) -> Result<()> {
    if store.settings_path().exists() {
        ui::info(format!(
            "Inventory already initialized at {:?}",
            store.root()
        ));
        return Ok(());
    }

    store.write_settings(&Settings::default())?;
    ui::success("Created", format!("{:?}", store.settings_path()));
    Ok(())
}
