use anyhow::Result;
use std::collections::BTreeMap;

use crate::cli::HostsAction;
use crate::hostsblock;
use crate::store::Store;
use crate::ui;

pub fn execute(store: &Store, action: HostsAction) -> Result<()> {
    let settings = store.load()?;

    let mut tables = BTreeMap::new();
    for category in &settings.categories {
        if !store.table_path(&category.name).exists() {
            ui::warn(format!(
                "category '{}' has no host table, skipping",
                category.name
            ));
            continue;
        }
        tables.insert(category.name.clone(), store.read_table(&category.name)?);
    }

    let block = hostsblock::render(&settings, &tables);

    match action {
        HostsAction::Render => {
            print!("{block}");
            Ok(())
        }

        HostsAction::Apply { target } => {
            hostsblock::apply(store, &settings, &target, &block)?;
            ui::success("Updated", format!("{:?}", target));
            Ok(())
        }
    }
}
