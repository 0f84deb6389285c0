use anyhow::Result;

use crate::cli::CategoryAction;
use crate::settings::Category;
use crate::store::Store;
use crate::ui;

pub fn execute(store: &Store, action: CategoryAction) -> Result<()> {
    match action {
        CategoryAction::Add {
            name,
            emoji,
            user,
            port,
            aliases,
        } => {
            store.create_category(Category {
                name: name.clone(),
                emoji,
                user,
                port,
                aliases,
            })?;
            ui::success("Added", format!("category '{name}'"));
            Ok(())
        }

        CategoryAction::List => list(store),

        CategoryAction::Remove { name } => {
            store.remove_category(&name)?;
            ui::success("Removed", format!("category '{name}'"));
            Ok(())
        }
    }
}

fn list(store: &Store) -> Result<()> {
    let settings = store.load()?;
    if settings.categories.is_empty() {
        ui::info("No categories declared");
        return Ok(());
    }

    for category in &settings.categories {
        let mut line = String::new();
        if !category.emoji.is_empty() {
            line.push_str(&category.emoji);
            line.push(' ');
        }
        line.push_str(&category.name);
        if !category.aliases.is_empty() {
            line.push_str(&format!(" ({})", category.aliases.join(", ")));
        }

        let table = store.read_table(&category.name)?;
        line.push_str(&format!(" - {} host(s)", table.hosts.len()));

        println!("{line}");
    }
    Ok(())
}
