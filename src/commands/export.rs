use anyhow::Result;
use std::path::Path;

use crate::archive;
use crate::store::Store;
use crate::ui;

pub fn execute(store: &Store, dest: &Path) -> Result<()> {
    let packed = archive::pack(store, dest)?;
    ui::success("Exported", format!("{packed} file(s) to {:?}", dest));
    Ok(())
}
