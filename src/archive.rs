use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;
use tar::{Archive, Builder};

use crate::error::Error;
use crate::store::Store;

const SETTINGS_ENTRY: &str = "settings.toml";
const CATEGORIES_PREFIX: &str = "categories/";

/// Pack the inventory (`settings.toml` + `categories/*.toml`) into a
/// gzipped tarball. Returns the number of files packed.
pub fn pack(store: &Store, dest: &Path) -> Result<usize> {
    let file = File::create(dest)
        .with_context(|| format!("Failed to create archive {:?}", dest))?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = Builder::new(encoder);
    let mut packed = 0;

    let settings_path = store.settings_path();
    if settings_path.exists() {
        builder
            .append_path_with_name(&settings_path, SETTINGS_ENTRY)
            .with_context(|| format!("Failed to archive {:?}", settings_path))?;
        packed += 1;
    }

    let categories_dir = store.categories_dir();
    if categories_dir.exists() {
        let mut tables: Vec<_> = fs::read_dir(&categories_dir)
            .with_context(|| format!("Failed to read {:?}", categories_dir))?
            .collect::<std::io::Result<Vec<_>>>()?
            .into_iter()
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "toml"))
            .collect();
        tables.sort();

        for path in tables {
            let name = path
                .file_name()
                .with_context(|| format!("Table path {:?} has no filename", path))?
                .to_string_lossy()
                .into_owned();
            builder
                .append_path_with_name(&path, format!("{CATEGORIES_PREFIX}{name}"))
                .with_context(|| format!("Failed to archive {:?}", path))?;
            packed += 1;
        }
    }

    builder
        .into_inner()
        .context("Failed to finish archive")?
        .finish()
        .context("Failed to finish gzip stream")?;
    Ok(packed)
}

/// Read every file of an inventory archive into memory.
///
/// Entries are returned as `(archive path, contents)` pairs in archive
/// order. Anything other than `settings.toml` or a flat `categories/*.toml`
/// file is [`Error::ImportMalformed`] - nothing on disk has been touched at
/// this point.
pub fn unpack(src: &Path) -> Result<Vec<(String, String)>> {
    let file =
        File::open(src).with_context(|| format!("Failed to open archive {:?}", src))?;
    let mut archive = Archive::new(GzDecoder::new(file));
    let mut files = Vec::new();

    let entries = archive
        .entries()
        .with_context(|| format!("Failed to read archive {:?}", src))?;

    for entry in entries {
        let mut entry = entry.with_context(|| format!("Failed to read entry in {:?}", src))?;
        if !entry.header().entry_type().is_file() {
            continue;
        }

        let path = entry
            .path()
            .with_context(|| format!("Archive {:?} has an entry with no path", src))?;
        let name = path.to_string_lossy().into_owned();
        let name = name.trim_start_matches("./").to_string();
        validate_entry_name(&name)?;

        let mut contents = String::new();
        entry
            .read_to_string(&mut contents)
            .map_err(|err| Error::ImportMalformed(format!("entry '{name}': {err}")))?;
        files.push((name, contents));
    }

    Ok(files)
}

fn validate_entry_name(name: &str) -> Result<()> {
    if name == SETTINGS_ENTRY {
        return Ok(());
    }
    if let Some(table) = name.strip_prefix(CATEGORIES_PREFIX) {
        if !table.is_empty() && !table.contains('/') && table.ends_with(".toml") {
            return Ok(());
        }
    }
    Err(Error::ImportMalformed(format!("unexpected entry '{name}'")).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::hosts::{Host, HostTable};
    use crate::settings::{Category, Settings};
    use rstest::rstest;
    use tempfile::TempDir;

    fn seeded_store(temp: &TempDir) -> Store {
        let store = Store::new(temp.path().join("roster"));
        store
            .create_category(Category {
                name: "firewalls".to_string(),
                emoji: String::new(),
                user: None,
                port: None,
                aliases: vec!["fw".to_string()],
            })
            .unwrap();
        store
            .add_host(
                "firewalls",
                Host {
                    name: "paris-fw-1".to_string(),
                    address: Some("1.1.1.1".to_string()),
                    user: None,
                    port: None,
                    aliases: Vec::new(),
                },
            )
            .unwrap();
        store
    }

    #[test]
    fn test_pack_then_unpack_round_trip() {
        let temp = TempDir::new().unwrap();
        let store = seeded_store(&temp);
        let archive = temp.path().join("inventory.tar.gz");

        let packed = pack(&store, &archive).unwrap();
        assert_eq!(packed, 2);

        let files = unpack(&archive).unwrap();
        let names: Vec<_> = files.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["settings.toml", "categories/firewalls.toml"]);

        let settings: Settings = toml::from_str(&files[0].1).unwrap();
        assert!(settings.category("firewalls").is_some());
        let table: HostTable = toml::from_str(&files[1].1).unwrap();
        assert!(table.get("paris-fw-1").is_some());
    }

    #[test]
    fn test_unexpected_entry_is_malformed() {
        let temp = TempDir::new().unwrap();
        let archive_path = temp.path().join("bogus.tar.gz");

        let file = File::create(&archive_path).unwrap();
        let mut builder = Builder::new(GzEncoder::new(file, Compression::default()));
        let data = b"whatever";
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_cksum();
        builder.append_data(&mut header, "etc/passwd", &data[..]).unwrap();
        builder.into_inner().unwrap().finish().unwrap();

        let err = unpack(&archive_path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::ImportMalformed(_))
        ));
    }

    #[rstest]
    #[case("settings.toml", true)]
    #[case("categories/firewalls.toml", true)]
    #[case("categories/deep/nested.toml", false)]
    #[case("categories/", false)]
    #[case("categories/notes.txt", false)]
    #[case("README.md", false)]
    fn test_validate_entry_name(#[case] name: &str, #[case] ok: bool) {
        assert_eq!(validate_entry_name(name).is_ok(), ok);
    }
}
