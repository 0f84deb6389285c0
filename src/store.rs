use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::backup;
use crate::error::Error;
use crate::hosts::{Host, HostTable};
use crate::settings::{Category, Settings};

/// On-disk inventory store.
///
/// Rooted at `$ROSTER_HOME`, falling back to `$XDG_CONFIG_HOME/roster`
/// (default `~/.config/roster`):
///
/// ```text
/// <root>/
///   settings.toml            global settings + category registry
///   categories/<name>.toml   one host table per category
///   backups/<name>.<stamp>   timestamped snapshots, flat namespace
/// ```
///
/// Every mutation snapshots the current on-disk file first, then performs a
/// full-file replace. Expired snapshots are purged after each mutating
/// operation that produced at least one snapshot.
#[derive(Debug)]
pub struct Store {
    root: PathBuf,
}

impl Store {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve the inventory root from the environment.
    pub fn from_env() -> Result<Self> {
        if let Ok(home) = env::var("ROSTER_HOME") {
            return Ok(Self::new(PathBuf::from(home)));
        }

        let base = env::var("XDG_CONFIG_HOME").map(PathBuf::from).or_else(|_| {
            directories::BaseDirs::new()
                .map(|dirs| dirs.home_dir().join(".config"))
                .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))
        })?;

        Ok(Self::new(base.join("roster")))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn settings_path(&self) -> PathBuf {
        self.root.join("settings.toml")
    }

    pub fn categories_dir(&self) -> PathBuf {
        self.root.join("categories")
    }

    pub fn backups_dir(&self) -> PathBuf {
        self.root.join("backups")
    }

    pub fn table_path(&self, category: &str) -> PathBuf {
        self.categories_dir().join(format!("{category}.toml"))
    }

    /// Default connection log location when settings do not set one.
    pub fn log_path(&self) -> PathBuf {
        self.root.join("roster.log")
    }

    /// Read the global settings, or defaults when the file does not exist
    /// yet. A file that exists but does not match the schema is
    /// [`Error::CorruptConfig`] - no recovery is attempted.
    pub fn load(&self) -> Result<Settings> {
        let path = self.settings_path();
        if !path.exists() {
            return Ok(Settings::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read settings file {:?}", path))?;
        let settings: Settings = toml::from_str(&contents).map_err(|err| Error::CorruptConfig {
            path: path.clone(),
            reason: err.to_string(),
        })?;
        settings
            .validate()
            .map_err(|reason| Error::CorruptConfig { path, reason })?;

        Ok(settings)
    }

    /// Read one category's host table. An absent file is an empty table;
    /// the file is created on first write.
    pub fn read_table(&self, category: &str) -> Result<HostTable> {
        let path = self.table_path(category);
        if !path.exists() {
            return Ok(HostTable::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read host table {:?}", path))?;
        let table: HostTable = toml::from_str(&contents).map_err(|err| Error::CorruptConfig {
            path: path.clone(),
            reason: err.to_string(),
        })?;
        table
            .validate()
            .map_err(|reason| Error::CorruptConfig { path, reason })?;

        Ok(table)
    }

    pub fn write_settings(&self, settings: &Settings) -> Result<()> {
        let contents =
            toml::to_string_pretty(settings).context("Failed to serialize settings")?;
        self.write_file(
            &self.settings_path(),
            &contents,
            settings.backup_retention_days,
        )
    }

    pub fn write_table(
        &self,
        settings: &Settings,
        category: &str,
        table: &HostTable,
    ) -> Result<()> {
        let contents = toml::to_string_pretty(table)
            .with_context(|| format!("Failed to serialize host table for '{category}'"))?;
        self.write_file(
            &self.table_path(category),
            &contents,
            settings.backup_retention_days,
        )
    }

    /// Declare a new category and create its empty host table file.
    ///
    /// Only an exact name match is rejected; a category named the same as
    /// another category's alias is permitted.
    pub fn create_category(&self, category: Category) -> Result<()> {
        let mut settings = self.load()?;
        if settings.category(&category.name).is_some() {
            return Err(Error::DuplicateCategory(category.name).into());
        }

        let name = category.name.clone();
        settings.categories.push(category);
        settings
            .validate()
            .map_err(|reason| anyhow::anyhow!("invalid category: {reason}"))?;
        self.write_settings(&settings)?;

        if !self.table_path(&name).exists() {
            self.write_table(&settings, &name, &HostTable::default())?;
        }
        Ok(())
    }

    /// Remove a category from the registry along with its host table.
    pub fn remove_category(&self, name: &str) -> Result<()> {
        let mut settings = self.load()?;
        let idx = settings
            .categories
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| Error::UnknownCategory(name.to_string()))?;

        settings.categories.remove(idx);
        self.write_settings(&settings)?;

        let table_path = self.table_path(name);
        if table_path.exists() {
            backup::snapshot(&self.backups_dir(), &table_path)?;
            fs::remove_file(&table_path)
                .with_context(|| format!("Failed to remove host table {:?}", table_path))?;
            backup::purge(&self.backups_dir(), settings.backup_retention_days)?;
        }
        Ok(())
    }

    /// Upsert a host into a declared category's table. An existing host
    /// with the same name is overwritten silently - there is no duplicate
    /// guard for hosts, unlike categories.
    pub fn add_host(&self, category: &str, host: Host) -> Result<()> {
        let settings = self.load()?;
        if settings.category(category).is_none() {
            return Err(Error::UnknownCategory(category.to_string()).into());
        }

        let mut table = self.read_table(category)?;
        table.upsert(host);
        self.write_table(&settings, category, &table)
    }

    /// Remove a host from a declared category's table.
    pub fn remove_host(&self, category: &str, name: &str) -> Result<()> {
        let settings = self.load()?;
        if settings.category(category).is_none() {
            return Err(Error::UnknownCategory(category.to_string()).into());
        }

        let mut table = self.read_table(category)?;
        if table.remove(name).is_none() {
            anyhow::bail!("no host '{}' in category '{}'", name, category);
        }
        self.write_table(&settings, category, &table)
    }

    /// Snapshot-then-replace write path shared by every mutation.
    fn write_file(&self, path: &Path, contents: &str, retention_days: u32) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }

        let snapshotted = backup::snapshot(&self.backups_dir(), path)?;
        fs::write(path, contents).with_context(|| format!("Failed to write {:?}", path))?;

        if snapshotted.is_some() {
            backup::purge(&self.backups_dir(), retention_days)?;
        }
        Ok(())
    }
}
