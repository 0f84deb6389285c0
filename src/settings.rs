use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const DEFAULT_SSH_BINARY: &str = "ssh";
const DEFAULT_RETENTION_DAYS: u32 = 7;

/// Global inventory settings plus the category registry.
///
/// Persisted as `settings.toml` at the inventory root. Categories are
/// serialized as an array of tables so their declaration order is the file
/// order - resolution and rendering both depend on it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// SSH client to dispatch to; resolved through `$PATH` when not absolute.
    #[serde(default = "default_ssh_binary")]
    pub ssh_binary: String,
    /// Print a banner before connecting.
    #[serde(default)]
    pub welcome: bool,
    /// Backup snapshots older than this many days are purged.
    #[serde(default = "default_retention_days")]
    pub backup_retention_days: u32,
    #[serde(default)]
    pub logging: LogSettings,
    #[serde(default, rename = "category", skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<Category>,
}

/// Connection log preferences.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LogSettings {
    #[serde(default)]
    pub enabled: bool,
    /// Log file location; defaults to `roster.log` at the inventory root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// A named grouping of hosts sharing default connection settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub name: String,
    /// Display label only, never part of resolution.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub emoji: String,
    /// Default username for hosts that do not set their own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Default port for hosts that do not set their own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Alternate tokens that resolve to this category. The category name
    /// itself always outranks these.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ssh_binary: DEFAULT_SSH_BINARY.to_string(),
            welcome: false,
            backup_retention_days: DEFAULT_RETENTION_DAYS,
            logging: LogSettings::default(),
            categories: Vec::new(),
        }
    }
}

impl Settings {
    /// Look up a category by exact name.
    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn category_mut(&mut self, name: &str) -> Option<&mut Category> {
        self.categories.iter_mut().find(|c| c.name == name)
    }

    /// Check the registry invariants: category names are unique, non-empty,
    /// and each category's aliases are unique within it.
    pub fn validate(&self) -> Result<(), String> {
        for (idx, category) in self.categories.iter().enumerate() {
            if category.name.is_empty() {
                return Err("category with empty name".to_string());
            }
            if self.categories[..idx].iter().any(|c| c.name == category.name) {
                return Err(format!("duplicate category '{}'", category.name));
            }
            for (aidx, alias) in category.aliases.iter().enumerate() {
                if category.aliases[..aidx].contains(alias) {
                    return Err(format!(
                        "category '{}' declares alias '{}' twice",
                        category.name, alias
                    ));
                }
            }
        }
        Ok(())
    }
}

fn default_ssh_binary() -> String {
    DEFAULT_SSH_BINARY.to_string()
}

fn default_retention_days() -> u32 {
    DEFAULT_RETENTION_DAYS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_fall_open_to_defaults() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings.ssh_binary, "ssh");
        assert!(!settings.welcome);
        assert_eq!(settings.backup_retention_days, 7);
        assert!(!settings.logging.enabled);
        assert!(settings.categories.is_empty());
    }

    #[test]
    fn test_categories_keep_declaration_order() {
        let settings: Settings = toml::from_str(
            r#"
[[category]]
name = "firewalls"
aliases = ["fw"]

[[category]]
name = "switches"
"#,
        )
        .unwrap();

        let names: Vec<_> = settings.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["firewalls", "switches"]);
    }

    #[test]
    fn test_roundtrip() {
        let mut settings = Settings::default();
        settings.welcome = true;
        settings.categories.push(Category {
            name: "firewalls".to_string(),
            emoji: "🔥".to_string(),
            user: Some("admin".to_string()),
            port: Some(2222),
            aliases: vec!["fw".to_string()],
        });

        let text = toml::to_string_pretty(&settings).unwrap();
        let reloaded: Settings = toml::from_str(&text).unwrap();
        assert_eq!(reloaded, settings);
    }

    #[test]
    fn test_validate_rejects_duplicate_category() {
        let settings: Settings = toml::from_str(
            r#"
[[category]]
name = "web"

[[category]]
name = "web"
"#,
        )
        .unwrap();

        let err = settings.validate().unwrap_err();
        assert!(err.contains("duplicate category"));
    }

    #[test]
    fn test_validate_rejects_empty_name() {
        let settings: Settings = toml::from_str("[[category]]\nname = \"\"\n").unwrap();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_repeated_alias_within_category() {
        let settings: Settings = toml::from_str(
            r#"
[[category]]
name = "web"
aliases = ["w", "w"]
"#,
        )
        .unwrap();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_alias_collision_across_categories_is_permitted() {
        let settings: Settings = toml::from_str(
            r#"
[[category]]
name = "web"
aliases = ["prod"]

[[category]]
name = "db"
aliases = ["prod"]
"#,
        )
        .unwrap();
        assert!(settings.validate().is_ok());
    }
}
