use serde::Deserialize;
use std::path::PathBuf;

use crate::hosts::{Host, HostTable};
use crate::settings::{Category, Settings};

/// Partially specified settings as parsed from an imported archive.
///
/// Every field is optional so that merging is a deep right-biased overlay:
/// fields absent from the incoming file keep the base value, fields present
/// replace it unconditionally. Name-keyed collections recurse the same rule
/// per entry; alias lists are treated as scalars and replaced wholesale.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct SettingsPatch {
    ssh_binary: Option<String>,
    welcome: Option<bool>,
    backup_retention_days: Option<u32>,
    logging: Option<LogPatch>,
    #[serde(default, rename = "category")]
    categories: Vec<CategoryPatch>,
}

#[derive(Debug, Default, Clone, Deserialize)]
struct LogPatch {
    enabled: Option<bool>,
    path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryPatch {
    name: String,
    emoji: Option<String>,
    user: Option<String>,
    port: Option<u16>,
    aliases: Option<Vec<String>>,
}

/// Partially specified host table from an imported archive.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct TablePatch {
    #[serde(default, rename = "host")]
    hosts: Vec<HostPatch>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HostPatch {
    name: String,
    address: Option<String>,
    user: Option<String>,
    port: Option<u16>,
    aliases: Option<Vec<String>>,
}

impl SettingsPatch {
    /// Overlay this patch onto `base`. Never fails on well-formed trees.
    pub fn apply(self, base: &mut Settings) {
        if let Some(ssh_binary) = self.ssh_binary {
            base.ssh_binary = ssh_binary;
        }
        if let Some(welcome) = self.welcome {
            base.welcome = welcome;
        }
        if let Some(days) = self.backup_retention_days {
            base.backup_retention_days = days;
        }
        if let Some(logging) = self.logging {
            if let Some(enabled) = logging.enabled {
                base.logging.enabled = enabled;
            }
            if let Some(path) = logging.path {
                base.logging.path = Some(path);
            }
        }

        // Categories only in the base are kept, categories only in the
        // incoming tree are appended in incoming order, categories in both
        // recurse field by field.
        for patch in self.categories {
            match base.category_mut(&patch.name) {
                Some(existing) => patch.apply(existing),
                None => base.categories.push(patch.into_category()),
            }
        }
    }
}

impl CategoryPatch {
    fn apply(self, base: &mut Category) {
        if let Some(emoji) = self.emoji {
            base.emoji = emoji;
        }
        if let Some(user) = self.user {
            base.user = Some(user);
        }
        if let Some(port) = self.port {
            base.port = Some(port);
        }
        // alias lists are not merged element-wise
        if let Some(aliases) = self.aliases {
            base.aliases = aliases;
        }
    }

    fn into_category(self) -> Category {
        Category {
            name: self.name,
            emoji: self.emoji.unwrap_or_default(),
            user: self.user,
            port: self.port,
            aliases: self.aliases.unwrap_or_default(),
        }
    }
}

impl TablePatch {
    /// Overlay this patch onto an existing table.
    pub fn apply(self, base: &mut HostTable) {
        for patch in self.hosts {
            match base.hosts.iter_mut().find(|h| h.name == patch.name) {
                Some(existing) => patch.apply(existing),
                None => base.hosts.push(patch.into_host()),
            }
        }
    }

    /// Materialize a table that has no on-disk counterpart.
    pub fn into_table(self) -> HostTable {
        HostTable {
            hosts: self.hosts.into_iter().map(HostPatch::into_host).collect(),
        }
    }
}

impl HostPatch {
    fn apply(self, base: &mut Host) {
        if let Some(address) = self.address {
            base.address = Some(address);
        }
        if let Some(user) = self.user {
            base.user = Some(user);
        }
        if let Some(port) = self.port {
            base.port = Some(port);
        }
        if let Some(aliases) = self.aliases {
            base.aliases = aliases;
        }
    }

    fn into_host(self) -> Host {
        Host {
            name: self.name,
            address: self.address,
            user: self.user,
            port: self.port,
            aliases: self.aliases.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_settings() -> Settings {
        toml::from_str(
            r#"
ssh_binary = "/usr/bin/ssh"
welcome = true

[[category]]
name = "firewalls"
user = "admin"
aliases = ["fw"]

[[category]]
name = "web"
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_scalar_present_in_incoming_wins() {
        let mut base = base_settings();
        let patch: SettingsPatch = toml::from_str("ssh_binary = \"mosh\"\n").unwrap();

        patch.apply(&mut base);

        assert_eq!(base.ssh_binary, "mosh");
        // untouched scalars keep the base value
        assert!(base.welcome);
    }

    #[test]
    fn test_categories_only_in_base_are_kept() {
        let mut base = base_settings();
        let patch: SettingsPatch = toml::from_str(
            r#"
[[category]]
name = "db"
aliases = ["d"]
"#,
        )
        .unwrap();

        patch.apply(&mut base);

        let names: Vec<_> = base.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["firewalls", "web", "db"]);
    }

    #[test]
    fn test_category_in_both_recurses() {
        let mut base = base_settings();
        let patch: SettingsPatch = toml::from_str(
            r#"
[[category]]
name = "firewalls"
port = 2222
"#,
        )
        .unwrap();

        patch.apply(&mut base);

        let fw = base.category("firewalls").unwrap();
        assert_eq!(fw.port, Some(2222));
        // fields absent from the incoming category keep the base value
        assert_eq!(fw.user.as_deref(), Some("admin"));
        assert_eq!(fw.aliases, ["fw"]);
    }

    #[test]
    fn test_alias_list_replaced_wholesale() {
        let mut base = base_settings();
        let patch: SettingsPatch = toml::from_str(
            r#"
[[category]]
name = "firewalls"
aliases = ["walls"]
"#,
        )
        .unwrap();

        patch.apply(&mut base);

        assert_eq!(base.category("firewalls").unwrap().aliases, ["walls"]);
    }

    #[test]
    fn test_last_writer_wins_regardless_of_grouping() {
        // B sets retention to 1, C sets it to 2: the final value is 2
        // whether we fold left or right. This pins down that merge is
        // last-writer-wins rather than associative conflict resolution.
        let b = "backup_retention_days = 1\n";
        let c = "backup_retention_days = 2\n";

        let mut left = Settings::default();
        toml::from_str::<SettingsPatch>(b).unwrap().apply(&mut left);
        toml::from_str::<SettingsPatch>(c).unwrap().apply(&mut left);

        let mut right = Settings::default();
        let mut bc = Settings::default();
        toml::from_str::<SettingsPatch>(b).unwrap().apply(&mut bc);
        toml::from_str::<SettingsPatch>(c).unwrap().apply(&mut bc);
        toml::from_str::<SettingsPatch>(&toml::to_string(&bc).unwrap())
            .unwrap()
            .apply(&mut right);

        assert_eq!(left.backup_retention_days, 2);
        assert_eq!(right.backup_retention_days, 2);
    }

    #[test]
    fn test_table_patch_recurses_per_host() {
        let mut base: HostTable = toml::from_str(
            r#"
[[host]]
name = "paris-fw-1"
address = "1.1.1.1"
aliases = ["paris"]

[[host]]
name = "lyon-fw-1"
"#,
        )
        .unwrap();

        let patch: TablePatch = toml::from_str(
            r#"
[[host]]
name = "paris-fw-1"
port = 2222

[[host]]
name = "nice-fw-1"
"#,
        )
        .unwrap();

        patch.apply(&mut base);

        let names: Vec<_> = base.hosts.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, ["paris-fw-1", "lyon-fw-1", "nice-fw-1"]);
        let paris = base.get("paris-fw-1").unwrap();
        assert_eq!(paris.port, Some(2222));
        assert_eq!(paris.address.as_deref(), Some("1.1.1.1"));
        assert_eq!(paris.aliases, ["paris"]);
    }

    #[test]
    fn test_into_table_for_new_category_file() {
        let patch: TablePatch = toml::from_str(
            r#"
[[host]]
name = "core-sw-1"
address = "10.0.0.2"
"#,
        )
        .unwrap();

        let table = patch.into_table();
        assert_eq!(table.hosts.len(), 1);
        assert_eq!(table.hosts[0].name, "core-sw-1");
    }
}
