use serde::{Deserialize, Serialize};

use crate::settings::Category;

/// All hosts belonging to one category.
///
/// Persisted as `categories/<name>.toml`, one file per category. Hosts are
/// an array of tables so table order is the file order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HostTable {
    #[serde(default, rename = "host", skip_serializing_if = "Vec::is_empty")]
    pub hosts: Vec<Host>,
}

/// One addressable target within a category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Host {
    pub name: String,
    /// Connection address; the host name itself is assumed resolvable by
    /// the name system when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

impl HostTable {
    /// Look up a host by exact name.
    pub fn get(&self, name: &str) -> Option<&Host> {
        self.hosts.iter().find(|h| h.name == name)
    }

    /// Insert or silently replace the host with the same name.
    pub fn upsert(&mut self, host: Host) {
        match self.hosts.iter_mut().find(|h| h.name == host.name) {
            Some(existing) => *existing = host,
            None => self.hosts.push(host),
        }
    }

    /// Remove a host by name, returning it if present.
    pub fn remove(&mut self, name: &str) -> Option<Host> {
        let idx = self.hosts.iter().position(|h| h.name == name)?;
        Some(self.hosts.remove(idx))
    }

    /// Check that host names are unique and non-empty.
    pub fn validate(&self) -> Result<(), String> {
        for (idx, host) in self.hosts.iter().enumerate() {
            if host.name.is_empty() {
                return Err("host with empty name".to_string());
            }
            if self.hosts[..idx].iter().any(|h| h.name == host.name) {
                return Err(format!("duplicate host '{}'", host.name));
            }
        }
        Ok(())
    }
}

impl Host {
    /// Address to connect to - falls back to the host name itself.
    pub fn effective_address(&self) -> &str {
        self.address.as_deref().unwrap_or(&self.name)
    }

    /// Username after category inheritance; `None` delegates to the
    /// external ssh client's own defaults.
    pub fn effective_user<'a>(&'a self, category: &'a Category) -> Option<&'a str> {
        self.user.as_deref().or(category.user.as_deref())
    }

    /// Port after category inheritance; `None` delegates to the external
    /// ssh client's own defaults.
    pub fn effective_port(&self, category: &Category) -> Option<u16> {
        self.port.or(category.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(user: Option<&str>, port: Option<u16>) -> Category {
        Category {
            name: "firewalls".to_string(),
            emoji: String::new(),
            user: user.map(String::from),
            port,
            aliases: Vec::new(),
        }
    }

    fn host(name: &str) -> Host {
        Host {
            name: name.to_string(),
            address: None,
            user: None,
            port: None,
            aliases: Vec::new(),
        }
    }

    #[test]
    fn test_effective_address_falls_back_to_name() {
        let mut h = host("paris-fw-1");
        assert_eq!(h.effective_address(), "paris-fw-1");

        h.address = Some("1.1.1.1".to_string());
        assert_eq!(h.effective_address(), "1.1.1.1");
    }

    #[test]
    fn test_effective_user_and_port_inherit_from_category() {
        let cat = category(Some("admin"), Some(2222));
        let mut h = host("paris-fw-1");

        assert_eq!(h.effective_user(&cat), Some("admin"));
        assert_eq!(h.effective_port(&cat), Some(2222));

        h.user = Some("root".to_string());
        h.port = Some(22);
        assert_eq!(h.effective_user(&cat), Some("root"));
        assert_eq!(h.effective_port(&cat), Some(22));
    }

    #[test]
    fn test_both_absent_delegates_to_ssh_defaults() {
        let cat = category(None, None);
        let h = host("paris-fw-1");
        assert_eq!(h.effective_user(&cat), None);
        assert_eq!(h.effective_port(&cat), None);
    }

    #[test]
    fn test_upsert_replaces_silently() {
        let mut table = HostTable::default();
        table.upsert(host("a"));
        table.upsert(host("b"));

        let mut replacement = host("a");
        replacement.address = Some("10.0.0.1".to_string());
        table.upsert(replacement);

        assert_eq!(table.hosts.len(), 2);
        assert_eq!(table.get("a").unwrap().address.as_deref(), Some("10.0.0.1"));
        // table order is preserved across an upsert
        assert_eq!(table.hosts[0].name, "a");
        assert_eq!(table.hosts[1].name, "b");
    }

    #[test]
    fn test_remove() {
        let mut table = HostTable::default();
        table.upsert(host("a"));
        assert!(table.remove("a").is_some());
        assert!(table.remove("a").is_none());
    }

    #[test]
    fn test_validate_rejects_duplicate_host() {
        let table = HostTable {
            hosts: vec![host("a"), host("a")],
        };
        assert!(table.validate().is_err());
    }
}
