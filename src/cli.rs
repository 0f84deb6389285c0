use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Roster - SSH target inventory
///
/// roster keeps your SSH targets grouped into categories with per-category
/// connection defaults. Short aliases resolve to full connection
/// parameters, exported inventories merge into the local one, and a managed
/// block of name/address mappings can be regenerated inside any hosts file.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the inventory with default settings
    Init,

    /// Manage categories
    #[command(subcommand)]
    Category(CategoryAction),

    /// Manage hosts within a category
    #[command(subcommand)]
    Host(HostAction),

    /// Open an SSH session to a host
    ///
    /// Both arguments accept the entry's name or any of its aliases.
    Connect {
        /// Category name or alias
        #[arg(value_name = "CATEGORY")]
        category: String,

        /// Host name or alias
        #[arg(value_name = "HOST")]
        host: String,
    },

    /// Render or apply the managed hosts block
    #[command(subcommand)]
    Hosts(HostsAction),

    /// Pack the inventory into a .tar.gz archive
    Export {
        /// Archive file to create
        #[arg(value_name = "ARCHIVE")]
        archive: PathBuf,
    },

    /// Merge an exported archive into this inventory
    ///
    /// Values from the archive win over local ones; entries present only
    /// locally are kept.
    Import {
        /// Archive file to merge
        #[arg(value_name = "ARCHIVE")]
        archive: PathBuf,
    },

    /// Delete backup snapshots older than the retention window
    Prune,
}

#[derive(Subcommand, Debug)]
pub enum CategoryAction {
    /// Declare a new category
    Add {
        /// Category name (must not collide with an existing name)
        #[arg(value_name = "NAME")]
        name: String,

        /// Display emoji shown in listings and hosts-block labels
        #[arg(short, long, default_value = "")]
        emoji: String,

        /// Default username for hosts in this category
        #[arg(short, long)]
        user: Option<String>,

        /// Default port for hosts in this category
        #[arg(short, long)]
        port: Option<u16>,

        /// Alternate token resolving to this category (repeatable)
        #[arg(short, long = "alias", value_name = "ALIAS")]
        aliases: Vec<String>,
    },

    /// List declared categories
    List,

    /// Remove a category and its host table
    Remove {
        /// Category name (exact, not an alias)
        #[arg(value_name = "NAME")]
        name: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum HostAction {
    /// Add a host, or silently replace one with the same name
    Add {
        /// Category name or alias
        #[arg(value_name = "CATEGORY")]
        category: String,

        /// Host name
        #[arg(value_name = "NAME")]
        name: String,

        /// Connection address; defaults to the host name itself
        #[arg(short, long)]
        address: Option<String>,

        /// Username override for this host
        #[arg(short, long)]
        user: Option<String>,

        /// Port override for this host
        #[arg(short, long)]
        port: Option<u16>,

        /// Alternate token resolving to this host (repeatable)
        #[arg(long = "alias", value_name = "ALIAS")]
        aliases: Vec<String>,
    },

    /// List hosts in a category
    List {
        /// Category name or alias
        #[arg(value_name = "CATEGORY")]
        category: String,
    },

    /// Remove a host from a category
    Remove {
        /// Category name or alias
        #[arg(value_name = "CATEGORY")]
        category: String,

        /// Host name (exact, not an alias)
        #[arg(value_name = "NAME")]
        name: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum HostsAction {
    /// Print the rendered block to stdout
    Render,

    /// Replace the managed block inside the target file
    Apply {
        /// File to rewrite (e.g. /etc/hosts)
        #[arg(short, long, value_name = "FILE")]
        target: PathBuf,
    },
}
