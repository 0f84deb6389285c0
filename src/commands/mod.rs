use crate::cli::{Cli, Commands};
use crate::Store;
use anyhow::Result;

mod category;
mod connect;
mod export;
mod host;
mod hosts_block;
mod import;
mod init;
mod prune;

pub fn execute(cli: Cli) -> Result<()> {
    // Resolve the inventory root - this is the root entry point
    let store = Store::from_env()?;

    match cli.command {
        Commands::Init => init::execute(&store),

        Commands::Category(action) => category::execute(&store, action),

        Commands::Host(action) => host::execute(&store, action),

        Commands::Connect { category, host } => connect::execute(&store, &category, &host),

        Commands::Hosts(action) => hosts_block::execute(&store, action),

        Commands::Export { archive } => export::execute(&store, &archive),

        Commands::Import { archive } => import::execute(&store, &archive),

        Commands::Prune => prune::execute(&store),
    }
}
