pub mod cli;
pub mod core;
pub mod store;

use crate::cli::admin::{self, AdminAction};
use crate::cli::calculate::CalculateArgs;
use crate::cli::list::ListTarget;
use crate::core::config::AppConfig;
use crate::store::{DiskStore, ReferenceStore};
use anyhow::Result;
use tracing::{debug, info};

pub enum AppCommand {
    Calculate(CalculateArgs),
    List(ListTarget),
    Admin {
        password: Option<String>,
        action: AdminAction,
    },
    Seed {
        password: Option<String>,
        force: bool,
    },
}

/// Loads the config, opens the reference store it points at and runs `command`.
pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("EUDR calculator starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let store = DiskStore::open(&config.default_data_path()?.join("reference"))?;
    execute(command, &config, &store).await
}

/// Runs `command` against an already opened store.
pub async fn execute(
    command: AppCommand,
    config: &AppConfig,
    store: &dyn ReferenceStore,
) -> Result<()> {
    match command {
        AppCommand::Calculate(args) => cli::calculate::run(&args, store, config).await,
        AppCommand::List(target) => cli::list::run(&target, store).await,
        AppCommand::Admin { password, action } => {
            let cap = admin::authorize(config, password.as_deref())?;
            admin::run(action, store, &cap).await
        }
        AppCommand::Seed { password, force } => {
            let cap = admin::authorize(config, password.as_deref())?;
            cli::seed::run(store, &cap, force).await
        }
    }
}
