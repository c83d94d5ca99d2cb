use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use minishell::config::Config;
use minishell::{logging, repl};

fn main() -> Result<()> {
    let config = Config::parse();
    config.prepare()?;
    let _guard = logging::init(&config.log_dir, &config.log_level)?;
    info!(data_dir = %config.data_dir.display(), "starting minishell");

    if let Err(e) = repl::start_repl(&config) {
        error!(error = %format!("{:#}", e), "fatal error");
        return Err(e);
    }
    Ok(())
}
