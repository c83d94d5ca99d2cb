// config.rs

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

/// Interactive file-management shell with undo.
#[derive(Debug, Clone, Parser)]
#[command(name = "minishell", version, about)]
pub struct Config {
    /// Where the command history and trash live.
    #[arg(long, env = "MINISHELL_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Where `shell.log` is written.
    #[arg(long, env = "MINISHELL_LOG_DIR", default_value = "logs")]
    pub log_dir: PathBuf,

    /// Log filter directive, e.g. `info` or `minishell=debug`.
    #[arg(long, env = "MINISHELL_LOG", default_value = "info")]
    pub log_level: String,
}

impl Config {
    /// Creates the data and log directories.
    pub fn prepare(&self) -> Result<()> {
        for dir in [&self.data_dir, &self.log_dir] {
            fs::create_dir_all(dir).with_context(|| format!("cannot create {}", dir.display()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let config = Config::try_parse_from(["minishell", "--data-dir", "/tmp/d", "--log-level", "debug"]).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/d"));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn prepare_creates_directories() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = Config {
            data_dir: tmp.path().join("a/data"),
            log_dir: tmp.path().join("b/logs"),
            log_level: "info".into(),
        };
        config.prepare().unwrap();
        assert!(config.data_dir.is_dir());
        assert!(config.log_dir.is_dir());
    }
}
