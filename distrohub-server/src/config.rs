//! Server configuration, read from the environment.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

const DEFAULT_PORT: u16 = 8080;

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP port to listen on. `PORT`, default 8080.
    pub port: u16,
    /// Directory holding the SQLite database. `STATE_DIR`, default the
    /// current working directory.
    pub state_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("PORT must be a port number, got `{}`", raw))?,
            Err(_) => DEFAULT_PORT,
        };
        let state_dir = env::var("STATE_DIR").map_or_else(|_| PathBuf::from("."), PathBuf::from);
        Ok(Self { port, state_dir })
    }

    /// Path of the SQLite database inside `state_dir`.
    pub fn database_path(&self) -> PathBuf {
        self.state_dir.join("distrohub.db")
    }
}
