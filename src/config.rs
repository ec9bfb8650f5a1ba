use std::{env, net::SocketAddr, path::PathBuf};

use anyhow::{Context, Result};
use log::warn;

use crate::codec::DEFAULT_SIZE;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DB_PATH: &str = "/data/qrcodes.db";

/// Process configuration, read once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub port: u16,
    pub db_path: PathBuf,
    pub qr_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            qr_size: DEFAULT_SIZE,
        }
    }
}

impl Config {
    /// Reads `PORT`, `DB_PATH` and `QR_SIZE`, loading `.env` first when present.
    pub fn from_env() -> Result<Self> {
        if let Some(err) = env_file_problem(dotenvy::dotenv()) {
            warn!("Ignoring .env file: {err}");
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match value("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("invalid PORT value '{raw}'"))?,
            None => defaults.port,
        };

        let qr_size = match value("QR_SIZE") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("invalid QR_SIZE value '{raw}'"))?,
            None => defaults.qr_size,
        };

        let db_path = value("DB_PATH").map(PathBuf::from).unwrap_or(defaults.db_path);

        Ok(Self {
            port,
            db_path,
            qr_size,
        })
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

/// A missing `.env` is the normal case; anything else is worth reporting.
fn env_file_problem(result: dotenvy::Result<PathBuf>) -> Option<dotenvy::Error> {
    match result {
        Err(err) if !err.not_found() => Some(err),
        _ => None,
    }
}
