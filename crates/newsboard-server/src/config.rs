use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, warn};

pub const DEV_SESSION_SECRET: &str = "dev-secret-change-me";

pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub session_secret: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let host = lookup("NEWSBOARD_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("PORT must be a port number, got {raw:?}"))?,
            None => {
                info!("PORT not set, using default: 3001");
                3001
            }
        };
        let db_path = lookup("NEWSBOARD_DB_PATH")
            .unwrap_or_else(|| "newsboard.db".into())
            .into();
        let session_secret = lookup("NEWSBOARD_SESSION_SECRET").unwrap_or_else(|| {
            warn!("NEWSBOARD_SESSION_SECRET not set, using the development secret");
            DEV_SESSION_SECRET.into()
        });

        Ok(Self {
            host,
            port,
            db_path,
            session_secret,
        })
    }
}
