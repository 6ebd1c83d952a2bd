use anyhow::{bail, Context, Result};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_DB_PATH: &str = "devicedb";

/// Runtime settings, read from the process environment (and `.env` if present).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub db_path: String,
    pub jwt_secret: String,
    pub api_keys: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let bind_addr =
            dotenvy::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let db_path =
            dotenvy::var("DEVICE_DB_PATH").unwrap_or_else(|_| DEFAULT_DB_PATH.to_string());
        let jwt_secret = dotenvy::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        let api_keys = parse_api_keys(&dotenvy::var("API_KEYS").context("API_KEYS must be set")?);

        if jwt_secret.trim().is_empty() {
            bail!("JWT_SECRET must not be empty");
        }
        if api_keys.is_empty() {
            bail!("API_KEYS must contain at least one key");
        }

        Ok(Self {
            bind_addr,
            db_path,
            jwt_secret,
            api_keys,
        })
    }
}

fn parse_api_keys(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}
