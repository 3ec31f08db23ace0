use std::path::PathBuf;

use anyhow::{Context, Result, bail};

use board_contract::{ContractId, Principal};

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me-to-a-random-string", "dev-secret-change-me"];

/// Ten years.
const MAX_RECEIPT_RETENTION_SECS: u64 = 10 * 365 * 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Storage {
    Memory,
    Sqlite(PathBuf),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub storage: Storage,
    pub jwt_secret: String,
    pub contract_id: ContractId,
    pub app_name: String,
    pub receipt_retention_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let jwt_secret = get("BOARD_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("BOARD_JWT_SECRET is unset or still a placeholder");
        }

        let port: u16 = var("BOARD_PORT", "3000")
            .parse()
            .context("BOARD_PORT must be a port number")?;

        let storage = match var("BOARD_STORAGE", "sqlite").as_str() {
            "memory" => Storage::Memory,
            "sqlite" => Storage::Sqlite(var("BOARD_DB_PATH", "message-board.db").into()),
            other => bail!("BOARD_STORAGE must be 'sqlite' or 'memory', got '{}'", other),
        };

        let address = Principal::parse(&var(
            "BOARD_CONTRACT_ADDRESS",
            "ST3D86ZD0YNZ690B7YJ8F9M01G0PK3B46G7S9XH3F",
        ))
        .context("BOARD_CONTRACT_ADDRESS")?;
        let contract_id = ContractId::new(address, &var("BOARD_CONTRACT_NAME", "message-board-v2"))
            .context("BOARD_CONTRACT_NAME")?;

        let receipt_retention_secs: u64 = var("BOARD_RECEIPT_RETENTION_SECS", "3600")
            .parse()
            .context("BOARD_RECEIPT_RETENTION_SECS must be a number of seconds")?;
        if receipt_retention_secs > MAX_RECEIPT_RETENTION_SECS {
            bail!(
                "BOARD_RECEIPT_RETENTION_SECS must be at most {} (ten years), got {}",
                MAX_RECEIPT_RETENTION_SECS,
                receipt_retention_secs
            );
        }

        Ok(Self {
            host: var("BOARD_HOST", "0.0.0.0"),
            port,
            storage,
            jwt_secret,
            contract_id,
            app_name: var("BOARD_APP_NAME", "MessageBoard DApp"),
            receipt_retention_secs,
        })
    }
}
