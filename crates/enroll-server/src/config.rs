use std::net::SocketAddr;
use std::path::Path;

use serde::{Deserialize, Serialize};

use enroll_core::CoordinatorConfig;
use enroll_ledger::{Credentials, LedgerConfig, LedgerError};

use crate::error::{ServerError, ServerResult};

/// Complete service configuration, one TOML table per section.
///
/// Every section and field is optional in the file; missing values take
/// their defaults. Durations are in milliseconds.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub ledger: LedgerConfig,
    pub coordinator: CoordinatorConfig,
    pub admin: AdminConfig,
}

impl ServiceConfig {
    pub fn load(path: impl AsRef<Path>) -> ServerResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
            .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))
    }

    pub fn from_toml_str(raw: &str) -> ServerResult<Self> {
        toml::from_str(raw).map_err(|e| ServerError::Config(e.to_string()))
    }

    pub fn to_toml_string(&self) -> ServerResult<String> {
        toml::to_string_pretty(self).map_err(|e| ServerError::Config(e.to_string()))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Attach a permissive CORS layer for browser frontends.
    pub allow_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            allow_cors: true,
        }
    }
}

/// Account that signs course additions.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Hex-encoded ed25519 secret. A fresh account is generated when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
}

impl AdminConfig {
    pub fn credentials(&self) -> Result<Credentials, LedgerError> {
        match &self.private_key {
            Some(secret) => Credentials::from_secret(secret),
            None => Ok(Credentials::generate()),
        }
    }
}

impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
