//! Deployment settings
//!
//! Everything the mint client needs to know about the deployed contract lives
//! here and is passed in at startup. Values come from a JSON file and may be
//! overridden by environment variables:
//!
//! | field              | env                |
//! |--------------------|--------------------|
//! | `contract_address` | `CONTRACT_ADDRESS` |
//! | `rpc_url`          | `RPC_URL`          |
//! | `private_key`      | `PRIVATE_KEY`      |

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::common::normalize_address;

pub const ENV_CONTRACT_ADDRESS: &str = "CONTRACT_ADDRESS";
pub const ENV_RPC_URL: &str = "RPC_URL";
pub const ENV_PRIVATE_KEY: &str = "PRIVATE_KEY";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings: {0}")]
    ReadError(std::io::Error),

    #[error("Failed to parse settings: {0}")]
    ParseError(serde_json::Error),

    #[error("Invalid contract address '{address}': {reason}")]
    InvalidContractAddress { address: String, reason: String },

    #[error("Unsupported RPC endpoint '{0}': expected http(s):// or ws(s)://")]
    InvalidRpcUrl(String),

    #[error("Invalid ABI file {path:?}: {reason}")]
    InvalidAbi { path: PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, SettingsError>;

#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Deployed collection contract
    pub contract_address: Option<String>,

    /// Path to the contract ABI JSON
    pub abi_path: Option<PathBuf>,

    /// JSON-RPC endpoint of the target network
    pub rpc_url: Option<String>,

    /// Hex secp256k1 signing key of the minting wallet
    pub private_key: Option<String>,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("contract_address", &self.contract_address)
            .field("abi_path", &self.abi_path)
            .field("rpc_url", &self.rpc_url)
            .field(
                "private_key",
                &self.private_key.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

impl Settings {
    /// Load settings from `path`, or defaults if the file does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path).map_err(SettingsError::ReadError)?;
            let settings: Settings =
                serde_json::from_str(&content).map_err(SettingsError::ParseError)?;
            info!("Loaded settings from {:?}", path);
            Ok(settings)
        } else {
            debug!("No settings file at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Override fields from the process environment
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(v) = non_empty(ENV_CONTRACT_ADDRESS) {
            self.contract_address = Some(v);
        }
        if let Some(v) = non_empty(ENV_RPC_URL) {
            self.rpc_url = Some(v);
        }
        if let Some(v) = non_empty(ENV_PRIVATE_KEY) {
            self.private_key = Some(v);
        }
    }

    /// Check the configured values and normalize the contract address
    pub fn validate(&mut self) -> Result<()> {
        if let Some(address) = &self.contract_address {
            let normalized = normalize_address(address).map_err(|e| {
                SettingsError::InvalidContractAddress {
                    address: address.clone(),
                    reason: e.to_string(),
                }
            })?;
            self.contract_address = Some(normalized);
        }

        if let Some(url) = &self.rpc_url {
            let supported = ["http://", "https://", "ws://", "wss://"]
                .iter()
                .any(|scheme| url.starts_with(scheme));
            if !supported {
                return Err(SettingsError::InvalidRpcUrl(url.clone()));
            }
        }

        if let Some(path) = &self.abi_path {
            let invalid = |reason: String| SettingsError::InvalidAbi {
                path: path.clone(),
                reason,
            };
            let content = std::fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
            let abi: serde_json::Value =
                serde_json::from_str(&content).map_err(|e| invalid(e.to_string()))?;
            if !abi.is_array() {
                return Err(invalid("expected a JSON array".to_string()));
            }
        }

        Ok(())
    }
}
