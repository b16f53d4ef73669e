//! Client configuration.
//!
//! ```yaml
//! address: 3
//! port: 112
//! break_duration_ms: 400
//! check_restricted_ranges: true
//! protocol:
//!   max_atomic_read: 220
//! ```

use std::path::{Path, PathBuf};

use peekpoke_protocol::{hub, ProtocolConfig, RangeError, DEFAULT_BREAK_DURATION_MS};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default Crow address.
pub const DEFAULT_ADDRESS: u8 = 1;
/// Default Crow port of the PeekPoke service.
pub const DEFAULT_PORT: u8 = 112;
/// Highest Crow device address.
pub const MAX_ADDRESS: u8 = 31;

/// Errors loading or validating a [`ClientConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file couldn't be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// Path of the file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The YAML didn't parse.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A value is out of range.
    #[error(transparent)]
    Invalid(#[from] RangeError),
}

/// Configuration for a [`PeekPoke`](crate::PeekPoke) client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Crow address of the device (1..=31).
    pub address: u8,
    /// Crow port of the PeekPoke service.
    pub port: u8,
    /// Length of the break sent when reverting the baud rate.
    pub break_duration_ms: u32,
    /// Hub address of the long holding the device's clock frequency.
    pub clkfreq_address: u16,
    /// Reject memory accesses outside the address ranges the device reports.
    pub check_restricted_ranges: bool,
    /// Wire layout and limits.
    pub protocol: ProtocolConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            address: DEFAULT_ADDRESS,
            port: DEFAULT_PORT,
            break_duration_ms: DEFAULT_BREAK_DURATION_MS,
            clkfreq_address: 0,
            check_restricted_ranges: false,
            protocol: ProtocolConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Parse and validate a YAML configuration.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: ClientConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML configuration file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_address(self.address)?;
        RangeError::check(
            "break_duration_ms",
            self.break_duration_ms as i128,
            1,
            u32::MAX as i128,
        )?;
        hub::check_atomic_span(self.clkfreq_address, 4, 4)?;
        self.protocol.validate()?;
        Ok(())
    }
}

/// Check a Crow device address.
pub fn check_address(address: u8) -> Result<(), RangeError> {
    RangeError::check("address", address as i128, 1, MAX_ADDRESS as i128)
}
