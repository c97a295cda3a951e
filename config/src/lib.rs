//! Keyroll Configuration
//!
//! Deployment-wide circuit parameters. Every value here changes the shape of
//! the constraint system or the public data layout, so a deployment pins one
//! file and versions it together with its verifying key.
//!
//! Handles loading configuration from:
//! 1. KR_CONFIG env var (explicit path)
//! 2. ./keyroll.toml (current directory)
//! 3. ~/.keyroll/keyroll.toml (user home)
//!
//! Environment variables take precedence over TOML config.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::{env, fs};

const CONFIG_FILE_NAME: &str = "keyroll.toml";
const CONFIG_DIR_NAME: &str = ".keyroll";

// ============================================================================
// Default Constants
// ============================================================================

pub const DEFAULT_FORMAT_VERSION: u32 = 1;
pub const DEFAULT_ADDRESS_BITS: u32 = 160;
pub const DEFAULT_ACCOUNT_BITS: u32 = 32;
pub const DEFAULT_NONCE_BITS: u32 = 32;
pub const DEFAULT_TOKEN_BITS: u32 = 12;
pub const DEFAULT_AMOUNT_BITS: u32 = 96;

pub const DEFAULT_EXPONENT_BITS: u32 = 5;
pub const DEFAULT_MANTISSA_BITS: u32 = 11;
pub const DEFAULT_EXPONENT_BASE: u32 = 10;
pub const DEFAULT_ACCURACY_NUMERATOR: u32 = 995;
pub const DEFAULT_ACCURACY_DENOMINATOR: u32 = 1000;

// ============================================================================
// Config Structs
// ============================================================================

/// Root configuration structure (matches TOML layout)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeyrollConfig {
    #[serde(default)]
    pub circuit: CircuitTomlConfig,
    #[serde(default)]
    pub float: FloatTomlConfig,
}

/// Bit widths of the account, balance and transaction fields
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CircuitTomlConfig {
    /// Public data format version, bumped whenever a width changes
    #[serde(default = "default_format_version")]
    pub format_version: u32,
    #[serde(default = "default_address_bits")]
    pub address_bits: u32,
    #[serde(default = "default_account_bits")]
    pub account_bits: u32,
    #[serde(default = "default_nonce_bits")]
    pub nonce_bits: u32,
    #[serde(default = "default_token_bits")]
    pub token_bits: u32,
    #[serde(default = "default_amount_bits")]
    pub amount_bits: u32,
}

impl Default for CircuitTomlConfig {
    fn default() -> Self {
        Self {
            format_version: DEFAULT_FORMAT_VERSION,
            address_bits: DEFAULT_ADDRESS_BITS,
            account_bits: DEFAULT_ACCOUNT_BITS,
            nonce_bits: DEFAULT_NONCE_BITS,
            token_bits: DEFAULT_TOKEN_BITS,
            amount_bits: DEFAULT_AMOUNT_BITS,
        }
    }
}

fn default_format_version() -> u32 {
    DEFAULT_FORMAT_VERSION
}
fn default_address_bits() -> u32 {
    DEFAULT_ADDRESS_BITS
}
fn default_account_bits() -> u32 {
    DEFAULT_ACCOUNT_BITS
}
fn default_nonce_bits() -> u32 {
    DEFAULT_NONCE_BITS
}
fn default_token_bits() -> u32 {
    DEFAULT_TOKEN_BITS
}
fn default_amount_bits() -> u32 {
    DEFAULT_AMOUNT_BITS
}

/// Compact fee encoding and its accuracy policy
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FloatTomlConfig {
    #[serde(default = "default_exponent_bits")]
    pub exponent_bits: u32,
    #[serde(default = "default_mantissa_bits")]
    pub mantissa_bits: u32,
    #[serde(default = "default_exponent_base")]
    pub exponent_base: u32,
    /// A decoded value must be at least `numerator / denominator` of the original
    #[serde(default = "default_accuracy_numerator")]
    pub accuracy_numerator: u32,
    #[serde(default = "default_accuracy_denominator")]
    pub accuracy_denominator: u32,
}

impl Default for FloatTomlConfig {
    fn default() -> Self {
        Self {
            exponent_bits: DEFAULT_EXPONENT_BITS,
            mantissa_bits: DEFAULT_MANTISSA_BITS,
            exponent_base: DEFAULT_EXPONENT_BASE,
            accuracy_numerator: DEFAULT_ACCURACY_NUMERATOR,
            accuracy_denominator: DEFAULT_ACCURACY_DENOMINATOR,
        }
    }
}

fn default_exponent_bits() -> u32 {
    DEFAULT_EXPONENT_BITS
}
fn default_mantissa_bits() -> u32 {
    DEFAULT_MANTISSA_BITS
}
fn default_exponent_base() -> u32 {
    DEFAULT_EXPONENT_BASE
}
fn default_accuracy_numerator() -> u32 {
    DEFAULT_ACCURACY_NUMERATOR
}
fn default_accuracy_denominator() -> u32 {
    DEFAULT_ACCURACY_DENOMINATOR
}

// ============================================================================
// Environment Variable Helpers
// ============================================================================

/// Set field from env var if present and parseable
fn env_parse<T: std::str::FromStr>(key: &str, field: &mut T) {
    if let Ok(v) = env::var(key) {
        match v.parse() {
            Ok(parsed) => *field = parsed,
            Err(_) => log::warn!("Ignoring unparseable value for {}: {:?}", key, v),
        }
    }
}

// ============================================================================
// Implementation
// ============================================================================

impl KeyrollConfig {
    /// Load configuration from config file with env var overrides
    pub fn load() -> Result<Self> {
        let mut config = match Self::find_config_file() {
            Some(path) => {
                log::info!("Loading config from: {}", path.display());
                Self::read_file(&path)?
            }
            None => {
                log::info!("No config file found, using defaults and environment variables");
                Self::default()
            }
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a specific file path
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = Self::read_file(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Find the config file path
    fn find_config_file() -> Option<PathBuf> {
        // 1. Check KR_CONFIG env var
        if let Ok(path) = env::var("KR_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
            log::warn!("KR_CONFIG points to missing file: {}", path.display());
        }

        // 2. Check ./keyroll.toml (current directory)
        let local_path = PathBuf::from(CONFIG_FILE_NAME);
        if local_path.exists() {
            return Some(local_path);
        }

        // 3. Check ~/.keyroll/keyroll.toml
        Self::default_config_path().filter(|p| p.exists())
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // Circuit widths
        env_parse("KR_FORMAT_VERSION", &mut self.circuit.format_version);
        env_parse("KR_ADDRESS_BITS", &mut self.circuit.address_bits);
        env_parse("KR_ACCOUNT_BITS", &mut self.circuit.account_bits);
        env_parse("KR_NONCE_BITS", &mut self.circuit.nonce_bits);
        env_parse("KR_TOKEN_BITS", &mut self.circuit.token_bits);
        env_parse("KR_AMOUNT_BITS", &mut self.circuit.amount_bits);

        // Float encoding
        env_parse("KR_FLOAT_EXPONENT_BITS", &mut self.float.exponent_bits);
        env_parse("KR_FLOAT_MANTISSA_BITS", &mut self.float.mantissa_bits);
        env_parse("KR_FLOAT_EXPONENT_BASE", &mut self.float.exponent_base);
        env_parse("KR_ACCURACY_NUMERATOR", &mut self.float.accuracy_numerator);
        env_parse(
            "KR_ACCURACY_DENOMINATOR",
            &mut self.float.accuracy_denominator,
        );
    }

    /// Get the default config file path
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Generate a sample config file
    pub fn generate_sample() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = KeyrollConfig::default();
        assert_eq!(config.circuit.address_bits, DEFAULT_ADDRESS_BITS);
        assert_eq!(config.circuit.amount_bits, DEFAULT_AMOUNT_BITS);
        assert_eq!(config.float.exponent_bits + config.float.mantissa_bits, 16);
    }

    #[test]
    fn test_generate_sample() {
        let sample = KeyrollConfig::generate_sample();
        assert!(sample.contains("[circuit]"));
        assert!(sample.contains("[float]"));
    }

    #[test]
    fn test_parse_sample() {
        let sample = KeyrollConfig::generate_sample();
        let parsed: KeyrollConfig = toml::from_str(&sample).unwrap();
        assert_eq!(parsed, KeyrollConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[circuit]\ntoken_bits = 16\n").unwrap();

        let config = KeyrollConfig::read_file(file.path()).unwrap();
        assert_eq!(config.circuit.token_bits, 16);
        assert_eq!(config.circuit.nonce_bits, DEFAULT_NONCE_BITS);
        assert_eq!(config.float, FloatTomlConfig::default());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[circuit\naddress_bits = ").unwrap();

        let err = KeyrollConfig::read_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
