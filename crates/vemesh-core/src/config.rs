//! Configuration types for the vemesh adapter.
//!
//! The configuration names the network the adapter serves and lists extra
//! tokens the currency registry should know without asking the node.
//!
//! # Configuration File
//!
//! Configuration is stored in TOML format at `~/.vemesh/config.toml`.
//!
//! # Examples
//!
//! ```
//! use vemesh_core::config::Config;
//!
//! let config = Config::default();
//! assert_eq!(config.network.name, "main");
//! assert_eq!(config.network.chain_tag, 0x4a);
//! assert!(config.tokens.is_empty());
//! ```
//!
//! # Default TOML Output
//!
//! ```toml
//! [network]
//! name = "main"
//! chain_tag = 74
//! expiration = 720
//! legacy_base_gas_price = "10000000000000"
//!
//! # [[tokens]]
//! # address = "0x..."
//! # symbol = "..."
//! # decimals = 18
//! ```

use std::collections::HashSet;

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::encoding::{format_address, parse_address};
use crate::error::ConfigError;

/// Largest decimals value whose unit still fits in 256 bits.
const MAX_DECIMALS: u32 = 77;

/// Top-level configuration.
///
/// # Examples
///
/// ```
/// use vemesh_core::config::Config;
///
/// let toml_str = r#"
/// [network]
/// name = "test"
/// chain_tag = 39
///
/// [[tokens]]
/// address = "0x0000000000000000000000000000000000001234"
/// symbol = "TKN"
/// decimals = 6
/// "#;
///
/// let config: Config = toml::from_str(toml_str).expect("valid TOML");
/// assert_eq!(config.network.chain_tag, 39);
/// assert_eq!(config.network.expiration, 720);
/// assert_eq!(config.tokens[0].decimals, 6);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Network the adapter serves.
    #[serde(default)]
    pub network: NetworkConfig,

    /// Tokens known without a node lookup.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tokens: Vec<TokenEntry>,
}

fn default_network_name() -> String {
    "main".to_string()
}

/// Mainnet genesis tag.
const fn default_chain_tag() -> u8 {
    0x4a
}

/// Blocks until an unmined transaction expires.
const fn default_expiration() -> u32 {
    720
}

/// 10^13 wei, the legacy base gas price on mainnet.
fn default_legacy_base_gas_price() -> String {
    "10000000000000".to_string()
}

/// Network settings.
///
/// `chain_tag` is only used by offline flows; online metadata asks the node.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NetworkConfig {
    /// `main`, `test`, or `solo`.
    #[serde(default = "default_network_name")]
    pub name: String,

    /// Last byte of the genesis block id.
    #[serde(default = "default_chain_tag")]
    pub chain_tag: u8,

    /// Expiration (in blocks) written into built transactions.
    #[serde(default = "default_expiration")]
    pub expiration: u32,

    /// Base gas price for legacy fee estimation, as a decimal string.
    #[serde(default = "default_legacy_base_gas_price")]
    pub legacy_base_gas_price: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            name: default_network_name(),
            chain_tag: default_chain_tag(),
            expiration: default_expiration(),
            legacy_base_gas_price: default_legacy_base_gas_price(),
        }
    }
}

impl NetworkConfig {
    /// Parsed legacy base gas price.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if the value is not a decimal integer.
    pub fn base_gas_price(&self) -> Result<U256, ConfigError> {
        U256::from_str_radix(&self.legacy_base_gas_price, 10).map_err(|_| {
            ConfigError::invalid_value(
                "network.legacy_base_gas_price",
                &self.legacy_base_gas_price,
            )
        })
    }
}

/// A token the registry knows up front.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenEntry {
    /// Contract address.
    pub address: String,
    /// Ticker symbol.
    pub symbol: String,
    /// Decimals.
    pub decimals: u32,
}

impl TokenEntry {
    /// Create a token entry.
    #[must_use]
    pub fn new(address: impl Into<String>, symbol: impl Into<String>, decimals: u32) -> Self {
        Self {
            address: address.into(),
            symbol: symbol.into(),
            decimals,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if:
    /// - `network.name` is empty
    /// - `network.expiration` is zero
    /// - `network.legacy_base_gas_price` is not a decimal integer
    /// - a token has a malformed address, an empty symbol, or more than 77 decimals
    /// - two tokens share an address
    ///
    /// # Examples
    ///
    /// ```
    /// use vemesh_core::config::{Config, TokenEntry};
    ///
    /// assert!(Config::default().validate().is_ok());
    ///
    /// let dup = Config::builder()
    ///     .token(TokenEntry::new("0x0000000000000000000000000000000000001234", "A", 18))
    ///     .token(TokenEntry::new("0x0000000000000000000000000000000000001234", "B", 18))
    ///     .build();
    /// assert!(dup.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.network.name.is_empty() {
            return Err(ConfigError::invalid_value("network.name", "<empty>"));
        }

        if self.network.expiration == 0 {
            return Err(ConfigError::invalid_value("network.expiration", "0"));
        }

        self.network.base_gas_price()?;

        let mut seen = HashSet::new();
        for (i, token) in self.tokens.iter().enumerate() {
            let address = parse_address(&token.address).map_err(|_| {
                ConfigError::invalid_value(format!("tokens[{i}].address"), &token.address)
            })?;

            if token.symbol.trim().is_empty() {
                return Err(ConfigError::invalid_value(
                    format!("tokens[{i}].symbol"),
                    "<empty>",
                ));
            }

            if token.decimals > MAX_DECIMALS {
                return Err(ConfigError::invalid_value(
                    format!("tokens[{i}].decimals"),
                    token.decimals.to_string(),
                ));
            }

            if !seen.insert(address) {
                return Err(ConfigError::invalid_value(
                    format!("tokens[{i}].address"),
                    format!("duplicate token {}", format_address(&address)),
                ));
            }
        }

        Ok(())
    }

    /// Generates the default configuration as a TOML string.
    #[must_use]
    pub fn default_toml() -> String {
        r#"[network]
name = "main"
chain_tag = 74
expiration = 720
legacy_base_gas_price = "10000000000000"

# Tokens resolved without asking the node.
# [[tokens]]
# address = "0x..."
# symbol = "..."
# decimals = 18
"#
        .to_string()
    }

    /// Creates a configuration builder for customizing values.
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }
}

/// Builder for [`Config`].
///
/// # Examples
///
/// ```
/// use vemesh_core::config::ConfigBuilder;
///
/// let config = ConfigBuilder::new()
///     .network_name("solo")
///     .chain_tag(0xf6)
///     .expiration(32)
///     .build();
///
/// assert_eq!(config.network.name, "solo");
/// assert_eq!(config.network.chain_tag, 0xf6);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Creates a builder holding the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Sets the network name.
    #[must_use]
    pub fn network_name(mut self, name: impl Into<String>) -> Self {
        self.config.network.name = name.into();
        self
    }

    /// Sets the chain tag.
    #[must_use]
    pub const fn chain_tag(mut self, tag: u8) -> Self {
        self.config.network.chain_tag = tag;
        self
    }

    /// Sets the expiration in blocks.
    #[must_use]
    pub const fn expiration(mut self, blocks: u32) -> Self {
        self.config.network.expiration = blocks;
        self
    }

    /// Sets the legacy base gas price.
    #[must_use]
    pub fn legacy_base_gas_price(mut self, price: impl Into<String>) -> Self {
        self.config.network.legacy_base_gas_price = price.into();
        self
    }

    /// Adds a token.
    #[must_use]
    pub fn token(mut self, token: TokenEntry) -> Self {
        self.config.tokens.push(token);
        self
    }

    /// Builds the final configuration.
    #[must_use]
    pub fn build(self) -> Config {
        self.config
    }
}
