//! Currency registry.
//!
//! Maps contract addresses to Mesh [`Currency`] values. Lookup order:
//!
//! 1. Built-ins (`VTHO` on the energy contract)
//! 2. Tokens listed in configuration
//! 3. The injected [`TokenResolver`], usually the node
//!
//! Lookup never fails. When the resolver errors, the failure is logged and an
//! `UNKNOWN` currency with 18 decimals is returned, still carrying the
//! contract address so the caller can tell which token it was.
//!
//! # Example
//!
//! ```rust
//! use alloy_primitives::Address;
//! use vemesh_chain::currency::{CurrencyRegistry, ENERGY_CONTRACT, UNKNOWN_SYMBOL};
//!
//! let registry = CurrencyRegistry::new();
//! assert_eq!(registry.currency_for(&ENERGY_CONTRACT).symbol, "VTHO");
//!
//! let unknown = registry.currency_for(&Address::repeat_byte(0x01));
//! assert_eq!(unknown.symbol, UNKNOWN_SYMBOL);
//! assert!(unknown.contract_address().is_some());
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use alloy_primitives::{address, Address};
use vemesh_core::config::Config;
use vemesh_core::encoding::{format_address, parse_address};
use vemesh_core::error::{NodeError, ParseResult};
use vemesh_core::types::Currency;

/// The built-in energy (VTHO) contract.
pub const ENERGY_CONTRACT: Address = address!("0000000000000000000000000000456e65726779");

/// Symbol used when a token cannot be resolved.
pub const UNKNOWN_SYMBOL: &str = "UNKNOWN";

/// Decimals used for the native coin, VTHO, and unresolved tokens.
pub const DEFAULT_DECIMALS: u32 = 18;

/// The native coin.
#[must_use]
pub fn vet() -> Currency {
    Currency::new("VET", DEFAULT_DECIMALS)
}

/// The gas asset.
#[must_use]
pub fn vtho() -> Currency {
    Currency::new("VTHO", DEFAULT_DECIMALS).with_contract(format_address(&ENERGY_CONTRACT))
}

/// Symbol and decimals of a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenInfo {
    /// Ticker symbol.
    pub symbol: String,
    /// Decimals.
    pub decimals: u32,
}

impl TokenInfo {
    /// Create token info.
    #[must_use]
    pub fn new(symbol: impl Into<String>, decimals: u32) -> Self {
        Self {
            symbol: symbol.into(),
            decimals,
        }
    }
}

/// Resolves token metadata for contracts the registry does not know.
pub trait TokenResolver: Send + Sync {
    /// Look up a token's symbol and decimals.
    ///
    /// # Errors
    ///
    /// Returns a [`NodeError`] if the lookup fails.
    fn resolve_token(&self, contract: &Address) -> Result<TokenInfo, NodeError>;
}

/// Registry of known currencies, with an optional fallback resolver.
///
/// Cloning is cheap; the resolver is shared.
#[derive(Clone, Default)]
pub struct CurrencyRegistry {
    tokens: HashMap<Address, TokenInfo>,
    resolver: Option<Arc<dyn TokenResolver>>,
}

impl fmt::Debug for CurrencyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CurrencyRegistry")
            .field("tokens", &self.tokens.len())
            .field("resolver", &self.resolver.is_some())
            .finish()
    }
}

impl CurrencyRegistry {
    /// A registry with only the built-in currencies.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the tokens listed in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidAddress`](vemesh_core::error::ParseError::InvalidAddress)
    /// if a token address is malformed.
    pub fn from_config(config: &Config) -> ParseResult<Self> {
        let mut registry = Self::new();
        for token in &config.tokens {
            let address = parse_address(&token.address)?;
            registry.register(address, TokenInfo::new(&token.symbol, token.decimals));
        }
        Ok(registry)
    }

    /// Attach a resolver consulted for unknown contracts.
    #[must_use]
    pub fn with_resolver(mut self, resolver: Arc<dyn TokenResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Register a token, replacing any previous entry.
    pub fn register(&mut self, contract: Address, info: TokenInfo) {
        self.tokens.insert(contract, info);
    }

    /// Number of registered tokens, built-ins excluded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether no tokens are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Currency of the token at `contract`.
    #[must_use]
    pub fn currency_for(&self, contract: &Address) -> Currency {
        if *contract == ENERGY_CONTRACT {
            return vtho();
        }

        let contract_hex = format_address(contract);

        if let Some(info) = self.tokens.get(contract) {
            return Currency::new(&info.symbol, info.decimals).with_contract(contract_hex);
        }

        let Some(resolver) = &self.resolver else {
            tracing::debug!(contract = %contract_hex, "no token resolver, using placeholder currency");
            return unknown(contract_hex);
        };

        match resolver.resolve_token(contract) {
            Ok(info) => Currency::new(info.symbol, info.decimals).with_contract(contract_hex),
            Err(e) => {
                tracing::warn!(
                    contract = %contract_hex,
                    error = %e,
                    "token resolution failed, using placeholder currency"
                );
                unknown(contract_hex)
            }
        }
    }
}

fn unknown(contract_hex: String) -> Currency {
    Currency::new(UNKNOWN_SYMBOL, DEFAULT_DECIMALS).with_contract(contract_hex)
}
