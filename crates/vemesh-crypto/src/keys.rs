//! Secret key material with secure memory handling.
//!
//! [`SecretKey`] is zeroized on drop, redacted in debug output, compared in
//! constant time, and deliberately not `Clone`.

use rand::RngCore;
use subtle::ConstantTimeEq;
use vemesh_core::error::SignError;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// The length of a secret key in bytes.
pub const SECRET_KEY_LEN: usize = 32;

/// A 32-byte secp256k1 secret key.
///
/// # Example
///
/// ```
/// use vemesh_crypto::keys::SecretKey;
///
/// let key = SecretKey::from_hex(
///     "0x7582be841ca040aa940fff6c05773129e135623e41acce3e0b8ba520dc1ae26a",
/// ).expect("valid hex key");
/// assert_eq!(key.len(), 32);
/// ```
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecretKey {
    bytes: [u8; SECRET_KEY_LEN],
}

impl SecretKey {
    /// Wrap raw bytes. The caller should zeroize its own copy.
    #[must_use]
    pub const fn new(bytes: [u8; SECRET_KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Generate a key from the OS random number generator.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; SECRET_KEY_LEN];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Parse a hex-encoded key, with or without `0x`.
    ///
    /// The intermediate buffer is zeroized before returning.
    ///
    /// # Errors
    ///
    /// Returns [`SignError::InvalidKey`] if the input is not 64 hex digits.
    pub fn from_hex(input: &str) -> Result<Self, SignError> {
        let stripped = input.trim().strip_prefix("0x").unwrap_or(input.trim());
        let mut decoded = hex::decode(stripped).map_err(|_| SignError::InvalidKey)?;

        let result = <[u8; SECRET_KEY_LEN]>::try_from(decoded.as_slice())
            .map(Self::new)
            .map_err(|_| SignError::InvalidKey);

        decoded.zeroize();
        result
    }

    /// The raw bytes. Do not store or copy the returned reference.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; SECRET_KEY_LEN] {
        &self.bytes
    }

    /// Always 32.
    #[must_use]
    pub const fn len(&self) -> usize {
        SECRET_KEY_LEN
    }

    /// Always `false`.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretKey([REDACTED])")
    }
}

impl PartialEq for SecretKey {
    fn eq(&self, other: &Self) -> bool {
        self.bytes.ct_eq(&other.bytes).into()
    }
}

impl Eq for SecretKey {}

impl From<[u8; SECRET_KEY_LEN]> for SecretKey {
    fn from(bytes: [u8; SECRET_KEY_LEN]) -> Self {
        Self::new(bytes)
    }
}
