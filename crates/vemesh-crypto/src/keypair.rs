//! secp256k1 key pairs, recoverable signatures, and VeChainThor addresses.
//!
//! # Example
//!
//! ```rust
//! use vemesh_crypto::hash::blake2b256;
//! use vemesh_crypto::keypair::{recover_address, Secp256k1KeyPair};
//!
//! let keypair = Secp256k1KeyPair::generate();
//! let hash = blake2b256(b"payload");
//!
//! let signature = keypair.sign(&hash).expect("signing failed");
//! let recovered = recover_address(&hash, &signature.to_bytes()).expect("recovery failed");
//! assert_eq!(recovered, keypair.public_key().address());
//! ```

use alloy_primitives::{Address, B256};
use k256::ecdsa::{RecoveryId, Signature as K256Signature, SigningKey, VerifyingKey};
use vemesh_core::error::SignError;

use crate::hash::keccak256;
use crate::keys::SecretKey;

/// Length of a recoverable signature: `r || s || v`.
pub const SIGNATURE_LEN: usize = 65;

// ============================================================================
// Secp256k1 Public Key
// ============================================================================

/// A secp256k1 public key in both SEC1 encodings.
#[derive(Clone, PartialEq, Eq)]
pub struct Secp256k1PublicKey {
    compressed: [u8; 33],
    uncompressed: [u8; 65],
}

impl Secp256k1PublicKey {
    fn from_verifying_key(verifying: &VerifyingKey) -> Self {
        let mut uncompressed = [0u8; 65];
        uncompressed.copy_from_slice(verifying.to_encoded_point(false).as_bytes());

        let mut compressed = [0u8; 33];
        compressed.copy_from_slice(verifying.to_encoded_point(true).as_bytes());

        Self {
            compressed,
            uncompressed,
        }
    }

    /// Parse a 33-byte compressed or 65-byte uncompressed SEC1 key.
    ///
    /// # Errors
    ///
    /// Returns [`SignError::InvalidKey`] if the bytes are not a point on the curve.
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self, SignError> {
        let verifying = VerifyingKey::from_sec1_bytes(bytes).map_err(|_| SignError::InvalidKey)?;
        Ok(Self::from_verifying_key(&verifying))
    }

    /// `0x02`/`0x03` prefix followed by X.
    #[must_use]
    pub const fn compressed(&self) -> &[u8; 33] {
        &self.compressed
    }

    /// `0x04` prefix followed by X and Y.
    #[must_use]
    pub const fn uncompressed(&self) -> &[u8; 65] {
        &self.uncompressed
    }

    /// Last 20 bytes of keccak-256 over the uncompressed key without its prefix.
    #[must_use]
    pub fn address(&self) -> Address {
        let (_, xy) = self.uncompressed.split_at(1);
        let hash = keccak256(xy);
        let (_, tail) = hash.as_slice().split_at(12);
        Address::from_slice(tail)
    }
}

impl AsRef<[u8]> for Secp256k1PublicKey {
    fn as_ref(&self) -> &[u8] {
        &self.compressed
    }
}

impl std::fmt::Debug for Secp256k1PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Secp256k1PublicKey({})", hex::encode(self.compressed))
    }
}

// ============================================================================
// Secp256k1 Signature
// ============================================================================

/// A low-S ECDSA signature with its recovery id.
#[derive(Clone, PartialEq, Eq)]
pub struct Secp256k1Signature {
    bytes: [u8; 64],
    recovery_id: u8,
}

impl Secp256k1Signature {
    /// Parse a 65-byte `r || s || v` signature with `v` in `{0, 1}`.
    ///
    /// # Errors
    ///
    /// Returns [`SignError::RecoveryFailed`] on a wrong length or recovery id.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, SignError> {
        let array: [u8; SIGNATURE_LEN] = bytes.try_into().map_err(|_| {
            SignError::recovery_failed(format!(
                "signature must be {SIGNATURE_LEN} bytes, got {}",
                bytes.len()
            ))
        })?;

        let (rs, v) = array.split_at(64);
        let recovery_id = v.first().copied().unwrap_or(u8::MAX);
        if recovery_id > 1 {
            return Err(SignError::recovery_failed(format!(
                "invalid recovery id {recovery_id}"
            )));
        }

        let mut sig = [0u8; 64];
        sig.copy_from_slice(rs);
        Ok(Self {
            bytes: sig,
            recovery_id,
        })
    }

    /// The recovery id (0 or 1).
    #[must_use]
    pub const fn recovery_id(&self) -> u8 {
        self.recovery_id
    }

    /// `r || s || v`.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; SIGNATURE_LEN] {
        let mut result = [0u8; SIGNATURE_LEN];
        let (rs, v) = result.split_at_mut(64);
        rs.copy_from_slice(&self.bytes);
        if let Some(last) = v.first_mut() {
            *last = self.recovery_id;
        }
        result
    }

    /// Recover the signer's public key from a prehashed message.
    ///
    /// # Errors
    ///
    /// Returns [`SignError::RecoveryFailed`] if the signature does not
    /// correspond to any public key for `hash`.
    pub fn recover(&self, hash: &B256) -> Result<Secp256k1PublicKey, SignError> {
        let signature = K256Signature::from_slice(&self.bytes)
            .map_err(|e| SignError::recovery_failed(format!("malformed signature: {e}")))?;
        let recovery_id = RecoveryId::from_byte(self.recovery_id)
            .ok_or_else(|| SignError::recovery_failed("invalid recovery id"))?;

        let verifying = VerifyingKey::recover_from_prehash(hash.as_slice(), &signature, recovery_id)
            .map_err(|e| SignError::recovery_failed(e.to_string()))?;

        Ok(Secp256k1PublicKey::from_verifying_key(&verifying))
    }
}

impl AsRef<[u8]> for Secp256k1Signature {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl std::fmt::Debug for Secp256k1Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Secp256k1Signature({}, v={})",
            hex::encode(self.bytes),
            self.recovery_id
        )
    }
}

/// Recover the signer address from a 65-byte signature over `hash`.
///
/// # Errors
///
/// Returns [`SignError::RecoveryFailed`] if the signature is malformed or
/// does not recover.
pub fn recover_address(hash: &B256, signature: &[u8]) -> Result<Address, SignError> {
    Ok(Secp256k1Signature::from_slice(signature)?
        .recover(hash)?
        .address())
}

// ============================================================================
// Secp256k1 Key Pair
// ============================================================================

/// A secp256k1 signing key with its cached public key.
pub struct Secp256k1KeyPair {
    signing_key: SigningKey,
    public_key: Secp256k1PublicKey,
}

impl Secp256k1KeyPair {
    /// Generate a random key pair.
    #[must_use]
    pub fn generate() -> Self {
        let signing_key = SigningKey::random(&mut rand::rngs::OsRng);
        let public_key = Secp256k1PublicKey::from_verifying_key(signing_key.verifying_key());
        Self {
            signing_key,
            public_key,
        }
    }

    /// Build a key pair from a [`SecretKey`].
    ///
    /// # Errors
    ///
    /// Returns [`SignError::InvalidKey`] if the scalar is zero or not below
    /// the curve order.
    pub fn from_secret_key(secret: &SecretKey) -> Result<Self, SignError> {
        let signing_key =
            SigningKey::from_bytes(secret.as_bytes().into()).map_err(|_| SignError::InvalidKey)?;
        let public_key = Secp256k1PublicKey::from_verifying_key(signing_key.verifying_key());
        Ok(Self {
            signing_key,
            public_key,
        })
    }

    /// The public key.
    #[must_use]
    pub const fn public_key(&self) -> &Secp256k1PublicKey {
        &self.public_key
    }

    /// Sign a 32-byte hash, normalizing S to the lower half of the order.
    ///
    /// # Errors
    ///
    /// Returns [`SignError::SignatureFailed`] if the backend fails.
    pub fn sign(&self, hash: &B256) -> Result<Secp256k1Signature, SignError> {
        let (signature, recovery_id): (K256Signature, RecoveryId) = self
            .signing_key
            .sign_prehash_recoverable(hash.as_slice())
            .map_err(|_| SignError::signature_failed("secp256k1 signing failed"))?;

        let normalized = signature.normalize_s();
        let recovery_id = if normalized.is_some() {
            recovery_id.to_byte() ^ 1
        } else {
            recovery_id.to_byte()
        };

        let mut bytes = [0u8; 64];
        bytes.copy_from_slice(&normalized.unwrap_or(signature).to_bytes());

        Ok(Secp256k1Signature { bytes, recovery_id })
    }
}

impl std::fmt::Debug for Secp256k1KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secp256k1KeyPair")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use super::*;
    use crate::hash::blake2b256;

    const PRIVATE_KEY: &str = "7582be841ca040aa940fff6c05773129e135623e41acce3e0b8ba520dc1ae26a";

    fn known_keypair() -> Secp256k1KeyPair {
        let secret = SecretKey::from_hex(PRIVATE_KEY).unwrap();
        Secp256k1KeyPair::from_secret_key(&secret).unwrap()
    }

    // ------------------------------------------------------------------------
    // Key pair
    // ------------------------------------------------------------------------

    #[test]
    fn test_generate_produces_valid_keypair() {
        let keypair = Secp256k1KeyPair::generate();
        let prefix = keypair.public_key().compressed()[0];
        assert!(prefix == 0x02 || prefix == 0x03);
        assert_eq!(keypair.public_key().uncompressed()[0], 0x04);
    }

    #[test]
    fn test_from_secret_key_rejects_zero() {
        let secret = SecretKey::new([0u8; 32]);
        assert!(matches!(
            Secp256k1KeyPair::from_secret_key(&secret),
            Err(SignError::InvalidKey)
        ));
    }

    #[test]
    fn test_address_known_vector() {
        // Well-known Ethereum test key; the address derivation is shared.
        let secret = SecretKey::from_hex(
            "fad9c8855b740a0b7ed4c221dbad0f33a83a49cad6b3fe8d5817ac83d38b6a19",
        )
        .unwrap();
        let keypair = Secp256k1KeyPair::from_secret_key(&secret).unwrap();
        assert_eq!(
            hex::encode(keypair.public_key().address()),
            "96216849c49358b10257cb55b28ea603c874b05e"
        );
    }

    #[test]
    fn test_public_key_from_compressed_and_uncompressed_agree() {
        let keypair = known_keypair();
        let a = Secp256k1PublicKey::from_sec1_bytes(keypair.public_key().compressed()).unwrap();
        let b = Secp256k1PublicKey::from_sec1_bytes(keypair.public_key().uncompressed()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.address(), keypair.public_key().address());
    }

    #[test]
    fn test_public_key_rejects_garbage() {
        // unknown tag byte
        assert!(Secp256k1PublicKey::from_sec1_bytes(&[0x05; 33]).is_err());
        assert!(Secp256k1PublicKey::from_sec1_bytes(&[0x02; 10]).is_err());

        // x above the field prime
        let mut out_of_field = [0xffu8; 33];
        out_of_field[0] = 0x02;
        assert!(Secp256k1PublicKey::from_sec1_bytes(&out_of_field).is_err());
    }

    // ------------------------------------------------------------------------
    // Signing and recovery
    // ------------------------------------------------------------------------

    #[test]
    fn test_sign_recover_roundtrip() {
        let keypair = known_keypair();
        for i in 0..20u8 {
            let hash = blake2b256([i]);
            let sig = keypair.sign(&hash).unwrap();
            assert!(sig.recovery_id() <= 1);
            let recovered = recover_address(&hash, &sig.to_bytes()).unwrap();
            assert_eq!(recovered, keypair.public_key().address());
        }
    }

    #[test]
    fn test_recover_with_wrong_hash_gives_other_address() {
        let keypair = known_keypair();
        let sig = keypair.sign(&blake2b256(b"a")).unwrap();
        let recovered = recover_address(&blake2b256(b"b"), &sig.to_bytes());
        if let Ok(address) = recovered {
            assert_ne!(address, keypair.public_key().address());
        }
    }

    #[test]
    fn test_signature_from_slice_validation() {
        assert!(Secp256k1Signature::from_slice(&[0u8; 64]).is_err());
        let mut bytes = [1u8; 65];
        bytes[64] = 2;
        assert!(matches!(
            Secp256k1Signature::from_slice(&bytes),
            Err(SignError::RecoveryFailed { .. })
        ));
    }

    #[test]
    fn test_signature_bytes_roundtrip() {
        let sig = known_keypair().sign(&blake2b256(b"x")).unwrap();
        let parsed = Secp256k1Signature::from_slice(&sig.to_bytes()).unwrap();
        assert_eq!(parsed, sig);
    }

    #[test]
    fn test_keypair_debug_does_not_expose_private_key() {
        let debug = format!("{:?}", known_keypair());
        assert!(debug.contains("Secp256k1KeyPair"));
        assert!(!debug.contains(PRIVATE_KEY));
    }

    #[test]
    fn test_keypair_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Secp256k1KeyPair>();
        assert_send_sync::<Secp256k1PublicKey>();
    }
}
