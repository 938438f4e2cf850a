//! crypto/ecdh.rs
//! P-256 key agreement between the application server and the user agent.
//!
//! Design notes:
//! - The sender key pair is ephemeral: generated per message, never reused.
//! - Public keys travel as 65-byte uncompressed SEC1 points in both schemes.
//! - Randomness is injected so round trips can be replayed in tests.

use p256::ecdh::{diffie_hellman, SharedSecret};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::{PublicKey, SecretKey};
use rand::{CryptoRng, RngCore};

use crate::crypto::types::{CryptoError, PUBLIC_KEY_LEN};

/// Sender key pair used for exactly one message.
#[derive(Clone)]
pub struct EphemeralKeyPair {
    secret: SecretKey,
    public_bytes: [u8; PUBLIC_KEY_LEN],
}

impl EphemeralKeyPair {
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self::from_secret(SecretKey::random(rng))
    }

    /// Rebuild a key pair from a raw 32-byte scalar (test vectors, replay).
    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let secret = SecretKey::from_slice(bytes)
            .map_err(|_| CryptoError::InvalidPrivateKey("not a valid P-256 scalar".into()))?;
        Ok(Self::from_secret(secret))
    }

    fn from_secret(secret: SecretKey) -> Self {
        let public_bytes = encode_public_key(&secret.public_key());
        Self { secret, public_bytes }
    }

    pub fn secret(&self) -> &SecretKey {
        &self.secret
    }

    /// Uncompressed public key (`as_public` in RFC 8291 terms).
    pub fn public_bytes(&self) -> &[u8; PUBLIC_KEY_LEN] {
        &self.public_bytes
    }
}

impl std::fmt::Debug for EphemeralKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EphemeralKeyPair")
            .field("public", &crate::utils::b64url_encode(self.public_bytes))
            .finish_non_exhaustive()
    }
}

/// Parse a subscriber key. Only the uncompressed form is accepted because
/// both content codings hash the exact 65 bytes into their key schedule.
pub fn parse_public_key(bytes: &[u8]) -> Result<PublicKey, CryptoError> {
    if bytes.len() != PUBLIC_KEY_LEN {
        return Err(CryptoError::InvalidPublicKey(format!(
            "expected {} bytes, got {}",
            PUBLIC_KEY_LEN,
            bytes.len()
        )));
    }
    if bytes[0] != 0x04 {
        return Err(CryptoError::InvalidPublicKey(format!(
            "expected uncompressed point prefix 0x04, got 0x{:02x}",
            bytes[0]
        )));
    }
    PublicKey::from_sec1_bytes(bytes)
        .map_err(|_| CryptoError::InvalidPublicKey("point is not on the P-256 curve".into()))
}

pub fn encode_public_key(key: &PublicKey) -> [u8; PUBLIC_KEY_LEN] {
    let point = key.to_encoded_point(false);
    let mut out = [0u8; PUBLIC_KEY_LEN];
    out.copy_from_slice(point.as_bytes());
    out
}

/// ECDH(secret, peer). The x-coordinate of the shared point is the IKM input.
#[inline]
pub fn agree(secret: &SecretKey, peer: &PublicKey) -> SharedSecret {
    diffie_hellman(secret.to_nonzero_scalar(), peer.as_affine())
}
