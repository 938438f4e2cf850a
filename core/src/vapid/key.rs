// ## 📂 File: `src/vapid/key.rs`

//! src/vapid/key.rs
//! Application-server identity key (RFC 8292).
//!
//! Design notes:
//! - One long-lived P-256 key signs every token; the uncompressed public key
//!   is cached because it is sent with every request (`k=` / `p256ecdsa=`).
//! - PEM and DER input may be PKCS#8 (`openssl genpkey`) or SEC1
//!   (`openssl ecparam -genkey`); both are tried.
//! - Read-only after construction, so a single key is shared across threads.

use std::fmt;
use std::io::Read;

use p256::ecdsa::{SigningKey, VerifyingKey};
use p256::pkcs8::DecodePrivateKey;
use p256::SecretKey;
use rand::{CryptoRng, RngCore};

use crate::crypto::{encode_public_key, PUBLIC_KEY_LEN, SECRET_KEY_LEN};
use crate::utils::{b64url_decode, b64url_encode};
use crate::vapid::types::VapidError;

#[derive(Clone)]
pub struct VapidKey {
    signing_key: SigningKey,
    public_key: [u8; PUBLIC_KEY_LEN],
}

impl VapidKey {
    pub fn new(secret: SecretKey) -> Self {
        let public_key = encode_public_key(&secret.public_key());
        Self { signing_key: SigningKey::from(secret), public_key }
    }

    /// Fresh random identity key.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self::new(SecretKey::random(rng))
    }

    /// Load a PEM private key (`BEGIN PRIVATE KEY` or `BEGIN EC PRIVATE KEY`).
    pub fn from_pem<R: Read>(mut reader: R) -> Result<Self, VapidError> {
        let mut pem = String::new();
        reader
            .read_to_string(&mut pem)
            .map_err(|e| VapidError::InvalidKey(format!("reading PEM: {}", e)))?;

        let secret = SecretKey::from_pkcs8_pem(&pem)
            .or_else(|_| SecretKey::from_sec1_pem(&pem))
            .map_err(|_| VapidError::InvalidKey("not a PKCS#8 or SEC1 P-256 PEM key".into()))?;
        Ok(Self::new(secret))
    }

    /// Load a DER private key (PKCS#8 or SEC1).
    pub fn from_der<R: Read>(mut reader: R) -> Result<Self, VapidError> {
        let mut der = Vec::new();
        reader
            .read_to_end(&mut der)
            .map_err(|e| VapidError::InvalidKey(format!("reading DER: {}", e)))?;

        let secret = SecretKey::from_pkcs8_der(&der)
            .or_else(|_| SecretKey::from_sec1_der(&der))
            .map_err(|_| VapidError::InvalidKey("not a PKCS#8 or SEC1 P-256 DER key".into()))?;
        Ok(Self::new(secret))
    }

    /// Load the raw 32-byte scalar as base64url (the form `web-push generate-vapid-keys` prints).
    pub fn from_base64url(encoded: &str) -> Result<Self, VapidError> {
        let bytes = b64url_decode(encoded)
            .map_err(|e| VapidError::InvalidKey(format!("base64url: {}", e)))?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, VapidError> {
        if bytes.len() != SECRET_KEY_LEN {
            return Err(VapidError::InvalidKey(format!(
                "expected {} byte scalar, got {} bytes",
                SECRET_KEY_LEN,
                bytes.len()
            )));
        }
        let secret = SecretKey::from_slice(bytes)
            .map_err(|_| VapidError::InvalidKey("scalar is zero or exceeds the curve order".into()))?;
        Ok(Self::new(secret))
    }

    pub fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }

    pub fn verifying_key(&self) -> &VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Uncompressed public key, the value browsers take as `applicationServerKey`.
    pub fn public_key(&self) -> &[u8; PUBLIC_KEY_LEN] {
        &self.public_key
    }

    pub fn public_key_base64url(&self) -> String {
        b64url_encode(self.public_key)
    }
}

impl fmt::Debug for VapidKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VapidKey")
            .field("public_key", &self.public_key_base64url())
            .finish_non_exhaustive()
    }
}
