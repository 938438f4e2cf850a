// ## 📂 File: `src/vapid/signer.rs`

//! src/vapid/signer.rs
//! ES256 JWT signing and verification for VAPID.
//!
//! Design notes:
//! - `aud` is the push service origin, so one token is valid for every
//!   subscription hosted by that service until `exp`.
//! - Signatures are RFC 6979 deterministic and emitted as raw r || s
//!   (64 bytes), the JWS form. DER is never put on the wire.
//! - Lifetime is checked, not clamped: out-of-range expiry is an error.

use std::time::Duration;

use p256::ecdsa::signature::{Signer, Verifier};
use p256::ecdsa::{Signature, VerifyingKey};
use serde::Deserialize;
use url::{Origin, Url};

use crate::constants::MAX_VAPID_EXPIRY;
use crate::utils::{b64url_decode, b64url_encode};
use crate::vapid::key::VapidKey;
use crate::vapid::types::{VapidClaims, VapidError, VapidSignature};

/// Fixed JOSE header for every VAPID token.
pub const JWT_HEADER: &str = r#"{"typ":"JWT","alg":"ES256"}"#;

const JWT_ALG: &str = "ES256";

/// ASCII serialization of the endpoint's origin: `scheme://host[:port]`,
/// with the port omitted when it is the scheme default.
pub fn audience_for(endpoint: &Url) -> Result<String, VapidError> {
    match endpoint.origin() {
        origin @ Origin::Tuple(..) => Ok(origin.ascii_serialization()),
        Origin::Opaque(_) => Err(VapidError::InvalidAudience(format!(
            "{} has no origin",
            endpoint
        ))),
    }
}

#[inline]
pub fn validate_expiry(expiry: Duration) -> Result<(), VapidError> {
    if expiry.is_zero() || expiry > MAX_VAPID_EXPIRY {
        return Err(VapidError::InvalidExpiry { requested: expiry, max: MAX_VAPID_EXPIRY });
    }
    Ok(())
}

/// `sub` must be a contact URI the push service operator can use.
pub fn validate_subject(subject: &str) -> Result<(), VapidError> {
    let contact = subject
        .strip_prefix("mailto:")
        .or_else(|| subject.strip_prefix("https:"));
    match contact {
        Some(rest) if !rest.trim().is_empty() => Ok(()),
        _ => Err(VapidError::InvalidSubject(format!(
            "subject must be a mailto: or https: URI, got {:?}",
            subject
        ))),
    }
}

pub struct VapidSigner;

impl VapidSigner {
    /// Sign a token for `endpoint`'s origin expiring `expiry` after `now`
    /// (seconds since the Unix epoch).
    pub fn sign(
        key: &VapidKey,
        endpoint: &Url,
        subject: Option<&str>,
        expiry: Duration,
        now: u64,
    ) -> Result<VapidSignature, VapidError> {
        let claims = Self::claims_for(endpoint, subject, expiry, now)?;
        Self::sign_claims(key, &claims)
    }

    /// Build and validate the standard claim set.
    pub fn claims_for(
        endpoint: &Url,
        subject: Option<&str>,
        expiry: Duration,
        now: u64,
    ) -> Result<VapidClaims, VapidError> {
        validate_expiry(expiry)?;
        Ok(VapidClaims {
            aud: audience_for(endpoint)?,
            exp: now.saturating_add(expiry.as_secs()),
            sub: subject.map(str::to_owned),
            extra: Default::default(),
        })
    }

    /// Serialize, sign and package a claim set.
    pub fn sign_claims(key: &VapidKey, claims: &VapidClaims) -> Result<VapidSignature, VapidError> {
        if let Some(sub) = &claims.sub {
            validate_subject(sub)?;
        }

        let signing_input = format!(
            "{}.{}",
            b64url_encode(JWT_HEADER),
            b64url_encode(serde_json::to_vec(claims)?)
        );

        let signature: Signature = key
            .signing_key()
            .try_sign(signing_input.as_bytes())
            .map_err(|e| VapidError::InvalidKey(format!("signing failed: {}", e)))?;

        let auth_t = format!("{}.{}", signing_input, b64url_encode(signature.to_bytes()));
        let auth_k = key.public_key_base64url();

        tracing::debug!(audience = %claims.aud, exp = claims.exp, "signed VAPID token");

        Ok(VapidSignature { auth_t, auth_k, expires_at: claims.exp })
    }
}

#[derive(Deserialize)]
struct JoseHeader {
    alg: String,
}

/// Check a token's ES256 signature against an uncompressed public key and
/// return its claims. Expiry is not checked against the clock.
pub fn verify_token(token: &str, public_key: &[u8]) -> Result<VapidClaims, VapidError> {
    let mut parts = token.split('.');
    let (header, claims, signature) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(h), Some(c), Some(s), None) => (h, c, s),
        _ => return Err(VapidError::MalformedToken("expected three segments".into())),
    };

    let header_json = decode_segment(header, "header")?;
    let jose: JoseHeader = serde_json::from_slice(&header_json)
        .map_err(|e| VapidError::MalformedToken(format!("header: {}", e)))?;
    if jose.alg != JWT_ALG {
        return Err(VapidError::MalformedToken(format!("unsupported alg {}", jose.alg)));
    }

    let verifying_key = VerifyingKey::from_sec1_bytes(public_key)
        .map_err(|_| VapidError::InvalidKey("public key is not a P-256 point".into()))?;
    let signature = Signature::from_slice(&decode_segment(signature, "signature")?)
        .map_err(|_| VapidError::MalformedToken("signature is not 64 bytes of r || s".into()))?;

    let signing_input = &token[..header.len() + 1 + claims.len()];
    verifying_key
        .verify(signing_input.as_bytes(), &signature)
        .map_err(|_| VapidError::BadSignature)?;

    let claims_json = decode_segment(claims, "claims")?;
    serde_json::from_slice(&claims_json)
        .map_err(|e| VapidError::MalformedToken(format!("claims: {}", e)))
}

fn decode_segment(segment: &str, what: &str) -> Result<Vec<u8>, VapidError> {
    b64url_decode(segment).map_err(|e| VapidError::MalformedToken(format!("{}: {}", what, e)))
}
