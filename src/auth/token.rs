use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::WaypostError;

type HmacSha256 = Hmac<Sha256>;

/// Fixed JOSE header for every token this codec emits.
const TOKEN_HEADER: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// Outcome of a token check. Invalid and expired tokens are
/// indistinguishable on purpose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    pub valid: bool,
    pub subject: Option<String>,
}

impl Verification {
    fn invalid() -> Self {
        Self {
            valid: false,
            subject: None,
        }
    }
}

/// Signs and verifies HS256 session tokens.
///
/// Wire form is the standard three-segment JWT layout,
/// base64url without padding. Verification recomputes the MAC over the
/// first two segments and compares in constant time, so neither a
/// forged signature nor a tampered payload can be told apart by timing.
#[derive(Clone)]
pub struct TokenCodec {
    secret: Vec<u8>,
}

impl TokenCodec {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Issue a token for `subject` expiring `ttl_secs` from now.
    /// A zero or negative TTL produces an already-expired token.
    pub fn sign(&self, subject: &str, ttl_secs: i64) -> Result<String, WaypostError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: subject.to_string(),
            iat: now,
            exp: now + ttl_secs,
        };
        let header = URL_SAFE_NO_PAD.encode(TOKEN_HEADER);
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?);
        let signature = URL_SAFE_NO_PAD.encode(self.mac_over(&header, &payload));
        Ok(format!("{header}.{payload}.{signature}"))
    }

    /// Verify against the current wall clock.
    pub fn verify(&self, token: &str) -> Verification {
        self.verify_at(token, Utc::now().timestamp())
    }

    /// Verify `token` as of `now` (unix seconds). Never panics or
    /// errors: any malformed input is simply an invalid verdict.
    pub fn verify_at(&self, token: &str, now: i64) -> Verification {
        let mut segments = token.split('.');
        let (Some(header), Some(payload), Some(signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Verification::invalid();
        };

        let Ok(supplied) = URL_SAFE_NO_PAD.decode(signature) else {
            return Verification::invalid();
        };
        let expected = self.mac_over(header, payload);
        if !bool::from(expected.ct_eq(supplied.as_slice())) {
            return Verification::invalid();
        }

        // Signature checks out; only now is the payload worth parsing.
        let Ok(claims_bytes) = URL_SAFE_NO_PAD.decode(payload) else {
            return Verification::invalid();
        };
        let Ok(claims) = serde_json::from_slice::<Claims>(&claims_bytes) else {
            return Verification::invalid();
        };
        if claims.exp < now {
            return Verification::invalid();
        }

        Verification {
            valid: true,
            subject: Some(claims.sub),
        }
    }

    fn mac_over(&self, header: &str, payload: &str) -> [u8; 32] {
        let mut mac =
            HmacSha256::new_from_slice(&self.secret).expect("HMAC key size is always valid");
        mac.update(header.as_bytes());
        mac.update(b".");
        mac.update(payload.as_bytes());
        let bytes = mac.finalize().into_bytes();
        let mut sig = [0u8; 32];
        sig.copy_from_slice(&bytes);
        sig
    }
}
