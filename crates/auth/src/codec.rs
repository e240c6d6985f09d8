//! Signed, time-limited credential tokens (HS256 JWT).

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use thiserror::Error;

use crate::claims::{Claims, TokenValidationError, validate_claims};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("token signature does not verify")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("invalid claims: {0}")]
    InvalidClaims(TokenValidationError),
}

#[derive(Debug, Error)]
#[error("failed to sign token: {0}")]
pub struct EncodeError(#[from] jsonwebtoken::errors::Error);

/// Issues and verifies credential tokens.
///
/// Stateless: validity is a pure function of the signature and the clock
/// passed in. The `*_at` variants take the clock explicitly so expiry can be
/// tested deterministically.
pub trait TokenCodec: Send + Sync {
    fn issue_at(&self, subject: &str, ttl: Duration, now: DateTime<Utc>) -> Result<String, EncodeError>;

    fn decode_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, DecodeError>;

    fn issue(&self, subject: &str, ttl: Duration) -> Result<String, EncodeError> {
        self.issue_at(subject, ttl, Utc::now())
    }

    fn decode(&self, token: &str) -> Result<Claims, DecodeError> {
        self.decode_at(token, Utc::now())
    }
}

/// HMAC-SHA256 token codec with a shared secret.
pub struct Hs256TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl Hs256TokenCodec {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let secret = secret.as_ref();

        // Expiry is checked by `validate_claims` against the injected clock.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }
}

impl core::fmt::Debug for Hs256TokenCodec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hs256TokenCodec").finish_non_exhaustive()
    }
}

impl TokenCodec for Hs256TokenCodec {
    fn issue_at(&self, subject: &str, ttl: Duration, now: DateTime<Utc>) -> Result<String, EncodeError> {
        let claims = Claims::new(subject, now, ttl);
        Ok(jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.encoding,
        )?)
    }

    fn decode_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, DecodeError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => DecodeError::InvalidSignature,
                ErrorKind::ExpiredSignature => DecodeError::Expired,
                other => DecodeError::Malformed(format!("{other:?}")),
            })?;

        validate_claims(&data.claims, now).map_err(|e| match e {
            TokenValidationError::Expired => DecodeError::Expired,
            other => DecodeError::InvalidClaims(other),
        })?;

        Ok(data.claims)
    }
}
