//! Bearer token decoding
//!
//! The backend signs its tokens; the client never holds the secret. Tokens
//! are decoded without signature verification purely to read the identity
//! and expiry they carry. The backend still rejects forged tokens with 401.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use megadata_core::{Role, Session, UserId};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Identity claims carried by a MEGA-DATA token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawClaims")]
pub struct Claims {
    pub id: UserId,
    pub username: String,
    pub role: Role,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    #[serde(rename = "service_assigne", skip_serializing_if = "Option::is_none")]
    pub assigned_service: Option<String>,
}

/// Wire shape; the assigned service shows up under two spellings
#[derive(Deserialize)]
struct RawClaims {
    #[serde(default)]
    id: UserId,
    #[serde(default)]
    username: String,
    #[serde(default)]
    role: Option<String>,
    exp: i64,
    #[serde(default)]
    service_assigne: Option<String>,
    #[serde(default, rename = "serviceAssigne")]
    service_assigne_camel: Option<String>,
}

impl TryFrom<RawClaims> for Claims {
    type Error = String;

    fn try_from(raw: RawClaims) -> Result<Self, Self::Error> {
        let role = raw
            .role
            .as_deref()
            .ok_or_else(|| "missing role claim".to_string())?
            .parse()?;
        Ok(Self {
            id: raw.id,
            username: raw.username,
            role,
            exp: raw.exp,
            assigned_service: canonical_service(raw.service_assigne, raw.service_assigne_camel),
        })
    }
}

impl Claims {
    pub fn into_session(self, token: impl Into<String>) -> Session {
        Session::new(
            self.id,
            self.username,
            self.role,
            self.assigned_service,
            self.exp,
            token,
        )
    }
}

/// Pick the assigned service from its two spellings
///
/// The snake_case field wins; blank values count as missing.
pub fn canonical_service(primary: Option<String>, legacy: Option<String>) -> Option<String> {
    let clean = |s: Option<String>| {
        s.map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };
    clean(primary).or_else(|| clean(legacy))
}

/// Reads claims out of bearer tokens
#[derive(Clone)]
pub struct TokenDecoder {
    key: DecodingKey,
    validation: Validation,
}

impl Default for TokenDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenDecoder {
    #[must_use]
    pub fn new() -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        // Expiry is the guard's decision, not the decoder's
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Self {
            key: DecodingKey::from_secret(&[]),
            validation,
        }
    }

    /// Decode the claims of a token
    ///
    /// # Errors
    /// Returns `InvalidToken` if the token is not a well-formed JWT or its
    /// payload lacks the expected claims
    pub fn decode(&self, token: &str) -> AppResult<Claims> {
        decode::<Claims>(token.trim(), &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "Token decode failed");
                AppError::InvalidToken
            })
    }

    /// Build a session straight from a token
    pub fn to_session(&self, token: &str) -> AppResult<Session> {
        let claims = self.decode(token)?;
        Ok(claims.into_session(token.trim()))
    }
}
