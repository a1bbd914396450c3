//! HS256 JWT implementation of the `TokenService` port.
//!
//! Tokens carry `sub` (user id), `iat` and `exp`. Expiry is checked against
//! the injected clock with no leeway rather than the library's wall clock,
//! which keeps expiry behaviour testable.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use mockable::Clock;
use serde::{Deserialize, Serialize};

use crate::domain::UserId;
use crate::domain::ports::{IssuedToken, TokenError, TokenService};

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// Signs and verifies session tokens with a shared secret.
pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    validity: Duration,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for JwtTokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtTokenService")
            .field("validity", &self.validity)
            .finish_non_exhaustive()
    }
}

impl JwtTokenService {
    /// Create a service signing with `secret`; tokens live for `validity`.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Signing`] for an empty secret or a validity
    /// window chrono cannot represent.
    pub fn new(
        secret: &[u8],
        validity: Duration,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::signing("token secret must not be empty"));
        }
        TimeDelta::from_std(validity)
            .map_err(|err| TokenError::signing(format!("token validity out of range: {err}")))?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            validity,
            clock,
        })
    }

    fn expiry_from(&self, issued_at: DateTime<Utc>) -> Result<DateTime<Utc>, TokenError> {
        TimeDelta::from_std(self.validity)
            .ok()
            .and_then(|delta| issued_at.checked_add_signed(delta))
            .ok_or_else(|| TokenError::signing("token expiry overflows"))
    }
}

impl TokenService for JwtTokenService {
    fn sign(&self, user_id: &UserId) -> Result<IssuedToken, TokenError> {
        let issued_at = self.clock.utc();
        let expires_at = self.expiry_from(issued_at)?;
        let claims = Claims {
            sub: user_id.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|err| TokenError::signing(err.to_string()))?;
        Ok(IssuedToken { token, expires_at })
    }

    fn verify(&self, token: &str) -> Result<UserId, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|err| TokenError::invalid(err.to_string()))?;
        if data.claims.exp <= self.clock.utc().timestamp() {
            return Err(TokenError::invalid("token expired"));
        }
        UserId::new(&data.claims.sub).map_err(|err| TokenError::invalid(err.to_string()))
    }

    fn validity(&self) -> Duration {
        self.validity
    }
}
