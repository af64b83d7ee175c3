//! JWT token management

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use notevault_db::User;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AuthError, TokenError};

/// Minimum signing secret length in bytes (HS256 floor)
///
/// A shorter secret is a configuration error and fails construction; it is
/// never discovered at request time.
pub const MIN_SECRET_BYTES: usize = 32;

/// JWT claims
///
/// The token carries only the subject and its validity window; roles and
/// account status are re-resolved from the store on every request.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Token codec for issuing and verifying signed bearer tokens
#[derive(Clone)]
pub struct JwtCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime_ms: i64,
}

impl JwtCodec {
    /// Create a new codec from the configured secret and token lifetime
    pub fn new(secret: &str, lifetime_ms: i64) -> Result<Self, AuthError> {
        if secret.len() < MIN_SECRET_BYTES {
            return Err(AuthError::SecretTooShort {
                len: secret.len(),
                min: MIN_SECRET_BYTES,
            });
        }
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            lifetime_ms,
        })
    }

    /// Configured token lifetime in milliseconds
    pub fn lifetime_ms(&self) -> i64 {
        self.lifetime_ms
    }

    /// Issue a signed token for a user
    pub fn issue(&self, user: &User) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now + Duration::milliseconds(self.lifetime_ms);

        let claims = Claims {
            sub: user.username.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        debug!("Issuing token for user: {}", user.username);

        encode(&Header::default(), &claims, &self.encoding_key).map_err(AuthError::Jwt)
    }

    /// Verify a token's signature and expiry and return its claims
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)?;

        // The library accepts exp == now; a token is dead at its recorded
        // expiry instant, not one second after.
        if token_data.claims.exp <= Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(token_data.claims)
    }

    /// Extract the subject from a token already verified in this request
    pub fn subject_of(&self, token: &str) -> Result<String, TokenError> {
        Ok(self.verify(token)?.sub)
    }
}
