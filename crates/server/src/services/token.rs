//! Admin session tokens.
//!
//! Stateless JWTs signed with a shared secret. A token carries the user ID
//! as its subject and expires after seven days; there is no revocation list.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Token lifetime: seven days.
const TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// JWT claims for an admin session.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID.
    pub sub: String,

    /// Issued-at (Unix seconds).
    pub iat: i64,

    /// Expiry (Unix seconds).
    pub exp: i64,
}

/// Issues and verifies admin session tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenService {
    /// Create a token service from the shared signing secret.
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    /// Issue a token for a user.
    pub fn issue(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now,
            exp: now + TOKEN_TTL_SECS,
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to sign token: {e}")))
    }

    /// Verify a token and return the user ID it was issued for.
    pub fn verify(&self, token: &str) -> Result<Uuid, AppError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(|_| AppError::Unauthorized("invalid token".into()))?;

        data.claims
            .sub
            .parse::<Uuid>()
            .map_err(|_| AppError::Unauthorized("invalid token".into()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret-test-secret-test-secret!";

    #[test]
    fn issue_and_verify_round_trip() {
        let service = TokenService::new(SECRET);
        let user_id = Uuid::from_u128(99);

        let token = service.issue(user_id).unwrap();
        assert_eq!(service.verify(&token).unwrap(), user_id);
    }

    #[test]
    fn tampered_token_rejected() {
        let service = TokenService::new(SECRET);
        let mut token = service.issue(Uuid::nil()).unwrap();
        token.push('x');

        assert!(matches!(
            service.verify(&token),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn wrong_secret_rejected() {
        let issuer = TokenService::new(SECRET);
        let verifier = TokenService::new(b"another-secret-another-secret-32b!");

        let token = issuer.issue(Uuid::nil()).unwrap();
        assert!(verifier.verify(&token).is_err());
    }

    #[test]
    fn garbage_token_rejected() {
        let service = TokenService::new(SECRET);
        assert!(service.verify("not.a.jwt").is_err());
    }
}
