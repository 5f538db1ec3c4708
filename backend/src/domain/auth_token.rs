//! HS256 bearer tokens carrying an administrator identity.
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::models::administrator::AdminSession;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    username: String,
    iat: i64,
    exp: i64,
}

#[derive(Clone)]
pub struct AuthTokens {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl AuthTokens {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn issue(&self, session: &AdminSession) -> anyhow::Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: session.admin_id.clone(),
            username: session.username.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    pub fn verify(&self, token: &str) -> DomainResult<AdminSession> {
        let mut validation = Validation::default();
        validation.validate_exp = true;

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            debug!("Rejected admin token: {}", e);
            DomainError::Unauthorized("Invalid or expired token".to_string())
        })?;

        Ok(AdminSession {
            admin_id: data.claims.sub,
            username: data.claims.username,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> AdminSession {
        AdminSession {
            admin_id: "a1".to_string(),
            username: "admin".to_string(),
        }
    }

    #[test]
    fn test_issued_token_verifies() {
        let tokens = AuthTokens::new("secret", Duration::hours(1));
        let token = tokens.issue(&session()).unwrap();

        assert_eq!(tokens.verify(&token).unwrap(), session());
    }

    #[test]
    fn test_foreign_and_expired_tokens_are_rejected() {
        let ours = AuthTokens::new("secret", Duration::hours(1));
        let theirs = AuthTokens::new("other-secret", Duration::hours(1));
        let foreign = theirs.issue(&session()).unwrap();
        assert!(matches!(ours.verify(&foreign), Err(DomainError::Unauthorized(_))));

        // Well past the default leeway of 60 seconds
        let stale = AuthTokens::new("secret", Duration::minutes(-10));
        let expired = stale.issue(&session()).unwrap();
        assert!(matches!(ours.verify(&expired), Err(DomainError::Unauthorized(_))));

        assert!(ours.verify("not-a-token").is_err());
    }
}
