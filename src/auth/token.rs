use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::{debug, instrument};

use super::types::TokenClaims;
use crate::config::AuthConfig;
use crate::shared::AppError;

/// Outcome of verifying a presented token
#[derive(Debug, Clone, PartialEq)]
pub enum TokenValidation {
    Valid(TokenClaims),
    /// Signature, structure or expiry check failed
    Invalid(String),
}

/// Signs and verifies HS256 tokens with the server secret
#[derive(Clone)]
pub struct TokenConfig {
    secret: String,
    pub ttl_secs: Option<u64>,
}

impl TokenConfig {
    pub fn new(secret: impl Into<String>, ttl_secs: Option<u64>) -> Self {
        Self {
            secret: secret.into(),
            ttl_secs,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.jwt_secret_key(), config.token_ttl_secs)
    }

    /// Creates a signed token for the given user uid
    #[instrument(skip(self, user_id))]
    pub fn create_token(&self, user_id: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let exp = match self.ttl_secs {
            Some(ttl) => Some(expiry_after(now.timestamp(), ttl).ok_or_else(|| {
                debug!(ttl_secs = ttl, "Token expiry out of range");
                AppError::JwtError(format!("token ttl of {}s is out of range", ttl))
            })?),
            None => None,
        };

        debug!(ttl_secs = ?self.ttl_secs, exp_timestamp = ?exp, "Creating token");

        let claims = TokenClaims {
            time: now,
            user_id: user_id.to_string(),
            exp,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_ref()),
        )
        .map_err(|e| {
            debug!(error = %e, "Failed to encode token");
            AppError::JwtError(e.to_string())
        })
    }

    /// Verifies signature, structure and any `exp` claim present
    #[instrument(skip(self, token))]
    pub fn validate_token(&self, token: &str) -> TokenValidation {
        debug!("Decoding and validating token");

        match decode::<TokenClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_ref()),
            &self.validation(),
        ) {
            Ok(data) => {
                debug!(user_id = %data.claims.user_id, "Token decoded successfully");
                TokenValidation::Valid(data.claims)
            }
            Err(e) => {
                debug!(error = %e, "Failed to decode token");
                TokenValidation::Invalid(e.to_string())
            }
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        // exp is always checked when present, and required only with a TTL
        validation.validate_exp = true;
        if self.ttl_secs.is_some() {
            validation.required_spec_claims.insert("exp".to_string());
        }
        validation
    }
}

fn expiry_after(now: i64, ttl_secs: u64) -> Option<usize> {
    let exp = u64::try_from(now).ok()?.checked_add(ttl_secs)?;
    usize::try_from(exp).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign_claims(claims: &TokenClaims, secret: &str) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_create_and_validate_token() {
        let config = TokenConfig::new("test-secret", None);

        let token = config.create_token("uid-123").unwrap();
        assert_eq!(token.split('.').count(), 3);

        match config.validate_token(&token) {
            TokenValidation::Valid(claims) => {
                assert_eq!(claims.user_id, "uid-123");
                assert!(claims.exp.is_none());
                assert!(claims.time <= Utc::now());
            }
            TokenValidation::Invalid(reason) => panic!("token rejected: {}", reason),
        }
    }

    #[test]
    fn test_invalid_token() {
        let config = TokenConfig::new("test-secret", None);
        let result = config.validate_token("invalid.token.here");
        assert!(matches!(result, TokenValidation::Invalid(_)));

        let result = config.validate_token("");
        assert!(matches!(result, TokenValidation::Invalid(_)));
    }

    #[test]
    fn test_token_with_different_secret() {
        let signer = TokenConfig::new("secret-one", None);
        let verifier = TokenConfig::new("secret-two", None);

        let token = signer.create_token("uid-123").unwrap();

        assert!(matches!(signer.validate_token(&token), TokenValidation::Valid(_)));
        assert!(matches!(
            verifier.validate_token(&token),
            TokenValidation::Invalid(_)
        ));
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let config = TokenConfig::new("test-secret", None);
        let genuine = config.create_token("uid-alice").unwrap();
        let other = config.create_token("uid-mallory").unwrap();

        // mallory's payload with alice's signature
        let genuine_parts: Vec<&str> = genuine.split('.').collect();
        let other_parts: Vec<&str> = other.split('.').collect();
        let forged = format!("{}.{}.{}", genuine_parts[0], other_parts[1], genuine_parts[2]);

        assert!(matches!(
            config.validate_token(&forged),
            TokenValidation::Invalid(_)
        ));
    }

    #[test]
    fn test_ttl_adds_expiry() {
        let config = TokenConfig::new("test-secret", Some(3600));
        let token = config.create_token("uid-123").unwrap();

        match config.validate_token(&token) {
            TokenValidation::Valid(claims) => {
                let exp = claims.exp.unwrap();
                assert!(exp as i64 > Utc::now().timestamp());
            }
            TokenValidation::Invalid(reason) => panic!("token rejected: {}", reason),
        }
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let config = TokenConfig::new("test-secret", Some(60));
        let claims = TokenClaims {
            time: Utc::now(),
            user_id: "uid-123".to_string(),
            exp: Some((Utc::now().timestamp() - 3600) as usize),
        };
        let token = sign_claims(&claims, "test-secret");

        assert!(matches!(
            config.validate_token(&token),
            TokenValidation::Invalid(_)
        ));
    }

    #[test]
    fn test_expired_token_rejected_without_ttl() {
        let config = TokenConfig::new("test-secret", None);
        let claims = TokenClaims {
            time: Utc::now(),
            user_id: "uid-123".to_string(),
            exp: Some((Utc::now().timestamp() - 3600) as usize),
        };
        let token = sign_claims(&claims, "test-secret");

        assert!(matches!(
            config.validate_token(&token),
            TokenValidation::Invalid(_)
        ));
    }

    #[test]
    fn test_unexpired_token_accepted_without_ttl() {
        let config = TokenConfig::new("test-secret", None);
        let claims = TokenClaims {
            time: Utc::now(),
            user_id: "uid-123".to_string(),
            exp: Some((Utc::now().timestamp() + 3600) as usize),
        };
        let token = sign_claims(&claims, "test-secret");

        assert!(matches!(
            config.validate_token(&token),
            TokenValidation::Valid(_)
        ));
    }

    #[test]
    fn test_oversized_ttl_is_error() {
        let config = TokenConfig::new("test-secret", Some(u64::MAX));
        let result = config.create_token("uid-123");
        assert!(matches!(result, Err(AppError::JwtError(_))));
    }

    #[test]
    fn test_missing_expiry_rejected_when_ttl_configured() {
        let without_ttl = TokenConfig::new("test-secret", None);
        let with_ttl = TokenConfig::new("test-secret", Some(60));

        let token = without_ttl.create_token("uid-123").unwrap();

        assert!(matches!(
            with_ttl.validate_token(&token),
            TokenValidation::Invalid(_)
        ));
    }
}
