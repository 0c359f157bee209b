//! JWT issuance and validation (HS256)

use crate::auth::models::{JwtClaims, UserRole};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use reelgate_core::AppError;
use uuid::Uuid;

/// Signs and validates the bearer credentials issued at login.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry_hours: i64,
}

impl JwtService {
    pub fn new(secret: &str, expiry_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiry_hours,
        }
    }

    /// Issue a signed, time-limited credential for an authenticated user.
    pub fn issue(
        &self,
        user_id: Uuid,
        username: &str,
        tenant_id: &str,
        role: UserRole,
    ) -> Result<String, AppError> {
        let now = chrono::Utc::now();
        let claims = JwtClaims {
            sub: user_id,
            username: username.to_string(),
            tenant_id: tenant_id.to_string(),
            role,
            exp: (now + chrono::Duration::hours(self.expiry_hours)).timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Validate a bearer token and return its claims.
    ///
    /// Every failure mode collapses to `Unauthorized`; expiry gets its own
    /// message so clients know to re-authenticate rather than retry.
    pub fn validate(&self, token: &str) -> Result<JwtClaims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<JwtClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::Unauthorized("Token has expired".to_string())
                }
                _ => AppError::Unauthorized("Invalid token".to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-0123456789";

    #[test]
    fn test_issue_and_validate_roundtrip() {
        let service = JwtService::new(SECRET, 1);
        let user_id = Uuid::new_v4();
        let token = service
            .issue(user_id, "admin", "tenant1", UserRole::Admin)
            .unwrap();

        let claims = service.validate(&token).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.username, "admin");
        assert_eq!(claims.tenant_id, "tenant1");
        assert_eq!(claims.role, UserRole::Admin);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_tampered_token_rejected() {
        let service = JwtService::new(SECRET, 1);
        let token = service
            .issue(Uuid::new_v4(), "admin", "tenant1", UserRole::Admin)
            .unwrap();

        let mut tampered = token.clone();
        tampered.push('x');
        assert!(matches!(
            service.validate(&tampered),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = JwtService::new(SECRET, 1);
        let verifier = JwtService::new("another-secret-key-000000", 1);
        let token = issuer
            .issue(Uuid::new_v4(), "admin", "tenant1", UserRole::Admin)
            .unwrap();

        assert!(matches!(
            verifier.validate(&token),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_expired_token_rejected_with_expiry_message() {
        let service = JwtService::new(SECRET, -1);
        let token = service
            .issue(Uuid::new_v4(), "admin", "tenant1", UserRole::Admin)
            .unwrap();

        match service.validate(&token) {
            Err(AppError::Unauthorized(msg)) => assert!(msg.contains("expired")),
            other => panic!("expected Unauthorized, got {:?}", other),
        }
    }
}
