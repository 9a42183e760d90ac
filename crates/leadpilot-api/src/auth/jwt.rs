//! Bearer token verification. Tokens are HS256-signed by the identity
//! provider; we only verify and read them, never issue them.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use leadpilot_core::AppError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Stable user id.
    pub sub: Uuid,
    pub email: String,
    /// Expiry as a Unix timestamp; enforced by the decoder.
    pub exp: usize,
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-secret";

    fn token_for(sub: Uuid, email: &str, exp_offset_secs: i64) -> String {
        let exp = (chrono::Utc::now().timestamp() + exp_offset_secs) as usize;
        let claims = Claims {
            sub,
            email: email.to_string(),
            exp,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_verify_valid_token() {
        let sub = Uuid::new_v4();
        let token = token_for(sub, "alice@example.com", 3600);

        let claims = verify_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, sub);
        assert_eq!(claims.email, "alice@example.com");
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = token_for(Uuid::new_v4(), "alice@example.com", -3600);
        let err = verify_token(&token, SECRET).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = token_for(Uuid::new_v4(), "alice@example.com", 3600);
        assert!(verify_token(&token, "other-secret").is_err());
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(verify_token("not-a-jwt", SECRET).is_err());
    }
}
