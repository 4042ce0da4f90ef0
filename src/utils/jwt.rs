use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::user::UserRole;
use crate::error::{AppError, AppResult};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: UserRole,
    pub exp: i64,
    pub iat: i64,
}

pub fn create_token(
    user_id: Uuid,
    email: &str,
    role: UserRole,
    secret: &str,
    expiration_hours: i64,
) -> AppResult<String> {
    let now = Utc::now();
    let exp = now + Duration::hours(expiration_hours);

    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        role,
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
}

pub fn verify_token(token: &str, secret: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AppError::Unauthorized("Token expired".to_string()),
        _ => AppError::Unauthorized(format!("Invalid token: {e}")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_carries_single_role() {
        let id = Uuid::new_v4();
        let token = create_token(id, "guide@example.tn", UserRole::Guide, "secret", 1).unwrap();
        let claims = verify_token(&token, "secret").unwrap();

        assert_eq!(claims.sub, id);
        assert_eq!(claims.role, UserRole::Guide);
    }

    #[test]
    fn test_wrong_secret_is_unauthorized() {
        let token =
            create_token(Uuid::new_v4(), "a@example.tn", UserRole::Tourist, "one", 1).unwrap();
        assert!(matches!(
            verify_token(&token, "two"),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let token =
            create_token(Uuid::new_v4(), "a@example.tn", UserRole::Local, "secret", -2).unwrap();
        match verify_token(&token, "secret") {
            Err(AppError::Unauthorized(message)) => assert_eq!(message, "Token expired"),
            other => panic!("expected expiry error, got {other:?}"),
        }
    }
}
