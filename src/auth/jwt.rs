use jsonwebtoken::{decode, Algorithm, DecodingKey, TokenData, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Access-token claims issued by the identity provider. Only `sub` and
/// `exp` are required.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    pub exp: i64,
}

pub fn verify_token(token: &str, config: &Config) -> AppResult<TokenData<Claims>> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    match config.jwt_audience.as_deref() {
        Some(aud) => validation.set_audience(&[aud]),
        None => validation.validate_aud = false,
    }

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|e| {
        tracing::debug!(error = %e, "Token rejected");
        AppError::Unauthorized
    })
}

#[cfg(test)]
pub fn issue_test_token(user_id: Uuid, config: &Config, ttl_secs: i64) -> String {
    use jsonwebtoken::{encode, EncodingKey, Header};

    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        email: Some("someone@example.test".into()),
        exp: now + ttl_secs,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .expect("encode test token")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_token_round_trips_subject() {
        let config = Config::for_tests();
        let user = Uuid::new_v4();
        let token = issue_test_token(user, &config, 3600);

        let data = verify_token(&token, &config).unwrap();
        assert_eq!(data.claims.sub, user);
        assert_eq!(data.claims.email.as_deref(), Some("someone@example.test"));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let config = Config::for_tests();
        // Well past the default 60 s leeway
        let token = issue_test_token(Uuid::new_v4(), &config, -3600);
        assert!(matches!(verify_token(&token, &config), Err(AppError::Unauthorized)));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let config = Config::for_tests();
        let token = issue_test_token(Uuid::new_v4(), &config, 3600);

        let mut other = Config::for_tests();
        other.jwt_secret = "a-different-secret".into();
        assert!(verify_token(&token, &other).is_err());
    }

    #[test]
    fn test_provider_extra_claims_are_ignored() {
        use jsonwebtoken::{encode, EncodingKey, Header};

        let config = Config::for_tests();
        let user = Uuid::new_v4();
        let now = chrono::Utc::now().timestamp();
        let claims = serde_json::json!({
            "sub": user,
            "exp": now + 600,
            "iat": now,
            "role": "authenticated",
            "aal": "aal1",
        });
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
        )
        .unwrap();

        let data = verify_token(&token, &config).unwrap();
        assert_eq!(data.claims.sub, user);
        assert!(data.claims.email.is_none());
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(verify_token("not.a.jwt", &Config::for_tests()).is_err());
    }
}
