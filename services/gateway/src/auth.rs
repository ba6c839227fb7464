//! JWT authentication
//!
//! Every connection carries a signed token identifying the player. REST
//! requests send it as a bearer header; WebSocket upgrades may also pass
//! it as a `token` query parameter since browsers cannot set headers on
//! the upgrade request.

use crate::error::AppError;
use crate::state::AppState;
use axum::{extract::FromRequestParts, http::request::Parts};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use types::ids::PlayerId;
use types::player::PlayerProfile;

fn default_avatar() -> String {
    "👤".to_string()
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub player_id: PlayerId,
    pub username: String,
    #[serde(default = "default_avatar")]
    pub avatar: String,
}

/// Decoding key plus validation settings, shared across handlers
pub struct AuthKeys {
    decoding: DecodingKey,
    validation: Validation,
}

impl AuthKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(),
        }
    }

    /// Verify a raw token and extract the player's profile
    pub fn verify(&self, token: &str) -> Result<PlayerProfile, AppError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))?;
        Ok(PlayerProfile::new(
            data.claims.player_id,
            data.claims.username,
            data.claims.avatar,
        ))
    }
}

/// Extractor for authenticated REST requests
pub struct AuthenticatedPlayer {
    pub profile: PlayerProfile,
}

impl FromRequestParts<AppState> for AuthenticatedPlayer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get("Authorization")
            .ok_or_else(|| AppError::Unauthorized("Missing authorization header".into()))?;
        let value = header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid header string".into()))?;
        let token = value
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("Expected bearer token".into()))?;

        let profile = state.auth.verify(token)?;
        Ok(AuthenticatedPlayer { profile })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token(secret: &str, claims: &Claims) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_verify_roundtrip() {
        let keys = AuthKeys::new("test-secret");
        let player_id = PlayerId::new();
        let claims = Claims {
            sub: player_id.to_string(),
            exp: (chrono::Utc::now().timestamp() + 3600) as usize,
            player_id,
            username: "alice".into(),
            avatar: "🦊".into(),
        };

        let profile = keys.verify(&token("test-secret", &claims)).unwrap();
        assert_eq!(profile.player_id, player_id);
        assert_eq!(profile.username, "alice");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let keys = AuthKeys::new("test-secret");
        let player_id = PlayerId::new();
        let claims = Claims {
            sub: player_id.to_string(),
            exp: (chrono::Utc::now().timestamp() + 3600) as usize,
            player_id,
            username: "alice".into(),
            avatar: "🦊".into(),
        };

        assert!(keys.verify(&token("other-secret", &claims)).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let keys = AuthKeys::new("test-secret");
        let player_id = PlayerId::new();
        let claims = Claims {
            sub: player_id.to_string(),
            exp: (chrono::Utc::now().timestamp() - 3600) as usize,
            player_id,
            username: "alice".into(),
            avatar: "🦊".into(),
        };

        assert!(keys.verify(&token("test-secret", &claims)).is_err());
    }
}
