// src/core/session.rs
//! Persisted login session.
//!
//! The token lives in a small TOML file. It is read once at startup and
//! handed to `ApiClient::new`; nothing else reads it behind the caller's back.

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{ApiError, Result};
use crate::types::UserRole;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    #[serde(default, alias = "_id")]
    pub id: String,
    #[serde(default, alias = "full_name")]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub saved_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<SessionUser>,
}

/// Claims we care about. The signature is the server's business.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl TokenClaims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| Utc.timestamp_opt(exp, 0).single())
    }
}

pub fn decode_claims(token: &str) -> Result<TokenClaims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .map_err(|e| ApiError::Decode(format!("access token is not a JWT: {}", e)))
}

impl Session {
    pub fn new(access_token: String, user: Option<SessionUser>) -> Self {
        Self {
            access_token,
            saved_at: Utc::now(),
            user,
        }
    }

    /// Token to attach to requests, unless its `exp` claim has passed.
    /// Opaque (non-JWT) tokens are passed through as-is.
    pub fn bearer_token(&self, now: DateTime<Utc>) -> Result<&str> {
        match decode_claims(&self.access_token) {
            Ok(claims) => match claims.expires_at() {
                Some(expiry) if expiry <= now => {
                    warn!("Stored session expired at {}", expiry);
                    Err(ApiError::SessionExpired)
                }
                _ => Ok(&self.access_token),
            },
            Err(_) => Ok(&self.access_token),
        }
    }
}

pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path)?;
        let session = toml::from_str(&content).map_err(|e| {
            ApiError::Config(format!("corrupt session file {}: {}", self.path.display(), e))
        })?;
        Ok(Some(session))
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string(session)
            .map_err(|e| ApiError::Config(format!("failed to encode session: {}", e)))?;
        std::fs::write(&self.path, content)?;

        info!("Session saved to {}", self.path.display());
        Ok(())
    }

    /// Returns whether a session file was removed
    pub fn clear(&self) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(&self.path)?;
        info!("Session cleared at {}", self.path.display());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token_expiring_at(exp: i64) -> String {
        let claims = serde_json::json!({"sub": "u1", "email": "ada@example.com", "role": "admin", "exp": exp});
        encode(&Header::default(), &claims, &EncodingKey::from_secret(b"server-secret")).unwrap()
    }

    #[test]
    fn test_decode_claims_without_key() {
        let claims = decode_claims(&token_expiring_at(4_102_444_800)).unwrap();
        assert_eq!(claims.sub.as_deref(), Some("u1"));
        assert_eq!(claims.role.as_deref(), Some("admin"));
        assert!(claims.expires_at().is_some());
    }

    #[test]
    fn test_expired_session_is_refused() {
        let session = Session::new(token_expiring_at(1_000), None);
        assert!(matches!(
            session.bearer_token(Utc::now()),
            Err(ApiError::SessionExpired)
        ));

        let fresh = Session::new(token_expiring_at(4_102_444_800), None);
        assert!(fresh.bearer_token(Utc::now()).is_ok());
    }

    #[test]
    fn test_opaque_token_passes_through() {
        let session = Session::new("opaque-token".to_string(), None);
        assert_eq!(session.bearer_token(Utc::now()).unwrap(), "opaque-token");
    }

    #[test]
    fn test_store_roundtrip_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("nested").join("session.toml"));
        assert!(store.load().unwrap().is_none());

        let session = Session::new(
            "tok".to_string(),
            Some(SessionUser {
                id: "u1".into(),
                name: "Ada".into(),
                email: "ada@example.com".into(),
                role: Some(UserRole::Admin),
            }),
        );
        store.save(&session).unwrap();
        assert_eq!(store.load().unwrap(), Some(session));

        assert!(store.clear().unwrap());
        assert!(!store.clear().unwrap());
    }
}
