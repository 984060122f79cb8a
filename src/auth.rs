//! Admin sign-in behind the [`AuthGate`] seam.
//!
//! The stock gate checks one shared credential and hands out signed session tokens.
//! A token is only honoured while its session is open, so logging out really logs out.
//! Sessions past their expiry are dropped on the next sign-in.

use std::{collections::HashMap, sync::RwLock, time::Duration};

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    config::AdminCredential,
    errors::CustomError,
    locks::{rw_read, rw_write},
    utils::{constant_time_eq, verify_password},
};

#[derive(Deserialize, Serialize, Debug)]
pub struct SessionClaims{
    pub sub: String,
    pub sid: String,
    pub exp: usize,
}

/// An open admin session, placed in request extensions by the admin middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    /// Unix seconds.
    pub expires_at: i64,
}

impl Session {
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at <= now
    }
}

#[derive(Debug)]
pub struct LoginGrant {
    pub session: Session,
    pub token: String,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid password. Please try again.")]
    InvalidPassword,
    #[error("token missing")]
    MissingToken,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Session ended, sign in again")]
    SessionEnded,
    #[error("Internal Error")]
    Internal,
}

impl ResponseError for AuthError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(CustomError::new(self.to_string()))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

pub trait AuthGate: Send + Sync {
    fn login(&self, password: &str) -> Result<LoginGrant, AuthError>;

    fn authenticate(&self, token: &str) -> Result<Session, AuthError>;

    fn logout(&self, session: &Session);
}

pub struct TokenGate {
    credential: AdminCredential,
    secret: String,
    ttl: Duration,
    /// Session id → expiry in unix seconds.
    open: RwLock<HashMap<String, i64>>,
}

impl TokenGate {
    pub fn new(credential: AdminCredential, secret: impl Into<String>, ttl: Duration) -> Self {
        Self {
            credential,
            secret: secret.into(),
            ttl,
            open: RwLock::new(HashMap::new()),
        }
    }

    fn credential_matches(&self, candidate: &str) -> bool {
        match &self.credential {
            AdminCredential::Plain(password) => constant_time_eq(password.as_bytes(), candidate.as_bytes()),
            AdminCredential::Hashed(hash) => verify_password(candidate, hash).is_ok(),
        }
    }

    fn expiry_from(&self, now: i64) -> Result<i64, AuthError> {
        i64::try_from(self.ttl.as_secs())
            .ok()
            .and_then(chrono::TimeDelta::try_seconds)
            .and_then(|ttl| chrono::DateTime::from_timestamp(now, 0)?.checked_add_signed(ttl))
            .map(|expires| expires.timestamp())
            .ok_or(AuthError::Internal)
    }
}

impl AuthGate for TokenGate {
    fn login(&self, password: &str) -> Result<LoginGrant, AuthError> {
        if !self.credential_matches(password) {
            warn!("Rejected admin login");
            return Err(AuthError::InvalidPassword);
        }

        let now = Utc::now().timestamp();
        let session = Session {
            id: Uuid::new_v4().to_string(),
            expires_at: self.expiry_from(now)?,
        };

        let claims = SessionClaims {
            sub: "admin".to_string(),
            sid: session.id.clone(),
            exp: usize::try_from(session.expires_at).map_err(|_| AuthError::Internal)?,
        };

        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(self.secret.as_bytes()))
            .map_err(|_| AuthError::Internal)?;

        let mut open = rw_write(&self.open, "auth.login");
        let before = open.len();
        open.retain(|_, expires_at| *expires_at > now);
        if open.len() < before {
            debug!(dropped = before - open.len(), "Dropped expired admin sessions");
        }
        open.insert(session.id.clone(), session.expires_at);
        drop(open);
        info!(session = %session.id, "Admin signed in");

        Ok(LoginGrant { session, token })
    }

    fn authenticate(&self, token: &str) -> Result<Session, AuthError> {
        let token = token.strip_prefix("Bearer ").unwrap_or(token).trim();
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }

        let decoded = decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| AuthError::InvalidToken)?;

        let sid = decoded.claims.sid;
        let expires_at = rw_read(&self.open, "auth.authenticate").get(&sid).copied();
        let Some(expires_at) = expires_at else {
            return Err(AuthError::SessionEnded);
        };

        let session = Session { id: sid, expires_at };
        if session.is_expired(Utc::now().timestamp()) {
            rw_write(&self.open, "auth.authenticate.expired").remove(&session.id);
            return Err(AuthError::SessionEnded);
        }

        Ok(session)
    }

    fn logout(&self, session: &Session) {
        if rw_write(&self.open, "auth.logout").remove(&session.id).is_some() {
            info!(session = %session.id, "Admin signed out");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::hash_password;

    fn gate() -> TokenGate {
        TokenGate::new(
            AdminCredential::Plain("sinha123".to_string()),
            "test-secret",
            Duration::from_secs(3600),
        )
    }

    #[test]
    fn wrong_password_opens_nothing() {
        let gate = gate();

        let err = gate.login("sinha12").unwrap_err();
        assert!(matches!(err, AuthError::InvalidPassword));
        assert_eq!(err.to_string(), "Invalid password. Please try again.");
        assert!(rw_read(&gate.open, "test").is_empty());
    }

    #[test]
    fn login_then_logout() {
        let gate = gate();
        let grant = gate.login("sinha123").unwrap();

        let session = gate.authenticate(&format!("Bearer {}", grant.token)).unwrap();
        assert_eq!(session, grant.session);

        gate.logout(&session);
        assert!(matches!(gate.authenticate(&grant.token), Err(AuthError::SessionEnded)));
    }

    #[test]
    fn tokens_from_another_secret_are_rejected() {
        let other = TokenGate::new(
            AdminCredential::Plain("sinha123".to_string()),
            "another-secret",
            Duration::from_secs(3600),
        );
        let grant = other.login("sinha123").unwrap();

        assert!(matches!(gate().authenticate(&grant.token), Err(AuthError::InvalidToken)));
        assert!(matches!(gate().authenticate("  "), Err(AuthError::MissingToken)));
    }

    #[test]
    fn expired_sessions_are_dropped_on_the_next_login() {
        let gate = TokenGate::new(
            AdminCredential::Plain("sinha123".to_string()),
            "test-secret",
            Duration::ZERO,
        );

        let first = gate.login("sinha123").unwrap();
        assert!(first.session.is_expired(Utc::now().timestamp()));
        let second = gate.login("sinha123").unwrap();

        let open = rw_read(&gate.open, "test");
        assert_eq!(open.len(), 1);
        assert!(open.contains_key(&second.session.id));
        drop(open);

        assert!(matches!(gate.authenticate(&second.token), Err(AuthError::SessionEnded)));
        assert!(rw_read(&gate.open, "test").is_empty());
    }

    #[test]
    fn oversized_ttl_fails_the_login_instead_of_panicking() {
        let gate = TokenGate::new(
            AdminCredential::Plain("sinha123".to_string()),
            "test-secret",
            Duration::from_secs(u64::MAX),
        );

        assert!(matches!(gate.login("sinha123"), Err(AuthError::Internal)));
        assert!(rw_read(&gate.open, "test").is_empty());
    }

    #[test]
    fn hashed_credential_is_verified_with_argon2() {
        let gate = TokenGate::new(
            AdminCredential::Hashed(hash_password("sinha123").unwrap()),
            "test-secret",
            Duration::from_secs(3600),
        );

        assert!(gate.login("sinha123").is_ok());
        assert!(matches!(gate.login("nope"), Err(AuthError::InvalidPassword)));
    }
}
