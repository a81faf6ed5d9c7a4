use core::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use ledgerdesk_core::UserId;

use crate::claims::{validate_claims, SessionClaims, SessionError};

/// Opaque bearer token returned by the login endpoint.
///
/// `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// An authenticated dashboard session.
///
/// Owned by whoever performed the login; collaborators only ever see
/// `&SessionContext` and must call [`SessionContext::ensure_active`] (or
/// [`SessionContext::authorization_header`]) before acting on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    claims: SessionClaims,
    token: AccessToken,
    invalidated: bool,
}

impl SessionContext {
    /// Create a session from decoded login claims.
    pub fn from_claims(
        claims: SessionClaims,
        token: AccessToken,
        now: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        validate_claims(&claims, now)?;
        tracing::info!(user_id = %claims.sub, expires_at = %claims.expires_at, "session started");
        Ok(Self {
            claims,
            token,
            invalidated: false,
        })
    }

    /// Create a session valid for `ttl` starting at `now`.
    pub fn login(
        user_id: UserId,
        token: AccessToken,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Self, SessionError> {
        let claims = SessionClaims {
            sub: user_id,
            issued_at: now,
            expires_at: now + ttl,
        };
        Self::from_claims(claims, token, now)
    }

    pub fn user_id(&self) -> UserId {
        self.claims.sub
    }

    pub fn claims(&self) -> &SessionClaims {
        &self.claims
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.ensure_active(now).is_ok()
    }

    pub fn ensure_active(&self, now: DateTime<Utc>) -> Result<(), SessionError> {
        if self.invalidated {
            return Err(SessionError::Invalidated);
        }
        validate_claims(&self.claims, now)
    }

    /// `Authorization` header value for an outgoing request.
    pub fn authorization_header(&self, now: DateTime<Utc>) -> Result<String, SessionError> {
        self.ensure_active(now)?;
        Ok(format!("Bearer {}", self.token.expose()))
    }

    /// Log out. Every later use of this session fails with `Invalidated`.
    pub fn invalidate(&mut self) {
        if !self.invalidated {
            tracing::info!(user_id = %self.claims.sub, "session invalidated");
        }
        self.invalidated = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(now: DateTime<Utc>) -> SessionContext {
        SessionContext::login(
            UserId::from_u128(7),
            AccessToken::new("secret-token"),
            now,
            Duration::minutes(30),
        )
        .unwrap()
    }

    #[test]
    fn active_session_yields_bearer_header() {
        let now = Utc::now();
        let s = session(now);
        assert_eq!(s.authorization_header(now).unwrap(), "Bearer secret-token");
        assert_eq!(s.user_id(), UserId::from_u128(7));
    }

    #[test]
    fn invalidated_session_is_rejected() {
        let now = Utc::now();
        let mut s = session(now);
        s.invalidate();
        assert_eq!(s.ensure_active(now), Err(SessionError::Invalidated));
        assert!(s.authorization_header(now).is_err());
        assert!(!s.is_active(now));
    }

    #[test]
    fn expiry_is_enforced() {
        let now = Utc::now();
        let s = session(now);
        assert_eq!(s.ensure_active(now + Duration::minutes(31)), Err(SessionError::Expired));
    }

    #[test]
    fn login_rejects_empty_window() {
        let now = Utc::now();
        let err = SessionContext::login(UserId::new(), AccessToken::new("t"), now, Duration::zero())
            .unwrap_err();
        assert_eq!(err, SessionError::InvalidTimeWindow);
    }

    #[test]
    fn token_is_redacted_in_debug_output() {
        let s = session(Utc::now());
        let debug = format!("{s:?}");
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("AccessToken(***)"));

        let json = serde_json::to_string(&AccessToken::new("abc")).unwrap();
        assert_eq!(json, "\"abc\"");
    }
}
