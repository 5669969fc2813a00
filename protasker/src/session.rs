//! Explicit authentication session.
//!
//! A [`Session`] is passed to every store call that needs credentials.
//! Losing authorization is modelled as a value ([`AuthState::LoggedOut`]),
//! never as a panic or a global flag.

use std::fmt;

/// Credentials for the current user.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
}

impl Session {
    /// Wraps a bearer token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// The bearer token sent in `Authorization` headers.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").field("token", &"<redacted>").finish()
    }
}

/// Whether the client currently holds usable credentials.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    /// No session; only the logged-out screen is shown.
    #[default]
    LoggedOut,
    /// A session is present.
    Authenticated(Session),
}

impl AuthState {
    /// Builds the initial state from an optional configured token.
    #[must_use]
    pub fn from_token(token: Option<&str>) -> Self {
        match token {
            Some(t) if !t.trim().is_empty() => Self::Authenticated(Session::new(t.trim())),
            _ => Self::LoggedOut,
        }
    }

    /// The active session, if any.
    #[must_use]
    pub const fn session(&self) -> Option<&Session> {
        match self {
            Self::Authenticated(s) => Some(s),
            Self::LoggedOut => None,
        }
    }

    /// Whether a session is present.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    /// Discards the session.
    pub fn logout(&mut self) {
        *self = Self::LoggedOut;
    }
}
