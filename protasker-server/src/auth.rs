//! Bearer-token authentication.
//!
//! Tokens are provisioned out of band (see the `[auth.tokens]` config
//! table) and map directly to a [`UserId`]. Every protected handler takes an
//! [`AuthUser`] argument; a request without a known token never reaches the
//! handler body.

use std::collections::HashMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use parking_lot::RwLock;
use protasker_proto::api::ErrorBody;
use protasker_proto::project::UserId;

use crate::api::AppState;

/// Message returned when the `Authorization` header is absent or malformed.
pub const MSG_NO_TOKEN: &str = "No token, authorization denied";

/// Message returned when the presented token is not recognised.
pub const MSG_BAD_TOKEN: &str = "Token is not valid";

/// Maps bearer tokens to the users they authenticate.
#[derive(Debug, Default)]
pub struct TokenTable {
    tokens: RwLock<HashMap<String, UserId>>,
}

impl TokenTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from `token -> user id` pairs.
    #[must_use]
    pub fn from_pairs<I, T, U>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (T, U)>,
        T: Into<String>,
        U: Into<String>,
    {
        let tokens = pairs
            .into_iter()
            .map(|(t, u)| (t.into(), UserId::new(u)))
            .collect();
        Self {
            tokens: RwLock::new(tokens),
        }
    }

    /// Grants `token` to `user`, replacing any previous owner.
    pub fn insert(&self, token: impl Into<String>, user: UserId) {
        self.tokens.write().insert(token.into(), user);
    }

    /// Revokes a token. Returns the user it belonged to.
    pub fn revoke(&self, token: &str) -> Option<UserId> {
        self.tokens.write().remove(token)
    }

    /// Looks up the user a token authenticates.
    #[must_use]
    pub fn resolve(&self, token: &str) -> Option<UserId> {
        self.tokens.read().get(token).cloned()
    }

    /// Number of known tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.read().len()
    }

    /// Whether no tokens are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.read().is_empty()
    }
}

/// Rejection produced by the [`AuthUser`] extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    /// No `Authorization: Bearer ...` header.
    MissingToken,
    /// Header present but the token is unknown.
    InvalidToken,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let msg = match self {
            Self::MissingToken => MSG_NO_TOKEN,
            Self::InvalidToken => MSG_BAD_TOKEN,
        };
        (StatusCode::UNAUTHORIZED, Json(ErrorBody::new(msg))).into_response()
    }
}

/// The authenticated caller of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser(pub UserId);

/// Extracts the token from an `Authorization` header value.
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(bearer_token)
            .ok_or(AuthRejection::MissingToken)?;

        match state.tokens.resolve(token) {
            Some(user) => Ok(Self(user)),
            None => {
                tracing::debug!("rejected unknown bearer token");
                Err(AuthRejection::InvalidToken)
            }
        }
    }
}
