//! Credential handling for sheetlink.
//!
//! A [`Credential`] is a closed union of the four supported shapes. Each
//! remote request resolves the credential into an [`AuthDirective`] freshly,
//! because refreshable shapes may rotate tokens between calls — the directive
//! is never cached.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised while resolving a credential.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credential: {0}")]
    InvalidCredential(String),
}

/// Result type for credential operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// A refreshable, service-account-style principal. `authorize` is called
/// once per outgoing request and must return a currently valid access token.
#[async_trait]
pub trait Authorize: Send + Sync {
    async fn authorize(&self) -> Option<String>;
}

/// A delegated token source: the embedding application fetches tokens
/// however it likes (OAuth flows, metadata servers, key files).
#[async_trait]
pub trait ProvideToken: Send + Sync {
    async fn provide_token(&self) -> Option<String>;
}

/// The four supported credential shapes.
#[derive(Clone)]
pub enum Credential {
    /// API key. Read-only: the remote service rejects mutations under it.
    ApiKey(String),
    /// A raw bearer token supplied by the caller.
    AccessToken(String),
    /// Refreshable authorizable principal.
    ServiceAccount(Arc<dyn Authorize>),
    /// Delegated async token provider.
    TokenProvider(Arc<dyn ProvideToken>),
}

/// What a request must attach to authenticate: either a query parameter or
/// an `Authorization` header value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthDirective {
    QueryParam { key: &'static str, value: String },
    Header { value: String },
}

impl Credential {
    pub fn api_key(key: impl Into<String>) -> Self {
        Credential::ApiKey(key.into())
    }

    pub fn access_token(token: impl Into<String>) -> Self {
        Credential::AccessToken(token.into())
    }

    pub fn service_account(principal: impl Authorize + 'static) -> Self {
        Credential::ServiceAccount(Arc::new(principal))
    }

    pub fn token_provider(provider: impl ProvideToken + 'static) -> Self {
        Credential::TokenProvider(Arc::new(provider))
    }

    /// Whether this credential only grants read access (the API-key shape).
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        matches!(self, Credential::ApiKey(_))
    }

    /// Resolve into the directive for one request. Refreshable shapes are
    /// asked for a fresh token every time.
    pub async fn resolve(&self) -> Result<AuthDirective> {
        match self {
            Credential::ApiKey(key) => {
                if key.is_empty() {
                    return Err(AuthError::InvalidCredential("empty API key".into()));
                }
                Ok(AuthDirective::QueryParam {
                    key: "key",
                    value: key.clone(),
                })
            }
            Credential::AccessToken(token) => {
                if token.is_empty() {
                    return Err(AuthError::InvalidCredential("empty access token".into()));
                }
                Ok(AuthDirective::Header {
                    value: format!("Bearer {token}"),
                })
            }
            Credential::ServiceAccount(principal) => {
                let token = principal.authorize().await.filter(|t| !t.is_empty());
                match token {
                    Some(token) => Ok(AuthDirective::Header {
                        value: format!("Bearer {token}"),
                    }),
                    None => Err(AuthError::InvalidCredential(
                        "service account yielded no access token".into(),
                    )),
                }
            }
            Credential::TokenProvider(provider) => {
                let token = provider.provide_token().await.filter(|t| !t.is_empty());
                match token {
                    Some(token) => Ok(AuthDirective::Header {
                        value: format!("Bearer {token}"),
                    }),
                    None => Err(AuthError::InvalidCredential(
                        "token provider yielded no token".into(),
                    )),
                }
            }
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::ApiKey(_) => f.write_str("Credential::ApiKey(..)"),
            Credential::AccessToken(_) => f.write_str("Credential::AccessToken(..)"),
            Credential::ServiceAccount(_) => f.write_str("Credential::ServiceAccount(..)"),
            Credential::TokenProvider(_) => f.write_str("Credential::TokenProvider(..)"),
        }
    }
}
