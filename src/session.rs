//! session
//!
//! Operator identity for a single invocation.
//!
//! An [`OperatorContext`] is produced once per command by a
//! [`SessionLookup`] and passed down explicitly. Mutating gallery
//! operations call [`OperatorContext::require`] before touching the store.

use thiserror::Error;

/// Errors from the session gate.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("not authenticated")]
    NotAuthenticated,
}

/// Who is acting, and whether they may mutate the site.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperatorContext {
    pub operator: Option<String>,
    pub authenticated: bool,
}

impl OperatorContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(operator: impl Into<String>) -> Self {
        Self {
            operator: Some(operator.into()),
            authenticated: true,
        }
    }

    /// Gate for mutating operations.
    pub fn require(&self) -> Result<(), SessionError> {
        if self.authenticated {
            Ok(())
        } else {
            Err(SessionError::NotAuthenticated)
        }
    }

    /// Display name for logs.
    pub fn name(&self) -> &str {
        self.operator.as_deref().unwrap_or("anonymous")
    }
}

/// Produces the operator context for an invocation.
pub trait SessionLookup {
    fn lookup(&self) -> OperatorContext;
}

/// Session backed by the presence of an API token.
///
/// The operator is authenticated when a non-blank token is available.
#[derive(Clone, Default)]
pub struct TokenSession {
    token: Option<String>,
    operator: String,
}

// Custom Debug to avoid exposing the token
impl std::fmt::Debug for TokenSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSession")
            .field("has_token", &self.token.is_some())
            .field("operator", &self.operator)
            .finish()
    }
}

impl TokenSession {
    pub fn new(token: Option<String>, operator: impl Into<String>) -> Self {
        Self {
            token: token.filter(|t| !t.trim().is_empty()),
            operator: operator.into(),
        }
    }

    /// Read the token from an environment variable.
    ///
    /// The operator name falls back to `$USER`, then `"operator"`.
    pub fn from_env(token_var: &str) -> Self {
        let operator = std::env::var("USER").unwrap_or_else(|_| "operator".to_string());
        Self::new(std::env::var(token_var).ok(), operator)
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

impl SessionLookup for TokenSession {
    fn lookup(&self) -> OperatorContext {
        match self.token {
            Some(_) => OperatorContext::authenticated(self.operator.clone()),
            None => OperatorContext::anonymous(),
        }
    }
}
