//! Session token issuance

use std::sync::Arc;

use crate::auth::models::{Claims, Role};
use crate::auth::token::{self, TokenKey};
use crate::error::TokenError;

/// Mints tokens for identities the caller has already authenticated
#[derive(Debug, Clone)]
pub struct SessionIssuer {
    key: Arc<TokenKey>,
}

impl SessionIssuer {
    pub fn new(key: Arc<TokenKey>) -> Self {
        Self { key }
    }

    /// Seal `{uid, role}` into a token. Performs no checks of its own and
    /// touches no storage.
    pub fn issue_token(&self, subject_id: i64, role: Role) -> Result<String, TokenError> {
        token::encode(&Claims::new(subject_id, role), &self.key)
    }

    pub fn key(&self) -> &TokenKey {
        &self.key
    }
}

/// `Authorization` header value for a token
pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issued_token_carries_identity() {
        let issuer = SessionIssuer::new(Arc::new(TokenKey::generate("test")));
        let token = issuer.issue_token(9, Role::Customer).unwrap();
        let claims = token::decode(&token, issuer.key()).unwrap();

        assert_eq!(claims.subject_id, 9);
        assert_eq!(claims.role, Role::Customer);
    }

    #[test]
    fn test_bearer_prefix() {
        assert_eq!(bearer("abc"), "Bearer abc");
    }
}
