//! Password hashing

use bcrypt::{hash, verify, DEFAULT_COST};

use crate::error::{Error, Result};

/// bcrypt only reads this many bytes of its input
pub const MAX_PASSWORD_LEN: usize = 72;

/// Reject passwords bcrypt would silently cut short
pub fn check_length(password: &str) -> Result<()> {
    if password.len() > MAX_PASSWORD_LEN {
        return Err(Error::Validation(format!(
            "password must be at most {} bytes",
            MAX_PASSWORD_LEN
        )));
    }
    Ok(())
}

/// Hash a password with bcrypt at the default cost. The salt is embedded in
/// the returned digest.
pub fn hash_password(password: &str) -> Result<String> {
    check_length(password)?;
    Ok(hash(password, DEFAULT_COST)?)
}

/// Check a password against a stored digest.
///
/// A digest bcrypt cannot parse counts as a mismatch so callers only ever see
/// a yes/no answer.
pub fn verify_password(digest: &str, password: &str) -> bool {
    // Such a password could never have been hashed; without this its first
    // 72 bytes alone would match
    if password.len() > MAX_PASSWORD_LEN {
        return false;
    }
    match verify(password, digest) {
        Ok(matches) => matches,
        Err(e) => {
            tracing::warn!("Stored password digest could not be verified: {}", e);
            false
        }
    }
}

/// [`hash_password`] on the blocking pool
pub async fn hash_password_blocking(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| Error::Other(format!("password hashing task failed: {}", e)))?
}

/// [`verify_password`] on the blocking pool
pub async fn verify_password_blocking(digest: String, password: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || verify_password(&digest, &password))
        .await
        .map_err(|e| Error::Other(format!("password verification task failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let digest = hash_password("secret123").unwrap();

        assert!(verify_password(&digest, "secret123"));
        assert!(!verify_password(&digest, "secret124"));
    }

    #[test]
    fn test_hash_is_salted() {
        let first = hash_password("secret123").unwrap();
        let second = hash_password("secret123").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_garbage_digest_is_a_mismatch() {
        assert!(!verify_password("not-a-bcrypt-digest", "secret123"));
    }

    #[test]
    fn test_long_passwords_are_not_truncated() {
        let at_limit = "a".repeat(MAX_PASSWORD_LEN);
        let digest = hash_password(&at_limit).unwrap();
        assert!(verify_password(&digest, &at_limit));
        assert!(!verify_password(&digest, &format!("{}Y", at_limit)));

        let too_long = format!("{}X", at_limit);
        assert!(matches!(hash_password(&too_long), Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn test_blocking_wrappers() {
        let digest = hash_password_blocking("hunter22".to_string()).await.unwrap();
        assert!(verify_password_blocking(digest.clone(), "hunter22".to_string())
            .await
            .unwrap());
        assert!(!verify_password_blocking(digest, "hunter23".to_string())
            .await
            .unwrap());
    }
}
