//! Encrypted session tokens
//!
//! Tokens follow the shape of PASETO `v2.local`:
//!
//! ```text
//! v2.local.<base64url(nonce(24) || ciphertext || tag(16))>.<base64url(footer)>
//! ```
//!
//! The claims are sealed with XChaCha20-Poly1305 under a single 32-byte key.
//! The footer is a small JSON object naming the key (`{"kid":"..."}`). The
//! header, nonce and footer are bound to the ciphertext as associated data
//! through the pre-authentication encoding, so none of them can be swapped
//! without the tag failing.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chacha20poly1305::{
    aead::{Aead, AeadCore, KeyInit, OsRng, Payload},
    Key, XChaCha20Poly1305, XNonce,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::auth::models::Claims;
use crate::config::AuthConfig;
use crate::error::{Error, Result, TokenError};

pub const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 24;
const TAG_LEN: usize = 16;
const HEADER: &str = "v2.local.";

/// Symmetric token key, loaded once at startup and shared read-only
#[derive(Clone)]
pub struct TokenKey {
    bytes: [u8; KEY_LEN],
    id: String,
}

impl fmt::Debug for TokenKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenKey")
            .field("id", &self.id)
            .field("bytes", &"<redacted>")
            .finish()
    }
}

impl TokenKey {
    pub fn new(bytes: [u8; KEY_LEN], id: impl Into<String>) -> Self {
        Self {
            bytes,
            id: id.into(),
        }
    }

    /// Fresh random key from the OS generator
    pub fn generate(id: impl Into<String>) -> Self {
        let generated = XChaCha20Poly1305::generate_key(&mut OsRng);
        let mut bytes = [0u8; KEY_LEN];
        bytes.copy_from_slice(&generated);
        Self::new(bytes, id)
    }

    /// Parse key material: 64 hex characters, or exactly 32 raw bytes
    pub fn parse(material: &str, id: impl Into<String>) -> Result<Self> {
        let material = material.trim();
        if material.is_empty() {
            return Err(Error::Config("auth.token_key is not set".to_string()));
        }

        let mut bytes = [0u8; KEY_LEN];
        if material.len() == KEY_LEN * 2 && material.chars().all(|c| c.is_ascii_hexdigit()) {
            hex::decode_to_slice(material, &mut bytes)
                .map_err(|e| Error::Config(format!("invalid hex token key: {}", e)))?;
        } else if material.len() == KEY_LEN {
            bytes.copy_from_slice(material.as_bytes());
        } else {
            return Err(Error::Config(format!(
                "auth.token_key must be {} bytes or {} hex characters, got {} bytes",
                KEY_LEN,
                KEY_LEN * 2,
                material.len()
            )));
        }

        Ok(Self::new(bytes, id))
    }

    pub fn from_config(config: &AuthConfig) -> Result<Self> {
        Self::parse(&config.token_key, config.key_id.clone())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    fn cipher(&self) -> XChaCha20Poly1305 {
        XChaCha20Poly1305::new(Key::from_slice(&self.bytes))
    }
}

#[derive(Serialize, Deserialize)]
struct Footer {
    kid: String,
}

/// Pre-authentication encoding: piece count, then each piece prefixed with
/// its little-endian u64 length.
fn pae(pieces: &[&[u8]]) -> Vec<u8> {
    let total: usize = pieces.iter().map(|p| p.len() + 8).sum();
    let mut out = Vec::with_capacity(8 + total);
    out.extend_from_slice(&(pieces.len() as u64).to_le_bytes());
    for piece in pieces {
        out.extend_from_slice(&(piece.len() as u64).to_le_bytes());
        out.extend_from_slice(piece);
    }
    out
}

/// Seal claims into an opaque token. Every call draws a fresh nonce, so the
/// same claims never produce the same token twice.
pub fn encode(claims: &Claims, key: &TokenKey) -> std::result::Result<String, TokenError> {
    let message = serde_json::to_vec(claims).map_err(|e| TokenError::Encoding(e.to_string()))?;
    let footer = serde_json::to_vec(&Footer {
        kid: key.id.clone(),
    })
    .map_err(|e| TokenError::Encoding(e.to_string()))?;

    let nonce = XChaCha20Poly1305::generate_nonce(&mut OsRng);
    let aad = pae(&[HEADER.as_bytes(), nonce.as_slice(), &footer]);

    let ciphertext = key
        .cipher()
        .encrypt(
            &nonce,
            Payload {
                msg: &message,
                aad: &aad,
            },
        )
        .map_err(|e| TokenError::Encoding(e.to_string()))?;

    let mut body = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    body.extend_from_slice(&nonce);
    body.extend_from_slice(&ciphertext);

    Ok(format!(
        "{}{}.{}",
        HEADER,
        URL_SAFE_NO_PAD.encode(body),
        URL_SAFE_NO_PAD.encode(footer)
    ))
}

/// Open a token and return its claims.
///
/// Only the envelope shape is checked before the tag verifies; the footer and
/// the claims are read after.
pub fn decode(token: &str, key: &TokenKey) -> std::result::Result<Claims, TokenError> {
    let rest = token
        .strip_prefix(HEADER)
        .ok_or(TokenError::Malformed("unsupported token header"))?;
    let (body, footer) = rest
        .split_once('.')
        .ok_or(TokenError::Malformed("missing footer"))?;

    let body = URL_SAFE_NO_PAD
        .decode(body)
        .map_err(|_| TokenError::Malformed("payload is not base64url"))?;
    let footer = URL_SAFE_NO_PAD
        .decode(footer)
        .map_err(|_| TokenError::Malformed("footer is not base64url"))?;

    if body.len() < NONCE_LEN + TAG_LEN {
        return Err(TokenError::Malformed("payload too short"));
    }

    let (nonce, ciphertext) = body.split_at(NONCE_LEN);
    let nonce = XNonce::from_slice(nonce);
    let aad = pae(&[HEADER.as_bytes(), nonce.as_slice(), &footer]);

    let message = key
        .cipher()
        .decrypt(
            nonce,
            Payload {
                msg: ciphertext,
                aad: &aad,
            },
        )
        .map_err(|_| TokenError::AuthenticationFailed)?;

    let kid = serde_json::from_slice::<Footer>(&footer)
        .map_err(|_| TokenError::Malformed("unreadable footer"))?
        .kid;
    if kid != key.id {
        return Err(TokenError::AuthenticationFailed);
    }

    serde_json::from_slice(&message).map_err(|_| TokenError::Malformed("payload is not a claims object"))
}
