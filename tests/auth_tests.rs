//! Authentication and authorization tests
//! Covers the password verifier, the token codec and the authorization gate

use axum::http::{header::AUTHORIZATION, HeaderMap, HeaderValue};
use ticket_booking::auth::{
    authorize, bearer, password, token, Claims, Role, SessionIssuer, TokenKey,
};
use ticket_booking::error::{AuthError, TokenError};
use std::sync::Arc;

fn key() -> TokenKey {
    TokenKey::parse("YELLOW SUBMARINE, BLACK WIZARDRY", "v2-local-1").unwrap()
}

fn header(value: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
    headers
}

// ============================================================================
// Password verifier
// ============================================================================

#[test]
fn test_verify_accepts_only_the_hashed_password() {
    let digest = password::hash_password("secret123").expect("Failed to hash");

    assert!(password::verify_password(&digest, "secret123"));
    for other in ["secret12", "secret1234", "Secret123", "", " secret123"] {
        assert!(!password::verify_password(&digest, other), "{} should not verify", other);
    }
}

#[test]
fn test_passwords_sharing_a_72_byte_prefix_do_not_collide() {
    let prefix = "a".repeat(password::MAX_PASSWORD_LEN);
    let stored = format!("{}X", prefix);
    let guess = format!("{}Y", prefix);

    // The longer password is refused rather than hashed from its prefix
    assert!(password::hash_password(&stored).is_err());

    let digest = password::hash_password(&prefix).unwrap();
    assert!(password::verify_password(&digest, &prefix));
    assert!(!password::verify_password(&digest, &guess));
}

#[test]
fn test_digest_embeds_salt() {
    let digest = password::hash_password("secret123").unwrap();
    assert!(digest.starts_with("$2"));
    assert!(!digest.contains("secret123"));
}

// ============================================================================
// Token codec
// ============================================================================

#[test]
fn test_round_trip() {
    let key = key();
    for claims in [
        Claims::new(1, Role::Customer),
        Claims::new(0, Role::Admin),
        Claims::new(i64::MAX, Role::Customer),
        Claims::new(-5, Role::Admin),
    ] {
        let token = token::encode(&claims, &key).expect("Failed to create token");
        assert_eq!(token::decode(&token, &key), Ok(claims));
    }
}

#[test]
fn test_identical_claims_give_distinct_tokens() {
    let key = key();
    let claims = Claims::new(7, Role::Customer);

    let first = token::encode(&claims, &key).unwrap();
    let second = token::encode(&claims, &key).unwrap();

    assert_ne!(first, second);
    assert_eq!(token::decode(&first, &key), Ok(claims));
    assert_eq!(token::decode(&second, &key), Ok(claims));
}

#[test]
fn test_every_sealed_byte_is_tamper_evident() {
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};

    let key = key();
    let token = token::encode(&Claims::new(11, Role::Admin), &key).unwrap();
    let rest = token.strip_prefix("v2.local.").unwrap();
    let (body, footer) = rest.split_once('.').unwrap();
    let sealed = URL_SAFE_NO_PAD.decode(body).unwrap();

    for i in 0..sealed.len() {
        let mut mutated = sealed.clone();
        mutated[i] ^= 0x01;
        let forged = format!("v2.local.{}.{}", URL_SAFE_NO_PAD.encode(&mutated), footer);
        assert_eq!(
            token::decode(&forged, &key),
            Err(TokenError::AuthenticationFailed),
            "flipping byte {} was not detected",
            i
        );
    }
}

#[test]
fn test_every_token_character_is_tamper_evident() {
    let key = key();
    let token = token::encode(&Claims::new(11, Role::Admin), &key).unwrap();
    let bytes = token.as_bytes();

    for i in 0..bytes.len() {
        let mut mutated = bytes.to_vec();
        mutated[i] = if mutated[i] == b'A' { b'B' } else { b'A' };
        let mutated = String::from_utf8(mutated).unwrap();
        assert!(
            token::decode(&mutated, &key).is_err(),
            "changing character {} was accepted",
            i
        );
    }
}

#[test]
fn test_wrong_key_is_rejected() {
    let claims = Claims::new(3, Role::Customer);
    let token = token::encode(&claims, &key()).unwrap();

    let other = TokenKey::parse("yellow submarine, black wizardry", "v2-local-1").unwrap();
    assert_eq!(token::decode(&token, &other), Err(TokenError::AuthenticationFailed));

    let random = TokenKey::generate("v2-local-1");
    assert_eq!(token::decode(&token, &random), Err(TokenError::AuthenticationFailed));
}

#[test]
fn test_garbage_is_malformed() {
    let key = key();
    for garbage in ["", "invalid.token.here", "v2.local.", "v2.local.!!!.e30", "v2.local.AAAA"] {
        assert!(
            matches!(token::decode(garbage, &key), Err(TokenError::Malformed(_))),
            "{:?} should be malformed",
            garbage
        );
    }
}

// ============================================================================
// Session issuer
// ============================================================================

#[test]
fn test_issuer_mints_decodable_tokens() {
    let issuer = SessionIssuer::new(Arc::new(key()));
    let token = issuer.issue_token(21, Role::Admin).unwrap();

    assert_eq!(token::decode(&token, &key()), Ok(Claims::new(21, Role::Admin)));
    assert!(bearer(&token).starts_with("Bearer v2.local."));
}

// ============================================================================
// Authorization gate
// ============================================================================

#[test]
fn test_gate_rejects_missing_header() {
    assert_eq!(authorize(&HeaderMap::new(), &key()), Err(AuthError::MissingToken));
}

#[test]
fn test_gate_rejects_wrong_field_counts_before_decoding() {
    let key = key();
    let token = token::encode(&Claims::new(1, Role::Customer), &key).unwrap();

    // A perfectly valid token is still refused when the header shape is wrong
    assert_eq!(authorize(&header(&token), &key), Err(AuthError::MalformedHeader));
    assert_eq!(
        authorize(&header(&format!("Bearer {} extra", token)), &key),
        Err(AuthError::MalformedHeader)
    );
}

#[test]
fn test_gate_collapses_decode_failures() {
    let key = key();
    let foreign = token::encode(&Claims::new(1, Role::Customer), &TokenKey::generate("v2-local-1")).unwrap();

    assert_eq!(authorize(&header("Bearer nope"), &key), Err(AuthError::InvalidToken));
    assert_eq!(
        authorize(&header(&bearer(&foreign)), &key),
        Err(AuthError::InvalidToken)
    );
}

#[test]
fn test_gate_admits_valid_token() {
    let key = key();
    let issuer = SessionIssuer::new(Arc::new(key.clone()));
    let token = issuer.issue_token(5, Role::Customer).unwrap();

    let claims = authorize(&header(&bearer(&token)), &key).expect("token should be admitted");
    assert_eq!(claims.subject_id, 5);
    assert_eq!(claims.role, Role::Customer);
}
