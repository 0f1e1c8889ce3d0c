//! Token fixtures for tests: an HS256 key set and helpers to mint ID tokens

use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};

use super::key_set::{JwksKeySet, StaticKeySet};
use super::verifier::{OidcTokenVerifier, VerifierConfig};

pub const TEST_SECRET: &[u8] = b"keyshelf-test-signing-secret-0123456789abcdef";
pub const TEST_KEY_ID: &str = "test-key";
pub const TEST_AUDIENCE: &str = "keyshelf-test.apps.googleusercontent.com";
pub const TEST_ISSUER: &str = "https://accounts.google.com";

pub fn hs256_jwks() -> Value {
    json!({
        "keys": [{
            "kty": "oct",
            "kid": TEST_KEY_ID,
            "alg": "HS256",
            "k": URL_SAFE_NO_PAD.encode(TEST_SECRET)
        }]
    })
}

pub fn hs256_key_set() -> JwksKeySet {
    JwksKeySet::from_json(&hs256_jwks().to_string()).unwrap()
}

pub fn test_verifier() -> OidcTokenVerifier {
    OidcTokenVerifier::new(
        Arc::new(StaticKeySet::new(hs256_key_set())),
        VerifierConfig::new(TEST_AUDIENCE),
    )
}

pub fn in_one_hour() -> i64 {
    (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp()
}

pub fn default_claims(sub: &str) -> Value {
    json!({
        "sub": sub,
        "aud": TEST_AUDIENCE,
        "iss": TEST_ISSUER,
        "iat": chrono::Utc::now().timestamp(),
        "exp": in_one_hour(),
    })
}

pub fn mint_token_with(claims: Value) -> String {
    let mut header = Header::new(Algorithm::HS256);
    header.kid = Some(TEST_KEY_ID.to_string());

    encode(&header, &claims, &EncodingKey::from_secret(TEST_SECRET)).unwrap()
}

pub fn mint_token(sub: &str) -> String {
    mint_token_with(default_claims(sub))
}
