//! OpenID Connect ID token verification

use std::sync::Arc;

use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use serde::Deserialize;
use tracing::debug;

use super::key_set::{KeySetSource, VerificationKey};
use crate::domain::{DomainError, IdentityVerifier, SubjectId};

/// Issuers used by Google Sign-In ID tokens
pub const GOOGLE_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];

/// Google's published signing keys
pub const GOOGLE_JWKS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";

/// Claims read from a verified ID token
#[derive(Debug, Clone, Deserialize)]
pub struct IdTokenClaims {
    /// Subject (stable provider user ID)
    pub sub: String,
}

/// What a token must satisfy besides a valid signature
#[derive(Debug, Clone)]
pub struct VerifierConfig {
    /// Expected `aud`: the client identifier issued by the provider
    pub audience: String,
    /// Accepted `iss` values; empty disables the issuer check
    pub issuers: Vec<String>,
    /// Clock skew tolerance for `exp`/`nbf`, in seconds
    pub leeway_secs: u64,
}

impl VerifierConfig {
    pub fn new(audience: impl Into<String>) -> Self {
        Self {
            audience: audience.into(),
            issuers: GOOGLE_ISSUERS.iter().map(|s| s.to_string()).collect(),
            leeway_secs: 60,
        }
    }

    pub fn with_issuers(mut self, issuers: Vec<String>) -> Self {
        self.issuers = issuers;
        self
    }

    pub fn with_leeway(mut self, secs: u64) -> Self {
        self.leeway_secs = secs;
        self
    }
}

/// Verifies provider-issued ID tokens against a JWKS key set
#[derive(Debug, Clone)]
pub struct OidcTokenVerifier {
    keys: Arc<dyn KeySetSource>,
    config: VerifierConfig,
}

impl OidcTokenVerifier {
    pub fn new(keys: Arc<dyn KeySetSource>, config: VerifierConfig) -> Self {
        Self { keys, config }
    }

    /// Look up the signing key, reloading the set once for an unknown `kid`
    async fn key_for(&self, kid: Option<&str>) -> Result<VerificationKey, DomainError> {
        if let Some(key) = self.keys.current().await?.find(kid) {
            return Ok(key.clone());
        }

        debug!(kid = ?kid, "Signing key not in cached set, refreshing");

        self.keys
            .refresh()
            .await?
            .find(kid)
            .cloned()
            .ok_or_else(|| DomainError::authentication("No signing key matches token"))
    }

    fn validation(&self, algorithm: Algorithm) -> Validation {
        let mut validation = Validation::new(algorithm);
        validation.leeway = self.config.leeway_secs;
        validation.set_audience(&[self.config.audience.as_str()]);

        if self.config.issuers.is_empty() {
            validation.set_required_spec_claims(&["exp", "sub", "aud"]);
        } else {
            validation.set_issuer(self.config.issuers.as_slice());
            validation.set_required_spec_claims(&["exp", "sub", "aud", "iss"]);
        }

        validation
    }

    async fn verify_claims(&self, token: &str) -> Result<IdTokenClaims, DomainError> {
        let header = decode_header(token)
            .map_err(|e| DomainError::authentication(format!("Malformed token: {}", e)))?;

        let key = self.key_for(header.kid.as_deref()).await?;

        if !key.permits(header.alg) {
            return Err(DomainError::authentication(format!(
                "Algorithm {:?} not permitted for signing key",
                header.alg
            )));
        }

        let validation = self.validation(header.alg);

        let data = decode::<IdTokenClaims>(token, &key.key, &validation)
            .map_err(|e| DomainError::authentication(format!("Invalid token: {}", e)))?;

        Ok(data.claims)
    }
}

#[async_trait]
impl IdentityVerifier for OidcTokenVerifier {
    async fn verify(&self, token: &str) -> Result<SubjectId, DomainError> {
        let claims = self.verify_claims(token).await.map_err(|e| match e {
            DomainError::Authentication { .. } => e,
            other => DomainError::authentication(other.to_string()),
        })?;

        SubjectId::new(claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::identity::key_set::StaticKeySet;
    use crate::infrastructure::identity::testing::{self, TEST_AUDIENCE, TEST_ISSUER, TEST_KEY_ID};
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    #[tokio::test]
    async fn test_valid_token_yields_subject() {
        let verifier = testing::test_verifier();
        let token = testing::mint_token("user-a");

        let subject = verifier.verify(&token).await.unwrap();
        assert_eq!(subject.as_str(), "user-a");
    }

    #[tokio::test]
    async fn test_subject_is_stable_across_tokens() {
        let verifier = testing::test_verifier();

        let first = verifier.verify(&testing::mint_token("user-a")).await.unwrap();
        let second = verifier.verify(&testing::mint_token("user-a")).await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_garbage_token_rejected() {
        let verifier = testing::test_verifier();

        let result = verifier.verify("not-a-jwt").await;
        assert!(matches!(result, Err(DomainError::Authentication { .. })));
    }

    #[tokio::test]
    async fn test_wrong_audience_rejected() {
        let verifier = testing::test_verifier();
        let token = testing::mint_token_with(json!({
            "sub": "user-a",
            "aud": "someone-else.apps.googleusercontent.com",
            "iss": TEST_ISSUER,
            "exp": testing::in_one_hour(),
        }));

        assert!(verifier.verify(&token).await.is_err());
    }

    #[tokio::test]
    async fn test_wrong_issuer_rejected() {
        let verifier = testing::test_verifier();
        let token = testing::mint_token_with(json!({
            "sub": "user-a",
            "aud": TEST_AUDIENCE,
            "iss": "https://evil.example.com",
            "exp": testing::in_one_hour(),
        }));

        assert!(verifier.verify(&token).await.is_err());
    }

    #[tokio::test]
    async fn test_expired_token_rejected() {
        let verifier = testing::test_verifier();
        let past = chrono::Utc::now() - chrono::Duration::hours(1);
        let token = testing::mint_token_with(json!({
            "sub": "user-a",
            "aud": TEST_AUDIENCE,
            "iss": TEST_ISSUER,
            "exp": past.timestamp(),
        }));

        assert!(verifier.verify(&token).await.is_err());
    }

    #[tokio::test]
    async fn test_missing_sub_rejected() {
        let verifier = testing::test_verifier();
        let token = testing::mint_token_with(json!({
            "aud": TEST_AUDIENCE,
            "iss": TEST_ISSUER,
            "exp": testing::in_one_hour(),
        }));

        assert!(verifier.verify(&token).await.is_err());
    }

    #[tokio::test]
    async fn test_empty_sub_rejected() {
        let verifier = testing::test_verifier();
        let token = testing::mint_token_with(json!({
            "sub": "",
            "aud": TEST_AUDIENCE,
            "iss": TEST_ISSUER,
            "exp": testing::in_one_hour(),
        }));

        assert!(verifier.verify(&token).await.is_err());
    }

    #[tokio::test]
    async fn test_wrong_signing_secret_rejected() {
        let verifier = testing::test_verifier();

        let mut header = Header::new(Algorithm::HS256);
        header.kid = Some(TEST_KEY_ID.to_string());
        let token = encode(
            &header,
            &testing::default_claims("user-a"),
            &EncodingKey::from_secret(b"a-completely-different-secret-value"),
        )
        .unwrap();

        assert!(verifier.verify(&token).await.is_err());
    }

    #[tokio::test]
    async fn test_unknown_kid_rejected() {
        let verifier = testing::test_verifier();

        let mut header = Header::new(Algorithm::HS256);
        header.kid = Some("rotated-away".to_string());
        let token = encode(
            &header,
            &testing::default_claims("user-a"),
            &EncodingKey::from_secret(testing::TEST_SECRET),
        )
        .unwrap();

        assert!(verifier.verify(&token).await.is_err());
    }

    #[tokio::test]
    async fn test_issuer_check_can_be_disabled() {
        let keys = Arc::new(StaticKeySet::new(testing::hs256_key_set()));
        let verifier =
            OidcTokenVerifier::new(keys, VerifierConfig::new(TEST_AUDIENCE).with_issuers(vec![]));
        let token = testing::mint_token_with(json!({
            "sub": "user-a",
            "aud": TEST_AUDIENCE,
            "exp": testing::in_one_hour(),
        }));

        assert_eq!(verifier.verify(&token).await.unwrap().as_str(), "user-a");
    }

    fn rsa_jwks(private_key: &rsa::RsaPrivateKey) -> String {
        use rsa::traits::PublicKeyParts;

        let n = URL_SAFE_NO_PAD.encode(private_key.n().to_bytes_be());
        let e = URL_SAFE_NO_PAD.encode(private_key.e().to_bytes_be());

        json!({
            "keys": [{
                "kty": "RSA",
                "kid": "google-rsa-key",
                "alg": "RS256",
                "use": "sig",
                "n": n,
                "e": e
            }]
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_rs256_token_and_algorithm_confusion() {
        use rand::rngs::OsRng;
        use rsa::pkcs1::EncodeRsaPrivateKey;

        let private_key = rsa::RsaPrivateKey::new(&mut OsRng, 2048).unwrap();
        let keys = Arc::new(StaticKeySet::from_json(&rsa_jwks(&private_key)).unwrap());
        let verifier = OidcTokenVerifier::new(keys, VerifierConfig::new(TEST_AUDIENCE));

        let pem = private_key
            .to_pkcs1_pem(rsa::pkcs1::LineEnding::LF)
            .unwrap();
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some("google-rsa-key".to_string());
        let token = encode(
            &header,
            &testing::default_claims("110169484474386276334"),
            &EncodingKey::from_rsa_pem(pem.as_bytes()).unwrap(),
        )
        .unwrap();

        let subject = verifier.verify(&token).await.unwrap();
        assert_eq!(subject.as_str(), "110169484474386276334");

        // HS256 token naming the RSA key must not be accepted
        let mut forged_header = Header::new(Algorithm::HS256);
        forged_header.kid = Some("google-rsa-key".to_string());
        let forged = encode(
            &forged_header,
            &testing::default_claims("attacker"),
            &EncodingKey::from_secret(b"public-modulus-bytes"),
        )
        .unwrap();

        assert!(verifier.verify(&forged).await.is_err());
    }
}
