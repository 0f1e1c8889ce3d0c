//! JWKS parsing and key set sources

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use jsonwebtoken::jwk::{AlgorithmParameters, EllipticCurve, Jwk, JwkSet, KeyAlgorithm};
use jsonwebtoken::{Algorithm, DecodingKey};
use tracing::warn;

use crate::domain::DomainError;

/// A decoding key together with the algorithms it may verify
#[derive(Clone)]
pub struct VerificationKey {
    pub key_id: Option<String>,
    pub key: DecodingKey,
    pub algorithms: Vec<Algorithm>,
}

impl VerificationKey {
    pub fn permits(&self, algorithm: Algorithm) -> bool {
        self.algorithms.contains(&algorithm)
    }
}

impl Debug for VerificationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationKey")
            .field("key_id", &self.key_id)
            .field("key", &"[hidden]")
            .field("algorithms", &self.algorithms)
            .finish()
    }
}

/// Verification keys parsed from a JWKS document
#[derive(Debug, Clone, Default)]
pub struct JwksKeySet {
    keys: Vec<VerificationKey>,
}

impl JwksKeySet {
    /// Parse a JWKS JSON document
    pub fn from_json(jwks_json: &str) -> Result<Self, DomainError> {
        let set: JwkSet = serde_json::from_str(jwks_json)
            .map_err(|e| DomainError::configuration(format!("Failed to parse JWKS: {}", e)))?;

        Self::from_jwk_set(&set)
    }

    /// Convert a JWK set, skipping keys that cannot be used for verification
    pub fn from_jwk_set(set: &JwkSet) -> Result<Self, DomainError> {
        let mut keys = Vec::with_capacity(set.keys.len());

        for jwk in &set.keys {
            match verification_key(jwk) {
                Ok(key) => keys.push(key),
                Err(e) => warn!(kid = ?jwk.common.key_id, error = %e, "Skipping unusable JWK"),
            }
        }

        let key_set = Self { keys };
        if key_set.is_empty() {
            return Err(DomainError::configuration("JWKS contains no usable keys"));
        }

        Ok(key_set)
    }

    /// Find the key for a token's `kid`.
    ///
    /// A token without `kid` only matches when the set holds exactly one key.
    pub fn find(&self, kid: Option<&str>) -> Option<&VerificationKey> {
        match kid {
            Some(kid) => self.keys.iter().find(|k| k.key_id.as_deref() == Some(kid)),
            None if self.keys.len() == 1 => self.keys.first(),
            None => None,
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

fn verification_key(jwk: &Jwk) -> Result<VerificationKey, DomainError> {
    let algorithms = permitted_algorithms(jwk);

    if algorithms.is_empty() {
        return Err(DomainError::configuration("JWK has no supported signing algorithm"));
    }

    let key = DecodingKey::from_jwk(jwk)
        .map_err(|e| DomainError::configuration(format!("Invalid JWK: {}", e)))?;

    Ok(VerificationKey {
        key_id: jwk.common.key_id.clone(),
        key,
        algorithms,
    })
}

/// Algorithms a JWK may verify: its declared `alg`, or every algorithm of its key family
fn permitted_algorithms(jwk: &Jwk) -> Vec<Algorithm> {
    if let Some(alg) = jwk.common.key_algorithm.as_ref() {
        return signing_algorithm(alg).into_iter().collect();
    }

    match &jwk.algorithm {
        AlgorithmParameters::RSA(_) => vec![
            Algorithm::RS256,
            Algorithm::RS384,
            Algorithm::RS512,
            Algorithm::PS256,
            Algorithm::PS384,
            Algorithm::PS512,
        ],
        AlgorithmParameters::EllipticCurve(params) => match params.curve {
            EllipticCurve::P256 => vec![Algorithm::ES256],
            EllipticCurve::P384 => vec![Algorithm::ES384],
            _ => Vec::new(),
        },
        AlgorithmParameters::OctetKey(_) => {
            vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512]
        }
        AlgorithmParameters::OctetKeyPair(_) => vec![Algorithm::EdDSA],
    }
}

fn signing_algorithm(alg: &KeyAlgorithm) -> Option<Algorithm> {
    match alg {
        KeyAlgorithm::HS256 => Some(Algorithm::HS256),
        KeyAlgorithm::HS384 => Some(Algorithm::HS384),
        KeyAlgorithm::HS512 => Some(Algorithm::HS512),
        KeyAlgorithm::ES256 => Some(Algorithm::ES256),
        KeyAlgorithm::ES384 => Some(Algorithm::ES384),
        KeyAlgorithm::RS256 => Some(Algorithm::RS256),
        KeyAlgorithm::RS384 => Some(Algorithm::RS384),
        KeyAlgorithm::RS512 => Some(Algorithm::RS512),
        KeyAlgorithm::PS256 => Some(Algorithm::PS256),
        KeyAlgorithm::PS384 => Some(Algorithm::PS384),
        KeyAlgorithm::PS512 => Some(Algorithm::PS512),
        KeyAlgorithm::EdDSA => Some(Algorithm::EdDSA),
        _ => None,
    }
}

/// Where the verifier gets its signing keys
#[async_trait]
pub trait KeySetSource: Send + Sync + Debug {
    /// The current key set, possibly cached
    async fn current(&self) -> Result<Arc<JwksKeySet>, DomainError>;

    /// Reload the key set, used when a token names an unknown `kid`
    async fn refresh(&self) -> Result<Arc<JwksKeySet>, DomainError>;
}

/// Fixed key set loaded once from configuration
#[derive(Debug, Clone)]
pub struct StaticKeySet {
    keys: Arc<JwksKeySet>,
}

impl StaticKeySet {
    pub fn new(keys: JwksKeySet) -> Self {
        Self {
            keys: Arc::new(keys),
        }
    }

    pub fn from_json(jwks_json: &str) -> Result<Self, DomainError> {
        Ok(Self::new(JwksKeySet::from_json(jwks_json)?))
    }
}

#[async_trait]
impl KeySetSource for StaticKeySet {
    async fn current(&self) -> Result<Arc<JwksKeySet>, DomainError> {
        Ok(self.keys.clone())
    }

    async fn refresh(&self) -> Result<Arc<JwksKeySet>, DomainError> {
        Ok(self.keys.clone())
    }
}
