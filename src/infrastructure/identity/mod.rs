//! Identity infrastructure module
//!
//! Verifies identity-provider ID tokens (Google Sign-In by default) against
//! the provider's published JWKS.

mod key_set;
mod remote;
mod verifier;

#[cfg(test)]
pub mod testing;

pub use key_set::{JwksKeySet, KeySetSource, StaticKeySet, VerificationKey};
pub use remote::{RemoteKeySet, DEFAULT_JWKS_CACHE_TTL, DEFAULT_MIN_REFRESH_INTERVAL};
pub use verifier::{
    IdTokenClaims, OidcTokenVerifier, VerifierConfig, GOOGLE_ISSUERS, GOOGLE_JWKS_URL,
};
