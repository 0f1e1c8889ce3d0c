//! Identity verifier trait

use async_trait::async_trait;

use super::subject::SubjectId;
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Turns an opaque bearer credential into a trusted subject identifier.
///
/// Implementations check signature, expiry and intended audience. Every
/// failure is reported as [`DomainError::Authentication`]; callers must not
/// branch on the message.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<SubjectId, DomainError>;
}
