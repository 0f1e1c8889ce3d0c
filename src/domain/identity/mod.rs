//! Identity domain
//!
//! The subject identifier and the seam used to verify provider tokens.

mod subject;
mod verifier;

pub use subject::SubjectId;
pub use verifier::IdentityVerifier;

#[cfg(test)]
pub use verifier::MockIdentityVerifier;
