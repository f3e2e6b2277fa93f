//! Authentication: email domain gate, pluggable credential verification and
//! signed assertion issuance for the external site.

pub mod email;
mod jwt;
pub mod types;
pub mod verifier;

pub use email::EmailPolicy;
pub use jwt::AssertionIssuer;
pub use verifier::CredentialVerifier;
