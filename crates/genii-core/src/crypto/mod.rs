//! Attestation digests and secret management
//!
//! An attestation token binds three things: the canonical payload bytes, the
//! process secret for the entry's key version, and the identity of the party
//! attesting. Changing any one of them changes the token.

pub mod attestation;
pub mod hash;
pub mod keys;

pub use attestation::{sign, AttestationToken, TOKEN_HEX_LEN};
pub use keys::{KeyRing, LedgerSecret};
