//! # rt-auth
//!
//! Anonymous hash-based accounts for ResearchTools.
//!
//! An account is identified by a random 16-digit number that serves as both
//! username and password. Clients present it as `Authorization: Bearer
//! <hash>`; the server resolves it into an [`AccountIdentity`] per request
//! and passes that value explicitly to handlers.
//!
//! Full hashes must never be logged. Use [`mask_account_hash`] in tracing
//! fields.

pub mod account_hash;
pub mod bearer;
pub mod error;

pub use account_hash::{
    ACCOUNT_HASH_LEN, MAX_ACCOUNT_HASH, MIN_ACCOUNT_HASH, generate_account_hash,
    mask_account_hash, validate_account_hash,
};
pub use bearer::bearer_token;
pub use error::AuthError;
pub use rt_core::identity::AccountIdentity;
