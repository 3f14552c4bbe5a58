use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing Authorization header")]
    MissingCredentials,

    #[error("Authorization header must use the Bearer scheme")]
    InvalidScheme,

    #[error("account hash must be exactly 16 digits")]
    InvalidAccountHash,

    #[error("account is deactivated")]
    AccountInactive,

    #[error("failed to read OS randomness: {0}")]
    Randomness(String),
}
