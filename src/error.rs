//! Error types for OCB3 construction and decryption.

/// Errors returned by OCB3 operations.
///
/// Caller bugs such as a nonce of the wrong length are not represented here;
/// those panic at the call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("invalid nonce size {0}: must be between 1 and 15 bytes")]
    InvalidNonceSize(usize),

    #[error("invalid tag size {0}: must be between 12 and 16 bytes")]
    InvalidTagSize(usize),

    #[error("invalid cipher block size {0}: OCB3 requires a 16-byte block cipher")]
    InvalidBlockSize(usize),

    #[error("authentication failed: tag mismatch")]
    AuthenticationFailed,
}

pub type Result<T> = core::result::Result<T, Error>;

impl From<Error> for aead::Error {
    fn from(_: Error) -> Self {
        aead::Error
    }
}
