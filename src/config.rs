//! Construction parameters and size limits.

use crate::error::{Error, Result};

/// OCB3 is defined over 128-bit block ciphers only.
pub const BLOCK_SIZE: usize = 16;

pub const DEFAULT_NONCE_SIZE: usize = 12;
pub const MAX_NONCE_SIZE: usize = 15;

pub const DEFAULT_TAG_SIZE: usize = 16;
pub const MIN_TAG_SIZE: usize = 12;
pub const MAX_TAG_SIZE: usize = 16;

/// Number of precomputed L values. A message of `m` blocks needs
/// `L[ntz(i)]` for every `i <= m`, so 33 entries cover `2^32` blocks.
pub const L_TABLE_SIZE: usize = 33;

/// Largest accepted `plaintext + associated data` length in bytes (64 GiB).
///
/// Independent of the target's pointer width.
pub const MAX_INPUT_SIZE: u64 = 1 << (L_TABLE_SIZE - 1 + 4);

/// Nonce and tag lengths for an [`Ocb3`](crate::Ocb3) context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ocb3Config {
    pub nonce_size: usize,
    pub tag_size: usize,
}

impl Default for Ocb3Config {
    fn default() -> Self {
        Self {
            nonce_size: DEFAULT_NONCE_SIZE,
            tag_size: DEFAULT_TAG_SIZE,
        }
    }
}

impl Ocb3Config {
    pub fn with_nonce_size(mut self, nonce_size: usize) -> Self {
        self.nonce_size = nonce_size;
        self
    }

    pub fn with_tag_size(mut self, tag_size: usize) -> Self {
        self.tag_size = tag_size;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.nonce_size == 0 || self.nonce_size > MAX_NONCE_SIZE {
            return Err(Error::InvalidNonceSize(self.nonce_size));
        }
        if !(MIN_TAG_SIZE..=MAX_TAG_SIZE).contains(&self.tag_size) {
            return Err(Error::InvalidTagSize(self.tag_size));
        }
        Ok(())
    }
}
