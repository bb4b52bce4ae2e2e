//! An implementation of the OCB3 authenticated encryption mode, specified in
//! [RFC 7253][1], generic over any 128-bit [`cipher`] block cipher.
//!
//! [`Ocb3`] takes the nonce and tag lengths at construction time and offers
//! appending (`seal_into`/`open_into`), allocating (`seal`/`open`) and
//! in-place detached operations. [`Aes128Ocb3`] and friends fix a 96-bit
//! nonce and 128-bit tag and implement the [`aead`] traits.
//!
//! ```
//! use aes::Aes128;
//! use cipher::KeyInit;
//! use ocb3_aead::Ocb3;
//!
//! let ocb = Ocb3::new(Aes128::new(&[0u8; 16].into())).unwrap();
//! let nonce = [0u8; 12];
//! let sealed = ocb.seal(&nonce, b"hello", b"header");
//! assert_eq!(ocb.open(&nonce, &sealed, b"header").unwrap(), b"hello");
//! ```
//!
//! A `(key, nonce)` pair must never be used to seal two different messages.
//!
//! [1]: https://datatracker.ietf.org/doc/rfc7253/

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod aead_impl;
pub mod config;
pub mod error;
pub mod ocb3;
pub mod uint128;

pub use aead::{self, AeadCore, AeadInPlace, KeyInit, KeySizeUser};

pub use crate::aead_impl::{Aes128Ocb3, Aes192Ocb3, Aes256Ocb3, Ocb3Aead};
pub use crate::config::{
    Ocb3Config, BLOCK_SIZE, DEFAULT_NONCE_SIZE, DEFAULT_TAG_SIZE, L_TABLE_SIZE, MAX_INPUT_SIZE,
    MAX_NONCE_SIZE, MAX_TAG_SIZE, MIN_TAG_SIZE,
};
pub use crate::error::{Error, Result};
pub use crate::ocb3::{Ocb3, Tag};
