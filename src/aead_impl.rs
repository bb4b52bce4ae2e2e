//! [`aead`] trait implementations with a 96-bit nonce and 128-bit tag.

use aead::consts::{U0, U12, U16};
use aead::{AeadCore, AeadInPlace, Key, KeyInit, KeySizeUser};
use aes::{Aes128, Aes192, Aes256};
use cipher::{BlockDecrypt, BlockEncrypt, BlockSizeUser};

use crate::config::Ocb3Config;
use crate::ocb3::Ocb3;

/// OCB3 behind the RustCrypto [`AeadInPlace`] interface.
#[derive(Clone)]
pub struct Ocb3Aead<C>(Ocb3<C>);

pub type Aes128Ocb3 = Ocb3Aead<Aes128>;
pub type Aes192Ocb3 = Ocb3Aead<Aes192>;
pub type Aes256Ocb3 = Ocb3Aead<Aes256>;

impl<C> Ocb3Aead<C> {
    /// The underlying context, for the slice-based API.
    pub fn inner(&self) -> &Ocb3<C> {
        &self.0
    }
}

impl<C: KeySizeUser> KeySizeUser for Ocb3Aead<C> {
    type KeySize = C::KeySize;
}

impl<C> AeadCore for Ocb3Aead<C> {
    type NonceSize = U12;
    type TagSize = U16;
    type CiphertextOverhead = U0;
}

impl<C> KeyInit for Ocb3Aead<C>
where
    C: KeyInit + BlockEncrypt + BlockDecrypt + BlockSizeUser<BlockSize = U16>,
{
    fn new(key: &Key<Self>) -> Self {
        // A 16-byte block and the default sizes are statically valid.
        Self(Ocb3::setup(C::new(key), Ocb3Config::default()))
    }
}

impl<C> AeadInPlace for Ocb3Aead<C>
where
    C: BlockEncrypt + BlockDecrypt,
{
    fn encrypt_in_place_detached(
        &self,
        nonce: &aead::Nonce<Self>,
        associated_data: &[u8],
        buffer: &mut [u8],
    ) -> aead::Result<aead::Tag<Self>> {
        let tag = self
            .0
            .seal_in_place_detached(nonce.as_slice(), associated_data, buffer);
        Ok(aead::Tag::<Self>::clone_from_slice(tag.as_bytes()))
    }

    fn decrypt_in_place_detached(
        &self,
        nonce: &aead::Nonce<Self>,
        associated_data: &[u8],
        buffer: &mut [u8],
        tag: &aead::Tag<Self>,
    ) -> aead::Result<()> {
        self.0
            .open_in_place_detached(nonce.as_slice(), associated_data, buffer, tag.as_slice())
            .map_err(Into::into)
    }
}
