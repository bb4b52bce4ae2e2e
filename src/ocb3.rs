//! OCB3, specified in [RFC 7253][1], over any 128-bit block cipher with a
//! configurable nonce length (1 to 15 bytes) and tag length (12 to 16 bytes).
//!
//! [1]: https://datatracker.ietf.org/doc/rfc7253/

use alloc::vec::Vec;

use cipher::{Block, BlockDecrypt, BlockEncrypt};
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::config::{Ocb3Config, BLOCK_SIZE, L_TABLE_SIZE, MAX_INPUT_SIZE, MAX_TAG_SIZE};
use crate::error::{Error, Result};
use crate::uint128::{ntz, Uint128};

/// An OCB3 context bound to one block cipher key.
///
/// The key-dependent values are computed once in the constructor and never
/// written again. Offsets, checksums and scratch blocks are local to each
/// call, so a context can be shared between threads whenever `C` can.
#[derive(Clone)]
pub struct Ocb3<C> {
    cipher: C,
    nonce_size: usize,
    tag_size: usize,
    // precomputed key-dependent variables
    l_star: Uint128,
    l_dollar: Uint128,
    // L_0, L_1, ... with L_i = double(L_{i-1})
    l: [Uint128; L_TABLE_SIZE],
}

/// A tag truncated to the context's tag size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tag {
    bytes: [u8; MAX_TAG_SIZE],
    len: usize,
}

impl Tag {
    fn truncate(full: Uint128, len: usize) -> Self {
        Self {
            bytes: full.to_be_bytes(),
            len,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

impl AsRef<[u8]> for Tag {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl<C> Ocb3<C>
where
    C: BlockEncrypt + BlockDecrypt,
{
    /// Creates a context with a 12-byte nonce and a 16-byte tag.
    pub fn new(cipher: C) -> Result<Self> {
        Self::with_config(cipher, Ocb3Config::default())
    }

    /// Creates a context with explicit nonce and tag lengths.
    pub fn with_config(cipher: C, config: Ocb3Config) -> Result<Self> {
        if C::block_size() != BLOCK_SIZE {
            log::debug!(
                "ocb3: rejecting block cipher with {}-byte blocks",
                C::block_size()
            );
            return Err(Error::InvalidBlockSize(C::block_size()));
        }
        if let Err(err) = config.validate() {
            log::debug!("ocb3: rejecting configuration {:?}: {}", config, err);
            return Err(err);
        }
        Ok(Self::setup(cipher, config))
    }

    /// Computes the key-dependent variables defined in
    /// https://www.rfc-editor.org/rfc/rfc7253.html#section-4.1
    ///
    /// `config` must already be valid and `C` must have 16-byte blocks.
    pub(crate) fn setup(cipher: C, config: Ocb3Config) -> Self {
        let mut ctx = Self {
            cipher,
            nonce_size: config.nonce_size,
            tag_size: config.tag_size,
            l_star: Uint128::ZERO,
            l_dollar: Uint128::ZERO,
            l: [Uint128::ZERO; L_TABLE_SIZE],
        };

        // L_* = ENCIPHER(K, zeros(128))
        ctx.l_star = ctx.encipher(Uint128::ZERO);
        // L_$ = double(L_*)
        ctx.l_dollar = ctx.l_star.double();
        // L_0 = double(L_$), L_i = double(L_{i-1})
        let mut l_i = ctx.l_dollar;
        for slot in ctx.l.iter_mut() {
            l_i = l_i.double();
            *slot = l_i;
        }

        log::debug!(
            "ocb3: context ready (nonce_size={}, tag_size={})",
            ctx.nonce_size,
            ctx.tag_size
        );
        ctx
    }

    pub fn nonce_size(&self) -> usize {
        self.nonce_size
    }

    pub fn tag_size(&self) -> usize {
        self.tag_size
    }

    /// Number of bytes a sealed message grows by.
    ///
    /// Only the tag is counted; the nonce travels separately.
    pub fn overhead(&self) -> usize {
        self.tag_size
    }

    /// Encrypts `plaintext` and appends `ciphertext || tag` to `dst`.
    ///
    /// # Panics
    ///
    /// If `nonce` is not [`nonce_size`](Self::nonce_size) bytes long, or if
    /// `plaintext` and `associated_data` together exceed
    /// [`MAX_INPUT_SIZE`](crate::MAX_INPUT_SIZE).
    pub fn seal_into(
        &self,
        dst: &mut Vec<u8>,
        nonce: &[u8],
        plaintext: &[u8],
        associated_data: &[u8],
    ) {
        let start = dst.len();
        dst.reserve(plaintext.len() + self.tag_size);
        dst.extend_from_slice(plaintext);
        let tag = self.seal_in_place_detached(nonce, associated_data, &mut dst[start..]);
        dst.extend_from_slice(tag.as_bytes());
    }

    /// Encrypts `plaintext` into a new `ciphertext || tag` buffer.
    pub fn seal(&self, nonce: &[u8], plaintext: &[u8], associated_data: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(plaintext.len() + self.tag_size);
        self.seal_into(&mut out, nonce, plaintext, associated_data);
        out
    }

    /// Verifies `ciphertext || tag` and appends the plaintext to `dst`.
    ///
    /// On failure `dst` is left exactly as it was passed in; any bytes
    /// decrypted along the way are zeroized before being discarded.
    ///
    /// # Panics
    ///
    /// Under the same conditions as [`seal_into`](Self::seal_into).
    pub fn open_into(
        &self,
        dst: &mut Vec<u8>,
        nonce: &[u8],
        ciphertext: &[u8],
        associated_data: &[u8],
    ) -> Result<()> {
        self.check_nonce(nonce);
        if ciphertext.len() < self.tag_size {
            log::debug!("ocb3: ciphertext shorter than the tag");
            return Err(Error::AuthenticationFailed);
        }
        let (ciphertext, tag) = ciphertext.split_at(ciphertext.len() - self.tag_size);

        let start = dst.len();
        dst.extend_from_slice(ciphertext);
        let res = self.open_in_place_detached(nonce, associated_data, &mut dst[start..], tag);
        if res.is_err() {
            // already zeroized by open_in_place_detached
            dst.truncate(start);
        }
        res
    }

    /// Verifies `ciphertext || tag` and returns the plaintext.
    pub fn open(&self, nonce: &[u8], ciphertext: &[u8], associated_data: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(ciphertext.len().saturating_sub(self.tag_size));
        self.open_into(&mut out, nonce, ciphertext, associated_data)?;
        Ok(out)
    }

    /// Encrypts `buffer` in place and returns the truncated tag.
    ///
    /// # Panics
    ///
    /// Under the same conditions as [`seal_into`](Self::seal_into).
    pub fn seal_in_place_detached(
        &self,
        nonce: &[u8],
        associated_data: &[u8],
        buffer: &mut [u8],
    ) -> Tag {
        self.check_nonce(nonce);
        check_input_size(buffer.len(), associated_data.len());

        let mut offset_i = self.initial_offset(nonce);
        let mut checksum_i = Uint128::ZERO;

        let mut blocks = buffer.chunks_exact_mut(BLOCK_SIZE);
        for (i, block) in (1u64..).zip(&mut blocks) {
            let p_i = Uint128::from_be_slice(block);
            // Offset_i = Offset_{i-1} xor L_{ntz(i)}
            offset_i ^= self.l_for(i);
            // C_i = Offset_i xor ENCIPHER(K, P_i xor Offset_i)
            let c_i = self.encipher(p_i ^ offset_i) ^ offset_i;
            c_i.write_be(block);
            // Checksum_i = Checksum_{i-1} xor P_i
            checksum_i ^= p_i;
        }

        // Process any partial block.
        let p_star = blocks.into_remainder();
        if !p_star.is_empty() {
            // Offset_* = Offset_m xor L_*
            offset_i ^= self.l_star;
            // Pad = ENCIPHER(K, Offset_*)
            let pad = self.encipher(offset_i).to_be_bytes();
            // Checksum_* = Checksum_m xor (P_* || 1 || zeros(127-bitlen(P_*)))
            checksum_i ^= Uint128::from_padded(p_star);
            // C_* = P_* xor Pad[1..bitlen(P_*)]
            for (byte, pad) in p_star.iter_mut().zip(pad.iter()) {
                *byte ^= *pad;
            }
        }

        let tag = self.compute_tag(associated_data, checksum_i, offset_i);
        Tag::truncate(tag, self.tag_size)
    }

    /// Decrypts `buffer` in place and checks it against `tag`.
    ///
    /// If the tag does not match, `buffer` is overwritten with zeros and
    /// [`Error::AuthenticationFailed`] is returned. The comparison runs in
    /// constant time.
    ///
    /// # Panics
    ///
    /// Under the same conditions as [`seal_into`](Self::seal_into).
    pub fn open_in_place_detached(
        &self,
        nonce: &[u8],
        associated_data: &[u8],
        buffer: &mut [u8],
        tag: &[u8],
    ) -> Result<()> {
        let expected_tag = self.decrypt_in_place_return_tag(nonce, associated_data, buffer);
        if expected_tag.as_bytes().ct_eq(tag).into() {
            Ok(())
        } else {
            buffer.zeroize();
            log::debug!("ocb3: authentication failed, output zeroized");
            Err(Error::AuthenticationFailed)
        }
    }

    /// Decrypts in place and returns expected tag.
    fn decrypt_in_place_return_tag(
        &self,
        nonce: &[u8],
        associated_data: &[u8],
        buffer: &mut [u8],
    ) -> Tag {
        self.check_nonce(nonce);
        check_input_size(buffer.len(), associated_data.len());

        let mut offset_i = self.initial_offset(nonce);
        let mut checksum_i = Uint128::ZERO;

        let mut blocks = buffer.chunks_exact_mut(BLOCK_SIZE);
        for (i, block) in (1u64..).zip(&mut blocks) {
            let c_i = Uint128::from_be_slice(block);
            // Offset_i = Offset_{i-1} xor L_{ntz(i)}
            offset_i ^= self.l_for(i);
            // P_i = Offset_i xor DECIPHER(K, C_i xor Offset_i)
            let p_i = self.decipher(c_i ^ offset_i) ^ offset_i;
            p_i.write_be(block);
            // Checksum_i = Checksum_{i-1} xor P_i
            checksum_i ^= p_i;
        }

        // Process any partial block.
        let c_star = blocks.into_remainder();
        if !c_star.is_empty() {
            // Offset_* = Offset_m xor L_*
            offset_i ^= self.l_star;
            // Pad = ENCIPHER(K, Offset_*)
            let pad = self.encipher(offset_i).to_be_bytes();
            // P_* = C_* xor Pad[1..bitlen(C_*)]
            for (byte, pad) in c_star.iter_mut().zip(pad.iter()) {
                *byte ^= *pad;
            }
            // Checksum_* = Checksum_m xor (P_* || 1 || zeros(127-bitlen(P_*)))
            checksum_i ^= Uint128::from_padded(c_star);
        }

        let tag = self.compute_tag(associated_data, checksum_i, offset_i);
        Tag::truncate(tag, self.tag_size)
    }

    /// Computes the initial offset as defined
    /// in https://www.rfc-editor.org/rfc/rfc7253.html#section-4.2
    fn initial_offset(&self, nonce: &[u8]) -> Uint128 {
        let (bottom, ktop) = self.nonce_dependent_variables(nonce);
        // Stretch = Ktop || (Ktop[1..64] xor Ktop[9..72])
        let stretch_tail = ktop.hi ^ ((ktop.hi << 8) | (ktop.lo >> 56));

        // Offset_0 = Stretch[1+bottom..128+bottom]
        if bottom == 0 {
            ktop
        } else {
            (ktop << bottom) ^ Uint128::new(0, stretch_tail >> (64 - bottom))
        }
    }

    /// Returns `bottom` and `Ktop = ENCIPHER(K, Nonce[1..122] || zeros(6))`.
    fn nonce_dependent_variables(&self, nonce: &[u8]) -> (u32, Uint128) {
        // Nonce = num2str(TAGLEN mod 128,7) || zeros(120-bitlen(N)) || 1 || N
        let mut block = [0u8; BLOCK_SIZE];
        block[0] = (((self.tag_size * 8) % 128) << 1) as u8;
        block[BLOCK_SIZE - 1 - nonce.len()] |= 1;
        block[BLOCK_SIZE - nonce.len()..].copy_from_slice(nonce);
        let nonce_block = Uint128::from_be_bytes(block);

        // Separate the last 6 bits into `bottom`, and the rest into `top`.
        let bottom = (nonce_block.lo & 0b11_1111) as u32;
        let top = Uint128::new(nonce_block.hi, nonce_block.lo & !0b11_1111);

        (bottom, self.encipher(top))
    }

    /// Computes HASH function defined in https://www.rfc-editor.org/rfc/rfc7253.html#section-4.1
    fn hash(&self, associated_data: &[u8]) -> Uint128 {
        let mut offset_i = Uint128::ZERO;
        let mut sum_i = Uint128::ZERO;

        let mut blocks = associated_data.chunks_exact(BLOCK_SIZE);
        for (i, a_i) in (1u64..).zip(&mut blocks) {
            // Offset_i = Offset_{i-1} xor L_{ntz(i)}
            offset_i ^= self.l_for(i);
            // Sum_i = Sum_{i-1} xor ENCIPHER(K, A_i xor Offset_i)
            sum_i ^= self.encipher(Uint128::from_be_slice(a_i) ^ offset_i);
        }

        // Process any partial block. Empty associated data never gets here.
        let a_star = blocks.remainder();
        if !a_star.is_empty() {
            // Offset_* = Offset_m xor L_*
            offset_i ^= self.l_star;
            // CipherInput = (A_* || 1 || zeros(127-bitlen(A_*))) xor Offset_*
            let cipher_input = Uint128::from_padded(a_star) ^ offset_i;
            // Sum = Sum_m xor ENCIPHER(K, CipherInput)
            sum_i ^= self.encipher(cipher_input);
        }

        sum_i
    }

    fn compute_tag(&self, associated_data: &[u8], checksum_m: Uint128, offset_m: Uint128) -> Uint128 {
        // Tag = ENCIPHER(K, Checksum_m xor Offset_m xor L_$) xor HASH(K,A)
        self.encipher(checksum_m ^ offset_m ^ self.l_dollar) ^ self.hash(associated_data)
    }

    #[inline]
    fn l_for(&self, i: u64) -> Uint128 {
        self.l[ntz(i) % L_TABLE_SIZE]
    }

    fn encipher(&self, input: Uint128) -> Uint128 {
        let mut bytes = input.to_be_bytes();
        self.cipher
            .encrypt_block(Block::<C>::from_mut_slice(&mut bytes));
        Uint128::from_be_bytes(bytes)
    }

    fn decipher(&self, input: Uint128) -> Uint128 {
        let mut bytes = input.to_be_bytes();
        self.cipher
            .decrypt_block(Block::<C>::from_mut_slice(&mut bytes));
        Uint128::from_be_bytes(bytes)
    }

    fn check_nonce(&self, nonce: &[u8]) {
        assert_eq!(
            nonce.len(),
            self.nonce_size,
            "ocb3: incorrect nonce length given to OCB"
        );
    }
}

fn check_input_size(data_len: usize, associated_data_len: usize) {
    let total = (data_len as u64).saturating_add(associated_data_len as u64);
    assert!(total <= MAX_INPUT_SIZE, "ocb3: input too large for OCB");
}

impl<C> Drop for Ocb3<C> {
    fn drop(&mut self) {
        self.l_star.zeroize();
        self.l_dollar.zeroize();
        self.l.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aes::Aes128;
    use cipher::KeyInit;
    use hex_literal::hex;

    fn rfc_sample_cipher() -> Aes128 {
        Aes128::new(&hex!("000102030405060708090A0B0C0D0E0F").into())
    }

    #[test]
    fn rfc7253_key_dependent_constants() {
        // Test vector from page 17 of https://www.rfc-editor.org/rfc/rfc7253.html
        let expected_l_star = hex!("C6A13B37878F5B826F4F8162A1C8D879");
        let expected_l_dollar = hex!("8D42766F0F1EB704DE9F02C54391B075");
        let expected_l0 = hex!("1A84ECDE1E3D6E09BD3E058A8723606D");
        let expected_l1 = hex!("3509D9BC3C7ADC137A7C0B150E46C0DA");

        let ctx = Ocb3::new(rfc_sample_cipher()).unwrap();

        assert_eq!(ctx.l_star.to_be_bytes(), expected_l_star);
        assert_eq!(ctx.l_dollar.to_be_bytes(), expected_l_dollar);
        assert_eq!(ctx.l[0].to_be_bytes(), expected_l0);
        assert_eq!(ctx.l[1].to_be_bytes(), expected_l1);
        for i in 1..L_TABLE_SIZE {
            assert_eq!(ctx.l[i], ctx.l[i - 1].double());
        }
    }

    #[test]
    fn rfc7253_nonce_dependent_constants() {
        // Test vector from page 17 of https://www.rfc-editor.org/rfc/rfc7253.html
        let nonce = hex!("BBAA9988776655443322110F");
        let expected_bottom = 15;
        let expected_stretch = hex!("9862B0FDEE4E2DD56DBA6433F0125AA2FAD24D13A063F8B8");
        let expected_offset_0 = hex!("587EF72716EAB6DD3219F8092D517D69");

        let ctx = Ocb3::new(rfc_sample_cipher()).unwrap();
        let (bottom, ktop) = ctx.nonce_dependent_variables(&nonce);
        let stretch_tail = ktop.hi ^ ((ktop.hi << 8) | (ktop.lo >> 56));

        assert_eq!(bottom, expected_bottom);
        assert_eq!(ktop.to_be_bytes(), expected_stretch[..16]);
        assert_eq!(stretch_tail.to_be_bytes(), expected_stretch[16..]);
        assert_eq!(ctx.initial_offset(&nonce).to_be_bytes(), expected_offset_0);
    }

    #[test]
    fn nonce_block_encodes_tag_length() {
        // TAGLEN = 96 puts 0b1100000 in the top seven bits.
        let ctx = Ocb3::with_config(rfc_sample_cipher(), Ocb3Config::default().with_tag_size(12))
            .unwrap();
        let nonce = hex!("BBAA99887766554433221100");
        let (bottom, ktop) = ctx.nonce_dependent_variables(&nonce);
        assert_eq!(bottom, 0);
        let mut expected_top = hex!("C0000001BBAA99887766554433221100");
        expected_top[15] &= 0b1100_0000;
        assert_eq!(ktop, ctx.encipher(Uint128::from_be_bytes(expected_top)));
    }

    #[test]
    fn empty_associated_data_hashes_to_zero() {
        let ctx = Ocb3::new(rfc_sample_cipher()).unwrap();
        assert_eq!(ctx.hash(&[]), Uint128::ZERO);
        assert_ne!(ctx.hash(&[0]), Uint128::ZERO);
    }

    #[test]
    fn rejects_bad_tag_size() {
        let config = Ocb3Config::default().with_tag_size(8);
        assert_eq!(
            Ocb3::with_config(rfc_sample_cipher(), config).err(),
            Some(Error::InvalidTagSize(8))
        );
    }

    #[test]
    fn rejects_bad_nonce_size() {
        let config = Ocb3Config::default().with_nonce_size(0);
        assert_eq!(
            Ocb3::with_config(rfc_sample_cipher(), config).err(),
            Some(Error::InvalidNonceSize(0))
        );
    }

    #[test]
    fn rejects_64_bit_block_cipher() {
        let des = des::Des::new_from_slice(&[0u8; 8]).unwrap();
        assert_eq!(Ocb3::new(des).err(), Some(Error::InvalidBlockSize(8)));
    }

    #[test]
    fn overhead_is_tag_size() {
        let config = Ocb3Config::default().with_tag_size(12);
        let ctx = Ocb3::with_config(rfc_sample_cipher(), config).unwrap();
        assert_eq!(ctx.nonce_size(), 12);
        assert_eq!(ctx.tag_size(), 12);
        assert_eq!(ctx.overhead(), 12);
    }

    #[test]
    fn failed_open_leaves_dst_untouched() {
        let ctx = Ocb3::new(rfc_sample_cipher()).unwrap();
        let nonce = [7u8; 12];
        let mut sealed = ctx.seal(&nonce, b"attack at dawn", b"header");
        sealed[3] ^= 0x10;

        let mut dst = b"prefix".to_vec();
        assert_eq!(
            ctx.open_into(&mut dst, &nonce, &sealed, b"header"),
            Err(Error::AuthenticationFailed)
        );
        assert_eq!(dst, b"prefix");
    }

    #[test]
    fn failed_open_in_place_zeroizes_buffer() {
        let ctx = Ocb3::new(rfc_sample_cipher()).unwrap();
        let nonce = [9u8; 12];
        let mut buffer = *b"a message of thirty-three bytes!!";
        let tag = ctx.seal_in_place_detached(&nonce, &[], &mut buffer);

        let mut bad_tag = tag.as_bytes().to_vec();
        bad_tag[15] ^= 1;
        assert_eq!(
            ctx.open_in_place_detached(&nonce, &[], &mut buffer, &bad_tag),
            Err(Error::AuthenticationFailed)
        );
        assert!(buffer.iter().all(|b| *b == 0));
    }

    #[test]
    fn short_ciphertext_fails_authentication() {
        let ctx = Ocb3::new(rfc_sample_cipher()).unwrap();
        let nonce = [0u8; 12];
        assert_eq!(
            ctx.open(&nonce, &[0u8; 15], &[]),
            Err(Error::AuthenticationFailed)
        );
    }

    #[test]
    #[should_panic(expected = "incorrect nonce length")]
    fn wrong_nonce_length_panics() {
        let ctx = Ocb3::new(rfc_sample_cipher()).unwrap();
        ctx.seal(&[0u8; 11], b"", b"");
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    #[should_panic(expected = "input too large")]
    fn oversized_input_panics() {
        check_input_size(usize::MAX, 1);
    }

    #[test]
    fn context_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Ocb3<Aes128>>();
    }
}
