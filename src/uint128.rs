//! 128-bit big-endian values used for offsets, checksums and the L table.
//!
//! OCB treats every block as a 128-bit string, most significant bit first.
//! [`Uint128`] keeps that string as two 64-bit words so that shifts across the
//! word boundary and GF(2^128) doubling match the bit ordering of
//! [RFC 7253][1] exactly.
//!
//! [1]: https://www.rfc-editor.org/rfc/rfc7253.html#section-2

use core::ops::{BitXor, BitXorAssign, Shl, Shr};

use zeroize::Zeroize;

use crate::config::BLOCK_SIZE;

/// A 128-bit string stored as its high and low 64-bit halves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Uint128 {
    pub hi: u64,
    pub lo: u64,
}

impl Uint128 {
    pub const ZERO: Self = Self { hi: 0, lo: 0 };

    pub const fn new(hi: u64, lo: u64) -> Self {
        Self { hi, lo }
    }

    pub fn from_be_bytes(bytes: [u8; BLOCK_SIZE]) -> Self {
        let value = u128::from_be_bytes(bytes);
        Self {
            hi: (value >> 64) as u64,
            lo: value as u64,
        }
    }

    pub fn to_be_bytes(self) -> [u8; BLOCK_SIZE] {
        ((u128::from(self.hi) << 64) | u128::from(self.lo)).to_be_bytes()
    }

    /// Reads a full block. `block` must be exactly [`BLOCK_SIZE`] bytes long.
    pub fn from_be_slice(block: &[u8]) -> Self {
        let mut bytes = [0u8; BLOCK_SIZE];
        bytes.copy_from_slice(block);
        Self::from_be_bytes(bytes)
    }

    /// Builds `partial || 1 || 0*` for a trailing block shorter than
    /// [`BLOCK_SIZE`] bytes.
    pub fn from_padded(partial: &[u8]) -> Self {
        debug_assert!(partial.len() < BLOCK_SIZE);
        let mut bytes = [0u8; BLOCK_SIZE];
        bytes[..partial.len()].copy_from_slice(partial);
        bytes[partial.len()] = 0b1000_0000;
        Self::from_be_bytes(bytes)
    }

    /// Writes the value back into a full block.
    pub fn write_be(self, block: &mut [u8]) {
        block.copy_from_slice(&self.to_be_bytes());
    }

    /// Multiplication by `x` in GF(2^128), `double(S)` in RFC 7253.
    ///
    /// The reduction is applied through a mask derived from the carried-out
    /// bit so the operation does not branch on secret-derived values.
    pub fn double(self) -> Self {
        let mask = 0u64.wrapping_sub(self.hi >> 63);
        let mut doubled = self << 1;
        doubled.lo ^= mask & 0x87;
        doubled
    }
}

/// Number of trailing zero bits of a block index.
#[inline]
pub fn ntz(i: u64) -> usize {
    i.trailing_zeros() as usize
}

impl BitXor for Uint128 {
    type Output = Self;

    #[inline]
    fn bitxor(self, rhs: Self) -> Self {
        Self {
            hi: self.hi ^ rhs.hi,
            lo: self.lo ^ rhs.lo,
        }
    }
}

impl BitXorAssign for Uint128 {
    #[inline]
    fn bitxor_assign(&mut self, rhs: Self) {
        self.hi ^= rhs.hi;
        self.lo ^= rhs.lo;
    }
}

impl Shl<u32> for Uint128 {
    type Output = Self;

    fn shl(self, n: u32) -> Self {
        match n {
            0 => self,
            1..=63 => Self {
                hi: (self.hi << n) | (self.lo >> (64 - n)),
                lo: self.lo << n,
            },
            64..=127 => Self {
                hi: self.lo << (n - 64),
                lo: 0,
            },
            _ => Self::ZERO,
        }
    }
}

impl Shr<u32> for Uint128 {
    type Output = Self;

    fn shr(self, n: u32) -> Self {
        match n {
            0 => self,
            1..=63 => Self {
                hi: self.hi >> n,
                lo: (self.lo >> n) | (self.hi << (64 - n)),
            },
            64..=127 => Self {
                hi: 0,
                lo: self.hi >> (n - 64),
            },
            _ => Self::ZERO,
        }
    }
}

impl Zeroize for Uint128 {
    fn zeroize(&mut self) {
        self.hi.zeroize();
        self.lo.zeroize();
    }
}
