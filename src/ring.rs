//! Byte-packed elements of the quotient ring R = GF(2)[x]/(x^r - 1).

use crate::consts::{LAST_R_BYTE_MASK, R_QW, R_SIZE};

use subtle::{Choice, ConstantTimeEq};
use zeroize::Zeroize;

/// A polynomial in R, packed little-endian into ⌈r/8⌉ bytes.
///
/// Invariant: bits at positions >= r (the top bits of the last byte) are
/// zero. Every producer re-masks the last byte, so consumers (the
/// multiplier, the hash) never see stray bits.
#[derive(Clone, Zeroize)]
pub(crate) struct RingElement {
    pub(crate) raw: [u8; R_SIZE],
}

impl Default for RingElement {
    fn default() -> Self {
        RingElement { raw: [0u8; R_SIZE] }
    }
}

impl RingElement {
    /// Deserializes an element, re-establishing the high-bit invariant.
    pub(crate) fn from_bytes(bytes: &[u8]) -> Self {
        assert_eq!(bytes.len(), R_SIZE);
        let mut elem = RingElement::default();
        elem.raw.copy_from_slice(bytes);
        elem.mask_last_byte();
        elem
    }

    pub(crate) fn mask_last_byte(&mut self) {
        self.raw[R_SIZE - 1] &= LAST_R_BYTE_MASK;
    }

    /// Hamming weight of the r live bits. The last byte is masked before
    /// counting so the result is correct even on raw views that have not
    /// re-established the invariant yet.
    pub(crate) fn weight(&self) -> u32 {
        let mut acc = 0u32;
        for b in &self.raw[..R_SIZE - 1] {
            acc += b.count_ones();
        }
        acc + (self.raw[R_SIZE - 1] & LAST_R_BYTE_MASK).count_ones()
    }

    /// Ring addition, a byte-wise XOR.
    pub(crate) fn xor(a: &RingElement, b: &RingElement) -> RingElement {
        let mut out = RingElement::default();
        for i in 0..R_SIZE {
            out.raw[i] = a.raw[i] ^ b.raw[i];
        }
        out
    }

    /// Repacks the element into 64-bit words for the multiplier.
    pub(crate) fn to_qws(&self) -> [u64; R_QW] {
        let mut qws = [0u64; R_QW];
        for (qw, chunk) in qws.iter_mut().zip(self.raw.chunks(8)) {
            let mut word = [0u8; 8];
            word[..chunk.len()].copy_from_slice(chunk);
            *qw = u64::from_le_bytes(word);
        }
        qws
    }

    /// Inverse of [`to_qws`](Self::to_qws); re-masks the last byte.
    pub(crate) fn from_qws(qws: &[u64; R_QW]) -> Self {
        let mut elem = RingElement::default();
        for (chunk, qw) in elem.raw.chunks_mut(8).zip(qws.iter()) {
            let bytes = qw.to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
        elem.mask_last_byte();
        elem
    }
}

impl ConstantTimeEq for RingElement {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.raw.ct_eq(&other.raw)
    }
}

/// A pair of ring elements. Carries the split error vectors (e, e', e'') and
/// the (m·f0, m·f1) products, all of which are secret, so the pair wipes
/// itself on drop.
#[derive(Clone, Default, Zeroize, zeroize::ZeroizeOnDrop)]
pub(crate) struct RingPair {
    pub(crate) val: [RingElement; 2],
}

impl RingPair {
    pub(crate) fn total_weight(&self) -> u32 {
        self.val[0].weight() + self.val[1].weight()
    }
}

impl ConstantTimeEq for RingPair {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.val[0].ct_eq(&other.val[0]) & self.val[1].ct_eq(&other.val[1])
    }
}
