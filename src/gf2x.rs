//! Carry-less polynomial multiplication in GF(2)[x]/(x^r - 1).
//!
//! Portable word-by-word schoolbook multiplication. The 64x64 base
//! multiplier processes one operand bit per step with arithmetic masking, so
//! the operation schedule is independent of the (secret) operand values.

use crate::consts::{LAST_R_QW_MASK, R_BITS, R_QW};
use crate::ring::RingElement;

use zeroize::Zeroizing;

/// Carry-less 64x64 -> 128 bit product.
fn mul64(a: u64, b: u64) -> u128 {
    let wide_a = a as u128;
    let mut prod: u128 = 0;
    for i in 0..64 {
        let mask = (((b >> i) & 1) as u128).wrapping_neg();
        prod ^= (wide_a << i) & mask;
    }
    prod
}

/// Folds a 2r-bit product back into R using x^r = 1: every bit at position
/// k >= r lands on k - r. The product degree is at most 2r - 2, so a single
/// fold suffices.
fn reduce(prod: &[u64; 2 * R_QW]) -> RingElement {
    const WORD_OFF: usize = R_BITS / 64;
    const BIT_OFF: u32 = (R_BITS % 64) as u32;

    let mut res = Zeroizing::new([0u64; R_QW]);
    for i in 0..R_QW {
        let lo = prod[WORD_OFF + i] as u128;
        let hi = prod[WORD_OFF + i + 1] as u128;
        let folded = (((hi << 64) | lo) >> BIT_OFF) as u64;
        res[i] = prod[i] ^ folded;
    }
    res[R_QW - 1] &= LAST_R_QW_MASK;
    RingElement::from_qws(&res)
}

/// Multiplies two ring elements mod x^r - 1.
pub(crate) fn mod_mul(a: &RingElement, b: &RingElement) -> RingElement {
    let aw = a.to_qws();
    let bw = b.to_qws();

    // Double-width scratch for the unreduced product, wiped before release
    // since the operands are secret in most call sites.
    let mut prod = Zeroizing::new([0u64; 2 * R_QW]);
    for i in 0..R_QW {
        for j in 0..R_QW {
            let p = mul64(aw[i], bw[j]);
            prod[i + j] ^= p as u64;
            prod[i + j + 1] ^= (p >> 64) as u64;
        }
    }

    reduce(&prod)
}
