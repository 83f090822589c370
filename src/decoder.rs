//! Black-Gray-Flip decoder for the QC-MDPC code.
//!
//! The unsatisfied-parity counters are accumulated with the bit-sliced
//! half-adder technique of QcBits (Chou, CHES 2016), over a syndrome whose
//! first r bits are duplicated so any rotation can be read with one word
//! offset and one sub-word shift.

use crate::consts::{
    DELTA, DV, LAST_R_QW_LEAD, LAST_R_QW_MASK, LAST_R_QW_TRAIL, MAX_IT, R_QW, R_SIZE, SLICES,
    THRESHOLD_COEFF0, THRESHOLD_COEFF1,
};
use crate::error::Error;
use crate::gf2x;
use crate::kem::{Ciphertext, SecretKey};
use crate::ring::{RingElement, RingPair};

use zeroize::{Zeroize, Zeroizing};

const SYNDROME_QW: usize = 3 * R_QW;

/// Threshold for the masked (black/gray) re-flip steps.
const MASKED_THRESHOLD: u8 = ((DV + 1) / 2 + 1) as u8;

/// The syndrome, with room for the first r bits repeated twice above
/// themselves (see [`Syndrome::dup`]).
#[derive(Clone, Zeroize, zeroize::ZeroizeOnDrop)]
pub(crate) struct Syndrome {
    qw: [u64; SYNDROME_QW],
}

impl Default for Syndrome {
    fn default() -> Self {
        Syndrome { qw: [0u64; SYNDROME_QW] }
    }
}

impl Syndrome {
    /// Duplicates the first r bits over the rest of the buffer:
    ///
    /// ```text
    /// | third copy | second copy | first R_BITS |
    /// ```
    ///
    /// Idempotent, so re-duplicating an already duplicated syndrome is
    /// harmless.
    fn dup(&mut self) {
        self.qw[R_QW - 1] =
            (self.qw[0] << LAST_R_QW_LEAD) | (self.qw[R_QW - 1] & LAST_R_QW_MASK);
        for i in 0..(2 * R_QW - 1) {
            self.qw[R_QW + i] =
                (self.qw[i] >> LAST_R_QW_TRAIL) | (self.qw[i + 1] << LAST_R_QW_LEAD);
        }
    }

    /// Hamming weight of the r live bits.
    fn weight(&self) -> u32 {
        let mut acc = 0u32;
        for w in &self.qw[..R_QW - 1] {
            acc += w.count_ones();
        }
        acc + (self.qw[R_QW - 1] & LAST_R_QW_MASK).count_ones()
    }
}

/// Bit-sliced unsatisfied-parity counters: slice j holds bit j of every
/// counter.
struct Upc {
    slices: [[u64; R_QW]; SLICES],
}

impl Default for Upc {
    fn default() -> Self {
        Upc { slices: [[0u64; R_QW]; SLICES] }
    }
}

impl Upc {
    fn clear(&mut self) {
        for slice in &mut self.slices {
            slice.fill(0);
        }
    }

    /// Byte `j` of the top slice, whose complement marks counters that
    /// reached the threshold.
    fn msb_byte(&self, j: usize) -> u8 {
        (self.slices[SLICES - 1][j / 8] >> (8 * (j % 8))) as u8
    }
}

impl Zeroize for Upc {
    fn zeroize(&mut self) {
        for slice in &mut self.slices {
            slice.zeroize();
        }
    }
}

/// Bit length of `v`, i.e. the number of live counter slices after `v`
/// additions.
fn log2_msb(v: usize) -> usize {
    (usize::BITS - v.leading_zeros()) as usize
}

/// out[i] = 64 bits of the duplicated syndrome starting at bit
/// `bitscount + 64 * i`, which is the rotation of the syndrome by
/// `bitscount` positions.
fn rotate_right(out: &mut [u64; R_QW], s: &Syndrome, bitscount: u32) {
    let word_off = (bitscount >> 6) as usize;
    let bit_off = bitscount & 63;
    for i in 0..R_QW {
        let lo = s.qw[i + word_off] as u128;
        let hi = s.qw[i + word_off + 1] as u128;
        out[i] = (((hi << 64) | lo) >> bit_off) as u64;
    }
}

/// Adds the rotated syndrome into the counters, half-adder style. On
/// return `rotated` holds the carries out of the last processed slice.
fn bit_sliced_adder(upc: &mut Upc, rotated: &mut [u64; R_QW], num_slices: usize) {
    for slice in &mut upc.slices[..num_slices] {
        for i in 0..R_QW {
            let carry = slice[i] & rotated[i];
            slice[i] ^= rotated[i];
            rotated[i] = carry;
        }
    }
}

/// Subtracts `val` from every counter with borrow propagation across all
/// slices; afterwards the top slice holds the complemented sign bits.
fn bit_slice_full_subtract(upc: &mut Upc, mut val: u8) {
    let mut borrow = Zeroizing::new([0u64; R_QW]);
    for slice in &mut upc.slices {
        let lsb_mask = 0u64.wrapping_sub((val & 1) as u64);
        val >>= 1;

        for i in 0..R_QW {
            let a = slice[i];
            let b = lsb_mask;
            let next = (!a & b & !borrow[i]) | ((!a | b) & borrow[i]);
            slice[i] = a ^ b ^ borrow[i];
            borrow[i] = next;
        }
    }
}

/// Step I of an iteration: flip every position whose counter reached the
/// threshold, recording the flips in `black` and the near-misses (within
/// DELTA of the threshold) in `gray`.
fn find_err1(
    e: &mut RingPair,
    black: &mut RingPair,
    gray: &mut RingPair,
    s: &Syndrome,
    wlist: &[[u32; DV]; 2],
    threshold: u8,
) {
    let mut rotated = Zeroizing::new([0u64; R_QW]);
    let mut upc = Zeroizing::new(Upc::default());

    for i in 0..2 {
        upc.clear();

        for j in 0..DV {
            rotate_right(&mut rotated, s, wlist[i][j]);
            bit_sliced_adder(&mut upc, &mut rotated, log2_msb(j + 1));
        }

        bit_slice_full_subtract(&mut upc, threshold);

        for j in 0..R_SIZE {
            let sum_msb = !upc.msb_byte(j);
            black.val[i].raw[j] = sum_msb;
            e.val[i].raw[j] ^= sum_msb;
        }
        e.val[i].mask_last_byte();

        // Lift the counters by DELTA to expose the gray zone right below
        // the threshold.
        for _ in 0..DELTA {
            rotated[..R_QW - 1].fill(u64::MAX);
            rotated[R_QW - 1] = 0xff;
            bit_sliced_adder(&mut upc, &mut rotated, SLICES);
        }

        for j in 0..R_SIZE {
            let sum_msb = !upc.msb_byte(j);
            gray.val[i].raw[j] = !black.val[i].raw[j] & sum_msb;
        }
    }
}

/// Steps II/III: recount, but flip only positions present in `pos_e`
/// (the black or gray mask of Step I).
fn find_err2(
    e: &mut RingPair,
    pos_e: &RingPair,
    s: &Syndrome,
    wlist: &[[u32; DV]; 2],
    threshold: u8,
) {
    let mut rotated = Zeroizing::new([0u64; R_QW]);
    let mut upc = Zeroizing::new(Upc::default());

    for i in 0..2 {
        upc.clear();

        for j in 0..DV {
            rotate_right(&mut rotated, s, wlist[i][j]);
            bit_sliced_adder(&mut upc, &mut rotated, log2_msb(j + 1));
        }

        bit_slice_full_subtract(&mut upc, threshold);

        for j in 0..R_SIZE {
            let sum_msb = !upc.msb_byte(j);
            e.val[i].raw[j] ^= pos_e.val[i].raw[j] & sum_msb;
        }
        e.val[i].mask_last_byte();
    }
}

/// Affine threshold rule for Level 1, per the BIKE Round-2 specification,
/// section 2.4.2.
fn get_threshold(s: &Syndrome) -> u8 {
    (THRESHOLD_COEFF0 + THRESHOLD_COEFF1 * s.weight() as f64) as u8
}

/// s = c0*h0 + c1*h1, the projection of the ciphertext onto the parity
/// check, duplicated for rotation.
pub(crate) fn compute_syndrome(ct: &Ciphertext, sk: &SecretKey) -> Syndrome {
    let s0 = Zeroizing::new(gf2x::mod_mul(&ct.c[0], &sk.bin[0]));
    let s1 = Zeroizing::new(gf2x::mod_mul(&ct.c[1], &sk.bin[1]));
    let sum = Zeroizing::new(RingElement::xor(&s0, &s1));

    let mut syndrome = Syndrome::default();
    syndrome.qw[..R_QW].copy_from_slice(&sum.to_qws());
    syndrome.dup();
    syndrome
}

/// Syndrome of the ciphertext with the current error estimate backed out.
fn recompute_syndrome(ct: &Ciphertext, sk: &SecretKey, e: &RingPair) -> Syndrome {
    let adapted = Ciphertext {
        c: [
            RingElement::xor(&ct.c[0], &e.val[0]),
            RingElement::xor(&ct.c[1], &e.val[1]),
        ],
    };
    compute_syndrome(&adapted, sk)
}

/// Runs the BGF iterations and writes the recovered error into `e`.
///
/// Returns [`Error::DecodingFailure`] iff the final syndrome weight is
/// non-zero. `e` is left in its final state either way; decapsulation folds
/// the status into its constant-time predicate rather than acting on it.
pub(crate) fn decode(
    e: &mut RingPair,
    original_s: &Syndrome,
    ct: &Ciphertext,
    sk: &SecretKey,
) -> Result<(), Error> {
    let mut black = RingPair::default();
    let mut gray = RingPair::default();

    // The error estimate is xored into, so it must start from zero.
    *e = RingPair::default();
    let mut s = original_s.clone();
    s.dup();

    for iter in 0..MAX_IT {
        let threshold = get_threshold(&s);
        tracing::trace!(iter, threshold, "bit-flip iteration");

        find_err1(e, &mut black, &mut gray, &s, &sk.wlist, threshold);
        s = recompute_syndrome(ct, sk, e);

        // BGF runs the masked black/gray steps in the first iteration only.
        if iter >= 1 {
            continue;
        }

        find_err2(e, &black, &s, &sk.wlist, MASKED_THRESHOLD);
        s = recompute_syndrome(ct, sk, e);

        find_err2(e, &gray, &s, &sk.wlist, MASKED_THRESHOLD);
        s = recompute_syndrome(ct, sk, e);
    }

    if s.weight() > 0 {
        return Err(Error::DecodingFailure);
    }
    Ok(())
}
