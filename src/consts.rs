//! The BIKE-1 Level-1 (Round 2) parameter set and everything derived from it.
//!
//! A single parameter set is fixed at build time; there is no runtime or
//! type-level agility across security levels.

/// The ring degree r. An odd prime with x^r - 1 factoring as required by the
/// QC-MDPC construction.
pub(crate) const R_BITS: usize = 11779;
/// The code length n = 2r.
pub(crate) const N_BITS: usize = 2 * R_BITS;

/// Row weight of each circulant block of the parity-check matrix, and the
/// hamming weight of each of h0, h1.
pub(crate) const DV: usize = 71;
/// Total weight of the error vector: |e0| + |e1| = t.
pub(crate) const T1: usize = 134;

/// Bytes needed to pack r bits.
pub(crate) const R_SIZE: usize = (R_BITS + 7) / 8;
/// Bytes needed to pack n = 2r bits.
pub(crate) const N_SIZE: usize = (N_BITS + 7) / 8;
/// 64-bit words needed to pack r bits.
pub(crate) const R_QW: usize = (R_BITS + 63) / 64;

// r is not a multiple of 8, so the last packed byte carries r mod 8 live bits
// and 8 - (r mod 8) bits that every producer must keep at zero. The shift
// pair below re-aligns the upper half of a 2r-bit buffer onto a byte
// boundary; the lead is treated as a full byte when r is byte-aligned so the
// (u16-widened) right shifts drop out cleanly.
pub(crate) const LAST_R_BYTE_LEAD: u32 = if R_BITS % 8 == 0 { 8 } else { (R_BITS % 8) as u32 };
pub(crate) const LAST_R_BYTE_TRAIL: u32 = 8 - LAST_R_BYTE_LEAD;
pub(crate) const LAST_R_BYTE_MASK: u8 =
    if R_BITS % 8 == 0 { 0xff } else { (1 << (R_BITS % 8)) - 1 };

// Word-level analogues, used by the syndrome duplication and rotation.
pub(crate) const LAST_R_QW_LEAD: u32 = (R_BITS % 64) as u32;
pub(crate) const LAST_R_QW_TRAIL: u32 = 64 - LAST_R_QW_LEAD;
pub(crate) const LAST_R_QW_MASK: u64 = (1u64 << LAST_R_QW_LEAD) - 1;

/// Seed length in bytes, which is also the AES-256 key length.
pub const SEED_LEN: usize = 32;
/// Shared-secret length in bytes (SHA-384 output truncated to this).
pub const SS_LEN: usize = 32;

/// Serialized public key: f0 || f1.
pub const PUBLIC_KEY_LEN: usize = 2 * R_SIZE;
/// Serialized ciphertext: c0 || c1.
pub const CIPHERTEXT_LEN: usize = 2 * R_SIZE;
/// Serialized secret key: h0 || h1 || wlist0 || wlist1 || sigma0 || sigma1,
/// with each wlist entry a little-endian u32.
pub const SECRET_KEY_LEN: usize = 2 * R_SIZE + 2 * DV * 4 + 2 * R_SIZE;

/// Invocation budget of one AES-256-CTR PRF context. Far beyond what any
/// rejection-sampling run can consume for this parameter set.
pub(crate) const MAX_AES_INVOCATIONS: u32 = u32::MAX;

// Decoder constants (Black-Gray-Flip, Level 1).

/// Number of outer bit-flipping iterations.
pub(crate) const MAX_IT: usize = 5;
/// Gray-zone margin added to the counters when collecting gray positions.
pub(crate) const DELTA: usize = 3;
/// Bit slices per unsatisfied-parity counter: enough for counts up to dv
/// plus the threshold subtraction's sign bit.
pub(crate) const SLICES: usize = 8;

// Affine threshold rule for Level 1, per the BIKE Round-2 specification,
// section 2.4.2: th(s) = 13.530 + 0.0069722 * wt(s).
pub(crate) const THRESHOLD_COEFF0: f64 = 13.530;
pub(crate) const THRESHOLD_COEFF1: f64 = 0.006_972_2;
