//! Rejection samplers driven by the AES-256-CTR stream.

use crate::consts::SEED_LEN;
use crate::error::Error;
use crate::prf::AesCtrPrf;
use crate::ring::RingElement;

use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

/// Whether a freshly sampled ring element must be resampled until its
/// hamming weight is odd.
#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum Restriction {
    None,
    OddWeight,
}

/// Uniform value in [0, len) by masking a 32-bit draw down to the next
/// power of two and rejecting overshoots.
fn rand_mod_len(len: u32, prf: &mut AesCtrPrf) -> Result<u32, Error> {
    let mask = len.next_power_of_two() - 1;
    loop {
        let mut bytes = [0u8; 4];
        prf.fill(&mut bytes)?;
        let candidate = u32::from_le_bytes(bytes) & mask;
        if candidate < len {
            return Ok(candidate);
        }
    }
}

/// Deposits every wlist bit into `buf` while touching each byte once per
/// index, so the memory access pattern is independent of the index values.
fn secure_set_bits(buf: &mut [u8], wlist: &[u32]) {
    for (i, byte) in buf.iter_mut().enumerate() {
        let byte_idx = i as u32;
        for &pos in wlist {
            let hit = byte_idx.ct_eq(&(pos >> 3));
            let bit = 1u8 << (pos & 7);
            *byte |= u8::conditional_select(&0, &bit, hit);
        }
    }
}

/// Rejection-samples `wlist.len()` distinct bit indices in [0, bits), sets
/// them in `buf` (cleared first), and leaves the index list sorted
/// ascending. The duplicate check scans every accepted index in constant
/// time, so acceptance timing reveals nothing about the values drawn so far.
pub(crate) fn generate_sparse_rep(
    buf: &mut [u8],
    wlist: &mut [u32],
    bits: u32,
    prf: &mut AesCtrPrf,
) -> Result<(), Error> {
    debug_assert!(buf.len() * 8 >= bits as usize);

    let weight = wlist.len();
    let mut ctr = 0usize;
    while ctr < weight {
        wlist[ctr] = rand_mod_len(bits, prf)?;

        let mut duplicate = Choice::from(0u8);
        for prev in &wlist[..ctr] {
            duplicate |= prev.ct_eq(&wlist[ctr]);
        }
        ctr += (!duplicate).unwrap_u8() as usize;
    }

    wlist.sort_unstable();

    buf.fill(0);
    secure_set_bits(buf, wlist);
    Ok(())
}

/// Fills a ring element with uniform r bits from a fresh stream keyed by
/// `seed`. With [`Restriction::OddWeight`] the whole element is resampled
/// until its weight is odd.
pub(crate) fn sample_uniform_r_bits(
    seed: &[u8; SEED_LEN],
    restriction: Restriction,
) -> Result<RingElement, Error> {
    let mut prf = AesCtrPrf::with_seed(seed)?;
    sample_uniform_r_bits_with_prf(&mut prf, restriction)
}

/// Same as [`sample_uniform_r_bits`] but over a caller-owned stream, so
/// several elements can share one CTR context.
pub(crate) fn sample_uniform_r_bits_with_prf(
    prf: &mut AesCtrPrf,
    restriction: Restriction,
) -> Result<RingElement, Error> {
    let mut out = RingElement::default();
    loop {
        prf.fill(&mut out.raw)?;
        out.mask_last_byte();
        if restriction == Restriction::None || out.weight() % 2 == 1 {
            return Ok(out);
        }
    }
}
