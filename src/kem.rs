//! The BIKE-1 KEM operations: keypair generation, encapsulation, and
//! decapsulation with constant-time implicit rejection.

use crate::consts::{
    CIPHERTEXT_LEN, DV, LAST_R_BYTE_LEAD, LAST_R_BYTE_TRAIL, N_BITS, N_SIZE, PUBLIC_KEY_LEN,
    R_BITS, R_SIZE, SECRET_KEY_LEN, SEED_LEN, SS_LEN, T1,
};
use crate::decoder;
use crate::error::Error;
use crate::gf2x;
use crate::prf::AesCtrPrf;
use crate::ring::{RingElement, RingPair};
use crate::sampling::{
    generate_sparse_rep, sample_uniform_r_bits, sample_uniform_r_bits_with_prf, Restriction,
};

use rand_core::CryptoRngCore;
use sha2::{Digest, Sha384};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};
use zeroize::{Zeroize, Zeroizing};

const SHA384_LEN: usize = 48;

/// The shared secret of a KEM operation.
pub type SharedSecret = [u8; SS_LEN];

/// A secret key: the sparse parity-check halves (h0, h1), their supports as
/// sorted index lists, and the uniform (sigma0, sigma1) pair that keys the
/// implicit-rejection shared secret.
#[derive(Clone, Zeroize, zeroize::ZeroizeOnDrop)]
pub struct SecretKey {
    pub(crate) bin: [RingElement; 2],
    pub(crate) wlist: [[u32; DV]; 2],
    pub(crate) sigma: [RingElement; 2],
}

/// A public key (f0, f1) = (g*h1, g*h0). No further structure may be
/// assumed by consumers.
#[derive(Clone)]
pub struct PublicKey {
    pub(crate) f: [RingElement; 2],
}

/// A ciphertext (c0, c1) = (m*f0 + e0, m*f1 + e1).
#[derive(Clone)]
pub struct Ciphertext {
    pub(crate) c: [RingElement; 2],
}

/// The three 32-byte seeds one operation consumes, drawn from the caller's
/// RNG in a single call so DRBG-driven runs stay aligned with the reference
/// call granularity.
#[derive(Zeroize, zeroize::ZeroizeOnDrop)]
struct Seeds {
    seed: [[u8; SEED_LEN]; 3],
}

fn get_seeds(rng: &mut impl CryptoRngCore) -> Seeds {
    let mut buf = Zeroizing::new([0u8; 3 * SEED_LEN]);
    rng.fill_bytes(&mut buf[..]);

    let mut seeds = Seeds { seed: [[0u8; SEED_LEN]; 3] };
    for (dst, src) in seeds.seed.iter_mut().zip(buf.chunks_exact(SEED_LEN)) {
        dst.copy_from_slice(src);
    }
    seeds
}

impl SecretKey {
    pub const SERIALIZED_LEN: usize = SECRET_KEY_LEN;

    /// Serialization order is h0, h1, wlist0, wlist1, sigma0, sigma1, with
    /// each index list stored as sorted little-endian u32 values.
    pub fn to_bytes(&self, out_buf: &mut [u8]) {
        assert_eq!(out_buf.len(), Self::SERIALIZED_LEN);
        let rest = out_buf;

        let (out_h0, rest) = rest.split_at_mut(R_SIZE);
        out_h0.copy_from_slice(&self.bin[0].raw);
        let (out_h1, rest) = rest.split_at_mut(R_SIZE);
        out_h1.copy_from_slice(&self.bin[1].raw);

        let (out_w0, rest) = rest.split_at_mut(4 * DV);
        for (chunk, idx) in out_w0.chunks_exact_mut(4).zip(self.wlist[0].iter()) {
            chunk.copy_from_slice(&idx.to_le_bytes());
        }
        let (out_w1, rest) = rest.split_at_mut(4 * DV);
        for (chunk, idx) in out_w1.chunks_exact_mut(4).zip(self.wlist[1].iter()) {
            chunk.copy_from_slice(&idx.to_le_bytes());
        }

        let (out_s0, rest) = rest.split_at_mut(R_SIZE);
        out_s0.copy_from_slice(&self.sigma[0].raw);
        let (out_s1, rest) = rest.split_at_mut(R_SIZE);
        out_s1.copy_from_slice(&self.sigma[1].raw);

        assert_eq!(rest.len(), 0);
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        assert_eq!(bytes.len(), Self::SERIALIZED_LEN);

        let (h0, rest) = bytes.split_at(R_SIZE);
        let (h1, rest) = rest.split_at(R_SIZE);

        let mut wlist = [[0u32; DV]; 2];
        let (w0, rest) = rest.split_at(4 * DV);
        for (chunk, idx) in w0.chunks_exact(4).zip(wlist[0].iter_mut()) {
            *idx = u32::from_le_bytes(chunk.try_into().unwrap());
        }
        let (w1, rest) = rest.split_at(4 * DV);
        for (chunk, idx) in w1.chunks_exact(4).zip(wlist[1].iter_mut()) {
            *idx = u32::from_le_bytes(chunk.try_into().unwrap());
        }

        let (s0, s1) = rest.split_at(R_SIZE);
        SecretKey {
            bin: [RingElement::from_bytes(h0), RingElement::from_bytes(h1)],
            wlist,
            sigma: [RingElement::from_bytes(s0), RingElement::from_bytes(s1)],
        }
    }
}

impl PublicKey {
    pub const SERIALIZED_LEN: usize = PUBLIC_KEY_LEN;

    pub fn to_bytes(&self, out_buf: &mut [u8]) {
        assert_eq!(out_buf.len(), Self::SERIALIZED_LEN);
        let (f0, f1) = out_buf.split_at_mut(R_SIZE);
        f0.copy_from_slice(&self.f[0].raw);
        f1.copy_from_slice(&self.f[1].raw);
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        assert_eq!(bytes.len(), Self::SERIALIZED_LEN);
        let (f0, f1) = bytes.split_at(R_SIZE);
        PublicKey { f: [RingElement::from_bytes(f0), RingElement::from_bytes(f1)] }
    }
}

impl Ciphertext {
    pub const SERIALIZED_LEN: usize = CIPHERTEXT_LEN;

    pub fn to_bytes(&self, out_buf: &mut [u8]) {
        assert_eq!(out_buf.len(), Self::SERIALIZED_LEN);
        let (c0, c1) = out_buf.split_at_mut(R_SIZE);
        c0.copy_from_slice(&self.c[0].raw);
        c1.copy_from_slice(&self.c[1].raw);
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        assert_eq!(bytes.len(), Self::SERIALIZED_LEN);
        let (c0, c1) = bytes.split_at(R_SIZE);
        Ciphertext { c: [RingElement::from_bytes(c0), RingElement::from_bytes(c1)] }
    }
}

/// Splits a packed 2r-bit error into (e0, e1), shifting the upper half down
/// onto a byte boundary. The r-th bit sits mid-byte, so every byte of e1 is
/// stitched from two adjacent input bytes; the u16-widened shifts keep the
/// byte-aligned corner (lead = 8) well defined.
pub(crate) fn split_e(e: &[u8; N_SIZE]) -> RingPair {
    let mut pair = RingPair::default();
    pair.val[0].raw.copy_from_slice(&e[..R_SIZE]);

    for i in R_SIZE..N_SIZE {
        pair.val[1].raw[i - R_SIZE] =
            (((e[i] as u16) << LAST_R_BYTE_TRAIL) | ((e[i - 1] as u16) >> LAST_R_BYTE_LEAD)) as u8;
    }

    // When the packed form is one byte short of 2*R_SIZE the loop above
    // never reaches e1's last byte.
    if N_SIZE < 2 * R_SIZE {
        pair.val[1].raw[R_SIZE - 1] = ((e[N_SIZE - 1] as u16) >> LAST_R_BYTE_LEAD) as u8;
    }

    pair.val[0].mask_last_byte();
    pair.val[1].mask_last_byte();
    pair
}

/// The function H of BIKE-1 Round 2: extract-then-expand from (m*f0, m*f1)
/// to an error pair of total weight t, via SHA-384 and AES-256-CTR driven
/// sparse sampling.
fn function_h(in0: &RingElement, in1: &RingElement) -> Result<RingPair, Error> {
    let mut tmp = Zeroizing::new([0u8; 2 * R_SIZE]);
    tmp[..R_SIZE].copy_from_slice(&in0.raw);
    tmp[R_SIZE..].copy_from_slice(&in1.raw);

    let mut digest = Zeroizing::new([0u8; SHA384_LEN]);
    digest.copy_from_slice(&Sha384::digest(&tmp[..]));

    let mut seed = Zeroizing::new([0u8; SEED_LEN]);
    seed.copy_from_slice(&digest[..SEED_LEN]);

    let mut prf = AesCtrPrf::with_seed(&seed)?;
    let mut e_buf = Zeroizing::new([0u8; N_SIZE]);
    let mut wlist = Zeroizing::new([0u32; T1]);
    generate_sparse_rep(&mut e_buf[..], &mut wlist[..], N_BITS as u32, &mut prf)?;

    Ok(split_e(&e_buf))
}

/// (f0, f1) = (g*h1, g*h0) for an odd-weight g. The cross wiring of h0 and
/// h1 is what makes c0*h0 + c1*h1 a syndrome of the error vector alone.
fn calc_pk(g_seed: &[u8; SEED_LEN], bin: &[RingElement; 2]) -> Result<PublicKey, Error> {
    let g = Zeroizing::new(sample_uniform_r_bits(g_seed, Restriction::OddWeight)?);

    let f0 = gf2x::mod_mul(&g, &bin[1]);
    let f1 = gf2x::mod_mul(&g, &bin[0]);
    Ok(PublicKey { f: [f0, f1] })
}

/// m <- R uniformly; (e0, e1) = H(m*f0, m*f1); c = mf + e. Returns the
/// ciphertext together with (m*f0, m*f1), which feeds the KDF.
fn encrypt(pk: &PublicKey, seed: &[u8; SEED_LEN]) -> Result<(Ciphertext, RingPair), Error> {
    let m = Zeroizing::new(sample_uniform_r_bits(seed, Restriction::None)?);

    let mut mf = RingPair::default();
    mf.val[0] = gf2x::mod_mul(&m, &pk.f[0]);
    mf.val[1] = gf2x::mod_mul(&m, &pk.f[1]);

    let e = function_h(&mf.val[0], &mf.val[1])?;

    let ct = Ciphertext {
        c: [
            RingElement::xor(&mf.val[0], &e.val[0]),
            RingElement::xor(&mf.val[1], &e.val[1]),
        ],
    };
    Ok((ct, mf))
}

/// The re-encryption step of decapsulation: mf' = c + e' and
/// e'' = H(mf'). Runs on the decoder-failure path too.
fn reencrypt(e: &RingPair, ct: &Ciphertext) -> Result<(RingPair, RingPair), Error> {
    let mut mf = RingPair::default();
    mf.val[0] = RingElement::xor(&ct.c[0], &e.val[0]);
    mf.val[1] = RingElement::xor(&ct.c[1], &e.val[1]);

    let e_second = function_h(&mf.val[0], &mf.val[1])?;
    Ok((mf, e_second))
}

/// K = SHA-384(in0 || in1 || c0 || c1) truncated to ss_len bytes.
fn get_ss(in0: &RingElement, in1: &RingElement, ct: &Ciphertext) -> SharedSecret {
    let mut tmp = Zeroizing::new([0u8; 4 * R_SIZE]);
    tmp[..R_SIZE].copy_from_slice(&in0.raw);
    tmp[R_SIZE..2 * R_SIZE].copy_from_slice(&in1.raw);
    tmp[2 * R_SIZE..3 * R_SIZE].copy_from_slice(&ct.c[0].raw);
    tmp[3 * R_SIZE..].copy_from_slice(&ct.c[1].raw);

    let mut digest = Zeroizing::new([0u8; SHA384_LEN]);
    digest.copy_from_slice(&Sha384::digest(&tmp[..]));

    let mut ss = [0u8; SS_LEN];
    ss.copy_from_slice(&digest[..SS_LEN]);
    ss
}

/// Generates a keypair from three fresh seeds: seed 0 drives the sparse
/// (h0, h1) sampling, seed 1 the public-key mask g, and seed 2 the sigma
/// pair.
pub fn keypair(rng: &mut impl CryptoRngCore) -> Result<(SecretKey, PublicKey), Error> {
    let seeds = get_seeds(rng);
    tracing::trace!("generating keypair");

    // h0 and h1 share one CTR context; the sigmas share another.
    let mut h_prf = AesCtrPrf::with_seed(&seeds.seed[0])?;
    let mut s_prf = AesCtrPrf::with_seed(&seeds.seed[2])?;

    let mut sk = SecretKey {
        bin: Default::default(),
        wlist: [[0u32; DV]; 2],
        sigma: Default::default(),
    };

    let mut h_buf = Zeroizing::new([0u8; R_SIZE]);
    generate_sparse_rep(&mut h_buf[..], &mut sk.wlist[0], R_BITS as u32, &mut h_prf)?;
    sk.bin[0] = RingElement::from_bytes(&h_buf[..]);

    sk.sigma[0] = sample_uniform_r_bits_with_prf(&mut s_prf, Restriction::None)?;
    sk.sigma[1] = sample_uniform_r_bits_with_prf(&mut s_prf, Restriction::None)?;

    generate_sparse_rep(&mut h_buf[..], &mut sk.wlist[1], R_BITS as u32, &mut h_prf)?;
    sk.bin[1] = RingElement::from_bytes(&h_buf[..]);

    let pk = calc_pk(&seeds.seed[1], &sk.bin)?;
    Ok((sk, pk))
}

/// Encapsulates a fresh shared secret to `pk`.
pub fn encap(
    rng: &mut impl CryptoRngCore,
    pk: &PublicKey,
) -> Result<(Ciphertext, SharedSecret), Error> {
    let seeds = get_seeds(rng);
    tracing::trace!("encapsulating");

    // seed 1 keys m, matching the reference implementation (its seed 0 is
    // drawn but unused here).
    let (ct, mf) = encrypt(pk, &seeds.seed[1])?;
    let ss = get_ss(&mf.val[0], &mf.val[1], &ct);
    Ok((ct, ss))
}

/// Decapsulates `ct`. Always returns a shared secret: if decoding or
/// verification fails, the result is the pseudorandom sigma-derived key, so
/// failures are indistinguishable from successes by return value or timing.
pub fn decap(sk: &SecretKey, ct: &Ciphertext) -> Result<SharedSecret, Error> {
    tracing::trace!("decapsulating");
    let syndrome = decoder::compute_syndrome(ct, sk);

    let mut e_prime = RingPair::default();
    let dec_ok = Choice::from(decoder::decode(&mut e_prime, &syndrome, ct, sk).is_ok() as u8);

    let (mf, e_second) = reencrypt(&e_prime, ct)?;

    // Success iff the decoder converged, the recovered error has weight
    // exactly t, and it is a fixed point of H.
    let weight_ok = (T1 as u32).ct_eq(&e_prime.total_weight());
    let fixed_point = e_prime.ct_eq(&e_second);
    let success = dec_ok & weight_ok & fixed_point;

    let ss_succ = Zeroizing::new(get_ss(&mf.val[0], &mf.val[1], ct));
    let ss_fail = Zeroizing::new(get_ss(&sk.sigma[0], &sk.sigma[1], ct));

    let mut ss = [0u8; SS_LEN];
    for i in 0..SS_LEN {
        ss[i] = u8::conditional_select(&ss_fail[i], &ss_succ[i], success);
    }
    Ok(ss)
}
