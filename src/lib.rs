//! A pure-Rust implementation of the BIKE-1 key encapsulation mechanism,
//! Round-2 variant, at the Level-1 parameter set (r = 11779, dv = 71,
//! t = 134).
//!
//! The crate exposes the standard KEM triple over byte-serializable types.
//! Decapsulation never reports failure: a ciphertext that fails decoding or
//! verification yields a pseudorandom key derived from the secret sigma
//! values (implicit rejection), selected with a constant-time mask so the
//! two outcomes are indistinguishable by return value or timing.
//!
//! ```no_run
//! use bike_kem::{decap, encap, keypair};
//!
//! let mut rng = rand::thread_rng();
//!
//! let (sk, pk) = keypair(&mut rng)?;
//! let (ct, ss_sender) = encap(&mut rng, &pk)?;
//! let ss_receiver = decap(&sk, &ct)?;
//! assert_eq!(ss_sender, ss_receiver);
//! # Ok::<(), bike_kem::Error>(())
//! ```
//!
//! The RustCrypto [`Encapsulate`](kem_traits::Encapsulate) /
//! [`Decapsulate`](kem_traits::Decapsulate) traits are implemented over
//! serialized ciphertexts as well.

mod consts;
mod decoder;
mod error;
mod gf2x;
mod impls;
mod kem;
mod prf;
mod ring;
mod sampling;

// Fixed-seed known-answer style tests
#[cfg(test)]
mod kat;

pub use consts::{CIPHERTEXT_LEN, PUBLIC_KEY_LEN, SECRET_KEY_LEN, SEED_LEN, SS_LEN};
pub use error::Error;
pub use impls::BikeCiphertext;
pub use kem::{decap, encap, keypair, Ciphertext, PublicKey, SecretKey, SharedSecret};
