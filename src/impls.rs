//! Contains external-facing impls of KEM traits

use crate::consts::CIPHERTEXT_LEN;
use crate::error::Error;
use crate::kem::{decap, encap, Ciphertext, PublicKey, SecretKey, SharedSecret};

use kem_traits::{Decapsulate, Encapsulate};
use rand_core::CryptoRngCore;

/// A serialized ciphertext, as exchanged through the KEM traits.
pub type BikeCiphertext = [u8; CIPHERTEXT_LEN];

impl Encapsulate<BikeCiphertext, SharedSecret> for PublicKey {
    type Error = Error;

    fn encapsulate(
        &self,
        rng: &mut impl CryptoRngCore,
    ) -> Result<(BikeCiphertext, SharedSecret), Self::Error> {
        let (ct, shared_secret) = encap(rng, self)?;
        let mut ct_buf = [0u8; CIPHERTEXT_LEN];
        ct.to_bytes(&mut ct_buf);
        Ok((ct_buf, shared_secret))
    }
}

impl Decapsulate<BikeCiphertext, SharedSecret> for SecretKey {
    type Error = Error;

    fn decapsulate(&self, encapsulated_key: &BikeCiphertext) -> Result<SharedSecret, Self::Error> {
        decap(self, &Ciphertext::from_bytes(encapsulated_key))
    }
}
