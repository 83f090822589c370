//! The AES-256-CTR pseudorandom stream behind seed expansion.
//!
//! The stream layout matches the BIKE Round-2 reference: a 128-bit counter
//! block whose low 64-bit little-endian half increments once per AES
//! invocation, a 16-byte buffer so consecutive reads of any length are
//! contiguous in the stream, and a decrementing invocation budget.

use crate::consts::{MAX_AES_INVOCATIONS, SEED_LEN};
use crate::error::Error;

use aes::Aes256;
use cipher::generic_array::GenericArray;
use cipher::{BlockEncrypt, KeyInit};
use zeroize::Zeroize;

pub(crate) const AES256_BLOCK_LEN: usize = 16;

pub(crate) struct AesCtrPrf {
    cipher: Aes256,
    ctr: u64,
    buffer: [u8; AES256_BLOCK_LEN],
    pos: usize,
    rem_invocations: u32,
}

impl AesCtrPrf {
    /// Keys a fresh stream. The seed doubles as the AES-256 key.
    pub(crate) fn new(max_invocations: u32, seed: &[u8; SEED_LEN]) -> Result<Self, Error> {
        if max_invocations == 0 {
            return Err(Error::PrfExhausted);
        }
        Ok(AesCtrPrf {
            cipher: Aes256::new(GenericArray::from_slice(seed)),
            ctr: 0,
            buffer: [0u8; AES256_BLOCK_LEN],
            pos: AES256_BLOCK_LEN,
            rem_invocations: max_invocations,
        })
    }

    pub(crate) fn with_seed(seed: &[u8; SEED_LEN]) -> Result<Self, Error> {
        Self::new(MAX_AES_INVOCATIONS, seed)
    }

    fn next_block(&mut self) -> Result<[u8; AES256_BLOCK_LEN], Error> {
        if self.rem_invocations == 0 {
            return Err(Error::PrfExhausted);
        }
        let mut block = [0u8; AES256_BLOCK_LEN];
        block[..8].copy_from_slice(&self.ctr.to_le_bytes());

        let mut ga = GenericArray::from(block);
        self.cipher.encrypt_block(&mut ga);

        self.ctr = self.ctr.wrapping_add(1);
        self.rem_invocations -= 1;
        Ok(ga.into())
    }

    /// Fills `out` with the next bytes of the stream.
    pub(crate) fn fill(&mut self, out: &mut [u8]) -> Result<(), Error> {
        let mut len = out.len();

        // Serve short reads straight from the buffered block.
        if self.pos + len <= AES256_BLOCK_LEN {
            out.copy_from_slice(&self.buffer[self.pos..self.pos + len]);
            self.pos += len;
            return Ok(());
        }

        // Drain whatever the buffer still holds, then work block by block.
        let mut idx = AES256_BLOCK_LEN - self.pos;
        out[..idx].copy_from_slice(&self.buffer[self.pos..]);
        self.pos = AES256_BLOCK_LEN;
        len -= idx;

        while len != 0 {
            if len >= AES256_BLOCK_LEN {
                let block = self.next_block()?;
                out[idx..idx + AES256_BLOCK_LEN].copy_from_slice(&block);
                idx += AES256_BLOCK_LEN;
                len -= AES256_BLOCK_LEN;
            } else {
                self.buffer = self.next_block()?;
                out[idx..].copy_from_slice(&self.buffer[..len]);
                self.pos = len;
                len = 0;
            }
        }
        Ok(())
    }
}

// The key schedule inside `Aes256` is wiped by the aes crate's zeroize
// feature; the buffered stream bytes and counter are ours to clear.
impl Drop for AesCtrPrf {
    fn drop(&mut self) {
        self.buffer.zeroize();
        self.ctr.zeroize();
        self.pos = 0;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    // AES-256 of the all-zero block under the all-zero key, i.e. the first
    // counter block of a zero-seeded stream.
    const ZERO_KEY_BLOCK: [u8; 16] = [
        0xdc, 0x95, 0xc0, 0x78, 0xa2, 0x40, 0x89, 0x89, 0xad, 0x48, 0xa2, 0x14, 0x92, 0x84, 0x20,
        0x87,
    ];

    #[test]
    fn first_block_known_answer() {
        let seed = [0u8; SEED_LEN];
        let mut prf = AesCtrPrf::with_seed(&seed).unwrap();
        let mut out = [0u8; 16];
        prf.fill(&mut out).unwrap();
        assert_eq!(out, ZERO_KEY_BLOCK);
    }

    #[test]
    fn chunked_reads_are_contiguous() {
        let seed = [7u8; SEED_LEN];

        let mut whole = [0u8; 100];
        AesCtrPrf::with_seed(&seed).unwrap().fill(&mut whole).unwrap();

        let mut pieces = [0u8; 100];
        let mut prf = AesCtrPrf::with_seed(&seed).unwrap();
        let mut off = 0;
        for take in [1usize, 3, 16, 5, 32, 43] {
            prf.fill(&mut pieces[off..off + take]).unwrap();
            off += take;
        }
        assert_eq!(off, 100);
        assert_eq!(whole, pieces);
    }

    #[test]
    fn budget_is_enforced() {
        let seed = [0u8; SEED_LEN];
        // One invocation covers a single block; the second block must fail.
        let mut prf = AesCtrPrf::new(1, &seed).unwrap();
        let mut out = [0u8; 16];
        prf.fill(&mut out).unwrap();
        assert_eq!(prf.fill(&mut out), Err(Error::PrfExhausted));

        assert!(AesCtrPrf::new(0, &seed).is_err());
    }
}
