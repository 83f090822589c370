use thiserror::Error;

/// Errors surfaced by the KEM operations.
///
/// Decoding failure is deliberately absent from the public surface of
/// decapsulation: a bad ciphertext yields the implicitly-rejected shared
/// secret, not an error, so callers (and observers) cannot distinguish it
/// from a success.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The AES-256-CTR PRF ran out of its invocation budget before the
    /// rejection sampler accepted enough values. Statistically unreachable
    /// for the shipped parameter set; treat as a programming error.
    #[error("AES-CTR PRF invocation budget exhausted")]
    PrfExhausted,

    /// The bit-flipping decoder did not reach a zero syndrome. Internal to
    /// decapsulation, which converts it into an implicit rejection.
    #[error("syndrome decoding failure")]
    DecodingFailure,
}
