//! Fiat-Shamir transcript hashing and challenge expansion.
//!
//! ```text
//! h1 = SHAKE(H1 ‖ message ‖ instance ‖ salt ‖ commit[0][0] ‖ … ‖ commit[τ−1][N−1], D)
//! h2 = SHAKE(H2 ‖ salt ‖ h1 ‖ for each repetition:
//!                 plain_alpha ‖ for each bit p: alpha_p ‖ v_p, D)
//! ```
//!
//! Challenges are squeezed from an XOF over the digest alone.

use sha3::digest::XofReader;

use crate::field::{encode_elements, Field};
use crate::hash::{Domain, Xof, XofStream};
use crate::params::{Params, MAX_PARTIES};
use crate::relation::RepetitionResponses;

fn digest_stream(digest: &[u8]) -> XofStream {
    let mut xof = Xof::new(digest.len());
    xof.absorb(digest);
    xof.finalize()
}

/// First transcript hash over the commitments of every repetition.
///
/// `commitments[e]` holds the N digests of repetition `e` back to back.
pub fn hash_h1(
    params: &Params,
    message: &[u8],
    instance: &[u8],
    salt: &[u8],
    commitments: &[Vec<u8>],
) -> Vec<u8> {
    let mut xof = Xof::with_domain(params.digest_bytes, Domain::H1);
    xof.absorb(message).absorb(instance).absorb(salt);
    for rep in commitments {
        xof.absorb(rep);
    }
    xof.digest(params.digest_bytes)
}

/// Second transcript hash over the responses of every repetition.
pub fn hash_h2<F: Field>(
    params: &Params,
    salt: &[u8],
    h1: &[u8],
    responses: &[RepetitionResponses<F>],
) -> Vec<u8> {
    let mut xof = Xof::with_domain(params.digest_bytes, Domain::H2);
    xof.absorb(salt).absorb(h1);
    for rep in responses {
        xof.absorb(&encode_elements(&rep.plain_alpha));
        for main in &rep.main {
            xof.absorb(&encode_elements(&main.alpha))
                .absorb(&encode_elements(&main.v));
        }
    }
    xof.digest(params.digest_bytes)
}

/// Expands `h1` into `repetitions` challenge vectors of `challenge_len` elements.
pub fn expand_challenge1<F: Field>(
    h1: &[u8],
    repetitions: usize,
    challenge_len: usize,
) -> Vec<Vec<F>> {
    let mut stream = digest_stream(h1);
    let mut buf = vec![0u8; F::UNIFORM_BYTES];
    (0..repetitions)
        .map(|_| {
            (0..challenge_len)
                .map(|_| {
                    stream.read(&mut buf);
                    F::from_uniform_bytes(&buf)
                })
                .collect()
        })
        .collect()
}

/// Expands `h2` into one hidden party index per repetition.
///
/// Each index is read as 1 byte (N ≤ 256) or 2 little-endian bytes, masked
/// to the next power of two, and resampled while it is ≥ N. For N a power of
/// two the first draw is always accepted. The number of draws depends on the
/// digest; this timing variation is public.
///
/// # Panics
///
/// Panics unless `2 <= num_parties <= MAX_PARTIES`.
pub fn expand_challenge2(h2: &[u8], num_parties: usize, repetitions: usize) -> Vec<u16> {
    assert!((2..=MAX_PARTIES).contains(&num_parties), "num_parties out of range");
    let width = if num_parties <= 256 { 1 } else { 2 };
    let mask = (num_parties.next_power_of_two() - 1) as u16;
    let mut stream = digest_stream(h2);
    (0..repetitions)
        .map(|_| loop {
            let mut buf = [0u8; 2];
            stream.read(&mut buf[..width]);
            let candidate = u16::from_le_bytes(buf) & mask;
            if (candidate as usize) < num_parties {
                break candidate;
            }
        })
        .collect()
}
