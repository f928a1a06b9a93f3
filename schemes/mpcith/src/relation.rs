//! The relation interface the engine proves knowledge of a witness for.
//!
//! A relation exposes its dimensions, a plain check used at key generation,
//! and a two-step shared evaluation:
//!
//! 1. `open_alpha` maps a share to its contribution to the opened value
//!    `alpha`. It must be affine in the share: summing over all parties with
//!    the offset applied to exactly one of them gives `open_alpha` of the
//!    summed share.
//! 2. `check_value` maps a share and the full opened `alpha` to its
//!    contribution to the check value `v`, again affine in the share.
//!
//! For an honest prover the plain check value is zero. The engine relies on
//! these two homomorphisms and nothing else.

use crate::error::{MpcithError, Result};
use crate::field::{decode_elements, Field};
use crate::shares::PartyShare;

/// One party's (or one aggregate's) contribution to the consistency check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartialResponse<F: Field> {
    /// Contribution to the opened value.
    pub alpha: Vec<F>,
    /// Contribution to the check value.
    pub v: Vec<F>,
}

/// The responses of one repetition that feed the second transcript hash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepetitionResponses<F: Field> {
    /// The opened value `alpha` of the plain (summed) share.
    pub plain_alpha: Vec<F>,
    /// One response per main share.
    pub main: Vec<PartialResponse<F>>,
}

/// A public relation with a shared evaluation.
pub trait Relation {
    /// Field the relation is defined over.
    type Field: Field;

    /// Number of witness elements.
    fn witness_len(&self) -> usize;

    /// Number of auxiliary random elements.
    fn aux_len(&self) -> usize;

    /// Number of correction elements.
    fn correction_len(&self) -> usize;

    /// Number of first-challenge elements per repetition.
    fn challenge_len(&self) -> usize;

    /// Number of elements in the opened value `alpha`.
    fn response_len(&self) -> usize;

    /// Number of elements in the check value `v`.
    fn check_len(&self) -> usize;

    /// Canonical encoding of the public instance, absorbed into `h1`.
    fn instance_bytes(&self) -> Vec<u8>;

    /// Returns true if `witness` satisfies the relation.
    fn evaluate_plain(&self, witness: &[Self::Field]) -> bool;

    /// Correction terms for `witness` and the summed auxiliary values.
    fn correction(&self, witness: &[Self::Field], aux: &[Self::Field]) -> Vec<Self::Field>;

    /// Contribution of `share` to `alpha`.
    fn open_alpha(
        &self,
        share: &PartyShare<Self::Field>,
        challenge: &[Self::Field],
        with_offset: bool,
    ) -> Vec<Self::Field>;

    /// Contribution of `share` to `v`, given the full opened `alpha`.
    fn check_value(
        &self,
        share: &PartyShare<Self::Field>,
        challenge: &[Self::Field],
        alpha: &[Self::Field],
        with_offset: bool,
    ) -> Vec<Self::Field>;

    /// Evaluates both steps on one share.
    fn evaluate_share(
        &self,
        share: &PartyShare<Self::Field>,
        challenge: &[Self::Field],
        alpha: &[Self::Field],
        with_offset: bool,
    ) -> PartialResponse<Self::Field> {
        PartialResponse {
            alpha: self.open_alpha(share, challenge, with_offset),
            v: self.check_value(share, challenge, alpha, with_offset),
        }
    }

    /// Fixed wire allotment for the opened `alpha`.
    fn response_bytes(&self) -> usize {
        self.response_len() * <Self::Field as Field>::BYTES
    }

    /// Encodes `alpha` into its fixed slot.
    ///
    /// Relations with a compressed encoding report
    /// [`MpcithError::EncodingOverflow`] when a value does not fit; the
    /// signer then retries with fresh randomness.
    fn encode_response(&self, alpha: &[Self::Field], out: &mut [u8]) -> Result<()> {
        let width = <Self::Field as Field>::BYTES;
        if alpha.len() * width > out.len() {
            return Err(MpcithError::EncodingOverflow { context: "alpha" });
        }
        out.fill(0);
        for (e, chunk) in alpha.iter().zip(out.chunks_exact_mut(width)) {
            e.write_bytes(chunk);
        }
        Ok(())
    }

    /// Decodes the fixed slot written by [`Relation::encode_response`].
    fn decode_response(&self, bytes: &[u8]) -> Result<Vec<Self::Field>> {
        let width = <Self::Field as Field>::BYTES;
        let used = self.response_len() * width;
        if bytes.len() != self.response_bytes() || used > bytes.len() {
            return Err(MpcithError::MalformedSignature {
                reason: "response slot has wrong length",
            });
        }
        if bytes[used..].iter().any(|&b| b != 0) {
            return Err(MpcithError::MalformedSignature {
                reason: "non-zero response padding",
            });
        }
        decode_elements(&bytes[..used], self.response_len()).ok_or(
            MpcithError::MalformedSignature {
                reason: "response element out of range",
            },
        )
    }
}
