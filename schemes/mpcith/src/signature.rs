//! Signature structure and wire format.
//!
//! ```text
//! salt[salt_bytes] ‖ h1[D] ‖ h2[D] ‖ τ × {
//!     copath[log2(N)·S] ‖ hidden_commit[D] ‖ plain_alpha[response_bytes] ‖
//!     last_party[(witness_len + correction_len)·|F|]
//! }
//! ```
//!
//! The last-party slot carries the forced witness and correction shares of
//! party N−1. When N−1 is the hidden party those shares must not be sent, and
//! the slot is all zero; parsing rejects any other content there.

use crate::challenge::expand_challenge2;
use crate::error::{MpcithError, Result};
use crate::field::{decode_elements, encode_elements, Field};
use crate::params::Params;
use crate::relation::Relation;

/// What the signature reveals about the last party of a repetition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PartyContribution<F: Field> {
    /// The forced shares of party N−1.
    Explicit {
        /// Witness share of the last party.
        witness: Vec<F>,
        /// Correction share of the last party.
        correction: Vec<F>,
    },
    /// Party N−1 is hidden; nothing is revealed.
    ImplicitZero,
}

/// Opening of one repetition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepetitionProof<F: Field> {
    /// Sibling seeds along the hidden party's path, leaf level first.
    pub copath: Vec<u8>,
    /// Commitment of the hidden party.
    pub hidden_commitment: Vec<u8>,
    /// Opened value of the plain (summed) share.
    pub plain_alpha: Vec<F>,
    /// Last-party state.
    pub last_party: PartyContribution<F>,
}

/// A complete MPC-in-the-Head signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature<F: Field> {
    /// Per-signature salt.
    pub salt: Vec<u8>,
    /// First transcript hash.
    pub h1: Vec<u8>,
    /// Second transcript hash.
    pub h2: Vec<u8>,
    /// One opening per repetition.
    pub proofs: Vec<RepetitionProof<F>>,
}

/// Size of the last-party slot in bytes.
pub fn last_party_bytes<R: Relation>(relation: &R) -> usize {
    (relation.witness_len() + relation.correction_len()) * <R::Field as Field>::BYTES
}

/// Size of one repetition's opening in bytes.
pub fn repetition_bytes<R: Relation>(params: &Params, relation: &R) -> usize {
    params.copath_bytes()
        + params.digest_bytes
        + relation.response_bytes()
        + last_party_bytes(relation)
}

/// Total signature size in bytes.
pub fn signature_bytes<R: Relation>(params: &Params, relation: &R) -> usize {
    params.header_bytes() + params.repetitions * repetition_bytes(params, relation)
}

fn malformed(reason: &'static str) -> MpcithError {
    MpcithError::MalformedSignature { reason }
}

impl<F: Field> Signature<F> {
    /// Serializes into the fixed-size wire format.
    ///
    /// Fails with [`MpcithError::EncodingOverflow`] when the relation cannot
    /// fit an opened value into its slot.
    pub fn to_bytes<R: Relation<Field = F>>(
        &self,
        params: &Params,
        relation: &R,
    ) -> Result<Vec<u8>> {
        if self.salt.len() != params.salt_bytes
            || self.h1.len() != params.digest_bytes
            || self.h2.len() != params.digest_bytes
            || self.proofs.len() != params.repetitions
        {
            return Err(MpcithError::InvalidInput {
                field: "signature",
                reason: "header does not match parameters",
            });
        }

        let mut out = Vec::with_capacity(signature_bytes(params, relation));
        out.extend_from_slice(&self.salt);
        out.extend_from_slice(&self.h1);
        out.extend_from_slice(&self.h2);

        for proof in &self.proofs {
            if proof.copath.len() != params.copath_bytes()
                || proof.hidden_commitment.len() != params.digest_bytes
            {
                return Err(MpcithError::InvalidInput {
                    field: "proof",
                    reason: "co-path or commitment has wrong length",
                });
            }
            out.extend_from_slice(&proof.copath);
            out.extend_from_slice(&proof.hidden_commitment);

            let start = out.len();
            out.resize(start + relation.response_bytes(), 0);
            relation.encode_response(&proof.plain_alpha, &mut out[start..])?;

            match &proof.last_party {
                PartyContribution::Explicit {
                    witness,
                    correction,
                } => {
                    if witness.len() != relation.witness_len()
                        || correction.len() != relation.correction_len()
                    {
                        return Err(MpcithError::InvalidInput {
                            field: "last_party",
                            reason: "share has wrong length",
                        });
                    }
                    out.extend_from_slice(&encode_elements(witness));
                    out.extend_from_slice(&encode_elements(correction));
                }
                PartyContribution::ImplicitZero => {
                    out.resize(out.len() + last_party_bytes(relation), 0);
                }
            }
        }
        Ok(out)
    }

    /// Parses the wire format.
    pub fn from_bytes<R: Relation<Field = F>>(
        bytes: &[u8],
        params: &Params,
        relation: &R,
    ) -> Result<Self> {
        Self::parse_with_challenge(bytes, params, relation).map(|(sig, _)| sig)
    }

    /// Parses the wire format and returns the hidden index of every repetition.
    ///
    /// The last-party slot is decoded according to the hidden index derived
    /// from `h2`, so a repetition hiding party N−1 must carry an all-zero slot.
    pub(crate) fn parse_with_challenge<R: Relation<Field = F>>(
        bytes: &[u8],
        params: &Params,
        relation: &R,
    ) -> Result<(Self, Vec<u16>)> {
        params.validate()?;
        if bytes.len() != signature_bytes(params, relation) {
            return Err(malformed("wrong length"));
        }

        let (salt, rest) = bytes.split_at(params.salt_bytes);
        let (h1, rest) = rest.split_at(params.digest_bytes);
        let (h2, mut rest) = rest.split_at(params.digest_bytes);

        let hidden = expand_challenge2(h2, params.num_parties, params.repetitions);
        let last_index = (params.num_parties - 1) as u16;
        let slot = last_party_bytes(relation);
        let wit_bytes = relation.witness_len() * F::BYTES;

        let mut proofs = Vec::with_capacity(params.repetitions);
        for &h in &hidden {
            let (copath, r) = rest.split_at(params.copath_bytes());
            let (hidden_commitment, r) = r.split_at(params.digest_bytes);
            let (alpha, r) = r.split_at(relation.response_bytes());
            let (last, r) = r.split_at(slot);
            rest = r;

            let plain_alpha = relation.decode_response(alpha)?;
            let last_party = if h == last_index {
                if last.iter().any(|&b| b != 0) {
                    return Err(malformed("non-zero implicit party slot"));
                }
                PartyContribution::ImplicitZero
            } else {
                let (w, c) = last.split_at(wit_bytes);
                PartyContribution::Explicit {
                    witness: decode_elements(w, relation.witness_len())
                        .ok_or(malformed("last party witness out of range"))?,
                    correction: decode_elements(c, relation.correction_len())
                        .ok_or(malformed("last party correction out of range"))?,
                }
            };

            proofs.push(RepetitionProof {
                copath: copath.to_vec(),
                hidden_commitment: hidden_commitment.to_vec(),
                plain_alpha,
                last_party,
            });
        }

        let sig = Signature {
            salt: salt.to_vec(),
            h1: h1.to_vec(),
            h2: h2.to_vec(),
            proofs,
        };
        Ok((sig, hidden))
    }
}
