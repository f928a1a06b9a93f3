//! Additive sharing of the witness across the N virtual parties.
//!
//! Parties `0..N−1` read their whole share from a random tape keyed by their
//! leaf seed:
//!
//! ```text
//! tape_i = SHAKE(Tape ‖ salt ‖ u16(repetition) ‖ u16(i) ‖ seed_i)
//! share_i = (witness[witness_len], aux[aux_len], correction[correction_len])
//! ```
//!
//! The last party only reads its auxiliary share from the tape. Its witness
//! and correction shares are forced so that the sums over all parties equal
//! the real witness and the real correction `relation.correction(w, Σ aux)`.
//! Those forced values are the only share material that travels in the
//! signature.
//!
//! Main shares aggregate the parties along the bits of their index: for each
//! bit `p` of `0..log2 N`, main share `p` is the sum of the parties whose
//! index has bit `p` unset.

use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::{MpcithError, Result};
use crate::field::{encode_elements, sample_elements, Field};
use crate::hash::{Domain, Xof, XofStream};
use crate::params::Params;
use crate::relation::Relation;
use crate::tree::SeedTree;

/// One party's additive share.
#[derive(Clone, Debug, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct PartyShare<F: Field> {
    /// Share of the witness.
    pub witness: Vec<F>,
    /// Share of the auxiliary randomness.
    pub aux: Vec<F>,
    /// Share of the correction terms.
    pub correction: Vec<F>,
}

impl<F: Field> PartyShare<F> {
    /// An all-zero share shaped for `relation`.
    pub fn zero<R: Relation<Field = F>>(relation: &R) -> Self {
        PartyShare {
            witness: vec![F::ZERO; relation.witness_len()],
            aux: vec![F::ZERO; relation.aux_len()],
            correction: vec![F::ZERO; relation.correction_len()],
        }
    }

    /// Adds `other` component-wise.
    pub fn accumulate(&mut self, other: &PartyShare<F>) {
        add_into(&mut self.witness, &other.witness);
        add_into(&mut self.aux, &other.aux);
        add_into(&mut self.correction, &other.correction);
    }

    /// State bound by the commitment: witness ‖ correction, wiped on drop.
    pub fn state_bytes(&self) -> Zeroizing<Vec<u8>> {
        let mut out = Zeroizing::new(encode_elements(&self.witness));
        out.extend_from_slice(&Zeroizing::new(encode_elements(&self.correction)));
        out
    }
}

fn add_into<F: Field>(acc: &mut [F], rhs: &[F]) {
    for (a, &b) in acc.iter_mut().zip(rhs) {
        *a += b;
    }
}

fn sub_into<F: Field>(acc: &mut [F], rhs: &[F]) {
    for (a, &b) in acc.iter_mut().zip(rhs) {
        *a -= b;
    }
}

fn random_tape(
    seed: &[u8],
    salt: &[u8],
    repetition: u16,
    party: u16,
    params: &Params,
) -> XofStream {
    let mut xof = Xof::with_domain(params.digest_bytes, Domain::Tape);
    xof.absorb(salt)
        .absorb_u16(repetition)
        .absorb_u16(party)
        .absorb(seed);
    xof.finalize()
}

/// Expands the full share of a party other than the last one.
pub fn expand_party_share<R: Relation>(
    relation: &R,
    seed: &[u8],
    salt: &[u8],
    repetition: u16,
    party: u16,
    params: &Params,
) -> PartyShare<R::Field> {
    let mut tape = random_tape(seed, salt, repetition, party, params);
    PartyShare {
        witness: sample_elements(&mut tape, relation.witness_len()),
        aux: sample_elements(&mut tape, relation.aux_len()),
        correction: sample_elements(&mut tape, relation.correction_len()),
    }
}

/// Rebuilds the last party's share from its seed and its opened state.
pub fn last_party_share<R: Relation>(
    relation: &R,
    seed: &[u8],
    salt: &[u8],
    repetition: u16,
    witness: &[R::Field],
    correction: &[R::Field],
    params: &Params,
) -> PartyShare<R::Field> {
    let last = (params.num_parties - 1) as u16;
    let mut tape = random_tape(seed, salt, repetition, last, params);
    PartyShare {
        witness: witness.to_vec(),
        aux: sample_elements(&mut tape, relation.aux_len()),
        correction: correction.to_vec(),
    }
}

/// Generates all N shares of one repetition from the leaves of `tree`.
pub fn generate_shares<R: Relation>(
    relation: &R,
    witness: &[R::Field],
    tree: &SeedTree,
    salt: &[u8],
    repetition: u16,
    params: &Params,
) -> Result<Vec<PartyShare<R::Field>>> {
    if witness.len() != relation.witness_len() {
        return Err(MpcithError::InvalidInput {
            field: "witness",
            reason: "wrong length",
        });
    }
    let n = params.num_parties;
    if tree.num_leaves() != n {
        return Err(MpcithError::InvalidInput {
            field: "tree",
            reason: "leaf count differs from num_parties",
        });
    }
    let leaf = |i: usize| {
        tree.leaf(i).ok_or(MpcithError::InvalidInput {
            field: "tree",
            reason: "missing leaf",
        })
    };

    let mut shares = Vec::with_capacity(n);
    for i in 0..n - 1 {
        let share = expand_party_share(relation, leaf(i)?, salt, repetition, i as u16, params);
        shares.push(share);
    }

    let last_seed = leaf(n - 1)?;
    let mut last = last_party_share(relation, last_seed, salt, repetition, witness, &[], params);

    let mut aux = Zeroizing::new(last.aux.clone());
    for share in &shares {
        add_into(&mut aux, &share.aux);
    }
    let correction = Zeroizing::new(relation.correction(witness, &aux));
    if correction.len() != relation.correction_len() {
        return Err(MpcithError::InvalidInput {
            field: "correction",
            reason: "relation returned wrong length",
        });
    }

    last.correction = correction.to_vec();
    for share in &shares {
        sub_into(&mut last.witness, &share.witness);
        sub_into(&mut last.correction, &share.correction);
    }
    shares.push(last);
    Ok(shares)
}

/// Sum of every share in `shares`.
pub fn total<R: Relation>(relation: &R, shares: &[PartyShare<R::Field>]) -> PartyShare<R::Field> {
    let mut acc = PartyShare::zero(relation);
    for share in shares {
        acc.accumulate(share);
    }
    acc
}

/// The `log2 N` hypercube aggregates of one repetition.
#[derive(Clone, Debug, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct MainShares<F: Field> {
    /// Aggregate per index bit.
    pub dims: Vec<PartyShare<F>>,
}

impl<F: Field> MainShares<F> {
    /// For each bit `p`, sums the shares whose index has bit `p` unset.
    pub fn aggregate<R: Relation<Field = F>>(relation: &R, shares: &[PartyShare<F>]) -> Self {
        let depth = shares.len().trailing_zeros() as usize;
        let dims = (0..depth)
            .map(|p| {
                let mut acc = PartyShare::zero(relation);
                for (i, share) in shares.iter().enumerate() {
                    if (i >> p) & 1 == 0 {
                        acc.accumulate(share);
                    }
                }
                acc
            })
            .collect();
        MainShares { dims }
    }

    /// Verifier-side aggregates that avoid the hidden party.
    ///
    /// For each bit `p`, sums the known shares whose bit `p` differs from the
    /// hidden index's bit `p`. When the hidden bit is 1 this is exactly main
    /// share `p`; when it is 0 it is the complement of main share `p`.
    pub fn known_side<R: Relation<Field = F>>(
        relation: &R,
        shares: &[Option<PartyShare<F>>],
        hidden: usize,
    ) -> Self {
        let depth = shares.len().trailing_zeros() as usize;
        let dims = (0..depth)
            .map(|p| {
                let hidden_bit = (hidden >> p) & 1;
                let mut acc = PartyShare::zero(relation);
                for (i, share) in shares.iter().enumerate() {
                    if let Some(share) = share {
                        if (i >> p) & 1 != hidden_bit {
                            acc.accumulate(share);
                        }
                    }
                }
                acc
            })
            .collect();
        MainShares { dims }
    }
}
