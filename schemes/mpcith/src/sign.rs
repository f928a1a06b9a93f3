//! Signature generation.
//!
//! One signing attempt moves through the phases
//!
//! ```text
//! Init → SeedsCommitted → H1Computed → ResponsesComputed → H2Computed → Opened → Serialized
//! ```
//!
//! Each phase owns the buffers it produced and hands them to the next one.
//! Seed trees and shares zeroize themselves on drop, so every exit path,
//! including `?` on an error, wipes them.
//!
//! Serialization can fail with `EncodingOverflow` when the relation's
//! response encoding does not fit its slot. The attempt is then discarded
//! and signing restarts with fresh randomness, at most
//! [`MAX_SIGN_ATTEMPTS`] times.

use rand::{CryptoRng, RngCore};
use tracing::{trace, warn};
use zeroize::Zeroizing;

use crate::challenge::{expand_challenge1, expand_challenge2, hash_h1, hash_h2};
use crate::commit::{commit, commit_x4};
use crate::error::{MpcithError, Result};
use crate::field::Field;
use crate::hash::{Domain, Xof};
use crate::keygen::SecretKey;
use crate::params::Params;
use crate::relation::{Relation, RepetitionResponses};
use crate::shares::{generate_shares, total, MainShares, PartyShare};
use crate::signature::{PartyContribution, RepetitionProof, Signature};
use crate::tree::SeedTree;

/// Maximum number of signing attempts before giving up.
pub const MAX_SIGN_ATTEMPTS: u32 = 16;

/// Per-repetition prover state after commitment.
struct CommittedRepetition<F: Field> {
    tree: SeedTree,
    shares: Vec<PartyShare<F>>,
    commitments: Vec<u8>,
}

/// Signs `message` with the demo scheme.
///
/// # Arguments
/// * `rng` - Cryptographically secure random number generator
/// * `params` - Engine parameters the key was generated with
/// * `message` - Message to sign
/// * `secret_key` - Encoded secret key, in either public key encoding
///
/// # Returns
/// The encoded signature, or `MalformedKey` if the key does not parse.
pub fn sign<G: RngCore + CryptoRng>(
    rng: &mut G,
    params: &Params,
    message: &[u8],
    secret_key: &[u8],
) -> Result<Vec<u8>> {
    let sk = SecretKey::from_bytes(secret_key, params)?;
    let relation = sk.public_key().relation()?;
    sign_with_relation(rng, params, &relation, sk.witness(), message)
}

/// Signs `message` proving knowledge of `witness` for `relation`.
///
/// # Arguments
/// * `rng` - Cryptographically secure random number generator
/// * `params` - Engine parameters
/// * `relation` - Public instance
/// * `witness` - Secret witness satisfying `relation`
/// * `message` - Message to sign
///
/// # Returns
/// The encoded signature. Fails with `RelationViolation` if the witness does
/// not satisfy the relation, and with `SigningFailed` if every attempt
/// overflowed its encoding.
pub fn sign_with_relation<R, G>(
    rng: &mut G,
    params: &Params,
    relation: &R,
    witness: &[R::Field],
    message: &[u8],
) -> Result<Vec<u8>>
where
    R: Relation,
    G: RngCore + CryptoRng,
{
    params.validate()?;

    for attempt in 1..=MAX_SIGN_ATTEMPTS {
        // Init: one CSPRNG draw of salt ‖ master seed
        let mut randomness = Zeroizing::new(vec![0u8; params.randomness_bytes()]);
        rng.fill_bytes(&mut randomness);

        let signature = sign_attempt(params, relation, witness, message, &randomness)?;

        match signature.to_bytes(params, relation) {
            Ok(bytes) => {
                trace!(attempt, len = bytes.len(), "signature serialized");
                return Ok(bytes);
            }
            Err(MpcithError::EncodingOverflow { context }) => {
                warn!(attempt, context, "encoding overflow, retrying with fresh randomness");
            }
            Err(e) => return Err(e),
        }
    }

    Err(MpcithError::SigningFailed {
        attempts: MAX_SIGN_ATTEMPTS,
    })
}

/// Runs one deterministic signing attempt from `salt ‖ master_seed`.
fn sign_attempt<R: Relation>(
    params: &Params,
    relation: &R,
    witness: &[R::Field],
    message: &[u8],
    randomness: &[u8],
) -> Result<Signature<R::Field>> {
    let (salt, master_seed) = randomness.split_at(params.salt_bytes);

    // Root seed of every repetition
    let mut xof = Xof::with_domain(params.digest_bytes, Domain::RootSeeds);
    xof.absorb(salt).absorb(master_seed);
    let root_seeds = Zeroizing::new(xof.digest(params.repetitions * params.security_bytes));

    // SeedsCommitted
    let reps = root_seeds
        .chunks_exact(params.security_bytes)
        .enumerate()
        .map(|(e, root)| commit_repetition(params, relation, witness, salt, e as u16, root))
        .collect::<Result<Vec<_>>>()?;
    trace!(repetitions = reps.len(), "seeds committed");

    // H1Computed: h1 = H(message ‖ instance ‖ salt ‖ commitments)
    let commitments: Vec<Vec<u8>> = reps.iter().map(|r| r.commitments.clone()).collect();
    let h1 = hash_h1(params, message, &relation.instance_bytes(), salt, &commitments);
    let challenges =
        expand_challenge1::<R::Field>(&h1, params.repetitions, relation.challenge_len());

    // ResponsesComputed
    let responses = reps
        .iter()
        .zip(&challenges)
        .map(|(rep, eps)| respond(relation, &rep.shares, eps))
        .collect::<Result<Vec<_>>>()?;

    // H2Computed: h2 = H(salt ‖ h1 ‖ responses), then the hidden parties
    let h2 = hash_h2(params, salt, &h1, &responses);
    let hidden = expand_challenge2(&h2, params.num_parties, params.repetitions);

    // Opened
    let proofs = reps
        .iter()
        .zip(responses)
        .zip(&hidden)
        .map(|((rep, resp), &h)| open_repetition(params, rep, resp, h as usize))
        .collect();

    Ok(Signature {
        salt: salt.to_vec(),
        h1,
        h2,
        proofs,
    })
}

/// Expands the tree, shares the witness and commits to every party.
fn commit_repetition<R: Relation>(
    params: &Params,
    relation: &R,
    witness: &[R::Field],
    salt: &[u8],
    repetition: u16,
    root_seed: &[u8],
) -> Result<CommittedRepetition<R::Field>> {
    let n = params.num_parties;
    let d = params.digest_bytes;
    let tree = SeedTree::expand_x4(root_seed, salt, repetition, n, params)?;
    let shares = generate_shares(relation, witness, &tree, salt, repetition, params)?;

    let leaf = |i: usize| {
        tree.leaf(i).ok_or(MpcithError::InvalidInput {
            field: "tree",
            reason: "missing leaf",
        })
    };

    let mut commitments = vec![0u8; n * d];
    let no_state: &[u8] = &[];

    // Parties 0..N−1 have no public state; commit four at a time
    let mut party = 0usize;
    while party + 4 <= n - 1 {
        let batch = commit_x4(
            [leaf(party)?, leaf(party + 1)?, leaf(party + 2)?, leaf(party + 3)?],
            [no_state; 4],
            salt,
            repetition,
            [0, 1, 2, 3].map(|k| (party + k) as u16),
            params,
        );
        for (k, c) in batch.iter().enumerate() {
            commitments[(party + k) * d..(party + k + 1) * d].copy_from_slice(c);
        }
        party += 4;
    }
    for i in party..n - 1 {
        let c = commit(leaf(i)?, &[], salt, repetition, i as u16, params);
        commitments[i * d..(i + 1) * d].copy_from_slice(&c);
    }

    // The last party binds its forced witness and correction shares
    let last = n - 1;
    let state = shares[last].state_bytes();
    let c = commit(leaf(last)?, &state, salt, repetition, last as u16, params);
    commitments[last * d..].copy_from_slice(&c);

    Ok(CommittedRepetition {
        tree,
        shares,
        commitments,
    })
}

/// Computes the plain opened value and one response per main share.
fn respond<R: Relation>(
    relation: &R,
    shares: &[PartyShare<R::Field>],
    challenge: &[R::Field],
) -> Result<RepetitionResponses<R::Field>> {
    let plain = total(relation, shares);
    let plain_alpha = relation.open_alpha(&plain, challenge, true);

    // A valid witness makes the plain check value vanish
    let plain_v = relation.check_value(&plain, challenge, &plain_alpha, true);
    if plain_v.iter().any(|v| !v.is_zero()) {
        return Err(MpcithError::RelationViolation);
    }

    let main = MainShares::aggregate(relation, shares);
    let main = main
        .dims
        .iter()
        .map(|dim| relation.evaluate_share(dim, challenge, &plain_alpha, false))
        .collect();

    Ok(RepetitionResponses { plain_alpha, main })
}

/// Reveals everything but the hidden party.
fn open_repetition<F: Field>(
    params: &Params,
    rep: &CommittedRepetition<F>,
    responses: RepetitionResponses<F>,
    hidden: usize,
) -> RepetitionProof<F> {
    let d = params.digest_bytes;
    let last = params.num_parties - 1;

    let last_party = if hidden == last {
        PartyContribution::ImplicitZero
    } else {
        PartyContribution::Explicit {
            witness: rep.shares[last].witness.clone(),
            correction: rep.shares[last].correction.clone(),
        }
    };

    RepetitionProof {
        copath: rep.tree.compute_copath(hidden),
        hidden_commitment: rep.commitments[hidden * d..(hidden + 1) * d].to_vec(),
        plain_alpha: responses.plain_alpha,
        last_party,
    }
}
