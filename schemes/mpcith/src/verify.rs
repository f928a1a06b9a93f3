//! Signature verification.
//!
//! The verifier rebuilds every party except the hidden one, recomputes all
//! commitments and main-share responses, and accepts if both transcript
//! hashes match the ones carried in the signature.

use subtle::ConstantTimeEq;
use tracing::debug;

use crate::challenge::{expand_challenge1, hash_h1, hash_h2};
use crate::commit::commit;
use crate::error::{MpcithError, Result};
use crate::keygen::PublicKey;
use crate::params::Params;
use crate::relation::{PartialResponse, Relation, RepetitionResponses};
use crate::shares::{expand_party_share, last_party_share, MainShares, PartyShare};
use crate::signature::{PartyContribution, RepetitionProof, Signature};
use crate::tree::SeedTree;

/// Verifies a demo-scheme signature.
///
/// # Arguments
/// * `params` - Engine parameters the key was generated with
/// * `message` - The signed message
/// * `signature` - Encoded signature
/// * `public_key` - Encoded public key, compact or expanded
///
/// # Returns
/// `true` if the signature is valid, `false` otherwise.
pub fn verify(params: &Params, message: &[u8], signature: &[u8], public_key: &[u8]) -> bool {
    let relation = match PublicKey::from_bytes(public_key, params).and_then(|pk| pk.relation()) {
        Ok(relation) => relation,
        Err(e) => {
            debug!(error = %e, "public key rejected");
            return false;
        }
    };
    verify_with_relation(params, &relation, message, signature)
}

/// Verifies `signature` on `message` against `relation`.
///
/// # Arguments
/// * `params` - Engine parameters
/// * `relation` - Public instance
/// * `message` - The signed message
/// * `signature` - Encoded signature
///
/// # Returns
/// `true` if the signature is valid. The reason for a rejection is only
/// logged at debug level.
pub fn verify_with_relation<R: Relation>(
    params: &Params,
    relation: &R,
    message: &[u8],
    signature: &[u8],
) -> bool {
    match check_signature(params, relation, message, signature) {
        Ok(()) => true,
        Err(e) => {
            debug!(error = %e, "signature rejected");
            false
        }
    }
}

fn check_signature<R: Relation>(
    params: &Params,
    relation: &R,
    message: &[u8],
    bytes: &[u8],
) -> Result<()> {
    let (sig, hidden) = Signature::<R::Field>::parse_with_challenge(bytes, params, relation)?;
    let challenges =
        expand_challenge1::<R::Field>(&sig.h1, params.repetitions, relation.challenge_len());

    let mut commitments = Vec::with_capacity(params.repetitions);
    let mut responses = Vec::with_capacity(params.repetitions);
    for (e, ((proof, &h), eps)) in sig.proofs.iter().zip(&hidden).zip(&challenges).enumerate() {
        let (c, r) = replay_repetition(params, relation, &sig.salt, e as u16, proof, h, eps)?;
        commitments.push(c);
        responses.push(r);
    }

    // Recompute h1' = H(message ‖ instance ‖ salt ‖ commitments)
    let h1 = hash_h1(params, message, &relation.instance_bytes(), &sig.salt, &commitments);
    if !bool::from(h1.ct_eq(&sig.h1)) {
        return Err(MpcithError::TranscriptMismatch { stage: "h1" });
    }

    // Recompute h2' = H(salt ‖ h1 ‖ responses)
    let h2 = hash_h2(params, &sig.salt, &sig.h1, &responses);
    if !bool::from(h2.ct_eq(&sig.h2)) {
        return Err(MpcithError::TranscriptMismatch { stage: "h2" });
    }
    Ok(())
}

/// Rebuilds the commitments and responses of one repetition.
fn replay_repetition<R: Relation>(
    params: &Params,
    relation: &R,
    salt: &[u8],
    repetition: u16,
    proof: &RepetitionProof<R::Field>,
    hidden: u16,
    challenge: &[R::Field],
) -> Result<(Vec<u8>, RepetitionResponses<R::Field>)> {
    let n = params.num_parties;
    let d = params.digest_bytes;
    let hidden = hidden as usize;
    let last = n - 1;

    let tree = SeedTree::expand_partial(&proof.copath, salt, repetition, n, hidden, params)?;
    let leaf = |i: usize| {
        tree.leaf(i).ok_or(MpcithError::MalformedSignature {
            reason: "co-path does not rebuild every open party",
        })
    };

    let mut shares: Vec<Option<PartyShare<R::Field>>> = Vec::with_capacity(n);
    let mut commitments = vec![0u8; n * d];
    for i in 0..n {
        let slot = &mut commitments[i * d..(i + 1) * d];
        if i == hidden {
            slot.copy_from_slice(&proof.hidden_commitment);
            shares.push(None);
            continue;
        }
        let seed = leaf(i)?;
        if i < last {
            slot.copy_from_slice(&commit(seed, &[], salt, repetition, i as u16, params));
            let share = expand_party_share(relation, seed, salt, repetition, i as u16, params);
            shares.push(Some(share));
        } else {
            let PartyContribution::Explicit {
                witness,
                correction,
            } = &proof.last_party
            else {
                return Err(MpcithError::MalformedSignature {
                    reason: "missing last party state",
                });
            };
            let share =
                last_party_share(relation, seed, salt, repetition, witness, correction, params);
            let state = share.state_bytes();
            slot.copy_from_slice(&commit(seed, &state, salt, repetition, i as u16, params));
            shares.push(Some(share));
        }
    }

    // Main share p is known outright when bit p of the hidden index is set.
    // Otherwise its complement is known and the response follows from
    // alpha_p = plain_alpha − alpha(K_p) and v_p = −v(K_p).
    let plain_alpha = &proof.plain_alpha;
    let known = MainShares::known_side(relation, &shares, hidden);
    let main = known
        .dims
        .iter()
        .enumerate()
        .map(|(p, side)| {
            if (hidden >> p) & 1 == 1 {
                relation.evaluate_share(side, challenge, plain_alpha, false)
            } else {
                let r = relation.evaluate_share(side, challenge, plain_alpha, true);
                PartialResponse {
                    alpha: plain_alpha.iter().zip(&r.alpha).map(|(&a, &b)| a - b).collect(),
                    v: r.v.iter().map(|&v| -v).collect(),
                }
            }
        })
        .collect();

    Ok((
        commitments,
        RepetitionResponses {
            plain_alpha: plain_alpha.clone(),
            main,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bilinear::BilinearRelation;
    use crate::field::{encode_elements, Field, Gf251, Gf256};
    use crate::params::{PARAMS_L1_N16, PARAMS_TEST};
    use crate::sign::sign_with_relation;
    use crate::signature::{last_party_bytes, repetition_bytes};
    use rand::rngs::OsRng;

    fn instance<F: Field>(params: &Params) -> (BilinearRelation<F>, Vec<F>) {
        BilinearRelation::random_instance(b"verify", 5, 7, params)
    }

    fn signed(params: &Params) -> (BilinearRelation<Gf251>, Vec<u8>) {
        let (relation, witness) = instance(params);
        let sig = sign_with_relation(&mut OsRng, params, &relation, &witness, b"verify me").unwrap();
        (relation, sig)
    }

    #[test]
    fn test_completeness_gf251() {
        for p in [PARAMS_TEST, PARAMS_L1_N16] {
            let (relation, sig) = signed(&p);
            assert!(verify_with_relation(&p, &relation, b"verify me", &sig));
        }
    }

    #[test]
    fn test_completeness_gf256() {
        let p = PARAMS_L1_N16;
        let (relation, witness) = instance::<Gf256>(&p);
        for _ in 0..3 {
            let sig = sign_with_relation(&mut OsRng, &p, &relation, &witness, b"m").unwrap();
            assert!(verify_with_relation(&p, &relation, b"m", &sig));
        }
    }

    #[test]
    fn test_rejects_wrong_message() {
        let p = PARAMS_TEST;
        let (relation, sig) = signed(&p);
        assert!(!verify_with_relation(&p, &relation, b"verify mf", &sig));
        assert!(!verify_with_relation(&p, &relation, b"", &sig));
    }

    #[test]
    fn test_rejects_wrong_instance() {
        let p = PARAMS_TEST;
        let (_, sig) = signed(&p);
        let (other, _) = BilinearRelation::<Gf251>::random_instance(b"other", 5, 7, &p);
        assert!(!verify_with_relation(&p, &other, b"verify me", &sig));
    }

    #[test]
    fn test_rejects_wrong_length() {
        let p = PARAMS_TEST;
        let (relation, sig) = signed(&p);
        assert!(!verify_with_relation(&p, &relation, b"verify me", &sig[..sig.len() - 1]));
        let mut longer = sig.clone();
        longer.push(0);
        assert!(!verify_with_relation(&p, &relation, b"verify me", &longer));
        assert!(!verify_with_relation(&p, &relation, b"verify me", &[]));
    }

    #[test]
    fn test_rejects_every_single_bit_flip() {
        let p = PARAMS_TEST;
        let (relation, sig) = signed(&p);
        for i in 0..sig.len() {
            let mut bad = sig.clone();
            bad[i] ^= 0x01;
            assert!(
                !verify_with_relation(&p, &relation, b"verify me", &bad),
                "flip at byte {} accepted",
                i
            );
        }
    }

    #[test]
    fn test_rejects_nonzero_implicit_slot() {
        let p = PARAMS_TEST;
        let (relation, witness) = instance::<Gf251>(&p);
        let last = (p.num_parties - 1) as u16;

        // Sign until some repetition hides the last party
        for _ in 0..64 {
            let sig = sign_with_relation(&mut OsRng, &p, &relation, &witness, b"m").unwrap();
            let (_, hidden) = Signature::parse_with_challenge(&sig, &p, &relation).unwrap();
            let Some(e) = hidden.iter().position(|&h| h == last) else {
                continue;
            };

            let slot_end = p.header_bytes() + (e + 1) * repetition_bytes(&p, &relation);
            let slot_start = slot_end - last_party_bytes(&relation);
            assert!(sig[slot_start..slot_end].iter().all(|&b| b == 0));

            let mut bad = sig.clone();
            bad[slot_start] = 1;
            let err = check_signature(&p, &relation, b"m", &bad).unwrap_err();
            assert_eq!(
                err,
                MpcithError::MalformedSignature {
                    reason: "non-zero implicit party slot"
                }
            );
            return;
        }
        panic!("no repetition hid the last party");
    }

    #[test]
    fn test_rejection_reasons() {
        let p = PARAMS_TEST;
        let (relation, sig) = signed(&p);

        let err = check_signature(&p, &relation, b"other", &sig).unwrap_err();
        assert_eq!(err, MpcithError::TranscriptMismatch { stage: "h1" });

        // The recomputed commitments still hash to the original h1
        let mut bad = sig.clone();
        bad[p.salt_bytes] ^= 0x80;
        let err = check_signature(&p, &relation, b"verify me", &bad).unwrap_err();
        assert_eq!(err, MpcithError::TranscriptMismatch { stage: "h1" });

        let mut bad = sig;
        bad.truncate(10);
        assert!(matches!(
            check_signature(&p, &relation, b"verify me", &bad),
            Err(MpcithError::MalformedSignature { .. })
        ));
    }

    #[test]
    fn test_tampered_plain_alpha_breaks_h2() {
        let p = PARAMS_L1_N16;
        let (relation, sig) = signed(&p);
        let mut parsed = Signature::from_bytes(&sig, &p, &relation).unwrap();
        parsed.proofs[0].plain_alpha[0] += Gf251::ONE;
        let bad = parsed.to_bytes(&p, &relation).unwrap();
        let err = check_signature(&p, &relation, b"verify me", &bad).unwrap_err();
        assert_eq!(err, MpcithError::TranscriptMismatch { stage: "h2" });
    }

    #[test]
    fn test_state_encoding_matches_signature_slot() {
        let p = PARAMS_L1_N16;
        let (relation, sig) = signed(&p);
        let parsed = Signature::from_bytes(&sig, &p, &relation).unwrap();
        for proof in &parsed.proofs {
            if let PartyContribution::Explicit {
                witness,
                correction,
            } = &proof.last_party
            {
                let mut state = encode_elements(witness);
                state.extend_from_slice(&encode_elements(correction));
                assert_eq!(state.len(), last_party_bytes(&relation));
            }
        }
    }
}
