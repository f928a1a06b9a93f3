//! Integration tests for the MPC-in-the-Head signature engine.

use pqsigs_mpcith::{
    bilinear::BilinearRelation,
    error::MpcithError,
    field::{Field, Gf251, Gf256},
    keygen::{keygen, KeyEncoding, PublicKey, SecretKey, DEMO_ROWS},
    params::{Params, PARAMS_L1_N16, PARAMS_L1_N256, PARAMS_L3_N16, PARAMS_L5_N16, PARAMS_TEST},
    relation::Relation,
    sign::{sign, sign_with_relation},
    signature::{signature_bytes, Signature},
    verify::{verify, verify_with_relation},
};
use rand::rngs::OsRng;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use sha3::{
    digest::{ExtendableOutput, Update, XofReader},
    Shake256,
};

const ALL_PARAMS: [Params; 5] = [
    PARAMS_TEST,
    PARAMS_L1_N16,
    PARAMS_L1_N256,
    PARAMS_L3_N16,
    PARAMS_L5_N16,
];

fn flip_first_byte(v: &mut [u8]) {
    if let Some(b) = v.first_mut() {
        *b ^= 0x01;
    }
}

/// A small bilinear instance with a known witness, built from public parts.
fn toy_instance<F: Field>(seed: &[u8], params: &Params) -> (BilinearRelation<F>, Vec<F>) {
    let cols = 6;
    let rows = 4;
    let witness: Vec<F> = (0..cols)
        .map(|i| {
            let mut bytes = vec![0u8; F::UNIFORM_BYTES];
            bytes[0] = 3 + 7 * i as u8;
            F::from_uniform_bytes(&bytes)
        })
        .collect();
    let zero = vec![F::ZERO; rows];
    let seeded = BilinearRelation::from_seed(seed, zero, rows, cols, params).unwrap();
    let target = seeded.image(&witness);
    let relation = BilinearRelation::new(
        rows,
        cols,
        seeded.matrix_a().to_vec(),
        seeded.matrix_b().to_vec(),
        target,
    )
    .unwrap();
    (relation, witness)
}

// ============================================================================
// Completeness Tests
// ============================================================================

#[test]
fn sign_then_verify_all_parameter_sets() {
    for params in ALL_PARAMS {
        let (pk, sk) = keygen(&mut OsRng, params).expect("keygen should succeed");
        let msg = b"mpcith demo message";

        let sig = sign(&mut OsRng, &params, msg, &sk.to_bytes()).expect("sign should succeed");
        let relation = pk.relation().unwrap();
        assert_eq!(sig.len(), signature_bytes(&params, &relation));
        assert!(
            verify(&params, msg, &sig, &pk.to_bytes()),
            "level {} N={} failed",
            params.security_level,
            params.num_parties
        );
    }
}

#[test]
fn sign_then_verify_generic_relation_gf256() {
    let params = PARAMS_L1_N16;
    let (relation, witness) = toy_instance::<Gf256>(b"gf256 instance", &params);
    assert!(relation.evaluate_plain(&witness));

    for msg in [&b""[..], b"a", b"a somewhat longer message for the engine"] {
        let sig = sign_with_relation(&mut OsRng, &params, &relation, &witness, msg).unwrap();
        assert!(verify_with_relation(&params, &relation, msg, &sig));
    }
}

#[test]
fn signatures_are_randomized() {
    let (pk, sk) = keygen(&mut OsRng, PARAMS_TEST).unwrap();
    let sk_bytes = sk.to_bytes();
    let sig1 = sign(&mut OsRng, &PARAMS_TEST, b"same", &sk_bytes).unwrap();
    let sig2 = sign(&mut OsRng, &PARAMS_TEST, b"same", &sk_bytes).unwrap();

    assert_ne!(sig1, sig2);
    assert!(verify(&PARAMS_TEST, b"same", &sig1, &pk.to_bytes()));
    assert!(verify(&PARAMS_TEST, b"same", &sig2, &pk.to_bytes()));
}

// ============================================================================
// Soundness / Tamper Tests
// ============================================================================

#[test]
fn verify_rejects_when_message_changes() {
    let (pk, sk) = keygen(&mut OsRng, PARAMS_L1_N16).unwrap();

    let msg_ok = b"original message";
    let mut msg_bad = msg_ok.to_vec();
    msg_bad[0] ^= 0xFF;

    let sig = sign(&mut OsRng, &PARAMS_L1_N16, msg_ok, &sk.to_bytes()).unwrap();
    assert!(verify(&PARAMS_L1_N16, msg_ok, &sig, &pk.to_bytes()));
    assert!(!verify(&PARAMS_L1_N16, &msg_bad, &sig, &pk.to_bytes()));
}

#[test]
fn verify_rejects_tampered_regions() {
    let params = PARAMS_L1_N16;
    let (pk, sk) = keygen(&mut OsRng, params).unwrap();
    let pk_bytes = pk.to_bytes();
    let msg = b"tamper";
    let sig = sign(&mut OsRng, &params, msg, &sk.to_bytes()).unwrap();

    let header = params.header_bytes();
    let regions = [
        ("salt", 0),
        ("h1", params.salt_bytes),
        ("h2", params.salt_bytes + params.digest_bytes),
        ("first co-path", header),
        ("first hidden commitment", header + params.copath_bytes()),
        ("last byte", sig.len() - 1),
    ];
    for (name, offset) in regions {
        let mut bad = sig.clone();
        flip_first_byte(&mut bad[offset..]);
        assert!(!verify(&params, msg, &bad, &pk_bytes), "{} tamper accepted", name);
    }
}

#[test]
fn verify_rejects_wrong_key() {
    let (_, sk) = keygen(&mut OsRng, PARAMS_TEST).unwrap();
    let (other_pk, _) = keygen(&mut OsRng, PARAMS_TEST).unwrap();
    let sig = sign(&mut OsRng, &PARAMS_TEST, b"msg", &sk.to_bytes()).unwrap();
    assert!(!verify(&PARAMS_TEST, b"msg", &sig, &other_pk.to_bytes()));
}

#[test]
fn verify_rejects_wrong_params() {
    let (pk, sk) = keygen(&mut OsRng, PARAMS_L1_N16).unwrap();
    let sig = sign(&mut OsRng, &PARAMS_L1_N16, b"msg", &sk.to_bytes()).unwrap();
    assert!(!verify(&PARAMS_L1_N256, b"msg", &sig, &pk.to_bytes()));
}

#[test]
fn verify_rejects_garbage() {
    let (pk, _) = keygen(&mut OsRng, PARAMS_TEST).unwrap();
    let relation = pk.relation().unwrap();
    let len = signature_bytes(&PARAMS_TEST, &relation);

    assert!(!verify(&PARAMS_TEST, b"msg", &[], &pk.to_bytes()));
    assert!(!verify(&PARAMS_TEST, b"msg", &vec![0u8; len], &pk.to_bytes()));
    assert!(!verify(&PARAMS_TEST, b"msg", &vec![0xAA; len], &pk.to_bytes()));
    assert!(!verify(&PARAMS_TEST, b"msg", &vec![0u8; len], &[0u8; 3]));
}

#[test]
fn sign_rejects_malformed_secret_key() {
    let (_, sk) = keygen(&mut OsRng, PARAMS_TEST).unwrap();
    let mut bytes = sk.to_bytes().to_vec();
    let last = bytes.len() - 1;
    bytes[last] = ((bytes[last] as u16 + 1) % 251) as u8;

    let err = sign(&mut OsRng, &PARAMS_TEST, b"msg", &bytes).unwrap_err();
    assert!(matches!(err, MpcithError::MalformedKey { .. }));

    let err = sign(&mut OsRng, &PARAMS_TEST, b"msg", &bytes[..10]).unwrap_err();
    assert!(matches!(err, MpcithError::MalformedKey { .. }));
}

// ============================================================================
// Key Encoding Tests
// ============================================================================

#[test]
fn expanded_key_verifies_compact_signature() {
    let params = PARAMS_L1_N16;
    let (pk, sk) = keygen(&mut OsRng, params).unwrap();
    let expanded = pk.expand();
    assert!(matches!(expanded.encoding, KeyEncoding::Expanded { .. }));
    assert_eq!(expanded.to_bytes().len(), PublicKey::expanded_len());

    let sig = sign(&mut OsRng, &params, b"keys", &sk.to_bytes()).unwrap();
    assert!(verify(&params, b"keys", &sig, &pk.to_bytes()));
    assert!(verify(&params, b"keys", &sig, &expanded.to_bytes()));
}

#[test]
fn secret_key_with_expanded_public_part_signs() {
    let params = PARAMS_TEST;
    let (pk, sk) = keygen(&mut OsRng, params).unwrap();

    let mut expanded_sk = pk.expand().to_bytes();
    let compact_len = PublicKey::compact_len(&params);
    expanded_sk.extend_from_slice(&sk.to_bytes()[compact_len..]);
    let parsed = SecretKey::from_bytes(&expanded_sk, &params).unwrap();
    assert_eq!(parsed.witness(), sk.witness());

    let sig = sign(&mut OsRng, &params, b"expanded", &expanded_sk).unwrap();
    assert!(verify(&params, b"expanded", &sig, &pk.to_bytes()));
}

// ============================================================================
// Known-Answer Tests
// ============================================================================

// Vector for PARAMS_L1_N16, ChaCha20Rng seeded with [0x42; 32], keygen then
// sign of b"known answer" from the same generator.
const KAT_PK: &str = "a4ddf31f7f32ba696f14ce50ecf3f21e9d7664df59072e5926c606085fabcfba";
const KAT_SIG_LEN: usize = 4353;
const KAT_SIG_H1: &str = "d5d4615ddc07292ac06542e989b8dae2188136899c5520bb23f2668a8ff335ed";
const KAT_SIG_H2: &str = "72591c8c89ab0a92b942211898a751bbac44b3d1ad787285a4617bb62bb4903a";
/// SHAKE-256 of the whole signature, squeezed to 32 bytes.
const KAT_SIG_SHAKE256: &str = "3d38be5d2e0331976ca8ddeb3aca80f128729fc7dd96e1a56922a86ab3b32792";

fn kat_run() -> (Vec<u8>, Vec<u8>) {
    let mut rng = ChaCha20Rng::from_seed([0x42; 32]);
    let (pk, sk) = keygen(&mut rng, PARAMS_L1_N16).unwrap();
    let sig = sign(&mut rng, &PARAMS_L1_N16, b"known answer", &sk.to_bytes()).unwrap();
    (pk.to_bytes(), sig)
}

fn shake256_32(data: &[u8]) -> Vec<u8> {
    let mut hasher = Shake256::default();
    hasher.update(data);
    let mut out = vec![0u8; 32];
    hasher.finalize_xof().read(&mut out);
    out
}

#[test]
fn kat_is_reproducible() {
    let (pk1, sig1) = kat_run();
    let (pk2, sig2) = kat_run();
    assert_eq!(hex::encode(&pk1), hex::encode(&pk2));
    assert_eq!(hex::encode(&sig1), hex::encode(&sig2));
    assert!(verify(&PARAMS_L1_N16, b"known answer", &sig1, &pk1));
}

#[test]
fn kat_matches_pinned_vector() {
    let (pk, sig) = kat_run();
    let params = PARAMS_L1_N16;
    let h1_start = params.salt_bytes;
    let h2_start = h1_start + params.digest_bytes;

    assert_eq!(hex::encode(&pk), KAT_PK);
    assert_eq!(sig.len(), KAT_SIG_LEN);
    assert_eq!(hex::encode(&sig[h1_start..h2_start]), KAT_SIG_H1);
    assert_eq!(
        hex::encode(&sig[h2_start..h2_start + params.digest_bytes]),
        KAT_SIG_H2
    );
    assert_eq!(hex::encode(shake256_32(&sig)), KAT_SIG_SHAKE256);
}

#[test]
fn kat_pinned_key_verifies_fresh_signature() {
    let pk = hex::decode(KAT_PK).unwrap();
    let (_, sig) = kat_run();
    assert!(verify(&PARAMS_L1_N16, b"known answer", &sig, &pk));
    assert!(!verify(&PARAMS_L1_N16, b"known answeR", &sig, &pk));
}

#[test]
fn kat_rejects_perturbed_target() {
    let (pk, sig) = kat_run();
    let target_start = pk.len() - DEMO_ROWS * Gf251::BYTES;

    for i in [target_start, pk.len() - 1] {
        let mut bad_pk = pk.clone();
        bad_pk[i] = ((bad_pk[i] as u16 + 1) % 251) as u8;
        assert!(!verify(&PARAMS_L1_N16, b"known answer", &sig, &bad_pk));
    }
}

#[test]
fn kat_signature_parses_to_expected_shape() {
    let (pk, sig) = kat_run();
    let params = PARAMS_L1_N16;
    let relation = PublicKey::from_bytes(&pk, &params)
        .unwrap()
        .relation()
        .unwrap();
    let parsed = Signature::<Gf251>::from_bytes(&sig, &params, &relation).unwrap();

    assert_eq!(parsed.salt, sig[..params.salt_bytes].to_vec());
    assert_eq!(parsed.proofs.len(), params.repetitions);
    for proof in &parsed.proofs {
        assert_eq!(proof.copath.len(), params.copath_bytes());
        assert_eq!(proof.hidden_commitment.len(), params.digest_bytes);
        assert_eq!(proof.plain_alpha.len(), relation.response_len());
    }
    assert_eq!(parsed.to_bytes(&params, &relation).unwrap(), sig);
}
