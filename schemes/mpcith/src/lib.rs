//! # pqsigs-mpcith
//!
//! A generic MPC-in-the-Head (MPCitH) signature engine built on seed trees
//! and hypercube share aggregation.
//!
//! ## Overview
//!
//! The signer secret-shares a witness among N virtual parties, commits to
//! every party, and uses two Fiat-Shamir challenges to open all parties but
//! one per repetition. Party seeds come from a binary seed tree, so opening
//! N−1 parties costs only `log2 N` seeds. The engine is parameterised by a
//! [`relation::Relation`]: any relation whose shared evaluation is affine in
//! the share can be plugged in.
//!
//! A demo scheme over GF(251) proves knowledge of `x` with
//! `(A·x) ∘ (B·x) = t`, using [`bilinear::BilinearRelation`].
//!
//! This implementation is intended for **educational and experimental purposes only**.
//!
//! ## Quick Start
//!
//! ```rust
//! use rand::rngs::OsRng;
//! use pqsigs_mpcith::{keygen::keygen, sign::sign, verify::verify, params::PARAMS_TEST};
//!
//! // Generate a key pair
//! let (pk, sk) = keygen(&mut OsRng, PARAMS_TEST).expect("valid parameters");
//!
//! // Sign a message
//! let msg = b"Hello, post-quantum world!";
//! let sig = sign(&mut OsRng, &PARAMS_TEST, msg, &sk.to_bytes()).expect("signing should succeed");
//!
//! // Verify the signature
//! assert!(verify(&PARAMS_TEST, msg, &sig, &pk.to_bytes()));
//! ```
//!
//! ## Parameter Sets
//!
//! - [`params::PARAMS_TEST`]: Tiny parameters for fast testing (NOT secure)
//! - [`params::PARAMS_L1_N16`]: Level-1-sized, 16 parties
//! - [`params::PARAMS_L1_N256`]: Level-1-sized, 256 parties (shorter signatures)
//! - [`params::PARAMS_L3_N16`]: Level-3-sized, 16 parties
//! - [`params::PARAMS_L5_N16`]: Level-5-sized, 16 parties
//!
//! ## Modules
//!
//! - [`error`]: Error types
//! - [`params`]: Parameter sets and validation
//! - [`hash`]: Domain-separated SHAKE with a 4-lane batch interface
//! - [`field`]: Field trait with GF(2^8) and GF(251)
//! - [`tree`]: Seed tree expansion and co-paths
//! - [`shares`]: Party shares and hypercube main shares
//! - [`relation`]: The relation interface
//! - [`bilinear`]: The demo bilinear relation
//! - [`commit`]: Party commitments
//! - [`challenge`]: Transcript hashes and challenge expansion
//! - [`signature`]: Signature wire format
//! - [`keygen`]: Demo key generation and key encodings
//! - [`sign`]: Signature generation
//! - [`verify`]: Signature verification
//!
//! ## Security Warning
//!
//! This implementation:
//! - Samples the second challenge by rejection, which is not constant-time
//! - Has NOT been audited by security professionals
//! - Uses demo parameters for the bilinear relation whose soundness has not been analysed
//!
//! Use only for learning, experimentation, and research.

#![warn(missing_docs)]

pub mod bilinear;
pub mod challenge;
pub mod commit;
pub mod error;
pub mod field;
pub mod hash;
pub mod keygen;
pub mod params;
pub mod relation;
pub mod shares;
pub mod sign;
pub mod signature;
pub mod tree;
pub mod verify;

// Re-export commonly used types at crate root for convenience
pub use bilinear::BilinearRelation;
pub use error::{MpcithError, Result};
pub use field::{Field, Gf251, Gf256};
pub use keygen::{keygen, KeyEncoding, PublicKey, SecretKey};
pub use params::{
    Params, PARAMS_L1_N16, PARAMS_L1_N256, PARAMS_L3_N16, PARAMS_L5_N16, PARAMS_TEST,
};
pub use relation::Relation;
pub use sign::{sign, sign_with_relation, MAX_SIGN_ATTEMPTS};
pub use signature::Signature;
pub use verify::{verify, verify_with_relation};
