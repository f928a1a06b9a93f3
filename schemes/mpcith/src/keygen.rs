//! Key generation and key encodings for the demo bilinear scheme.
//!
//! A public key is the instance of a [`BilinearRelation`] over GF(251) with
//! `DEMO_ROWS × DEMO_COLS` matrices. It has two encodings, told apart by
//! length when parsed:
//!
//! - compact: `seed[S] ‖ t[k]` (the matrices are re-expanded from the seed)
//! - expanded: `A[k·n] ‖ B[k·n] ‖ t[k]`
//!
//! A secret key is a public key encoding followed by the witness `x[n]`.

use rand::{CryptoRng, RngCore};
use zeroize::{Zeroize, Zeroizing};

use crate::bilinear::{expand_matrices, BilinearRelation};
use crate::error::{MpcithError, Result};
use crate::field::{decode_elements, encode_elements, sample_elements, Field, Gf251};
use crate::hash::{Domain, Xof};
use crate::params::Params;
use crate::relation::Relation;

/// Field of the demo scheme.
pub type DemoField = Gf251;

/// Number of rows k of the demo matrices.
pub const DEMO_ROWS: usize = 16;

/// Number of columns n of the demo matrices (witness length).
pub const DEMO_COLS: usize = 16;

const WITNESS_LABEL: u8 = 2;

/// The two public key representations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyEncoding {
    /// Matrices given by the seed they expand from.
    Compact {
        /// Matrix seed (S bytes).
        seed: Vec<u8>,
        /// Target vector t.
        target: Vec<DemoField>,
    },
    /// Matrices given explicitly.
    Expanded {
        /// Matrix A, row-major.
        a: Vec<DemoField>,
        /// Matrix B, row-major.
        b: Vec<DemoField>,
        /// Target vector t.
        target: Vec<DemoField>,
    },
}

/// A demo-scheme public key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey {
    /// Engine parameters the key is used with.
    pub params: Params,
    /// Key material.
    pub encoding: KeyEncoding,
}

impl PublicKey {
    /// Length of the compact encoding.
    pub const fn compact_len(params: &Params) -> usize {
        params.security_bytes + DEMO_ROWS * Gf251::BYTES
    }

    /// Length of the expanded encoding.
    pub const fn expanded_len() -> usize {
        (2 * DEMO_ROWS * DEMO_COLS + DEMO_ROWS) * Gf251::BYTES
    }

    /// Serializes the key in its current encoding.
    pub fn to_bytes(&self) -> Vec<u8> {
        match &self.encoding {
            KeyEncoding::Compact { seed, target } => {
                let mut out = seed.clone();
                out.extend_from_slice(&encode_elements(target));
                out
            }
            KeyEncoding::Expanded { a, b, target } => {
                let mut out = encode_elements(a);
                out.extend_from_slice(&encode_elements(b));
                out.extend_from_slice(&encode_elements(target));
                out
            }
        }
    }

    /// Parses either encoding, picking the variant from the length.
    pub fn from_bytes(bytes: &[u8], params: &Params) -> Result<Self> {
        params.validate()?;
        let width = Gf251::BYTES;
        let malformed = |reason: &'static str| MpcithError::MalformedKey { reason };

        let encoding = if bytes.len() == Self::compact_len(params) {
            let (seed, t) = bytes.split_at(params.security_bytes);
            KeyEncoding::Compact {
                seed: seed.to_vec(),
                target: decode_elements(t, DEMO_ROWS)
                    .ok_or(malformed("target element out of range"))?,
            }
        } else if bytes.len() == Self::expanded_len() {
            let mat = DEMO_ROWS * DEMO_COLS * width;
            let (a, rest) = bytes.split_at(mat);
            let (b, t) = rest.split_at(mat);
            KeyEncoding::Expanded {
                a: decode_elements(a, DEMO_ROWS * DEMO_COLS)
                    .ok_or(malformed("matrix element out of range"))?,
                b: decode_elements(b, DEMO_ROWS * DEMO_COLS)
                    .ok_or(malformed("matrix element out of range"))?,
                target: decode_elements(t, DEMO_ROWS)
                    .ok_or(malformed("target element out of range"))?,
            }
        } else {
            return Err(malformed("wrong length"));
        };

        Ok(PublicKey {
            params: *params,
            encoding,
        })
    }

    /// Returns the same key in expanded form.
    pub fn expand(&self) -> PublicKey {
        let encoding = match &self.encoding {
            KeyEncoding::Compact { seed, target } => {
                let (a, b) = expand_matrices(seed, DEMO_ROWS, DEMO_COLS, &self.params);
                KeyEncoding::Expanded {
                    a,
                    b,
                    target: target.clone(),
                }
            }
            KeyEncoding::Expanded { .. } => self.encoding.clone(),
        };
        PublicKey {
            params: self.params,
            encoding,
        }
    }

    /// Builds the relation instance this key describes.
    pub fn relation(&self) -> Result<BilinearRelation<DemoField>> {
        match &self.encoding {
            KeyEncoding::Compact { seed, target } => BilinearRelation::from_seed(
                seed,
                target.clone(),
                DEMO_ROWS,
                DEMO_COLS,
                &self.params,
            ),
            KeyEncoding::Expanded { a, b, target } => BilinearRelation::new(
                DEMO_ROWS,
                DEMO_COLS,
                a.clone(),
                b.clone(),
                target.clone(),
            ),
        }
    }
}

/// A demo-scheme secret key.
///
/// The witness is zeroized on drop.
#[derive(Clone)]
pub struct SecretKey {
    public: PublicKey,
    witness: Vec<DemoField>,
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.witness.zeroize();
    }
}

impl SecretKey {
    /// The matching public key.
    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    /// The witness x.
    pub fn witness(&self) -> &[DemoField] {
        &self.witness
    }

    /// Serializes as public key encoding ‖ witness.
    pub fn to_bytes(&self) -> Zeroizing<Vec<u8>> {
        let mut out = Zeroizing::new(self.public.to_bytes());
        out.extend_from_slice(&Zeroizing::new(encode_elements(&self.witness)));
        out
    }

    /// Parses a secret key and checks that its witness satisfies the relation.
    pub fn from_bytes(bytes: &[u8], params: &Params) -> Result<Self> {
        let wit_len = DEMO_COLS * Gf251::BYTES;
        if bytes.len() < wit_len {
            return Err(MpcithError::MalformedKey {
                reason: "wrong length",
            });
        }
        let (pk_bytes, x_bytes) = bytes.split_at(bytes.len() - wit_len);
        let public = PublicKey::from_bytes(pk_bytes, params)?;
        let witness = decode_elements(x_bytes, DEMO_COLS).ok_or(MpcithError::MalformedKey {
            reason: "witness element out of range",
        })?;
        let sk = SecretKey { public, witness };

        if !sk.public.relation()?.evaluate_plain(&sk.witness) {
            return Err(MpcithError::MalformedKey {
                reason: "witness does not satisfy the public key",
            });
        }
        Ok(sk)
    }
}

/// Generates a key pair in compact encoding.
pub fn keygen<R: RngCore + CryptoRng>(
    rng: &mut R,
    params: Params,
) -> Result<(PublicKey, SecretKey)> {
    params.validate()?;

    let mut seed = vec![0u8; params.security_bytes];
    rng.fill_bytes(&mut seed);
    let mut witness_seed = Zeroizing::new(vec![0u8; params.security_bytes]);
    rng.fill_bytes(&mut witness_seed);

    let mut xof = Xof::with_domain(params.digest_bytes, Domain::Instance);
    xof.absorb(&witness_seed).absorb(&[WITNESS_LABEL]);
    let witness: Vec<DemoField> = sample_elements(&mut xof.finalize(), DEMO_COLS);

    let (a, b) = expand_matrices(&seed, DEMO_ROWS, DEMO_COLS, &params);
    let zero_target = vec![Gf251::ZERO; DEMO_ROWS];
    let relation = BilinearRelation::new(DEMO_ROWS, DEMO_COLS, a, b, zero_target)?;
    let target = relation.image(&witness);

    let public = PublicKey {
        params,
        encoding: KeyEncoding::Compact { seed, target },
    };
    let secret = SecretKey {
        public: public.clone(),
        witness,
    };
    Ok((public, secret))
}
