//! A small bilinear relation used to exercise the engine.
//!
//! Public data: matrices `A, B ∈ F^{k×n}` and a target `t ∈ F^k`.
//! Witness: `x ∈ F^n` with `(A x)_l · (B x)_l = t_l` for every row `l`.
//!
//! The shared check for a challenge `ε ∈ F^k` is
//!
//! ```text
//! alpha = ε ∘ (A x) + a
//! v     = ⟨alpha, B x⟩ − c − ⟨ε, t⟩        with c = ⟨a, B x⟩
//!       = Σ_l ε_l ((A x)_l (B x)_l − t_l)
//! ```
//!
//! which is zero for a valid witness and, for an invalid one, is zero only
//! with probability 1/|F| over `ε`.
//!
//! This is NOT a hard relation. It is here to test and benchmark the engine.

use zeroize::Zeroizing;

use crate::error::{MpcithError, Result};
use crate::field::{encode_elements, inner_product, sample_elements, Field};
use crate::hash::{Domain, Xof};
use crate::params::Params;
use crate::relation::Relation;
use crate::shares::PartyShare;

const LABEL_A: u8 = 0;
const LABEL_B: u8 = 1;

/// Row-major `rows × cols` matrix times `x`, wiped on drop.
fn mat_vec<F: Field>(m: &[F], x: &[F], cols: usize) -> Zeroizing<Vec<F>> {
    Zeroizing::new(m.chunks_exact(cols).map(|row| inner_product(row, x)).collect())
}

/// Public instance of the bilinear relation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BilinearRelation<F: Field> {
    rows: usize,
    cols: usize,
    a: Vec<F>,
    b: Vec<F>,
    target: Vec<F>,
}

impl<F: Field> BilinearRelation<F> {
    /// Builds an instance from explicit matrices and target.
    pub fn new(rows: usize, cols: usize, a: Vec<F>, b: Vec<F>, target: Vec<F>) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(MpcithError::InvalidInput {
                field: "dimensions",
                reason: "must be non-zero",
            });
        }
        if a.len() != rows * cols || b.len() != rows * cols || target.len() != rows {
            return Err(MpcithError::InvalidInput {
                field: "instance",
                reason: "matrix or target has wrong size",
            });
        }
        Ok(BilinearRelation {
            rows,
            cols,
            a,
            b,
            target,
        })
    }

    /// Builds an instance whose matrices are expanded from `seed`.
    pub fn from_seed(
        seed: &[u8],
        target: Vec<F>,
        rows: usize,
        cols: usize,
        params: &Params,
    ) -> Result<Self> {
        let (a, b) = expand_matrices(seed, rows, cols, params);
        Self::new(rows, cols, a, b, target)
    }

    /// Number of rows k.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns n (witness length).
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Matrix A, row-major.
    pub fn matrix_a(&self) -> &[F] {
        &self.a
    }

    /// Matrix B, row-major.
    pub fn matrix_b(&self) -> &[F] {
        &self.b
    }

    /// Target vector t.
    pub fn target(&self) -> &[F] {
        &self.target
    }

    /// Computes `(A x) ∘ (B x)`, the target a witness `x` maps to.
    pub fn image(&self, x: &[F]) -> Vec<F> {
        let ax = mat_vec(&self.a, x, self.cols);
        let bx = mat_vec(&self.b, x, self.cols);
        ax.iter().zip(bx.iter()).map(|(&l, &r)| l * r).collect()
    }

    /// Deterministic instance and witness derived from `label`.
    #[cfg(test)]
    pub(crate) fn random_instance(
        label: &[u8],
        rows: usize,
        cols: usize,
        params: &Params,
    ) -> (Self, Vec<F>) {
        let mut xof = Xof::with_domain(params.digest_bytes, Domain::Instance);
        xof.absorb(b"test witness").absorb(label);
        let witness = sample_elements(&mut xof.finalize(), cols);
        let mut relation = Self::from_seed(label, vec![F::ZERO; rows], rows, cols, params)
            .expect("valid dimensions");
        relation.target = relation.image(&witness);
        (relation, witness)
    }
}

/// Expands `A` and `B` from a public seed.
pub fn expand_matrices<F: Field>(
    seed: &[u8],
    rows: usize,
    cols: usize,
    params: &Params,
) -> (Vec<F>, Vec<F>) {
    let expand = |label: u8| {
        let mut xof = Xof::with_domain(params.digest_bytes, Domain::Instance);
        xof.absorb(seed).absorb(&[label]);
        sample_elements::<F, _>(&mut xof.finalize(), rows * cols)
    };
    (expand(LABEL_A), expand(LABEL_B))
}

impl<F: Field> Relation for BilinearRelation<F> {
    type Field = F;

    fn witness_len(&self) -> usize {
        self.cols
    }

    fn aux_len(&self) -> usize {
        self.rows
    }

    fn correction_len(&self) -> usize {
        1
    }

    fn challenge_len(&self) -> usize {
        self.rows
    }

    fn response_len(&self) -> usize {
        self.rows
    }

    fn check_len(&self) -> usize {
        1
    }

    fn instance_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity((2 * self.rows * self.cols + self.rows) * F::BYTES + 4);
        out.extend_from_slice(&(self.rows as u16).to_le_bytes());
        out.extend_from_slice(&(self.cols as u16).to_le_bytes());
        out.extend_from_slice(&encode_elements(&self.a));
        out.extend_from_slice(&encode_elements(&self.b));
        out.extend_from_slice(&encode_elements(&self.target));
        out
    }

    fn evaluate_plain(&self, witness: &[F]) -> bool {
        witness.len() == self.cols && self.image(witness) == self.target
    }

    fn correction(&self, witness: &[F], aux: &[F]) -> Vec<F> {
        let bx = mat_vec(&self.b, witness, self.cols);
        vec![inner_product(aux, bx.as_slice())]
    }

    fn open_alpha(&self, share: &PartyShare<F>, challenge: &[F], _with_offset: bool) -> Vec<F> {
        let ax = mat_vec(&self.a, &share.witness, self.cols);
        challenge
            .iter()
            .zip(ax.iter())
            .zip(&share.aux)
            .map(|((&e, &y), &a)| e * y + a)
            .collect()
    }

    fn check_value(
        &self,
        share: &PartyShare<F>,
        challenge: &[F],
        alpha: &[F],
        with_offset: bool,
    ) -> Vec<F> {
        let bx = mat_vec(&self.b, &share.witness, self.cols);
        let mut v = inner_product(alpha, bx.as_slice()) - share.correction[0];
        if with_offset {
            v -= inner_product(challenge, &self.target);
        }
        vec![v]
    }
}
