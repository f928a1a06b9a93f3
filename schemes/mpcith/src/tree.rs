//! PRG-expanded seed tree with "all but one" openings.
//!
//! The tree is stored heap-style in one flat buffer of `2N − 1` seeds: node
//! `i` has children `2i + 1` and `2i + 2`, and leaf `j` is node `N − 1 + j`.
//! Each internal node is expanded with
//!
//! ```text
//! children = SHAKE(Tree ‖ node_seed ‖ salt ‖ u16(repetition) ‖ u16(node), 2S)
//! ```
//!
//! and the output is split into the left and right child seeds.
//!
//! Any `N ≥ 2` works; leaves then sit at two adjacent depths when `N` is not a
//! power of two, and co-path lengths vary accordingly.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{MpcithError, Result};
use crate::hash::{Domain, Xof, XofX4};
use crate::params::{Params, MAX_PARTIES};

/// A full or partially reconstructed seed tree for one repetition.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SeedTree {
    nodes: Vec<u8>,
    #[zeroize(skip)]
    known: Vec<bool>,
    #[zeroize(skip)]
    num_leaves: usize,
    #[zeroize(skip)]
    seed_bytes: usize,
    #[zeroize(skip)]
    digest_bytes: usize,
}

impl SeedTree {
    fn empty(num_leaves: usize, params: &Params) -> Self {
        let count = 2 * num_leaves - 1;
        SeedTree {
            nodes: vec![0u8; count * params.security_bytes],
            known: vec![false; count],
            num_leaves,
            seed_bytes: params.security_bytes,
            digest_bytes: params.digest_bytes,
        }
    }

    /// Expands a full tree of `num_leaves` leaves from `root_seed`.
    pub fn expand(
        root_seed: &[u8],
        salt: &[u8],
        repetition: u16,
        num_leaves: usize,
        params: &Params,
    ) -> Result<Self> {
        let mut tree = Self::new_with_root(root_seed, salt, num_leaves, params)?;
        for node in 0..num_leaves - 1 {
            tree.expand_node(node, salt, repetition);
        }
        Ok(tree)
    }

    /// Same as [`SeedTree::expand`], hashing four sibling nodes per call.
    pub fn expand_x4(
        root_seed: &[u8],
        salt: &[u8],
        repetition: u16,
        num_leaves: usize,
        params: &Params,
    ) -> Result<Self> {
        let mut tree = Self::new_with_root(root_seed, salt, num_leaves, params)?;
        let internal = num_leaves - 1;

        let mut level_start = 0usize;
        while level_start < internal {
            let level_end = (2 * level_start + 1).min(internal);
            let mut node = level_start;
            while node + 4 <= level_end {
                tree.expand_nodes_x4([node, node + 1, node + 2, node + 3], salt, repetition);
                node += 4;
            }
            for rest in node..level_end {
                tree.expand_node(rest, salt, repetition);
            }
            level_start = 2 * level_start + 1;
        }
        Ok(tree)
    }

    /// Rebuilds every leaf except `hidden_leaf` from a co-path.
    ///
    /// The co-path lists the sibling seeds along the path from the hidden
    /// leaf to the root, leaf level first, as produced by
    /// [`SeedTree::compute_copath`].
    pub fn expand_partial(
        copath: &[u8],
        salt: &[u8],
        repetition: u16,
        num_leaves: usize,
        hidden_leaf: usize,
        params: &Params,
    ) -> Result<Self> {
        check_shape(salt, num_leaves, params)?;
        if hidden_leaf >= num_leaves {
            return Err(MpcithError::InvalidInput {
                field: "hidden_leaf",
                reason: "index out of range",
            });
        }
        let s = params.security_bytes;
        if copath.len() != copath_len(num_leaves, hidden_leaf) * s {
            return Err(MpcithError::InvalidInput {
                field: "copath",
                reason: "wrong length",
            });
        }

        let mut tree = Self::empty(num_leaves, params);
        let mut on_path = vec![false; tree.known.len()];

        let mut node = num_leaves - 1 + hidden_leaf;
        on_path[node] = true;
        for seed in copath.chunks_exact(s) {
            tree.set_node(sibling(node), seed);
            node = parent(node);
            on_path[node] = true;
        }

        for node in 0..num_leaves - 1 {
            if tree.known[node] && !on_path[node] {
                tree.expand_node(node, salt, repetition);
            }
        }
        Ok(tree)
    }

    /// Returns the sibling seeds needed to rebuild all leaves but `hidden_leaf`.
    ///
    /// # Panics
    ///
    /// Panics if `hidden_leaf` is out of range or a needed node is unknown.
    pub fn compute_copath(&self, hidden_leaf: usize) -> Vec<u8> {
        assert!(hidden_leaf < self.num_leaves, "hidden leaf out of range");
        let len = copath_len(self.num_leaves, hidden_leaf) * self.seed_bytes;
        let mut out = Vec::with_capacity(len);
        let mut node = self.num_leaves - 1 + hidden_leaf;
        while node > 0 {
            let sib = sibling(node);
            assert!(self.known[sib], "co-path node not available");
            out.extend_from_slice(self.node(sib));
            node = parent(node);
        }
        out
    }

    /// Returns leaf `j`, or `None` if it is out of range or was not rebuilt.
    pub fn leaf(&self, j: usize) -> Option<&[u8]> {
        if j >= self.num_leaves {
            return None;
        }
        let idx = self.num_leaves - 1 + j;
        self.known[idx].then(|| self.node(idx))
    }

    /// Number of leaves.
    pub fn num_leaves(&self) -> usize {
        self.num_leaves
    }

    fn new_with_root(
        root_seed: &[u8],
        salt: &[u8],
        num_leaves: usize,
        params: &Params,
    ) -> Result<Self> {
        check_shape(salt, num_leaves, params)?;
        if root_seed.len() != params.security_bytes {
            return Err(MpcithError::InvalidInput {
                field: "root_seed",
                reason: "wrong length",
            });
        }
        let mut tree = Self::empty(num_leaves, params);
        tree.set_node(0, root_seed);
        Ok(tree)
    }

    fn node(&self, idx: usize) -> &[u8] {
        &self.nodes[idx * self.seed_bytes..(idx + 1) * self.seed_bytes]
    }

    fn set_node(&mut self, idx: usize, seed: &[u8]) {
        let s = self.seed_bytes;
        self.nodes[idx * s..(idx + 1) * s].copy_from_slice(seed);
        self.known[idx] = true;
    }

    fn expand_node(&mut self, node: usize, salt: &[u8], repetition: u16) {
        let s = self.seed_bytes;
        let mut xof = Xof::with_domain(self.digest_bytes, Domain::Tree);
        xof.absorb(self.node(node))
            .absorb(salt)
            .absorb_u16(repetition)
            .absorb_u16(node as u16);
        let mut children = xof.digest(2 * s);
        let left = 2 * node + 1;
        self.set_node(left, &children[..s]);
        self.set_node(left + 1, &children[s..]);
        children.zeroize();
    }

    fn expand_nodes_x4(&mut self, nodes: [usize; 4], salt: &[u8], repetition: u16) {
        let s = self.seed_bytes;
        let mut x4 = XofX4::with_domain(self.digest_bytes, Domain::Tree);
        x4.absorb_each(nodes.map(|n| self.node(n)))
            .absorb_all(salt)
            .absorb_u16_each([repetition; 4])
            .absorb_u16_each(nodes.map(|n| n as u16));

        let mut outs = [(); 4].map(|_| vec![0u8; 2 * s]);
        {
            let [a, b, c, d] = &mut outs;
            x4.finalize()
                .squeeze_each([&mut a[..], &mut b[..], &mut c[..], &mut d[..]]);
        }
        for (children, &node) in outs.iter().zip(nodes.iter()) {
            let left = 2 * node + 1;
            self.set_node(left, &children[..s]);
            self.set_node(left + 1, &children[s..]);
        }
        outs.zeroize();
    }
}

/// Number of co-path seeds for `hidden_leaf`: the depth of that leaf.
pub fn copath_len(num_leaves: usize, hidden_leaf: usize) -> usize {
    let mut node = num_leaves - 1 + hidden_leaf;
    let mut depth = 0;
    while node > 0 {
        node = parent(node);
        depth += 1;
    }
    depth
}

#[inline]
fn parent(node: usize) -> usize {
    (node - 1) / 2
}

#[inline]
fn sibling(node: usize) -> usize {
    if node % 2 == 1 {
        node + 1
    } else {
        node - 1
    }
}

fn check_shape(salt: &[u8], num_leaves: usize, params: &Params) -> Result<()> {
    if !(2..=MAX_PARTIES).contains(&num_leaves) {
        return Err(MpcithError::InvalidInput {
            field: "num_leaves",
            reason: "must be in 2..=2^15",
        });
    }
    if salt.len() != params.salt_bytes {
        return Err(MpcithError::InvalidInput {
            field: "salt",
            reason: "wrong length",
        });
    }
    Ok(())
}
