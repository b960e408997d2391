/// Complete binary Merkle tree over one record.
///
/// # Layout
///
/// ```text
/// nodes: [ unused | 1 = root | 2 3 | 4 5 6 7 | … | N … 2N-1 = leaves ]
/// ```
///
/// The tree is a flat, 1-indexed array of `2N` hex digests.  Leaves occupy
/// `[N, 2N)` in catalog order; for every internal slot `i`,
/// `node[i] = H(node[2i] ‖ node[2i+1])`.  Children of a parent are adjacent, so
/// a node's sibling is `i ^ 1` and its parent is `i / 2`.
///
/// # Node hashing
///
/// Internal nodes hash the concatenated **hex text** of their children, not
/// the raw 32-byte digests.  Any external verifier of these roots hashes the
/// same way, so this must not change.
///
/// # Time and Space Complexity
///
/// | Operation  | Time      | Space     |
/// |------------|-----------|-----------|
/// | `build`    | O(N)      | O(N)      |
/// | `root`     | O(1)      | O(1)      |
/// | `proof`    | O(log N)  | O(log N)  |
use alloc::{string::String, vec, vec::Vec};

use sha2::{Digest as Sha2Digest, Sha256};

use crate::{
    catalog::FieldCatalog,
    events,
    leaf::hash_leaf,
    record::Record,
    types::{CommitError, HexDigest, LeafIndex, MerkleRoot},
};

/// Hash an internal node: `hex(SHA256(hex(left) ‖ hex(right)))`.
pub fn hash_node(left: &str, right: &str) -> HexDigest {
    let mut h = Sha256::new();
    h.update(left.as_bytes());
    h.update(right.as_bytes());
    hex::encode(h.finalize())
}

/// Sibling of a node: the other child of the same parent.
#[inline]
pub fn sibling_index(index: LeafIndex) -> LeafIndex {
    index ^ 1
}

/// Parent of a node.
#[inline]
pub fn parent_index(index: LeafIndex) -> LeafIndex {
    index / 2
}

/// A fully built tree.  Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleTree {
    nodes: Vec<HexDigest>,
    leaf_count: usize,
}

impl MerkleTree {
    /// Build the tree for `record` under `catalog`.
    ///
    /// # Errors
    /// [`CommitError::MissingField`] if the record lacks a catalog field. The
    /// catalog itself was validated as a power of two at construction.
    pub fn build(catalog: &FieldCatalog, record: &Record) -> Result<Self, CommitError> {
        let n = catalog.len();
        if let Some(extra) = record.fields().find(|f| !catalog.contains(f)) {
            return Err(CommitError::UnknownField {
                field: extra.into(),
            });
        }
        let mut nodes: Vec<HexDigest> = vec![String::new(); 2 * n];

        for (i, field) in catalog.fields().enumerate() {
            let token = record.get(field).ok_or_else(|| CommitError::MissingField {
                field: field.into(),
            })?;
            nodes[n + i] = hash_leaf(token.as_bytes());
        }

        // Bottom-up reduction, one level per halving of the width.
        let mut width = n / 2;
        while width >= 1 {
            for offset in 0..width {
                let slot = width + offset;
                nodes[slot] = hash_node(&nodes[2 * slot], &nodes[2 * slot + 1]);
            }
            width /= 2;
        }

        // A one-field catalog has no internal nodes; its leaf is the root.
        let tree = Self {
            nodes,
            leaf_count: n,
        };
        events::emit_root_built(n, tree.root());
        Ok(tree)
    }

    /// The root, `node[1]`.
    #[inline]
    pub fn root(&self) -> &MerkleRoot {
        &self.nodes[1]
    }

    /// Number of leaves, `N`.
    #[inline]
    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    /// Node at `index`, if it is a real slot (`1 ≤ index < 2N`).
    pub fn node(&self, index: LeafIndex) -> Option<&HexDigest> {
        if index == 0 {
            return None;
        }
        self.nodes.get(index as usize)
    }

    /// Sibling path for the leaf at `index`, ordered bottom-to-top.
    ///
    /// # Errors
    /// [`CommitError::InvalidInclusionProof`] if `index` is not a leaf slot.
    pub fn proof_at(&self, index: LeafIndex) -> Result<Vec<HexDigest>, CommitError> {
        let n = self.leaf_count as LeafIndex;
        if index < n || index >= 2 * n {
            return Err(CommitError::InvalidInclusionProof);
        }
        let mut siblings = Vec::with_capacity(self.leaf_count.trailing_zeros() as usize);
        let mut idx = index;
        while idx > 1 {
            siblings.push(self.nodes[sibling_index(idx) as usize].clone());
            idx = parent_index(idx);
        }
        Ok(siblings)
    }

    /// Sibling path for `field`.
    ///
    /// # Errors
    /// [`CommitError::FieldNotFound`] for a name outside the catalog.
    pub fn proof(&self, catalog: &FieldCatalog, field: &str) -> Result<Vec<HexDigest>, CommitError> {
        let index = catalog.index_of(field)?;
        let siblings = self.proof_at(index)?;
        events::emit_proof_generated(field, index, siblings.len());
        Ok(siblings)
    }
}
