/// Inclusion proofs and the reference verifier.
///
/// # Verification
///
/// ```text
/// candidate ← hex(SHA256(value));  idx ← index
/// for sibling in proof:
///     candidate ← idx even ? H(candidate ‖ sibling) : H(sibling ‖ candidate)
///     idx ← idx / 2
/// accept ⇔ idx == 1 ∧ candidate == expected_root
/// ```
///
/// `2k` is always the left child and `2k + 1` the right child, matching tree
/// construction.  Any on-chain verifier consuming these proofs must reproduce
/// this walk exactly, including hashing the hex text of each node.
///
/// # Shape
///
/// Internal nodes hash the hex text of their children, so the 128-byte value
/// `hex(node[2k]) ‖ hex(node[2k+1])` with a path one level shorter walks from
/// slot `k` to the root just like a leaf would.  The walk alone cannot tell
/// the two apart; only the catalog size can.  [`ProofShape`] carries that
/// trusted size and rejects, before hashing:
///
/// | Check                         | Rejects                             |
/// |-------------------------------|-------------------------------------|
/// | `index ∈ [N, 2N)`             | internal-node and out-of-tree slots |
/// | `len(proof) == log2(N)`       | truncated or padded paths           |
/// | `len(value) == token_width`   | concatenated child digests          |
///
/// [`verify_locally`] has no catalog and therefore no shape check.
use alloc::{string::String, vec::Vec};

use crate::{
    catalog::FieldCatalog,
    config::CommitmentConfig,
    events,
    leaf::hash_leaf,
    merkle_tree::{hash_node, parent_index, MerkleTree},
    record::Record,
    types::{CommitError, FieldToken, HexDigest, LeafIndex, MerkleRoot},
};

/// Recompute the root implied by `value` at `index` under `proof`.
///
/// Returns the candidate root and the index reached after the walk.
fn fold_path(value: &[u8], index: LeafIndex, proof: &[HexDigest]) -> (HexDigest, LeafIndex) {
    let mut candidate = hash_leaf(value);
    let mut idx = index;
    for sibling in proof {
        candidate = if idx % 2 == 0 {
            hash_node(&candidate, sibling)
        } else {
            hash_node(sibling, &candidate)
        };
        idx = parent_index(idx);
    }
    (candidate, idx)
}

/// Reference verification of the bare walk.
///
/// Returns `false` (never an error) for a foreign value, a corrupted or
/// reordered proof, a wrong index, a proof whose length does not carry the
/// index to the root, or a wrong root.
///
/// Without the catalog size this cannot refuse a proof aimed at an internal
/// node.  Anything checking untrusted input should use [`verify_shaped`].
pub fn verify_locally(
    value: &[u8],
    index: LeafIndex,
    proof: &[HexDigest],
    expected_root: &str,
) -> bool {
    check(value, index, proof, expected_root).is_ok()
}

fn check(
    value: &[u8],
    index: LeafIndex,
    proof: &[HexDigest],
    expected_root: &str,
) -> Result<(), CommitError> {
    if index == 0 {
        return Err(CommitError::InvalidInclusionProof);
    }
    let (candidate, idx) = fold_path(value, index, proof);
    if idx != 1 {
        return Err(CommitError::InvalidInclusionProof);
    }
    if candidate != expected_root {
        return Err(CommitError::RootMismatch);
    }
    Ok(())
}

/// Trusted proof dimensions for one catalog and configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProofShape {
    leaf_count: usize,
    token_width: usize,
}

impl ProofShape {
    pub fn new(catalog: &FieldCatalog, config: &CommitmentConfig) -> Self {
        Self {
            leaf_count: catalog.len(),
            token_width: config.token_width(),
        }
    }

    #[inline]
    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    /// Siblings in every valid proof, `log2(N)`.
    #[inline]
    pub fn depth(&self) -> usize {
        self.leaf_count.trailing_zeros() as usize
    }

    #[inline]
    pub fn token_width(&self) -> usize {
        self.token_width
    }

    /// Check `(value, index, proof)` against this shape without hashing.
    ///
    /// # Errors
    /// [`CommitError::InvalidInclusionProof`] on any mismatch.
    pub fn check(
        &self,
        value: &[u8],
        index: LeafIndex,
        proof: &[HexDigest],
    ) -> Result<(), CommitError> {
        let n = self.leaf_count as LeafIndex;
        if index < n || index >= 2 * n {
            return Err(CommitError::InvalidInclusionProof);
        }
        if proof.len() != self.depth() || value.len() != self.token_width {
            return Err(CommitError::InvalidInclusionProof);
        }
        Ok(())
    }
}

fn check_shaped(
    shape: &ProofShape,
    value: &[u8],
    index: LeafIndex,
    proof: &[HexDigest],
    expected_root: &str,
) -> Result<(), CommitError> {
    shape.check(value, index, proof)?;
    check(value, index, proof, expected_root)
}

/// [`verify_locally`] preceded by the [`ProofShape`] checks.
pub fn verify_shaped(
    shape: &ProofShape,
    value: &[u8],
    index: LeafIndex,
    proof: &[HexDigest],
    expected_root: &str,
) -> bool {
    check_shaped(shape, value, index, proof, expected_root).is_ok()
}

/// Sibling path for `field`, building the tree from `record`.
///
/// To prove several fields of one record, build a [`MerkleTree`] once and use
/// [`MerkleTree::proof`] instead.
///
/// # Errors
/// [`CommitError::FieldNotFound`] for a name outside the catalog; tree
/// construction errors otherwise.
pub fn generate_proof(
    catalog: &FieldCatalog,
    field: &str,
    record: &Record,
) -> Result<Vec<HexDigest>, CommitError> {
    // Reject unknown names before paying for the tree.
    catalog.index_of(field)?;
    MerkleTree::build(catalog, record)?.proof(catalog, field)
}

/// Everything an external verifier needs to check one field:
/// `verify(timestamp, value, siblings, index)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldProof {
    /// Field being proven.
    pub field: String,
    /// Tree index of the field, in `[N, 2N)`.
    pub index: LeafIndex,
    /// Committed token for the field.
    pub value: FieldToken,
    /// Sibling hashes from leaf to root.
    pub siblings: Vec<HexDigest>,
}

impl FieldProof {
    /// Assemble the proof for `field` from a built tree.
    pub fn from_tree(
        catalog: &FieldCatalog,
        tree: &MerkleTree,
        record: &Record,
        field: &str,
    ) -> Result<Self, CommitError> {
        let index = catalog.index_of(field)?;
        let value = record.token(field)?.clone();
        let siblings = tree.proof(catalog, field)?;
        Ok(Self {
            field: field.into(),
            index,
            value,
            siblings,
        })
    }

    /// Build the tree for `record` and assemble the proof for `field`.
    pub fn new(catalog: &FieldCatalog, record: &Record, field: &str) -> Result<Self, CommitError> {
        catalog.index_of(field)?;
        let tree = MerkleTree::build(catalog, record)?;
        Self::from_tree(catalog, &tree, record, field)
    }

    /// Verify against `root` under `shape`, reporting why a check failed.
    ///
    /// # Errors
    /// * [`CommitError::InvalidInclusionProof`]: wrong shape, or the path does
    ///   not end at the root slot.
    /// * [`CommitError::RootMismatch`]: the recomputed root differs.
    pub fn verify(&self, shape: &ProofShape, root: &MerkleRoot) -> Result<(), CommitError> {
        let outcome = check_shaped(shape, self.value.as_bytes(), self.index, &self.siblings, root);
        if let Err(ref e) = outcome {
            events::emit_verification_rejected(Some(&self.field), self.index, None, reason(e));
        }
        outcome
    }

    /// Boolean form of [`FieldProof::verify`].
    pub fn verifies(&self, shape: &ProofShape, root: &MerkleRoot) -> bool {
        verify_shaped(shape, self.value.as_bytes(), self.index, &self.siblings, root)
    }
}

pub(crate) fn reason(err: &CommitError) -> &'static str {
    match err {
        CommitError::InvalidInclusionProof => "path does not reach root",
        CommitError::RootMismatch => "root mismatch",
        CommitError::UnknownTimestamp { .. } => "unknown timestamp",
        _ => "invalid input",
    }
}
