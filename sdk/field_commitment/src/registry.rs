/// Reference timestamp → root store.
///
/// Mirrors the call surface of the external commitment store:
///
/// | Call                                       | Effect                      |
/// |--------------------------------------------|-----------------------------|
/// | `set(timestamp, root)`                     | record a published root     |
/// | `verify(timestamp, value, proof, index)`   | look up root, run verifier  |
///
/// Test harnesses use it to check that an external verifier behaves exactly
/// like [`verify_locally`] against the same sequence of commitments.
/// Timestamps are lookup keys, so each commit must use a strictly greater
/// timestamp than the last.  A registry serves one catalog shape, fixed at
/// construction, and refuses proofs that do not match it.
use alloc::{collections::BTreeMap, string::ToString, vec::Vec};

use crate::{
    catalog::FieldCatalog,
    config::CommitmentConfig,
    events,
    merkle_tree::MerkleTree,
    proof::{reason, verify_locally, FieldProof, ProofShape},
    record::Record,
    types::{CommitError, HexDigest, LeafIndex, MerkleRoot},
};

/// A root published at a timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootCheckpoint {
    pub timestamp: u64,
    pub root: MerkleRoot,
}

/// Append-only map of committed roots.
#[derive(Debug, Clone)]
pub struct RootRegistry {
    shape: ProofShape,
    roots: BTreeMap<u64, MerkleRoot>,
    last_timestamp: Option<u64>,
}

impl RootRegistry {
    pub fn new(shape: ProofShape) -> Self {
        Self {
            shape,
            roots: BTreeMap::new(),
            last_timestamp: None,
        }
    }

    /// Registry for records of `catalog` built under `config`.
    pub fn for_catalog(catalog: &FieldCatalog, config: &CommitmentConfig) -> Self {
        Self::new(ProofShape::new(catalog, config))
    }

    #[inline]
    pub fn shape(&self) -> &ProofShape {
        &self.shape
    }

    /// Record `root` under `timestamp`.
    ///
    /// # Errors
    /// [`CommitError::TimestampNotIncreasing`] unless `timestamp` is strictly
    /// greater than every previously committed timestamp.
    pub fn set(&mut self, timestamp: u64, root: MerkleRoot) -> Result<(), CommitError> {
        if let Some(last) = self.last_timestamp {
            if timestamp <= last {
                events::emit_commit_refused(last, timestamp);
                return Err(CommitError::TimestampNotIncreasing {
                    last,
                    attempted: timestamp,
                });
            }
        }
        events::emit_root_committed(timestamp, &root);
        self.roots.insert(timestamp, root);
        self.last_timestamp = Some(timestamp);
        Ok(())
    }

    /// Build the root for `record` and commit it under `timestamp`.
    ///
    /// # Errors
    /// [`CommitError::InvalidConfig`] for a catalog of another size,
    /// [`CommitError::TokenWidthMismatch`] for a token of another width, and
    /// tree or timestamp errors otherwise.
    pub fn commit(
        &mut self,
        catalog: &FieldCatalog,
        record: &Record,
        timestamp: u64,
    ) -> Result<MerkleRoot, CommitError> {
        if catalog.len() != self.shape.leaf_count() {
            return Err(CommitError::InvalidConfig(
                "catalog size differs from registry shape",
            ));
        }
        for (field, token) in catalog.fields().filter_map(|f| record.get(f).map(|t| (f, t))) {
            if token.len() != self.shape.token_width() {
                return Err(CommitError::TokenWidthMismatch {
                    field: field.to_string(),
                    expected: self.shape.token_width(),
                    actual: token.len(),
                });
            }
        }
        let root = MerkleTree::build(catalog, record)?.root().clone();
        self.set(timestamp, root.clone())?;
        Ok(root)
    }

    /// Root committed under `timestamp`.
    pub fn root_at(&self, timestamp: u64) -> Option<&MerkleRoot> {
        self.roots.get(&timestamp)
    }

    /// Run the shaped verifier against the root stored for `timestamp`.
    /// An unknown timestamp rejects.
    pub fn verify(
        &self,
        timestamp: u64,
        value: &[u8],
        proof: &[HexDigest],
        index: LeafIndex,
    ) -> bool {
        self.verify_as(None, timestamp, value, proof, index)
    }

    /// [`RootRegistry::verify`] for an assembled [`FieldProof`].
    pub fn verify_field(&self, timestamp: u64, proof: &FieldProof) -> bool {
        self.verify_as(
            Some(&proof.field),
            timestamp,
            proof.value.as_bytes(),
            &proof.siblings,
            proof.index,
        )
    }

    fn verify_as(
        &self,
        field: Option<&str>,
        timestamp: u64,
        value: &[u8],
        proof: &[HexDigest],
        index: LeafIndex,
    ) -> bool {
        let Some(root) = self.roots.get(&timestamp) else {
            let why = reason(&CommitError::UnknownTimestamp { timestamp });
            events::emit_verification_rejected(field, index, Some(timestamp), why);
            return false;
        };
        if self.shape.check(value, index, proof).is_err() {
            events::emit_verification_rejected(field, index, Some(timestamp), "proof shape mismatch");
            return false;
        }
        let accepted = verify_locally(value, index, proof, root);
        if !accepted {
            events::emit_verification_rejected(
                field,
                index,
                Some(timestamp),
                "proof does not match committed root",
            );
        }
        accepted
    }

    /// Most recent commitment.
    pub fn latest(&self) -> Option<RootCheckpoint> {
        self.roots
            .iter()
            .next_back()
            .map(|(ts, root)| RootCheckpoint {
                timestamp: *ts,
                root: root.clone(),
            })
    }

    /// All commitments, oldest first.
    pub fn checkpoints(&self) -> Vec<RootCheckpoint> {
        self.roots
            .iter()
            .map(|(ts, root)| RootCheckpoint {
                timestamp: *ts,
                root: root.clone(),
            })
            .collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}
