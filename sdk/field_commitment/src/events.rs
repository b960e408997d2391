//! Structured events for every observable step of the commitment pipeline.
//!
//! Each helper emits one `tracing` event tagged with a short topic, so a
//! subscriber can filter on `topic` the same way an indexer filters contract
//! events.  Nothing here affects results; with no subscriber installed every
//! call is a no-op.

use crate::types::{HexDigest, LeafIndex};

const TARGET: &str = "field_commitment";

pub fn emit_root_built(field_count: usize, root: &HexDigest) {
    tracing::debug!(target: TARGET, topic = "ROOT", field_count, root = %root, "merkle root built");
}

pub fn emit_placeholder_used(field: &str) {
    tracing::debug!(target: TARGET, topic = "SYNTH", field, "synthetic placeholder substituted");
}

pub fn emit_proof_generated(field: &str, index: LeafIndex, len: usize) {
    tracing::debug!(target: TARGET, topic = "PROOF", field, index, len, "inclusion proof generated");
}

/// Emitted for every rejected verification.  `field` is present when the
/// caller held a [`FieldProof`](crate::proof::FieldProof); `timestamp` when the
/// check went through a root registry.
pub fn emit_verification_rejected(
    field: Option<&str>,
    index: LeafIndex,
    timestamp: Option<u64>,
    reason: &'static str,
) {
    tracing::info!(
        target: TARGET,
        topic = "REJECT",
        field,
        index,
        timestamp,
        reason,
        "verification rejected"
    );
}

pub fn emit_root_committed(timestamp: u64, root: &HexDigest) {
    tracing::info!(target: TARGET, topic = "COMMIT", timestamp, root = %root, "root committed");
}

pub fn emit_commit_refused(last: u64, attempted: u64) {
    tracing::warn!(
        target: TARGET,
        topic = "COMMIT",
        last,
        attempted,
        "root commit refused: timestamp not increasing"
    );
}
