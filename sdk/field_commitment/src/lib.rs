//! # `field_commitment` — Merkle commitments over fixed field records
//!
//! Commits a fixed-order record of named fields (a simplified beacon block)
//! to one SHA-256 Merkle root, and proves that a single field held a given
//! value at commitment time without revealing the rest of the record.  The
//! root is published externally under a timestamp; an on-chain verifier later
//! checks `(value, proof, index)` against it using the same walk as
//! [`verify_locally`].
//!
//! ## Module layout
//!
//! | Module            | Purpose                                                    |
//! |-------------------|------------------------------------------------------------|
//! | [`types`]         | `FieldToken`, digests, `CommitError`                       |
//! | [`config`]        | `CommitmentConfig` — token width, filler, entropy length   |
//! | [`catalog`]       | `FieldCatalog` — record shape and field → index mapping    |
//! | [`leaf`]          | Leaf derivation, field sources, placeholder providers      |
//! | [`record`]        | `Record` / `RecordBuilder`                                 |
//! | [`merkle_tree`]   | `MerkleTree` — flat 1-indexed tree and sibling paths       |
//! | [`proof`]         | `FieldProof`, `generate_proof`, `verify_locally`           |
//! | [`registry`]      | `RootRegistry` — reference timestamp → root store          |
//! | [`events`]        | Structured `tracing` events                                |
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use field_commitment::{
//!     build_root, generate_proof, index_of, verify_locally,
//!     catalog::FieldCatalog, config::CommitmentConfig,
//!     leaf::OsPlaceholder, record::RecordBuilder,
//! };
//!
//! let catalog = FieldCatalog::beacon_block();
//! let config = CommitmentConfig::default();
//! let mut synth = OsPlaceholder;
//!
//! // `header` is any `FieldSource`, e.g. a BTreeMap of execution-layer fields.
//! let record = RecordBuilder::new(&catalog, &config)
//!     .with_placeholders(&mut synth)
//!     .build(&header)?;
//!
//! let root = build_root(&catalog, &record)?;
//! let index = index_of(&catalog, "Coinbase")?;
//! let proof = generate_proof(&catalog, "Coinbase", &record)?;
//! let value = record.token("Coinbase")?;
//! assert!(verify_locally(value.as_bytes(), index, &proof, &root));
//! ```
//!
//! ## `no_std` compatibility
//!
//! The crate is `#![no_std]` with `extern crate alloc`.  Every operation is a
//! pure computation over its inputs; nothing is cached or shared, so calls for
//! different records may run concurrently without coordination.

#![no_std]

extern crate alloc;

pub mod catalog;
pub mod config;
pub mod events;
pub mod leaf;
pub mod merkle_tree;
pub mod proof;
pub mod record;
pub mod registry;
pub mod types;

use alloc::vec::Vec;

pub use catalog::{FieldCatalog, BEACON_BLOCK_FIELDS};
pub use config::CommitmentConfig;
pub use merkle_tree::MerkleTree;
pub use proof::{generate_proof, verify_locally, verify_shaped, FieldProof, ProofShape};
pub use record::{Record, RecordBuilder};
pub use registry::RootRegistry;
pub use types::{CommitError, FieldToken, HexDigest, LeafIndex, MerkleRoot};

/// Root of the tree built over `record`.
///
/// # Errors
/// [`CommitError::MissingField`] if the record does not cover the catalog.
pub fn build_root(catalog: &FieldCatalog, record: &Record) -> Result<MerkleRoot, CommitError> {
    let tree = MerkleTree::build(catalog, record)?;
    Ok(tree.root().clone())
}

/// Tree index of `field`, in `[N, 2N)`.
///
/// # Errors
/// [`CommitError::FieldNotFound`] for a name outside the catalog.
pub fn index_of(catalog: &FieldCatalog, field: &str) -> Result<LeafIndex, CommitError> {
    catalog.index_of(field)
}

/// Proofs for every catalog field of one record, sharing a single tree build.
pub fn prove_all(
    catalog: &FieldCatalog,
    record: &Record,
) -> Result<Vec<FieldProof>, CommitError> {
    let tree = MerkleTree::build(catalog, record)?;
    catalog
        .fields()
        .map(|field| FieldProof::from_tree(catalog, &tree, record, field))
        .collect()
}
