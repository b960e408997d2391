#![no_main]

//! Fuzz harness for `field_commitment` — Merkle commitments over field records.
//!
//! # What is fuzzed
//!
//! | Target                   | What we are looking for                          |
//! |--------------------------|--------------------------------------------------|
//! | `FieldCatalog::new`      | Only power-of-two, duplicate-free lists accepted |
//! | `RecordBuilder::build`   | No panics; every token has the configured width  |
//! | `MerkleTree::build`      | No panics for any catalog size up to 64          |
//! | `FieldProof` round trip  | A freshly generated proof always verifies        |
//! | `verify_locally`         | Never panics on arbitrary value/index/siblings   |
//! | `RootRegistry::verify`   | Accepts only leaf-slot, full-depth, full-width   |
//! | `RootRegistry::set`      | Timestamps strictly increase; history is stable  |

use std::collections::BTreeMap;

use arbitrary::Arbitrary;
use field_commitment::{
    catalog::FieldCatalog,
    config::CommitmentConfig,
    leaf::SeededPlaceholder,
    proof::{verify_locally, FieldProof},
    record::RecordBuilder,
    registry::RootRegistry,
};
use libfuzzer_sys::fuzz_target;

// ── Fuzz input types ──────────────────────────────────────────────────────────

#[derive(Arbitrary, Debug)]
pub struct FuzzInput {
    /// Catalog size is `1 << (exp % 7)`.
    exp: u8,
    /// Token width, clamped into the accepted range.
    width: u8,
    actions: Vec<FuzzAction>,
}

/// A single action to apply to the registry under test.
#[derive(Arbitrary, Debug)]
pub enum FuzzAction {
    /// Commit a record; `None` entries are left to the placeholder source.
    Commit {
        values: Vec<Option<String>>,
        gap: u8,
    },
    /// Prove field `pick` of the latest record and verify it.
    Prove { pick: u8 },
    /// Run the verifier on attacker-controlled input against the latest root.
    External {
        value: Vec<u8>,
        index: u64,
        siblings: Vec<String>,
    },
    /// Commit again at the last used timestamp.
    Replay,
}

/// Field names `f0 … f{n-1}`.
fn field_names(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("f{i}")).collect()
}

// ── Fuzz entry point ──────────────────────────────────────────────────────────

fuzz_target!(|input: FuzzInput| {
    let n = 1usize << (input.exp % 7);
    let catalog = match FieldCatalog::new(field_names(n)) {
        Ok(c) => c,
        Err(e) => panic!("power-of-two catalog refused: {e}"),
    };
    let width = (input.width as usize).clamp(1, 64);
    let config = match CommitmentConfig::new(width, b' ', 10) {
        Ok(c) => c,
        Err(e) => panic!("clamped width refused: {e}"),
    };

    let mut synth = SeededPlaceholder::new(b"fuzz".as_slice());
    let mut registry = RootRegistry::for_catalog(&catalog, &config);
    let mut latest = None;
    let mut clock = 0u64;

    for action in input.actions {
        match action {
            FuzzAction::Commit { values, gap } => {
                let source: BTreeMap<String, String> = catalog
                    .fields()
                    .zip(values)
                    .filter_map(|(f, v)| v.map(|v| (f.to_string(), v)))
                    .collect();
                let record = match RecordBuilder::new(&catalog, &config)
                    .with_placeholders(&mut synth)
                    .build(&source)
                {
                    Ok(r) => r,
                    // Only an empty real value may be refused.
                    Err(_) => {
                        assert!(source.values().any(String::is_empty));
                        continue;
                    }
                };
                for field in catalog.fields() {
                    let token = record.token(field).expect("catalog field missing");
                    assert_eq!(token.len(), width);
                }

                clock = clock.saturating_add(gap as u64 + 1);
                let before = registry.checkpoints();
                match registry.commit(&catalog, &record, clock) {
                    Ok(root) => {
                        assert_eq!(root.len(), 64);
                        latest = Some((clock, record));
                    }
                    Err(_) => assert_eq!(clock, u64::MAX),
                }
                let after = registry.checkpoints();
                assert!(after.starts_with(&before));
            }
            FuzzAction::Prove { pick } => {
                let Some((ts, record)) = latest.as_ref() else {
                    continue;
                };
                let field = catalog
                    .field_at((n + pick as usize % n) as u64)
                    .expect("index inside [N, 2N)");
                let proof = FieldProof::new(&catalog, record, field).expect("proof for own field");
                assert_eq!(proof.siblings.len(), catalog.depth());
                assert!(registry.verify_field(*ts, &proof));
            }
            FuzzAction::External {
                value,
                index,
                siblings,
            } => {
                if let Some(cp) = registry.latest() {
                    let accepted = verify_locally(&value, index, &siblings, &cp.root);
                    if accepted {
                        // Acceptance implies the walk ended exactly at the root slot.
                        assert!(index >= 1);
                        assert_eq!(siblings.len(), 64 - index.leading_zeros() as usize - 1);
                    }
                    if registry.verify(cp.timestamp, &value, &siblings, index) {
                        assert!(accepted);
                        assert!((n as u64..2 * n as u64).contains(&index));
                        assert_eq!(siblings.len(), catalog.depth());
                        assert_eq!(value.len(), width);
                    }
                }
            }
            FuzzAction::Replay => {
                if let Some(cp) = registry.latest() {
                    assert!(registry.set(cp.timestamp, cp.root).is_err());
                }
            }
        }
    }
});
