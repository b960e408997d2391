//! # Field Commitment Testing Framework — Integration Tests
//!
//! Tests exercising the commitment pipeline through the framework:
//! - Property-based testing with invariant verification
//! - Random action sequences against the reference registry
//! - Scenario DSL
//! - Mutation testing detection

extern crate std;

use std::collections::BTreeSet;

use proptest::prelude::*;

use field_commitment::{
    build_root, generate_proof, index_of, verify_locally,
    catalog::FieldCatalog,
    config::CommitmentConfig,
    leaf::{LeafDeriver, SeededPlaceholder},
    merkle_tree::MerkleTree,
    proof::{FieldProof, ProofShape},
    record::RecordBuilder,
    types::{CommitError, FieldToken},
};
use test_framework::assert_commit_error;
use test_framework::generators::*;
use test_framework::invariants::*;
use test_framework::scenario_dsl::{run_scenarios, Scenario};
use test_framework::*;

// ═════════════════════════════════════════════════════════════════════════════
//  Property-Based Tests
// ═════════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// **Property**: every field of every record verifies against its root
    /// with a proof of exactly `log2(N)` siblings.
    #[test]
    fn prop_every_field_round_trips((n, source) in sized_source_strategy()) {
        let catalog = FieldCatalog::new(field_names(n)).unwrap();
        let config = CommitmentConfig::default();
        let record = RecordBuilder::new(&catalog, &config).build(&source).unwrap();
        let root = build_root(&catalog, &record).unwrap();

        for field in catalog.fields() {
            let index = index_of(&catalog, field).unwrap();
            let proof = generate_proof(&catalog, field, &record).unwrap();
            let token = record.token(field).unwrap();
            prop_assert_eq!(proof.len(), catalog.depth());
            prop_assert!(verify_locally(token.as_bytes(), index, &proof, &root),
                "proof for {} rejected", field);
        }
    }

    /// **Property**: a value other than the committed one never verifies.
    #[test]
    fn prop_foreign_value_rejected(
        (n, source) in sized_source_strategy(),
        field_pick in 0usize..64usize,
        other in field_value_strategy(),
    ) {
        let catalog = FieldCatalog::new(field_names(n)).unwrap();
        let config = CommitmentConfig::default();
        let record = RecordBuilder::new(&catalog, &config).build(&source).unwrap();
        let field = catalog.field_at((n + field_pick % n) as u64).unwrap();

        let foreign = LeafDeriver::new(&config).derive(field, &other).unwrap();
        prop_assume!(&foreign != record.token(field).unwrap());

        let root = build_root(&catalog, &record).unwrap();
        let index = index_of(&catalog, field).unwrap();
        let proof = generate_proof(&catalog, field, &record).unwrap();
        prop_assert!(!verify_locally(foreign.as_bytes(), index, &proof, &root));
    }

    /// **Property**: changing one field changes the root but leaves that
    /// field's own sibling path untouched.
    #[test]
    fn prop_single_field_change_is_local(
        (n, source) in sized_source_strategy(),
        field_pick in 0usize..64usize,
        replacement in token_strategy(32),
    ) {
        let catalog = FieldCatalog::new(field_names(n)).unwrap();
        let config = CommitmentConfig::default();
        let record = RecordBuilder::new(&catalog, &config).build(&source).unwrap();
        let field = catalog.field_at((n + field_pick % n) as u64).unwrap();
        prop_assume!(&replacement != record.token(field).unwrap());

        let changed = record.with_token(field, replacement).unwrap();
        prop_assert_ne!(
            build_root(&catalog, &record).unwrap(),
            build_root(&catalog, &changed).unwrap()
        );
        prop_assert_eq!(
            generate_proof(&catalog, field, &record).unwrap(),
            generate_proof(&catalog, field, &changed).unwrap()
        );
    }

    /// **Property**: `index_of` is a bijection from the catalog onto `[N, 2N)`.
    #[test]
    fn prop_index_is_bijection(n in catalog_size_strategy()) {
        let catalog = FieldCatalog::new(field_names(n)).unwrap();
        let indices: BTreeSet<u64> = catalog
            .fields()
            .map(|f| index_of(&catalog, f).unwrap())
            .collect();
        let expected: BTreeSet<u64> = (n as u64..2 * n as u64).collect();
        prop_assert_eq!(&indices, &expected);
        for field in catalog.fields() {
            prop_assert_eq!(catalog.field_at(index_of(&catalog, field).unwrap()), Some(field));
        }
    }

    /// **Property**: catalogs whose size is not a power of two are refused.
    #[test]
    fn prop_invalid_catalog_sizes_rejected(n in invalid_catalog_size_strategy()) {
        let err = FieldCatalog::new(field_names(n)).unwrap_err();
        prop_assert_eq!(err, CommitError::CatalogSizeNotPowerOfTwo { size: n });
    }

    /// **Property**: derived tokens have the configured width, keep the value
    /// prefix, and pad with the filler.
    #[test]
    fn prop_tokens_have_configured_width(
        width in token_width_strategy(),
        value in field_value_strategy(),
    ) {
        let config = CommitmentConfig::new(width, b' ', 10).unwrap();
        let token = LeafDeriver::new(&config).derive("f", &value).unwrap();
        prop_assert_eq!(token.len(), width);

        let kept = value.len().min(width);
        prop_assert_eq!(&token.as_bytes()[..kept], &value.as_bytes()[..kept]);
        prop_assert!(token.as_bytes()[kept..].iter().all(|b| *b == b' '));
    }

    /// **Property**: every proof mutation is rejected.
    #[test]
    fn prop_mutations_rejected(
        (n, source) in sized_source_strategy(),
        field_pick in 0usize..64usize,
        mutation in mutation_strategy(),
    ) {
        let catalog = FieldCatalog::new(field_names(n)).unwrap();
        let config = CommitmentConfig::default();
        let record = RecordBuilder::new(&catalog, &config).build(&source).unwrap();
        let distinct: BTreeSet<&FieldToken> =
            catalog.fields().map(|f| record.token(f).unwrap()).collect();
        prop_assume!(distinct.len() == n);

        let field = catalog.field_at((n + field_pick % n) as u64).unwrap();
        let tree = MerkleTree::build(&catalog, &record).unwrap();
        let proof = FieldProof::from_tree(&catalog, &tree, &record, field).unwrap();
        let shape = ProofShape::new(&catalog, &config);
        prop_assert!(proof.verifies(&shape, tree.root()));

        if let Some(bad) = mutation.apply(&proof) {
            prop_assert!(!bad.verifies(&shape, tree.root()), "{:?} was accepted", mutation);
        }
    }

    /// **Property**: invariants hold and history stays append-only under random
    /// action sequences; honest proofs are always accepted and tampering,
    /// cross-block and replay attempts never are.
    #[test]
    fn prop_invariants_hold_under_random_actions(
        actions in commitment_action_sequence(30),
    ) {
        let mut harness = CommitmentHarness::beacon(b"prop-actions");
        let mut summary = TestRunSummary::default();

        for action in &actions {
            let before = harness.registry.checkpoints();
            let outcome = harness.apply(action);
            summary.record(&outcome);

            match action {
                CommitmentAction::CommitBlock { .. }
                | CommitmentAction::AdvanceTime { .. } => {
                    prop_assert_eq!(&outcome, &ActionOutcome::Accepted);
                }
                CommitmentAction::ProveAndVerify { .. } => {
                    prop_assert!(!matches!(outcome, ActionOutcome::Rejected(_)),
                        "honest proof refused: {:?}", outcome);
                }
                CommitmentAction::Tamper { .. }
                | CommitmentAction::CrossBlock { .. }
                | CommitmentAction::ReplayTimestamp { .. } => {
                    prop_assert!(outcome != ActionOutcome::Accepted,
                        "{:?} was accepted", action);
                }
            }

            let after = harness.registry.checkpoints();
            prop_assert!(after.len() >= before.len());
            prop_assert_eq!(&after[..before.len()], &before[..]);
        }

        prop_assert_eq!(summary.actions, actions.len());
        let violations = InvariantSet::commitment_defaults().check_all(&harness.snapshot());
        prop_assert!(violations.is_empty(), "violations: {:?}", violations);
    }
}

// ═════════════════════════════════════════════════════════════════════════════
//  Invariant Tests
// ═════════════════════════════════════════════════════════════════════════════

#[test]
fn test_all_invariants_hold_on_fresh_harness() {
    let harness = CommitmentHarness::beacon(b"fresh");
    let snapshot = harness.snapshot();
    assert_eq!(snapshot.leaf_count, 16);
    assert_eq!(snapshot.depth, 4);
    InvariantSet::commitment_defaults().assert_all(&snapshot);
}

#[test]
fn test_invariants_after_five_blocks() {
    let mut harness = CommitmentHarness::beacon(b"five");
    for number in 1..=5 {
        harness.commit_block(number).unwrap();
    }
    let snapshot = harness.snapshot();
    assert_eq!(snapshot.checkpoints.len(), 5);
    assert_eq!(snapshot.proof_count(), 5 * 16);
    InvariantSet::commitment_defaults().assert_all(&snapshot);
}

#[test]
fn test_invariants_detect_corrupted_snapshot() {
    let mut harness = CommitmentHarness::beacon(b"corrupt");
    harness.commit_block(1).unwrap();
    harness.commit_block(2).unwrap();

    let mut snapshot = harness.snapshot();
    snapshot.blocks[0].proofs[3].siblings[0] = "00".repeat(32);
    snapshot.checkpoints.pop();

    let names: Vec<String> = InvariantSet::commitment_defaults()
        .check_all(&snapshot)
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert!(names.contains(&ProofsVerifyAgainstRegistry.name().to_string()));
    assert!(names.contains(&BlocksMatchCheckpoints.name().to_string()));
    assert!(!names.contains(&ProofLengthMatchesDepth.name().to_string()));
}

#[test]
#[should_panic(expected = "Invariant violations detected")]
fn test_assert_all_panics_with_report() {
    let mut harness = CommitmentHarness::beacon(b"panic");
    harness.commit_block(1).unwrap();
    let mut snapshot = harness.snapshot();
    snapshot.checkpoints[0].root = "not-a-digest".to_string();
    InvariantSet::commitment_defaults().assert_all(&snapshot);
}

#[test]
fn test_transition_invariant_history_append_only() {
    let mut harness = CommitmentHarness::beacon(b"history");
    harness.commit_block(1).unwrap();
    let before = harness.snapshot();
    harness.commit_block(2).unwrap();
    let after = harness.snapshot();

    assert!(HistoryIsAppendOnly::check_transition(&before, &after).is_ok());
    assert!(HistoryIsAppendOnly::check_transition(&after, &before).is_err());

    let mut rewritten = after.clone();
    rewritten.checkpoints[0].root = rewritten.checkpoints[1].root.clone();
    assert!(HistoryIsAppendOnly::check_transition(&before, &rewritten).is_err());
}

#[test]
fn test_invariant_set_builder() {
    let mut set = InvariantSet::new();
    assert!(set.is_empty());
    set.add(Box::new(TimestampsStrictlyIncrease));
    assert_eq!(set.len(), 1);
    assert_eq!(InvariantSet::commitment_defaults().len(), 6);
}

// ═════════════════════════════════════════════════════════════════════════════
//  Scenario DSL Tests
// ═════════════════════════════════════════════════════════════════════════════

#[test]
fn test_scenario_historical_proofs_stay_valid() {
    Scenario::new("Five commitments, every block provable at its own timestamp")
        .given(|ctx| {
            let block = ctx.harness.commit_block(1).unwrap();
            ctx.store("t1", block.timestamp);
        })
        .when("four more blocks are committed", |ctx| {
            for number in 2..=5 {
                ctx.harness.advance_time(12);
                ctx.harness.commit_block(number).unwrap();
            }
        })
        .with_invariants(InvariantSet::commitment_defaults())
        .then("each block's Coinbase verifies only at its timestamp", |ctx| {
            let blocks = ctx.harness.blocks().to_vec();
            assert_eq!(blocks.len(), 5);
            assert_eq!(blocks[0].timestamp, ctx.load("t1"));
            for block in &blocks {
                let proof = ctx.harness.prove(block, "Coinbase").unwrap();
                assert_eq!(proof.index, 19);
                assert!(ctx.harness.verify(block.timestamp, &proof));
                for other in blocks.iter().filter(|b| b.timestamp != block.timestamp) {
                    assert!(!ctx.harness.verify(other.timestamp, &proof));
                }
            }
        })
        .run();
}

#[test]
fn test_scenario_replayed_timestamp_refused() {
    Scenario::new("A timestamp cannot be committed twice")
        .given(|ctx| {
            let block = ctx.harness.commit_block(1).unwrap();
            ctx.store("t1", block.timestamp);
        })
        .when("the same timestamp is reused", |ctx| {
            let record = ctx.harness.blocks()[0].record.clone();
            let t1 = ctx.load("t1");
            assert_commit_error!(
                ctx.harness.commit_record_at(2, t1, record),
                CommitError::TimestampNotIncreasing { .. }
            );
        })
        .then("the registry still holds one root", |ctx| {
            assert_eq!(ctx.harness.registry.len(), 1);
        })
        .run();
}

#[test]
fn test_scenario_same_header_gets_fresh_placeholders() {
    Scenario::new("Recommitting a header draws new consensus-layer placeholders")
        .given(|ctx| {
            ctx.harness.commit_block(7).unwrap();
        })
        .when("the same header is committed again", |ctx| {
            ctx.harness.commit_block(7).unwrap();
        })
        .then("roots differ but execution fields are identical", |ctx| {
            let blocks = ctx.harness.blocks();
            assert_ne!(blocks[0].root, blocks[1].root);
            assert_eq!(
                blocks[0].record.token("Coinbase").unwrap(),
                blocks[1].record.token("Coinbase").unwrap()
            );
            assert!(blocks[1].record.is_synthetic("Graffiti"));
            assert_ne!(
                blocks[0].record.token("Graffiti").unwrap(),
                blocks[1].record.token("Graffiti").unwrap()
            );
        })
        .run();
}

#[test]
fn test_scenario_custom_catalog_and_config() {
    let catalog = FieldCatalog::new(["Coinbase", "Time", "Slot", "Graffiti"]).unwrap();
    let config = CommitmentConfig::new(8, b'_', 4).unwrap();
    Scenario::new("Narrow tokens over a four-field catalog")
        .with_catalog(catalog)
        .with_config(config)
        .with_seed(b"narrow")
        .when("one block is committed", |ctx| {
            ctx.harness.commit_block(3).unwrap();
        })
        .with_invariants(InvariantSet::commitment_defaults())
        .then("tokens are eight bytes and proofs have two siblings", |ctx| {
            let block = ctx.harness.latest().unwrap().clone();
            assert_eq!(block.record.token("Coinbase").unwrap().len(), 8);
            assert_eq!(block.record.token("Slot").unwrap().len(), 8);
            let proof = ctx.harness.prove(&block, "Time").unwrap();
            assert_eq!(proof.siblings.len(), 2);
            assert_eq!(proof.index, 5);
            assert!(ctx.harness.verify(block.timestamp, &proof));
        })
        .run();
}

#[test]
fn test_run_scenarios_counts_failures() {
    let passing = Scenario::new("commit succeeds").when("commit", |ctx| {
        ctx.harness.commit_block(1).unwrap();
    });
    let failing = Scenario::new("unknown field proof").then("prove", |ctx| {
        ctx.harness.commit_block(1).unwrap();
        let block = ctx.harness.blocks()[0].clone();
        ctx.harness.prove(&block, "WithdrawalsRoot").unwrap();
    });
    assert_eq!(run_scenarios(vec![passing, failing]), (1, 1));
}

#[test]
#[should_panic(expected = "failed at then step 'the late block verifies at the early timestamp'")]
fn test_scenario_failure_names_the_step() {
    Scenario::new("cross-timestamp proof")
        .when("two blocks are committed", |ctx| {
            ctx.harness.commit_block(1).unwrap();
            ctx.harness.commit_block(2).unwrap();
        })
        .then("the late block verifies at the early timestamp", |ctx| {
            let early = ctx.harness.blocks()[0].clone();
            let late = ctx.harness.blocks()[1].clone();
            let proof = ctx.harness.prove(&late, "Coinbase").unwrap();
            assert!(ctx.harness.verify(early.timestamp, &proof));
        })
        .run();
}

// ═════════════════════════════════════════════════════════════════════════════
//  Mutation Testing
// ═════════════════════════════════════════════════════════════════════════════

fn beacon_proof(field: &str) -> (CommitmentHarness, CommittedBlock, FieldProof) {
    let mut harness = CommitmentHarness::beacon(b"mutation");
    let block = harness.commit_block(42).unwrap();
    let proof = harness.prove(&block, field).unwrap();
    (harness, block, proof)
}

#[test]
fn test_every_mutation_detected() {
    let (harness, block, proof) = beacon_proof("Coinbase");
    assert!(harness.verify(block.timestamp, &proof));

    let mutations = [
        Mutation::CorruptSibling { position: 0 },
        Mutation::CorruptSibling { position: 63 },
        Mutation::Truncate,
        Mutation::Extend,
        Mutation::Reverse,
        Mutation::SiblingIndex,
        Mutation::ForeignValue,
        Mutation::ZeroIndex,
        Mutation::InternalNode,
    ];
    for mutation in &mutations {
        let bad = mutation.apply(&proof).unwrap();
        assert!(
            !harness.verify(block.timestamp, &bad),
            "{:?} was accepted",
            mutation
        );
    }
}

#[test]
fn test_internal_node_claim_folds_to_root_but_is_refused() {
    let (harness, block, proof) = beacon_proof("Coinbase");
    let root = harness.registry.root_at(block.timestamp).unwrap().clone();

    // One level up: Coinbase at 19 becomes a claim on slot 9.
    let bad = Mutation::InternalNode.apply(&proof).unwrap();
    assert_eq!(bad.index, 9);
    assert_eq!(bad.value.len(), 128);
    assert_eq!(bad.siblings.as_slice(), &proof.siblings[1..]);

    assert!(verify_locally(bad.value.as_bytes(), bad.index, &bad.siblings, &root));
    assert!(!harness.verify(block.timestamp, &bad));
    assert!(!bad.verifies(harness.registry.shape(), &root));

    // Applied repeatedly, the claim climbs to the root slot; still refused.
    let mut climbing = bad;
    while let Some(next) = Mutation::InternalNode.apply(&climbing) {
        assert!(verify_locally(next.value.as_bytes(), next.index, &next.siblings, &root));
        assert!(!harness.verify(block.timestamp, &next));
        climbing = next;
    }
    assert_eq!(climbing.index, 1);
    assert!(climbing.siblings.is_empty());
}

#[test]
fn test_mutation_not_applicable_to_single_leaf() {
    let catalog = FieldCatalog::new(["only"]).unwrap();
    let mut harness = CommitmentHarness::new(catalog, CommitmentConfig::default(), b"one");
    let mut source = std::collections::BTreeMap::new();
    source.insert("only".to_string(), "value".to_string());
    let block = harness.commit_source(1, &source).unwrap();
    let proof = harness.prove(&block, "only").unwrap();
    assert!(proof.siblings.is_empty());
    assert!(harness.verify(block.timestamp, &proof));

    assert!(Mutation::Truncate.apply(&proof).is_none());
    assert!(Mutation::Reverse.apply(&proof).is_none());
    assert!(Mutation::SiblingIndex.apply(&proof).is_none());
    assert!(Mutation::InternalNode.apply(&proof).is_none());
    let extended = Mutation::Extend.apply(&proof).unwrap();
    assert!(!harness.verify(block.timestamp, &extended));
}

// ═════════════════════════════════════════════════════════════════════════════
//  Snapshot Tests
// ═════════════════════════════════════════════════════════════════════════════

#[test]
fn test_snapshot_captures_committed_state() {
    let mut harness = CommitmentHarness::beacon(b"snapshot");
    let first = harness.commit_block(1).unwrap();
    harness.advance_time(100);
    let second = harness.commit_block(2).unwrap();
    assert!(second.timestamp >= first.timestamp + 100);

    let snapshot = harness.snapshot();
    assert_eq!(snapshot.root_at(first.timestamp), Some(&first.root));
    assert_eq!(snapshot.root_at(second.timestamp), Some(&second.root));
    assert_eq!(snapshot.root_at(second.timestamp + 1), None);
    assert_eq!(snapshot.blocks[1].proofs.len(), 16);
}

// ═════════════════════════════════════════════════════════════════════════════
//  Edge Case Tests
// ═════════════════════════════════════════════════════════════════════════════

#[test]
fn test_missing_field_without_placeholders() {
    let catalog = FieldCatalog::beacon_block();
    let config = CommitmentConfig::default();
    let header = execution_header(1);
    assert_commit_error!(
        RecordBuilder::new(&catalog, &config).build(&header),
        CommitError::MissingField { .. }
    );
}

#[test]
fn test_empty_value_aborts_commit() {
    let mut harness = CommitmentHarness::beacon(b"empty");
    let mut header = execution_header(1);
    header.insert("GasUsed".to_string(), String::new());
    assert_commit_error!(
        harness.commit_source(1, &header),
        CommitError::EmptyFieldValue { .. }
    );
    assert!(harness.registry.is_empty());
    assert!(harness.blocks().is_empty());
}

#[test]
fn test_seeded_builds_are_reproducible() {
    let catalog = FieldCatalog::beacon_block();
    let config = CommitmentConfig::default();
    let header = execution_header(9);
    let build = |seed: &[u8]| {
        let mut synth = SeededPlaceholder::new(seed);
        let record = RecordBuilder::new(&catalog, &config)
            .with_placeholders(&mut synth)
            .build(&header)
            .unwrap();
        build_root(&catalog, &record).unwrap()
    };
    assert_eq!(build(b"same"), build(b"same"));
    assert_ne!(build(b"same"), build(b"different"));
}
