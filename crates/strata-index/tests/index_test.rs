//! Integration tests for the multilevel index engine.
//!
//! Covers:
//! - Structural invariants of built levels for arbitrary datasets
//! - Search correctness and access-count bounds
//! - Insert/delete round trips through full rebuilds
//! - Loading records from text and comparing against a sequential scan
//! - Readers observing only complete snapshots while a writer mutates

use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::BTreeSet;
use strata_common::{DataRecord, IndexConfig, RecordId, StrataError};
use strata_index::{
    MultilevelIndex, SearchEngine, SearchOutcome, TargetType, build_all, configure,
    required_levels, scan_without_index,
};
use strata_store::{GeneratorConfig, RecordStore, generate};
use tempfile::tempdir;

// =============================================================================
// Helpers
// =============================================================================

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Config with exactly `data_per_block` records per block and fan-out `fanout`.
fn config_for(data_per_block: usize, fanout: usize) -> IndexConfig {
    IndexConfig::new(32 * data_per_block * fanout, 32 * fanout, 32 * data_per_block)
}

fn records_from(ids: &BTreeSet<RecordId>) -> Vec<DataRecord> {
    ids.iter()
        .map(|&id| DataRecord::new(id, format!("n{id}"), (id % 80) as u32))
        .collect()
}

fn id_sets() -> impl Strategy<Value = BTreeSet<RecordId>> {
    proptest::collection::btree_set(0i64..50_000, 0..400)
}

fn non_empty_id_sets() -> impl Strategy<Value = BTreeSet<RecordId>> {
    proptest::collection::btree_set(0i64..50_000, 1..400)
}

// =============================================================================
// Worked example
// =============================================================================

#[test]
fn test_worked_example() {
    init_tracing();
    let records: Vec<_> = (1..=15).map(|i| DataRecord::new(i * 10, "r", 1)).collect();
    let index = MultilevelIndex::new(config_for(3, 4), records).unwrap();

    let configuration = index.configuration();
    assert_eq!(configuration.data_records_per_block(), 3);
    assert_eq!(configuration.index_records_per_block(), 4);
    assert_eq!(configuration.total_levels(), 3);

    let snapshot = index.snapshot();
    assert_eq!(snapshot.level(1).unwrap().len(), 5);
    assert_eq!(snapshot.level(2).unwrap().len(), 2);

    let result = index.search(80);
    assert!(result.is_found());
    assert_eq!(result.record.as_ref().map(|r| r.id), Some(80));
    assert_eq!(result.accesses_at(2), 1);
    assert!(result.data_accesses <= 3);
    assert_eq!(result.blocks_read(), 3);
}

// =============================================================================
// Structural and search properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_levels_are_well_formed(
        ids in id_sets(),
        data_per_block in 1usize..8,
        fanout in 2usize..8,
    ) {
        let records = records_from(&ids);
        let levels = build_all(&records, data_per_block, fanout).unwrap();

        if records.is_empty() {
            prop_assert!(levels.is_empty());
            return Ok(());
        }

        prop_assert_eq!(
            levels.len() + 1,
            required_levels(records.len(), data_per_block, fanout)
        );
        prop_assert!(levels.last().unwrap().len() <= fanout);
        for pair in levels.windows(2) {
            prop_assert!(pair[1].len() < pair[0].len());
        }

        for level in &levels {
            for (position, entry) in level.entries().iter().enumerate() {
                prop_assert_eq!(entry.level, level.number());
                prop_assert_eq!(entry.block_id, position);
                prop_assert!(entry.first_key <= entry.last_key);
                let expected = if level.number() == 1 {
                    TargetType::Data
                } else {
                    TargetType::Level(level.number() - 1)
                };
                prop_assert_eq!(entry.target, expected);
            }
            for pair in level.entries().windows(2) {
                prop_assert!(pair[0].last_key < pair[1].first_key);
            }
        }

        // The top level spans the whole dataset.
        let (first, last) = levels.last().unwrap().key_range().unwrap();
        prop_assert_eq!(first, records[0].id);
        prop_assert_eq!(last, records[records.len() - 1].id);
    }

    #[test]
    fn test_every_present_id_is_found(
        ids in non_empty_id_sets(),
        data_per_block in 1usize..8,
        fanout in 2usize..8,
    ) {
        let records = records_from(&ids);
        let config = config_for(data_per_block, fanout);
        let configuration = configure(records.len(), &config).unwrap();
        let levels = build_all(&records, data_per_block, fanout).unwrap();
        let engine = SearchEngine::new(&levels, &records, &configuration);

        for record in &records {
            let result = engine.search(record.id);
            prop_assert!(result.is_found());
            prop_assert_eq!(result.record.as_ref(), Some(record));
            // Bounded by fan-out per level, never by the record count.
            prop_assert!(result.index_accesses() <= levels.len() * fanout);
            prop_assert!(result.data_accesses <= data_per_block);
            prop_assert_eq!(result.blocks_read(), levels.len() + 1);
        }
    }

    #[test]
    fn test_absent_ids_are_not_found(
        ids in non_empty_id_sets(),
        probes in proptest::collection::vec(-100i64..50_100, 1..50),
        data_per_block in 1usize..8,
        fanout in 2usize..8,
    ) {
        let records = records_from(&ids);
        let config = config_for(data_per_block, fanout);
        let configuration = configure(records.len(), &config).unwrap();
        let levels = build_all(&records, data_per_block, fanout).unwrap();
        let engine = SearchEngine::new(&levels, &records, &configuration);

        for id in probes.into_iter().filter(|id| !ids.contains(id)) {
            let result = engine.search(id);
            prop_assert_eq!(result.outcome, SearchOutcome::NotFound);
            prop_assert!(result.record.is_none());
        }
    }

    #[test]
    fn test_insert_and_delete_round_trip(
        ids in proptest::collection::btree_set(0i64..10_000, 1..200),
        extra in 10_000i64..20_000,
    ) {
        let index = MultilevelIndex::new(config_for(4, 3), records_from(&ids)).unwrap();

        index.insert(DataRecord::new(extra, "extra", 1)).unwrap();
        prop_assert!(index.search(extra).is_found());
        prop_assert!(index.insert(DataRecord::new(extra, "again", 2)).is_err());

        let victim = *ids.iter().next().unwrap();
        prop_assert!(index.delete(victim));
        prop_assert_eq!(index.search(victim).outcome, SearchOutcome::NotFound);
        prop_assert!(!index.delete(victim));

        prop_assert_eq!(index.len(), ids.len());
        prop_assert_eq!(
            index.level_count() + 1,
            required_levels(index.len(), 4, 3)
        );
    }
}

// =============================================================================
// End to end
// =============================================================================

#[test]
fn test_load_generated_records_and_compare_with_scan() {
    init_tracing();
    let dir = tempdir().unwrap();
    let path = dir.path().join("people.txt");

    let generator = GeneratorConfig {
        count: 5000,
        ..Default::default()
    };
    let generated = generate(&generator, &mut StdRng::seed_from_u64(2024));
    RecordStore::from_records(generated.clone())
        .unwrap()
        .save(&path)
        .unwrap();

    let store = RecordStore::load(&path).unwrap();
    assert_eq!(store.as_slice(), generated.as_slice());

    let index = MultilevelIndex::from_store(IndexConfig::default(), store).unwrap();
    let configuration = index.configuration();
    // 5000 records / 8 = 625 blocks -> 20 entries at level 2
    assert_eq!(configuration.total_levels(), 3);

    let snapshot = index.snapshot();
    let mut indexed_blocks = 0;
    let mut scanned_blocks = 0;
    for record in snapshot.records() {
        let result = snapshot.search(record.id);
        assert!(result.is_found());
        indexed_blocks += result.blocks_read();

        let scan = scan_without_index(
            snapshot.records().as_slice(),
            record.id,
            configuration.data_records_per_block(),
        );
        assert!(scan.found);
        scanned_blocks += scan.blocks_read;
    }
    assert_eq!(indexed_blocks, 3 * 5000);
    assert!(indexed_blocks * 10 < scanned_blocks);
}

#[test]
fn test_configure_rejects_empty_dataset_but_index_allows_it() {
    let err = configure(0, &IndexConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        StrataError::InvalidParameter { ref name, .. } if name == "record_count"
    ));

    let index = MultilevelIndex::new(IndexConfig::default(), Vec::new()).unwrap();
    assert!(index.is_empty());
    assert_eq!(index.configuration().total_levels(), 1);
}

#[test]
fn test_readers_see_complete_snapshots_during_writes() {
    init_tracing();
    let index = MultilevelIndex::new(config_for(2, 3), Vec::new()).unwrap();

    std::thread::scope(|scope| {
        scope.spawn(|| {
            for id in 0..300 {
                index.insert(DataRecord::new(id, "w", 1)).unwrap();
            }
            for id in (0..300).step_by(2) {
                assert!(index.delete(id));
            }
        });

        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..200 {
                    let snapshot = index.snapshot();
                    let configuration = snapshot.configuration();
                    assert_eq!(configuration.record_count(), snapshot.records().len());
                    assert_eq!(snapshot.levels().len(), configuration.index_levels());
                    if let Some(top) = snapshot.top_level() {
                        assert!(top.len() <= configuration.index_records_per_block());
                    }
                    for record in snapshot.records().iter().take(5) {
                        assert!(snapshot.search(record.id).is_found());
                    }
                }
            });
        }
    });

    assert_eq!(index.len(), 150);
    assert!(index.search(1).is_found());
    assert_eq!(index.search(2).outcome, SearchOutcome::NotFound);
}
