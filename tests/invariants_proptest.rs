//! Random register/unregister batches checked against a simple model of which
//! instances are live.

use std::collections::{BTreeMap, BTreeSet};

use proptest::prelude::*;
use proptest::test_runner::{Config as PropConfig, RngAlgorithm, TestRng, TestRunner};

use usd_instancing::instancing::{InstanceCache, Registration, PROTOTYPE_PREFIX};
use usd_instancing::pcp::{ArcType, CompositionArc, CompositionKey, PrimIndex};
use usd_instancing::sdf::{self, Path};
use usd_instancing::stage::LoadRules;

// Nested paths exercise subtree unregistration.
const PATHS: &[&str] = &["/A", "/A/B", "/A/C", "/A/C/D", "/E", "/E/F", "/G", "/H"];
const ASSETS: &[&str] = &["a.usda", "b.usda", "c.usda"];

#[derive(Debug, Clone)]
enum Op {
    Register { path: usize, asset: usize },
    Unregister { path: usize },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..PATHS.len(), 0..ASSETS.len()).prop_map(|(path, asset)| Op::Register { path, asset }),
        (0..PATHS.len()).prop_map(|path| Op::Unregister { path }),
    ]
}

fn p(path: &str) -> Path {
    sdf::path(path).expect("valid path")
}

fn prim_index(path: &Path, asset: usize) -> PrimIndex {
    let key = CompositionKey::new([CompositionArc::new(ArcType::Reference, ASSETS[asset], p("/Root"))]);
    PrimIndex::new(path.clone(), key)
}

fn prototype_number(prototype: &Path) -> Option<usize> {
    prototype.name().strip_prefix(PROTOTYPE_PREFIX)?.parse().ok()
}

#[test]
fn proptest_seed_pinned_batches_keep_cache_consistent() {
    const SEED_BYTES: [u8; 32] = [
        0x17, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    ];

    let rng = TestRng::from_seed(RngAlgorithm::ChaCha, &SEED_BYTES);
    let mut runner = TestRunner::new_with_rng(PropConfig::default(), rng);

    let batches = prop::collection::vec(prop::collection::vec(op(), 0..8), 1..8);

    runner
        .run(&batches, |batches| {
            let mut cache = InstanceCache::new();
            let rules = LoadRules::default();

            // Live instance path -> asset it references.
            let mut live: BTreeMap<Path, usize> = BTreeMap::new();
            let mut highest_prototype = 0;

            for batch in &batches {
                let assets_with_prototype: BTreeSet<usize> = live.values().copied().collect();

                // Unregistration always precedes re-registration within a batch.
                for op in batch {
                    if let Op::Unregister { path } = op {
                        let root = p(PATHS[*path]);
                        cache.unregister_instance_prim_indexes_under(&root);
                        live.retain(|member, _| !member.has_prefix(&root));
                    }
                }

                let mut registered_assets = BTreeSet::new();
                let mut told_to_compose = BTreeSet::new();
                for op in batch {
                    let Op::Register { path, asset } = op else {
                        continue;
                    };
                    let path = p(PATHS[*path]);
                    if live.contains_key(&path) {
                        continue;
                    }

                    let registration = cache.register_instance_prim_index(&prim_index(&path, *asset), None, &rules);
                    let expect_new = !assets_with_prototype.contains(asset) && !registered_assets.contains(asset);
                    prop_assert_eq!(registration == Registration::NeedsNewPrototype, expect_new);
                    if expect_new {
                        told_to_compose.insert(path.clone());
                    }

                    live.insert(path, *asset);
                    registered_assets.insert(*asset);
                }

                let changes = cache.process_changes();
                if let Err(err) = cache.validate() {
                    return Err(TestCaseError::fail(format!("inconsistent cache: {err:#}")));
                }
                prop_assert!(cache.process_changes().is_empty());

                prop_assert_eq!(changes.new_prototypes.len(), told_to_compose.len());
                for new in &changes.new_prototypes {
                    prop_assert!(told_to_compose.contains(&new.source));
                    let number = prototype_number(&new.prototype);
                    prop_assert!(number.is_some_and(|number| number > highest_prototype));
                    highest_prototype = number.unwrap_or(highest_prototype);
                }

                let mut members_by_asset: BTreeMap<usize, Vec<Path>> = BTreeMap::new();
                for (path, asset) in &live {
                    members_by_asset.entry(*asset).or_default().push(path.clone());
                }
                prop_assert_eq!(cache.num_prototypes(), members_by_asset.len());

                let mut prototypes = BTreeSet::new();
                for members in members_by_asset.values() {
                    let prototype = cache.prototype_for_instanceable_prim_index_path(&members[0]);
                    prop_assert!(!prototype.is_empty());
                    prop_assert_eq!(&cache.instance_prim_indexes_for_prototype(&prototype), members);
                    prop_assert!(prototypes.insert(prototype));
                }

                for dead in &changes.dead_prototypes {
                    prop_assert!(!prototypes.contains(dead));
                }

                // A source replaced without new registrations for its key is
                // the smallest remaining member.
                for changed in &changes.changed_prototypes {
                    let asset = live.get(&changed.new_source).copied();
                    prop_assert!(asset.is_some());
                    if asset.is_some_and(|asset| !registered_assets.contains(&asset)) {
                        let members = cache.instance_prim_indexes_for_prototype(&changed.prototype);
                        prop_assert_eq!(Some(&changed.new_source), members.first());
                    }
                }
            }

            Ok(())
        })
        .expect("proptest with pinned seed should complete");
}
