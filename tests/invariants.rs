//! Property checks over the full pipeline: the invariants every generated
//! dungeon must satisfy regardless of seed or grid size.

use dungeon_forge::settings::{EnemySpawnRule, ItemSpawnRule};
use dungeon_forge::{GenerationSettings, Pipeline, SpawnSettings, StartingPointCriteria};
use proptest::prelude::*;
use std::collections::HashMap;

fn spawn_settings() -> SpawnSettings {
    SpawnSettings {
        items: vec![ItemSpawnRule {
            id: "potion".into(),
            weight: 2.0,
            max_per_room: 2,
            allowed_room_types: vec![],
            min_distance_from_start: 0,
            max_distance_from_start: u32::MAX,
        }],
        enemies: vec![EnemySpawnRule {
            id: "skeleton".into(),
            weight: 1.0,
            max_per_room: 3,
            allowed_room_types: vec![],
            min_distance_from_start: 1,
            max_distance_from_start: u32::MAX,
            min_distance_from_other_enemies: 2,
            is_boss: false,
        }],
        ..Default::default()
    }
}

fn run(settings: &GenerationSettings) -> Pipeline {
    let mut pipeline = Pipeline::new();
    pipeline
        .generate_complete(
            settings,
            &StartingPointCriteria::default(),
            &spawn_settings(),
        )
        .expect("generation succeeds for valid settings");
    pipeline
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn dungeon_invariants_hold_for_any_seed(
        seed in any::<u64>(),
        width in 40i32..140,
        height in 40i32..140,
    ) {
        let pipeline = run(&GenerationSettings {
            width,
            height,
            seed,
            ..Default::default()
        });
        let model = pipeline.model();

        // Room graph fully connected.
        prop_assert!(model.are_all_rooms_connected());

        // No two rooms overlap.
        for a in &model.rooms {
            for b in &model.rooms {
                if a.id != b.id {
                    prop_assert!(!a.bounds.intersects(&b.bounds));
                }
            }
        }

        // Exactly one entrance after the full pipeline.
        prop_assert_eq!(
            model.doors.iter().filter(|d| d.is_entrance).count(),
            1
        );

        // A starting room always exists.
        prop_assert!(model.starting_room.is_some());
    }

    #[test]
    fn spawn_constraints_hold_for_any_seed(seed in any::<u64>()) {
        let pipeline = run(&GenerationSettings {
            seed,
            ..Default::default()
        });
        let model = pipeline.model();

        // Per-room, per-id caps.
        let mut per_room: HashMap<(usize, &str), u32> = HashMap::new();
        for spawn in pipeline.spawns() {
            let room = model
                .room_at(spawn.position.x, spawn.position.y)
                .expect("spawns land inside rooms");
            *per_room.entry((room, spawn.entity_id.as_str())).or_insert(0) += 1;
        }
        for ((_, id), count) in &per_room {
            let cap = if *id == "potion" { 2 } else { 3 };
            prop_assert!(*count <= cap);
        }

        // Skeletons demand hop distance >= 1, so never the starting room.
        let start = model.starting_room.unwrap();
        for spawn in pipeline.spawns() {
            let room = model.room_at(spawn.position.x, spawn.position.y).unwrap();
            prop_assert_ne!(room, start);
        }
    }
}

#[test]
fn scenario_seed_12345_is_reproducible() {
    let settings = GenerationSettings {
        width: 100,
        height: 100,
        min_room_size: 8,
        max_room_size: 20,
        seed: 12345,
        ..Default::default()
    };
    let a = run(&settings);
    let b = run(&settings);
    assert_eq!(a.model().tiles(), b.model().tiles());

    let c = run(&GenerationSettings {
        seed: 54321,
        ..settings
    });
    assert_ne!(a.model().tiles(), c.model().tiles());
    assert!(c.model().are_all_rooms_connected());
}
