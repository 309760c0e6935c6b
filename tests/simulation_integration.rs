//! Integration tests for long-running simulations
//!
//! These tests run populated worlds for many years and check the invariants
//! that must hold between ticks:
//! - Nation fields stay within their bounds
//! - `at_war` matches the enemy list, and both sides agree on every war
//! - Every trade route has a matching mirror and ledger entry
//! - Saves round trip and reject damaged documents

use nation_sim::core::config::SimulationConfig;
use nation_sim::engine::setup;
use nation_sim::engine::tick::simulate_years;
use nation_sim::nation::MIN_POPULATION;
use nation_sim::persistence;
use nation_sim::{simulate_year, SimError, World};

fn populated(seed: u64, nations: usize) -> World {
    let mut world = World::new(SimulationConfig::seeded(seed)).unwrap();
    setup::populate(&mut world, nations);
    world
}

fn assert_invariants(world: &World) {
    let cap = world.config().stockpile_cap;
    for n in world.nations() {
        assert!((0.0..=1.0).contains(&n.stability), "{} stability {}", n.name, n.stability);
        assert!(n.population >= MIN_POPULATION, "{} population {}", n.name, n.population);
        assert!((0.0..=cap).contains(&n.resources.food), "{} food {}", n.name, n.resources.food);
        assert!(
            (0.0..=cap).contains(&n.resources.minerals),
            "{} minerals {}",
            n.name,
            n.resources.minerals
        );
        assert!(n.resources.technology >= 0.0);
        assert!(n.resources.gold >= 0.0, "{} gold {}", n.name, n.resources.gold);

        assert_eq!(n.at_war, !n.war_with.is_empty(), "{} at_war out of sync", n.name);
        for enemy in &n.war_with {
            let other = world.nation(*enemy).unwrap();
            assert!(other.war_with.contains(&n.id), "{} and {} disagree on war", n.name, other.name);
        }

        for route in &n.trade_routes {
            let partner = world.nation(route.partner).unwrap();
            let mirror = partner
                .trade_routes
                .iter()
                .find(|r| r.id == route.id)
                .unwrap_or_else(|| panic!("{} has no mirror in {}", route.id, partner.name));
            assert_eq!(mirror.amount, -route.amount);
            assert_eq!(mirror.partner, n.id);
            assert!(world.trade_routes().iter().any(|r| r.route.id == route.id));
        }
    }
    assert!(world.notifications().len() <= world.config().notification_capacity);
}

#[test]
fn test_century_keeps_invariants() {
    let mut world = populated(11, 8);
    assert_invariants(&world);

    for _ in 0..100 {
        simulate_year(&mut world);
        assert_invariants(&world);
    }
    assert_eq!(world.year(), 2123);
}

#[test]
fn test_hostile_world_keeps_invariants() {
    let config = SimulationConfig {
        war_declaration_chance: 1.0,
        hostile_threshold: 0.0,
        battle_chance: 1.0,
        ..SimulationConfig::seeded(5)
    };
    let mut world = World::new(config).unwrap();
    setup::populate(&mut world, 6);

    let reports = simulate_years(&mut world, 60);
    assert_invariants(&world);
    assert!(reports.iter().map(|r| r.wars_declared).sum::<usize>() > 0);
    assert!(reports.iter().map(|r| r.battles).sum::<usize>() > 0);
}

#[test]
fn test_same_seed_same_history() {
    let mut first = populated(99, 5);
    let mut second = populated(99, 5);
    simulate_years(&mut first, 30);
    simulate_years(&mut second, 30);
    assert_eq!(
        persistence::serialize(&first).unwrap(),
        persistence::serialize(&second).unwrap()
    );
}

#[test]
fn test_save_round_trip_after_simulation() {
    let mut world = populated(3, 6);
    simulate_years(&mut world, 25);

    let bytes = persistence::serialize(&world).unwrap();
    let loaded = persistence::deserialize(&bytes, SimulationConfig::seeded(3)).unwrap();

    assert_eq!(loaded.year(), world.year());
    assert_eq!(loaded.nations().len(), world.nations().len());
    assert_eq!(loaded.active_wars(), world.active_wars());
    assert_eq!(loaded.war_history(), world.war_history());
    assert_eq!(loaded.trade_routes(), world.trade_routes());
    assert_eq!(loaded.diplomatic_actions(), world.diplomatic_actions());
    assert_eq!(loaded.market(), world.market());
    assert_eq!(loaded.terrain(), world.terrain());
    assert_invariants(&loaded);
}

#[test]
fn test_loaded_world_keeps_running() {
    let mut world = populated(8, 4);
    simulate_years(&mut world, 10);
    let mut loaded =
        persistence::deserialize(&persistence::serialize(&world).unwrap(), SimulationConfig::seeded(8)).unwrap();

    simulate_years(&mut loaded, 20);
    assert_eq!(loaded.year(), world.year() + 20);
    assert_invariants(&loaded);
}

#[test]
fn test_save_file_round_trip() {
    let mut world = populated(21, 3);
    simulate_years(&mut world, 5);

    let path = std::env::temp_dir().join(format!("nation-sim-save-{}.json", std::process::id()));
    persistence::save_to_path(&world, &path).unwrap();
    let loaded = persistence::load_from_path(&path, SimulationConfig::default()).unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(loaded.year(), world.year());
    assert_eq!(loaded.nations().len(), 3);
}

#[test]
fn test_missing_save_file_is_io_error() {
    let path = std::env::temp_dir().join("nation-sim-does-not-exist.json");
    assert!(matches!(
        persistence::load_from_path(&path, SimulationConfig::default()),
        Err(SimError::IoError(_))
    ));
}

#[test]
fn test_every_required_key_is_checked() {
    let world = populated(2, 2);
    let value: serde_json::Value = serde_json::from_slice(&persistence::serialize(&world).unwrap()).unwrap();

    for key in persistence::REQUIRED_KEYS {
        let mut damaged = value.clone();
        damaged.as_object_mut().unwrap().remove(key);
        let bytes = serde_json::to_vec(&damaged).unwrap();
        match persistence::deserialize(&bytes, SimulationConfig::default()) {
            Err(SimError::CorruptSave(reason)) => assert!(reason.contains(key), "{}", reason),
            other => panic!("missing `{}` not rejected: {:?}", key, other.map(|w| w.year())),
        }
    }
}
