//! Demo world setup - founds a set of nations with random land holdings

use std::collections::VecDeque;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::core::types::{Cell, Economy, Government, NationId};
use crate::engine::World;
use crate::nation::NationParams;

const NAMES: [&str; 12] = [
    "Aldoria", "Belmarch", "Corvania", "Draskel", "Elvaran", "Fenmoor", "Galdra", "Hestoria",
    "Istrava", "Jorvik", "Kalmund", "Lorrath",
];

const COLORS: [&str; 8] = [
    "#e74c3c", "#3498db", "#2ecc71", "#f1c40f", "#9b59b6", "#e67e22", "#1abc9c", "#34495e",
];

/// Cells each demo nation tries to claim
pub const DEMO_TERRITORY: usize = 20;

/// Found `count` nations, each on a contiguous patch of unclaimed land,
/// and seed random starting relations in [-60, 60].
pub fn populate(world: &mut World, count: usize) -> Vec<NationId> {
    let mut founded = Vec::with_capacity(count);
    for i in 0..count {
        let params = random_params(world, i);
        let id = world.create_nation(params);
        claim_blob(world, id, DEMO_TERRITORY);
        founded.push(id);
    }

    for &a in &founded {
        for &b in &founded {
            if a == b {
                continue;
            }
            let relation = world.rng.gen_range(-60..=60) as f64;
            if let Some(n) = world.nation_mut(a) {
                n.set_relation(b, relation);
            }
        }
    }

    tracing::info!("Founded {} demo nations", founded.len());
    founded
}

fn random_params(world: &mut World, index: usize) -> NationParams {
    let rng = &mut world.rng;
    let base = NAMES[index % NAMES.len()];
    let name = if index < NAMES.len() {
        base.to_string()
    } else {
        format!("{} {}", base, index / NAMES.len() + 1)
    };
    NationParams {
        name,
        color: COLORS[index % COLORS.len()].to_string(),
        government: *Government::ALL.choose(rng).unwrap_or(&Government::Monarchy),
        economy: *Economy::ALL.choose(rng).unwrap_or(&Economy::Mixed),
        population: rng.gen_range(5.0..50.0),
        military_strength: rng.gen_range(1..=10),
    }
}

/// Claim up to `size` connected land cells around a random unclaimed capital.
/// Returns how many cells were claimed.
pub fn claim_blob(world: &mut World, nation: NationId, size: usize) -> usize {
    let free: Vec<Cell> = world
        .terrain
        .land_cells()
        .filter(|c| world.owner_of(*c).is_none())
        .collect();
    let Some(&capital) = free.choose(&mut world.rng) else {
        tracing::warn!("No free land left for {}", nation);
        return 0;
    };

    let mut claimed = 0;
    let mut frontier = VecDeque::from([capital]);
    while let Some(cell) = frontier.pop_front() {
        if claimed >= size {
            break;
        }
        if !is_land(world, cell) || !world.claim_cell(nation, cell) {
            continue;
        }
        claimed += 1;
        let mut next = cell.neighbors();
        next.shuffle(&mut world.rng);
        frontier.extend(next);
    }
    claimed
}

fn is_land(world: &World, cell: Cell) -> bool {
    world.terrain.get(cell).map_or(false, |t| t.is_land())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimulationConfig;
    use crate::engine::test_support::*;

    #[test]
    fn test_populate_founds_disjoint_nations() {
        let mut world = small_world(SimulationConfig::default());
        let ids = populate(&mut world, 4);
        assert_eq!(ids.len(), 4);

        let mut seen = std::collections::HashSet::new();
        for n in world.nations() {
            assert!(!n.territories.is_empty());
            assert!(n.territories.len() <= DEMO_TERRITORY);
            for cell in &n.territories {
                assert!(seen.insert(*cell), "{} claimed twice", cell);
            }
        }
    }

    #[test]
    fn test_relations_seeded_in_range() {
        let mut world = small_world(SimulationConfig::default());
        let ids = populate(&mut world, 3);
        let n = world.nation(ids[0]).unwrap();
        assert_eq!(n.relations.len(), 2);
        assert!(n.relations.values().all(|r| (-60.0..=60.0).contains(r)));
    }

    #[test]
    fn test_blob_is_contiguous_from_capital() {
        let mut world = small_world(SimulationConfig::default());
        let id = world.create_nation(params("A"));
        let claimed = claim_blob(&mut world, id, 10);
        assert_eq!(claimed, 10);
        let cells = &world.nation(id).unwrap().territories;
        for cell in cells.iter().skip(1) {
            assert!(cell.neighbors().iter().any(|n| cells.contains(n)));
        }
    }

    #[test]
    fn test_full_map_claims_nothing() {
        let mut world = small_world(SimulationConfig::default());
        let hog = world.create_nation(params("Hog"));
        claim_blob(&mut world, hog, usize::MAX);
        let late = world.create_nation(params("Late"));
        assert_eq!(claim_blob(&mut world, late, 5), 0);
    }
}
