//! Property tests for ledger bookkeeping under random operation sequences

use nation_sim::core::config::SimulationConfig;
use nation_sim::core::types::{Cell, Economy, Government, NationId, RouteId, TradeGood};
use nation_sim::nation::NationParams;
use nation_sim::systems::{self, trade, warfare};
use nation_sim::terrain::{Terrain, TerrainGrid};
use nation_sim::World;
use proptest::prelude::*;

const NATIONS: u32 = 4;

#[derive(Clone, Debug)]
enum Op {
    Create { from: u32, to: u32, good: usize, amount: i32 },
    Cancel { nation: u32, route: u32 },
    Settle { nation: u32 },
    Declare { from: u32, to: u32 },
    End { from: u32, to: u32 },
    Update { nation: u32 },
}

fn arb_op() -> impl Strategy<Value = Op> {
    let nation = 1..=NATIONS;
    prop_oneof![
        3 => (nation.clone(), nation.clone(), 0..3usize, -20..=20i32)
            .prop_map(|(from, to, good, amount)| Op::Create { from, to, good, amount }),
        2 => (nation.clone(), 1..=12u32).prop_map(|(nation, route)| Op::Cancel { nation, route }),
        2 => nation.clone().prop_map(|nation| Op::Settle { nation }),
        1 => (nation.clone(), nation.clone()).prop_map(|(from, to)| Op::Declare { from, to }),
        1 => (nation.clone(), nation.clone()).prop_map(|(from, to)| Op::End { from, to }),
        1 => nation.prop_map(|nation| Op::Update { nation }),
    ]
}

fn world(seed: u64) -> World {
    let config = SimulationConfig {
        map_width: 200.0,
        map_height: 150.0,
        ..SimulationConfig::seeded(seed)
    };
    let (cols, rows) = config.grid_dimensions();
    let mut world = World::with_terrain(config, TerrainGrid::uniform(cols, rows, Terrain::Plains)).unwrap();
    for i in 0..NATIONS {
        let id = world.create_nation(NationParams {
            name: format!("Nation {}", i + 1),
            color: "#2ecc71".to_string(),
            government: Government::ALL[i as usize % Government::ALL.len()],
            economy: Economy::ALL[i as usize % Economy::ALL.len()],
            population: 5.0 + i as f64 * 10.0,
            military_strength: 3 + i,
        });
        for x in 0..3 {
            world.claim_cell(id, Cell::new(x, i as i32));
        }
        // Poor nations so settlement exercises cancellation
        world.resources_mut(id).unwrap().gold = 20.0 * i as f64;
    }
    world
}

fn apply(world: &mut World, op: &Op) {
    match *op {
        Op::Create { from, to, good, amount } => {
            trade::create_route(world, NationId(from), NationId(to), TradeGood::ALL[good], amount as f64);
        }
        Op::Cancel { nation, route } => {
            trade::cancel_route(world, NationId(nation), RouteId(route));
        }
        Op::Settle { nation } => {
            trade::settle(world, NationId(nation));
        }
        Op::Declare { from, to } => {
            warfare::declare_war(world, NationId(from), NationId(to));
        }
        Op::End { from, to } => {
            warfare::end_war(world, NationId(from), NationId(to));
        }
        Op::Update { nation } => systems::update_nation(world, NationId(nation)),
    }
}

fn check_mirrors(world: &World) -> Result<(), TestCaseError> {
    for n in world.nations() {
        for route in &n.trade_routes {
            prop_assert!(route.partner != n.id, "self route {}", route.id);
            let partner = world.nation(route.partner).unwrap();
            let mirrors: Vec<_> = partner.trade_routes.iter().filter(|r| r.id == route.id).collect();
            prop_assert_eq!(mirrors.len(), 1, "{} mirrored {} times", route.id, mirrors.len());
            prop_assert_eq!(mirrors[0].amount, -route.amount);
            prop_assert_eq!(mirrors[0].partner, n.id);
            prop_assert_eq!(mirrors[0].resource, route.resource);
        }
    }
    for entry in world.trade_routes() {
        let owner = world.nation(entry.owner).unwrap();
        prop_assert!(owner.route(entry.route.id).is_some(), "ledger entry {} has no owner record", entry.route.id);
    }
    let held: usize = world.nations().iter().map(|n| n.trade_routes.len()).sum();
    prop_assert_eq!(held, world.trade_routes().len() * 2);
    Ok(())
}

fn check_wars(world: &World) -> Result<(), TestCaseError> {
    for n in world.nations() {
        prop_assert_eq!(n.at_war, !n.war_with.is_empty());
        prop_assert!(n.resources.gold >= 0.0);
        for enemy in &n.war_with {
            prop_assert!(world.active_wars().iter().any(|w| w.involves(n.id, *enemy)));
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_routes_stay_mirrored(seed in any::<u64>(), ops in prop::collection::vec(arb_op(), 1..60)) {
        let mut world = world(seed);
        for op in &ops {
            apply(&mut world, op);
            check_mirrors(&world)?;
            check_wars(&world)?;
        }
    }

    #[test]
    fn test_create_is_idempotent_per_partner_and_good(
        good in 0..3usize,
        first in 1..=20i32,
        second in -20..=20i32,
    ) {
        prop_assume!(second != 0);
        let mut world = world(1);
        let (a, b) = (NationId(1), NationId(2));
        let good = TradeGood::ALL[good];
        let id = trade::create_route(&mut world, a, b, good, first as f64).unwrap();
        let again = trade::create_route(&mut world, a, b, good, second as f64).unwrap();

        prop_assert_eq!(id, again);
        prop_assert_eq!(world.trade_routes().len(), 1);
        prop_assert_eq!(world.nation(a).unwrap().route(id).unwrap().amount, second as f64);
        prop_assert_eq!(world.nation(b).unwrap().route(id).unwrap().amount, -(second as f64));
    }
}
