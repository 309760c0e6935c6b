//! Per-nation yearly update, in fixed order

use crate::core::types::NationId;
use crate::engine::World;
use crate::systems::{trade, warfare};

/// Run one nation's yearly update. Unknown ids are ignored.
pub fn update_nation(world: &mut World, id: NationId) {
    {
        let World { nations, config, rng, .. } = world;
        let Some(nation) = nations.iter_mut().find(|n| n.id == id) else {
            return;
        };
        nation.grow_population();
        nation.update_resources(config);
        nation.update_stability(config, rng);
        nation.advance_technology(config, rng);
    }

    trade::settle(world, id);
    warfare::apply_war_upkeep(world, id);

    let World { nations, config, .. } = world;
    if let Some(nation) = nations.iter_mut().find(|n| n.id == id) {
        nation.recover_military(config);
        nation.decay_relations(config);
    }
}
