//! Read-only views of the world for display and reporting

use serde::{Deserialize, Serialize};

use crate::core::types::Year;
use crate::engine::notifications::Notification;
use crate::engine::World;
use crate::nation::Nation;
use crate::systems::diplomacy::DiplomaticAction;
use crate::systems::market::GlobalMarket;
use crate::systems::trade::LedgerRoute;
use crate::systems::warfare::War;
use crate::terrain::TerrainGrid;

/// Headline numbers for the world
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldStats {
    pub year: Year,
    pub nation_count: usize,
    /// Millions
    pub total_population: f64,
    pub claimed_territory: usize,
    pub active_wars: usize,
    pub trade_routes: usize,
    pub market: GlobalMarket,
}

impl WorldStats {
    pub fn collect(world: &World) -> Self {
        Self {
            year: world.year,
            nation_count: world.nations.len(),
            total_population: world.nations.iter().map(|n| n.population).sum(),
            claimed_territory: world.nations.iter().map(|n| n.territories.len()).sum(),
            active_wars: world.warfare.active.len(),
            trade_routes: world.trade.routes.len(),
            market: world.trade.market.clone(),
        }
    }
}

/// Serializable copy of every entity, taken between ticks
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub stats: WorldStats,
    pub nations: Vec<Nation>,
    pub active_wars: Vec<War>,
    pub war_history: Vec<War>,
    pub diplomatic_actions: Vec<DiplomaticAction>,
    pub trade_routes: Vec<LedgerRoute>,
    pub notifications: Vec<Notification>,
    pub terrain: TerrainGrid,
}

impl WorldSnapshot {
    pub fn capture(world: &World) -> Self {
        Self {
            stats: WorldStats::collect(world),
            nations: world.nations.clone(),
            active_wars: world.warfare.active.clone(),
            war_history: world.warfare.history.clone(),
            diplomatic_actions: world.diplomacy.actions.clone(),
            trade_routes: world.trade.routes.clone(),
            notifications: world.notifications.iter().cloned().collect(),
            terrain: world.terrain.clone(),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self).unwrap_or_else(|_| "{}".to_string())
    }
}

impl World {
    pub fn stats(&self) -> WorldStats {
        WorldStats::collect(self)
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot::capture(self)
    }

    /// Multi-line text summary, largest nations first
    pub fn summary(&self) -> String {
        let stats = self.stats();
        let mut lines = vec![format!(
            "Year {}: {} nations, {:.2}M people, {} cells claimed, {} wars, {} trade routes",
            stats.year,
            stats.nation_count,
            stats.total_population,
            stats.claimed_territory,
            stats.active_wars,
            stats.trade_routes
        )];
        lines.push(format!(
            "Market: food {:.2}, minerals {:.2}, technology {:.2}",
            stats.market.food, stats.market.minerals, stats.market.technology
        ));

        let mut nations: Vec<&Nation> = self.nations.iter().collect();
        nations.sort_by(|a, b| b.power().total_cmp(&a.power()));
        for n in nations {
            lines.push(format!(
                "  {:<12} {:>7.2}M  stab {:.2}  gold {:>8.1}  cells {:>3}  units {:>5}  power {:>6.1}  {:?}",
                n.name,
                n.population,
                n.stability,
                n.resources.gold,
                n.territories.len(),
                n.military_units.total(),
                n.power(),
                n.diplomatic_status()
            ));
        }
        lines.join("\n")
    }
}
