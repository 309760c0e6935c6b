//! Save and load the world as a JSON document
//!
//! Configuration is not part of the save; the loader supplies it. A document
//! missing any required top-level key is rejected before anything is decoded.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::config::SimulationConfig;
use crate::core::error::{Result, SimError};
use crate::core::types::Year;
use crate::engine::notifications::NotificationLog;
use crate::engine::{make_rng, IdCounters, World};
use crate::nation::Nation;
use crate::systems::diplomacy::DiplomacyLedger;
use crate::systems::trade::TradeLedger;
use crate::systems::warfare::WarLedger;
use crate::terrain::TerrainGrid;

/// Top-level keys a save must carry
pub const REQUIRED_KEYS: [&str; 6] = ["year", "nations", "diplomacy", "warfare", "trade", "terrain"];

#[derive(Serialize)]
struct SaveRef<'a> {
    year: Year,
    nations: &'a [Nation],
    diplomacy: &'a DiplomacyLedger,
    warfare: &'a WarLedger,
    trade: &'a TradeLedger,
    terrain: &'a TerrainGrid,
    notifications: &'a NotificationLog,
    ids: &'a IdCounters,
}

#[derive(Deserialize)]
struct SaveDocument {
    year: Year,
    nations: Vec<Nation>,
    diplomacy: DiplomacyLedger,
    warfare: WarLedger,
    trade: TradeLedger,
    terrain: TerrainGrid,
    #[serde(default)]
    notifications: NotificationLog,
    #[serde(default)]
    ids: IdCounters,
}

pub fn serialize(world: &World) -> Result<Vec<u8>> {
    let doc = SaveRef {
        year: world.year,
        nations: &world.nations,
        diplomacy: &world.diplomacy,
        warfare: &world.warfare,
        trade: &world.trade,
        terrain: &world.terrain,
        notifications: &world.notifications,
        ids: &world.ids,
    };
    Ok(serde_json::to_vec_pretty(&doc)?)
}

/// Rebuild a world from `bytes`, using `config` for everything not saved.
///
/// Fails with `CorruptSave` on malformed JSON, a missing required key, or
/// fields of the wrong shape; no partial world is ever returned.
pub fn deserialize(bytes: &[u8], config: SimulationConfig) -> Result<World> {
    config.validate()?;

    let value: Value = serde_json::from_slice(bytes).map_err(|e| corrupt(format!("not valid JSON: {}", e)))?;
    let Some(object) = value.as_object() else {
        return Err(corrupt("top level is not an object".to_string()));
    };
    if let Some(missing) = REQUIRED_KEYS.iter().find(|key| !object.contains_key(**key)) {
        return Err(corrupt(format!("missing required key `{}`", missing)));
    }

    let doc: SaveDocument = serde_json::from_value(value).map_err(|e| corrupt(e.to_string()))?;
    if !doc.terrain.is_well_formed() {
        return Err(corrupt(format!(
            "terrain is not a {}x{} grid",
            doc.terrain.cols, doc.terrain.rows
        )));
    }

    let mut nations = doc.nations;
    for nation in &mut nations {
        // The flag is derived; trust the enemy list over the stored value
        nation.at_war = !nation.war_with.is_empty();
    }

    let mut ids = doc.ids;
    ids.nation = ids.nation.max(nations.iter().map(|n| n.id.0).max().unwrap_or(0));
    ids.action = ids.action.max(doc.diplomacy.actions.iter().map(|a| a.id.0).max().unwrap_or(0));
    ids.war = ids
        .war
        .max(doc.warfare.active.iter().chain(&doc.warfare.history).map(|w| w.id.0).max().unwrap_or(0));
    ids.route = ids.route.max(doc.trade.routes.iter().map(|r| r.route.id.0).max().unwrap_or(0));
    ids.battle = ids.battle.max(
        doc.warfare
            .active
            .iter()
            .chain(&doc.warfare.history)
            .flat_map(|w| &w.battles)
            .map(|b| b.id.0)
            .max()
            .unwrap_or(0),
    );

    let rng = make_rng(&config);
    let world = World {
        year: doc.year,
        nations,
        diplomacy: doc.diplomacy,
        warfare: doc.warfare,
        trade: doc.trade,
        terrain: doc.terrain,
        notifications: doc.notifications,
        ids,
        config,
        rng,
    };
    tracing::info!("Loaded world at year {} with {} nations", world.year, world.nations.len());
    Ok(world)
}

pub fn save_to_path(world: &World, path: &Path) -> Result<()> {
    let bytes = serialize(world)?;
    std::fs::write(path, bytes)?;
    tracing::info!("Saved year {} to {}", world.year, path.display());
    Ok(())
}

pub fn load_from_path(path: &Path, config: SimulationConfig) -> Result<World> {
    let bytes = std::fs::read(path)?;
    deserialize(&bytes, config)
}

fn corrupt(reason: String) -> SimError {
    tracing::warn!("Rejected save: {}", reason);
    SimError::CorruptSave(reason)
}
