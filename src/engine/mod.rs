//! World - the engine's state container and yearly tick
//!
//! Nations live in an arena keyed by id; every cross-nation field stores
//! ids only. The treaty, war and trade ledgers are owned here and handed to
//! the `systems` functions by reference.

pub mod notifications;
pub mod runner;
pub mod setup;
pub mod snapshot;
pub mod tick;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;
use crate::core::error::Result;
use crate::core::types::{ActionId, BattleId, Cell, NationId, RouteId, WarId, Year};
use crate::nation::{Nation, NationParams, Resources};
use crate::systems::diplomacy::{DiplomacyLedger, DiplomaticAction};
use crate::systems::market::GlobalMarket;
use crate::systems::trade::{LedgerRoute, TradeLedger};
use crate::systems::warfare::{War, WarLedger};
use crate::terrain::TerrainGrid;

use notifications::{NotificationKind, NotificationLog};

pub use tick::{simulate_year, YearReport};

/// Monotonic id counters, persisted with the world
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IdCounters {
    pub nation: u32,
    pub action: u32,
    pub war: u32,
    pub route: u32,
    pub battle: u32,
}

/// The simulated world
#[derive(Clone)]
pub struct World {
    pub(crate) year: Year,
    pub(crate) nations: Vec<Nation>,
    pub(crate) diplomacy: DiplomacyLedger,
    pub(crate) warfare: WarLedger,
    pub(crate) trade: TradeLedger,
    pub(crate) terrain: TerrainGrid,
    pub(crate) notifications: NotificationLog,
    pub(crate) ids: IdCounters,
    pub(crate) config: SimulationConfig,
    /// Single shared random source
    pub(crate) rng: ChaCha8Rng,
}

impl World {
    /// Empty world with freshly generated terrain
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = make_rng(&config);
        let (cols, rows) = config.grid_dimensions();
        let terrain = TerrainGrid::generate(cols, rows, &mut rng);
        Ok(Self::assemble(config, terrain, rng))
    }

    /// Empty world on a caller-supplied terrain grid
    pub fn with_terrain(config: SimulationConfig, terrain: TerrainGrid) -> Result<Self> {
        config.validate()?;
        let rng = make_rng(&config);
        Ok(Self::assemble(config, terrain, rng))
    }

    fn assemble(config: SimulationConfig, terrain: TerrainGrid, rng: ChaCha8Rng) -> Self {
        Self {
            year: config.start_year,
            nations: Vec::new(),
            diplomacy: DiplomacyLedger::default(),
            warfare: WarLedger::default(),
            trade: TradeLedger::new(GlobalMarket::from_config(&config)),
            terrain,
            notifications: NotificationLog::new(),
            ids: IdCounters::default(),
            config,
            rng,
        }
    }

    /// Found a nation and return its id
    pub fn create_nation(&mut self, params: NationParams) -> NationId {
        self.ids.nation += 1;
        let id = NationId(self.ids.nation);
        let nation = Nation::new(id, params, &self.config);
        tracing::info!("{} founded as {}", nation.name, id);
        self.nations.push(nation);
        id
    }

    pub fn year(&self) -> Year {
        self.year
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn nations(&self) -> &[Nation] {
        &self.nations
    }

    pub fn nation_ids(&self) -> Vec<NationId> {
        self.nations.iter().map(|n| n.id).collect()
    }

    pub fn nation(&self, id: NationId) -> Option<&Nation> {
        self.nations.iter().find(|n| n.id == id)
    }

    pub(crate) fn nation_mut(&mut self, id: NationId) -> Option<&mut Nation> {
        self.nations.iter_mut().find(|n| n.id == id)
    }

    /// Set `nation`'s view of `other`, clamped to [-100, 100].
    /// Returns false if either nation is unknown or they are the same.
    pub fn set_relation(&mut self, nation: NationId, other: NationId, value: f64) -> bool {
        if nation == other || !self.contains_nation(other) {
            return false;
        }
        match self.nation_mut(nation) {
            Some(n) => {
                n.set_relation(other, value);
                true
            }
            None => false,
        }
    }

    /// Stockpiles of one nation, for scenario setup and scripted grants
    pub fn resources_mut(&mut self, id: NationId) -> Option<&mut Resources> {
        self.nation_mut(id).map(|n| &mut n.resources)
    }

    pub(crate) fn contains_nation(&self, id: NationId) -> bool {
        self.nations.iter().any(|n| n.id == id)
    }

    /// Two distinct nations borrowed at once
    pub(crate) fn pair_mut(&mut self, a: NationId, b: NationId) -> Option<(&mut Nation, &mut Nation)> {
        if a == b {
            return None;
        }
        let ia = self.nations.iter().position(|n| n.id == a)?;
        let ib = self.nations.iter().position(|n| n.id == b)?;
        if ia < ib {
            let (left, right) = self.nations.split_at_mut(ib);
            Some((&mut left[ia], &mut right[0]))
        } else {
            let (left, right) = self.nations.split_at_mut(ia);
            Some((&mut right[0], &mut left[ib]))
        }
    }

    pub(crate) fn nation_name(&self, id: NationId) -> String {
        self.nation(id)
            .map(|n| n.name.clone())
            .unwrap_or_else(|| "an unknown nation".to_string())
    }

    pub fn terrain(&self) -> &TerrainGrid {
        &self.terrain
    }

    pub fn notifications(&self) -> &NotificationLog {
        &self.notifications
    }

    pub fn market(&self) -> &GlobalMarket {
        &self.trade.market
    }

    /// Adjust market prices directly (scenario setup)
    pub fn market_mut(&mut self) -> &mut GlobalMarket {
        &mut self.trade.market
    }

    pub fn active_wars(&self) -> &[War] {
        &self.warfare.active
    }

    pub fn war_history(&self) -> &[War] {
        &self.warfare.history
    }

    pub fn trade_routes(&self) -> &[LedgerRoute] {
        &self.trade.routes
    }

    pub fn diplomatic_actions(&self) -> &[DiplomaticAction] {
        &self.diplomacy.actions
    }

    /// Nation owning the grid cell under map coordinates (x, y)
    pub fn owner_at(&self, x: f64, y: f64) -> Option<NationId> {
        let cell = Cell::from_map_coords(x, y, self.config.grid_size);
        self.owner_of(cell)
    }

    pub fn owner_of(&self, cell: Cell) -> Option<NationId> {
        self.nations.iter().find(|n| n.owns(cell)).map(|n| n.id)
    }

    /// Claim the grid cell under map coordinates for `nation`.
    ///
    /// Fails if the nation is unknown, the cell is off the map, or any
    /// nation already owns it.
    pub fn claim_territory(&mut self, nation: NationId, x: f64, y: f64) -> bool {
        let cell = Cell::from_map_coords(x, y, self.config.grid_size);
        self.claim_cell(nation, cell)
    }

    pub fn claim_cell(&mut self, nation: NationId, cell: Cell) -> bool {
        if !self.terrain.contains(cell) || self.owner_of(cell).is_some() {
            return false;
        }
        match self.nation_mut(nation) {
            Some(n) => n.add_territory(cell),
            None => false,
        }
    }

    pub(crate) fn notify(&mut self, kind: NotificationKind, message: String) {
        self.notifications.push(kind, message, self.year);
    }

    pub(crate) fn next_action_id(&mut self) -> ActionId {
        self.ids.action += 1;
        ActionId(self.ids.action)
    }

    pub(crate) fn next_war_id(&mut self) -> WarId {
        self.ids.war += 1;
        WarId(self.ids.war)
    }

    pub(crate) fn next_route_id(&mut self) -> RouteId {
        self.ids.route += 1;
        RouteId(self.ids.route)
    }

    pub(crate) fn next_battle_id(&mut self) -> BattleId {
        self.ids.battle += 1;
        BattleId(self.ids.battle)
    }

    /// Roll a probability against the shared random source
    pub(crate) fn roll(&mut self, chance: f64) -> bool {
        self.rng.gen_bool(chance.clamp(0.0, 1.0))
    }
}

pub(crate) fn make_rng(config: &SimulationConfig) -> ChaCha8Rng {
    match config.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}
