//! Nation - the primary simulated agent and its self-contained yearly steps
//!
//! Steps that touch other nations or the global ledgers (trade settlement,
//! war upkeep) live in `systems`; `systems::update::update_nation` runs the
//! full yearly sequence.

pub mod military;
pub mod resources;

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;
use crate::core::types::{round2, ActionId, Cell, Economy, Government, NationId, RouteId, TradeGood, Year};

pub use military::MilitaryUnits;
pub use resources::Resources;

/// Lowest population a nation can fall to
pub const MIN_POPULATION: f64 = 0.1;

/// Named diplomatic status held toward another nation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TreatyKind {
    Alliance,
    TradeAgreement,
}

/// One half of a mirrored trade route.
///
/// The importer holds `amount > 0`; the partner holds the same id with the
/// amount negated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRoute {
    pub id: RouteId,
    pub partner: NationId,
    pub resource: TradeGood,
    pub amount: f64,
    /// Market price when the route was opened
    pub price: f64,
    pub established: Year,
}

impl TradeRoute {
    pub fn is_import(&self) -> bool {
        self.amount > 0.0
    }

    /// The partner's half of this route, as owned by `owner`
    pub fn mirrored(&self, owner: NationId) -> TradeRoute {
        TradeRoute {
            id: self.id,
            partner: owner,
            resource: self.resource,
            amount: -self.amount,
            price: self.price,
            established: self.established,
        }
    }
}

/// Summary shown next to a nation's name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiplomaticStatus {
    AtWar,
    Allied,
    AtPeace,
}

/// Parameters for founding a nation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NationParams {
    pub name: String,
    pub color: String,
    pub government: Government,
    pub economy: Economy,
    /// Millions of inhabitants
    pub population: f64,
    /// Capacity scalar, 1-10
    pub military_strength: u32,
}

/// A sovereign nation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Nation {
    pub id: NationId,
    pub name: String,
    pub color: String,
    pub government: Government,
    pub economy: Economy,

    /// Millions, never below `MIN_POPULATION`
    pub population: f64,
    pub military_strength: u32,
    /// Owned cells in acquisition order
    pub territories: Vec<Cell>,
    pub resources: Resources,
    pub growth_rate: f64,
    /// 0.0 to 1.0
    pub stability: f64,

    pub military_units: MilitaryUnits,
    pub casualties: u64,

    /// -100 to +100
    pub relations: BTreeMap<NationId, f64>,
    pub treaties: BTreeMap<NationId, TreatyKind>,
    /// References into the global treaty ledger
    pub diplomatic_actions: Vec<ActionId>,

    pub trade_routes: Vec<TradeRoute>,
    pub trade_surplus: f64,
    pub trade_deficit: f64,
    pub economic_growth: f64,
    pub tariffs: f64,

    pub at_war: bool,
    pub war_with: Vec<NationId>,
}

impl Nation {
    pub fn new(id: NationId, params: NationParams, config: &SimulationConfig) -> Self {
        let military_strength = params.military_strength.clamp(1, 10);
        Self {
            id,
            name: params.name,
            color: params.color,
            government: params.government,
            economy: params.economy,
            population: params.population.max(MIN_POPULATION),
            military_strength,
            territories: Vec::new(),
            resources: Resources::new(
                config.initial_food,
                config.initial_minerals,
                config.initial_technology,
                config.initial_gold,
            ),
            growth_rate: config.initial_growth_rate,
            stability: config.initial_stability,
            military_units: MilitaryUnits::founding(military_strength),
            casualties: 0,
            relations: BTreeMap::new(),
            treaties: BTreeMap::new(),
            diplomatic_actions: Vec::new(),
            trade_routes: Vec::new(),
            trade_surplus: 0.0,
            trade_deficit: 0.0,
            economic_growth: 0.01,
            tariffs: config.initial_tariffs,
            at_war: false,
            war_with: Vec::new(),
        }
    }

    /// Aggregate national power used by war escalation checks
    pub fn power(&self) -> f64 {
        self.population * 0.5
            + self.military_strength as f64 * 2.0
            + self.resources.technology * 3.0
            + self.territories.len() as f64 * 0.2
    }

    /// Append a cell; cells already owned are ignored
    pub fn add_territory(&mut self, cell: Cell) -> bool {
        if self.territories.contains(&cell) {
            return false;
        }
        self.territories.push(cell);
        true
    }

    pub fn owns(&self, cell: Cell) -> bool {
        self.territories.contains(&cell)
    }

    pub fn relation_with(&self, other: NationId) -> f64 {
        self.relations.get(&other).copied().unwrap_or(0.0)
    }

    /// Set a relation score, clamped to [-100, 100]
    pub fn set_relation(&mut self, other: NationId, value: f64) {
        self.relations.insert(other, value.clamp(-100.0, 100.0));
    }

    pub fn is_at_war_with(&self, other: NationId) -> bool {
        self.war_with.contains(&other)
    }

    pub fn is_allied_with(&self, other: NationId) -> bool {
        self.treaties.get(&other) == Some(&TreatyKind::Alliance)
    }

    pub fn diplomatic_status(&self) -> DiplomaticStatus {
        if self.at_war {
            DiplomaticStatus::AtWar
        } else if self.treaties.values().any(|t| *t == TreatyKind::Alliance) {
            DiplomaticStatus::Allied
        } else {
            DiplomaticStatus::AtPeace
        }
    }

    /// Start fighting `enemy`
    pub(crate) fn enter_war(&mut self, enemy: NationId, war_relation: f64) {
        if !self.war_with.contains(&enemy) {
            self.war_with.push(enemy);
        }
        self.at_war = true;
        self.set_relation(enemy, war_relation);
    }

    /// Stop fighting `enemy`; `at_war` follows `war_with`
    pub(crate) fn leave_war(&mut self, enemy: NationId) {
        self.war_with.retain(|id| *id != enemy);
        self.at_war = !self.war_with.is_empty();
    }

    pub fn route(&self, id: RouteId) -> Option<&TradeRoute> {
        self.trade_routes.iter().find(|r| r.id == id)
    }

    /// Growth modifier from economy, stability and food
    pub fn growth_modifier(&self) -> f64 {
        self.economy.growth_factor() * self.stability * (self.resources.food / 100.0)
    }

    pub(crate) fn grow_population(&mut self) {
        let modifier = self.growth_modifier();
        self.population = round2(self.population * (1.0 + self.growth_rate * modifier));
        self.population = self.population.max(MIN_POPULATION);
    }

    pub(crate) fn update_resources(&mut self, config: &SimulationConfig) {
        let cells = self.territories.len() as f64;
        let food_delta = cells * config.food_per_territory - self.population * config.food_per_capita;
        self.resources.food += food_delta;
        self.resources.minerals += cells * config.minerals_per_territory;
        self.resources.clamp_stockpiles(config.stockpile_cap);
    }

    pub(crate) fn update_stability(&mut self, config: &SimulationConfig, rng: &mut impl Rng) {
        if self.resources.food < self.population * config.famine_threshold {
            self.stability -= config.famine_stability_penalty;
        } else {
            self.stability += config.stability_recovery;
        }

        match self.government {
            Government::Democracy => self.stability += config.democracy_stability_bonus,
            Government::Dictatorship => {
                if rng.gen_bool(config.coup_chance) {
                    self.stability -= config.coup_stability_penalty;
                }
            }
            Government::Monarchy | Government::Republic => {}
        }

        self.stability = self.stability.clamp(0.0, 1.0);
    }

    pub(crate) fn advance_technology(&mut self, config: &SimulationConfig, rng: &mut impl Rng) {
        let chance = (config.tech_chance_per_100_minerals * self.resources.minerals / 100.0).clamp(0.0, 1.0);
        if rng.gen_bool(chance) {
            self.resources.technology += config.tech_increment;
        }
    }

    pub(crate) fn recover_military(&mut self, config: &SimulationConfig) {
        let cap = MilitaryUnits::capacity(self.population, self.military_strength);
        self.military_units.recover_toward(&cap, config.military_recovery_rate);
    }

    /// Drift relations toward neutral; alliances and wars stay pinned
    pub(crate) fn decay_relations(&mut self, config: &SimulationConfig) {
        for (other, relation) in self.relations.iter_mut() {
            if *relation > 0.0 {
                *relation = (*relation - config.relation_decay).max(0.0);
            } else if *relation < 0.0 {
                *relation = (*relation + config.relation_decay).min(0.0);
            }

            if self.treaties.get(other) == Some(&TreatyKind::Alliance) {
                *relation = config.alliance_relation;
            } else if self.war_with.contains(other) {
                *relation = config.war_relation;
            }
        }
    }

    /// Repair any overshoot left by an event effect
    pub fn repair_bounds(&mut self) {
        self.population = self.population.max(MIN_POPULATION);
        self.stability = self.stability.clamp(0.0, 1.0);
        self.resources.clamp_non_negative();
    }
}
