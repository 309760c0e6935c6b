//! Simulation configuration with documented constants
//!
//! All magic numbers of the yearly tick are collected here with notes on
//! how they interact. Every field has a default, so a TOML override file
//! only needs to name the values it changes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};
use crate::core::types::Year;

/// Configuration for the simulation systems
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed for the shared random source.
    ///
    /// `None` seeds from OS entropy, so runs are not reproducible.
    /// Tests set a seed to pin every randomized branch.
    pub seed: Option<u64>,

    /// Year shown before the first tick
    pub start_year: Year,

    // === MAP ===
    /// Map extent in map units
    pub map_width: f64,
    pub map_height: f64,
    /// Side of one territory cell in map units
    pub grid_size: f64,

    // === NATION FOUNDING ===
    pub initial_food: f64,
    pub initial_minerals: f64,
    pub initial_technology: f64,
    pub initial_gold: f64,
    pub initial_growth_rate: f64,
    pub initial_stability: f64,
    pub initial_tariffs: f64,

    // === NATION SELF-UPDATE ===
    /// Food produced per owned cell per year
    pub food_per_territory: f64,
    /// Food eaten per million inhabitants per year
    pub food_per_capita: f64,
    /// Minerals mined per owned cell per year
    pub minerals_per_territory: f64,
    /// Storage cap for food and minerals
    pub stockpile_cap: f64,
    /// Famine when food falls below this fraction of population
    pub famine_threshold: f64,
    pub famine_stability_penalty: f64,
    pub stability_recovery: f64,
    pub democracy_stability_bonus: f64,
    /// Yearly coup chance for dictatorships
    pub coup_chance: f64,
    pub coup_stability_penalty: f64,
    /// Tech progress chance per 100 minerals in stock
    pub tech_chance_per_100_minerals: f64,
    pub tech_increment: f64,
    /// Fraction of the gap to capacity recovered by each unit type per year
    pub military_recovery_rate: f64,
    /// Amount relations drift toward zero per year
    pub relation_decay: f64,

    // === RELATION CONSTANTS ===
    /// Relation pinned while an alliance treaty exists
    pub alliance_relation: f64,
    /// Relation left behind when a war ends
    pub tense_relation: f64,
    /// Relation pinned while two nations are at war
    pub war_relation: f64,
    pub rejection_penalty: f64,

    // === WARFARE ===
    /// Gold spent per enemy per year
    pub war_upkeep_per_enemy: f64,
    pub war_stability_cost: f64,
    /// Chance that an insolvent belligerent sues for peace
    pub forced_peace_chance: f64,
    /// Fraction of the defender's units that take the field
    pub defense_commitment: f64,
    pub battle_luck_min: f64,
    pub battle_luck_max: f64,

    // === PAIRWISE INTERACTION ===
    /// Relation at or below which the actor may declare war
    pub hostile_threshold: f64,
    /// Relation at or above which the actor may propose treaties
    pub friendly_threshold: f64,
    pub war_declaration_chance: f64,
    pub trade_proposal_chance: f64,
    pub alliance_proposal_chance: f64,
    /// Largest relation swing in the neutral band (both directions)
    pub relation_drift: i32,
    /// Largest amount an automatic trade proposal asks for
    pub max_proposed_trade: u32,
    /// Chance that an active war sees a battle this year
    pub battle_chance: f64,
    pub min_commitment: f64,
    pub max_commitment: f64,
    /// Power ratio above which the weaker side may give up
    pub dominance_ratio: f64,
    pub surrender_chance: f64,
    /// Battles after which a war may end in a negotiated peace
    pub long_war_battles: usize,
    pub negotiated_peace_chance: f64,

    // === EVENT LAYER ===
    pub severe_disaster_chance: f64,
    pub secondary_disaster_chance: f64,

    // === GLOBAL MARKET ===
    pub initial_food_price: f64,
    pub initial_minerals_price: f64,
    pub initial_technology_price: f64,
    /// Supply/demand ratio under which prices climb
    pub shortage_ratio: f64,
    /// Supply/demand ratio over which prices fall
    pub glut_ratio: f64,
    /// Largest relative move in a shortage or glut year
    pub max_price_move: f64,
    /// Largest relative drift in a balanced year
    pub price_drift: f64,
    pub min_commodity_price: f64,
    pub max_commodity_price: f64,
    pub min_technology_price: f64,
    pub max_technology_price: f64,

    // === NOTIFICATIONS ===
    /// Entries kept after the end-of-year trim
    pub notification_capacity: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            start_year: 2023,

            map_width: 2000.0,
            map_height: 1500.0,
            grid_size: 10.0,

            initial_food: 100.0,
            initial_minerals: 100.0,
            initial_technology: 1.0,
            initial_gold: 1000.0,
            initial_growth_rate: 0.01,
            initial_stability: 0.8,
            initial_tariffs: 0.1,

            food_per_territory: 0.5,
            food_per_capita: 0.3,
            minerals_per_territory: 0.3,
            stockpile_cap: 1000.0,
            famine_threshold: 0.2,
            famine_stability_penalty: 0.05,
            stability_recovery: 0.01,
            democracy_stability_bonus: 0.02,
            coup_chance: 0.1,
            coup_stability_penalty: 0.05,
            tech_chance_per_100_minerals: 0.1,
            tech_increment: 0.1,
            military_recovery_rate: 0.05,
            relation_decay: 0.5,

            alliance_relation: 80.0,
            tense_relation: -30.0,
            war_relation: -100.0,
            rejection_penalty: 10.0,

            war_upkeep_per_enemy: 5.0,
            war_stability_cost: 0.02,
            forced_peace_chance: 0.5,
            defense_commitment: 0.7,
            battle_luck_min: 0.8,
            battle_luck_max: 1.2,

            hostile_threshold: -50.0,
            friendly_threshold: 50.0,
            war_declaration_chance: 0.1,
            trade_proposal_chance: 0.2,
            alliance_proposal_chance: 0.1,
            relation_drift: 5,
            max_proposed_trade: 10,
            battle_chance: 0.3,
            min_commitment: 0.3,
            max_commitment: 0.7,
            dominance_ratio: 2.0,
            surrender_chance: 0.2,
            long_war_battles: 10,
            negotiated_peace_chance: 0.1,

            severe_disaster_chance: 0.3,
            secondary_disaster_chance: 0.3,

            initial_food_price: 1.0,
            initial_minerals_price: 1.0,
            initial_technology_price: 10.0,
            shortage_ratio: 0.8,
            glut_ratio: 1.2,
            max_price_move: 0.1,
            price_drift: 0.05,
            min_commodity_price: 0.5,
            max_commodity_price: 5.0,
            min_technology_price: 5.0,
            max_technology_price: 20.0,

            notification_capacity: 20,
        }
    }
}

impl SimulationConfig {
    /// Default config with a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// Load overrides from a TOML file
    pub fn load_from_toml(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Parse overrides from a TOML string and validate the result
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let floats = [
            ("map_width", self.map_width),
            ("map_height", self.map_height),
            ("grid_size", self.grid_size),
            ("initial_food", self.initial_food),
            ("initial_minerals", self.initial_minerals),
            ("initial_technology", self.initial_technology),
            ("initial_gold", self.initial_gold),
            ("initial_growth_rate", self.initial_growth_rate),
            ("initial_stability", self.initial_stability),
            ("initial_tariffs", self.initial_tariffs),
            ("food_per_territory", self.food_per_territory),
            ("food_per_capita", self.food_per_capita),
            ("minerals_per_territory", self.minerals_per_territory),
            ("stockpile_cap", self.stockpile_cap),
            ("famine_threshold", self.famine_threshold),
            ("famine_stability_penalty", self.famine_stability_penalty),
            ("stability_recovery", self.stability_recovery),
            ("democracy_stability_bonus", self.democracy_stability_bonus),
            ("coup_chance", self.coup_chance),
            ("coup_stability_penalty", self.coup_stability_penalty),
            ("tech_chance_per_100_minerals", self.tech_chance_per_100_minerals),
            ("tech_increment", self.tech_increment),
            ("military_recovery_rate", self.military_recovery_rate),
            ("relation_decay", self.relation_decay),
            ("alliance_relation", self.alliance_relation),
            ("tense_relation", self.tense_relation),
            ("war_relation", self.war_relation),
            ("rejection_penalty", self.rejection_penalty),
            ("war_upkeep_per_enemy", self.war_upkeep_per_enemy),
            ("war_stability_cost", self.war_stability_cost),
            ("forced_peace_chance", self.forced_peace_chance),
            ("defense_commitment", self.defense_commitment),
            ("battle_luck_min", self.battle_luck_min),
            ("battle_luck_max", self.battle_luck_max),
            ("hostile_threshold", self.hostile_threshold),
            ("friendly_threshold", self.friendly_threshold),
            ("war_declaration_chance", self.war_declaration_chance),
            ("trade_proposal_chance", self.trade_proposal_chance),
            ("alliance_proposal_chance", self.alliance_proposal_chance),
            ("battle_chance", self.battle_chance),
            ("min_commitment", self.min_commitment),
            ("max_commitment", self.max_commitment),
            ("dominance_ratio", self.dominance_ratio),
            ("surrender_chance", self.surrender_chance),
            ("negotiated_peace_chance", self.negotiated_peace_chance),
            ("severe_disaster_chance", self.severe_disaster_chance),
            ("secondary_disaster_chance", self.secondary_disaster_chance),
            ("initial_food_price", self.initial_food_price),
            ("initial_minerals_price", self.initial_minerals_price),
            ("initial_technology_price", self.initial_technology_price),
            ("shortage_ratio", self.shortage_ratio),
            ("glut_ratio", self.glut_ratio),
            ("max_price_move", self.max_price_move),
            ("price_drift", self.price_drift),
            ("min_commodity_price", self.min_commodity_price),
            ("max_commodity_price", self.max_commodity_price),
            ("min_technology_price", self.min_technology_price),
            ("max_technology_price", self.max_technology_price),
        ];
        // NaN slips through every range comparison below
        if let Some((name, value)) = floats.iter().find(|(_, v)| !v.is_finite()) {
            return Err(SimError::InvalidConfig(format!("{} ({}) must be finite", name, value)));
        }

        let probabilities = [
            ("coup_chance", self.coup_chance),
            ("tech_chance_per_100_minerals", self.tech_chance_per_100_minerals),
            ("forced_peace_chance", self.forced_peace_chance),
            ("war_declaration_chance", self.war_declaration_chance),
            ("trade_proposal_chance", self.trade_proposal_chance),
            ("alliance_proposal_chance", self.alliance_proposal_chance),
            ("battle_chance", self.battle_chance),
            ("surrender_chance", self.surrender_chance),
            ("negotiated_peace_chance", self.negotiated_peace_chance),
            ("severe_disaster_chance", self.severe_disaster_chance),
            ("secondary_disaster_chance", self.secondary_disaster_chance),
            ("defense_commitment", self.defense_commitment),
            ("military_recovery_rate", self.military_recovery_rate),
        ];
        for (name, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(SimError::InvalidConfig(format!(
                    "{} ({}) must lie in [0, 1]",
                    name, value
                )));
            }
        }

        if self.min_commitment > self.max_commitment
            || self.min_commitment < 0.0
            || self.max_commitment > 1.0
        {
            return Err(SimError::InvalidConfig(format!(
                "commitment range [{}, {}] must be ordered within [0, 1]",
                self.min_commitment, self.max_commitment
            )));
        }

        if self.battle_luck_min > self.battle_luck_max || self.battle_luck_min < 0.0 {
            return Err(SimError::InvalidConfig(format!(
                "battle luck range [{}, {}] must be ordered and non-negative",
                self.battle_luck_min, self.battle_luck_max
            )));
        }

        if self.min_commodity_price > self.max_commodity_price
            || self.min_technology_price > self.max_technology_price
        {
            return Err(SimError::InvalidConfig("price bounds must be ordered".into()));
        }

        if self.shortage_ratio >= self.glut_ratio {
            return Err(SimError::InvalidConfig(format!(
                "shortage_ratio ({}) should be < glut_ratio ({})",
                self.shortage_ratio, self.glut_ratio
            )));
        }

        if self.grid_size <= 0.0 || self.map_width < self.grid_size || self.map_height < self.grid_size {
            return Err(SimError::InvalidConfig(
                "map must hold at least one grid cell".into(),
            ));
        }

        if self.relation_drift < 0 {
            return Err(SimError::InvalidConfig("relation_drift must be non-negative".into()));
        }

        if self.max_proposed_trade == 0 {
            return Err(SimError::InvalidConfig("max_proposed_trade must be positive".into()));
        }

        Ok(())
    }

    /// Terrain grid dimensions (columns, rows)
    pub fn grid_dimensions(&self) -> (usize, usize) {
        let cols = (self.map_width / self.grid_size).ceil() as usize;
        let rows = (self.map_height / self.grid_size).ceil() as usize;
        (cols, rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_grid_dimensions() {
        let config = SimulationConfig::default();
        assert_eq!(config.grid_dimensions(), (200, 150));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SimulationConfig::parse_toml("seed = 7\nwar_declaration_chance = 1.0\n").unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.war_declaration_chance, 1.0);
        assert_eq!(config.notification_capacity, 20);
        assert_eq!(config.start_year, 2023);
    }

    #[test]
    fn test_rejects_probability_out_of_range() {
        let result = SimulationConfig::parse_toml("battle_chance = 1.5");
        assert!(matches!(result, Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_inverted_commitment() {
        let config = SimulationConfig {
            min_commitment: 0.9,
            max_commitment: 0.2,
            ..SimulationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_non_finite_floats() {
        for toml in [
            "battle_luck_max = nan",
            "battle_luck_min = nan",
            "battle_luck_max = inf",
            "min_commitment = nan",
            "max_commodity_price = inf",
            "relation_decay = -inf",
        ] {
            match SimulationConfig::parse_toml(toml) {
                Err(SimError::InvalidConfig(reason)) => assert!(reason.contains("finite"), "{}", reason),
                other => panic!("{} accepted: {:?}", toml, other.map(|c| c.seed)),
            }
        }
    }

    #[test]
    fn test_nan_luck_rejected_from_file() {
        let path = std::env::temp_dir().join(format!("nation-sim-nan-luck-{}.toml", std::process::id()));
        std::fs::write(&path, "seed = 1\nbattle_luck_max = nan\n").unwrap();
        let result = SimulationConfig::load_from_toml(&path);
        let _ = std::fs::remove_file(&path);
        assert!(matches!(result, Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let result = SimulationConfig::parse_toml("seed = [");
        assert!(matches!(result, Err(SimError::TomlError(_))));
    }
}
