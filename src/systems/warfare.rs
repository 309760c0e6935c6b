//! War resolution system
//!
//! Per pair of belligerents a war moves none -> active -> ended. Ended wars
//! live in the history list and are never reopened; a new declaration starts
//! a fresh record.

use derive_more::Display;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::types::{BattleId, Cell, NationId, WarId, Year};
use crate::engine::notifications::NotificationKind;
use crate::engine::World;
use crate::nation::military::{MilitaryUnits, LOSER_LOSSES, WINNER_LOSSES};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarStatus {
    Active,
    Ended,
}

#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MilitaryActionKind {
    /// A won action seizes one of the defender's cells
    #[display(fmt = "territorial assault")]
    Territory,
    #[display(fmt = "pitched battle")]
    Battle,
    #[display(fmt = "raid")]
    Raid,
}

impl MilitaryActionKind {
    pub const ALL: [MilitaryActionKind; 3] = [
        MilitaryActionKind::Territory,
        MilitaryActionKind::Battle,
        MilitaryActionKind::Raid,
    ];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleOutcome {
    AttackerVictory,
    DefenderVictory,
}

/// Record of one military action
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Battle {
    pub id: BattleId,
    pub year: Year,
    pub attacker: NationId,
    pub defender: NationId,
    pub kind: MilitaryActionKind,
    pub attacker_force: MilitaryUnits,
    pub defender_force: MilitaryUnits,
    pub attack_power: f64,
    pub defense_power: f64,
    pub luck: f64,
    pub outcome: BattleOutcome,
    pub territories_changed: Vec<Cell>,
    pub attacker_casualties: u32,
    pub defender_casualties: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct War {
    pub id: WarId,
    pub aggressor: NationId,
    pub defender: NationId,
    pub start_year: Year,
    pub end_year: Option<Year>,
    pub status: WarStatus,
    pub battles: Vec<Battle>,
    pub aggressor_casualties: u64,
    pub defender_casualties: u64,
}

impl War {
    /// Whether this war is between `a` and `b`, in either role
    pub fn involves(&self, a: NationId, b: NationId) -> bool {
        (self.aggressor == a && self.defender == b) || (self.aggressor == b && self.defender == a)
    }

    pub fn casualties_of(&self, nation: NationId) -> u64 {
        if nation == self.aggressor {
            self.aggressor_casualties
        } else if nation == self.defender {
            self.defender_casualties
        } else {
            0
        }
    }

    fn record_casualties(&mut self, nation: NationId, casualties: u32) {
        if nation == self.aggressor {
            self.aggressor_casualties += casualties as u64;
        } else if nation == self.defender {
            self.defender_casualties += casualties as u64;
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WarLedger {
    pub active: Vec<War>,
    /// Ended wars, in the order they ended
    pub history: Vec<War>,
}

impl WarLedger {
    pub fn find_active(&self, a: NationId, b: NationId) -> Option<&War> {
        self.active.iter().find(|w| w.involves(a, b))
    }

    fn find_active_mut(&mut self, a: NationId, b: NationId) -> Option<&mut War> {
        self.active.iter_mut().find(|w| w.involves(a, b))
    }
}

/// Open a war between `attacker` and `defender`.
///
/// Returns `None` if either nation is unknown, they are the same nation, or
/// the pair is already at war.
pub fn declare_war(world: &mut World, attacker: NationId, defender: NationId) -> Option<WarId> {
    if attacker == defender || !world.contains_nation(attacker) || !world.contains_nation(defender) {
        return None;
    }
    if world.warfare.find_active(attacker, defender).is_some() {
        return None;
    }

    let id = world.next_war_id();
    world.warfare.active.push(War {
        id,
        aggressor: attacker,
        defender,
        start_year: world.year,
        end_year: None,
        status: WarStatus::Active,
        battles: Vec::new(),
        aggressor_casualties: 0,
        defender_casualties: 0,
    });

    let war_relation = world.config.war_relation;
    if let Some((a, d)) = world.pair_mut(attacker, defender) {
        a.enter_war(defender, war_relation);
        d.enter_war(attacker, war_relation);
    }

    let message = format!(
        "{} declared war on {}",
        world.nation_name(attacker),
        world.nation_name(defender)
    );
    tracing::info!("{} ({})", message, id);
    world.notify(NotificationKind::WarDeclaration, message);
    Some(id)
}

/// End the active war between `nation` and `other`, moving it to history.
///
/// Both sides drop each other from `war_with` and are left at the tense
/// relation value. Returns false if no such war is active.
pub fn end_war(world: &mut World, nation: NationId, other: NationId) -> bool {
    let Some(index) = world.warfare.active.iter().position(|w| w.involves(nation, other)) else {
        return false;
    };

    let mut war = world.warfare.active.remove(index);
    war.status = WarStatus::Ended;
    war.end_year = Some(world.year);
    let id = war.id;
    world.warfare.history.push(war);

    let tense = world.config.tense_relation;
    if let Some(n) = world.nation_mut(nation) {
        n.leave_war(other);
    }
    if let Some((n, o)) = world.pair_mut(nation, other) {
        o.leave_war(nation);
        n.set_relation(other, tense);
        o.set_relation(nation, tense);
    }

    let message = format!(
        "The war between {} and {} is over",
        world.nation_name(nation),
        world.nation_name(other)
    );
    tracing::info!("{} ({})", message, id);
    world.notify(NotificationKind::WarEnded, message);
    true
}

/// Commit `commitment` of the attacker's army against the defender's home guard.
///
/// Only valid between nations mutually at war; returns the battle record,
/// which is also appended to the war.
pub fn conduct_military_action(
    world: &mut World,
    attacker: NationId,
    defender: NationId,
    kind: MilitaryActionKind,
    commitment: f64,
) -> Option<Battle> {
    let mutually_at_war = match (world.nation(attacker), world.nation(defender)) {
        (Some(a), Some(d)) => a.is_at_war_with(defender) && d.is_at_war_with(attacker),
        _ => false,
    };
    if !mutually_at_war || attacker == defender {
        return None;
    }

    let (luck_min, luck_max) = (world.config.battle_luck_min, world.config.battle_luck_max);
    let defense_commitment = world.config.defense_commitment;
    let luck = world.rng.gen_range(luck_min..=luck_max);
    let id = world.next_battle_id();
    let year = world.year;

    let (a, d) = world.pair_mut(attacker, defender)?;
    let attacker_force = a.military_units.scaled(commitment.clamp(0.0, 1.0));
    let defender_force = d.military_units.scaled(defense_commitment);
    let attack_power = attacker_force.attack_power();
    let defense_power = defender_force.defense_power();

    let outcome = if attack_power * luck > defense_power {
        BattleOutcome::AttackerVictory
    } else {
        BattleOutcome::DefenderVictory
    };
    let (attacker_losses, defender_losses) = match outcome {
        BattleOutcome::AttackerVictory => (WINNER_LOSSES, LOSER_LOSSES),
        BattleOutcome::DefenderVictory => (LOSER_LOSSES, WINNER_LOSSES),
    };
    let attacker_casualties = attacker_force.casualties(attacker_losses);
    let defender_casualties = defender_force.casualties(defender_losses);

    a.military_units.apply_losses(attacker_casualties);
    d.military_units.apply_losses(defender_casualties);
    a.casualties += attacker_casualties as u64;
    d.casualties += defender_casualties as u64;
    let defender_cells = d.territories.len();

    let mut territories_changed = Vec::new();
    if kind == MilitaryActionKind::Territory && outcome == BattleOutcome::AttackerVictory && defender_cells > 0 {
        let index = world.rng.gen_range(0..defender_cells);
        if let Some((a, d)) = world.pair_mut(attacker, defender) {
            let cell = d.territories.remove(index);
            a.add_territory(cell);
            territories_changed.push(cell);
        }
    }

    let battle = Battle {
        id,
        year,
        attacker,
        defender,
        kind,
        attacker_force,
        defender_force,
        attack_power,
        defense_power,
        luck,
        outcome,
        territories_changed,
        attacker_casualties,
        defender_casualties,
    };

    if let Some(war) = world.warfare.find_active_mut(attacker, defender) {
        war.record_casualties(attacker, attacker_casualties);
        war.record_casualties(defender, defender_casualties);
        war.battles.push(battle.clone());
    }

    let (attacker_name, defender_name) = (world.nation_name(attacker), world.nation_name(defender));
    let message = match outcome {
        BattleOutcome::AttackerVictory => {
            format!("{} won a {} against {}", attacker_name, kind, defender_name)
        }
        BattleOutcome::DefenderVictory => {
            format!("{} repelled a {} by {}", defender_name, kind, attacker_name)
        }
    };
    tracing::debug!(
        "{}: {} (attack {:.1} x {:.2} vs defense {:.1}, losses {}/{})",
        id,
        message,
        attack_power,
        luck,
        defense_power,
        attacker_casualties,
        defender_casualties
    );
    world.notify(NotificationKind::BattleResult, message);
    Some(battle)
}

/// Yearly cost of being at war: stability and gold per enemy.
///
/// An insolvent nation has its gold floored at zero and may be forced to
/// make peace with one random enemy, which is returned.
pub fn apply_war_upkeep(world: &mut World, nation_id: NationId) -> Option<NationId> {
    let upkeep = world.config.war_upkeep_per_enemy;
    let stability_cost = world.config.war_stability_cost;
    let forced_peace_chance = world.config.forced_peace_chance;

    let nation = world.nation_mut(nation_id)?;
    if !nation.at_war {
        return None;
    }
    nation.stability = (nation.stability - stability_cost).clamp(0.0, 1.0);
    nation.resources.gold -= upkeep * nation.war_with.len() as f64;
    if nation.resources.gold >= 0.0 {
        return None;
    }

    nation.resources.gold = 0.0;
    let enemies = nation.war_with.clone();
    if enemies.is_empty() || !world.roll(forced_peace_chance) {
        return None;
    }

    let enemy = enemies[world.rng.gen_range(0..enemies.len())];
    end_war(world, nation_id, enemy);
    let message = format!(
        "{} ran out of gold and was forced to make peace with {}",
        world.nation_name(nation_id),
        world.nation_name(enemy)
    );
    tracing::warn!("{}", message);
    world.notify(NotificationKind::ForcedPeace, message);
    Some(enemy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimulationConfig;
    use crate::engine::test_support::*;

    #[test]
    fn test_declare_war_sets_both_sides() {
        let mut world = small_world(SimulationConfig::default());
        let a = found(&mut world, "A", 0, 3);
        let b = found(&mut world, "B", 1, 3);

        let id = declare_war(&mut world, a, b).unwrap();
        let na = world.nation(a).unwrap();
        let nb = world.nation(b).unwrap();
        assert!(na.at_war && nb.at_war);
        assert_eq!(na.war_with, vec![b]);
        assert_eq!(nb.war_with, vec![a]);
        assert_eq!(na.relation_with(b), -100.0);
        assert_eq!(nb.relation_with(a), -100.0);
        assert_eq!(world.active_wars()[0].id, id);
        assert_eq!(world.notifications().of_kind(NotificationKind::WarDeclaration).count(), 1);
    }

    #[test]
    fn test_declare_war_guards() {
        let mut world = small_world(SimulationConfig::default());
        let a = found(&mut world, "A", 0, 3);
        let b = found(&mut world, "B", 1, 3);
        assert!(declare_war(&mut world, a, NationId(40)).is_none());
        assert!(declare_war(&mut world, a, a).is_none());
        assert!(declare_war(&mut world, a, b).is_some());
        assert!(declare_war(&mut world, b, a).is_none());
        assert_eq!(world.active_wars().len(), 1);
        assert_eq!(world.nation(a).unwrap().war_with.len(), 1);
    }

    #[test]
    fn test_end_war_moves_to_history() {
        let mut world = small_world(SimulationConfig::default());
        let a = found(&mut world, "A", 0, 3);
        let b = found(&mut world, "B", 1, 3);
        let c = found(&mut world, "C", 2, 3);
        declare_war(&mut world, a, b).unwrap();
        declare_war(&mut world, c, a).unwrap();
        world.year += 3;

        assert!(end_war(&mut world, b, a));
        let na = world.nation(a).unwrap();
        assert!(na.at_war);
        assert_eq!(na.war_with, vec![c]);
        assert_eq!(na.relation_with(b), -30.0);
        assert!(!world.nation(b).unwrap().at_war);
        assert_eq!(world.nation(b).unwrap().relation_with(a), -30.0);

        let ended = &world.war_history()[0];
        assert_eq!(ended.status, WarStatus::Ended);
        assert_eq!(ended.end_year, Some(2026));
        assert_eq!(world.active_wars().len(), 1);
        assert!(!end_war(&mut world, a, b));
    }

    #[test]
    fn test_military_action_requires_war() {
        let mut world = small_world(SimulationConfig::default());
        let a = found(&mut world, "A", 0, 3);
        let b = found(&mut world, "B", 1, 3);
        assert!(conduct_military_action(&mut world, a, b, MilitaryActionKind::Battle, 0.5).is_none());
    }

    #[test]
    fn test_overwhelming_attack_takes_territory() {
        let mut world = small_world(SimulationConfig::default());
        let a = found(&mut world, "A", 0, 3);
        let b = found(&mut world, "B", 1, 3);
        world.nation_mut(a).unwrap().military_units = MilitaryUnits::new(100, 20, 10);
        world.nation_mut(b).unwrap().military_units = MilitaryUnits::new(10, 0, 0);
        declare_war(&mut world, a, b).unwrap();

        let battle =
            conduct_military_action(&mut world, a, b, MilitaryActionKind::Territory, 1.0).unwrap();
        assert_eq!(battle.outcome, BattleOutcome::AttackerVictory);
        assert_eq!(battle.defender_force, MilitaryUnits::new(7, 0, 0));
        // 10% of 100 + 15% of 20 + 5% of 10 = 10 + 3 + 0
        assert_eq!(battle.attacker_casualties, 13);
        // 30% of 7
        assert_eq!(battle.defender_casualties, 2);
        assert_eq!(battle.territories_changed.len(), 1);

        let na = world.nation(a).unwrap();
        let nb = world.nation(b).unwrap();
        assert_eq!(na.territories.len(), 4);
        assert_eq!(nb.territories.len(), 2);
        assert_eq!(na.military_units, MilitaryUnits::new(87, 18, 9));
        assert_eq!(na.casualties, 13);
        assert_eq!(nb.casualties, 2);

        let war = &world.active_wars()[0];
        assert_eq!(war.battles.len(), 1);
        assert_eq!(war.casualties_of(a), 13);
        assert_eq!(war.casualties_of(b), 2);
    }

    #[test]
    fn test_failed_attack_keeps_territory() {
        let mut world = small_world(SimulationConfig::default());
        let a = found(&mut world, "A", 0, 3);
        let b = found(&mut world, "B", 1, 3);
        world.nation_mut(a).unwrap().military_units = MilitaryUnits::new(2, 0, 0);
        world.nation_mut(b).unwrap().military_units = MilitaryUnits::new(100, 10, 10);
        declare_war(&mut world, a, b).unwrap();

        let battle =
            conduct_military_action(&mut world, a, b, MilitaryActionKind::Territory, 0.5).unwrap();
        assert_eq!(battle.outcome, BattleOutcome::DefenderVictory);
        assert!(battle.territories_changed.is_empty());
        assert_eq!(world.nation(b).unwrap().territories.len(), 3);
        // Defender holds the field at the winner's rates: 10% of 70 + 15% of 7 + 5% of 7
        assert_eq!(battle.defender_casualties, 8);
    }

    #[test]
    fn test_repelled_attack_losses_on_both_sides() {
        let mut world = small_world(SimulationConfig::default());
        let a = found(&mut world, "A", 0, 3);
        let b = found(&mut world, "B", 1, 3);
        world.nation_mut(a).unwrap().military_units = MilitaryUnits::new(100, 20, 10);
        world.nation_mut(b).unwrap().military_units = MilitaryUnits::new(400, 100, 50);
        declare_war(&mut world, a, b).unwrap();

        // Attack 170 at best luck 1.2 is 204; defense of (280, 70, 35) is 528.5
        let battle = conduct_military_action(&mut world, a, b, MilitaryActionKind::Battle, 1.0).unwrap();
        assert_eq!(battle.outcome, BattleOutcome::DefenderVictory);
        assert_eq!(battle.attacker_force, MilitaryUnits::new(100, 20, 10));
        assert_eq!(battle.defender_force, MilitaryUnits::new(280, 70, 35));

        // Loser: 30% of 100 + 25% of 20 + 20% of 10
        assert_eq!(battle.attacker_casualties, 37);
        // Winner: 10% of 280 + 15% of 70 + 5% of 35, each floored
        assert_eq!(battle.defender_casualties, 39);

        // Infantry takes the casualties, cavalry and artillery lose 20% and 10% of them
        let na = world.nation(a).unwrap();
        let nb = world.nation(b).unwrap();
        assert_eq!(na.military_units, MilitaryUnits::new(63, 13, 7));
        assert_eq!(nb.military_units, MilitaryUnits::new(361, 93, 47));
        assert_eq!(na.casualties, 37);
        assert_eq!(nb.casualties, 39);
        assert_eq!(na.territories.len(), 3);
        assert_eq!(nb.territories.len(), 3);
    }

    #[test]
    fn test_upkeep_charges_gold_and_stability() {
        let mut world = small_world(SimulationConfig::default());
        let a = found(&mut world, "A", 0, 3);
        let b = found(&mut world, "B", 1, 3);
        let c = found(&mut world, "C", 2, 3);
        declare_war(&mut world, a, b).unwrap();
        declare_war(&mut world, a, c).unwrap();

        assert!(apply_war_upkeep(&mut world, a).is_none());
        let na = world.nation(a).unwrap();
        assert_eq!(na.resources.gold, 990.0);
        assert!((na.stability - 0.78).abs() < 1e-9);
    }

    #[test]
    fn test_insolvency_forces_peace() {
        let config = SimulationConfig {
            forced_peace_chance: 1.0,
            ..SimulationConfig::default()
        };
        let mut world = small_world(config);
        let a = found(&mut world, "A", 0, 3);
        let b = found(&mut world, "B", 1, 3);
        declare_war(&mut world, a, b).unwrap();
        world.nation_mut(a).unwrap().resources.gold = 0.0;

        assert_eq!(apply_war_upkeep(&mut world, a), Some(b));
        let na = world.nation(a).unwrap();
        assert_eq!(na.resources.gold, 0.0);
        assert!(!na.at_war);
        assert_eq!(world.war_history().len(), 1);
        assert_eq!(world.notifications().of_kind(NotificationKind::ForcedPeace).count(), 1);
    }

    #[test]
    fn test_insolvency_without_peace_roll() {
        let config = SimulationConfig {
            forced_peace_chance: 0.0,
            ..SimulationConfig::default()
        };
        let mut world = small_world(config);
        let a = found(&mut world, "A", 0, 3);
        let b = found(&mut world, "B", 1, 3);
        declare_war(&mut world, a, b).unwrap();
        world.nation_mut(a).unwrap().resources.gold = 3.0;

        assert!(apply_war_upkeep(&mut world, a).is_none());
        assert_eq!(world.nation(a).unwrap().resources.gold, 0.0);
        assert!(world.nation(a).unwrap().at_war);
    }
}
