//! Natural disasters and random events
//!
//! Effects are plain data: the trigger loops roll which effect fires (and any
//! random magnitude) up front, then `apply_effect` applies it to one nation
//! and repairs bounds. At most one disaster and one event fire per nation per
//! year; the first table entry whose roll succeeds wins.

use derive_more::Display;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::types::NationId;
use crate::engine::notifications::NotificationKind;
use crate::engine::World;
use crate::nation::Nation;

#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisasterKind {
    #[display(fmt = "earthquake")]
    Earthquake,
    #[display(fmt = "flood")]
    Flood,
    #[display(fmt = "drought")]
    Drought,
    #[display(fmt = "plague")]
    Plague,
    #[display(fmt = "fire")]
    Fire,
}

impl DisasterKind {
    /// Priority order with yearly probability
    pub const TABLE: [(DisasterKind, f64); 5] = [
        (DisasterKind::Earthquake, 0.05),
        (DisasterKind::Flood, 0.08),
        (DisasterKind::Drought, 0.06),
        (DisasterKind::Plague, 0.04),
        (DisasterKind::Fire, 0.07),
    ];
}

#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    #[display(fmt = "minor")]
    Minor,
    #[display(fmt = "severe")]
    Severe,
}

impl Severity {
    /// Multiplier on every magnitude term
    pub fn factor(&self) -> f64 {
        match self {
            Severity::Minor => 1.0,
            Severity::Severe => 2.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RandomEventKind {
    TechBreakthrough,
    EconomicBoom,
    BumperHarvest,
    PopularUprising,
    Immigration,
    MineralDiscovery,
    PoliticalReform,
}

impl RandomEventKind {
    pub const TABLE: [(RandomEventKind, f64); 7] = [
        (RandomEventKind::TechBreakthrough, 0.05),
        (RandomEventKind::EconomicBoom, 0.06),
        (RandomEventKind::BumperHarvest, 0.08),
        (RandomEventKind::PopularUprising, 0.03),
        (RandomEventKind::Immigration, 0.07),
        (RandomEventKind::MineralDiscovery, 0.04),
        (RandomEventKind::PoliticalReform, 0.03),
    ];

    /// Roll any random magnitude this event carries
    pub fn roll(&self, rng: &mut impl Rng) -> RandomEvent {
        match self {
            RandomEventKind::TechBreakthrough => RandomEvent::TechBreakthrough,
            RandomEventKind::EconomicBoom => RandomEvent::EconomicBoom {
                gold: rng.gen_range(50..150) as f64,
            },
            RandomEventKind::BumperHarvest => RandomEvent::BumperHarvest {
                food: rng.gen_range(50..150) as f64,
            },
            RandomEventKind::PopularUprising => RandomEvent::PopularUprising,
            RandomEventKind::Immigration => RandomEvent::Immigration {
                population: rng.gen_range(1.0..3.0),
            },
            RandomEventKind::MineralDiscovery => RandomEvent::MineralDiscovery {
                minerals: rng.gen_range(50..150) as f64,
            },
            RandomEventKind::PoliticalReform => RandomEvent::PoliticalReform,
        }
    }
}

/// A random event with its magnitude already rolled
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum RandomEvent {
    TechBreakthrough,
    EconomicBoom { gold: f64 },
    BumperHarvest { food: f64 },
    PopularUprising,
    Immigration { population: f64 },
    MineralDiscovery { minerals: f64 },
    PoliticalReform,
}

impl RandomEvent {
    pub fn describe(&self) -> String {
        match self {
            RandomEvent::TechBreakthrough => "made a technological breakthrough".to_string(),
            RandomEvent::EconomicBoom { gold } => format!("enjoys an economic boom (+{} gold)", gold),
            RandomEvent::BumperHarvest { food } => format!("brought in a bumper harvest (+{} food)", food),
            RandomEvent::PopularUprising => "faces a popular uprising".to_string(),
            RandomEvent::Immigration { population } => {
                format!("welcomed {:.1} million immigrants", population)
            }
            RandomEvent::MineralDiscovery { minerals } => {
                format!("discovered new mineral deposits (+{} minerals)", minerals)
            }
            RandomEvent::PoliticalReform => "passed a political reform".to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    Disaster { kind: DisasterKind, severity: Severity },
    Event(RandomEvent),
}

/// Net change an effect made to a nation, after bounds were repaired
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectResult {
    pub population: f64,
    pub food: f64,
    pub minerals: f64,
    pub technology: f64,
    pub gold: f64,
    pub stability: f64,
}

/// Apply one effect and repair bounds; stockpiles are re-capped at `stockpile_cap`
pub fn apply_effect(nation: &mut Nation, effect: &Effect, stockpile_cap: f64) -> EffectResult {
    let before = (nation.population, nation.resources, nation.stability);

    match *effect {
        Effect::Disaster { kind, severity } => {
            let s = severity.factor();
            let r = &mut nation.resources;
            match kind {
                DisasterKind::Earthquake => {
                    nation.population -= nation.population * 0.02 * s;
                    r.minerals -= 10.0 * s;
                    r.gold -= 50.0 * s;
                    nation.stability -= 0.05 * s;
                }
                DisasterKind::Flood => {
                    nation.population -= nation.population * 0.01 * s;
                    r.food -= 20.0 * s;
                    nation.stability -= 0.03 * s;
                }
                DisasterKind::Drought => {
                    r.food -= 30.0 * s;
                    nation.stability -= 0.08 * s;
                }
                DisasterKind::Plague => {
                    nation.population -= nation.population * 0.04 * s;
                    nation.stability -= 0.1 * s;
                }
                DisasterKind::Fire => {
                    r.minerals -= 15.0 * s;
                    r.gold -= 30.0 * s;
                    nation.stability -= 0.04 * s;
                }
            }
        }
        Effect::Event(event) => {
            let r = &mut nation.resources;
            match event {
                RandomEvent::TechBreakthrough => {
                    r.technology += 1.0;
                    nation.stability += 0.02;
                }
                RandomEvent::EconomicBoom { gold } => {
                    r.gold += gold;
                    nation.stability += 0.03;
                }
                RandomEvent::BumperHarvest { food } => {
                    r.food += food;
                    nation.stability += 0.04;
                }
                RandomEvent::PopularUprising => {
                    nation.stability -= 0.15;
                    r.gold -= 50.0;
                }
                RandomEvent::Immigration { population } => nation.population += population,
                RandomEvent::MineralDiscovery { minerals } => r.minerals += minerals,
                RandomEvent::PoliticalReform => nation.stability += 0.1,
            }
        }
    }

    nation.repair_bounds();
    nation.resources.clamp_stockpiles(stockpile_cap);

    let (population, resources, stability) = before;
    EffectResult {
        population: nation.population - population,
        food: nation.resources.food - resources.food,
        minerals: nation.resources.minerals - resources.minerals,
        technology: nation.resources.technology - resources.technology,
        gold: nation.resources.gold - resources.gold,
        stability: nation.stability - stability,
    }
}

fn apply_to(world: &mut World, id: NationId, effect: Effect) -> Option<EffectResult> {
    let cap = world.config.stockpile_cap;
    let nation = world.nation_mut(id)?;
    Some(apply_effect(nation, &effect, cap))
}

fn eligible(world: &World) -> Vec<NationId> {
    world
        .nations
        .iter()
        .filter(|n| !n.territories.is_empty())
        .map(|n| n.id)
        .collect()
}

/// Roll the disaster table for every nation with territory
pub fn run_disasters(world: &mut World) -> Vec<(NationId, Effect)> {
    let severe_chance = world.config.severe_disaster_chance;
    let secondary_chance = world.config.secondary_disaster_chance;
    let mut fired = Vec::new();

    for id in eligible(world) {
        let Some(kind) = DisasterKind::TABLE
            .iter()
            .find(|(_, chance)| world.roll(*chance))
            .map(|(kind, _)| *kind)
        else {
            continue;
        };
        let severity = if world.roll(severe_chance) { Severity::Severe } else { Severity::Minor };
        let primary = Effect::Disaster { kind, severity };
        if let Some(result) = apply_to(world, id, primary) {
            announce_disaster(world, id, kind, severity, &result, false);
            fired.push((id, primary));
        }

        // Single level of chaining; the secondary is always fire or flood
        if severity == Severity::Severe && world.roll(secondary_chance) {
            let kind = if world.roll(0.5) { DisasterKind::Fire } else { DisasterKind::Flood };
            let secondary = Effect::Disaster { kind, severity: Severity::Minor };
            if let Some(result) = apply_to(world, id, secondary) {
                announce_disaster(world, id, kind, Severity::Minor, &result, true);
                fired.push((id, secondary));
            }
        }
    }
    fired
}

fn announce_disaster(
    world: &mut World,
    id: NationId,
    kind: DisasterKind,
    severity: Severity,
    result: &EffectResult,
    secondary: bool,
) {
    let prefix = if secondary { "secondary disaster: " } else { "" };
    let message = format!(
        "{} suffered a {}{} {} (population {:+.2}, stability {:+.2})",
        world.nation_name(id),
        prefix,
        severity,
        kind,
        result.population,
        result.stability
    );
    tracing::debug!("{}", message);
    world.notify(NotificationKind::NaturalDisaster, message);
}

/// Roll the random event table for every nation with territory
pub fn run_random_events(world: &mut World) -> Vec<(NationId, Effect)> {
    let mut fired = Vec::new();

    for id in eligible(world) {
        let Some(kind) = RandomEventKind::TABLE
            .iter()
            .find(|(_, chance)| world.roll(*chance))
            .map(|(kind, _)| *kind)
        else {
            continue;
        };
        let event = kind.roll(&mut world.rng);
        let effect = Effect::Event(event);
        if apply_to(world, id, effect).is_some() {
            let message = format!("{} {}", world.nation_name(id), event.describe());
            tracing::debug!("{}", message);
            world.notify(NotificationKind::RandomEvent, message);
            fired.push((id, effect));
        }
    }
    fired
}
