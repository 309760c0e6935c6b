//! Yearly interaction step - one random pairwise encounter, then war resolution

use rand::Rng;

use crate::core::types::{ActionId, NationId, TradeGood, WarId};
use crate::engine::notifications::NotificationKind;
use crate::engine::World;
use crate::systems::diplomacy::{self, ActionKind};
use crate::systems::warfare::{self, MilitaryActionKind};

/// What the pairwise encounter produced
#[derive(Clone, Debug, PartialEq)]
pub enum Interaction {
    WarDeclared { actor: NationId, target: NationId, war: WarId },
    TradeProposed { actor: NationId, target: NationId, action: ActionId },
    AllianceProposed { actor: NationId, target: NationId, action: ActionId },
    RelationDrift { actor: NationId, target: NationId, delta: i32 },
    /// Hostile or friendly, but no roll succeeded
    Idle { actor: NationId, target: NationId },
}

/// How an active war was closed this year
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WarConclusion {
    /// The outmatched defender gave up
    Surrender,
    /// The outmatched aggressor withdrew
    Retreat,
    /// A long war ended by negotiation
    Negotiated,
}

/// Pick an actor and a distinct target uniformly and let their relation drive
/// what happens. Needs at least two nations.
pub fn run_pairwise_step(world: &mut World) -> Option<Interaction> {
    let count = world.nations.len();
    if count < 2 {
        return None;
    }

    let actor_index = world.rng.gen_range(0..count);
    let mut target_index = world.rng.gen_range(0..count - 1);
    if target_index >= actor_index {
        target_index += 1;
    }
    let actor = world.nations[actor_index].id;
    let target = world.nations[target_index].id;

    let (relation, actor_at_war) = {
        let a = &world.nations[actor_index];
        (a.relation_with(target), a.at_war || a.is_at_war_with(target))
    };

    if relation <= world.config.hostile_threshold {
        // Only a nation with no ongoing war starts a new one
        if !actor_at_war && world.roll(world.config.war_declaration_chance) {
            if let Some(war) = warfare::declare_war(world, actor, target) {
                return Some(Interaction::WarDeclared { actor, target, war });
            }
        }
        return Some(Interaction::Idle { actor, target });
    }

    if relation >= world.config.friendly_threshold {
        if world.roll(world.config.trade_proposal_chance) {
            let resource = TradeGood::ALL[world.rng.gen_range(0..TradeGood::ALL.len())];
            let amount = world.rng.gen_range(1..=world.config.max_proposed_trade.max(1)) as f64;
            let kind = ActionKind::TradeAgreement { resource, amount };
            if let Some(action) = diplomacy::propose(world, actor, target, kind) {
                let message = format!(
                    "{} proposes a {} trade agreement to {}",
                    world.nation_name(actor),
                    resource,
                    world.nation_name(target)
                );
                world.notify(NotificationKind::DiplomaticProposal, message);
                return Some(Interaction::TradeProposed { actor, target, action });
            }
        } else if world.roll(world.config.alliance_proposal_chance) {
            if let Some(action) = diplomacy::propose(world, actor, target, ActionKind::Alliance) {
                let message = format!(
                    "{} proposes an alliance to {}",
                    world.nation_name(actor),
                    world.nation_name(target)
                );
                world.notify(NotificationKind::DiplomaticProposal, message);
                return Some(Interaction::AllianceProposed { actor, target, action });
            }
        }
        return Some(Interaction::Idle { actor, target });
    }

    let drift = world.config.relation_drift.abs();
    let delta = world.rng.gen_range(-drift..=drift);
    if let Some(a) = world.nation_mut(actor) {
        a.set_relation(target, relation + delta as f64);
    }
    Some(Interaction::RelationDrift { actor, target, delta })
}

/// Give every active war a chance of one battle, then check whether it ends.
///
/// Iterates a snapshot of the active wars, so wars ended here never see a
/// second resolution in the same year.
pub fn resolve_wars(world: &mut World) -> Vec<(WarId, WarConclusion)> {
    let snapshot: Vec<(WarId, NationId, NationId)> = world
        .warfare
        .active
        .iter()
        .map(|w| (w.id, w.aggressor, w.defender))
        .collect();

    let mut concluded = Vec::new();
    for (war_id, aggressor, defender) in snapshot {
        if !world.warfare.active.iter().any(|w| w.id == war_id) {
            continue;
        }
        if !world.contains_nation(aggressor) || !world.contains_nation(defender) {
            continue;
        }

        if world.roll(world.config.battle_chance) {
            let kind = MilitaryActionKind::ALL[world.rng.gen_range(0..MilitaryActionKind::ALL.len())];
            let (min, max) = (world.config.min_commitment, world.config.max_commitment);
            let commitment = min + world.rng.gen::<f64>() * (max - min);
            warfare::conduct_military_action(world, aggressor, defender, kind, commitment);
        }

        let (aggressor_power, defender_power) = match (world.nation(aggressor), world.nation(defender)) {
            (Some(a), Some(d)) => (a.power(), d.power()),
            _ => continue,
        };
        let battles = world
            .warfare
            .active
            .iter()
            .find(|w| w.id == war_id)
            .map(|w| w.battles.len())
            .unwrap_or(0);

        let ratio = world.config.dominance_ratio;
        let surrender = world.config.surrender_chance;
        let conclusion = if aggressor_power > defender_power * ratio && world.roll(surrender) {
            warfare::end_war(world, defender, aggressor);
            WarConclusion::Surrender
        } else if defender_power > aggressor_power * ratio && world.roll(surrender) {
            warfare::end_war(world, aggressor, defender);
            WarConclusion::Retreat
        } else if battles > world.config.long_war_battles && world.roll(world.config.negotiated_peace_chance) {
            if world.roll(0.5) {
                warfare::end_war(world, aggressor, defender);
            } else {
                warfare::end_war(world, defender, aggressor);
            }
            WarConclusion::Negotiated
        } else {
            continue;
        };

        let (a, d) = (world.nation_name(aggressor), world.nation_name(defender));
        let (kind, message) = match conclusion {
            WarConclusion::Surrender => (NotificationKind::WarSurrender, format!("{} surrendered to {}", d, a)),
            WarConclusion::Retreat => (NotificationKind::WarRetreat, format!("{} withdrew from its war with {}", a, d)),
            WarConclusion::Negotiated => (NotificationKind::WarPeace, format!("{} and {} negotiated a peace", a, d)),
        };
        tracing::info!("{}", message);
        world.notify(kind, message);
        concluded.push((war_id, conclusion));
    }
    concluded
}

/// The interaction stage of the yearly tick
pub fn run_interactions(world: &mut World) -> Option<Interaction> {
    let interaction = run_pairwise_step(world);
    resolve_wars(world);
    interaction
}
