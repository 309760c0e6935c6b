//! Diplomacy - proposals, responses and the treaty ledger
//!
//! The ledger is the single source of truth for diplomatic history; nations
//! only keep the ids of actions they took part in. Resolved actions are
//! never modified again.

use serde::{Deserialize, Serialize};

use crate::core::types::{ActionId, NationId, TradeGood, Year};
use crate::engine::notifications::NotificationKind;
use crate::engine::World;
use crate::nation::TreatyKind;
use crate::systems::{trade, warfare};

/// What is being proposed, with any type-specific terms
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ActionKind {
    Alliance,
    /// The receiver imports `amount` of `resource` from the proposer
    TradeAgreement { resource: TradeGood, amount: f64 },
    PeaceTreaty,
    WarDeclaration,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionStatus {
    Pending,
    Accepted,
    Rejected,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiplomaticAction {
    pub id: ActionId,
    pub from: NationId,
    pub to: NationId,
    pub kind: ActionKind,
    pub status: ActionStatus,
    pub proposed_year: Year,
    pub accepted_year: Option<Year>,
    pub rejected_year: Option<Year>,
}

/// Global ledger of every diplomatic action ever proposed
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DiplomacyLedger {
    pub actions: Vec<DiplomaticAction>,
}

impl DiplomacyLedger {
    pub fn get(&self, id: ActionId) -> Option<&DiplomaticAction> {
        self.actions.iter().find(|a| a.id == id)
    }

    /// Pending action addressed to `receiver`
    fn pending_for_mut(&mut self, id: ActionId, receiver: NationId) -> Option<&mut DiplomaticAction> {
        self.actions
            .iter_mut()
            .find(|a| a.id == id && a.to == receiver && a.status == ActionStatus::Pending)
    }

    /// Actions a nation proposed or received, newest first
    pub fn involving(&self, nation: NationId) -> Vec<&DiplomaticAction> {
        let mut found: Vec<&DiplomaticAction> = self
            .actions
            .iter()
            .filter(|a| a.from == nation || a.to == nation)
            .collect();
        found.sort_by(|a, b| b.proposed_year.cmp(&a.proposed_year).then(b.id.cmp(&a.id)));
        found
    }

    pub fn pending_for(&self, nation: NationId) -> impl Iterator<Item = &DiplomaticAction> {
        self.actions
            .iter()
            .filter(move |a| a.to == nation && a.status == ActionStatus::Pending)
    }
}

/// Record a pending proposal from `from` to `to`.
///
/// Returns `None` if either nation is unknown or they are the same nation.
pub fn propose(world: &mut World, from: NationId, to: NationId, kind: ActionKind) -> Option<ActionId> {
    if from == to || !world.contains_nation(from) || !world.contains_nation(to) {
        return None;
    }

    let id = world.next_action_id();
    tracing::debug!("{} proposes {:?} to {} ({})", from, kind, to, id);
    world.diplomacy.actions.push(DiplomaticAction {
        id,
        from,
        to,
        kind,
        status: ActionStatus::Pending,
        proposed_year: world.year,
        accepted_year: None,
        rejected_year: None,
    });

    if let Some((proposer, receiver)) = world.pair_mut(from, to) {
        proposer.diplomatic_actions.push(id);
        receiver.diplomatic_actions.push(id);
    }
    Some(id)
}

/// Propose a peace treaty and announce it
pub fn propose_peace(world: &mut World, from: NationId, to: NationId) -> Option<ActionId> {
    let id = propose(world, from, to, ActionKind::PeaceTreaty)?;
    let message = format!("{} proposes peace to {}", world.nation_name(from), world.nation_name(to));
    world.notify(NotificationKind::PeaceProposal, message);
    Some(id)
}

/// Accept a pending action addressed to `nation` and apply its effect.
///
/// Returns false (and changes nothing) if no such pending action exists.
pub fn accept(world: &mut World, nation: NationId, action_id: ActionId) -> bool {
    let year = world.year;
    let Some(action) = world.diplomacy.pending_for_mut(action_id, nation) else {
        return false;
    };
    action.status = ActionStatus::Accepted;
    action.accepted_year = Some(year);
    let (from, kind) = (action.from, action.kind.clone());

    match kind {
        ActionKind::Alliance => {
            let alliance = world.config.alliance_relation;
            if let Some((acceptor, proposer)) = world.pair_mut(nation, from) {
                acceptor.set_relation(from, alliance);
                proposer.set_relation(nation, alliance);
                acceptor.treaties.insert(from, TreatyKind::Alliance);
                proposer.treaties.insert(nation, TreatyKind::Alliance);
            }
            tracing::info!("Alliance signed between {} and {}", from, nation);
            let message = format!(
                "{} and {} have signed an alliance",
                world.nation_name(from),
                world.nation_name(nation)
            );
            world.notify(NotificationKind::TreatySigned, message);
        }
        ActionKind::TradeAgreement { resource, amount } => {
            if trade::create_route(world, nation, from, resource, amount).is_some() {
                if let Some((acceptor, proposer)) = world.pair_mut(nation, from) {
                    acceptor.treaties.entry(from).or_insert(TreatyKind::TradeAgreement);
                    proposer.treaties.entry(nation).or_insert(TreatyKind::TradeAgreement);
                }
            }
        }
        ActionKind::PeaceTreaty => {
            warfare::end_war(world, nation, from);
        }
        // Accepting a declaration only acknowledges it
        ActionKind::WarDeclaration => {}
    }

    true
}

/// Reject a pending action addressed to `nation`; both sides' relations sour
pub fn reject(world: &mut World, nation: NationId, action_id: ActionId) -> bool {
    let year = world.year;
    let Some(action) = world.diplomacy.pending_for_mut(action_id, nation) else {
        return false;
    };
    action.status = ActionStatus::Rejected;
    action.rejected_year = Some(year);
    let from = action.from;

    let penalty = world.config.rejection_penalty;
    if let Some((rejecter, proposer)) = world.pair_mut(nation, from) {
        let current = rejecter.relation_with(from);
        rejecter.set_relation(from, (current - penalty).max(-100.0));
        let current = proposer.relation_with(nation);
        proposer.set_relation(nation, (current - penalty).max(-100.0));
    }
    tracing::debug!("{} rejected {} from {}", nation, action_id, from);
    true
}
