//! Trade - mirrored route bookkeeping and yearly settlement
//!
//! Every route exists three times: the importer's record (amount > 0), the
//! partner's mirror (same id, amount negated) and the global ledger entry.
//! `create_route` and `cancel_route` are the only places that touch all
//! three, and they always touch them together.

use serde::{Deserialize, Serialize};

use crate::core::types::{NationId, ResourceKind, RouteId, TradeGood};
use crate::engine::notifications::NotificationKind;
use crate::engine::World;
use crate::nation::TradeRoute;
use crate::systems::market::GlobalMarket;

/// A route as recorded in the global ledger, keyed by the nation that created it
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LedgerRoute {
    pub owner: NationId,
    pub route: TradeRoute,
}

/// Global route list plus the market that prices new routes
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TradeLedger {
    pub routes: Vec<LedgerRoute>,
    pub market: GlobalMarket,
}

impl TradeLedger {
    pub fn new(market: GlobalMarket) -> Self {
        Self {
            routes: Vec::new(),
            market,
        }
    }

    pub fn get(&self, id: RouteId) -> Option<&LedgerRoute> {
        self.routes.iter().find(|r| r.route.id == id)
    }
}

/// Net result of one nation's settlement pass
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Settlement {
    /// Gold received minus gold paid
    pub net: f64,
    pub settled: usize,
    pub canceled: Vec<RouteId>,
}

/// Open a route where `nation` trades `amount` of `resource` with `partner`
/// (positive imports, negative exports) at the current market price.
///
/// Idempotent on (partner, resource): an existing route has its amount
/// overwritten on all three records and keeps its id. Returns `None` for
/// unknown nations, a nation trading with itself, or a zero amount.
pub fn create_route(
    world: &mut World,
    nation: NationId,
    partner: NationId,
    resource: TradeGood,
    amount: f64,
) -> Option<RouteId> {
    if nation == partner || amount == 0.0 || !amount.is_finite() {
        return None;
    }
    if !world.contains_nation(nation) || !world.contains_nation(partner) {
        return None;
    }

    let existing = world.nation(nation).and_then(|n| {
        n.trade_routes
            .iter()
            .find(|r| r.partner == partner && r.resource == resource)
            .map(|r| r.id)
    });

    if let Some(id) = existing {
        if let Some((owner, other)) = world.pair_mut(nation, partner) {
            if let Some(route) = owner.trade_routes.iter_mut().find(|r| r.id == id) {
                route.amount = amount;
            }
            if let Some(mirror) = other.trade_routes.iter_mut().find(|r| r.id == id) {
                mirror.amount = -amount;
            }
        }
        // The ledger keeps the creator's sign
        if let Some(entry) = world.trade.routes.iter_mut().find(|r| r.route.id == id) {
            entry.route.amount = if entry.owner == nation { amount } else { -amount };
        }
        tracing::debug!("{} amount updated to {}", id, amount);
        return Some(id);
    }

    let id = world.next_route_id();
    let route = TradeRoute {
        id,
        partner,
        resource,
        amount,
        price: world.trade.market.price(resource),
        established: world.year,
    };
    let mirror = route.mirrored(nation);
    if let Some((owner, other)) = world.pair_mut(nation, partner) {
        owner.trade_routes.push(route.clone());
        other.trade_routes.push(mirror);
    }
    world.trade.routes.push(LedgerRoute { owner: nation, route });

    let message = format!(
        "{} and {} opened a {} route",
        world.nation_name(nation),
        world.nation_name(partner),
        resource
    );
    tracing::debug!("{}", message);
    world.notify(NotificationKind::TradeEstablished, message);
    Some(id)
}

/// Remove a route from `nation`, its partner's mirror and the global ledger.
///
/// Returns false with no state change if `nation` does not hold the route.
/// A missing mirror or ledger entry is tolerated.
pub fn cancel_route(world: &mut World, nation: NationId, id: RouteId) -> bool {
    let Some(owner) = world.nation_mut(nation) else {
        return false;
    };
    let Some(index) = owner.trade_routes.iter().position(|r| r.id == id) else {
        return false;
    };
    let route = owner.trade_routes.remove(index);

    if let Some(partner) = world.nation_mut(route.partner) {
        partner.trade_routes.retain(|r| r.id != id);
    }
    world.trade.routes.retain(|r| r.route.id != id);
    tracing::debug!("{} canceled by {}", id, nation);
    true
}

/// Settle every route held by `nation` at its snapshot price.
///
/// Imports pay gold and receive goods; exports ship goods and receive gold.
/// A route the nation cannot honour is canceled on both sides. Sets the
/// nation's surplus, deficit and economic growth from the net result.
pub fn settle(world: &mut World, nation_id: NationId) -> Settlement {
    let cap = world.config.stockpile_cap;
    let routes = match world.nation(nation_id) {
        Some(n) => n.trade_routes.clone(),
        None => return Settlement::default(),
    };

    let mut result = Settlement::default();
    for route in routes {
        let Some(nation) = world.nation_mut(nation_id) else {
            break;
        };
        let quantity = route.amount.abs();
        let value = quantity * route.price;
        let good = route.resource.resource();

        let honoured = if route.is_import() {
            if nation.resources.try_debit(ResourceKind::Gold, value) {
                nation.resources.credit(good, quantity, cap);
                result.net -= value;
                true
            } else {
                false
            }
        } else if nation.resources.try_debit(good, quantity) {
            nation.resources.gold += value;
            result.net += value;
            true
        } else {
            false
        };

        if honoured {
            result.settled += 1;
            continue;
        }

        let reason = if route.is_import() { "lack of gold" } else { "lack of stock" };
        let message = format!(
            "{} canceled its {} trade with {} for {}",
            world.nation_name(nation_id),
            route.resource,
            world.nation_name(route.partner),
            reason
        );
        tracing::warn!("{}", message);
        cancel_route(world, nation_id, route.id);
        world.notify(NotificationKind::TradeCanceled, message);
        result.canceled.push(route.id);
    }

    if let Some(nation) = world.nation_mut(nation_id) {
        if result.net > 0.0 {
            nation.trade_surplus = result.net;
            nation.trade_deficit = 0.0;
        } else {
            nation.trade_surplus = 0.0;
            nation.trade_deficit = result.net.abs();
        }
        nation.economic_growth = 0.01 + nation.trade_surplus * 0.0001 - nation.trade_deficit * 0.0001;
    }
    result
}
