//! Global market - one price per trade good, driven by aggregate supply and demand

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;
use crate::core::types::{round2, TradeGood};
use crate::engine::World;
use crate::nation::Nation;

/// Smallest price step; a shortage always moves the price by at least this much
const TICK: f64 = 0.01;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GlobalMarket {
    pub food: f64,
    pub minerals: f64,
    pub technology: f64,
}

impl GlobalMarket {
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            food: config.initial_food_price,
            minerals: config.initial_minerals_price,
            technology: config.initial_technology_price,
        }
    }

    pub fn price(&self, good: TradeGood) -> f64 {
        match good {
            TradeGood::Food => self.food,
            TradeGood::Minerals => self.minerals,
            TradeGood::Technology => self.technology,
        }
    }

    pub fn price_mut(&mut self, good: TradeGood) -> &mut f64 {
        match good {
            TradeGood::Food => &mut self.food,
            TradeGood::Minerals => &mut self.minerals,
            TradeGood::Technology => &mut self.technology,
        }
    }
}

/// Aggregate demand and supply proxies for one good
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MarketPressure {
    pub demand: f64,
    pub supply: f64,
}

impl MarketPressure {
    /// Supply over demand, if both sides are present
    pub fn ratio(&self) -> Option<f64> {
        if self.demand > 0.0 && self.supply > 0.0 {
            Some(self.supply / self.demand)
        } else {
            None
        }
    }
}

/// Sum the per-nation proxies for `good`
pub fn pressure(nations: &[Nation], good: TradeGood) -> MarketPressure {
    nations.iter().fold(MarketPressure::default(), |mut acc, n| {
        let cells = n.territories.len() as f64;
        let (demand, supply) = match good {
            TradeGood::Food => (n.population * 0.3, cells * 0.5),
            TradeGood::Minerals => (cells * 0.2, cells * 0.3),
            TradeGood::Technology => (n.resources.technology * 0.5, n.resources.technology * 0.1),
        };
        acc.demand += demand;
        acc.supply += supply;
        acc
    })
}

fn bounds(config: &SimulationConfig, good: TradeGood) -> (f64, f64) {
    match good {
        TradeGood::Technology => (config.min_technology_price, config.max_technology_price),
        TradeGood::Food | TradeGood::Minerals => (config.min_commodity_price, config.max_commodity_price),
    }
}

/// Next price for one good given its supply/demand ratio and a uniform roll in [0, 1)
pub fn next_price(config: &SimulationConfig, good: TradeGood, price: f64, ratio: f64, roll: f64) -> f64 {
    let moved = if ratio < config.shortage_ratio {
        (price * (1.0 + roll * config.max_price_move)).max(price + TICK)
    } else if ratio > config.glut_ratio {
        (price * (1.0 - roll * config.max_price_move)).min(price - TICK)
    } else {
        price * (1.0 - config.price_drift + roll * config.price_drift * 2.0)
    };
    let (min, max) = bounds(config, good);
    round2(moved.clamp(min, max))
}

/// Recompute every price from the current nations
pub fn update_market(world: &mut World) {
    for good in TradeGood::ALL {
        let Some(ratio) = pressure(&world.nations, good).ratio() else {
            continue;
        };
        let roll = world.rng.gen::<f64>();
        let current = world.trade.market.price(good);
        let next = next_price(&world.config, good, current, ratio, roll);
        tracing::debug!("{} price {} -> {} (supply/demand {:.2})", good, current, next, ratio);
        *world.trade.market.price_mut(good) = next;
    }
}
