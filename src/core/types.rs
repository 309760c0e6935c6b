//! Core type definitions used throughout the codebase

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Simulated calendar year (the engine's only unit of time)
pub type Year = i32;

/// Unique identifier for nations
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[display(fmt = "nation#{}", _0)]
pub struct NationId(pub u32);

/// Unique identifier for diplomatic actions in the treaty ledger
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[display(fmt = "action#{}", _0)]
pub struct ActionId(pub u32);

/// Unique identifier for wars
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[display(fmt = "war#{}", _0)]
pub struct WarId(pub u32);

/// Shared identifier of both halves of a mirrored trade route
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[display(fmt = "route#{}", _0)]
pub struct RouteId(pub u32);

/// Unique identifier for battles
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[display(fmt = "battle#{}", _0)]
pub struct BattleId(pub u32);

/// A cell on the fixed territory grid (grid coordinates, not map units)
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[display(fmt = "({}, {})", x, y)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Snap map coordinates onto the grid
    pub fn from_map_coords(x: f64, y: f64, grid_size: f64) -> Self {
        Self {
            x: (x / grid_size).floor() as i32,
            y: (y / grid_size).floor() as i32,
        }
    }

    /// The four orthogonal neighbours
    pub fn neighbors(&self) -> [Cell; 4] {
        [
            Cell::new(self.x + 1, self.y),
            Cell::new(self.x - 1, self.y),
            Cell::new(self.x, self.y + 1),
            Cell::new(self.x, self.y - 1),
        ]
    }
}

/// Form of government
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Government {
    #[display(fmt = "monarchy")]
    Monarchy,
    #[display(fmt = "republic")]
    Republic,
    #[display(fmt = "dictatorship")]
    Dictatorship,
    #[display(fmt = "democracy")]
    Democracy,
}

impl Government {
    pub const ALL: [Government; 4] = [
        Government::Monarchy,
        Government::Republic,
        Government::Dictatorship,
        Government::Democracy,
    ];
}

/// Economic system
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Economy {
    #[display(fmt = "capitalist")]
    Capitalist,
    #[display(fmt = "socialist")]
    Socialist,
    #[display(fmt = "mixed")]
    Mixed,
}

impl Economy {
    pub const ALL: [Economy; 3] = [Economy::Capitalist, Economy::Socialist, Economy::Mixed];

    /// Multiplier applied to population growth
    pub fn growth_factor(&self) -> f64 {
        match self {
            Economy::Capitalist => 1.1,
            Economy::Socialist => 0.9,
            Economy::Mixed => 1.0,
        }
    }
}

/// Every stock a nation keeps in its resource ledger
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    #[display(fmt = "food")]
    Food,
    #[display(fmt = "minerals")]
    Minerals,
    #[display(fmt = "technology")]
    Technology,
    #[display(fmt = "gold")]
    Gold,
}

/// Resources that can travel along a trade route and have a market price.
/// Gold is the settlement currency and is never traded itself.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeGood {
    #[display(fmt = "food")]
    Food,
    #[display(fmt = "minerals")]
    Minerals,
    #[display(fmt = "technology")]
    Technology,
}

impl TradeGood {
    pub const ALL: [TradeGood; 3] = [TradeGood::Food, TradeGood::Minerals, TradeGood::Technology];

    pub fn resource(&self) -> ResourceKind {
        match self {
            TradeGood::Food => ResourceKind::Food,
            TradeGood::Minerals => ResourceKind::Minerals,
            TradeGood::Technology => ResourceKind::Technology,
        }
    }
}

/// Round to two decimal places (prices, population)
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
