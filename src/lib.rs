//! Nation Sim - yearly simulation of sovereign nations
//!
//! Nations grow, trade, negotiate and fight on a terrain grid, one simulated
//! year per tick.

pub mod core;
pub mod engine;
pub mod nation;
pub mod persistence;
pub mod systems;
pub mod terrain;

pub use crate::core::config::SimulationConfig;
pub use crate::core::error::{Result, SimError};
pub use crate::engine::{simulate_year, World, YearReport};
