//! Simulation systems
//!
//! Free functions over `&mut World`; each ledger is owned by the world and
//! reached through it, never through global state.

pub mod diplomacy;
pub mod events;
pub mod interactions;
pub mod market;
pub mod trade;
pub mod update;
pub mod warfare;

pub use diplomacy::{accept, propose, propose_peace, reject};
pub use events::{apply_effect, run_disasters, run_random_events};
pub use interactions::{resolve_wars, run_interactions, run_pairwise_step};
pub use market::update_market;
pub use trade::{cancel_route, create_route, settle};
pub use update::update_nation;
pub use warfare::{apply_war_upkeep, conduct_military_action, declare_war, end_war};
