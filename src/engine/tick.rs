//! Yearly tick orchestration

use serde::{Deserialize, Serialize};

use crate::core::types::Year;
use crate::engine::World;
use crate::systems::{self, interactions::Interaction};

/// What happened during one simulated year
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct YearReport {
    pub year: Year,
    pub disasters: usize,
    pub random_events: usize,
    pub wars_declared: usize,
    pub wars_ended: usize,
    pub battles: usize,
    pub notifications: usize,
}

/// Advance the world by one year.
///
/// Order: year += 1, every nation's update in list order, the pairwise
/// interaction step and war resolution, disasters, random events, the market,
/// then the notification trim.
pub fn simulate_year(world: &mut World) -> YearReport {
    world.year += 1;
    let recorded_before = world.notifications.recorded();
    let wars_before = world.ids.war;
    let ended_before = world.warfare.history.len();
    let battles_before = world.ids.battle;

    for id in world.nation_ids() {
        systems::update_nation(world, id);
    }

    if let Some(interaction) = systems::run_interactions(world) {
        if !matches!(interaction, Interaction::RelationDrift { .. }) {
            tracing::debug!("{:?}", interaction);
        }
    }

    let disasters = systems::run_disasters(world).len();
    let random_events = systems::run_random_events(world).len();
    systems::update_market(world);

    let capacity = world.config.notification_capacity;
    world.notifications.trim(capacity);

    let report = YearReport {
        year: world.year,
        disasters,
        random_events,
        wars_declared: (world.ids.war - wars_before) as usize,
        wars_ended: world.warfare.history.len() - ended_before,
        battles: (world.ids.battle - battles_before) as usize,
        notifications: (world.notifications.recorded() - recorded_before) as usize,
    };
    tracing::debug!(
        "Year {}: {} battles, {} disasters, {} events",
        report.year,
        report.battles,
        report.disasters,
        report.random_events
    );
    report
}

/// Run `years` ticks back to back
pub fn simulate_years(world: &mut World, years: u32) -> Vec<YearReport> {
    (0..years).map(|_| simulate_year(world)).collect()
}
