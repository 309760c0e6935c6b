//! Continuous simulation on a fixed interval
//!
//! The world sits behind an async mutex; a tick holds the lock for its whole
//! duration, so ticks never overlap and readers always see a completed year.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::engine::{simulate_year, World, YearReport};

pub struct SimulationRunner {
    world: Arc<Mutex<World>>,
    stop: Option<watch::Sender<bool>>,
    task: Option<JoinHandle<u64>>,
}

impl SimulationRunner {
    pub fn new(world: World) -> Self {
        Self {
            world: Arc::new(Mutex::new(world)),
            stop: None,
            task: None,
        }
    }

    /// Shared handle for readers between ticks
    pub fn world(&self) -> Arc<Mutex<World>> {
        Arc::clone(&self.world)
    }

    /// Run exactly one tick, waiting for any tick in progress
    pub async fn step(&self) -> YearReport {
        let mut world = self.world.lock().await;
        simulate_year(&mut world)
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().map_or(false, |t| !t.is_finished())
    }

    /// Start ticking every `interval`. Returns false if already running.
    pub fn start(&mut self, interval: Duration) -> bool {
        self.spawn(interval, None)
    }

    /// Start ticking every `interval` and stop by itself after `years` ticks.
    /// Returns false if already running.
    pub fn start_for(&mut self, interval: Duration, years: u32) -> bool {
        self.spawn(interval, Some(years as u64))
    }

    fn spawn(&mut self, interval: Duration, limit: Option<u64>) -> bool {
        if self.is_running() {
            return false;
        }

        let world = Arc::clone(&self.world);
        let (tx, mut rx) = watch::channel(false);
        let period = interval.max(Duration::from_millis(1));

        let task = tokio::spawn(async move {
            let mut ticks = 0u64;
            if limit == Some(0) {
                return ticks;
            }

            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick fires immediately; the first year waits one period
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let mut world = world.lock().await;
                        let report = simulate_year(&mut world);
                        ticks += 1;
                        tracing::debug!("Runner tick {} reached year {}", ticks, report.year);
                        if limit.map_or(false, |l| ticks >= l) {
                            break;
                        }
                    }
                    changed = rx.changed() => {
                        if changed.is_err() || *rx.borrow() {
                            break;
                        }
                    }
                }
            }
            ticks
        });

        tracing::info!("Simulation started ({:?} per year)", period);
        self.stop = Some(tx);
        self.task = Some(task);
        true
    }

    /// Wait for a run started with `start_for` to reach its limit.
    ///
    /// Never returns for an unbounded run that nobody stops.
    pub async fn finish(&mut self) -> Option<u64> {
        let task = self.task.take()?;
        let result = task.await;
        self.stop = None;
        match result {
            Ok(ticks) => {
                tracing::info!("Simulation finished after {} ticks", ticks);
                Some(ticks)
            }
            Err(e) => {
                tracing::warn!("Simulation task failed: {}", e);
                None
            }
        }
    }

    /// Stop the loop after any tick in progress finishes.
    ///
    /// Returns how many ticks the loop ran, or `None` if it was not running.
    pub async fn stop(&mut self) -> Option<u64> {
        if let Some(tx) = self.stop.take() {
            let _ = tx.send(true);
        }
        let task = self.task.take()?;
        match task.await {
            Ok(ticks) => {
                tracing::info!("Simulation stopped after {} ticks", ticks);
                Some(ticks)
            }
            Err(e) => {
                tracing::warn!("Simulation task failed: {}", e);
                None
            }
        }
    }

    /// Stop ticking and take the world back
    pub async fn into_world(mut self) -> World {
        self.stop().await;
        match Arc::try_unwrap(self.world) {
            Ok(world) => world.into_inner(),
            // A reader still holds a handle; hand back a copy
            Err(shared) => shared.lock().await.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimulationConfig;
    use crate::engine::test_support::*;

    #[tokio::test]
    async fn test_step_advances_one_year() {
        let mut world = small_world(SimulationConfig::default());
        found(&mut world, "A", 0, 3);
        let runner = SimulationRunner::new(world);
        let report = runner.step().await;
        assert_eq!(report.year, 2024);
        assert_eq!(runner.world().lock().await.year(), 2024);
    }

    #[tokio::test]
    async fn test_start_and_stop() {
        let mut world = small_world(SimulationConfig::default());
        found(&mut world, "A", 0, 3);
        found(&mut world, "B", 1, 3);
        let mut runner = SimulationRunner::new(world);

        assert!(runner.start(Duration::from_millis(5)));
        assert!(!runner.start(Duration::from_millis(5)));
        assert!(runner.is_running());
        tokio::time::sleep(Duration::from_millis(60)).await;

        let ticks = runner.stop().await.unwrap();
        assert!(ticks > 0);
        assert!(!runner.is_running());
        let year = runner.world().lock().await.year();
        assert_eq!(year, 2023 + ticks as i32);
    }

    #[tokio::test]
    async fn test_bounded_run_ticks_exactly() {
        for seed in 0..5 {
            let mut world = small_world(SimulationConfig::seeded(seed));
            for (row, name) in ["A", "B", "C", "D"].iter().enumerate() {
                found(&mut world, name, row as i32, 3);
            }
            let mut runner = SimulationRunner::new(world);

            assert!(runner.start_for(Duration::from_millis(2), 25));
            assert_eq!(runner.finish().await, Some(25));
            assert!(!runner.is_running());
            tokio::time::sleep(Duration::from_millis(10)).await;

            let world = runner.into_world().await;
            assert_eq!(world.year(), 2023 + 25, "seed {}", seed);
        }
    }

    #[tokio::test]
    async fn test_zero_year_run_does_nothing() {
        let mut runner = SimulationRunner::new(small_world(SimulationConfig::default()));
        assert!(runner.start_for(Duration::from_millis(1), 0));
        assert_eq!(runner.finish().await, Some(0));
        assert_eq!(runner.world().lock().await.year(), 2023);
    }

    #[tokio::test]
    async fn test_into_world_returns_state() {
        let mut world = small_world(SimulationConfig::default());
        found(&mut world, "A", 0, 3);
        let runner = SimulationRunner::new(world);
        runner.step().await;
        let reader = runner.world();
        let world = runner.into_world().await;
        assert_eq!(world.year(), 2024);
        assert_eq!(reader.lock().await.year(), 2024);
    }

    #[tokio::test]
    async fn test_stop_when_idle() {
        let mut runner = SimulationRunner::new(small_world(SimulationConfig::default()));
        assert!(runner.stop().await.is_none());
    }
}
