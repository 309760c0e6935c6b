//! Aggregate military units, capacity and battle power

use serde::{Deserialize, Serialize};

/// Casualty fractions (infantry, cavalry, artillery) for the side that holds the field
pub const WINNER_LOSSES: (f64, f64, f64) = (0.10, 0.15, 0.05);
/// Casualty fractions for the side that breaks
pub const LOSER_LOSSES: (f64, f64, f64) = (0.30, 0.25, 0.20);

/// Cavalry and artillery lost per infantry casualty, regardless of outcome
const CAVALRY_ATTRITION: f64 = 0.2;
const ARTILLERY_ATTRITION: f64 = 0.1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilitaryUnits {
    pub infantry: u32,
    pub cavalry: u32,
    pub artillery: u32,
}

impl MilitaryUnits {
    pub fn new(infantry: u32, cavalry: u32, artillery: u32) -> Self {
        Self { infantry, cavalry, artillery }
    }

    /// Starting garrison for a freshly founded nation
    pub fn founding(military_strength: u32) -> Self {
        let ms = military_strength as f64;
        Self {
            infantry: (ms * 2.0).floor() as u32,
            cavalry: (ms * 0.5).floor() as u32,
            artillery: (ms * 0.2).floor() as u32,
        }
    }

    /// Upper bound each unit type regenerates toward
    pub fn capacity(population: f64, military_strength: u32) -> Self {
        let infantry = (population * 0.1).floor().max(0.0) as u32 + military_strength * 2;
        Self {
            infantry,
            cavalry: (infantry as f64 * 0.3).floor() as u32,
            artillery: (infantry as f64 * 0.1).floor() as u32,
        }
    }

    pub fn total(&self) -> u32 {
        self.infantry + self.cavalry + self.artillery
    }

    /// Floor of each unit count times `fraction`
    pub fn scaled(&self, fraction: f64) -> Self {
        let scale = |n: u32| (n as f64 * fraction).floor().max(0.0) as u32;
        Self {
            infantry: scale(self.infantry),
            cavalry: scale(self.cavalry),
            artillery: scale(self.artillery),
        }
    }

    pub fn attack_power(&self) -> f64 {
        self.infantry as f64 + self.cavalry as f64 * 2.0 + self.artillery as f64 * 3.0
    }

    /// Defenders fight from prepared positions
    pub fn defense_power(&self) -> f64 {
        self.infantry as f64 * 1.2 + self.cavalry as f64 * 1.5 + self.artillery as f64 * 2.5
    }

    /// Casualties suffered by this force at the given per-type fractions
    pub fn casualties(&self, fractions: (f64, f64, f64)) -> u32 {
        let (inf, cav, art) = fractions;
        (self.infantry as f64 * inf).floor() as u32
            + (self.cavalry as f64 * cav).floor() as u32
            + (self.artillery as f64 * art).floor() as u32
    }

    /// Remove casualties from the line, with secondary cavalry/artillery attrition
    pub fn apply_losses(&mut self, casualties: u32) {
        let c = casualties as f64;
        self.infantry = self.infantry.saturating_sub(casualties);
        self.cavalry = self.cavalry.saturating_sub((c * CAVALRY_ATTRITION).floor() as u32);
        self.artillery = self.artillery.saturating_sub((c * ARTILLERY_ATTRITION).floor() as u32);
    }

    /// Close `rate` of the gap to `cap` for each unit type, never exceeding it
    pub fn recover_toward(&mut self, cap: &MilitaryUnits, rate: f64) {
        fn step(current: u32, max: u32, rate: f64) -> u32 {
            if current >= max {
                return max;
            }
            let gain = ((max - current) as f64 * rate).floor() as u32;
            (current + gain).min(max)
        }
        self.infantry = step(self.infantry, cap.infantry, rate);
        self.cavalry = step(self.cavalry, cap.cavalry, rate);
        self.artillery = step(self.artillery, cap.artillery, rate);
    }
}
