//! Resource ledger - per-nation stocks with clamping rules

use serde::{Deserialize, Serialize};

use crate::core::types::ResourceKind;

/// Food, minerals, technology and gold held by one nation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Resources {
    pub food: f64,
    pub minerals: f64,
    pub technology: f64,
    pub gold: f64,
}

impl Resources {
    pub fn new(food: f64, minerals: f64, technology: f64, gold: f64) -> Self {
        Self { food, minerals, technology, gold }
    }

    pub fn get(&self, kind: ResourceKind) -> f64 {
        match kind {
            ResourceKind::Food => self.food,
            ResourceKind::Minerals => self.minerals,
            ResourceKind::Technology => self.technology,
            ResourceKind::Gold => self.gold,
        }
    }

    pub fn get_mut(&mut self, kind: ResourceKind) -> &mut f64 {
        match kind {
            ResourceKind::Food => &mut self.food,
            ResourceKind::Minerals => &mut self.minerals,
            ResourceKind::Technology => &mut self.technology,
            ResourceKind::Gold => &mut self.gold,
        }
    }

    /// Whether at least `amount` of `kind` is in stock
    pub fn has(&self, kind: ResourceKind, amount: f64) -> bool {
        self.get(kind) >= amount
    }

    /// Add to a stock, respecting the storage cap for capped kinds.
    /// Returns the amount actually stored.
    pub fn credit(&mut self, kind: ResourceKind, amount: f64, cap: f64) -> f64 {
        let slot = self.get_mut(kind);
        let before = *slot;
        *slot += amount;
        if is_capped(kind) {
            *slot = slot.min(cap);
        }
        *slot - before
    }

    /// Remove from a stock only if the whole amount is available
    pub fn try_debit(&mut self, kind: ResourceKind, amount: f64) -> bool {
        if !self.has(kind, amount) {
            return false;
        }
        *self.get_mut(kind) -= amount;
        true
    }

    /// Clamp food and minerals into `[0, cap]`
    pub fn clamp_stockpiles(&mut self, cap: f64) {
        self.food = self.food.clamp(0.0, cap);
        self.minerals = self.minerals.clamp(0.0, cap);
    }

    /// Floor every stock at zero
    pub fn clamp_non_negative(&mut self) {
        self.food = self.food.max(0.0);
        self.minerals = self.minerals.max(0.0);
        self.technology = self.technology.max(0.0);
        self.gold = self.gold.max(0.0);
    }
}

/// Food and minerals have storage limits; technology and gold do not
pub fn is_capped(kind: ResourceKind) -> bool {
    matches!(kind, ResourceKind::Food | ResourceKind::Minerals)
}
