//! Notifications emitted by the engine for display collaborators

use std::collections::VecDeque;

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::core::types::Year;

#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    WarDeclaration,
    WarEnded,
    BattleResult,
    ForcedPeace,
    WarSurrender,
    WarRetreat,
    WarPeace,
    DiplomaticProposal,
    PeaceProposal,
    TreatySigned,
    TradeEstablished,
    TradeCanceled,
    NaturalDisaster,
    RandomEvent,
}

impl NotificationKind {
    /// Coarse grouping used when styling the feed
    pub fn category(&self) -> &'static str {
        match self {
            NotificationKind::WarDeclaration
            | NotificationKind::BattleResult
            | NotificationKind::WarEnded
            | NotificationKind::ForcedPeace
            | NotificationKind::WarSurrender
            | NotificationKind::WarRetreat
            | NotificationKind::WarPeace => "war",
            NotificationKind::DiplomaticProposal
            | NotificationKind::PeaceProposal
            | NotificationKind::TreatySigned => "diplomacy",
            NotificationKind::TradeEstablished | NotificationKind::TradeCanceled => "trade",
            NotificationKind::NaturalDisaster => "disaster",
            NotificationKind::RandomEvent => "event",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    pub year: Year,
}

/// Notification feed, trimmed to the newest entries once per tick
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationLog {
    entries: VecDeque<Notification>,
    /// Total ever recorded, including trimmed entries
    recorded: u64,
}

impl NotificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: NotificationKind, message: String, year: Year) {
        self.entries.push_back(Notification { kind, message, year });
        self.recorded += 1;
    }

    /// Keep only the newest `capacity` entries
    pub fn trim(&mut self, capacity: usize) {
        while self.entries.len() > capacity {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn recorded(&self) -> u64 {
        self.recorded
    }

    /// Oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.entries.iter()
    }

    /// Newest first, at most `n`
    pub fn latest(&self, n: usize) -> impl Iterator<Item = &Notification> {
        self.entries.iter().rev().take(n)
    }

    pub fn of_kind(&self, kind: NotificationKind) -> impl Iterator<Item = &Notification> {
        self.entries.iter().filter(move |n| n.kind == kind)
    }

    pub fn for_year(&self, year: Year) -> impl Iterator<Item = &Notification> {
        self.entries.iter().filter(move |n| n.year == year)
    }
}
