//! # Reward Coordination
//!
//! Turns qualifying interactions (completed pinch, particle tap, shared
//! discovery) into transient floating reward visuals and spark deltas
//! proposed to the host. The host owns the authoritative balance; this
//! coordinator only tracks the visuals and a derived energy level.

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a floating reward visual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RewardId(Uuid);

impl RewardId {
    /// Create a new unique reward ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RewardId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RewardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Cosmetic style of a reward visual, picked round-robin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewardStyle {
    /// Four-pointed star.
    Star,
    /// Lightning bolt.
    Bolt,
    /// Glowing orb.
    Orb,
}

impl RewardStyle {
    const ALL: [Self; 3] = [Self::Star, Self::Bolt, Self::Orb];

    /// Pick a style by spawn index.
    #[must_use]
    pub const fn nth(index: usize) -> Self {
        Self::ALL[index % 3]
    }
}

/// Animation intensity derived from the displayed spark balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnergyLevel {
    /// Balance below 50.
    Low,
    /// Balance below 200.
    Medium,
    /// Balance 200 or more.
    High,
}

impl EnergyLevel {
    /// Derive the energy level from a displayed balance.
    #[must_use]
    pub const fn from_balance(balance: u64) -> Self {
        if balance < 50 {
            Self::Low
        } else if balance < 200 {
            Self::Medium
        } else {
            Self::High
        }
    }
}

/// A transient reward visual: floats upward, fades out, self-removes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloatingReward {
    /// Unique identifier.
    pub id: RewardId,
    /// Spark amount shown on the visual.
    pub amount: u8,
    /// Spawn X in canvas coordinates.
    pub x: f32,
    /// Spawn Y in canvas coordinates.
    pub y: f32,
    /// When the visual was spawned (ms since mount).
    pub spawned_at_ms: u64,
    /// How long the visual lives before self-removing.
    pub lifetime_ms: u64,
    /// Cosmetic style.
    pub style: RewardStyle,
}

impl FloatingReward {
    /// Fraction of the lifetime elapsed at `now_ms`, clamped to `[0, 1]`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn progress(&self, now_ms: u64) -> f32 {
        if self.lifetime_ms == 0 {
            return 1.0;
        }
        let elapsed = now_ms.saturating_sub(self.spawned_at_ms);
        (elapsed as f32 / self.lifetime_ms as f32).min(1.0)
    }

    /// Whether the visual has outlived its lifetime.
    #[must_use]
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.spawned_at_ms) >= self.lifetime_ms
    }
}

/// Configuration for reward spawning.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RewardConfig {
    /// Smallest random reward amount (inclusive).
    pub min_amount: u8,
    /// Largest random reward amount (inclusive).
    pub max_amount: u8,
    /// Lifetime of a floating visual in milliseconds.
    pub lifetime_ms: u64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            min_amount: 1,
            max_amount: 3,
            lifetime_ms: 1000,
        }
    }
}

/// Coordinator for reward visuals and spark delta proposals.
#[derive(Debug)]
pub struct RewardCoordinator {
    config: RewardConfig,
    active: Vec<FloatingReward>,
    spawned_count: usize,
}

impl RewardCoordinator {
    /// Create a coordinator with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RewardConfig::default())
    }

    /// Create a coordinator with custom configuration.
    #[must_use]
    pub fn with_config(config: RewardConfig) -> Self {
        Self {
            config,
            active: Vec::new(),
            spawned_count: 0,
        }
    }

    /// Get the current configuration.
    #[must_use]
    pub const fn config(&self) -> &RewardConfig {
        &self.config
    }

    /// Spawn a reward visual and return the spark delta to propose.
    ///
    /// `amount` is used as-is when supplied; otherwise a random amount in
    /// `[min_amount, max_amount]` is drawn from `rng`.
    pub fn collect<R: Rng + ?Sized>(
        &mut self,
        x: f32,
        y: f32,
        amount: Option<u8>,
        now_ms: u64,
        rng: &mut R,
    ) -> u8 {
        let amount = amount
            .unwrap_or_else(|| rng.gen_range(self.config.min_amount..=self.config.max_amount));

        let reward = FloatingReward {
            id: RewardId::new(),
            amount,
            x,
            y,
            spawned_at_ms: now_ms,
            lifetime_ms: self.config.lifetime_ms,
            style: RewardStyle::nth(self.spawned_count),
        };

        tracing::debug!("Spark collect +{amount} at ({x:.0}, {y:.0})");
        self.active.push(reward);
        self.spawned_count += 1;
        amount
    }

    /// Remove expired visuals. Returns how many were removed.
    pub fn tick(&mut self, now_ms: u64) -> usize {
        let before = self.active.len();
        self.active.retain(|r| !r.is_expired(now_ms));
        before - self.active.len()
    }

    /// Currently live reward visuals.
    #[must_use]
    pub fn active(&self) -> &[FloatingReward] {
        &self.active
    }

    /// Total visuals spawned over the coordinator's lifetime.
    #[must_use]
    pub const fn spawned_count(&self) -> usize {
        self.spawned_count
    }
}

impl Default for RewardCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
