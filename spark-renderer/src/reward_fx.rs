//! Floating-reward sprite math.
//!
//! A collected reward floats up from its spawn point and fades out over
//! its lifetime; once expired the coordinator drops it and no sprite is
//! produced.

use spark_core::{FloatingReward, RewardStyle};

/// Total rise over a full lifetime, in logical pixels.
const RISE_PX: f32 = 80.0;

/// A reward at one point in its float-up animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RewardSprite {
    /// Horizontal position in logical pixels.
    pub x: f32,
    /// Vertical position in logical pixels, rising as progress grows.
    pub y: f32,
    /// Opacity, fading from 1 to 0 across the lifetime.
    pub opacity: f32,
    /// Points shown in the sprite label.
    pub amount: u8,
    /// Icon shape.
    pub style: RewardStyle,
}

/// Compute the sprite for a reward at `now_ms`, or `None` once expired.
#[must_use]
pub fn reward_sprite(reward: &FloatingReward, now_ms: u64) -> Option<RewardSprite> {
    if reward.is_expired(now_ms) {
        return None;
    }
    let progress = reward.progress(now_ms);
    Some(RewardSprite {
        x: reward.x,
        y: reward.y - RISE_PX * progress,
        opacity: 1.0 - progress,
        amount: reward.amount,
        style: reward.style,
    })
}
