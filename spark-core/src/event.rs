//! Input events for canvas interaction.

use serde::{Deserialize, Serialize};

/// Phase of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    /// Contact started (finger down).
    Down,
    /// Contact moved (finger dragging).
    Move,
    /// Contact ended (finger up).
    Up,
    /// Contact cancelled (e.g., palm rejection).
    Cancel,
}

/// A single pointer contact sample.
///
/// Ephemeral: produced per active contact point and discarded on release.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerSample {
    /// Contact identifier (for multi-touch).
    pub id: u32,
    /// X position in canvas coordinates.
    pub x: f32,
    /// Y position in canvas coordinates.
    pub y: f32,
    /// Timestamp in milliseconds since canvas mount.
    pub timestamp_ms: u64,
}

impl PointerSample {
    /// Create a new pointer sample.
    #[must_use]
    pub fn new(id: u32, x: f32, y: f32, timestamp_ms: u64) -> Self {
        Self {
            id,
            x,
            y,
            timestamp_ms,
        }
    }
}

/// Direction of a completed swipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeDirection {
    /// Net displacement toward negative X.
    Left,
    /// Net displacement toward positive X.
    Right,
    /// Net displacement toward negative Y.
    Up,
    /// Net displacement toward positive Y.
    Down,
}

impl SwipeDirection {
    /// Whether this direction is on the vertical axis.
    #[must_use]
    pub const fn is_vertical(self) -> bool {
        matches!(self, Self::Up | Self::Down)
    }
}

/// A classified semantic gesture.
///
/// `Swipe` is one-shot (at most one per contact). `Pinch` and `Spread` are
/// continuous: emitted on every qualifying move so the caller can gate on a
/// completion threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "gesture", content = "data")]
pub enum GestureEvent {
    /// Single-contact swipe along the dominant axis.
    Swipe {
        /// Direction of the dominant axis displacement.
        direction: SwipeDirection,
    },

    /// Two-contact pinch (contacts moving together).
    Pinch {
        /// Ratio of current to initial inter-point distance (< 1).
        scale: f32,
    },

    /// Two-contact spread (contacts moving apart).
    Spread {
        /// Ratio of current to initial inter-point distance (> 1).
        scale: f32,
    },
}

/// A voice input event from speech recognition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceEvent {
    /// The recognized speech transcript.
    pub transcript: String,
    /// Whether this is a final (committed) result.
    pub is_final: bool,
    /// Timestamp when the speech was recognized (ms since mount).
    pub timestamp_ms: u64,
}

impl VoiceEvent {
    /// Create a final voice event.
    #[must_use]
    pub fn final_result(transcript: String, timestamp_ms: u64) -> Self {
        Self {
            transcript,
            is_final: true,
            timestamp_ms,
        }
    }

    /// Create an interim (non-final) voice event.
    #[must_use]
    pub fn interim(transcript: String, timestamp_ms: u64) -> Self {
        Self {
            transcript,
            is_final: false,
            timestamp_ms,
        }
    }
}
