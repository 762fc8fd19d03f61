//! # Gesture Recognition
//!
//! Classifies raw multi-point pointer streams into discrete semantic
//! gestures.
//!
//! ```text
//! one contact   → Swipe (one-shot, dominant axis past threshold)
//! two contacts  → Pinch / Spread (continuous scale = d_current / d0)
//! three or more → ignored
//! ```
//!
//! Classification runs synchronously inside the input handler, so two
//! gestures from the same frame cannot interleave. Any release clears all
//! tracking state (full reset; a still-down finger cannot seed a new
//! gesture until it lifts and presses again).

use serde::{Deserialize, Serialize};

use crate::event::{GestureEvent, PointerSample, SwipeDirection};

/// Configuration for gesture classification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GestureConfig {
    /// Net displacement on one axis (logical px) that completes a swipe.
    pub swipe_threshold_px: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            swipe_threshold_px: 50.0,
        }
    }
}

/// A tracked contact: where it started and where it is now.
#[derive(Debug, Clone, Copy)]
struct Contact {
    id: u32,
    start_x: f32,
    start_y: f32,
    x: f32,
    y: f32,
}

impl Contact {
    fn new(sample: &PointerSample) -> Self {
        Self {
            id: sample.id,
            start_x: sample.x,
            start_y: sample.y,
            x: sample.x,
            y: sample.y,
        }
    }

    fn distance_to(&self, other: &Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Stateful recognizer for swipe, pinch, and spread gestures.
#[derive(Debug)]
pub struct GestureRecognizer {
    config: GestureConfig,
    contacts: Vec<Contact>,
    /// Set once a swipe has fired for the current single contact.
    swipe_consumed: bool,
    /// Initial inter-point distance for the current two-contact pair.
    pair_baseline: Option<f32>,
}

impl GestureRecognizer {
    /// Create a recognizer with default thresholds.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(GestureConfig::default())
    }

    /// Create a recognizer with custom configuration.
    #[must_use]
    pub fn with_config(config: GestureConfig) -> Self {
        Self {
            config,
            contacts: Vec::new(),
            swipe_consumed: false,
            pair_baseline: None,
        }
    }

    /// Get the current configuration.
    #[must_use]
    pub const fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Number of contacts currently tracked.
    #[must_use]
    pub fn active_contacts(&self) -> usize {
        self.contacts.len()
    }

    /// Whether any contact is currently tracked.
    #[must_use]
    pub fn is_tracking(&self) -> bool {
        !self.contacts.is_empty()
    }

    /// Register a new contact.
    ///
    /// Never emits a gesture by itself; it records the starting position
    /// and, when a second contact lands, the pinch/spread baseline `d0`.
    pub fn on_pointer_down(&mut self, sample: &PointerSample) {
        if self.contacts.iter().any(|c| c.id == sample.id) {
            // Duplicate down for a tracked id: treat as a move.
            self.update_contact(sample);
            return;
        }

        self.contacts.push(Contact::new(sample));

        if self.contacts.len() == 2 {
            let d0 = self.contacts[0].distance_to(&self.contacts[1]);
            // A degenerate baseline would make every scale infinite.
            self.pair_baseline = (d0 > f32::EPSILON).then_some(d0);
            tracing::debug!("Two-contact baseline: {d0:.1}px");
        } else if self.contacts.len() > 2 {
            tracing::debug!(
                "{} simultaneous contacts, gesture classification suspended",
                self.contacts.len()
            );
        }
    }

    /// Update a contact position and classify.
    ///
    /// Returns at most one gesture: a one-shot `Swipe` for a single
    /// contact, or a continuous `Pinch`/`Spread` for exactly two.
    pub fn on_pointer_move(&mut self, sample: &PointerSample) -> Option<GestureEvent> {
        self.update_contact(sample);

        match self.contacts.len() {
            1 => self.classify_swipe(),
            2 => self.classify_scale(),
            // Zero (untracked move) or more than two: ambiguous, ignored.
            _ => None,
        }
    }

    /// Release a contact.
    ///
    /// Clears tracking for all contacts: partial release of one of two
    /// fingers does not continue the gesture.
    pub fn on_pointer_up(&mut self, id: u32) {
        if self.contacts.iter().any(|c| c.id == id) {
            self.reset();
        }
    }

    /// Cancel all tracking (e.g. palm rejection, window blur).
    pub fn on_cancel(&mut self) {
        self.reset();
    }

    fn reset(&mut self) {
        self.contacts.clear();
        self.swipe_consumed = false;
        self.pair_baseline = None;
    }

    fn update_contact(&mut self, sample: &PointerSample) {
        if let Some(contact) = self.contacts.iter_mut().find(|c| c.id == sample.id) {
            contact.x = sample.x;
            contact.y = sample.y;
        }
    }

    fn classify_swipe(&mut self) -> Option<GestureEvent> {
        if self.swipe_consumed {
            return None;
        }

        let contact = self.contacts.first()?;
        let dx = contact.x - contact.start_x;
        let dy = contact.y - contact.start_y;
        let threshold = self.config.swipe_threshold_px;

        if dx.abs() < threshold && dy.abs() < threshold {
            return None;
        }

        let direction = if dx.abs() >= dy.abs() {
            if dx > 0.0 {
                SwipeDirection::Right
            } else {
                SwipeDirection::Left
            }
        } else if dy > 0.0 {
            SwipeDirection::Down
        } else {
            SwipeDirection::Up
        };

        // One swipe per contact: no repeat-fire while the finger stays down.
        self.swipe_consumed = true;
        tracing::debug!("Swipe {direction:?} (dx {dx:.0}, dy {dy:.0})");
        Some(GestureEvent::Swipe { direction })
    }

    fn classify_scale(&self) -> Option<GestureEvent> {
        let d0 = self.pair_baseline?;
        let d_current = self.contacts[0].distance_to(&self.contacts[1]);
        let scale = d_current / d0;

        if scale < 1.0 {
            Some(GestureEvent::Pinch { scale })
        } else if scale > 1.0 {
            Some(GestureEvent::Spread { scale })
        } else {
            None
        }
    }
}

impl Default for GestureRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(id: u32, x: f32, y: f32) -> PointerSample {
        PointerSample::new(id, x, y, 0)
    }

    #[test]
    fn test_swipe_right_fires_once() {
        let mut rec = GestureRecognizer::new();
        rec.on_pointer_down(&sample(0, 100.0, 100.0));

        assert!(rec.on_pointer_move(&sample(0, 130.0, 100.0)).is_none());

        let event = rec.on_pointer_move(&sample(0, 160.0, 102.0));
        assert_eq!(
            event,
            Some(GestureEvent::Swipe {
                direction: SwipeDirection::Right
            })
        );

        // No repeat-fire while the finger stays down.
        assert!(rec.on_pointer_move(&sample(0, 300.0, 100.0)).is_none());
    }

    #[test]
    fn test_swipe_direction_matches_axis_sign() {
        let cases = [
            (60.0, 0.0, SwipeDirection::Right),
            (-60.0, 0.0, SwipeDirection::Left),
            (0.0, 60.0, SwipeDirection::Down),
            (0.0, -60.0, SwipeDirection::Up),
        ];

        for (dx, dy, expected) in cases {
            let mut rec = GestureRecognizer::new();
            rec.on_pointer_down(&sample(0, 200.0, 200.0));
            let event = rec.on_pointer_move(&sample(0, 200.0 + dx, 200.0 + dy));
            assert_eq!(event, Some(GestureEvent::Swipe { direction: expected }));
        }
    }

    #[test]
    fn test_swipe_dominant_axis_wins() {
        let mut rec = GestureRecognizer::new();
        rec.on_pointer_down(&sample(0, 0.0, 0.0));

        // 70px right, 55px down: horizontal dominates.
        let event = rec.on_pointer_move(&sample(0, 70.0, 55.0));
        assert_eq!(
            event,
            Some(GestureEvent::Swipe {
                direction: SwipeDirection::Right
            })
        );
    }

    #[test]
    fn test_swipe_rearms_after_release() {
        let mut rec = GestureRecognizer::new();
        rec.on_pointer_down(&sample(0, 0.0, 0.0));
        assert!(rec.on_pointer_move(&sample(0, 80.0, 0.0)).is_some());
        rec.on_pointer_up(0);

        rec.on_pointer_down(&sample(0, 0.0, 0.0));
        assert!(rec.on_pointer_move(&sample(0, 80.0, 0.0)).is_some());
    }

    #[test]
    fn test_below_threshold_no_swipe() {
        let mut rec = GestureRecognizer::new();
        rec.on_pointer_down(&sample(0, 0.0, 0.0));
        assert!(rec.on_pointer_move(&sample(0, 49.0, 10.0)).is_none());
    }

    #[test]
    fn test_custom_threshold() {
        let mut rec = GestureRecognizer::with_config(GestureConfig {
            swipe_threshold_px: 20.0,
        });
        rec.on_pointer_down(&sample(0, 0.0, 0.0));
        assert!(rec.on_pointer_move(&sample(0, 25.0, 0.0)).is_some());
    }

    #[test]
    fn test_spread_scale_is_distance_ratio() {
        let mut rec = GestureRecognizer::new();
        rec.on_pointer_down(&sample(0, 0.0, 0.0));
        rec.on_pointer_down(&sample(1, 100.0, 0.0));

        let event = rec.on_pointer_move(&sample(1, 135.0, 0.0));
        match event {
            Some(GestureEvent::Spread { scale }) => {
                assert!((scale - 1.35).abs() < 1e-4);
            }
            other => panic!("Expected Spread, got {other:?}"),
        }
    }

    #[test]
    fn test_pinch_scale_below_one() {
        let mut rec = GestureRecognizer::new();
        rec.on_pointer_down(&sample(0, 0.0, 0.0));
        rec.on_pointer_down(&sample(1, 100.0, 0.0));

        let event = rec.on_pointer_move(&sample(1, 60.0, 0.0));
        match event {
            Some(GestureEvent::Pinch { scale }) => {
                assert!((scale - 0.6).abs() < 1e-4);
            }
            other => panic!("Expected Pinch, got {other:?}"),
        }
    }

    #[test]
    fn test_scale_exactly_one_emits_nothing() {
        let mut rec = GestureRecognizer::new();
        rec.on_pointer_down(&sample(0, 0.0, 0.0));
        rec.on_pointer_down(&sample(1, 100.0, 0.0));

        // Move back to the starting distance.
        assert!(rec.on_pointer_move(&sample(1, 100.0, 0.0)).is_none());
    }

    #[test]
    fn test_scale_is_continuous() {
        let mut rec = GestureRecognizer::new();
        rec.on_pointer_down(&sample(0, 0.0, 0.0));
        rec.on_pointer_down(&sample(1, 100.0, 0.0));

        assert!(rec.on_pointer_move(&sample(1, 110.0, 0.0)).is_some());
        assert!(rec.on_pointer_move(&sample(1, 120.0, 0.0)).is_some());
        assert!(rec.on_pointer_move(&sample(1, 130.0, 0.0)).is_some());
    }

    #[test]
    fn test_three_contacts_ignored() {
        let mut rec = GestureRecognizer::new();
        rec.on_pointer_down(&sample(0, 0.0, 0.0));
        rec.on_pointer_down(&sample(1, 100.0, 0.0));
        rec.on_pointer_down(&sample(2, 50.0, 50.0));

        assert!(rec.on_pointer_move(&sample(1, 200.0, 0.0)).is_none());
    }

    #[test]
    fn test_any_release_clears_all_tracking() {
        let mut rec = GestureRecognizer::new();
        rec.on_pointer_down(&sample(0, 0.0, 0.0));
        rec.on_pointer_down(&sample(1, 100.0, 0.0));
        assert_eq!(rec.active_contacts(), 2);

        rec.on_pointer_up(0);
        assert_eq!(rec.active_contacts(), 0);
        assert!(!rec.is_tracking());

        // The still-down finger cannot continue the gesture.
        assert!(rec.on_pointer_move(&sample(1, 200.0, 0.0)).is_none());
    }

    #[test]
    fn test_untracked_release_is_noop() {
        let mut rec = GestureRecognizer::new();
        rec.on_pointer_down(&sample(0, 0.0, 0.0));
        rec.on_pointer_up(99);
        assert_eq!(rec.active_contacts(), 1);
    }

    #[test]
    fn test_cancel_clears_tracking() {
        let mut rec = GestureRecognizer::new();
        rec.on_pointer_down(&sample(0, 0.0, 0.0));
        rec.on_cancel();
        assert!(!rec.is_tracking());
    }

    #[test]
    fn test_degenerate_baseline_no_events() {
        let mut rec = GestureRecognizer::new();
        rec.on_pointer_down(&sample(0, 50.0, 50.0));
        rec.on_pointer_down(&sample(1, 50.0, 50.0));

        // Coincident contacts: no baseline, no scale events.
        assert!(rec.on_pointer_move(&sample(1, 150.0, 50.0)).is_none());
    }
}
