//! # Canvas Orchestrator
//!
//! Owns the canvas state machine and wires gesture output to state
//! transitions: revealing the constellation, expanding/collapsing the
//! content card, toggling the orbit menu, and collecting sparks.
//!
//! ```text
//! Voice:        Idle → Listening → Processing → Idle
//! Constellation: Hidden ⇄ Visible        (vertical swipe)
//! Card:          Collapsed ⇄ Expanded    (spread / pinch past threshold)
//! Orbit:         Hidden ⇄ Visible        (long-press on central control)
//! ```
//!
//! All transitions are driven by recognizer output or explicit actions;
//! only voice Processing returns to Idle on a host signal. Outbound host
//! events are queued and drained by the surface each frame.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::event::{GestureEvent, PointerSample};
use crate::gesture::{GestureConfig, GestureRecognizer};
use crate::reward::{EnergyLevel, RewardCoordinator};

/// Voice interaction phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoicePhase {
    /// Not listening.
    Idle,
    /// Microphone open, capturing a transcript.
    Listening,
    /// Transcript handed to the host, awaiting content.
    Processing,
}

/// Events proposed to the hosting application. The host owns persistence;
/// this core never writes to any store directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum HostEvent {
    /// The user submitted a text query.
    Search(String),
    /// A finalized voice transcript.
    VoiceInput(String),
    /// A task on the orbit menu was clicked.
    TaskClick(String),
    /// A spark delta to persist.
    SparkCollect(u8),
    /// A related constellation topic was clicked.
    RelatedTopicClick(String),
}

/// Explicit user actions that are not gestures.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasAction {
    /// Submit a text query.
    SubmitSearch(String),
    /// The user opened the voice input.
    StartListening,
    /// A voice transcript was finalized.
    FinalizeTranscript(String),
    /// The host finished processing the last query.
    ProcessingComplete,
    /// Long-press on the central control.
    LongPressCenter,
    /// A task was clicked on the orbit menu.
    TaskClick(String),
    /// An ambient particle was tapped at canvas coordinates.
    ParticleTap {
        /// Tap X.
        x: f32,
        /// Tap Y.
        y: f32,
    },
    /// A related topic node was clicked.
    RelatedTopicClick(String),
    /// Explicitly expand the content card.
    ExpandCard,
    /// Explicitly collapse the content card.
    CloseCard,
}

/// Configuration for orchestrator gesture gating.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Spread scale at which the card expands (one-shot per contact pair).
    pub spread_completion: f32,
    /// Pinch scale at or below which the card collapses.
    pub pinch_completion: f32,
    /// Gesture recognizer thresholds.
    pub gesture: GestureConfig,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            spread_completion: 1.3,
            pinch_completion: 0.7,
            gesture: GestureConfig::default(),
        }
    }
}

/// The canvas state machine.
#[derive(Debug)]
pub struct CanvasOrchestrator {
    config: OrchestratorConfig,
    recognizer: GestureRecognizer,
    rewards: RewardCoordinator,
    voice: VoicePhase,
    constellation_visible: bool,
    card_expanded: bool,
    orbit_visible: bool,
    /// One-shot gates, re-armed when the contact pair releases.
    spread_fired: bool,
    pinch_fired: bool,
    /// Host-supplied displayed balance; drives the energy level only.
    displayed_balance: u64,
    /// Host-supplied child age; drives animation intensity.
    child_age: u8,
    pending: Vec<HostEvent>,
}

impl CanvasOrchestrator {
    /// Create an orchestrator with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(OrchestratorConfig::default())
    }

    /// Create an orchestrator with custom configuration.
    #[must_use]
    pub fn with_config(config: OrchestratorConfig) -> Self {
        Self {
            config,
            recognizer: GestureRecognizer::with_config(config.gesture),
            rewards: RewardCoordinator::new(),
            voice: VoicePhase::Idle,
            constellation_visible: false,
            card_expanded: false,
            orbit_visible: false,
            spread_fired: false,
            pinch_fired: false,
            displayed_balance: 0,
            child_age: 8,
            pending: Vec::new(),
        }
    }

    // --- inbound props -----------------------------------------------------

    /// Update the host-persisted spark balance shown on the canvas.
    pub fn set_balance(&mut self, balance: u64) {
        self.displayed_balance = balance;
    }

    /// Update the child age driving animation intensity.
    pub fn set_child_age(&mut self, age: u8) {
        self.child_age = age;
    }

    // --- state accessors ---------------------------------------------------

    /// Current voice phase.
    #[must_use]
    pub const fn voice_phase(&self) -> VoicePhase {
        self.voice
    }

    /// Whether the constellation overlay is visible.
    #[must_use]
    pub const fn constellation_visible(&self) -> bool {
        self.constellation_visible
    }

    /// Whether the content card is expanded.
    #[must_use]
    pub const fn card_expanded(&self) -> bool {
        self.card_expanded
    }

    /// Whether the orbit menu is visible.
    #[must_use]
    pub const fn orbit_visible(&self) -> bool {
        self.orbit_visible
    }

    /// Energy level derived from the displayed balance.
    #[must_use]
    pub const fn energy_level(&self) -> EnergyLevel {
        EnergyLevel::from_balance(self.displayed_balance)
    }

    /// Animation intensity scaled by child age: younger children get a
    /// calmer canvas.
    #[must_use]
    pub fn animation_intensity(&self) -> f32 {
        (f32::from(self.child_age) / 10.0).clamp(0.5, 1.5)
    }

    /// The reward coordinator (live floating visuals).
    #[must_use]
    pub const fn rewards(&self) -> &RewardCoordinator {
        &self.rewards
    }

    // --- pointer input -----------------------------------------------------

    /// Forward a pointer-down to the recognizer.
    pub fn pointer_down(&mut self, sample: &PointerSample) {
        self.recognizer.on_pointer_down(sample);
    }

    /// Forward a pointer-move and apply any resulting transition.
    ///
    /// Classification and the dependent state mutation run synchronously,
    /// so gestures from the same frame cannot interleave.
    pub fn pointer_move<R: Rng + ?Sized>(&mut self, sample: &PointerSample, rng: &mut R) {
        if let Some(gesture) = self.recognizer.on_pointer_move(sample) {
            self.apply_gesture(&gesture, sample.timestamp_ms, rng);
        }
    }

    /// Forward a pointer-up: clears tracking and re-arms one-shot gates.
    pub fn pointer_up(&mut self, id: u32) {
        self.recognizer.on_pointer_up(id);
        if !self.recognizer.is_tracking() {
            self.spread_fired = false;
            self.pinch_fired = false;
        }
    }

    /// Cancel all pointer tracking.
    pub fn pointer_cancel(&mut self) {
        self.recognizer.on_cancel();
        self.spread_fired = false;
        self.pinch_fired = false;
    }

    fn apply_gesture<R: Rng + ?Sized>(&mut self, gesture: &GestureEvent, now_ms: u64, rng: &mut R) {
        match *gesture {
            GestureEvent::Swipe { direction } => {
                if direction.is_vertical() {
                    self.constellation_visible = !self.constellation_visible;
                    tracing::debug!(
                        "Constellation {} (swipe {direction:?})",
                        if self.constellation_visible {
                            "revealed"
                        } else {
                            "hidden"
                        }
                    );
                } else {
                    tracing::debug!("Horizontal swipe {direction:?} ignored");
                }
            }
            GestureEvent::Spread { scale } => {
                if !self.spread_fired && scale >= self.config.spread_completion {
                    self.spread_fired = true;
                    if !self.card_expanded {
                        self.card_expanded = true;
                        tracing::debug!("Card expanded (spread {scale:.2})");
                    }
                }
            }
            GestureEvent::Pinch { scale } => {
                if !self.pinch_fired && scale <= self.config.pinch_completion {
                    self.pinch_fired = true;
                    if self.card_expanded {
                        self.card_expanded = false;
                        tracing::debug!("Card collapsed (pinch {scale:.2})");
                    }
                    // A completed pinch is a qualifying reward event.
                    let delta = self.rewards.collect(0.0, 0.0, None, now_ms, rng);
                    self.pending.push(HostEvent::SparkCollect(delta));
                }
            }
        }
    }

    // --- explicit actions --------------------------------------------------

    /// Apply an explicit user or host action.
    pub fn apply_action<R: Rng + ?Sized>(&mut self, action: CanvasAction, now_ms: u64, rng: &mut R) {
        match action {
            CanvasAction::SubmitSearch(query) => {
                self.voice = VoicePhase::Processing;
                self.pending.push(HostEvent::Search(query));
            }
            CanvasAction::StartListening => {
                if self.voice == VoicePhase::Idle {
                    self.voice = VoicePhase::Listening;
                }
            }
            CanvasAction::FinalizeTranscript(transcript) => {
                if self.voice == VoicePhase::Listening {
                    self.voice = VoicePhase::Processing;
                    self.pending.push(HostEvent::VoiceInput(transcript));
                }
            }
            CanvasAction::ProcessingComplete => {
                // The only time/host-driven transition.
                self.voice = VoicePhase::Idle;
            }
            CanvasAction::LongPressCenter => {
                self.orbit_visible = !self.orbit_visible;
                tracing::debug!("Orbit menu visible: {}", self.orbit_visible);
            }
            CanvasAction::TaskClick(task_id) => {
                self.pending.push(HostEvent::TaskClick(task_id));
            }
            CanvasAction::ParticleTap { x, y } => {
                let delta = self.rewards.collect(x, y, None, now_ms, rng);
                self.pending.push(HostEvent::SparkCollect(delta));
            }
            CanvasAction::RelatedTopicClick(topic) => {
                self.pending.push(HostEvent::RelatedTopicClick(topic));
            }
            CanvasAction::ExpandCard => {
                self.card_expanded = true;
            }
            CanvasAction::CloseCard => {
                self.card_expanded = false;
            }
        }
    }

    // --- per-frame ---------------------------------------------------------

    /// Advance transient state (expired reward visuals).
    pub fn frame(&mut self, now_ms: u64) {
        self.rewards.tick(now_ms);
    }

    /// Drain queued host events for delivery.
    pub fn drain_events(&mut self) -> Vec<HostEvent> {
        std::mem::take(&mut self.pending)
    }

    /// Queued host events awaiting delivery.
    #[must_use]
    pub fn pending_events(&self) -> &[HostEvent] {
        &self.pending
    }
}

impl Default for CanvasOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::SwipeDirection;
    use rand::rngs::mock::StepRng;

    fn rng() -> StepRng {
        StepRng::new(0, 1)
    }

    fn sample(id: u32, x: f32, y: f32) -> PointerSample {
        PointerSample::new(id, x, y, 0)
    }

    /// Drive a two-contact spread from distance 100 to `to`.
    fn spread(orchestrator: &mut CanvasOrchestrator, to: f32) {
        orchestrator.pointer_down(&sample(0, 0.0, 0.0));
        orchestrator.pointer_down(&sample(1, 100.0, 0.0));
        orchestrator.pointer_move(&sample(1, to, 0.0), &mut rng());
    }

    #[test]
    fn test_vertical_swipe_toggles_constellation() {
        let mut orchestrator = CanvasOrchestrator::new();
        assert!(!orchestrator.constellation_visible());

        orchestrator.pointer_down(&sample(0, 100.0, 300.0));
        orchestrator.pointer_move(&sample(0, 100.0, 200.0), &mut rng());
        assert!(orchestrator.constellation_visible());

        orchestrator.pointer_up(0);
        orchestrator.pointer_down(&sample(0, 100.0, 200.0));
        orchestrator.pointer_move(&sample(0, 100.0, 300.0), &mut rng());
        assert!(!orchestrator.constellation_visible());
    }

    #[test]
    fn test_horizontal_swipe_is_ignored() {
        let mut orchestrator = CanvasOrchestrator::new();
        orchestrator.pointer_down(&sample(0, 0.0, 0.0));
        orchestrator.pointer_move(&sample(0, 100.0, 0.0), &mut rng());

        assert!(!orchestrator.constellation_visible());
        assert!(!orchestrator.card_expanded());
        assert!(orchestrator.pending_events().is_empty());
    }

    #[test]
    fn test_spread_past_threshold_expands_card_once() {
        let mut orchestrator = CanvasOrchestrator::new();

        // 100 → 135 px: scale 1.35 past the 1.3 completion threshold.
        spread(&mut orchestrator, 135.0);
        assert!(orchestrator.card_expanded());

        // Subsequent frames with both contacts still down: no retrigger.
        orchestrator.apply_action(CanvasAction::CloseCard, 0, &mut rng());
        orchestrator.pointer_move(&sample(1, 160.0, 0.0), &mut rng());
        orchestrator.pointer_move(&sample(1, 180.0, 0.0), &mut rng());
        assert!(!orchestrator.card_expanded());
    }

    #[test]
    fn test_spread_below_threshold_no_expand() {
        let mut orchestrator = CanvasOrchestrator::new();
        spread(&mut orchestrator, 120.0); // scale 1.2
        assert!(!orchestrator.card_expanded());
    }

    #[test]
    fn test_spread_rearms_after_release() {
        let mut orchestrator = CanvasOrchestrator::new();
        spread(&mut orchestrator, 140.0);
        assert!(orchestrator.card_expanded());

        orchestrator.pointer_up(0);
        orchestrator.apply_action(CanvasAction::CloseCard, 0, &mut rng());

        spread(&mut orchestrator, 140.0);
        assert!(orchestrator.card_expanded());
    }

    #[test]
    fn test_pinch_collapses_card_and_awards_spark() {
        let mut orchestrator = CanvasOrchestrator::new();
        orchestrator.apply_action(CanvasAction::ExpandCard, 0, &mut rng());

        orchestrator.pointer_down(&sample(0, 0.0, 0.0));
        orchestrator.pointer_down(&sample(1, 100.0, 0.0));
        orchestrator.pointer_move(&sample(1, 60.0, 0.0), &mut rng()); // scale 0.6

        assert!(!orchestrator.card_expanded());
        let events = orchestrator.drain_events();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], HostEvent::SparkCollect(1..=3)));
    }

    #[test]
    fn test_pinch_fires_once_per_contact_pair() {
        let mut orchestrator = CanvasOrchestrator::new();
        orchestrator.pointer_down(&sample(0, 0.0, 0.0));
        orchestrator.pointer_down(&sample(1, 100.0, 0.0));
        orchestrator.pointer_move(&sample(1, 60.0, 0.0), &mut rng());
        orchestrator.pointer_move(&sample(1, 50.0, 0.0), &mut rng());
        orchestrator.pointer_move(&sample(1, 40.0, 0.0), &mut rng());

        assert_eq!(orchestrator.drain_events().len(), 1);
    }

    #[test]
    fn test_voice_flow() {
        let mut orchestrator = CanvasOrchestrator::new();
        assert_eq!(orchestrator.voice_phase(), VoicePhase::Idle);

        orchestrator.apply_action(CanvasAction::StartListening, 0, &mut rng());
        assert_eq!(orchestrator.voice_phase(), VoicePhase::Listening);

        orchestrator.apply_action(
            CanvasAction::FinalizeTranscript("why is the sky blue".to_string()),
            0,
            &mut rng(),
        );
        assert_eq!(orchestrator.voice_phase(), VoicePhase::Processing);
        assert_eq!(
            orchestrator.drain_events(),
            vec![HostEvent::VoiceInput("why is the sky blue".to_string())]
        );

        orchestrator.apply_action(CanvasAction::ProcessingComplete, 0, &mut rng());
        assert_eq!(orchestrator.voice_phase(), VoicePhase::Idle);
    }

    #[test]
    fn test_transcript_ignored_when_not_listening() {
        let mut orchestrator = CanvasOrchestrator::new();
        orchestrator.apply_action(
            CanvasAction::FinalizeTranscript("hello".to_string()),
            0,
            &mut rng(),
        );
        assert_eq!(orchestrator.voice_phase(), VoicePhase::Idle);
        assert!(orchestrator.pending_events().is_empty());
    }

    #[test]
    fn test_long_press_toggles_orbit() {
        let mut orchestrator = CanvasOrchestrator::new();
        orchestrator.apply_action(CanvasAction::LongPressCenter, 0, &mut rng());
        assert!(orchestrator.orbit_visible());
        orchestrator.apply_action(CanvasAction::LongPressCenter, 0, &mut rng());
        assert!(!orchestrator.orbit_visible());
    }

    #[test]
    fn test_particle_tap_proposes_delta() {
        let mut orchestrator = CanvasOrchestrator::new();
        orchestrator.apply_action(
            CanvasAction::ParticleTap { x: 50.0, y: 60.0 },
            100,
            &mut rng(),
        );

        let events = orchestrator.drain_events();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], HostEvent::SparkCollect(1..=3)));
        assert_eq!(orchestrator.rewards().active().len(), 1);
    }

    #[test]
    fn test_energy_level_follows_displayed_balance() {
        let mut orchestrator = CanvasOrchestrator::new();
        orchestrator.set_balance(45);
        assert_eq!(orchestrator.energy_level(), EnergyLevel::Low);

        // Collecting +2 proposes a delta but the displayed balance is
        // host-owned: still Low until the host re-renders with >= 50.
        orchestrator.apply_action(CanvasAction::ParticleTap { x: 0.0, y: 0.0 }, 0, &mut rng());
        assert_eq!(orchestrator.energy_level(), EnergyLevel::Low);

        orchestrator.set_balance(50);
        assert_eq!(orchestrator.energy_level(), EnergyLevel::Medium);
    }

    #[test]
    fn test_frame_expires_reward_visuals() {
        let mut orchestrator = CanvasOrchestrator::new();
        orchestrator.apply_action(CanvasAction::ParticleTap { x: 0.0, y: 0.0 }, 0, &mut rng());
        assert_eq!(orchestrator.rewards().active().len(), 1);

        orchestrator.frame(2000);
        assert!(orchestrator.rewards().active().is_empty());
    }

    #[test]
    fn test_search_queues_host_event() {
        let mut orchestrator = CanvasOrchestrator::new();
        orchestrator.apply_action(
            CanvasAction::SubmitSearch("volcanoes".to_string()),
            0,
            &mut rng(),
        );
        assert_eq!(orchestrator.voice_phase(), VoicePhase::Processing);
        assert_eq!(
            orchestrator.drain_events(),
            vec![HostEvent::Search("volcanoes".to_string())]
        );
    }

    #[test]
    fn test_animation_intensity_clamped() {
        let mut orchestrator = CanvasOrchestrator::new();
        orchestrator.set_child_age(3);
        assert!((orchestrator.animation_intensity() - 0.5).abs() < f32::EPSILON);
        orchestrator.set_child_age(12);
        assert!((orchestrator.animation_intensity() - 1.2).abs() < 1e-5);
        orchestrator.set_child_age(30);
        assert!((orchestrator.animation_intensity() - 1.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_drain_empties_queue() {
        let mut orchestrator = CanvasOrchestrator::new();
        orchestrator.apply_action(CanvasAction::TaskClick("t1".to_string()), 0, &mut rng());
        assert_eq!(orchestrator.drain_events().len(), 1);
        assert!(orchestrator.drain_events().is_empty());
    }

    #[test]
    fn test_swipe_event_direction() {
        // Sanity check the recognizer wiring end to end.
        let mut orchestrator = CanvasOrchestrator::new();
        orchestrator.pointer_down(&sample(0, 50.0, 400.0));
        orchestrator.pointer_move(&sample(0, 52.0, 300.0), &mut rng());
        assert!(orchestrator.constellation_visible());

        // Up-swipe direction really was Up.
        let mut recognizer = GestureRecognizer::new();
        recognizer.on_pointer_down(&sample(0, 50.0, 400.0));
        let event = recognizer.on_pointer_move(&sample(0, 52.0, 300.0));
        assert_eq!(
            event,
            Some(GestureEvent::Swipe {
                direction: SwipeDirection::Up
            })
        );
    }
}
