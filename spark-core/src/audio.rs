//! # Ambient and Interaction Audio
//!
//! Plays a looping ambient track selected by time-of-day and short one-shot
//! cues keyed by interaction type, with mute/volume control and an idle
//! fade-out on a low-frequency timer. The controller is an explicitly
//! constructed context object: created on canvas mount, disposed on
//! unmount, so multiple canvas instances do not interfere.

use crate::model::TimeOfDay;

/// Ambient loop selected by time-of-day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmbientTrack {
    /// Morning loop.
    MorningMeadow,
    /// Afternoon loop.
    AfternoonBreeze,
    /// Evening loop.
    EveningGlow,
}

impl From<TimeOfDay> for AmbientTrack {
    fn from(mood: TimeOfDay) -> Self {
        match mood {
            TimeOfDay::Morning => Self::MorningMeadow,
            TimeOfDay::Afternoon => Self::AfternoonBreeze,
            TimeOfDay::Evening => Self::EveningGlow,
        }
    }
}

/// One-shot cue keyed by interaction type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionCue {
    /// A spark was collected.
    SparkCollect,
    /// A card expanded.
    CardExpand,
    /// The constellation was revealed.
    ConstellationReveal,
    /// An ambient particle was tapped.
    ParticleTap,
}

/// The audio output seam. Hosts bind a real audio graph; tests record calls.
pub trait AudioSink {
    /// Start (or replace) the looping ambient track.
    fn play_loop(&mut self, track: AmbientTrack);

    /// Stop the looping ambient track.
    fn stop_loop(&mut self);

    /// Play a one-shot cue.
    fn play_cue(&mut self, cue: InteractionCue);

    /// Set the output volume in `[0.0, 1.0]`.
    fn set_volume(&mut self, volume: f32);

    /// Release the underlying audio channel. Called exactly once.
    fn release(&mut self);
}

/// Configuration for the audio controller.
#[derive(Debug, Clone, Copy)]
pub struct AudioConfig {
    /// Initial output volume.
    pub volume: f32,
    /// Idle time before the ambient loop starts fading, in milliseconds.
    pub idle_fade_after_ms: u64,
    /// Volume decrement applied per idle tick while fading.
    pub fade_step: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            volume: 0.6,
            idle_fade_after_ms: 30_000,
            fade_step: 0.1,
        }
    }
}

/// Ambient/interaction audio controller with explicit lifecycle.
pub struct AudioController {
    sink: Box<dyn AudioSink>,
    config: AudioConfig,
    volume: f32,
    muted: bool,
    /// Reduced-features mode suppresses ambient audio by default.
    suppressed: bool,
    looping: bool,
    last_interaction_ms: u64,
    disposed: bool,
}

impl std::fmt::Debug for AudioController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioController")
            .field("volume", &self.volume)
            .field("muted", &self.muted)
            .field("suppressed", &self.suppressed)
            .field("looping", &self.looping)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}

impl AudioController {
    /// Create a controller over the given sink.
    #[must_use]
    pub fn new(sink: Box<dyn AudioSink>, config: AudioConfig) -> Self {
        Self {
            sink,
            config,
            volume: config.volume,
            muted: false,
            suppressed: false,
            looping: false,
            last_interaction_ms: 0,
            disposed: false,
        }
    }

    /// Start the ambient loop for the given mood.
    pub fn start_ambient(&mut self, mood: TimeOfDay, now_ms: u64) {
        if self.disposed || self.muted || self.suppressed {
            return;
        }
        self.sink.set_volume(self.volume);
        self.sink.play_loop(mood.into());
        self.looping = true;
        self.last_interaction_ms = now_ms;
    }

    /// Play a one-shot cue and reset the idle clock.
    ///
    /// Also restores the ambient volume if a fade was in progress.
    pub fn interaction(&mut self, cue: InteractionCue, now_ms: u64) {
        if self.disposed {
            return;
        }
        self.last_interaction_ms = now_ms;
        if self.muted {
            return;
        }
        if self.looping && (self.volume - self.config.volume).abs() > f32::EPSILON {
            self.volume = self.config.volume;
            self.sink.set_volume(self.volume);
        }
        self.sink.play_cue(cue);
    }

    /// Low-frequency idle check: fades the ambient loop out once no
    /// interaction has happened for the configured window.
    pub fn idle_tick(&mut self, now_ms: u64) {
        if self.disposed || !self.looping || self.muted {
            return;
        }
        let idle = now_ms.saturating_sub(self.last_interaction_ms);
        if idle < self.config.idle_fade_after_ms {
            return;
        }

        self.volume = (self.volume - self.config.fade_step).max(0.0);
        self.sink.set_volume(self.volume);
        if self.volume <= f32::EPSILON {
            tracing::debug!("Ambient loop faded out after {idle}ms idle");
            self.sink.stop_loop();
            self.looping = false;
        }
    }

    /// Mute or unmute. Muting stops the ambient loop.
    pub fn set_muted(&mut self, muted: bool, mood: TimeOfDay, now_ms: u64) {
        if self.disposed || self.muted == muted {
            return;
        }
        self.muted = muted;
        if muted {
            if self.looping {
                self.sink.stop_loop();
                self.looping = false;
            }
        } else {
            self.volume = self.config.volume;
            self.start_ambient(mood, now_ms);
        }
    }

    /// Set the output volume.
    pub fn set_volume(&mut self, volume: f32) {
        if self.disposed {
            return;
        }
        self.volume = volume.clamp(0.0, 1.0);
        self.sink.set_volume(self.volume);
    }

    /// Suppress or restore ambient audio (reduced-features mode).
    pub fn set_suppressed(&mut self, suppressed: bool) {
        self.suppressed = suppressed;
        if suppressed && self.looping && !self.disposed {
            self.sink.stop_loop();
            self.looping = false;
        }
    }

    /// Whether the ambient loop is currently playing.
    #[must_use]
    pub const fn is_looping(&self) -> bool {
        self.looping
    }

    /// Whether output is muted.
    #[must_use]
    pub const fn is_muted(&self) -> bool {
        self.muted
    }

    /// Current output volume.
    #[must_use]
    pub const fn volume(&self) -> f32 {
        self.volume
    }

    /// Stop the loop and release the audio channel. Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        if self.looping {
            self.sink.stop_loop();
            self.looping = false;
        }
        self.sink.release();
        self.disposed = true;
    }
}

impl Drop for AudioController {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Records every sink call for assertions.
    #[derive(Debug, Default)]
    struct SinkLog {
        loops: Vec<AmbientTrack>,
        stops: usize,
        cues: Vec<InteractionCue>,
        volumes: Vec<f32>,
        releases: usize,
    }

    #[derive(Default)]
    struct RecordingSink {
        log: Rc<RefCell<SinkLog>>,
    }

    impl AudioSink for RecordingSink {
        fn play_loop(&mut self, track: AmbientTrack) {
            self.log.borrow_mut().loops.push(track);
        }
        fn stop_loop(&mut self) {
            self.log.borrow_mut().stops += 1;
        }
        fn play_cue(&mut self, cue: InteractionCue) {
            self.log.borrow_mut().cues.push(cue);
        }
        fn set_volume(&mut self, volume: f32) {
            self.log.borrow_mut().volumes.push(volume);
        }
        fn release(&mut self) {
            self.log.borrow_mut().releases += 1;
        }
    }

    fn controller() -> (AudioController, Rc<RefCell<SinkLog>>) {
        let log = Rc::new(RefCell::new(SinkLog::default()));
        let sink = RecordingSink { log: Rc::clone(&log) };
        (
            AudioController::new(Box::new(sink), AudioConfig::default()),
            log,
        )
    }

    #[test]
    fn test_track_selection_by_time_of_day() {
        assert_eq!(
            AmbientTrack::from(TimeOfDay::Morning),
            AmbientTrack::MorningMeadow
        );
        assert_eq!(
            AmbientTrack::from(TimeOfDay::Evening),
            AmbientTrack::EveningGlow
        );
    }

    #[test]
    fn test_start_ambient_plays_loop() {
        let (mut audio, log) = controller();
        audio.start_ambient(TimeOfDay::Afternoon, 0);

        assert!(audio.is_looping());
        assert_eq!(log.borrow().loops, vec![AmbientTrack::AfternoonBreeze]);
    }

    #[test]
    fn test_interaction_plays_cue() {
        let (mut audio, log) = controller();
        audio.start_ambient(TimeOfDay::Morning, 0);
        audio.interaction(InteractionCue::SparkCollect, 100);

        assert_eq!(log.borrow().cues, vec![InteractionCue::SparkCollect]);
    }

    #[test]
    fn test_idle_fade_out_stops_loop() {
        let (mut audio, log) = controller();
        audio.start_ambient(TimeOfDay::Morning, 0);

        // Before the window nothing happens.
        audio.idle_tick(29_000);
        assert!(audio.is_looping());

        // Past the window the volume steps down to zero, then the loop stops.
        let mut now = 31_000;
        while audio.is_looping() {
            audio.idle_tick(now);
            now += 1000;
        }
        assert_eq!(log.borrow().stops, 1);
        assert!(audio.volume() <= f32::EPSILON);
    }

    #[test]
    fn test_interaction_resets_idle_and_volume() {
        let (mut audio, _log) = controller();
        audio.start_ambient(TimeOfDay::Morning, 0);
        audio.idle_tick(31_000); // one fade step
        assert!(audio.volume() < 0.6);

        audio.interaction(InteractionCue::ParticleTap, 31_500);
        assert!((audio.volume() - 0.6).abs() < f32::EPSILON);

        // Idle clock restarted: no fade right after.
        audio.idle_tick(32_000);
        assert!((audio.volume() - 0.6).abs() < f32::EPSILON);
    }

    #[test]
    fn test_mute_stops_loop_and_unmute_resumes() {
        let (mut audio, log) = controller();
        audio.start_ambient(TimeOfDay::Evening, 0);

        audio.set_muted(true, TimeOfDay::Evening, 100);
        assert!(!audio.is_looping());
        assert_eq!(log.borrow().stops, 1);

        audio.set_muted(false, TimeOfDay::Evening, 200);
        assert!(audio.is_looping());
    }

    #[test]
    fn test_suppressed_blocks_ambient() {
        let (mut audio, log) = controller();
        audio.set_suppressed(true);
        audio.start_ambient(TimeOfDay::Morning, 0);

        assert!(!audio.is_looping());
        assert!(log.borrow().loops.is_empty());
    }

    #[test]
    fn test_dispose_releases_once() {
        let (mut audio, log) = controller();
        audio.start_ambient(TimeOfDay::Morning, 0);

        audio.dispose();
        audio.dispose();

        let log = log.borrow();
        assert_eq!(log.releases, 1);
        assert_eq!(log.stops, 1);
    }

    #[test]
    fn test_drop_disposes() {
        let log = {
            let (mut audio, log) = controller();
            audio.start_ambient(TimeOfDay::Morning, 0);
            drop(audio);
            log
        };
        assert_eq!(log.borrow().releases, 1);
    }

    #[test]
    fn test_no_calls_after_dispose() {
        let (mut audio, log) = controller();
        audio.dispose();
        audio.start_ambient(TimeOfDay::Morning, 0);
        audio.interaction(InteractionCue::CardExpand, 0);

        let log = log.borrow();
        assert!(log.loops.is_empty());
        assert!(log.cues.is_empty());
    }
}
