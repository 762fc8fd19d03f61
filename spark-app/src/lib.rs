//! # Spark Canvas Surface
//!
//! The host-facing surface of the Spark Canvas. A host embeds the canvas by
//! mounting a [`CanvasSurface`], forwarding pointer input and explicit
//! actions into it, driving [`CanvasSurface::frame`] from its animation
//! loop, and pulling the per-frame draw lists back out. Everything the
//! canvas wants the host to persist (searches, transcripts, spark deltas)
//! flows out through [`HostCallbacks`].
//!
//! ```text
//! host loop                     CanvasSurface
//! ─────────                     ─────────────
//! pointer events  ──────────▶   orchestrator + gesture recognizer
//! frame(now)      ──────────▶   adapter poll · renderer · audio · orbit
//! draw lists      ◀──────────   particles · bars · constellation · rewards
//! persistence     ◀──────────   HostCallbacks
//! ```
//!
//! Unmounting disposes every renderer and audio resource exactly once;
//! dropping a mounted surface does the same.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;

use spark_core::{
    AudioConfig, AudioController, AudioSink, CanvasAction, CanvasOrchestrator, CoreError,
    EnergyLevel, HostEvent, InteractionCue, OfflineSnapshot, OrbitItem, OrbitMenu,
    OrchestratorConfig, PanelAnchor, PerfConfig, PerformanceAdapter, PointerPhase,
    PointerSample, SnapshotStore, TimeOfDay, VoiceEvent, VoicePhase,
};
use spark_renderer::{
    reward_sprite, AmbientRenderer, AmbientRendererConfig, AudioBarVisualizer, BarDrawOp,
    ConstellationView, EdgeDrawOp, NodeOverlay, RenderError, RewardSprite, SimulatedSignal,
    VisualizerConfig,
};

/// Result type for surface operations.
pub type AppResult<T> = Result<T, AppError>;

/// The idle fade runs on a low-frequency clock, not per animation frame.
const AUDIO_TICK_INTERVAL_MS: u64 = 1_000;

/// Errors surfaced to the host. None of these are fatal to the host
/// application; a failed mount simply means no canvas.
#[derive(Debug, Error)]
pub enum AppError {
    /// The renderer failed or was used after unmount.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// A core operation (snapshot persistence) failed.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Host persistence callbacks, invoked while draining outbound events.
///
/// Unset callbacks drop their events silently; the canvas never blocks on
/// the host.
#[derive(Default)]
pub struct HostCallbacks {
    /// A text query was submitted.
    pub on_search: Option<Box<dyn FnMut(&str)>>,
    /// A voice transcript was finalized.
    pub on_voice_input: Option<Box<dyn FnMut(&str)>>,
    /// A task on the orbit menu was clicked.
    pub on_task_click: Option<Box<dyn FnMut(&str)>>,
    /// A spark delta to add to the persisted balance.
    pub on_spark_collect: Option<Box<dyn FnMut(u8)>>,
    /// A related constellation topic was clicked.
    pub on_related_topic_click: Option<Box<dyn FnMut(&str)>>,
}

impl std::fmt::Debug for HostCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostCallbacks")
            .field("on_search", &self.on_search.is_some())
            .field("on_voice_input", &self.on_voice_input.is_some())
            .field("on_task_click", &self.on_task_click.is_some())
            .field("on_spark_collect", &self.on_spark_collect.is_some())
            .field(
                "on_related_topic_click",
                &self.on_related_topic_click.is_some(),
            )
            .finish()
    }
}

/// Configuration for the whole surface, one section per subsystem.
#[derive(Debug, Clone)]
pub struct SurfaceConfig {
    /// Orchestrator gesture gating.
    pub orchestrator: OrchestratorConfig,
    /// Performance/connectivity polling.
    pub perf: PerfConfig,
    /// Ambient and cue audio.
    pub audio: AudioConfig,
    /// Particle field and backend preference.
    pub renderer: AmbientRendererConfig,
    /// Voice visualizer bars.
    pub visualizer: VisualizerConfig,
    /// Time-of-day mood driving palettes and the ambient track.
    pub time_of_day: TimeOfDay,
    /// Fixed seed for pool sampling and reward amounts; `None` seeds from
    /// the OS.
    pub rng_seed: Option<u64>,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            orchestrator: OrchestratorConfig::default(),
            perf: PerfConfig::default(),
            audio: AudioConfig::default(),
            renderer: AmbientRendererConfig::default(),
            visualizer: VisualizerConfig::default(),
            time_of_day: TimeOfDay::Afternoon,
            rng_seed: None,
        }
    }
}

/// A mounted canvas: orchestrator, performance adapter, audio controller,
/// ambient renderer, orbit menu, and the offline snapshot store, advanced
/// together by `frame(now)`.
pub struct CanvasSurface {
    orchestrator: CanvasOrchestrator,
    adapter: PerformanceAdapter,
    audio: AudioController,
    renderer: AmbientRenderer,
    visualizer: AudioBarVisualizer,
    orbit: OrbitMenu,
    constellation: ConstellationView,
    snapshots: SnapshotStore,
    callbacks: HostCallbacks,
    content: OfflineSnapshot,
    rng: StdRng,
    requested_particles: usize,
    width: f32,
    height: f32,
    last_frame_ms: Option<u64>,
    last_audio_tick_ms: Option<u64>,
    bars: Vec<BarDrawOp>,
    prev_card_expanded: bool,
    prev_constellation_visible: bool,
    mounted: bool,
}

impl std::fmt::Debug for CanvasSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanvasSurface")
            .field("mounted", &self.mounted)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("backend", &self.renderer.active_backend())
            .finish_non_exhaustive()
    }
}

impl CanvasSurface {
    /// Mount the canvas: construct every subsystem and start the ambient
    /// loop.
    ///
    /// # Errors
    ///
    /// Returns an error if no rendering backend can be constructed.
    pub fn mount(
        config: SurfaceConfig,
        callbacks: HostCallbacks,
        sink: Box<dyn AudioSink>,
    ) -> AppResult<Self> {
        let mut rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let adapter = PerformanceAdapter::with_config(config.perf);
        let requested_particles = config.renderer.field.particle_count;

        let mut renderer_config = config.renderer.clone();
        renderer_config.field.time_of_day = config.time_of_day;
        renderer_config.field.particle_count =
            adapter.particle_count(requested_particles);
        let renderer = AmbientRenderer::new(
            renderer_config,
            adapter.state().reduced_features,
            &mut rng,
        )?;

        let mut visualizer_config = config.visualizer;
        visualizer_config.time_of_day = config.time_of_day;
        let seed = config.rng_seed.unwrap_or(0);
        let visualizer = AudioBarVisualizer::new(
            visualizer_config,
            Box::new(SimulatedSignal::new(seed)),
        );

        let mut audio = AudioController::new(sink, config.audio);
        audio.start_ambient(config.time_of_day, 0);

        tracing::info!(
            backend = ?renderer.active_backend(),
            particles = renderer.field().len(),
            "Canvas surface mounted"
        );

        Ok(Self {
            orchestrator: CanvasOrchestrator::with_config(config.orchestrator),
            adapter,
            audio,
            renderer,
            visualizer,
            orbit: OrbitMenu::new(),
            constellation: ConstellationView::new(800.0, 600.0),
            snapshots: SnapshotStore::new(),
            callbacks,
            content: OfflineSnapshot::default(),
            rng,
            requested_particles,
            width: 800.0,
            height: 600.0,
            last_frame_ms: None,
            last_audio_tick_ms: None,
            bars: Vec::new(),
            prev_card_expanded: false,
            prev_constellation_visible: false,
            mounted: true,
        })
    }

    // --- inbound props -----------------------------------------------------

    /// Persist offline snapshots under `data_dir` from now on, and write
    /// the current content there immediately.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the write
    /// fails.
    pub fn persist_snapshots_to(
        &mut self,
        data_dir: impl Into<std::path::PathBuf>,
    ) -> AppResult<()> {
        let mut store = SnapshotStore::with_data_dir(data_dir)?;
        store.save(self.content.clone())?;
        self.snapshots = store;
        Ok(())
    }

    /// Supply fresh content from the host. Saved as the offline snapshot
    /// for replay; a persistence failure is logged, never propagated.
    pub fn set_content(&mut self, content: OfflineSnapshot) {
        if let Err(e) = self.snapshots.save(content.clone()) {
            tracing::warn!("Offline snapshot save failed: {e}");
        }
        self.content = content;
    }

    /// Update the host-persisted spark balance shown on the canvas.
    pub fn set_balance(&mut self, balance: u64) {
        self.orchestrator.set_balance(balance);
    }

    /// Update the child's age, which scales animation intensity.
    pub fn set_child_age(&mut self, age: u8) {
        self.orchestrator.set_child_age(age);
    }

    /// Report a connectivity change from the host.
    pub fn set_online(&mut self, is_online: bool) {
        self.adapter.set_online(is_online);
        if !is_online {
            if let Some(snapshot) = self.snapshots.load() {
                tracing::info!("Offline: replaying cached content");
                self.content = snapshot.clone();
            }
        }
    }

    /// Mute or unmute all audio.
    pub fn set_muted(&mut self, muted: bool, now_ms: u64) {
        let mood = self.visualizer_mood();
        self.audio.set_muted(muted, mood, now_ms);
    }

    /// Resize the surface in logical pixels.
    ///
    /// # Errors
    ///
    /// Returns an error on a zero-sized surface.
    pub fn resize(&mut self, width: u32, height: u32) -> AppResult<()> {
        self.renderer.resize(width, height)?;
        #[allow(clippy::cast_precision_loss)]
        {
            self.width = width as f32;
            self.height = height as f32;
        }
        self.constellation.resize(self.width, self.height);
        self.visualizer.set_size(self.width.min(480.0), 80.0);
        Ok(())
    }

    // --- input -------------------------------------------------------------

    /// Forward a pointer-down sample.
    pub fn pointer_down(&mut self, sample: &PointerSample) {
        self.orchestrator.pointer_down(sample);
    }

    /// Forward a pointer-move sample. Also steers the ambient field toward
    /// the pointer.
    pub fn pointer_move(&mut self, sample: &PointerSample) {
        let nx = (sample.x / self.width).mul_add(2.0, -1.0);
        let ny = (sample.y / self.height).mul_add(2.0, -1.0);
        self.renderer.set_pointer(nx, ny);
        self.orchestrator.pointer_move(sample, &mut self.rng);
    }

    /// Forward a pointer release.
    pub fn pointer_up(&mut self, id: u32) {
        self.orchestrator.pointer_up(id);
    }

    /// Forward a pointer cancellation (e.g. the host stole the gesture).
    pub fn pointer_cancel(&mut self) {
        self.orchestrator.pointer_cancel();
    }

    /// Forward a pointer event by phase, for hosts that carry the phase
    /// alongside the sample.
    pub fn pointer(&mut self, phase: PointerPhase, sample: &PointerSample) {
        match phase {
            PointerPhase::Down => self.pointer_down(sample),
            PointerPhase::Move => self.pointer_move(sample),
            PointerPhase::Up => self.pointer_up(sample.id),
            PointerPhase::Cancel => self.pointer_cancel(),
        }
    }

    /// Forward a speech recognition result. Interim transcripts only keep
    /// the listening state alive; a final transcript is submitted.
    pub fn voice_event(&mut self, event: VoiceEvent) {
        if event.is_final {
            self.action(
                CanvasAction::FinalizeTranscript(event.transcript),
                event.timestamp_ms,
            );
        }
    }

    /// Apply an explicit (non-gesture) user action.
    pub fn action(&mut self, action: CanvasAction, now_ms: u64) {
        match &action {
            CanvasAction::ParticleTap { .. } => {
                self.audio.interaction(InteractionCue::ParticleTap, now_ms);
            }
            CanvasAction::TaskClick(task_id) => {
                self.orbit.toggle_expand(task_id);
            }
            CanvasAction::CloseCard => {
                self.orbit.collapse();
            }
            _ => {}
        }
        self.orchestrator.apply_action(action, now_ms, &mut self.rng);
    }

    // --- frame loop ----------------------------------------------------------

    /// Advance every per-frame loop: adapter, orchestrator, orbit rotation,
    /// ambient field, voice bars, audio idle fade, and event dispatch.
    ///
    /// # Errors
    ///
    /// Returns an error after unmount or if the backend fails.
    #[allow(clippy::cast_precision_loss)]
    pub fn frame(&mut self, now_ms: u64) -> AppResult<()> {
        if !self.mounted {
            return Err(RenderError::Disposed.into());
        }

        self.adapter.record_frame(now_ms);
        let dt_secs = self
            .last_frame_ms
            .map_or(0.0, |last| now_ms.saturating_sub(last) as f32 / 1000.0);
        self.last_frame_ms = Some(now_ms);

        self.orchestrator.frame(now_ms);
        if self.orchestrator.orbit_visible() {
            self.orbit.tick(dt_secs);
        }

        if let Some(state) = self.adapter.poll(now_ms) {
            let tier = self.adapter.particle_count(self.requested_particles);
            if tier != self.renderer.field().len() {
                tracing::info!(tier, fps = state.fps, "Particle tier change");
                self.renderer.retier(tier, &mut self.rng);
            }
            self.audio.set_suppressed(state.reduced_features);
        }

        self.renderer.frame(dt_secs)?;

        if self.orchestrator.voice_phase() == VoicePhase::Listening {
            self.bars = self.visualizer.frame(now_ms as f32 / 1000.0)?;
        } else {
            self.bars.clear();
        }

        let audio_tick_due = self
            .last_audio_tick_ms
            .is_none_or(|last| now_ms.saturating_sub(last) >= AUDIO_TICK_INTERVAL_MS);
        if audio_tick_due {
            self.audio.idle_tick(now_ms);
            self.last_audio_tick_ms = Some(now_ms);
        }
        self.play_transition_cues(now_ms);
        self.dispatch_events(now_ms);
        Ok(())
    }

    fn play_transition_cues(&mut self, now_ms: u64) {
        let card = self.orchestrator.card_expanded();
        if card && !self.prev_card_expanded {
            self.audio.interaction(InteractionCue::CardExpand, now_ms);
        }
        self.prev_card_expanded = card;

        let constellation = self.orchestrator.constellation_visible();
        if constellation && !self.prev_constellation_visible {
            self.audio
                .interaction(InteractionCue::ConstellationReveal, now_ms);
        }
        self.prev_constellation_visible = constellation;
    }

    fn dispatch_events(&mut self, now_ms: u64) {
        for event in self.orchestrator.drain_events() {
            match event {
                HostEvent::Search(query) => {
                    if let Some(cb) = self.callbacks.on_search.as_mut() {
                        cb(&query);
                    }
                }
                HostEvent::VoiceInput(transcript) => {
                    if let Some(cb) = self.callbacks.on_voice_input.as_mut() {
                        cb(&transcript);
                    }
                }
                HostEvent::TaskClick(task_id) => {
                    if let Some(cb) = self.callbacks.on_task_click.as_mut() {
                        cb(&task_id);
                    }
                }
                HostEvent::SparkCollect(amount) => {
                    self.audio.interaction(InteractionCue::SparkCollect, now_ms);
                    if let Some(cb) = self.callbacks.on_spark_collect.as_mut() {
                        cb(amount);
                    }
                }
                HostEvent::RelatedTopicClick(topic_id) => {
                    if let Some(cb) = self.callbacks.on_related_topic_click.as_mut() {
                        cb(&topic_id);
                    }
                }
            }
        }
    }

    // --- draw lists ----------------------------------------------------------

    /// Voice visualizer bars (empty unless listening).
    #[must_use]
    pub fn bars(&self) -> &[BarDrawOp] {
        &self.bars
    }

    /// Constellation edge segments for the current content.
    #[must_use]
    pub fn constellation_edges(&self) -> Vec<EdgeDrawOp> {
        self.constellation
            .edges(&self.content.nodes, &self.content.edges)
    }

    /// Constellation node overlays for the current content.
    #[must_use]
    pub fn constellation_overlays(&self) -> Vec<NodeOverlay> {
        self.constellation.overlays(&self.content.nodes)
    }

    /// Orbit menu layout for the current tasks.
    #[must_use]
    pub fn orbit_layout(&self) -> Vec<OrbitItem> {
        self.orbit.layout(&self.content.tasks, self.width)
    }

    /// Upright detail-panel anchor for the expanded orbit task, if any.
    #[must_use]
    pub fn orbit_panel_anchor(&self) -> Option<PanelAnchor> {
        self.orbit.panel_anchor(&self.content.tasks, self.width)
    }

    /// Floating reward sprites still alive at `now_ms`.
    #[must_use]
    pub fn reward_sprites(&self, now_ms: u64) -> Vec<RewardSprite> {
        self.orchestrator
            .rewards()
            .active()
            .iter()
            .filter_map(|reward| reward_sprite(reward, now_ms))
            .collect()
    }

    // --- state ---------------------------------------------------------------

    /// The orchestrator's canvas state machine.
    #[must_use]
    pub const fn orchestrator(&self) -> &CanvasOrchestrator {
        &self.orchestrator
    }

    /// Current energy level from the displayed balance.
    #[must_use]
    pub const fn energy_level(&self) -> EnergyLevel {
        self.orchestrator.energy_level()
    }

    /// Whether the surface is currently mounted.
    #[must_use]
    pub const fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// GPU buffers still held by the renderer backend.
    #[must_use]
    pub fn live_buffers(&self) -> usize {
        self.renderer.live_buffers()
    }

    fn visualizer_mood(&self) -> TimeOfDay {
        self.renderer.field().config().time_of_day
    }

    // --- teardown ------------------------------------------------------------

    /// Unmount the canvas: dispose the renderer, visualizer, and audio
    /// controller exactly once. Safe to call repeatedly.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.renderer.dispose();
        self.visualizer.dispose();
        self.audio.dispose();
        self.mounted = false;
        tracing::info!("Canvas surface unmounted");
    }
}

impl Drop for CanvasSurface {
    fn drop(&mut self) {
        self.unmount();
    }
}
