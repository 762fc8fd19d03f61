//! # Spark Canvas Core
//!
//! Core interaction logic for the Spark Canvas - the full-screen surface of a
//! children's learning app. Interprets multi-touch gestures, coordinates the
//! reward loop, and adapts to device performance and connectivity.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 spark-core                  │
//! ├─────────────────────────────────────────────┤
//! │  Gesture Recognizer │  Orchestrator         │
//! │  - Swipe            │  - Voice phases       │
//! │  - Pinch / Spread   │  - Card / orbit state │
//! ├─────────────────────────────────────────────┤
//! │  Reward Coordinator │  Performance Adapter  │
//! │  - Floating sparks  │  - FPS / online poll  │
//! │  - Energy level     │  - Particle tiers     │
//! ├─────────────────────────────────────────────┤
//! │  Orbit Menu         │  Offline Snapshot     │
//! │  Audio Controller   │  Time-of-day Palette  │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod audio;
pub mod error;
pub mod event;
pub mod gesture;
pub mod model;
pub mod offline;
pub mod orbit;
pub mod orchestrator;
pub mod perf;
pub mod reward;

pub use audio::{AmbientTrack, AudioConfig, AudioController, AudioSink, InteractionCue};
pub use error::{CoreError, CoreResult};
pub use event::{GestureEvent, PointerPhase, PointerSample, SwipeDirection, VoiceEvent};
pub use gesture::{GestureConfig, GestureRecognizer};
pub use model::{
    ConstellationEdge, ConstellationNode, Rgb, SampleCard, TaskItem, TaskKind, TaskPriority,
    TimeOfDay,
};
pub use offline::{OfflineSnapshot, SnapshotStore};
pub use orbit::{OrbitConfig, OrbitItem, OrbitMenu, PanelAnchor};
pub use orchestrator::{CanvasAction, CanvasOrchestrator, HostEvent, OrchestratorConfig, VoicePhase};
pub use perf::{PerfConfig, PerformanceAdapter, PerformanceState};
pub use reward::{
    EnergyLevel, FloatingReward, RewardConfig, RewardCoordinator, RewardId, RewardStyle,
};

/// Spark core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
