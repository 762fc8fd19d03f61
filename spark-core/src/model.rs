//! Domain model supplied by the hosting application.
//!
//! Constellation nodes/edges, task items, and sample cards are read-only
//! inputs to this core; the host owns persistence.

use serde::{Deserialize, Serialize};

/// An RGB color with components in `[0.0, 1.0]`.
pub type Rgb = [f32; 3];

/// Time-of-day mood used across the particle renderer, audio controller,
/// and visualizer gradients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    /// Before noon.
    Morning,
    /// Noon to early evening.
    Afternoon,
    /// After 18:00.
    Evening,
}

impl TimeOfDay {
    /// Map an hour of day (0-23) to a mood.
    #[must_use]
    pub const fn from_hour(hour: u8) -> Self {
        match hour {
            5..=11 => Self::Morning,
            12..=17 => Self::Afternoon,
            _ => Self::Evening,
        }
    }

    /// Fixed three-hue palette for this mood.
    #[must_use]
    pub const fn palette(self) -> [Rgb; 3] {
        match self {
            // Warm sunrise golds
            Self::Morning => [[1.0, 0.78, 0.35], [1.0, 0.6, 0.4], [0.95, 0.88, 0.6]],
            // Bright sky blues
            Self::Afternoon => [[0.35, 0.65, 1.0], [0.45, 0.85, 0.9], [0.7, 0.9, 1.0]],
            // Deep violets
            Self::Evening => [[0.55, 0.35, 0.85], [0.35, 0.25, 0.7], [0.8, 0.5, 0.9]],
        }
    }

    /// Top/bottom gradient stops for the audio visualizer bars.
    #[must_use]
    pub const fn gradient(self) -> (Rgb, Rgb) {
        let palette = self.palette();
        (palette[0], palette[1])
    }
}

/// A topic node in the constellation graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstellationNode {
    /// Stable identifier supplied by the host.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Horizontal position as a percentage of canvas width (0-100).
    pub x_pct: f32,
    /// Vertical position as a percentage of canvas height (0-100).
    pub y_pct: f32,
    /// Visual size in logical pixels.
    pub size: f32,
    /// Node color as a hex string (e.g. `#ffaa33`).
    pub color: String,
    /// Locked nodes are visible but not clickable.
    pub locked: bool,
}

/// A weighted edge between two constellation nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstellationEdge {
    /// Source node id.
    pub source: String,
    /// Target node id.
    pub target: String,
    /// Connection strength in `[0.0, 1.0]`; drives opacity and width.
    pub strength: f32,
}

/// Category of a task item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    /// Everyday routine task.
    Daily,
    /// Learning activity.
    Learning,
    /// Creative activity.
    Creative,
    /// Stretch challenge.
    Challenge,
}

/// Priority of a task item. Ordered so `High > Medium > Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    /// Can wait.
    Low,
    /// Normal.
    Medium,
    /// Do first.
    High,
}

/// A task displayed on the orbit menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskItem {
    /// Stable identifier supplied by the host.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Task category.
    pub kind: TaskKind,
    /// Whether the task is done.
    pub completed: bool,
    /// Display priority.
    pub priority: TaskPriority,
    /// Optional due date (host-formatted).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

/// Derive the display list for the orbit menu: incomplete tasks first
/// (by descending priority), then completed ones, capped at `max_tasks`.
#[must_use]
pub fn display_tasks(tasks: &[TaskItem], max_tasks: usize) -> Vec<TaskItem> {
    let mut sorted: Vec<TaskItem> = tasks.to_vec();
    sorted.sort_by(|a, b| {
        a.completed
            .cmp(&b.completed)
            .then(b.priority.cmp(&a.priority))
    });
    sorted.truncate(max_tasks);
    sorted
}

/// A cached content card, replayed when connectivity is unavailable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleCard {
    /// Stable identifier supplied by the host.
    pub id: String,
    /// Card title.
    pub title: String,
    /// Card body text.
    pub body: String,
}
