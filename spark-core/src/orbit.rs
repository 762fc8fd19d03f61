//! # Orbit Task Menu
//!
//! Positions a bounded set of task items evenly around a slowly rotating
//! ring. Expanding an item freezes the rotation and yields an upright
//! detail-panel anchor at the item's rotated position.

use serde::{Deserialize, Serialize};

use crate::model::{display_tasks, TaskItem};

/// Configuration for the orbit menu.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OrbitConfig {
    /// Maximum number of tasks shown on the ring.
    pub max_tasks: usize,
    /// Continuous rotation speed in degrees per second.
    pub rotation_deg_per_sec: f32,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            max_tasks: 6,
            rotation_deg_per_sec: 6.0,
        }
    }
}

/// Ring radius for a viewport width, over three responsive breakpoints.
#[must_use]
pub fn radius_for_viewport(viewport_width: f32) -> f32 {
    if viewport_width < 640.0 {
        120.0
    } else if viewport_width < 1024.0 {
        180.0
    } else {
        240.0
    }
}

/// A positioned task item on the ring, relative to the central anchor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbitItem {
    /// The task occupying this slot.
    pub task: TaskItem,
    /// Current angle on the ring in degrees (base slot + rotation).
    pub angle_deg: f32,
    /// X offset from the center.
    pub x: f32,
    /// Y offset from the center.
    pub y: f32,
}

/// Detail-panel anchor for an expanded task.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PanelAnchor {
    /// X offset from the center (the item's rotated position).
    pub x: f32,
    /// Y offset from the center.
    pub y: f32,
    /// Rotation to apply to the panel so it stays upright.
    pub counter_rotation_deg: f32,
}

/// The rotating radial task menu.
#[derive(Debug)]
pub struct OrbitMenu {
    config: OrbitConfig,
    rotation_deg: f32,
    expanded: Option<String>,
}

impl OrbitMenu {
    /// Create a menu with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(OrbitConfig::default())
    }

    /// Create a menu with custom configuration.
    #[must_use]
    pub fn with_config(config: OrbitConfig) -> Self {
        Self {
            config,
            rotation_deg: 0.0,
            expanded: None,
        }
    }

    /// Get the current configuration.
    #[must_use]
    pub const fn config(&self) -> &OrbitConfig {
        &self.config
    }

    /// Current ring rotation in degrees.
    #[must_use]
    pub const fn rotation_deg(&self) -> f32 {
        self.rotation_deg
    }

    /// The expanded task id, if any.
    #[must_use]
    pub fn expanded(&self) -> Option<&str> {
        self.expanded.as_deref()
    }

    /// Advance the continuous rotation. Frozen while a task is expanded.
    pub fn tick(&mut self, dt_secs: f32) {
        if self.expanded.is_none() {
            self.rotation_deg =
                (self.rotation_deg + self.config.rotation_deg_per_sec * dt_secs) % 360.0;
        }
    }

    /// Toggle the expanded state of a task.
    ///
    /// Expanding freezes the ring; clicking the expanded task again (or
    /// [`Self::collapse`]) resumes it.
    pub fn toggle_expand(&mut self, task_id: &str) {
        if self.expanded.as_deref() == Some(task_id) {
            self.collapse();
        } else {
            tracing::debug!("Orbit expand: {task_id}");
            self.expanded = Some(task_id.to_string());
        }
    }

    /// Collapse any expanded task and resume rotation.
    pub fn collapse(&mut self) {
        if self.expanded.take().is_some() {
            tracing::debug!("Orbit collapsed, rotation resumed");
        }
    }

    /// Position the display subset of `tasks` evenly around the ring.
    ///
    /// Tasks are sorted incomplete-first then by descending priority and
    /// capped at `max_tasks` before placement.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn layout(&self, tasks: &[TaskItem], viewport_width: f32) -> Vec<OrbitItem> {
        let display = display_tasks(tasks, self.config.max_tasks);
        let radius = radius_for_viewport(viewport_width);
        let count = display.len();

        display
            .into_iter()
            .enumerate()
            .map(|(index, task)| {
                let base_deg = 360.0 * index as f32 / count as f32;
                let angle_deg = (base_deg + self.rotation_deg) % 360.0;
                let angle_rad = angle_deg.to_radians();
                OrbitItem {
                    task,
                    angle_deg,
                    x: radius * angle_rad.cos(),
                    y: radius * angle_rad.sin(),
                }
            })
            .collect()
    }

    /// Anchor for the expanded task's detail panel, compensated for the
    /// ring rotation so the panel renders upright.
    #[must_use]
    pub fn panel_anchor(&self, tasks: &[TaskItem], viewport_width: f32) -> Option<PanelAnchor> {
        let expanded = self.expanded.as_deref()?;
        self.layout(tasks, viewport_width)
            .into_iter()
            .find(|item| item.task.id == expanded)
            .map(|item| PanelAnchor {
                x: item.x,
                y: item.y,
                counter_rotation_deg: -self.rotation_deg,
            })
    }
}

impl Default for OrbitMenu {
    fn default() -> Self {
        Self::new()
    }
}
