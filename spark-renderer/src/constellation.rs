//! Constellation draw-list producer.
//!
//! Converts percent-positioned knowledge nodes and their edges into
//! pixel-space draw operations. Edge opacity and width scale with the
//! relationship strength; edges whose endpoints are missing from the
//! node set are skipped rather than panicking on stale data.

use std::collections::HashMap;

use spark_core::{ConstellationEdge, ConstellationNode};

/// A line segment connecting two constellation nodes, in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeDrawOp {
    /// Source endpoint x.
    pub x1: f32,
    /// Source endpoint y.
    pub y1: f32,
    /// Target endpoint x.
    pub x2: f32,
    /// Target endpoint y.
    pub y2: f32,
    /// Stroke opacity, scaled by edge strength.
    pub opacity: f32,
    /// Stroke width in logical pixels, scaled by edge strength.
    pub width: f32,
}

/// A positioned node with its hit-test circle.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeOverlay {
    /// Node identifier, forwarded on click.
    pub id: String,
    /// Label text.
    pub title: String,
    /// Center x in logical pixels.
    pub x: f32,
    /// Center y in logical pixels.
    pub y: f32,
    /// Circle radius in logical pixels.
    pub radius: f32,
    /// CSS-style color string.
    pub color: String,
    /// Whether the node responds to taps.
    pub clickable: bool,
}

/// Pixel-space view over a constellation layout.
#[derive(Debug, Clone)]
pub struct ConstellationView {
    width: f32,
    height: f32,
}

impl ConstellationView {
    /// Create a view at the given surface size in logical pixels.
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }

    /// Update the surface size.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width.max(1.0);
        self.height = height.max(1.0);
    }

    fn to_pixels(&self, x_pct: f32, y_pct: f32) -> (f32, f32) {
        (x_pct / 100.0 * self.width, y_pct / 100.0 * self.height)
    }

    /// Build the edge draw list. Edges referencing unknown node ids are
    /// skipped with a debug log.
    #[must_use]
    pub fn edges(
        &self,
        nodes: &[ConstellationNode],
        edges: &[ConstellationEdge],
    ) -> Vec<EdgeDrawOp> {
        let by_id: HashMap<&str, &ConstellationNode> =
            nodes.iter().map(|n| (n.id.as_str(), n)).collect();

        edges
            .iter()
            .filter_map(|edge| {
                let (Some(source), Some(target)) =
                    (by_id.get(edge.source.as_str()), by_id.get(edge.target.as_str()))
                else {
                    tracing::debug!(
                        "Skipping edge with missing endpoint: {} -> {}",
                        edge.source,
                        edge.target
                    );
                    return None;
                };
                let (x1, y1) = self.to_pixels(source.x_pct, source.y_pct);
                let (x2, y2) = self.to_pixels(target.x_pct, target.y_pct);
                let strength = edge.strength.clamp(0.0, 1.0);
                Some(EdgeDrawOp {
                    x1,
                    y1,
                    x2,
                    y2,
                    opacity: 0.15 + strength * 0.45,
                    width: 1.0 + strength * 2.0,
                })
            })
            .collect()
    }

    /// Build the node overlay list. Locked nodes render but are not
    /// clickable.
    #[must_use]
    pub fn overlays(&self, nodes: &[ConstellationNode]) -> Vec<NodeOverlay> {
        nodes
            .iter()
            .map(|node| {
                let (x, y) = self.to_pixels(node.x_pct, node.y_pct);
                NodeOverlay {
                    id: node.id.clone(),
                    title: node.title.clone(),
                    x,
                    y,
                    radius: node.size / 2.0,
                    color: node.color.clone(),
                    clickable: !node.locked,
                }
            })
            .collect()
    }

    /// Hit-test a pointer position against the overlays, innermost last
    /// (topmost) wins.
    #[must_use]
    pub fn hit_test<'a>(
        &self,
        overlays: &'a [NodeOverlay],
        px: f32,
        py: f32,
    ) -> Option<&'a NodeOverlay> {
        overlays.iter().rev().find(|overlay| {
            overlay.clickable
                && (px - overlay.x).hypot(py - overlay.y) <= overlay.radius
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, x_pct: f32, y_pct: f32, locked: bool) -> ConstellationNode {
        ConstellationNode {
            id: id.to_string(),
            title: id.to_uppercase(),
            x_pct,
            y_pct,
            size: 40.0,
            color: "#88ccff".to_string(),
            locked,
        }
    }

    fn edge(source: &str, target: &str, strength: f32) -> ConstellationEdge {
        ConstellationEdge {
            source: source.to_string(),
            target: target.to_string(),
            strength,
        }
    }

    #[test]
    fn test_percent_to_pixel_conversion() {
        let view = ConstellationView::new(1000.0, 500.0);
        let overlays = view.overlays(&[node("a", 50.0, 20.0, false)]);

        assert!((overlays[0].x - 500.0).abs() < f32::EPSILON);
        assert!((overlays[0].y - 100.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_edge_strength_scales_opacity_and_width() {
        let view = ConstellationView::new(800.0, 600.0);
        let nodes = [node("a", 10.0, 10.0, false), node("b", 90.0, 90.0, false)];

        let weak = view.edges(&nodes, &[edge("a", "b", 0.1)]);
        let strong = view.edges(&nodes, &[edge("a", "b", 1.0)]);

        assert!(strong[0].opacity > weak[0].opacity);
        assert!(strong[0].width > weak[0].width);
    }

    #[test]
    fn test_missing_endpoint_skipped_without_panic() {
        let view = ConstellationView::new(800.0, 600.0);
        let nodes = [node("a", 10.0, 10.0, false)];
        let ops = view.edges(&nodes, &[edge("a", "ghost", 0.8), edge("ghost", "a", 0.8)]);

        assert!(ops.is_empty());
    }

    #[test]
    fn test_locked_nodes_not_clickable() {
        let view = ConstellationView::new(800.0, 600.0);
        let overlays = view.overlays(&[node("a", 50.0, 50.0, true)]);

        assert!(!overlays[0].clickable);
        assert!(view.hit_test(&overlays, 400.0, 300.0).is_none());
    }

    #[test]
    fn test_hit_test_inside_radius() {
        let view = ConstellationView::new(800.0, 600.0);
        let overlays = view.overlays(&[node("a", 50.0, 50.0, false)]);

        let hit = view.hit_test(&overlays, 405.0, 305.0);
        assert_eq!(hit.map(|o| o.id.as_str()), Some("a"));

        assert!(view.hit_test(&overlays, 500.0, 300.0).is_none());
    }
}
