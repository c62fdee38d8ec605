use eframe::egui::Vec2;

use super::sim::LayoutNode;

pub const MIN_ZOOM: f32 = 0.5;
pub const MAX_ZOOM: f32 = 2.0;
pub const ZOOM_STEP: f32 = 0.2;
/// Selection radius around a node center, in graph units.
pub const HIT_RADIUS: f32 = 20.0;

pub fn zoom_in(zoom: f32) -> f32 {
    (zoom + ZOOM_STEP).clamp(MIN_ZOOM, MAX_ZOOM)
}

pub fn zoom_out(zoom: f32) -> f32 {
    (zoom - ZOOM_STEP).clamp(MIN_ZOOM, MAX_ZOOM)
}

/// Node under a pointer position already mapped into graph space. The
/// nearest center within [`HIT_RADIUS`] wins; ties break toward the lower
/// index. `None` means the click lands on empty canvas and clears the
/// selection.
pub fn hit_test(nodes: &[LayoutNode], point: Vec2) -> Option<&LayoutNode> {
    nodes
        .iter()
        .map(|node| (node, (node.pos - point).length()))
        .filter(|(_, distance)| *distance <= HIT_RADIUS)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(node, _)| node)
}
