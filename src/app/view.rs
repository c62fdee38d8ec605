use eframe::egui::{self, Align2, Color32, FontId, Rect, Sense, Shape, Stroke, Ui, vec2};

use crate::util::truncate_label;

use super::GraphView;
use super::interaction::hit_test;
use super::render_utils::{
    DEFAULT_EDGE_COLOR, category_color, draw_background, graph_to_screen, screen_to_graph,
};

/// The drawing surface spans the container width at this fixed height.
pub const GRAPH_HEIGHT: f32 = 560.0;

const NODE_RADIUS: f32 = 10.0;
const SELECTED_NODE_RADIUS: f32 = 13.0;
/// Arrowhead tip sits this far back from the target center so it does not
/// overlap the node circle.
const ARROW_PULLBACK: f32 = 18.0;
const ARROW_LENGTH: f32 = 9.0;
const ARROW_HALF_WIDTH: f32 = 4.5;
const LABEL_MAX_CHARS: usize = 18;
const LABEL_FONT_SIZE: f32 = 11.0;

impl GraphView {
    pub(super) fn draw_graph(&mut self, ui: &mut Ui) {
        let width = ui.available_width().max(1.0);
        let (rect, response) =
            ui.allocate_exact_size(vec2(width, GRAPH_HEIGHT), Sense::click());
        let painter = ui.painter_at(rect);

        draw_background(&painter, rect);

        if self.needs_seed {
            self.layout.seed(rect.width(), rect.height());
            self.ticks_left = super::sim::ITERATION_BUDGET;
            self.needs_seed = false;
        }

        // One bounded simulation step per frame, then the layout freezes.
        if self.ticks_left > 0 {
            self.layout.advance(rect.width(), rect.height());
            self.ticks_left -= 1;
            ui.ctx().request_repaint();
        }

        if response.clicked()
            && let Some(pointer) = response.interact_pointer_pos()
        {
            let point = screen_to_graph(rect, self.zoom, pointer);
            self.selected = hit_test(&self.layout.nodes, point).map(|node| node.id.clone());
        }

        if response.hovered()
            && let Some(pointer) = ui.input(|input| input.pointer.hover_pos())
            && hit_test(&self.layout.nodes, screen_to_graph(rect, self.zoom, pointer)).is_some()
        {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);
        }

        self.draw_edges(&painter, rect);
        self.draw_nodes(&painter, rect);
    }

    fn draw_edges(&self, painter: &egui::Painter, rect: Rect) {
        let zoom = self.zoom;
        for edge in &self.layout.edges {
            let from = self.layout.nodes[edge.from].pos;
            let to = self.layout.nodes[edge.to].pos;
            let delta = to - from;
            let length = delta.length();
            if length < 1.0 {
                continue;
            }

            let color = edge.color.unwrap_or(DEFAULT_EDGE_COLOR);
            painter.line_segment(
                [
                    graph_to_screen(rect, zoom, from),
                    graph_to_screen(rect, zoom, to),
                ],
                Stroke::new(1.4 * zoom, color),
            );

            let direction = delta / length;
            let normal = vec2(-direction.y, direction.x);
            let tip = to - direction * ARROW_PULLBACK;
            let base = tip - direction * ARROW_LENGTH;
            painter.add(Shape::convex_polygon(
                vec![
                    graph_to_screen(rect, zoom, tip),
                    graph_to_screen(rect, zoom, base + normal * ARROW_HALF_WIDTH),
                    graph_to_screen(rect, zoom, base - normal * ARROW_HALF_WIDTH),
                ],
                color,
                Stroke::NONE,
            ));
        }
    }

    fn draw_nodes(&self, painter: &egui::Painter, rect: Rect) {
        let zoom = self.zoom;
        for node in &self.layout.nodes {
            let position = graph_to_screen(rect, zoom, node.pos);
            let is_selected = self.selected.as_deref() == Some(node.id.as_str());
            let radius = if is_selected {
                SELECTED_NODE_RADIUS
            } else {
                NODE_RADIUS
            } * zoom;
            let color = node.color.unwrap_or_else(|| category_color(&node.category));

            painter.circle_filled(
                position,
                radius + 7.0 * zoom,
                Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), 34),
            );
            if is_selected {
                painter.circle_filled(
                    position,
                    radius + 13.0 * zoom,
                    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), 58),
                );
            }

            painter.circle_filled(position, radius, color);
            let border = if is_selected {
                Stroke::new(2.4 * zoom, Color32::WHITE)
            } else {
                Stroke::new(1.2 * zoom, Color32::from_rgba_unmultiplied(12, 14, 18, 200))
            };
            painter.circle_stroke(position, radius, border);

            let label = truncate_label(&node.label, LABEL_MAX_CHARS);
            if label.is_empty() {
                continue;
            }
            let galley = painter.layout_no_wrap(
                label,
                FontId::proportional(LABEL_FONT_SIZE * zoom),
                Color32::from_gray(235),
            );
            let anchor = position + vec2(0.0, radius + 6.0 * zoom);
            let text_rect = Align2::CENTER_TOP.anchor_size(anchor, galley.size());
            painter.rect_filled(
                text_rect.expand2(vec2(4.0, 2.0)),
                3.0,
                Color32::from_rgba_unmultiplied(10, 12, 16, 215),
            );
            painter.galley(text_rect.min, galley, Color32::from_gray(235));
        }
    }
}
