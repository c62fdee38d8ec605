use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2, vec2};

/// Category colors mirroring the backend's palette. Unknown categories get
/// the trailing fallback.
const CATEGORY_COLORS: [(&str, Color32); 9] = [
    ("section", Color32::from_rgb(0x4e, 0x79, 0xa7)),
    ("concept", Color32::from_rgb(0xf2, 0x8e, 0x2c)),
    ("person", Color32::from_rgb(0xe1, 0x57, 0x59)),
    ("date", Color32::from_rgb(0x76, 0xb7, 0xb2)),
    ("location", Color32::from_rgb(0x59, 0xa1, 0x4f)),
    ("table", Color32::from_rgb(0xed, 0xc9, 0x49)),
    ("figure", Color32::from_rgb(0xaf, 0x7a, 0xa1)),
    ("definition", Color32::from_rgb(0xff, 0x9d, 0xa7)),
    ("organization", Color32::from_rgb(0x9c, 0x75, 0x5f)),
];

pub const FALLBACK_NODE_COLOR: Color32 = Color32::from_rgb(0x99, 0x99, 0x99);
pub const DEFAULT_EDGE_COLOR: Color32 = Color32::from_rgb(0x6b, 0x72, 0x80);

pub fn category_color(category: &str) -> Color32 {
    CATEGORY_COLORS
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, color)| *color)
        .unwrap_or(FALLBACK_NODE_COLOR)
}

/// Parse `#rrggbb` (leading `#` optional). Anything else falls back to the
/// caller's default by returning `None`.
pub fn parse_hex_color(value: &str) -> Option<Color32> {
    let hex = value.strip_prefix('#').unwrap_or(value);
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color32::from_rgb(r, g, b))
}

const GRID_STEP: f32 = 48.0;

/// Dark clear plus a faint grid for depth cueing. The grid is drawn in
/// screen space with a fixed cell size, independent of zoom.
pub fn draw_background(painter: &Painter, rect: Rect) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(17, 21, 28));

    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(58, 68, 82, 52));
    let mut x = rect.left() + GRID_STEP;
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += GRID_STEP;
    }

    let mut y = rect.top() + GRID_STEP;
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        y += GRID_STEP;
    }
}

/// Uniform zoom centered on the viewport: graph coordinates live in a
/// `[0, w] x [0, h]` surface matching the allocated rect.
pub fn graph_to_screen(rect: Rect, zoom: f32, graph: Vec2) -> Pos2 {
    let center = vec2(rect.width(), rect.height()) * 0.5;
    rect.center() + (graph - center) * zoom
}

pub fn screen_to_graph(rect: Rect, zoom: f32, screen: Pos2) -> Vec2 {
    let center = vec2(rect.width(), rect.height()) * 0.5;
    center + (screen - rect.center()) / zoom
}
