use std::collections::HashMap;

use eframe::egui::{Color32, Vec2, vec2};

use crate::backend::GraphSnapshot;
use crate::util::stable_pair;

use super::render_utils::parse_hex_color;

/// Repulsion between every pair of nodes, `REPULSION / d^2`.
pub const REPULSION: f32 = 5_000.0;
/// Linear spring pull along each edge, `ATTRACTION * d`.
pub const ATTRACTION: f32 = 0.006;
/// Weak pull of every node toward the viewport center.
pub const CENTER_PULL: f32 = 0.000_5;
/// Velocity damping applied after force accumulation. Not a physical
/// integrator; damping alone drives the system toward a fixed point.
pub const DAMPING: f32 = 0.7;
/// Distance floor for the repulsion term so near-coincident nodes do not
/// blow up the force.
const MIN_DISTANCE: f32 = 1.0;
/// Horizontal clamp margin.
pub const PADDING_X: f32 = 70.0;
/// Vertical clamp margin, larger than a node radius to leave room for the
/// label drawn below each node.
pub const PADDING_Y: f32 = 55.0;
/// Fraction of the shorter viewport dimension used as the seeding circle
/// radius.
const SEED_RADIUS_FACTOR: f32 = 0.38;
/// Per-axis jitter applied on top of the seeding circle.
const SEED_JITTER: f32 = 40.0;
/// Simulation steps run per seed before the layout is frozen.
pub const ITERATION_BUDGET: u32 = 150;

/// Mutable layout state for one node. Lives only in this arena; the wire
/// types never carry positions.
pub struct LayoutNode {
    pub id: String,
    pub label: String,
    pub category: String,
    pub color: Option<Color32>,
    pub pos: Vec2,
    pub vel: Vec2,
}

pub struct LayoutEdge {
    pub from: usize,
    pub to: usize,
    pub color: Option<Color32>,
}

/// Working copy of the graph the simulator iterates on. Rebuilt from
/// scratch on every snapshot replacement so stale positions are never
/// reused for a different node set.
#[derive(Default)]
pub struct LayoutGraph {
    pub nodes: Vec<LayoutNode>,
    pub edges: Vec<LayoutEdge>,
    index_by_id: HashMap<String, usize>,
}

impl LayoutGraph {
    /// Expects a sanitized snapshot; edges with unknown endpoints are still
    /// skipped here so a raw snapshot cannot panic the simulator. Node
    /// order matches the snapshot, so an index addresses both.
    pub fn from_snapshot(snapshot: &GraphSnapshot) -> Self {
        let mut index_by_id = HashMap::with_capacity(snapshot.nodes.len());
        let nodes = snapshot
            .nodes
            .iter()
            .enumerate()
            .map(|(index, node)| {
                index_by_id.insert(node.id.clone(), index);
                LayoutNode {
                    id: node.id.clone(),
                    label: node.label.clone(),
                    category: node.category.clone(),
                    color: node.color.as_deref().and_then(parse_hex_color),
                    pos: Vec2::ZERO,
                    vel: Vec2::ZERO,
                }
            })
            .collect::<Vec<_>>();

        let edges = snapshot
            .edges
            .iter()
            .filter_map(|edge| {
                let from = *index_by_id.get(&edge.from)?;
                let to = *index_by_id.get(&edge.to)?;
                (from != to).then(|| LayoutEdge {
                    from,
                    to,
                    color: edge.color.as_deref().and_then(parse_hex_color),
                })
            })
            .collect();

        Self {
            nodes,
            edges,
            index_by_id,
        }
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    /// Place node `i` of `n` on a circle around the viewport center with a
    /// deterministic per-id jitter, and zero all velocities.
    pub fn seed(&mut self, width: f32, height: f32) {
        let n = self.nodes.len();
        if n == 0 {
            return;
        }

        let center = vec2(width, height) * 0.5;
        let radius = width.min(height) * SEED_RADIUS_FACTOR;
        for (index, node) in self.nodes.iter_mut().enumerate() {
            let angle = (index as f32 / n as f32) * std::f32::consts::TAU;
            let (jx, jy) = stable_pair(&node.id);
            node.pos = center
                + vec2(angle.cos(), angle.sin()) * radius
                + vec2(jx * SEED_JITTER, jy * SEED_JITTER);
            node.vel = Vec2::ZERO;
        }
    }

    /// One simulation step. Deterministic given current state. Returns the
    /// total displacement across all nodes for this tick.
    pub fn advance(&mut self, width: f32, height: f32) -> f32 {
        let n = self.nodes.len();
        if n == 0 {
            return 0.0;
        }

        let mut forces = vec![Vec2::ZERO; n];

        if n >= 2 {
            for i in 0..n {
                for j in 0..n {
                    if i == j {
                        continue;
                    }
                    let delta = self.nodes[i].pos - self.nodes[j].pos;
                    let distance = delta.length().max(MIN_DISTANCE);
                    forces[i] += (delta / distance) * (REPULSION / (distance * distance));
                }
            }
        }

        for edge in &self.edges {
            let delta = self.nodes[edge.to].pos - self.nodes[edge.from].pos;
            forces[edge.from] += delta * ATTRACTION;
            forces[edge.to] -= delta * ATTRACTION;
        }

        let center = vec2(width, height) * 0.5;
        for (index, force) in forces.iter_mut().enumerate() {
            *force += (center - self.nodes[index].pos) * CENTER_PULL;
        }

        // A viewport narrower than twice the padding collapses the clamp
        // range instead of inverting it.
        let max_x = (width - PADDING_X).max(PADDING_X);
        let max_y = (height - PADDING_Y).max(PADDING_Y);
        let mut total_displacement = 0.0;
        for (node, force) in self.nodes.iter_mut().zip(forces) {
            node.vel = (node.vel + force) * DAMPING;
            let before = node.pos;
            node.pos = vec2(
                (before.x + node.vel.x).clamp(PADDING_X, max_x),
                (before.y + node.vel.y).clamp(PADDING_Y, max_y),
            );
            total_displacement += (node.pos - before).length();
        }
        total_displacement
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{GraphEdge, GraphNode};

    const WIDTH: f32 = 900.0;
    const HEIGHT: f32 = 600.0;

    fn node(id: &str, category: &str) -> GraphNode {
        GraphNode {
            id: id.to_owned(),
            label: id.to_owned(),
            category: category.to_owned(),
            color: None,
            source_ref: None,
        }
    }

    fn edge(id: &str, from: &str, to: &str) -> GraphEdge {
        GraphEdge {
            id: id.to_owned(),
            from: from.to_owned(),
            to: to.to_owned(),
            relationship: "references".to_owned(),
            color: None,
        }
    }

    fn snapshot(nodes: Vec<GraphNode>, edges: Vec<GraphEdge>) -> GraphSnapshot {
        GraphSnapshot {
            nodes,
            edges,
            ..GraphSnapshot::default()
        }
    }

    fn representative_layout() -> LayoutGraph {
        let nodes = (0..20)
            .map(|i| node(&format!("n{i}"), if i % 4 == 0 { "section" } else { "concept" }))
            .collect();
        let edges = (0..15)
            .map(|i| edge(&format!("e{i}"), &format!("n{i}"), &format!("n{}", (i + 3) % 20)))
            .collect();
        let mut layout = LayoutGraph::from_snapshot(&snapshot(nodes, edges));
        layout.seed(WIDTH, HEIGHT);
        layout
    }

    #[test]
    fn seed_places_nodes_on_distinct_positions() {
        let mut layout = LayoutGraph::from_snapshot(&snapshot(
            vec![node("a", "section"), node("b", "concept"), node("c", "person")],
            Vec::new(),
        ));
        layout.seed(WIDTH, HEIGHT);

        for i in 0..layout.nodes.len() {
            for j in (i + 1)..layout.nodes.len() {
                let gap = (layout.nodes[i].pos - layout.nodes[j].pos).length();
                assert!(gap > 1.0, "nodes {i} and {j} seeded on top of each other");
            }
        }
    }

    #[test]
    fn positions_stay_inside_padded_bounds() {
        let mut layout = representative_layout();
        for _ in 0..ITERATION_BUDGET {
            layout.advance(WIDTH, HEIGHT);
            for node in &layout.nodes {
                assert!((PADDING_X..=WIDTH - PADDING_X).contains(&node.pos.x));
                assert!((PADDING_Y..=HEIGHT - PADDING_Y).contains(&node.pos.y));
            }
        }
    }

    #[test]
    fn displacement_decays_over_the_back_half_of_the_budget() {
        let mut layout = representative_layout();
        let displacements = (0..ITERATION_BUDGET)
            .map(|_| layout.advance(WIDTH, HEIGHT))
            .collect::<Vec<_>>();

        let half = displacements.len() / 2;
        let third_quarter = displacements[half..half + half / 2].iter().sum::<f32>();
        let fourth_quarter = displacements[half + half / 2..].iter().sum::<f32>();
        assert!(
            fourth_quarter <= third_quarter * 1.05,
            "displacement not decaying: {third_quarter} then {fourth_quarter}"
        );
    }

    #[test]
    fn connected_nodes_end_up_closer_than_unconnected() {
        let mut layout = LayoutGraph::from_snapshot(&snapshot(
            vec![node("a", "section"), node("b", "concept"), node("c", "person")],
            vec![edge("e1", "a", "b"), edge("e2", "b", "c")],
        ));
        layout.seed(WIDTH, HEIGHT);
        for _ in 0..ITERATION_BUDGET {
            layout.advance(WIDTH, HEIGHT);
        }

        let a = layout.nodes[layout.index_of("a").unwrap()].pos;
        let b = layout.nodes[layout.index_of("b").unwrap()].pos;
        let c = layout.nodes[layout.index_of("c").unwrap()].pos;
        assert!(
            (a - b).length() < (a - c).length(),
            "edge a-b should pull a and b closer than the unconnected a-c pair"
        );
    }

    #[test]
    fn degenerate_graphs_do_not_panic() {
        let mut empty = LayoutGraph::from_snapshot(&snapshot(Vec::new(), Vec::new()));
        empty.seed(WIDTH, HEIGHT);
        assert_eq!(empty.advance(WIDTH, HEIGHT), 0.0);

        let mut single = LayoutGraph::from_snapshot(&snapshot(vec![node("only", "concept")], Vec::new()));
        single.seed(WIDTH, HEIGHT);
        single.advance(WIDTH, HEIGHT);
        assert!(single.nodes[0].pos.x.is_finite());
    }

    #[test]
    fn dangling_edges_are_skipped_at_build_time() {
        let layout = LayoutGraph::from_snapshot(&snapshot(
            vec![node("a", "concept"), node("b", "concept")],
            vec![edge("e1", "a", "b"), edge("e2", "a", "ghost")],
        ));
        assert_eq!(layout.edges.len(), 1);
    }
}
