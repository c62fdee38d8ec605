use std::collections::HashSet;

use log::debug;
use serde::Deserialize;

/// A reference back to the document block an entity was extracted from.
/// Stored and passed through only; "jump to block" lives in the host UI.
#[derive(Clone, Debug, Deserialize)]
pub struct SourceRef {
    #[serde(rename = "blockId")]
    pub block_id: String,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub confidence: f32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct GraphNode {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default, rename = "sourceRef")]
    pub source_ref: Option<SourceRef>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct GraphEdge {
    pub id: String,
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub relationship: String,
    #[serde(default)]
    pub color: Option<String>,
}

/// Advisory counts and type lists used for the legend. Never enforced
/// against the actual node/edge contents.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct GraphMetadata {
    #[serde(default)]
    pub total_nodes: usize,
    #[serde(default)]
    pub total_edges: usize,
    #[serde(default)]
    pub entity_types: Vec<String>,
    #[serde(default)]
    pub relationship_types: Vec<String>,
}

/// One authoritative version of the graph being visualized. Replaced
/// wholesale on every generate/simplify response, never patched in place.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct GraphSnapshot {
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    #[serde(default)]
    pub edges: Vec<GraphEdge>,
    #[serde(default)]
    pub metadata: GraphMetadata,
}

impl GraphSnapshot {
    /// Tolerate partially-inconsistent server output: duplicate node ids
    /// keep their first occurrence, edges with a missing endpoint or a
    /// self-loop are dropped.
    pub fn sanitized(mut self) -> Self {
        let mut seen = HashSet::with_capacity(self.nodes.len());
        self.nodes.retain(|node| seen.insert(node.id.clone()));
        self.edges.retain(|edge| {
            let keep =
                edge.from != edge.to && seen.contains(&edge.from) && seen.contains(&edge.to);
            if !keep {
                debug!("dropping edge {} ({} -> {})", edge.id, edge.from, edge.to);
            }
            keep
        });
        self
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

/// Quick-navigation data from the backend's sidebar endpoint. Optional:
/// the quick-nav list is derived from the snapshot and only annotated
/// from this model when the fetch succeeds.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SidebarModel {
    #[serde(default)]
    pub sections: Vec<SidebarSection>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SidebarSection {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default, rename = "blockId", alias = "block_id")]
    pub block_id: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str) -> GraphNode {
        GraphNode {
            id: id.to_owned(),
            label: id.to_owned(),
            category: "concept".to_owned(),
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

    #[test]
    fn parses_wire_shape() {
        let raw = r#"{
            "nodes": [
                { "id": "n1", "label": "Introduction", "category": "section" },
                { "id": "n2", "label": "Methods", "category": "section",
                  "sourceRef": { "blockId": "b7", "page": 3, "confidence": 0.95 } }
            ],
            "edges": [
                { "id": "e1", "from": "n1", "to": "n2", "relationship": "contains" }
            ],
            "metadata": { "total_nodes": 2, "total_edges": 1,
                          "entity_types": ["section"],
                          "relationship_types": ["contains"] }
        }"#;

        let snapshot: GraphSnapshot = serde_json::from_str(raw).expect("valid snapshot JSON");
        assert_eq!(snapshot.node_count(), 2);
        assert_eq!(snapshot.edge_count(), 1);
        assert_eq!(snapshot.metadata.entity_types, vec!["section"]);

        let source_ref = snapshot.nodes[1].source_ref.as_ref().expect("sourceRef kept");
        assert_eq!(source_ref.block_id, "b7");
        assert_eq!(source_ref.page, 3);
    }

    #[test]
    fn parses_sparse_payload_with_defaults() {
        let snapshot: GraphSnapshot = serde_json::from_str(r#"{ "nodes": [ { "id": "n1" } ] }"#)
            .expect("sparse snapshot JSON");
        assert_eq!(snapshot.node_count(), 1);
        assert!(snapshot.nodes[0].label.is_empty());
        assert!(snapshot.edges.is_empty());
    }

    #[test]
    fn sanitize_drops_dangling_edges() {
        let snapshot = GraphSnapshot {
            nodes: vec![node("a"), node("b")],
            edges: vec![edge("e1", "a", "b"), edge("e2", "a", "missing"), edge("e3", "b", "b")],
            metadata: GraphMetadata::default(),
        }
        .sanitized();

        assert_eq!(snapshot.edge_count(), 1);
        assert_eq!(snapshot.edges[0].id, "e1");
    }

    #[test]
    fn sanitize_keeps_first_duplicate_node() {
        let mut duplicate = node("a");
        duplicate.label = "second".to_owned();

        let snapshot = GraphSnapshot {
            nodes: vec![node("a"), duplicate, node("b")],
            edges: Vec::new(),
            metadata: GraphMetadata::default(),
        }
        .sanitized();

        assert_eq!(snapshot.node_count(), 2);
        assert_eq!(snapshot.nodes[0].label, "a");
    }
}
