use eframe::egui::{self, Color32, Context, RichText, ScrollArea};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use super::GraphView;
use super::interaction::{zoom_in, zoom_out};
use super::render_utils::category_color;

/// UI requests collected during one frame and acted on by the session
/// controller afterwards.
#[derive(Default)]
pub struct PanelActions {
    pub regenerate: bool,
    pub simplify: Option<usize>,
}

impl GraphView {
    pub(super) fn show(
        &mut self,
        ctx: &Context,
        document_id: &str,
        in_flight: bool,
        last_error: Option<&str>,
        actions: &mut PanelActions,
    ) {
        egui::SidePanel::right("graph_controls")
            .default_width(260.0)
            .show(ctx, |ui| {
                ui.add_space(6.0);
                ui.heading("Document graph");
                ui.label(RichText::new(document_id).monospace().weak());
                ui.add_space(4.0);
                ui.label(format!(
                    "{} nodes · {} edges",
                    self.snapshot.node_count(),
                    self.snapshot.edge_count()
                ));
                let metadata = &self.snapshot.metadata;
                if metadata.total_nodes != self.snapshot.node_count()
                    || metadata.total_edges != self.snapshot.edge_count()
                {
                    ui.weak(format!(
                        "server reported {} nodes · {} edges",
                        metadata.total_nodes, metadata.total_edges
                    ));
                }

                if in_flight {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.weak("refreshing…");
                    });
                }
                if let Some(error) = last_error {
                    ui.colored_label(Color32::LIGHT_RED, error);
                }

                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("Regenerate").clicked() {
                        actions.regenerate = true;
                    }
                    if ui.button("Simplify").clicked() {
                        actions.simplify = Some(self.simplify_nodes);
                    }
                });
                ui.add(
                    egui::Slider::new(&mut self.simplify_nodes, 5..=30).text("max nodes"),
                );

                ui.separator();
                ui.horizontal(|ui| {
                    ui.label("Zoom");
                    if ui.button("−").clicked() {
                        self.zoom = zoom_out(self.zoom);
                    }
                    ui.monospace(format!("{:.0}%", self.zoom * 100.0));
                    if ui.button("+").clicked() {
                        self.zoom = zoom_in(self.zoom);
                    }
                });

                ui.separator();
                self.quick_nav(ui);

                self.selected_details(ui);

                ui.separator();
                self.legend(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_graph(ui);
        });
    }

    /// Side list of section nodes. Clicking an entry produces exactly the
    /// selection state a canvas hit would.
    fn quick_nav(&mut self, ui: &mut egui::Ui) {
        ui.label(RichText::new("Sections").strong());
        ui.add(
            egui::TextEdit::singleline(&mut self.nav_filter).hint_text("filter sections"),
        );

        let matcher = SkimMatcherV2::default();
        let filter = self.nav_filter.trim();
        let mut next_selection = None;

        ScrollArea::vertical().max_height(220.0).show(ui, |ui| {
            let mut any = false;
            for node in &self.layout.nodes {
                if node.category != "section" {
                    continue;
                }
                if !filter.is_empty() && matcher.fuzzy_match(&node.label, filter).is_none() {
                    continue;
                }
                any = true;

                let page = self.section_page(&node.id);
                let text = match page {
                    Some(page) => format!("{}  ·  p. {}", node.label, page + 1),
                    None => node.label.clone(),
                };
                let is_selected = self.selected.as_deref() == Some(node.id.as_str());
                if ui.selectable_label(is_selected, text).clicked() {
                    next_selection = Some(node.id.clone());
                }
            }
            if !any {
                ui.weak("no sections");
            }
        });

        if let Some(id) = next_selection {
            self.selected = Some(id);
        }
    }

    /// Details for the selected node: category, originating block, and its
    /// relationships.
    fn selected_details(&self, ui: &mut egui::Ui) {
        let Some(selected_id) = self.selected.as_deref() else {
            return;
        };
        let Some(node) = self
            .layout
            .index_of(selected_id)
            .and_then(|index| self.snapshot.nodes.get(index))
        else {
            return;
        };

        ui.separator();
        ui.label(RichText::new("Selected").strong());
        ui.label(format!("{} ({})", node.label, node.category));
        if let Some(source_ref) = &node.source_ref {
            ui.weak(format!(
                "block {} · p. {} · confidence {:.2}",
                source_ref.block_id,
                source_ref.page + 1,
                source_ref.confidence
            ));
        } else if let Some(section) = self
            .sidebar
            .as_ref()
            .and_then(|sidebar| sidebar.sections.iter().find(|section| section.id == selected_id))
        {
            let block = section.block_id.as_deref().unwrap_or("?");
            match section.page {
                Some(page) => ui.weak(format!("{} · block {block} · p. {}", section.label, page + 1)),
                None => ui.weak(format!("{} · block {block}", section.label)),
            };
        }

        for edge in &self.snapshot.edges {
            let (other_id, arrow) = if edge.from == selected_id {
                (&edge.to, "→")
            } else if edge.to == selected_id {
                (&edge.from, "←")
            } else {
                continue;
            };
            if let Some(other) = self
                .layout
                .index_of(other_id)
                .and_then(|index| self.snapshot.nodes.get(index))
            {
                ui.weak(format!("{arrow} {} ({})", other.label, edge.relationship));
            }
        }
    }

    /// Page number for a section, preferring the sidebar fetch over the
    /// node's own source reference.
    fn section_page(&self, node_id: &str) -> Option<u32> {
        if let Some(sidebar) = &self.sidebar
            && let Some(section) = sidebar.sections.iter().find(|section| section.id == node_id)
            && let Some(page) = section.page
        {
            return Some(page);
        }

        self.layout
            .index_of(node_id)
            .and_then(|index| self.snapshot.nodes.get(index))
            .and_then(|node| node.source_ref.as_ref())
            .map(|source_ref| source_ref.page)
    }

    /// Entity-type legend from the snapshot metadata. Advisory only: the
    /// lists are whatever the backend reported, not derived from nodes.
    fn legend(&self, ui: &mut egui::Ui) {
        ui.label(RichText::new("Entity types").strong());
        for entity_type in &self.snapshot.metadata.entity_types {
            ui.horizontal(|ui| {
                ui.label(RichText::new("●").color(category_color(entity_type)));
                ui.label(entity_type);
            });
        }
        if !self.snapshot.metadata.relationship_types.is_empty() {
            ui.add_space(4.0);
            ui.weak(self.snapshot.metadata.relationship_types.join(" · "));
        }
    }
}
