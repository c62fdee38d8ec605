use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use eframe::egui::{self, Context};
use log::{info, warn};

use crate::backend::{BackendClient, FetchError, GraphSnapshot, SidebarModel};

mod interaction;
mod panels;
mod render_utils;
mod sim;
mod view;

use panels::PanelActions;
use sim::LayoutGraph;

pub const DEFAULT_SIMPLIFY_NODES: usize = 15;

#[derive(Clone, Copy, Debug)]
enum RequestKind {
    Generate,
    Simplify { max_nodes: usize },
}

enum BackendResponse {
    Graph {
        seq: u64,
        result: Result<GraphSnapshot, FetchError>,
    },
    Sidebar {
        seq: u64,
        result: Result<SidebarModel, FetchError>,
    },
}

/// Everything shown while a snapshot is on screen: the authoritative
/// snapshot, the simulation working copy, and view state. Replaced as a
/// unit when a newer snapshot arrives; zoom and the simplify cap carry
/// over, selection does not.
pub struct GraphView {
    snapshot: GraphSnapshot,
    layout: LayoutGraph,
    ticks_left: u32,
    needs_seed: bool,
    selected: Option<String>,
    zoom: f32,
    nav_filter: String,
    sidebar: Option<SidebarModel>,
    simplify_nodes: usize,
}

impl GraphView {
    fn new(snapshot: GraphSnapshot, zoom: f32, simplify_nodes: usize) -> Self {
        let layout = LayoutGraph::from_snapshot(&snapshot);
        Self {
            snapshot,
            layout,
            ticks_left: 0,
            needs_seed: true,
            selected: None,
            zoom,
            nav_filter: String::new(),
            sidebar: None,
            simplify_nodes,
        }
    }
}

enum SessionState {
    Loading,
    Failed(String),
    Ready(Box<GraphView>),
}

pub struct DocGraphApp {
    document_id: String,
    client: Arc<BackendClient>,
    tx: Sender<BackendResponse>,
    rx: Receiver<BackendResponse>,
    /// Sequence number of the most recent graph request. A response tagged
    /// with an older number is stale and discarded, so the later of two
    /// in-flight requests wins.
    latest_seq: u64,
    in_flight: bool,
    last_error: Option<String>,
    state: SessionState,
}

impl DocGraphApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, client: BackendClient, document_id: String) -> Self {
        let (tx, rx) = mpsc::channel();
        let mut app = Self {
            document_id,
            client: Arc::new(client),
            tx,
            rx,
            latest_seq: 0,
            in_flight: false,
            last_error: None,
            state: SessionState::Loading,
        };
        app.issue(RequestKind::Generate, None);
        app
    }

    /// Spawn a worker thread for a generate/simplify request. The render
    /// loop keeps drawing the last-known-good snapshot while the request
    /// is outstanding.
    fn issue(&mut self, kind: RequestKind, ctx: Option<&Context>) {
        self.latest_seq += 1;
        self.in_flight = true;
        self.last_error = None;

        let seq = self.latest_seq;
        let client = Arc::clone(&self.client);
        let document_id = self.document_id.clone();
        let tx = self.tx.clone();
        let ctx = ctx.cloned();
        thread::spawn(move || {
            let result = match kind {
                RequestKind::Generate => client.generate(&document_id),
                RequestKind::Simplify { max_nodes } => client.simplify(&document_id, max_nodes),
            };
            let fetched = result.is_ok();
            let _ = tx.send(BackendResponse::Graph { seq, result });

            if fetched {
                let sidebar = client.sidebar_data(&document_id);
                let _ = tx.send(BackendResponse::Sidebar { seq, result: sidebar });
            }
            if let Some(ctx) = ctx {
                ctx.request_repaint();
            }
        });
    }

    fn poll_responses(&mut self) {
        while let Ok(response) = self.rx.try_recv() {
            match response {
                BackendResponse::Graph { seq, result } => self.apply_graph_response(seq, result),
                BackendResponse::Sidebar { seq, result } => self.apply_sidebar_response(seq, result),
            }
        }
    }

    fn apply_graph_response(&mut self, seq: u64, result: Result<GraphSnapshot, FetchError>) {
        if seq < self.latest_seq {
            warn!("discarding stale graph response (seq {seq} < {})", self.latest_seq);
            return;
        }
        self.in_flight = false;

        match result {
            Ok(snapshot) => {
                info!(
                    "applying graph snapshot: {} nodes, {} edges",
                    snapshot.node_count(),
                    snapshot.edge_count()
                );
                let (zoom, simplify_nodes) = match &self.state {
                    SessionState::Ready(view) => (view.zoom, view.simplify_nodes),
                    _ => (1.0, DEFAULT_SIMPLIFY_NODES),
                };
                self.state =
                    SessionState::Ready(Box::new(GraphView::new(snapshot, zoom, simplify_nodes)));
            }
            Err(error) => {
                warn!("graph request failed: {error}");
                // The previously displayed snapshot stays intact; only the
                // very first load has nothing to fall back to.
                match &mut self.state {
                    SessionState::Ready(_) => self.last_error = Some(format!("Refresh failed: {error}")),
                    state => *state = SessionState::Failed(error.to_string()),
                }
            }
        }
    }

    fn apply_sidebar_response(&mut self, seq: u64, result: Result<SidebarModel, FetchError>) {
        if seq != self.latest_seq {
            return;
        }
        match (result, &mut self.state) {
            (Ok(sidebar), SessionState::Ready(view)) => view.sidebar = Some(sidebar),
            (Err(error), _) => warn!("sidebar fetch failed (ignored): {error}"),
            _ => {}
        }
    }
}

impl eframe::App for DocGraphApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.poll_responses();

        let mut retry = false;
        let mut actions = PanelActions::default();

        match &mut self.state {
            SessionState::Loading => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Generating knowledge graph...");
                        ui.add_space(8.0);
                        ui.label("Entity extraction can take 15-20 seconds.");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            SessionState::Failed(error) => {
                let message = error.clone();
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to generate knowledge graph");
                    ui.add_space(6.0);
                    ui.label(message);
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        retry = true;
                    }
                });
            }
            SessionState::Ready(view) => {
                view.show(
                    ctx,
                    &self.document_id,
                    self.in_flight,
                    self.last_error.as_deref(),
                    &mut actions,
                );
            }
        }

        if retry {
            self.state = SessionState::Loading;
            self.issue(RequestKind::Generate, Some(ctx));
        }
        if actions.regenerate {
            self.issue(RequestKind::Generate, Some(ctx));
        }
        if let Some(max_nodes) = actions.simplify {
            self.issue(RequestKind::Simplify { max_nodes }, Some(ctx));
        }
    }
}
