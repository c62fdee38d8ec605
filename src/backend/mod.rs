mod client;
mod schema;

pub use client::{BackendClient, FetchError};
pub use schema::{GraphEdge, GraphNode, GraphSnapshot, SidebarModel};
