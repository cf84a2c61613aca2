mod component;
mod config;
mod document;
mod error;
mod interaction;
mod loader;
mod regions;
mod render;
mod scene;
mod simulation;
mod state;
mod types;

#[cfg(test)]
mod fixtures;

pub use component::ForceGraphCanvas;
pub use config::LayoutConfig;
pub use loader::{fetch_graph, fetch_layout};
