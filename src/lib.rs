pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{gemini::GeminiClient, http_images::HttpImageSource, storage::LocalStorage};
pub use app::Session;
pub use config::DashboardConfig;
pub use crate::core::{
    aggregator::OccupancyStats, assistant::Assistant, export::Exporter, roster::RosterStore,
};
pub use utils::error::{DashboardError, Result};
