//! Core library for the `cropdash` crop dashboard.
//!
//! This crate defines:
//! - Configuration handling
//! - Typed accessors for the dashboard backend, with their fallback policy
//! - The dashboard controller (location state, client cache, load sequencing)
//! - Chart descriptions and the renderer that redraws them
//!
//! It is used by `cropdash-cli`, but can also be driven by other front ends
//! through the [`DashboardView`], [`ChartBackend`] and [`DownloadSink`] traits.

pub mod api;
pub mod chart;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod model;

pub use api::{DashboardApi, api_from_config, download::DownloadSink};
pub use chart::{ChartBackend, ChartRenderer, DrawOutcome};
pub use config::Config;
pub use dashboard::{Dashboard, DashboardSettings, DashboardView, LoadOutcome, SearchOutcome};
pub use error::ApiError;
pub use model::Coordinate;
