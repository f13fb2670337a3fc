use crate::{
    ApiError, Config,
    api::{backend::BackendApi, download::DownloadSink},
    model::{
        CalendarResponse, Coordinate, CropList, GeocodeResponse, RecommendResponse, Record,
        SoilReport, WeatherReport,
    },
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod backend;
pub mod download;
pub mod fallback;
pub mod http;

/// Name under which exported recommendations are saved.
pub const EXPORT_FILENAME: &str = "crop_recommendations.csv";

/// Typed accessors for the dashboard backend.
///
/// Fallback policy differs per accessor: `geocode` never fails, `weather` and
/// `soil` substitute fallback data only when the backend is unreachable, and
/// the remaining calls pass every error through.
#[async_trait]
pub trait DashboardApi: Send + Sync + Debug {
    async fn geocode(&self, query: &str) -> GeocodeResponse;

    async fn weather(&self, at: Coordinate) -> Result<WeatherReport, ApiError>;

    async fn soil(&self, at: Coordinate) -> Result<SoilReport, ApiError>;

    async fn recommend(&self, at: Coordinate) -> Result<RecommendResponse, ApiError>;

    async fn calendar(&self, at: Coordinate) -> Result<CalendarResponse, ApiError>;

    async fn crops(&self) -> Result<CropList, ApiError>;

    /// Export `records` as CSV with the given column order and hand the file
    /// to `sink` as a single download.
    async fn export_csv(
        &self,
        records: &[Record],
        fields: &[String],
        sink: &dyn DownloadSink,
    ) -> Result<(), ApiError>;
}

/// Construct the HTTP-backed API from config.
pub fn api_from_config(config: &Config) -> anyhow::Result<Arc<dyn DashboardApi>> {
    let api = BackendApi::new(&config.base_url, config.timeout())?;
    Ok(Arc::new(api))
}
