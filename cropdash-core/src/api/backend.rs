use anyhow::Result;
use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::{error, instrument, warn};

use crate::{
    ApiError,
    api::{DashboardApi, EXPORT_FILENAME, download::DownloadSink, fallback, http::HttpClient},
    model::{
        CalendarResponse, Coordinate, CropList, GeocodeResponse, RecommendResponse, Record,
        SoilReport, WeatherReport,
    },
};

/// [`DashboardApi`] backed by the dashboard's HTTP endpoints.
#[derive(Debug, Clone)]
pub struct BackendApi {
    http: HttpClient,
}

#[derive(Debug, Serialize)]
struct LocationBody {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Serialize)]
struct ExportBody<'a> {
    recs: &'a [Record],
    fields: &'a [String],
}

impl BackendApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self { http: HttpClient::new(base_url, timeout)? })
    }

    fn location_query(at: Coordinate) -> [(&'static str, String); 2] {
        [("lat", at.lat.to_string()), ("lon", at.lon.to_string())]
    }

    /// Fetch a location payload, turning a body-level `error` field into an API error.
    async fn fetch_checked<T: DeserializeOwned>(
        &self,
        path: &str,
        at: Coordinate,
        what: &'static str,
    ) -> Result<T, ApiError> {
        let body: serde_json::Value =
            self.http.get_json(path, &Self::location_query(at), what).await?;

        if body.get("error").is_some_and(|e| !e.is_null()) {
            return Err(ApiError::Api { status: 200, body });
        }

        serde_json::from_value(body).map_err(|source| ApiError::unreadable(what, source))
    }
}

#[async_trait]
impl DashboardApi for BackendApi {
    #[instrument(skip(self))]
    async fn geocode(&self, query: &str) -> GeocodeResponse {
        let query = [("query", query.to_string())];
        match self.http.get_json("/api/geocode", &query, "geocode").await {
            Ok(res) => res,
            Err(e) => {
                warn!(error = %e, "geocoding failed, using sample location");
                fallback::geocode()
            }
        }
    }

    #[instrument(skip(self))]
    async fn weather(&self, at: Coordinate) -> Result<WeatherReport, ApiError> {
        match self.fetch_checked("/api/weather", at, "weather").await {
            Ok(report) => Ok(report),
            Err(e) if e.is_offline() => {
                warn!(error = %e, "weather backend unreachable, using fallback data");
                Ok(fallback::weather(at))
            }
            Err(e) => {
                error!(error = %e, "weather API error");
                Err(e)
            }
        }
    }

    #[instrument(skip(self))]
    async fn soil(&self, at: Coordinate) -> Result<SoilReport, ApiError> {
        match self.fetch_checked("/api/soil", at, "soil").await {
            Ok(report) => Ok(report),
            Err(e) if e.is_offline() => {
                warn!(error = %e, "soil backend unreachable, using fallback data");
                Ok(fallback::soil(at))
            }
            Err(e) => {
                error!(error = %e, "soil API error");
                Err(e)
            }
        }
    }

    #[instrument(skip(self))]
    async fn recommend(&self, at: Coordinate) -> Result<RecommendResponse, ApiError> {
        let body = LocationBody { lat: at.lat, lon: at.lon };
        self.http.post_json("/api/recommend", &body, "recommend").await
    }

    #[instrument(skip(self))]
    async fn calendar(&self, at: Coordinate) -> Result<CalendarResponse, ApiError> {
        self.http.get_json("/api/calendar", &Self::location_query(at), "calendar").await
    }

    #[instrument(skip(self))]
    async fn crops(&self) -> Result<CropList, ApiError> {
        self.http.get_json("/api/crops", &[], "crops").await
    }

    #[instrument(skip(self, records, sink), fields(records = records.len()))]
    async fn export_csv(
        &self,
        records: &[Record],
        fields: &[String],
        sink: &dyn DownloadSink,
    ) -> Result<(), ApiError> {
        let body = ExportBody { recs: records, fields };
        let csv = self.http.post_for_bytes("/api/export/csv", &body).await?;

        let url = sink.create_object_url(csv);
        let triggered = sink.trigger_download(&url, EXPORT_FILENAME);
        sink.revoke_object_url(url);

        triggered.map_err(ApiError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_query_keeps_full_precision() {
        let q = BackendApi::location_query(Coordinate::new(28.61390001, -77.2));
        assert_eq!(q[0], ("lat", "28.61390001".to_string()));
        assert_eq!(q[1], ("lon", "-77.2".to_string()));
    }

    #[tokio::test]
    async fn unreachable_backend_falls_back_for_weather_and_soil() {
        // Port 9 (discard) on localhost is closed in test environments.
        let api = BackendApi::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let at = Coordinate::new(12.0, 34.0);

        let w = api.weather(at).await.unwrap();
        assert_eq!(w, fallback::weather(at));

        let s = api.soil(at).await.unwrap();
        assert_eq!(s, fallback::soil(at));

        let g = api.geocode("anywhere").await;
        assert_eq!(g, fallback::geocode());
    }

    #[tokio::test]
    async fn unreachable_backend_propagates_for_pass_through_calls() {
        let api = BackendApi::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();

        let err = api.crops().await.unwrap_err();
        assert!(err.is_offline());
        assert_eq!(err.status(), None);
    }
}
