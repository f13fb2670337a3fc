use crate::model::{SoilReport, WeatherReport};

/// One labelled value on a metrics panel.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricTile {
    pub value: String,
    pub label: &'static str,
}

impl MetricTile {
    fn new(value: String, label: &'static str) -> Self {
        Self { value, label }
    }
}

/// Contents of the weather or soil metrics area.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricsPanel {
    Tiles(Vec<MetricTile>),
    /// The payload lacked the section this panel shows.
    Unavailable(String),
    /// Loading failed; shown inline in place of the tiles.
    Error(String),
}

impl MetricsPanel {
    pub fn weather(report: &WeatherReport) -> Self {
        let Some(current) = &report.current else {
            return MetricsPanel::Unavailable("No weather data available".to_string());
        };

        MetricsPanel::Tiles(vec![
            MetricTile::new(format!("{:.1}", current.temp.unwrap_or(0.0)), "Temperature (°C)"),
            MetricTile::new(format_number(current.humidity.unwrap_or(0.0)), "Humidity (%)"),
            MetricTile::new(format!("{:.1}", current.wind_speed.unwrap_or(0.0)), "Wind (m/s)"),
        ])
    }

    pub fn soil(report: &SoilReport) -> Self {
        let Some(ph) = report.ph else {
            return MetricsPanel::Unavailable("No soil data available".to_string());
        };

        MetricsPanel::Tiles(vec![
            MetricTile::new(format!("{ph:.2}"), "pH Level"),
            MetricTile::new(format!("{:.2}", report.soc_pct.unwrap_or(0.0)), "Organic Carbon (%)"),
            MetricTile::new(
                report.texture.clone().filter(|t| !t.is_empty()).unwrap_or_else(|| "N/A".into()),
                "Texture",
            ),
        ])
    }
}

/// Shortest decimal rendering: `60.0` prints as `60`.
fn format_number(value: f64) -> String {
    format!("{value}")
}

/// Output surface the dashboard controller drives.
///
/// Implementations use interior mutability; the controller calls these from
/// whichever task finishes a load.
pub trait DashboardView: Send + Sync {
    fn set_coord(&self, text: &str);

    fn set_status(&self, text: &str);

    fn set_weather_panel(&self, panel: MetricsPanel);

    fn set_soil_panel(&self, panel: MetricsPanel);
}
