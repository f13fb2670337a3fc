use std::{collections::BTreeMap, fmt};
use tracing::{debug, error};

use crate::model::{DailyForecast, SoilReport, WeatherReport};

pub mod config;

pub use config::ChartConfig;

/// The four chart slots on the dashboard, named after their canvas ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CanvasId {
    Rain,
    Temp,
    Ph,
    Soc,
}

impl CanvasId {
    pub fn element_id(&self) -> &'static str {
        match self {
            CanvasId::Rain => "rainChart",
            CanvasId::Temp => "tempChart",
            CanvasId::Ph => "phChart",
            CanvasId::Soc => "socChart",
        }
    }

    pub const fn all() -> &'static [CanvasId] {
        &[CanvasId::Rain, CanvasId::Temp, CanvasId::Ph, CanvasId::Soc]
    }
}

impl fmt::Display for CanvasId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.element_id())
    }
}

/// Opaque reference to a chart instance owned by a [`ChartBackend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChartHandle(pub u64);

/// A charting library the renderer draws through.
pub trait ChartBackend: Send {
    fn create(&mut self, canvas: CanvasId, config: &ChartConfig) -> anyhow::Result<ChartHandle>;

    fn destroy(&mut self, handle: ChartHandle);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawOutcome {
    Drawn,
    /// No charting backend is available.
    Unavailable,
    /// Input failed shape checks; existing charts were left untouched.
    Skipped,
}

pub const CHARTS_UNAVAILABLE: &str = "Charts unavailable (offline)";

/// Turns weather and soil payloads into the dashboard's four charts.
///
/// Every redraw destroys all live charts and creates them again.
pub struct ChartRenderer {
    backend: Option<Box<dyn ChartBackend>>,
    live: BTreeMap<CanvasId, ChartHandle>,
}

impl fmt::Debug for ChartRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChartRenderer")
            .field("available", &self.backend.is_some())
            .field("live", &self.live)
            .finish()
    }
}

impl ChartRenderer {
    pub fn new(backend: Box<dyn ChartBackend>) -> Self {
        Self { backend: Some(backend), live: BTreeMap::new() }
    }

    /// A renderer with no charting library behind it.
    pub fn unavailable() -> Self {
        Self { backend: None, live: BTreeMap::new() }
    }

    pub fn live_charts(&self) -> usize {
        self.live.len()
    }

    pub fn draw(&mut self, weather: &WeatherReport, soil: &SoilReport) -> DrawOutcome {
        let Some(backend) = self.backend.as_mut() else {
            return DrawOutcome::Unavailable;
        };
        if weather.daily.is_empty() {
            error!("invalid weather data for charts: no daily forecasts");
            return DrawOutcome::Skipped;
        }
        let Some(ph) = soil.ph else {
            error!("invalid soil data for charts: missing pH");
            return DrawOutcome::Skipped;
        };

        let labels = day_labels(&weather.daily);
        let configs = [
            (CanvasId::Rain, config::rainfall(labels.clone(), rain_series(&weather.daily))),
            (CanvasId::Temp, config::temperature(labels, temperature_series(&weather.daily))),
            (CanvasId::Ph, config::ph_gauge(ph)),
            (CanvasId::Soc, config::organic_carbon(soil.soc_pct.unwrap_or(0.0))),
        ];

        for (_, handle) in std::mem::take(&mut self.live) {
            backend.destroy(handle);
        }

        for (canvas, cfg) in configs {
            match backend.create(canvas, &cfg) {
                Ok(handle) => {
                    self.live.insert(canvas, handle);
                }
                Err(e) => error!(%canvas, error = %e, "failed to create chart"),
            }
        }
        debug!(charts = self.live.len(), "charts redrawn");

        DrawOutcome::Drawn
    }
}

pub fn day_labels(daily: &[DailyForecast]) -> Vec<String> {
    (1..=daily.len()).map(|i| format!("Day {i}")).collect()
}

pub fn rain_series(daily: &[DailyForecast]) -> Vec<f64> {
    daily.iter().map(|d| d.rain.as_ref().map_or(0.0, |r| r.millimetres())).collect()
}

pub fn temperature_series(daily: &[DailyForecast]) -> Vec<f64> {
    daily.iter().map(|d| d.temp.as_ref().map_or(0.0, |t| t.celsius())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{api::fallback, model::Coordinate};
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Default)]
    struct Calls {
        created: Vec<(CanvasId, ChartConfig)>,
        destroyed: Vec<ChartHandle>,
    }

    struct RecordingBackend {
        calls: Arc<Mutex<Calls>>,
        next: u64,
    }

    impl ChartBackend for RecordingBackend {
        fn create(&mut self, canvas: CanvasId, config: &ChartConfig) -> anyhow::Result<ChartHandle> {
            self.next += 1;
            self.calls.lock().unwrap().created.push((canvas, config.clone()));
            Ok(ChartHandle(self.next))
        }

        fn destroy(&mut self, handle: ChartHandle) {
            self.calls.lock().unwrap().destroyed.push(handle);
        }
    }

    fn renderer() -> (ChartRenderer, Arc<Mutex<Calls>>) {
        let calls = Arc::new(Mutex::new(Calls::default()));
        let backend = RecordingBackend { calls: Arc::clone(&calls), next: 0 };
        (ChartRenderer::new(Box::new(backend)), calls)
    }

    #[test]
    fn draws_four_charts_from_fallback_payloads() {
        let (mut charts, calls) = renderer();
        let at = Coordinate::default();

        assert_eq!(charts.draw(&fallback::weather(at), &fallback::soil(at)), DrawOutcome::Drawn);

        let calls = calls.lock().unwrap();
        let canvases: Vec<_> = calls.created.iter().map(|(c, _)| *c).collect();
        assert_eq!(canvases, CanvasId::all());
        assert!(calls.destroyed.is_empty());

        let rain = &calls.created[0].1.data;
        assert_eq!(rain.labels[0], "Day 1");
        assert_eq!(rain.datasets[0].data, [5.0, 12.0, 8.0, 2.0, 15.0, 0.0, 10.0]);
    }

    #[test]
    fn redraw_destroys_previous_instances() {
        let (mut charts, calls) = renderer();
        let at = Coordinate::default();

        charts.draw(&fallback::weather(at), &fallback::soil(at));
        charts.draw(&fallback::weather(at), &fallback::soil(at));

        let calls = calls.lock().unwrap();
        assert_eq!(calls.created.len(), 8);
        assert_eq!(calls.destroyed.len(), 4);
        assert_eq!(charts.live_charts(), 4);
    }

    #[test]
    fn empty_daily_leaves_charts_untouched() {
        let (mut charts, calls) = renderer();
        let at = Coordinate::default();
        charts.draw(&fallback::weather(at), &fallback::soil(at));

        let empty = WeatherReport { daily: vec![], ..fallback::weather(at) };
        assert_eq!(charts.draw(&empty, &fallback::soil(at)), DrawOutcome::Skipped);

        let calls = calls.lock().unwrap();
        assert_eq!(calls.created.len(), 4);
        assert!(calls.destroyed.is_empty());
    }

    #[test]
    fn missing_ph_is_skipped() {
        let (mut charts, calls) = renderer();
        let at = Coordinate::default();
        let soil = SoilReport { ph: None, ..fallback::soil(at) };

        assert_eq!(charts.draw(&fallback::weather(at), &soil), DrawOutcome::Skipped);
        assert!(calls.lock().unwrap().created.is_empty());
    }

    #[test]
    fn no_backend_reports_unavailable() {
        let mut charts = ChartRenderer::unavailable();
        let at = Coordinate::default();
        assert_eq!(charts.draw(&fallback::weather(at), &fallback::soil(at)), DrawOutcome::Unavailable);
    }

    #[test]
    fn series_normalise_mixed_shapes() {
        let daily: Vec<DailyForecast> = serde_json::from_value(json!([
            {"temp": 20.5, "rain": 3.0},
            {"temp": {"day": 22.0}, "rain": {"1h": 1.5}},
            {"temp": {"min": 12.0}, "rain": {"3h": 9.0}},
            {}
        ]))
        .unwrap();

        assert_eq!(rain_series(&daily), [3.0, 1.5, 0.0, 0.0]);
        assert_eq!(temperature_series(&daily), [20.5, 22.0, 12.0, 0.0]);
        assert_eq!(day_labels(&daily), ["Day 1", "Day 2", "Day 3", "Day 4"]);
    }
}
