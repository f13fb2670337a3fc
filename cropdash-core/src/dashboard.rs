//! Dashboard controller: location state, load sequencing and the client cache.

use std::{
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument};

use crate::{
    ApiError, Config,
    api::DashboardApi,
    chart::{CHARTS_UNAVAILABLE, ChartRenderer, DrawOutcome},
    model::{Coordinate, SoilReport, WeatherReport},
};

pub mod cache;
pub mod debounce;
pub mod ready;
pub mod view;

pub use cache::ClientCache;
pub use debounce::Debouncer;
pub use ready::{ApiProvider, ApiReady, api_ready_channel};
pub use view::{DashboardView, MetricTile, MetricsPanel};

pub const STATUS_LOADING: &str = "Loading…";
pub const STATUS_NOT_INITIALIZED: &str = "App not initialized";
pub const STATUS_NO_RESULTS: &str = "No results found";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DashboardSettings {
    pub debounce: Duration,
    pub ready_timeout: Duration,
    pub start: Coordinate,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for DashboardSettings {
    fn from(config: &Config) -> Self {
        Self {
            debounce: config.debounce(),
            ready_timeout: config.ready_timeout(),
            start: config.start_location(),
        }
    }
}

/// How a load ended.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Rendered { charts: DrawOutcome },
    /// The error message shown to the user.
    Failed(String),
    /// A newer load or search started before this one resolved; the view was
    /// left alone.
    Superseded,
    Disabled,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Loaded(LoadOutcome),
    NoResults,
    EmptyQuery,
    Superseded,
    Disabled,
}

pub struct Dashboard {
    api: Option<Arc<dyn DashboardApi>>,
    view: Arc<dyn DashboardView>,
    charts: Mutex<ChartRenderer>,
    location: Mutex<Coordinate>,
    cache: Mutex<ClientCache>,
    generation: AtomicU64,
    debouncer: Debouncer,
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("enabled", &self.api.is_some())
            .field("location", &self.location())
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Dashboard {
    /// Wait for the API, then show the start location and run the first load.
    ///
    /// If the API never arrives the dashboard stays disabled: every search or
    /// load only reports [`STATUS_NOT_INITIALIZED`].
    pub async fn init(
        ready: ApiReady,
        view: Arc<dyn DashboardView>,
        charts: ChartRenderer,
        settings: DashboardSettings,
    ) -> Arc<Self> {
        Self::start(ready, view, charts, settings).await.0
    }

    /// [`Dashboard::init`], also returning how the first load ended.
    pub async fn start(
        ready: ApiReady,
        view: Arc<dyn DashboardView>,
        charts: ChartRenderer,
        settings: DashboardSettings,
    ) -> (Arc<Self>, LoadOutcome) {
        let api = ready.wait(settings.ready_timeout).await;
        let dashboard = Arc::new(Self {
            api,
            view,
            charts: Mutex::new(charts),
            location: Mutex::new(settings.start),
            cache: Mutex::new(ClientCache::new()),
            generation: AtomicU64::new(0),
            debouncer: Debouncer::new(settings.debounce),
        });

        if dashboard.api.is_none() {
            error!("dashboard API not available");
            dashboard.view.set_status(STATUS_NOT_INITIALIZED);
            return (dashboard, LoadOutcome::Disabled);
        }

        dashboard.view.set_coord(&settings.start.to_string());
        let outcome = dashboard.load_all().await;
        (dashboard, outcome)
    }

    pub fn is_enabled(&self) -> bool {
        self.api.is_some()
    }

    pub fn location(&self) -> Coordinate {
        *lock(&self.location)
    }

    /// Number of cached weather and soil payloads.
    pub fn cached_entries(&self) -> usize {
        lock(&self.cache).len()
    }

    /// Input-box handler: searches for `text` once typing pauses.
    pub fn on_input(self: &Arc<Self>, text: impl Into<String>) -> JoinHandle<bool> {
        let this = Arc::clone(self);
        let text = text.into();
        self.debouncer.schedule(async move {
            this.search(&text).await;
        })
    }

    /// Search-button handler: searches immediately, dropping any pending input.
    pub async fn search_now(&self, query: &str) -> SearchOutcome {
        self.debouncer.cancel();
        self.search(query).await
    }

    /// Move to `at` and reload.
    pub async fn go_to(&self, at: Coordinate) -> LoadOutcome {
        let generation = self.next_generation();
        self.move_to(at);
        self.load(generation).await
    }

    /// Reload data for the current location.
    pub async fn load_all(&self) -> LoadOutcome {
        let generation = self.next_generation();
        self.load(generation).await
    }

    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> SearchOutcome {
        let Some(api) = &self.api else {
            self.view.set_status(STATUS_NOT_INITIALIZED);
            return SearchOutcome::Disabled;
        };
        let query = query.trim();
        if query.is_empty() {
            return SearchOutcome::EmptyQuery;
        }

        let generation = self.next_generation();
        let found = api.geocode(query).await;
        if !self.is_current(generation) {
            debug!(generation, "discarding stale geocode result");
            return SearchOutcome::Superseded;
        }

        let Some(first) = found.results.first() else {
            self.view.set_status(STATUS_NO_RESULTS);
            return SearchOutcome::NoResults;
        };
        info!(name = ?first.name, lat = first.lat, lon = first.lon, "location selected");

        self.move_to(first.coordinate());
        SearchOutcome::Loaded(self.load(generation).await)
    }

    fn move_to(&self, at: Coordinate) {
        *lock(&self.location) = at;
        self.view.set_coord(&at.to_string());
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    async fn load(&self, generation: u64) -> LoadOutcome {
        let Some(api) = &self.api else {
            error!("dashboard API functions not available");
            self.view.set_status(STATUS_NOT_INITIALIZED);
            return LoadOutcome::Disabled;
        };

        self.view.set_status(STATUS_LOADING);
        let at = self.location();
        let fetched = self.fetch(api.as_ref(), at).await;

        if !self.is_current(generation) {
            debug!(generation, "discarding stale dashboard load");
            return LoadOutcome::Superseded;
        }

        match fetched {
            Ok((weather, soil)) => {
                self.view.set_weather_panel(MetricsPanel::weather(&weather));
                self.view.set_soil_panel(MetricsPanel::soil(&soil));
                self.view.set_status("");

                let charts = lock(&self.charts).draw(&weather, &soil);
                if charts == DrawOutcome::Unavailable {
                    self.view.set_status(CHARTS_UNAVAILABLE);
                }
                LoadOutcome::Rendered { charts }
            }
            Err(e) => {
                error!(error = %e, "error loading data");
                let message = e.to_string();
                self.view.set_status(&format!("Error loading data: {message}"));
                self.view
                    .set_weather_panel(MetricsPanel::Error(format!("Error loading weather data: {message}")));
                self.view
                    .set_soil_panel(MetricsPanel::Error(format!("Error loading soil data: {message}")));
                LoadOutcome::Failed(message)
            }
        }
    }

    /// Cached-or-fetched weather and soil; only valid payloads are cached.
    async fn fetch(
        &self,
        api: &dyn DashboardApi,
        at: Coordinate,
    ) -> Result<(WeatherReport, SoilReport), ApiError> {
        let cached = lock(&self.cache).weather(at);
        let weather = match cached {
            Some(w) => {
                debug!(key = %cache::location_key(at), "weather cache hit");
                w
            }
            None => {
                let w = api.weather(at).await?;
                lock(&self.cache).store_weather(at, w.clone())?;
                w
            }
        };

        let cached = lock(&self.cache).soil(at);
        let soil = match cached {
            Some(s) => {
                debug!(key = %cache::location_key(at), "soil cache hit");
                s
            }
            None => {
                let s = api.soil(at).await?;
                lock(&self.cache).store_soil(at, s.clone())?;
                s
            }
        };

        Ok((weather, soil))
    }
}
