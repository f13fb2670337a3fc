use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use std::{path::PathBuf, sync::Arc};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use cropdash_core::{
    ChartRenderer, Config, Coordinate, Dashboard, DashboardApi, DashboardSettings, LoadOutcome,
    api::{EXPORT_FILENAME, download::FsDownloads},
    api_from_config,
    dashboard::ApiReady,
};

use crate::{
    configure,
    terminal::{TerminalCharts, TerminalView},
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "cropdash", version, about = "Crop weather and soil dashboard")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct LocationArgs {
    /// Latitude in decimal degrees; defaults to the configured location.
    #[arg(long, allow_hyphen_values = true, requires = "lon")]
    lat: Option<f64>,

    /// Longitude in decimal degrees.
    #[arg(long, allow_hyphen_values = true, requires = "lat")]
    lon: Option<f64>,
}

impl LocationArgs {
    fn resolve(&self, config: &Config) -> Result<Coordinate> {
        let at = match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Coordinate::new(lat, lon),
            (None, None) => config.start_location(),
            _ => return Err(anyhow!("--lat and --lon must be given together")),
        };
        at.validate()?;
        Ok(at)
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Edit backend URL, timings and default location.
    Configure,

    /// Interactive dashboard; type a place name to search.
    Dashboard {
        #[command(flatten)]
        location: LocationArgs,

        /// Render metrics only.
        #[arg(long)]
        no_charts: bool,
    },

    /// Show the dashboard once for a place name.
    Show {
        /// Place name to geocode.
        query: String,

        #[arg(long)]
        no_charts: bool,
    },

    /// Crop recommendations for a location.
    Recommend {
        #[command(flatten)]
        location: LocationArgs,
    },

    /// Monthly planting calendar for a location.
    Calendar {
        #[command(flatten)]
        location: LocationArgs,
    },

    /// List known crops.
    Crops,

    /// Export recommendations for a location as CSV.
    Export {
        #[command(flatten)]
        location: LocationArgs,

        /// Comma-separated columns, in output order.
        #[arg(long, value_delimiter = ',', default_value = "name,score")]
        fields: Vec<String>,

        /// Target directory; defaults to the configured download directory.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

/// A line typed into the interactive dashboard.
#[derive(Debug, PartialEq)]
enum Input {
    Text(String),
    Go(String),
    Reload,
    Quit,
}

fn parse_input(line: &str) -> Input {
    let trimmed = line.trim();
    match trimmed {
        ":q" | ":quit" => Input::Quit,
        ":r" | ":reload" => Input::Reload,
        _ => match trimmed.strip_prefix(":go") {
            Some(query) if query.is_empty() || query.starts_with(char::is_whitespace) => {
                Input::Go(query.trim().to_string())
            }
            _ => Input::Text(line.to_string()),
        },
    }
}

/// Feed typed lines to the dashboard until `:quit` or end of input, then let
/// the last debounced search finish.
async fn drive_input<R>(dashboard: &Arc<Dashboard>, input: R) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut pending = None;
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        match parse_input(&line) {
            Input::Quit => break,
            Input::Reload => {
                dashboard.load_all().await;
            }
            Input::Go(query) => {
                dashboard.search_now(&query).await;
            }
            Input::Text(text) => pending = Some(dashboard.on_input(text)),
        }
    }

    if let Some(search) = pending {
        search.await.context("Search task failed")?;
    }
    Ok(())
}

fn ensure_loaded(outcome: LoadOutcome) -> Result<()> {
    match outcome {
        LoadOutcome::Failed(message) => Err(anyhow!("Failed to load dashboard: {message}")),
        LoadOutcome::Disabled => Err(anyhow!("Dashboard API is not available")),
        LoadOutcome::Rendered { .. } | LoadOutcome::Superseded => Ok(()),
    }
}

fn charts(no_charts: bool) -> ChartRenderer {
    if no_charts {
        ChartRenderer::unavailable()
    } else {
        ChartRenderer::new(Box::new(TerminalCharts::default()))
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to format response")?;
    println!("{text}");
    Ok(())
}

/// Loaded config plus the API built from it.
struct Backend {
    config: Config,
    api: Arc<dyn DashboardApi>,
}

impl Backend {
    fn connect() -> Result<Self> {
        let config = Config::load()?;
        let api = api_from_config(&config)?;
        Ok(Self { config, api })
    }
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure::run()?,
            Command::Dashboard { location, no_charts } => {
                let Backend { config, api } = Backend::connect()?;
                let settings = DashboardSettings {
                    start: location.resolve(&config)?,
                    ..DashboardSettings::from(&config)
                };
                let dashboard = Dashboard::init(
                    ApiReady::immediate(api),
                    Arc::new(TerminalView::default()),
                    charts(no_charts),
                    settings,
                )
                .await;
                if !dashboard.is_enabled() {
                    return Err(anyhow!("Dashboard API is not available"));
                }

                println!("Type a place to search, ':go <place>' to search now, ':reload', ':quit'.");
                drive_input(&dashboard, BufReader::new(tokio::io::stdin())).await?;
            }
            Command::Show { query, no_charts } => {
                let Backend { config, api } = Backend::connect()?;
                let found = api.geocode(&query).await;
                let first = found
                    .results
                    .first()
                    .ok_or_else(|| anyhow!("No results found for '{query}'"))?;
                let settings =
                    DashboardSettings { start: first.coordinate(), ..DashboardSettings::from(&config) };

                if let Some(name) = &first.name {
                    println!("{name}");
                }
                let (_, outcome) = Dashboard::start(
                    ApiReady::immediate(api),
                    Arc::new(TerminalView::default()),
                    charts(no_charts),
                    settings,
                )
                .await;
                ensure_loaded(outcome)?;
            }
            Command::Recommend { location } => {
                let Backend { config, api } = Backend::connect()?;
                let res = api.recommend(location.resolve(&config)?).await?;
                print_json(&res)?;
            }
            Command::Calendar { location } => {
                let Backend { config, api } = Backend::connect()?;
                let res = api.calendar(location.resolve(&config)?).await?;
                print_json(&res)?;
            }
            Command::Crops => {
                let Backend { api, .. } = Backend::connect()?;
                let res = api.crops().await?;
                for crop in &res.crops {
                    println!("{}", crop.name);
                }
            }
            Command::Export { location, fields, out } => {
                let Backend { config, api } = Backend::connect()?;
                let at = location.resolve(&config)?;
                let recs = api.recommend(at).await?;
                let records: Vec<_> = recs.recommendations.iter().map(|r| r.to_record()).collect();

                let sink = FsDownloads::new(out.unwrap_or_else(|| config.download_dir()));
                api.export_csv(&records, &fields, &sink).await?;
                println!("Saved {}", sink.dir().join(EXPORT_FILENAME).display());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cropdash_core::{DrawOutcome, api::backend::BackendApi};
    use std::time::Duration;

    async fn offline_dashboard(start: Coordinate) -> Arc<Dashboard> {
        let api = BackendApi::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let settings = DashboardSettings {
            debounce: Duration::from_millis(20),
            start,
            ..DashboardSettings::default()
        };
        Dashboard::init(
            ApiReady::immediate(Arc::new(api)),
            Arc::new(TerminalView::default()),
            ChartRenderer::unavailable(),
            settings,
        )
        .await
    }

    #[tokio::test]
    async fn typed_search_completes_when_input_ends() {
        let dashboard = offline_dashboard(Coordinate::new(10.0, 10.0)).await;

        drive_input(&dashboard, &b"Pu\nPune\n"[..]).await.unwrap();

        // Offline geocoding answers with the sample location.
        assert_eq!(dashboard.location(), Coordinate::default());
    }

    #[tokio::test]
    async fn quit_stops_reading_input() {
        let dashboard = offline_dashboard(Coordinate::new(10.0, 10.0)).await;

        drive_input(&dashboard, &b":q\nPune\n"[..]).await.unwrap();

        assert_eq!(dashboard.location(), Coordinate::new(10.0, 10.0));
    }

    #[test]
    fn failed_load_is_an_error() {
        let err = ensure_loaded(LoadOutcome::Failed("boom".into())).unwrap_err();
        assert_eq!(err.to_string(), "Failed to load dashboard: boom");
        assert!(ensure_loaded(LoadOutcome::Disabled).is_err());
        assert!(ensure_loaded(LoadOutcome::Rendered { charts: DrawOutcome::Drawn }).is_ok());
    }

    #[test]
    fn input_commands_are_recognised() {
        assert_eq!(parse_input(":quit"), Input::Quit);
        assert_eq!(parse_input(" :r "), Input::Reload);
        assert_eq!(parse_input(":go  Pune "), Input::Go("Pune".into()));
        assert_eq!(parse_input("Nagpur"), Input::Text("Nagpur".into()));
        assert_eq!(parse_input(":gondia"), Input::Text(":gondia".into()));
    }

    #[test]
    fn location_args_fall_back_to_config() {
        let args = LocationArgs { lat: None, lon: None };
        assert_eq!(args.resolve(&Config::default()).unwrap(), Coordinate::default());
    }

    #[test]
    fn location_args_are_range_checked() {
        let args = LocationArgs { lat: Some(123.0), lon: Some(0.0) };
        assert!(args.resolve(&Config::default()).is_err());
    }

    #[test]
    fn export_fields_split_on_commas() {
        let cli = Cli::parse_from(["cropdash", "export", "--fields", "name,score,season"]);
        let Command::Export { fields, .. } = cli.command else { panic!("expected export") };
        assert_eq!(fields, ["name", "score", "season"]);
    }

    #[test]
    fn negative_coordinates_parse() {
        let cli = Cli::parse_from(["cropdash", "recommend", "--lat", "-1.29", "--lon", "36.82"]);
        let Command::Recommend { location } = cli.command else { panic!("expected recommend") };
        assert_eq!(location.resolve(&Config::default()).unwrap(), Coordinate::new(-1.29, 36.82));
    }
}
