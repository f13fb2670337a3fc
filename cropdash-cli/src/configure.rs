use anyhow::{Context, Result};
use inquire::{Confirm, CustomType, Text};

use cropdash_core::{Config, Coordinate};

/// Interactively edit and save the config file.
pub fn run() -> Result<()> {
    let mut cfg = Config::load()?;

    let current_url = cfg.base_url.clone();
    cfg.base_url = Text::new("Backend URL:")
        .with_default(&current_url)
        .with_help_message("Origin serving /api/weather, /api/soil, ...")
        .prompt()
        .context("Failed to read backend URL")?;

    cfg.timeout_secs = CustomType::<u64>::new("Request timeout (seconds):")
        .with_default(cfg.timeout_secs)
        .prompt()
        .context("Failed to read request timeout")?;

    cfg.debounce_ms = CustomType::<u64>::new("Search debounce (ms):")
        .with_default(cfg.debounce_ms)
        .prompt()
        .context("Failed to read debounce")?;

    let set_location = Confirm::new("Set a default location?")
        .with_default(cfg.default_location.is_some())
        .prompt()
        .context("Failed to read answer")?;

    cfg.default_location = if set_location {
        let current = cfg.start_location();
        let lat = CustomType::<f64>::new("Latitude:")
            .with_default(current.lat)
            .prompt()
            .context("Failed to read latitude")?;
        let lon = CustomType::<f64>::new("Longitude:")
            .with_default(current.lon)
            .prompt()
            .context("Failed to read longitude")?;
        Some(Coordinate::new(lat, lon))
    } else {
        None
    };

    cfg.validate()?;
    cfg.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}
