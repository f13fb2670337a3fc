//! Terminal renderings of the dashboard view and charts.

use std::sync::Mutex;

use cropdash_core::{
    ChartBackend,
    chart::{
        CanvasId, ChartConfig, ChartHandle,
        config::{ChartKind, PH_SCALE_MAX},
    },
    dashboard::{DashboardView, MetricsPanel},
};

const BAR_WIDTH: usize = 30;

/// Prints dashboard updates to stdout as they happen.
#[derive(Debug, Default)]
pub struct TerminalView {
    last_status: Mutex<String>,
}

fn print_panel(title: &str, panel: &MetricsPanel) {
    println!("── {title} ──");
    match panel {
        MetricsPanel::Tiles(tiles) => {
            for tile in tiles {
                println!("  {:<20} {}", tile.label, tile.value);
            }
        }
        MetricsPanel::Unavailable(msg) | MetricsPanel::Error(msg) => println!("  {msg}"),
    }
}

impl DashboardView for TerminalView {
    fn set_coord(&self, text: &str) {
        println!("Location: {text}");
    }

    fn set_status(&self, text: &str) {
        let mut last = self.last_status.lock().unwrap_or_else(|e| e.into_inner());
        if *last == text {
            return;
        }
        *last = text.to_string();
        if !text.is_empty() {
            println!("[{text}]");
        }
    }

    fn set_weather_panel(&self, panel: MetricsPanel) {
        print_panel("Weather", &panel);
    }

    fn set_soil_panel(&self, panel: MetricsPanel) {
        print_panel("Soil", &panel);
    }
}

/// Draws charts as rows of block characters.
#[derive(Debug, Default)]
pub struct TerminalCharts {
    next: u64,
}

fn bar(value: f64, max: f64) -> String {
    if max <= 0.0 || !value.is_finite() {
        return String::new();
    }
    let filled = ((value.max(0.0) / max) * BAR_WIDTH as f64).round() as usize;
    "█".repeat(filled.min(BAR_WIDTH))
}

fn render(canvas: CanvasId, config: &ChartConfig) -> Vec<String> {
    let Some(dataset) = config.data.datasets.first() else {
        return Vec::new();
    };
    let title = dataset.label.clone().unwrap_or_else(|| canvas.to_string());

    let mut lines = vec![format!("── {title} ──")];
    match config.kind {
        ChartKind::Line => {
            let max = dataset.data.iter().copied().fold(0.0_f64, f64::max);
            for (label, value) in config.data.labels.iter().zip(&dataset.data) {
                lines.push(format!("  {label:<7}{:<width$} {value:.1}", bar(*value, max), width = BAR_WIDTH));
            }
        }
        ChartKind::Doughnut => {
            let value = dataset.data.first().copied().unwrap_or(0.0);
            let caption = config
                .options
                .plugins
                .tooltip
                .as_ref()
                .and_then(|t| t.labels.first().cloned())
                .unwrap_or_else(|| format!("{value:.2}"));
            lines.push(format!("  {:<width$} {caption}", bar(value, PH_SCALE_MAX), width = BAR_WIDTH));
        }
        ChartKind::Bar => {
            let max = config
                .options
                .scales
                .as_ref()
                .and_then(|s| s.x.max)
                .unwrap_or_else(|| dataset.data.iter().copied().fold(0.0_f64, f64::max));
            for (label, value) in config.data.labels.iter().zip(&dataset.data) {
                lines.push(format!("  {label}: {} {value:.2}", bar(*value, max)));
            }
        }
    }
    lines
}

impl ChartBackend for TerminalCharts {
    fn create(&mut self, canvas: CanvasId, config: &ChartConfig) -> anyhow::Result<ChartHandle> {
        for line in render(canvas, config) {
            println!("{line}");
        }
        self.next += 1;
        Ok(ChartHandle(self.next))
    }

    fn destroy(&mut self, handle: ChartHandle) {
        tracing::trace!(?handle, "chart released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cropdash_core::chart::config;

    #[test]
    fn bar_scales_to_width() {
        assert_eq!(bar(10.0, 10.0).chars().count(), BAR_WIDTH);
        assert_eq!(bar(5.0, 10.0).chars().count(), BAR_WIDTH / 2);
        assert_eq!(bar(0.0, 10.0), "");
        assert_eq!(bar(3.0, 0.0), "");
        assert_eq!(bar(-2.0, 10.0), "");
    }

    #[test]
    fn line_chart_renders_one_row_per_day() {
        let cfg = config::rainfall(vec!["Day 1".into(), "Day 2".into()], vec![5.0, 10.0]);
        let lines = render(CanvasId::Rain, &cfg);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "── Rainfall (mm) ──");
        assert!(lines[2].ends_with("10.0"));
    }

    #[test]
    fn ph_gauge_uses_tooltip_caption() {
        let lines = render(CanvasId::Ph, &config::ph_gauge(6.4));
        assert_eq!(lines[0], "── phChart ──");
        assert!(lines[1].ends_with("pH: 6.40"));
    }

    #[test]
    fn handles_increase() {
        let mut charts = TerminalCharts::default();
        let cfg = config::organic_carbon(1.2);
        let a = charts.create(CanvasId::Soc, &cfg).unwrap();
        let b = charts.create(CanvasId::Soc, &cfg).unwrap();
        assert_ne!(a, b);
    }
}
