//! Chart.js-shaped chart descriptions.
//!
//! Serialising a [`ChartConfig`] yields JSON a Chart.js front end accepts as-is;
//! terminal backends read the same structure directly.

use serde::Serialize;

pub const PRIMARY_COLOR: &str = "#3b82f6";
pub const SECONDARY_COLOR: &str = "#10b981";
pub const ACCENT_COLOR: &str = "#f59e0b";
pub const GRID_COLOR: &str = "#f1f5f9";

/// Upper end of the pH doughnut; the remainder segment is `PH_SCALE_MAX - ph`.
pub const PH_SCALE_MAX: f64 = 7.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Doughnut,
    Bar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
}

/// A single colour or one colour per data point.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Paint {
    Single(String),
    PerPoint(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub data: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Paint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tension: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_radius: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_hover_radius: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_width: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub display: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
}

/// Pre-rendered tooltip text, one entry per data index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tooltip {
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plugins {
    pub legend: Legend,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<Tooltip>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Grid {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scale {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub begin_at_zero: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    pub grid: Grid,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scales {
    pub x: Scale,
    pub y: Scale,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOptions {
    pub responsive: bool,
    pub maintain_aspect_ratio: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_axis: Option<Axis>,
    pub plugins: Plugins,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scales: Option<Scales>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartConfig {
    #[serde(rename = "type")]
    pub kind: ChartKind,
    pub data: ChartData,
    pub options: ChartOptions,
}

fn translucent(color: &str) -> String {
    format!("{color}20")
}

fn hidden_grid() -> Grid {
    Grid { color: None, display: Some(false) }
}

fn tinted_grid() -> Grid {
    Grid { color: Some(GRID_COLOR.to_string()), display: None }
}

fn top_legend() -> Legend {
    Legend { display: true, position: Some("top".to_string()) }
}

fn no_legend() -> Legend {
    Legend { display: false, position: None }
}

fn line_chart(labels: Vec<String>, label: &str, data: Vec<f64>, color: &str, from_zero: bool) -> ChartConfig {
    ChartConfig {
        kind: ChartKind::Line,
        data: ChartData {
            labels,
            datasets: vec![Dataset {
                label: Some(label.to_string()),
                data,
                border_color: Some(color.to_string()),
                background_color: Some(Paint::Single(translucent(color))),
                tension: Some(0.4),
                fill: Some(true),
                point_radius: Some(4),
                point_hover_radius: Some(6),
                ..Dataset::default()
            }],
        },
        options: ChartOptions {
            responsive: true,
            maintain_aspect_ratio: false,
            index_axis: None,
            plugins: Plugins { legend: top_legend(), tooltip: None },
            scales: Some(Scales {
                x: Scale { grid: hidden_grid(), ..Scale::default() },
                y: Scale { begin_at_zero: Some(from_zero), max: None, grid: tinted_grid() },
            }),
        },
    }
}

pub fn rainfall(labels: Vec<String>, rain_mm: Vec<f64>) -> ChartConfig {
    line_chart(labels, "Rainfall (mm)", rain_mm, PRIMARY_COLOR, true)
}

pub fn temperature(labels: Vec<String>, temps_c: Vec<f64>) -> ChartConfig {
    line_chart(labels, "Temperature (°C)", temps_c, ACCENT_COLOR, false)
}

pub fn ph_gauge(ph: f64) -> ChartConfig {
    ChartConfig {
        kind: ChartKind::Doughnut,
        data: ChartData {
            labels: vec!["pH Level".to_string(), String::new()],
            datasets: vec![Dataset {
                data: vec![ph, PH_SCALE_MAX - ph],
                background_color: Some(Paint::PerPoint(vec![
                    SECONDARY_COLOR.to_string(),
                    GRID_COLOR.to_string(),
                ])),
                border_width: Some(0),
                ..Dataset::default()
            }],
        },
        options: ChartOptions {
            responsive: true,
            maintain_aspect_ratio: false,
            index_axis: None,
            plugins: Plugins {
                legend: no_legend(),
                tooltip: Some(Tooltip { labels: vec![format!("pH: {ph:.2}"), String::new()] }),
            },
            scales: None,
        },
    }
}

pub fn organic_carbon(soc_pct: f64) -> ChartConfig {
    ChartConfig {
        kind: ChartKind::Bar,
        data: ChartData {
            labels: vec!["Organic Carbon".to_string()],
            datasets: vec![Dataset {
                label: Some("SOC (%)".to_string()),
                data: vec![soc_pct],
                background_color: Some(Paint::Single(SECONDARY_COLOR.to_string())),
                border_radius: Some(8),
                ..Dataset::default()
            }],
        },
        options: ChartOptions {
            responsive: true,
            maintain_aspect_ratio: false,
            index_axis: Some(Axis::Y),
            plugins: Plugins { legend: no_legend(), tooltip: None },
            scales: Some(Scales {
                x: Scale { begin_at_zero: Some(true), max: Some(10.0), grid: tinted_grid() },
                y: Scale { grid: hidden_grid(), ..Scale::default() },
            }),
        },
    }
}
