use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Reject coordinates outside the ranges the backend accepts.
    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.lat.is_finite() || !self.lon.is_finite() {
            anyhow::bail!("invalid coordinates: {}, {}", self.lat, self.lon);
        }
        if !(-90.0..=90.0).contains(&self.lat) || !(-180.0..=180.0).contains(&self.lon) {
            anyhow::bail!(
                "out of range coordinates: {}, {} (latitude must be -90..90, longitude -180..180)",
                self.lat,
                self.lon
            );
        }
        Ok(())
    }
}

impl Default for Coordinate {
    /// New Delhi, the location the dashboard opens on.
    fn default() -> Self {
        Self::new(28.6139, 77.2090)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lon)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub name: Option<String>,
    pub lat: f64,
    pub lon: f64,
}

impl GeocodeResult {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lon)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeocodeResponse {
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
}

/// Any JSON number as `f64`; other values read as missing instead of failing the payload.
fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(serde_json::Value::deserialize(deserializer)?.as_f64())
}

fn lenient_integer<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Ok(serde_json::Value::deserialize(deserializer)?.as_i64())
}

/// Rain reported either as a plain amount or keyed by accumulation window (`"1h"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Rain {
    Amount(f64),
    ByWindow(BTreeMap<String, Option<f64>>),
    /// Unrecognised shape, read as no rain.
    Other(serde_json::Value),
}

impl Rain {
    pub fn millimetres(&self) -> f64 {
        match self {
            Rain::Amount(mm) => *mm,
            Rain::ByWindow(windows) => windows.get("1h").copied().flatten().unwrap_or(0.0),
            Rain::Other(_) => 0.0,
        }
    }
}

/// Temperature reported either as a single value or as a day/min/max breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Temperature {
    Value(f64),
    Breakdown {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        day: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
    Other(serde_json::Value),
}

impl Temperature {
    pub fn celsius(&self) -> f64 {
        match self {
            Temperature::Value(c) => *c,
            Temperature::Breakdown { day, min, .. } => day.or(*min).unwrap_or(0.0),
            Temperature::Other(_) => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CurrentConditions {
    #[serde(default, deserialize_with = "lenient_number")]
    pub temp: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub humidity: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub wind_speed: Option<f64>,
    #[serde(default)]
    pub rain: Option<Rain>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    #[serde(default, deserialize_with = "lenient_integer")]
    pub dt: Option<i64>,
    #[serde(default)]
    pub temp: Option<Temperature>,
    #[serde(default)]
    pub rain: Option<Rain>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyNormal {
    #[serde(default)]
    pub month: u8,
    #[serde(default, deserialize_with = "lenient_number")]
    pub temp: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub rain: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Climatology {
    #[serde(default)]
    pub monthly: Vec<MonthlyNormal>,
}

/// Weather payload as served by `/api/weather`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WeatherReport {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub current: Option<CurrentConditions>,
    #[serde(default)]
    pub daily: Vec<DailyForecast>,
    #[serde(default)]
    pub climatology: Option<Climatology>,
}

/// Soil payload as served by `/api/soil`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SoilReport {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub ph: Option<f64>,
    #[serde(default)]
    pub soc_pct: Option<f64>,
    #[serde(default)]
    pub texture: Option<String>,
    #[serde(default)]
    pub sand_pct: Option<f64>,
    #[serde(default)]
    pub silt_pct: Option<f64>,
    #[serde(default)]
    pub clay_pct: Option<f64>,
}

/// A flat row for CSV export, keyed by field name.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// One crop recommendation; fields beyond name and score are kept as-is for CSV export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub name: String,
    #[serde(default)]
    pub score: f64,
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

impl Recommendation {
    /// Flatten into a record keyed by field name, as the export endpoint expects.
    pub fn to_record(&self) -> Record {
        let mut record = self.details.clone();
        record.insert("name".into(), self.name.clone().into());
        record.insert("score".into(), self.score.into());
        record
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecommendResponse {
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CalendarResponse {
    #[serde(default)]
    pub months: Vec<serde_json::Value>,
    #[serde(default)]
    pub climatology_months: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crop {
    pub name: String,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CropList {
    #[serde(default)]
    pub crops: Vec<Crop>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rain_accepts_number_or_window_map() {
        let plain: Rain = serde_json::from_value(json!(12.5)).unwrap();
        assert_eq!(plain.millimetres(), 12.5);

        let windowed: Rain = serde_json::from_value(json!({"1h": 0.4})).unwrap();
        assert_eq!(windowed.millimetres(), 0.4);

        let other_window: Rain = serde_json::from_value(json!({"3h": 2.0})).unwrap();
        assert_eq!(other_window.millimetres(), 0.0);
    }

    #[test]
    fn temperature_prefers_day_then_min() {
        let t: Temperature = serde_json::from_value(json!({"day": 26.0, "min": 18.0})).unwrap();
        assert_eq!(t.celsius(), 26.0);

        let t: Temperature = serde_json::from_value(json!({"min": 18.0})).unwrap();
        assert_eq!(t.celsius(), 18.0);

        let t: Temperature = serde_json::from_value(json!({"max": 30.0})).unwrap();
        assert_eq!(t.celsius(), 0.0);

        let t: Temperature = serde_json::from_value(json!(21.5)).unwrap();
        assert_eq!(t.celsius(), 21.5);
    }

    #[test]
    fn unknown_shapes_normalise_to_zero() {
        let rain: Rain = serde_json::from_value(json!("n/a")).unwrap();
        assert_eq!(rain.millimetres(), 0.0);

        let rain: Rain = serde_json::from_value(json!({"1h": "trace"})).unwrap();
        assert_eq!(rain.millimetres(), 0.0);

        let t: Temperature = serde_json::from_value(json!({"day": "hot"})).unwrap();
        assert_eq!(t.celsius(), 0.0);

        let t: Temperature = serde_json::from_value(json!([1, 2])).unwrap();
        assert_eq!(t.celsius(), 0.0);
    }

    #[test]
    fn garbage_daily_entry_keeps_the_rest_of_the_payload() {
        let w: WeatherReport = serde_json::from_value(json!({
            "current": {"temp": 29.5, "wind_speed": "calm"},
            "daily": [
                {"dt": "today", "temp": {"day": 30}, "rain": "n/a"},
                {"dt": 1, "temp": 27.0, "rain": 3.0}
            ],
            "climatology": {"monthly": [{"month": 1, "temp": 14}]}
        }))
        .unwrap();

        assert_eq!(w.daily.len(), 2);
        assert_eq!(w.daily[0].dt, None);
        assert_eq!(w.daily[0].rain.as_ref().unwrap().millimetres(), 0.0);
        assert_eq!(w.daily[1].temp.as_ref().unwrap().celsius(), 27.0);

        let current = w.current.unwrap();
        assert_eq!((current.temp, current.wind_speed), (Some(29.5), None));

        let month = &w.climatology.unwrap().monthly[0];
        assert_eq!((month.month, month.temp, month.rain), (1, Some(14.0), None));
    }

    #[test]
    fn weather_report_without_current_still_parses() {
        let w: WeatherReport = serde_json::from_value(json!({"daily": []})).unwrap();
        assert!(w.current.is_none());
        assert!(w.daily.is_empty());
    }

    #[test]
    fn coordinate_validation_bounds() {
        assert!(Coordinate::new(28.6, 77.2).validate().is_ok());
        assert!(Coordinate::new(90.0, -180.0).validate().is_ok());
        assert!(Coordinate::new(90.1, 0.0).validate().is_err());
        assert!(Coordinate::new(0.0, 181.0).validate().is_err());
        assert!(Coordinate::new(f64::NAN, 0.0).validate().is_err());
    }

    #[test]
    fn coordinate_display_uses_four_decimals() {
        assert_eq!(Coordinate::new(28.6139, 77.209).to_string(), "28.6139, 77.2090");
    }

    #[test]
    fn recommendation_record_keeps_extra_fields() {
        let rec: Recommendation =
            serde_json::from_value(json!({"name": "Rice", "score": 81.5, "season": "kharif"}))
                .unwrap();
        let record = rec.to_record();
        assert_eq!(record["name"], json!("Rice"));
        assert_eq!(record["score"], json!(81.5));
        assert_eq!(record["season"], json!("kharif"));
    }
}
