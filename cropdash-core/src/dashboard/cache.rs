//! Session cache of weather and soil payloads keyed by rounded coordinates.
//!
//! Entries never expire and are never evicted; the cache lives as long as the
//! dashboard that owns it.

use std::{collections::HashMap, fmt};

use crate::{
    ApiError,
    model::{Coordinate, SoilReport, WeatherReport},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataKind {
    Weather,
    Soil,
}

impl DataKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            DataKind::Weather => "w",
            DataKind::Soil => "s",
        }
    }
}

/// `<kind>:<lat>,<lon>` with both coordinates rounded to three decimals.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(kind: DataKind, at: Coordinate) -> Self {
        Self(format!("{}:{}", kind.prefix(), location_key(at)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rounded `lat,lon` shared by every cache key for the same spot.
pub fn location_key(at: Coordinate) -> String {
    format!("{},{}", three_places(at.lat), three_places(at.lon))
}

/// Three decimals with exact ties rounded away from zero.
///
/// `{:.3}` alone rounds ties to even. An exact tie needs a fourth decimal
/// of 5 and nothing after it, which in binary means an odd multiple of 1/16.
fn three_places(value: f64) -> String {
    let sixteenths = value * 16.0;
    let tie = sixteenths.fract() == 0.0 && sixteenths.rem_euclid(2.0) == 1.0;
    let value = if tie { value + value.signum() * 1e-4 } else { value };
    format!("{value:.3}")
}

#[derive(Debug, Clone, PartialEq)]
enum CachedPayload {
    Weather(WeatherReport),
    Soil(SoilReport),
}

#[derive(Debug, Default)]
pub struct ClientCache {
    entries: HashMap<CacheKey, CachedPayload>,
}

impl ClientCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, kind: DataKind, at: Coordinate) -> bool {
        self.entries.contains_key(&CacheKey::new(kind, at))
    }

    pub fn weather(&self, at: Coordinate) -> Option<WeatherReport> {
        match self.entries.get(&CacheKey::new(DataKind::Weather, at)) {
            Some(CachedPayload::Weather(w)) => Some(w.clone()),
            _ => None,
        }
    }

    pub fn soil(&self, at: Coordinate) -> Option<SoilReport> {
        match self.entries.get(&CacheKey::new(DataKind::Soil, at)) {
            Some(CachedPayload::Soil(s)) => Some(s.clone()),
            _ => None,
        }
    }

    /// Cache a weather payload; rejected unless it carries current conditions.
    pub fn store_weather(&mut self, at: Coordinate, report: WeatherReport) -> Result<(), ApiError> {
        if report.current.is_none() {
            return Err(ApiError::Validation { kind: "weather" });
        }
        self.entries.insert(CacheKey::new(DataKind::Weather, at), CachedPayload::Weather(report));
        Ok(())
    }

    /// Cache a soil payload; rejected unless it carries a pH value.
    pub fn store_soil(&mut self, at: Coordinate, report: SoilReport) -> Result<(), ApiError> {
        if report.ph.is_none() {
            return Err(ApiError::Validation { kind: "soil" });
        }
        self.entries.insert(CacheKey::new(DataKind::Soil, at), CachedPayload::Soil(report));
        Ok(())
    }
}
