//! Static payloads served when the backend cannot be reached.

use crate::model::{
    Climatology, Coordinate, CurrentConditions, DailyForecast, GeocodeResponse, GeocodeResult,
    MonthlyNormal, Rain, SoilReport, Temperature, WeatherReport,
};
use std::collections::BTreeMap;

pub fn geocode() -> GeocodeResponse {
    let at = Coordinate::default();
    GeocodeResponse {
        results: vec![GeocodeResult { name: Some("Sample".to_string()), lat: at.lat, lon: at.lon }],
    }
}

pub fn weather(at: Coordinate) -> WeatherReport {
    const DAILY: [(f64, f64); 7] =
        [(26.0, 5.0), (27.0, 12.0), (25.0, 8.0), (24.0, 2.0), (26.0, 15.0), (28.0, 0.0), (27.0, 10.0)];
    const MONTHLY: [(f64, f64); 12] = [
        (18.0, 25.0),
        (20.0, 30.0),
        (24.0, 35.0),
        (28.0, 45.0),
        (32.0, 60.0),
        (34.0, 80.0),
        (33.0, 90.0),
        (32.0, 85.0),
        (30.0, 70.0),
        (26.0, 50.0),
        (22.0, 35.0),
        (19.0, 28.0),
    ];

    let daily = DAILY
        .iter()
        .zip(0..)
        .map(|(&(day, rain), dt)| DailyForecast {
            dt: Some(dt),
            temp: Some(Temperature::Breakdown { day: Some(day), min: None, max: None }),
            rain: Some(Rain::Amount(rain)),
        })
        .collect();

    let monthly = MONTHLY
        .iter()
        .zip(1..)
        .map(|(&(temp, rain), month)| MonthlyNormal {
            month,
            temp: Some(temp),
            rain: Some(rain),
        })
        .collect();

    WeatherReport {
        lat: Some(at.lat),
        lon: Some(at.lon),
        current: Some(CurrentConditions {
            temp: Some(26.0),
            humidity: Some(60.0),
            wind_speed: Some(3.2),
            rain: Some(Rain::ByWindow(BTreeMap::from([("1h".to_string(), Some(0.0))]))),
        }),
        daily,
        climatology: Some(Climatology { monthly }),
    }
}

pub fn soil(at: Coordinate) -> SoilReport {
    SoilReport {
        lat: Some(at.lat),
        lon: Some(at.lon),
        ph: Some(6.4),
        soc_pct: Some(1.2),
        texture: Some("clay loam".to_string()),
        sand_pct: Some(45.0),
        silt_pct: Some(30.0),
        clay_pct: Some(25.0),
    }
}
