use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::codes::{self, WeatherCode};

/// Rejected coordinate input.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error(
    "invalid coordinate ({latitude}, {longitude}): latitude must be -90 to 90, longitude must be -180 to 180"
)]
pub struct InvalidCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// A query location. Immutable once built; only [`Coordinate::new`] constructs one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    /// Seoul city hall, the dashboard's starting location.
    pub const SEOUL: Coordinate = Coordinate { latitude: 37.5665, longitude: 126.9780 };

    pub fn new(latitude: f64, longitude: f64) -> Result<Self, InvalidCoordinate> {
        let lat_ok = latitude.is_finite() && (-90.0..=90.0).contains(&latitude);
        let lon_ok = longitude.is_finite() && (-180.0..=180.0).contains(&longitude);

        if lat_ok && lon_ok {
            Ok(Self { latitude, longitude })
        } else {
            Err(InvalidCoordinate { latitude, longitude })
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// True when both components are within `tolerance` degrees of `other`.
    pub fn approx_eq(&self, other: &Coordinate, tolerance: f64) -> bool {
        (self.latitude - other.latitude).abs() <= tolerance
            && (self.longitude - other.longitude).abs() <= tolerance
    }

    /// Bit-exact identity used for cache keys.
    pub(crate) fn key_bits(&self) -> (u64, u64) {
        // -0.0 and 0.0 are the same place
        let lat = if self.latitude == 0.0 { 0.0 } else { self.latitude };
        let lon = if self.longitude == 0.0 { 0.0 } else { self.longitude };
        (lat.to_bits(), lon.to_bits())
    }
}

impl<'de> Deserialize<'de> for Coordinate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            latitude: f64,
            longitude: f64,
        }

        let raw = Raw::deserialize(deserializer)?;
        Coordinate::new(raw.latitude, raw.longitude).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Instantaneous reading. Fields the provider omitted are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    /// Temperature in °C
    pub temperature: Option<f64>,
    /// Wind speed in km/h
    pub wind_speed: Option<f64>,
    /// Wind direction in degrees (0-360)
    pub wind_direction: Option<f64>,
    /// WMO weather code
    pub weather_code: Option<i32>,
    /// Observation time as reported (local ISO-8601)
    pub time: Option<String>,
    /// Grid coordinate echoed back by the provider
    pub location: Option<Coordinate>,
}

impl CurrentConditions {
    pub fn condition(&self) -> Option<WeatherCode> {
        self.weather_code.and_then(WeatherCode::from_code)
    }

    /// Label for the weather code; a missing code reads as code 0, like the dashboard always did.
    pub fn description(&self) -> &'static str {
        codes::describe(self.weather_code.unwrap_or(0))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyPoint {
    pub time: String,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub precipitation_probability: Option<f64>,
}

impl HourlyPoint {
    /// `HH:MM` part of an ISO-8601 timestamp such as `2024-01-15T13:00`.
    pub fn clock_label(&self) -> &str {
        clock_part(&self.time)
    }
}

fn clock_part(timestamp: &str) -> &str {
    timestamp.get(11..16).unwrap_or(timestamp)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPoint {
    pub date: String,
    pub temp_max: Option<f64>,
    pub temp_min: Option<f64>,
    pub sunrise: Option<String>,
    pub sunset: Option<String>,
}

impl DailyPoint {
    pub fn sunrise_clock(&self) -> Option<&str> {
        self.sunrise.as_deref().map(clock_part)
    }

    pub fn sunset_clock(&self) -> Option<&str> {
        self.sunset.as_deref().map(clock_part)
    }
}

/// Hourly and daily forecast, in the provider's chronological order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastSeries {
    pub hourly: Vec<HourlyPoint>,
    pub daily: Vec<DailyPoint>,
    pub location: Option<Coordinate>,
    pub timezone: Option<String>,
}

impl ForecastSeries {
    pub fn next_hours(&self, n: usize) -> &[HourlyPoint] {
        &self.hourly[..n.min(self.hourly.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hour(time: &str, temp: f64) -> HourlyPoint {
        HourlyPoint {
            time: time.to_string(),
            temperature: Some(temp),
            humidity: None,
            precipitation_probability: None,
        }
    }

    #[test]
    fn coordinate_accepts_bounds() {
        assert!(Coordinate::new(0.0, 0.0).is_ok());
        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(-90.0, -180.0).is_ok());
        assert!(Coordinate::new(37.5665, 126.978).is_ok());
    }

    #[test]
    fn coordinate_rejects_out_of_range() {
        assert!(Coordinate::new(91.0, 0.0).is_err());
        assert!(Coordinate::new(-90.5, 0.0).is_err());
        assert!(Coordinate::new(0.0, 180.1).is_err());
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
        assert!(Coordinate::new(0.0, f64::INFINITY).is_err());

        let err = Coordinate::new(100.0, 0.0).unwrap_err();
        assert!(err.to_string().contains("latitude must be -90 to 90"));
    }

    #[test]
    fn coordinate_deserialize_validates() {
        let ok: Coordinate = serde_json::from_str(r#"{"latitude": 1.5, "longitude": 2.5}"#).unwrap();
        assert_eq!(ok.latitude(), 1.5);

        let bad = serde_json::from_str::<Coordinate>(r#"{"latitude": 120.0, "longitude": 0.0}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn signed_zero_shares_a_key() {
        let a = Coordinate::new(0.0, 10.0).unwrap();
        let b = Coordinate::new(-0.0, 10.0).unwrap();
        assert_eq!(a.key_bits(), b.key_bits());
    }

    #[test]
    fn clock_label_extracts_hour_and_minute() {
        assert_eq!(hour("2024-01-15T13:00", 1.0).clock_label(), "13:00");
        assert_eq!(hour("2024-01-15T07:30:00Z", 1.0).clock_label(), "07:30");
        assert_eq!(hour("13:00", 1.0).clock_label(), "13:00");
    }

    #[test]
    fn daily_clock_labels() {
        let day = DailyPoint {
            date: "2024-01-15".into(),
            temp_max: None,
            temp_min: None,
            sunrise: Some("2024-01-15T07:46".into()),
            sunset: None,
        };
        assert_eq!(day.sunrise_clock(), Some("07:46"));
        assert_eq!(day.sunset_clock(), None);
    }

    #[test]
    fn next_hours_keeps_order_and_truncates() {
        let hourly: Vec<_> = (0..48)
            .map(|h| hour(&format!("2024-01-{:02}T{:02}:00", 15 + h / 24, h % 24), h as f64))
            .collect();
        let series = ForecastSeries { hourly: hourly.clone(), ..Default::default() };

        let first = series.next_hours(24);
        assert_eq!(first.len(), 24);
        assert_eq!(first, &hourly[..24]);
        assert!(first.windows(2).all(|w| w[0].time < w[1].time));
    }

    #[test]
    fn next_hours_on_short_series() {
        let series = ForecastSeries {
            hourly: vec![hour("2024-01-15T00:00", 1.0)],
            ..Default::default()
        };
        assert_eq!(series.next_hours(24).len(), 1);
        assert!(ForecastSeries::default().next_hours(24).is_empty());
    }

    #[test]
    fn missing_code_describes_as_clear() {
        let current = CurrentConditions::default();
        assert_eq!(current.description(), "Clear");
        assert_eq!(current.condition(), None);

        let rainy = CurrentConditions { weather_code: Some(63), ..Default::default() };
        assert_eq!(rainy.description(), "Rain: moderate");
        assert_eq!(rainy.condition(), Some(WeatherCode::RainModerate));
    }
}
