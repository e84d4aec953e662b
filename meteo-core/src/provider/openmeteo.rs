use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::{
    config::ApiConfig,
    error::FetchError,
    model::{Coordinate, CurrentConditions, DailyPoint, ForecastSeries, HourlyPoint},
};

use super::WeatherProvider;

const HOURLY_FIELDS: &str = "temperature_2m,relative_humidity_2m,precipitation_probability";
const DAILY_FIELDS: &str = "temperature_2m_max,temperature_2m_min,sunrise,sunset";

/// Open-Meteo forecast API client. No API key required.
#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    base_url: String,
    forecast_days: u8,
    http: Client,
}

impl OpenMeteoProvider {
    pub fn new(api: &ApiConfig) -> Result<Self, FetchError> {
        let http = Client::builder().timeout(api.timeout()).build()?;

        Ok(Self {
            base_url: api.base_url.trim_end_matches('/').to_string(),
            forecast_days: api.forecast_days.clamp(1, 16),
            http,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/forecast", self.base_url)
    }

    fn current_query(coord: Coordinate) -> Vec<(&'static str, String)> {
        vec![
            ("latitude", coord.latitude().to_string()),
            ("longitude", coord.longitude().to_string()),
            ("current_weather", "true".to_string()),
            ("timezone", "auto".to_string()),
        ]
    }

    fn forecast_query(&self, coord: Coordinate) -> Vec<(&'static str, String)> {
        vec![
            ("latitude", coord.latitude().to_string()),
            ("longitude", coord.longitude().to_string()),
            ("hourly", HOURLY_FIELDS.to_string()),
            ("daily", DAILY_FIELDS.to_string()),
            ("timezone", "auto".to_string()),
            ("forecast_days", self.forecast_days.to_string()),
        ]
    }

    async fn get_json(
        &self,
        query: &[(&'static str, String)],
        what: &str,
    ) -> Result<OmResponse, FetchError> {
        let url = self.endpoint();
        debug!(%url, ?query, "requesting Open-Meteo {what}");

        let res = self.http.get(&url).query(query).send().await.map_err(|e| {
            warn!(error = %e, "Open-Meteo {what} request failed");
            FetchError::from(e)
        })?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            warn!(%status, "Open-Meteo {what} request returned an error status");
            debug!(body = %truncate_body(&body), "error response body");
            return Err(FetchError::Http(status.as_u16()));
        }

        let body = res.text().await.map_err(|e| {
            warn!(error = %e, "failed to read Open-Meteo {what} response body");
            FetchError::from(e)
        })?;

        parse_body(&body).inspect_err(|e| {
            warn!(error = %e, "Open-Meteo {what} response could not be parsed");
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoProvider {
    #[instrument(skip(self), fields(lat = coord.latitude(), lon = coord.longitude()))]
    async fn current(&self, coord: Coordinate) -> Result<CurrentConditions, FetchError> {
        let parsed = self.get_json(&Self::current_query(coord), "current").await?;
        Ok(parsed.into_current())
    }

    #[instrument(skip(self), fields(lat = coord.latitude(), lon = coord.longitude()))]
    async fn forecast(&self, coord: Coordinate) -> Result<ForecastSeries, FetchError> {
        let parsed = self.get_json(&self.forecast_query(coord), "forecast").await?;
        Ok(parsed.into_forecast())
    }
}

/// Only a body that is not a JSON object fails; anything inside it that is
/// missing, `null` or of the wrong type reads as `None`.
fn parse_body(body: &str) -> Result<OmResponse, FetchError> {
    let value: Value = serde_json::from_str(body).map_err(|e| FetchError::Parse(e.to_string()))?;
    if !value.is_object() {
        return Err(FetchError::Parse("response body is not a JSON object".to_string()));
    }
    serde_json::from_value(value).map_err(|e| FetchError::Parse(e.to_string()))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OmResponse {
    #[serde(deserialize_with = "lenient")]
    latitude: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    longitude: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    timezone: Option<String>,
    #[serde(deserialize_with = "lenient")]
    current_weather: Option<OmCurrentWeather>,
    #[serde(deserialize_with = "lenient")]
    hourly: Option<OmHourly>,
    #[serde(deserialize_with = "lenient")]
    daily: Option<OmDaily>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OmCurrentWeather {
    #[serde(deserialize_with = "lenient")]
    time: Option<String>,
    #[serde(deserialize_with = "lenient")]
    temperature: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    windspeed: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    winddirection: Option<f64>,
    #[serde(deserialize_with = "lenient_code")]
    weathercode: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OmHourly {
    #[serde(deserialize_with = "lenient_seq")]
    time: Vec<Option<String>>,
    #[serde(deserialize_with = "lenient_seq")]
    temperature_2m: Vec<Option<f64>>,
    #[serde(deserialize_with = "lenient_seq")]
    relative_humidity_2m: Vec<Option<f64>>,
    #[serde(deserialize_with = "lenient_seq")]
    precipitation_probability: Vec<Option<f64>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OmDaily {
    #[serde(deserialize_with = "lenient_seq")]
    time: Vec<Option<String>>,
    #[serde(deserialize_with = "lenient_seq")]
    temperature_2m_max: Vec<Option<f64>>,
    #[serde(deserialize_with = "lenient_seq")]
    temperature_2m_min: Vec<Option<f64>>,
    #[serde(deserialize_with = "lenient_seq")]
    sunrise: Vec<Option<String>>,
    #[serde(deserialize_with = "lenient_seq")]
    sunset: Vec<Option<String>>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// A non-array reads as empty; each element that does not fit reads as `None`
/// so the parallel arrays stay index-aligned.
fn lenient_seq<'de, D, T>(deserializer: D) -> Result<Vec<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        _ => return Ok(Vec::new()),
    };
    Ok(items.into_iter().map(|item| serde_json::from_value(item).ok()).collect())
}

/// WMO codes sometimes arrive as `3.0`; whole floats are accepted.
fn lenient_code<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let whole = value
        .as_i64()
        .or_else(|| value.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64));
    Ok(whole.and_then(|n| i32::try_from(n).ok()))
}

impl OmResponse {
    fn location(&self) -> Option<Coordinate> {
        Coordinate::new(self.latitude?, self.longitude?).ok()
    }

    fn into_current(self) -> CurrentConditions {
        let location = self.location();
        let current = self.current_weather.unwrap_or_default();

        CurrentConditions {
            temperature: current.temperature,
            wind_speed: current.windspeed,
            wind_direction: current.winddirection,
            weather_code: current.weathercode,
            time: current.time,
            location,
        }
    }

    fn into_forecast(self) -> ForecastSeries {
        let location = self.location();
        let hourly = self.hourly.unwrap_or_default();
        let daily = self.daily.unwrap_or_default();

        let hourly = hourly
            .time
            .iter()
            .enumerate()
            .filter_map(|(i, time)| Some((i, time.clone()?)))
            .map(|(i, time)| HourlyPoint {
                time,
                temperature: at(&hourly.temperature_2m, i),
                humidity: at(&hourly.relative_humidity_2m, i),
                precipitation_probability: at(&hourly.precipitation_probability, i),
            })
            .collect();

        let daily = daily
            .time
            .iter()
            .enumerate()
            .filter_map(|(i, date)| Some((i, date.clone()?)))
            .map(|(i, date)| DailyPoint {
                date,
                temp_max: at(&daily.temperature_2m_max, i),
                temp_min: at(&daily.temperature_2m_min, i),
                sunrise: at(&daily.sunrise, i),
                sunset: at(&daily.sunset, i),
            })
            .collect();

        ForecastSeries { hourly, daily, location, timezone: self.timezone }
    }
}

/// Value `i` of a parallel array; short arrays and `null`s read as `None`.
/// Rows whose timestamp is missing are skipped by the caller.
fn at<T: Clone>(values: &[Option<T>], i: usize) -> Option<T> {
    values.get(i).cloned().flatten()
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
