//! Core library for the `meteo` weather dashboard.
//!
//! This crate defines:
//! - The Open-Meteo client and its time-bounded response cache
//! - The weather-code lookup table
//! - Shared domain models (coordinates, current conditions, forecast series)
//! - Configuration handling
//!
//! It is used by `meteo-cli`, but can also be reused by other front ends.

pub mod cache;
pub mod client;
pub mod codes;
pub mod config;
pub mod error;
pub mod model;
pub mod provider;

pub use cache::{Clock, ManualClock, SystemClock, TtlCache};
pub use client::{QueryKind, WeatherClient};
pub use codes::{WeatherCode, describe};
pub use config::Config;
pub use error::{FetchError, NetworkCause};
pub use model::{
    Coordinate, CurrentConditions, DailyPoint, ForecastSeries, HourlyPoint, InvalidCoordinate,
};
pub use provider::{OpenMeteoProvider, WeatherProvider};
