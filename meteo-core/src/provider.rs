use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::FetchError,
    model::{Coordinate, CurrentConditions, ForecastSeries},
};

pub mod openmeteo;

pub use openmeteo::OpenMeteoProvider;

/// Transport for the two weather queries. Implementations make exactly one
/// attempt per call; caching lives in [`crate::WeatherClient`].
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current(&self, coord: Coordinate) -> Result<CurrentConditions, FetchError>;

    async fn forecast(&self, coord: Coordinate) -> Result<ForecastSeries, FetchError>;
}
