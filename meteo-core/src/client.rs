//! Cached front for a [`WeatherProvider`].

use chrono::Duration;
use std::{fmt, sync::Arc};
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use crate::{
    cache::{Clock, SystemClock, TtlCache},
    config::Config,
    error::FetchError,
    model::{Coordinate, CurrentConditions, ForecastSeries},
    provider::{OpenMeteoProvider, WeatherProvider},
};

/// Which query shape a cache entry answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    Current,
    Forecast,
}

impl QueryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::Current => "current",
            QueryKind::Forecast => "forecast",
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    lat_bits: u64,
    lon_bits: u64,
    kind: QueryKind,
}

impl CacheKey {
    pub fn new(coord: Coordinate, kind: QueryKind) -> Self {
        let (lat_bits, lon_bits) = coord.key_bits();
        Self { lat_bits, lon_bits, kind }
    }
}

#[derive(Debug, Clone)]
pub enum Payload {
    Current(CurrentConditions),
    Forecast(ForecastSeries),
}

pub type ResponseCache = TtlCache<CacheKey, Payload>;

/// Fetches weather through a provider, serving repeat queries from a TTL cache.
///
/// The cache lock is held across lookup, fetch and insert, so concurrent
/// callers asking for the same key trigger a single request.
pub struct WeatherClient<P = OpenMeteoProvider> {
    provider: P,
    cache: Mutex<ResponseCache>,
}

impl<P: fmt::Debug> fmt::Debug for WeatherClient<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeatherClient").field("provider", &self.provider).finish_non_exhaustive()
    }
}

impl WeatherClient<OpenMeteoProvider> {
    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        Self::from_config_with_clock(config, Arc::new(SystemClock))
    }

    pub fn from_config_with_clock(
        config: &Config,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, FetchError> {
        let provider = OpenMeteoProvider::new(&config.api)?;
        let cache = TtlCache::with_clock(config.cache.ttl(), clock);
        Ok(Self::new(provider, cache))
    }
}

impl<P: WeatherProvider> WeatherClient<P> {
    pub fn new(provider: P, cache: ResponseCache) -> Self {
        Self { provider, cache: Mutex::new(cache) }
    }

    /// Client with the system clock and the given TTL.
    pub fn with_ttl(provider: P, ttl: Duration) -> Self {
        Self::new(provider, TtlCache::new(ttl))
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    #[instrument(skip(self), fields(lat = coord.latitude(), lon = coord.longitude()))]
    pub async fn fetch_current(&self, coord: Coordinate) -> Result<CurrentConditions, FetchError> {
        let key = CacheKey::new(coord, QueryKind::Current);
        let mut cache = self.cache.lock().await;

        if let Some(Payload::Current(hit)) = cache.get(&key) {
            debug!("current conditions served from cache");
            return Ok(hit);
        }

        debug!("cache miss, fetching current conditions");
        let fresh = self.provider.current(coord).await?;
        cache.insert(key, Payload::Current(fresh.clone()));
        Ok(fresh)
    }

    #[instrument(skip(self), fields(lat = coord.latitude(), lon = coord.longitude()))]
    pub async fn fetch_forecast(&self, coord: Coordinate) -> Result<ForecastSeries, FetchError> {
        let key = CacheKey::new(coord, QueryKind::Forecast);
        let mut cache = self.cache.lock().await;

        if let Some(Payload::Forecast(hit)) = cache.get(&key) {
            debug!("forecast served from cache");
            return Ok(hit);
        }

        debug!("cache miss, fetching forecast");
        let fresh = self.provider.forecast(coord).await?;
        cache.insert(key, Payload::Forecast(fresh.clone()));
        Ok(fresh)
    }

    pub async fn clear_cache(&self) {
        self.cache.lock().await.clear();
    }

    pub async fn cached_entries(&self) -> usize {
        self.cache.lock().await.len()
    }
}
