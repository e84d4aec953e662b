use anyhow::Context;
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use meteo_core::{Config, Coordinate, WeatherClient, WeatherProvider, describe};

use crate::{dashboard, prompt};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "meteo", version, about = "Open-Meteo weather dashboard")]
pub struct Cli {
    /// Print debug logs to stderr (RUST_LOG overrides this).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show current conditions and the hourly forecast for a coordinate.
    Show {
        #[command(flatten)]
        location: LocationArgs,

        /// Number of hourly forecast rows to show.
        #[arg(long, default_value_t = 24)]
        hours: usize,

        /// Print the fetched data as JSON instead of the dashboard.
        #[arg(long)]
        json: bool,
    },

    /// Browse the dashboard interactively: refresh, move, clear cache.
    Interactive {
        #[command(flatten)]
        location: LocationArgs,

        /// Number of hourly forecast rows to show.
        #[arg(long, default_value_t = 24)]
        hours: usize,
    },

    /// Describe a WMO weather code.
    Describe {
        #[arg(allow_negative_numbers = true)]
        code: i32,
    },

    /// Interactively set the default location, cache TTL and timeout.
    Configure,
}

#[derive(Debug, Clone, Args)]
pub struct LocationArgs {
    /// Latitude in degrees (-90 to 90); defaults to the configured location.
    #[arg(long, allow_negative_numbers = true, requires = "lon")]
    pub lat: Option<f64>,

    /// Longitude in degrees (-180 to 180); defaults to the configured location.
    #[arg(long, allow_negative_numbers = true, requires = "lat")]
    pub lon: Option<f64>,
}

impl LocationArgs {
    pub fn resolve(&self, config: &Config) -> anyhow::Result<Coordinate> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Ok(Coordinate::new(lat, lon)?),
            _ => Ok(config.location),
        }
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Show { location, hours, json } => {
                let config = Config::load()?;
                let coord = location.resolve(&config)?;
                let client = WeatherClient::from_config(&config)
                    .context("Failed to initialise the weather client")?;

                show(&client, coord, hours, json).await
            }
            Command::Interactive { location, hours } => {
                let config = Config::load()?;
                let coord = location.resolve(&config)?;
                let client = WeatherClient::from_config(&config)
                    .context("Failed to initialise the weather client")?;

                prompt::interactive(&client, coord, hours).await
            }
            Command::Describe { code } => {
                println!("{code}: {}", describe(code));
                Ok(())
            }
            Command::Configure => prompt::configure(),
        }
    }
}

async fn show<P: WeatherProvider>(
    client: &WeatherClient<P>,
    coord: Coordinate,
    hours: usize,
    json: bool,
) -> anyhow::Result<()> {
    let snapshot = match dashboard::load(client, coord).await {
        Ok(snapshot) => snapshot,
        Err(err) => {
            eprintln!("{}", dashboard::FAILURE_NOTICE);
            return Err(err).with_context(|| format!("Failed to fetch weather for {coord}"));
        }
    };

    if json {
        let value = serde_json::json!({
            "location": snapshot.coord,
            "current": snapshot.current,
            "description": snapshot.current.description(),
            "forecast": snapshot.forecast,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        let updated = Local::now().format("%Y-%m-%d %H:%M").to_string();
        print!("{}", dashboard::render(&snapshot, hours, &updated));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_show_with_negative_coordinates() {
        let cli = Cli::try_parse_from(["meteo", "show", "--lat", "-33.8688", "--lon", "151.2093"])
            .expect("should parse");

        match cli.command {
            Command::Show { location, hours, json } => {
                assert_eq!(location.lat, Some(-33.8688));
                assert_eq!(location.lon, Some(151.2093));
                assert_eq!(hours, 24);
                assert!(!json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn lat_requires_lon() {
        assert!(Cli::try_parse_from(["meteo", "show", "--lat", "10"]).is_err());
    }

    #[test]
    fn resolve_falls_back_to_config() {
        let config = Config::default();
        let none = LocationArgs { lat: None, lon: None };
        assert_eq!(none.resolve(&config).unwrap(), Coordinate::SEOUL);

        let given = LocationArgs { lat: Some(52.52), lon: Some(13.405) };
        assert_eq!(given.resolve(&config).unwrap().latitude(), 52.52);

        let bad = LocationArgs { lat: Some(120.0), lon: Some(0.0) };
        assert!(bad.resolve(&config).is_err());
    }

    #[test]
    fn describe_accepts_negative_code() {
        let cli = Cli::try_parse_from(["meteo", "describe", "-1"]).expect("should parse");
        assert!(matches!(cli.command, Command::Describe { code: -1 }));
    }
}
