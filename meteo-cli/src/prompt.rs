//! Interactive prompts: the dashboard loop and `configure`.

use std::fmt;

use anyhow::Context;
use chrono::Local;
use inquire::{CustomType, InquireError, Select};
use meteo_core::{Config, Coordinate, WeatherClient, WeatherProvider};

use crate::dashboard;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Refresh,
    ChangeLocation,
    ClearCache,
    Quit,
}

impl Action {
    const ALL: [Action; 4] =
        [Action::Refresh, Action::ChangeLocation, Action::ClearCache, Action::Quit];
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Action::Refresh => "Refresh",
            Action::ChangeLocation => "Enter another coordinate",
            Action::ClearCache => "Clear cached responses",
            Action::Quit => "Quit",
        };
        f.write_str(label)
    }
}

/// Show the dashboard, then let the user refresh, move or quit.
/// A failed load is reported and can be retried from the menu.
pub async fn interactive<P: WeatherProvider>(
    client: &WeatherClient<P>,
    mut coord: Coordinate,
    hours: usize,
) -> anyhow::Result<()> {
    loop {
        match dashboard::load(client, coord).await {
            Ok(snapshot) => {
                let updated = Local::now().format("%H:%M:%S").to_string();
                println!("{}", dashboard::render(&snapshot, hours, &updated));
            }
            Err(err) => {
                tracing::warn!(error = %err, %coord, "dashboard load failed");
                println!("{}\n", dashboard::FAILURE_NOTICE);
            }
        }

        let action = match Select::new("What next?", Action::ALL.to_vec()).prompt() {
            Ok(action) => action,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };

        match action {
            Action::Refresh => {}
            Action::ChangeLocation => match ask_coordinate(coord) {
                Ok(next) => coord = next,
                Err(err) => println!("{err}"),
            },
            Action::ClearCache => {
                client.clear_cache().await;
                println!("Cache cleared.");
            }
            Action::Quit => return Ok(()),
        }
    }
}

fn ask_coordinate(current: Coordinate) -> anyhow::Result<Coordinate> {
    let lat = CustomType::<f64>::new("Latitude:")
        .with_default(current.latitude())
        .with_help_message("-90 to 90")
        .prompt()?;
    let lon = CustomType::<f64>::new("Longitude:")
        .with_default(current.longitude())
        .with_help_message("-180 to 180")
        .prompt()?;

    Ok(Coordinate::new(lat, lon)?)
}

/// Prompt for the persisted settings and write the config file.
pub fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    config.location = ask_coordinate(config.location)?;

    config.cache.ttl_secs = CustomType::<u64>::new("Cache TTL (seconds):")
        .with_default(config.cache.ttl_secs)
        .with_help_message("must be greater than zero")
        .prompt()?;

    config.api.timeout_secs = CustomType::<u64>::new("Request timeout (seconds):")
        .with_default(config.api.timeout_secs)
        .with_help_message("must be greater than zero")
        .prompt()?;

    let path = config.save().context("Failed to save configuration")?;
    println!("Configuration saved to {}", path.display());

    Ok(())
}
