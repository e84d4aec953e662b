//! Terminal rendering of the weather dashboard.
//!
//! Everything here returns `String`s so the layout can be tested without a terminal.

use meteo_core::{
    Coordinate, CurrentConditions, DailyPoint, FetchError, ForecastSeries, HourlyPoint,
    WeatherClient, WeatherProvider,
};
use tracing::warn;

/// Shown when current conditions cannot be loaded.
pub const FAILURE_NOTICE: &str = "Failed to load weather data. Please try again.";

const NA: &str = "N/A";
const CHART_HEIGHT: usize = 8;

/// Everything one dashboard view needs.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub coord: Coordinate,
    pub current: CurrentConditions,
    pub forecast: Option<ForecastSeries>,
}

/// Current conditions are required; the forecast is best-effort.
pub async fn load<P: WeatherProvider>(
    client: &WeatherClient<P>,
    coord: Coordinate,
) -> Result<Snapshot, FetchError> {
    let current = client.fetch_current(coord).await?;

    let forecast = match client.fetch_forecast(coord).await {
        Ok(series) => Some(series),
        Err(err) => {
            warn!(error = %err, "forecast unavailable, showing current conditions only");
            None
        }
    };

    Ok(Snapshot { coord, current, forecast })
}

pub fn render(snapshot: &Snapshot, hours: usize, updated_at: &str) -> String {
    let mut out = format!(
        "Selected location: latitude {:.4}, longitude {:.4} (updated {updated_at})\n\n",
        snapshot.coord.latitude(),
        snapshot.coord.longitude(),
    );

    out.push_str(&render_cards(&snapshot.current));

    if let Some(forecast) = &snapshot.forecast {
        let next = forecast.next_hours(hours);

        out.push_str(&format!("\nHourly forecast (next {} hours)\n", next.len()));
        out.push_str(&render_hourly_table(next));
        out.push('\n');
        out.push_str(&render_chart(next, CHART_HEIGHT));

        if !forecast.daily.is_empty() {
            out.push_str("\nDaily forecast\n");
            out.push_str(&render_daily_table(&forecast.daily));
        }
    }

    out
}

pub fn render_cards(current: &CurrentConditions) -> String {
    let cards = [
        ("Temperature", value_or_na(current.temperature, "°C")),
        ("Wind speed", value_or_na(current.wind_speed, " km/h")),
        ("Wind direction", value_or_na(current.wind_direction, "°")),
        ("Weather", current.description().to_string()),
    ];

    let widths: Vec<usize> = cards
        .iter()
        .map(|(title, value)| title.chars().count().max(value.chars().count()) + 2)
        .collect();

    let mut border: String = widths.iter().map(|w| format!("+{}", "-".repeat(*w))).collect();
    border.push_str("+\n");

    let mut out = border.clone();
    out.push_str(&card_row(cards.iter().map(|(title, _)| *title), &widths));
    out.push_str(&card_row(cards.iter().map(|(_, value)| value.as_str()), &widths));
    out.push_str(&border);
    out
}

fn card_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let mut line = String::new();
    for (cell, width) in cells.zip(widths) {
        line.push_str(&format!("| {:<w$}", cell, w = width - 1));
    }
    line.push_str("|\n");
    line
}

pub fn render_hourly_table(hours: &[HourlyPoint]) -> String {
    let mut out = format!(
        "{:<6} {:>10} {:>13} {:>11}\n",
        "Time", "Temp (°C)", "Humidity (%)", "Precip (%)"
    );
    for hour in hours {
        out.push_str(&format!(
            "{:<6} {:>10} {:>13} {:>11}\n",
            hour.clock_label(),
            value_or_na(hour.temperature, ""),
            value_or_na(hour.humidity, ""),
            value_or_na(hour.precipitation_probability, ""),
        ));
    }
    out
}

pub fn render_daily_table(days: &[DailyPoint]) -> String {
    let mut out = format!(
        "{:<10} {:>9} {:>9} {:>8} {:>8}\n",
        "Date", "Min (°C)", "Max (°C)", "Sunrise", "Sunset"
    );
    for day in days {
        out.push_str(&format!(
            "{:<10} {:>9} {:>9} {:>8} {:>8}\n",
            day.date,
            value_or_na(day.temp_min, ""),
            value_or_na(day.temp_max, ""),
            day.sunrise_clock().unwrap_or(NA),
            day.sunset_clock().unwrap_or(NA),
        ));
    }
    out
}

/// Plot temperatures as a text line chart, one column per hour.
pub fn render_chart(hours: &[HourlyPoint], height: usize) -> String {
    let (min, max) = hours
        .iter()
        .filter_map(|h| h.temperature)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), t| (lo.min(t), hi.max(t)));

    if !min.is_finite() {
        return "No temperature data\n".to_string();
    }

    let height = height.max(2);
    let span = max - min;
    let levels: Vec<Option<usize>> = hours
        .iter()
        .map(|h| {
            h.temperature.map(|t| {
                if span > 0.0 {
                    ((t - min) / span * (height - 1) as f64).round() as usize
                } else {
                    0
                }
            })
        })
        .collect();

    let mut out = String::new();
    for row in (0..height).rev() {
        let mut line = if row == height - 1 {
            format!("{max:>6.1} |")
        } else if row == 0 {
            format!("{min:>6.1} |")
        } else {
            format!("{:>6} |", "")
        };

        for level in &levels {
            line.push_str(if *level == Some(row) { " *" } else { "  " });
        }

        out.push_str(line.trim_end());
        out.push('\n');
    }

    out.push_str(&format!("{:>6} +{}\n", "", "-".repeat(levels.len() * 2)));
    out.push_str(&time_axis(hours));
    out
}

/// `HH:MM` labels under every sixth column.
fn time_axis(hours: &[HourlyPoint]) -> String {
    let origin = 9;
    let mut axis: Vec<char> = vec![' '; origin + hours.len() * 2 + 5];

    for (i, hour) in hours.iter().enumerate().step_by(6) {
        let start = origin + i * 2;
        for (offset, ch) in hour.clock_label().chars().enumerate() {
            if let Some(slot) = axis.get_mut(start + offset) {
                *slot = ch;
            }
        }
    }

    let mut line: String = axis.into_iter().collect();
    line.truncate(line.trim_end().len());
    line.push('\n');
    line
}

fn value_or_na(value: Option<f64>, unit: &str) -> String {
    value.map_or_else(|| NA.to_string(), |v| format!("{v}{unit}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use meteo_core::NetworkCause;

    fn hour(time: &str, temp: Option<f64>) -> HourlyPoint {
        HourlyPoint {
            time: time.to_string(),
            temperature: temp,
            humidity: Some(55.0),
            precipitation_probability: Some(0.0),
        }
    }

    fn seoul() -> Coordinate {
        Coordinate::new(37.5665, 126.978).unwrap()
    }

    #[test]
    fn cards_show_values_and_description() {
        let current = CurrentConditions {
            temperature: Some(-1.5),
            wind_speed: Some(9.7),
            wind_direction: Some(315.0),
            weather_code: Some(61),
            ..Default::default()
        };
        let cards = render_cards(&current);

        assert!(cards.contains("-1.5°C"));
        assert!(cards.contains("9.7 km/h"));
        assert!(cards.contains("315°"));
        assert!(cards.contains("Rain: light"));
        assert_eq!(cards.lines().count(), 4);
    }

    #[test]
    fn cards_render_missing_values_as_na() {
        let cards = render_cards(&CurrentConditions::default());
        assert_eq!(cards.matches(NA).count(), 3);
        // absent code reads as clear
        assert!(cards.contains("Clear"));
    }

    #[test]
    fn card_rows_line_up() {
        let cards = render_cards(&CurrentConditions {
            temperature: Some(12.25),
            weather_code: Some(99),
            ..Default::default()
        });
        let widths: Vec<usize> = cards.lines().map(|l| l.chars().count()).collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]), "{cards}");
    }

    #[test]
    fn hourly_table_uses_clock_labels() {
        let table = render_hourly_table(&[
            hour("2024-01-15T00:00", Some(1.0)),
            hour("2024-01-15T01:00", None),
        ]);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Time"));
        assert!(lines[1].starts_with("00:00"));
        assert!(lines[2].starts_with("01:00"));
        assert!(lines[2].contains(NA));
    }

    #[test]
    fn daily_table_shows_sun_times() {
        let table = render_daily_table(&[DailyPoint {
            date: "2024-01-15".into(),
            temp_max: Some(3.0),
            temp_min: Some(-6.0),
            sunrise: Some("2024-01-15T07:46".into()),
            sunset: None,
        }]);

        assert!(table.contains("2024-01-15"));
        assert!(table.contains("07:46"));
        assert!(table.contains("-6"));
        assert!(table.contains(NA));
    }

    #[test]
    fn chart_places_extremes_on_labelled_rows() {
        let hours = [
            hour("2024-01-15T00:00", Some(0.0)),
            hour("2024-01-15T01:00", Some(1.0)),
            hour("2024-01-15T02:00", Some(2.0)),
        ];
        let chart = render_chart(&hours, 3);
        let lines: Vec<&str> = chart.lines().collect();

        assert_eq!(lines[0], "   2.0 |     *");
        assert_eq!(lines[1], "       |   *");
        assert_eq!(lines[2], "   0.0 | *");
        assert_eq!(lines[3], "       +------");
        assert_eq!(lines[4], "         00:00");
    }

    #[test]
    fn chart_skips_gaps_and_handles_flat_series() {
        let hours = [hour("2024-01-15T00:00", Some(5.0)), hour("2024-01-15T01:00", None)];
        let chart = render_chart(&hours, 4);
        assert_eq!(chart.matches('*').count(), 1);

        let empty = render_chart(&[hour("2024-01-15T00:00", None)], 4);
        assert_eq!(empty, "No temperature data\n");
    }

    #[test]
    fn render_without_forecast_shows_cards_only() {
        let snapshot = Snapshot {
            coord: seoul(),
            current: CurrentConditions { temperature: Some(3.0), ..Default::default() },
            forecast: None,
        };
        let out = render(&snapshot, 24, "12:00");

        assert!(out.contains("latitude 37.5665, longitude 126.9780"));
        assert!(out.contains("3°C"));
        assert!(!out.contains("Hourly forecast"));
    }

    #[test]
    fn render_truncates_to_requested_hours() {
        let hourly: Vec<_> = (0..48)
            .map(|h| hour(&format!("2024-01-{:02}T{:02}:00", 15 + h / 24, h % 24), Some(1.0)))
            .collect();
        let snapshot = Snapshot {
            coord: seoul(),
            current: CurrentConditions::default(),
            forecast: Some(ForecastSeries { hourly, ..Default::default() }),
        };
        let out = render(&snapshot, 24, "12:00");

        assert!(out.contains("next 24 hours"));
        assert!(out.contains("\n23:00 "));
        // only the first day's midnight row
        assert_eq!(out.matches("\n00:00 ").count(), 1);
    }

    #[derive(Debug)]
    struct FlakyForecast;

    #[async_trait]
    impl WeatherProvider for FlakyForecast {
        async fn current(&self, _coord: Coordinate) -> Result<CurrentConditions, FetchError> {
            Ok(CurrentConditions { temperature: Some(10.0), ..Default::default() })
        }

        async fn forecast(&self, _coord: Coordinate) -> Result<ForecastSeries, FetchError> {
            Err(FetchError::Network(NetworkCause::Timeout))
        }
    }

    #[derive(Debug)]
    struct Down;

    #[async_trait]
    impl WeatherProvider for Down {
        async fn current(&self, _coord: Coordinate) -> Result<CurrentConditions, FetchError> {
            Err(FetchError::Http(500))
        }

        async fn forecast(&self, _coord: Coordinate) -> Result<ForecastSeries, FetchError> {
            Err(FetchError::Http(500))
        }
    }

    #[tokio::test]
    async fn load_tolerates_forecast_failure() {
        let client = WeatherClient::with_ttl(FlakyForecast, chrono::Duration::hours(1));
        let snapshot = load(&client, seoul()).await.unwrap();

        assert_eq!(snapshot.current.temperature, Some(10.0));
        assert!(snapshot.forecast.is_none());
    }

    #[tokio::test]
    async fn load_fails_when_current_fails() {
        let client = WeatherClient::with_ttl(Down, chrono::Duration::hours(1));
        let err = load(&client, seoul()).await.unwrap_err();
        assert_eq!(err, FetchError::Http(500));
    }
}
