//! WMO weather codes as reported by Open-Meteo.
//!
//! See <https://open-meteo.com/en/docs> for the code reference.

use serde::{Deserialize, Serialize};

/// Label returned for any code outside the known table.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// The weather codes the dashboard knows how to describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCode {
    Clear,
    MainlyClear,
    PartlyCloudy,
    Overcast,
    Fog,
    RimeFog,
    DrizzleLight,
    DrizzleModerate,
    DrizzleDense,
    RainLight,
    RainModerate,
    RainHeavy,
    ShowersSlight,
    ShowersModerate,
    ShowersViolent,
    Thunderstorm,
    ThunderstormHailSlight,
    ThunderstormHailHeavy,
}

impl WeatherCode {
    pub const fn all() -> &'static [WeatherCode] {
        &[
            WeatherCode::Clear,
            WeatherCode::MainlyClear,
            WeatherCode::PartlyCloudy,
            WeatherCode::Overcast,
            WeatherCode::Fog,
            WeatherCode::RimeFog,
            WeatherCode::DrizzleLight,
            WeatherCode::DrizzleModerate,
            WeatherCode::DrizzleDense,
            WeatherCode::RainLight,
            WeatherCode::RainModerate,
            WeatherCode::RainHeavy,
            WeatherCode::ShowersSlight,
            WeatherCode::ShowersModerate,
            WeatherCode::ShowersViolent,
            WeatherCode::Thunderstorm,
            WeatherCode::ThunderstormHailSlight,
            WeatherCode::ThunderstormHailHeavy,
        ]
    }

    /// Map a raw provider code, `None` when the code is not in the table.
    pub const fn from_code(code: i32) -> Option<Self> {
        let known = match code {
            0 => Self::Clear,
            1 => Self::MainlyClear,
            2 => Self::PartlyCloudy,
            3 => Self::Overcast,
            45 => Self::Fog,
            48 => Self::RimeFog,
            51 => Self::DrizzleLight,
            53 => Self::DrizzleModerate,
            55 => Self::DrizzleDense,
            61 => Self::RainLight,
            63 => Self::RainModerate,
            65 => Self::RainHeavy,
            80 => Self::ShowersSlight,
            81 => Self::ShowersModerate,
            82 => Self::ShowersViolent,
            95 => Self::Thunderstorm,
            96 => Self::ThunderstormHailSlight,
            99 => Self::ThunderstormHailHeavy,
            _ => return None,
        };
        Some(known)
    }

    pub const fn code(&self) -> i32 {
        match self {
            Self::Clear => 0,
            Self::MainlyClear => 1,
            Self::PartlyCloudy => 2,
            Self::Overcast => 3,
            Self::Fog => 45,
            Self::RimeFog => 48,
            Self::DrizzleLight => 51,
            Self::DrizzleModerate => 53,
            Self::DrizzleDense => 55,
            Self::RainLight => 61,
            Self::RainModerate => 63,
            Self::RainHeavy => 65,
            Self::ShowersSlight => 80,
            Self::ShowersModerate => 81,
            Self::ShowersViolent => 82,
            Self::Thunderstorm => 95,
            Self::ThunderstormHailSlight => 96,
            Self::ThunderstormHailHeavy => 99,
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::MainlyClear => "Mainly clear",
            Self::PartlyCloudy => "Partly cloudy",
            Self::Overcast => "Overcast",
            Self::Fog => "Fog",
            Self::RimeFog => "Depositing rime fog",
            Self::DrizzleLight => "Drizzle: light",
            Self::DrizzleModerate => "Drizzle: moderate",
            Self::DrizzleDense => "Drizzle: dense",
            Self::RainLight => "Rain: light",
            Self::RainModerate => "Rain: moderate",
            Self::RainHeavy => "Rain: heavy",
            Self::ShowersSlight => "Rain showers: slight",
            Self::ShowersModerate => "Rain showers: moderate",
            Self::ShowersViolent => "Rain showers: violent",
            Self::Thunderstorm => "Thunderstorm",
            Self::ThunderstormHailSlight => "Thunderstorm with hail: slight",
            Self::ThunderstormHailHeavy => "Thunderstorm with hail: heavy",
        }
    }
}

impl std::fmt::Display for WeatherCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Describe a raw weather code. Never fails: unknown codes map to [`UNKNOWN_LABEL`].
pub fn describe(code: i32) -> &'static str {
    WeatherCode::from_code(code).map_or(UNKNOWN_LABEL, |c| c.label())
}
