//! Application configuration.
use crate::{selector::DEFAULT_MIN_QUERY_LEN, Error};
use chrono::{DateTime, Days, NaiveTime, TimeZone, Timelike};
use serde::Deserialize;
use std::{fs, path::Path};
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the backend lives.
    pub base_url: String,
    /// Consumers whose day totals are shown.
    pub consumers: Vec<String>,
    /// Hour (local time) at which a day starts for day totals.
    pub day_start_hour: u32,
    /// Search queries shorter than this don't hit the backend.
    pub min_query_len: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_url: "http://localhost:5000".to_string(),
            consumers: vec!["jake".to_string(), "eric".to_string(), "test".to_string()],
            day_start_hour: 4,
            min_query_len: DEFAULT_MIN_QUERY_LEN,
        }
    }
}

impl Config {
    /// Parses a TOML configuration. Missing keys take their default values.
    pub fn from_toml(text: &str) -> Result<Config, Error> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Config, Error> {
        let path = path.as_ref();
        debug!("loading configuration from {:?}", path);
        let text = fs::read_to_string(path)?;
        Config::from_toml(&text)
    }

    fn validate(&self) -> Result<(), Error> {
        if self.day_start_hour >= 24 {
            return Err(Error::Config(format!(
                "day_start_hour must be between 0 and 23, got {}",
                self.day_start_hour
            )));
        }
        if self.min_query_len == 0 {
            return Err(Error::Config("min_query_len must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// The day containing `now`, for days starting at `start_hour`: from `start_hour` on the day
/// it starts to `start_hour` the next day.
///
/// Returns `None` if the start or end instant doesn't exist in the time zone of `now`.
pub fn day_window<Tz: TimeZone>(now: &DateTime<Tz>, start_hour: u32) -> Option<(DateTime<Tz>, DateTime<Tz>)> {
    let local = now.naive_local();
    let mut day = local.date();
    if local.hour() < start_hour {
        day = day.checked_sub_days(Days::new(1))?;
    }
    let start_time = NaiveTime::from_hms_opt(start_hour, 0, 0)?;
    let start = day.and_time(start_time);
    let end = day.checked_add_days(Days::new(1))?.and_time(start_time);
    let tz = now.timezone();
    Some((
        tz.from_local_datetime(&start).earliest()?,
        tz.from_local_datetime(&end).earliest()?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn defaults_fill_missing_keys() {
        let config = Config::from_toml("consumers = [\"ada\"]").unwrap();
        assert_eq!(config.consumers, ["ada"]);
        assert_eq!(config.base_url, "http://localhost:5000");
        assert_eq!(config.day_start_hour, 4);
        assert_eq!(config.min_query_len, 3);
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(Config::from_toml("day_start_hour = 24"), Err(Error::Config(_))));
        assert!(matches!(Config::from_toml("min_query_len = 0"), Err(Error::Config(_))));
        assert!(matches!(Config::from_toml("consumers = 3"), Err(Error::ConfigSyntax(_))));
    }

    #[test]
    fn missing_file() {
        assert!(matches!(Config::load("/nonexistent/traco.toml"), Err(Error::Io(_))));
    }

    #[test]
    fn day_window_contains_now() {
        let at = |s: &str| s.parse::<DateTime<Utc>>().unwrap();
        let (start, end) = day_window(&at("2024-03-10T13:30:00Z"), 4).unwrap();
        assert_eq!(start, at("2024-03-10T04:00:00Z"));
        assert_eq!(end, at("2024-03-11T04:00:00Z"));

        // before the day starts: still yesterday
        let (start, end) = day_window(&at("2024-03-10T02:15:00Z"), 4).unwrap();
        assert_eq!(start, at("2024-03-09T04:00:00Z"));
        assert_eq!(end, at("2024-03-10T04:00:00Z"));
    }
}
