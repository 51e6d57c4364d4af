use std::env;
use std::ops::RangeInclusive;
use std::str::FromStr;
use std::time::Duration;

use crate::types::RoomConfig;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// Length of one countdown second; only shortened for local testing
    pub tick_interval: Duration,
    pub room: RoomConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 6573,
            tick_interval: Duration::from_secs(1),
            room: RoomConfig::default(),
        }
    }
}

/// Accepted bounds for the room settings; round 1 always draws 3 letters
pub const MIN_LETTERS: u32 = 3;
pub const MAX_LETTERS: u32 = 26;
pub const MAX_SECONDS_PER_LETTER: u32 = 600;

impl AppConfig {
    /// Load config from ACRODASH_* environment variables, falling back to
    /// defaults for anything unset, unparsable or out of range
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let room = RoomConfig {
            phrase_seconds_per_letter: env_in_range(
                "ACRODASH_PHRASE_SECONDS_PER_LETTER",
                defaults.room.phrase_seconds_per_letter,
                1..=MAX_SECONDS_PER_LETTER,
            ),
            voting_seconds_per_letter: env_in_range(
                "ACRODASH_VOTING_SECONDS_PER_LETTER",
                defaults.room.voting_seconds_per_letter,
                1..=MAX_SECONDS_PER_LETTER,
            ),
            max_letters: env_in_range(
                "ACRODASH_MAX_LETTERS",
                defaults.room.max_letters,
                MIN_LETTERS..=MAX_LETTERS,
            ),
            ..defaults.room
        };

        let tick_millis = env_or("ACRODASH_TICK_MILLIS", 1000u64).max(1);

        Self {
            port: env_or("ACRODASH_PORT", defaults.port),
            tick_interval: Duration::from_millis(tick_millis),
            room,
        }
    }
}

fn env_or<T: FromStr + Copy + std::fmt::Debug>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!("Ignoring invalid {}={:?}, using {:?}", key, raw, default);
                default
            }
        },
        Err(_) => default,
    }
}

fn env_in_range<T>(key: &str, default: T, range: RangeInclusive<T>) -> T
where
    T: FromStr + Copy + PartialOrd + std::fmt::Debug,
{
    let value = env_or(key, default);
    if range.contains(&value) {
        value
    } else {
        tracing::warn!(
            "Ignoring {}={:?} outside {:?}, using {:?}",
            key,
            value,
            range,
            default
        );
        default
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for key in [
            "ACRODASH_PORT",
            "ACRODASH_TICK_MILLIS",
            "ACRODASH_PHRASE_SECONDS_PER_LETTER",
            "ACRODASH_VOTING_SECONDS_PER_LETTER",
            "ACRODASH_MAX_LETTERS",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_defaults_without_env() {
        clear_env();
        let config = AppConfig::from_env();
        assert_eq!(config.port, 6573);
        assert_eq!(config.tick_interval, Duration::from_secs(1));
        assert_eq!(config.room.phrase_seconds_per_letter, 8);
        assert_eq!(config.room.max_letters, 9);
    }

    #[test]
    #[serial]
    fn test_overrides_from_env() {
        clear_env();
        env::set_var("ACRODASH_PORT", "8080");
        env::set_var("ACRODASH_TICK_MILLIS", "250");
        env::set_var("ACRODASH_VOTING_SECONDS_PER_LETTER", "5");
        let config = AppConfig::from_env();
        clear_env();

        assert_eq!(config.port, 8080);
        assert_eq!(config.tick_interval, Duration::from_millis(250));
        assert_eq!(config.room.voting_seconds_per_letter, 5);
        assert_eq!(config.room.voting_fallback_letters, 3);
    }

    #[test]
    #[serial]
    fn test_invalid_value_falls_back() {
        clear_env();
        env::set_var("ACRODASH_MAX_LETTERS", "lots");
        let config = AppConfig::from_env();
        clear_env();

        assert_eq!(config.room.max_letters, 9);
    }

    #[test]
    #[serial]
    fn test_out_of_range_seconds_fall_back() {
        clear_env();
        env::set_var("ACRODASH_PHRASE_SECONDS_PER_LETTER", "4294967295");
        env::set_var("ACRODASH_VOTING_SECONDS_PER_LETTER", "0");
        let config = AppConfig::from_env();
        clear_env();

        assert_eq!(config.room.phrase_seconds_per_letter, 8);
        assert_eq!(config.room.voting_seconds_per_letter, 10);
    }

    #[test]
    #[serial]
    fn test_max_letters_below_minimum_falls_back() {
        clear_env();
        env::set_var("ACRODASH_MAX_LETTERS", "2");
        let config = AppConfig::from_env();
        clear_env();

        assert_eq!(config.room.max_letters, 9);

        env::set_var("ACRODASH_MAX_LETTERS", "3");
        let config = AppConfig::from_env();
        clear_env();

        assert_eq!(config.room.max_letters, 3);
    }
}
