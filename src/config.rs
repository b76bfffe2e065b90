use std::env;
use std::time::Duration;

const DEFAULT_API_BASE: &str = "http://localhost:8000";

/// Runtime configuration, built once in `main` and handed to whatever needs it.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base: String,
    pub api_token: String,
    pub request_timeout: Duration,
    pub fetch_parallelism: usize,
    pub carousel_interval: Duration,
    pub carousel_scroll_delay: Duration,
    pub reduced_motion: bool,
    pub utc_offset_hours: i32,
    pub player_min_minutes: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let api_base = lookup("EPL_API_BASE")
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let api_token = lookup("EPL_API_TOKEN")
            .map(|v| v.trim().to_string())
            .unwrap_or_default();

        let timeout_secs = parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 10u64).clamp(1, 120);
        let fetch_parallelism = parse_or(&lookup, "FETCH_PARALLELISM", 5usize).clamp(1, 16);
        let interval_ms = parse_or(&lookup, "CAROUSEL_INTERVAL_MS", 4000u64).max(500);
        let scroll_delay_ms = parse_or(&lookup, "CAROUSEL_SCROLL_DELAY_MS", 600u64).min(interval_ms);
        let utc_offset_hours = parse_or(&lookup, "DISPLAY_UTC_OFFSET", 0i32).clamp(-12, 14);
        let player_min_minutes = parse_or(&lookup, "PLAYER_MIN_MINUTES", 450.0f64).max(0.0);
        let reduced_motion = lookup("REDUCED_MOTION")
            .map(|v| parse_flag(&v))
            .unwrap_or(false);

        Self {
            api_base,
            api_token,
            request_timeout: Duration::from_secs(timeout_secs),
            fetch_parallelism,
            carousel_interval: Duration::from_millis(interval_ms),
            carousel_scroll_delay: Duration::from_millis(scroll_delay_ms),
            reduced_motion,
            utc_offset_hours,
            player_min_minutes,
        }
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    lookup(key)
        .and_then(|val| val.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::AppConfig;
    use std::collections::HashMap;
    use std::time::Duration;

    fn config_with(pairs: &[(&str, &str)]) -> AppConfig {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let cfg = config_with(&[]);
        assert_eq!(cfg.api_base, "http://localhost:8000");
        assert_eq!(cfg.fetch_parallelism, 5);
        assert_eq!(cfg.request_timeout, Duration::from_secs(10));
        assert!(!cfg.reduced_motion);
    }

    #[test]
    fn values_are_trimmed_and_clamped() {
        let cfg = config_with(&[
            ("EPL_API_BASE", " https://api.example.com/ "),
            ("FETCH_PARALLELISM", "64"),
            ("CAROUSEL_INTERVAL_MS", "100"),
            ("CAROUSEL_SCROLL_DELAY_MS", "9000"),
            ("REDUCED_MOTION", "Yes"),
            ("DISPLAY_UTC_OFFSET", "abc"),
        ]);
        assert_eq!(cfg.api_base, "https://api.example.com");
        assert_eq!(cfg.fetch_parallelism, 16);
        assert_eq!(cfg.carousel_interval, Duration::from_millis(500));
        assert_eq!(cfg.carousel_scroll_delay, Duration::from_millis(500));
        assert!(cfg.reduced_motion);
        assert_eq!(cfg.utc_offset_hours, 0);
    }
}
