use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

pub use herald_types::api::MAX_PAGE_LIMIT;

const DEFAULT_PAGE_LIMIT: u32 = 20;
const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;
const DEFAULT_DROPDOWN_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    /// Page size used by refreshes and "load more".
    pub page_limit: u32,
    /// Period of the background refresh of page 1.
    pub poll_interval: Duration,
    /// How many items the compact dropdown shows.
    pub dropdown_limit: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            page_limit: DEFAULT_PAGE_LIMIT,
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            dropdown_limit: DEFAULT_DROPDOWN_LIMIT,
        }
    }
}

impl StoreConfig {
    /// Read `HERALD_PAGE_LIMIT`, `HERALD_POLL_INTERVAL_SECS` and
    /// `HERALD_DROPDOWN_LIMIT`, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let page_limit: u32 = parse_or("HERALD_PAGE_LIMIT", &lookup, DEFAULT_PAGE_LIMIT);
        let page_limit = if page_limit == 0 || page_limit > MAX_PAGE_LIMIT {
            warn!(
                "HERALD_PAGE_LIMIT={} outside 1..={}, using {}",
                page_limit, MAX_PAGE_LIMIT, DEFAULT_PAGE_LIMIT
            );
            DEFAULT_PAGE_LIMIT
        } else {
            page_limit
        };

        let poll_secs: u64 =
            parse_or("HERALD_POLL_INTERVAL_SECS", &lookup, DEFAULT_POLL_INTERVAL_SECS);
        // tokio's interval panics on a zero period
        let poll_secs = poll_secs.max(1);

        Self {
            page_limit,
            poll_interval: Duration::from_secs(poll_secs),
            dropdown_limit: parse_or("HERALD_DROPDOWN_LIMIT", &lookup, DEFAULT_DROPDOWN_LIMIT),
        }
    }
}

fn parse_or<T, F>(key: &str, lookup: &F, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring unparseable {}='{}', using {}", key, raw, default);
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = StoreConfig::from_lookup(|_| None);
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.poll_interval, Duration::from_secs(30));
        assert_eq!(config.page_limit, 20);
        assert_eq!(config.dropdown_limit, 5);
    }

    #[test]
    fn reads_overrides() {
        let config = StoreConfig::from_lookup(lookup_from(&[
            ("HERALD_PAGE_LIMIT", "50"),
            ("HERALD_POLL_INTERVAL_SECS", " 10 "),
            ("HERALD_DROPDOWN_LIMIT", "8"),
        ]));
        assert_eq!(config.page_limit, 50);
        assert_eq!(config.poll_interval, Duration::from_secs(10));
        assert_eq!(config.dropdown_limit, 8);
    }

    #[test]
    fn garbage_and_out_of_range_fall_back() {
        let config = StoreConfig::from_lookup(lookup_from(&[
            ("HERALD_PAGE_LIMIT", "500"),
            ("HERALD_POLL_INTERVAL_SECS", "soon"),
        ]));
        assert_eq!(config.page_limit, 20);
        assert_eq!(config.poll_interval, Duration::from_secs(30));

        let config = StoreConfig::from_lookup(lookup_from(&[("HERALD_POLL_INTERVAL_SECS", "0")]));
        assert_eq!(config.poll_interval, Duration::from_secs(1));
    }
}
