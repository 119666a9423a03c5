//! Credentials and settings resolved from the environment.
//!
//! Every constructor has a `*_from_lookup` variant taking a closure so tests can
//! resolve configuration without touching the process environment.

use std::env;
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::geo::Coordinates;

pub const ALGOLIA_APP_ID_ENV: &str = "PUBLIC_ALGOLIA_APP_ID";
pub const ALGOLIA_SEARCH_KEY_ENV: &str = "PUBLIC_ALGOLIA_SEARCH_KEY";
pub const ALGOLIA_INDEX_NAME_ENV: &str = "PUBLIC_ALGOLIA_INDEX_NAME";
pub const ALGOLIA_HITS_PER_PAGE_ENV: &str = "PUBLIC_ALGOLIA_HITS_PER_PAGE";
pub const ALGOLIA_ADMIN_KEY_ENV: &str = "ALGOLIA_ADMIN_KEY";
pub const ALGOLIA_ADMIN_INDEX_ENV: &str = "ALGOLIA_INDEX_NAME";
pub const MAPBOX_TOKEN_ENV: &str = "PUBLIC_MAPBOX_API_KEY";
pub const STORYBLOK_TOKEN_ENV: &str = "PUBLIC_STORYBLOK_TOKEN";
pub const ORIGIN_ENV: &str = "EVENTFINDER_ORIGIN";
pub const DATA_DIR_ENV: &str = "EVENTFINDER_DATA_DIR";

/// Page size used when `PUBLIC_ALGOLIA_HITS_PER_PAGE` is unset.
pub const DEFAULT_HITS_PER_PAGE: usize = 12;

/// Routing origin used when `EVENTFINDER_ORIGIN` is unset (Manchester, M3 1AR).
pub const DEFAULT_ORIGIN: Coordinates = Coordinates::new(53.488245593667486, -2.243694288138583);

fn process_env(var: &str) -> Option<String> {
    env::var(var).ok()
}

fn required<F>(lookup: &F, var: &'static str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or(Error::MissingConfig { var })
}

fn optional<F>(lookup: &F, var: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Credentials for the hosted search index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlgoliaConfig {
    pub app_id: String,
    pub api_key: String,
    pub index_name: String,
    pub hits_per_page: usize,
}

impl AlgoliaConfig {
    /// Search-only credentials used by the query side.
    pub fn search_from_env() -> Result<Self> {
        Self::search_from_lookup(process_env)
    }

    pub fn search_from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let app_id = required(&lookup, ALGOLIA_APP_ID_ENV)?;
        let api_key = required(&lookup, ALGOLIA_SEARCH_KEY_ENV)?;
        let index_name = required(&lookup, ALGOLIA_INDEX_NAME_ENV)?;
        let hits_per_page = match optional(&lookup, ALGOLIA_HITS_PER_PAGE_ENV) {
            None => DEFAULT_HITS_PER_PAGE,
            Some(raw) => match raw.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(Error::InvalidConfig {
                        var: ALGOLIA_HITS_PER_PAGE_ENV,
                        value: raw,
                        reason: "expected a positive integer".to_string(),
                    })
                }
            },
        };

        Ok(Self {
            app_id,
            api_key,
            index_name,
            hits_per_page,
        })
    }

    /// Write credentials used by the indexing pipeline.
    pub fn admin_from_env() -> Result<Self> {
        Self::admin_from_lookup(process_env)
    }

    pub fn admin_from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            app_id: required(&lookup, ALGOLIA_APP_ID_ENV)?,
            api_key: required(&lookup, ALGOLIA_ADMIN_KEY_ENV)?,
            index_name: required(&lookup, ALGOLIA_ADMIN_INDEX_ENV)?,
            hits_per_page: DEFAULT_HITS_PER_PAGE,
        })
    }
}

/// Access token for geocoding and directions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapboxConfig {
    pub access_token: String,
}

impl MapboxConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(process_env)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            access_token: required(&lookup, MAPBOX_TOKEN_ENV)?,
        })
    }
}

/// Delivery token for the CMS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryblokConfig {
    pub access_token: String,
}

impl StoryblokConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(process_env)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            access_token: required(&lookup, STORYBLOK_TOKEN_ENV)?,
        })
    }
}

/// Routing origin from `EVENTFINDER_ORIGIN`, or the fixed default location.
pub fn default_origin() -> Result<Coordinates> {
    origin_from_lookup(process_env)
}

pub fn origin_from_lookup<F>(lookup: F) -> Result<Coordinates>
where
    F: Fn(&str) -> Option<String>,
{
    match optional(&lookup, ORIGIN_ENV) {
        None => Ok(DEFAULT_ORIGIN),
        Some(raw) => raw.parse().map_err(|_| Error::InvalidConfig {
            var: ORIGIN_ENV,
            value: raw,
            reason: "expected LAT,LNG".to_string(),
        }),
    }
}

/// Settings that do not belong to a hosted service.
///
/// Service credentials are resolved separately, per command, so a command only
/// fails on the variables it actually needs.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Override for the durable-storage directory.
    pub data_dir: Option<PathBuf>,
    /// Starting point for driving directions.
    pub origin: Coordinates,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(process_env)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            data_dir: optional(&lookup, DATA_DIR_ENV).map(PathBuf::from),
            origin: origin_from_lookup(&lookup)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn search_config_defaults_page_size() {
        let config = AlgoliaConfig::search_from_lookup(lookup(&[
            (ALGOLIA_APP_ID_ENV, "APP"),
            (ALGOLIA_SEARCH_KEY_ENV, "key"),
            (ALGOLIA_INDEX_NAME_ENV, "events"),
        ]))
        .unwrap();
        assert_eq!(config.hits_per_page, 12);
        assert_eq!(config.index_name, "events");
    }

    #[test]
    fn blank_values_count_as_missing() {
        let err = AlgoliaConfig::search_from_lookup(lookup(&[
            (ALGOLIA_APP_ID_ENV, "APP"),
            (ALGOLIA_SEARCH_KEY_ENV, "   "),
            (ALGOLIA_INDEX_NAME_ENV, "events"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            Error::MissingConfig {
                var: ALGOLIA_SEARCH_KEY_ENV
            }
        ));
    }

    #[test]
    fn bad_page_size_is_invalid() {
        let err = AlgoliaConfig::search_from_lookup(lookup(&[
            (ALGOLIA_APP_ID_ENV, "APP"),
            (ALGOLIA_SEARCH_KEY_ENV, "key"),
            (ALGOLIA_INDEX_NAME_ENV, "events"),
            (ALGOLIA_HITS_PER_PAGE_ENV, "lots"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }

    #[test]
    fn admin_config_needs_admin_key() {
        let err = AlgoliaConfig::admin_from_lookup(lookup(&[
            (ALGOLIA_APP_ID_ENV, "APP"),
            (ALGOLIA_ADMIN_INDEX_ENV, "events"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains(ALGOLIA_ADMIN_KEY_ENV));
    }

    #[test]
    fn app_config_reads_data_dir_and_origin() {
        let config = AppConfig::from_lookup(lookup(&[
            (DATA_DIR_ENV, "/tmp/events"),
            (ORIGIN_ENV, "53.8, -1.55"),
        ]))
        .unwrap();
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/events")));
        assert_eq!(config.origin, Coordinates::new(53.8, -1.55));

        let config = AppConfig::from_lookup(lookup(&[(DATA_DIR_ENV, " ")])).unwrap();
        assert_eq!(config.data_dir, None);
        assert_eq!(config.origin, DEFAULT_ORIGIN);
    }

    #[test]
    fn origin_defaults_and_parses() {
        assert_eq!(origin_from_lookup(lookup(&[])).unwrap(), DEFAULT_ORIGIN);
        assert_eq!(
            origin_from_lookup(lookup(&[(ORIGIN_ENV, "51.5,-0.12")])).unwrap(),
            Coordinates::new(51.5, -0.12)
        );
        assert!(origin_from_lookup(lookup(&[(ORIGIN_ENV, "x")])).is_err());
    }
}
