//! Forward, reverse and autocomplete geocoding against the Mapbox places API.

use reqwest::blocking::Client;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::MapboxConfig;
use crate::error::{Error, Result};
use crate::geo::Coordinates;
use crate::http::{build_client, check_status};

const SERVICE: &str = "geocoding";
const PLACES_ENDPOINT: &str = "https://api.mapbox.com/geocoding/v5/mapbox.places";

/// Maximum number of candidates returned by [`Geocoder::suggest`].
pub const SUGGESTION_LIMIT: usize = 5;

/// Label used when a position cannot be resolved to a place name.
pub const CURRENT_LOCATION_LABEL: &str = "Current location";

/// One place candidate offered while typing a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationSuggestion {
    pub name: String,
    pub context: String,
    pub place_name: String,
    pub lat: f64,
    pub lng: f64,
}

impl LocationSuggestion {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lng)
    }
}

/// Geocoding operations used by the search session and geolocation resolver.
pub trait Geocoder {
    /// Best single match for a place name.
    fn forward(&self, name: &str) -> Result<Option<Coordinates>>;

    /// Up to [`SUGGESTION_LIMIT`] candidates for a partial place name.
    fn suggest(&self, partial: &str) -> Result<Vec<LocationSuggestion>>;

    /// Place label for a position, if the service knows one.
    fn reverse(&self, coordinates: Coordinates) -> Result<Option<String>>;
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    text: String,
    #[serde(default)]
    place_name: String,
    center: [f64; 2],
    #[serde(default)]
    context: Vec<ContextEntry>,
}

#[derive(Debug, Deserialize)]
struct ContextEntry {
    #[serde(default)]
    text: String,
}

impl From<Feature> for LocationSuggestion {
    fn from(feature: Feature) -> Self {
        let context = feature
            .context
            .iter()
            .map(|entry| entry.text.as_str())
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(", ");
        let context = if context.is_empty() {
            feature.place_name.clone()
        } else {
            context
        };
        let position = Coordinates::from_lng_lat(feature.center);
        Self {
            name: feature.text,
            context,
            place_name: feature.place_name,
            lat: position.lat,
            lng: position.lng,
        }
    }
}

fn places_url(token: &str, query_segment: &str, params: &[(&str, &str)]) -> Result<Url> {
    let mut url = Url::parse(PLACES_ENDPOINT).map_err(|err| Error::InvalidUrl {
        url: PLACES_ENDPOINT.to_string(),
        message: err.to_string(),
    })?;
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.push(&format!("{query_segment}.json"));
    }
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("access_token", token);
        for (key, value) in params {
            query.append_pair(key, value);
        }
    }
    Ok(url)
}

/// URL for a single best-match forward lookup.
pub fn forward_url(token: &str, name: &str) -> Result<Url> {
    places_url(token, name, &[("limit", "1"), ("types", "place")])
}

/// URL for the autocomplete lookup.
pub fn suggest_url(token: &str, partial: &str) -> Result<Url> {
    let limit = SUGGESTION_LIMIT.to_string();
    places_url(
        token,
        partial,
        &[
            ("autocomplete", "true"),
            ("limit", limit.as_str()),
            ("types", "place"),
        ],
    )
}

/// URL for a reverse lookup; the path carries `lng,lat`.
pub fn reverse_url(token: &str, coordinates: Coordinates) -> Result<Url> {
    let position = format!("{},{}", coordinates.lng, coordinates.lat);
    places_url(token, &position, &[("types", "place"), ("limit", "1")])
}

/// Blocking Mapbox places client.
#[derive(Debug, Clone)]
pub struct MapboxGeocoder {
    client: Client,
    access_token: String,
}

impl MapboxGeocoder {
    pub fn new(config: &MapboxConfig) -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            access_token: config.access_token.clone(),
        })
    }

    fn fetch(&self, url: Url) -> Result<FeatureCollection> {
        let response = self.client.get(url).send()?;
        let response = check_status(SERVICE, response)?;
        Ok(response.json()?)
    }
}

impl Geocoder for MapboxGeocoder {
    fn forward(&self, name: &str) -> Result<Option<Coordinates>> {
        let collection = self.fetch(forward_url(&self.access_token, name)?)?;
        let found = collection
            .features
            .first()
            .map(|feature| Coordinates::from_lng_lat(feature.center));
        debug!(name, found = found.is_some(), "forward geocode");
        Ok(found)
    }

    fn suggest(&self, partial: &str) -> Result<Vec<LocationSuggestion>> {
        let collection = self.fetch(suggest_url(&self.access_token, partial)?)?;
        Ok(collection
            .features
            .into_iter()
            .take(SUGGESTION_LIMIT)
            .map(LocationSuggestion::from)
            .collect())
    }

    fn reverse(&self, coordinates: Coordinates) -> Result<Option<String>> {
        let collection = self.fetch(reverse_url(&self.access_token, coordinates)?)?;
        Ok(collection
            .features
            .into_iter()
            .next()
            .map(|feature| feature.place_name)
            .filter(|name| !name.is_empty()))
    }
}
