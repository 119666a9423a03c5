//! Coordinate pairs and the bounding boxes used to gate routing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};
use crate::event::Event;

/// Latitude/longitude bounds outside which routing is suppressed.
pub const UK_LAT_RANGE: (f64, f64) = (49.5, 61.0);
pub const UK_LNG_RANGE: (f64, f64) = (-11.0, 2.0);

/// A WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    #[serde(default = "missing_component", deserialize_with = "lenient_f64")]
    pub lat: f64,
    #[serde(default = "missing_component", deserialize_with = "lenient_f64")]
    pub lng: f64,
}

impl Coordinates {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Both components are finite and inside the global latitude/longitude ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// Valid and inside the box where driving directions are offered.
    pub fn is_uk_eligible(&self) -> bool {
        self.is_valid()
            && (UK_LAT_RANGE.0..=UK_LAT_RANGE.1).contains(&self.lat)
            && (UK_LNG_RANGE.0..=UK_LNG_RANGE.1).contains(&self.lng)
    }

    /// `"lat, lng"` as expected by the search backend's geo origin parameter.
    pub fn to_search_origin(&self) -> String {
        format!("{}, {}", self.lat, self.lng)
    }

    /// Build from a GeoJSON-style `[lng, lat]` position.
    pub fn from_lng_lat(position: [f64; 2]) -> Self {
        Self {
            lat: position[1],
            lng: position[0],
        }
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5},{:.5}", self.lat, self.lng)
    }
}

impl FromStr for Coordinates {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidCoordinates {
            input: s.to_string(),
        };
        let (lat, lng) = s.split_once(',').ok_or_else(invalid)?;
        let lat = lat.trim().parse::<f64>().map_err(|_| invalid())?;
        let lng = lng.trim().parse::<f64>().map_err(|_| invalid())?;
        let coords = Coordinates { lat, lng };
        if coords.is_valid() {
            Ok(coords)
        } else {
            Err(invalid())
        }
    }
}

/// Whether the event has a numeric coordinate pair inside the routing box.
pub fn is_uk_event(event: &Event) -> bool {
    event
        .geoloc
        .map(|coords| coords.is_uk_eligible())
        .unwrap_or(false)
}

/// An absent component decodes like a non-numeric one.
fn missing_component() -> f64 {
    f64::NAN
}

/// Accepts JSON numbers or numeric strings; anything else becomes NaN so the
/// pair never validates.
pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        serde_json::Value::String(s) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
        _ => f64::NAN,
    })
}
