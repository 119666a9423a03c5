//! Driving directions between two coordinates.
//!
//! The Mapbox directions payload is reduced to a [`RouteData`]: totals, an
//! ordered list of maneuver steps and the full path geometry. Step positions
//! fall back to the path geometry (and, for the first step, the origin
//! waypoint) when the maneuver carries no location of its own.

use std::fmt;

use reqwest::blocking::Client;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::MapboxConfig;
use crate::error::{Error, Result};
use crate::geo::Coordinates;
use crate::http::{build_client, check_status};

const SERVICE: &str = "directions";
const DIRECTIONS_ENDPOINT: &str = "https://api.mapbox.com/directions/v5/mapbox/driving";

/// Metres per statute mile.
pub const METRES_PER_MILE: f64 = 1609.34;

/// `"12.34 mi"`.
pub fn format_miles(metres: f64) -> String {
    format!("{:.2} mi", metres / METRES_PER_MILE)
}

/// `"17 min"`.
pub fn format_minutes(seconds: f64) -> String {
    format!("{} min", (seconds / 60.0).round() as i64)
}

/// Maneuver category of one step, used to pick the step icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ManeuverKind {
    Head,
    Continue,
    Straight,
    Left,
    Right,
    SlightLeft,
    SlightRight,
    SharpLeft,
    SharpRight,
    Uturn,
    Roundabout,
    Merge,
    Fork,
    OffRamp,
    EndOfRoad,
    DestinationReached,
    Turn,
}

impl ManeuverKind {
    /// Map a maneuver `type` and optional `modifier` onto a step kind.
    pub fn from_maneuver(kind: &str, modifier: Option<&str>) -> Self {
        match kind {
            "depart" => ManeuverKind::Head,
            "arrive" => ManeuverKind::DestinationReached,
            "roundabout" | "rotary" | "roundabout turn" | "exit roundabout" | "exit rotary" => {
                ManeuverKind::Roundabout
            }
            "merge" => ManeuverKind::Merge,
            "fork" => ManeuverKind::Fork,
            "on ramp" | "off ramp" => ManeuverKind::OffRamp,
            "end of road" => ManeuverKind::EndOfRoad,
            "continue" | "new name" => match modifier {
                None | Some("straight") => ManeuverKind::Continue,
                Some(other) => Self::from_modifier(other),
            },
            _ => modifier.map_or(ManeuverKind::Turn, Self::from_modifier),
        }
    }

    fn from_modifier(modifier: &str) -> Self {
        match modifier {
            "uturn" => ManeuverKind::Uturn,
            "sharp right" => ManeuverKind::SharpRight,
            "right" => ManeuverKind::Right,
            "slight right" => ManeuverKind::SlightRight,
            "straight" => ManeuverKind::Straight,
            "slight left" => ManeuverKind::SlightLeft,
            "left" => ManeuverKind::Left,
            "sharp left" => ManeuverKind::SharpLeft,
            _ => ManeuverKind::Turn,
        }
    }

    pub fn icon_class(self) -> &'static str {
        match self {
            ManeuverKind::Head => "directions-icon-head",
            ManeuverKind::Continue
            | ManeuverKind::Straight
            | ManeuverKind::Merge
            | ManeuverKind::Fork => "directions-icon-continue",
            ManeuverKind::Left => "directions-icon-left",
            ManeuverKind::Right => "directions-icon-right",
            ManeuverKind::SlightLeft | ManeuverKind::OffRamp => "directions-icon-slight-left",
            ManeuverKind::SlightRight => "directions-icon-slight-right",
            ManeuverKind::SharpLeft => "directions-icon-sharp-left",
            ManeuverKind::SharpRight => "directions-icon-sharp-right",
            ManeuverKind::Uturn => "directions-icon-uturn",
            ManeuverKind::Roundabout => "directions-icon-roundabout",
            ManeuverKind::EndOfRoad => "directions-icon-waypoint",
            ManeuverKind::DestinationReached => "directions-icon-arrive",
            ManeuverKind::Turn => "directions-icon-turn",
        }
    }
}

impl fmt::Display for ManeuverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// One turn-by-turn instruction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteStep {
    pub coordinates: Option<Coordinates>,
    pub instruction: String,
    pub distance_m: f64,
    pub maneuver: ManeuverKind,
    /// Offset of the step's first point within [`RouteData::geometry`].
    pub index: usize,
}

impl RouteStep {
    /// Empty for zero-length steps such as the arrival.
    pub fn distance_label(&self) -> String {
        if self.distance_m > 0.0 {
            format_miles(self.distance_m)
        } else {
            String::new()
        }
    }
}

/// A computed driving route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteData {
    pub distance_m: f64,
    pub duration_s: f64,
    pub steps: Vec<RouteStep>,
    pub geometry: Vec<Coordinates>,
}

impl RouteData {
    pub fn distance_label(&self) -> String {
        format_miles(self.distance_m)
    }

    pub fn duration_label(&self) -> String {
        format_minutes(self.duration_s)
    }

    /// The two path points highlighted when a step is picked.
    pub fn segment(&self, step: &RouteStep) -> Option<[Coordinates; 2]> {
        let start = *self.geometry.get(step.index)?;
        let end = *self.geometry.get(step.index + 1)?;
        Some([start, end])
    }
}

/// Anything that can compute a driving route.
pub trait RouteProvider {
    fn route(&self, origin: Coordinates, destination: Coordinates) -> Result<RouteData>;
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<ApiRoute>,
    #[serde(default)]
    waypoints: Vec<ApiWaypoint>,
}

#[derive(Debug, Deserialize)]
struct ApiRoute {
    distance: f64,
    duration: f64,
    #[serde(default)]
    geometry: Option<LineString>,
    #[serde(default)]
    legs: Vec<ApiLeg>,
}

#[derive(Debug, Default, Deserialize)]
struct LineString {
    #[serde(default)]
    coordinates: Vec<[f64; 2]>,
}

#[derive(Debug, Deserialize)]
struct ApiLeg {
    #[serde(default)]
    steps: Vec<ApiStep>,
}

#[derive(Debug, Deserialize)]
struct ApiStep {
    #[serde(default)]
    distance: f64,
    maneuver: ApiManeuver,
    #[serde(default)]
    geometry: Option<LineString>,
}

#[derive(Debug, Deserialize)]
struct ApiManeuver {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    modifier: Option<String>,
    #[serde(default)]
    instruction: String,
    #[serde(default)]
    location: Option<[f64; 2]>,
}

#[derive(Debug, Deserialize)]
struct ApiWaypoint {
    location: [f64; 2],
}

/// Reduce a raw directions payload to the first route.
pub fn parse_directions(payload: &str) -> Result<RouteData> {
    let response: DirectionsResponse = serde_json::from_str(payload)?;
    if !response.code.is_empty() && response.code != "Ok" {
        return Err(Error::UnexpectedResponse {
            service: SERVICE,
            message: response.message.unwrap_or(response.code),
        });
    }

    let origin = response
        .waypoints
        .first()
        .map(|waypoint| Coordinates::from_lng_lat(waypoint.location));
    let route = response
        .routes
        .into_iter()
        .next()
        .ok_or_else(|| Error::UnexpectedResponse {
            service: SERVICE,
            message: "no route found".to_string(),
        })?;

    let geometry: Vec<Coordinates> = route
        .geometry
        .unwrap_or_default()
        .coordinates
        .into_iter()
        .map(Coordinates::from_lng_lat)
        .collect();

    let mut steps = Vec::new();
    let mut index = 0;
    for step in route.legs.into_iter().flat_map(|leg| leg.steps) {
        let coordinates = step
            .maneuver
            .location
            .map(Coordinates::from_lng_lat)
            .or_else(|| geometry.get(index).copied())
            .or_else(|| if index == 0 { origin } else { None });

        steps.push(RouteStep {
            coordinates,
            instruction: step.maneuver.instruction,
            distance_m: step.distance,
            maneuver: ManeuverKind::from_maneuver(
                &step.maneuver.kind,
                step.maneuver.modifier.as_deref(),
            ),
            index,
        });

        let points = step.geometry.map_or(0, |line| line.coordinates.len());
        index += points.saturating_sub(1);
    }

    Ok(RouteData {
        distance_m: route.distance,
        duration_s: route.duration,
        steps,
        geometry,
    })
}

/// URL for a driving route from `origin` to `destination`.
pub fn directions_url(token: &str, origin: Coordinates, destination: Coordinates) -> Result<Url> {
    let raw = format!(
        "{DIRECTIONS_ENDPOINT}/{},{};{},{}",
        origin.lng, origin.lat, destination.lng, destination.lat
    );
    let mut url = Url::parse(&raw).map_err(|err| Error::InvalidUrl {
        url: raw.clone(),
        message: err.to_string(),
    })?;
    url.query_pairs_mut()
        .append_pair("steps", "true")
        .append_pair("geometries", "geojson")
        .append_pair("overview", "full")
        .append_pair("language", "en")
        .append_pair("access_token", token);
    Ok(url)
}

/// Blocking Mapbox directions client.
#[derive(Debug, Clone)]
pub struct MapboxDirections {
    client: Client,
    access_token: String,
}

impl MapboxDirections {
    pub fn new(config: &MapboxConfig) -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            access_token: config.access_token.clone(),
        })
    }
}

impl RouteProvider for MapboxDirections {
    fn route(&self, origin: Coordinates, destination: Coordinates) -> Result<RouteData> {
        debug!(%origin, %destination, "requesting driving route");
        let url = directions_url(&self.access_token, origin, destination)?;
        let response = self.client.get(url).send()?;
        let response = check_status(SERVICE, response)?;
        let route = parse_directions(&response.text()?)?;
        info!(
            distance = %route.distance_label(),
            duration = %route.duration_label(),
            steps = route.steps.len(),
            "route computed"
        );
        Ok(route)
    }
}
