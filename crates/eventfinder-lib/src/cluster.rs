//! Greedy marker clustering in Web Mercator pixel space.

use std::f64::consts::PI;

use serde::Serialize;

use crate::event::Event;
use crate::geo::Coordinates;

/// Pixel radius within which markers are merged.
pub const DEFAULT_CLUSTER_RADIUS_PX: f64 = 80.0;

/// Zoom level the results map opens at.
pub const DEFAULT_ZOOM: u8 = 8;

const TILE_SIZE: f64 = 256.0;
const MAX_SIN_LAT: f64 = 0.9999;

/// Project onto the Web Mercator pixel plane at `zoom`.
pub fn project(coordinates: Coordinates, zoom: u8) -> (f64, f64) {
    let scale = TILE_SIZE * 2f64.powi(i32::from(zoom));
    let x = (coordinates.lng + 180.0) / 360.0 * scale;
    let sin_lat = (coordinates.lat * PI / 180.0)
        .sin()
        .clamp(-MAX_SIN_LAT, MAX_SIN_LAT);
    let y = (0.5 - ((1.0 + sin_lat) / (1.0 - sin_lat)).ln() / (4.0 * PI)) * scale;
    (x, y)
}

/// A group of nearby markers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cluster {
    /// Mean position of the members.
    pub center: Coordinates,
    pub members: Vec<String>,
}

impl Cluster {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_single(&self) -> bool {
        self.members.len() == 1
    }
}

struct Seed {
    pixel: (f64, f64),
    lat_sum: f64,
    lng_sum: f64,
    members: Vec<String>,
}

/// Assign each point to the first cluster whose seed lies within `radius_px`,
/// otherwise start a new cluster. Invalid coordinates are skipped.
pub fn cluster_points<I, S>(points: I, zoom: u8, radius_px: f64) -> Vec<Cluster>
where
    I: IntoIterator<Item = (S, Coordinates)>,
    S: Into<String>,
{
    let mut seeds: Vec<Seed> = Vec::new();
    for (id, coordinates) in points {
        if !coordinates.is_valid() {
            continue;
        }
        let pixel = project(coordinates, zoom);
        let existing = seeds.iter_mut().find(|seed| {
            let dx = seed.pixel.0 - pixel.0;
            let dy = seed.pixel.1 - pixel.1;
            (dx * dx + dy * dy).sqrt() <= radius_px
        });
        match existing {
            Some(seed) => {
                seed.lat_sum += coordinates.lat;
                seed.lng_sum += coordinates.lng;
                seed.members.push(id.into());
            }
            None => seeds.push(Seed {
                pixel,
                lat_sum: coordinates.lat,
                lng_sum: coordinates.lng,
                members: vec![id.into()],
            }),
        }
    }

    seeds
        .into_iter()
        .map(|seed| {
            let n = seed.members.len() as f64;
            Cluster {
                center: Coordinates::new(seed.lat_sum / n, seed.lng_sum / n),
                members: seed.members,
            }
        })
        .collect()
}

/// Cluster the events that carry a usable position.
pub fn cluster_events<'a, I>(events: I, zoom: u8, radius_px: f64) -> Vec<Cluster>
where
    I: IntoIterator<Item = &'a Event>,
{
    cluster_points(
        events
            .into_iter()
            .filter_map(|event| event.geoloc.map(|geo| (event.object_id.clone(), geo))),
        zoom,
        radius_px,
    )
}
