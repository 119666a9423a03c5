//! One-shot "use my location": device position, then a reverse geocode.
//!
//! The two hops are explicit steps guarded by a [`LocateToken`]; a result
//! carrying a token from an earlier or cancelled attempt is ignored.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::Result;
use crate::geo::Coordinates;
use crate::geocode::{Geocoder, CURRENT_LOCATION_LABEL};

/// Why the device could not report a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PositionError {
    #[error("permission denied")]
    PermissionDenied,
    #[error("position unavailable")]
    Unavailable,
    #[error("geolocation not supported")]
    Unsupported,
}

/// Device position provider.
pub trait PositionSource {
    fn current_position(&self) -> std::result::Result<Coordinates, PositionError>;
}

/// Position source with a predetermined answer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedPosition {
    outcome: std::result::Result<Coordinates, PositionError>,
}

impl FixedPosition {
    pub fn at(coordinates: Coordinates) -> Self {
        Self {
            outcome: Ok(coordinates),
        }
    }

    pub fn failing(error: PositionError) -> Self {
        Self {
            outcome: Err(error),
        }
    }
}

impl PositionSource for FixedPosition {
    fn current_position(&self) -> std::result::Result<Coordinates, PositionError> {
        self.outcome
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GeolocationState {
    Idle,
    Locating,
    Resolved {
        label: String,
        coordinates: Coordinates,
    },
    Denied {
        message: String,
    },
    Failed {
        message: String,
    },
}

/// Identifies one locate attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocateToken(u64);

#[derive(Debug)]
pub struct GeolocationResolver {
    state: GeolocationState,
    attempt: u64,
    position: Option<Coordinates>,
}

impl Default for GeolocationResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl GeolocationResolver {
    pub fn new() -> Self {
        Self {
            state: GeolocationState::Idle,
            attempt: 0,
            position: None,
        }
    }

    pub fn state(&self) -> &GeolocationState {
        &self.state
    }

    pub fn is_locating(&self) -> bool {
        self.state == GeolocationState::Locating
    }

    /// Begin a new attempt, superseding any in flight.
    pub fn start(&mut self) -> LocateToken {
        self.attempt += 1;
        self.position = None;
        self.state = GeolocationState::Locating;
        LocateToken(self.attempt)
    }

    fn is_current(&self, token: LocateToken) -> bool {
        token.0 == self.attempt && self.is_locating()
    }

    /// Feed the device result. Returns the position to reverse geocode.
    pub fn on_position(
        &mut self,
        token: LocateToken,
        result: std::result::Result<Coordinates, PositionError>,
    ) -> Option<Coordinates> {
        if !self.is_current(token) {
            debug!(attempt = token.0, "ignoring stale position");
            return None;
        }
        match result {
            Ok(coordinates) => {
                self.position = Some(coordinates);
                Some(coordinates)
            }
            Err(PositionError::Unsupported) => {
                self.state = GeolocationState::Failed {
                    message: "Geolocation not supported.".to_string(),
                };
                None
            }
            Err(err) => {
                debug!(error = %err, "device position refused");
                self.state = GeolocationState::Denied {
                    message: "Permission denied or location unavailable.".to_string(),
                };
                None
            }
        }
    }

    /// Feed the reverse-geocode result.
    pub fn on_label(&mut self, token: LocateToken, result: Result<Option<String>>) {
        if !self.is_current(token) {
            debug!(attempt = token.0, "ignoring stale place label");
            return;
        }
        let Some(coordinates) = self.position else {
            return;
        };
        self.state = match result {
            Ok(label) => GeolocationState::Resolved {
                label: label.unwrap_or_else(|| CURRENT_LOCATION_LABEL.to_string()),
                coordinates,
            },
            Err(err) => {
                warn!(error = %err, "reverse geocode failed");
                GeolocationState::Failed {
                    message: "Failed to reverse geocode.".to_string(),
                }
            }
        };
    }

    /// Abandon the attempt in flight; late results are ignored.
    pub fn cancel(&mut self) {
        self.attempt += 1;
        self.position = None;
        if self.is_locating() {
            self.state = GeolocationState::Idle;
        }
    }

    /// Run the whole chain synchronously.
    pub fn locate<P, G>(&mut self, source: &P, geocoder: &G) -> &GeolocationState
    where
        P: PositionSource + ?Sized,
        G: Geocoder + ?Sized,
    {
        let token = self.start();
        if let Some(coordinates) = self.on_position(token, source.current_position()) {
            let label = geocoder.reverse(coordinates);
            self.on_label(token, label);
        }
        &self.state
    }
}
