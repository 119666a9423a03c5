//! Marker selection and route overlay coordination on the results map.
//!
//! A [`MapSession`] owns the single route overlay and moves through
//! [`SelectionState`] as markers are clicked and route responses come back.
//! Each route request is identified by a [`RouteTicket`]; only the ticket for
//! the current selection may complete it, so a superseded request can never
//! draw a second overlay.

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::directions::{RouteData, RouteProvider};
use crate::error::Result;
use crate::event::Event;
use crate::geo::{is_uk_event, Coordinates};

/// Where the marker/route interaction currently stands.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SelectionState {
    NoneSelected,
    /// Waiting for the first route of this session.
    Selecting { event_id: String },
    /// Waiting for a route after an earlier one was shown.
    Reselecting { event_id: String },
    Routed { event_id: String, route: RouteData },
    /// Route kept on the map while the event card is hidden.
    RoutedCardClosed { event_id: String, route: RouteData },
    /// Event outside the routing area (or routing failed): card, no route.
    CardOnly { event_id: String },
}

impl SelectionState {
    pub fn event_id(&self) -> Option<&str> {
        match self {
            SelectionState::NoneSelected => None,
            SelectionState::Selecting { event_id }
            | SelectionState::Reselecting { event_id }
            | SelectionState::Routed { event_id, .. }
            | SelectionState::RoutedCardClosed { event_id, .. }
            | SelectionState::CardOnly { event_id } => Some(event_id),
        }
    }

    pub fn route(&self) -> Option<&RouteData> {
        match self {
            SelectionState::Routed { route, .. }
            | SelectionState::RoutedCardClosed { route, .. } => {
                Some(route)
            }
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(
            self,
            SelectionState::Selecting { .. } | SelectionState::Reselecting { .. }
        )
    }

    pub fn card_visible(&self) -> bool {
        matches!(
            self,
            SelectionState::Routed { .. } | SelectionState::CardOnly { .. }
        )
    }

    /// The turn-by-turn panel is shown only for a visible route.
    pub fn route_panel_visible(&self) -> bool {
        matches!(self, SelectionState::Routed { .. })
    }
}

/// The map layer that displays a route line.
pub trait RouteOverlay {
    fn draw(&mut self, route: &RouteData);
    fn remove(&mut self);
}

/// Overlay for contexts with nothing to draw on.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedOverlay;

impl RouteOverlay for DetachedOverlay {
    fn draw(&mut self, _route: &RouteData) {}

    fn remove(&mut self) {}
}

/// Handle for one outstanding route request.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteTicket {
    seq: u64,
    pub origin: Coordinates,
    pub destination: Coordinates,
}

/// Selection state plus the single route overlay it controls.
#[derive(Debug)]
pub struct MapSession<P, O> {
    provider: P,
    overlay: O,
    origin: Coordinates,
    state: SelectionState,
    selected: Option<Event>,
    loaded_once: bool,
    overlay_drawn: bool,
    seq: u64,
    in_flight: Option<u64>,
}

impl<P: RouteProvider, O: RouteOverlay> MapSession<P, O> {
    pub fn new(provider: P, overlay: O, origin: Coordinates) -> Self {
        Self {
            provider,
            overlay,
            origin,
            state: SelectionState::NoneSelected,
            selected: None,
            loaded_once: false,
            overlay_drawn: false,
            seq: 0,
            in_flight: None,
        }
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn selected_event(&self) -> Option<&Event> {
        self.selected.as_ref()
    }

    pub fn origin(&self) -> Coordinates {
        self.origin
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn overlay(&self) -> &O {
        &self.overlay
    }

    fn remove_overlay(&mut self) {
        if self.overlay_drawn {
            self.overlay.remove();
            self.overlay_drawn = false;
        }
    }

    /// Handle a marker click. Returns a ticket when a route must be fetched.
    pub fn click(&mut self, event: &Event) -> Option<RouteTicket> {
        if self.state.event_id() == Some(event.object_id.as_str()) {
            match &self.state {
                SelectionState::RoutedCardClosed { event_id, route } => {
                    self.state = SelectionState::Routed {
                        event_id: event_id.clone(),
                        route: route.clone(),
                    };
                }
                SelectionState::CardOnly { .. } => {
                    self.selected = None;
                    self.state = SelectionState::NoneSelected;
                }
                _ => {}
            }
            return None;
        }

        self.remove_overlay();
        self.in_flight = None;
        self.selected = Some(event.clone());
        let event_id = event.object_id.clone();

        let destination = match event.geoloc {
            Some(destination) if is_uk_event(event) => destination,
            _ => {
                debug!(event = %event_id, "outside routing area; showing card only");
                self.loaded_once = false;
                self.state = SelectionState::CardOnly { event_id };
                return None;
            }
        };

        self.state = if self.loaded_once {
            SelectionState::Reselecting { event_id }
        } else {
            SelectionState::Selecting { event_id }
        };
        self.seq += 1;
        self.in_flight = Some(self.seq);
        Some(RouteTicket {
            seq: self.seq,
            origin: self.origin,
            destination,
        })
    }

    /// Complete a route request. Returns whether the result was applied.
    pub fn route_ready(&mut self, ticket: &RouteTicket, result: Result<RouteData>) -> bool {
        if self.in_flight != Some(ticket.seq) {
            debug!(seq = ticket.seq, "discarding superseded route");
            return false;
        }
        self.in_flight = None;

        let Some(event_id) = self.state.event_id().map(str::to_string) else {
            return false;
        };

        match result {
            Ok(route) => {
                self.remove_overlay();
                self.overlay.draw(&route);
                self.overlay_drawn = true;
                self.loaded_once = true;
                self.state = SelectionState::Routed { event_id, route };
            }
            Err(err) => {
                if err.is_remote() {
                    warn!(event = %event_id, error = %err, "directions service unavailable");
                } else {
                    error!(event = %event_id, error = %err, "route request failed");
                }
                self.state = SelectionState::CardOnly { event_id };
            }
        }
        true
    }

    /// Hide the event card; a routed selection keeps its overlay.
    pub fn close_card(&mut self) {
        match &self.state {
            SelectionState::Routed { event_id, route } => {
                self.state = SelectionState::RoutedCardClosed {
                    event_id: event_id.clone(),
                    route: route.clone(),
                };
            }
            SelectionState::CardOnly { .. } => {
                self.selected = None;
                self.state = SelectionState::NoneSelected;
            }
            _ => {}
        }
    }

    /// Drop the selection and any route.
    pub fn clear(&mut self) {
        self.remove_overlay();
        self.in_flight = None;
        self.selected = None;
        self.state = SelectionState::NoneSelected;
    }

    /// Click and, if needed, fetch the route synchronously.
    pub fn click_and_route(&mut self, event: &Event) -> &SelectionState {
        if let Some(ticket) = self.click(event) {
            let result = self.provider.route(ticket.origin, ticket.destination);
            if self.route_ready(&ticket, result) {
                if let Some(route) = self.state.route() {
                    info!(
                        event = %event.object_id,
                        distance = %route.distance_label(),
                        "route shown"
                    );
                }
            }
        }
        &self.state
    }
}
