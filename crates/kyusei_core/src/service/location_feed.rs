//! Hand-off of device location events onto the coordinator thread.
//!
//! # Responsibility
//! - Give background location callbacks a cloneable, `Send` sink.
//! - Let the coordinator drain queued events on its own thread.
//!
//! # Invariants
//! - Events are applied in send order.
//! - Nothing touches coordinator state until `drain` is called by its owner.

use crate::model::location::Coordinate;
use std::sync::mpsc::{channel, Receiver, Sender};

/// Authorization reported by the OS location collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationAuthorization {
    NotDetermined,
    Denied,
    Restricted,
    AuthorizedWhenInUse,
    AuthorizedAlways,
}

impl LocationAuthorization {
    /// Whether coordinates can be delivered at all.
    pub fn is_available(self) -> bool {
        matches!(self, Self::AuthorizedWhenInUse | Self::AuthorizedAlways)
    }
}

/// One push from the location collaborator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationEvent {
    pub authorization: LocationAuthorization,
    pub coordinate: Option<Coordinate>,
}

/// How a `LocationEvent` should affect the current coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CoordinateUpdate {
    /// Record this value (`None` clears the known coordinate).
    Set(Option<Coordinate>),
    /// Authorization-only event with nothing to record.
    Ignore,
}

impl LocationEvent {
    pub fn fix(coordinate: Coordinate) -> Self {
        Self {
            authorization: LocationAuthorization::AuthorizedWhenInUse,
            coordinate: Some(coordinate),
        }
    }

    pub fn authorization_changed(authorization: LocationAuthorization) -> Self {
        Self {
            authorization,
            coordinate: None,
        }
    }

    /// Losing authorization clears the coordinate; an authorized event
    /// without a fix leaves it untouched.
    pub fn coordinate_update(&self) -> CoordinateUpdate {
        match (self.authorization.is_available(), self.coordinate) {
            (false, _) => CoordinateUpdate::Set(None),
            (true, Some(coordinate)) => CoordinateUpdate::Set(Some(coordinate)),
            (true, None) => CoordinateUpdate::Ignore,
        }
    }
}

/// Sending half handed to background location callbacks.
#[derive(Debug, Clone)]
pub struct LocationFeed {
    sender: Sender<LocationEvent>,
}

impl LocationFeed {
    /// Creates a connected feed/inbox pair.
    pub fn channel() -> (LocationFeed, LocationInbox) {
        let (sender, receiver) = channel();
        (LocationFeed { sender }, LocationInbox { receiver })
    }

    /// Queues one event. Returns `false` once the inbox is gone.
    pub fn push(&self, event: LocationEvent) -> bool {
        self.sender.send(event).is_ok()
    }
}

/// Receiving half owned by the coordinator.
#[derive(Debug)]
pub struct LocationInbox {
    receiver: Receiver<LocationEvent>,
}

impl LocationInbox {
    /// Takes every queued event without blocking.
    pub fn drain(&self) -> Vec<LocationEvent> {
        self.receiver.try_iter().collect()
    }
}
