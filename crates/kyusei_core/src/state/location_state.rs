//! Device coordinate, selected map location and one-shot seeding.
//!
//! # Responsibility
//! - Track the latest device coordinate and the user-chosen location.
//! - Adopt the first device fix as the selected location exactly once.
//!
//! # Invariants
//! - Seeding only fires while `has_seeded == false` and the selected
//!   location still equals `AppLocation::default()`.
//! - Any explicit location choice marks seeding as done.

use crate::model::location::{AppLocation, Coordinate, CURRENT_LOCATION_NAME};

/// Change report returned by `LocationState` mutations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocationMutation {
    pub location_changed: bool,
    /// Seeding flag flipped from `false` to `true` during this call.
    pub seeded_now: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocationState {
    selected_location: AppLocation,
    current_coordinate: Option<Coordinate>,
    has_seeded: bool,
}

impl Default for LocationState {
    fn default() -> Self {
        Self::new(AppLocation::default(), false)
    }
}

impl LocationState {
    pub fn new(selected_location: AppLocation, has_seeded: bool) -> Self {
        Self {
            selected_location,
            current_coordinate: None,
            has_seeded,
        }
    }

    pub fn selected_location(&self) -> &AppLocation {
        &self.selected_location
    }

    pub fn current_coordinate(&self) -> Option<Coordinate> {
        self.current_coordinate
    }

    pub fn has_seeded(&self) -> bool {
        self.has_seeded
    }

    /// Records the latest device coordinate, seeding on the first fix.
    pub fn update_current_coordinate(
        &mut self,
        coordinate: Option<Coordinate>,
    ) -> LocationMutation {
        self.current_coordinate = coordinate;

        let Some(coordinate) = coordinate else {
            return LocationMutation::default();
        };
        if self.has_seeded || !self.selected_location.is_default() {
            return LocationMutation::default();
        }

        self.selected_location =
            AppLocation::from_coordinate(coordinate, Some(CURRENT_LOCATION_NAME.to_string()));
        self.has_seeded = true;
        LocationMutation {
            location_changed: true,
            seeded_now: true,
        }
    }

    /// Sets the selected location explicitly and disables future seeding.
    pub fn update_selected_location(&mut self, location: AppLocation) -> LocationMutation {
        let location_changed = self.selected_location != location;
        let seeded_now = !self.has_seeded;
        self.selected_location = location;
        self.has_seeded = true;
        LocationMutation {
            location_changed,
            seeded_now,
        }
    }

    /// Copies the current coordinate into the selected location.
    ///
    /// Returns `None` without touching state when no coordinate is known.
    pub fn set_to_current_coordinate(&mut self, name: Option<String>) -> Option<LocationMutation> {
        let coordinate = self.current_coordinate?;
        Some(self.update_selected_location(AppLocation::from_coordinate(coordinate, name)))
    }
}
