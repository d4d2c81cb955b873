//! Application state coordinator.
//!
//! # Responsibility
//! - Own every user-visible field: date, board type, profiles, settings,
//!   location.
//! - Enforce cross-entity invariants (profile selection is always valid).
//! - Persist the affected snapshot synchronously after each mutation.
//! - Recompute the board on every read through a `BoardEngine`.
//!
//! # Invariants
//! - No save is issued while loading; `ready` flips only after every field
//!   has been populated and normalized.
//! - Startup ends with exactly one flush of profiles, app state and
//!   settings.
//! - Persistence failures never fail a mutation.
//!
//! # Threading
//! - All methods run on the owner's thread (`&mut self`, no locks).
//! - Background location callbacks go through `LocationFeed`; queued
//!   events are applied by `pump_location_events`.

use crate::config::CoreConfig;
use crate::engine::{BoardEngine, StubBoardEngine};
use crate::model::board::{Board, BoardType};
use crate::model::calendar::{step_days, utc_zone};
use crate::model::location::{AppLocation, Coordinate};
use crate::model::profile::{Profile, ProfileId};
use crate::model::settings::{DisplaySettings, MapStyle};
use crate::repo::kv_store::KeyValueStore;
use crate::repo::state_repo::{PersistedAppState, StateRepository};
use crate::service::location_feed::{CoordinateUpdate, LocationFeed, LocationInbox};
use crate::state::location_state::{LocationMutation, LocationState};
use crate::state::profile_store::{ProfileMutation, ProfileStore};
use crate::state::settings_store::SettingsStore;
use chrono::{DateTime, FixedOffset, Utc};
use log::{debug, info};
use std::time::Instant;

/// Construction options for `AppStateCoordinator`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinatorOptions {
    /// Zone used for calendar-day comparisons and date stepping.
    pub calendar_zone: FixedOffset,
    /// Fallback `selected_date` when no snapshot exists; `None` means now.
    pub launch_time: Option<DateTime<Utc>>,
}

impl Default for CoordinatorOptions {
    fn default() -> Self {
        Self {
            calendar_zone: utc_zone(),
            launch_time: None,
        }
    }
}

impl From<&CoreConfig> for CoordinatorOptions {
    fn from(config: &CoreConfig) -> Self {
        Self {
            calendar_zone: config.calendar_zone,
            launch_time: None,
        }
    }
}

/// Owned read-only view handed to presentation collaborators.
#[derive(Debug, Clone, PartialEq)]
pub struct AppSnapshot {
    pub selected_date: DateTime<Utc>,
    pub selected_board_type: BoardType,
    pub profiles: Vec<Profile>,
    pub selected_profile_id: Option<ProfileId>,
    pub selected_location: AppLocation,
    pub current_coordinate: Option<Coordinate>,
    pub display_settings: DisplaySettings,
}

/// Single source of truth for application state.
pub struct AppStateCoordinator<S: KeyValueStore, E: BoardEngine = StubBoardEngine> {
    repo: StateRepository<S>,
    engine: E,
    calendar_zone: FixedOffset,
    selected_date: DateTime<Utc>,
    selected_board_type: BoardType,
    profiles: ProfileStore,
    settings: SettingsStore,
    location: LocationState,
    location_feed: LocationFeed,
    location_inbox: LocationInbox,
    ready: bool,
}

impl<S: KeyValueStore> AppStateCoordinator<S, StubBoardEngine> {
    /// Opens a coordinator with the placeholder engine in `options`' zone.
    pub fn with_stub_engine(store: S, options: CoordinatorOptions) -> Self {
        let engine = StubBoardEngine::new(options.calendar_zone);
        Self::open(store, engine, options)
    }
}

impl<S: KeyValueStore, E: BoardEngine> AppStateCoordinator<S, E> {
    /// Loads persisted state, normalizes it and writes one startup snapshot.
    pub fn open(store: S, engine: E, options: CoordinatorOptions) -> Self {
        let started_at = Instant::now();
        let repo = StateRepository::new(store);

        let profiles = repo.load_profiles();
        let snapshot = repo.load_app_state();
        let display_settings = repo.load_display_settings().unwrap_or_default();
        let has_seeded = repo.load_location_seeded();

        let launch_time = options.launch_time.unwrap_or_else(Utc::now);
        let (selected_date, selected_board_type, selected_profile_id, selected_location) =
            match snapshot {
                Some(state) => (
                    state.selected_date,
                    state.selected_board_type,
                    state.selected_profile_id,
                    state.selected_location,
                ),
                None => (launch_time, BoardType::Day, None, AppLocation::default()),
            };

        let (location_feed, location_inbox) = LocationFeed::channel();
        let mut coordinator = Self {
            repo,
            engine,
            calendar_zone: options.calendar_zone,
            selected_date,
            selected_board_type,
            profiles: ProfileStore::new(profiles, selected_profile_id, options.calendar_zone),
            settings: SettingsStore::new(display_settings),
            location: LocationState::new(selected_location, has_seeded),
            location_feed,
            location_inbox,
            ready: false,
        };

        coordinator.profiles.normalize();
        coordinator.ready = true;
        coordinator.flush();

        info!(
            "event=state_open module=service status=ok profiles={} has_selection={} seeded={} duration_ms={}",
            coordinator.profiles.profiles().len(),
            coordinator.profiles.selected_profile_id().is_some(),
            coordinator.location.has_seeded(),
            started_at.elapsed().as_millis()
        );
        coordinator
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn store(&self) -> &S {
        self.repo.store()
    }

    pub fn calendar_zone(&self) -> FixedOffset {
        self.calendar_zone
    }

    /// Computes the board for the current selection. Never cached.
    pub fn current_board(&self) -> Board {
        let anonymous;
        let profile = match self.profiles.selected_profile() {
            Some(profile) => profile,
            None => {
                anonymous = Profile::anonymous();
                &anonymous
            }
        };
        self.engine
            .make_board(profile, self.selected_date, self.selected_board_type)
    }

    pub fn selected_date(&self) -> DateTime<Utc> {
        self.selected_date
    }

    pub fn set_selected_date(&mut self, date: DateTime<Utc>) {
        self.selected_date = date;
        self.persist_app_state();
    }

    /// Moves the selected date by whole days within the supported range.
    pub fn step_selected_date(&mut self, days: i64) -> DateTime<Utc> {
        self.set_selected_date(step_days(self.selected_date, days, self.calendar_zone));
        self.selected_date
    }

    pub fn selected_board_type(&self) -> BoardType {
        self.selected_board_type
    }

    pub fn set_selected_board_type(&mut self, board_type: BoardType) {
        self.selected_board_type = board_type;
        self.persist_app_state();
    }

    pub fn profiles(&self) -> &[Profile] {
        self.profiles.profiles()
    }

    pub fn selected_profile_id(&self) -> Option<ProfileId> {
        self.profiles.selected_profile_id()
    }

    pub fn selected_profile(&self) -> Option<&Profile> {
        self.profiles.selected_profile()
    }

    /// Adds (or re-selects) the profile for `birth_date`; returns its ID.
    pub fn add_profile(&mut self, birth_date: DateTime<Utc>, name: impl Into<String>) -> ProfileId {
        let added = self.profiles.add_profile(birth_date, name);
        debug!(
            "event=profile_add module=service status=ok created={}",
            added.created
        );
        self.persist_profile_mutation(added.mutation);
        added.id
    }

    pub fn delete_profiles(&mut self, ids: &[ProfileId]) {
        let mutation = self.profiles.delete_profiles(ids);
        self.persist_profile_mutation(mutation);
    }

    /// Deletes by list position, as list swipe-to-delete reports it.
    pub fn delete_profiles_at(&mut self, offsets: &[usize]) {
        let mutation = self.profiles.delete_profiles_at(offsets);
        self.persist_profile_mutation(mutation);
    }

    pub fn select_profile(&mut self, id: ProfileId) {
        self.profiles.select_profile(id);
        self.persist_app_state();
    }

    pub fn display_settings(&self) -> &DisplaySettings {
        self.settings.display_settings()
    }

    pub fn set_overlay_opacity(&mut self, opacity: f64) {
        self.settings.set_overlay_opacity(opacity);
        self.persist_settings();
    }

    pub fn set_map_style(&mut self, style: MapStyle) {
        self.settings.set_map_style(style);
        self.persist_settings();
    }

    pub fn set_display_settings(&mut self, settings: DisplaySettings) {
        self.settings.replace(settings);
        self.persist_settings();
    }

    pub fn selected_location(&self) -> &AppLocation {
        self.location.selected_location()
    }

    pub fn current_coordinate(&self) -> Option<Coordinate> {
        self.location.current_coordinate()
    }

    pub fn has_seeded_location(&self) -> bool {
        self.location.has_seeded()
    }

    /// Records the device coordinate; may seed the selected location once.
    pub fn update_current_coordinate(&mut self, coordinate: Option<Coordinate>) {
        let mutation = self.location.update_current_coordinate(coordinate);
        if mutation.seeded_now {
            info!("event=location_seed module=service status=ok");
        }
        self.persist_location_mutation(mutation, false);
    }

    pub fn update_selected_location(&mut self, location: AppLocation) {
        let mutation = self.location.update_selected_location(location);
        self.persist_location_mutation(mutation, true);
    }

    /// Selects the current device coordinate under `name`.
    ///
    /// Returns `false` without changing state when no coordinate is known.
    pub fn set_to_current_coordinate(&mut self, name: Option<String>) -> bool {
        match self.location.set_to_current_coordinate(name) {
            Some(mutation) => {
                self.persist_location_mutation(mutation, true);
                true
            }
            None => {
                debug!("event=location_select_current module=service status=unavailable");
                false
            }
        }
    }

    /// Sink for background location callbacks.
    pub fn location_feed(&self) -> LocationFeed {
        self.location_feed.clone()
    }

    /// Applies queued location events in order; returns how many were
    /// drained.
    pub fn pump_location_events(&mut self) -> usize {
        let events = self.location_inbox.drain();
        for event in &events {
            if let CoordinateUpdate::Set(coordinate) = event.coordinate_update() {
                self.update_current_coordinate(coordinate);
            }
        }
        events.len()
    }

    /// Durable projection written under the app-state key.
    pub fn persisted_state(&self) -> PersistedAppState {
        PersistedAppState {
            selected_profile_id: self.profiles.selected_profile_id(),
            selected_date: self.selected_date,
            selected_board_type: self.selected_board_type,
            selected_location: self.location.selected_location().clone(),
        }
    }

    pub fn snapshot(&self) -> AppSnapshot {
        AppSnapshot {
            selected_date: self.selected_date,
            selected_board_type: self.selected_board_type,
            profiles: self.profiles.profiles().to_vec(),
            selected_profile_id: self.profiles.selected_profile_id(),
            selected_location: self.location.selected_location().clone(),
            current_coordinate: self.location.current_coordinate(),
            display_settings: *self.settings.display_settings(),
        }
    }

    fn flush(&self) {
        if !self.ready {
            return;
        }
        self.repo.save_profiles(self.profiles.profiles());
        self.repo.save_app_state(&self.persisted_state());
        self.repo.save_display_settings(self.settings.display_settings());
    }

    fn persist_profile_mutation(&self, mutation: ProfileMutation) {
        if !self.ready {
            return;
        }
        self.repo.save_profiles(self.profiles.profiles());
        if mutation.selection_changed {
            self.repo.save_app_state(&self.persisted_state());
        }
    }

    fn persist_location_mutation(&self, mutation: LocationMutation, explicit: bool) {
        if !self.ready {
            return;
        }
        if explicit || mutation.location_changed {
            self.repo.save_app_state(&self.persisted_state());
        }
        if mutation.seeded_now {
            self.repo.save_location_seeded(true);
        }
    }

    fn persist_app_state(&self) {
        if !self.ready {
            return;
        }
        self.repo.save_app_state(&self.persisted_state());
    }

    fn persist_settings(&self) {
        if !self.ready {
            return;
        }
        self.repo.save_display_settings(self.settings.display_settings());
    }
}

impl<S: KeyValueStore, E: BoardEngine> std::fmt::Debug for AppStateCoordinator<S, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppStateCoordinator")
            .field("ready", &self.ready)
            .field("selected_date", &self.selected_date)
            .field("selected_board_type", &self.selected_board_type)
            .field("profiles", &self.profiles.profiles().len())
            .field("selected_profile_id", &self.profiles.selected_profile_id())
            .finish()
    }
}
