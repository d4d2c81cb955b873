//! Typed JSON persistence for coordinator snapshots.
//!
//! # Responsibility
//! - Map each persisted entity to its own key and JSON shape.
//! - Apply the best-effort policy: load failures fall back, save failures
//!   are logged and dropped.
//!
//! # Invariants
//! - Keys are versioned (`*_v1`) and never shared between entities.
//! - No method on `StateRepository` returns an error or panics.

use super::kv_store::{KeyValueStore, RepoError, RepoResult};
use crate::model::board::BoardType;
use crate::model::location::AppLocation;
use crate::model::profile::{Profile, ProfileId};
use crate::model::settings::DisplaySettings;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub const PROFILES_KEY: &str = "profiles_v1";
pub const APP_STATE_KEY: &str = "app_state_v1";
pub const DISPLAY_SETTINGS_KEY: &str = "display_settings_v1";
pub const LOCATION_SEEDED_KEY: &str = "location_seeded_v1";

/// Durable projection of the coordinator's selection state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedAppState {
    pub selected_profile_id: Option<ProfileId>,
    pub selected_date: DateTime<Utc>,
    pub selected_board_type: BoardType,
    pub selected_location: AppLocation,
}

/// Typed facade over a `KeyValueStore`.
pub struct StateRepository<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> StateRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Loads the profile list; missing or corrupt data yields `[]`.
    pub fn load_profiles(&self) -> Vec<Profile> {
        self.load_or_fallback(PROFILES_KEY).unwrap_or_default()
    }

    pub fn save_profiles(&self, profiles: &[Profile]) {
        self.save_best_effort(PROFILES_KEY, profiles);
    }

    pub fn load_app_state(&self) -> Option<PersistedAppState> {
        self.load_or_fallback(APP_STATE_KEY)
    }

    pub fn save_app_state(&self, state: &PersistedAppState) {
        self.save_best_effort(APP_STATE_KEY, state);
    }

    pub fn load_display_settings(&self) -> Option<DisplaySettings> {
        self.load_or_fallback(DISPLAY_SETTINGS_KEY)
    }

    pub fn save_display_settings(&self, settings: &DisplaySettings) {
        self.save_best_effort(DISPLAY_SETTINGS_KEY, settings);
    }

    /// Loads the one-shot seeding flag; defaults to `false`.
    pub fn load_location_seeded(&self) -> bool {
        self.load_or_fallback(LOCATION_SEEDED_KEY).unwrap_or(false)
    }

    pub fn save_location_seeded(&self, seeded: bool) {
        self.save_best_effort(LOCATION_SEEDED_KEY, &seeded);
    }

    /// Strict typed load. `Ok(None)` when the key was never written.
    pub fn try_load<T: DeserializeOwned>(&self, key: &str) -> RepoResult<Option<T>> {
        let Some(bytes) = self.store.load(key)? else {
            return Ok(None);
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| RepoError::Decode {
                key: key.to_string(),
                source,
            })
    }

    /// Strict typed save.
    pub fn try_save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> RepoResult<()> {
        let bytes = serde_json::to_vec(value).map_err(|source| RepoError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.store.save(key, &bytes)
    }

    fn load_or_fallback<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.try_load(key) {
            Ok(Some(value)) => {
                debug!("event=state_load module=repo status=ok key={key}");
                Some(value)
            }
            Ok(None) => {
                debug!("event=state_load module=repo status=missing key={key}");
                None
            }
            Err(err) => {
                warn!("event=state_load module=repo status=fallback key={key} error={err}");
                None
            }
        }
    }

    fn save_best_effort<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        if let Err(err) = self.try_save(key, value) {
            warn!("event=state_save module=repo status=dropped key={key} error={err}");
        }
    }
}
