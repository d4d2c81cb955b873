//! Core domain logic for the Kyusei board app.
//! This crate is the single source of truth for board computation and
//! application state invariants.

pub mod config;
pub mod db;
pub mod engine;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod state;

pub use config::{ConfigError, CoreConfig};
pub use engine::{markers_for_star, BoardEngine, StubBoardEngine};
pub use logging::{init_logging, logging_status};
pub use model::board::{Board, BoardCell, BoardType, Direction, Marker};
pub use model::location::{AppLocation, Coordinate, CURRENT_LOCATION_NAME};
pub use model::profile::{Profile, ProfileId};
pub use model::settings::{DisplaySettings, MapStyle};
pub use repo::kv_store::{
    KeyValueStore, MemoryKeyValueStore, RepoError, RepoResult, SqliteKeyValueStore,
};
pub use repo::state_repo::{
    PersistedAppState, StateRepository, APP_STATE_KEY, DISPLAY_SETTINGS_KEY, LOCATION_SEEDED_KEY,
    PROFILES_KEY,
};
pub use service::app_state::{AppSnapshot, AppStateCoordinator, CoordinatorOptions};
pub use service::location_feed::{LocationAuthorization, LocationEvent, LocationFeed};
pub use state::profile_store::normalize_selection;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
