//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the app state coordinator to Dart via FRB.
//! - Translate core values into flat, FRB-friendly envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - State mutations run on the caller's (UI isolate) thread; only
//!   `push_location_event` may be called from elsewhere.
//! - Queued location events are applied before every coordinator call.

use chrono::{DateTime, Utc};
use kyusei_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    AppLocation, AppStateCoordinator, Board, BoardCell, BoardType, Coordinate, CoordinatorOptions,
    CoreConfig, LocationAuthorization, LocationEvent, LocationFeed, MapStyle, Marker, Profile,
    ProfileId, SqliteKeyValueStore,
};
use log::{info, warn};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

type App = AppStateCoordinator<SqliteKeyValueStore>;

static APP: Mutex<Option<App>> = Mutex::new(None);
// Kept apart from `APP` so background pushes never wait on UI calls.
static LOCATION_FEED: Mutex<Option<LocationFeed>> = Mutex::new(None);

const NOT_OPEN_MESSAGE: &str = "app state is not open; call app_open first";

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Generic mutation result envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Affected profile ID, when the action concerns one.
    pub id: Option<String>,
    /// Human-readable message for diagnostics/UI.
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            id: None,
            message: message.into(),
        }
    }

    fn success_with_id(message: impl Into<String>, id: ProfileId) -> Self {
        Self {
            ok: true,
            id: Some(id.to_string()),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            id: None,
            message: message.into(),
        }
    }
}

/// Result envelope for date-moving calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateResponse {
    pub ok: bool,
    /// Selected date after the call, Unix epoch milliseconds.
    pub epoch_ms: i64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileItem {
    pub id: String,
    pub name: String,
    pub birth_date_epoch_ms: i64,
    pub created_at_epoch_ms: i64,
    pub is_selected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocationItem {
    pub latitude: f64,
    pub longitude: f64,
    pub name: Option<String>,
}

/// Read-only application snapshot for screens.
#[derive(Debug, Clone, PartialEq)]
pub struct AppSnapshotResponse {
    pub ok: bool,
    pub message: String,
    pub selected_date_epoch_ms: i64,
    /// `year|month|day`.
    pub board_type: String,
    pub board_title: String,
    /// Newest first.
    pub profiles: Vec<ProfileItem>,
    pub selected_profile_id: Option<String>,
    pub selected_location: Option<LocationItem>,
    pub has_current_coordinate: bool,
    pub overlay_opacity: f64,
    /// `standard|hybrid|imagery`.
    pub map_style: String,
}

impl AppSnapshotResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            selected_date_epoch_ms: 0,
            board_type: String::new(),
            board_title: String::new(),
            profiles: Vec::new(),
            selected_profile_id: None,
            selected_location: None,
            has_current_coordinate: false,
            overlay_opacity: 0.0,
            map_style: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerItem {
    pub key: String,
    pub short_label: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardCellItem {
    /// Canonical short label (`NW`, `N`, … `SE`).
    pub direction: String,
    pub star_number: u8,
    pub labels: Vec<String>,
    pub markers: Vec<MarkerItem>,
}

/// Board envelope; `cells` follow NW, N, NE, W, C, E, SW, S, SE order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardResponse {
    pub ok: bool,
    pub message: String,
    pub board_type: String,
    pub cells: Vec<BoardCellItem>,
    pub center: Option<BoardCellItem>,
    /// Legend entries, each marker once.
    pub legend: Vec<MarkerItem>,
    pub generated_at_epoch_ms: i64,
}

/// Opens (or reopens) the persistent app state.
///
/// `db_path` overrides `KYUSEI_DB_PATH`; calendar zone comes from
/// `KYUSEI_UTC_OFFSET_MINUTES`.
///
/// # FFI contract
/// - Sync call; performs SQLite open and migration.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn app_open(db_path: Option<String>) -> ActionResponse {
    let mut config = match CoreConfig::from_env() {
        Ok(config) => config,
        Err(err) => return ActionResponse::failure(format!("app_open failed: {err}")),
    };
    if let Some(path) = db_path.map(|raw| raw.trim().to_string()).filter(|p| !p.is_empty()) {
        config.db_path = PathBuf::from(path);
    }

    let store = match SqliteKeyValueStore::open(&config.db_path) {
        Ok(store) => store,
        Err(err) => return ActionResponse::failure(format!("app_open failed: {err}")),
    };
    let app = App::with_stub_engine(store, CoordinatorOptions::from(&config));

    *lock(&LOCATION_FEED) = Some(app.location_feed());
    *lock(&APP) = Some(app);
    info!("event=ffi_app_open module=ffi status=ok");
    ActionResponse::success("App state opened.")
}

/// Returns the current application snapshot.
#[flutter_rust_bridge::frb(sync)]
pub fn app_snapshot() -> AppSnapshotResponse {
    with_app(|app| {
        let selected = app.selected_profile_id();
        let location = app.selected_location();
        let board_type = app.selected_board_type();
        AppSnapshotResponse {
            ok: true,
            message: String::new(),
            selected_date_epoch_ms: app.selected_date().timestamp_millis(),
            board_type: board_type.as_str().to_string(),
            board_title: board_type.title().to_string(),
            profiles: app
                .profiles()
                .iter()
                .map(|profile| to_profile_item(profile, selected))
                .collect(),
            selected_profile_id: selected.map(|id| id.to_string()),
            selected_location: Some(LocationItem {
                latitude: location.latitude,
                longitude: location.longitude,
                name: location.name.clone(),
            }),
            has_current_coordinate: app.current_coordinate().is_some(),
            overlay_opacity: app.display_settings().overlay_opacity,
            map_style: app.display_settings().map_style.as_str().to_string(),
        }
    })
    .unwrap_or_else(AppSnapshotResponse::failure)
}

/// Computes the board for the current selection.
#[flutter_rust_bridge::frb(sync)]
pub fn current_board() -> BoardResponse {
    match with_app(|app| app.current_board()) {
        Ok(board) => to_board_response(&board),
        Err(message) => BoardResponse {
            ok: false,
            message,
            board_type: String::new(),
            cells: Vec::new(),
            center: None,
            legend: Vec::new(),
            generated_at_epoch_ms: 0,
        },
    }
}

/// Adds a profile (or re-selects the one with the same birth day).
#[flutter_rust_bridge::frb(sync)]
pub fn add_profile(birth_date_epoch_ms: i64, name: String) -> ActionResponse {
    let Some(birth_date) = parse_epoch_ms(birth_date_epoch_ms) else {
        return ActionResponse::failure(format!(
            "add_profile failed: birth date out of range: {birth_date_epoch_ms}"
        ));
    };
    to_action(
        "add_profile",
        with_app(|app| app.add_profile(birth_date, name.trim())),
        |id| ActionResponse::success_with_id("Profile selected.", id),
    )
}

/// Deletes profiles by ID. Any malformed ID rejects the whole call.
#[flutter_rust_bridge::frb(sync)]
pub fn delete_profiles(ids: Vec<String>) -> ActionResponse {
    let parsed = match ids
        .iter()
        .map(|raw| parse_profile_id(raw))
        .collect::<Result<Vec<_>, _>>()
    {
        Ok(parsed) => parsed,
        Err(err) => return ActionResponse::failure(format!("delete_profiles failed: {err}")),
    };
    to_action(
        "delete_profiles",
        with_app(|app| app.delete_profiles(&parsed)),
        |()| ActionResponse::success("Profiles deleted."),
    )
}

#[flutter_rust_bridge::frb(sync)]
pub fn select_profile(id: String) -> ActionResponse {
    let id = match parse_profile_id(&id) {
        Ok(id) => id,
        Err(err) => return ActionResponse::failure(format!("select_profile failed: {err}")),
    };
    to_action(
        "select_profile",
        with_app(|app| {
            app.select_profile(id);
            app.selected_profile_id()
        }),
        |selected| match selected {
            Some(selected) => ActionResponse::success_with_id("Profile selected.", selected),
            None => ActionResponse::success("No profiles to select."),
        },
    )
}

#[flutter_rust_bridge::frb(sync)]
pub fn set_selected_date(epoch_ms: i64) -> ActionResponse {
    let Some(date) = parse_epoch_ms(epoch_ms) else {
        return ActionResponse::failure(format!(
            "set_selected_date failed: date out of range: {epoch_ms}"
        ));
    };
    to_action(
        "set_selected_date",
        with_app(|app| app.set_selected_date(date)),
        |()| ActionResponse::success("Date updated."),
    )
}

/// Moves the selected date by whole days (clamped to 1900–2100).
#[flutter_rust_bridge::frb(sync)]
pub fn step_selected_date(days: i64) -> DateResponse {
    match with_app(|app| app.step_selected_date(days)) {
        Ok(date) => DateResponse {
            ok: true,
            epoch_ms: date.timestamp_millis(),
            message: "Date updated.".to_string(),
        },
        Err(err) => {
            warn!("event=ffi_call module=ffi status=error op=step_selected_date");
            DateResponse {
                ok: false,
                epoch_ms: 0,
                message: format!("step_selected_date failed: {err}"),
            }
        }
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn set_board_type(board_type: String) -> ActionResponse {
    let Some(parsed) = BoardType::parse(&board_type) else {
        return ActionResponse::failure(format!(
            "set_board_type failed: unsupported board type `{board_type}`"
        ));
    };
    to_action(
        "set_board_type",
        with_app(|app| app.set_selected_board_type(parsed)),
        |()| ActionResponse::success("Board type updated."),
    )
}

#[flutter_rust_bridge::frb(sync)]
pub fn set_selected_location(
    latitude: f64,
    longitude: f64,
    name: Option<String>,
) -> ActionResponse {
    let location = AppLocation::new(latitude, longitude, name);
    to_action(
        "set_selected_location",
        with_app(|app| app.update_selected_location(location)),
        |()| ActionResponse::success("Location updated."),
    )
}

/// Selects the current device coordinate; fails when none is known yet.
#[flutter_rust_bridge::frb(sync)]
pub fn set_to_current_location(name: Option<String>) -> ActionResponse {
    to_action(
        "set_to_current_location",
        with_app(|app| app.set_to_current_coordinate(name)),
        |applied| {
            if applied {
                ActionResponse::success("Location updated.")
            } else {
                ActionResponse::failure("Current location is unavailable.")
            }
        },
    )
}

/// Queues one location update from the platform location stream.
///
/// # FFI contract
/// - May be called from any thread; never touches coordinator state.
/// - Returns `false` when app state is not open.
#[flutter_rust_bridge::frb(sync)]
pub fn push_location_event(
    authorized: bool,
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> bool {
    let authorization = if authorized {
        LocationAuthorization::AuthorizedWhenInUse
    } else {
        LocationAuthorization::Denied
    };
    let coordinate = match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => Some(Coordinate::new(latitude, longitude)),
        _ => None,
    };
    let event = LocationEvent {
        authorization,
        coordinate,
    };

    lock(&LOCATION_FEED)
        .as_ref()
        .is_some_and(|feed| feed.push(event))
}

#[flutter_rust_bridge::frb(sync)]
pub fn set_overlay_opacity(opacity: f64) -> ActionResponse {
    to_action(
        "set_overlay_opacity",
        with_app(|app| app.set_overlay_opacity(opacity)),
        |()| ActionResponse::success("Overlay opacity updated."),
    )
}

#[flutter_rust_bridge::frb(sync)]
pub fn set_map_style(map_style: String) -> ActionResponse {
    let Some(parsed) = MapStyle::parse(&map_style) else {
        return ActionResponse::failure(format!(
            "set_map_style failed: unsupported map style `{map_style}`"
        ));
    };
    to_action(
        "set_map_style",
        with_app(|app| app.set_map_style(parsed)),
        |()| ActionResponse::success("Map style updated."),
    )
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panic inside a previous call must not brick the API.
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn with_app<T>(f: impl FnOnce(&mut App) -> T) -> Result<T, String> {
    let mut guard = lock(&APP);
    let app = guard.as_mut().ok_or_else(|| NOT_OPEN_MESSAGE.to_string())?;
    app.pump_location_events();
    Ok(f(app))
}

fn to_action<T>(
    operation: &str,
    result: Result<T, String>,
    on_success: impl FnOnce(T) -> ActionResponse,
) -> ActionResponse {
    match result {
        Ok(value) => on_success(value),
        Err(err) => {
            warn!("event=ffi_call module=ffi status=error op={operation}");
            ActionResponse::failure(format!("{operation} failed: {err}"))
        }
    }
}

fn parse_epoch_ms(epoch_ms: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(epoch_ms)
}

fn parse_profile_id(raw: &str) -> Result<ProfileId, String> {
    Uuid::parse_str(raw.trim()).map_err(|err| format!("invalid profile id `{raw}`: {err}"))
}

fn to_profile_item(profile: &Profile, selected: Option<ProfileId>) -> ProfileItem {
    ProfileItem {
        id: profile.id.to_string(),
        name: profile.name.clone(),
        birth_date_epoch_ms: profile.birth_date.timestamp_millis(),
        created_at_epoch_ms: profile.created_at.timestamp_millis(),
        is_selected: selected == Some(profile.id),
    }
}

fn to_marker_item(marker: Marker) -> MarkerItem {
    MarkerItem {
        key: marker.as_str().to_string(),
        short_label: marker.short_label().to_string(),
        title: marker.title().to_string(),
    }
}

fn to_cell_item(cell: &BoardCell) -> BoardCellItem {
    BoardCellItem {
        direction: cell.direction.short_label().to_string(),
        star_number: cell.star_number,
        labels: cell.labels.clone(),
        markers: cell.markers.iter().copied().map(to_marker_item).collect(),
    }
}

fn to_board_response(board: &Board) -> BoardResponse {
    BoardResponse {
        ok: true,
        message: String::new(),
        board_type: board.kind.as_str().to_string(),
        cells: board.cells.iter().map(to_cell_item).collect(),
        center: Some(to_cell_item(&board.center)),
        legend: board.markers().into_iter().map(to_marker_item).collect(),
        generated_at_epoch_ms: board.generated_at.timestamp_millis(),
    }
}
