use chrono::{TimeZone, Utc};
use kyusei_core::db::migrations::latest_version;
use kyusei_core::db::{open_db, open_db_in_memory, DbError};
use kyusei_core::{
    AppLocation, AppStateCoordinator, BoardType, CoordinatorOptions, KeyValueStore, MapStyle,
    RepoError, SqliteKeyValueStore, APP_STATE_KEY, DISPLAY_SETTINGS_KEY, PROFILES_KEY,
};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "kv_entries");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kyusei.sqlite3");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "kv_entries");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }

    let err = SqliteKeyValueStore::open(&path).unwrap_err();
    assert!(matches!(err, RepoError::Db(DbError::UnsupportedSchemaVersion { .. })));
}

#[test]
fn sqlite_values_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kv.sqlite3");

    let store = SqliteKeyValueStore::open(&path).unwrap();
    store.save("greeting", b"hello").unwrap();
    drop(store);

    let reopened = SqliteKeyValueStore::open(&path).unwrap();
    assert_eq!(reopened.load("greeting").unwrap(), Some(b"hello".to_vec()));
    assert_eq!(reopened.load("missing").unwrap(), None);
}

#[test]
fn sqlite_store_debug_output_names_backing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("debug.sqlite3");

    let store = SqliteKeyValueStore::open(&path).unwrap();
    let rendered = format!("{store:?}");
    assert!(rendered.starts_with("SqliteKeyValueStore"), "{rendered}");
    assert!(rendered.contains("debug.sqlite3"), "{rendered}");
}

#[test]
fn coordinator_state_survives_app_restart_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.sqlite3");
    let options = CoordinatorOptions::default();
    let kyoto = AppLocation::new(35.0116, 135.7681, Some("京都".to_string()));
    let date = Utc.with_ymd_and_hms(2025, 11, 3, 8, 0, 0).unwrap();

    let profile_id = {
        let store = SqliteKeyValueStore::open(&path).unwrap();
        let mut app = AppStateCoordinator::with_stub_engine(store, options);
        let id = app.add_profile(Utc.with_ymd_and_hms(1988, 8, 8, 0, 0, 0).unwrap(), "A");
        app.set_selected_date(date);
        app.set_selected_board_type(BoardType::Year);
        app.update_selected_location(kyoto.clone());
        app.set_map_style(MapStyle::Hybrid);
        id
    };

    let store = SqliteKeyValueStore::open(&path).unwrap();
    assert_eq!(
        store.keys().unwrap(),
        vec![
            APP_STATE_KEY.to_string(),
            DISPLAY_SETTINGS_KEY.to_string(),
            "location_seeded_v1".to_string(),
            PROFILES_KEY.to_string(),
        ]
    );

    let app = AppStateCoordinator::with_stub_engine(store, options);
    assert_eq!(app.selected_profile_id(), Some(profile_id));
    assert_eq!(app.selected_date(), date);
    assert_eq!(app.selected_board_type(), BoardType::Year);
    assert_eq!(*app.selected_location(), kyoto);
    assert!(app.has_seeded_location());
    assert_eq!(app.display_settings().map_style, MapStyle::Hybrid);
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0)).unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
