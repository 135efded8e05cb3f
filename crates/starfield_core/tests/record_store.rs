use rusqlite::Connection;
use starfield_core::db::migrations::latest_version;
use starfield_core::db::{open_db, open_db_in_memory, DbError};
use starfield_core::{
    default_categories, CategoryInfo, DiaryEntry, RecordKey, RecordRepository, RepoError,
    SqliteRecordRepository,
};

#[test]
fn fresh_database_is_fully_migrated() {
    let conn = open_db_in_memory().unwrap();
    assert_eq!(schema_version(&conn), latest_version());

    let columns: Vec<String> = conn
        .prepare("SELECT name FROM pragma_table_info('records') ORDER BY cid;")
        .unwrap()
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(columns, vec!["key", "payload", "updated_at"]);
}

#[test]
fn file_open_creates_missing_directories_and_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app").join("data").join("starfield.sqlite3");

    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    drop(conn);

    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
}

#[test]
fn newer_schema_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 42;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 42);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn absent_key_differs_from_empty_list() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::new(&conn);

    assert!(repo
        .load_list::<DiaryEntry>(RecordKey::Entries)
        .unwrap()
        .is_none());

    repo.save_list::<DiaryEntry>(RecordKey::Entries, &[]).unwrap();
    assert_eq!(
        repo.load_list::<DiaryEntry>(RecordKey::Entries).unwrap(),
        Some(Vec::new())
    );
}

#[test]
fn save_replaces_the_whole_list() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::new(&conn);
    let categories = default_categories();

    repo.save_list(RecordKey::Categories, &categories).unwrap();
    repo.save_list(RecordKey::Categories, &categories[..1])
        .unwrap();

    let loaded: Vec<CategoryInfo> = repo.load_list(RecordKey::Categories).unwrap().unwrap();
    assert_eq!(loaded, categories[..1].to_vec());

    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM records;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn categories_persist_as_camel_case_json() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::new(&conn);
    repo.save_list(RecordKey::Categories, &default_categories()[..1])
        .unwrap();

    let payload: String = conn
        .query_row(
            "SELECT payload FROM records WHERE key = 'categories';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&payload).unwrap();
    assert_eq!(value[0]["id"], "gratitude");
    assert_eq!(value[0]["color"], "#ffc857");
    assert!(value[0]["glowSpec"].is_string());
}

#[test]
fn malformed_payload_is_reported() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO records (key, payload) VALUES ('stars', '{not json');",
        [],
    )
    .unwrap();
    let repo = SqliteRecordRepository::new(&conn);

    let err = repo
        .load_list::<starfield_core::StarPoint>(RecordKey::Stars)
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::InvalidData {
            key: RecordKey::Stars,
            ..
        }
    ));
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}
