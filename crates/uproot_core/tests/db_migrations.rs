use rusqlite::Connection;
use uproot_core::db::migrations::{apply_migrations, current_user_version, latest_version};
use uproot_core::db::{open_db_in_memory, DbError};
use uproot_core::{RepoError, SqliteChallengeRepository, SqliteGoalRepository};

#[test]
fn fresh_store_has_every_table_at_latest_version() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(current_user_version(&conn).unwrap(), latest_version());
    assert_eq!(
        table_names(&conn),
        vec!["challenges", "goals", "habits", "tasks"]
    );
}

#[test]
fn migrations_only_run_once() {
    let mut conn = open_db_in_memory().unwrap();
    assert_eq!(apply_migrations(&mut conn).unwrap(), 0);
    assert_eq!(current_user_version(&conn).unwrap(), latest_version());

    let mut bare = Connection::open_in_memory().unwrap();
    assert_eq!(apply_migrations(&mut bare).unwrap(), 1);
    assert_eq!(apply_migrations(&mut bare).unwrap(), 0);
}

#[test]
fn schema_from_newer_build_is_refused() {
    let mut conn = Connection::open_in_memory().unwrap();
    conn.pragma_update(None, "user_version", 42).unwrap();

    let err = apply_migrations(&mut conn).unwrap_err();
    assert!(matches!(
        err,
        DbError::UnsupportedSchemaVersion {
            db_version: 42,
            latest_supported,
        } if latest_supported == latest_version()
    ));
    assert!(table_names(&conn).is_empty());
}

#[test]
fn repositories_need_a_migrated_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let err = SqliteGoalRepository::try_new(&conn).err().unwrap();
    assert!(matches!(
        err,
        RepoError::UninitializedConnection {
            actual_version: 0,
            ..
        }
    ));
    assert!(SqliteChallengeRepository::try_new(&conn).is_err());
}

#[test]
fn tasks_cannot_point_at_missing_goals() {
    let conn = open_db_in_memory().unwrap();

    let inserted = conn.execute(
        "INSERT INTO tasks (id, title, goal_id) VALUES ('task', 'orphan', 'nowhere');",
        [],
    );
    assert!(inserted.is_err());
}

fn table_names(conn: &Connection) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name;")
        .unwrap();
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    names
}
