// Copyright 2023 Remi Bernotavicius

use diesel::prelude::Connection as _;
use diesel::RunQueryDsl as _;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::path::Path;

pub mod models;
pub mod schema;

pub type Connection = diesel::sqlite::SqliteConnection;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

diesel::define_sql_function! {
    /// Unicode lowercase, registered on every connection. SQLite's own `lower` only folds ASCII.
    fn unicode_lower(x: diesel::sql_types::Text) -> diesel::sql_types::Text;
}

/// The key case-insensitive comparisons are made on, in Rust and in SQL alike.
pub fn fold_case(text: &str) -> String {
    text.to_lowercase()
}

/// Opens the SQLite database at `path`, turns on foreign key enforcement (so deletes cascade) and
/// brings the schema up to date.
pub fn establish_connection(path: impl AsRef<Path>) -> crate::Result<Connection> {
    let path = path.as_ref();
    let url = path
        .to_str()
        .ok_or_else(|| crate::Error::validation("database", "path is not valid UTF-8"))?;
    let mut connection = Connection::establish(url)?;
    unicode_lower_utils::register_impl(&mut connection, |text: String| fold_case(&text))?;
    diesel::sql_query("PRAGMA foreign_keys = ON").execute(&mut connection)?;
    connection
        .run_pending_migrations(MIGRATIONS)
        .map_err(crate::Error::Migration)?;
    log::debug!("opened database at {}", path.display());
    Ok(connection)
}

#[cfg(test)]
pub fn test_connection() -> Connection {
    establish_connection(":memory:").unwrap()
}

#[test]
fn unicode_lower_folds_non_ascii() {
    let mut conn = test_connection();
    let folded: String = diesel::select(unicode_lower("ÑAME Éclair"))
        .get_result(&mut conn)
        .unwrap();
    assert_eq!(folded, "ñame éclair");
}

#[test]
fn migrations() {
    let mut conn = test_connection();
    conn.revert_all_migrations(MIGRATIONS).unwrap();
    conn.run_pending_migrations(MIGRATIONS).unwrap();
    assert!(!conn.has_pending_migration(MIGRATIONS).unwrap());
}
