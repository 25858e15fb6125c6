#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions, clippy::missing_panics_doc)]

//! Persistent state for pkgsig
//!
//! This crate manages the `SQLite` database holding the certificate trust
//! store, the recorded signing classification of every validated package and
//! the signature metadata extracted from accepted packages.

pub mod database;
pub mod extractor;
pub mod models;
pub mod queries;
pub mod recorder;
pub mod trust;

pub use database::SigningDatabase;
pub use extractor::SqliteSignaturePartsExtractor;
pub use models::{CertificateRow, SignaturePartRow, SigningStateRow};
pub use recorder::SqliteSigningStateRecorder;
pub use trust::SqliteTrustStore;

use pkgsig_errors::Error;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::time::Duration;

/// Create a new `SQLite` connection pool
///
/// # Errors
///
/// Returns an error if the database connection fails or configuration is invalid.
pub async fn create_pool(db_path: &Path) -> Result<Pool<Sqlite>, Error> {
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .map_err(|e| {
            Error::from(pkgsig_errors::StateError::DatabaseError {
                message: e.to_string(),
            })
        })?;

    if let Ok(mut conn) = pool.acquire().await {
        let _ = sqlx::query("PRAGMA synchronous = NORMAL")
            .execute(&mut *conn)
            .await;
        let _ = sqlx::query("PRAGMA foreign_keys = ON")
            .execute(&mut *conn)
            .await;
    }

    Ok(pool)
}

/// Run database migrations
///
/// # Errors
///
/// Returns an error if any migration fails to execute.
pub async fn run_migrations(pool: &Pool<Sqlite>) -> Result<(), Error> {
    sqlx::migrate!("./migrations").run(pool).await.map_err(|e| {
        pkgsig_errors::StateError::MigrationFailed {
            message: e.to_string(),
        }
        .into()
    })
}
