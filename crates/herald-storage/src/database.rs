// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. The `Database` struct IS the single writer; query modules accept
//! `&Database` and call through `connection().call()`. Do NOT create
//! additional Connection instances for writes.

use herald_core::HeraldError;
use tracing::debug;

/// Convert a tokio-rusqlite error into HeraldError::Storage.
pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> HeraldError {
    HeraldError::Storage {
        source: Box::new(e),
    }
}

/// Handle to the single SQLite connection backing the job store.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (or create) the database at `path`, apply PRAGMAs, and run all
    /// pending migrations.
    pub async fn open(path: &str) -> Result<Self, HeraldError> {
        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| HeraldError::Storage {
                source: Box::new(e),
            })?;
        let db = Self { conn };
        db.initialize().await?;
        debug!(path, "database opened");
        Ok(db)
    }

    /// Open an in-memory database with the full schema. For tests.
    pub async fn open_in_memory() -> Result<Self, HeraldError> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(|e| HeraldError::Storage {
                source: Box::new(e),
            })?;
        let db = Self { conn };
        db.initialize().await?;
        Ok(db)
    }

    async fn initialize(&self) -> Result<(), HeraldError> {
        self.conn
            .call(|conn| {
                conn.execute_batch(
                    "PRAGMA journal_mode = WAL;
                     PRAGMA synchronous = NORMAL;
                     PRAGMA busy_timeout = 5000;
                     PRAGMA foreign_keys = ON;",
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;

        self.conn
            .call(|conn| -> Result<Result<(), String>, rusqlite::Error> {
                Ok(crate::migrations::run_migrations(conn).map_err(|e| e.to_string()))
            })
            .await
            .map_err(map_tr_err)?
            .map_err(|msg| HeraldError::Storage { source: msg.into() })?;

        Ok(())
    }

    /// The underlying tokio-rusqlite connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Close the connection, flushing pending writes.
    pub async fn close(self) -> Result<(), HeraldError> {
        self.conn.close().await.map_err(map_tr_err)
    }
}
