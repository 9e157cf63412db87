// src/common/migrations.rs
//! Database migration and schema management

use sqlx::SqlitePool;
use tracing::{info, warn};

/// Run all database migrations
///
/// Tables are created if missing. With `reset` the existing tables are
/// dropped first, which destroys all data.
pub async fn run_migrations(pool: &SqlitePool, reset: bool) -> Result<(), sqlx::Error> {
    if reset {
        warn!("⚠️  RESET_DB=true - Dropping all tables and recreating schema...");
        drop_all_tables(pool).await?;
        info!("✅ Dropped old tables");
    }

    create_user_tables(pool).await?;
    create_content_tables(pool).await?;
    create_indexes(pool).await?;

    info!("✅ Database migration completed successfully!");

    Ok(())
}

async fn drop_all_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // Children before parents
    for table in ["shared_notes", "notes", "folders", "otps", "users"] {
        sqlx::query(&format!("DROP TABLE IF EXISTS {}", table))
            .execute(pool)
            .await?;
    }
    Ok(())
}

async fn create_user_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL DEFAULT '',
            name TEXT,
            avatar TEXT,
            is_verified INTEGER NOT NULL DEFAULT 0,
            last_login TEXT,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS otps (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL,
            code TEXT NOT NULL,
            purpose TEXT NOT NULL CHECK (purpose IN ('signup', 'password-reset')),
            expires_at INTEGER NOT NULL,
            consumed INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_content_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS folders (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE (user_id, name)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS notes (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            folder_id TEXT REFERENCES folders(id) ON DELETE CASCADE,
            title TEXT NOT NULL,
            content TEXT NOT NULL DEFAULT '',
            note_type TEXT NOT NULL DEFAULT 'normal'
                CHECK (note_type IN ('normal', 'journal', 'memory')),
            journal_date TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS shared_notes (
            id TEXT PRIMARY KEY,
            note_id TEXT NOT NULL REFERENCES notes(id) ON DELETE CASCADE,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            expires_at INTEGER NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_indexes(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let statements = [
        "CREATE INDEX IF NOT EXISTS idx_otps_email_purpose ON otps(email, purpose)",
        "CREATE INDEX IF NOT EXISTS idx_folders_user ON folders(user_id)",
        "CREATE INDEX IF NOT EXISTS idx_notes_user ON notes(user_id)",
        "CREATE INDEX IF NOT EXISTS idx_notes_folder ON notes(folder_id)",
        "CREATE INDEX IF NOT EXISTS idx_notes_updated ON notes(user_id, updated_at)",
        // Titles are unique per user, journal entries excepted
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_notes_user_title ON notes(user_id, title) WHERE note_type != 'journal'",
        // One journal entry per user per calendar day
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_notes_user_journal_day ON notes(user_id, journal_date) WHERE note_type = 'journal'",
        "CREATE INDEX IF NOT EXISTS idx_shared_notes_expires ON shared_notes(expires_at)",
    ];

    for statement in statements {
        sqlx::query(statement).execute(pool).await?;
    }

    info!("📊 Created indexes");
    Ok(())
}

#[cfg(test)]
pub mod test_support {
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use sqlx::SqlitePool;
    use std::str::FromStr;

    /// In-memory database with the production schema.
    /// A single connection, since every `:memory:` connection is its own database.
    pub async fn setup_test_db() -> SqlitePool {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .unwrap()
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .unwrap();

        super::run_migrations(&pool, false).await.unwrap();
        pool
    }
}
