use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::store::CommentaryStore;
use crate::types::{CommentaryItem, ScoreDelta, ScoreState};

/// SQLite-backed commentary store.
///
/// The log is a single `comments` table with store-assigned autoincrement
/// ids; the score is a single-row `score` table. Each comment row also
/// carries the score snapshot taken inside the transaction that inserted it.
#[derive(Clone)]
pub struct SqliteCommentaryStore {
    pool: SqlitePool,
}

impl std::fmt::Debug for SqliteCommentaryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteCommentaryStore")
            .field("pool_size", &self.pool.size())
            .finish()
    }
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: i64,
    content: String,
    runs: i64,
    wickets: i64,
}

impl From<CommentRow> for CommentaryItem {
    fn from(row: CommentRow) -> Self {
        CommentaryItem {
            id: row.id as u64,
            text: row.content,
            score: ScoreState {
                runs: row.runs as u64,
                wickets: row.wickets as u64,
            },
        }
    }
}

#[derive(sqlx::FromRow)]
struct ScoreRow {
    runs: i64,
    wickets: i64,
}

impl From<ScoreRow> for ScoreState {
    fn from(row: ScoreRow) -> Self {
        ScoreState {
            runs: row.runs as u64,
            wickets: row.wickets as u64,
        }
    }
}

impl SqliteCommentaryStore {
    /// Open (creating if missing) the database at `database_url`.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        info!("Opening commentary database at {database_url}");

        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// In-memory store, used by tests. Pinned to a single connection so the
    /// whole pool sees one database.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect("sqlite::memory:")
            .await?;

        Ok(Self { pool })
    }

    /// Create the tables and seed the singleton score row. Idempotent; runs
    /// once at startup.
    pub async fn init_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS comments (
                id      INTEGER PRIMARY KEY AUTOINCREMENT,
                content TEXT NOT NULL,
                runs    INTEGER NOT NULL DEFAULT 0,
                wickets INTEGER NOT NULL DEFAULT 0
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS score (
                id      INTEGER PRIMARY KEY CHECK (id = 1),
                runs    INTEGER NOT NULL DEFAULT 0,
                wickets INTEGER NOT NULL DEFAULT 0
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("INSERT OR IGNORE INTO score (id, runs, wickets) VALUES (1, 0, 0)")
            .execute(&self.pool)
            .await?;

        debug!("Commentary schema ready");
        Ok(())
    }
}

async fn fetch_score<'e, E>(executor: E) -> Result<ScoreState, StoreError>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let row: ScoreRow = sqlx::query_as("SELECT runs, wickets FROM score WHERE id = 1")
        .fetch_one(executor)
        .await?;
    Ok(row.into())
}

#[async_trait]
impl CommentaryStore for SqliteCommentaryStore {
    async fn append(&self, text: &str) -> Result<CommentaryItem, StoreError> {
        // Zero delta keeps a single insert path and the same snapshot rule.
        self.record(text, ScoreDelta::ZERO).await
    }

    async fn list_since(&self, cursor: u64) -> Result<Vec<CommentaryItem>, StoreError> {
        let rows: Vec<CommentRow> = sqlx::query_as(
            "SELECT id, content, runs, wickets FROM comments WHERE id > ?1 ORDER BY id ASC",
        )
        .bind(cursor as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CommentaryItem::from).collect())
    }

    async fn apply_score_delta(&self, delta: ScoreDelta) -> Result<ScoreState, StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE score SET runs = runs + ?1, wickets = wickets + ?2 WHERE id = 1")
            .bind(delta.runs as i64)
            .bind(delta.wickets as i64)
            .execute(&mut *tx)
            .await?;

        let score = fetch_score(&mut *tx).await?;
        tx.commit().await?;

        Ok(score)
    }

    async fn score(&self) -> Result<ScoreState, StoreError> {
        fetch_score(&self.pool).await
    }

    async fn record(&self, text: &str, delta: ScoreDelta) -> Result<CommentaryItem, StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE score SET runs = runs + ?1, wickets = wickets + ?2 WHERE id = 1")
            .bind(delta.runs as i64)
            .bind(delta.wickets as i64)
            .execute(&mut *tx)
            .await?;

        let score = fetch_score(&mut *tx).await?;

        let result = sqlx::query("INSERT INTO comments (content, runs, wickets) VALUES (?1, ?2, ?3)")
            .bind(text)
            .bind(score.runs as i64)
            .bind(score.wickets as i64)
            .execute(&mut *tx)
            .await?;

        let id = result.last_insert_rowid() as u64;
        tx.commit().await?;

        Ok(CommentaryItem {
            id,
            text: text.to_string(),
            score,
        })
    }
}
