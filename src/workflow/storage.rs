/// SQLite persistence layer for workflow records
///
/// Rows are keyed by a generated UUID and scoped by `owner_id`. The `data`
/// column holds the encrypted graph and is never interpreted here.

use crate::workflow::types::WorkflowRecord;
use chrono::Utc;
use sqlx::sqlite::SqlitePool;

const COLUMNS: &str = "id, owner_id, name, data, created_at, updated_at";

/// Fields for a new workflow row
#[derive(Debug, Clone)]
pub struct NewWorkflow {
    pub owner_id: String,
    pub name: String,
    /// Already encrypted graph text
    pub data: String,
}

/// Partial update; `None` leaves the column untouched
#[derive(Debug, Clone, Default)]
pub struct WorkflowPatch {
    pub name: Option<String>,
    /// Already encrypted graph text
    pub data: Option<String>,
}

/// SQLite-based workflow storage
#[derive(Debug, Clone)]
pub struct WorkflowStorage {
    pool: SqlitePool,
}

impl WorkflowStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Underlying pool, for raw queries the repository methods do not cover
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Initialize the workflow storage schema
    ///
    /// Safe to call multiple times (uses IF NOT EXISTS).
    pub async fn init_schema(&self) -> sqlx::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS workflows (
                id TEXT PRIMARY KEY,
                owner_id TEXT NOT NULL,
                name TEXT NOT NULL,
                data TEXT NOT NULL,
                created_at TIMESTAMP NOT NULL,
                updated_at TIMESTAMP NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_workflows_owner ON workflows(owner_id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Insert a new workflow, generating its id and timestamps
    pub async fn create(&self, new: NewWorkflow) -> sqlx::Result<WorkflowRecord> {
        let now = Utc::now();
        let record = WorkflowRecord {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id: new.owner_id,
            name: new.name,
            data: new.data,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO workflows (id, owner_id, name, data, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.id)
        .bind(&record.owner_id)
        .bind(&record.name)
        .bind(&record.data)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;

        tracing::debug!(workflow_id = %record.id, owner_id = %record.owner_id, "inserted workflow row");
        Ok(record)
    }

    /// All workflows owned by `owner_id`, in insertion order
    pub async fn list_by_owner(&self, owner_id: &str) -> sqlx::Result<Vec<WorkflowRecord>> {
        let query = format!(
            "SELECT {COLUMNS} FROM workflows WHERE owner_id = ? ORDER BY rowid"
        );
        sqlx::query_as::<_, WorkflowRecord>(&query)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await
    }

    pub async fn get_by_id(&self, id: &str) -> sqlx::Result<Option<WorkflowRecord>> {
        let query = format!("SELECT {COLUMNS} FROM workflows WHERE id = ?");
        sqlx::query_as::<_, WorkflowRecord>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Apply `patch` in a single statement and return the stored row
    ///
    /// Returns `None` if no row has this id. Concurrent updates are
    /// last-write-wins.
    pub async fn update(
        &self,
        id: &str,
        patch: WorkflowPatch,
    ) -> sqlx::Result<Option<WorkflowRecord>> {
        let query = format!(
            "UPDATE workflows
             SET name = COALESCE(?, name),
                 data = COALESCE(?, data),
                 updated_at = ?
             WHERE id = ?
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WorkflowRecord>(&query)
            .bind(patch.name)
            .bind(patch.data)
            .bind(Utc::now())
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Delete a workflow by ID; `false` if it did not exist
    pub async fn delete(&self, id: &str) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM workflows WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
