use crate::config::DatabaseConfig;
use crate::error::{AppError, Result};
use crate::models::{
    now_micros, CreateIncidentRequest, Incident, IncidentStatus, Severity, UpdateIncidentRequest,
};
use crate::state::store::{incident_not_found, IncidentStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::str::FromStr;
use std::time::Duration;

const INCIDENT_COLUMNS: &str =
    "id, title, description, severity, status, created_at, updated_at";

/// Incident store backed by a PostgreSQL `incidents` table
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct IncidentRow {
    id: i64,
    title: String,
    description: String,
    severity: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<IncidentRow> for Incident {
    type Error = AppError;

    fn try_from(row: IncidentRow) -> Result<Self> {
        let severity = Severity::from_str(&row.severity).map_err(|_| {
            AppError::Database(format!(
                "Incident {} has unknown severity '{}'",
                row.id, row.severity
            ))
        })?;
        let status = IncidentStatus::from_str(&row.status).map_err(|_| {
            AppError::Database(format!(
                "Incident {} has unknown status '{}'",
                row.id, row.status
            ))
        })?;

        Ok(Incident {
            id: row.id,
            title: row.title,
            description: row.description,
            severity,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl PostgresStore {
    /// Connect a pool using the configured credentials
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.name);

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await?;

        tracing::info!(
            host = %config.host,
            port = config.port,
            database = %config.name,
            "Connected to PostgreSQL"
        );

        Ok(Self { pool })
    }

    /// Create from an existing pool
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get the underlying connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the incidents table and its title index if they do not exist
    pub async fn init_schema(&self) -> Result<()> {
        tracing::info!("Ensuring incidents table exists");

        let mut conn = self.pool.acquire().await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS incidents (
                id BIGSERIAL PRIMARY KEY,
                title VARCHAR(100) NOT NULL,
                description TEXT NOT NULL,
                severity VARCHAR(16) NOT NULL,
                status VARCHAR(16) NOT NULL,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&mut *conn)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS ix_incidents_title ON incidents (title)")
            .execute(&mut *conn)
            .await?;

        Ok(())
    }
}

// Every operation checks out one pooled connection; it returns to the pool
// when `conn` drops, on success and error paths alike.
#[async_trait]
impl IncidentStore for PostgresStore {
    async fn insert(&self, request: &CreateIncidentRequest) -> Result<Incident> {
        let mut conn = self.pool.acquire().await?;
        let now = now_micros();

        let row: IncidentRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO incidents (title, description, severity, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING {INCIDENT_COLUMNS}
            "#
        ))
        .bind(&request.title)
        .bind(&request.description)
        .bind(request.severity.as_ref())
        .bind(IncidentStatus::Open.as_ref())
        .bind(now)
        .fetch_one(&mut *conn)
        .await?;

        tracing::debug!(incident_id = row.id, "Incident saved");
        row.try_into()
    }

    async fn list_all(&self) -> Result<Vec<Incident>> {
        let mut conn = self.pool.acquire().await?;

        let rows: Vec<IncidentRow> = sqlx::query_as(&format!(
            "SELECT {INCIDENT_COLUMNS} FROM incidents ORDER BY id"
        ))
        .fetch_all(&mut *conn)
        .await?;

        rows.into_iter().map(Incident::try_from).collect()
    }

    async fn get(&self, id: i64) -> Result<Option<Incident>> {
        let mut conn = self.pool.acquire().await?;

        let row: Option<IncidentRow> = sqlx::query_as(&format!(
            "SELECT {INCIDENT_COLUMNS} FROM incidents WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        row.map(Incident::try_from).transpose()
    }

    async fn update(&self, id: i64, changes: &UpdateIncidentRequest) -> Result<Incident> {
        let mut conn = self.pool.acquire().await?;

        // GREATEST keeps updated_at strictly increasing if the clock has not moved
        let row: Option<IncidentRow> = sqlx::query_as(&format!(
            r#"
            UPDATE incidents SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                severity = COALESCE($4, severity),
                status = COALESCE($5, status),
                updated_at = GREATEST($6, updated_at + INTERVAL '1 microsecond')
            WHERE id = $1
            RETURNING {INCIDENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.title.as_deref())
        .bind(changes.description.as_deref())
        .bind(changes.severity.as_ref().map(AsRef::<str>::as_ref))
        .bind(changes.status.as_ref().map(AsRef::<str>::as_ref))
        .bind(now_micros())
        .fetch_optional(&mut *conn)
        .await?;

        let row = row.ok_or_else(incident_not_found)?;
        tracing::debug!(incident_id = id, "Incident updated");
        row.try_into()
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let mut conn = self.pool.acquire().await?;

        let result = sqlx::query("DELETE FROM incidents WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        let removed = result.rows_affected() > 0;
        if removed {
            tracing::debug!(incident_id = id, "Incident deleted");
        }
        Ok(removed)
    }

    async fn health_check(&self) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query("SELECT 1").execute(&mut *conn).await?;
        Ok(())
    }
}
