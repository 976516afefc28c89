use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::{debug, info};

use super::{
    Defect, DefectDashboard, IndustryBaseline, ProjectSnapshot, SessionState, Storage,
};
use crate::analysis::Severity;
use crate::config::DatabaseConfig;
use crate::error::{StorageError, StorageResult};

/// Static migrator that embeds migrations at compile time
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

const MEMORY_PATH: &str = ":memory:";

/// SQLite-backed storage implementation
#[derive(Clone)]
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Create a new SQLite storage instance
    pub async fn new(config: &DatabaseConfig) -> StorageResult<Self> {
        if config.path.as_os_str() == MEMORY_PATH {
            return Self::new_in_memory().await;
        }

        // Ensure parent directory exists
        if let Some(parent) = config.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::Connection {
                message: format!("Failed to create database directory: {}", e),
            })?;
        }

        let database_url = format!("sqlite://{}?mode=rwc", config.path.display());

        let options = SqliteConnectOptions::from_str(&database_url)
            .map_err(|e| StorageError::Connection {
                message: format!("Invalid database URL: {}", e),
            })?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::Connection {
                message: format!("Failed to connect to database: {}", e),
            })?;

        let storage = Self { pool };
        storage.run_migrations().await?;

        Ok(storage)
    }

    /// Create a private in-memory database.
    ///
    /// The pool holds a single connection that is never recycled, since every
    /// new SQLite memory connection would start from an empty database.
    pub async fn new_in_memory() -> StorageResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:").map_err(|e| {
            StorageError::Connection {
                message: format!("Invalid database URL: {}", e),
            }
        })?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::Connection {
                message: format!("Failed to open in-memory database: {}", e),
            })?;

        let storage = Self { pool };
        storage.run_migrations().await?;

        Ok(storage)
    }

    /// Run database migrations using embedded sqlx migrations
    async fn run_migrations(&self) -> StorageResult<()> {
        info!("Running database migrations...");

        MIGRATOR.run(&self.pool).await.map_err(|e| StorageError::Migration {
            message: format!("Failed to run migrations: {}", e),
        })?;

        info!("Database migrations completed successfully");
        Ok(())
    }

    /// Get the underlying pool for advanced queries
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn get_session(&self, id: &str) -> StorageResult<SessionState> {
        let row: Option<SessionRow> = sqlx::query_as(
            r#"
            SELECT session_id, risk_history, complexity_history, project_context,
                   conversation_count, last_intent
            FROM sessions
            WHERE session_id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => row.try_into(),
            None => {
                debug!(session_id = %id, "Session not found, starting empty");
                Ok(SessionState::new(id))
            }
        }
    }

    async fn save_session(&self, session: &SessionState) -> StorageResult<()> {
        let risk_history = serde_json::to_string(&session.risk_history)?;
        let complexity_history = serde_json::to_string(&session.complexity_history)?;

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO sessions
                (session_id, risk_history, complexity_history, project_context,
                 conversation_count, last_intent, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&session.id)
        .bind(&risk_history)
        .bind(&complexity_history)
        .bind(&session.context)
        .bind(session.conversation_count)
        .bind(&session.last_intent)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn insert_defect(&self, defect: &Defect) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO defects (id, session_id, industry, module_name, severity, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&defect.id)
        .bind(&defect.session_id)
        .bind(&defect.industry)
        .bind(&defect.module_name)
        .bind(defect.severity.as_str())
        .bind(defect.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        info!(
            session_id = %defect.session_id,
            module = %defect.module_name,
            severity = %defect.severity,
            "Defect logged"
        );
        Ok(())
    }

    async fn get_session_defects(&self, session_id: &str) -> StorageResult<Vec<Defect>> {
        let rows: Vec<DefectRow> = sqlx::query_as(
            r#"
            SELECT id, session_id, industry, module_name, severity, created_at
            FROM defects
            WHERE session_id = ?
            ORDER BY created_at ASC
            "#,
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Defect::try_from).collect()
    }

    async fn defect_dashboard(&self, session_id: &str) -> StorageResult<DefectDashboard> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM defects WHERE session_id = ?")
            .bind(session_id)
            .fetch_one(&self.pool)
            .await?;

        let high: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM defects WHERE session_id = ? AND severity = 'HIGH'",
        )
        .bind(session_id)
        .fetch_one(&self.pool)
        .await?;

        let hotspot: Option<String> = sqlx::query_scalar(
            r#"
            SELECT module_name
            FROM defects
            WHERE session_id = ?
            GROUP BY module_name
            ORDER BY COUNT(*) DESC, module_name ASC
            LIMIT 1
            "#,
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(DefectDashboard::from_counts(total, high, hotspot))
    }

    async fn insert_project_snapshot(&self, snapshot: &ProjectSnapshot) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO project_snapshots
                (id, session_id, industry, avg_complexity, avg_risk, delay_probability, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&snapshot.id)
        .bind(&snapshot.session_id)
        .bind(&snapshot.industry)
        .bind(snapshot.avg_complexity)
        .bind(snapshot.avg_risk)
        .bind(snapshot.delay_probability)
        .bind(snapshot.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn industry_baseline(&self, industry: &str) -> StorageResult<Option<IndustryBaseline>> {
        let (avg_complexity, avg_risk): (Option<f64>, Option<f64>) = sqlx::query_as(
            r#"
            SELECT AVG(avg_complexity), AVG(avg_risk)
            FROM project_snapshots
            WHERE industry = ?
            "#,
        )
        .bind(industry)
        .fetch_one(&self.pool)
        .await?;

        Ok(match (avg_complexity, avg_risk) {
            (Some(avg_complexity), Some(avg_risk)) => Some(IndustryBaseline {
                avg_complexity,
                avg_risk,
            }),
            _ => None,
        })
    }
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

// Internal row types for SQLx mapping
#[derive(sqlx::FromRow)]
struct SessionRow {
    session_id: String,
    risk_history: String,
    complexity_history: String,
    project_context: String,
    conversation_count: i64,
    last_intent: String,
}

impl TryFrom<SessionRow> for SessionState {
    type Error = StorageError;

    fn try_from(row: SessionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.session_id,
            risk_history: serde_json::from_str(&row.risk_history)?,
            complexity_history: serde_json::from_str(&row.complexity_history)?,
            context: row.project_context,
            conversation_count: row.conversation_count,
            last_intent: row.last_intent,
        })
    }
}

#[derive(sqlx::FromRow)]
struct DefectRow {
    id: String,
    session_id: String,
    industry: String,
    module_name: String,
    severity: String,
    created_at: String,
}

impl TryFrom<DefectRow> for Defect {
    type Error = StorageError;

    fn try_from(row: DefectRow) -> Result<Self, Self::Error> {
        let severity =
            Severity::from_str(&row.severity).map_err(|message| StorageError::Query { message })?;

        Ok(Self {
            id: row.id,
            session_id: row.session_id,
            industry: row.industry,
            module_name: row.module_name,
            severity,
            created_at: parse_timestamp(&row.created_at),
        })
    }
}
