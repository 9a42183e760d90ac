use leadpilot_core::models::ActivityItem;
use leadpilot_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

/// Append-only activity log.
#[derive(Clone)]
pub struct ActivityLogRepository {
    pool: PgPool,
}

impl ActivityLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(
        skip(self),
        fields(db.table = "activity_logs", db.operation = "insert")
    )]
    pub async fn append(
        &self,
        organization_id: Uuid,
        actor_id: Uuid,
        entity_type: &str,
        entity_id: Uuid,
        action: &str,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO activity_logs
                (id, organization_id, actor_id, entity_type, entity_id, action, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW())
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(organization_id)
        .bind(actor_id)
        .bind(entity_type)
        .bind(entity_id)
        .bind(action)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::db("append activity", e))?;

        Ok(())
    }

    #[tracing::instrument(
        skip(self),
        fields(db.table = "activity_logs", db.operation = "select")
    )]
    pub async fn recent(
        &self,
        organization_id: Uuid,
        limit: i64,
    ) -> Result<Vec<ActivityItem>, AppError> {
        sqlx::query_as::<Postgres, ActivityItem>(
            r#"
            SELECT id, action, entity_type, created_at
            FROM activity_logs
            WHERE organization_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(organization_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::db("fetch recent activity", e))
    }
}
