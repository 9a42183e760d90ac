use chrono::Utc;
use leadpilot_core::models::{Membership, Organization, Role};
use leadpilot_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

/// Repository for organizations and memberships.
#[derive(Clone)]
pub struct OrganizationRepository {
    pool: PgPool,
}

impl OrganizationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The user's active membership: the earliest-created one wins when a
    /// user belongs to several organizations.
    #[tracing::instrument(skip(self), fields(db.table = "memberships", db.operation = "select"))]
    pub async fn find_earliest_membership(
        &self,
        user_id: Uuid,
    ) -> Result<Option<Membership>, AppError> {
        sqlx::query_as::<Postgres, Membership>(
            r#"
            SELECT organization_id, user_id, role, created_at
            FROM memberships
            WHERE user_id = $1
            ORDER BY created_at ASC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::db("find membership", e))
    }

    /// Create an organization and its owner membership in one transaction.
    /// Concurrent duplicate provisioning is resolved by the caller
    /// re-selecting the earliest membership afterwards.
    #[tracing::instrument(
        skip(self, name, slug),
        fields(db.table = "organizations", db.operation = "insert")
    )]
    pub async fn provision_workspace(
        &self,
        user_id: Uuid,
        name: &str,
        slug: &str,
    ) -> Result<Organization, AppError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::db("begin provisioning", e))?;

        let now = Utc::now();
        let organization = sqlx::query_as::<Postgres, Organization>(
            r#"
            INSERT INTO organizations (id, name, slug, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, slug, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(slug)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::db("create organization", e))?;

        sqlx::query(
            r#"
            INSERT INTO memberships (organization_id, user_id, role, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(organization.id)
        .bind(user_id)
        .bind(Role::Owner)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::db("create membership", e))?;

        tx.commit()
            .await
            .map_err(|e| AppError::db("commit provisioning", e))?;

        Ok(organization)
    }

    #[tracing::instrument(skip(self), fields(db.table = "memberships", db.operation = "select"))]
    pub async fn list_members(&self, organization_id: Uuid) -> Result<Vec<Membership>, AppError> {
        sqlx::query_as::<Postgres, Membership>(
            r#"
            SELECT organization_id, user_id, role, created_at
            FROM memberships
            WHERE organization_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::db("list members", e))
    }

    #[tracing::instrument(skip(self), fields(db.table = "memberships", db.operation = "select"))]
    pub async fn get_membership(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Membership>, AppError> {
        sqlx::query_as::<Postgres, Membership>(
            r#"
            SELECT organization_id, user_id, role, created_at
            FROM memberships
            WHERE organization_id = $1 AND user_id = $2
            "#,
        )
        .bind(organization_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::db("fetch membership", e))
    }

    /// Unconditional role change (target is not an owner being demoted).
    #[tracing::instrument(skip(self), fields(db.table = "memberships", db.operation = "update"))]
    pub async fn update_member_role(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
        role: Role,
    ) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE memberships
            SET role = $3
            WHERE organization_id = $1 AND user_id = $2
            "#,
        )
        .bind(organization_id)
        .bind(user_id)
        .bind(role)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::db("update member role", e))?;

        Ok(result.rows_affected())
    }

    /// Demote an owner only while another owner remains. The owner-count
    /// guard is part of the UPDATE itself so the invariant cannot be raced
    /// between a separate check and the write; zero affected rows means the
    /// target was the last owner.
    #[tracing::instrument(skip(self), fields(db.table = "memberships", db.operation = "update"))]
    pub async fn demote_owner_guarded(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
        role: Role,
    ) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE memberships
            SET role = $3
            WHERE organization_id = $1
              AND user_id = $2
              AND role = 'owner'
              AND (
                SELECT COUNT(*) FROM memberships m2
                WHERE m2.organization_id = $1 AND m2.role = 'owner'
              ) > 1
            "#,
        )
        .bind(organization_id)
        .bind(user_id)
        .bind(role)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::db("demote owner", e))?;

        Ok(result.rows_affected())
    }
}
