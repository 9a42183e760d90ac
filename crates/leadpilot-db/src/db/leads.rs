use chrono::{DateTime, Utc};
use leadpilot_core::models::{
    CreateLeadInput, CsvLeadRow, Lead, LeadListFilters, LeadStatus, StatusFilter, UpdateLeadInput,
};
use leadpilot_core::normalize::escape_like;
use leadpilot_core::AppError;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

const LEAD_COLUMNS: &str = "id, organization_id, name, email, status, phone, company, source, \
                            notes, created_at, updated_at, created_by, deleted_at";

/// Repository for leads. Every query binds the owning organization first.
#[derive(Clone)]
pub struct LeadRepository {
    pool: PgPool,
}

impl LeadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append the WHERE clause shared by the count and page queries so the
    /// two can never disagree about which rows are in scope.
    fn push_list_filters<'a>(builder: &mut QueryBuilder<'a, Postgres>, org: Uuid, filters: &'a LeadListFilters) {
        builder.push(" WHERE organization_id = ").push_bind(org);

        if !filters.include_deleted {
            builder.push(" AND deleted_at IS NULL");
        }

        if let Some(StatusFilter::Only(status)) = filters.status {
            builder.push(" AND status = ").push_bind(status);
        }

        if let Some(q) = filters.q.as_deref() {
            let q = q.trim();
            if !q.is_empty() {
                let pattern = format!("%{}%", escape_like(q));
                builder
                    .push(" AND (name ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" ESCAPE '\\' OR email ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" ESCAPE '\\' OR company ILIKE ")
                    .push_bind(pattern)
                    .push(" ESCAPE '\\')");
            }
        }
    }

    #[tracing::instrument(skip(self, filters), fields(db.table = "leads", db.operation = "select"))]
    pub async fn count_filtered(
        &self,
        organization_id: Uuid,
        filters: &LeadListFilters,
    ) -> Result<i64, AppError> {
        let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM leads");
        Self::push_list_filters(&mut builder, organization_id, filters);

        builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::db("count leads", e))
    }

    /// One page of leads under the given filters. Sort column and direction
    /// come from whitelisted enums, never raw input.
    #[tracing::instrument(skip(self, filters), fields(db.table = "leads", db.operation = "select"))]
    pub async fn list_page(
        &self,
        organization_id: Uuid,
        filters: &LeadListFilters,
    ) -> Result<Vec<Lead>, AppError> {
        let mut builder = QueryBuilder::new(format!("SELECT {} FROM leads", LEAD_COLUMNS));
        Self::push_list_filters(&mut builder, organization_id, filters);

        builder
            .push(" ORDER BY ")
            .push(filters.sort.column())
            .push(" ")
            .push(filters.direction.sql())
            .push(", id DESC LIMIT ")
            .push_bind(filters.page_size)
            .push(" OFFSET ")
            .push_bind(filters.offset());

        builder
            .build_query_as::<Lead>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::db("list leads", e))
    }

    #[tracing::instrument(skip(self), fields(db.table = "leads", db.operation = "select"))]
    pub async fn get(&self, organization_id: Uuid, id: Uuid) -> Result<Option<Lead>, AppError> {
        sqlx::query_as::<Postgres, Lead>(&format!(
            "SELECT {} FROM leads WHERE organization_id = $1 AND id = $2 AND deleted_at IS NULL",
            LEAD_COLUMNS
        ))
        .bind(organization_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::db("fetch lead", e))
    }

    #[tracing::instrument(skip(self, input), fields(db.table = "leads", db.operation = "insert"))]
    pub async fn insert(
        &self,
        organization_id: Uuid,
        created_by: Uuid,
        input: &CreateLeadInput,
    ) -> Result<Lead, AppError> {
        sqlx::query_as::<Postgres, Lead>(&format!(
            r#"
            INSERT INTO leads
                (id, organization_id, name, email, status, phone, company, source, notes,
                 created_at, updated_at, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW(), NOW(), $10)
            RETURNING {}
            "#,
            LEAD_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(organization_id)
        .bind(&input.name)
        .bind(&input.email)
        .bind(input.status)
        .bind(&input.phone)
        .bind(&input.company)
        .bind(&input.source)
        .bind(&input.notes)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::db("create lead", e))
    }

    /// Apply only the fields present in the update. Callers reject empty
    /// updates before reaching here.
    #[tracing::instrument(skip(self, input), fields(db.table = "leads", db.operation = "update"))]
    pub async fn update_partial(
        &self,
        organization_id: Uuid,
        id: Uuid,
        input: &UpdateLeadInput,
    ) -> Result<Option<Lead>, AppError> {
        let mut builder = QueryBuilder::new("UPDATE leads SET updated_at = NOW()");

        if let Some(name) = &input.name {
            builder.push(", name = ").push_bind(name);
        }
        if let Some(email) = &input.email {
            builder.push(", email = ").push_bind(email);
        }
        if let Some(status) = input.status {
            builder.push(", status = ").push_bind(status);
        }
        if let Some(phone) = &input.phone {
            builder.push(", phone = ").push_bind(phone.as_deref());
        }
        if let Some(company) = &input.company {
            builder.push(", company = ").push_bind(company.as_deref());
        }
        if let Some(source) = &input.source {
            builder.push(", source = ").push_bind(source.as_deref());
        }
        if let Some(notes) = &input.notes {
            builder.push(", notes = ").push_bind(notes.as_deref());
        }

        builder
            .push(" WHERE organization_id = ")
            .push_bind(organization_id)
            .push(" AND id = ")
            .push_bind(id)
            .push(" AND deleted_at IS NULL RETURNING ")
            .push(LEAD_COLUMNS);

        builder
            .build_query_as::<Lead>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::db("update lead", e))
    }

    /// Mark a lead deleted; already-deleted rows are not matched, so the
    /// affected-row count distinguishes success from not-found.
    #[tracing::instrument(skip(self), fields(db.table = "leads", db.operation = "update"))]
    pub async fn soft_delete(&self, organization_id: Uuid, id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE leads
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE organization_id = $1 AND id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(organization_id)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::db("delete lead", e))?;

        Ok(result.rows_affected())
    }

    #[tracing::instrument(skip(self, ids), fields(db.table = "leads", db.operation = "update"))]
    pub async fn bulk_update_status(
        &self,
        organization_id: Uuid,
        ids: &[Uuid],
        status: LeadStatus,
    ) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE leads
            SET status = $3, updated_at = NOW()
            WHERE organization_id = $1 AND id = ANY($2) AND deleted_at IS NULL
            "#,
        )
        .bind(organization_id)
        .bind(ids)
        .bind(status)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::db("bulk update leads", e))?;

        Ok(result.rows_affected())
    }

    /// Count non-deleted leads, optionally narrowed by status and a lower
    /// created_at bound.
    #[tracing::instrument(skip(self), fields(db.table = "leads", db.operation = "select"))]
    pub async fn count(
        &self,
        organization_id: Uuid,
        status: Option<LeadStatus>,
        created_after: Option<DateTime<Utc>>,
    ) -> Result<i64, AppError> {
        let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM leads WHERE organization_id = ");
        builder.push_bind(organization_id).push(" AND deleted_at IS NULL");

        if let Some(status) = status {
            builder.push(" AND status = ").push_bind(status);
        }
        if let Some(after) = created_after {
            builder.push(" AND created_at >= ").push_bind(after);
        }

        builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::db("count leads", e))
    }

    /// Most recently touched leads for the overview feed.
    #[tracing::instrument(skip(self), fields(db.table = "leads", db.operation = "select"))]
    pub async fn recent_by_updated(
        &self,
        organization_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Lead>, AppError> {
        sqlx::query_as::<Postgres, Lead>(&format!(
            r#"
            SELECT {} FROM leads
            WHERE organization_id = $1 AND deleted_at IS NULL
            ORDER BY updated_at DESC, id DESC
            LIMIT $2
            "#,
            LEAD_COLUMNS
        ))
        .bind(organization_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::db("fetch recent leads", e))
    }

    /// Which of the given emails already exist (deleted rows included, since
    /// import revives them in place).
    #[tracing::instrument(skip(self, emails), fields(db.table = "leads", db.operation = "select"))]
    pub async fn existing_emails(
        &self,
        organization_id: Uuid,
        emails: &[String],
    ) -> Result<Vec<String>, AppError> {
        sqlx::query_scalar::<Postgres, String>(
            "SELECT email FROM leads WHERE organization_id = $1 AND email = ANY($2)",
        )
        .bind(organization_id)
        .bind(emails)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::db("check existing emails", e))
    }

    /// Insert-or-revive a batch of import rows keyed on (organization, email).
    /// A conflicting row is overwritten field-for-field and undeleted. Rows
    /// must be deduplicated by email before calling; Postgres rejects a
    /// statement that touches the same row twice.
    #[tracing::instrument(skip(self, rows), fields(db.table = "leads", db.operation = "insert"))]
    pub async fn upsert_batch(
        &self,
        organization_id: Uuid,
        created_by: Uuid,
        rows: &[CsvLeadRow],
    ) -> Result<u64, AppError> {
        if rows.is_empty() {
            return Ok(0);
        }

        let mut builder = QueryBuilder::new(
            "INSERT INTO leads \
             (id, organization_id, name, email, status, phone, company, source, notes, \
              created_at, updated_at, created_by) ",
        );

        builder.push_values(rows, |mut b, row| {
            b.push_bind(Uuid::new_v4())
                .push_bind(organization_id)
                .push_bind(&row.name)
                .push_bind(&row.email)
                .push_bind(row.status)
                .push_bind(&row.phone)
                .push_bind(&row.company)
                .push_bind(&row.source)
                .push_bind(&row.notes)
                .push("NOW()")
                .push("NOW()")
                .push_bind(created_by);
        });

        builder.push(
            r#"
            ON CONFLICT (organization_id, email) DO UPDATE SET
                name = EXCLUDED.name,
                status = EXCLUDED.status,
                phone = EXCLUDED.phone,
                company = EXCLUDED.company,
                source = EXCLUDED.source,
                notes = EXCLUDED.notes,
                updated_at = NOW(),
                deleted_at = NULL
            "#,
        );

        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::db("import leads", e))?;

        Ok(result.rows_affected())
    }

    /// Plain batch insert used for demo seeding; no conflict handling, the
    /// caller guarantees the workspace is empty.
    #[tracing::instrument(skip(self, rows), fields(db.table = "leads", db.operation = "insert"))]
    pub async fn insert_batch(
        &self,
        organization_id: Uuid,
        created_by: Uuid,
        rows: &[CreateLeadInput],
    ) -> Result<Vec<Uuid>, AppError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder = QueryBuilder::new(
            "INSERT INTO leads \
             (id, organization_id, name, email, status, phone, company, source, notes, \
              created_at, updated_at, created_by) ",
        );

        builder.push_values(rows, |mut b, row| {
            b.push_bind(Uuid::new_v4())
                .push_bind(organization_id)
                .push_bind(&row.name)
                .push_bind(&row.email)
                .push_bind(row.status)
                .push_bind(&row.phone)
                .push_bind(&row.company)
                .push_bind(&row.source)
                .push_bind(&row.notes)
                .push("NOW()")
                .push("NOW()")
                .push_bind(created_by);
        });

        builder.push(" RETURNING id");

        builder
            .build_query_scalar::<Uuid>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::db("seed demo leads", e))
    }
}
