use std::collections::{HashMap, HashSet};

use chrono::{Duration, Utc};
use leadpilot_core::models::activity::actions;
use leadpilot_core::models::{
    total_pages, CreateLeadInput, CsvImportResult, CsvLeadRow, Lead, LeadListFilters,
    LeadStatus, OrgContext, OverviewSummary, PaginatedLeads, Role, StatusBucket, UpdateLeadInput,
};
use leadpilot_core::normalize::{normalize_email, to_nullable};
use leadpilot_core::validation::{
    check_email, check_lead_name, check_optional_text, NOTES_MAX_LEN, OPTIONAL_TEXT_MAX_LEN,
};
use leadpilot_core::AppError;
use leadpilot_db::{ActivityLogRepository, LeadRepository};
use uuid::Uuid;

const ENTITY_LEAD: &str = "lead";
const EXPORT_PAGE_SIZE: i64 = 1000;
const OVERVIEW_RECENT_LEADS: i64 = 5;
const OVERVIEW_RECENT_ACTIVITY: i64 = 8;

/// Raw lead creation payload before normalization. Status defaults to `new`.
#[derive(Debug, Clone, Default)]
pub struct LeadDraft {
    pub name: String,
    pub email: String,
    pub status: Option<LeadStatus>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub source: Option<String>,
    pub notes: Option<String>,
}

#[derive(Clone)]
pub struct LeadService {
    leads: LeadRepository,
    activity: ActivityLogRepository,
}

impl LeadService {
    pub fn new(leads: LeadRepository, activity: ActivityLogRepository) -> Self {
        Self { leads, activity }
    }

    #[tracing::instrument(skip(self, filters), fields(org.id = %ctx.organization_id))]
    pub async fn list(
        &self,
        ctx: OrgContext,
        filters: &LeadListFilters,
    ) -> Result<PaginatedLeads, AppError> {
        filters.validate()?;

        let (total, items) = tokio::try_join!(
            self.leads.count_filtered(ctx.organization_id, filters),
            self.leads.list_page(ctx.organization_id, filters),
        )?;

        Ok(PaginatedLeads {
            items,
            total,
            page: filters.page,
            page_size: filters.page_size,
            total_pages: total_pages(total, filters.page_size),
        })
    }

    /// All leads matching the filters, fetched in fixed-size pages so a large
    /// export never materializes as one unbounded query.
    #[tracing::instrument(skip(self, filters), fields(org.id = %ctx.organization_id))]
    pub async fn list_for_export(
        &self,
        ctx: OrgContext,
        filters: &LeadListFilters,
    ) -> Result<Vec<Lead>, AppError> {
        let mut page_filters = filters.clone();
        page_filters.page = 1;
        page_filters.page_size = EXPORT_PAGE_SIZE;

        let mut all = Vec::new();
        loop {
            let page = self
                .leads
                .list_page(ctx.organization_id, &page_filters)
                .await?;
            let fetched = page.len() as i64;
            all.extend(page);
            if fetched < EXPORT_PAGE_SIZE {
                return Ok(all);
            }
            page_filters.page += 1;
        }
    }

    #[tracing::instrument(skip(self), fields(org.id = %ctx.organization_id))]
    pub async fn get(&self, ctx: OrgContext, id: Uuid) -> Result<Lead, AppError> {
        self.leads
            .get(ctx.organization_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Lead not found".to_string()))
    }

    #[tracing::instrument(skip(self, draft), fields(org.id = %ctx.organization_id))]
    pub async fn create(&self, ctx: OrgContext, draft: LeadDraft) -> Result<Lead, AppError> {
        ctx.require_role(Role::Member)?;

        let input = validate_draft(&draft)?;
        let lead = self
            .leads
            .insert(ctx.organization_id, ctx.user_id, &input)
            .await?;

        self.activity
            .append(
                ctx.organization_id,
                ctx.user_id,
                ENTITY_LEAD,
                lead.id,
                actions::LEAD_CREATED,
            )
            .await?;

        Ok(lead)
    }

    #[tracing::instrument(skip(self, input), fields(org.id = %ctx.organization_id))]
    pub async fn update(
        &self,
        ctx: OrgContext,
        id: Uuid,
        input: UpdateLeadInput,
    ) -> Result<Lead, AppError> {
        ctx.require_role(Role::Member)?;

        if input.is_empty() {
            return Err(AppError::InvalidInput(
                "No fields provided to update".to_string(),
            ));
        }

        let input = validate_update(input)?;
        let lead = self
            .leads
            .update_partial(ctx.organization_id, id, &input)
            .await?
            .ok_or_else(|| AppError::NotFound("Lead not found".to_string()))?;

        self.activity
            .append(
                ctx.organization_id,
                ctx.user_id,
                ENTITY_LEAD,
                lead.id,
                actions::LEAD_UPDATED,
            )
            .await?;

        Ok(lead)
    }

    /// Soft-delete is idempotent: deleting an absent or already-deleted lead
    /// succeeds without logging activity.
    #[tracing::instrument(skip(self), fields(org.id = %ctx.organization_id))]
    pub async fn soft_delete(&self, ctx: OrgContext, id: Uuid) -> Result<(), AppError> {
        ctx.require_role(Role::Admin)?;

        let affected = self.leads.soft_delete(ctx.organization_id, id).await?;
        if affected == 0 {
            return Ok(());
        }

        self.activity
            .append(
                ctx.organization_id,
                ctx.user_id,
                ENTITY_LEAD,
                id,
                actions::LEAD_SOFT_DELETED,
            )
            .await?;

        Ok(())
    }

    /// Set one status on many leads at once. Unknown or already-deleted ids
    /// are skipped; the returned count is how many rows actually changed.
    /// Bulk changes are not written to the activity log.
    #[tracing::instrument(skip(self, ids), fields(org.id = %ctx.organization_id))]
    pub async fn bulk_update_status(
        &self,
        ctx: OrgContext,
        ids: &[Uuid],
        status: LeadStatus,
    ) -> Result<u64, AppError> {
        ctx.require_role(Role::Member)?;

        if ids.is_empty() {
            return Err(AppError::InvalidInput(
                "At least one lead id is required".to_string(),
            ));
        }
        self.leads
            .bulk_update_status(ctx.organization_id, ids, status)
            .await
    }

    /// Parse, validate, and reconcile an uploaded CSV. Any row error rejects
    /// the whole file (the summary reports every bad row and nothing is
    /// written). Otherwise rows are upserted keyed on email: new emails
    /// create leads, known emails (including soft-deleted ones) are
    /// overwritten and revived. Duplicate emails within the file collapse to
    /// the last occurrence.
    #[tracing::instrument(skip(self, csv_text), fields(org.id = %ctx.organization_id))]
    pub async fn import_leads(
        &self,
        ctx: OrgContext,
        csv_text: &str,
    ) -> Result<CsvImportResult, AppError> {
        ctx.require_role(Role::Admin)?;
        if !ctx.can_manage_organization() {
            return Err(AppError::Forbidden(
                "Importing leads requires organization management rights".to_string(),
            ));
        }

        let (rows, errors) = crate::csv::parse_leads_csv(csv_text.as_bytes())?;
        if !errors.is_empty() {
            return Ok(CsvImportResult {
                created_count: 0,
                updated_count: 0,
                error_count: errors.len(),
                errors,
            });
        }

        let rows = dedupe_by_email(rows);

        let emails: Vec<String> = rows.iter().map(|r| r.email.clone()).collect();
        let existing: HashSet<String> = self
            .leads
            .existing_emails(ctx.organization_id, &emails)
            .await?
            .into_iter()
            .collect();

        // Counts are decided against the pre-upsert state; the upsert itself
        // reports every row as affected.
        let (created_count, updated_count) = partition_counts(&rows, &existing);

        self.leads
            .upsert_batch(ctx.organization_id, ctx.user_id, &rows)
            .await?;

        tracing::info!(
            created = created_count,
            updated = updated_count,
            rejected = errors.len(),
            "lead import reconciled"
        );

        Ok(CsvImportResult {
            created_count,
            updated_count,
            error_count: errors.len(),
            errors,
        })
    }

    /// Dashboard summary. The independent reads fan out concurrently and the
    /// derived metrics are computed from their results.
    #[tracing::instrument(skip(self), fields(org.id = %ctx.organization_id))]
    pub async fn overview(&self, ctx: OrgContext) -> Result<OverviewSummary, AppError> {
        let org = ctx.organization_id;
        let week_ago = Utc::now() - Duration::days(7);

        let (total, new_this_week, contacted, won, lost, recent_leads, recent_activity) = tokio::try_join!(
            self.leads.count(org, None, None),
            self.leads.count(org, None, Some(week_ago)),
            self.leads.count(org, Some(LeadStatus::Contacted), None),
            self.leads.count(org, Some(LeadStatus::Won), None),
            self.leads.count(org, Some(LeadStatus::Lost), None),
            self.leads.recent_by_updated(org, OVERVIEW_RECENT_LEADS),
            self.activity.recent(org, OVERVIEW_RECENT_ACTIVITY),
        )?;

        Ok(OverviewSummary {
            total_leads: total,
            new_this_week,
            contacted_count: contacted,
            won_count: won,
            lost_count: lost,
            win_rate: win_rate(won, lost),
            status_breakdown: vec![
                StatusBucket {
                    status: LeadStatus::New,
                    count: derive_new_count(total, contacted, won, lost),
                },
                StatusBucket {
                    status: LeadStatus::Contacted,
                    count: contacted,
                },
                StatusBucket {
                    status: LeadStatus::Won,
                    count: won,
                },
                StatusBucket {
                    status: LeadStatus::Lost,
                    count: lost,
                },
            ],
            recent_leads,
            recent_activity,
        })
    }

    /// Seed a fresh workspace with sample leads. A no-op once the workspace
    /// holds any non-deleted lead. Demo emails get a timestamp suffix so a
    /// reseed after deleting everything never collides with the soft-deleted
    /// rows still occupying the email key.
    #[tracing::instrument(skip(self), fields(org.id = %ctx.organization_id))]
    pub async fn generate_demo_leads(&self, ctx: OrgContext) -> Result<usize, AppError> {
        ctx.require_role(Role::Member)?;

        let existing = self.leads.count(ctx.organization_id, None, None).await?;
        if existing > 0 {
            return Ok(0);
        }

        let suffix = Utc::now().timestamp();
        let mut templates = demo_lead_templates();
        for template in &mut templates {
            template.email = template
                .email
                .replacen('@', &format!("+{}@", suffix), 1);
        }
        let ids = self
            .leads
            .insert_batch(ctx.organization_id, ctx.user_id, &templates)
            .await?;

        for id in &ids {
            self.activity
                .append(
                    ctx.organization_id,
                    ctx.user_id,
                    ENTITY_LEAD,
                    *id,
                    actions::LEAD_DEMO_GENERATED,
                )
                .await?;
        }

        Ok(ids.len())
    }
}

/// Validate and normalize a creation draft. All problems are reported in one
/// pass, joined into a single message.
fn validate_draft(draft: &LeadDraft) -> Result<CreateLeadInput, AppError> {
    let mut messages = Vec::new();

    let name = draft.name.trim().to_string();
    if let Some(message) = check_lead_name(&name) {
        messages.push(message);
    }
    if let Some(message) = check_email(&draft.email) {
        messages.push(message);
    }
    for (label, value, max) in [
        ("Phone", draft.phone.as_deref(), OPTIONAL_TEXT_MAX_LEN),
        ("Company", draft.company.as_deref(), OPTIONAL_TEXT_MAX_LEN),
        ("Source", draft.source.as_deref(), OPTIONAL_TEXT_MAX_LEN),
        ("Notes", draft.notes.as_deref(), NOTES_MAX_LEN),
    ] {
        if let Some(message) = check_optional_text(label, value, max) {
            messages.push(message);
        }
    }

    if !messages.is_empty() {
        return Err(AppError::InvalidInput(messages.join(", ")));
    }

    Ok(CreateLeadInput {
        name,
        email: normalize_email(&draft.email),
        status: draft.status.unwrap_or(LeadStatus::New),
        phone: to_nullable(draft.phone.as_deref()),
        company: to_nullable(draft.company.as_deref()),
        source: to_nullable(draft.source.as_deref()),
        notes: to_nullable(draft.notes.as_deref()),
    })
}

/// Validate and normalize the fields present in a partial update, leaving
/// absent fields absent.
fn validate_update(input: UpdateLeadInput) -> Result<UpdateLeadInput, AppError> {
    let mut messages = Vec::new();

    let name = input.name.map(|n| n.trim().to_string());
    if let Some(name) = &name {
        if let Some(message) = check_lead_name(name) {
            messages.push(message);
        }
    }

    let email = input.email.as_deref().map(normalize_email);
    if let Some(email) = &email {
        if let Some(message) = check_email(email) {
            messages.push(message);
        }
    }

    let normalize_field = |messages: &mut Vec<String>,
                           label: &str,
                           value: Option<Option<String>>,
                           max: usize| {
        value.map(|inner| {
            if let Some(message) = check_optional_text(label, inner.as_deref(), max) {
                messages.push(message);
            }
            inner.as_deref().and_then(|v| to_nullable(Some(v)))
        })
    };

    let phone = normalize_field(&mut messages, "Phone", input.phone, OPTIONAL_TEXT_MAX_LEN);
    let company = normalize_field(&mut messages, "Company", input.company, OPTIONAL_TEXT_MAX_LEN);
    let source = normalize_field(&mut messages, "Source", input.source, OPTIONAL_TEXT_MAX_LEN);
    let notes = normalize_field(&mut messages, "Notes", input.notes, NOTES_MAX_LEN);

    if !messages.is_empty() {
        return Err(AppError::InvalidInput(messages.join(", ")));
    }

    Ok(UpdateLeadInput {
        name,
        email,
        status: input.status,
        phone,
        company,
        source,
        notes,
    })
}

/// Collapse duplicate emails to the last occurrence while preserving the
/// order of first appearance. The upsert statement cannot touch the same row
/// twice, so the file must be unique by email before it reaches the database.
fn dedupe_by_email(rows: Vec<CsvLeadRow>) -> Vec<CsvLeadRow> {
    let mut by_email: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<CsvLeadRow> = Vec::with_capacity(rows.len());

    for row in rows {
        match by_email.get(&row.email) {
            Some(&index) => out[index] = row,
            None => {
                by_email.insert(row.email.clone(), out.len());
                out.push(row);
            }
        }
    }
    out
}

/// Split deduplicated rows into (created, updated) against the emails that
/// existed before the upsert ran.
fn partition_counts(rows: &[CsvLeadRow], existing: &HashSet<String>) -> (usize, usize) {
    let updated = rows.iter().filter(|r| existing.contains(&r.email)).count();
    (rows.len() - updated, updated)
}

/// `round(100 * won / (won + lost))`, or 0 when nothing has closed yet.
fn win_rate(won: i64, lost: i64) -> i64 {
    let closed = won + lost;
    if closed == 0 {
        return 0;
    }
    ((won as f64 / closed as f64) * 100.0).round() as i64
}

/// The `new` bucket is derived rather than counted, clamped at zero so a
/// racing write between the count reads cannot produce a negative bucket.
fn derive_new_count(total: i64, contacted: i64, won: i64, lost: i64) -> i64 {
    (total - contacted - won - lost).max(0)
}

fn demo_lead_templates() -> Vec<CreateLeadInput> {
    let rows: [(&str, &str, LeadStatus, Option<&str>, Option<&str>, Option<&str>); 10] = [
        (
            "Sarah Chen",
            "sarah.chen@brightloop.io",
            LeadStatus::New,
            Some("Brightloop"),
            Some("website"),
            Some("Asked for pricing on the annual plan"),
        ),
        (
            "Marcus Webb",
            "marcus@webbconsulting.com",
            LeadStatus::Contacted,
            Some("Webb Consulting"),
            Some("referral"),
            Some("Intro call booked for next week"),
        ),
        (
            "Priya Nair",
            "priya.nair@kitesail.dev",
            LeadStatus::New,
            Some("Kitesail"),
            Some("webinar"),
            None,
        ),
        (
            "Tom Okafor",
            "tom.okafor@gmail.com",
            LeadStatus::Contacted,
            None,
            Some("cold-email"),
            Some("Wants a comparison against their current tool"),
        ),
        (
            "Elena Rossi",
            "elena@rossistudio.it",
            LeadStatus::Won,
            Some("Rossi Studio"),
            Some("website"),
            Some("Signed for the team plan"),
        ),
        (
            "David Park",
            "dpark@northwindlabs.com",
            LeadStatus::New,
            Some("Northwind Labs"),
            Some("conference"),
            None,
        ),
        (
            "Amara Diallo",
            "amara.diallo@solacehealth.org",
            LeadStatus::Contacted,
            Some("Solace Health"),
            Some("referral"),
            Some("Procurement review in progress"),
        ),
        (
            "James Whitfield",
            "james@whitfieldandco.co.uk",
            LeadStatus::Lost,
            Some("Whitfield & Co"),
            Some("cold-email"),
            Some("Went with an in-house build"),
        ),
        (
            "Lucia Mendes",
            "lucia.mendes@avelar.com.br",
            LeadStatus::Won,
            Some("Avelar"),
            Some("website"),
            None,
        ),
        (
            "Noah Lindqvist",
            "noah@lindqvist.se",
            LeadStatus::New,
            None,
            Some("newsletter"),
            Some("Downloaded the onboarding guide"),
        ),
    ];

    rows.into_iter()
        .map(|(name, email, status, company, source, notes)| CreateLeadInput {
            name: name.to_string(),
            email: email.to_string(),
            status,
            phone: None,
            company: company.map(str::to_string),
            source: source.map(str::to_string),
            notes: notes.map(str::to_string),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(email: &str, name: &str) -> CsvLeadRow {
        CsvLeadRow {
            name: name.to_string(),
            email: email.to_string(),
            status: LeadStatus::New,
            phone: None,
            company: None,
            source: None,
            notes: None,
        }
    }

    #[test]
    fn test_win_rate() {
        assert_eq!(win_rate(0, 0), 0);
        assert_eq!(win_rate(1, 0), 100);
        assert_eq!(win_rate(0, 1), 0);
        assert_eq!(win_rate(1, 1), 50);
        assert_eq!(win_rate(1, 2), 33);
        assert_eq!(win_rate(2, 1), 67);
    }

    #[test]
    fn test_derive_new_count_clamps_at_zero() {
        assert_eq!(derive_new_count(10, 3, 2, 1), 4);
        assert_eq!(derive_new_count(3, 3, 0, 0), 0);
        assert_eq!(derive_new_count(2, 2, 1, 0), 0);
    }

    #[test]
    fn test_dedupe_last_occurrence_wins_in_place() {
        let rows = vec![
            row("a@x.com", "First A"),
            row("b@x.com", "B"),
            row("a@x.com", "Second A"),
        ];
        let deduped = dedupe_by_email(rows);

        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].email, "a@x.com");
        assert_eq!(deduped[0].name, "Second A");
        assert_eq!(deduped[1].email, "b@x.com");
    }

    #[test]
    fn test_partition_counts() {
        let rows = vec![row("a@x.com", "A"), row("b@x.com", "B"), row("c@x.com", "C")];
        let existing: HashSet<String> = ["b@x.com".to_string()].into_iter().collect();

        let (created, updated) = partition_counts(&rows, &existing);
        assert_eq!(created, 2);
        assert_eq!(updated, 1);
    }

    #[test]
    fn test_validate_draft_normalizes() {
        let draft = LeadDraft {
            name: "  Alice  ".to_string(),
            email: " Alice@Example.COM ".to_string(),
            status: None,
            phone: Some("   ".to_string()),
            company: Some(" Acme ".to_string()),
            ..Default::default()
        };

        let input = validate_draft(&draft).unwrap();
        assert_eq!(input.name, "Alice");
        assert_eq!(input.email, "alice@example.com");
        assert_eq!(input.status, LeadStatus::New);
        assert!(input.phone.is_none());
        assert_eq!(input.company.as_deref(), Some("Acme"));
    }

    #[test]
    fn test_validate_draft_collects_all_problems() {
        let draft = LeadDraft {
            name: "A".to_string(),
            email: "nope".to_string(),
            ..Default::default()
        };

        let err = validate_draft(&draft).unwrap_err();
        match err {
            AppError::InvalidInput(message) => {
                assert!(message.contains("Name"));
                assert!(message.contains("email"));
            }
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_update_double_option_semantics() {
        let input = UpdateLeadInput {
            email: Some("Bob@X.COM".to_string()),
            phone: Some(None),
            company: Some(Some("  ".to_string())),
            ..Default::default()
        };

        let normalized = validate_update(input).unwrap();
        assert_eq!(normalized.email.as_deref(), Some("bob@x.com"));
        assert_eq!(normalized.phone, Some(None));
        // Blank strings null the field out, same as an explicit null.
        assert_eq!(normalized.company, Some(None));
        assert!(normalized.name.is_none());
        assert!(normalized.notes.is_none());
    }

    #[test]
    fn test_validate_update_rejects_bad_email() {
        let input = UpdateLeadInput {
            email: Some("not-an-email".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            validate_update(input),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_demo_templates_unique_emails() {
        let templates = demo_lead_templates();
        assert_eq!(templates.len(), 10);

        let emails: HashSet<&str> = templates.iter().map(|t| t.email.as_str()).collect();
        assert_eq!(emails.len(), templates.len());
    }
}
