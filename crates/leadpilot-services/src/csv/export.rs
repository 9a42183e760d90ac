use leadpilot_core::models::Lead;
use leadpilot_core::AppError;

const EXPORT_HEADERS: [&str; 9] = [
    "name",
    "email",
    "status",
    "phone",
    "company",
    "source",
    "notes",
    "created_at",
    "updated_at",
];

/// Serialize leads to CSV text. Missing optional fields become empty cells;
/// timestamps are RFC 3339.
pub fn export_leads_to_csv(leads: &[Lead]) -> Result<String, AppError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(EXPORT_HEADERS)
        .map_err(|e| AppError::Internal(format!("CSV export failed: {}", e)))?;

    for lead in leads {
        writer
            .write_record([
                lead.name.as_str(),
                lead.email.as_str(),
                lead.status.as_str(),
                lead.phone.as_deref().unwrap_or(""),
                lead.company.as_deref().unwrap_or(""),
                lead.source.as_deref().unwrap_or(""),
                lead.notes.as_deref().unwrap_or(""),
                &lead.created_at.to_rfc3339(),
                &lead.updated_at.to_rfc3339(),
            ])
            .map_err(|e| AppError::Internal(format!("CSV export failed: {}", e)))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV export failed: {}", e)))?;

    String::from_utf8(bytes).map_err(|e| AppError::Internal(format!("CSV export failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use leadpilot_core::models::LeadStatus;
    use uuid::Uuid;

    fn lead(name: &str, email: &str, company: Option<&str>) -> Lead {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        Lead {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            status: LeadStatus::Contacted,
            phone: None,
            company: company.map(str::to_string),
            source: None,
            notes: None,
            created_at: at,
            updated_at: at,
            created_by: None,
            deleted_at: None,
        }
    }

    #[test]
    fn test_export_writes_header_and_rows() {
        let leads = vec![lead("Alice", "alice@x.com", Some("Acme"))];
        let out = export_leads_to_csv(&leads).unwrap();
        let mut lines = out.lines();

        assert_eq!(
            lines.next().unwrap(),
            "name,email,status,phone,company,source,notes,created_at,updated_at"
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("Alice,alice@x.com,contacted,,Acme,,,"));
        assert!(row.contains("2024-05-01T12:00:00+00:00"));
    }

    #[test]
    fn test_export_empty_set_is_header_only() {
        let out = export_leads_to_csv(&[]).unwrap();
        assert_eq!(out.lines().count(), 1);
    }

    #[test]
    fn test_export_quotes_embedded_commas() {
        let leads = vec![lead("Smith, Jane", "jane@x.com", None)];
        let out = export_leads_to_csv(&leads).unwrap();
        assert!(out.contains("\"Smith, Jane\""));
    }
}
