//! CSV import parsing and export writing.

pub mod export;
pub mod parser;

pub use export::export_leads_to_csv;
pub use parser::parse_leads_csv;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use leadpilot_core::models::{Lead, LeadStatus};
    use uuid::Uuid;

    #[test]
    fn test_export_then_parse_preserves_fields() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let lead = Lead {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            name: "Smith, \"JJ\" Jane".to_string(),
            email: "jane@example.com".to_string(),
            status: LeadStatus::Won,
            phone: Some("555-0100".to_string()),
            company: Some("Acme, Inc.".to_string()),
            source: None,
            notes: Some("line one\nline two".to_string()),
            created_at: at,
            updated_at: at,
            created_by: None,
            deleted_at: None,
        };

        let text = export_leads_to_csv(std::slice::from_ref(&lead)).unwrap();
        let (rows, errors) = parse_leads_csv(text.as_bytes()).unwrap();

        assert!(errors.is_empty());
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.name, lead.name);
        assert_eq!(row.email, lead.email);
        assert_eq!(row.status, lead.status);
        assert_eq!(row.phone, lead.phone);
        assert_eq!(row.company, lead.company);
        assert_eq!(row.source, lead.source);
        assert_eq!(row.notes, lead.notes);
    }
}
