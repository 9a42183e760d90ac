use leadpilot_core::models::{CsvLeadRow, CsvRowError, LeadStatus};
use leadpilot_core::normalize::{normalize_email, to_nullable};
use leadpilot_core::validation::{
    check_email, check_lead_name, check_optional_text, NOTES_MAX_LEN, OPTIONAL_TEXT_MAX_LEN,
};
use leadpilot_core::AppError;

/// Column indices resolved from the header row. Header matching is
/// case-insensitive and order-independent; only name and email are required.
struct ColumnMap {
    name: usize,
    email: usize,
    status: Option<usize>,
    phone: Option<usize>,
    company: Option<usize>,
    source: Option<usize>,
    notes: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, AppError> {
        let find = |wanted: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(wanted))
        };

        let name = find("name");
        let email = find("email");
        match (name, email) {
            (Some(name), Some(email)) => Ok(ColumnMap {
                name,
                email,
                status: find("status"),
                phone: find("phone"),
                company: find("company"),
                source: find("source"),
                notes: find("notes"),
            }),
            _ => Err(AppError::InvalidInput(
                "CSV must include name and email columns".to_string(),
            )),
        }
    }
}

fn field<'a>(record: &'a csv::StringRecord, index: Option<usize>) -> Option<&'a str> {
    index.and_then(|i| record.get(i))
}

/// Parse an uploaded CSV into validated rows plus per-row errors.
///
/// Row numbers in errors are 1-based file lines including the header, so the
/// first data row is row 2. A row with several problems gets one error whose
/// message joins them with ", ". Valid rows come back normalized: name
/// trimmed, email lowercased, blank optional fields as `None`, blank status
/// as [`LeadStatus::New`].
pub fn parse_leads_csv(bytes: &[u8]) -> Result<(Vec<CsvLeadRow>, Vec<CsvRowError>), AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|e| AppError::InvalidInput(format!("Unreadable CSV header: {}", e)))?
        .clone();
    let columns = ColumnMap::from_headers(&headers)?;

    let mut rows = Vec::new();
    let mut errors = Vec::new();

    for (index, record) in reader.records().enumerate() {
        let row = index + 2;

        let record = match record {
            Ok(record) => record,
            Err(e) => {
                errors.push(CsvRowError {
                    row,
                    message: format!("Malformed row: {}", e),
                });
                continue;
            }
        };

        // Blank lines parse as a single empty field; skip them silently.
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }

        let mut messages = Vec::new();

        let name = record.get(columns.name).unwrap_or("").trim().to_string();
        if let Some(message) = check_lead_name(&name) {
            messages.push(message);
        }

        let raw_email = record.get(columns.email).unwrap_or("");
        if let Some(message) = check_email(raw_email) {
            messages.push(message);
        }
        let email = normalize_email(raw_email);

        let status = match field(&record, columns.status).map(str::trim) {
            None | Some("") => LeadStatus::New,
            Some(raw) => match raw.to_ascii_lowercase().parse::<LeadStatus>() {
                Ok(status) => status,
                Err(_) => {
                    messages.push("Status must be one of new, contacted, won, lost".to_string());
                    LeadStatus::New
                }
            },
        };

        let phone = field(&record, columns.phone);
        let company = field(&record, columns.company);
        let source = field(&record, columns.source);
        let notes = field(&record, columns.notes);

        for (label, value, max) in [
            ("Phone", phone, OPTIONAL_TEXT_MAX_LEN),
            ("Company", company, OPTIONAL_TEXT_MAX_LEN),
            ("Source", source, OPTIONAL_TEXT_MAX_LEN),
            ("Notes", notes, NOTES_MAX_LEN),
        ] {
            if let Some(message) = check_optional_text(label, value, max) {
                messages.push(message);
            }
        }

        if messages.is_empty() {
            rows.push(CsvLeadRow {
                name,
                email,
                status,
                phone: to_nullable(phone),
                company: to_nullable(company),
                source: to_nullable(source),
                notes: to_nullable(notes),
            });
        } else {
            errors.push(CsvRowError {
                row,
                message: messages.join(", "),
            });
        }
    }

    Ok((rows, errors))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_minimal_csv() {
        let csv = "name,email\nAlice,alice@example.com\n";
        let (rows, errors) = parse_leads_csv(csv.as_bytes()).unwrap();

        assert!(errors.is_empty());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Alice");
        assert_eq!(rows[0].email, "alice@example.com");
        assert_eq!(rows[0].status, LeadStatus::New);
        assert!(rows[0].phone.is_none());
    }

    #[test]
    fn test_invalid_email_reported_with_file_line() {
        let csv = "name,email\nAlice,alice@example.com\nBad,not-an-email\n";
        let (rows, errors) = parse_leads_csv(csv.as_bytes()).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].row, 3);
        assert!(errors[0].message.contains("email"));
    }

    #[test]
    fn test_multiple_problems_join_into_one_message() {
        let csv = "name,email,status\nX,nope,maybe\n";
        let (rows, errors) = parse_leads_csv(csv.as_bytes()).unwrap();

        assert!(rows.is_empty());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].row, 2);
        let parts: Vec<&str> = errors[0].message.split(", ").collect();
        assert_eq!(parts.len(), 3);
    }

    #[test]
    fn test_headers_case_insensitive_and_reordered() {
        let csv = "Email,NAME,Status,Company\nbob@x.com,Bob,won,Acme\n";
        let (rows, errors) = parse_leads_csv(csv.as_bytes()).unwrap();

        assert!(errors.is_empty());
        assert_eq!(rows[0].name, "Bob");
        assert_eq!(rows[0].status, LeadStatus::Won);
        assert_eq!(rows[0].company.as_deref(), Some("Acme"));
    }

    #[test]
    fn test_missing_required_header_rejects_whole_file() {
        let csv = "name,phone\nAlice,555-0100\n";
        let err = parse_leads_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn test_email_lowercased_and_blank_optionals_null() {
        let csv = "name,email,phone,notes\nAlice,ALICE@Example.COM,,  \n";
        let (rows, _) = parse_leads_csv(csv.as_bytes()).unwrap();

        assert_eq!(rows[0].email, "alice@example.com");
        assert!(rows[0].phone.is_none());
        assert!(rows[0].notes.is_none());
    }

    #[test]
    fn test_blank_lines_skipped() {
        let csv = "name,email\nAlice,alice@x.com\n\n";
        let (rows, errors) = parse_leads_csv(csv.as_bytes()).unwrap();

        assert_eq!(rows.len(), 1);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_overlong_notes_rejected() {
        let long = "x".repeat(5001);
        let csv = format!("name,email,notes\nAlice,alice@x.com,{}\n", long);
        let (rows, errors) = parse_leads_csv(csv.as_bytes()).unwrap();

        assert!(rows.is_empty());
        assert_eq!(errors[0].row, 2);
        assert!(errors[0].message.contains("Notes"));
    }
}
