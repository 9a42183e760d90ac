//! Input normalization helpers.
//!
//! All blank-to-null coercion, email casing, workspace naming, and pattern
//! escaping lives here so that create, update, and CSV import paths apply
//! identical rules.

/// Trim a free-text optional field; empty or whitespace-only becomes None.
pub fn to_nullable(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Emails are stored trimmed and lowercased.
pub fn normalize_email(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Derive a workspace slug base from an arbitrary string (usually an email
/// local-part): lowercase, collapse non-alphanumeric runs to single hyphens,
/// trim leading/trailing hyphens, fall back to "workspace" when nothing is left.
pub fn slugify_workspace_name(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut last_was_hyphen = true; // suppress leading hyphen
    for ch in value.to_lowercase().chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch);
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        "workspace".to_string()
    } else {
        slug
    }
}

/// Turn a slug base into a display name: hyphens become spaces, each word is
/// title-cased, and " Workspace" is appended.
pub fn workspace_display_name(slug_base: &str) -> String {
    let mut words: Vec<String> = slug_base
        .split('-')
        .filter(|token| !token.is_empty())
        .map(title_case)
        .collect();
    words.push("Workspace".to_string());
    words.join(" ")
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Escape a free-text search term for use inside an ILIKE pattern with
/// `ESCAPE '\'`: backslash, `%`, and `_` are escaped so they match literally,
/// and commas are replaced with spaces to keep them out of filter clauses.
pub fn escape_like(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '%' => out.push_str("\\%"),
            '_' => out.push_str("\\_"),
            ',' => out.push(' '),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_nullable() {
        assert_eq!(to_nullable(None), None);
        assert_eq!(to_nullable(Some("")), None);
        assert_eq!(to_nullable(Some("   ")), None);
        assert_eq!(to_nullable(Some("  Acme ")), Some("Acme".to_string()));
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Jane.Doe@Example.COM "), "jane.doe@example.com");
    }

    #[test]
    fn test_slugify_workspace_name() {
        assert_eq!(slugify_workspace_name("jane.doe"), "jane-doe");
        assert_eq!(slugify_workspace_name("Jane++Doe"), "jane-doe");
        assert_eq!(slugify_workspace_name("--jane--"), "jane");
        assert_eq!(slugify_workspace_name("!!!"), "workspace");
        assert_eq!(slugify_workspace_name(""), "workspace");
    }

    #[test]
    fn test_workspace_display_name() {
        assert_eq!(workspace_display_name("jane-doe"), "Jane Doe Workspace");
        assert_eq!(workspace_display_name("workspace"), "Workspace Workspace");
    }

    #[test]
    fn test_escape_like_literals() {
        assert_eq!(escape_like("100%_done"), "100\\%\\_done");
        assert_eq!(escape_like("a,b"), "a b");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
        assert_eq!(escape_like("plain"), "plain");
    }
}
