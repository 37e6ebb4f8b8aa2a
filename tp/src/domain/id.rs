//! Record ID generation
//!
//! IDs use the format: `{8-char-hex}-{type}-{slug}`
//! Example: `9f3a01c2-task-develop-backend`

/// Maximum slug length kept in an ID
const MAX_SLUG_LEN: usize = 40;

/// Generate a record ID from type and title
///
/// The hex prefix comes from the random tail of a v7 UUID, so two records
/// with the same title created in the same millisecond still get distinct IDs.
pub fn generate_id(domain_type: &str, title: &str) -> String {
    let uuid = uuid::Uuid::now_v7().simple().to_string();
    let hex = &uuid[uuid.len() - 8..];
    let slug = slugify(title);
    if slug.is_empty() {
        format!("{}-{}", hex, domain_type)
    } else {
        format!("{}-{}-{}", hex, domain_type, slug)
    }
}

/// Slugify a title for use in IDs
fn slugify(title: &str) -> String {
    let slug = title
        .to_lowercase()
        .chars()
        // Strip apostrophes entirely, replace other non-alphanumeric with hyphens
        .filter_map(|c| {
            if c.is_ascii_alphanumeric() {
                Some(c)
            } else if c == '\'' || c == '\u{2019}' || c == '\u{2018}' {
                None
            } else {
                Some('-')
            }
        })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    slug.chars()
        .take(MAX_SLUG_LEN)
        .collect::<String>()
        .trim_end_matches('-')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Design UI/UX"), "design-ui-ux");
        assert_eq!(slugify("HTML/CSS Development"), "html-css-development");
        assert_eq!(slugify("Don't Panic"), "dont-panic");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_slugify_truncates() {
        let slug = slugify(&"word ".repeat(30));
        assert!(slug.len() <= MAX_SLUG_LEN);
        assert!(!slug.ends_with('-'));
    }

    #[test]
    fn test_generate_id_format() {
        let id = generate_id("task", "Develop Backend");
        let parts: Vec<&str> = id.splitn(3, '-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].len(), 8);
        assert_eq!(parts[1], "task");
        assert_eq!(parts[2], "develop-backend");
    }

    #[test]
    fn test_generate_id_unique_for_same_title() {
        let a = generate_id("task", "Testing");
        let b = generate_id("task", "Testing");
        assert_ne!(a, b);
    }

    #[test]
    fn test_generate_id_empty_slug() {
        let id = generate_id("goal", "???");
        assert!(id.ends_with("-goal"));
    }
}
