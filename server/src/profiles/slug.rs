//! Slug and username rules for profile pages.

use std::sync::LazyLock;

use regex::Regex;

/// Maximum slug length in characters.
pub const MAX_SLUG_LENGTH: usize = 100;

/// Minimum slug length in characters.
pub const MIN_SLUG_LENGTH: usize = 3;

/// Reserved slugs that cannot be used for profile pages.
///
/// These collide with routes under `/api/profiles` or the site's own pages.
pub const RESERVED_SLUGS: &[&str] = &[
    "admin", "api", "new", "edit", "delete", "settings", "create", "update", "list", "all", "me",
    "system", "team", "login", "logout", "signup", "portfolio", "projects", "tasks",
];

static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("valid slug regex"));

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]{3,32}$").expect("valid username regex"));

/// Generate URL-friendly slug from a display string.
#[must_use]
pub fn slugify(input: &str) -> String {
    let slug: String = input
        .to_lowercase()
        .chars()
        // Only keep ASCII alphanumeric characters
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    if slug.len() <= MAX_SLUG_LENGTH {
        slug
    } else {
        slug.chars()
            .take(MAX_SLUG_LENGTH)
            .collect::<String>()
            .trim_end_matches('-')
            .to_string()
    }
}

/// Check if slug is a reserved system path.
#[must_use]
pub fn is_reserved_slug(slug: &str) -> bool {
    RESERVED_SLUGS.contains(&slug)
}

/// Validate a slug, returning a user-facing message on failure.
pub fn validate_slug(slug: &str) -> Result<(), String> {
    let len = slug.chars().count();
    if !(MIN_SLUG_LENGTH..=MAX_SLUG_LENGTH).contains(&len) {
        return Err(format!(
            "Slug must be {MIN_SLUG_LENGTH}-{MAX_SLUG_LENGTH} characters"
        ));
    }
    if !SLUG_RE.is_match(slug) {
        return Err(
            "Slug may only contain lowercase letters, digits and single hyphens".to_string(),
        );
    }
    if is_reserved_slug(slug) {
        return Err(format!("Slug '{slug}' is reserved"));
    }
    Ok(())
}

/// Validate a username, returning a user-facing message on failure.
pub fn validate_username(username: &str) -> Result<(), String> {
    if USERNAME_RE.is_match(username) {
        Ok(())
    } else {
        Err("Username must be 3-32 letters, digits or underscores".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("  Spaced  Out  "), "spaced-out");
        assert_eq!(slugify("ada_lovelace"), "ada-lovelace");
        assert_eq!(slugify("UPPERCASE"), "uppercase");
        assert_eq!(slugify("Über Café"), "ber-caf");
    }

    #[test]
    fn test_slugify_truncates_without_trailing_hyphen() {
        let long = format!("{} tail", "a".repeat(MAX_SLUG_LENGTH - 1));
        let slug = slugify(&long);
        assert!(slug.len() <= MAX_SLUG_LENGTH);
        assert!(!slug.ends_with('-'));
    }

    #[test]
    fn test_validate_slug() {
        assert!(validate_slug("ada-lovelace").is_ok());
        assert!(validate_slug("abc").is_ok());
        assert!(validate_slug("ab").is_err());
        assert!(validate_slug("Ada").is_err());
        assert!(validate_slug("double--hyphen").is_err());
        assert!(validate_slug("-leading").is_err());
        assert!(validate_slug("team").is_err());
        assert!(validate_slug(&"a".repeat(MAX_SLUG_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_reserved_slugs_are_valid_shape() {
        // Reserved entries must be rejected only for being reserved.
        for slug in RESERVED_SLUGS.iter().filter(|s| s.len() >= MIN_SLUG_LENGTH) {
            let err = validate_slug(slug).unwrap_err();
            assert!(err.contains("reserved"), "{slug}: {err}");
        }
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("ada_l").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username(&"x".repeat(33)).is_err());
    }
}
