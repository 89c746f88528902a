use once_cell::sync::Lazy;
use regex::Regex;

// Labels of alphanumerics/hyphens (no leading or trailing hyphen), dot separated,
// ending in an alphabetic TLD of at least two characters.
static DOMAIN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9]([a-zA-Z0-9-]*[a-zA-Z0-9])?(\.[a-zA-Z0-9]([a-zA-Z0-9-]*[a-zA-Z0-9])?)*\.[a-zA-Z]{2,}$",
    )
    .expect("domain pattern is a valid regex")
});

/// Check a candidate domain name against the accepted syntax.
///
/// Accepts either a string or an absent value; `None` and `""` are never valid.
/// Case is preserved and not significant for the check.
pub fn is_valid_domain<'a>(domain: impl Into<Option<&'a str>>) -> bool {
    match domain.into() {
        Some(domain) if !domain.is_empty() => DOMAIN_PATTERN.is_match(domain),
        _ => false,
    }
}
