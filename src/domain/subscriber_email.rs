use once_cell::sync::Lazy;
use regex::Regex;
use validator::validate_email;

// Something before the `@`, and a host with at least one dot after it.
static DOMAIN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("The email domain pattern is a valid regex")
});

/// Checks `s` against the email rules. A blank input only reports that the email is required;
/// otherwise both the syntax check and the domain check are reported if they fail.
pub fn email_violations(s: &str) -> Vec<String> {
    if s.trim().is_empty() {
        return vec!["Email is required.".to_string()];
    }

    let mut violations = Vec::new();
    if !validate_email(s) {
        violations.push("Invalid email format.".to_string());
    }
    if !DOMAIN_PATTERN.is_match(s) {
        violations.push("Email must contain a valid domain.".to_string());
    }
    violations
}
