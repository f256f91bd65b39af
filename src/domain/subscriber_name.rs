use unicode_segmentation::UnicodeSegmentation;

/// Longest name we accept, counted in graphemes.
pub const MAX_NAME_LENGTH: usize = 20;

/// Every rule `s` breaks as a subscriber name, in order. An empty list means the name is valid.
pub fn name_violations(s: &str) -> Vec<String> {
    let mut violations = Vec::new();

    // `.trim()` returns a view over the input `s` without trailing whitespace-like characters.
    if s.trim().is_empty() {
        violations.push("Name is required.".to_string());
    }

    // A grapheme is defined by the Unicode standard as a "user-perceived" character: `a°` is a single
    // grapheme, but it is composed of two characters (`a` and `°`).
    if s.graphemes(true).count() > MAX_NAME_LENGTH {
        violations.push(format!("Name is too long ({MAX_NAME_LENGTH})."));
    }

    violations
}
