/// Characters with a syntactic meaning in the pattern dialects campground search runs on
const PATTERN_SPECIAL: &[char] = &[
    '-', '[', ']', '{', '}', '(', ')', '*', '+', '?', '.', ',', '\\', '^', '$', '|', '#',
];

/// Escapes untrusted text so it can be embedded in a pattern as a literal substring.
///
/// Every pattern-special character and every ASCII whitespace character is prefixed
/// with a backslash. The escaping is not idempotent: escaping an already escaped string
/// doubles the backslashes, so raw input must be escaped exactly once.
pub fn sanitize_for_pattern_match(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for c in text.chars() {
        if PATTERN_SPECIAL.contains(&c) || (c.is_ascii() && c.is_whitespace()) {
            escaped.push('\\');
        }
        escaped.push(c);
    }

    escaped
}
