/// Longest cause string embedded in a user-facing message
const MAX_CAUSE_CHARS: usize = 200;

/// Collapse an error into a short single-line cause suitable for a user message
///
/// Control characters (newlines, tabs, etc.) become spaces, runs of whitespace are
/// squeezed, and the result is cut at `MAX_CAUSE_CHARS` characters with a trailing `…`.
/// Only the error's own `Display` is used, never its `Debug` form or backtrace.
pub fn short_cause(error: &dyn std::fmt::Display) -> String {
    let normalized = error
        .to_string()
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ");

    if normalized.chars().count() <= MAX_CAUSE_CHARS {
        return normalized;
    }

    let mut truncated: String = normalized.chars().take(MAX_CAUSE_CHARS).collect();
    truncated.push('…');
    truncated
}
