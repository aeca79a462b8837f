//! Placeholders for values a record may not have.

/// Shown where a person reference is missing or unresolved.
pub const UNASSIGNED: &str = "Unassigned";

/// Shown for any other missing value.
pub const MISSING: &str = "—";

/// The resolved value, or `placeholder` when there is none (or it is blank).
pub fn or_placeholder<'a>(value: Option<&'a str>, placeholder: &'a str) -> &'a str {
    value.filter(|v| !v.trim().is_empty()).unwrap_or(placeholder)
}

pub fn person_or_unassigned(name: Option<&str>) -> &str {
    or_placeholder(name, UNASSIGNED)
}

pub fn or_dash(value: Option<&str>) -> &str {
    or_placeholder(value, MISSING)
}
