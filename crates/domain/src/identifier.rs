//! Human-readable item naming.

/// Builds the first identifier candidate for a new item.
///
/// With a non-blank grouping value the candidate is
/// `"{project}_{value} #{group_count}"`, where `group_count` already includes
/// the new item. Otherwise it falls back to `"{unit} #{total_count}"`, again
/// counting the new item.
#[must_use]
pub fn candidate_identifier(
    project_name: &str,
    unit_name: &str,
    group_value: Option<&str>,
    group_count: u64,
    total_count: u64,
) -> String {
    match group_value.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => format!("{project_name}_{value} #{group_count}"),
        None => format!("{unit_name} #{total_count}"),
    }
}

/// Appends the collision suffix `-{attempt}` to a candidate.
#[must_use]
pub fn suffixed_identifier(candidate: &str, attempt: u32) -> String {
    format!("{candidate}-{attempt}")
}
