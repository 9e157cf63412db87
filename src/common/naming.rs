//! Auto-naming for untitled folders and notes
//!
//! Names follow the pattern `Base`, `Base 2`, `Base 3`, ... The bare base is
//! only handed out while no name of the sequence exists. After that the lowest
//! free suffix from 2 upwards wins, so gaps left by deletions are reused.

use std::collections::BTreeSet;

/// Sequence number a name occupies for `base`, if any.
fn sequence_number(base: &str, name: &str) -> Option<u64> {
    if name == base {
        return Some(1);
    }
    let suffix = name.strip_prefix(base)?.strip_prefix(' ')?;
    if suffix.is_empty() || suffix.starts_with('0') || !suffix.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    suffix.parse::<u64>().ok().filter(|n| *n >= 2)
}

/// Picks the lowest free name in the `base` sequence.
pub fn next_available_name<I, S>(base: &str, existing: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let taken: BTreeSet<u64> = existing
        .into_iter()
        .filter_map(|name| sequence_number(base, name.as_ref()))
        .collect();

    if taken.is_empty() {
        return base.to_string();
    }

    let mut candidate = 2;
    while taken.contains(&candidate) {
        candidate += 1;
    }
    format!("{} {}", base, candidate)
}

/// `LIKE` pattern matching the numbered names of a base (`Base %`).
pub fn numbered_pattern(base: &str) -> String {
    format!("{} %", super::helpers::escape_like(base))
}
