//! Set operations over class-code lists.
//!
//! Class lists are stored as vectors but treated as sets: every function here
//! keeps the first occurrence of a code and preserves the input order.

use std::collections::HashSet;

/// 去除重複，保留第一次出現的順序
pub fn dedupe(classes: &[String]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(classes.len());
    classes
        .iter()
        .filter(|code| seen.insert(code.as_str()))
        .cloned()
        .collect()
}

/// Codes of `base` that are not listed in `to_remove`, in `base` order.
pub fn difference(base: &[String], to_remove: &[String]) -> Vec<String> {
    let removed: HashSet<&str> = to_remove.iter().map(String::as_str).collect();
    base.iter()
        .filter(|code| !removed.contains(code.as_str()))
        .cloned()
        .collect()
}

/// `dedupe(base ++ additions)`
pub fn merge(base: &[String], additions: &[String]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(base.len() + additions.len());
    base.iter()
        .chain(additions)
        .filter(|code| seen.insert(code.as_str()))
        .cloned()
        .collect()
}
