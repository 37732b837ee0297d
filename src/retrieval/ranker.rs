//! Result ranking strategies
//!
//! Both strategies are pure: they read the merged hit set and return a new,
//! bounded, ordered vector. Sorting is stable, so equal scores keep the merge
//! order and repeated calls give identical output.

use crate::retrieval::hit::{by_score_desc, Hit};
use std::collections::HashSet;

/// Rank hits, choosing the strategy by whether the question named a section
pub fn rank(hits: &[Hit], top_k: usize, target_section: Option<&str>) -> Vec<Hit> {
    match target_section {
        Some(target) => rank_exact_section(hits, top_k, target),
        None => rank_diverse(hits, top_k),
    }
}

/// Exact-section-priority ranking
///
/// Exact section matches first, then sub-sections (string prefix, e.g. "376A"
/// for "376"), then everything else; each bucket by score descending.
pub fn rank_exact_section(hits: &[Hit], top_k: usize, target: &str) -> Vec<Hit> {
    let mut exact = Vec::new();
    let mut prefixed = Vec::new();
    let mut rest = Vec::new();

    for hit in hits {
        let section = hit.section_number();
        if section == target {
            exact.push(hit.clone());
        } else if section.starts_with(target) {
            prefixed.push(hit.clone());
        } else {
            rest.push(hit.clone());
        }
    }

    tracing::debug!(
        "Section {} buckets: {} exact, {} sub-section, {} other",
        target,
        exact.len(),
        prefixed.len(),
        rest.len()
    );

    exact.sort_by(by_score_desc);
    prefixed.sort_by(by_score_desc);
    rest.sort_by(by_score_desc);

    exact
        .into_iter()
        .chain(prefixed)
        .chain(rest)
        .take(top_k)
        .collect()
}

/// Diversity-promoting ranking
///
/// Takes the best hit of each distinct (act, section) and only falls back to
/// repeated sections when there are fewer than `top_k` distinct ones.
pub fn rank_diverse(hits: &[Hit], top_k: usize) -> Vec<Hit> {
    let mut sorted: Vec<&Hit> = hits.iter().collect();
    sorted.sort_by(|a, b| by_score_desc(a, b));

    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    let mut selected: Vec<Hit> = Vec::with_capacity(top_k.min(hits.len()));
    let mut duplicates: Vec<&Hit> = Vec::new();

    for hit in sorted {
        if selected.len() >= top_k {
            break;
        }
        if seen.insert(hit.section_key()) {
            selected.push(hit.clone());
        } else {
            duplicates.push(hit);
        }
    }

    if selected.len() < top_k {
        let missing = top_k - selected.len();
        tracing::debug!(
            "Only {} distinct sections, filling up to {} from {} duplicates",
            selected.len(),
            missing,
            duplicates.len()
        );
        selected.extend(duplicates.into_iter().take(missing).cloned());
    }

    selected.sort_by(by_score_desc);
    selected
}
