use std::collections::{HashMap, HashSet};

use unicode_segmentation::UnicodeSegmentation;

use crate::algo::weighting::TermWeights;

/// Terms taken from each member when scoring a cluster's label.
pub const TERMS_PER_MEMBER: usize = 5;
/// Label for a cluster whose members have no terms at all.
pub const FALLBACK_LABEL: &str = "Misc";

/// A cluster label and the ranked terms it was chosen from.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterLabel {
    pub name: String,
    /// Aggregated terms, best first.
    pub keywords: Vec<(String, f64)>,
}

/// Label a cluster by the term with the highest summed weight across the
/// top [`TERMS_PER_MEMBER`] terms of each member (members are model positions).
/// Ties go to the lexicographically smaller term.
pub fn label_cluster(members: &[usize], model: &TermWeights) -> ClusterLabel {
    let mut scores: HashMap<String, f64> = HashMap::new();
    for &pos in members {
        for (term, weight) in model.top_terms_at(pos, TERMS_PER_MEMBER) {
            *scores.entry(term).or_insert(0.0) += weight;
        }
    }

    let mut keywords: Vec<(String, f64)> = scores.into_iter().collect();
    keywords.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let name = keywords
        .first()
        .map(|(term, _)| capitalize(term))
        .unwrap_or_else(|| FALLBACK_LABEL.to_string());
    ClusterLabel { name, keywords }
}

/// Uppercase the first grapheme, leaving the rest untouched.
pub fn capitalize(s: &str) -> String {
    let mut graphemes = s.graphemes(true);
    match graphemes.next() {
        Some(first) => {
            let mut out = first.to_uppercase();
            out.push_str(graphemes.as_str());
            out
        }
        None => String::new(),
    }
}

/// Hands out unique display names within one clustering run.
///
/// A name already taken gets `" (2)"`, `" (3)"`, … appended, in the order
/// names are requested.
#[derive(Debug, Clone, Default)]
pub struct NameRegistry {
    taken: HashSet<String>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `name` as used without handing it out (e.g. the catch-all label).
    pub fn reserve(&mut self, name: &str) {
        self.taken.insert(name.to_string());
    }

    pub fn claim(&mut self, name: &str) -> String {
        let mut candidate = name.to_string();
        let mut counter = 2;
        while self.taken.contains(&candidate) {
            candidate = format!("{name} ({counter})");
            counter += 1;
        }
        self.taken.insert(candidate.clone());
        candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::tokenizer::StopWords;

    fn model(texts: &[&str]) -> TermWeights {
        TermWeights::from_documents(
            texts.iter().enumerate().map(|(i, t)| (i.to_string(), *t)),
            StopWords::default(),
        )
        .unwrap()
    }

    #[test]
    fn picks_shared_term() {
        let m = model(&[
            "rust borrow",
            "rust traits",
            "rust macros",
            "rust cargo",
            "weather today",
            "bread recipe",
            "stock market",
            "football scores",
        ]);
        let label = label_cluster(&[0, 1, 2, 3], &m);
        assert_eq!(label.name, "Rust");
        assert_eq!(label.keywords[0].0, "rust");
        assert!(label.keywords.iter().any(|(t, _)| t == "borrow"));
    }

    #[test]
    fn empty_members_fall_back() {
        let m = model(&["", "the of"]);
        let label = label_cluster(&[0, 1], &m);
        assert_eq!(label.name, FALLBACK_LABEL);
        assert!(label.keywords.is_empty());
    }

    #[test]
    fn ties_resolve_by_term() {
        let m = model(&["zebra apple"]);
        assert_eq!(label_cluster(&[0], &m).name, "Apple");
    }

    #[test]
    fn capitalize_unicode() {
        assert_eq!(capitalize("rust"), "Rust");
        assert_eq!(capitalize("élan"), "Élan");
        assert_eq!(capitalize("ßig"), "SSig");
        assert_eq!(capitalize("東京"), "東京");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn registry_suffixes_in_order() {
        let mut names = NameRegistry::new();
        assert_eq!(names.claim("Rust"), "Rust");
        assert_eq!(names.claim("Rust"), "Rust (2)");
        assert_eq!(names.claim("Rust"), "Rust (3)");
        assert_eq!(names.claim("Go"), "Go");
    }

    #[test]
    fn registry_respects_reserved() {
        let mut names = NameRegistry::new();
        names.reserve("Other");
        assert_eq!(names.claim("Other"), "Other (2)");
    }
}
