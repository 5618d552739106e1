//! Tab clustering pipeline: documents → weights → similarities → clusters →
//! named, size-filtered buckets.

use std::cmp::Reverse;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::algo::clustering::single_linkage;
use crate::algo::config::ClusterConfig;
use crate::algo::naming::{label_cluster, NameRegistry};
use crate::algo::normalize::clean_title;
use crate::algo::similarity::SimilarityMatrix;
use crate::algo::tokenizer::{StopWords, DOMAIN_STOP_WORDS};
use crate::algo::weighting::TermWeights;
use crate::error::ClusterError;

/// Bucket for tabs whose cluster is below the minimum size.
pub const CATCH_ALL: &str = "Other";
/// Bucket used when no tab yields a single usable term.
pub const NO_VOCABULARY: &str = "Misc";
/// Keywords reported per named bucket.
pub const BUCKET_KEYWORDS: usize = 3;

/// Anything that can be clustered as a browser tab.
///
/// `id` must be unique within one batch.
pub trait Tab {
    fn id(&self) -> &str;
    fn title(&self) -> &str;
    fn url(&self) -> &str;
}

/// A tab record. Fields other than `id`, `title` and `url` are carried in
/// `extra` untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabItem {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TabItem {
    pub fn new(id: impl Into<String>, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            url: url.into(),
            extra: Map::new(),
        }
    }
}

impl Tab for TabItem {
    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn url(&self) -> &str {
        &self.url
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketKind {
    Named,
    CatchAll,
}

/// One output group. Items borrow from the caller's batch, in input order.
#[derive(Debug, Clone)]
pub struct Bucket<'a, T> {
    pub name: String,
    pub kind: BucketKind,
    /// Terms behind the name, best first. Empty for catch-all buckets.
    pub keywords: Vec<String>,
    pub items: Vec<&'a T>,
}

impl<T> Bucket<'_, T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Ordered, uniquely named partition of a tab batch.
#[derive(Debug, Clone)]
pub struct ClusterSet<'a, T> {
    buckets: Vec<Bucket<'a, T>>,
}

impl<'a, T> ClusterSet<'a, T> {
    fn empty() -> Self {
        Self { buckets: Vec::new() }
    }

    fn single(name: &str, items: Vec<&'a T>) -> Self {
        Self {
            buckets: vec![Bucket {
                name: name.to_string(),
                kind: BucketKind::CatchAll,
                keywords: Vec::new(),
                items,
            }],
        }
    }

    /// Number of buckets.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Bucket<'a, T>> {
        self.buckets.iter()
    }

    pub fn get(&self, name: &str) -> Option<&Bucket<'a, T>> {
        self.buckets.iter().find(|b| b.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.buckets.iter().map(|b| b.name.as_str()).collect()
    }

    pub fn into_buckets(self) -> Vec<Bucket<'a, T>> {
        self.buckets
    }

    /// Name → items pairs in output order.
    pub fn into_map(self) -> Vec<(String, Vec<&'a T>)> {
        self.buckets.into_iter().map(|b| (b.name, b.items)).collect()
    }
}

impl<'s, 'a, T> IntoIterator for &'s ClusterSet<'a, T> {
    type Item = &'s Bucket<'a, T>;
    type IntoIter = std::slice::Iter<'s, Bucket<'a, T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.buckets.iter()
    }
}

/// Complete a batch's ids. Given ids are kept as-is; a missing one becomes
/// the row position, suffixed " (2)", " (3)", … while another row holds it.
pub fn fill_missing_ids(ids: Vec<Option<String>>) -> Vec<String> {
    let mut taken: HashSet<String> = ids.iter().flatten().cloned().collect();
    ids.into_iter()
        .enumerate()
        .map(|(pos, id)| {
            id.unwrap_or_else(|| {
                let mut candidate = pos.to_string();
                let mut n = 2;
                while taken.contains(&candidate) {
                    candidate = format!("{pos} ({n})");
                    n += 1;
                }
                taken.insert(candidate.clone());
                candidate
            })
        })
        .collect()
}

/// Stop words for a run: domain words plus the caller's extras.
pub fn stop_words_for(config: &ClusterConfig) -> StopWords {
    StopWords::new(
        DOMAIN_STOP_WORDS
            .iter()
            .copied()
            .chain(config.extra_stop_words.iter().map(String::as_str)),
    )
}

/// Weighting model over the cleaned titles of `tabs`, keyed by tab id.
pub fn build_model<T: Tab>(tabs: &[T], stop_words: StopWords) -> Result<TermWeights, ClusterError> {
    let docs = tabs
        .iter()
        .map(|tab| (tab.id(), clean_title(tab.title(), tab.url())));
    Ok(TermWeights::from_documents(docs, stop_words)?)
}

/// Group `tabs` into topical buckets.
///
/// Named buckets come first, largest first (ties keep first-appearance
/// order); the catch-all bucket, if any, is last. Every tab lands in exactly
/// one bucket. Fails only on an invalid config or a repeated tab id.
pub fn cluster_tabs<'a, T: Tab>(
    tabs: &'a [T],
    config: &ClusterConfig,
) -> Result<ClusterSet<'a, T>, ClusterError> {
    config.validate()?;

    match tabs {
        [] => return Ok(ClusterSet::empty()),
        [only] => return Ok(ClusterSet::single(CATCH_ALL, vec![only])),
        _ => {}
    }

    let model = build_model(tabs, stop_words_for(config))?;
    if model.vocabulary_len() == 0 {
        tracing::debug!(tabs = tabs.len(), "no usable vocabulary");
        return Ok(ClusterSet::single(NO_VOCABULARY, tabs.iter().collect()));
    }

    let similarities = SimilarityMatrix::build(&model);
    let clusters = single_linkage(&similarities, config.similarity_threshold);

    let mut names = NameRegistry::new();
    names.reserve(CATCH_ALL);
    let mut named: Vec<Bucket<'a, T>> = Vec::new();
    let mut leftovers: Vec<usize> = Vec::new();

    for members in clusters {
        if members.len() < config.min_cluster_size {
            leftovers.extend(members);
            continue;
        }
        let label = label_cluster(&members, &model);
        named.push(Bucket {
            name: names.claim(&label.name),
            kind: BucketKind::Named,
            keywords: label
                .keywords
                .into_iter()
                .take(BUCKET_KEYWORDS)
                .map(|(term, _)| term)
                .collect(),
            items: members.iter().map(|&i| &tabs[i]).collect(),
        });
    }

    named.sort_by_key(|b| Reverse(b.items.len()));

    let mut buckets = named;
    if !leftovers.is_empty() {
        leftovers.sort_unstable();
        buckets.push(Bucket {
            name: CATCH_ALL.to_string(),
            kind: BucketKind::CatchAll,
            keywords: Vec::new(),
            items: leftovers.iter().map(|&i| &tabs[i]).collect(),
        });
    }

    tracing::debug!(
        tabs = tabs.len(),
        vocabulary = model.vocabulary_len(),
        buckets = buckets.len(),
        "clustered tabs"
    );
    Ok(ClusterSet { buckets })
}
