use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

use crate::algo::tokenizer::StopWords;
use crate::error::WeightingError;

/// Term-frequency saturation.
pub const K1: f64 = 2.0;
/// Document-length normalization strength.
pub const B: f64 = 0.75;
pub const DEFAULT_TOP_TERMS: usize = 10;

/// Bidirectional term ↔ index mapping, built once per weight computation.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    terms: Vec<String>,
    index: HashMap<String, usize>,
}

impl Vocabulary {
    fn intern(&mut self, term: &str) -> usize {
        if let Some(&idx) = self.index.get(term) {
            return idx;
        }
        let idx = self.terms.len();
        self.terms.push(term.to_string());
        self.index.insert(term.to_string(), idx);
        idx
    }

    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.index.get(term).copied()
    }

    pub fn term(&self, idx: usize) -> Option<&str> {
        self.terms.get(idx).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Sparse weight vector over a [`Vocabulary`], sorted by term index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermVector {
    entries: Vec<(usize, f64)>,
    norm: f64,
}

impl TermVector {
    fn from_sorted(entries: Vec<(usize, f64)>) -> Self {
        let norm = entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        Self { entries, norm }
    }

    /// Weight of a term, 0 when absent.
    pub fn weight(&self, term_idx: usize) -> f64 {
        self.entries
            .binary_search_by_key(&term_idx, |&(idx, _)| idx)
            .map(|pos| self.entries[pos].1)
            .unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.entries.iter().copied()
    }

    pub fn norm(&self) -> f64 {
        self.norm
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cosine similarity in [0, 1]; 0 if either vector has zero magnitude.
    pub fn cosine(&self, other: &TermVector) -> f64 {
        if self.norm <= 0.0 || other.norm <= 0.0 {
            return 0.0;
        }
        // Merge join over the two index-sorted entry lists.
        let (mut i, mut j) = (0, 0);
        let mut dot = 0.0;
        while i < self.entries.len() && j < other.entries.len() {
            let (ti, wi) = self.entries[i];
            let (tj, wj) = other.entries[j];
            match ti.cmp(&tj) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    dot += wi * wj;
                    i += 1;
                    j += 1;
                }
            }
        }
        (dot / (self.norm * other.norm)).clamp(0.0, 1.0)
    }
}

/// Vectors for every document, aligned with insertion order.
#[derive(Debug, Clone)]
struct WeightTable {
    vocabulary: Vocabulary,
    vectors: Vec<TermVector>,
}

/// BM25-style term weights over a fixed corpus of documents.
///
/// Weights are computed on first use and cached. Adding a document discards
/// the cache wholesale; it is never patched.
#[derive(Debug, Clone)]
pub struct TermWeights {
    ids: Vec<String>,
    texts: Vec<String>,
    positions: HashMap<String, usize>,
    stop_words: StopWords,
    table: OnceLock<WeightTable>,
}

impl TermWeights {
    pub fn new(stop_words: StopWords) -> Self {
        Self {
            ids: Vec::new(),
            texts: Vec::new(),
            positions: HashMap::new(),
            stop_words,
            table: OnceLock::new(),
        }
    }

    /// Build a model from `(id, text)` pairs, failing on the first repeated id.
    pub fn from_documents<I, K, V>(docs: I, stop_words: StopWords) -> Result<Self, WeightingError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut model = Self::new(stop_words);
        for (id, text) in docs {
            model.add(id, text)?;
        }
        Ok(model)
    }

    /// Insert a document. An id that is already present is rejected and the
    /// existing document (and cached weights) are left as they were.
    pub fn add(
        &mut self,
        id: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<(), WeightingError> {
        let id = id.into();
        if self.positions.contains_key(&id) {
            return Err(WeightingError::DuplicateId(id));
        }
        self.positions.insert(id.clone(), self.ids.len());
        self.ids.push(id);
        self.texts.push(text.into());
        self.table.take();
        Ok(())
    }

    /// Document ids in insertion order.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    pub fn text(&self, id: &str) -> Option<&str> {
        self.position(id).map(|pos| self.texts[pos].as_str())
    }

    pub fn stop_words(&self) -> &StopWords {
        &self.stop_words
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.table().vocabulary
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary().len()
    }

    pub fn vector(&self, id: &str) -> Option<&TermVector> {
        self.position(id).and_then(|pos| self.vector_at(pos))
    }

    pub fn vector_at(&self, pos: usize) -> Option<&TermVector> {
        self.table().vectors.get(pos)
    }

    /// The `n` highest-weighted terms of a document, best first.
    /// Equal weights are ordered by term. Unknown ids yield nothing.
    pub fn top_terms(&self, id: &str, n: usize) -> Vec<(String, f64)> {
        match self.position(id) {
            Some(pos) => self.top_terms_at(pos, n),
            None => Vec::new(),
        }
    }

    pub fn top_terms_at(&self, pos: usize, n: usize) -> Vec<(String, f64)> {
        let table = self.table();
        let Some(vector) = table.vectors.get(pos) else {
            return Vec::new();
        };
        let mut terms: Vec<(&str, f64)> = vector
            .iter()
            .filter_map(|(idx, w)| table.vocabulary.term(idx).map(|t| (t, w)))
            .collect();
        terms.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        terms.truncate(n);
        terms.into_iter().map(|(t, w)| (t.to_string(), w)).collect()
    }

    /// Cosine similarity of two documents' weight vectors, in [0, 1].
    /// 0 when either id is unknown or either document has no terms.
    pub fn similarity(&self, a: &str, b: &str) -> f64 {
        match (self.position(a), self.position(b)) {
            (Some(i), Some(j)) => self.similarity_at(i, j),
            _ => 0.0,
        }
    }

    pub fn similarity_at(&self, i: usize, j: usize) -> f64 {
        let table = self.table();
        match (table.vectors.get(i), table.vectors.get(j)) {
            (Some(v), _) if i == j => {
                if v.norm() > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            (Some(v), Some(w)) => v.cosine(w),
            _ => 0.0,
        }
    }

    /// Rank documents by the summed weight of the query's terms.
    /// Documents scoring 0 are omitted; ties keep insertion order.
    pub fn search(&self, query: &str, n: usize) -> Vec<(String, f64)> {
        let query_terms = self.stop_words.terms(query);
        if query_terms.is_empty() {
            return Vec::new();
        }
        let table = self.table();
        let indices: Vec<usize> = query_terms
            .iter()
            .filter_map(|t| table.vocabulary.index_of(t))
            .collect();
        if indices.is_empty() {
            return Vec::new();
        }

        let mut scores: Vec<(usize, f64)> = table
            .vectors
            .iter()
            .enumerate()
            .map(|(pos, v)| (pos, indices.iter().map(|&idx| v.weight(idx)).sum::<f64>()))
            .filter(|&(_, score)| score > 0.0)
            .collect();
        scores.sort_by(|a, b| b.1.total_cmp(&a.1));
        scores.truncate(n);
        scores
            .into_iter()
            .map(|(pos, score)| (self.ids[pos].clone(), score))
            .collect()
    }

    fn table(&self) -> &WeightTable {
        self.table.get_or_init(|| compute_table(&self.texts, &self.stop_words))
    }
}

/// weight(t, d) = idf(t) · tf · (K1 + 1) / (K1 · (1 − B + B · |d| / avg|d|) + tf)
/// with idf(t) = ln((N + 1) / df(t)).
fn compute_table(texts: &[String], stop_words: &StopWords) -> WeightTable {
    let mut vocabulary = Vocabulary::default();
    let mut doc_lens = Vec::with_capacity(texts.len());
    let term_counts: Vec<BTreeMap<usize, u32>> = texts
        .iter()
        .map(|text| {
            let tokens = stop_words.terms(text);
            doc_lens.push(tokens.len());
            let mut counts = BTreeMap::new();
            for token in &tokens {
                *counts.entry(vocabulary.intern(token)).or_insert(0) += 1;
            }
            counts
        })
        .collect();

    let mut doc_freq = vec![0u32; vocabulary.len()];
    for counts in &term_counts {
        for &idx in counts.keys() {
            doc_freq[idx] += 1;
        }
    }

    let n = texts.len() as f64;
    let total_len: usize = doc_lens.iter().sum();
    let avg_len = if texts.is_empty() { 0.0 } else { total_len as f64 / n };

    let vectors: Vec<TermVector> = term_counts
        .iter()
        .zip(&doc_lens)
        .map(|(counts, &len)| {
            let normalized_len = if avg_len > 0.0 { len as f64 / avg_len } else { 0.0 };
            let length_norm = K1 * (1.0 - B + B * normalized_len);
            let entries = counts
                .iter()
                .map(|(&idx, &count)| {
                    let tf = count as f64;
                    let idf = ((n + 1.0) / doc_freq[idx] as f64).ln();
                    (idx, idf * tf * (K1 + 1.0) / (length_norm + tf))
                })
                .collect();
            TermVector::from_sorted(entries)
        })
        .collect();

    tracing::debug!(
        documents = texts.len(),
        vocabulary = vocabulary.len(),
        "computed term weights"
    );

    WeightTable { vocabulary, vectors }
}
