use rayon::prelude::*;

use crate::algo::weighting::TermWeights;

/// Dense symmetric n×n cosine-similarity matrix with a unit diagonal.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    n: usize,
    values: Vec<f64>,
}

impl SimilarityMatrix {
    /// Pairwise similarities of every document in `model`, indexed by
    /// insertion order. Weight vectors are computed once and shared by all rows.
    pub fn build(model: &TermWeights) -> Self {
        let n = model.len();
        // Force the cached weights before fanning out.
        let _ = model.vocabulary();

        let upper: Vec<Vec<f64>> = (0..n)
            .into_par_iter()
            .map(|i| ((i + 1)..n).map(|j| model.similarity_at(i, j)).collect())
            .collect();

        let mut values = vec![0.0; n * n];
        for (i, row) in upper.iter().enumerate() {
            values[i * n + i] = 1.0;
            for (offset, &sim) in row.iter().enumerate() {
                let j = i + 1 + offset;
                values[i * n + j] = sim;
                values[j * n + i] = sim;
            }
        }

        tracing::debug!(documents = n, "built similarity matrix");
        Self { n, values }
    }

    /// Build from explicit rows. Returns `None` unless the rows form a square matrix.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Option<Self> {
        let n = rows.len();
        if rows.iter().any(|r| r.len() != n) {
            return None;
        }
        Some(Self {
            n,
            values: rows.into_iter().flatten().collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.n + j]
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.values[i * self.n..(i + 1) * self.n]
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
    fn symmetric_with_unit_diagonal() {
        let m = model(&[
            "rust borrow checker",
            "rust async runtime",
            "sourdough bread recipe",
            "bread flour hydration",
        ]);
        let sim = SimilarityMatrix::build(&m);
        assert_eq!(sim.len(), 4);
        for i in 0..4 {
            assert_eq!(sim.get(i, i), 1.0);
            for j in 0..4 {
                assert_eq!(sim.get(i, j), sim.get(j, i));
                assert!((0.0..=1.0).contains(&sim.get(i, j)));
            }
        }
        assert!(sim.get(0, 1) > 0.0);
        assert_eq!(sim.get(0, 2), 0.0);
        assert!(sim.get(2, 3) > 0.0);
    }

    #[test]
    fn matches_model_similarity() {
        let m = model(&["rust book", "the rust programming language", "weather today"]);
        let sim = SimilarityMatrix::build(&m);
        assert_eq!(sim.get(0, 1), m.similarity("0", "1"));
        assert_eq!(sim.row(2), &[0.0, 0.0, 1.0]);
    }

    #[test]
    fn empty_documents_keep_unit_diagonal() {
        let m = model(&["", "rust"]);
        let sim = SimilarityMatrix::build(&m);
        assert_eq!(sim.get(0, 0), 1.0);
        assert_eq!(sim.get(0, 1), 0.0);
    }

    #[test]
    fn empty_model() {
        let m = model(&[]);
        assert!(SimilarityMatrix::build(&m).is_empty());
    }

    #[test]
    fn from_rows_requires_square() {
        assert!(SimilarityMatrix::from_rows(vec![vec![1.0, 0.5], vec![0.5]]).is_none());
        let sim = SimilarityMatrix::from_rows(vec![vec![1.0, 0.5], vec![0.5, 1.0]]).unwrap();
        assert_eq!(sim.get(1, 0), 0.5);
    }
}
