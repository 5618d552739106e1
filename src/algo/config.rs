use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_THRESHOLD: f64 = 0.25;
pub const DEFAULT_MIN_CLUSTER_SIZE: usize = 2;

/// Tuning knobs for one clustering run. Every field is optional in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClusterConfig {
    /// Minimum cross-cluster cosine similarity that merges two clusters, in (0, 1].
    pub similarity_threshold: f64,
    /// Clusters smaller than this are folded into the catch-all bucket.
    pub min_cluster_size: usize,
    /// Words ignored on top of the built-in stop-word lists.
    pub extra_stop_words: BTreeSet<String>,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_THRESHOLD,
            min_cluster_size: DEFAULT_MIN_CLUSTER_SIZE,
            extra_stop_words: BTreeSet::new(),
        }
    }
}

impl ClusterConfig {
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    pub fn with_min_cluster_size(mut self, size: usize) -> Self {
        self.min_cluster_size = size;
        self
    }

    pub fn with_stop_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_stop_words.extend(words.into_iter().map(Into::into));
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = self.similarity_threshold;
        if !(t > 0.0 && t <= 1.0) {
            return Err(ConfigError::InvalidThreshold(t));
        }
        if self.min_cluster_size == 0 {
            return Err(ConfigError::InvalidMinClusterSize);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ClusterConfig::default();
        assert_eq!(config.similarity_threshold, DEFAULT_THRESHOLD);
        assert_eq!(config.min_cluster_size, 2);
        assert!(config.extra_stop_words.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        for t in [0.0, -0.1, 1.01, f64::NAN] {
            let err = ClusterConfig::default().with_threshold(t).validate().unwrap_err();
            assert!(matches!(err, ConfigError::InvalidThreshold(_)));
        }
        assert!(ClusterConfig::default().with_threshold(1.0).validate().is_ok());
    }

    #[test]
    fn rejects_zero_min_size() {
        let err = ClusterConfig::default().with_min_cluster_size(0).validate().unwrap_err();
        assert_eq!(err, ConfigError::InvalidMinClusterSize);
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config: ClusterConfig =
            serde_json::from_str(r#"{"similarityThreshold": 0.15, "extraStopWords": ["wiki"]}"#)
                .unwrap();
        assert_eq!(config.similarity_threshold, 0.15);
        assert_eq!(config.min_cluster_size, DEFAULT_MIN_CLUSTER_SIZE);
        assert!(config.extra_stop_words.contains("wiki"));
    }
}
