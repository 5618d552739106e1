use thiserror::Error;

/// Failure to ingest a document into a [`crate::algo::weighting::TermWeights`] model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeightingError {
    #[error("document id already present: {0}")]
    DuplicateId(String),
}

/// Rejected [`crate::algo::config::ClusterConfig`] values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("similarity threshold must be in (0, 1], got {0}")]
    InvalidThreshold(f64),
    #[error("minimum cluster size must be at least 1")]
    InvalidMinClusterSize,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClusterError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Weighting(#[from] WeightingError),
}
