pub mod algo;
pub mod error;
pub mod ops;

#[cfg(feature = "plugin")]
pub mod commands;

#[cfg(feature = "plugin")]
use nu_plugin::{Plugin, PluginCommand};

pub use algo::config::ClusterConfig;
pub use algo::grouping::{cluster_tabs, Bucket, BucketKind, ClusterSet, Tab, TabItem};
pub use algo::weighting::TermWeights;

#[cfg(feature = "plugin")]
pub struct TabClustersPlugin;

#[cfg(feature = "plugin")]
impl Plugin for TabClustersPlugin {
    fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").into()
    }

    fn commands(&self) -> Vec<Box<dyn PluginCommand<Plugin = Self>>> {
        vec![
            Box::new(commands::Cluster),
            Box::new(commands::Terms),
            Box::new(commands::Search),
            Box::new(commands::Clean),
        ]
    }
}
