mod clean;
mod cluster;
mod search;
mod terms;
mod util;

pub use clean::Clean;
pub use cluster::Cluster;
pub use search::Search;
pub use terms::Terms;
