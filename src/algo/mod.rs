pub mod clustering;
pub mod config;
pub mod grouping;
pub mod naming;
pub mod normalize;
pub mod similarity;
pub mod tokenizer;
pub mod weighting;
