//! Language-model integration module

pub mod client;
pub mod extractor;
pub mod json_recovery;
pub mod prompts;
pub mod recommender;
