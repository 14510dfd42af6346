//! Text processing and analysis module

pub mod analyzer;
pub mod role_matcher;
pub mod skill_gap;
pub mod skills;
pub mod text_processor;
