//! lookout-media: Remote image description and local speech synthesis.

pub mod speech;
pub mod types;
pub mod vision;
