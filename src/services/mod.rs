//! Business logic over already-loaded collections.

pub mod dashboard;
pub mod directory;
