//! Merge ordering of configuration sources.

pub mod merge_policy;
