//! Property-based tests for merge and naming rules

mod merge;
mod naming;
