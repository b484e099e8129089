//! Integration tests for the OpenMeta metadata store

mod config_integration;
mod enumeration;
mod lifecycle;
mod references;
mod value_roundtrip;
