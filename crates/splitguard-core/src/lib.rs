//! splitguard-core — shared types for the SplitGuard partition check.
//!
//! Holds the membership data model, the TOML configuration and the
//! `ClusterHandle` trait that the check uses to read local membership
//! and to stop the local nodes.

pub mod cluster;
pub mod config;
pub mod types;

pub use cluster::ClusterHandle;
pub use config::{ConfigError, SplitGuardConfig};
pub use types::*;
