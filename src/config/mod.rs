//! Configuration module for snapkeeper
//!
//! This module provides:
//! - Retention delta parsing
//! - The YAML job file loader
//! - Config file location

pub mod delta;
pub mod loader;
pub mod paths;

pub use delta::{format_delta, parse_delta, parse_delta_list, parse_deltas};
pub use loader::{load_config, load_config_from_file, Config};
pub use paths::KeeperPaths;
