//! snapkeeper - generational expiration for tarsnap archives
//!
//! This library provides the core functionality of the snapkeeper command.
//! Backup jobs create tarsnap archives whose names carry their creation date;
//! old archives are thinned out into grandfather-father-son generations
//! described by a list of retention deltas.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: YAML job files, delta parsing and config location
//! - `error`: Custom error types
//! - `models`: Jobs and archives
//! - `naming`: Archive name templates and recovering dates from names
//! - `expire`: The expiration algorithm and a backup simulator
//! - `backend`: The archival tool (tarsnap)
//! - `catalog`: Cached archive listing for one run
//! - `services`: The make, expire and list commands
//! - `cli`: Command-line handling
//! - `display`: Terminal output
//!
//! # Example
//!
//! ```rust,ignore
//! use snapkeeper::config::load_config_from_file;
//! use snapkeeper::expire::{delete_set, expire};
//!
//! let config = load_config_from_file(Path::new("/etc/snapkeeper.yml"))?;
//! let keep = expire(&backups, config.jobs()[0].deltas());
//! let doomed = delete_set(&backups, &keep);
//! ```

pub mod backend;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod expire;
pub mod logging;
pub mod models;
pub mod naming;
pub mod services;

pub use error::{KeeperError, KeeperResult};
