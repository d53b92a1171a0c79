//! Display formatting for terminal output
//!
//! Provides utilities for formatting archive listings and simulation results
//! for terminal display.

pub mod archive;
pub mod simulation;

pub use archive::{format_archive_list, format_archive_table, format_listings_json, JobListing};
pub use simulation::format_simulation;
