//! Core data models for snapkeeper
//!
//! Jobs describe what is backed up and how it is retained; archives are the
//! snapshots the backend reports for them.

pub mod archive;
pub mod job;

pub use archive::{newest_first, Archive, ArchiveMap};
pub use job::{Job, JobBuilder, JobValidationError};
