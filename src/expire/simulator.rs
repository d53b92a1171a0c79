//! Backup history simulation
//!
//! Replays backups and expirations against a virtual clock, for trying out a
//! set of deltas before pointing them at real archives.

use chrono::{Duration, NaiveDateTime, Utc};

use super::{delete_set, expire};
use crate::models::{newest_first, ArchiveMap};

/// Simulates taking backups and expiring them at various points in time
#[derive(Debug, Clone)]
pub struct BackupSimulator {
    deltas: Vec<Duration>,
    now: NaiveDateTime,
    backups: ArchiveMap,
}

impl BackupSimulator {
    /// Start a simulation at the current time
    pub fn new(deltas: Vec<Duration>) -> Self {
        Self::starting_at(deltas, Utc::now().naive_utc())
    }

    /// Start a simulation at a fixed time
    pub fn starting_at(deltas: Vec<Duration>, now: NaiveDateTime) -> Self {
        Self {
            deltas,
            now,
            backups: ArchiveMap::new(),
        }
    }

    /// Add existing backups; each is named after its timestamp
    pub fn add(&mut self, times: impl IntoIterator<Item = NaiveDateTime>) {
        for time in times {
            self.backups.insert(time.to_string(), time);
        }
    }

    pub fn now(&self) -> NaiveDateTime {
        self.now
    }

    pub fn go_to(&mut self, time: NaiveDateTime) {
        self.now = time;
    }

    pub fn go_by(&mut self, delta: Duration) {
        self.now += delta;
    }

    /// Take a backup at the current time, then expire
    ///
    /// Returns the names of the backups deleted by the expiration.
    pub fn backup(&mut self) -> Vec<String> {
        self.add([self.now]);
        self.expire()
    }

    /// Expire the simulated backups, returning the deleted names
    pub fn expire(&mut self) -> Vec<String> {
        let keep = expire(&self.backups, &self.deltas);
        let deleted = delete_set(&self.backups, &keep);
        self.backups.retain(|name, _| keep.contains(name));
        deleted
    }

    /// Surviving backup names, newest first
    pub fn remaining(&self) -> Vec<String> {
        newest_first(&self.backups)
            .into_iter()
            .map(|archive| archive.name)
            .collect()
    }

    pub fn backups(&self) -> &ArchiveMap {
        &self.backups
    }
}
