//! Generational expiration
//!
//! Decides which archives to keep under a grandfather-father-son policy
//! described by a list of deltas, such as `1d 7d 30d`.
//!
//! # Algorithm
//!
//! The most recent backup is always kept and serves as the anchor. The deltas
//! are then walked pairwise from the largest down: for the pair
//! `(current, larger)` a pointer starts at `anchor - larger` and moves towards
//! the anchor. At each position the backup closest to the pointer is kept and
//! the pointer jumps to that backup's time plus `current`. If the closest
//! backup is the one selected at the previous position (backups sparser than
//! `current`), the pointer is pushed forward by `current` instead.
//!
//! Nothing here assumes backups were taken on a schedule. A generation that
//! nominally holds N backups may hold fewer; older backups then survive until
//! enough newer ones exist to replace them.

pub mod simulator;

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDateTime};

use crate::models::ArchiveMap;

pub use simulator::BackupSimulator;

/// Select the archives to keep
///
/// `deltas` may be given in any order. With fewer than two deltas no
/// generations can be formed and every backup is kept.
pub fn expire(backups: &ArchiveMap, deltas: &[Duration]) -> BTreeSet<String> {
    if deltas.len() < 2 {
        return backups.keys().cloned().collect();
    }

    // Newest first; ties in time resolved by name so results are stable
    let mut ordered: Vec<(&str, NaiveDateTime)> = backups
        .iter()
        .map(|(name, time)| (name.as_str(), *time))
        .collect();
    ordered.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    let Some(&(newest, anchor)) = ordered.first() else {
        return BTreeSet::new();
    };

    let mut deltas = deltas.to_vec();
    deltas.sort();

    let mut keep = BTreeSet::new();
    keep.insert(newest.to_string());

    for pair in deltas.windows(2).rev() {
        let (current, larger) = (pair[0], pair[1]);

        // A window reaching past the calendar starts at its first day
        let mut pointer = anchor
            .checked_sub_signed(larger)
            .unwrap_or(NaiveDateTime::MIN);
        let mut last_selected: Option<&str> = None;

        while pointer < anchor {
            let Some(&(name, time)) = ordered
                .iter()
                .min_by_key(|(_, time)| (*time - pointer).abs())
            else {
                break;
            };

            let next = if last_selected == Some(name) {
                pointer.checked_add_signed(current)
            } else {
                last_selected = Some(name);
                keep.insert(name.to_string());
                time.checked_add_signed(current)
            };

            // Past the end of the calendar is past the anchor too
            match next {
                Some(next) => pointer = next,
                None => break,
            }
        }
    }

    keep
}

/// Archives of `backups` not in `keep`, sorted by name
pub fn delete_set(backups: &ArchiveMap, keep: &BTreeSet<String>) -> Vec<String> {
    backups
        .keys()
        .filter(|name| !keep.contains(*name))
        .cloned()
        .collect()
}
