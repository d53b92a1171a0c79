//! The simulate command
//!
//! Tries out a set of deltas without touching any archives.

use chrono::Duration;

use crate::config::{delta::check_delta_count, parse_deltas};
use crate::display::format_simulation;
use crate::error::{KeeperError, KeeperResult};
use crate::expire::BackupSimulator;
use crate::naming::parse_date;

/// Deltas used when none are given
pub const DEFAULT_DELTAS: &str = "1d 7d 30d";

/// Days of backups taken by the default simulation
const DEFAULT_DAYS: i64 = 18;

/// Run a simulation and return its report
///
/// With timestamps, those backups are expired once. Without, a daily backup
/// is taken for 18 days, expiring after each.
pub fn handle_simulate(deltas: &[Duration], timestamps: &[String]) -> KeeperResult<String> {
    let deltas = if deltas.is_empty() {
        parse_deltas(DEFAULT_DELTAS)?
    } else {
        check_delta_count(deltas)?;
        deltas.to_vec()
    };

    let mut simulator = BackupSimulator::new(deltas);

    if timestamps.is_empty() {
        let mut deleted = Vec::new();
        for _ in 0..DEFAULT_DAYS {
            simulator.go_by(Duration::days(1));
            deleted.extend(simulator.backup());
        }
        return Ok(format_simulation(&deleted, &simulator.remaining()));
    }

    let times = timestamps
        .iter()
        .map(|value| {
            parse_date(value, None)
                .ok_or_else(|| KeeperError::Argument(format!("Not a valid timestamp: {}", value)))
        })
        .collect::<KeeperResult<Vec<_>>>()?;
    simulator.add(times);

    let deleted = simulator.expire();
    Ok(format_simulation(&deleted, &simulator.remaining()))
}
