//! Retention delta parsing
//!
//! Deltas are written as space-separated `<count><unit>` tokens, where the
//! unit is one of `s` (seconds), `h` (hours) or `d` (days), e.g. `1d 7d 30d`.

use chrono::Duration;

use crate::error::{KeeperError, KeeperResult};

/// Parse a single delta token such as `7d`
pub fn parse_delta(text: &str) -> Result<Duration, String> {
    let text = text.trim();
    let invalid = || format!("invalid delta value: '{}' (suffix s, h, d allowed)", text);

    let (unit_start, _) = text.char_indices().last().ok_or_else(invalid)?;
    let (count, unit) = text.split_at(unit_start);

    let count: i64 = count.parse().map_err(|_| invalid())?;
    if count <= 0 {
        return Err(format!("delta must be positive: '{}'", text));
    }

    let delta = match unit {
        "s" => Duration::try_seconds(count),
        "h" => Duration::try_hours(count),
        "d" => Duration::try_days(count),
        _ => return Err(invalid()),
    };

    delta.ok_or_else(|| format!("delta out of range: '{}'", text))
}

/// Parse a delta string into a list of durations
///
/// Returns an empty list for a blank string. A non-empty list must hold at
/// least two deltas.
pub fn parse_deltas(text: &str) -> KeeperResult<Vec<Duration>> {
    let deltas = parse_delta_list(text)
        .map_err(|e| KeeperError::Config(format!("Not a valid delta: {}", e)))?;

    check_delta_count(&deltas)?;
    Ok(deltas)
}

/// Parse whitespace-separated delta tokens without checking their count
///
/// Runs of whitespace separate tokens like a single space does.
pub fn parse_delta_list(text: &str) -> Result<Vec<Duration>, String> {
    text.split_whitespace().map(parse_delta).collect()
}

/// A delta list is either empty or holds at least two entries
pub fn check_delta_count(deltas: &[Duration]) -> KeeperResult<()> {
    if deltas.len() == 1 {
        return Err(KeeperError::Config(
            "At least two deltas are required".into(),
        ));
    }
    Ok(())
}

/// Render a delta in the largest unit that divides it evenly
pub fn format_delta(delta: &Duration) -> String {
    let seconds = delta.num_seconds();
    if seconds % 86_400 == 0 {
        format!("{}d", seconds / 86_400)
    } else if seconds % 3_600 == 0 {
        format!("{}h", seconds / 3_600)
    } else {
        format!("{}s", seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_delta_units() {
        assert_eq!(parse_delta("30s").unwrap(), Duration::seconds(30));
        assert_eq!(parse_delta("6h").unwrap(), Duration::hours(6));
        assert_eq!(parse_delta("7d").unwrap(), Duration::days(7));
    }

    #[test]
    fn test_parse_delta_rejects_garbage() {
        assert!(parse_delta("7w").is_err());
        assert!(parse_delta("d").is_err());
        assert!(parse_delta("").is_err());
        assert!(parse_delta("0d").is_err());
        assert!(parse_delta("-1d").is_err());
    }

    #[test]
    fn test_parse_deltas() {
        let deltas = parse_deltas("1d  7d 30d").unwrap();
        assert_eq!(
            deltas,
            vec![Duration::days(1), Duration::days(7), Duration::days(30)]
        );
    }

    #[test]
    fn test_parse_deltas_empty() {
        assert!(parse_deltas("").unwrap().is_empty());
        assert!(parse_deltas("   ").unwrap().is_empty());
    }

    #[test]
    fn test_single_delta_is_an_error() {
        let err = parse_deltas("1d").unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_invalid_delta_is_config_error() {
        let err = parse_deltas("1d 2x").unwrap_err();
        assert!(err.to_string().contains("Not a valid delta"));
    }

    #[test]
    fn test_parse_delta_list_ignores_blank_tokens() {
        assert_eq!(
            parse_delta_list("  1d   7d\t30d ").unwrap(),
            vec![Duration::days(1), Duration::days(7), Duration::days(30)]
        );
        assert_eq!(parse_delta_list(" ").unwrap(), vec![]);
        assert_eq!(parse_delta_list("1d").unwrap(), vec![Duration::days(1)]);
        assert!(parse_delta_list("1d 2w").is_err());
    }

    #[test]
    fn test_format_delta() {
        assert_eq!(format_delta(&Duration::days(7)), "7d");
        assert_eq!(format_delta(&Duration::hours(6)), "6h");
        assert_eq!(format_delta(&Duration::seconds(90)), "90s");
    }
}
