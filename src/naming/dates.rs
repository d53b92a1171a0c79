//! Parsing the date part of archive names

use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Format used for new archive names when a job configures none
pub const DEFAULT_DATEFORMAT: &str = "%Y%m%d-%H%M%S";

/// Formats tried, in order, when a job configures no date format
const BUILTIN_FORMATS: &[&str] = &[
    DEFAULT_DATEFORMAT,
    "%Y%m%d%H%M%S",
    "%Y-%m-%d-%H%M%S",
    "%Y-%m-%d_%H-%M-%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y%m%d",
    "%Y-%m-%d",
];

/// Looser formats for the generic fallback parser
const GENERIC_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y%m%dT%H%M%S",
    "%Y%m%d_%H%M%S",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y",
    "%d %b %Y %H:%M:%S",
    "%d %b %Y",
    "%b %d %Y %H:%M:%S",
    "%b %d %Y",
    "%B %d, %Y",
    "%B %d %Y",
];

/// Parse the date part of an archive name
///
/// With a configured format only that format is tried. Otherwise the
/// built-in formats are tried first, then the generic parser.
pub fn parse_date(value: &str, dateformat: Option<&str>) -> Option<NaiveDateTime> {
    match dateformat {
        Some(format) => parse_with_format(value, format),
        None => BUILTIN_FORMATS
            .iter()
            .find_map(|format| parse_with_format(value, format))
            .or_else(|| parse_generic(value)),
    }
}

/// Parse with a single strftime format
///
/// Formats without a time component yield midnight.
pub fn parse_with_format(value: &str, format: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, format)
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, format)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Best-effort parser for date strings in common notations
///
/// Values carrying a UTC offset are normalized to UTC.
pub fn parse_generic(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.naive_utc());
    }

    GENERIC_FORMATS
        .iter()
        .find_map(|format| parse_with_format(value, format))
}

/// Render `time` with a strftime format
///
/// Returns `None` if the format cannot be rendered without a time zone,
/// e.g. `%z` or `%+`, or contains an unknown specifier.
pub fn format_date(time: NaiveDateTime, format: &str) -> Option<String> {
    let items: Vec<Item> = StrftimeItems::new(format).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return None;
    }

    let mut rendered = String::new();
    write!(rendered, "{}", time.format_with_items(items.into_iter())).ok()?;
    Some(rendered)
}

/// Check that a strftime format string is usable for rendering
pub fn is_valid_format(format: &str) -> bool {
    format_date(NaiveDateTime::MIN, format).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_default_format() {
        assert_eq!(
            parse_date("20100615-123000", None),
            Some(dt("2010-06-15 12:30:00"))
        );
    }

    #[test]
    fn test_configured_format_only() {
        assert_eq!(
            parse_date("15.06.2010", Some("%d.%m.%Y")),
            Some(dt("2010-06-15 00:00:00"))
        );
        // The built-in formats are not consulted
        assert_eq!(parse_date("20100615-123000", Some("%d.%m.%Y")), None);
    }

    #[test]
    fn test_builtin_iso() {
        assert_eq!(
            parse_date("2010-06-15T08:00:00", None),
            Some(dt("2010-06-15 08:00:00"))
        );
        assert_eq!(parse_date("2010-06-15", None), Some(dt("2010-06-15 00:00:00")));
    }

    #[test]
    fn test_generic_fallback() {
        assert_eq!(
            parse_date("2010-06-15T08:00:00+02:00", None),
            Some(dt("2010-06-15 06:00:00"))
        );
        assert_eq!(
            parse_date("2010/06/15 08:00", None),
            Some(dt("2010-06-15 08:00:00"))
        );
        assert_eq!(parse_date("15 Jun 2010", None), Some(dt("2010-06-15 00:00:00")));
    }

    #[test]
    fn test_rejects_non_dates() {
        assert_eq!(parse_date("dev-20200101-000000", None), None);
        assert_eq!(parse_date("", None), None);
        assert_eq!(parse_date("latest", None), None);
    }

    #[test]
    fn test_is_valid_format() {
        assert!(is_valid_format(DEFAULT_DATEFORMAT));
        assert!(is_valid_format("ABC"));
        assert!(!is_valid_format("%Y-%Q"));
    }

    #[test]
    fn test_offset_formats_are_invalid() {
        // A naive timestamp has no offset or zone name to render
        for format in ["%Y%m%d-%H%M%S%z", "%Y%m%d%:z", "%Y-%m-%d %Z", "%+"] {
            assert!(!is_valid_format(format), "{}", format);
        }
    }

    #[test]
    fn test_format_date() {
        let time = dt("2010-06-15 12:30:00");
        assert_eq!(format_date(time, DEFAULT_DATEFORMAT).as_deref(), Some("20100615-123000"));
        assert_eq!(format_date(time, "%Y%m%d-%H%M%S%z"), None);
        assert_eq!(format_date(time, "%Y-%Q"), None);
    }
}
