//! Archive display formatting
//!
//! Formats a job's archives for terminal output as a plain list, an aligned
//! table, or JSON.

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

use crate::error::KeeperResult;
use crate::models::Archive;

/// The archives of one job, as emitted by `list --json`
#[derive(Debug, Clone, Serialize)]
pub struct JobListing {
    /// Job name; `null` for a job given on the command line
    pub job: Option<String>,
    pub archives: Vec<Archive>,
}

/// One archive name per line, indented under the job header
pub fn format_archive_list(archives: &[Archive]) -> String {
    archives
        .iter()
        .map(|archive| format!("  {}\n", archive.name))
        .collect()
}

/// Format archives as a table of name, creation time and age
pub fn format_archive_table(archives: &[Archive], now: NaiveDateTime) -> String {
    if archives.is_empty() {
        return "  No archives found.\n".to_string();
    }

    let name_width = archives
        .iter()
        .map(|a| a.name.chars().count())
        .max()
        .unwrap_or(4)
        .max(4);

    let mut output = String::new();
    output.push_str(&format!(
        "  {:<name_width$}  {:<19}  {:>8}\n",
        "Name",
        "Created",
        "Age",
        name_width = name_width,
    ));
    output.push_str(&format!(
        "  {:-<name_width$}  {:-<19}  {:->8}\n",
        "",
        "",
        "",
        name_width = name_width,
    ));

    for archive in archives {
        output.push_str(&format!(
            "  {:<name_width$}  {:<19}  {:>8}\n",
            archive.name,
            archive.created.format("%Y-%m-%d %H:%M:%S").to_string(),
            format_age(now - archive.created),
            name_width = name_width,
        ));
    }

    output
}

/// Pretty-printed JSON array of job listings
pub fn format_listings_json(listings: &[JobListing]) -> KeeperResult<String> {
    Ok(serde_json::to_string_pretty(listings)?)
}

/// Compact age: the two largest units, e.g. `3d 4h`
pub fn format_age(age: Duration) -> String {
    if age < Duration::zero() {
        return "future".to_string();
    }

    let days = age.num_days();
    let hours = age.num_hours() % 24;
    let minutes = age.num_minutes() % 60;

    if days > 0 {
        format!("{}d {}h", days, hours)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(text: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_plain_list() {
        let archives = vec![
            Archive::new("home-2", at("2020-01-02 00:00:00")),
            Archive::new("home-1", at("2020-01-01 00:00:00")),
        ];
        assert_eq!(format_archive_list(&archives), "  home-2\n  home-1\n");
    }

    #[test]
    fn test_table() {
        let archives = vec![Archive::new("home-1", at("2020-01-01 00:00:00"))];
        let table = format_archive_table(&archives, at("2020-01-03 05:00:00"));

        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("Created"));
        assert!(lines[2].contains("2020-01-01 00:00:00"));
        assert!(lines[2].ends_with("2d 5h"));
    }

    #[test]
    fn test_empty_table() {
        assert!(format_archive_table(&[], at("2020-01-01 00:00:00")).contains("No archives"));
    }

    #[test]
    fn test_age() {
        assert_eq!(format_age(Duration::minutes(5)), "5m");
        assert_eq!(format_age(Duration::minutes(65)), "1h 5m");
        assert_eq!(format_age(Duration::hours(49)), "2d 1h");
        assert_eq!(format_age(Duration::hours(-1)), "future");
    }

    #[test]
    fn test_json() {
        let listings = vec![JobListing {
            job: Some("home".into()),
            archives: vec![Archive::new("home-1", at("2020-01-01 00:00:00"))],
        }];

        let json = format_listings_json(&listings).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value[0]["job"], "home");
        assert_eq!(value[0]["archives"][0]["name"], "home-1");
        assert_eq!(value[0]["archives"][0]["created"], "2020-01-01T00:00:00");
    }
}
