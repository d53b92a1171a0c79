//! Archive model
//!
//! Archives are not stored anywhere by snapkeeper; they are derived on every
//! run from the backend listing and the job templates.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::Serialize;

/// Archive name to creation timestamp, for the archives of one job
pub type ArchiveMap = BTreeMap<String, NaiveDateTime>;

/// One archive known to the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Archive {
    /// Archive name as reported by the backend
    pub name: String,
    /// Timestamp parsed from the name
    pub created: NaiveDateTime,
}

impl Archive {
    pub fn new(name: impl Into<String>, created: NaiveDateTime) -> Self {
        Self {
            name: name.into(),
            created,
        }
    }
}

/// Archives of a map ordered newest first; equal timestamps sort by name
pub fn newest_first(archives: &ArchiveMap) -> Vec<Archive> {
    let mut sorted: Vec<Archive> = archives
        .iter()
        .map(|(name, created)| Archive::new(name.clone(), *created))
        .collect();
    sorted.sort_by(|a, b| b.created.cmp(&a.created).then_with(|| a.name.cmp(&b.name)));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y%m%d-%H%M%S").unwrap()
    }

    #[test]
    fn test_newest_first() {
        let mut map = ArchiveMap::new();
        map.insert("a".into(), dt("20100101-000000"));
        map.insert("c".into(), dt("20100301-000000"));
        map.insert("b".into(), dt("20100301-000000"));

        let names: Vec<_> = newest_first(&map).into_iter().map(|a| a.name).collect();
        assert_eq!(names, vec!["b", "c", "a"]);
    }
}
