//! `$placeholder` templates for archive names
//!
//! Placeholders are written `$ident` or `${ident}`; `$$` is a literal dollar
//! sign. Unknown placeholders are left in place on substitution.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$(?:(?P<escaped>\$)|(?P<named>[_a-zA-Z][_a-zA-Z0-9]*)|\{(?P<braced>[_a-zA-Z][_a-zA-Z0-9]*)\})")
        .unwrap()
});

/// A target name template such as `$name-$date`
#[derive(Debug, Clone, Copy)]
pub struct Template<'a> {
    text: &'a str,
}

impl<'a> Template<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text }
    }

    /// Replace every placeholder `lookup` knows about, leaving the rest intact
    pub fn substitute<'v>(&self, lookup: impl Fn(&str) -> Option<&'v str>) -> String {
        PLACEHOLDER_RE
            .replace_all(self.text, |caps: &Captures<'_>| {
                if caps.name("escaped").is_some() {
                    return "$".to_string();
                }
                let ident = placeholder_name(caps);
                match lookup(ident) {
                    Some(value) => value.to_string(),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }

    /// Substitute `$name` and `$date`
    pub fn render(&self, name: &str, date: &str) -> String {
        self.substitute(|ident| match ident {
            "name" => Some(name),
            "date" => Some(date),
            _ => None,
        })
    }

    /// Whether the template references the given placeholder
    pub fn has_placeholder(&self, ident: &str) -> bool {
        PLACEHOLDER_RE
            .captures_iter(self.text)
            .any(|caps| caps.name("escaped").is_none() && placeholder_name(&caps) == ident)
    }

    pub fn as_str(&self) -> &'a str {
        self.text
    }
}

fn placeholder_name<'t>(caps: &Captures<'t>) -> &'t str {
    caps.name("named")
        .or_else(|| caps.name("braced"))
        .map(|m| m.as_str())
        .unwrap_or_default()
}
