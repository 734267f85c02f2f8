// crates/filters/src/lib.rs

//! Basename filtering for the walk.
//!
//! `--exclude` patterns drop files and prune whole directories; `--match`
//! patterns, when given, restrict which files are considered at all.
//! Patterns are unanchored regular expressions matched against basenames,
//! never full paths.

use std::ffi::OsStr;

use regex::Regex;

#[derive(Debug, Default, Clone)]
pub struct Matcher {
    matches: Vec<Regex>,
    excludes: Vec<Regex>,
}

impl Matcher {
    /// Compile match and exclude patterns. Fails on the first invalid
    /// expression.
    pub fn new(matches: &[String], excludes: &[String]) -> Result<Self, regex::Error> {
        Ok(Matcher {
            matches: compile(matches)?,
            excludes: compile(excludes)?,
        })
    }

    /// True when any exclude pattern matches `name`.
    pub fn is_excluded(&self, name: &OsStr) -> bool {
        let name = name.to_string_lossy();
        self.excludes.iter().any(|re| re.is_match(&name))
    }

    /// True when `name` passes the match patterns. An empty match list
    /// accepts everything.
    pub fn is_matched(&self, name: &OsStr) -> bool {
        if self.matches.is_empty() {
            return true;
        }
        let name = name.to_string_lossy();
        self.matches.iter().any(|re| re.is_match(&name))
    }
}

fn compile(patterns: &[String]) -> Result<Vec<Regex>, regex::Error> {
    patterns.iter().map(|p| Regex::new(p)).collect()
}
