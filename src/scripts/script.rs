//! Script identity

use std::fmt;

/// A script: its file name and full source
///
/// Two scripts are the same only if both name and source match, so editing
/// a file and loading it again runs the new version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Script {
    pub name: String,
    pub source: String,
}

impl Script {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
