//! File-path deny patterns.

use regex::Regex;

use crate::error::{EnrichmentError, Result};

/// Compiled ignore patterns. A path is ignored when any pattern matches
/// anywhere in it.
#[derive(Debug, Clone, Default)]
pub struct IgnoreMatcher {
    patterns: Vec<Regex>,
}

impl IgnoreMatcher {
    /// Compile `patterns`. The first invalid pattern fails the whole set.
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| {
                let pattern = p.as_ref();
                Regex::new(pattern).map_err(|source| EnrichmentError::InvalidIgnorePattern {
                    pattern: pattern.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(IgnoreMatcher { patterns })
    }

    pub fn is_ignored(&self, file_path: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(file_path))
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
