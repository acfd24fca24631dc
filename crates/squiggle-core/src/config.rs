//! Checker configuration.

use smol_str::SmolStr;
use thiserror::Error;
use web_time::Duration;

/// Errors from applying a configuration change.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ConfigError {
    /// The oracle rejected the dictionary; the previous one stays active.
    #[error("unknown dictionary: {0}")]
    UnknownDictionary(String),
}

#[derive(Clone, Debug)]
pub struct CheckerConfig {
    /// Active dictionary for this document.
    pub dictionary: SmolStr,
    /// Delay between a scroll/resize and the viewport re-check.
    pub debounce: Duration,
    /// Extra lines checked beyond a newly exposed viewport edge.
    pub lookahead_lines: u32,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            dictionary: SmolStr::new("en_US"),
            debounce: Duration::from_millis(200),
            lookahead_lines: 3,
        }
    }
}
