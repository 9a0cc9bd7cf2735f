use thiserror::Error;

/// Fatal conditions; every variant terminates the run with a single report.
#[derive(Debug, Error)]
pub enum GenError {
    #[error("structural error: {0}")]
    Structure(String),

    #[error("invalid replace pattern {pattern:?}: {reason}")]
    PatternCompile { pattern: String, reason: String },

    #[error("invalid replace group index {text:?}")]
    BadGroupIndex { text: String },

    #[error(
        "replace target group {group} does not exist in match ({groups} groups) on line {line:?}"
    )]
    GroupOutOfRange {
        group: usize,
        groups: usize,
        line: String,
    },

    #[error("replace target group {group} overlaps an earlier target on line {line:?}")]
    GroupOverlap { group: usize, line: String },

    #[error("pattern execution failed: {0}")]
    PatternExec(#[from] fancy_regex::Error),

    #[error("plugin failed: {0}")]
    Plugin(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
