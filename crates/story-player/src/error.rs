use std::path::PathBuf;

use thiserror::Error;

/// Configuration-time failures. Steady-state playback never produces these.
#[derive(Error, Debug)]
pub enum StoryError {
    #[error("story sequence for user '{user_id}' is empty")]
    EmptySequence { user_id: String },

    #[error("invalid duration {value} for {what}")]
    InvalidDuration { what: &'static str, value: f64 },

    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T, E = StoryError> = std::result::Result<T, E>;
