use thiserror::Error;

#[derive(Debug, Error)]
pub enum FinderError {
    /// Non-success response from the GitHub API; `body` is the raw payload.
    #[error("GitHub API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("unknown release manager '{0}': not a maintainer and no release history")]
    UnknownReleaseManager(String),

    #[error("release history no longer contains '{0}': check the upstream data before adjusting corrections")]
    HistoryDrift(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FinderError>;
