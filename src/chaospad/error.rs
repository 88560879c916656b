use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChaospadError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Server responded {status}: {detail}")]
    Api { status: u16, detail: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl ChaospadError {
    pub fn api(status: u16, detail: impl Into<String>) -> Self {
        Self::Api {
            status,
            detail: detail.into(),
        }
    }

    /// The message a user should see, without the transport prefix noise.
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { detail, .. } => detail.clone(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ChaospadError>;
