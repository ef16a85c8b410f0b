use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("classifier API error ({status}): {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("could not parse classifier output: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("classifier returned no content")]
    EmptyResponse,
    #[error("render error: {0}")]
    Render(String),
    #[error("image encoding error: {0}")]
    Image(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, AnalyzeError>;
