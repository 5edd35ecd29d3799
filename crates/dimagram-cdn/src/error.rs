use thiserror::Error;

#[derive(Debug, Error)]
pub enum CdnError {
    #[error("CDN configuration error: {0}")]
    Config(String),

    #[error("purge request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("purge rejected (status {status}): {body}")]
    Rejected { status: u16, body: String },
}

pub type CdnResult<T> = Result<T, CdnError>;
