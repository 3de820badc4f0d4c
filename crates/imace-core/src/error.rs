use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImaceError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Backend returned {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Invalid response payload: {0}")]
    Decode(String),

    #[error("Upload failed: {0}")]
    UploadFailure(String),

    #[error("Delete failed: {0}")]
    DeleteFailure(String),

    #[error("An upload batch is already in flight")]
    UploadInProgress,

    #[error("Unsupported page size: {0}")]
    InvalidPageSize(usize),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),
}

impl ImaceError {
    /// True for failures reaching the backend at all (as opposed to a
    /// well-formed error reply).
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}

impl From<reqwest::Error> for ImaceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            return Self::Decode(e.to_string());
        }
        match e.status() {
            Some(status) => Self::Status {
                status: status.as_u16(),
                url: e.url().map(|u| u.to_string()).unwrap_or_default(),
            },
            None => Self::Connection(e.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ImaceError>;
