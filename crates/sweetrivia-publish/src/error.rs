use thiserror::Error;

/// Errors reported by a storage backend.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Bucket '{0}' does not exist")]
    BucketNotFound(String),

    #[error("Object '{0}' already exists")]
    AlreadyExists(String),

    #[error("Storage rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Why a publish did not produce an uploaded file.
///
/// A failed metadata insert is not an error: the upload is what counts,
/// see [`crate::PublishReceipt::metadata_error`].
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("No questions to upload")]
    Empty,

    #[error("A publish is already running for session '{0}'")]
    InFlight(String),

    #[error("Storage bucket '{0}' is missing or misconfigured")]
    BucketMissing(String),

    #[error("Upload of '{filename}' was rejected: {reason}")]
    UploadRejected { filename: String, reason: String },

    #[error("Could not reach storage: {0}")]
    Transport(String),
}

impl PublishError {
    /// Returns a message suitable for showing to the author.
    pub fn user_message(&self) -> &str {
        match self {
            Self::Empty => "No questions to upload",
            Self::InFlight(_) => "An upload is already in progress.",
            Self::BucketMissing(_) => {
                "Cloud storage is not set up. Ask the operator to create the storage bucket."
            }
            Self::UploadRejected { .. } => "The upload was rejected. Please try again.",
            Self::Transport(_) => "Could not connect to cloud storage. Please try again.",
        }
    }

    /// Whether the operator has to fix configuration before retrying.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::BucketMissing(_))
    }

    /// Whether a fresh publish attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::InFlight(_) | Self::UploadRejected { .. } | Self::Transport(_)
        )
    }
}
