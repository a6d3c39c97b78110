use thiserror::Error;

#[derive(Error, Debug)]
pub enum UdagramError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Authorization error: {0}")]
    Auth(#[from] AuthError),

    #[error("Invalid request: {0}")]
    Request(#[from] RequestError),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("Notification error: {0}")]
    Notification(#[from] NotificationError),

    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Generic error: {0}")]
    Generic(#[from] anyhow::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("{entity} does not exist")]
    NotFound { entity: &'static str, id: String },

    #[error("Item in table {table} is missing attribute {attribute}")]
    InvalidItem { table: String, attribute: String },

    #[error("Request to table {table} was throttled: {reason}")]
    Throttled { table: String, reason: String },

    #[error("{operation} on table {table} failed: {reason}")]
    OperationFailed {
        operation: &'static str,
        table: String,
        reason: String,
    },
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("No authentication header")]
    MissingHeader,

    #[error("Invalid authentication header")]
    InvalidHeader,

    #[error("Invalid signing key: {reason}")]
    InvalidKey { reason: String },

    #[error("Token verification failed: {reason}")]
    InvalidToken { reason: String },
}

#[derive(Error, Debug)]
pub enum RequestError {
    #[error("Missing path parameter {name}")]
    MissingPathParameter { name: &'static str },

    #[error("Invalid query parameter {name}: {reason}")]
    InvalidQueryParameter { name: &'static str, reason: String },

    #[error("Request body is required")]
    MissingBody,

    #[error("Malformed request body: {reason}")]
    MalformedBody { reason: String },

    #[error("{field} {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("Missing connection id")]
    MissingConnectionId,
}

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("Failed to presign upload for s3://{bucket}/{key}: {reason}")]
    Presign {
        bucket: String,
        key: String,
        reason: String,
    },

    #[error("Failed to download object from s3://{bucket}/{key}: {reason}")]
    Download {
        bucket: String,
        key: String,
        reason: String,
    },

    #[error("Failed to upload object to s3://{bucket}/{key}: {reason}")]
    Upload {
        bucket: String,
        key: String,
        reason: String,
    },

    #[error("Failed to process image {key}: {reason}")]
    Image { key: String, reason: String },
}

#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("Failed to post to connection {connection_id}: {reason}")]
    Post {
        connection_id: String,
        reason: String,
    },

    #[error("Malformed SNS message {message_id}: {reason}")]
    MalformedMessage { message_id: String, reason: String },
}

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Failed to reach search endpoint {endpoint}: {reason}")]
    Transport { endpoint: String, reason: String },

    #[error("Search endpoint rejected document {id} with status {status}")]
    Rejected { id: String, status: u16 },

    #[error("Failed to sign search request: {reason}")]
    Signing { reason: String },
}

#[derive(Error, Debug)]
pub enum SerializationError {
    #[error("JSON serialization failed: {reason}")]
    Json { reason: String },

    #[error("YAML serialization failed: {reason}")]
    Yaml { reason: String },
}

pub type Result<T> = std::result::Result<T, UdagramError>;

impl From<serde_json::Error> for UdagramError {
    fn from(err: serde_json::Error) -> Self {
        UdagramError::Serialization(SerializationError::Json {
            reason: err.to_string(),
        })
    }
}

impl From<serde_yaml::Error> for UdagramError {
    fn from(err: serde_yaml::Error) -> Self {
        UdagramError::Serialization(SerializationError::Yaml {
            reason: err.to_string(),
        })
    }
}

impl UdagramError {
    /// HTTP status an API handler answers with when it fails with this error.
    pub fn status_code(&self) -> u16 {
        match self {
            UdagramError::Request(_) => 400,
            UdagramError::Auth(_) => 401,
            UdagramError::Storage(StorageError::NotFound { .. }) => 404,
            _ => 500,
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            UdagramError::Storage(StorageError::Throttled { .. }) => true,
            UdagramError::Storage(StorageError::OperationFailed { .. }) => true,
            UdagramError::Search(SearchError::Transport { .. }) => true,
            UdagramError::Media(MediaError::Download { .. }) => true,
            UdagramError::Media(MediaError::Upload { .. }) => true,
            UdagramError::Notification(NotificationError::Post { .. }) => true,
            UdagramError::Io(_) => true,
            _ => false,
        }
    }

    /// Text safe to return to an API caller. Server side failures stay opaque.
    pub fn client_message(&self) -> String {
        match self {
            UdagramError::Request(e) => e.to_string(),
            UdagramError::Auth(e) => e.to_string(),
            UdagramError::Storage(e @ StorageError::NotFound { .. }) => e.to_string(),
            _ => "Internal server error".to_string(),
        }
    }
}
