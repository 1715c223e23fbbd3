//! Error types for cornflex.

use std::io;
use thiserror::Error;

/// Main error type for cornflex operations.
#[derive(Error, Debug)]
pub enum Error {
    /// SSH transport-level errors
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// Remote filesystem and session errors
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    /// Text decoding errors
    #[error("Encoding error: {0}")]
    Encoding(#[from] EncodingError),

    /// Invalid reader configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Tabular parsing errors
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Transport or authentication failure.
    Connection,
    /// Missing remote directory or file.
    NotFound,
    /// Bytes could not be decoded.
    Encoding,
    /// Invalid or ambiguous configuration.
    Configuration,
    /// Operation not valid in the reader's current state.
    Session,
    /// Downloaded content is not valid tabular data.
    Parse,
    /// Any other SFTP-level failure.
    Protocol,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Connection(_) => ErrorKind::Connection,
            Error::Remote(RemoteError::NotFound { .. }) => ErrorKind::NotFound,
            Error::Remote(RemoteError::NotConnected | RemoteError::AlreadyConnected) => {
                ErrorKind::Session
            }
            Error::Remote(_) => ErrorKind::Protocol,
            Error::Encoding(_) => ErrorKind::Encoding,
            Error::Config(_) => ErrorKind::Configuration,
            Error::Parse(_) => ErrorKind::Parse,
        }
    }
}

/// Transport layer errors (SSH connection, authentication).
#[derive(Error, Debug)]
pub enum ConnectionError {
    /// Failed to connect to host
    #[error("Connection failed to {host}:{port}: {source}")]
    ConnectionFailed {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    /// SSH handshake or protocol error
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// Authentication failed
    #[error("Authentication failed for user '{user}'")]
    AuthenticationFailed { user: String },

    /// SSH key error
    #[error("SSH key error: {0}")]
    Key(String),

    /// Host is not present in known_hosts and verification is strict
    #[error("Host key for {host}:{port} is not known")]
    HostKeyUnknown { host: String, port: u16 },

    /// Host key differs from the known_hosts entry
    #[error("Host key for {host}:{port} changed (known_hosts line {line})")]
    HostKeyChanged { host: String, port: u16, line: usize },

    /// known_hosts could not be read or written
    #[error("known_hosts error: {0}")]
    KnownHosts(String),

    /// SFTP subsystem could not be started
    #[error("Failed to start SFTP subsystem: {0}")]
    Subsystem(String),

    /// Operation timed out
    #[error("Operation timed out after {0:?}")]
    Timeout(std::time::Duration),
}

/// Remote filesystem and session state errors.
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Remote path does not exist
    #[error("No such file or directory: {path}")]
    NotFound { path: String },

    /// Remote path exists but cannot be accessed
    #[error("Permission denied: {path}")]
    PermissionDenied { path: String },

    /// Any other SFTP failure
    #[error("SFTP error on {path}: {message}")]
    Protocol { path: String, message: String },

    /// Reader not connected
    #[error("Not connected - call connect() first")]
    NotConnected,

    /// Reader already connected
    #[error("Already connected")]
    AlreadyConnected,
}

/// Text decoding errors.
#[derive(Error, Debug)]
pub enum EncodingError {
    /// Bytes are not valid UTF-8
    #[error("Content is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// Encoding label is not recognized
    #[error("Unknown encoding '{label}'")]
    UnknownLabel { label: String },

    /// Bytes are malformed for the chosen encoding
    #[error("Content is not valid {encoding}")]
    Malformed { encoding: String },
}

/// Reader configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required field was not set
    #[error("{field} is required")]
    Missing { field: &'static str },

    /// Neither password nor private key was supplied
    #[error("Either password or pem_file must be provided")]
    NoCredential,

    /// Both password and private key were supplied
    #[error("Only one of password or pem_file may be provided")]
    ConflictingCredentials,

    /// CSV delimiter must be a single ASCII character
    #[error("Invalid CSV delimiter {0:?}: must be ASCII")]
    InvalidDelimiter(char),

    /// File pattern is not a valid glob
    #[error("Invalid glob pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

/// Tabular parsing errors.
#[derive(Error, Debug)]
pub enum ParseError {
    /// CSV tokenizer error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Supplied column names do not match the data width
    #[error("Expected {expected} columns, found {found}")]
    ColumnCount { expected: usize, found: usize },
}

/// Result type alias using cornflex's Error.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        let err: Error = RemoteError::NotFound {
            path: "/data".into(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err: Error = RemoteError::NotConnected.into();
        assert_eq!(err.kind(), ErrorKind::Session);

        let err: Error = ConfigError::ConflictingCredentials.into();
        assert_eq!(err.kind(), ErrorKind::Configuration);

        let err: Error = EncodingError::UnknownLabel {
            label: "klingon".into(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Encoding);

        let err: Error = ConnectionError::AuthenticationFailed { user: "bob".into() }.into();
        assert_eq!(err.kind(), ErrorKind::Connection);
    }

    #[test]
    fn test_messages() {
        let err: Error = ConfigError::NoCredential.into();
        assert!(err.to_string().contains("Either password or pem_file"));

        let err: Error = RemoteError::NotConnected.into();
        assert!(err.to_string().contains("Not connected"));
    }
}
