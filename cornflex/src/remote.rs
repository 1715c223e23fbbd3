//! Remote filesystem access.
//!
//! [`Connector`] opens a session and [`RemoteFs`] is what the reader needs
//! from it: list a directory, read a file, close. [`SshConnector`] is the
//! real implementation over russh and russh-sftp.

use std::future::Future;

use log::debug;
use russh_sftp::client::SftpSession;
use russh_sftp::client::error::Error as SftpError;
use russh_sftp::protocol::StatusCode;

use crate::error::{ConnectionError, RemoteError, Result};
use crate::transport::{SshConfig, SshTransport};

/// An open session on a remote filesystem.
pub trait RemoteFs: Send {
    /// List the entry names of a directory, without `.` and `..`.
    fn list_dir(&mut self, path: &str) -> impl Future<Output = Result<Vec<String>>> + Send;

    /// Read a whole file.
    fn read_file(&mut self, path: &str) -> impl Future<Output = Result<Vec<u8>>> + Send;

    /// Release the session.
    fn close(self) -> impl Future<Output = Result<()>> + Send;
}

/// Opens [`RemoteFs`] sessions.
pub trait Connector: Send + Sync {
    /// Session type produced by this connector.
    type Fs: RemoteFs;

    /// Connect, authenticate and open a filesystem session.
    fn connect(&self, config: &SshConfig) -> impl Future<Output = Result<Self::Fs>> + Send;
}

/// Connector backed by an SSH transport and the `sftp` subsystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct SshConnector;

impl Connector for SshConnector {
    type Fs = SftpChannel;

    async fn connect(&self, config: &SshConfig) -> Result<SftpChannel> {
        let transport = SshTransport::connect(config).await?;
        let sftp = match transport.open_sftp().await {
            Ok(sftp) => sftp,
            Err(e) => {
                // Don't leave the authenticated transport dangling
                let _ = transport.close().await;
                return Err(e);
            }
        };
        Ok(SftpChannel { transport, sftp })
    }
}

/// SFTP channel plus the transport it runs on.
pub struct SftpChannel {
    transport: SshTransport,
    sftp: SftpSession,
}

impl RemoteFs for SftpChannel {
    async fn list_dir(&mut self, path: &str) -> Result<Vec<String>> {
        debug!("Listing {}", path);
        let entries = self
            .sftp
            .read_dir(path)
            .await
            .map_err(|e| map_sftp_error(path, e))?;

        Ok(entries
            .map(|entry| entry.file_name())
            .filter(|name| name != "." && name != "..")
            .collect())
    }

    async fn read_file(&mut self, path: &str) -> Result<Vec<u8>> {
        debug!("Downloading {}", path);
        let data = self
            .sftp
            .read(path)
            .await
            .map_err(|e| map_sftp_error(path, e))?;
        debug!("Downloaded {} bytes from {}", data.len(), path);
        Ok(data)
    }

    async fn close(self) -> Result<()> {
        let sftp_result = self.sftp.close().await;
        // The transport is torn down even if the SFTP close failed
        self.transport.close().await?;
        sftp_result.map_err(|e| ConnectionError::Subsystem(e.to_string()))?;
        Ok(())
    }
}

/// Map an SFTP client error for `path` onto the crate's error kinds.
fn map_sftp_error(path: &str, err: SftpError) -> crate::Error {
    let path = path.to_string();
    match err {
        SftpError::Status(status) => match status.status_code {
            StatusCode::NoSuchFile => RemoteError::NotFound { path },
            StatusCode::PermissionDenied => RemoteError::PermissionDenied { path },
            _ => RemoteError::Protocol {
                path,
                message: status.error_message,
            },
        },
        other => RemoteError::Protocol {
            path,
            message: other.to_string(),
        },
    }
    .into()
}

/// Join a remote directory and a file name with a single `/`.
pub fn remote_file_path(remote_path: &str, file_name: &str) -> String {
    format!("{}/{}", remote_path.trim_end_matches('/'), file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_file_path() {
        assert_eq!(remote_file_path("/data", "a.csv"), "/data/a.csv");
        assert_eq!(remote_file_path("/data/", "a.csv"), "/data/a.csv");
        assert_eq!(remote_file_path(".", "a.csv"), "./a.csv");
        assert_eq!(remote_file_path("/", "a.csv"), "/a.csv");
    }

    #[test]
    fn test_map_sftp_status() {
        let status = russh_sftp::protocol::Status {
            id: 1,
            status_code: StatusCode::NoSuchFile,
            error_message: "no such file".into(),
            language_tag: "en".into(),
        };
        let err = map_sftp_error("/missing", SftpError::Status(status));
        assert_eq!(err.kind(), crate::ErrorKind::NotFound);
        assert!(err.to_string().contains("/missing"));
    }
}
