//! The SFTP reader.
//!
//! [`SftpReader`] owns at most one remote session. It moves between two
//! states, disconnected and connected, only through [`SftpReader::connect`]
//! and [`SftpReader::close`]. Downloads need a connected reader;
//! [`SftpReader::get_files`] manages a short-lived session of its own.

mod builder;
mod config;

pub use builder::ReaderBuilder;
pub use config::ReaderConfig;

use std::path::Path;

use log::{debug, warn};

use crate::decode;
use crate::error::{RemoteError, Result};
use crate::pattern::FileMatcher;
use crate::remote::{Connector, RemoteFs, SshConnector, remote_file_path};
use crate::table::{CsvOptions, Table};
use crate::transport::config::SshConfig;

/// Reads files from one SFTP server.
///
/// Not meant to be shared between tasks: every session-bound operation
/// takes `&mut self`.
pub struct SftpReader<C: Connector = SshConnector> {
    /// SSH configuration.
    ssh_config: SshConfig,

    /// How CSV downloads are parsed.
    csv_options: CsvOptions,

    /// Opens remote sessions.
    connector: C,

    /// Open session (None when disconnected).
    session: Option<C::Fs>,
}

impl SftpReader {
    /// Create a reader from the four classic parameters.
    ///
    /// Exactly one of `password` and `pem_file` must be `Some`.
    pub fn new(
        hostname: &str,
        username: &str,
        password: Option<&str>,
        pem_file: Option<&Path>,
    ) -> Result<Self> {
        let mut builder = ReaderBuilder::new(hostname).username(username);
        if let Some(password) = password {
            builder = builder.password(password);
        }
        if let Some(pem_file) = pem_file {
            builder = builder.private_key(pem_file);
        }
        builder.build()
    }
}

impl<C: Connector> SftpReader<C> {
    pub(crate) fn from_parts(ssh_config: SshConfig, csv_options: CsvOptions, connector: C) -> Self {
        Self {
            ssh_config,
            csv_options,
            connector,
            session: None,
        }
    }

    /// Connection settings this reader uses.
    pub fn ssh_config(&self) -> &SshConfig {
        &self.ssh_config
    }

    /// CSV parsing settings this reader uses.
    pub fn csv_options(&self) -> &CsvOptions {
        &self.csv_options
    }

    /// Check if a session is open.
    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    /// Open the session: connect, authenticate, start SFTP.
    pub async fn connect(&mut self) -> Result<()> {
        if self.session.is_some() {
            return Err(RemoteError::AlreadyConnected.into());
        }

        let session = self.connector.connect(&self.ssh_config).await?;
        self.session = Some(session);
        debug!("Connected to {}", self.ssh_config.socket_addr());
        Ok(())
    }

    /// Close the session. Does nothing when not connected.
    ///
    /// The reader is disconnected afterwards even if closing reported an
    /// error.
    pub async fn close(&mut self) -> Result<()> {
        if let Some(session) = self.session.take() {
            session.close().await?;
            debug!("Closed connection to {}", self.ssh_config.socket_addr());
        }
        Ok(())
    }

    /// List the file names in `remote_path` matching the glob `file_pattern`.
    ///
    /// Opens and closes a session of its own, so the reader does not need
    /// to be connected and its own session is left alone. Names are
    /// returned without the directory and sorted.
    pub async fn get_files(&self, remote_path: &str, file_pattern: &str) -> Result<Vec<String>> {
        let matcher = FileMatcher::new(file_pattern)?;

        let mut session = self.connector.connect(&self.ssh_config).await?;
        let listed = session.list_dir(remote_path).await;
        let closed = session.close().await;

        let names = match (listed, closed) {
            (Ok(names), Ok(())) => names,
            (Ok(_), Err(e)) => return Err(e),
            (Err(e), closed) => {
                if let Err(close_err) = closed {
                    warn!("Failed to close session after listing error: {}", close_err);
                }
                return Err(e);
            }
        };

        let matched = matcher.filter(names);
        debug!(
            "{} file(s) in {} match '{}'",
            matched.len(),
            remote_path,
            matcher.as_str()
        );
        Ok(matched)
    }

    /// Every file name in the login directory.
    pub async fn list_files(&self) -> Result<Vec<String>> {
        self.get_files(".", "*").await
    }

    /// Download a UTF-8 CSV file and parse it into a [`Table`].
    ///
    /// With `column_names` the file is treated as having no header row and
    /// the names become the header. Without, the first row is the header.
    /// Encoding is not sniffed on this path; non UTF-8 content is an error.
    pub async fn get_csv_file(
        &mut self,
        file_name: &str,
        remote_path: &str,
        column_names: Option<&[&str]>,
    ) -> Result<Table> {
        let bytes = self.download(file_name, remote_path).await?;
        let text = decode::decode_utf8(&bytes)?;
        Table::from_csv(&text, column_names, &self.csv_options)
    }

    /// Download a file and return it as UTF-8 text. The XML is not parsed.
    pub async fn get_xml_file_to_string(
        &mut self,
        file_name: &str,
        remote_path: &str,
    ) -> Result<String> {
        let bytes = self.download(file_name, remote_path).await?;
        decode::decode_utf8(&bytes)
    }

    /// Download a file and decode it.
    ///
    /// `encoding` is a label such as `"utf-8"` or `"latin-1"`; when `None`
    /// the encoding is sniffed from the content.
    pub async fn file_to_string(
        &mut self,
        file_name: &str,
        remote_path: &str,
        encoding: Option<&str>,
    ) -> Result<String> {
        let bytes = self.download(file_name, remote_path).await?;
        match encoding {
            Some(label) => decode::decode_with_label(&bytes, label),
            None => decode::decode_detected(&bytes),
        }
    }

    /// Fetch the raw bytes of `remote_path/file_name`.
    pub async fn download(&mut self, file_name: &str, remote_path: &str) -> Result<Vec<u8>> {
        let path = remote_file_path(remote_path, file_name);
        let session = self.session.as_mut().ok_or(RemoteError::NotConnected)?;
        session.read_file(&path).await
    }
}

impl<C: Connector> Drop for SftpReader<C> {
    fn drop(&mut self) {
        if self.session.is_some() {
            warn!(
                "SftpReader for {} dropped while connected; call close() first",
                self.ssh_config.socket_addr()
            );
        }
    }
}
