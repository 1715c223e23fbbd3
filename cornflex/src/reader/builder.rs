//! Builder for creating SFTP readers.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use super::SftpReader;
use super::config::ReaderConfig;
use crate::error::{ConfigError, Result};
use crate::remote::{Connector, SshConnector};
use crate::table::CsvOptions;
use crate::transport::config::{AuthMethod, HostKeyVerification, SshConfig};

/// Builder for constructing [`SftpReader`]s.
///
/// `build()` does no I/O; it only checks that the settings make sense.
/// Exactly one of [`password`](Self::password) and
/// [`private_key`](Self::private_key) must be set.
///
/// # Example
///
/// ```rust,no_run
/// use cornflex::ReaderBuilder;
///
/// # async fn example() -> Result<(), cornflex::Error> {
/// let mut reader = ReaderBuilder::new("sftp.example.com")
///     .username("etl")
///     .private_key("/keys/etl.pem")
///     .build()?;
///
/// reader.connect().await?;
/// let orders = reader.get_csv_file("orders.csv", "/exports", None).await?;
/// reader.close().await?;
/// # Ok(())
/// # }
/// ```
pub struct ReaderBuilder {
    host: String,
    port: u16,
    username: Option<String>,
    password: Option<SecretString>,
    private_key: Option<(PathBuf, Option<SecretString>)>,
    timeout: Duration,
    host_key_verification: HostKeyVerification,
    known_hosts_path: Option<PathBuf>,
    delimiter: char,
}

impl ReaderBuilder {
    /// Create a new reader builder for the specified host.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: 22,
            username: None,
            password: None,
            private_key: None,
            timeout: Duration::from_secs(30),
            host_key_verification: HostKeyVerification::default(),
            known_hosts_path: None,
            delimiter: ',',
        }
    }

    /// Start from deserialized settings.
    pub fn from_config(config: ReaderConfig) -> Self {
        let mut builder = Self::new(config.hostname)
            .username(config.username)
            .port(config.port)
            .timeout(Duration::from_secs(config.timeout_secs))
            .host_key_verification(config.host_key_verification)
            .delimiter(config.delimiter);
        builder.password = config.password;
        builder.private_key = config.pem_file.map(|path| (path, config.passphrase));
        builder.known_hosts_path = config.known_hosts_path;
        builder
    }

    /// Set the SSH port (default: 22).
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the username for authentication.
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set password authentication.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(SecretString::from(password.into()));
        self
    }

    /// Set private key authentication.
    pub fn private_key(mut self, key_path: impl Into<PathBuf>) -> Self {
        self.private_key = Some((key_path.into(), None));
        self
    }

    /// Set private key authentication with passphrase.
    pub fn private_key_with_passphrase(
        mut self,
        key_path: impl Into<PathBuf>,
        passphrase: impl Into<String>,
    ) -> Self {
        self.private_key = Some((key_path.into(), Some(SecretString::from(passphrase.into()))));
        self
    }

    /// Set the connection timeout (default: 30s).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the host key verification mode.
    pub fn host_key_verification(mut self, mode: HostKeyVerification) -> Self {
        self.host_key_verification = mode;
        self
    }

    /// Use a specific known_hosts file instead of `~/.ssh/known_hosts`.
    pub fn known_hosts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_hosts_path = Some(path.into());
        self
    }

    /// Set the CSV field delimiter (default: `,`).
    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Build a reader that connects over SSH.
    pub fn build(self) -> Result<SftpReader> {
        self.build_with(SshConnector)
    }

    /// Build a reader that opens sessions through `connector`.
    pub fn build_with<C: Connector>(self, connector: C) -> Result<SftpReader<C>> {
        let (ssh_config, csv_options) = self.into_parts()?;
        Ok(SftpReader::from_parts(ssh_config, csv_options, connector))
    }

    fn into_parts(self) -> Result<(SshConfig, CsvOptions)> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::Missing { field: "hostname" }.into());
        }

        let username = self
            .username
            .filter(|u| !u.is_empty())
            .ok_or(ConfigError::Missing { field: "username" })?;

        // An empty password counts as not supplied
        let password = self.password.filter(|p| !p.expose_secret().is_empty());

        let auth = match (password, self.private_key) {
            (Some(password), None) => AuthMethod::Password(password),
            (None, Some((path, passphrase))) => AuthMethod::PrivateKey { path, passphrase },
            (Some(_), Some(_)) => return Err(ConfigError::ConflictingCredentials.into()),
            (None, None) => return Err(ConfigError::NoCredential.into()),
        };

        if !self.delimiter.is_ascii() {
            return Err(ConfigError::InvalidDelimiter(self.delimiter).into());
        }

        let ssh_config = SshConfig {
            host: self.host,
            port: self.port,
            username,
            auth,
            timeout: self.timeout,
            host_key_verification: self.host_key_verification,
            known_hosts_path: self.known_hosts_path,
        };
        let csv_options = CsvOptions {
            delimiter: self.delimiter as u8,
        };

        Ok((ssh_config, csv_options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use crate::error::Error;

    fn config_error(builder: ReaderBuilder) -> ConfigError {
        match builder.build() {
            Err(Error::Config(e)) => e,
            Err(other) => panic!("expected config error, got {other}"),
            Ok(_) => panic!("expected config error, got a reader"),
        }
    }

    #[test]
    fn test_password_only() {
        let reader = ReaderBuilder::new("host")
            .username("user")
            .password("pass")
            .build()
            .unwrap();
        assert!(matches!(reader.ssh_config().auth, AuthMethod::Password(_)));
        assert_eq!(reader.ssh_config().port, 22);
        assert_eq!(reader.ssh_config().timeout, Duration::from_secs(30));
        assert!(!reader.is_connected());
    }

    #[test]
    fn test_key_only() {
        let reader = ReaderBuilder::new("host")
            .username("user")
            .private_key_with_passphrase("/path/to/key.pem", "secret")
            .port(2222)
            .build()
            .unwrap();
        match &reader.ssh_config().auth {
            AuthMethod::PrivateKey { path, passphrase } => {
                assert_eq!(path, &PathBuf::from("/path/to/key.pem"));
                assert!(passphrase.is_some());
            }
            other => panic!("unexpected auth {other:?}"),
        }
        assert_eq!(reader.ssh_config().socket_addr(), "host:2222");
    }

    #[test]
    fn test_no_credential() {
        let err = config_error(ReaderBuilder::new("host").username("user"));
        assert!(matches!(err, ConfigError::NoCredential));
    }

    #[test]
    fn test_both_credentials() {
        let err = config_error(
            ReaderBuilder::new("host")
                .username("user")
                .password("pass")
                .private_key("/path/to/key.pem"),
        );
        assert!(matches!(err, ConfigError::ConflictingCredentials));
    }

    #[test]
    fn test_empty_password_falls_back_to_key() {
        let reader = ReaderBuilder::new("host")
            .username("user")
            .password("")
            .private_key("/path/to/key.pem")
            .build()
            .unwrap();
        assert!(matches!(reader.ssh_config().auth, AuthMethod::PrivateKey { .. }));

        let err = config_error(ReaderBuilder::new("host").username("user").password(""));
        assert!(matches!(err, ConfigError::NoCredential));
    }

    #[test]
    fn test_missing_username() {
        let err = config_error(ReaderBuilder::new("host").password("pass"));
        assert!(matches!(err, ConfigError::Missing { field: "username" }));
    }

    #[test]
    fn test_bad_delimiter() {
        let result = ReaderBuilder::new("host")
            .username("user")
            .password("pass")
            .delimiter('§')
            .build();
        assert_eq!(result.err().map(|e| e.kind()), Some(ErrorKind::Configuration));
    }

    #[test]
    fn test_from_config() {
        let config: ReaderConfig = serde_json::from_str(
            r#"{"hostname": "h", "username": "u", "pem_file": "/k.pem", "delimiter": "|"}"#,
        )
        .unwrap();
        let reader = ReaderBuilder::from_config(config).build().unwrap();
        assert!(matches!(reader.ssh_config().auth, AuthMethod::PrivateKey { .. }));
        assert_eq!(reader.csv_options().delimiter, b'|');
    }

    #[test]
    fn test_from_config_conflicting() {
        let config: ReaderConfig = serde_json::from_str(
            r#"{"hostname": "h", "username": "u", "password": "p", "pem_file": "/k.pem"}"#,
        )
        .unwrap();
        let result = ReaderBuilder::from_config(config).build();
        assert_eq!(result.err().map(|e| e.kind()), Some(ErrorKind::Configuration));
    }
}
