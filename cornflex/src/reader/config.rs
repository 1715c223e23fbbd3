//! Serializable reader settings.

use std::path::PathBuf;

use secrecy::SecretString;
use serde::{Deserialize, Deserializer};

use crate::transport::HostKeyVerification;

/// Reader settings as they would appear in a config file.
///
/// Exactly one of `password` and `pem_file` must be set; this is checked
/// when the settings are turned into a reader, not when they are parsed.
///
/// ```rust
/// let config: cornflex::ReaderConfig = serde_json::from_str(
///     r#"{ "hostname": "sftp.example.com", "username": "etl", "pem_file": "/keys/etl.pem" }"#,
/// ).unwrap();
/// assert_eq!(config.port, 22);
/// ```
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReaderConfig {
    pub hostname: String,
    pub username: String,
    #[serde(default, deserialize_with = "secret")]
    pub password: Option<SecretString>,
    pub pem_file: Option<PathBuf>,
    /// Passphrase for an encrypted `pem_file`.
    #[serde(default, deserialize_with = "secret")]
    pub passphrase: Option<SecretString>,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub host_key_verification: HostKeyVerification,
    pub known_hosts_path: Option<PathBuf>,
    /// CSV field delimiter.
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

fn secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.map(SecretString::from))
}

fn default_port() -> u16 {
    22
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_delimiter() -> char {
    ','
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_defaults() {
        let config: ReaderConfig =
            serde_json::from_str(r#"{"hostname": "h", "username": "u", "password": "p"}"#)
                .unwrap();
        assert_eq!(config.port, 22);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.delimiter, ',');
        assert_eq!(config.host_key_verification, HostKeyVerification::AcceptNew);
        assert_eq!(config.password.unwrap().expose_secret(), "p");
        assert!(config.pem_file.is_none());
    }

    #[test]
    fn test_full() {
        let config: ReaderConfig = serde_json::from_str(
            r#"{
                "hostname": "sftp.example.com",
                "username": "etl",
                "pem_file": "/keys/etl.pem",
                "passphrase": "hunter2",
                "port": 2222,
                "timeout_secs": 5,
                "host_key_verification": "strict",
                "known_hosts_path": "/etc/ssh/known_hosts",
                "delimiter": ";"
            }"#,
        )
        .unwrap();
        assert_eq!(config.port, 2222);
        assert_eq!(config.host_key_verification, HostKeyVerification::Strict);
        assert_eq!(config.pem_file.as_deref(), Some(std::path::Path::new("/keys/etl.pem")));
        assert_eq!(config.delimiter, ';');
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = serde_json::from_str::<ReaderConfig>(
            r#"{"hostname": "h", "username": "u", "pasword": "typo"}"#,
        );
        assert!(result.is_err());
    }
}
