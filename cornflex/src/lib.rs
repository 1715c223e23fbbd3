//! # cornflex
//!
//! Async SFTP reader for pulling files off a remote server.
//!
//! cornflex wraps one SSH/SFTP session and offers a handful of typed
//! retrieval operations over it:
//!
//! - list a directory filtered by a glob (`*.csv`)
//! - download a CSV file as a [`Table`]
//! - download a file as text, UTF-8 or any other encoding, named or sniffed
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cornflex::ReaderBuilder;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), cornflex::Error> {
//!     let mut reader = ReaderBuilder::new("sftp.example.com")
//!         .username("etl")
//!         .password("secret")
//!         .build()?;
//!
//!     for name in reader.get_files("/exports", "*.csv").await? {
//!         println!("{name}");
//!     }
//!
//!     reader.connect().await?;
//!     let report = reader.file_to_string("report.txt", "/exports", None).await;
//!     reader.close().await?;
//!
//!     println!("{}", report?);
//!     Ok(())
//! }
//! ```

pub mod decode;
pub mod error;
pub mod pattern;
pub mod reader;
pub mod remote;
pub mod table;
pub mod transport;

// Re-export main types for convenience
pub use error::{Error, ErrorKind};
pub use reader::{ReaderBuilder, ReaderConfig, SftpReader};
pub use remote::{Connector, RemoteFs, SshConnector};
pub use table::{CsvOptions, Table};
pub use transport::{AuthMethod, HostKeyVerification, SshConfig};
