//! Example: list CSV exports on an SFTP server and print one of them
//!
//! # Prerequisites
//!
//! - SFTP server reachable from this machine
//! - Valid credentials (username/password or SSH key)
//!
//! # Usage
//!
//! With password authentication:
//! ```bash
//! cargo run --example fetch_report -- --host localhost --user etl --password secret --dir /exports
//! ```
//!
//! With SSH key authentication, fetching a Latin-1 text file:
//! ```bash
//! cargo run --example fetch_report -- --host localhost --user etl --key ~/.ssh/id_rsa \
//!     --dir /exports --text legacy.txt --encoding latin-1
//! ```

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use cornflex::ReaderBuilder;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (set RUST_LOG=debug for verbose output)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut builder = ReaderBuilder::new(&args.host)
        .port(args.port)
        .username(&args.user)
        .timeout(Duration::from_secs(args.timeout));

    if let Some(password) = &args.password {
        builder = builder.password(password);
    }
    if let Some(key_path) = &args.key {
        builder = builder.private_key(key_path);
    }

    // Fails here, before any network traffic, unless exactly one credential was given
    let mut reader = builder.build()?;

    println!("Listing {} on {}:{}...", args.dir, args.host, args.port);
    let files = reader.get_files(&args.dir, &args.pattern).await?;
    for name in &files {
        println!("  {name}");
    }
    if files.is_empty() {
        println!("No files match '{}'", args.pattern);
    }

    reader.connect().await?;

    // Close even when a download fails
    let result = async {
        if let Some(first) = files.first() {
            let table = reader.get_csv_file(first, &args.dir, None).await?;
            println!("\n{}: {} row(s), columns {:?}", first, table.len(), table.headers());
            for record in table.records().take(5) {
                println!("  {record:?}");
            }
        }

        if let Some(text_file) = &args.text {
            let text = reader
                .file_to_string(text_file, &args.dir, args.encoding.as_deref())
                .await?;
            println!("\n{text_file}:\n{text}");
        }
        Ok::<_, cornflex::Error>(())
    }
    .await;

    reader.close().await?;
    result?;
    Ok(())
}

/// Simple argument parser (avoiding external dependencies)
struct Args {
    host: String,
    port: u16,
    user: String,
    password: Option<String>,
    key: Option<PathBuf>,
    timeout: u64,
    dir: String,
    pattern: String,
    text: Option<String>,
    encoding: Option<String>,
}

impl Args {
    fn parse() -> Self {
        let args: Vec<String> = env::args().collect();
        let mut parsed = Self {
            host: "localhost".to_string(),
            port: 22,
            user: env::var("USER").unwrap_or_else(|_| "root".to_string()),
            password: None,
            key: None,
            timeout: 30,
            dir: ".".to_string(),
            pattern: "*.csv".to_string(),
            text: None,
            encoding: None,
        };

        let mut i = 1;
        while i < args.len() {
            let flag = args[i].as_str();
            if flag == "--help" {
                Self::print_help();
                std::process::exit(0);
            }

            i += 1;
            let Some(value) = args.get(i).cloned() else {
                eprintln!("Missing value for {flag}");
                break;
            };
            match flag {
                "--host" | "-h" => parsed.host = value,
                "--port" | "-p" => parsed.port = value.parse().unwrap_or(22),
                "--user" | "-u" => parsed.user = value,
                "--password" | "-P" => parsed.password = Some(value),
                "--key" | "-k" => parsed.key = Some(PathBuf::from(value)),
                "--timeout" | "-t" => parsed.timeout = value.parse().unwrap_or(30),
                "--dir" | "-d" => parsed.dir = value,
                "--pattern" => parsed.pattern = value,
                "--text" => parsed.text = Some(value),
                "--encoding" | "-e" => parsed.encoding = Some(value),
                _ => eprintln!("Unknown argument: {flag}"),
            }
            i += 1;
        }

        parsed
    }

    fn print_help() {
        println!(
            r#"cornflex fetch_report example

USAGE:
    cargo run --example fetch_report -- [OPTIONS]

OPTIONS:
    -h, --host <HOST>        Target host [default: localhost]
    -p, --port <PORT>        SSH port [default: 22]
    -u, --user <USER>        Username [default: $USER]
    -P, --password <PASS>    Password for authentication
    -k, --key <PATH>         Path to SSH private key
    -t, --timeout <SECS>     Connection timeout [default: 30]
    -d, --dir <PATH>         Remote directory [default: .]
        --pattern <GLOB>     File name pattern [default: *.csv]
        --text <FILE>        Also print this file as text
    -e, --encoding <LABEL>   Encoding of --text [default: sniffed]
    --help                   Print this help message
"#
        );
    }
}
