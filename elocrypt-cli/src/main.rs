//! `elocrypt` CLI tool for keys and JSON records.

#![warn(clippy::pedantic, clippy::nursery)]

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use elocrypt::prelude::*;
use serde_json::Value;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "elocrypt")]
#[command(about = "Field-level encryption for JSON records", long_about = None)]
struct Cli {
    /// Read the key from this file instead of ELOCRYPT_KEY
    #[arg(long, global = true)]
    key_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new encryption key
    Keygen {
        /// Write the key to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Encrypt the configured fields of a JSON record
    Encrypt(RecordArgs),
    /// Decrypt the configured fields of a JSON record
    Decrypt(RecordArgs),
}

#[derive(Args)]
struct RecordArgs {
    /// Field to treat as encrypted (repeatable or comma-separated)
    #[arg(short, long = "field", value_delimiter = ',', required = true)]
    fields: Vec<String>,

    /// JSON file holding the record; stdin when omitted
    #[arg(short, long)]
    input: Option<PathBuf>,
}

fn main() -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(env_filter).with_writer(std::io::stderr).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Keygen { output } => keygen(output.as_deref()),
        Commands::Encrypt(args) => {
            let crypt = build_crypt(cli.key_file)?;
            let record = read_record(args.input.as_deref())?;
            let config = FieldConfig::new(args.fields);
            tracing::debug!(fields = %config, entries = record.len(), "encrypting record");
            print_record(&crypt.crypt.on_fields_store(&record, &config))?;
            crypt.report();
            Ok(())
        }
        Commands::Decrypt(args) => {
            let crypt = build_crypt(cli.key_file)?;
            let record = read_record(args.input.as_deref())?;
            let config = FieldConfig::new(args.fields);
            tracing::debug!(fields = %config, entries = record.len(), "decrypting record");
            print_record(&crypt.crypt.on_fields_export(&record, &config))?;
            crypt.report();
            Ok(())
        }
    }
}

/// Interceptor plus the counter observing its fallbacks.
struct CountedCrypt {
    crypt: FieldCrypt<AeadCipher>,
    failures: Arc<FailureCounter>,
}

impl CountedCrypt {
    fn report(&self) {
        let encrypt = self.failures.encrypt_failures();
        let decrypt = self.failures.decrypt_failures();
        if encrypt > 0 {
            eprintln!("warning: {encrypt} field(s) could not be encrypted, left as plaintext");
        }
        if decrypt > 0 {
            eprintln!("warning: {decrypt} field(s) could not be decrypted and were left tagged");
        }
    }
}

fn build_crypt(key_file: Option<PathBuf>) -> Result<CountedCrypt> {
    let mut settings = Settings::from_env().context("failed to read ELOCRYPT_* settings")?;
    if let Some(path) = key_file {
        settings = settings.with_key_file(path);
    }
    let cipher = settings.build_cipher().context("failed to load encryption key")?;

    let failures = Arc::new(FailureCounter::new());
    let crypt = FieldCrypt::new(cipher).with_observer(failures.clone());
    Ok(CountedCrypt { crypt, failures })
}

fn keygen(output: Option<&Path>) -> Result<()> {
    let key = EncryptionKey::generate().to_base64();
    match output {
        Some(path) => {
            std::fs::write(path, format!("{key}\n"))
                .with_context(|| format!("failed to write key to {}", path.display()))?;
            eprintln!("Key written to {}", path.display());
        }
        None => println!("{key}"),
    }
    Ok(())
}

fn read_record(input: Option<&Path>) -> Result<Record> {
    let raw = match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).context("failed to read stdin")?;
            buf
        }
    };

    match serde_json::from_str::<Value>(&raw).context("input is not valid JSON")? {
        Value::Object(record) => Ok(record),
        other => bail!("expected a JSON object, got {}", type_name(&other)),
    }
}

fn print_record(record: &Record) -> Result<()> {
    let json = serde_json::to_string_pretty(record).context("failed to serialize record")?;
    println!("{json}");
    Ok(())
}

const fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
