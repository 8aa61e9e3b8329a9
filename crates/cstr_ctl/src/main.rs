//! # cstr_ctl
//!
//! Operator client for a running `cstr_server`: read, write and browse
//! plant variables and dump the object type schema. Replies are printed
//! as JSON on stdout.
//!
//! Nodes are given as `ns=1;i=50003` or as a browse path such as
//! `Valves/HC-2/MANUAL_OUTPUT`.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use cstr_net::connection::{DEFAULT_NATS_URL, NATS_URL_ENV};
use cstr_net::subjects::{self, DEFAULT_PREFIX};
use cstr_net::{BrowseRequest, NatsConnection, NodeRef, ReadRequest, SchemaRequest, WriteRequest};
use cstr_space::{DataValue, ReferenceDescription, Variant};

#[derive(Debug, Parser)]
#[command(name = "cstr_ctl", about = "Read and write the CSTR plant over NATS")]
struct Cli {
    /// NATS server URL
    #[arg(short, long, env = NATS_URL_ENV, default_value = DEFAULT_NATS_URL)]
    nats_url: String,

    /// NATS subject prefix
    #[arg(short, long, default_value = DEFAULT_PREFIX)]
    prefix: String,

    /// Reply timeout in milliseconds
    #[arg(long, default_value_t = 2000)]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Read one variable
    Read {
        node: String,
        /// Index range, e.g. `0:3`
        #[arg(long)]
        range: Option<String>,
        /// Ask for the source timestamp
        #[arg(long)]
        source_ts: bool,
    },
    /// Write one variable
    Write {
        node: String,
        kind: ValueKind,
        value: String,
        /// Index range, e.g. `0:3`
        #[arg(long)]
        range: Option<String>,
    },
    /// List the children of a node (default: the Objects folder)
    Browse { node: Option<String> },
    /// Print the registered object types
    Schema,
}

/// Wire type of a value given on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ValueKind {
    Double,
    Uint32,
    Int32,
    Boolean,
    String,
}

fn parse_value(kind: ValueKind, text: &str) -> Result<Variant> {
    let value = match kind {
        ValueKind::Double => Variant::Double(text.parse().context("expected a floating point number")?),
        ValueKind::Uint32 => Variant::UInt32(text.parse().context("expected an unsigned 32-bit integer")?),
        ValueKind::Int32 => Variant::Int32(text.parse().context("expected a signed 32-bit integer")?),
        ValueKind::Boolean => Variant::Boolean(text.parse().context("expected true or false")?),
        ValueKind::String => Variant::String(text.to_string()),
    };
    Ok(value)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("cstr_ctl=warn".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let timeout = Duration::from_millis(cli.timeout_ms);
    let conn = NatsConnection::connect_to(&cli.nats_url).await?;
    debug!(prefix = %cli.prefix, "connected");

    let output = match cli.command {
        Command::Read {
            node,
            range,
            source_ts,
        } => {
            let request = ReadRequest {
                node: NodeRef::parse(&node),
                index_range: range,
                include_source_timestamp: source_ts,
            };
            let value: DataValue = conn
                .request(&subjects::read(&cli.prefix), &request, timeout)
                .await?;
            serde_json::to_value(value)?
        }
        Command::Write {
            node,
            kind,
            value,
            range,
        } => {
            let request = WriteRequest {
                node: NodeRef::parse(&node),
                value: Some(parse_value(kind, &value)?),
                index_range: range,
            };
            conn.request::<_, ()>(&subjects::write(&cli.prefix), &request, timeout)
                .await?;
            serde_json::json!({ "status": "Good" })
        }
        Command::Browse { node } => {
            let request = BrowseRequest {
                node: node.as_deref().map(NodeRef::parse),
            };
            let refs: Vec<ReferenceDescription> = conn
                .request(&subjects::browse(&cli.prefix), &request, timeout)
                .await?;
            serde_json::to_value(refs)?
        }
        Command::Schema => {
            let schema: String = conn
                .request(&subjects::schema(&cli.prefix), &SchemaRequest {}, timeout)
                .await?;
            serde_json::from_str(&schema)?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
