//! # cstr_server
//!
//! Serves the simulated CSTR plant over NATS.
//!
//! ## Startup Sequence
//!
//! 1. Register the plant object types.
//! 2. Create the `Model`, `Valves`, `Sensors` and `Reactors` folders and the
//!    nine plant instances, binding each child to its model field.
//! 3. Abort with a nonzero exit if any instance failed to bind.
//! 4. Connect to NATS and serve requests while ticking the simulation.
//! 5. On interrupt, unsubscribe, flush and exit cleanly.

mod api;
mod config;
mod setup;
mod tick;

use anyhow::{Result, bail};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use api::Server;
use config::Args;
use cstr_net::NatsConnection;
use setup::Plant;
use tick::TickLoop;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("cstr_server=info".parse()?))
        .init();

    let args = Args::parse();
    info!(prefix = %args.prefix, tick_ms = args.tick_ms, "cstr server starting");

    let (plant, report) = Plant::build()?;
    if !report.is_complete() {
        for failure in report.failures() {
            if let Some(e) = &failure.error {
                error!(instance = %failure.path, error = %e, "instance unusable");
            }
        }
        bail!(
            "plant setup failed: {} of {} instances could not be bound",
            report.failures().count(),
            report.instances.len()
        );
    }

    let conn = NatsConnection::connect_to(&args.nats_url).await?;
    let server = Server::new(plant, TickLoop::new(args.tick_config()), conn, args.prefix);
    server.run().await?;

    info!("cstr server shut down");
    Ok(())
}
