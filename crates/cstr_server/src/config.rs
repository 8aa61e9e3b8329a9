//! Command-line configuration.

use std::time::Duration;

use clap::Parser;
use cstr_net::connection::{DEFAULT_NATS_URL, NATS_URL_ENV};
use cstr_net::subjects::DEFAULT_PREFIX;

use crate::tick::TickConfig;

#[derive(Debug, Parser)]
#[command(
    name = "cstr_server",
    about = "Simulated CSTR plant served over NATS"
)]
pub struct Args {
    /// NATS server URL
    #[arg(short, long, env = NATS_URL_ENV, default_value = DEFAULT_NATS_URL)]
    pub nats_url: String,

    /// NATS subject prefix
    #[arg(short, long, default_value = DEFAULT_PREFIX)]
    pub prefix: String,

    /// Simulation tick period in milliseconds
    #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(u64).range(1..))]
    pub tick_ms: u64,

    /// Stop after this many ticks (0 = run until interrupted)
    #[arg(long, default_value_t = 0)]
    pub max_ticks: u64,
}

impl Args {
    #[must_use]
    pub fn tick_config(&self) -> TickConfig {
        TickConfig {
            period: Duration::from_millis(self.tick_ms),
            max_ticks: self.max_ticks,
        }
    }
}
