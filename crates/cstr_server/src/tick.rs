//! Periodic simulation driver.
//!
//! Runs one [`step`] per tick over the plant model and reports the output
//! sensor's hold/recover transitions. The tick timer is a tokio interval
//! that delays missed ticks, so two ticks never overlap.

use std::time::Duration;

use cstr_model::{ModelContext, StepOutcome, step};
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Configuration for the tick loop.
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Time between two ticks.
    pub period: Duration,
    /// Maximum number of ticks to run (0 = unlimited).
    pub max_ticks: u64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_millis(1000),
            max_ticks: 0,
        }
    }
}

#[derive(Debug)]
pub struct TickLoop {
    tick_id: u64,
    config: TickConfig,
    /// Whether the output sensor is currently holding its last good value.
    holding: bool,
}

impl TickLoop {
    #[must_use]
    pub fn new(config: TickConfig) -> Self {
        Self {
            tick_id: 0,
            config,
            holding: false,
        }
    }

    /// Returns the number of ticks run so far.
    #[must_use]
    pub fn tick_id(&self) -> u64 {
        self.tick_id
    }

    #[must_use]
    pub fn is_holding(&self) -> bool {
        self.holding
    }

    /// `true` once `max_ticks` ticks have run.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.config.max_ticks > 0 && self.tick_id >= self.config.max_ticks
    }

    /// A timer firing once per period. The first tick fires immediately.
    #[must_use]
    pub fn interval(&self) -> Interval {
        let mut interval = tokio::time::interval(self.config.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval
    }

    /// Run one simulation step.
    pub fn tick(&mut self, model: &mut ModelContext) -> StepOutcome {
        self.tick_id += 1;
        let outcome = step(model);

        debug!(
            tick_id = self.tick_id,
            flow = model.sensor_flow.process_value,
            temperature = model.sensor_temperature.process_value,
            concentration_a = model.sensor_concentration_a.process_value,
            concentration_b = model.sensor_concentration_b.process_value,
            "tick"
        );

        match (&outcome, self.holding) {
            (StepOutcome::Held { reason, retained }, false) => {
                warn!(
                    tick_id = self.tick_id,
                    %reason,
                    retained,
                    "outlet concentration invalid, holding last good value"
                );
                self.holding = true;
            }
            (StepOutcome::Held { reason, .. }, true) => {
                debug!(tick_id = self.tick_id, %reason, "still holding");
            }
            (StepOutcome::Committed(value), true) => {
                info!(tick_id = self.tick_id, value, "outlet concentration recovered");
                self.holding = false;
            }
            (StepOutcome::Committed(_), false) => {}
        }
        outcome
    }
}
