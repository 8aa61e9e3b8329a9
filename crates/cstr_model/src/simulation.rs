//! One simulation tick.
//!
//! 1. Flow sensor follows the feed valve.
//! 2. Concentration-A sensor follows the dosing valve.
//! 3. Temperature sensor follows the heating valve, except that a fully
//!    closed dosing valve forces it to exactly 0 (no feed, no reaction heat).
//! 4. The reactor model runs on the freshly derived readings.
//! 5. A finite, non-negative result is committed to the output sensor;
//!    anything else leaves the previous output in place.
//!
//! The step is not reentrant. Callers serialize it with every other
//! mutation of the same [`ModelContext`].

use crate::curve;
use crate::plant::ModelContext;
use crate::reactor::{Invalidity, try_outlet_concentration};

/// What a tick did with the output sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    /// The new outlet concentration was written.
    Committed(f64),
    /// The computation was invalid; `retained` is the value left in place.
    Held { reason: Invalidity, retained: f64 },
}

impl StepOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, StepOutcome::Committed(_))
    }
}

/// Run one tick over `ctx`.
pub fn step(ctx: &mut ModelContext) -> StepOutcome {
    ctx.sensor_flow.process_value = curve::flow(ctx.valve_flow.manual_output);
    ctx.sensor_concentration_a.process_value =
        curve::concentration_a(ctx.valve_concentration_a.manual_output);

    ctx.sensor_temperature.process_value = if ctx.valve_concentration_a.manual_output == 0.0 {
        0.0
    } else {
        curve::temperature(ctx.valve_temperature.manual_output)
    };

    let result = try_outlet_concentration(
        ctx.reactor.volume,
        ctx.sensor_temperature.process_value,
        &ctx.config,
        ctx.sensor_flow.process_value,
        ctx.sensor_concentration_a.process_value,
    )
    .and_then(|y| {
        if !y.is_finite() {
            Err(Invalidity::NonFiniteResult(y))
        } else if y < 0.0 {
            Err(Invalidity::NegativeResult(y))
        } else {
            Ok(y)
        }
    });

    match result {
        Ok(y) => {
            ctx.sensor_concentration_b.process_value = y;
            StepOutcome::Committed(y)
        }
        Err(reason) => StepOutcome::Held {
            reason,
            retained: ctx.sensor_concentration_b.process_value,
        },
    }
}
