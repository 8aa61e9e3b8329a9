//! Plant entities.
//!
//! The process root owns one [`ModelContext`] for the life of the process.
//! Remote writes and the periodic tick mutate its fields in place; each
//! entity remembers the object node it was published under.

use cstr_schema::NodeId;
use serde::{Deserialize, Serialize};

use crate::reactor::ModelConfig;

/// Default reactor volume in liters.
pub const DEFAULT_REACTOR_VOLUME: f64 = 100.0;

/// A measuring point. Only the simulation writes its process value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sensor {
    pub process_value: f64,
    pub object: NodeId,
}

impl Default for Sensor {
    fn default() -> Self {
        Self {
            process_value: 0.0,
            object: NodeId::NULL,
        }
    }
}

/// The stirred tank.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reactor {
    /// Volume in liters. The model assumes it is positive.
    pub volume: f64,
    pub object: NodeId,
}

impl Default for Reactor {
    fn default() -> Self {
        Self {
            volume: DEFAULT_REACTOR_VOLUME,
            object: NodeId::NULL,
        }
    }
}

/// A manually operated valve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValveHandleControl {
    /// Operator-set opening, intended 0–100 %.
    pub manual_output: f64,
    pub object: NodeId,
}

impl Default for ValveHandleControl {
    fn default() -> Self {
        Self {
            manual_output: 0.0,
            object: NodeId::NULL,
        }
    }
}

/// Everything one simulation tick reads and writes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelContext {
    pub reactor: Reactor,

    /// Feed valve, drives the flow sensor.
    pub valve_flow: ValveHandleControl,
    /// Heating valve, drives the temperature sensor.
    pub valve_temperature: ValveHandleControl,
    /// Dosing valve, drives the concentration-A sensor.
    pub valve_concentration_a: ValveHandleControl,

    pub sensor_flow: Sensor,
    pub sensor_temperature: Sensor,
    pub sensor_concentration_a: Sensor,
    /// Outlet concentration of B, the model output.
    pub sensor_concentration_b: Sensor,

    pub config: ModelConfig,
    /// Tag identifying the processed substance. Not used by the model.
    pub substance_id: u32,
}

impl ModelContext {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startup_defaults() {
        let ctx = ModelContext::new();
        assert_eq!(ctx.reactor.volume, 100.0);
        assert_eq!(ctx.config.r, 8.314);
        assert_eq!(ctx.config.k01, 0.0);
        assert_eq!(ctx.substance_id, 0);
        assert_eq!(ctx.valve_flow.manual_output, 0.0);
        assert_eq!(ctx.sensor_concentration_b.process_value, 0.0);
        assert!(ctx.reactor.object.is_null());
    }
}
