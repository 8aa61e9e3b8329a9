//! # cstr_model
//!
//! Process model of a continuously stirred tank reactor (CSTR) driven by
//! three manually operated valves.
//!
//! This crate provides:
//!
//! - [`curve`]: piecewise valve response curves mapping a valve opening
//!   (0–100 %) to a flow, an inlet concentration or a temperature offset.
//! - [`reactor`]: the steady-state outlet concentration of the reactor
//!   (Arrhenius kinetics, two consecutive first-order reactions).
//! - [`plant`]: the plant entities and the [`ModelContext`] aggregating them.
//! - [`simulation`]: one periodic tick deriving sensor readings from the
//!   valve settings, with a hold-last-good-value policy on the output.
//!
//! Everything here is pure computation over caller-owned state. Nothing
//! blocks, allocates per tick or spawns threads.

pub mod curve;
pub mod plant;
pub mod reactor;
pub mod simulation;

pub use curve::ValveCurve;
pub use plant::{ModelContext, Reactor, Sensor, ValveHandleControl};
pub use reactor::{Invalidity, ModelConfig, compute_outlet_concentration, try_outlet_concentration};
pub use simulation::{StepOutcome, step};
