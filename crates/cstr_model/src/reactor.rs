//! Steady-state outlet concentration of the reactor.
//!
//! The reactor runs two consecutive first-order reactions `A -> B -> C`
//! with Arrhenius rate constants. At steady state the concentration of the
//! intermediate product B leaving the tank is
//!
//! ```text
//! CB = 2 * Vr * k1 * Q * CA / ((Vr * k1 + Q) * (Vr * k2 + Q))
//! ```
//!
//! with `Vr` in m³, `Q` in m³/s and `k1`, `k2` in 1/s.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Offset between the Celsius and Kelvin scales.
pub const ZERO_CELSIUS_IN_KELVIN: f64 = 273.15;

/// Universal gas constant in J/(mol·K).
pub const GAS_CONSTANT: f64 = 8.314;

/// Kinetic parameters of the model.
///
/// Pre-exponential factors are given per minute, activation energies in
/// J/mol.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Gas constant.
    pub r: f64,
    pub k01: f64,
    pub k02: f64,
    pub ea1: f64,
    pub ea2: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            r: GAS_CONSTANT,
            k01: 0.0,
            k02: 0.0,
            ea1: 0.0,
            ea2: 0.0,
        }
    }
}

impl ModelConfig {
    /// Arrhenius rate constants `(k1, k2)` in 1/s at absolute temperature `t_k`.
    pub fn rate_constants(&self, t_k: f64) -> (f64, f64) {
        let k1 = (self.k01 / 60.0) * (-self.ea1 / (self.r * t_k)).exp();
        let k2 = (self.k02 / 60.0) * (-self.ea2 / (self.r * t_k)).exp();
        (k1, k2)
    }
}

/// Why a tick could not produce a usable outlet concentration.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum Invalidity {
    #[error("temperature {0} °C is not finite")]
    NonFiniteTemperature(f64),
    #[error("absolute temperature {0} K is not above zero")]
    NonPositiveAbsoluteTemperature(f64),
    #[error("no throughput (a = {a}, b = {b}); possibly all valves are closed")]
    ZeroThroughput { a: f64, b: f64 },
    #[error("outlet concentration {0} is not finite")]
    NonFiniteResult(f64),
    #[error("outlet concentration {0} is negative")]
    NegativeResult(f64),
}

/// Compute the outlet concentration, reporting why the guarded cases fail.
///
/// Only the temperature and zero-denominator guards are errors here. A
/// result that overflows or comes out negative is returned as is; deciding
/// whether to commit it is up to the caller.
pub fn try_outlet_concentration(
    reactor_volume: f64,
    temperature: f64,
    config: &ModelConfig,
    flow: f64,
    concentration_a: f64,
) -> Result<f64, Invalidity> {
    let t_k = temperature + ZERO_CELSIUS_IN_KELVIN;
    if !t_k.is_finite() {
        return Err(Invalidity::NonFiniteTemperature(temperature));
    }
    if t_k <= 0.0 {
        return Err(Invalidity::NonPositiveAbsoluteTemperature(t_k));
    }

    // L/min -> m³/s, L -> m³
    let q = flow * 1e-3 / 60.0;
    let vr = reactor_volume * 1e-3;
    let ca = concentration_a;

    let (k1, k2) = config.rate_constants(t_k);

    let a = vr * k1 + q;
    let b = vr * k2 + q;
    if a == 0.0 || b == 0.0 {
        return Err(Invalidity::ZeroThroughput { a, b });
    }

    let numerator = 2.0 * vr * k1 * q * ca;
    Ok(numerator / (a * b))
}

/// Compute the outlet concentration of B.
///
/// Returns NaN for a non-finite or non-positive absolute temperature and
/// when either denominator factor is exactly zero.
pub fn compute_outlet_concentration(
    reactor_volume: f64,
    temperature: f64,
    config: &ModelConfig,
    flow: f64,
    concentration_a: f64,
) -> f64 {
    try_outlet_concentration(reactor_volume, temperature, config, flow, concentration_a)
        .unwrap_or(f64::NAN)
}
