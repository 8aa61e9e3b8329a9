//! Piecewise valve response curves.
//!
//! Every curve has the same shape over the opening `u` (percent):
//!
//! ```text
//!            u <= 0           -> min
//!       0 <  u <= breakpoint  -> min + quadratic * (u / breakpoint)^2
//! breakpoint < u <  full_open -> min + quadratic + linear * (u - breakpoint) / (full_open - breakpoint)
//!            u >= full_open   -> max
//! ```
//!
//! Both ramps meet at the breakpoint, so the curve is continuous there but
//! has a kink. Openings outside `[0, full_open]` saturate instead of being
//! rejected.

use serde::{Deserialize, Serialize};

/// One row of the valve curve table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValveCurve {
    /// Output for a closed (or below-zero) opening.
    pub min: f64,
    /// Output for a fully open (or above-full) opening.
    pub max: f64,
    /// Rise of the quadratic segment between 0 and the breakpoint.
    pub quadratic: f64,
    /// Rise of the linear segment between the breakpoint and full opening.
    pub linear: f64,
    /// Opening at which the quadratic segment hands over to the linear one.
    pub breakpoint: f64,
    /// Opening treated as fully open.
    pub full_open: f64,
}

impl ValveCurve {
    /// Volumetric flow in L/min produced by the feed valve.
    pub const FLOW: ValveCurve = ValveCurve::new(0.0, 160.0, 144.0, 16.0);

    /// Inlet concentration of substance A in mol/L produced by the dosing valve.
    pub const CONCENTRATION_A: ValveCurve = ValveCurve::new(0.0, 0.9, 0.7, 0.2);

    /// Reactor temperature in °C produced by the heating valve.
    pub const TEMPERATURE: ValveCurve = ValveCurve::new(-8.0, 16.0, 20.0, 4.0);

    /// A curve with the standard 70 % breakpoint and 100 % full opening.
    pub const fn new(min: f64, max: f64, quadratic: f64, linear: f64) -> Self {
        Self {
            min,
            max,
            quadratic,
            linear,
            breakpoint: 70.0,
            full_open: 100.0,
        }
    }

    /// Output at the breakpoint, where both ramps agree.
    pub fn at_breakpoint(&self) -> f64 {
        self.min + self.quadratic
    }

    /// Evaluate the curve for an opening `u`.
    pub fn evaluate(&self, u: f64) -> f64 {
        if u <= 0.0 {
            return self.min;
        }
        if u >= self.full_open {
            return self.max;
        }

        if u <= self.breakpoint {
            let x = u / self.breakpoint;
            self.min + self.quadratic * x * x
        } else {
            let x = (u - self.breakpoint) / (self.full_open - self.breakpoint);
            self.at_breakpoint() + self.linear * x
        }
    }
}

/// Flow sensor reading for a feed valve opening.
pub fn flow(u: f64) -> f64 {
    ValveCurve::FLOW.evaluate(u)
}

/// Concentration-A sensor reading for a dosing valve opening.
pub fn concentration_a(u: f64) -> f64 {
    ValveCurve::CONCENTRATION_A.evaluate(u)
}

/// Temperature sensor reading for a heating valve opening.
pub fn temperature(u: f64) -> f64 {
    ValveCurve::TEMPERATURE.evaluate(u)
}
