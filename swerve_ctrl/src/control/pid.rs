//! Generic PID controller

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
use util::maths::{clamp, epsilon_equals};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Proportional, integral and derivative gains for a PID controller.
#[derive(Debug, Copy, Clone, Deserialize)]
pub struct PidConstants {
    pub p: f64,
    pub i: f64,
    pub d: f64,
}

/// A scalar PID feedback controller.
///
/// One controller is constructed per control axis and lives for the life of
/// that axis; call [`PidController::reset`] between trajectory follows so
/// stale integral and derivative state doesn't leak into the next follow.
///
/// Continuous mode wraps the error into `[-input_range/2, input_range/2]`,
/// which is required for angle setpoints that must take the shorter
/// rotational path.
#[derive(Debug)]
pub struct PidController {
    constants: PidConstants,

    setpoint: f64,

    continuous: bool,
    input_range: f64,

    min_output: f64,
    max_output: f64,

    /// Error from the previous call, `None` until `calculate` runs.
    last_error: Option<f64>,

    integral_accum: f64,

    /// Integral only accumulates while `|error| < integral_range / 2`.
    integral_range: f64,

    clear_integral_on_error_sign_change: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors raised when configuring a PID controller.
#[derive(Debug, thiserror::Error)]
pub enum PidError {
    #[error("Minimum output {min} cannot be greater than maximum output {max}")]
    InvalidOutputRange { min: f64, max: f64 },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PidConstants {
    pub fn new(p: f64, i: f64, d: f64) -> Self {
        Self { p, i, d }
    }
}

impl PidController {
    pub fn new(constants: PidConstants) -> Self {
        Self {
            constants,
            setpoint: 0.0,
            continuous: false,
            input_range: f64::INFINITY,
            min_output: f64::NEG_INFINITY,
            max_output: f64::INFINITY,
            last_error: None,
            integral_accum: 0.0,
            integral_range: f64::INFINITY,
            clear_integral_on_error_sign_change: false,
        }
    }

    /// Run one step of the controller.
    pub fn calculate(&mut self, current: f64, dt: f64) -> f64 {
        let mut error = self.setpoint - current;
        if self.continuous {
            // Wrap the error so the controller takes the short way around
            error %= self.input_range;
            if error.abs() > self.input_range / 2.0 {
                if error > 0.0 {
                    error -= self.input_range;
                } else {
                    error += self.input_range;
                }
            }
        }

        // Optionally drop the accumulated integral when the error crosses
        // zero so windup doesn't carry across a setpoint crossing
        if self.clear_integral_on_error_sign_change
            && !epsilon_equals(error, error.copysign(self.integral_accum))
            && !epsilon_equals(self.integral_accum, 0.0)
        {
            self.integral_accum = 0.0;
        }

        // Anti-windup gate: only accumulate while the error is small enough
        let mut integral = 0.0;
        if error.abs() < self.integral_range / 2.0 {
            integral = self.integral_accum + error * dt;
        }
        self.integral_accum = integral;

        // No derivative on the very first call, there is no previous error
        let derivative = match self.last_error {
            Some(last_error) => (error - last_error) / dt,
            None => 0.0,
        };
        self.last_error = Some(error);

        clamp(
            &(self.constants.p * error + self.constants.i * integral + self.constants.d * derivative),
            &self.min_output,
            &self.max_output,
        )
    }

    /// Clear the integral and derivative state.
    pub fn reset(&mut self) {
        self.last_error = None;
        self.integral_accum = 0.0;
    }

    pub fn setpoint(&self) -> f64 {
        self.setpoint
    }

    pub fn set_setpoint(&mut self, setpoint: f64) {
        self.setpoint = setpoint;
    }

    /// Enable or disable continuous (wrap-around) input handling.
    pub fn set_continuous(&mut self, continuous: bool) {
        self.continuous = continuous;
    }

    /// Set the range the input wraps over in continuous mode.
    pub fn set_input_range(&mut self, min_input: f64, max_input: f64) {
        self.input_range = max_input - min_input;
    }

    /// Set the error range inside which the integral accumulates.
    pub fn set_integral_range(&mut self, integral_range: f64) {
        self.integral_range = integral_range;
    }

    pub fn set_clear_integral_on_error_sign_change(&mut self, clear: bool) {
        self.clear_integral_on_error_sign_change = clear;
    }

    /// Set the range outputs are clamped into.
    pub fn set_output_range(&mut self, min: f64, max: f64) -> Result<(), PidError> {
        if max < min {
            return Err(PidError::InvalidOutputRange { min, max });
        }

        self.min_output = min;
        self.max_output = max;

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
