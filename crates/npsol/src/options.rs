//! Typed solver options.
//!
//! The routine reads its options as free-form text directives. [`Options`]
//! covers the common ones with validation and renders them into directives
//! for [`Job::apply_options`](crate::Job::apply_options). Anything not covered
//! here can still be passed verbatim with
//! [`Job::set_option`](crate::Job::set_option).

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when validating options.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum OptionsError {
    #[error("{name} must be finite and positive, got {value}")]
    NotPositive { name: &'static str, value: f64 },

    #[error("derivative level must be in 0..=3, got {0}")]
    DerivativeLevel(u8),

    #[error("verify level must be in -1..=3 or 10..=13, got {0}")]
    VerifyLevel(i8),
}

/// How the routine should treat the state, multipliers, and Hessian factor
/// passed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Start {
    /// Ignore them and start from scratch.
    Cold,

    /// Continue from them, typically the outputs of a previous solve.
    Warm,
}

/// Options forwarded to the routine before a solve.
///
/// Unset options keep the routine's defaults.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Options {
    start: Option<Start>,
    major_iteration_limit: Option<usize>,
    minor_iteration_limit: Option<usize>,
    optimality_tolerance: Option<f64>,
    feasibility_tolerance: Option<f64>,
    function_precision: Option<f64>,
    infinite_bound_size: Option<f64>,
    derivative_level: Option<u8>,
    verify_level: Option<i8>,
    print_level: Option<usize>,
    list: Option<bool>,
}

impl Options {
    /// Sets a cold or warm start.
    #[must_use]
    pub fn with_start(mut self, start: Start) -> Self {
        self.start = Some(start);
        self
    }

    #[must_use]
    pub fn with_major_iteration_limit(mut self, limit: usize) -> Self {
        self.major_iteration_limit = Some(limit);
        self
    }

    #[must_use]
    pub fn with_minor_iteration_limit(mut self, limit: usize) -> Self {
        self.minor_iteration_limit = Some(limit);
        self
    }

    /// Sets the final accuracy required of the objective.
    ///
    /// # Errors
    ///
    /// Returns an error if `tol` is not finite and positive.
    pub fn with_optimality_tolerance(mut self, tol: f64) -> Result<Self, OptionsError> {
        self.optimality_tolerance = Some(positive("optimality tolerance", tol)?);
        Ok(self)
    }

    /// Sets the maximum acceptable constraint violation.
    ///
    /// # Errors
    ///
    /// Returns an error if `tol` is not finite and positive.
    pub fn with_feasibility_tolerance(mut self, tol: f64) -> Result<Self, OptionsError> {
        self.feasibility_tolerance = Some(positive("feasibility tolerance", tol)?);
        Ok(self)
    }

    /// Sets the relative precision of the objective and constraint values.
    ///
    /// # Errors
    ///
    /// Returns an error if `precision` is not finite and positive.
    pub fn with_function_precision(mut self, precision: f64) -> Result<Self, OptionsError> {
        self.function_precision = Some(positive("function precision", precision)?);
        Ok(self)
    }

    /// Sets the magnitude at or beyond which a bound is treated as infinite.
    ///
    /// # Errors
    ///
    /// Returns an error if `size` is not finite and positive.
    pub fn with_infinite_bound_size(mut self, size: f64) -> Result<Self, OptionsError> {
        self.infinite_bound_size = Some(positive("infinite bound size", size)?);
        Ok(self)
    }

    /// Declares which derivatives the evaluator provides.
    ///
    /// `0` none, `1` objective gradient only, `2` constraint Jacobian only,
    /// `3` both.
    ///
    /// # Errors
    ///
    /// Returns an error if `level` is greater than 3.
    pub fn with_derivative_level(mut self, level: u8) -> Result<Self, OptionsError> {
        check_derivative_level(level)?;
        self.derivative_level = Some(level);
        Ok(self)
    }

    /// Sets how thoroughly the routine checks user derivatives.
    ///
    /// # Errors
    ///
    /// Returns an error if `level` is not in `-1..=3` or `10..=13`.
    pub fn with_verify_level(mut self, level: i8) -> Result<Self, OptionsError> {
        check_verify_level(level)?;
        self.verify_level = Some(level);
        Ok(self)
    }

    #[must_use]
    pub fn with_print_level(mut self, level: usize) -> Self {
        self.print_level = Some(level);
        self
    }

    /// Whether the routine echoes each option it reads.
    #[must_use]
    pub fn with_list(mut self, list: bool) -> Self {
        self.list = Some(list);
        self
    }

    /// Re-checks every field.
    ///
    /// Values built through the `with_*` methods are always valid; this
    /// matters for values that were deserialized.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field found.
    pub fn validate(&self) -> Result<(), OptionsError> {
        let tolerances = [
            ("optimality tolerance", self.optimality_tolerance),
            ("feasibility tolerance", self.feasibility_tolerance),
            ("function precision", self.function_precision),
            ("infinite bound size", self.infinite_bound_size),
        ];
        for (name, value) in tolerances {
            if let Some(value) = value {
                positive(name, value)?;
            }
        }
        if let Some(level) = self.derivative_level {
            check_derivative_level(level)?;
        }
        if let Some(level) = self.verify_level {
            check_verify_level(level)?;
        }
        Ok(())
    }

    /// Renders the set options as directives, in a fixed order.
    #[must_use]
    pub fn directives(&self) -> Vec<String> {
        let mut out = Vec::new();

        if let Some(list) = self.list {
            out.push(if list { "List" } else { "Nolist" }.to_owned());
        }
        if let Some(start) = self.start {
            out.push(
                match start {
                    Start::Cold => "Cold Start",
                    Start::Warm => "Warm Start",
                }
                .to_owned(),
            );
        }
        if let Some(level) = self.print_level {
            out.push(format!("Major Print Level {level}"));
        }
        if let Some(limit) = self.major_iteration_limit {
            out.push(format!("Major Iteration Limit {limit}"));
        }
        if let Some(limit) = self.minor_iteration_limit {
            out.push(format!("Minor Iteration Limit {limit}"));
        }
        if let Some(tol) = self.optimality_tolerance {
            out.push(format!("Optimality Tolerance {tol:e}"));
        }
        if let Some(tol) = self.feasibility_tolerance {
            out.push(format!("Feasibility Tolerance {tol:e}"));
        }
        if let Some(precision) = self.function_precision {
            out.push(format!("Function Precision {precision:e}"));
        }
        if let Some(size) = self.infinite_bound_size {
            out.push(format!("Infinite Bound Size {size:e}"));
        }
        if let Some(level) = self.derivative_level {
            out.push(format!("Derivative Level {level}"));
        }
        if let Some(level) = self.verify_level {
            out.push(format!("Verify Level {level}"));
        }

        out
    }
}

fn positive(name: &'static str, value: f64) -> Result<f64, OptionsError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(OptionsError::NotPositive { name, value })
    }
}

fn check_derivative_level(level: u8) -> Result<(), OptionsError> {
    if level <= 3 {
        Ok(())
    } else {
        Err(OptionsError::DerivativeLevel(level))
    }
}

fn check_verify_level(level: i8) -> Result<(), OptionsError> {
    if matches!(level, -1..=3 | 10..=13) {
        Ok(())
    } else {
        Err(OptionsError::VerifyLevel(level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_renders_nothing() {
        assert!(Options::default().directives().is_empty());
    }

    #[test]
    fn renders_in_fixed_order() {
        let options = Options::default()
            .with_major_iteration_limit(200)
            .with_optimality_tolerance(1e-8)
            .unwrap()
            .with_derivative_level(3)
            .unwrap()
            .with_start(Start::Warm)
            .with_list(false);

        assert_eq!(
            options.directives(),
            vec![
                "Nolist",
                "Warm Start",
                "Major Iteration Limit 200",
                "Optimality Tolerance 1e-8",
                "Derivative Level 3",
            ]
        );
    }

    #[test]
    fn rejects_bad_tolerances() {
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(Options::default().with_optimality_tolerance(bad).is_err());
            assert!(Options::default().with_feasibility_tolerance(bad).is_err());
        }
    }

    #[test]
    fn rejects_bad_levels() {
        assert_eq!(
            Options::default().with_derivative_level(4),
            Err(OptionsError::DerivativeLevel(4))
        );
        assert_eq!(
            Options::default().with_verify_level(5),
            Err(OptionsError::VerifyLevel(5))
        );
        assert!(Options::default().with_verify_level(-1).is_ok());
        assert!(Options::default().with_verify_level(12).is_ok());
    }

    #[test]
    fn validate_accepts_built_options() {
        let options = Options::default()
            .with_function_precision(1e-10)
            .unwrap()
            .with_verify_level(3)
            .unwrap();

        assert_eq!(options.validate(), Ok(()));
    }
}
