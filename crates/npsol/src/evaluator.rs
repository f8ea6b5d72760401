//! The capability interface a problem implements to be solved by a [`Job`].
//!
//! The routine asks for function values and derivatives through two
//! callbacks. Each one arrives here as a request carrying the point, the
//! output buffers, and a `mode` that says what is wanted. An evaluator fills
//! the outputs and returns a status; `0` means success, and any other value
//! is passed back to the routine unchanged.
//!
//! To abandon the solve from inside a callback, set a negative mode with
//! [`ObjectiveRequest::request_stop`] or [`ConstraintRequest::request_stop`].
//! The routine then returns with `inform` equal to that value.
//!
//! [`Job`]: crate::Job

use ndarray::ArrayViewMut2;

use crate::ffi::Integer;

/// Objective and constraint evaluation for one problem type.
///
/// Both methods are required. A problem without nonlinear constraints still
/// implements [`constraints`](Evaluator::constraints); the routine does not
/// call it when `ncnln` is zero.
pub trait Evaluator {
    /// Computes the objective and/or its gradient at `request.x`.
    fn objective(&mut self, request: ObjectiveRequest<'_>) -> Integer;

    /// Computes nonlinear constraint values and/or their Jacobian at
    /// `request.x`.
    ///
    /// The Jacobian is row-oriented: `jacobian[[i, j]]` is the derivative of
    /// constraint `i` with respect to variable `j`.
    fn constraints(&mut self, request: ConstraintRequest<'_>) -> Integer;
}

impl<E: Evaluator + ?Sized> Evaluator for &mut E {
    fn objective(&mut self, request: ObjectiveRequest<'_>) -> Integer {
        (**self).objective(request)
    }

    fn constraints(&mut self, request: ConstraintRequest<'_>) -> Integer {
        (**self).constraints(request)
    }
}

impl<E: Evaluator + ?Sized> Evaluator for Box<E> {
    fn objective(&mut self, request: ObjectiveRequest<'_>) -> Integer {
        (**self).objective(request)
    }

    fn constraints(&mut self, request: ConstraintRequest<'_>) -> Integer {
        (**self).constraints(request)
    }
}

/// A request to evaluate the objective.
#[derive(Debug)]
pub struct ObjectiveRequest<'a> {
    mode: &'a mut Integer,
    nstate: Integer,

    /// The point to evaluate.
    pub x: &'a [f64],

    /// Objective value output.
    pub objf: &'a mut f64,

    /// Objective gradient output, one entry per variable.
    pub gradient: &'a mut [f64],
}

impl<'a> ObjectiveRequest<'a> {
    pub(crate) fn new(
        mode: &'a mut Integer,
        nstate: Integer,
        x: &'a [f64],
        objf: &'a mut f64,
        gradient: &'a mut [f64],
    ) -> Self {
        Self {
            mode,
            nstate,
            x,
            objf,
            gradient,
        }
    }

    /// The raw mode passed by the routine.
    #[must_use]
    pub fn mode(&self) -> Integer {
        *self.mode
    }

    /// Whether the objective value is wanted.
    #[must_use]
    pub fn wants_value(&self) -> bool {
        matches!(*self.mode, 0 | 2)
    }

    /// Whether the gradient is wanted.
    #[must_use]
    pub fn wants_gradient(&self) -> bool {
        matches!(*self.mode, 1 | 2)
    }

    /// Whether this is the routine's first call for the current solve.
    #[must_use]
    pub fn is_first_call(&self) -> bool {
        self.nstate == 1
    }

    /// Asks the routine to stop; `code` must be negative.
    pub fn request_stop(&mut self, code: Integer) {
        debug_assert!(code < 0, "stop codes are negative");
        *self.mode = code;
    }
}

/// A request to evaluate the nonlinear constraints.
#[derive(Debug)]
pub struct ConstraintRequest<'a> {
    mode: &'a mut Integer,
    nstate: Integer,

    /// Per-constraint flags; a positive entry means constraint `i` is needed.
    pub needc: &'a [Integer],

    /// The point to evaluate.
    pub x: &'a [f64],

    /// Constraint value output, one entry per nonlinear constraint.
    pub values: &'a mut [f64],

    /// Row-oriented Jacobian output, `ncnln × n`.
    ///
    /// On entry it holds the routine's current Jacobian, so entries the
    /// evaluator leaves alone keep their previous (or template) values.
    pub jacobian: ArrayViewMut2<'a, f64>,
}

impl<'a> ConstraintRequest<'a> {
    pub(crate) fn new(
        mode: &'a mut Integer,
        nstate: Integer,
        needc: &'a [Integer],
        x: &'a [f64],
        values: &'a mut [f64],
        jacobian: ArrayViewMut2<'a, f64>,
    ) -> Self {
        Self {
            mode,
            nstate,
            needc,
            x,
            values,
            jacobian,
        }
    }

    /// The raw mode passed by the routine.
    #[must_use]
    pub fn mode(&self) -> Integer {
        *self.mode
    }

    /// Whether constraint values are wanted.
    #[must_use]
    pub fn wants_values(&self) -> bool {
        matches!(*self.mode, 0 | 2)
    }

    /// Whether the Jacobian is wanted.
    #[must_use]
    pub fn wants_jacobian(&self) -> bool {
        matches!(*self.mode, 1 | 2)
    }

    /// Whether constraint `i` is needed at this call.
    #[must_use]
    pub fn needs(&self, i: usize) -> bool {
        self.needc.get(i).is_some_and(|&flag| flag > 0)
    }

    /// Whether this is the routine's first call for the current solve.
    #[must_use]
    pub fn is_first_call(&self) -> bool {
        self.nstate == 1
    }

    /// Asks the routine to stop; `code` must be negative.
    pub fn request_stop(&mut self, code: Integer) {
        debug_assert!(code < 0, "stop codes are negative");
        *self.mode = code;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ndarray::Array2;

    #[test]
    fn objective_mode_flags() {
        let x = [1.0];
        let mut objf = 0.0;
        let mut grad = [0.0];

        for (mode, value, gradient) in [(0, true, false), (1, false, true), (2, true, true)] {
            let mut m = mode;
            let request = ObjectiveRequest::new(&mut m, 0, &x, &mut objf, &mut grad);
            assert_eq!(request.wants_value(), value, "mode {mode}");
            assert_eq!(request.wants_gradient(), gradient, "mode {mode}");
            assert!(!request.is_first_call());
        }
    }

    #[test]
    fn request_stop_writes_mode() {
        let x = [1.0];
        let mut objf = 0.0;
        let mut grad = [0.0];
        let mut mode = 2;

        let mut request = ObjectiveRequest::new(&mut mode, 1, &x, &mut objf, &mut grad);
        assert!(request.is_first_call());
        request.request_stop(-3);

        assert_eq!(mode, -3);
    }

    #[test]
    fn constraint_needs_reads_flags() {
        let x = [0.0, 0.0];
        let needc = [1, 0];
        let mut values = [0.0, 0.0];
        let mut jac = Array2::zeros((2, 2));
        let mut mode = 0;

        let request = ConstraintRequest::new(
            &mut mode,
            0,
            &needc,
            &x,
            &mut values,
            jac.view_mut(),
        );

        assert!(request.wants_values());
        assert!(!request.wants_jacobian());
        assert!(request.needs(0));
        assert!(!request.needs(1));
        assert!(!request.needs(2));
    }
}
