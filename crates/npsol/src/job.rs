//! The problem and workspace manager.
//!
//! A [`Job`] owns every buffer the routine reads or writes, sized once from
//! [`Dimensions`]. Callers fill the row-oriented inputs with setters, call
//! [`Job::solve`], and read the outputs back with getters.
//!
//! # Solve sequence
//!
//! 1. The starting point is copied into the `x` input.
//! 2. The linear constraint matrix, Jacobian template, and Hessian factor are
//!    converted to column-major working copies; multipliers and `x` are
//!    copied to theirs.
//! 3. The evaluator is published for the trampolines.
//! 4. The routine runs, calling back into the evaluator.
//! 5. `x`, the Jacobian, the Hessian factor, and the multipliers are
//!    converted back into output copies; the objective, gradient, iteration
//!    count, and status are stored as reported.
//!
//! Inputs are left as they were, so a second solve starts from the same
//! template unless the caller overwrites it or calls [`Job::carry_over`].
//!
//! # Single flight
//!
//! The routine's callbacks carry no context and its state lives in
//! process-wide globals, so only one job may be solving in the whole process
//! at a time. Calling [`Job::solve`] while another solve is in flight, from
//! inside an evaluator or from another thread, returns
//! [`Error::SolveInProgress`] immediately.

mod staged;


use ndarray::{Array2, ArrayView2, s};
use tracing::{debug, info};

use crate::dimensions::Dimensions;
use crate::error::Error;
use crate::evaluator::Evaluator;
use crate::ffi::Integer;
use crate::inform::Inform;
use crate::layout::ColumnMajor;
use crate::options::Options;
use crate::routine::{Arguments, Routine};
use crate::trampoline::{self, Registration, Slot};

use staged::{StagedMatrix, StagedVector};

/// Magnitude of the default bounds; the routine treats it as infinite.
pub const INFINITE_BOUND: f64 = 1.0e10;

/// A nonlinear program and everything needed to hand it to a [`Routine`].
#[derive(Debug)]
pub struct Job<E, R> {
    dims: Dimensions,
    evaluator: E,
    routine: R,

    lower: Vec<f64>,
    upper: Vec<f64>,
    linear: Array2<f64>,
    linear_foreign: ColumnMajor,
    state: Vec<Integer>,
    constraint_values: Vec<f64>,
    jacobian: StagedMatrix,
    multipliers: StagedVector,
    hessian: StagedMatrix,
    x: StagedVector,
    objective: f64,
    gradient: Vec<f64>,
    iw: Vec<Integer>,
    w: Vec<f64>,
    inform: Option<Inform>,
    iterations: Integer,
}

impl<E: Evaluator, R: Routine> Job<E, R> {
    /// Allocates every buffer for a problem of the given dimensions.
    ///
    /// Bounds start at `±INFINITE_BOUND`; everything else starts at zero.
    pub fn new(dims: Dimensions, evaluator: E, routine: R) -> Self {
        let n = dims.n();
        let total = dims.total();

        Self {
            dims,
            evaluator,
            routine,
            lower: vec![-INFINITE_BOUND; total],
            upper: vec![INFINITE_BOUND; total],
            linear: Array2::zeros((dims.lda(), n)),
            linear_foreign: ColumnMajor::zeros(dims.lda(), n),
            state: vec![0; total],
            constraint_values: vec![0.0; dims.ldj()],
            jacobian: StagedMatrix::zeros(dims.ldj(), n),
            multipliers: StagedVector::zeros(total),
            hessian: StagedMatrix::zeros(dims.ldr(), n),
            x: StagedVector::zeros(n),
            objective: 0.0,
            gradient: vec![0.0; n],
            iw: vec![0; dims.leniw()],
            w: vec![0.0; dims.lenw()],
            inform: None,
            iterations: 0,
        }
    }

    /// Forwards one option directive to the routine, verbatim.
    pub fn set_option(&mut self, directive: &str) {
        debug!(directive, "forwarding option");
        self.routine.set_option(directive);
    }

    /// Forwards every directive rendered from `options`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Options`] if `options` fails validation; nothing is
    /// forwarded in that case.
    pub fn apply_options(&mut self, options: &Options) -> Result<(), Error> {
        options.validate()?;
        for directive in options.directives() {
            self.set_option(&directive);
        }
        Ok(())
    }

    /// Replaces both bound vectors.
    ///
    /// Entries `0..n` bound the variables, then `nclin` linear constraints,
    /// then `ncnln` nonlinear constraints.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LengthMismatch`] unless both slices have `total`
    /// entries. Neither vector changes on error.
    pub fn set_bounds(&mut self, lower: &[f64], upper: &[f64]) -> Result<(), Error> {
        Error::check_len("lower", self.dims.total(), lower.len())?;
        Error::check_len("upper", self.dims.total(), upper.len())?;
        self.lower.copy_from_slice(lower);
        self.upper.copy_from_slice(upper);
        Ok(())
    }

    /// Replaces the lower bound vector.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LengthMismatch`] unless `lower` has `total` entries.
    pub fn set_lower_bounds(&mut self, lower: &[f64]) -> Result<(), Error> {
        Error::check_len("lower", self.dims.total(), lower.len())?;
        self.lower.copy_from_slice(lower);
        Ok(())
    }

    /// Replaces the upper bound vector.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LengthMismatch`] unless `upper` has `total` entries.
    pub fn set_upper_bounds(&mut self, upper: &[f64]) -> Result<(), Error> {
        Error::check_len("upper", self.dims.total(), upper.len())?;
        self.upper.copy_from_slice(upper);
        Ok(())
    }

    /// Sets the bounds of a single variable or constraint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BoundIndex`] if `index` is not below `total`.
    pub fn set_bound(&mut self, index: usize, lower: f64, upper: f64) -> Result<(), Error> {
        let len = self.dims.total();
        if index >= len {
            return Err(Error::BoundIndex { index, len });
        }
        self.lower[index] = lower;
        self.upper[index] = upper;
        Ok(())
    }

    /// Replaces the `nclin × n` linear constraint matrix.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShapeMismatch`] if `a` is not `nclin × n`.
    pub fn set_linear_matrix(&mut self, a: ArrayView2<'_, f64>) -> Result<(), Error> {
        let rows = self.dims.nclin();
        Error::check_shape("linear matrix", (rows, self.dims.n()), a.dim())?;
        self.linear.slice_mut(s![..rows, ..]).assign(&a);
        Ok(())
    }

    /// Replaces the `ncnln × n` Jacobian passed in to the routine.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShapeMismatch`] if `jacobian` is not `ncnln × n`.
    pub fn set_jacobian_template(&mut self, jacobian: ArrayView2<'_, f64>) -> Result<(), Error> {
        let rows = self.dims.ncnln();
        Error::check_shape("jacobian template", (rows, self.dims.n()), jacobian.dim())?;
        self.jacobian
            .input
            .slice_mut(s![..rows, ..])
            .assign(&jacobian);
        Ok(())
    }

    /// Replaces the multiplier estimates passed in to the routine.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LengthMismatch`] unless `clamda` has `total` entries.
    pub fn set_multipliers(&mut self, clamda: &[f64]) -> Result<(), Error> {
        Error::check_len("multipliers", self.dims.total(), clamda.len())?;
        self.multipliers.input.copy_from_slice(clamda);
        Ok(())
    }

    /// Replaces the `n × n` Hessian factor passed in to the routine.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShapeMismatch`] if `r` is not `n × n`.
    pub fn set_hessian_approx(&mut self, r: ArrayView2<'_, f64>) -> Result<(), Error> {
        let n = self.dims.n();
        Error::check_shape("hessian", (n, n), r.dim())?;
        self.hessian.input.assign(&r);
        Ok(())
    }

    /// Replaces the constraint state vector.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LengthMismatch`] unless `istate` has `total` entries.
    pub fn set_state(&mut self, istate: &[Integer]) -> Result<(), Error> {
        Error::check_len("state", self.dims.total(), istate.len())?;
        self.state.copy_from_slice(istate);
        Ok(())
    }

    /// Copies the warm-start outputs of the last solve (multipliers,
    /// Jacobian, Hessian factor) into the inputs for the next one.
    ///
    /// The state vector is shared between input and output and needs no
    /// copy. Pair with [`Start::Warm`](crate::Start::Warm) and pass
    /// [`Job::x`] as the next starting point.
    pub fn carry_over(&mut self) {
        self.multipliers.carry_over();
        self.jacobian.carry_over();
        self.hessian.carry_over();
    }

    /// Runs the routine from the starting point `x0`.
    ///
    /// Returns the routine's status exactly as reported; a solve that ran is
    /// `Ok` whatever the status says.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LengthMismatch`] if `x0` does not have `n` entries,
    /// or [`Error::SolveInProgress`] if another solve is in flight on this
    /// or any other thread. No buffer changes in either case.
    ///
    /// # Panics
    ///
    /// If the evaluator panics, the routine is asked to stop, the outputs are
    /// stored, and the panic then resumes from here.
    pub fn solve(&mut self, x0: &[f64]) -> Result<Inform, Error> {
        let dims = self.dims;
        Error::check_len("x0", dims.n(), x0.len())?;

        let mut slot = Slot::new(&mut self.evaluator, dims.ncnln(), dims.n());
        let registration = Registration::install(&mut slot)?;

        self.x.input.copy_from_slice(x0);
        self.linear_foreign.load(self.linear.view());
        self.jacobian.stage();
        self.multipliers.stage();
        self.hessian.stage();
        self.x.stage();

        debug!(
            n = dims.n(),
            nclin = dims.nclin(),
            ncnln = dims.ncnln(),
            lda = dims.lda(),
            ldj = dims.ldj(),
            ldr = dims.ldr(),
            leniw = dims.leniw(),
            lenw = dims.lenw(),
            "calling routine"
        );

        let mut inform: Integer = 0;
        let mut iterations: Integer = 0;
        self.routine.solve(Arguments {
            n: to_integer(dims.n()),
            nclin: to_integer(dims.nclin()),
            ncnln: to_integer(dims.ncnln()),
            lda: to_integer(dims.lda()),
            ldj: to_integer(dims.ldj()),
            ldr: to_integer(dims.ldr()),
            a: self.linear_foreign.as_mut_slice(),
            bl: &mut self.lower,
            bu: &mut self.upper,
            confun: trampoline::confun,
            objfun: trampoline::objfun,
            inform: &mut inform,
            iter: &mut iterations,
            istate: &mut self.state,
            c: &mut self.constraint_values,
            cjac: self.jacobian.foreign.as_mut_slice(),
            clamda: &mut self.multipliers.foreign,
            objf: &mut self.objective,
            grad: &mut self.gradient,
            r: self.hessian.foreign.as_mut_slice(),
            x: &mut self.x.foreign,
            iw: &mut self.iw,
            w: &mut self.w,
        });

        drop(registration);
        let panic = slot.take_panic();

        self.x.unstage();
        self.hessian.unstage();
        self.multipliers.unstage();
        self.jacobian.unstage();

        let inform = Inform::new(inform);
        self.inform = Some(inform);
        self.iterations = iterations;

        info!(
            inform = inform.code(),
            iterations,
            objective = self.objective,
            "routine returned"
        );

        if let Some(payload) = panic {
            std::panic::resume_unwind(payload);
        }

        Ok(inform)
    }
}

impl<E, R> Job<E, R> {
    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        self.dims
    }

    #[must_use]
    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    pub fn evaluator_mut(&mut self) -> &mut E {
        &mut self.evaluator
    }

    #[must_use]
    pub fn routine(&self) -> &R {
        &self.routine
    }

    pub fn routine_mut(&mut self) -> &mut R {
        &mut self.routine
    }

    /// Lower and upper bounds, each of length `total`.
    #[must_use]
    pub fn bounds(&self) -> (&[f64], &[f64]) {
        (&self.lower, &self.upper)
    }

    /// The `nclin × n` linear constraint matrix.
    #[must_use]
    pub fn linear_matrix(&self) -> ArrayView2<'_, f64> {
        self.linear.slice(s![..self.dims.nclin(), ..])
    }

    /// The `ncnln × n` Jacobian passed in to the next solve.
    #[must_use]
    pub fn jacobian_template(&self) -> ArrayView2<'_, f64> {
        self.jacobian.input.slice(s![..self.dims.ncnln(), ..])
    }

    /// Multiplier estimates passed in to the next solve.
    #[must_use]
    pub fn multipliers_input(&self) -> &[f64] {
        &self.multipliers.input
    }

    /// Hessian factor passed in to the next solve.
    #[must_use]
    pub fn hessian_input(&self) -> ArrayView2<'_, f64> {
        self.hessian.input.view()
    }

    /// Constraint states; set before a warm start, updated by every solve.
    #[must_use]
    pub fn state(&self) -> &[Integer] {
        &self.state
    }

    /// Nonlinear constraint values at the solution.
    #[must_use]
    pub fn constraint_values(&self) -> &[f64] {
        &self.constraint_values[..self.dims.ncnln()]
    }

    /// The `ncnln × n` Jacobian at the solution.
    #[must_use]
    pub fn jacobian(&self) -> ArrayView2<'_, f64> {
        self.jacobian.output.slice(s![..self.dims.ncnln(), ..])
    }

    /// Multipliers at the solution: bounds, then linear, then nonlinear.
    #[must_use]
    pub fn multipliers(&self) -> &[f64] {
        &self.multipliers.output
    }

    #[must_use]
    pub fn objective(&self) -> f64 {
        self.objective
    }

    #[must_use]
    pub fn gradient(&self) -> &[f64] {
        &self.gradient
    }

    /// The `n × n` Hessian factor at the solution.
    #[must_use]
    pub fn hessian(&self) -> ArrayView2<'_, f64> {
        self.hessian.output.view()
    }

    /// The solution reported by the last solve.
    #[must_use]
    pub fn x(&self) -> &[f64] {
        &self.x.output
    }

    /// Major iterations performed by the last solve.
    #[must_use]
    pub fn iterations(&self) -> Integer {
        self.iterations
    }

    /// Status of the last solve, or `None` before the first one.
    #[must_use]
    pub fn inform(&self) -> Option<Inform> {
        self.inform
    }

    /// Lengths of the integer and real workspaces.
    #[must_use]
    pub fn workspace_len(&self) -> (usize, usize) {
        (self.iw.len(), self.w.len())
    }
}

/// `Dimensions` guarantees every size fits.
fn to_integer(value: usize) -> Integer {
    Integer::try_from(value).unwrap_or(Integer::MAX)
}
