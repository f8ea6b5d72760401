//! A stateful adapter for the NPSOL nonlinear programming routine.
//!
//! NPSOL solves
//!
//! ```text
//! minimize F(x)  subject to  l <= ( x, A x, c(x) ) <= u
//! ```
//!
//! through a Fortran interface: positional, call-by-reference arguments,
//! column-major matrices, caller-allocated workspace, and two plain function
//! pointers for evaluation. This crate hides that behind:
//!
//! - [`Dimensions`]: validated problem sizes and the workspace lengths
//!   derived from them
//! - [`Job`]: owns every buffer, converts layouts around each solve, and
//!   exposes inputs and outputs row-oriented
//! - [`Evaluator`]: the objective and constraint callbacks a problem
//!   implements
//! - [`Routine`]: the solver seam; [`Npsol`] (feature `link`) is the real
//!   library
//! - [`Options`]: typed option directives
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(feature = "link")]
//! # fn main() -> Result<(), jetfit_npsol::Error> {
//! use jetfit_npsol::{
//!     ConstraintRequest, Dimensions, Evaluator, Integer, Job, Npsol, ObjectiveRequest,
//! };
//!
//! /// `(x0 - 1)² + (x1 - 2)²`, unconstrained.
//! struct Quadratic;
//!
//! impl Evaluator for Quadratic {
//!     fn objective(&mut self, request: ObjectiveRequest<'_>) -> Integer {
//!         let x = request.x;
//!         *request.objf = (x[0] - 1.0).powi(2) + (x[1] - 2.0).powi(2);
//!         request.gradient[0] = 2.0 * (x[0] - 1.0);
//!         request.gradient[1] = 2.0 * (x[1] - 2.0);
//!         0
//!     }
//!
//!     fn constraints(&mut self, _request: ConstraintRequest<'_>) -> Integer {
//!         0
//!     }
//! }
//!
//! let dims = Dimensions::new(2, 0, 0)?;
//! let mut job = Job::new(dims, Quadratic, Npsol);
//! job.set_option("Nolist");
//! let inform = job.solve(&[0.0, 0.0])?;
//! assert!(inform.is_optimal());
//! println!("x = {:?}, f = {}", job.x(), job.objective());
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "link"))]
//! # fn main() {}
//! ```
//!
//! Only one job may be solving in the process at a time; see [`Job`].

mod dimensions;
mod error;
mod evaluator;
mod inform;
mod job;
mod options;
mod routine;
mod trampoline;

pub mod ffi;
pub mod layout;

pub use dimensions::{DimensionError, Dimensions};
pub use error::Error;
pub use evaluator::{ConstraintRequest, Evaluator, ObjectiveRequest};
pub use ffi::Integer;
pub use inform::{Inform, Outcome};
pub use job::{INFINITE_BOUND, Job};
pub use options::{Options, OptionsError, Start};
#[cfg(feature = "link")]
pub use routine::Npsol;
pub use routine::{Arguments, Routine};
pub use trampoline::is_active as solve_in_progress;
