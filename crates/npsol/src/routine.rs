//! The seam between a [`Job`](crate::Job) and the routine it drives.
//!
//! [`Routine`] is what a job calls: one entry point for option directives and
//! one for the solve itself. [`Npsol`] (behind the `link` feature) forwards
//! both to the Fortran library. Other implementations can stand in for it,
//! provided they honour the same argument and callback contract.

use crate::ffi::{ConfunFn, Integer, ObjfunFn};

/// Every argument of one solve call, in the routine's positional order.
///
/// Matrices are flat column-major buffers with the given leading dimensions.
/// Workspace lengths are the slice lengths.
#[derive(Debug)]
pub struct Arguments<'a> {
    pub n: Integer,
    pub nclin: Integer,
    pub ncnln: Integer,
    pub lda: Integer,
    pub ldj: Integer,
    pub ldr: Integer,
    pub a: &'a mut [f64],
    pub bl: &'a mut [f64],
    pub bu: &'a mut [f64],
    pub confun: ConfunFn,
    pub objfun: ObjfunFn,
    pub inform: &'a mut Integer,
    pub iter: &'a mut Integer,
    pub istate: &'a mut [Integer],
    pub c: &'a mut [f64],
    pub cjac: &'a mut [f64],
    pub clamda: &'a mut [f64],
    pub objf: &'a mut f64,
    pub grad: &'a mut [f64],
    pub r: &'a mut [f64],
    pub x: &'a mut [f64],
    pub iw: &'a mut [Integer],
    pub w: &'a mut [f64],
}

/// A nonlinear programming routine with the NPSOL calling convention.
pub trait Routine {
    /// Passes one option directive through, verbatim.
    fn set_option(&mut self, directive: &str);

    /// Runs one solve, writing results into `args`.
    ///
    /// The routine calls `args.confun` and `args.objfun` synchronously on the
    /// calling thread, and stores its status in `args.inform`.
    fn solve(&mut self, args: Arguments<'_>);
}

impl<R: Routine + ?Sized> Routine for &mut R {
    fn set_option(&mut self, directive: &str) {
        (**self).set_option(directive);
    }

    fn solve(&mut self, args: Arguments<'_>) {
        (**self).solve(args);
    }
}

#[cfg(feature = "link")]
pub use linked::Npsol;

#[cfg(feature = "link")]
mod linked {
    use libc::c_char;

    use super::{Arguments, Routine};
    use crate::ffi::{self, FtnLen, Integer};

    /// The NPSOL library, linked as `libnpsol`.
    ///
    /// NPSOL keeps its options in Fortran common blocks, so options set here
    /// apply process-wide to every subsequent solve.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct Npsol;

    impl Routine for Npsol {
        fn set_option(&mut self, directive: &str) {
            // Fortran strings are not NUL-terminated; the length travels
            // separately. The routine may scribble on its copy.
            let mut text = directive.as_bytes().to_vec();
            let len = FtnLen::try_from(text.len()).unwrap_or(FtnLen::MAX);
            // SAFETY: `text` outlives the call and holds `len` bytes.
            unsafe {
                ffi::npoptn_(text.as_mut_ptr().cast::<c_char>(), len);
            }
        }

        fn solve(&mut self, args: Arguments<'_>) {
            let Arguments {
                mut n,
                mut nclin,
                mut ncnln,
                mut lda,
                mut ldj,
                mut ldr,
                a,
                bl,
                bu,
                confun,
                objfun,
                inform,
                iter,
                istate,
                c,
                cjac,
                clamda,
                objf,
                grad,
                r,
                x,
                iw,
                w,
            } = args;

            let mut leniw = Integer::try_from(iw.len()).unwrap_or(Integer::MAX);
            let mut lenw = Integer::try_from(w.len()).unwrap_or(Integer::MAX);

            // SAFETY: every buffer is exclusively borrowed for the duration of
            // the call and sized by the job from the same dimensions passed
            // here. The callbacks honour the routine's contract.
            unsafe {
                ffi::npsol_(
                    &mut n,
                    &mut nclin,
                    &mut ncnln,
                    &mut lda,
                    &mut ldj,
                    &mut ldr,
                    a.as_mut_ptr(),
                    bl.as_mut_ptr(),
                    bu.as_mut_ptr(),
                    confun,
                    objfun,
                    inform,
                    iter,
                    istate.as_mut_ptr(),
                    c.as_mut_ptr(),
                    cjac.as_mut_ptr(),
                    clamda.as_mut_ptr(),
                    objf,
                    grad.as_mut_ptr(),
                    r.as_mut_ptr(),
                    x.as_mut_ptr(),
                    iw.as_mut_ptr(),
                    &mut leniw,
                    w.as_mut_ptr(),
                    &mut lenw,
                );
            }
        }
    }
}
