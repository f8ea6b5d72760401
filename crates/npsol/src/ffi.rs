//! Raw declarations for the NPSOL Fortran entry points.
//!
//! NPSOL is compiled Fortran 77: every argument is passed by reference, and
//! character arguments carry a hidden trailing length. The integer type
//! follows the f2c convention (`long int`).

use libc::c_long;
#[cfg(feature = "link")]
use libc::c_char;

/// Fortran `INTEGER` as seen by the routine.
pub type Integer = c_long;

/// Hidden length argument that follows a Fortran `CHARACTER` argument.
pub type FtnLen = c_long;

/// Constraint callback: `(mode, ncnln, n, ldJ, needc, x, c, cJac, nstate)`.
pub type ConfunFn = unsafe extern "C" fn(
    mode: *mut Integer,
    ncnln: *const Integer,
    n: *const Integer,
    ldj: *const Integer,
    needc: *const Integer,
    x: *const f64,
    c: *mut f64,
    cjac: *mut f64,
    nstate: *const Integer,
) -> Integer;

/// Objective callback: `(mode, n, x, objf, objgrd, nstate)`.
pub type ObjfunFn = unsafe extern "C" fn(
    mode: *mut Integer,
    n: *const Integer,
    x: *const f64,
    objf: *mut f64,
    objgrd: *mut f64,
    nstate: *const Integer,
) -> Integer;

#[cfg(feature = "link")]
#[link(name = "npsol")]
unsafe extern "C" {
    pub fn npoptn_(string: *mut c_char, len: FtnLen) -> Integer;

    pub fn npsol_(
        n: *mut Integer,
        nclin: *mut Integer,
        ncnln: *mut Integer,
        lda: *mut Integer,
        ldj: *mut Integer,
        ldr: *mut Integer,
        a: *mut f64,
        bl: *mut f64,
        bu: *mut f64,
        confun: ConfunFn,
        objfun: ObjfunFn,
        inform: *mut Integer,
        iter: *mut Integer,
        istate: *mut Integer,
        c: *mut f64,
        cjac: *mut f64,
        clamda: *mut f64,
        objf: *mut f64,
        grad: *mut f64,
        r: *mut f64,
        x: *mut f64,
        iw: *mut Integer,
        leniw: *mut Integer,
        w: *mut f64,
        lenw: *mut Integer,
    ) -> Integer;
}
