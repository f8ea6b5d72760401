//! A pure-Rust stand-in for the routine.
//!
//! It honours the calling contract (column-major buffers, callbacks through
//! raw pointers, negative modes stop the run, status in `inform`) but only
//! minimizes over the variable bounds, by projected gradient descent with
//! backtracking. General constraints are evaluated at the final point and
//! reported, never enforced.

use std::sync::{Mutex, MutexGuard, PoisonError};

use jetfit_npsol::ffi::ObjfunFn;
use jetfit_npsol::{Arguments, Integer, Routine};

/// Serializes tests that solve; only one solve may be in flight per process.
pub fn serial() -> MutexGuard<'static, ()> {
    static LOCK: Mutex<()> = Mutex::new(());
    LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Status codes, matching the routine's documented meanings.
pub const OPTIMAL: Integer = 0;
pub const ITERATION_LIMIT: Integer = 4;
pub const CANNOT_IMPROVE: Integer = 6;

#[derive(Debug)]
pub struct Descent {
    pub max_iters: Integer,
    pub tolerance: f64,
    pub options: Vec<String>,
    /// Flat column-major Jacobian after the last constraint callback.
    pub last_cjac: Vec<f64>,
}

impl Default for Descent {
    fn default() -> Self {
        Self {
            max_iters: 1000,
            tolerance: 1e-10,
            options: Vec::new(),
            last_cjac: Vec::new(),
        }
    }
}

impl Routine for Descent {
    fn set_option(&mut self, directive: &str) {
        self.options.push(directive.to_owned());

        let lower = directive.to_ascii_lowercase();
        if let Some(rest) = lower.strip_prefix("major iteration limit") {
            if let Ok(limit) = rest.trim().trim_start_matches('=').trim().parse() {
                self.max_iters = limit;
            }
        }
    }

    fn solve(&mut self, args: Arguments<'_>) {
        let n = usize::try_from(args.n).unwrap();
        let (lower, upper) = (&args.bl[..n], &args.bu[..n]);
        let project = |x: &mut [f64]| {
            for ((v, lo), hi) in x.iter_mut().zip(lower).zip(upper) {
                *v = v.clamp(*lo, *hi);
            }
        };

        project(&mut *args.x);
        let mut x = args.x.to_vec();
        let mut grad = vec![0.0; n];
        let mut trial = vec![0.0; n];
        let mut trial_grad = vec![0.0; n];
        let mut iter: Integer = 0;

        let mut f = match objective(args.objfun, args.n, &x, &mut grad, 1) {
            Ok(f) => f,
            Err(mode) => {
                *args.inform = mode;
                return;
            }
        };

        let status = 'outer: loop {
            let stationarity = x
                .iter()
                .zip(&grad)
                .enumerate()
                .map(|(i, (v, g))| ((v - g).clamp(lower[i], upper[i]) - v).abs())
                .fold(0.0, f64::max);
            if stationarity <= self.tolerance {
                break OPTIMAL;
            }
            if iter >= self.max_iters {
                break ITERATION_LIMIT;
            }
            iter += 1;

            let mut step = 1.0;
            loop {
                for i in 0..n {
                    trial[i] = x[i] - step * grad[i];
                }
                project(&mut trial);

                let f_trial = match objective(args.objfun, args.n, &trial, &mut trial_grad, 0) {
                    Ok(f) => f,
                    Err(mode) => break 'outer mode,
                };
                let decrease: f64 = grad.iter().zip(x.iter().zip(&trial)).map(|(g, (a, b))| g * (a - b)).sum();

                if f_trial <= f - 1e-4 * decrease {
                    x.copy_from_slice(&trial);
                    grad.copy_from_slice(&trial_grad);
                    f = f_trial;
                    break;
                }

                step *= 0.5;
                if step < 1e-20 {
                    break 'outer CANNOT_IMPROVE;
                }
            }
        };

        args.x.copy_from_slice(&x);
        args.grad.copy_from_slice(&grad);
        *args.objf = f;
        *args.iter = iter;
        *args.inform = status;

        // Multipliers are the gradient on active bounds, zero elsewhere.
        for i in 0..n {
            let active = x[i] <= lower[i] || x[i] >= upper[i];
            args.clamda[i] = if active { grad[i] } else { 0.0 };
            args.istate[i] = match (x[i] <= lower[i], x[i] >= upper[i]) {
                (true, _) => 1,
                (_, true) => 2,
                _ => 0,
            };
        }

        // Identity Hessian factor.
        args.r.fill(0.0);
        for i in 0..n {
            args.r[i * n + i] = 1.0;
        }

        if args.ncnln > 0 && status >= 0 {
            let needc = vec![1; args.c.len()];
            let mut mode: Integer = 2;
            let nstate: Integer = 0;
            unsafe {
                (args.confun)(
                    &mut mode,
                    &args.ncnln,
                    &args.n,
                    &args.ldj,
                    needc.as_ptr(),
                    x.as_ptr(),
                    args.c.as_mut_ptr(),
                    args.cjac.as_mut_ptr(),
                    &nstate,
                );
            }
            if mode < 0 {
                *args.inform = mode;
            }
            self.last_cjac = args.cjac.to_vec();
        }
    }
}

fn objective(
    objfun: ObjfunFn,
    n: Integer,
    x: &[f64],
    grad: &mut [f64],
    nstate: Integer,
) -> Result<f64, Integer> {
    let mut mode: Integer = 2;
    let mut objf = 0.0;
    unsafe {
        objfun(&mut mode, &n, x.as_ptr(), &mut objf, grad.as_mut_ptr(), &nstate);
    }
    if mode < 0 { Err(mode) } else { Ok(objf) }
}
