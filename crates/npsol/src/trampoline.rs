//! Plain callbacks handed to the routine, and the slot they dispatch through.
//!
//! The routine accepts two context-free function pointers, so the evaluator
//! for the solve in progress is published in a thread-local slot. A
//! [`Registration`] fills the slot immediately before the routine is called
//! and empties it when dropped, so the slot is occupied exactly while a solve
//! is in flight on this thread.
//!
//! The routine keeps its state in process-wide globals, so at most one solve
//! may be in flight in the whole process. A registration also claims a
//! process-wide flag. Installing a second one, whether from inside a callback
//! or from another thread, fails with [`Error::SolveInProgress`] rather than
//! waiting.

use std::any::Any;
use std::cell::Cell;
use std::marker::PhantomData;
use std::panic::{self, AssertUnwindSafe};
use std::ptr;
use std::slice;
use std::sync::atomic::{AtomicBool, Ordering};

use ndarray::Array2;
use tracing::{error, warn};

use crate::error::Error;
use crate::evaluator::{ConstraintRequest, Evaluator, ObjectiveRequest};
use crate::ffi::Integer;
use crate::layout;

/// Status returned, and mode set, when a callback cannot be serviced.
const STOP: Integer = -1;

/// Set while any thread has a solve in flight.
static IN_FLIGHT: AtomicBool = AtomicBool::new(false);

thread_local! {
    static ACTIVE: Cell<*mut Slot<'static>> = const { Cell::new(ptr::null_mut()) };
}

/// The evaluator for the solve in flight, plus callback scratch space.
pub(crate) struct Slot<'a> {
    evaluator: &'a mut dyn Evaluator,
    jacobian: Array2<f64>,
    panic: Option<Box<dyn Any + Send>>,
}

impl<'a> Slot<'a> {
    /// Creates a slot with a row-oriented `ncnln × n` Jacobian scratch.
    pub(crate) fn new(evaluator: &'a mut dyn Evaluator, ncnln: usize, n: usize) -> Self {
        Self {
            evaluator,
            jacobian: Array2::zeros((ncnln, n)),
            panic: None,
        }
    }

    /// Takes the payload of the first panic raised by the evaluator, if any.
    pub(crate) fn take_panic(&mut self) -> Option<Box<dyn Any + Send>> {
        self.panic.take()
    }

    fn objective(
        &mut self,
        mode: &mut Integer,
        nstate: Integer,
        x: &[f64],
        objf: &mut f64,
        gradient: &mut [f64],
    ) -> Integer {
        if self.panic.is_some() {
            *mode = STOP;
            return STOP;
        }

        let evaluator = &mut *self.evaluator;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            evaluator.objective(ObjectiveRequest::new(mode, nstate, x, objf, gradient))
        }));

        match outcome {
            Ok(status) => status,
            Err(payload) => self.record_panic(payload, mode),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn constraints(
        &mut self,
        mode: &mut Integer,
        nstate: Integer,
        needc: &[Integer],
        x: &[f64],
        values: &mut [f64],
        cjac: &mut [f64],
        ldj: usize,
    ) -> Integer {
        if self.panic.is_some() {
            *mode = STOP;
            return STOP;
        }

        let shape = (needc.len(), x.len());
        if self.jacobian.dim() != shape {
            error!(
                expected = ?self.jacobian.dim(),
                found = ?shape,
                "constraint callback dimensions do not match the job"
            );
            *mode = STOP;
            return STOP;
        }

        if let Err(e) = layout::from_column_major(cjac, ldj, self.jacobian.view_mut()) {
            error!(%e, ldj, "cannot read the routine's Jacobian buffer");
            *mode = STOP;
            return STOP;
        }

        let evaluator = &mut *self.evaluator;
        let jacobian = self.jacobian.view_mut();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            evaluator.constraints(ConstraintRequest::new(
                mode, nstate, needc, x, values, jacobian,
            ))
        }));

        let status = match outcome {
            Ok(status) => status,
            Err(payload) => return self.record_panic(payload, mode),
        };

        if let Err(e) = layout::to_column_major(self.jacobian.view(), ldj, cjac) {
            error!(%e, ldj, "cannot write the routine's Jacobian buffer");
            *mode = STOP;
            return STOP;
        }

        status
    }

    fn record_panic(&mut self, payload: Box<dyn Any + Send>, mode: &mut Integer) -> Integer {
        error!("evaluator panicked; asking the routine to stop");
        self.panic.get_or_insert(payload);
        *mode = STOP;
        STOP
    }
}

/// Keeps a [`Slot`] published for the trampolines while alive.
pub(crate) struct Registration<'s> {
    _slot: PhantomData<&'s mut ()>,
}

impl<'s> Registration<'s> {
    /// Claims the process-wide flag and publishes `slot` as the active
    /// evaluator on this thread.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SolveInProgress`] if a solve is already in flight on
    /// any thread. Nothing is claimed in that case.
    pub(crate) fn install<'a>(slot: &'s mut Slot<'a>) -> Result<Self, Error> {
        let raw = ptr::from_mut(slot).cast::<Slot<'static>>();
        ACTIVE.with(|active| {
            if !active.get().is_null() {
                return Err(Error::SolveInProgress);
            }
            IN_FLIGHT
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .map_err(|_| Error::SolveInProgress)?;
            active.set(raw);
            Ok(Self { _slot: PhantomData })
        })
    }
}

impl Drop for Registration<'_> {
    fn drop(&mut self) {
        let _ = ACTIVE.try_with(|active| active.set(ptr::null_mut()));
        IN_FLIGHT.store(false, Ordering::Release);
    }
}

/// Whether a solve is in flight on any thread.
#[must_use]
pub fn is_active() -> bool {
    IN_FLIGHT.load(Ordering::Acquire)
}

/// Serializes tests that solve, since the in-flight flag is process-wide.
#[cfg(test)]
pub(crate) fn serial() -> std::sync::MutexGuard<'static, ()> {
    static LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
    LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

fn with_active<R>(f: impl FnOnce(&mut Slot<'_>) -> R) -> Option<R> {
    let raw = ACTIVE.with(Cell::get);
    // SAFETY: the pointer is non-null only while a `Registration` holds the
    // exclusive borrow of its slot, and the routine calls back synchronously
    // on the thread that installed it.
    unsafe { raw.as_mut() }.map(f)
}

fn unserviced(mode: *mut Integer, callback: &'static str) -> Integer {
    warn!(callback, "callback invoked with no active job; asking the routine to stop");
    if !mode.is_null() {
        // SAFETY: the routine passes `mode` by reference.
        unsafe { *mode = STOP };
    }
    STOP
}

fn count(value: *const Integer) -> usize {
    // SAFETY: the routine passes every integer argument by reference.
    let value = unsafe { value.as_ref() }.copied().unwrap_or(0);
    usize::try_from(value).unwrap_or(0)
}

/// # Safety
///
/// `data` must be null or valid for `len` reads.
unsafe fn raw_slice<'a, T>(data: *const T, len: usize) -> &'a [T] {
    if data.is_null() || len == 0 {
        return &[];
    }
    // SAFETY: upheld by the caller.
    unsafe { slice::from_raw_parts(data, len) }
}

/// # Safety
///
/// `data` must be null or valid for `len` reads and writes.
unsafe fn raw_slice_mut<'a, T>(data: *mut T, len: usize) -> &'a mut [T] {
    if data.is_null() || len == 0 {
        return &mut [];
    }
    // SAFETY: upheld by the caller.
    unsafe { slice::from_raw_parts_mut(data, len) }
}

/// Constraint callback registered with the routine.
///
/// # Safety
///
/// Must only be called by the routine (or a stand-in honouring its
/// contract): every pointer valid, `needc` and `c` holding `ncnln` entries,
/// `x` holding `n`, and `cjac` holding `ldj × n` in column-major order.
pub(crate) unsafe extern "C" fn confun(
    mode: *mut Integer,
    ncnln: *const Integer,
    n: *const Integer,
    ldj: *const Integer,
    needc: *const Integer,
    x: *const f64,
    c: *mut f64,
    cjac: *mut f64,
    nstate: *const Integer,
) -> Integer {
    let (ncnln, n, ldj) = (count(ncnln), count(n), count(ldj));

    let serviced = with_active(|slot| {
        // SAFETY: sizes come from the routine, which sized these buffers.
        let (mode, needc, x, c, cjac, nstate) = unsafe {
            (
                &mut *mode,
                raw_slice(needc, ncnln),
                raw_slice(x, n),
                raw_slice_mut(c, ncnln),
                raw_slice_mut(cjac, ldj * n),
                *nstate,
            )
        };
        slot.constraints(mode, nstate, needc, x, c, cjac, ldj)
    });

    serviced.unwrap_or_else(|| unserviced(mode, "confun"))
}

/// Objective callback registered with the routine.
///
/// # Safety
///
/// Must only be called by the routine (or a stand-in honouring its
/// contract): every pointer valid, `x` and `objgrd` holding `n` entries.
pub(crate) unsafe extern "C" fn objfun(
    mode: *mut Integer,
    n: *const Integer,
    x: *const f64,
    objf: *mut f64,
    objgrd: *mut f64,
    nstate: *const Integer,
) -> Integer {
    let n = count(n);

    let serviced = with_active(|slot| {
        // SAFETY: sizes come from the routine, which sized these buffers.
        let (mode, x, objf, gradient, nstate) = unsafe {
            (
                &mut *mode,
                raw_slice(x, n),
                &mut *objf,
                raw_slice_mut(objgrd, n),
                *nstate,
            )
        };
        slot.objective(mode, nstate, x, objf, gradient)
    });

    serviced.unwrap_or_else(|| unserviced(mode, "objfun"))
}
