use thiserror::Error;

use crate::ffi::Integer;

/// Errors that can occur when validating problem dimensions.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DimensionError {
    #[error("a problem needs at least one variable")]
    NoVariables,

    #[error("problem with n={n}, nclin={nclin}, ncnln={ncnln} exceeds the routine's integer range")]
    TooLarge { n: usize, nclin: usize, ncnln: usize },
}

/// Problem dimensions and the buffer sizes derived from them.
///
/// Every buffer a [`Job`](crate::Job) owns is sized from these three counts,
/// so they are validated once here and never change afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    n: usize,
    nclin: usize,
    ncnln: usize,
    leniw: usize,
    lenw: usize,
}

impl Dimensions {
    /// Creates validated dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`DimensionError::NoVariables`] if `n` is zero, or
    /// [`DimensionError::TooLarge`] if any derived size does not fit the
    /// routine's integer type.
    pub fn new(n: usize, nclin: usize, ncnln: usize) -> Result<Self, DimensionError> {
        if n == 0 {
            return Err(DimensionError::NoVariables);
        }

        let too_large = DimensionError::TooLarge { n, nclin, ncnln };
        let leniw = integer_workspace_len(n, nclin, ncnln).ok_or(too_large)?;
        let lenw = real_workspace_len(n, nclin, ncnln).ok_or(too_large)?;

        // Every size handed across the boundary is bounded by one of these.
        let total = n.checked_add(nclin).and_then(|s| s.checked_add(ncnln));
        let fits = |v: usize| Integer::try_from(v).is_ok();
        if !(total.is_some_and(fits) && fits(leniw) && fits(lenw)) {
            return Err(too_large);
        }

        Ok(Self {
            n,
            nclin,
            ncnln,
            leniw,
            lenw,
        })
    }

    /// Number of decision variables.
    #[must_use]
    pub fn n(&self) -> usize {
        self.n
    }

    /// Number of general linear constraints.
    #[must_use]
    pub fn nclin(&self) -> usize {
        self.nclin
    }

    /// Number of nonlinear constraints.
    #[must_use]
    pub fn ncnln(&self) -> usize {
        self.ncnln
    }

    /// Length of the bound, state, and multiplier vectors.
    #[must_use]
    pub fn total(&self) -> usize {
        self.n + self.nclin + self.ncnln
    }

    /// Leading dimension of the linear constraint matrix, never zero.
    #[must_use]
    pub fn lda(&self) -> usize {
        self.nclin.max(1)
    }

    /// Leading dimension of the constraint Jacobian, never zero.
    #[must_use]
    pub fn ldj(&self) -> usize {
        self.ncnln.max(1)
    }

    /// Leading dimension of the Hessian factor.
    #[must_use]
    pub fn ldr(&self) -> usize {
        self.n
    }

    /// Length of the integer workspace.
    #[must_use]
    pub fn leniw(&self) -> usize {
        self.leniw
    }

    /// Length of the real workspace.
    #[must_use]
    pub fn lenw(&self) -> usize {
        self.lenw
    }
}

/// `3n + nclin + 2·ncnln`
fn integer_workspace_len(n: usize, nclin: usize, ncnln: usize) -> Option<usize> {
    n.checked_mul(3)?
        .checked_add(nclin)?
        .checked_add(ncnln.checked_mul(2)?)
}

fn real_workspace_len(n: usize, nclin: usize, ncnln: usize) -> Option<usize> {
    let twenty_n = n.checked_mul(20)?;
    if nclin == 0 && ncnln == 0 {
        return Some(twenty_n);
    }

    let two_n_sq = n.checked_mul(n)?.checked_mul(2)?;
    let eleven_nclin = nclin.checked_mul(11)?;
    if ncnln == 0 {
        return two_n_sq.checked_add(twenty_n)?.checked_add(eleven_nclin);
    }

    two_n_sq
        .checked_add(n.checked_mul(nclin)?)?
        .checked_add(n.checked_mul(ncnln)?.checked_mul(2)?)?
        .checked_add(twenty_n)?
        .checked_add(eleven_nclin)?
        .checked_add(ncnln.checked_mul(21)?)
}
