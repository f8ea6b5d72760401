//! Conversion between row-oriented matrices and the column-major storage the
//! routine reads and writes.
//!
//! The job keeps every matrix row-oriented for callers. Immediately before a
//! solve each one is loaded into a [`ColumnMajor`] buffer, and immediately
//! after the call it is stored back. Callbacks receive raw column-major
//! buffers with a leading dimension, which [`to_column_major`] and
//! [`from_column_major`] handle.

use ndarray::{Array2, ArrayView2, ArrayViewMut2, ShapeBuilder, ShapeError, s};

/// An owned matrix in Fortran (column-major) storage order.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMajor(Array2<f64>);

impl ColumnMajor {
    /// Creates a zeroed `rows × cols` matrix in column-major storage.
    #[must_use]
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self(Array2::zeros((rows, cols).f()))
    }

    /// Returns `(rows, cols)`.
    #[must_use]
    pub fn dim(&self) -> (usize, usize) {
        self.0.dim()
    }

    /// Copies a row-oriented matrix into this buffer.
    ///
    /// # Panics
    ///
    /// Panics if `src` does not have the same shape as this buffer.
    pub fn load(&mut self, src: ArrayView2<'_, f64>) {
        assert_eq!(src.dim(), self.dim(), "layout load shape mismatch");
        self.0.assign(&src);
    }

    /// Copies this buffer into a row-oriented matrix.
    ///
    /// # Panics
    ///
    /// Panics if `dst` does not have the same shape as this buffer.
    pub fn store(&self, mut dst: ArrayViewMut2<'_, f64>) {
        assert_eq!(dst.dim(), self.dim(), "layout store shape mismatch");
        dst.assign(&self.0);
    }

    /// Logical view of the matrix, indexed `[row, col]`.
    #[must_use]
    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.0.view()
    }

    /// The flat column-major buffer.
    ///
    /// # Panics
    ///
    /// Never in practice: the buffer is allocated contiguous in column-major
    /// order and no method re-strides it.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        self.0
            .as_slice_memory_order()
            .expect("column-major buffer is contiguous")
    }

    /// The flat column-major buffer, mutably.
    ///
    /// # Panics
    ///
    /// Never in practice; see [`as_slice`](Self::as_slice).
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        self.0
            .as_slice_memory_order_mut()
            .expect("column-major buffer is contiguous")
    }
}

/// Writes a row-oriented matrix into a flat column-major buffer.
///
/// The buffer holds `ld × src.ncols()` values with leading dimension `ld`;
/// only the first `src.nrows()` rows of each column are written.
///
/// # Errors
///
/// Returns a [`ShapeError`] if `dst` holds fewer than `ld × ncols` values or
/// `ld` is smaller than the number of rows.
pub fn to_column_major(
    src: ArrayView2<'_, f64>,
    ld: usize,
    dst: &mut [f64],
) -> Result<(), ShapeError> {
    let (rows, cols) = src.dim();
    let mut flat = ArrayViewMut2::from_shape((ld, cols).f(), dst)?;
    check_rows(rows, ld)?;
    flat.slice_mut(s![..rows, ..]).assign(&src);
    Ok(())
}

/// Reads a flat column-major buffer into a row-oriented matrix.
///
/// The counterpart of [`to_column_major`]: `src` holds `ld × dst.ncols()`
/// values and the first `dst.nrows()` rows are copied out.
///
/// # Errors
///
/// Returns a [`ShapeError`] if `src` holds fewer than `ld × ncols` values or
/// `ld` is smaller than the number of rows.
pub fn from_column_major(
    src: &[f64],
    ld: usize,
    mut dst: ArrayViewMut2<'_, f64>,
) -> Result<(), ShapeError> {
    let (rows, cols) = dst.dim();
    let flat = ArrayView2::from_shape((ld, cols).f(), src)?;
    check_rows(rows, ld)?;
    dst.assign(&flat.slice(s![..rows, ..]));
    Ok(())
}

fn check_rows(rows: usize, ld: usize) -> Result<(), ShapeError> {
    if rows > ld {
        return Err(ShapeError::from_kind(ndarray::ErrorKind::OutOfBounds));
    }
    Ok(())
}
