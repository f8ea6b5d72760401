use ndarray::Array2;

use crate::layout::ColumnMajor;

/// A vector with input, foreign, and output copies.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct StagedVector {
    pub(super) input: Vec<f64>,
    pub(super) foreign: Vec<f64>,
    pub(super) output: Vec<f64>,
}

impl StagedVector {
    pub(super) fn zeros(len: usize) -> Self {
        Self {
            input: vec![0.0; len],
            foreign: vec![0.0; len],
            output: vec![0.0; len],
        }
    }

    /// Input → foreign, before the call.
    pub(super) fn stage(&mut self) {
        self.foreign.copy_from_slice(&self.input);
    }

    /// Foreign → output, after the call.
    pub(super) fn unstage(&mut self) {
        self.output.copy_from_slice(&self.foreign);
    }

    pub(super) fn carry_over(&mut self) {
        self.input.copy_from_slice(&self.output);
    }
}

/// A row-oriented matrix with input and output copies and a column-major
/// copy for the routine.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct StagedMatrix {
    pub(super) input: Array2<f64>,
    pub(super) foreign: ColumnMajor,
    pub(super) output: Array2<f64>,
}

impl StagedMatrix {
    pub(super) fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            input: Array2::zeros((rows, cols)),
            foreign: ColumnMajor::zeros(rows, cols),
            output: Array2::zeros((rows, cols)),
        }
    }

    pub(super) fn stage(&mut self) {
        self.foreign.load(self.input.view());
    }

    pub(super) fn unstage(&mut self) {
        self.foreign.store(self.output.view_mut());
    }

    pub(super) fn carry_over(&mut self) {
        self.input.assign(&self.output);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ndarray::array;

    #[test]
    fn matrix_stage_unstage_round_trips() {
        let mut m = StagedMatrix::zeros(2, 2);
        m.input.assign(&array![[1.0, 2.0], [3.0, 4.0]]);

        m.stage();
        assert_eq!(m.foreign.as_slice(), &[1.0, 3.0, 2.0, 4.0]);

        m.foreign.as_mut_slice()[1] = 30.0;
        m.unstage();
        assert_eq!(m.output, array![[1.0, 2.0], [30.0, 4.0]]);
        assert_eq!(m.input, array![[1.0, 2.0], [3.0, 4.0]]);

        m.carry_over();
        assert_eq!(m.input, m.output);
    }

    #[test]
    fn vector_copies_are_independent() {
        let mut v = StagedVector::zeros(3);
        v.input.copy_from_slice(&[1.0, 2.0, 3.0]);

        v.stage();
        v.foreign[0] = -1.0;
        v.unstage();

        assert_eq!(v.input, vec![1.0, 2.0, 3.0]);
        assert_eq!(v.output, vec![-1.0, 2.0, 3.0]);
    }
}
