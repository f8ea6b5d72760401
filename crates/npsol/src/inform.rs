use std::fmt;

use crate::ffi::Integer;

/// The status code returned by the routine, kept exactly as reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Inform(Integer);

/// Documented meanings of the routine's status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// `0`: an optimal solution was found.
    Optimal,

    /// `1`: optimality conditions hold but the requested accuracy could not
    /// be achieved.
    WeakOptimum,

    /// `2`: no feasible point for the linear constraints and bounds.
    LinearInfeasible,

    /// `3`: no feasible point for the nonlinear constraints.
    NonlinearInfeasible,

    /// `4`: the major iteration limit was reached.
    IterationLimit,

    /// `6`: the current point cannot be improved upon.
    CannotImprove,

    /// `7`: the user-provided derivatives appear to be incorrect.
    DerivativeError,

    /// `9`: an input parameter is invalid.
    InvalidInput,

    /// Negative: an evaluator asked the routine to stop with this code.
    UserStop(Integer),

    /// Any other code.
    Unrecognized(Integer),
}

impl Inform {
    /// Wraps a raw status code.
    #[must_use]
    pub fn new(code: Integer) -> Self {
        Self(code)
    }

    /// The raw status code.
    #[must_use]
    pub fn code(self) -> Integer {
        self.0
    }

    /// Whether the routine reported an optimal solution (`0`).
    #[must_use]
    pub fn is_optimal(self) -> bool {
        self.0 == 0
    }

    /// Classifies the code without changing it.
    #[must_use]
    pub fn outcome(self) -> Outcome {
        match self.0 {
            0 => Outcome::Optimal,
            1 => Outcome::WeakOptimum,
            2 => Outcome::LinearInfeasible,
            3 => Outcome::NonlinearInfeasible,
            4 => Outcome::IterationLimit,
            6 => Outcome::CannotImprove,
            7 => Outcome::DerivativeError,
            9 => Outcome::InvalidInput,
            code if code < 0 => Outcome::UserStop(code),
            code => Outcome::Unrecognized(code),
        }
    }
}

impl From<Inform> for Integer {
    fn from(inform: Inform) -> Self {
        inform.0
    }
}

impl fmt::Display for Inform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let meaning = match self.outcome() {
            Outcome::Optimal => "optimal solution found",
            Outcome::WeakOptimum => "optimal, but requested accuracy not achieved",
            Outcome::LinearInfeasible => "linear constraints and bounds are infeasible",
            Outcome::NonlinearInfeasible => "nonlinear constraints are infeasible",
            Outcome::IterationLimit => "major iteration limit reached",
            Outcome::CannotImprove => "current point cannot be improved",
            Outcome::DerivativeError => "derivatives appear to be incorrect",
            Outcome::InvalidInput => "invalid input parameter",
            Outcome::UserStop(_) => "stopped at the evaluator's request",
            Outcome::Unrecognized(_) => "unrecognized status",
        };
        write!(f, "inform {}: {meaning}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_is_preserved() {
        for code in [-7, -1, 0, 1, 4, 5, 9, 42] {
            let inform = Inform::new(code);
            assert_eq!(inform.code(), code);
            assert_eq!(Integer::from(inform), code);
        }
    }

    #[test]
    fn classifies_documented_codes() {
        assert_eq!(Inform::new(0).outcome(), Outcome::Optimal);
        assert!(Inform::new(0).is_optimal());
        assert_eq!(Inform::new(4).outcome(), Outcome::IterationLimit);
        assert_eq!(Inform::new(-3).outcome(), Outcome::UserStop(-3));
        assert_eq!(Inform::new(5).outcome(), Outcome::Unrecognized(5));
        assert!(!Inform::new(1).is_optimal());
    }

    #[test]
    fn display_includes_raw_code() {
        assert_eq!(
            Inform::new(2).to_string(),
            "inform 2: linear constraints and bounds are infeasible"
        );
    }
}
