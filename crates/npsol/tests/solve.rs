mod support;

use approx::assert_relative_eq;
use jetfit_npsol::{
    ConstraintRequest, Dimensions, Evaluator, Integer, Job, ObjectiveRequest, Options, Outcome,
    solve_in_progress,
};
use ndarray::array;

use support::{Descent, ITERATION_LIMIT, OPTIMAL, serial};

/// `(x0 - 1)² + 2 (x1 + 2)²`, with constraints `c = (x0 x1, x0 + 2 x1 + 3 x2)`
/// when a third variable is present.
#[derive(Debug, Default)]
struct Bowl {
    objective_calls: usize,
    constraint_calls: usize,
    stop_after: Option<(usize, Integer)>,
}

impl Evaluator for Bowl {
    fn objective(&mut self, mut request: ObjectiveRequest<'_>) -> Integer {
        self.objective_calls += 1;
        if let Some((limit, code)) = self.stop_after {
            if self.objective_calls > limit {
                request.request_stop(code);
                return 0;
            }
        }

        let x = request.x;
        *request.objf = (x[0] - 1.0).powi(2) + 2.0 * (x[1] + 2.0).powi(2);
        request.gradient.fill(0.0);
        request.gradient[0] = 2.0 * (x[0] - 1.0);
        request.gradient[1] = 4.0 * (x[1] + 2.0);
        0
    }

    fn constraints(&mut self, mut request: ConstraintRequest<'_>) -> Integer {
        self.constraint_calls += 1;
        let x = request.x;
        if request.wants_values() {
            request.values[0] = x[0] * x[1];
            request.values[1] = x[0] + 2.0 * x[1] + 3.0 * x[2];
        }
        if request.wants_jacobian() {
            request.jacobian.assign(&array![[x[1], x[0], 0.0], [1.0, 2.0, 3.0]]);
        }
        0
    }
}

fn bowl(n: usize, ncnln: usize) -> Job<Bowl, Descent> {
    let dims = Dimensions::new(n, 0, ncnln).unwrap();
    Job::new(dims, Bowl::default(), Descent::default())
}

#[test]
fn unconstrained_minimum_is_found() {
    let _serial = serial();
    let mut job = bowl(2, 0);

    let inform = job.solve(&[5.0, 5.0]).unwrap();

    assert_eq!(inform.code(), OPTIMAL);
    assert!(inform.is_optimal());
    assert_relative_eq!(job.x()[0], 1.0, epsilon = 1e-8);
    assert_relative_eq!(job.x()[1], -2.0, epsilon = 1e-8);
    assert_relative_eq!(job.objective(), 0.0, epsilon = 1e-12);
    assert!(job.gradient().iter().all(|g| g.abs() < 1e-8));
    assert!(job.iterations() > 0);
    assert!(job.evaluator().objective_calls > 1);
    assert!(!solve_in_progress());
}

#[test]
fn active_bound_holds_the_solution() {
    let _serial = serial();
    let mut job = bowl(2, 0);
    job.set_bound(0, -10.0, 0.0).unwrap();

    let inform = job.solve(&[-3.0, 0.0]).unwrap();

    assert_eq!(inform.outcome(), Outcome::Optimal);
    assert_relative_eq!(job.x()[0], 0.0);
    assert_relative_eq!(job.x()[1], -2.0, epsilon = 1e-8);
    assert_eq!(job.state(), &[2, 0]);
    assert_relative_eq!(job.multipliers()[0], -2.0, epsilon = 1e-8);
    assert_relative_eq!(job.multipliers()[1], 0.0);
}

#[test]
fn constraint_jacobian_crosses_transposed() {
    let _serial = serial();
    let mut job = bowl(3, 2);

    job.solve(&[0.0, 0.0, 0.0]).unwrap();

    let x = job.x().to_vec();
    assert!(job.evaluator().constraint_calls > 0);
    assert_relative_eq!(job.constraint_values()[0], x[0] * x[1], epsilon = 1e-12);
    assert_relative_eq!(
        job.constraint_values()[1],
        x[0] + 2.0 * x[1] + 3.0 * x[2],
        epsilon = 1e-12
    );
    assert_eq!(
        job.jacobian(),
        array![[x[1], x[0], 0.0], [1.0, 2.0, 3.0]]
    );

    // Column-major, leading dimension 2.
    assert_eq!(
        job.routine().last_cjac,
        vec![x[1], 1.0, x[0], 2.0, 0.0, 3.0]
    );
}

#[test]
fn user_stop_code_comes_back_as_inform() {
    let _serial = serial();
    let mut job = bowl(2, 0);
    job.evaluator_mut().stop_after = Some((3, -7));

    let inform = job.solve(&[5.0, 5.0]).unwrap();

    assert_eq!(inform.code(), -7);
    assert_eq!(inform.outcome(), Outcome::UserStop(-7));
    assert_eq!(job.inform(), Some(inform));
}

#[test]
fn iteration_limit_directive_reaches_the_routine() {
    let _serial = serial();
    let mut job = bowl(2, 0);
    let options = Options::default().with_major_iteration_limit(1);
    job.apply_options(&options).unwrap();

    let inform = job.solve(&[10.0, 10.0]).unwrap();

    assert_eq!(job.routine().options, vec!["Major Iteration Limit 1".to_owned()]);
    assert_eq!(inform.code(), ITERATION_LIMIT);
    assert_eq!(inform.outcome(), Outcome::IterationLimit);
    assert_eq!(job.iterations(), 1);
}

#[test]
fn carried_over_solution_restarts_converged() {
    let _serial = serial();
    let mut job = bowl(2, 0);
    job.solve(&[5.0, 5.0]).unwrap();
    let first = job.x().to_vec();

    job.carry_over();
    let inform = job.solve(&first).unwrap();

    assert!(inform.is_optimal());
    assert_eq!(job.iterations(), 0);
    assert_eq!(job.x(), first.as_slice());
    assert_eq!(job.multipliers_input(), job.multipliers());
    assert_eq!(job.hessian_input(), job.hessian());
}

#[test]
fn inputs_survive_repeated_solves() {
    let _serial = serial();
    let mut job = bowl(2, 0);
    job.set_bounds(&[-4.0, -4.0], &[4.0, 4.0]).unwrap();

    let first = job.solve(&[3.0, 3.0]).unwrap();
    let second = job.solve(&[3.0, 3.0]).unwrap();

    assert_eq!(first, second);
    assert_eq!(job.bounds(), (&[-4.0, -4.0][..], &[4.0, 4.0][..]));
}
