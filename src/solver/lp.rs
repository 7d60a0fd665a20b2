//! `good_lp` solver backend.
//!
//! Translates a `ProblemSpec` into a `good_lp` model and solves it with
//! the crate's default solver (the pure-Rust `microlp` branch-and-bound,
//! selected by feature flag — nothing native to link). microlp solves to
//! proven optimality and has no incumbent-interrupt API, so the time
//! budget is advisory here; a backend that does support time limits maps
//! an elapsed budget with an incumbent to `SolveStatus::Feasible`.

use std::time::{Duration, Instant};

use good_lp::{
    constraint, variable, Expression, ProblemVariables, ResolutionError, Solution, SolverModel,
    Variable,
};
use tracing::debug;

use super::{Assignment, Cmp, MilpSolver, ProblemSpec, SolveError, SolveStatus, VarDomain};

/// The default MILP backend.
#[derive(Debug, Default)]
pub struct LpSolver;

impl LpSolver {
    pub fn new() -> Self {
        Self
    }
}

impl MilpSolver for LpSolver {
    fn solve(&self, spec: &ProblemSpec, budget: Duration) -> Result<Assignment, SolveError> {
        let started = Instant::now();

        let mut vars = ProblemVariables::new();
        let handles: Vec<Variable> = spec
            .vars()
            .iter()
            .map(|domain| match domain {
                VarDomain::Binary => vars.add(variable().binary()),
                VarDomain::Integer { min, max } => {
                    vars.add(variable().integer().min(*min as f64).max(*max as f64))
                }
            })
            .collect();

        let objective = spec
            .objective()
            .iter()
            .fold(Expression::from(0.0), |acc, (var, coef)| {
                acc + *coef * handles[var.0]
            });

        let mut model = vars.maximise(objective).using(good_lp::default_solver);

        for c in spec.constraints() {
            let lhs = c
                .terms
                .iter()
                .fold(Expression::from(0.0), |acc, (var, coef)| {
                    acc + *coef * handles[var.0]
                });
            let rhs = c.rhs;
            model = match c.op {
                Cmp::Le => model.with(constraint!(lhs <= rhs)),
                Cmp::Ge => model.with(constraint!(lhs >= rhs)),
                Cmp::Eq => model.with(constraint!(lhs == rhs)),
            };
        }

        debug!(
            vars = spec.num_vars(),
            constraints = spec.constraints().len(),
            budget_secs = budget.as_secs(),
            "Solving MILP"
        );

        match model.solve() {
            Ok(solution) => {
                let values: Vec<f64> = handles.iter().map(|v| solution.value(*v)).collect();
                let objective_value: f64 = spec
                    .objective()
                    .iter()
                    .map(|(var, coef)| coef * values[var.0])
                    .sum();
                debug!(
                    objective = objective_value,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Solve complete"
                );
                Ok(Assignment::new(
                    SolveStatus::Optimal,
                    objective_value,
                    values,
                ))
            }
            Err(ResolutionError::Infeasible) => Err(SolveError::Infeasible),
            Err(other) => Err(SolveError::Backend(format!("{other:?}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn budget() -> Duration {
        Duration::from_secs(5)
    }

    #[test]
    fn test_knapsack_picks_best_subset() {
        // Three items worth 6/5/4, each weighing 3, capacity 6 → take the
        // two most valuable.
        let mut spec = ProblemSpec::new();
        let items: Vec<_> = (0..3).map(|_| spec.binary()).collect();
        spec.constrain(items.iter().map(|&v| (v, 3.0)).collect(), Cmp::Le, 6.0);
        spec.maximize_term(items[0], 6.0);
        spec.maximize_term(items[1], 5.0);
        spec.maximize_term(items[2], 4.0);

        let asn = LpSolver::new().solve(&spec, budget()).unwrap();
        assert!(asn.is_set(items[0]));
        assert!(asn.is_set(items[1]));
        assert!(!asn.is_set(items[2]));
        assert!((asn.objective - 11.0).abs() < 1e-6);
    }

    #[test]
    fn test_equality_constraint_is_exact() {
        let mut spec = ProblemSpec::new();
        let vars: Vec<_> = (0..4).map(|_| spec.binary()).collect();
        spec.constrain(vars.iter().map(|&v| (v, 1.0)).collect(), Cmp::Eq, 2.0);
        for (i, &v) in vars.iter().enumerate() {
            spec.maximize_term(v, (i + 1) as f64);
        }

        let asn = LpSolver::new().solve(&spec, budget()).unwrap();
        let picked = vars.iter().filter(|&&v| asn.is_set(v)).count();
        assert_eq!(picked, 2);
        assert!(asn.is_set(vars[2]));
        assert!(asn.is_set(vars[3]));
    }

    #[test]
    fn test_integer_variable_bounds() {
        let mut spec = ProblemSpec::new();
        let x = spec.integer(0, 10);
        spec.constrain(vec![(x, 1.0)], Cmp::Le, 7.3);
        spec.maximize_term(x, 1.0);

        let asn = LpSolver::new().solve(&spec, budget()).unwrap();
        assert_eq!(asn.int_value(x), 7);
    }

    #[test]
    fn test_infeasible_model_reported() {
        // Two binaries cannot sum to 3.
        let mut spec = ProblemSpec::new();
        let a = spec.binary();
        let b = spec.binary();
        spec.constrain(vec![(a, 1.0), (b, 1.0)], Cmp::Ge, 3.0);
        spec.maximize_term(a, 1.0);

        let err = LpSolver::new().solve(&spec, budget()).unwrap_err();
        assert!(matches!(err, SolveError::Infeasible));
    }

    #[test]
    fn test_linking_constraints() {
        // b ≤ a: forcing a off forces b off.
        let mut spec = ProblemSpec::new();
        let a = spec.binary();
        let b = spec.binary();
        spec.constrain(vec![(b, 1.0), (a, -1.0)], Cmp::Le, 0.0);
        spec.constrain(vec![(a, 1.0)], Cmp::Eq, 0.0);
        spec.maximize_term(b, 10.0);

        let asn = LpSolver::new().solve(&spec, budget()).unwrap();
        assert!(!asn.is_set(b));
        assert!((asn.objective - 0.0).abs() < 1e-6);
    }
}
