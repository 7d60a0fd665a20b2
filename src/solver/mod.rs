//! Mixed-integer solver port.
//!
//! The optimization modules describe their models through this narrow
//! interface — declare variables, add linear constraints, set one linear
//! maximize objective, solve with a time budget, read assignments back —
//! so the engine never depends on a concrete solver crate and backends
//! stay interchangeable.

pub mod lp;

use std::time::Duration;

pub use lp::LpSolver;

// ---------------------------------------------------------------------------
// Problem IR
// ---------------------------------------------------------------------------

/// Handle to a declared variable, valid only for the `ProblemSpec` that
/// issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarId(pub(crate) usize);

/// Variable domain.
#[derive(Debug, Clone, Copy)]
pub enum VarDomain {
    Binary,
    Integer { min: i64, max: i64 },
}

/// Constraint comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cmp {
    Le,
    Ge,
    Eq,
}

/// A linear constraint `Σ coef·var  op  rhs`.
#[derive(Debug, Clone)]
pub struct LinearConstraint {
    pub terms: Vec<(VarId, f64)>,
    pub op: Cmp,
    pub rhs: f64,
}

/// A maximize-objective MILP under construction.
#[derive(Debug, Default)]
pub struct ProblemSpec {
    vars: Vec<VarDomain>,
    constraints: Vec<LinearConstraint>,
    objective: Vec<(VarId, f64)>,
}

impl ProblemSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a 0/1 variable.
    pub fn binary(&mut self) -> VarId {
        self.vars.push(VarDomain::Binary);
        VarId(self.vars.len() - 1)
    }

    /// Declare a bounded integer variable.
    pub fn integer(&mut self, min: i64, max: i64) -> VarId {
        self.vars.push(VarDomain::Integer { min, max });
        VarId(self.vars.len() - 1)
    }

    /// Add the linear constraint `Σ coef·var  op  rhs`.
    pub fn constrain(&mut self, terms: Vec<(VarId, f64)>, op: Cmp, rhs: f64) {
        self.constraints.push(LinearConstraint { terms, op, rhs });
    }

    /// Add `coef·var` to the maximize objective. Repeated calls for the
    /// same variable accumulate.
    pub fn maximize_term(&mut self, var: VarId, coef: f64) {
        self.objective.push((var, coef));
    }

    pub fn num_vars(&self) -> usize {
        self.vars.len()
    }

    pub(crate) fn vars(&self) -> &[VarDomain] {
        &self.vars
    }

    pub(crate) fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    pub(crate) fn objective(&self) -> &[(VarId, f64)] {
        &self.objective
    }
}

// ---------------------------------------------------------------------------
// Solve results
// ---------------------------------------------------------------------------

/// Terminal solve status. `Feasible` (an incumbent found, optimality not
/// proven within the time budget) is a success, not a timeout error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    Optimal,
    Feasible,
}

/// A solution-bearing assignment of the problem's variables.
#[derive(Debug, Clone)]
pub struct Assignment {
    pub status: SolveStatus,
    pub objective: f64,
    values: Vec<f64>,
}

impl Assignment {
    pub(crate) fn new(status: SolveStatus, objective: f64, values: Vec<f64>) -> Self {
        Self {
            status,
            objective,
            values,
        }
    }

    /// Raw value of a variable.
    pub fn value(&self, var: VarId) -> f64 {
        self.values[var.0]
    }

    /// A binary variable's truth value.
    pub fn is_set(&self, var: VarId) -> bool {
        self.values[var.0] > 0.5
    }

    /// An integer variable's value, rounded to the nearest integer.
    pub fn int_value(&self, var: VarId) -> i64 {
        self.values[var.0].round() as i64
    }
}

/// Why a solve produced no assignment.
#[derive(Debug, thiserror::Error)]
pub enum SolveError {
    /// No combination of variable values satisfies every constraint.
    #[error("model is infeasible")]
    Infeasible,

    /// The time budget elapsed with zero feasible incumbents.
    #[error("no feasible incumbent within the time budget")]
    Unknown,

    #[error("solver backend failed: {0}")]
    Backend(String),
}

// ---------------------------------------------------------------------------
// Port
// ---------------------------------------------------------------------------

/// A maximize-objective MILP backend.
pub trait MilpSolver {
    /// Solve within the wall-clock budget. Must return the best feasible
    /// incumbent if the budget elapses before optimality is proven; an
    /// elapsed budget with zero incumbents is `SolveError::Unknown`.
    fn solve(&self, spec: &ProblemSpec, budget: Duration) -> Result<Assignment, SolveError>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
