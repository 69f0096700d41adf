//! Thin interface to the CP solver.
//!
//! The model builder talks to the solver only through [`CpModel`]: create a
//! boolean variable, add a linear constraint (optionally gated by an
//! enforcement literal), declare a minimization objective, and solve with a
//! time limit. Backends implement [`SolverBackend`]; the bundled
//! deterministic search lives in [`search`].

pub mod search;

pub use search::BranchAndBound;

use serde::{Deserialize, Serialize};

/// Handle to a boolean model variable
pub type VarId = usize;

/// An enforcement literal: the gated constraint applies only when
/// `var == value`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lit {
    /// Gating variable
    pub var: VarId,
    /// Value of the variable that activates the constraint
    pub value: bool,
}

impl Lit {
    /// Constraint active when the variable is true
    #[must_use]
    pub const fn pos(var: VarId) -> Self {
        Self { var, value: true }
    }

    /// Constraint active when the variable is false
    #[must_use]
    pub const fn neg(var: VarId) -> Self {
        Self { var, value: false }
    }
}

/// Comparison operator of a linear constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cmp {
    /// `Σ cᵢxᵢ ≤ rhs`
    Le,
    /// `Σ cᵢxᵢ ≥ rhs`
    Ge,
    /// `Σ cᵢxᵢ = rhs`
    Eq,
}

/// One linear constraint over boolean variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Linear {
    /// Coefficient/variable pairs
    pub terms: Vec<(i64, VarId)>,
    /// Comparison operator
    pub cmp: Cmp,
    /// Right-hand side
    pub rhs: i64,
    /// Optional enforcement literal; `None` means always active
    pub only_if: Option<Lit>,
}

/// An immutable-once-built store of variables and constraints.
///
/// Creation order of variables and constraints is part of the model: two
/// builds from identical inputs produce structurally identical models, so
/// backend search heuristics behave reproducibly.
#[derive(Debug, Default, Clone)]
pub struct CpModel {
    names: Vec<String>,
    constraints: Vec<Linear>,
    objective: Vec<VarId>,
    decision_hints: Vec<VarId>,
}

impl CpModel {
    /// Create an empty model
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fresh boolean variable
    pub fn new_bool(&mut self, name: impl Into<String>) -> VarId {
        let var = self.names.len();
        self.names.push(name.into());
        var
    }

    /// Add an always-active linear constraint
    pub fn add(&mut self, terms: Vec<(i64, VarId)>, cmp: Cmp, rhs: i64) {
        self.constraints.push(Linear {
            terms,
            cmp,
            rhs,
            only_if: None,
        });
    }

    /// Add a linear constraint that applies only when the literal holds
    pub fn add_only_if(&mut self, terms: Vec<(i64, VarId)>, cmp: Cmp, rhs: i64, lit: Lit) {
        self.constraints.push(Linear {
            terms,
            cmp,
            rhs,
            only_if: Some(lit),
        });
    }

    /// Fix a variable to a constant value
    pub fn fix(&mut self, var: VarId, value: bool) {
        self.add(vec![(1, var)], Cmp::Eq, i64::from(value));
    }

    /// Declare the objective: minimize the sum of these booleans
    pub fn minimize(&mut self, vars: Vec<VarId>) {
        self.objective = vars;
    }

    /// Suggest variables the backend should branch on first, in order.
    /// Purely a search hint; ignoring it does not affect correctness.
    pub fn hint_decision(&mut self, var: VarId) {
        self.decision_hints.push(var);
    }

    /// Number of variables created so far
    #[must_use]
    pub fn var_count(&self) -> usize {
        self.names.len()
    }

    /// Number of constraints added so far
    #[must_use]
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Debug name of a variable
    #[must_use]
    pub fn var_name(&self, var: VarId) -> &str {
        self.names.get(var).map_or("", String::as_str)
    }

    /// All constraints in creation order
    #[must_use]
    pub fn constraints(&self) -> &[Linear] {
        &self.constraints
    }

    /// Objective variables (empty for pure feasibility)
    #[must_use]
    pub fn objective(&self) -> &[VarId] {
        &self.objective
    }

    /// Branching hints in declaration order
    #[must_use]
    pub fn decision_hints(&self) -> &[VarId] {
        &self.decision_hints
    }
}

/// Solver termination status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveStatus {
    /// A solution was found and proven optimal
    Optimal,
    /// A solution was found; optimality not proven within the time limit
    Feasible,
    /// The model was proven to have no solution
    Infeasible,
    /// No solution found before the time limit
    Unknown,
}

impl SolveStatus {
    /// Whether a usable solution is available
    #[must_use]
    pub const fn has_solution(self) -> bool {
        matches!(self, Self::Optimal | Self::Feasible)
    }

    /// Status name as reported in summaries
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Optimal => "OPTIMAL",
            Self::Feasible => "FEASIBLE",
            Self::Infeasible => "INFEASIBLE",
            Self::Unknown => "UNKNOWN",
        }
    }
}

/// Outcome of a solve call
#[derive(Debug, Clone)]
pub struct SolveResult {
    /// Termination status
    pub status: SolveStatus,
    /// Value per variable; meaningful only when `status.has_solution()`
    pub values: Vec<bool>,
    /// Objective value, when an objective was declared and a solution found
    pub objective: Option<i64>,
}

impl SolveResult {
    /// Value of a variable in the solution (false when out of range)
    #[must_use]
    pub fn value(&self, var: VarId) -> bool {
        self.values.get(var).copied().unwrap_or(false)
    }
}

/// Externally configurable solver and model parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverParams {
    /// Wall-clock cap on solving, in seconds (0 disables the limit)
    pub time_limit_seconds: u64,

    /// Parallel search workers. The bundled backend is single-threaded and
    /// accepts this for interface parity.
    pub num_workers: u32,

    /// Simultaneous lab blocks the shared lab-room pool can host
    pub lab_room_capacity: u32,

    /// Teaching periods per day
    pub periods_per_day: u32,

    /// Teaching days per week
    pub days_per_week: u32,

    /// Weeks to model when the calendar yields none
    pub default_weeks: u32,
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            time_limit_seconds: 60,
            num_workers: 8,
            lab_room_capacity: 2,
            periods_per_day: 8,
            days_per_week: 6,
            default_weeks: 19,
        }
    }
}

/// An opaque solving backend behind the thin model interface
pub trait SolverBackend {
    /// Solve the model within the parameters' time budget
    fn solve(&self, model: &CpModel, params: &SolverParams) -> SolveResult;
}
