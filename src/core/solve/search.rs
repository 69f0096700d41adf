//! Bundled deterministic solving backend.
//!
//! Depth-first branch and bound over the boolean variables with
//! bounds-consistency propagation on the linear constraints. The search is
//! strictly ordered (decision hints first, then creation order; 0 before 1)
//! so identical models always explore identical trees. Optimization runs by
//! solve-and-tighten: each incumbent adds an objective bound one below its
//! value until the bounded model is proven unsatisfiable.
//!
//! On timeout the best incumbent is returned as FEASIBLE; with no incumbent
//! the status is UNKNOWN.

use super::{Cmp, CpModel, Linear, SolveResult, SolveStatus, SolverBackend, SolverParams, VarId};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Deterministic branch-and-bound backend
#[derive(Debug, Default, Clone, Copy)]
pub struct BranchAndBound;

const UNASSIGNED: i8 = -1;

/// Marker for a search cut short by the wall-clock limit
struct TimedOut;

enum SearchOutcome {
    Sat(Vec<bool>),
    Unsat,
    Timeout,
}

struct Searcher<'m> {
    model: &'m CpModel,
    constraints: Vec<Linear>,
    values: Vec<i8>,
    trail: Vec<VarId>,
    watchers: Vec<Vec<usize>>,
    order: Vec<VarId>,
    deadline: Option<Instant>,
    nodes: u64,
}

impl<'m> Searcher<'m> {
    fn new(model: &'m CpModel, objective_bound: Option<i64>, deadline: Option<Instant>) -> Self {
        let mut constraints = model.constraints().to_vec();
        if let Some(bound) = objective_bound {
            constraints.push(Linear {
                terms: model.objective().iter().map(|&v| (1, v)).collect(),
                cmp: Cmp::Le,
                rhs: bound,
                only_if: None,
            });
        }

        let var_count = model.var_count();
        let mut watchers: Vec<Vec<usize>> = vec![Vec::new(); var_count];
        for (ci, constraint) in constraints.iter().enumerate() {
            for &(_, var) in &constraint.terms {
                watchers[var].push(ci);
            }
            if let Some(lit) = constraint.only_if {
                watchers[lit.var].push(ci);
            }
        }

        // Branch on hinted decisions first, then everything else in
        // creation order
        let mut hinted = vec![false; var_count];
        let mut order = Vec::with_capacity(var_count);
        for &var in model.decision_hints() {
            if var < var_count && !hinted[var] {
                hinted[var] = true;
                order.push(var);
            }
        }
        for var in 0..var_count {
            if !hinted[var] {
                order.push(var);
            }
        }

        Self {
            model,
            constraints,
            values: vec![UNASSIGNED; var_count],
            trail: Vec::with_capacity(var_count),
            watchers,
            order,
            deadline,
            nodes: 0,
        }
    }

    /// Re-examine one constraint; `None` signals a conflict, otherwise the
    /// assignments it forces under the current partial assignment.
    fn examine(&self, ci: usize) -> Option<Vec<(VarId, bool)>> {
        let constraint = &self.constraints[ci];

        let mut conditional = false;
        if let Some(lit) = constraint.only_if {
            match self.values[lit.var] {
                UNASSIGNED => conditional = true,
                value => {
                    if (value == 1) != lit.value {
                        // Enforcement literal falsified: constraint inactive
                        return Some(Vec::new());
                    }
                }
            }
        }

        let mut lo = 0i64;
        let mut hi = 0i64;
        for &(coeff, var) in &constraint.terms {
            match self.values[var] {
                UNASSIGNED => {
                    if coeff > 0 {
                        hi += coeff;
                    } else {
                        lo += coeff;
                    }
                }
                0 => {}
                _ => {
                    lo += coeff;
                    hi += coeff;
                }
            }
        }

        let rhs = constraint.rhs;
        let satisfiable = match constraint.cmp {
            Cmp::Le => lo <= rhs,
            Cmp::Ge => hi >= rhs,
            Cmp::Eq => lo <= rhs && hi >= rhs,
        };

        if conditional {
            // The constraint may still be switched off; all we can deduce
            // is that an unsatisfiable body falsifies the literal.
            if !satisfiable {
                if let Some(lit) = constraint.only_if {
                    return Some(vec![(lit.var, !lit.value)]);
                }
            }
            return Some(Vec::new());
        }

        if !satisfiable {
            return None;
        }

        let mut forced = Vec::new();
        for &(coeff, var) in &constraint.terms {
            if self.values[var] != UNASSIGNED {
                continue;
            }
            if matches!(constraint.cmp, Cmp::Le | Cmp::Eq) {
                if coeff > 0 && lo + coeff > rhs {
                    forced.push((var, false));
                } else if coeff < 0 && lo - coeff > rhs {
                    forced.push((var, true));
                }
            }
            if matches!(constraint.cmp, Cmp::Ge | Cmp::Eq) {
                if coeff > 0 && hi - coeff < rhs {
                    forced.push((var, true));
                } else if coeff < 0 && hi + coeff < rhs {
                    forced.push((var, false));
                }
            }
        }
        Some(forced)
    }

    /// Run propagation to a fixpoint from the queued constraints.
    /// Returns false on conflict.
    fn propagate(&mut self, mut queue: VecDeque<usize>) -> bool {
        while let Some(ci) = queue.pop_front() {
            let Some(forced) = self.examine(ci) else {
                return false;
            };
            for (var, value) in forced {
                match self.values[var] {
                    UNASSIGNED => {
                        self.values[var] = i8::from(value);
                        self.trail.push(var);
                        for &watcher in &self.watchers[var] {
                            queue.push_back(watcher);
                        }
                    }
                    current => {
                        if current != i8::from(value) {
                            return false;
                        }
                    }
                }
            }
        }
        true
    }

    /// Assign a variable and propagate the consequences
    fn assume(&mut self, var: VarId, value: bool) -> bool {
        self.values[var] = i8::from(value);
        self.trail.push(var);
        let queue: VecDeque<usize> = self.watchers[var].iter().copied().collect();
        self.propagate(queue)
    }

    fn undo_to(&mut self, mark: usize) {
        while self.trail.len() > mark {
            if let Some(var) = self.trail.pop() {
                self.values[var] = UNASSIGNED;
            }
        }
    }

    /// First unassigned variable at or after `from` in branching order.
    /// Everything before `from` is already assigned in the current subtree.
    fn next_unassigned(&self, from: usize) -> Option<(usize, VarId)> {
        self.order[from..]
            .iter()
            .enumerate()
            .find(|&(_, &var)| self.values[var] == UNASSIGNED)
            .map(|(offset, &var)| (from + offset, var))
    }

    /// Full evaluation of every constraint under a complete assignment
    fn verify(&self) -> bool {
        self.constraints.iter().all(|constraint| {
            if let Some(lit) = constraint.only_if {
                if (self.values[lit.var] == 1) != lit.value {
                    return true;
                }
            }
            let sum: i64 = constraint
                .terms
                .iter()
                .map(|&(coeff, var)| if self.values[var] == 1 { coeff } else { 0 })
                .sum();
            match constraint.cmp {
                Cmp::Le => sum <= constraint.rhs,
                Cmp::Ge => sum >= constraint.rhs,
                Cmp::Eq => sum == constraint.rhs,
            }
        })
    }

    fn out_of_time(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    fn dfs(&mut self, from: usize) -> Result<bool, TimedOut> {
        self.nodes += 1;
        if self.nodes % 256 == 0 && self.out_of_time() {
            return Err(TimedOut);
        }

        let Some((position, var)) = self.next_unassigned(from) else {
            return Ok(self.verify());
        };

        for value in [false, true] {
            let mark = self.trail.len();
            if self.assume(var, value) && self.dfs(position + 1)? {
                return Ok(true);
            }
            self.undo_to(mark);
        }
        Ok(false)
    }

    fn run(&mut self) -> SearchOutcome {
        let seed: VecDeque<usize> = (0..self.constraints.len()).collect();
        if !self.propagate(seed) {
            return SearchOutcome::Unsat;
        }
        match self.dfs(0) {
            Ok(true) => {
                let values = self.values.iter().map(|&v| v == 1).collect();
                SearchOutcome::Sat(values)
            }
            Ok(false) => SearchOutcome::Unsat,
            Err(TimedOut) => SearchOutcome::Timeout,
        }
    }

    fn objective_of(&self, values: &[bool]) -> i64 {
        self.model
            .objective()
            .iter()
            .filter(|&&var| values.get(var).copied().unwrap_or(false))
            .count() as i64
    }
}

impl SolverBackend for BranchAndBound {
    fn solve(&self, model: &CpModel, params: &SolverParams) -> SolveResult {
        let deadline = (params.time_limit_seconds > 0)
            .then(|| Instant::now() + Duration::from_secs(params.time_limit_seconds));

        let mut best: Option<(Vec<bool>, i64)> = None;
        let mut proven = false;
        let mut bound: Option<i64> = None;

        loop {
            let mut searcher = Searcher::new(model, bound, deadline);
            match searcher.run() {
                SearchOutcome::Sat(values) => {
                    let objective = searcher.objective_of(&values);
                    best = Some((values, objective));
                    if model.objective().is_empty() || objective == 0 {
                        // A sum of booleans cannot go below zero
                        proven = true;
                        break;
                    }
                    bound = Some(objective - 1);
                }
                SearchOutcome::Unsat => {
                    proven = true;
                    break;
                }
                SearchOutcome::Timeout => break,
            }
        }

        match best {
            Some((values, objective)) => SolveResult {
                status: if proven {
                    SolveStatus::Optimal
                } else {
                    SolveStatus::Feasible
                },
                objective: (!model.objective().is_empty()).then_some(objective),
                values,
            },
            None => SolveResult {
                status: if proven {
                    SolveStatus::Infeasible
                } else {
                    SolveStatus::Unknown
                },
                values: Vec::new(),
                objective: None,
            },
        }
    }
}
