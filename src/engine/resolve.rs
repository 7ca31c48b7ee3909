//! Feasible-range queries against a finished formula
//!
//! Two modes:
//!
//! - **Declared** ([`resolve_node`]): reads only the ranges declared for the
//!   queried name. A branch that does not mention the name contributes
//!   nothing, and the other variables of a branch are not checked. The
//!   result can therefore include values no satisfying assignment uses; it
//!   is sound for the named variable's declarations only.
//! - **Feasible** ([`resolve_node_feasible`]): exact projection. Because a
//!   conjunction holds each name once with an independent range, a branch
//!   is satisfiable iff none of its ranges is empty; unsatisfiable branches
//!   are skipped, and a satisfiable branch that leaves the name free leaves
//!   the accumulator unconstrained.

use tracing::trace;

use crate::node::{Conjunction, LogicNode, NodeKind, Term, Variable};
use crate::range::Range;
use crate::LogicError;

/// Narrow `accumulator` by the ranges declared for `name` in `root`
///
/// - AND root: intersect with the matching variable, if any.
/// - OR / AND_OR root: union the matches across branches; if the union is
///   non-empty, intersect it into `accumulator`, otherwise leave it as is.
pub fn resolve_node(root: &LogicNode, name: &str, accumulator: &mut Range) -> Result<(), LogicError> {
    match root {
        LogicNode::Conjunction(c) => {
            if let Some(var) = c.get(name) {
                accumulator.intersect_in_place(&var.range);
            }
        }
        LogicNode::Disjunction(d) => {
            let mut union = Range::new();
            for term in &d.terms {
                let found = match term {
                    Term::Variable(v) => (v.name == *name).then_some(v),
                    Term::Conjunction(c) => c.get(name),
                };
                if let Some(var) = found {
                    union.union_in_place(&var.range);
                }
            }
            narrow(accumulator, &union);
        }
        LogicNode::AndOr(d) => {
            let mut union = Range::new();
            for branch in &d.branches {
                if let Some(var) = branch.get(name) {
                    union.union_in_place(&var.range);
                }
            }
            narrow(accumulator, &union);
        }
        LogicNode::Variable(_) => {
            return Err(LogicError::InvalidOperatorType {
                kind: NodeKind::Variable,
                context: "resolve",
            })
        }
    }
    trace!(variable = name, result = %accumulator, "resolved");
    Ok(())
}

fn narrow(accumulator: &mut Range, union: &Range) {
    if !union.is_empty() {
        accumulator.intersect_in_place(union);
    }
}

/// What one branch allows for the queried name
enum Projection<'a> {
    /// Branch cannot be satisfied
    Infeasible,
    /// Branch does not constrain the name
    Free,
    /// Branch constrains the name to this range
    Bound(&'a Range),
}

fn project_conjunction<'a>(conj: &'a Conjunction, name: &str) -> Projection<'a> {
    if conj.vars.iter().any(|v| v.range.is_empty()) {
        return Projection::Infeasible;
    }
    match conj.get(name) {
        Some(var) => Projection::Bound(&var.range),
        None => Projection::Free,
    }
}

fn project_variable<'a>(var: &'a Variable, name: &str) -> Projection<'a> {
    if var.range.is_empty() {
        Projection::Infeasible
    } else if var.name == *name {
        Projection::Bound(&var.range)
    } else {
        Projection::Free
    }
}

/// Narrow `accumulator` to the values of `name` used by at least one
/// satisfying assignment of `root`
///
/// An unsatisfiable formula empties the accumulator.
pub fn resolve_node_feasible(
    root: &LogicNode,
    name: &str,
    accumulator: &mut Range,
) -> Result<(), LogicError> {
    let projections: Vec<Projection<'_>> = match root {
        LogicNode::Conjunction(c) => vec![project_conjunction(c, name)],
        LogicNode::Disjunction(d) => d
            .terms
            .iter()
            .map(|t| match t {
                Term::Variable(v) => project_variable(v, name),
                Term::Conjunction(c) => project_conjunction(c, name),
            })
            .collect(),
        LogicNode::AndOr(d) => d
            .branches
            .iter()
            .map(|b| project_conjunction(b, name))
            .collect(),
        LogicNode::Variable(_) => {
            return Err(LogicError::InvalidOperatorType {
                kind: NodeKind::Variable,
                context: "resolve",
            })
        }
    };

    let mut union = Range::new();
    for projection in &projections {
        match projection {
            Projection::Infeasible => {}
            Projection::Free => {
                trace!(variable = name, "satisfiable branch leaves name free");
                return Ok(());
            }
            Projection::Bound(range) => union.union_in_place(range),
        }
    }
    accumulator.intersect_in_place(&union);
    trace!(variable = name, result = %accumulator, "resolved feasible");
    Ok(())
}
