//! Indented tree rendering
//!
//! ```text
//! AND_OR
//!     AND
//!         VAR atk [1, 10]
//!         VAR def [5, 7]
//! ```

use std::fmt;

use super::{Conjunction, Disjunction, DisjunctionOfConjunctions, LogicNode, Term, Variable};

const INDENT: &str = "    ";

fn pad(f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        f.write_str(INDENT)?;
    }
    Ok(())
}

fn write_variable(f: &mut fmt::Formatter<'_>, var: &Variable, depth: usize) -> fmt::Result {
    pad(f, depth)?;
    write!(f, "VAR {} {}", var.name, var.range)?;
    if var.owner.0 != 0 {
        write!(f, " @{}", var.owner.0)?;
    }
    writeln!(f)
}

fn write_conjunction(f: &mut fmt::Formatter<'_>, conj: &Conjunction, depth: usize) -> fmt::Result {
    pad(f, depth)?;
    writeln!(f, "AND")?;
    for var in &conj.vars {
        write_variable(f, var, depth + 1)?;
    }
    Ok(())
}

fn write_disjunction(f: &mut fmt::Formatter<'_>, disj: &Disjunction, depth: usize) -> fmt::Result {
    pad(f, depth)?;
    writeln!(f, "OR")?;
    for term in &disj.terms {
        match term {
            Term::Variable(v) => write_variable(f, v, depth + 1)?,
            Term::Conjunction(c) => write_conjunction(f, c, depth + 1)?,
        }
    }
    Ok(())
}

fn write_and_or(
    f: &mut fmt::Formatter<'_>,
    node: &DisjunctionOfConjunctions,
    depth: usize,
) -> fmt::Result {
    pad(f, depth)?;
    writeln!(f, "AND_OR")?;
    for branch in &node.branches {
        write_conjunction(f, branch, depth + 1)?;
    }
    Ok(())
}

impl fmt::Display for LogicNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicNode::Variable(v) => write_variable(f, v, 0),
            LogicNode::Conjunction(c) => write_conjunction(f, c, 0),
            LogicNode::Disjunction(d) => write_disjunction(f, d, 0),
            LogicNode::AndOr(d) => write_and_or(f, d, 0),
        }
    }
}
