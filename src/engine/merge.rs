//! Pairwise reduction of the two topmost operands
//!
//! | parent \ child | AND               | OR                 | AND_OR             |
//! |----------------|-------------------|--------------------|--------------------|
//! | AND            | flatten → AND     | distribute → AND_OR| distribute → AND_OR|
//! | OR             | append → OR       | union → OR         | union → OR         |
//! | AND_OR         | each branch → AND_OR | cross → AND_OR  | cross → AND_OR     |
//!
//! This is `(P1 ∨ … ∨ Pm) ∧ (C1 ∨ … ∨ Cn) = ⋁ij (Pi ∧ Cj)` plus flattening
//! of nested conjunctions. Operands are only read; every output node is a
//! fresh copy. The cross-product cells multiply branch counts, so every
//! cell checks its output size against the configured cap first.

use tracing::{debug, warn};

use crate::node::{
    Conjunction, Disjunction, DisjunctionOfConjunctions, LogicNode, NodeKind, Term,
};
use crate::pool::NodeAllocator;
use crate::LogicError;

/// Combine `parent` (below) with `child` (top) into one node
///
/// Neither operand is modified. Fails with `FormulaTooComplex` when the
/// result would hold more than `max_branches` top-level branches, and with
/// `InvalidOperatorType` if either operand is a bare variable.
pub fn combine<A: NodeAllocator + ?Sized>(
    alloc: &A,
    parent: &LogicNode,
    child: &LogicNode,
    max_branches: usize,
) -> Result<LogicNode, LogicError> {
    let merger = Merger {
        alloc,
        limit: max_branches,
    };

    debug!(parent = %parent.kind(), child = %child.kind(), "combining operands");

    let merged: LogicNode = match (parent, child) {
        (LogicNode::Conjunction(p), LogicNode::Conjunction(c)) => merger.and_and(p, c)?.into(),
        (LogicNode::Conjunction(p), LogicNode::Disjunction(c)) => merger.and_or(p, c)?.into(),
        (LogicNode::Conjunction(p), LogicNode::AndOr(c)) => merger.and_and_or(p, c)?.into(),

        (LogicNode::Disjunction(p), LogicNode::Conjunction(c)) => merger.or_and(p, c)?.into(),
        (LogicNode::Disjunction(p), LogicNode::Disjunction(c)) => merger.or_or(p, c)?.into(),
        (LogicNode::Disjunction(p), LogicNode::AndOr(c)) => merger.or_and_or(p, c)?.into(),

        (LogicNode::AndOr(p), LogicNode::Conjunction(c)) => merger.and_or_and(p, c)?.into(),
        (LogicNode::AndOr(p), LogicNode::Disjunction(c)) => merger.and_or_or(p, c)?.into(),
        (LogicNode::AndOr(p), LogicNode::AndOr(c)) => merger.and_or_and_or(p, c)?.into(),

        (LogicNode::Variable(_), _) => return Err(invalid(NodeKind::Variable)),
        (_, LogicNode::Variable(_)) => return Err(invalid(NodeKind::Variable)),
    };

    debug!(
        result = %merged.kind(),
        branches = merged.branch_count(),
        "operands combined"
    );
    Ok(merged)
}

fn invalid(kind: NodeKind) -> LogicError {
    LogicError::InvalidOperatorType {
        kind,
        context: "combine",
    }
}

struct Merger<'a, A: ?Sized> {
    alloc: &'a A,
    limit: usize,
}

impl<A: NodeAllocator + ?Sized> Merger<'_, A> {
    fn guard(&self, branches: usize) -> Result<(), LogicError> {
        if branches > self.limit {
            warn!(branches, limit = self.limit, "merge exceeds branch cap");
            return Err(LogicError::FormulaTooComplex {
                branches,
                limit: self.limit,
            });
        }
        Ok(())
    }

    /// P ∧ C, flattened
    fn and_and(&self, p: &Conjunction, c: &Conjunction) -> Result<Conjunction, LogicError> {
        let mut out = p.copy_in(self.alloc)?;
        out.absorb(self.alloc, c)?;
        Ok(out)
    }

    /// P ∧ (t1 ∨ … ∨ tn) = (P ∧ t1) ∨ … ∨ (P ∧ tn)
    fn and_or(
        &self,
        p: &Conjunction,
        c: &Disjunction,
    ) -> Result<DisjunctionOfConjunctions, LogicError> {
        self.guard(c.len())?;
        let mut out = DisjunctionOfConjunctions::new(self.alloc)?;
        for term in &c.terms {
            let mut branch = p.copy_in(self.alloc)?;
            branch.absorb_term(self.alloc, term)?;
            out.push_branch(branch);
        }
        Ok(out)
    }

    /// P ∧ (C1 ∨ … ∨ Cn)
    fn and_and_or(
        &self,
        p: &Conjunction,
        c: &DisjunctionOfConjunctions,
    ) -> Result<DisjunctionOfConjunctions, LogicError> {
        self.guard(c.len())?;
        let mut out = DisjunctionOfConjunctions::new(self.alloc)?;
        for cj in &c.branches {
            let mut branch = cj.copy_in(self.alloc)?;
            branch.absorb(self.alloc, p)?;
            out.push_branch(branch);
        }
        Ok(out)
    }

    /// (t1 ∨ … ∨ tm) ∨ C
    fn or_and(&self, p: &Disjunction, c: &Conjunction) -> Result<Disjunction, LogicError> {
        self.guard(p.len() + 1)?;
        let mut out = p.copy_in(self.alloc)?;
        out.push_branch(c.copy_in(self.alloc)?);
        Ok(out)
    }

    /// (t1 ∨ … ∨ tm) ∨ (u1 ∨ … ∨ un); bare variables union by name
    fn or_or(&self, p: &Disjunction, c: &Disjunction) -> Result<Disjunction, LogicError> {
        // Bare child variables matching a bare parent variable fold into it
        let appended = c
            .terms
            .iter()
            .filter(|term| match term {
                Term::Variable(v) => p.get(&v.name).is_none(),
                Term::Conjunction(_) => true,
            })
            .count();
        self.guard(p.len() + appended)?;
        let mut out = p.copy_in(self.alloc)?;
        for term in &c.terms {
            out.absorb_term(self.alloc, term)?;
        }
        Ok(out)
    }

    /// (t1 ∨ … ∨ tm) ∨ (C1 ∨ … ∨ Cn)
    fn or_and_or(
        &self,
        p: &Disjunction,
        c: &DisjunctionOfConjunctions,
    ) -> Result<Disjunction, LogicError> {
        self.guard(p.len() + c.len())?;
        let mut out = p.copy_in(self.alloc)?;
        for cj in &c.branches {
            out.push_branch(cj.copy_in(self.alloc)?);
        }
        Ok(out)
    }

    /// (P1 ∨ … ∨ Pm) ∧ C = (P1 ∧ C) ∨ … ∨ (Pm ∧ C)
    fn and_or_and(
        &self,
        p: &DisjunctionOfConjunctions,
        c: &Conjunction,
    ) -> Result<DisjunctionOfConjunctions, LogicError> {
        self.guard(p.len())?;
        let mut out = p.copy_in(self.alloc)?;
        out.absorb_all(self.alloc, c)?;
        Ok(out)
    }

    /// (P1 ∨ … ∨ Pm) ∧ (t1 ∨ … ∨ tn), one branch per (Pi, tj)
    fn and_or_or(
        &self,
        p: &DisjunctionOfConjunctions,
        c: &Disjunction,
    ) -> Result<DisjunctionOfConjunctions, LogicError> {
        self.guard(p.len().saturating_mul(c.len()))?;
        let mut out = DisjunctionOfConjunctions::new(self.alloc)?;
        for pi in &p.branches {
            for term in &c.terms {
                let mut branch = pi.copy_in(self.alloc)?;
                branch.absorb_term(self.alloc, term)?;
                out.push_branch(branch);
            }
        }
        Ok(out)
    }

    /// (P1 ∨ … ∨ Pm) ∧ (C1 ∨ … ∨ Cn), one branch per (Pi, Cj)
    fn and_or_and_or(
        &self,
        p: &DisjunctionOfConjunctions,
        c: &DisjunctionOfConjunctions,
    ) -> Result<DisjunctionOfConjunctions, LogicError> {
        self.guard(p.len().saturating_mul(c.len()))?;
        let mut out = DisjunctionOfConjunctions::new(self.alloc)?;
        for pi in &p.branches {
            for cj in &c.branches {
                let mut branch = pi.copy_in(self.alloc)?;
                branch.absorb(self.alloc, cj)?;
                out.push_branch(branch);
            }
        }
        Ok(out)
    }
}
