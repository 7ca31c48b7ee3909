//! Per-name range merging
//!
//! A name that recurs inside one AND narrows (intersection); a name that
//! recurs as a bare variable of one OR widens (union). The surviving
//! variable keeps its original owner tag.

use tracing::trace;

use crate::intern::Symbol;
use crate::node::{Conjunction, Disjunction, DisjunctionOfConjunctions, OwnerTag, Term, Variable};
use crate::pool::{NodeAllocator, SizeClass};
use crate::range::Range;
use crate::LogicError;

/// How a repeated name combines with its existing constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Inside a conjunction: both must hold
    All,
    /// Inside a disjunction: either may hold
    Any,
}

/// Replace `existing` with its combination with `incoming`
pub fn merge_range(existing: &mut Range, incoming: &Range, scope: Scope) {
    match scope {
        Scope::All => existing.intersect_in_place(incoming),
        Scope::Any => existing.union_in_place(incoming),
    }
}

impl Conjunction {
    /// Add `name ∈ range`, intersecting with an existing constraint on `name`
    pub fn constrain<A: NodeAllocator + ?Sized>(
        &mut self,
        alloc: &A,
        owner: OwnerTag,
        name: &Symbol,
        range: &Range,
    ) -> Result<(), LogicError> {
        if let Some(var) = self.get_mut(name) {
            trace!(variable = %name, "intersecting repeated variable");
            merge_range(&mut var.range, range, Scope::All);
            return Ok(());
        }
        self.vars
            .push(Variable::new(alloc, owner, name.clone(), range)?);
        Ok(())
    }

    /// Fold a copy of every variable of `other` into `self`
    pub fn absorb<A: NodeAllocator + ?Sized>(
        &mut self,
        alloc: &A,
        other: &Conjunction,
    ) -> Result<(), LogicError> {
        for var in &other.vars {
            self.constrain(alloc, var.owner, &var.name, &var.range)?;
        }
        Ok(())
    }

    /// Fold a disjunction element into `self`
    pub fn absorb_term<A: NodeAllocator + ?Sized>(
        &mut self,
        alloc: &A,
        term: &Term,
    ) -> Result<(), LogicError> {
        match term {
            Term::Variable(v) => self.constrain(alloc, v.owner, &v.name, &v.range),
            Term::Conjunction(c) => self.absorb(alloc, c),
        }
    }
}

impl Disjunction {
    /// Add `name ∈ range` as a bare term, unioning with an existing bare
    /// term on `name`
    pub fn constrain<A: NodeAllocator + ?Sized>(
        &mut self,
        alloc: &A,
        owner: OwnerTag,
        name: &Symbol,
        range: &Range,
    ) -> Result<(), LogicError> {
        if let Some(var) = self.get_mut(name) {
            trace!(variable = %name, "unioning repeated variable");
            merge_range(&mut var.range, range, Scope::Any);
            return Ok(());
        }
        let var = Variable::new(alloc, owner, name.clone(), range)?;
        self.terms.push(Term::Variable(var));
        Ok(())
    }

    /// Add a copy of `term` as an alternative
    pub fn absorb_term<A: NodeAllocator + ?Sized>(
        &mut self,
        alloc: &A,
        term: &Term,
    ) -> Result<(), LogicError> {
        match term {
            Term::Variable(v) => self.constrain(alloc, v.owner, &v.name, &v.range),
            Term::Conjunction(c) => {
                self.push_branch(c.copy_in(alloc)?);
                Ok(())
            }
        }
    }
}

impl DisjunctionOfConjunctions {
    /// Require `name ∈ range` in every branch
    ///
    /// All-or-nothing: blocks for branches that lack `name` are acquired
    /// before any branch is touched, so exhaustion leaves `self` unchanged.
    pub fn constrain_all<A: NodeAllocator + ?Sized>(
        &mut self,
        alloc: &A,
        owner: OwnerTag,
        name: &Symbol,
        range: &Range,
    ) -> Result<(), LogicError> {
        let missing = self
            .branches
            .iter()
            .filter(|b| b.get(name).is_none())
            .count();
        let mut blocks = Vec::with_capacity(missing);
        for _ in 0..missing {
            blocks.push(alloc.acquire(SizeClass::Variable)?);
        }

        for branch in &mut self.branches {
            match branch.get_mut(name) {
                Some(var) => merge_range(&mut var.range, range, Scope::All),
                None => {
                    let Some(block) = blocks.pop() else {
                        break;
                    };
                    branch
                        .vars
                        .push(Variable::with_block(block, owner, name.clone(), range.clone()));
                }
            }
        }
        Ok(())
    }

    /// Fold a copy of every variable of `other` into every branch
    pub fn absorb_all<A: NodeAllocator + ?Sized>(
        &mut self,
        alloc: &A,
        other: &Conjunction,
    ) -> Result<(), LogicError> {
        for var in &other.vars {
            self.constrain_all(alloc, var.owner, &var.name, &var.range)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intern::Interner;
    use crate::pool::{BlockPool, PoolConfig};

    #[test]
    fn test_conjunction_intersects_repeat() {
        let pool = BlockPool::new(&PoolConfig::default());
        let mut names = Interner::new();
        let a = names.intern("A");

        let mut conj = Conjunction::new(&pool).unwrap();
        conj.constrain(&pool, OwnerTag(1), &a, &Range::bounded(1, 10)).unwrap();
        conj.constrain(&pool, OwnerTag(2), &a, &Range::bounded(5, 20)).unwrap();

        assert_eq!(conj.len(), 1);
        let var = conj.get("A").unwrap();
        assert_eq!(var.range(), &Range::bounded(5, 10));
        assert_eq!(var.owner(), OwnerTag(1));
        assert_eq!(pool.outstanding(), 2);
    }

    #[test]
    fn test_disjunction_unions_repeat() {
        let pool = BlockPool::new(&PoolConfig::default());
        let mut names = Interner::new();
        let a = names.intern("A");

        let mut disj = Disjunction::new(&pool).unwrap();
        disj.constrain(&pool, OwnerTag(0), &a, &Range::bounded(1, 3)).unwrap();
        disj.constrain(&pool, OwnerTag(0), &a, &Range::bounded(5, 7)).unwrap();

        assert_eq!(disj.len(), 1);
        assert_eq!(
            disj.get("A").unwrap().range(),
            &"1..3,5..7".parse::<Range>().unwrap()
        );
    }

    #[test]
    fn test_constrain_all_is_atomic_on_exhaustion() {
        // 1 operator for the root + 2 branches; 2 variable slots only
        let pool = BlockPool::new(
            &PoolConfig::default().with_capacity(SizeClass::Variable, 2),
        );
        let mut names = Interner::new();
        let (a, b) = (names.intern("A"), names.intern("B"));

        let mut root = DisjunctionOfConjunctions::new(&pool).unwrap();
        for _ in 0..2 {
            let mut branch = Conjunction::new(&pool).unwrap();
            branch.constrain(&pool, OwnerTag(0), &a, &Range::bounded(0, 9)).unwrap();
            root.push_branch(branch);
        }

        let err = root
            .constrain_all(&pool, OwnerTag(0), &b, &Range::bounded(1, 1))
            .unwrap_err();
        assert!(matches!(err, LogicError::OutOfMemory { .. }));
        assert!(root.branches().iter().all(|br| br.get("B").is_none()));

        // Existing name needs no new blocks
        root.constrain_all(&pool, OwnerTag(0), &a, &Range::bounded(3, 4)).unwrap();
        assert!(root
            .branches()
            .iter()
            .all(|br| br.get("A").unwrap().range() == &Range::bounded(3, 4)));
    }
}
