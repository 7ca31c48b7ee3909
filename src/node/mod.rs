//! Formula tree nodes
//!
//! Four closed shapes:
//!
//! ```text
//! Variable                   name ∈ range
//! Conjunction                v1 ∧ v2 ∧ ...          (variables only, unique names)
//! Disjunction                t1 ∨ t2 ∨ ...          (t = Variable | Conjunction)
//! DisjunctionOfConjunctions  c1 ∨ c2 ∨ ...          (c = Conjunction, always)
//! ```
//!
//! Flattening is carried by the types: a [`Conjunction`] can only hold
//! variables, and a [`DisjunctionOfConjunctions`] can only hold
//! conjunctions. Each node owns a pool [`Block`]; dropping a node releases
//! its block and those of its whole subtree.

mod display;

use std::fmt;

use crate::intern::Symbol;
use crate::pool::{Block, NodeAllocator, SizeClass};
use crate::range::Range;
use crate::LogicError;

/// Opaque caller back-reference carried by variables
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct OwnerTag(pub u64);

/// Node shape, used in diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Variable leaf
    Variable,
    /// AND node
    Conjunction,
    /// OR node
    Disjunction,
    /// Normalized OR of ANDs
    AndOr,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NodeKind::Variable => "VAR",
            NodeKind::Conjunction => "AND",
            NodeKind::Disjunction => "OR",
            NodeKind::AndOr => "AND_OR",
        };
        f.write_str(label)
    }
}

/// Operator accepted by `push_operator`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Start an empty Conjunction
    And,
    /// Start an empty Disjunction
    Or,
}

impl std::str::FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("and") {
            Ok(Operator::And)
        } else if s.eq_ignore_ascii_case("or") {
            Ok(Operator::Or)
        } else {
            Err(format!("unknown operator '{}'", s))
        }
    }
}

/// Named range constraint
#[derive(Debug)]
pub struct Variable {
    // Released on drop
    #[allow(dead_code)]
    pub(crate) block: Block,
    pub(crate) owner: OwnerTag,
    pub(crate) name: Symbol,
    pub(crate) range: Range,
}

impl Variable {
    /// Allocate a variable holding its own copy of `range`
    pub fn new<A: NodeAllocator + ?Sized>(
        alloc: &A,
        owner: OwnerTag,
        name: Symbol,
        range: &Range,
    ) -> Result<Self, LogicError> {
        let block = alloc.acquire(SizeClass::Variable)?;
        Ok(Self::with_block(block, owner, name, range.clone()))
    }

    pub(crate) fn with_block(block: Block, owner: OwnerTag, name: Symbol, range: Range) -> Self {
        Self {
            block,
            owner,
            name,
            range,
        }
    }

    /// Caller tag
    pub fn owner(&self) -> OwnerTag {
        self.owner
    }

    /// Interned name
    pub fn name(&self) -> &Symbol {
        &self.name
    }

    /// Constrained range
    pub fn range(&self) -> &Range {
        &self.range
    }

    /// Deep copy into fresh blocks
    pub fn copy_in<A: NodeAllocator + ?Sized>(&self, alloc: &A) -> Result<Self, LogicError> {
        Variable::new(alloc, self.owner, self.name.clone(), &self.range)
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.owner == other.owner && self.name == other.name && self.range == other.range
    }
}

/// AND of variables with unique names
#[derive(Debug)]
pub struct Conjunction {
    // Released on drop
    #[allow(dead_code)]
    pub(crate) block: Block,
    pub(crate) vars: Vec<Variable>,
}

impl Conjunction {
    /// Allocate an empty conjunction
    pub fn new<A: NodeAllocator + ?Sized>(alloc: &A) -> Result<Self, LogicError> {
        Ok(Self {
            block: alloc.acquire(SizeClass::Operator)?,
            vars: Vec::new(),
        })
    }

    /// Member variables in insertion order
    pub fn vars(&self) -> &[Variable] {
        &self.vars
    }

    /// Variable with `name`, if constrained here
    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.vars.iter().find(|v| v.name == *name)
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut Variable> {
        self.vars.iter_mut().find(|v| v.name == *name)
    }

    /// Number of variables
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// True when unconstrained
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Deep copy into fresh blocks
    pub fn copy_in<A: NodeAllocator + ?Sized>(&self, alloc: &A) -> Result<Self, LogicError> {
        let mut copy = Conjunction::new(alloc)?;
        copy.vars.reserve(self.vars.len());
        for var in &self.vars {
            copy.vars.push(var.copy_in(alloc)?);
        }
        Ok(copy)
    }

    /// Blocks held by this subtree
    pub fn node_count(&self) -> usize {
        1 + self.vars.len()
    }
}

/// Order-insensitive: two conjunctions are equal when they constrain the
/// same names to the same ranges.
impl PartialEq for Conjunction {
    fn eq(&self, other: &Self) -> bool {
        self.vars.len() == other.vars.len()
            && self
                .vars
                .iter()
                .all(|v| other.get(v.name()).map_or(false, |o| o == v))
    }
}

/// Element of a [`Disjunction`]
#[derive(Debug, PartialEq)]
pub enum Term {
    /// Bare variable applying to the disjunction directly
    Variable(Variable),
    /// Conjunction branch
    Conjunction(Conjunction),
}

impl Term {
    /// Deep copy into fresh blocks
    pub fn copy_in<A: NodeAllocator + ?Sized>(&self, alloc: &A) -> Result<Self, LogicError> {
        Ok(match self {
            Term::Variable(v) => Term::Variable(v.copy_in(alloc)?),
            Term::Conjunction(c) => Term::Conjunction(c.copy_in(alloc)?),
        })
    }

    /// Blocks held by this subtree
    pub fn node_count(&self) -> usize {
        match self {
            Term::Variable(_) => 1,
            Term::Conjunction(c) => c.node_count(),
        }
    }
}

/// OR of terms
#[derive(Debug)]
pub struct Disjunction {
    // Released on drop
    #[allow(dead_code)]
    pub(crate) block: Block,
    pub(crate) terms: Vec<Term>,
}

impl Disjunction {
    /// Allocate an empty disjunction
    pub fn new<A: NodeAllocator + ?Sized>(alloc: &A) -> Result<Self, LogicError> {
        Ok(Self {
            block: alloc.acquire(SizeClass::Operator)?,
            terms: Vec::new(),
        })
    }

    /// Branches in insertion order
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// Direct (bare) variable with `name`
    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.terms.iter().find_map(|t| match t {
            Term::Variable(v) if v.name == *name => Some(v),
            _ => None,
        })
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut Variable> {
        self.terms.iter_mut().find_map(|t| match t {
            Term::Variable(v) if v.name == *name => Some(v),
            _ => None,
        })
    }

    /// Append a conjunction branch
    pub fn push_branch(&mut self, branch: Conjunction) {
        self.terms.push(Term::Conjunction(branch));
    }

    /// Number of branches
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// True when no branch exists
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Deep copy into fresh blocks
    pub fn copy_in<A: NodeAllocator + ?Sized>(&self, alloc: &A) -> Result<Self, LogicError> {
        let mut copy = Disjunction::new(alloc)?;
        copy.terms.reserve(self.terms.len());
        for term in &self.terms {
            copy.terms.push(term.copy_in(alloc)?);
        }
        Ok(copy)
    }

    /// Blocks held by this subtree
    pub fn node_count(&self) -> usize {
        1 + self.terms.iter().map(Term::node_count).sum::<usize>()
    }
}

impl PartialEq for Disjunction {
    fn eq(&self, other: &Self) -> bool {
        self.terms == other.terms
    }
}

/// Normalized OR of conjunctions
#[derive(Debug)]
pub struct DisjunctionOfConjunctions {
    // Released on drop
    #[allow(dead_code)]
    pub(crate) block: Block,
    pub(crate) branches: Vec<Conjunction>,
}

impl DisjunctionOfConjunctions {
    /// Allocate with no branches
    pub fn new<A: NodeAllocator + ?Sized>(alloc: &A) -> Result<Self, LogicError> {
        Ok(Self {
            block: alloc.acquire(SizeClass::Operator)?,
            branches: Vec::new(),
        })
    }

    /// Build from loosely typed nodes; every node must be a Conjunction
    pub fn try_from_nodes<A: NodeAllocator + ?Sized>(
        alloc: &A,
        nodes: Vec<LogicNode>,
    ) -> Result<Self, LogicError> {
        let mut out = DisjunctionOfConjunctions::new(alloc)?;
        for (index, node) in nodes.into_iter().enumerate() {
            match node {
                LogicNode::Conjunction(c) => out.branches.push(c),
                other => {
                    return Err(LogicError::StructuralInvariantViolation {
                        index,
                        found: other.kind(),
                    })
                }
            }
        }
        Ok(out)
    }

    /// Branches in insertion order
    pub fn branches(&self) -> &[Conjunction] {
        &self.branches
    }

    /// Append a branch
    pub fn push_branch(&mut self, branch: Conjunction) {
        self.branches.push(branch);
    }

    /// Number of branches
    pub fn len(&self) -> usize {
        self.branches.len()
    }

    /// True when no branch exists (unsatisfiable)
    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    /// Deep copy into fresh blocks
    pub fn copy_in<A: NodeAllocator + ?Sized>(&self, alloc: &A) -> Result<Self, LogicError> {
        let mut copy = DisjunctionOfConjunctions::new(alloc)?;
        copy.branches.reserve(self.branches.len());
        for branch in &self.branches {
            copy.branches.push(branch.copy_in(alloc)?);
        }
        Ok(copy)
    }

    /// Blocks held by this subtree
    pub fn node_count(&self) -> usize {
        1 + self
            .branches
            .iter()
            .map(Conjunction::node_count)
            .sum::<usize>()
    }
}

impl PartialEq for DisjunctionOfConjunctions {
    fn eq(&self, other: &Self) -> bool {
        self.branches == other.branches
    }
}

/// Any formula node
#[derive(Debug, PartialEq)]
pub enum LogicNode {
    /// Variable leaf
    Variable(Variable),
    /// AND node
    Conjunction(Conjunction),
    /// OR node
    Disjunction(Disjunction),
    /// Normalized OR of ANDs
    AndOr(DisjunctionOfConjunctions),
}

impl LogicNode {
    /// Allocate an empty operator node
    pub fn operator<A: NodeAllocator + ?Sized>(alloc: &A, op: Operator) -> Result<Self, LogicError> {
        Ok(match op {
            Operator::And => LogicNode::Conjunction(Conjunction::new(alloc)?),
            Operator::Or => LogicNode::Disjunction(Disjunction::new(alloc)?),
        })
    }

    /// Shape of this node
    pub fn kind(&self) -> NodeKind {
        match self {
            LogicNode::Variable(_) => NodeKind::Variable,
            LogicNode::Conjunction(_) => NodeKind::Conjunction,
            LogicNode::Disjunction(_) => NodeKind::Disjunction,
            LogicNode::AndOr(_) => NodeKind::AndOr,
        }
    }

    /// Deep copy into fresh blocks; ranges are copied, not shared
    pub fn copy_in<A: NodeAllocator + ?Sized>(&self, alloc: &A) -> Result<Self, LogicError> {
        Ok(match self {
            LogicNode::Variable(v) => LogicNode::Variable(v.copy_in(alloc)?),
            LogicNode::Conjunction(c) => LogicNode::Conjunction(c.copy_in(alloc)?),
            LogicNode::Disjunction(d) => LogicNode::Disjunction(d.copy_in(alloc)?),
            LogicNode::AndOr(d) => LogicNode::AndOr(d.copy_in(alloc)?),
        })
    }

    /// Blocks held by this subtree
    pub fn node_count(&self) -> usize {
        match self {
            LogicNode::Variable(_) => 1,
            LogicNode::Conjunction(c) => c.node_count(),
            LogicNode::Disjunction(d) => d.node_count(),
            LogicNode::AndOr(d) => d.node_count(),
        }
    }

    /// Top-level alternatives this node represents
    pub fn branch_count(&self) -> usize {
        match self {
            LogicNode::Variable(_) | LogicNode::Conjunction(_) => 1,
            LogicNode::Disjunction(d) => d.len(),
            LogicNode::AndOr(d) => d.len(),
        }
    }

    /// Conjunction payload
    pub fn as_conjunction(&self) -> Option<&Conjunction> {
        match self {
            LogicNode::Conjunction(c) => Some(c),
            _ => None,
        }
    }

    /// Disjunction payload
    pub fn as_disjunction(&self) -> Option<&Disjunction> {
        match self {
            LogicNode::Disjunction(d) => Some(d),
            _ => None,
        }
    }

    /// Normalized payload
    pub fn as_and_or(&self) -> Option<&DisjunctionOfConjunctions> {
        match self {
            LogicNode::AndOr(d) => Some(d),
            _ => None,
        }
    }
}

impl From<Conjunction> for LogicNode {
    fn from(c: Conjunction) -> Self {
        LogicNode::Conjunction(c)
    }
}

impl From<Disjunction> for LogicNode {
    fn from(d: Disjunction) -> Self {
        LogicNode::Disjunction(d)
    }
}

impl From<DisjunctionOfConjunctions> for LogicNode {
    fn from(d: DisjunctionOfConjunctions) -> Self {
        LogicNode::AndOr(d)
    }
}
