//! Operand stack machine
//!
//! A token source drives the engine with discrete calls:
//!
//! ```text
//! push_operator(AND)      stack: [AND{}]
//! push_variable(A, 1..5)  stack: [AND{A}]
//! push_operator(OR)       stack: [AND{A}, OR{}]
//! push_variable(B, 1..5)  stack: [AND{A}, OR{B}]
//! push_variable(C, 1..5)  stack: [AND{A}, OR{B, C}]
//! reduce()                stack: [AND_OR{ {A,B}, {A,C} }]
//! ```
//!
//! Stack entries are always complete operator subtrees; variables are
//! absorbed by the entry on top and never stand alone on the stack.

mod constraint;
mod merge;
mod resolve;

pub use constraint::{merge_range, Scope};
pub use merge::combine;
pub use resolve::{resolve_node, resolve_node_feasible};

use tracing::debug;

use crate::intern::{Interner, Symbol};
use crate::node::{LogicNode, NodeKind, Operator, OwnerTag};
use crate::pool::{BlockPool, NodeAllocator, PoolStats};
use crate::range::Range;
use crate::{EngineConfig, LogicError};

/// Incremental formula builder and range resolver
///
/// Single-threaded: one engine owns its allocator; share across threads
/// only behind external serialization.
#[derive(Debug)]
pub struct LogicEngine<A: NodeAllocator = BlockPool> {
    alloc: A,
    names: Interner,
    stack: Vec<LogicNode>,
    config: EngineConfig,
}

impl LogicEngine<BlockPool> {
    /// Create engine backed by a [`BlockPool`] sized from `config.pool`
    pub fn new(config: EngineConfig) -> Result<Self, LogicError> {
        let pool = BlockPool::new(&config.pool);
        Self::with_allocator(config, pool)
    }

    /// Pool usage snapshot
    pub fn pool_stats(&self) -> PoolStats {
        self.alloc.stats()
    }
}

impl<A: NodeAllocator> LogicEngine<A> {
    /// Create engine using a caller-supplied allocator
    pub fn with_allocator(config: EngineConfig, alloc: A) -> Result<Self, LogicError> {
        config.validate()?;
        Ok(Self {
            alloc,
            names: Interner::new(),
            stack: Vec::new(),
            config,
        })
    }

    /// Access configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Access allocator
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Shared symbol for `name`
    pub fn intern(&mut self, name: &str) -> Symbol {
        self.names.intern(name)
    }

    /// Number of pending subtrees
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// True when nothing is pending
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Most recently pushed or produced subtree
    pub fn top(&self) -> Option<&LogicNode> {
        self.stack.last()
    }

    /// Finished formula: `Some` only when exactly one subtree remains
    pub fn root(&self) -> Option<&LogicNode> {
        match self.stack.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }

    /// Constrain `name` to `range` in the operator on top of the stack
    pub fn push_variable(&mut self, name: &str, range: &Range) -> Result<(), LogicError> {
        self.push_owned_variable(OwnerTag::default(), name, range)
    }

    /// Like [`push_variable`](Self::push_variable), tagging the variable with `owner`
    ///
    /// - AND on top: intersect with an existing `name`, else append.
    /// - OR on top: union with an existing bare `name`, else append.
    /// - AND_OR on top: apply to every branch (intersection per branch).
    pub fn push_owned_variable(
        &mut self,
        owner: OwnerTag,
        name: &str,
        range: &Range,
    ) -> Result<(), LogicError> {
        let Some(top) = self.stack.last_mut() else {
            return Err(LogicError::MissingOperator {
                name: name.to_string(),
            });
        };
        let name = self.names.intern(name);

        match top {
            LogicNode::Conjunction(c) => c.constrain(&self.alloc, owner, &name, range),
            LogicNode::Disjunction(d) => d.constrain(&self.alloc, owner, &name, range),
            LogicNode::AndOr(d) => d.constrain_all(&self.alloc, owner, &name, range),
            LogicNode::Variable(_) => Err(LogicError::InvalidOperatorType {
                kind: NodeKind::Variable,
                context: "push_variable",
            }),
        }
    }

    /// Push a new empty operator as top of stack
    pub fn push_operator(&mut self, op: Operator) -> Result<(), LogicError> {
        let node = LogicNode::operator(&self.alloc, op)?;
        self.stack.push(node);
        Ok(())
    }

    /// Push a caller-built operator subtree
    ///
    /// Bare variables are rejected; they must go through
    /// [`push_variable`](Self::push_variable).
    pub fn push_node(&mut self, node: LogicNode) -> Result<(), LogicError> {
        if let LogicNode::Variable(_) = node {
            return Err(LogicError::InvalidOperatorType {
                kind: NodeKind::Variable,
                context: "push_node",
            });
        }
        self.stack.push(node);
        Ok(())
    }

    /// Combine the two topmost subtrees
    ///
    /// Returns `Ok(false)` without touching the stack when fewer than two
    /// entries are pending; callers tracking progress must check the flag
    /// or [`depth`](Self::depth). On error both operands stay on the stack
    /// unchanged, so the caller can retry (e.g. after raising the branch
    /// cap) or [`clear`](Self::clear).
    pub fn reduce(&mut self) -> Result<bool, LogicError> {
        let depth = self.stack.len();
        if depth < 2 {
            return Ok(false);
        }

        let merged = combine(
            &self.alloc,
            &self.stack[depth - 2],
            &self.stack[depth - 1],
            self.config.max_branches,
        )?;

        // Operands are released only once the merge has succeeded
        self.stack.truncate(depth - 2);
        if self.config.verbose {
            debug!(depth = depth - 1, formula = %merged, "reduced");
        } else {
            debug!(depth = depth - 1, kind = %merged.kind(), "reduced");
        }
        self.stack.push(merged);
        Ok(true)
    }

    /// Reduce until at most one subtree remains; returns reductions performed
    pub fn reduce_all(&mut self) -> Result<usize, LogicError> {
        let mut count = 0;
        while self.reduce()? {
            count += 1;
        }
        Ok(count)
    }

    /// Narrow `accumulator` by the ranges declared for `name` in the
    /// subtree on top of the stack
    ///
    /// Only the queried name's declarations are consulted; see
    /// [`resolve_node`] for the exact contract. An empty stack leaves the
    /// accumulator unchanged.
    pub fn resolve(&self, name: &str, accumulator: &mut Range) -> Result<(), LogicError> {
        match self.stack.last() {
            Some(root) => resolve_node(root, name, accumulator),
            None => Ok(()),
        }
    }

    /// Like [`resolve`](Self::resolve), skipping unsatisfiable branches
    pub fn resolve_feasible(&self, name: &str, accumulator: &mut Range) -> Result<(), LogicError> {
        match self.stack.last() {
            Some(root) => resolve_node_feasible(root, name, accumulator),
            None => Ok(()),
        }
    }

    /// Remove the top subtree, handing ownership to the caller
    pub fn pop(&mut self) -> Option<LogicNode> {
        self.stack.pop()
    }

    /// Drop every pending subtree, returning their blocks
    pub fn clear(&mut self) {
        self.stack.clear();
    }

    /// Blocks held by pending subtrees
    pub fn nodes_in_use(&self) -> usize {
        self.stack.iter().map(LogicNode::node_count).sum()
    }
}
