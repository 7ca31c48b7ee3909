//! Size-classed node pool
//!
//! Every formula node is backed by one block from a [`NodeAllocator`].
//! Exhaustion is a recoverable [`LogicError::OutOfMemory`], never an abort.
//! Blocks go back to their pool when dropped, so a node and its whole
//! subtree are released together on every path, including errors.

mod allocator;

pub use allocator::BlockPool;

use std::fmt;
use std::rc::Weak;

use allocator::BlockHome;

use crate::LogicError;

/// Block size classes, one per node kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeClass {
    /// Variable leaves
    Variable,

    /// Conjunction, Disjunction and DisjunctionOfConjunctions nodes
    Operator,
}

impl fmt::Display for SizeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizeClass::Variable => write!(f, "variable"),
            SizeClass::Operator => write!(f, "operator"),
        }
    }
}

/// Source of node blocks
pub trait NodeAllocator {
    /// Hand out one block of `class`, or fail with `OutOfMemory`
    fn acquire(&self, class: SizeClass) -> Result<Block, LogicError>;
}

/// Lease on one pool slot; returned to the pool on drop
#[derive(Debug)]
pub struct Block {
    class: SizeClass,
    slot: Option<usize>,
    home: Option<Weak<dyn BlockHome>>,
}

impl Block {
    fn pooled(class: SizeClass, slot: usize, home: Weak<dyn BlockHome>) -> Self {
        Self {
            class,
            slot: Some(slot),
            home: Some(home),
        }
    }

    /// Block not tied to any pool
    pub fn detached(class: SizeClass) -> Self {
        Self {
            class,
            slot: None,
            home: None,
        }
    }

    /// Size class this block was drawn from
    pub fn class(&self) -> SizeClass {
        self.class
    }

    /// Pool slot, `None` for detached blocks
    pub fn slot(&self) -> Option<usize> {
        self.slot
    }
}

impl Drop for Block {
    fn drop(&mut self) {
        if let (Some(slot), Some(home)) = (self.slot, self.home.as_ref().and_then(Weak::upgrade)) {
            home.release(self.class, slot);
        }
    }
}

/// Allocator without a capacity limit
#[derive(Debug, Clone, Copy, Default)]
pub struct Unbounded;

impl NodeAllocator for Unbounded {
    fn acquire(&self, class: SizeClass) -> Result<Block, LogicError> {
        Ok(Block::detached(class))
    }
}

/// Capacities per size class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Maximum live variable nodes
    pub variable_capacity: usize,

    /// Maximum live operator nodes
    pub operator_capacity: usize,
}

impl PoolConfig {
    /// Set capacity for one class
    pub fn with_capacity(mut self, class: SizeClass, capacity: usize) -> Self {
        match class {
            SizeClass::Variable => self.variable_capacity = capacity,
            SizeClass::Operator => self.operator_capacity = capacity,
        }
        self
    }

    /// Capacity for one class
    pub fn capacity(&self, class: SizeClass) -> usize {
        match class {
            SizeClass::Variable => self.variable_capacity,
            SizeClass::Operator => self.operator_capacity,
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            variable_capacity: 65_536,
            operator_capacity: 16_384,
        }
    }
}

/// Usage of one size class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassStats {
    /// Configured slot count
    pub capacity: usize,
    /// Slots currently handed out
    pub in_use: usize,
    /// Maximum `in_use` observed
    pub high_water: usize,
}

/// Pool usage snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    /// Variable class
    pub variables: ClassStats,
    /// Operator class
    pub operators: ClassStats,
}

impl PoolStats {
    /// Human-readable summary
    pub fn report(&self) -> String {
        format!(
            "Pool usage:\n  variable: {}/{} in use (peak {})\n  operator: {}/{} in use (peak {})",
            self.variables.in_use,
            self.variables.capacity,
            self.variables.high_water,
            self.operators.in_use,
            self.operators.capacity,
            self.operators.high_water
        )
    }
}
