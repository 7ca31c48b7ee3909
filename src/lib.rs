//! # Range Logic Engine
//!
//! Stack-driven builder and evaluator for boolean formulas over named,
//! range-valued conditions, used to answer feasibility queries against
//! game-data tables ("attack between 1 and 10 AND slots in {2,3}").
//!
//! ## Core Algorithm
//!
//! 1. **Operand stack**: a token source pushes operators (`AND`/`OR`) and
//!    variables one at a time; variables land in the operator on top.
//! 2. **Constraint merge**: a repeated name is intersected inside an AND
//!    and unioned inside an OR, so every AND holds each name once.
//! 3. **Distribution**: `reduce` combines the two topmost subtrees, pushing
//!    AND through OR until the formula is a disjunction of conjunctions.
//! 4. **Resolution**: the feasible range of one named variable is read off
//!    the final formula.
//!
//! ## Usage Example
//!
//! ```
//! use lookup_logic::{EngineConfig, LogicEngine, Operator, Range};
//!
//! let mut engine = LogicEngine::new(EngineConfig::default())?;
//! engine.push_operator(Operator::And)?;
//! engine.push_variable("level", &Range::bounded(1, 50))?;
//! engine.push_operator(Operator::Or)?;
//! engine.push_variable("slots", &Range::bounded(0, 1))?;
//! engine.push_variable("weight", &Range::bounded(10, 20))?;
//! engine.reduce()?;
//!
//! let mut level = Range::full();
//! engine.resolve("level", &mut level)?;
//! assert_eq!(level, Range::bounded(1, 50));
//! # Ok::<(), lookup_logic::LogicError>(())
//! ```

#![warn(missing_docs, missing_debug_implementations)]
#![allow(clippy::new_without_default)]

pub mod range;   // Interval-set value domains
pub mod pool;    // Size-classed node blocks
pub mod intern;  // Shared variable names
pub mod node;    // Formula tree shapes
pub mod engine;  // Operand stack, merge rules, resolver
pub mod script;  // Line-oriented token driver

// Re-exports for convenience
pub use engine::{combine, resolve_node, resolve_node_feasible, LogicEngine};
pub use intern::{Interner, Symbol};
pub use node::{
    Conjunction, Disjunction, DisjunctionOfConjunctions, LogicNode, NodeKind, Operator, OwnerTag,
    Term, Variable,
};
pub use pool::{BlockPool, NodeAllocator, PoolConfig, PoolStats, SizeClass, Unbounded};
pub use range::{Interval, Range};

use thiserror::Error;

/// Default cap on top-level branches a single merge may produce
pub const DEFAULT_MAX_BRANCHES: usize = 4096;

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Largest branch count a merge may produce before failing with
    /// [`LogicError::FormulaTooComplex`]
    pub max_branches: usize,

    /// Pool capacities (used by [`LogicEngine::new`])
    pub pool: PoolConfig,

    /// Log the formula tree after every reduction
    pub verbose: bool,
}

impl EngineConfig {
    /// Set branch cap
    pub fn with_max_branches(mut self, max_branches: usize) -> Self {
        self.max_branches = max_branches;
        self
    }

    /// Set pool capacities
    pub fn with_pool(mut self, pool: PoolConfig) -> Self {
        self.pool = pool;
        self
    }

    /// Enable verbose mode
    pub fn with_verbose(mut self, enabled: bool) -> Self {
        self.verbose = enabled;
        self
    }

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> Result<(), LogicError> {
        if self.max_branches == 0 {
            return Err(LogicError::InvalidConfiguration(
                "max branches must be > 0".to_string(),
            ));
        }
        for class in [SizeClass::Variable, SizeClass::Operator] {
            if self.pool.capacity(class) == 0 {
                return Err(LogicError::InvalidConfiguration(format!(
                    "{} pool capacity must be > 0",
                    class
                )));
            }
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_branches: DEFAULT_MAX_BRANCHES,
            pool: PoolConfig::default(),
            verbose: false,
        }
    }
}

/// Errors raised while building or querying a formula
#[derive(Error, Debug)]
pub enum LogicError {
    /// Node pool exhausted; recoverable once blocks are released
    #[error("out of memory: {class} pool exhausted")]
    OutOfMemory {
        /// Size class that ran out
        class: SizeClass,
    },

    /// Variable pushed while no operator is on the stack
    #[error("missing operator for variable '{name}'")]
    MissingOperator {
        /// Name of the rejected variable
        name: String,
    },

    /// Node shape not allowed at this point
    #[error("invalid operator type {kind} in {context}")]
    InvalidOperatorType {
        /// Offending shape
        kind: NodeKind,
        /// Operation that rejected it
        context: &'static str,
    },

    /// AND_OR branch that is not a conjunction
    #[error("AND_OR branch {index} is {found}, expected AND")]
    StructuralInvariantViolation {
        /// Position of the bad branch
        index: usize,
        /// Shape found there
        found: NodeKind,
    },

    /// Merge would exceed the configured branch cap
    #[error("formula too complex: {branches} branches exceeds limit {limit}")]
    FormulaTooComplex {
        /// Branch count the merge would produce
        branches: usize,
        /// Configured cap
        limit: usize,
    },

    /// Configuration invalid (e.g., zero capacity)
    #[error("invalid engine configuration: {0}")]
    InvalidConfiguration(String),

    /// Token script could not be executed
    #[error("script line {line}: {message}")]
    Script {
        /// 1-indexed line number
        line: usize,
        /// What went wrong
        message: String,
    },
}

impl LogicError {
    /// True for failures the caller may retry after freeing resources or
    /// simplifying input; false for structural errors
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            LogicError::OutOfMemory { .. } | LogicError::FormulaTooComplex { .. }
        )
    }
}
