//! Bounded block pool with per-class occupancy bitmaps

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use bitvec::prelude::*;
use tracing::warn;

use super::{Block, ClassStats, NodeAllocator, PoolConfig, PoolStats, SizeClass};
use crate::LogicError;

/// Receives blocks back when they are dropped
pub(super) trait BlockHome {
    fn release(&self, class: SizeClass, slot: usize);
}

/// Slot bookkeeping for one size class
///
/// 1 bit per slot: set = handed out
#[derive(Debug)]
struct ClassSlots {
    occupied: BitVec,
    in_use: usize,
    high_water: usize,
}

impl ClassSlots {
    fn new(capacity: usize) -> Self {
        Self {
            occupied: bitvec![0; capacity],
            in_use: 0,
            high_water: 0,
        }
    }

    fn stats(&self) -> ClassStats {
        ClassStats {
            capacity: self.occupied.len(),
            in_use: self.in_use,
            high_water: self.high_water,
        }
    }
}

#[derive(Debug)]
struct PoolState {
    variables: ClassSlots,
    operators: ClassSlots,
}

impl PoolState {
    fn slots_mut(&mut self, class: SizeClass) -> &mut ClassSlots {
        match class {
            SizeClass::Variable => &mut self.variables,
            SizeClass::Operator => &mut self.operators,
        }
    }
}

#[derive(Debug)]
struct PoolShared {
    state: RefCell<PoolState>,
}

impl BlockHome for PoolShared {
    fn release(&self, class: SizeClass, slot: usize) {
        let mut state = self.state.borrow_mut();
        let slots = state.slots_mut(class);
        if slots.occupied.get(slot).map_or(false, |bit| *bit) {
            slots.occupied.set(slot, false);
            slots.in_use -= 1;
        }
    }
}

/// Fixed-capacity pool handing out one block per formula node
///
/// Capacities are fixed per [`SizeClass`] at construction. Released slots are
/// reused first-free. Cloning yields another handle to the same pool; the pool
/// is single-threaded (`!Send`), so use one pool per thread.
#[derive(Debug, Clone)]
pub struct BlockPool {
    shared: Rc<PoolShared>,
}

impl BlockPool {
    /// Create pool with the configured capacities
    pub fn new(config: &PoolConfig) -> Self {
        Self {
            shared: Rc::new(PoolShared {
                state: RefCell::new(PoolState {
                    variables: ClassSlots::new(config.variable_capacity),
                    operators: ClassSlots::new(config.operator_capacity),
                }),
            }),
        }
    }

    /// Snapshot of slot usage
    pub fn stats(&self) -> PoolStats {
        let state = self.shared.state.borrow();
        PoolStats {
            variables: state.variables.stats(),
            operators: state.operators.stats(),
        }
    }

    /// Blocks currently handed out across all classes
    pub fn outstanding(&self) -> usize {
        let state = self.shared.state.borrow();
        state.variables.in_use + state.operators.in_use
    }

    /// Slots still handed out, per class; empty when every block came back
    ///
    /// Run after the owning engine is cleared to check that no node leaked.
    pub fn leaked(&self) -> Vec<(SizeClass, Vec<usize>)> {
        let state = self.shared.state.borrow();
        [
            (SizeClass::Variable, &state.variables),
            (SizeClass::Operator, &state.operators),
        ]
        .into_iter()
        .filter_map(|(class, slots)| {
            let held: Vec<usize> = slots.occupied.iter_ones().collect();
            (!held.is_empty()).then_some((class, held))
        })
        .collect()
    }
}

impl Drop for PoolShared {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        for (class, slots) in [
            (SizeClass::Variable, &state.variables),
            (SizeClass::Operator, &state.operators),
        ] {
            if slots.in_use > 0 {
                warn!(%class, blocks = slots.in_use, "pool dropped with blocks outstanding");
            }
        }
    }
}

impl NodeAllocator for BlockPool {
    fn acquire(&self, class: SizeClass) -> Result<Block, LogicError> {
        let mut state = self.shared.state.borrow_mut();
        let slots = state.slots_mut(class);

        let Some(slot) = slots.occupied.first_zero() else {
            warn!(%class, capacity = slots.occupied.len(), "block pool exhausted");
            return Err(LogicError::OutOfMemory { class });
        };

        slots.occupied.set(slot, true);
        slots.in_use += 1;
        slots.high_water = slots.high_water.max(slots.in_use);

        let shared: Rc<dyn BlockHome> = self.shared.clone();
        let home: Weak<dyn BlockHome> = Rc::downgrade(&shared);
        Ok(Block::pooled(class, slot, home))
    }
}
