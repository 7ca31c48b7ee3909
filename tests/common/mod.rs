#![allow(dead_code)]

use lookup_logic::{
    Conjunction, DisjunctionOfConjunctions, EngineConfig, Interner, LogicEngine, LogicNode,
    NodeAllocator, OwnerTag, Range,
};

/// Engine with default config and pool
pub fn engine() -> LogicEngine {
    LogicEngine::new(EngineConfig::default()).expect("default config is valid")
}

/// Conjunction of `(name, low, high)` constraints
pub fn conj<A: NodeAllocator>(
    alloc: &A,
    names: &mut Interner,
    vars: &[(&str, i64, i64)],
) -> Conjunction {
    let mut c = Conjunction::new(alloc).expect("allocate conjunction");
    for &(name, low, high) in vars {
        c.constrain(alloc, OwnerTag::default(), &names.intern(name), &Range::bounded(low, high))
            .expect("constrain");
    }
    c
}

/// AND_OR node with one conjunction per entry of `branches`
pub fn and_or<A: NodeAllocator>(
    alloc: &A,
    names: &mut Interner,
    branches: &[&[(&str, i64, i64)]],
) -> LogicNode {
    let mut out = DisjunctionOfConjunctions::new(alloc).expect("allocate and_or");
    for branch in branches {
        out.push_branch(conj(alloc, names, branch));
    }
    out.into()
}

/// Range from text form
pub fn range(text: &str) -> Range {
    text.parse().expect("valid range text")
}
