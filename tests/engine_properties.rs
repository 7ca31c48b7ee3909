//! End-to-end behavior of the operand stack machine

mod common;

use common::*;
use lookup_logic::{
    EngineConfig, Interner, LogicEngine, LogicError, LogicNode, Operator, Range, Term,
};

#[test]
fn test_variable_on_empty_stack_fails() {
    let mut engine = engine();
    let err = engine.push_variable("A", &Range::bounded(1, 10)).unwrap_err();
    assert!(matches!(err, LogicError::MissingOperator { .. }));
    assert!(!err.is_recoverable());
}

#[test]
fn test_repeated_name_in_conjunction_intersects() {
    let mut engine = engine();
    engine.push_operator(Operator::And).unwrap();
    engine.push_variable("A", &Range::bounded(1, 10)).unwrap();
    engine.push_variable("A", &Range::bounded(5, 20)).unwrap();

    let conj = engine.root().and_then(LogicNode::as_conjunction).unwrap();
    assert_eq!(conj.len(), 1);
    assert_eq!(conj.get("A").unwrap().range(), &Range::bounded(5, 10));
}

#[test]
fn test_and_distributes_over_or() {
    let mut engine = engine();
    engine.push_operator(Operator::And).unwrap();
    engine.push_variable("A", &Range::bounded(1, 5)).unwrap();
    engine.push_operator(Operator::Or).unwrap();
    engine.push_variable("B", &Range::bounded(1, 5)).unwrap();
    engine.push_variable("C", &Range::bounded(1, 5)).unwrap();
    assert!(engine.reduce().unwrap());

    let mut names = Interner::new();
    let expected = and_or(
        engine.allocator(),
        &mut names,
        &[&[("A", 1, 5), ("B", 1, 5)], &[("A", 1, 5), ("C", 1, 5)]],
    );
    assert_eq!(engine.root(), Some(&expected));
}

#[test]
fn test_cross_product_of_two_and_three() {
    let mut engine = engine();
    let mut names = Interner::new();
    let left = and_or(
        engine.allocator(),
        &mut names,
        &[&[("A", 0, 0)], &[("A", 1, 1)]],
    );
    let right = and_or(
        engine.allocator(),
        &mut names,
        &[&[("B", 0, 0)], &[("B", 1, 1)], &[("C", 5, 9)]],
    );
    engine.push_node(left).unwrap();
    engine.push_node(right).unwrap();
    engine.reduce().unwrap();

    let expected = and_or(
        engine.allocator(),
        &mut names,
        &[
            &[("A", 0, 0), ("B", 0, 0)],
            &[("A", 0, 0), ("B", 1, 1)],
            &[("A", 0, 0), ("C", 5, 9)],
            &[("A", 1, 1), ("B", 0, 0)],
            &[("A", 1, 1), ("B", 1, 1)],
            &[("A", 1, 1), ("C", 5, 9)],
        ],
    );
    assert_eq!(engine.root(), Some(&expected));
}

#[test]
fn test_or_union_within_cap_reduces() {
    let mut engine = LogicEngine::new(EngineConfig::default().with_max_branches(1)).unwrap();
    engine.push_operator(Operator::Or).unwrap();
    engine.push_variable("A", &Range::bounded(1, 3)).unwrap();
    engine.push_operator(Operator::Or).unwrap();
    engine.push_variable("A", &Range::bounded(4, 6)).unwrap();

    assert!(engine.reduce().unwrap());
    let disj = engine.root().and_then(LogicNode::as_disjunction).unwrap();
    assert_eq!(disj.len(), 1);
    assert_eq!(disj.get("A").unwrap().range(), &Range::bounded(1, 6));
}

#[test]
fn test_resolve_absent_name_on_conjunction_is_identity() {
    let mut engine = engine();
    engine.push_operator(Operator::And).unwrap();
    engine.push_variable("A", &Range::bounded(1, 3)).unwrap();

    let mut acc = range("0..4,9..12");
    engine.resolve("B", &mut acc).unwrap();
    assert_eq!(acc, range("0..4,9..12"));
}

#[test]
fn test_resolve_disjunction_branches() {
    let mut engine = engine();
    engine.push_operator(Operator::Or).unwrap();
    engine.push_operator(Operator::And).unwrap();
    engine.push_variable("A", &Range::bounded(1, 3)).unwrap();
    engine.reduce().unwrap();
    engine.push_operator(Operator::And).unwrap();
    engine.push_variable("A", &Range::bounded(5, 7)).unwrap();
    engine.reduce().unwrap();
    assert_eq!(engine.depth(), 1);

    let mut acc = Range::bounded(0, 10);
    engine.resolve("A", &mut acc).unwrap();
    assert_eq!(acc, range("1..3,5..7"));

    let mut acc = Range::bounded(2, 6);
    engine.resolve("A", &mut acc).unwrap();
    assert_eq!(acc, range("2..3,5..6"));
}

#[test]
fn test_copy_is_independent_of_original() {
    let mut engine = engine();
    engine.push_operator(Operator::And).unwrap();
    engine.push_variable("A", &Range::bounded(1, 10)).unwrap();
    engine.push_operator(Operator::Or).unwrap();
    engine.push_variable("B", &Range::bounded(2, 4)).unwrap();
    engine.push_variable("C", &Range::bounded(6, 8)).unwrap();
    engine.reduce().unwrap();

    let copy = engine.root().unwrap().copy_in(engine.allocator()).unwrap();
    let rendered = copy.to_string();
    engine.clear();

    assert_eq!(copy.to_string(), rendered);
    assert_eq!(copy.branch_count(), 2);
    assert_eq!(engine.allocator().outstanding(), copy.node_count());
}

#[test]
fn test_or_of_two_conjunctions_matches_manual_build() {
    // OR{ AND{A,B}, AND{C,D} }
    let mut engine = engine();
    engine.push_operator(Operator::Or).unwrap();
    engine.push_operator(Operator::And).unwrap();
    engine.push_variable("A", &Range::bounded(1, 1)).unwrap();
    engine.push_variable("B", &Range::bounded(2, 2)).unwrap();
    engine.reduce().unwrap();
    engine.push_operator(Operator::And).unwrap();
    engine.push_variable("C", &Range::bounded(3, 3)).unwrap();
    engine.push_variable("D", &Range::bounded(4, 4)).unwrap();
    engine.reduce().unwrap();

    let mut names = Interner::new();
    let alloc = engine.allocator();
    let mut manual = lookup_logic::Disjunction::new(alloc).unwrap();
    manual.push_branch(conj(alloc, &mut names, &[("A", 1, 1), ("B", 2, 2)]));
    manual.push_branch(conj(alloc, &mut names, &[("C", 3, 3), ("D", 4, 4)]));

    assert_eq!(engine.root(), Some(&LogicNode::from(manual)));
}

#[test]
fn test_and_then_or_round_trip() {
    // AND{A,B} followed by OR{C,D}: (A ∧ B) ∧ (C ∨ D)
    let mut engine = engine();
    engine.push_operator(Operator::And).unwrap();
    engine.push_variable("A", &Range::bounded(1, 1)).unwrap();
    engine.push_variable("B", &Range::bounded(2, 2)).unwrap();
    engine.push_operator(Operator::Or).unwrap();
    engine.push_variable("C", &Range::bounded(3, 3)).unwrap();
    engine.push_variable("D", &Range::bounded(4, 4)).unwrap();
    engine.reduce().unwrap();

    let mut names = Interner::new();
    let expected = and_or(
        engine.allocator(),
        &mut names,
        &[
            &[("A", 1, 1), ("B", 2, 2), ("C", 3, 3)],
            &[("A", 1, 1), ("B", 2, 2), ("D", 4, 4)],
        ],
    );
    assert_eq!(engine.root(), Some(&expected));
}

#[test]
fn test_variable_after_and_or_applies_to_every_branch() {
    let mut engine = engine();
    engine.push_operator(Operator::And).unwrap();
    engine.push_operator(Operator::Or).unwrap();
    engine.push_variable("B", &Range::bounded(0, 9)).unwrap();
    engine.push_variable("C", &Range::bounded(0, 9)).unwrap();
    engine.reduce().unwrap();
    engine.push_variable("B", &Range::bounded(5, 20)).unwrap();

    let root = engine.root().and_then(LogicNode::as_and_or).unwrap();
    assert_eq!(root.branches()[0].get("B").unwrap().range(), &Range::bounded(5, 9));
    assert_eq!(root.branches()[1].get("B").unwrap().range(), &Range::bounded(5, 20));
    assert_eq!(root.branches()[1].get("C").unwrap().range(), &Range::bounded(0, 9));
}

#[test]
fn test_or_keeps_bare_variables_unioned() {
    let mut engine = engine();
    engine.push_operator(Operator::Or).unwrap();
    engine.push_variable("A", &Range::bounded(1, 3)).unwrap();
    engine.push_operator(Operator::Or).unwrap();
    engine.push_variable("A", &Range::bounded(4, 6)).unwrap();
    engine.push_variable("B", &Range::bounded(0, 0)).unwrap();
    engine.reduce().unwrap();

    let disj = engine.root().and_then(LogicNode::as_disjunction).unwrap();
    assert_eq!(disj.len(), 2);
    assert!(matches!(&disj.terms()[0], Term::Variable(v) if v.range() == &Range::bounded(1, 6)));
}

#[test]
fn test_nested_formula_reduces_to_single_root() {
    // (hp ∈ 1..100) ∧ ((atk ∈ 10..20) ∨ (matk ∈ 10..20)) ∧ ((slots ∈ 1) ∨ (slots ∈ 3..4))
    let mut engine = engine();
    engine.push_operator(Operator::And).unwrap();
    engine.push_variable("hp", &Range::bounded(1, 100)).unwrap();
    engine.push_operator(Operator::Or).unwrap();
    engine.push_variable("atk", &Range::bounded(10, 20)).unwrap();
    engine.push_variable("matk", &Range::bounded(10, 20)).unwrap();
    engine.reduce().unwrap();
    engine.push_operator(Operator::Or).unwrap();
    engine.push_operator(Operator::And).unwrap();
    engine.push_variable("slots", &Range::bounded(1, 1)).unwrap();
    engine.reduce().unwrap();
    engine.push_operator(Operator::And).unwrap();
    engine.push_variable("slots", &Range::bounded(3, 4)).unwrap();
    engine.reduce().unwrap();
    assert_eq!(engine.reduce_all().unwrap(), 1);

    let root = engine.root().unwrap();
    assert_eq!(root.branch_count(), 4);

    let mut slots = Range::full();
    engine.resolve("slots", &mut slots).unwrap();
    assert_eq!(slots, range("1,3..4"));

    let mut hp = Range::bounded(50, 500);
    engine.resolve("hp", &mut hp).unwrap();
    assert_eq!(hp, Range::bounded(50, 100));
}

#[test]
fn test_clear_releases_everything() {
    let mut engine = engine();
    engine.push_operator(Operator::And).unwrap();
    engine.push_variable("A", &Range::bounded(1, 3)).unwrap();
    engine.push_operator(Operator::Or).unwrap();
    engine.push_variable("B", &Range::bounded(1, 3)).unwrap();
    assert!(engine.allocator().outstanding() > 0);

    engine.clear();
    assert!(engine.is_empty());
    assert_eq!(engine.allocator().outstanding(), 0);

    let mut acc = Range::bounded(0, 1);
    engine.resolve("A", &mut acc).unwrap();
    assert_eq!(acc, Range::bounded(0, 1));
}
