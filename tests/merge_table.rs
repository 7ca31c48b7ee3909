//! Result shape of every (parent, child) pairing

mod common;

use common::conj;
use lookup_logic::{
    combine, Disjunction, DisjunctionOfConjunctions, Interner, LogicError, LogicNode, NodeKind,
    OwnerTag, Range, Unbounded,
};
use test_case::test_case;

/// Two-element operand of the given shape, using names prefixed by `tag`
fn operand(kind: NodeKind, tag: &str, names: &mut Interner) -> LogicNode {
    let x = format!("{}x", tag);
    let y = format!("{}y", tag);
    match kind {
        NodeKind::Conjunction => {
            conj(&Unbounded, names, &[(x.as_str(), 0, 9), (y.as_str(), 0, 9)]).into()
        }
        NodeKind::Disjunction => {
            let mut d = Disjunction::new(&Unbounded).unwrap();
            d.constrain(&Unbounded, OwnerTag(0), &names.intern(&x), &Range::bounded(0, 9))
                .unwrap();
            d.push_branch(conj(&Unbounded, names, &[(y.as_str(), 0, 9)]));
            d.into()
        }
        NodeKind::AndOr => {
            let mut d = DisjunctionOfConjunctions::new(&Unbounded).unwrap();
            d.push_branch(conj(&Unbounded, names, &[(x.as_str(), 0, 9)]));
            d.push_branch(conj(&Unbounded, names, &[(y.as_str(), 0, 9)]));
            d.into()
        }
        NodeKind::Variable => unreachable!("variables are not operands"),
    }
}

#[test_case(NodeKind::Conjunction, NodeKind::Conjunction => (NodeKind::Conjunction, 1) ; "and with and flattens")]
#[test_case(NodeKind::Conjunction, NodeKind::Disjunction => (NodeKind::AndOr, 2) ; "and with or distributes")]
#[test_case(NodeKind::Conjunction, NodeKind::AndOr => (NodeKind::AndOr, 2) ; "and with and_or distributes")]
#[test_case(NodeKind::Disjunction, NodeKind::Conjunction => (NodeKind::Disjunction, 3) ; "or with and appends")]
#[test_case(NodeKind::Disjunction, NodeKind::Disjunction => (NodeKind::Disjunction, 4) ; "or with or unions")]
#[test_case(NodeKind::Disjunction, NodeKind::AndOr => (NodeKind::Disjunction, 4) ; "or with and_or unions")]
#[test_case(NodeKind::AndOr, NodeKind::Conjunction => (NodeKind::AndOr, 2) ; "and_or with and folds")]
#[test_case(NodeKind::AndOr, NodeKind::Disjunction => (NodeKind::AndOr, 4) ; "and_or with or crosses")]
#[test_case(NodeKind::AndOr, NodeKind::AndOr => (NodeKind::AndOr, 4) ; "and_or with and_or crosses")]
fn merge_cell(parent: NodeKind, child: NodeKind) -> (NodeKind, usize) {
    let mut names = Interner::new();
    let p = operand(parent, "p", &mut names);
    let c = operand(child, "c", &mut names);

    let out = combine(&Unbounded, &p, &c, 64).unwrap();
    (out.kind(), out.branch_count())
}

#[test_case(NodeKind::Conjunction ; "and")]
#[test_case(NodeKind::Disjunction ; "or")]
#[test_case(NodeKind::AndOr ; "and_or")]
fn merge_leaves_operands_untouched(parent: NodeKind) {
    let mut names = Interner::new();
    let p = operand(parent, "p", &mut names);
    let c = operand(NodeKind::AndOr, "c", &mut names);
    let before = (p.to_string(), c.to_string());

    let _ = combine(&Unbounded, &p, &c, 64).unwrap();
    assert_eq!((p.to_string(), c.to_string()), before);
}

#[test_case(NodeKind::Conjunction, NodeKind::Disjunction, 1 ; "distribution over two terms")]
#[test_case(NodeKind::Disjunction, NodeKind::Disjunction, 3 ; "union of two and two")]
#[test_case(NodeKind::AndOr, NodeKind::AndOr, 3 ; "cross product of two and two")]
fn merge_over_cap_fails(parent: NodeKind, child: NodeKind, cap: usize) {
    let mut names = Interner::new();
    let p = operand(parent, "p", &mut names);
    let c = operand(child, "c", &mut names);

    let err = combine(&Unbounded, &p, &c, cap).unwrap_err();
    assert!(matches!(err, LogicError::FormulaTooComplex { limit, .. } if limit == cap));
    assert!(err.is_recoverable());
}
