//! Property-based tests for the smart constructors and the PCRE renderer.

use proptest::collection::vec;
use proptest::prelude::*;
use proptest::sample::select;

use rxtrans::{enumerate, parse, render, CharSet, Dialect, Node, PosixClass, SyntaxClass, Target};

const ALPHABET: &[char] = &[
    'a', 'b', 'c', '1', '.', '*', '+', '?', '(', ')', '[', ']', '{', '}', '|', '^', '$', '\\',
    '-', ' ', '\t',
];

const RANGES: &[(char, char)] = &[('a', 'c'), ('0', '3'), ('x', 'z')];

const CLASSES: &[PosixClass] = &[PosixClass::Digit, PosixClass::Alpha, PosixClass::Space];

const SYNTAX: &[SyntaxClass] = &[SyntaxClass::Word, SyntaxClass::Whitespace];

fn literal() -> impl Strategy<Value = Node> {
    vec(select(ALPHABET), 1..4).prop_map(|chars| Node::literal(chars.into_iter().collect::<String>()))
}

fn plain_set() -> impl Strategy<Value = CharSet> {
    (vec(select(ALPHABET), 1..4), proptest::option::of(select(RANGES))).prop_map(|(chars, range)| {
        let set = chars.into_iter().fold(CharSet::new(), |set, c| set.adjoin(c));
        match range {
            Some(range) => set.adjoin(range),
            None => set,
        }
    })
}

/// Char-set-like values that negation maps back and forth.
fn set_like() -> impl Strategy<Value = Node> {
    prop_oneof![
        plain_set().prop_map(Node::CharSet),
        select(CLASSES).prop_map(|class| Node::CharSet(CharSet::from(class))),
        select(SYNTAX).prop_map(Node::syntax),
    ]
}

/// Finite trees built only through the constructors.
fn finite_node() -> impl Strategy<Value = Node> {
    let leaf = prop_oneof![literal(), plain_set().prop_map(Node::CharSet)];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            vec(inner.clone(), 0..4).prop_map(Node::seq),
            vec(inner.clone(), 1..4).prop_map(Node::choice),
            (inner.clone(), 0u32..3, 0u32..3, any::<bool>()).prop_map(|(body, a, b, greedy)| {
                Node::repeat(a.min(b), Some(a.max(b)), greedy, body).unwrap()
            }),
            inner.prop_map(Node::submatch),
        ]
    })
}

fn sorted(mut strings: Vec<String>) -> Vec<String> {
    strings.sort();
    strings
}

proptest! {
    /// Rebuilding a normalized sequence or choice changes nothing.
    #[test]
    fn normalization_is_idempotent(elts in vec(finite_node(), 0..5)) {
        let seq = Node::seq(elts.clone());
        prop_assert_eq!(Node::seq(vec![seq.clone()]), seq);

        if !elts.is_empty() {
            let choice = Node::choice(elts);
            prop_assert_eq!(Node::choice(vec![choice.clone()]), choice);
        }
    }

    #[test]
    fn intersection_is_idempotent(elts in vec(set_like(), 1..4), negated in vec(any::<bool>(), 4)) {
        let operands = elts
            .into_iter()
            .zip(negated)
            .map(|(elt, neg)| if neg { elt.negate().unwrap() } else { elt })
            .collect::<Vec<_>>();
        let once = Node::intersect(operands).unwrap();
        prop_assert_eq!(Node::intersect(vec![once.clone()]).unwrap(), once);
    }

    #[test]
    fn double_negation_cancels(node in set_like()) {
        prop_assert_eq!(node.clone().negate().unwrap().negate().unwrap(), node);
    }

    #[test]
    fn de_morgan(a in plain_set(), b in plain_set()) {
        let a = Node::CharSet(a);
        let b = Node::CharSet(b);
        let lhs = Node::intersect(vec![a.clone().negate().unwrap(), b.clone().negate().unwrap()]).unwrap();
        let rhs = Node::union(vec![a, b]).negate().unwrap();
        prop_assert_eq!(lhs, rhs);
    }

    /// Rendering to PCRE and parsing the result keeps the matched strings.
    #[test]
    fn pcre_round_trip_keeps_language(node in finite_node()) {
        let Ok(expected) = enumerate(&node) else {
            return Ok(());
        };
        let text = render(&node, Target::Pcre).unwrap();
        let reparsed = parse(&text, Dialect::Pcre);
        prop_assert!(reparsed.is_ok(), "{:?} rendered as {:?}", node, text);
        let found = enumerate(&reparsed.unwrap()).unwrap();
        prop_assert_eq!(sorted(found), sorted(expected), "{}", text);
    }
}
