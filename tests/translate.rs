use rxtrans::{
    enumerate, parse, render, roundtrip, CharSet, Dialect, EnumerationError, Error, Node,
    ParseErrorKind, Target, UnparseError,
};

fn pcre(pattern: &str) -> Node {
    parse(pattern, Dialect::Pcre).unwrap()
}

fn emacs(pattern: &str) -> Node {
    parse(pattern, Dialect::Emacs).unwrap()
}

fn sorted(mut strings: Vec<String>) -> Vec<String> {
    strings.sort();
    strings
}

#[test]
fn alternation_keeps_its_parentheses() {
    let text = render(&pcre("(ab|cd)*"), Target::Pcre).unwrap();
    assert_eq!(text, "(ab|cd)*");

    let Node::Repeat(repeat) = pcre(&text) else {
        panic!("expected a repetition");
    };
    let Node::Submatch(body) = *repeat.body else {
        panic!("expected a group");
    };
    assert_eq!(
        *body,
        Node::Choice(vec![Node::literal("ab"), Node::literal("cd")])
    );
}

#[test]
fn non_capturing_alternation_is_regrouped() {
    let node = pcre("(?:ab|cd)+x");
    assert_eq!(render(&node, Target::Pcre).unwrap(), "(?:ab|cd)+x");
}

#[test]
fn finite_patterns_survive_a_round_trip() {
    let patterns = [
        "(a|b){2}",
        "colou?r",
        "[a-c]x{1,2}",
        r"\Qa.b\E?",
        "(?:foo|ba[rz])(!|\\?)",
        r"\x41\t[\x00-\x02]",
        "a{0}b",
    ];
    for pattern in patterns {
        let node = pcre(pattern);
        let expected = enumerate(&node).unwrap();
        let text = render(&node, Target::Pcre).unwrap();
        let reparsed = pcre(&text);
        assert_eq!(enumerate(&reparsed).unwrap(), expected, "{} -> {}", pattern, text);
    }
}

#[test]
fn emacs_patterns_translate_to_equivalent_pcre() {
    let patterns = [
        r"\(foo\|bar\)\{2\}",
        r"x[]a-c]?",
        r"\(?:ab\)\{,2\}",
        r"a\.b\\\?",
        r"*x\{3\}",
    ];
    for pattern in patterns {
        let node = emacs(pattern);
        let text = render(&node, Target::Pcre).unwrap();
        let reparsed = pcre(&text);
        assert_eq!(
            sorted(enumerate(&reparsed).unwrap()),
            sorted(enumerate(&node).unwrap()),
            "{} -> {}",
            pattern,
            text
        );
    }
}

#[test]
fn pcre_output_reparses_to_the_same_tree() {
    let patterns = [
        r"^\d+(?:\.\d*)?$",
        r"[^\s,]+",
        r"\bfoo\B",
        r"(a)(b)\2\1",
        r"[^a\D]",
        "(?s:.)x.",
        r"a*?b+?c??d{2,}?",
    ];
    for pattern in patterns {
        let node = pcre(pattern);
        let text = render(&node, Target::Pcre).unwrap();
        assert_eq!(pcre(&text), node, "{} -> {}", pattern, text);
    }
}

#[test]
fn backref_or_octal() {
    let eleven = "(x)".repeat(11);
    let Node::Sequence(elts) = pcre(&format!(r"{}\11", eleven)) else {
        panic!("expected a sequence");
    };
    assert_eq!(elts.last(), Some(&Node::Backref(11)));

    let few = "(x)".repeat(3);
    let Node::Sequence(elts) = pcre(&format!(r"{}\11", few)) else {
        panic!("expected a sequence");
    };
    assert_eq!(&elts[3..], &[Node::Backref(1), Node::literal("1")]);

    assert_eq!(pcre(r"\011"), Node::literal("\t"));
}

#[test]
fn negated_class_is_folded() {
    let expected = Node::union(vec![
        Node::literal("a"),
        Node::literal("b"),
        Node::literal("c"),
    ])
    .negate()
    .unwrap();
    assert_eq!(pcre("[^abc]"), expected);
    assert_eq!(emacs("[^abc]"), expected);
}

#[test]
fn enumeration_order() {
    assert_eq!(
        enumerate(&pcre("(a|b){2}")).unwrap(),
        vec!["aa", "ab", "ba", "bb"]
    );
    assert_eq!(enumerate(&emacs(r"\(a\|b\)\{2\}")).unwrap(), vec!["aa", "ab", "ba", "bb"]);
}

#[test]
fn unbounded_patterns_are_not_enumerated() {
    assert_eq!(enumerate(&pcre("a*")), Err(EnumerationError::Unbounded));
    assert_eq!(enumerate(&pcre("x(ab)+")), Err(EnumerationError::Unbounded));
}

#[test]
fn unsatisfiable_pattern_enumerates_nothing() {
    let node = Node::seq(vec![Node::literal("a"), Node::CharSet(CharSet::new())]);
    assert!(enumerate(&node).unwrap().is_empty());
    assert_eq!(
        render(&node, Target::Pcre).unwrap(),
        r"a[^\x00-\x{10ffff}]"
    );
}

#[test]
fn symbolic_outputs() {
    assert_eq!(
        roundtrip(r"\A(?:a|bc){2}?", Dialect::Pcre, Target::Rx).unwrap(),
        r#"(seq bos (= 2 (or "a" "bc")))"#
    );
    assert_eq!(
        roundtrip(r"\`\(?:a\|bc\)*?", Dialect::Emacs, Target::Rx).unwrap(),
        r#"(seq bos (*? (or "a" "bc")))"#
    );
    assert_eq!(
        roundtrip(r"[[:alpha:]_][[:alnum:]_]*", Dialect::Emacs, Target::Sre).unwrap(),
        r#"(: (or ("_") alpha) (* (or ("_") alnum)))"#
    );
    assert_eq!(
        roundtrip(r"\sw\cg", Dialect::Emacs, Target::Rx).unwrap(),
        "(seq (syntax word) (category greek))"
    );
}

#[test]
fn unsupported_output() {
    assert!(roundtrip("a+?", Dialect::Pcre, Target::Sre).is_err());
    assert!(matches!(
        roundtrip("(?:a|bc){2,3}?", Dialect::Pcre, Target::Rx),
        Err(Error::Unparse(UnparseError::LazyRepeat("rx")))
    ));
    assert!(roundtrip("x{2,}?", Dialect::Pcre, Target::Rx).is_err());
    assert!(roundtrip(r"\sw", Dialect::Emacs, Target::Sre).is_err());
    assert!(roundtrip(r"[^a\D]", Dialect::Pcre, Target::Rx).is_err());
    assert!(roundtrip(r"\=", Dialect::Emacs, Target::Pcre).is_err());
}

#[test]
fn parse_errors_carry_the_fragment() {
    let err = parse("ab(?<!x)", Dialect::Pcre).unwrap_err();
    assert_eq!(err.position, 2);
    assert!(err.to_string().contains("offset 2"));

    let err = parse(r"a\(b", Dialect::Emacs).unwrap_err();
    assert_eq!(err.position, 1);
}

#[test]
fn stacked_quantifiers_fail_cleanly() {
    let stars = format!("a{}", "*".repeat(20_000));
    let err = parse(&stars, Dialect::Pcre).unwrap_err();
    assert!(matches!(err.kind, ParseErrorKind::TooDeep(_)));

    let braces = format!("a{}", "{1}".repeat(20_000));
    assert!(roundtrip(&braces, Dialect::Pcre, Target::Rx).is_err());
}

#[test]
fn long_finite_repeat_is_refused() {
    assert_eq!(
        enumerate(&pcre("a{0,100000}")),
        Err(EnumerationError::TooLarge(rxtrans::enumerate::MAX_BYTES))
    );
}
