//! SRE, the Scheme regular expression notation.

use super::is_non_graphic;
use crate::ast::{Node, Repeat};
use crate::charset::CharSet;
use crate::error::UnparseError;

const DIALECT: &str = "SRE";

pub(super) fn render(node: &Node) -> Result<String, UnparseError> {
    let text = match node {
        Node::Epsilon => "(:)".to_string(),
        Node::Literal(text) => string(text),
        Node::Primitive(p) => p
            .sre()
            .ok_or(UnparseError::Primitive(p.rx(), DIALECT))?
            .to_string(),
        Node::Sequence(elts) => form(":", elts)?,
        Node::Choice(elts) => form("or", elts)?,
        Node::Repeat(repeat) => repetition(repeat)?,
        Node::Submatch(body) => format!("(submatch {})", render(body)?),
        Node::Backref(index) => format!("(backref {})", index),
        Node::SyntaxClass(class) => return Err(UnparseError::SyntaxClass(class.name(), DIALECT)),
        Node::CharCategory(category) => {
            return Err(UnparseError::CharCategory(category.name(), DIALECT))
        }
        Node::CharSet(set) => char_set(set)?,
        Node::Negation(inner) => format!("(~ {})", render(inner)?),
        Node::Intersection(elts) => form("&", elts)?,
    };
    Ok(text)
}

fn form(head: &str, elts: &[Node]) -> Result<String, UnparseError> {
    let mut out = format!("({}", head);
    for elt in elts {
        out.push(' ');
        out.push_str(&render(elt)?);
    }
    out.push(')');
    Ok(out)
}

fn repetition(repeat: &Repeat) -> Result<String, UnparseError> {
    if !repeat.greedy {
        return Err(UnparseError::LazyRepeat(DIALECT));
    }
    let body = render(&repeat.body)?;
    let text = match (repeat.from, repeat.to) {
        (0, None) => format!("(* {})", body),
        (1, None) => format!("(+ {})", body),
        (0, Some(1)) => format!("(? {})", body),
        (n, Some(m)) if n == m => format!("(= {} {})", n, body),
        (n, None) => format!("(>= {} {})", n, body),
        (n, Some(m)) => format!("(** {} {} {})", n, m, body),
    };
    Ok(text)
}

/// Explicit characters as `("abc")`, ranges as `(/ "az")`, classes by name,
/// joined with `or` when more than one part is present.
fn char_set(set: &CharSet) -> Result<String, UnparseError> {
    if let Some(c) = set.single_char() {
        return Ok(string(&c.to_string()));
    }
    let mut parts = Vec::new();
    if !set.chars().is_empty() {
        let chars: String = set.chars().iter().collect();
        parts.push(format!("({})", string(&chars)));
    }
    if !set.ranges().is_empty() {
        let bounds: String = set.ranges().iter().flat_map(|&(lo, hi)| [lo, hi]).collect();
        parts.push(format!("(/ {})", string(&bounds)));
    }
    for &class in set.classes() {
        if !class.in_sre() {
            return Err(UnparseError::PosixClass(class.name(), DIALECT));
        }
        parts.push(class.name().to_string());
    }
    if parts.len() == 1 {
        Ok(parts.remove(0))
    } else {
        Ok(format!("(or{})", parts.iter().map(|p| format!(" {}", p)).collect::<String>()))
    }
}

/// A Scheme string literal; other non-graphic characters use `\x<hex>;`.
fn string(text: &str) -> String {
    let mut out = String::from("\"");
    for c in text.chars() {
        match c {
            '"' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c if is_non_graphic(c) => out.push_str(&format!("\\x{:x};", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Primitive;
    use crate::charset::{PosixClass, SyntaxClass};

    fn lit(s: &str) -> Node {
        Node::literal(s)
    }

    fn set(s: &str) -> Node {
        Node::CharSet(CharSet::new().adjoin(s))
    }

    fn rep(from: u32, to: Option<u32>, body: Node) -> Node {
        Node::repeat(from, to, true, body).unwrap()
    }

    #[test]
    fn sequences_and_strings() {
        assert_eq!(render(&Node::Epsilon).unwrap(), "(:)");
        assert_eq!(
            render(&Node::seq(vec![Node::Primitive(Primitive::Bos), lit("a\"b")])).unwrap(),
            r#"(: bos "a\"b")"#
        );
        assert_eq!(render(&lit("\u{1b}")).unwrap(), r#""\x1b;""#);
    }

    #[test]
    fn repeat_forms() {
        let a = lit("a");
        assert_eq!(render(&rep(0, None, a.clone())).unwrap(), r#"(* "a")"#);
        assert_eq!(render(&rep(0, Some(1), a.clone())).unwrap(), r#"(? "a")"#);
        assert_eq!(render(&rep(4, Some(4), a.clone())).unwrap(), r#"(= 4 "a")"#);
        assert_eq!(render(&rep(1, Some(3), a.clone())).unwrap(), r#"(** 1 3 "a")"#);
        let lazy = Node::repeat(0, None, false, a).unwrap();
        assert_eq!(render(&lazy), Err(UnparseError::LazyRepeat("SRE")));
    }

    #[test]
    fn char_sets() {
        assert_eq!(render(&set("abc")).unwrap(), r#"("abc")"#);
        assert_eq!(
            render(&Node::CharSet(CharSet::from(('a', 'z')).adjoin(('0', '9')))).unwrap(),
            r#"(/ "az09")"#
        );
        assert_eq!(
            render(&Node::CharSet(CharSet::new().adjoin('_').adjoin(PosixClass::Alpha))).unwrap(),
            r#"(or ("_") alpha)"#
        );
        assert_eq!(
            render(&Node::CharSet(CharSet::from(PosixClass::Word))),
            Err(UnparseError::PosixClass("word", "SRE"))
        );
        assert_eq!(render(&Node::fail()).unwrap(), "(or)");
    }

    #[test]
    fn negation_and_intersection() {
        assert_eq!(render(&set("abc").negate().unwrap()).unwrap(), r#"(~ ("abc"))"#);
        let digit = Node::CharSet(CharSet::from(PosixClass::Digit));
        let node = Node::intersect(vec![digit, set("5").negate().unwrap()]).unwrap();
        assert_eq!(render(&node).unwrap(), r#"(& digit (~ "5"))"#);
    }

    #[test]
    fn word_primitives() {
        assert_eq!(
            render(&Node::Primitive(Primitive::Wordchar)).unwrap(),
            r#"(or alnum ("_"))"#
        );
        assert_eq!(
            render(&Node::Primitive(Primitive::WordBoundary)),
            Err(UnparseError::Primitive("word-boundary", "SRE"))
        );
    }

    #[test]
    fn emacs_only_classes() {
        assert_eq!(
            render(&Node::syntax(SyntaxClass::Word)),
            Err(UnparseError::SyntaxClass("word", "SRE"))
        );
    }
}
