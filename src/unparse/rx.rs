//! The `rx` list form used by Emacs Lisp.

use super::is_non_graphic;
use crate::ast::{Node, Repeat};
use crate::charset::CharSet;
use crate::error::UnparseError;

const DIALECT: &str = "rx";

pub(super) fn render(node: &Node) -> Result<String, UnparseError> {
    let text = match node {
        Node::Epsilon => "(seq)".to_string(),
        Node::Literal(text) => string(text),
        Node::Primitive(p) => p.rx().to_string(),
        Node::Sequence(elts) => form("seq", elts)?,
        Node::Choice(elts) => form("or", elts)?,
        Node::Repeat(repeat) => repetition(repeat)?,
        Node::Submatch(body) => format!("(submatch {})", render(body)?),
        Node::Backref(index) => format!("(backref {})", index),
        Node::SyntaxClass(class) => format!("(syntax {})", class.name()),
        Node::CharCategory(category) => format!("(category {})", category.name()),
        Node::CharSet(set) if set.is_empty() => "(or)".to_string(),
        Node::CharSet(set) => match set.single_char() {
            Some(c) => string(&c.to_string()),
            None => char_set(set),
        },
        Node::Negation(inner) => match inner.as_ref() {
            Node::CharSet(set) if set.is_empty() => "anything".to_string(),
            Node::CharSet(set) => format!("(not {})", char_set(set)),
            other => format!("(not {})", render(other)?),
        },
        Node::Intersection(_) => return Err(UnparseError::Intersection(DIALECT)),
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
    let body = render(&repeat.body)?;
    let greedy_form = match (repeat.from, repeat.to) {
        (0, None) => format!("(* {})", body),
        (1, None) => format!("(+ {})", body),
        (0, Some(1)) => format!("(opt {})", body),
        (n, Some(m)) if n == m => format!("(= {} {})", n, body),
        (n, None) => format!("(>= {} {})", n, body),
        (n, Some(m)) => format!("(repeat {} {} {})", n, m, body),
    };
    if repeat.greedy {
        return Ok(greedy_form);
    }
    // `minimal-match` does not reach `=`, `>=` or `repeat`. An exact count
    // matches the same lazy or greedy.
    match (repeat.from, repeat.to) {
        (0, None) => Ok(format!("(*? {})", body)),
        (1, None) => Ok(format!("(+? {})", body)),
        (0, Some(1)) => Ok(format!("(\\?? {})", body)),
        (n, Some(m)) if n == m => Ok(greedy_form),
        _ => Err(UnparseError::LazyRepeat(DIALECT)),
    }
}

/// `(any ...)`, or the bare name of a lone class.
fn char_set(set: &CharSet) -> String {
    if let Some(class) = set.single_class() {
        return class.name().to_string();
    }
    let mut out = String::from("(any");
    for &c in set.chars() {
        out.push(' ');
        out.push_str(&char_literal(c));
    }
    for &(lo, hi) in set.ranges() {
        out.push_str(&format!(" ({} . {})", char_literal(lo), char_literal(hi)));
    }
    for &class in set.classes() {
        out.push(' ');
        out.push_str(class.name());
    }
    out.push(')');
    out
}

/// An Emacs Lisp string literal.
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
            c if is_non_graphic(c) => out.push_str(&named_char(c)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// An Emacs Lisp character literal such as `?a` or `?\(`.
fn char_literal(c: char) -> String {
    match c {
        ' ' => "?\\s".to_string(),
        '\n' => "?\\n".to_string(),
        '\t' => "?\\t".to_string(),
        '(' | ')' | '[' | ']' | '\\' | ';' | '"' | '\'' | '#' | ',' | '`' | '.' | '?' => {
            format!("?\\{}", c)
        }
        c if is_non_graphic(c) => format!("?{}", named_char(c)),
        c => format!("?{}", c),
    }
}

fn named_char(c: char) -> String {
    format!("\\N{{U+{:04X}}}", c as u32)
}
