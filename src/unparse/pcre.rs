//! PCRE output.

use super::{is_non_graphic, quantifier, Level, Rendered};
use crate::ast::{Node, Primitive, Repeat};
use crate::charset::{CharSet, PosixClass, SyntaxClass};
use crate::error::UnparseError;

const DIALECT: &str = "PCRE";

/// Matches nothing: the complement of every character.
const NOTHING: &str = r"[^\x00-\x{10ffff}]";
const EVERYTHING: &str = r"[\x00-\x{10ffff}]";

pub(super) fn render(node: &Node) -> Result<Rendered, UnparseError> {
    match node {
        Node::Epsilon => Ok(Rendered::new("", Level::Branch)),
        Node::Literal(text) => {
            let escaped: String = text.chars().map(escape_char).collect();
            let level = if text.chars().count() == 1 {
                Level::Piece
            } else {
                Level::Branch
            };
            Ok(Rendered::new(escaped, level))
        }
        Node::Primitive(p) => {
            let text = p.pcre().ok_or(UnparseError::Primitive(p.rx(), DIALECT))?;
            let level = if *p == Primitive::Anything {
                Level::Atom
            } else {
                Level::Piece
            };
            Ok(Rendered::new(text, level))
        }
        Node::Sequence(elts) => sequence(elts),
        Node::Choice(elts) => choice(elts),
        Node::Repeat(repeat) => repetition(repeat),
        Node::Submatch(body) => {
            let body = render(body)?;
            Ok(Rendered::new(format!("({})", body.text), Level::Atom))
        }
        Node::Backref(index) => {
            if *index > 9 {
                return Err(UnparseError::BackrefIndex(*index, DIALECT));
            }
            Ok(Rendered::new(format!("\\{}", index), Level::Piece))
        }
        Node::SyntaxClass(class) => syntax_class(*class, false).map(|s| Rendered::new(s, Level::Piece)),
        Node::CharCategory(category) => Err(UnparseError::CharCategory(category.name(), DIALECT)),
        Node::CharSet(set) => char_set(set),
        Node::Negation(inner) => negation(inner),
        Node::Intersection(elts) => {
            let mut items = String::new();
            for elt in elts {
                let complement = negated_items(elt).ok_or(UnparseError::Intersection(DIALECT))??;
                items.push_str(&complement);
            }
            Ok(Rendered::new(format!("[^{}]", items), Level::Atom))
        }
    }
}

fn sequence(elts: &[Node]) -> Result<Rendered, UnparseError> {
    let rendered = elts
        .iter()
        .map(|elt| render(elt).map(|r| r.at_most(Level::Branch)))
        .collect::<Result<Vec<_>, _>>()?;

    let mut text = String::new();
    for (i, (elt, part)) in elts.iter().zip(&rendered).enumerate() {
        // `\1` then `2` would read back as `\12`.
        let digit_follows = rendered
            .get(i + 1)
            .and_then(|next| next.chars().next())
            .is_some_and(|c| c.is_ascii_digit());
        if matches!(elt, Node::Backref(_)) && digit_follows {
            text.push_str(&format!("(?:{})", part));
        } else {
            text.push_str(part);
        }
    }
    Ok(Rendered::new(text, Level::Branch))
}

fn choice(elts: &[Node]) -> Result<Rendered, UnparseError> {
    if let Some(items) = bracket_items(elts) {
        return Ok(Rendered::new(format!("[{}]", items?), Level::Atom));
    }
    let branches = elts
        .iter()
        .map(|elt| render(elt).map(|r| r.at_most(Level::Branch)))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Rendered::new(branches.join("|"), Level::Top))
}

fn repetition(repeat: &Repeat) -> Result<Rendered, UnparseError> {
    let body = render(&repeat.body)?;
    let body = if matches!(*repeat.body, Node::Repeat(_)) {
        format!("(?:{})", body.text)
    } else {
        body.at_most(Level::Piece)
    };
    let lazy = if repeat.greedy { "" } else { "?" };
    Ok(Rendered::new(
        format!("{}{}{}", body, quantifier(repeat.from, repeat.to), lazy),
        Level::Piece,
    ))
}

fn char_set(set: &CharSet) -> Result<Rendered, UnparseError> {
    if set.is_empty() {
        return Ok(Rendered::new(NOTHING, Level::Atom));
    }
    if let Some(c) = set.single_char() {
        return Ok(Rendered::new(escape_char(c), Level::Piece));
    }
    if let Some(short) = set.single_class().and_then(|class| shorthand(class, false)) {
        return Ok(Rendered::new(short, Level::Piece));
    }
    Ok(Rendered::new(format!("[{}]", set_items(set)?), Level::Atom))
}

fn negation(inner: &Node) -> Result<Rendered, UnparseError> {
    match inner {
        Node::CharSet(set) if set.is_empty() => Ok(Rendered::new(EVERYTHING, Level::Atom)),
        Node::CharSet(set) => {
            if let Some(short) = set.single_class().and_then(|class| shorthand(class, true)) {
                return Ok(Rendered::new(short, Level::Piece));
            }
            Ok(Rendered::new(format!("[^{}]", set_items(set)?), Level::Atom))
        }
        Node::SyntaxClass(class) => syntax_class(*class, true).map(|s| Rendered::new(s, Level::Piece)),
        Node::CharCategory(category) => Err(UnparseError::CharCategory(category.name(), DIALECT)),
        _ => Err(UnparseError::Negation(DIALECT)),
    }
}

fn syntax_class(class: SyntaxClass, negated: bool) -> Result<String, UnparseError> {
    let text = match (class, negated) {
        (SyntaxClass::Word, false) => r"\w",
        (SyntaxClass::Word, true) => r"\W",
        (SyntaxClass::Whitespace, false) => r"\s",
        (SyntaxClass::Whitespace, true) => r"\S",
        _ => return Err(UnparseError::SyntaxClass(class.name(), DIALECT)),
    };
    Ok(text.to_string())
}

fn shorthand(class: PosixClass, negated: bool) -> Option<String> {
    let letter = match class {
        PosixClass::Digit => 'd',
        PosixClass::Space => 's',
        PosixClass::Word => 'w',
        _ => return None,
    };
    let letter = if negated {
        letter.to_ascii_uppercase()
    } else {
        letter
    };
    Some(format!("\\{}", letter))
}

/// Body of a bracket expression for a plain set.
fn set_items(set: &CharSet) -> Result<String, UnparseError> {
    let mut out = String::new();
    for &c in set.chars() {
        out.push_str(&escape_class_char(c));
    }
    for &(lo, hi) in set.ranges() {
        out.push_str(&format!("{}-{}", escape_class_char(lo), escape_class_char(hi)));
    }
    for &class in set.classes() {
        if !class.in_pcre() {
            return Err(UnparseError::PosixClass(class.name(), DIALECT));
        }
        out.push_str(&format!("[:{}:]", class.name()));
    }
    Ok(out)
}

/// Bracket items for a char-set-like node, or `None` if it has no form that
/// can sit inside `[...]`.
fn items(node: &Node) -> Option<Result<String, UnparseError>> {
    match node {
        Node::CharSet(set) if !set.is_empty() => Some(set_items(set)),
        Node::Literal(text) if text.chars().count() == 1 => {
            text.chars().next().map(|c| Ok(escape_class_char(c)))
        }
        Node::Primitive(Primitive::Wordchar) => Some(Ok(r"\w".to_string())),
        Node::Primitive(Primitive::NotWordchar) => Some(Ok(r"\W".to_string())),
        Node::SyntaxClass(class) => syntax_class(*class, false).ok().map(Ok),
        Node::Negation(inner) => negated_items(inner),
        _ => None,
    }
}

/// Bracket items for the complement of `node`.
fn negated_items(node: &Node) -> Option<Result<String, UnparseError>> {
    match node {
        Node::Negation(inner) => items(inner),
        Node::CharSet(set) => {
            let class = set.single_class()?;
            if let Some(short) = shorthand(class, true) {
                return Some(Ok(short));
            }
            if !class.in_pcre() {
                return Some(Err(UnparseError::PosixClass(class.name(), DIALECT)));
            }
            Some(Ok(format!("[:^{}:]", class.name())))
        }
        Node::Primitive(Primitive::Wordchar) => Some(Ok(r"\W".to_string())),
        Node::Primitive(Primitive::NotWordchar) => Some(Ok(r"\w".to_string())),
        Node::SyntaxClass(class) => syntax_class(*class, true).ok().map(Ok),
        _ => None,
    }
}

/// One bracket expression for a choice of char-set-like elements, if every
/// element has bracket items.
fn bracket_items(elts: &[Node]) -> Option<Result<String, UnparseError>> {
    let mut out = String::new();
    for elt in elts {
        match items(elt)? {
            Ok(s) => out.push_str(&s),
            Err(err) => return Some(Err(err)),
        }
    }
    Some(Ok(out))
}

fn escape_char(c: char) -> String {
    match c {
        '\\' | '.' | '^' | '$' | '|' | '?' | '*' | '+' | '(' | ')' | '[' | ']' | '{' | '}' => {
            format!("\\{}", c)
        }
        c if is_non_graphic(c) => hex(c),
        c => c.to_string(),
    }
}

fn escape_class_char(c: char) -> String {
    match c {
        '\\' | ']' | '[' | '^' | '-' => format!("\\{}", c),
        c if is_non_graphic(c) => hex(c),
        c => c.to_string(),
    }
}

fn hex(c: char) -> String {
    let code = c as u32;
    if code <= 0xff {
        format!("\\x{:02x}", code)
    } else {
        format!("\\x{{{:x}}}", code)
    }
}
