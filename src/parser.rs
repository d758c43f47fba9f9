//! Recursive descent parsers for Emacs and PCRE syntax.
//!
//! Both grammars share one shape:
//!
//! ```text
//! expression ::= branch ( ALT branch )*
//! branch     ::= piece*
//! piece      ::= atom quantifier*
//! atom       ::= literal | class | group | assertion | escape
//! ```
//!
//! and the same [`Scanner`]; they differ in their tokens and escapes.

mod emacs;
mod pcre;

use log::debug;

use crate::ast::Node;
use crate::charset::{CharSet, PosixClass};
use crate::error::{ConstructError, ParseError, ParseErrorKind};
use crate::Dialect;

/// Deepest group nesting accepted before parsing gives up.
pub const MAX_DEPTH: usize = 200;

/// Parses `pattern` written in `dialect`.
///
/// Examples:
/// - `parse(r"a\|b", Dialect::Emacs)` → `CharSet("ab")`
/// - `parse("(a|b){2}", Dialect::Pcre)` → `Repeat { 2, 2, Submatch(CharSet("ab")) }`
pub fn parse(pattern: &str, dialect: Dialect) -> Result<Node, ParseError> {
    let result = match dialect {
        Dialect::Emacs => emacs::EmacsParser::new(pattern).parse(),
        Dialect::Pcre => pcre::PcreParser::new(pattern).parse(),
    };
    match &result {
        Ok(_) => debug!("parsed {} chars of {:?} syntax", pattern.chars().count(), dialect),
        Err(err) => debug!("failed to parse {:?} syntax: {}", dialect, err),
    }
    result
}

/// Cursor over an immutable pattern.
pub(crate) struct Scanner {
    chars: Vec<char>,
    pos: usize,
}

/// Raw contents of a brace quantifier; which parts may be missing is up to
/// the dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Bounds {
    pub min: Option<u32>,
    pub comma: bool,
    pub max: Option<u32>,
}

impl Scanner {
    pub fn new(pattern: &str) -> Self {
        Self {
            chars: pattern.chars().collect(),
            pos: 0,
        }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    /// Peek at the next character without advancing.
    pub fn peek(&self) -> Option<char> {
        self.peek_at(0)
    }

    pub fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    /// Advance by one character and return it.
    pub fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        Some(ch)
    }

    /// Advance past `expected` if it is next.
    pub fn expect(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub fn looking_at(&self, s: &str) -> bool {
        let mut offset = 0;
        for c in s.chars() {
            if self.peek_at(offset) != Some(c) {
                return false;
            }
            offset += 1;
        }
        true
    }

    /// Advance past `s` if it is next.
    pub fn eat(&mut self, s: &str) -> bool {
        if self.looking_at(s) {
            self.pos += s.chars().count();
            true
        } else {
            false
        }
    }

    /// The run of ASCII digits at the cursor, not consumed.
    pub fn digit_run(&self) -> String {
        self.chars[self.pos..]
            .iter()
            .take_while(|c| c.is_ascii_digit())
            .collect()
    }

    pub fn seek(&mut self, pos: usize) {
        self.pos = pos.min(self.chars.len());
    }

    pub fn skip(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.chars.len());
    }

    fn number(&mut self, start: usize) -> Result<Option<u32>, ParseError> {
        let digits = self.digit_run();
        if digits.is_empty() {
            return Ok(None);
        }
        self.skip(digits.len());
        digits
            .parse()
            .map(Some)
            .map_err(|_| self.error(ParseErrorKind::BadRepetition, start))
    }

    /// Reads `open min? (, max?)? close` at the cursor.
    ///
    /// Returns `None`, with the cursor untouched, when the text there does
    /// not have that shape.
    pub fn bounds(&mut self, open: &str, close: &str) -> Result<Option<Bounds>, ParseError> {
        let start = self.pos;
        if !self.eat(open) {
            return Ok(None);
        }
        let min = self.number(start)?;
        let comma = self.expect(',');
        let max = if comma { self.number(start)? } else { None };
        if self.eat(close) {
            Ok(Some(Bounds { min, comma, max }))
        } else {
            self.pos = start;
            Ok(None)
        }
    }

    /// Reads a bracketed class name such as `[:alpha:]` at the cursor.
    ///
    /// Returns `None`, with the cursor untouched, when `[` does not start a
    /// well-formed `[:...:]`; the caller then takes it literally. A leading
    /// `^` inside the name negates the class when `allow_negated` is set.
    pub fn posix_class(&mut self, allow_negated: bool) -> Result<Option<Node>, ParseError> {
        let start = self.pos;
        if self.looking_at("[.") || self.looking_at("[=") {
            return Err(self.error(ParseErrorKind::CollatingElement, start));
        }
        if !self.looking_at("[:") {
            return Ok(None);
        }
        let mut end = start + 2;
        while end < self.chars.len() && self.chars[end] != ':' && self.chars[end] != ']' {
            end += 1;
        }
        if self.chars.get(end) != Some(&':') || self.chars.get(end + 1) != Some(&']') {
            return Ok(None);
        }

        let name: String = self.chars[start + 2..end].iter().collect();
        self.pos = end + 2;
        let (negated, name) = match name.strip_prefix('^') {
            Some(rest) if allow_negated => (true, rest),
            _ => (false, name.as_str()),
        };
        let class = PosixClass::from_name(name)
            .ok_or_else(|| self.error(ParseErrorKind::UnknownPosixClass, start))?;
        let node = Node::CharSet(CharSet::from(class));
        if negated {
            node.negate()
                .map(Some)
                .map_err(|err| self.error(err.into(), start))
        } else {
            Ok(Some(node))
        }
    }

    /// Builds an error for the construct starting at `start`.
    pub fn error(&self, kind: ParseErrorKind, start: usize) -> ParseError {
        let start = start.min(self.chars.len());
        let end = self.pos.max(start + 1).min(self.chars.len());
        ParseError {
            kind,
            position: start,
            fragment: self.chars[start..end].iter().collect(),
        }
    }
}

/// Assembles the pieces of a bracket expression.
///
/// A positive class is the union of its pieces. A negated one is the
/// intersection of each piece's complement, so `[^abc]` folds to the
/// complement of `{a, b, c}`.
pub(crate) fn build_class(negated: bool, pieces: Vec<Node>) -> Result<Node, ConstructError> {
    if negated {
        let complements = pieces
            .into_iter()
            .map(Node::negate)
            .collect::<Result<Vec<_>, _>>()?;
        Node::intersect(complements)
    } else {
        Ok(Node::union(pieces))
    }
}

/// Checks `from <= to` before a repetition is built.
pub(crate) fn check_bounds(
    scan: &Scanner,
    from: u32,
    to: Option<u32>,
    start: usize,
) -> Result<(), ParseError> {
    match to {
        Some(to) if to < from => Err(scan.error(ParseErrorKind::InvertedRepetition, start)),
        _ => Ok(()),
    }
}
