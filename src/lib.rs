//! Translation of regular expressions between Emacs syntax, PCRE and the
//! `rx` and SRE list forms, by way of one syntax-independent tree.

pub mod ast;
pub mod charset;
pub mod enumerate;
pub mod error;
pub mod parser;
pub mod unparse;

use std::fmt;
use std::str::FromStr;

use log::debug;

pub use ast::{Node, Primitive, Repeat};
pub use charset::{CharCategory, CharSet, PosixClass, SyntaxClass};
pub use error::{
    ConstructError, EnumerationError, Error, ParseError, ParseErrorKind, UnknownTarget, UnparseError,
};

/// Input syntaxes understood by [`parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Emacs,
    Pcre,
}

/// Output syntaxes produced by [`render`].
///
/// Emacs string syntax is not among them: it comes from handing the `rx`
/// form to Emacs itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Pcre,
    Rx,
    Sre,
}

impl FromStr for Target {
    type Err = UnknownTarget;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pcre" => Ok(Target::Pcre),
            "rx" => Ok(Target::Rx),
            "sre" => Ok(Target::Sre),
            _ => Err(UnknownTarget(s.to_string())),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Target::Pcre => "pcre",
            Target::Rx => "rx",
            Target::Sre => "sre",
        };
        f.write_str(name)
    }
}

pub fn parse(pattern: &str, dialect: Dialect) -> Result<Node, ParseError> {
    parser::parse(pattern, dialect)
}

pub fn render(node: &Node, target: Target) -> Result<String, UnparseError> {
    unparse::render(node, target)
}

pub fn enumerate(node: &Node) -> Result<Vec<String>, EnumerationError> {
    enumerate::enumerate(node)
}

/// Parses `pattern` as `from` and renders it as `to`.
///
/// Example:
/// - `roundtrip(r"\(ab\|cd\)*", Dialect::Emacs, Target::Pcre)` → `"(ab|cd)*"`
pub fn roundtrip(pattern: &str, from: Dialect, to: Target) -> Result<String, Error> {
    debug!("translating {:?} syntax to {}", from, to);
    let node = parse(pattern, from)?;
    Ok(render(&node, to)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_names() {
        assert_eq!("PCRE".parse::<Target>(), Ok(Target::Pcre));
        assert_eq!("rx".parse::<Target>(), Ok(Target::Rx));
        assert_eq!(Target::Sre.to_string(), "sre");
        assert_eq!(
            "perl".parse::<Target>(),
            Err(UnknownTarget("perl".to_string()))
        );
    }

    #[test]
    fn emacs_to_pcre() {
        assert_eq!(
            roundtrip(r"\(ab\|cd\)*", Dialect::Emacs, Target::Pcre).unwrap(),
            "(ab|cd)*"
        );
        assert_eq!(
            roundtrip(r"^foo\.el\'", Dialect::Emacs, Target::Pcre).unwrap(),
            r"^foo\.el\z"
        );
    }

    #[test]
    fn pcre_to_rx() {
        assert_eq!(
            roundtrip(r"\bfo+\d?", Dialect::Pcre, Target::Rx).unwrap(),
            r#"(seq word-boundary "f" (+ "o") (opt digit))"#
        );
    }

    #[test]
    fn errors_are_wrapped() {
        assert!(matches!(
            roundtrip("(?=x)", Dialect::Pcre, Target::Rx),
            Err(Error::Parse(_))
        ));
        assert!(matches!(
            roundtrip(r"\_<x", Dialect::Emacs, Target::Pcre),
            Err(Error::Unparse(UnparseError::Primitive("symbol-start", "PCRE")))
        ));
    }
}
