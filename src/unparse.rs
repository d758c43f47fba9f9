//! Rendering a [`Node`] back into text.
//!
//! PCRE output is infix, so its renderer tracks how tightly each fragment
//! binds and parenthesizes children that bind too loosely for their place.
//! The `rx` and SRE forms are fully bracketed lists and never need that.

mod pcre;
mod rx;
mod sre;

use log::debug;

use crate::ast::Node;
use crate::error::UnparseError;
use crate::Target;

/// How loosely a rendered fragment binds, from tightest to loosest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    /// Already bracketed: a group, a class, `(?s:.)`.
    Atom,
    /// Can take a quantifier as is: one character, an escape, an assertion.
    Piece,
    /// A concatenation; must be grouped before it is quantified.
    Branch,
    /// An alternation; must be grouped before concatenation too.
    Top,
}

/// Text of a rendered node together with its [`Level`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub text: String,
    pub level: Level,
}

impl Rendered {
    pub fn new(text: impl Into<String>, level: Level) -> Self {
        Self {
            text: text.into(),
            level,
        }
    }

    /// The text, in a non-capturing group if it binds looser than `max`.
    pub fn at_most(self, max: Level) -> String {
        if self.level > max {
            format!("(?:{})", self.text)
        } else {
            self.text
        }
    }
}

/// Renders `node` in the `target` syntax.
///
/// Examples:
/// - `(ab|cd)*` → PCRE `(ab|cd)*`, rx `(* (submatch (or "ab" "cd")))`
/// - `[^abc]` → SRE `(~ ("abc"))`
pub fn render(node: &Node, target: Target) -> Result<String, UnparseError> {
    let result = match target {
        Target::Pcre => pcre::render(node).map(|rendered| rendered.text),
        Target::Rx => rx::render(node),
        Target::Sre => sre::render(node),
    };
    if let Err(err) = &result {
        debug!("cannot render as {:?}: {}", target, err);
    }
    result
}

/// Quantifier suffix shared by PCRE: `*`, `+`, `?`, `{n}`, `{n,}`, `{n,m}`.
pub(crate) fn quantifier(from: u32, to: Option<u32>) -> String {
    match (from, to) {
        (0, None) => "*".to_string(),
        (1, None) => "+".to_string(),
        (0, Some(1)) => "?".to_string(),
        (n, None) => format!("{{{},}}", n),
        (n, Some(m)) if n == m => format!("{{{}}}", n),
        (n, Some(m)) => format!("{{{},{}}}", n, m),
    }
}

/// Characters that render as escapes rather than as themselves.
pub(crate) fn is_non_graphic(c: char) -> bool {
    c.is_control() || (c.is_whitespace() && c != ' ')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_ordered() {
        assert!(Level::Atom < Level::Piece);
        assert!(Level::Piece < Level::Branch);
        assert!(Level::Branch < Level::Top);
    }

    #[test]
    fn wrapping() {
        assert_eq!(Rendered::new("a|b", Level::Top).at_most(Level::Branch), "(?:a|b)");
        assert_eq!(Rendered::new("ab", Level::Branch).at_most(Level::Branch), "ab");
    }

    #[test]
    fn quantifier_table() {
        assert_eq!(quantifier(0, None), "*");
        assert_eq!(quantifier(1, None), "+");
        assert_eq!(quantifier(0, Some(1)), "?");
        assert_eq!(quantifier(3, None), "{3,}");
        assert_eq!(quantifier(2, Some(2)), "{2}");
        assert_eq!(quantifier(1, Some(1)), "{1}");
        assert_eq!(quantifier(2, Some(5)), "{2,5}");
    }
}
