use crate::charset::{self, CharCategory, CharSet, SyntaxClass};
use crate::error::ConstructError;

/// Syntax-independent regular expression tree.
///
/// Build values with the constructors on `Node` (`seq`, `choice`, `repeat`,
/// `negate`, `intersect`, ...). They normalize as they go, and every
/// consumer of the tree relies on that:
///
/// - `Sequence` and `Choice` never directly contain their own kind and
///   never hold fewer than two elements.
/// - A `Sequence` holds no `Epsilon` and no two adjacent `Literal`s.
/// - A `Choice` holds no always-failing element, and is never made up
///   entirely of single characters and plain sets (those fold into one
///   `CharSet`).
/// - A `Negation` never wraps another `Negation`.
/// - An `Intersection` is never nested and carries at most one negated
///   plain set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Epsilon,
    Literal(String),
    Primitive(Primitive),
    Sequence(Vec<Node>),
    Choice(Vec<Node>),
    Repeat(Repeat),
    Submatch(Box<Node>),
    Backref(u32),
    SyntaxClass(SyntaxClass),
    CharCategory(CharCategory),
    CharSet(CharSet),
    Negation(Box<Node>),
    Intersection(Vec<Node>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repeat {
    pub from: u32,
    /// `None` repeats without an upper limit.
    pub to: Option<u32>,
    pub greedy: bool,
    pub body: Box<Node>,
}

/// Fixed assertions and built-in classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Bos,
    Eos,
    Bol,
    Eol,
    Anything,
    Nonl,
    WordBoundary,
    NotWordBoundary,
    Wordchar,
    NotWordchar,
    SymbolStart,
    SymbolEnd,
    Bow,
    Eow,
    Point,
}

impl Primitive {
    /// PCRE spelling, if PCRE has one.
    pub fn pcre(self) -> Option<&'static str> {
        match self {
            Primitive::Bos => Some(r"\A"),
            Primitive::Eos => Some(r"\z"),
            Primitive::Bol => Some("^"),
            Primitive::Eol => Some("$"),
            Primitive::Anything => Some("(?s:.)"),
            Primitive::Nonl => Some("."),
            Primitive::WordBoundary => Some(r"\b"),
            Primitive::NotWordBoundary => Some(r"\B"),
            Primitive::Wordchar => Some(r"\w"),
            Primitive::NotWordchar => Some(r"\W"),
            Primitive::SymbolStart
            | Primitive::SymbolEnd
            | Primitive::Bow
            | Primitive::Eow
            | Primitive::Point => None,
        }
    }

    /// `rx` symbol. Every primitive has one.
    pub fn rx(self) -> &'static str {
        match self {
            Primitive::Bos => "bos",
            Primitive::Eos => "eos",
            Primitive::Bol => "bol",
            Primitive::Eol => "eol",
            Primitive::Anything => "anything",
            Primitive::Nonl => "nonl",
            Primitive::WordBoundary => "word-boundary",
            Primitive::NotWordBoundary => "not-word-boundary",
            Primitive::Wordchar => "wordchar",
            Primitive::NotWordchar => "not-wordchar",
            Primitive::SymbolStart => "symbol-start",
            Primitive::SymbolEnd => "symbol-end",
            Primitive::Bow => "bow",
            Primitive::Eow => "eow",
            Primitive::Point => "point",
        }
    }

    /// SRE spelling, if SRE has one.
    pub fn sre(self) -> Option<&'static str> {
        match self {
            Primitive::Bos => Some("bos"),
            Primitive::Eos => Some("eos"),
            Primitive::Bol => Some("bol"),
            Primitive::Eol => Some("eol"),
            Primitive::Anything => Some("any"),
            Primitive::Nonl => Some("nonl"),
            Primitive::NotWordBoundary => Some("nwb"),
            Primitive::Wordchar => Some(r#"(or alnum ("_"))"#),
            Primitive::NotWordchar => Some(r#"(~ alnum ("_"))"#),
            Primitive::Bow => Some("bow"),
            Primitive::Eow => Some("eow"),
            Primitive::WordBoundary
            | Primitive::SymbolStart
            | Primitive::SymbolEnd
            | Primitive::Point => None,
        }
    }

    /// Assertions match the empty string; the rest consume one character.
    pub fn is_zero_width(self) -> bool {
        !matches!(
            self,
            Primitive::Anything | Primitive::Nonl | Primitive::Wordchar | Primitive::NotWordchar
        )
    }
}

impl Node {
    /// Matches `text` exactly; the empty string is [`Node::Epsilon`].
    pub fn literal(text: impl Into<String>) -> Node {
        let text = text.into();
        if text.is_empty() {
            Node::Epsilon
        } else {
            Node::Literal(text)
        }
    }

    /// The value that never matches: an empty character set.
    pub fn fail() -> Node {
        Node::CharSet(CharSet::new())
    }

    pub fn is_fail(&self) -> bool {
        matches!(self, Node::CharSet(set) if set.is_empty())
    }

    /// Longest chain of `Repeat` nodes nested inside one another.
    ///
    /// Example:
    /// - `(a*)+b?` → 2
    pub fn repeat_depth(&self) -> usize {
        match self {
            Node::Repeat(repeat) => 1 + repeat.body.repeat_depth(),
            Node::Sequence(elts) | Node::Choice(elts) | Node::Intersection(elts) => {
                elts.iter().map(Node::repeat_depth).max().unwrap_or(0)
            }
            Node::Submatch(body) | Node::Negation(body) => body.repeat_depth(),
            _ => 0,
        }
    }

    /// Concatenation.
    ///
    /// Example:
    /// - `seq([lit("a"), seq([lit("b"), Epsilon]), lit("c")])` → `Literal("abc")`
    pub fn seq(elts: impl IntoIterator<Item = Node>) -> Node {
        let mut out: Vec<Node> = Vec::new();
        for elt in elts {
            push_seq(&mut out, elt);
        }
        match out.len() {
            0 => Node::Epsilon,
            1 => out.remove(0),
            _ => Node::Sequence(out),
        }
    }

    /// Alternation.
    ///
    /// Examples:
    /// - `choice([])` → the failing empty set
    /// - `choice([lit("a"), CharSet("bc")])` → `CharSet("abc")`
    pub fn choice(elts: impl IntoIterator<Item = Node>) -> Node {
        let mut out: Vec<Node> = Vec::new();
        for elt in elts {
            match elt {
                Node::Choice(inner) => out.extend(inner),
                elt if elt.is_fail() => {}
                elt => out.push(elt),
            }
        }
        if out.len() > 1 && out.iter().all(|elt| charset::as_plain_set(elt).is_some()) {
            let folded = out
                .iter()
                .filter_map(charset::as_plain_set)
                .fold(CharSet::new(), |acc, set| acc.adjoin(set));
            return Node::CharSet(folded);
        }
        match out.len() {
            0 => Node::fail(),
            1 => out.remove(0),
            _ => Node::Choice(out),
        }
    }

    /// Repetition of `body` between `from` and `to` times.
    pub fn repeat(from: u32, to: Option<u32>, greedy: bool, body: Node) -> Result<Node, ConstructError> {
        match to {
            Some(to) if to < from => Err(ConstructError::InvertedRepeat { from, to }),
            Some(0) => Ok(Node::Epsilon),
            _ => Ok(Node::Repeat(Repeat {
                from,
                to,
                greedy,
                body: Box::new(body),
            })),
        }
    }

    pub fn submatch(body: Node) -> Node {
        Node::Submatch(Box::new(body))
    }

    pub fn backref(index: u32) -> Result<Node, ConstructError> {
        if index == 0 {
            return Err(ConstructError::ZeroBackref);
        }
        Ok(Node::Backref(index))
    }

    pub fn syntax(class: SyntaxClass) -> Node {
        Node::SyntaxClass(class)
    }

    pub fn category(category: CharCategory) -> Node {
        Node::CharCategory(category)
    }

    /// See [`charset::negate`].
    pub fn negate(self) -> Result<Node, ConstructError> {
        charset::negate(self)
    }

    /// See [`charset::intersection`].
    pub fn intersect(elts: impl IntoIterator<Item = Node>) -> Result<Node, ConstructError> {
        charset::intersection(elts)
    }

    /// See [`charset::union`].
    pub fn union(elts: impl IntoIterator<Item = Node>) -> Node {
        charset::union(elts)
    }
}

fn push_seq(out: &mut Vec<Node>, elt: Node) {
    match elt {
        Node::Epsilon => {}
        Node::Sequence(inner) => {
            for elt in inner {
                push_seq(out, elt);
            }
        }
        Node::Literal(text) => match out.last_mut() {
            Some(Node::Literal(prev)) => prev.push_str(&text),
            _ => out.push(Node::Literal(text)),
        },
        elt => out.push(elt),
    }
}
