use thiserror::Error;

/// Failure of a smart constructor in [`crate::ast`].
///
/// The parser validates its input before building nodes, so these only
/// surface when a tree is assembled by hand.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructError {
    #[error("repetition upper bound {to} is smaller than lower bound {from}")]
    InvertedRepeat { from: u32, to: u32 },
    #[error("backreference index must be at least 1")]
    ZeroBackref,
    #[error("cannot negate {0}: not a character set")]
    Negate(String),
    #[error("cannot intersect {0}: not a character set")]
    Intersect(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("unexpected end of pattern")]
    UnexpectedEnd,
    #[error("unmatched parenthesis")]
    UnmatchedParen,
    #[error("unterminated character class")]
    UnmatchedBracket,
    #[error("unknown POSIX character class")]
    UnknownPosixClass,
    #[error("malformed repetition braces")]
    BadRepetition,
    #[error("repetition bounds out of order")]
    InvertedRepetition,
    #[error("unrecognized inline modifier")]
    UnknownModifier,
    #[error("unsupported group construct")]
    UnsupportedGroup,
    #[error("collating elements are not supported")]
    CollatingElement,
    #[error("unknown syntax class")]
    UnknownSyntaxClass,
    #[error("unknown character category")]
    UnknownCategory,
    #[error("unsupported escape sequence")]
    BadEscape,
    #[error("backreference to a group that has not been opened")]
    UndefinedBackref,
    #[error("invalid character range")]
    BadRange,
    #[error("quantifier does not follow a repeatable item")]
    NothingToRepeat,
    #[error("pattern nests deeper than {0} levels")]
    TooDeep(usize),
    #[error(transparent)]
    Construct(#[from] ConstructError),
}

/// A pattern that could not be parsed.
///
/// `position` is the character offset where the offending construct starts
/// and `fragment` is the text found there.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at offset {position}: `{fragment}`")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub position: usize,
    pub fragment: String,
}

/// A node that has no representation in the requested output syntax.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnparseError {
    #[error("assertion `{0}` cannot be written in {1}")]
    Primitive(&'static str, &'static str),
    #[error("lazy repetition of this kind cannot be written in {0}")]
    LazyRepeat(&'static str),
    #[error("backreference \\{0} cannot be written in {1}")]
    BackrefIndex(u32, &'static str),
    #[error("intersection cannot be written in {0}")]
    Intersection(&'static str),
    #[error("character class [:{0}:] cannot be written in {1}")]
    PosixClass(&'static str, &'static str),
    #[error("syntax class `{0}` cannot be written in {1}")]
    SyntaxClass(&'static str, &'static str),
    #[error("character category `{0}` cannot be written in {1}")]
    CharCategory(&'static str, &'static str),
    #[error("negation of this element cannot be written in {0}")]
    Negation(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnumerationError {
    #[error("pattern contains unbounded repetition; its language is infinite")]
    Unbounded,
    #[error("character class [:{0}:] cannot be enumerated")]
    PosixClass(&'static str),
    #[error("{0} cannot be enumerated")]
    NotEnumerable(&'static str),
    #[error("pattern matches more than {0} strings")]
    TooMany(usize),
    #[error("strings matched by the pattern exceed {0} bytes in total")]
    TooLarge(usize),
}

/// Any failure of the translation pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Unparse(#[from] UnparseError),
    #[error(transparent)]
    Enumeration(#[from] EnumerationError),
}

/// A name that is not one of the output syntaxes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown output syntax `{0}` (expected pcre, rx or sre)")]
pub struct UnknownTarget(pub String);
