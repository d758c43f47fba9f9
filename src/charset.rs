//! Character-set values and the algebra over them.
//!
//! A [`CharSet`] is a plain union of explicit characters, ranges and named
//! POSIX classes. Everything that cannot be folded into one (complements,
//! intersections, syntax classes) stays symbolic as a [`Node`].

use crate::ast::{Node, Primitive};
use crate::error::ConstructError;

/// Named character classes, as written inside `[:...:]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PosixClass {
    Alnum,
    Alpha,
    Ascii,
    Blank,
    Cntrl,
    Digit,
    Graph,
    Lower,
    Multibyte,
    Nonascii,
    Print,
    Punct,
    Space,
    Unibyte,
    Upper,
    Word,
    Xdigit,
}

impl PosixClass {
    pub const ALL: [PosixClass; 17] = [
        PosixClass::Alnum,
        PosixClass::Alpha,
        PosixClass::Ascii,
        PosixClass::Blank,
        PosixClass::Cntrl,
        PosixClass::Digit,
        PosixClass::Graph,
        PosixClass::Lower,
        PosixClass::Multibyte,
        PosixClass::Nonascii,
        PosixClass::Print,
        PosixClass::Punct,
        PosixClass::Space,
        PosixClass::Unibyte,
        PosixClass::Upper,
        PosixClass::Word,
        PosixClass::Xdigit,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PosixClass::Alnum => "alnum",
            PosixClass::Alpha => "alpha",
            PosixClass::Ascii => "ascii",
            PosixClass::Blank => "blank",
            PosixClass::Cntrl => "cntrl",
            PosixClass::Digit => "digit",
            PosixClass::Graph => "graph",
            PosixClass::Lower => "lower",
            PosixClass::Multibyte => "multibyte",
            PosixClass::Nonascii => "nonascii",
            PosixClass::Print => "print",
            PosixClass::Punct => "punct",
            PosixClass::Space => "space",
            PosixClass::Unibyte => "unibyte",
            PosixClass::Upper => "upper",
            PosixClass::Word => "word",
            PosixClass::Xdigit => "xdigit",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|class| class.name() == name)
    }

    /// Whether PCRE knows this class inside `[:...:]`.
    pub fn in_pcre(self) -> bool {
        !matches!(
            self,
            PosixClass::Multibyte | PosixClass::Nonascii | PosixClass::Unibyte
        )
    }

    /// Whether SRE has a class of the same name.
    pub fn in_sre(self) -> bool {
        !matches!(
            self,
            PosixClass::Multibyte | PosixClass::Nonascii | PosixClass::Unibyte | PosixClass::Word
        )
    }
}

/// Emacs syntax classes, selected by the character after `\s`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxClass {
    Whitespace,
    Punctuation,
    Word,
    Symbol,
    OpenParenthesis,
    CloseParenthesis,
    ExpressionPrefix,
    StringQuote,
    PairedDelimiter,
    Escape,
    CharacterQuote,
    CommentStart,
    CommentEnd,
    StringDelimiter,
    CommentDelimiter,
}

impl SyntaxClass {
    pub fn from_code(code: char) -> Option<Self> {
        let class = match code {
            '-' | ' ' => SyntaxClass::Whitespace,
            '.' => SyntaxClass::Punctuation,
            'w' => SyntaxClass::Word,
            '_' => SyntaxClass::Symbol,
            '(' => SyntaxClass::OpenParenthesis,
            ')' => SyntaxClass::CloseParenthesis,
            '\'' => SyntaxClass::ExpressionPrefix,
            '"' => SyntaxClass::StringQuote,
            '$' => SyntaxClass::PairedDelimiter,
            '\\' => SyntaxClass::Escape,
            '/' => SyntaxClass::CharacterQuote,
            '<' => SyntaxClass::CommentStart,
            '>' => SyntaxClass::CommentEnd,
            '|' => SyntaxClass::StringDelimiter,
            '!' => SyntaxClass::CommentDelimiter,
            _ => return None,
        };
        Some(class)
    }

    pub fn name(self) -> &'static str {
        match self {
            SyntaxClass::Whitespace => "whitespace",
            SyntaxClass::Punctuation => "punctuation",
            SyntaxClass::Word => "word",
            SyntaxClass::Symbol => "symbol",
            SyntaxClass::OpenParenthesis => "open-parenthesis",
            SyntaxClass::CloseParenthesis => "close-parenthesis",
            SyntaxClass::ExpressionPrefix => "expression-prefix",
            SyntaxClass::StringQuote => "string-quote",
            SyntaxClass::PairedDelimiter => "paired-delimiter",
            SyntaxClass::Escape => "escape",
            SyntaxClass::CharacterQuote => "character-quote",
            SyntaxClass::CommentStart => "comment-start",
            SyntaxClass::CommentEnd => "comment-end",
            SyntaxClass::StringDelimiter => "string-delimiter",
            SyntaxClass::CommentDelimiter => "comment-delimiter",
        }
    }
}

const CATEGORIES: &[(char, &str)] = &[
    (' ', "space-for-indent"),
    ('.', "base"),
    ('0', "consonant"),
    ('1', "base-vowel"),
    ('2', "upper-diacritical-mark"),
    ('3', "lower-diacritical-mark"),
    ('4', "tone-mark"),
    ('5', "symbol"),
    ('6', "digit"),
    ('7', "vowel-modifying-diacritical-mark"),
    ('8', "vowel-sign"),
    ('9', "semivowel-lower"),
    ('<', "not-at-end-of-line"),
    ('>', "not-at-beginning-of-line"),
    ('A', "alpha-numeric-two-byte"),
    ('C', "chinese-two-byte"),
    ('G', "greek-two-byte"),
    ('H', "japanese-hiragana-two-byte"),
    ('I', "indian-two-byte"),
    ('K', "japanese-katakana-two-byte"),
    ('L', "strong-left-to-right"),
    ('N', "korean-hangul-two-byte"),
    ('R', "strong-right-to-left"),
    ('Y', "cyrillic-two-byte"),
    ('^', "combining-diacritic"),
    ('a', "ascii"),
    ('b', "arabic"),
    ('c', "chinese"),
    ('e', "ethiopic"),
    ('g', "greek"),
    ('h', "korean"),
    ('i', "indian"),
    ('j', "japanese"),
    ('k', "japanese-katakana"),
    ('l', "latin"),
    ('o', "lao"),
    ('q', "tibetan"),
    ('r', "japanese-roman"),
    ('t', "thai"),
    ('v', "vietnamese"),
    ('w', "hebrew"),
    ('y', "cyrillic"),
    ('|', "can-break"),
];

/// Emacs character categories, selected by the character after `\c`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CharCategory {
    name: &'static str,
}

impl CharCategory {
    pub fn from_code(code: char) -> Option<Self> {
        CATEGORIES
            .iter()
            .find(|(c, _)| *c == code)
            .map(|&(_, name)| CharCategory { name })
    }

    pub fn name(self) -> &'static str {
        self.name
    }
}

/// A union of characters, inclusive ranges and named classes.
///
/// Each part keeps the order in which members were first added; duplicates
/// are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharSet {
    chars: Vec<char>,
    ranges: Vec<(char, char)>,
    classes: Vec<PosixClass>,
}

/// Anything that can be folded into a [`CharSet`] with [`CharSet::adjoin`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Char(char),
    Chars(Vec<char>),
    Range(char, char),
    Class(PosixClass),
    Set(CharSet),
}

impl From<char> for Item {
    fn from(c: char) -> Self {
        Item::Char(c)
    }
}

impl From<&str> for Item {
    fn from(s: &str) -> Self {
        Item::Chars(s.chars().collect())
    }
}

impl From<(char, char)> for Item {
    fn from((lo, hi): (char, char)) -> Self {
        Item::Range(lo, hi)
    }
}

impl From<PosixClass> for Item {
    fn from(class: PosixClass) -> Self {
        Item::Class(class)
    }
}

impl From<CharSet> for Item {
    fn from(set: CharSet) -> Self {
        Item::Set(set)
    }
}

impl CharSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn ranges(&self) -> &[(char, char)] {
        &self.ranges
    }

    pub fn classes(&self) -> &[PosixClass] {
        &self.classes
    }

    /// The empty union matches nothing at all.
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty() && self.ranges.is_empty() && self.classes.is_empty()
    }

    /// The character, if this set holds exactly one and nothing else.
    pub fn single_char(&self) -> Option<char> {
        match (self.chars.as_slice(), self.ranges.is_empty(), self.classes.is_empty()) {
            ([c], true, true) => Some(*c),
            _ => None,
        }
    }

    /// The class, if this set is exactly one named class.
    pub fn single_class(&self) -> Option<PosixClass> {
        match (self.classes.as_slice(), self.chars.is_empty(), self.ranges.is_empty()) {
            ([class], true, true) => Some(*class),
            _ => None,
        }
    }

    /// Folds `item` into this set and returns the result.
    ///
    /// A range of one character is stored as that character.
    pub fn adjoin(mut self, item: impl Into<Item>) -> Self {
        match item.into() {
            Item::Char(c) => push_unique(&mut self.chars, c),
            Item::Chars(cs) => {
                for c in cs {
                    push_unique(&mut self.chars, c);
                }
            }
            Item::Range(lo, hi) if lo == hi => push_unique(&mut self.chars, lo),
            Item::Range(lo, hi) => push_unique(&mut self.ranges, (lo, hi)),
            Item::Class(class) => push_unique(&mut self.classes, class),
            Item::Set(other) => {
                for c in other.chars {
                    push_unique(&mut self.chars, c);
                }
                for range in other.ranges {
                    push_unique(&mut self.ranges, range);
                }
                for class in other.classes {
                    push_unique(&mut self.classes, class);
                }
            }
        }
        self
    }
}

fn push_unique<T: PartialEq>(items: &mut Vec<T>, item: T) {
    if !items.contains(&item) {
        items.push(item);
    }
}

impl From<char> for CharSet {
    fn from(c: char) -> Self {
        CharSet::new().adjoin(c)
    }
}

impl From<PosixClass> for CharSet {
    fn from(class: PosixClass) -> Self {
        CharSet::new().adjoin(class)
    }
}

impl From<(char, char)> for CharSet {
    fn from(range: (char, char)) -> Self {
        CharSet::new().adjoin(range)
    }
}

/// Whether `node` denotes a set of single characters.
pub fn is_char_set_like(node: &Node) -> bool {
    match node {
        Node::CharSet(_)
        | Node::Negation(_)
        | Node::Intersection(_)
        | Node::SyntaxClass(_)
        | Node::CharCategory(_)
        | Node::Primitive(Primitive::Wordchar | Primitive::NotWordchar) => true,
        Node::Literal(text) => text.chars().count() == 1,
        Node::Choice(elts) => elts.iter().all(is_char_set_like),
        _ => false,
    }
}

/// The node as a plain set, if it can be folded into one.
pub(crate) fn as_plain_set(node: &Node) -> Option<CharSet> {
    match node {
        Node::CharSet(set) => Some(set.clone()),
        Node::Literal(text) => {
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(CharSet::from(c)),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Union of char-set-like values.
///
/// Plain sets merge into a single [`CharSet`] at the position of the first
/// one; once a complement or intersection takes part the result is a
/// symbolic [`Node::Choice`].
pub fn union(operands: impl IntoIterator<Item = Node>) -> Node {
    let mut merged: Option<(usize, CharSet)> = None;
    let mut rest = Vec::new();
    for operand in operands {
        match as_plain_set(&operand) {
            Some(set) => {
                merged = Some(match merged.take() {
                    Some((at, acc)) => (at, acc.adjoin(set)),
                    None => (rest.len(), set),
                });
            }
            None => rest.push(operand),
        }
    }
    if let Some((at, set)) = merged {
        rest.insert(at, Node::CharSet(set));
    }
    Node::choice(rest)
}

/// Complement of a char-set-like value. Double negation cancels.
pub fn negate(node: Node) -> Result<Node, ConstructError> {
    match node {
        Node::Negation(inner) => Ok(*inner),
        Node::CharSet(_) | Node::SyntaxClass(_) | Node::CharCategory(_) => {
            Ok(Node::Negation(Box::new(node)))
        }
        Node::Primitive(Primitive::Wordchar) => Ok(Node::Primitive(Primitive::NotWordchar)),
        Node::Primitive(Primitive::NotWordchar) => Ok(Node::Primitive(Primitive::Wordchar)),
        Node::Literal(_) => match as_plain_set(&node) {
            Some(set) => Ok(Node::Negation(Box::new(Node::CharSet(set)))),
            None => Err(ConstructError::Negate(format!("{:?}", node))),
        },
        other => Err(ConstructError::Negate(format!("{:?}", other))),
    }
}

/// Intersection of char-set-like values.
///
/// Complemented plain sets are folded into one running complement
/// (`¬A ∧ ¬B = ¬(A ∪ B)`), nested intersections are flattened, and a
/// single surviving operand is returned on its own.
pub fn intersection(operands: impl IntoIterator<Item = Node>) -> Result<Node, ConstructError> {
    let mut elts = Vec::new();
    let mut complement = CharSet::new();
    for operand in operands {
        fold_intersection(operand, &mut elts, &mut complement)?;
    }

    if elts.is_empty() {
        return negate(Node::CharSet(complement));
    }
    if !complement.is_empty() {
        elts.push(Node::Negation(Box::new(Node::CharSet(complement))));
    }
    if elts.len() == 1 {
        Ok(elts.remove(0))
    } else {
        Ok(Node::Intersection(elts))
    }
}

fn fold_intersection(
    operand: Node,
    elts: &mut Vec<Node>,
    complement: &mut CharSet,
) -> Result<(), ConstructError> {
    match operand {
        Node::Negation(inner) => match *inner {
            Node::CharSet(set) => {
                *complement = std::mem::take(complement).adjoin(set);
            }
            other => elts.push(Node::Negation(Box::new(other))),
        },
        Node::Intersection(inner) => {
            for elt in inner {
                fold_intersection(elt, elts, complement)?;
            }
        }
        Node::Literal(_) => match as_plain_set(&operand) {
            Some(set) => elts.push(Node::CharSet(set)),
            None => return Err(ConstructError::Intersect(format!("{:?}", operand))),
        },
        other if is_char_set_like(&other) => elts.push(other),
        other => return Err(ConstructError::Intersect(format!("{:?}", other))),
    }
    Ok(())
}
