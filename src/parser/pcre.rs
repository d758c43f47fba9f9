//! PCRE syntax.

use log::trace;

use super::{build_class, check_bounds, Scanner, MAX_DEPTH};
use crate::ast::{Node, Primitive};
use crate::charset::{CharSet, PosixClass};
use crate::error::{ParseError, ParseErrorKind};

/// Scanner modes set by inline modifiers.
///
/// A group starts with a copy of its parent's context; changes made inside
/// it end with it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Context {
    /// `x`: unescaped whitespace and `#` comments are ignored.
    pub extended: bool,
    /// `s`: `.` also matches newline.
    pub single_line: bool,
}

/// One step of a branch.
enum Atom {
    Node(Node),
    /// Text of a `\Q...\E` span. Only its last character can be quantified.
    Quoted(String),
    /// A bare `(?flags)` group, which changes the rest of the enclosing group.
    Flags(Context),
    /// A stray `\E`.
    Nothing,
}

/// A bracket expression item that may start a range.
enum ClassAtom {
    Char(char),
    Set(Node),
}

pub(super) struct PcreParser {
    scan: Scanner,
    /// Capturing groups opened so far.
    groups: u32,
}

impl PcreParser {
    pub fn new(pattern: &str) -> Self {
        Self {
            scan: Scanner::new(pattern),
            groups: 0,
        }
    }

    pub fn parse(&mut self) -> Result<Node, ParseError> {
        let node = self.alternation(Context::default(), 0)?;
        if !self.scan.at_end() {
            return Err(self.scan.error(ParseErrorKind::UnmatchedParen, self.scan.pos()));
        }
        Ok(node)
    }

    /// Rule: `alternation ::= branch ( '|' branch )*`
    ///
    /// Modifiers switched on in one branch stay on for the branches after it.
    fn alternation(&mut self, ctx: Context, depth: usize) -> Result<Node, ParseError> {
        let (first, mut ctx) = self.branch(ctx, depth)?;
        let mut branches = vec![first];
        while self.scan.expect('|') {
            let (branch, next) = self.branch(ctx, depth)?;
            ctx = next;
            branches.push(branch);
        }
        Ok(Node::choice(branches))
    }

    /// Rule: `branch ::= piece*`
    fn branch(&mut self, mut ctx: Context, depth: usize) -> Result<(Node, Context), ParseError> {
        let mut pieces = Vec::new();
        loop {
            self.skip_ignored(ctx);
            if matches!(self.scan.peek(), None | Some('|') | Some(')')) {
                break;
            }
            match self.atom(ctx, depth)? {
                Atom::Flags(next) => ctx = next,
                Atom::Node(node) => pieces.push(self.quantifiers(node, ctx, depth)?),
                Atom::Quoted(text) => {
                    let mut chars: Vec<char> = text.chars().collect();
                    if let Some(last) = chars.pop() {
                        pieces.push(Node::literal(chars.into_iter().collect::<String>()));
                        let last = Node::literal(last.to_string());
                        pieces.push(self.quantifiers(last, ctx, depth)?);
                    }
                }
                // A stray `\E` is dropped; what follows applies to the previous piece.
                Atom::Nothing => {
                    if let Some(prev) = pieces.pop() {
                        pieces.push(self.quantifiers(prev, ctx, depth)?);
                    }
                }
            }
        }
        Ok((Node::seq(pieces), ctx))
    }

    /// Skips whitespace and `#` comments in extended mode.
    fn skip_ignored(&mut self, ctx: Context) {
        if !ctx.extended {
            return;
        }
        while let Some(c) = self.scan.peek() {
            if c.is_whitespace() {
                self.scan.advance();
            } else if c == '#' {
                while let Some(c) = self.scan.advance() {
                    if c == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    /// Applies every quantifier that follows, innermost first.
    ///
    /// Braces that do not form a quantifier are left for the next atom,
    /// which takes them literally. Enclosing groups and stacked quantifiers
    /// together may not nest deeper than [`MAX_DEPTH`].
    fn quantifiers(&mut self, mut node: Node, ctx: Context, depth: usize) -> Result<Node, ParseError> {
        let mut nesting = depth + node.repeat_depth();
        loop {
            self.skip_ignored(ctx);
            let start = self.scan.pos();
            let (from, to) = match self.scan.peek() {
                Some(op @ ('*' | '+' | '?')) => {
                    self.scan.advance();
                    match op {
                        '*' => (0, None),
                        '+' => (1, None),
                        _ => (0, Some(1)),
                    }
                }
                Some('{') => match self.scan.bounds("{", "}")? {
                    Some(bounds) if bounds.min.is_some() || bounds.max.is_some() => {
                        let from = bounds.min.unwrap_or(0);
                        let to = if bounds.comma { bounds.max } else { Some(from) };
                        (from, to)
                    }
                    Some(_) => {
                        // `{}` and `{,}` are plain text.
                        self.scan.seek(start);
                        return Ok(node);
                    }
                    None => return Ok(node),
                },
                _ => return Ok(node),
            };

            let greedy = !self.scan.expect('?');
            if greedy && self.scan.peek() == Some('+') {
                // Possessive quantifiers control backtracking.
                return Err(self.scan.error(ParseErrorKind::UnsupportedGroup, start));
            }
            check_bounds(&self.scan, from, to, start)?;
            nesting += 1;
            if nesting > MAX_DEPTH {
                return Err(self.scan.error(ParseErrorKind::TooDeep(MAX_DEPTH), start));
            }
            node = Node::repeat(from, to, greedy, node)
                .map_err(|err| self.scan.error(err.into(), start))?;
        }
    }

    fn atom(&mut self, ctx: Context, depth: usize) -> Result<Atom, ParseError> {
        let start = self.scan.pos();
        let Some(c) = self.scan.advance() else {
            return Err(self.scan.error(ParseErrorKind::UnexpectedEnd, start));
        };
        let node = match c {
            '(' => return self.group(start, ctx, depth),
            '[' => self.class(start)?,
            '.' if ctx.single_line => Node::Primitive(Primitive::Anything),
            '.' => Node::Primitive(Primitive::Nonl),
            '^' => Node::Primitive(Primitive::Bol),
            '$' => Node::Primitive(Primitive::Eol),
            '\\' => return self.escape(start),
            '*' | '+' | '?' => {
                return Err(self.scan.error(ParseErrorKind::NothingToRepeat, start))
            }
            c => Node::literal(c.to_string()),
        };
        Ok(Atom::Node(node))
    }

    /// Rule: `group ::= '(' ( '?:' | '?' NAME | '?' FLAGS ':' )? alternation ')'`
    ///          `| '(?#' TEXT ')' | '(?' FLAGS ')'`
    fn group(&mut self, start: usize, ctx: Context, depth: usize) -> Result<Atom, ParseError> {
        if depth + 1 > MAX_DEPTH {
            return Err(self.scan.error(ParseErrorKind::TooDeep(MAX_DEPTH), start));
        }
        if self.scan.peek() == Some('*') {
            return Err(self.scan.error(ParseErrorKind::UnsupportedGroup, start));
        }
        if !self.scan.expect('?') {
            self.groups += 1;
            let body = self.group_body(start, ctx, depth)?;
            return Ok(Atom::Node(Node::submatch(body)));
        }

        match self.scan.peek() {
            Some('#') => {
                while let Some(c) = self.scan.advance() {
                    if c == ')' {
                        return Ok(Atom::Node(Node::Epsilon));
                    }
                }
                Err(self.scan.error(ParseErrorKind::UnexpectedEnd, start))
            }
            Some(':') => {
                self.scan.advance();
                let body = self.group_body(start, ctx, depth)?;
                Ok(Atom::Node(body))
            }
            Some('<') if matches!(self.scan.peek_at(1), Some('=' | '!')) => {
                Err(self.scan.error(ParseErrorKind::UnsupportedGroup, start))
            }
            Some('<') | Some('\'') => self.named_group(start, ctx, depth),
            Some('P') if self.scan.peek_at(1) == Some('<') => {
                self.scan.advance();
                self.named_group(start, ctx, depth)
            }
            Some('P' | 'R') => Err(self.scan.error(ParseErrorKind::UnsupportedGroup, start)),
            Some(c) if c.is_ascii_alphabetic() || c == '-' => {
                let (inner, has_body) = self.flags(start, ctx)?;
                if has_body {
                    Ok(Atom::Node(self.group_body(start, inner, depth)?))
                } else {
                    Ok(Atom::Flags(inner))
                }
            }
            // Lookaround, atomic groups, conditionals, recursion, ...
            _ => Err(self.scan.error(ParseErrorKind::UnsupportedGroup, start)),
        }
    }

    /// Named groups capture like plain ones; the name is dropped.
    fn named_group(&mut self, start: usize, ctx: Context, depth: usize) -> Result<Atom, ParseError> {
        let close = match self.scan.advance() {
            Some('\'') => '\'',
            _ => '>',
        };
        loop {
            match self.scan.advance() {
                Some(c) if c == close => break,
                Some(c) if c.is_alphanumeric() || c == '_' => {}
                Some(_) => return Err(self.scan.error(ParseErrorKind::UnsupportedGroup, start)),
                None => return Err(self.scan.error(ParseErrorKind::UnexpectedEnd, start)),
            }
        }
        self.groups += 1;
        let body = self.group_body(start, ctx, depth)?;
        Ok(Atom::Node(Node::submatch(body)))
    }

    fn group_body(&mut self, start: usize, ctx: Context, depth: usize) -> Result<Node, ParseError> {
        let body = self.alternation(ctx, depth + 1)?;
        if !self.scan.expect(')') {
            return Err(self.scan.error(ParseErrorKind::UnmatchedParen, start));
        }
        Ok(body)
    }

    /// Reads `[xs]* ( '-' [xs]* )?` and the `)` or `:` after it.
    ///
    /// Returns the modified context and whether a group body follows.
    fn flags(&mut self, start: usize, mut ctx: Context) -> Result<(Context, bool), ParseError> {
        let mut on = true;
        loop {
            match self.scan.advance() {
                Some('-') if on => on = false,
                Some('x') => ctx.extended = on,
                Some('s') => ctx.single_line = on,
                Some(end @ (')' | ':')) => {
                    trace!("inline modifiers at {}: {:?}", start, ctx);
                    return Ok((ctx, end == ':'));
                }
                Some(_) => return Err(self.scan.error(ParseErrorKind::UnknownModifier, start)),
                None => return Err(self.scan.error(ParseErrorKind::UnexpectedEnd, start)),
            }
        }
    }

    fn escape(&mut self, start: usize) -> Result<Atom, ParseError> {
        if matches!(self.scan.peek(), Some(c) if c.is_ascii_digit()) {
            return self.digit_escape(start).map(Atom::Node);
        }
        let Some(c) = self.scan.advance() else {
            return Err(self.scan.error(ParseErrorKind::UnexpectedEnd, start));
        };
        let node = match c {
            'A' => Node::Primitive(Primitive::Bos),
            'z' | 'Z' => Node::Primitive(Primitive::Eos),
            'b' => Node::Primitive(Primitive::WordBoundary),
            'B' => Node::Primitive(Primitive::NotWordBoundary),
            'w' => Node::Primitive(Primitive::Wordchar),
            'W' => Node::Primitive(Primitive::NotWordchar),
            'Q' => return Ok(Atom::Quoted(self.quoted())),
            'E' => return Ok(Atom::Nothing),
            c => match shorthand_class(c) {
                Some(node) => node,
                None => Node::literal(self.char_escape(c, start)?.to_string()),
            },
        };
        Ok(Atom::Node(node))
    }

    /// Text up to the next `\E`, or to the end of the pattern.
    fn quoted(&mut self) -> String {
        let mut text = String::new();
        while !self.scan.at_end() {
            if self.scan.eat(r"\E") {
                break;
            }
            if let Some(c) = self.scan.advance() {
                text.push(c);
            }
        }
        text
    }

    /// A digit run after `\` outside a class.
    ///
    /// Examples, with two groups opened:
    /// - `\2` → `Backref(2)`
    /// - `\12` → `Backref(1)` followed by the text `2`
    /// - `\0101` → backspace (`\010`) followed by the text `1`
    fn digit_escape(&mut self, start: usize) -> Result<Node, ParseError> {
        let run = self.scan.digit_run();
        if let Ok(value) = run.parse::<u32>() {
            if value != 0 && value <= self.groups {
                trace!("\\{} is a backreference ({} groups open)", run, self.groups);
                self.scan.skip(run.len());
                return Node::backref(value).map_err(|err| self.scan.error(err.into(), start));
            }
        }

        let Some(first) = self.scan.advance() else {
            return Err(self.scan.error(ParseErrorKind::UnexpectedEnd, start));
        };
        if first != '0' {
            trace!("\\{} exceeds {} groups; taking \\{}", run, self.groups, first);
            return Node::backref(first as u32 - '0' as u32)
                .map_err(|err| self.scan.error(err.into(), start));
        }
        trace!("\\{} read as octal", run);
        Ok(Node::literal(self.octal(first).to_string()))
    }

    /// Reads up to two more octal digits after `first`.
    fn octal(&mut self, first: char) -> char {
        let mut value = first.to_digit(8).unwrap_or(0);
        for _ in 0..2 {
            match self.scan.peek().and_then(|c| c.to_digit(8)) {
                Some(digit) => {
                    value = value * 8 + digit;
                    self.scan.advance();
                }
                None => break,
            }
        }
        // At most 0o777, always a valid scalar value.
        char::from_u32(value).unwrap_or('\0')
    }

    /// Single-character escapes shared by classes and the top level.
    fn char_escape(&mut self, c: char, start: usize) -> Result<char, ParseError> {
        let ch = match c {
            't' => '\t',
            'n' => '\n',
            'r' => '\r',
            'f' => '\x0c',
            'e' => '\x1b',
            'a' => '\x07',
            'x' => return self.hex_escape(start),
            'c' => {
                let control = self
                    .scan
                    .advance()
                    .filter(char::is_ascii)
                    .ok_or_else(|| self.scan.error(ParseErrorKind::BadEscape, start))?;
                char::from(control.to_ascii_uppercase() as u8 ^ 0x40)
            }
            c if c.is_ascii_alphanumeric() => {
                return Err(self.scan.error(ParseErrorKind::BadEscape, start))
            }
            c => c,
        };
        Ok(ch)
    }

    /// `\xhh` (up to two digits) or `\x{h...}`.
    fn hex_escape(&mut self, start: usize) -> Result<char, ParseError> {
        let mut digits = String::new();
        if self.scan.expect('{') {
            loop {
                match self.scan.advance() {
                    Some('}') => break,
                    Some(c) if c.is_ascii_hexdigit() => digits.push(c),
                    _ => return Err(self.scan.error(ParseErrorKind::BadEscape, start)),
                }
            }
        } else {
            while digits.len() < 2 {
                match self.scan.peek() {
                    Some(c) if c.is_ascii_hexdigit() => {
                        digits.push(c);
                        self.scan.advance();
                    }
                    _ => break,
                }
            }
        }
        if digits.is_empty() {
            return Ok('\0');
        }
        u32::from_str_radix(&digits, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| self.scan.error(ParseErrorKind::BadEscape, start))
    }

    /// Rule: `class ::= '[' '^'? ']'? class_item* ']'`
    fn class(&mut self, start: usize) -> Result<Node, ParseError> {
        let negated = self.scan.expect('^');
        let mut pieces = Vec::new();
        let mut first = true;
        loop {
            match self.scan.peek() {
                None => return Err(self.scan.error(ParseErrorKind::UnmatchedBracket, start)),
                Some(']') if !first => {
                    self.scan.advance();
                    break;
                }
                Some('[') => {
                    if let Some(node) = self.scan.posix_class(true)? {
                        pieces.push(node);
                        first = false;
                        continue;
                    }
                }
                _ => {}
            }
            first = false;

            let item_start = self.scan.pos();
            let lo = match self.class_atom(start)? {
                ClassAtom::Set(node) => {
                    pieces.push(node);
                    continue;
                }
                ClassAtom::Char(c) => c,
            };
            let is_range = self.scan.peek() == Some('-')
                && !matches!(self.scan.peek_at(1), None | Some(']'));
            if !is_range {
                pieces.push(Node::CharSet(CharSet::from(lo)));
                continue;
            }
            self.scan.advance();
            match self.class_atom(start)? {
                ClassAtom::Char(hi) if hi >= lo => pieces.push(Node::CharSet(CharSet::from((lo, hi)))),
                _ => return Err(self.scan.error(ParseErrorKind::BadRange, item_start)),
            }
        }
        build_class(negated, pieces).map_err(|err| self.scan.error(err.into(), start))
    }

    fn class_atom(&mut self, class_start: usize) -> Result<ClassAtom, ParseError> {
        let start = self.scan.pos();
        let Some(c) = self.scan.advance() else {
            return Err(self.scan.error(ParseErrorKind::UnmatchedBracket, class_start));
        };
        if c != '\\' {
            return Ok(ClassAtom::Char(c));
        }
        let Some(c) = self.scan.advance() else {
            return Err(self.scan.error(ParseErrorKind::UnmatchedBracket, class_start));
        };
        if let Some(node) = shorthand_class(c) {
            return Ok(ClassAtom::Set(node));
        }
        let ch = match c {
            // Class shorthands `\w`/`\W` use the POSIX `word` class inside brackets.
            'w' => return Ok(ClassAtom::Set(Node::CharSet(CharSet::from(PosixClass::Word)))),
            'W' => {
                let word = Node::CharSet(CharSet::from(PosixClass::Word));
                return word
                    .negate()
                    .map(ClassAtom::Set)
                    .map_err(|err| self.scan.error(err.into(), start));
            }
            'b' => '\x08',
            '0'..='7' => self.octal(c),
            '8' | '9' => c,
            c => self.char_escape(c, start)?,
        };
        Ok(ClassAtom::Char(ch))
    }
}

/// `\d`, `\s`, `\h` and their negations as char sets.
///
/// These are treated as the ASCII POSIX classes `digit`, `space` and `blank`.
fn shorthand_class(c: char) -> Option<Node> {
    let class = match c.to_ascii_lowercase() {
        'd' => PosixClass::Digit,
        's' => PosixClass::Space,
        'h' => PosixClass::Blank,
        _ => return None,
    };
    let node = Node::CharSet(CharSet::from(class));
    if c.is_ascii_uppercase() {
        Some(Node::Negation(Box::new(node)))
    } else {
        Some(node)
    }
}
