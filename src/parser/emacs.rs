//! Emacs regexp syntax.
//!
//! Operators are backslash-escaped (`\|`, `\(`, `\{`), bracket expressions
//! take no escapes, and `^`, `$`, `*` are special only in certain positions.

use super::{build_class, check_bounds, Scanner, MAX_DEPTH};
use crate::ast::{Node, Primitive};
use crate::charset::{CharCategory, CharSet, SyntaxClass};
use crate::error::{ParseError, ParseErrorKind};

pub(super) struct EmacsParser {
    scan: Scanner,
    groups: u32,
}

impl EmacsParser {
    pub fn new(pattern: &str) -> Self {
        Self {
            scan: Scanner::new(pattern),
            groups: 0,
        }
    }

    pub fn parse(&mut self) -> Result<Node, ParseError> {
        let node = self.alternation(0)?;
        if !self.scan.at_end() {
            // Only an unopened `\)` stops the top-level alternation early.
            return Err(self.scan.error(ParseErrorKind::UnmatchedParen, self.scan.pos()));
        }
        Ok(node)
    }

    /// Rule: `alternation ::= branch ( '\|' branch )*`
    fn alternation(&mut self, depth: usize) -> Result<Node, ParseError> {
        let mut branches = vec![self.branch(depth)?];
        while self.scan.eat(r"\|") {
            branches.push(self.branch(depth)?);
        }
        Ok(Node::choice(branches))
    }

    fn at_branch_end(&self) -> bool {
        self.scan.at_end() || self.scan.looking_at(r"\|") || self.scan.looking_at(r"\)")
    }

    /// Rule: `branch ::= piece*`
    fn branch(&mut self, depth: usize) -> Result<Node, ParseError> {
        let mut pieces = Vec::new();
        while !self.at_branch_end() {
            let at_start = pieces.is_empty();
            pieces.push(self.piece(at_start, depth)?);
        }
        Ok(Node::seq(pieces))
    }

    /// Rule: `piece ::= atom quantifier*`
    fn piece(&mut self, at_start: bool, depth: usize) -> Result<Node, ParseError> {
        let (atom, repeatable) = self.atom(at_start, depth)?;
        if repeatable {
            self.quantifiers(atom, depth)
        } else {
            Ok(atom)
        }
    }

    /// Applies every quantifier that follows, innermost first.
    ///
    /// Examples:
    /// - `a*?` → `Repeat { 0, None, lazy, a }`
    /// - `a\{2,3\}` → `Repeat { 2, Some(3), greedy, a }`
    ///
    /// Each quantifier counts as one more level against [`MAX_DEPTH`].
    fn quantifiers(&mut self, mut node: Node, depth: usize) -> Result<Node, ParseError> {
        let mut nesting = depth + node.repeat_depth();
        loop {
            let start = self.scan.pos();
            let (from, to, greedy) = match self.scan.peek() {
                Some(op @ ('*' | '+' | '?')) => {
                    self.scan.advance();
                    let greedy = !self.scan.expect('?');
                    match op {
                        '*' => (0, None, greedy),
                        '+' => (1, None, greedy),
                        _ => (0, Some(1), greedy),
                    }
                }
                Some('\\') if self.scan.looking_at(r"\{") => {
                    let bounds = self
                        .scan
                        .bounds(r"\{", r"\}")?
                        .ok_or_else(|| self.scan.error(ParseErrorKind::BadRepetition, start))?;
                    let from = bounds.min.unwrap_or(0);
                    let to = if bounds.comma { bounds.max } else { Some(from) };
                    (from, to, true)
                }
                _ => return Ok(node),
            };
            check_bounds(&self.scan, from, to, start)?;
            nesting += 1;
            if nesting > MAX_DEPTH {
                return Err(self.scan.error(ParseErrorKind::TooDeep(MAX_DEPTH), start));
            }
            node = Node::repeat(from, to, greedy, node)
                .map_err(|err| self.scan.error(err.into(), start))?;
        }
    }

    /// Parses one atom. The flag says whether quantifiers may follow it.
    fn atom(&mut self, at_start: bool, depth: usize) -> Result<(Node, bool), ParseError> {
        let start = self.scan.pos();
        let Some(c) = self.scan.advance() else {
            return Err(self.scan.error(ParseErrorKind::UnexpectedEnd, start));
        };
        let node = match c {
            // `^` anchors only at the start of a branch, `$` only at its end.
            '^' if at_start => return Ok((Node::Primitive(Primitive::Bol), false)),
            '$' if self.at_branch_end() => Node::Primitive(Primitive::Eol),
            '.' => Node::Primitive(Primitive::Nonl),
            '[' => self.class(start)?,
            '\\' => self.escape(start, depth)?,
            c => Node::literal(c.to_string()),
        };
        Ok((node, true))
    }

    fn escape(&mut self, start: usize, depth: usize) -> Result<Node, ParseError> {
        let Some(c) = self.scan.advance() else {
            return Err(self.scan.error(ParseErrorKind::UnexpectedEnd, start));
        };
        let node = match c {
            '(' => return self.group(start, depth),
            '`' => Node::Primitive(Primitive::Bos),
            '\'' => Node::Primitive(Primitive::Eos),
            '=' => Node::Primitive(Primitive::Point),
            'b' => Node::Primitive(Primitive::WordBoundary),
            'B' => Node::Primitive(Primitive::NotWordBoundary),
            '<' => Node::Primitive(Primitive::Bow),
            '>' => Node::Primitive(Primitive::Eow),
            'w' => Node::Primitive(Primitive::Wordchar),
            'W' => Node::Primitive(Primitive::NotWordchar),
            '_' => match self.scan.advance() {
                Some('<') => Node::Primitive(Primitive::SymbolStart),
                Some('>') => Node::Primitive(Primitive::SymbolEnd),
                _ => return Err(self.scan.error(ParseErrorKind::BadEscape, start)),
            },
            's' | 'S' => {
                let class = self
                    .scan
                    .advance()
                    .and_then(SyntaxClass::from_code)
                    .ok_or_else(|| self.scan.error(ParseErrorKind::UnknownSyntaxClass, start))?;
                self.maybe_negate(Node::syntax(class), c == 'S', start)?
            }
            'c' | 'C' => {
                let category = self
                    .scan
                    .advance()
                    .and_then(CharCategory::from_code)
                    .ok_or_else(|| self.scan.error(ParseErrorKind::UnknownCategory, start))?;
                self.maybe_negate(Node::category(category), c == 'C', start)?
            }
            '1'..='9' => {
                let index = c as u32 - '0' as u32;
                if index > self.groups {
                    return Err(self.scan.error(ParseErrorKind::UndefinedBackref, start));
                }
                Node::backref(index).map_err(|err| self.scan.error(err.into(), start))?
            }
            '{' => return Err(self.scan.error(ParseErrorKind::NothingToRepeat, start)),
            c => Node::literal(c.to_string()),
        };
        Ok(node)
    }

    fn maybe_negate(&self, node: Node, negated: bool, start: usize) -> Result<Node, ParseError> {
        if negated {
            node.negate().map_err(|err| self.scan.error(err.into(), start))
        } else {
            Ok(node)
        }
    }

    /// Rule: `group ::= '\(' ( '?:' | '?' NUMBER ':' )? alternation '\)'`
    ///
    /// Explicitly numbered groups capture like plain ones; later implicit
    /// groups are numbered after the highest number seen.
    fn group(&mut self, start: usize, depth: usize) -> Result<Node, ParseError> {
        if depth + 1 > MAX_DEPTH {
            return Err(self.scan.error(ParseErrorKind::TooDeep(MAX_DEPTH), start));
        }
        let capturing = if self.scan.eat("?:") {
            false
        } else if self.scan.expect('?') {
            let digits = self.scan.digit_run();
            self.scan.skip(digits.len());
            let number = digits.parse::<u32>().ok().filter(|n| *n > 0);
            let Some(n) = number else {
                return Err(self.scan.error(ParseErrorKind::UnsupportedGroup, start));
            };
            if !self.scan.expect(':') {
                return Err(self.scan.error(ParseErrorKind::UnsupportedGroup, start));
            }
            self.groups = self.groups.max(n);
            true
        } else {
            self.groups += 1;
            true
        };

        let body = self.alternation(depth + 1)?;
        if !self.scan.eat(r"\)") {
            return Err(self.scan.error(ParseErrorKind::UnmatchedParen, start));
        }
        Ok(if capturing { Node::submatch(body) } else { body })
    }

    /// Rule: `class ::= '[' '^'? ']'? ( CHAR | CHAR '-' CHAR | '[:' NAME ':]' )* ']'`
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
                    if let Some(node) = self.scan.posix_class(false)? {
                        pieces.push(node);
                        first = false;
                        continue;
                    }
                }
                _ => {}
            }
            first = false;

            let item_start = self.scan.pos();
            let Some(lo) = self.scan.advance() else {
                return Err(self.scan.error(ParseErrorKind::UnmatchedBracket, start));
            };
            let is_range = self.scan.peek() == Some('-')
                && !matches!(self.scan.peek_at(1), None | Some(']'));
            if is_range {
                self.scan.advance();
                let Some(hi) = self.scan.advance() else {
                    return Err(self.scan.error(ParseErrorKind::UnmatchedBracket, start));
                };
                if hi < lo {
                    return Err(self.scan.error(ParseErrorKind::BadRange, item_start));
                }
                pieces.push(Node::CharSet(CharSet::from((lo, hi))));
            } else {
                pieces.push(Node::CharSet(CharSet::from(lo)));
            }
        }
        build_class(negated, pieces).map_err(|err| self.scan.error(err.into(), start))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Repeat;
    use crate::charset::PosixClass;

    fn run(pattern: &str) -> Result<Node, ParseError> {
        EmacsParser::new(pattern).parse()
    }

    fn lit(s: &str) -> Node {
        Node::literal(s)
    }

    fn set(s: &str) -> Node {
        Node::CharSet(CharSet::new().adjoin(s))
    }

    fn prim(p: Primitive) -> Node {
        Node::Primitive(p)
    }

    fn rep(from: u32, to: Option<u32>, greedy: bool, body: Node) -> Node {
        Node::Repeat(Repeat {
            from,
            to,
            greedy,
            body: Box::new(body),
        })
    }

    fn err_kind(pattern: &str) -> ParseErrorKind {
        run(pattern).unwrap_err().kind
    }

    #[test]
    fn literal_text() {
        assert_eq!(run("abc"), Ok(lit("abc")));
        assert_eq!(run(""), Ok(Node::Epsilon));
        assert_eq!(run(r"a\.b"), Ok(lit("a.b")));
    }

    #[test]
    fn alternation_of_words() {
        assert_eq!(
            run(r"foo\|bar"),
            Ok(Node::Choice(vec![lit("foo"), lit("bar")]))
        );
        assert_eq!(run(r"a\|b\|c"), Ok(set("abc")));
    }

    #[test]
    fn plain_pipe_and_parens_are_literal() {
        assert_eq!(run("a|(b)"), Ok(lit("a|(b)")));
    }

    #[test]
    fn groups() {
        assert_eq!(
            run(r"\(ab\)c"),
            Ok(Node::seq(vec![Node::submatch(lit("ab")), lit("c")]))
        );
        assert_eq!(run(r"\(?:ab\)c"), Ok(lit("abc")));
        assert_eq!(
            run(r"\(?3:x\)\1"),
            Ok(Node::seq(vec![Node::submatch(lit("x")), Node::Backref(1)]))
        );
    }

    #[test]
    fn quantifiers() {
        assert_eq!(
            run("ab*"),
            Ok(Node::seq(vec![lit("a"), rep(0, None, true, lit("b"))]))
        );
        assert_eq!(run("a+?"), Ok(rep(1, None, false, lit("a"))));
        assert_eq!(run("a??"), Ok(rep(0, Some(1), false, lit("a"))));
        assert_eq!(
            run(r"\(?:ab\)\{2,3\}"),
            Ok(rep(2, Some(3), true, lit("ab")))
        );
        assert_eq!(run(r"a\{3\}"), Ok(rep(3, Some(3), true, lit("a"))));
        assert_eq!(run(r"a\{,2\}"), Ok(rep(0, Some(2), true, lit("a"))));
        assert_eq!(run(r"a\{2,\}"), Ok(rep(2, None, true, lit("a"))));
        assert_eq!(run(r"a\{0\}b"), Ok(lit("b")));
    }

    #[test]
    fn repeated_quantifiers_nest() {
        assert_eq!(
            run("a*+"),
            Ok(rep(1, None, true, rep(0, None, true, lit("a"))))
        );
    }

    #[test]
    fn leading_star_is_literal() {
        assert_eq!(run("*a"), Ok(lit("*a")));
        assert_eq!(
            run(r"x\|*"),
            Ok(set("x*"))
        );
    }

    #[test]
    fn context_dependent_anchors() {
        assert_eq!(
            run("^a$"),
            Ok(Node::seq(vec![prim(Primitive::Bol), lit("a"), prim(Primitive::Eol)]))
        );
        assert_eq!(run("a^b$c"), Ok(lit("a^b$c")));
        assert_eq!(
            run("^*"),
            Ok(Node::seq(vec![prim(Primitive::Bol), lit("*")]))
        );
    }

    #[test]
    fn backslash_assertions() {
        assert_eq!(
            run(r"\`\_<\w\W\_>\'"),
            Ok(Node::seq(vec![
                prim(Primitive::Bos),
                prim(Primitive::SymbolStart),
                prim(Primitive::Wordchar),
                prim(Primitive::NotWordchar),
                prim(Primitive::SymbolEnd),
                prim(Primitive::Eos),
            ]))
        );
        assert_eq!(run(r"\="), Ok(prim(Primitive::Point)));
    }

    #[test]
    fn syntax_and_categories() {
        assert_eq!(run(r"\s-"), Ok(Node::syntax(SyntaxClass::Whitespace)));
        assert_eq!(
            run(r"\S."),
            Ok(Node::syntax(SyntaxClass::Punctuation).negate().unwrap())
        );
        let greek = CharCategory::from_code('g').unwrap();
        assert_eq!(run(r"\cg"), Ok(Node::category(greek)));
        assert_eq!(
            run(r"\Cg"),
            Ok(Node::category(greek).negate().unwrap())
        );
        assert_eq!(err_kind(r"\s%"), ParseErrorKind::UnknownSyntaxClass);
        assert_eq!(err_kind(r"\c%"), ParseErrorKind::UnknownCategory);
    }

    #[test]
    fn bracket_expressions() {
        assert_eq!(run("[abc]"), Ok(set("abc")));
        assert_eq!(run("[]a]"), Ok(set("]a")));
        assert_eq!(run("[a-]"), Ok(set("a-")));
        assert_eq!(
            run("[a-z[:digit:]]"),
            Ok(Node::CharSet(
                CharSet::new().adjoin(('a', 'z')).adjoin(PosixClass::Digit)
            ))
        );
        assert_eq!(run(r"[\]"), Ok(set("\\")));
        assert_eq!(run("[^abc]"), Ok(set("abc").negate().unwrap()));
    }

    #[test]
    fn errors() {
        assert_eq!(err_kind(r"\(ab"), ParseErrorKind::UnmatchedParen);
        assert_eq!(err_kind(r"ab\)"), ParseErrorKind::UnmatchedParen);
        assert_eq!(err_kind("[ab"), ParseErrorKind::UnmatchedBracket);
        assert_eq!(err_kind("[[:foo:]]"), ParseErrorKind::UnknownPosixClass);
        assert_eq!(err_kind("[[.a.]]"), ParseErrorKind::CollatingElement);
        assert_eq!(err_kind(r"a\{2"), ParseErrorKind::BadRepetition);
        assert_eq!(err_kind(r"a\{3,2\}"), ParseErrorKind::InvertedRepetition);
        assert_eq!(err_kind("[z-a]"), ParseErrorKind::BadRange);
        assert_eq!(err_kind(r"a\"), ParseErrorKind::UnexpectedEnd);
        assert_eq!(err_kind(r"\(?x:a\)"), ParseErrorKind::UnsupportedGroup);
        assert_eq!(err_kind(r"\(a\)\2"), ParseErrorKind::UndefinedBackref);
    }

    #[test]
    fn error_position_and_fragment() {
        let err = run(r"ab\(cd").unwrap_err();
        assert_eq!(err.position, 2);
        assert_eq!(err.fragment, r"\(cd");
    }

    #[test]
    fn nesting_limit() {
        let deep = format!("{}a{}", r"\(".repeat(MAX_DEPTH + 1), r"\)".repeat(MAX_DEPTH + 1));
        assert_eq!(err_kind(&deep), ParseErrorKind::TooDeep(MAX_DEPTH));
    }

    #[test]
    fn stacked_quantifiers_count_toward_nesting() {
        let stars = format!("a{}", "*".repeat(MAX_DEPTH));
        assert_eq!(run(&stars).unwrap().repeat_depth(), MAX_DEPTH);

        let err = run(&format!("a{}", "*".repeat(MAX_DEPTH + 1))).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::TooDeep(MAX_DEPTH));
        assert_eq!(err.position, MAX_DEPTH + 1);

        let braces = format!("a{}", r"\{1\}".repeat(20_000));
        assert_eq!(err_kind(&braces), ParseErrorKind::TooDeep(MAX_DEPTH));

        let grouped = format!(
            "{}a{}{}",
            r"\(".repeat(100),
            "+".repeat(101),
            r"\)".repeat(100)
        );
        assert_eq!(err_kind(&grouped), ParseErrorKind::TooDeep(MAX_DEPTH));
    }
}
