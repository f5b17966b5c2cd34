//! Query lexer (tokenizer).
//!
//! A hand-written state machine with three lexical states. In each state every token rule is
//! tried at the current position; the longest match wins and ties go to the rule declared
//! first, so `AND` is an operator while `ANDROID` is a term.

use serde::Serialize;

use crate::error::LexError;

/// The kind of a lexical token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    /// A bare word.
    Term,
    /// A double-quoted string, quotes included in the image.
    QuotedString,
    /// `digits[.digits]`.
    Number,
    /// `AND` or `&&`.
    And,
    /// `OR` or `||`.
    Or,
    /// `NOT`.
    Not,
    /// `+` prefix.
    Plus,
    /// `-` prefix.
    Minus,
    /// `!` prefix.
    Bang,
    /// `^`, switches to the boost state.
    Caret,
    /// `~` with an optional number.
    Tilde,
    /// `:` field separator.
    Colon,
    /// `=` field separator.
    Equals,
    /// `(`.
    LParen,
    /// `)`.
    RParen,
    /// `[`, inclusive range start.
    LBracket,
    /// `{`, exclusive range start.
    LBrace,
    /// `]`, inclusive range end.
    RBracket,
    /// `}`, exclusive range end.
    RBrace,
    /// `TO` inside a range.
    To,
    /// A lone `*`.
    Star,
    /// A term ending in `*`.
    PrefixTerm,
    /// A term containing `*` or `?`.
    WildTerm,
    /// A `/.../` literal.
    Regexp,
    /// `#` followed by digits.
    Reference,
    /// End of input.
    Eof,
}

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    /// Token kind.
    pub kind: TokenKind,
    /// The matched source text.
    pub image: String,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
    /// 1-based line of the first character.
    pub line: usize,
    /// 1-based column (in characters) of the first character.
    pub column: usize,
}

/// Lexical state of the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexState {
    /// Ordinary query text.
    Default,
    /// Inside `[...]` or `{...}`.
    Range,
    /// Directly after `^`.
    Boost,
}

/// Returns the byte length of a token rule matched at the start of the input.
type Matcher = fn(&str) -> Option<usize>;

/// Rules of the default state, in declaration (tie-break) order.
const DEFAULT_RULES: &[(TokenKind, Matcher)] = &[
    (TokenKind::And, and_operator),
    (TokenKind::Or, or_operator),
    (TokenKind::Not, not_operator),
    (TokenKind::Plus, |s| single(s, '+')),
    (TokenKind::Minus, |s| single(s, '-')),
    (TokenKind::Bang, |s| single(s, '!')),
    (TokenKind::LParen, |s| single(s, '(')),
    (TokenKind::RParen, |s| single(s, ')')),
    (TokenKind::Colon, |s| single(s, ':')),
    (TokenKind::Equals, |s| single(s, '=')),
    (TokenKind::Star, |s| single(s, '*')),
    (TokenKind::Caret, |s| single(s, '^')),
    (TokenKind::LBracket, |s| single(s, '[')),
    (TokenKind::LBrace, |s| single(s, '{')),
    (TokenKind::QuotedString, quoted),
    (TokenKind::Tilde, tilde),
    (TokenKind::Number, number),
    (TokenKind::Reference, reference),
    (TokenKind::Term, term),
    (TokenKind::PrefixTerm, prefix_term),
    (TokenKind::WildTerm, wild_term),
    (TokenKind::Regexp, regexp),
];

/// Rules of the range state.
const RANGE_RULES: &[(TokenKind, Matcher)] = &[
    (TokenKind::To, |s| s.starts_with("TO").then_some(2)),
    (TokenKind::RBracket, |s| single(s, ']')),
    (TokenKind::RBrace, |s| single(s, '}')),
    (TokenKind::QuotedString, range_quoted),
    (TokenKind::Term, range_chars),
];

/// Rules of the boost state.
const BOOST_RULES: &[(TokenKind, Matcher)] = &[(TokenKind::Number, number)];

/// Characters that end a term unless escaped.
const SPECIAL_CHARS: &[char] = &[
    '+', '-', '!', '(', ')', ':', '=', '^', '[', ']', '"', '{', '}', '~', '*', '?', '\\', '/',
];

/// Tokenizes a query string.
pub struct Lexer<'a> {
    /// The original input string.
    input: &'a str,
    /// Current byte position in input.
    position: usize,
    /// Current 1-based line.
    line: usize,
    /// Current 1-based column.
    column: usize,
    /// Active lexical state.
    state: LexState,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input.
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            position: 0,
            line: 1,
            column: 1,
            state: LexState::Default,
        }
    }

    /// Returns the current lexical state.
    pub fn state(&self) -> LexState {
        self.state
    }

    /// Returns the next token. At end of input an `Eof` token is returned on every call.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace();

        let rest = &self.input[self.position..];
        if rest.is_empty() {
            return Ok(self.make_token(TokenKind::Eof, 0, String::new()));
        }

        let (kind, len, image) = match self.state {
            LexState::Default => self.scan_default(rest)?,
            LexState::Range => self.match_rules(rest, RANGE_RULES, "unexpected text in range")?,
            LexState::Boost => self.match_rules(rest, BOOST_RULES, "expected number after '^'")?,
        };

        let token = self.make_token(kind, len, image);
        self.advance(len);
        self.state = match (self.state, kind) {
            (_, TokenKind::Caret) => LexState::Boost,
            (_, TokenKind::LBracket | TokenKind::LBrace) => LexState::Range,
            (LexState::Range, TokenKind::RBracket | TokenKind::RBrace)
            | (LexState::Boost, TokenKind::Number) => LexState::Default,
            (state, _) => state,
        };
        Ok(token)
    }

    /// Scans one token in the default state.
    fn scan_default(&self, rest: &str) -> Result<(TokenKind, usize, String), LexError> {
        // `+`, `-` or `!` followed by whitespace is a term of its own
        if let Some(len) = bare_operator(rest) {
            return Ok((TokenKind::Term, len, rest[..1].to_string()));
        }
        if rest.starts_with('"') && quoted(rest).is_none() {
            return Err(self.error("unclosed quote", rest));
        }
        self.match_rules(rest, DEFAULT_RULES, "unexpected character")
    }

    /// Applies the longest-match rule over an ordered rule table.
    fn match_rules(
        &self,
        rest: &str,
        rules: &[(TokenKind, Matcher)],
        message: &str,
    ) -> Result<(TokenKind, usize, String), LexError> {
        let mut best: Option<(TokenKind, usize)> = None;
        for &(kind, matcher) in rules {
            if let Some(len) = matcher(rest)
                && len > best.map_or(0, |(_, l)| l)
            {
                best = Some((kind, len));
            }
        }
        match best {
            Some((kind, len)) => Ok((kind, len, rest[..len].to_string())),
            None => Err(self.error(message, rest)),
        }
    }

    /// Builds a token starting at the current position.
    fn make_token(&self, kind: TokenKind, len: usize, image: String) -> Token {
        Token {
            kind,
            image,
            start: self.position,
            end: self.position + len,
            line: self.line,
            column: self.column,
        }
    }

    /// Creates an error at the current position.
    fn error(&self, message: &str, rest: &str) -> LexError {
        let text = rest.split_whitespace().next().unwrap_or_default();
        LexError::new(
            message,
            self.position,
            (self.line, self.column),
            text,
            self.input,
        )
    }

    /// Skips whitespace, including the ideographic space.
    fn skip_whitespace(&mut self) {
        let rest = &self.input[self.position..];
        let len = rest.len() - rest.trim_start().len();
        self.advance(len);
    }

    /// Advances by `len` bytes, tracking line and column.
    fn advance(&mut self, len: usize) {
        for ch in self.input[self.position..self.position + len].chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.position += len;
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_token() {
            Ok(token) if token.kind == TokenKind::Eof => None,
            other => Some(other),
        }
    }
}

/// Convenience function to tokenize a whole query string, excluding the final `Eof`.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(input).collect()
}

/// Matches a single character.
fn single(s: &str, ch: char) -> Option<usize> {
    s.starts_with(ch).then_some(ch.len_utf8())
}

/// Matches a case-insensitive ASCII keyword.
fn keyword(s: &str, word: &str) -> Option<usize> {
    s.get(..word.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(word))
        .then_some(word.len())
}

/// Matches `AND` or `&&`.
fn and_operator(s: &str) -> Option<usize> {
    keyword(s, "AND").or_else(|| s.starts_with("&&").then_some(2))
}

/// Matches `OR` or `||`.
fn or_operator(s: &str) -> Option<usize> {
    keyword(s, "OR").or_else(|| s.starts_with("||").then_some(2))
}

/// Matches `NOT`.
fn not_operator(s: &str) -> Option<usize> {
    keyword(s, "NOT")
}

/// Matches `+`, `-` or `!` directly followed by whitespace.
fn bare_operator(s: &str) -> Option<usize> {
    let mut chars = s.chars();
    let op = chars.next().filter(|c| matches!(c, '+' | '-' | '!'))?;
    let ws = chars.next().filter(|c| c.is_whitespace())?;
    Some(op.len_utf8() + ws.len_utf8())
}

/// Returns true if `c` may start a term.
fn is_term_start(c: char) -> bool {
    !c.is_whitespace() && !SPECIAL_CHARS.contains(&c)
}

/// Returns true if `c` may continue a term.
pub fn is_term_char(c: char) -> bool {
    is_term_start(c) || c == '-' || c == '+'
}

/// Scans a run of characters accepted by `first`/`rest`, honoring backslash escapes.
fn scan_run(s: &str, first: fn(char) -> bool, rest: fn(char) -> bool) -> Option<usize> {
    let mut chars = s.chars();
    let mut len = 0;
    let mut accept = first;
    while let Some(c) = chars.next() {
        if c == '\\' {
            let escaped = chars.next()?;
            len += c.len_utf8() + escaped.len_utf8();
        } else if accept(c) {
            len += c.len_utf8();
        } else {
            break;
        }
        accept = rest;
    }
    (len > 0).then_some(len)
}

/// Matches a plain term.
fn term(s: &str) -> Option<usize> {
    scan_run(s, is_term_start, is_term_char)
}

/// Matches a term followed by a single trailing `*`.
fn prefix_term(s: &str) -> Option<usize> {
    let len = term(s)?;
    s[len..].starts_with('*').then_some(len + 1)
}

/// Matches a term that may contain `*` and `?` anywhere.
fn wild_term(s: &str) -> Option<usize> {
    scan_run(
        s,
        |c| is_term_start(c) || c == '*' || c == '?',
        |c| is_term_char(c) || c == '*' || c == '?',
    )
}

/// Matches a double-quoted string with backslash escapes.
fn quoted(s: &str) -> Option<usize> {
    let mut chars = s.char_indices();
    chars.next().filter(|(_, c)| *c == '"')?;
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => {
                chars.next()?;
            }
            '"' => return Some(i + 1),
            _ => {}
        }
    }
    None
}

/// Matches a quoted range bound, which must not be empty.
fn range_quoted(s: &str) -> Option<usize> {
    quoted(s).filter(|&len| len > 2)
}

/// Matches a run of range bound characters.
fn range_chars(s: &str) -> Option<usize> {
    let len = s
        .find(|c: char| c.is_whitespace() || c == ']' || c == '}')
        .unwrap_or(s.len());
    (len > 0).then_some(len)
}

/// Matches `digits[.digits]`.
fn number(s: &str) -> Option<usize> {
    let digits = |t: &str| t.bytes().take_while(u8::is_ascii_digit).count();
    let int = digits(s);
    if int == 0 {
        return None;
    }
    match s[int..].strip_prefix('.').map(digits) {
        Some(frac) if frac > 0 => Some(int + 1 + frac),
        _ => Some(int),
    }
}

/// Matches `~` with an optional number.
fn tilde(s: &str) -> Option<usize> {
    let rest = s.strip_prefix('~')?;
    Some(1 + number(rest).unwrap_or(0))
}

/// Matches `#` followed by ASCII digits.
fn reference(s: &str) -> Option<usize> {
    let rest = s.strip_prefix('#')?;
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    (digits > 0).then_some(1 + digits)
}

/// Matches a `/.../` literal; `\/` does not close it.
fn regexp(s: &str) -> Option<usize> {
    let mut chars = s.char_indices();
    chars.next().filter(|(_, c)| *c == '/')?;
    let mut escaped = false;
    for (i, c) in chars {
        match c {
            '/' if !escaped => return Some(i + 1),
            '\\' => escaped = !escaped,
            _ => escaped = false,
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input).unwrap().into_iter().map(|t| t.kind).collect()
    }

    fn images(input: &str) -> Vec<String> {
        tokenize(input)
            .unwrap()
            .into_iter()
            .map(|t| t.image)
            .collect()
    }

    #[test]
    fn empty_input() {
        assert!(tokenize("").unwrap().is_empty());
        assert!(tokenize("  \t\u{3000} ").unwrap().is_empty());
    }

    #[test]
    fn eof_is_sticky() {
        let mut lexer = Lexer::new("a");
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Term);
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Eof);
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Eof);
    }

    #[test]
    fn operators_are_case_insensitive_keywords() {
        use TokenKind::*;
        assert_eq!(kinds("a AND b"), vec![Term, And, Term]);
        assert_eq!(kinds("a and b or c not d"), vec![Term, And, Term, Or, Term, Not, Term]);
        assert_eq!(kinds("a && b || c"), vec![Term, And, Term, Or, Term]);
    }

    #[test]
    fn longer_terms_beat_keywords() {
        assert_eq!(kinds("ANDROID oracle notes"), vec![TokenKind::Term; 3]);
        assert_eq!(images("a&&b"), vec!["a&&b"]);
    }

    #[test]
    fn modifiers() {
        use TokenKind::*;
        assert_eq!(kinds("+a -b !c"), vec![Plus, Term, Minus, Term, Bang, Term]);
    }

    #[test]
    fn bare_operator_is_a_term() {
        let tokens = tokenize("a - b").unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Term);
        assert_eq!(tokens[1].image, "-");
        assert_eq!(tokens[2].image, "b");
    }

    #[test]
    fn dashes_inside_terms() {
        assert_eq!(images("foo-bar a+b"), vec!["foo-bar", "a+b"]);
    }

    #[test]
    fn field_separators() {
        use TokenKind::*;
        assert_eq!(kinds("title:rust"), vec![Term, Colon, Term]);
        assert_eq!(kinds("名称=测试"), vec![Term, Equals, Term]);
        assert_eq!(kinds("*:*"), vec![Star, Colon, Star]);
    }

    #[test]
    fn quoted_string_keeps_escapes() {
        let tokens = tokenize(r#""say \"hi\"" x"#).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::QuotedString);
        assert_eq!(tokens[0].image, r#""say \"hi\"""#);
        assert_eq!(tokens[1].image, "x");
    }

    #[test]
    fn unclosed_quote_error() {
        let err = tokenize("a \"hello world").unwrap_err();
        assert_eq!(err.position, 2);
        assert_eq!(err.column, 3);
        assert!(err.message.contains("unclosed quote"));
    }

    #[test]
    fn term_classification() {
        use TokenKind::*;
        assert_eq!(
            kinds("term te*rm term* *term te?m term** ?"),
            vec![Term, WildTerm, PrefixTerm, WildTerm, WildTerm, WildTerm, WildTerm]
        );
    }

    #[test]
    fn escaped_wildcards_stay_in_term() {
        assert_eq!(kinds(r"foo\*bar"), vec![TokenKind::Term]);
        assert_eq!(kinds(r"foo\?ba?r"), vec![TokenKind::WildTerm]);
        assert_eq!(images(r"a\:b"), vec![r"a\:b"]);
    }

    #[test]
    fn trailing_backslash_is_an_error() {
        assert!(tokenize("abc\\").is_err());
    }

    #[test]
    fn fuzzy_suffix() {
        use TokenKind::*;
        assert_eq!(kinds("roam~"), vec![Term, Tilde]);
        assert_eq!(images("roam~0.7 \"a b\"~3"), vec!["roam", "~0.7", "\"a b\"", "~3"]);
        assert_eq!(kinds("roam~ x"), vec![Term, Tilde, Term]);
    }

    #[test]
    fn numbers_and_references() {
        use TokenKind::*;
        assert_eq!(
            kinds("3 3.5 3abc #12 #12a #"),
            vec![Number, Number, Term, Reference, Term, Term]
        );
    }

    #[test]
    fn regexp_literal() {
        let tokens = tokenize(r"/[a-z]\/x/ b").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Regexp);
        assert_eq!(tokens[0].image, r"/[a-z]\/x/");
        assert!(tokenize("/open").is_err());
    }

    #[test]
    fn boost_state() {
        use TokenKind::*;
        let mut lexer = Lexer::new("a^2.5 b");
        assert_eq!(lexer.next_token().unwrap().kind, Term);
        assert_eq!(lexer.next_token().unwrap().kind, Caret);
        assert_eq!(lexer.state(), LexState::Boost);
        let number = lexer.next_token().unwrap();
        assert_eq!((number.kind, number.image.as_str()), (Number, "2.5"));
        assert_eq!(lexer.state(), LexState::Default);
        assert_eq!(lexer.next_token().unwrap().kind, Term);
    }

    #[test]
    fn boost_requires_number() {
        let err = tokenize("rust^abc").unwrap_err();
        assert!(err.message.contains("expected number"));
        assert_eq!(err.text, "abc");
    }

    #[test]
    fn range_state() {
        use TokenKind::*;
        assert_eq!(kinds("[a TO z]"), vec![LBracket, Term, To, Term, RBracket]);
        assert_eq!(kinds("{a TO \"z z\"}"), vec![LBrace, Term, To, QuotedString, RBrace]);
        assert_eq!(images("[ * TO 2010-01-01]"), vec!["[", "*", "TO", "2010-01-01", "]"]);
        assert_eq!(kinds("[a TO b] AND c"), vec![LBracket, Term, To, Term, RBracket, And, Term]);
    }

    #[test]
    fn range_keyword_is_case_sensitive() {
        assert_eq!(images("[a to b]"), vec!["[", "a", "to", "b", "]"]);
        assert_eq!(tokenize("[a TOP b]").unwrap()[2].kind, TokenKind::Term);
    }

    #[test]
    fn boost_after_range() {
        use TokenKind::*;
        assert_eq!(kinds("[a TO b]^2"), vec![LBracket, Term, To, Term, RBracket, Caret, Number]);
    }

    #[test]
    fn offsets_lines_and_columns() {
        let tokens = tokenize("测试 ab\n  cd").unwrap();
        assert_eq!((tokens[0].start, tokens[0].end), (0, 6));
        assert_eq!((tokens[1].line, tokens[1].column), (1, 4));
        assert_eq!((tokens[2].line, tokens[2].column), (2, 3));
    }

    #[test]
    fn unexpected_character_reports_location() {
        let err = tokenize("a\n ]").unwrap_err();
        assert_eq!((err.line, err.column), (2, 2));
        assert_eq!(err.text, "]");
    }
}
