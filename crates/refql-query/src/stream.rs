//! One-token lookahead over the lexer.

use crate::{
    error::LexError,
    lexer::{Lexer, Token, TokenKind},
};

/// Buffers lexer output so the parser can peek one token ahead.
pub struct TokenStream<'a> {
    /// Underlying lexer.
    lexer: Lexer<'a>,
    /// Token read ahead of the parser, if any.
    lookahead: Option<Token>,
}

impl<'a> TokenStream<'a> {
    /// Creates a token stream over the given input.
    pub fn new(input: &'a str) -> Self {
        Self {
            lexer: Lexer::new(input),
            lookahead: None,
        }
    }

    /// Returns the next token without consuming it.
    pub fn peek(&mut self) -> Result<&Token, LexError> {
        let token = match self.lookahead.take() {
            Some(token) => token,
            None => self.lexer.next_token()?,
        };
        Ok(self.lookahead.insert(token))
    }

    /// Returns the kind of the next token without consuming it.
    pub fn peek_kind(&mut self) -> Result<TokenKind, LexError> {
        self.peek().map(|token| token.kind)
    }

    /// Consumes and returns the next token.
    pub fn next(&mut self) -> Result<Token, LexError> {
        match self.lookahead.take() {
            Some(token) => Ok(token),
            None => self.lexer.next_token(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peek_does_not_consume() {
        let mut stream = TokenStream::new("a b");
        assert_eq!(stream.peek().unwrap().image, "a");
        assert_eq!(stream.peek().unwrap().image, "a");
        assert_eq!(stream.next().unwrap().image, "a");
        assert_eq!(stream.next().unwrap().image, "b");
        assert_eq!(stream.peek_kind().unwrap(), TokenKind::Eof);
    }

    #[test]
    fn peek_kind_follows_lexer_states() {
        let mut stream = TokenStream::new("title:[a TO b]^2");
        let mut kinds = Vec::new();
        while stream.peek_kind().unwrap() != TokenKind::Eof {
            kinds.push(stream.next().unwrap().kind);
        }
        assert_eq!(
            kinds,
            vec![
                TokenKind::Term,
                TokenKind::Colon,
                TokenKind::LBracket,
                TokenKind::Term,
                TokenKind::To,
                TokenKind::Term,
                TokenKind::RBracket,
                TokenKind::Caret,
                TokenKind::Number,
            ]
        );
    }

    #[test]
    fn lexical_errors_surface_on_peek() {
        let mut stream = TokenStream::new("\"open");
        assert!(stream.peek().is_err());
    }
}
