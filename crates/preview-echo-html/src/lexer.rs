//! # Lexer - Tokenizing Preview Markup
//!
//! This module breaks sanitized preview HTML into a flat sequence of tokens
//! using the [Logos] lexer generator.
//!
//! [Logos]: https://docs.rs/logos
//!
//! Tokens are deliberately coarse: a whole start tag (name and attributes) is
//! one token, a run of character data is one token. Attribute parsing and
//! entity decoding belong to the tree builder, not here.
//!
//! Every byte of the input lands in exactly one token, so concatenating the
//! token texts reproduces the input:
//!
//! ```
//! use preview_echo_html::lexer::tokenize;
//!
//! let input = "<p class=\"a\">Hi &amp; bye</p>";
//! let tokens = tokenize(input).unwrap();
//! let rebuilt: String = tokens.iter().map(|t| t.text).collect();
//! assert_eq!(input, rebuilt);
//! ```
//!
//! ## Malformed input
//!
//! A tag or comment that is opened but never closed is reported as an
//! [`HtmlError`]. A lone `<` that cannot start a tag (`a < b`) is plain text.

use logos::{Lexer, Logos};

use crate::error::HtmlError;

/// Token kinds produced by the Logos lexer.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `<!-- ... -->`
    #[token("<!--", lex_comment)]
    Comment,

    /// `<!DOCTYPE ...>` and `<![CDATA[...]>`-style declarations
    #[regex(r"<![a-zA-Z\[][^>]*>")]
    Declaration,

    /// `<name attr="value" ...>` including self-closing `<br/>`
    #[regex(r"<[a-zA-Z][a-zA-Z0-9-]*", lex_tag_rest)]
    StartTag,

    /// `</name>`
    #[token("</", lex_tag_rest)]
    EndTag,

    /// Character data between tags
    #[regex(r"[^<]+")]
    Text,
}

/// Consume everything up to and including the closing `-->`.
fn lex_comment(lex: &mut Lexer<'_, TokenKind>) -> bool {
    match lex.remainder().find("-->") {
        Some(end) => {
            lex.bump(end + 3);
            true
        }
        None => false,
    }
}

/// Consume the rest of a tag up to the first `>` that is not inside quotes.
fn lex_tag_rest(lex: &mut Lexer<'_, TokenKind>) -> bool {
    let mut quote: Option<char> = None;
    for (i, c) in lex.remainder().char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == '>' => {
                lex.bump(i + 1);
                return true;
            }
            None => {}
        }
    }
    false
}

/// A lexed token with its kind, text slice and byte span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub span: std::ops::Range<usize>,
}

/// Tokenize the input.
///
/// Fails only for constructs that open but never close: a start or end tag
/// without `>`, or a comment without `-->`.
pub fn tokenize(input: &str) -> Result<Vec<Token<'_>>, HtmlError> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(input);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let text = lexer.slice();
        let kind = match result {
            Ok(kind) => kind,
            Err(()) => classify_error(input, span.start)?,
        };
        tokens.push(Token { kind, text, span });
    }

    Ok(tokens)
}

/// Decide what a Logos error at `offset` means.
///
/// Anything that looks like the start of a tag or comment is unterminated;
/// a stray `<` is ordinary text.
fn classify_error(input: &str, offset: usize) -> Result<TokenKind, HtmlError> {
    let rest = &input[offset..];
    if rest.starts_with("<!--") {
        return Err(HtmlError::UnterminatedComment { offset });
    }
    let mut chars = rest.chars().skip(1);
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '/' || c == '!' => {
            Err(HtmlError::UnterminatedTag { offset })
        }
        _ => Ok(TokenKind::Text),
    }
}
