//! Lexer for HTML fragments using logos
//!
//! Tags are lexed whole; attribute splitting happens in the parser so the
//! DFA stays small. Anything that does not form a tag falls back to text.

use crate::error::{ParseError, ParseResult};
use logos::{Lexer, Logos};
use std::ops::Range;

/// Token types for HTML fragments
#[derive(Logos, Debug, Clone, PartialEq, Eq)]
pub enum Token<'src> {
    /// `<!-- ... -->`, body without the delimiters
    #[token("<!--", comment)]
    Comment(&'src str),

    /// `<!DOCTYPE html>` and other markup declarations
    #[regex(r"<![a-zA-Z][^>]*>")]
    Declaration,

    /// `<?xml ... ?>`
    #[regex(r"<\?[^>]*>")]
    ProcessingInstruction,

    /// Full start tag including attributes, e.g. `<a href="x">`
    #[regex(r#"<[a-zA-Z][a-zA-Z0-9-]*([^>"']|"[^"]*"|'[^']*')*>"#, |lex| lex.slice())]
    StartTag(&'src str),

    /// End tag, e.g. `</strong>`
    #[regex(r"</[a-zA-Z][a-zA-Z0-9-]*[ \t\r\n]*>", |lex| lex.slice())]
    EndTag(&'src str),

    /// Character data between tags
    #[regex(r"[^<]+", |lex| lex.slice())]
    Text(&'src str),

    /// A `<` that does not start a tag; treated as text
    #[token("<")]
    Lt,
}

fn comment<'src>(lex: &mut Lexer<'src, Token<'src>>) -> Option<&'src str> {
    let end = lex.remainder().find("-->")?;
    lex.bump(end + 3);
    let slice = lex.slice();
    Some(&slice[4..slice.len() - 3])
}

impl<'src> Token<'src> {
    /// Tag name of a start or end tag, lowercased
    pub fn tag_name(&self) -> Option<String> {
        let raw = match self {
            Token::StartTag(s) => &s[1..],
            Token::EndTag(s) => &s[2..],
            _ => return None,
        };
        let end = raw
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
            .unwrap_or(raw.len());
        Some(raw[..end].to_ascii_lowercase())
    }
}

/// Tokenize a fragment into tokens with their byte spans.
///
/// A `<` that starts something the lexer cannot finish, such as a start tag
/// cut off before its `>`, becomes a [`Token::Lt`] and lexing resumes right
/// after it. Only an unterminated comment is an error.
pub fn tokenize(source: &str) -> ParseResult<Vec<(Token<'_>, Range<usize>)>> {
    let mut tokens = Vec::new();
    let mut offset = 0;
    let mut lexer = Token::lexer(source);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let span = offset + span.start..offset + span.end;
        match result {
            Ok(token) => tokens.push((token, span)),
            Err(()) if source[span.start..].starts_with("<!--") => {
                return Err(ParseError::unterminated_comment(span.start));
            }
            Err(()) if source[span.start..].starts_with('<') => {
                tokens.push((Token::Lt, span.start..span.start + 1));
                offset = span.start + 1;
                lexer = Token::lexer(&source[offset..]);
            }
            Err(()) => return Err(ParseError::lexer_error(span.start)),
        }
    }

    Ok(tokens)
}
