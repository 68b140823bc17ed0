//! Lexer for generator markup using logos
//!
//! Logos splits the input into tag-shaped runs and text runs. Tag runs are
//! then classified by hand (open, close, self-closing, comment, declaration)
//! because generator output is too loose for a strict grammar: anything that
//! does not classify cleanly is kept as text instead of failing the lex.

use logos::Logos;
use std::ops::Range;

/// Raw token types
#[derive(Logos, Debug, Clone, PartialEq, Eq)]
pub enum Token<'src> {
    #[regex(r"<[^<>]*>", |lex| lex.slice())]
    Tag(&'src str),

    #[regex(r"[^<]+", |lex| lex.slice())]
    Text(&'src str),
}

/// A classified markup token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lexeme<'src> {
    Open {
        name: &'src str,
        attributes: Vec<(String, String)>,
        self_closing: bool,
    },
    Close {
        name: &'src str,
    },
    Text(&'src str),
    Comment,
    Declaration,
}

/// A lexeme with its byte span
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned<'src> {
    pub lexeme: Lexeme<'src>,
    pub span: Range<usize>,
}

/// Lex source into classified tokens. Never fails: unlexable runs become text.
pub fn tokenize(source: &str) -> Vec<Spanned<'_>> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let lexeme = match result {
            Ok(Token::Tag(raw)) => classify_tag(raw).unwrap_or(Lexeme::Text(raw)),
            Ok(Token::Text(raw)) => Lexeme::Text(raw),
            Err(()) => Lexeme::Text(&source[span.clone()]),
        };
        tokens.push(Spanned { lexeme, span });
    }

    tokens
}

fn classify_tag(raw: &str) -> Option<Lexeme<'_>> {
    let inner = &raw[1..raw.len() - 1];

    if inner.starts_with("!--") {
        return Some(Lexeme::Comment);
    }
    if inner.starts_with('?') || inner.starts_with('!') {
        return Some(Lexeme::Declaration);
    }

    if let Some(rest) = inner.strip_prefix('/') {
        let name = rest.trim();
        return is_name(name).then_some(Lexeme::Close { name });
    }

    let (body, self_closing) = match inner.strip_suffix('/') {
        Some(body) => (body, true),
        None => (inner, false),
    };
    let body = body.trim_start();
    let name_end = body
        .find(|c: char| c.is_whitespace())
        .unwrap_or(body.len());
    let name = &body[..name_end];
    if !is_name(name) {
        return None;
    }

    Some(Lexeme::Open {
        name,
        attributes: parse_attributes(&body[name_end..]),
        self_closing,
    })
}

fn is_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'))
}

/// Parse `key="value" key='value' key=value flag` pairs
fn parse_attributes(source: &str) -> Vec<(String, String)> {
    let mut attributes = Vec::new();
    let mut rest = source.trim_start();

    while !rest.is_empty() {
        let key_end = rest
            .find(|c: char| c.is_whitespace() || c == '=')
            .unwrap_or(rest.len());
        let key = &rest[..key_end];
        rest = rest[key_end..].trim_start();

        let value = if let Some(after_eq) = rest.strip_prefix('=') {
            let after_eq = after_eq.trim_start();
            match after_eq.chars().next() {
                Some(quote @ ('"' | '\'')) => {
                    let body = &after_eq[1..];
                    let close = body.find(quote).unwrap_or(body.len());
                    rest = body.get(close + 1..).unwrap_or("");
                    &body[..close]
                }
                _ => {
                    let end = after_eq
                        .find(char::is_whitespace)
                        .unwrap_or(after_eq.len());
                    rest = &after_eq[end..];
                    &after_eq[..end]
                }
            }
        } else {
            ""
        };

        if !key.is_empty() {
            attributes.push((key.to_string(), unescape(value)));
        }
        rest = rest.trim_start();
    }

    attributes
}

/// Decode the predefined entities and numeric character references.
/// Unknown references are left untouched.
pub fn unescape(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let candidate = &rest[amp..];
        let decoded = candidate
            .find(';')
            .filter(|semi| *semi <= 10)
            .and_then(|semi| decode_entity(&candidate[1..semi]).map(|c| (c, semi)));

        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &candidate[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &candidate[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                entity.strip_prefix('#')?.parse().ok()?
            };
            char::from_u32(code)
        }
    }
}
