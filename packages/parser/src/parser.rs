use crate::ast::{same_tag, Element, Node, RootKind};
use crate::error::{ParseError, ParseResult};
use crate::lexer::{tokenize, unescape, Lexeme, Spanned};
use crate::repair::repair;
use crate::sanitize::sanitize;
use std::ops::Range;

/// Stack-based tree builder over classified tokens
pub struct Parser<'src> {
    tokens: Vec<Spanned<'src>>,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            tokens: tokenize(source),
        }
    }

    /// Build the single root element. Strict: any unbalanced tag is an error.
    pub fn parse_element(self) -> ParseResult<Element> {
        let mut stack: Vec<(Element, Range<usize>)> = Vec::new();
        let mut root: Option<Element> = None;

        for Spanned { lexeme, span } in self.tokens {
            match lexeme {
                Lexeme::Comment | Lexeme::Declaration => {}

                Lexeme::Text(raw) => {
                    if raw.trim().is_empty() {
                        continue;
                    }
                    match stack.last_mut() {
                        Some((parent, _)) => parent.children.push(Node::text(unescape(raw))),
                        None => return Err(ParseError::StrayText { span }),
                    }
                }

                Lexeme::Open {
                    name,
                    attributes,
                    self_closing,
                } => {
                    if stack.is_empty() && root.is_some() {
                        return Err(ParseError::MultipleRoots { span });
                    }
                    let element = Element {
                        name: name.to_string(),
                        attributes,
                        children: Vec::new(),
                    };
                    if self_closing {
                        attach(&mut stack, &mut root, element);
                    } else {
                        stack.push((element, span));
                    }
                }

                Lexeme::Close { name } => {
                    let (element, _) = stack.pop().ok_or_else(|| ParseError::UnexpectedClose {
                        span: span.clone(),
                        found: name.to_string(),
                    })?;
                    if !same_tag(&element.name, name) {
                        return Err(ParseError::MismatchedClose {
                            span,
                            expected: element.name,
                            found: name.to_string(),
                        });
                    }
                    attach(&mut stack, &mut root, element);
                }
            }
        }

        if let Some((element, span)) = stack.pop() {
            // Report the outermost open element: that is what a repair must close last
            let (name, span) = stack
                .into_iter()
                .next()
                .map(|(outer, outer_span)| (outer.name, outer_span))
                .unwrap_or((element.name, span));
            return Err(ParseError::Unclosed { span, name });
        }

        root.ok_or(ParseError::Empty)
    }
}

fn attach(
    stack: &mut [(Element, Range<usize>)],
    root: &mut Option<Element>,
    element: Element,
) {
    match stack.last_mut() {
        Some((parent, _)) => parent.children.push(Node::Element(element)),
        None => *root = Some(element),
    }
}

/// Parse already-clean markup without sanitizing or repairing
pub fn parse_strict(source: &str) -> ParseResult<Element> {
    Parser::new(source).parse_element()
}

/// Parse untrusted generator output into a tree rooted at `expected`.
///
/// Sanitizes first, then parses strictly. If that fails, one repair pass
/// closes any elements left open and the parse is retried exactly once.
pub fn parse(text: &str, expected: RootKind) -> ParseResult<Element> {
    let clean = sanitize(text, expected)?;

    let root = match parse_strict(&clean) {
        Ok(root) => root,
        Err(first) if first.is_truncation() => match repair(&clean) {
            Some(repaired) => parse_strict(&repaired)?,
            None => return Err(first),
        },
        Err(first) => return Err(first),
    };

    if !expected.matches(&root.name) {
        return Err(ParseError::UnexpectedRoot {
            span: 0..clean.len(),
            expected,
            found: root.name,
        });
    }

    Ok(root)
}
