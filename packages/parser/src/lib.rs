//! # Folio Parser
//!
//! Turns untrusted generator output into a markup tree and back.
//!
//! ```text
//! raw text ─ sanitize ─ lex (logos) ─ build tree ──► Element
//!                                        │ truncated?
//!                                        └─ repair (close open tags) ─ retry once
//! ```
//!
//! The tree is schema-agnostic; the book schema lives in `folio-editor`.

pub mod ast;
pub mod error;
pub mod lexer;
pub mod normalize;
pub mod parser;
pub mod repair;
pub mod sanitize;
pub mod serializer;

#[cfg(test)]
mod tests_repair;

pub use ast::{canonical_tag, same_tag, Element, Node, RootKind};
#[cfg(feature = "pretty-errors")]
pub use error::format_error;
pub use error::{ParseError, ParseResult};
pub use normalize::{normalize_paragraph, word_count};
pub use parser::{parse, parse_strict, Parser};
pub use repair::repair;
pub use sanitize::sanitize;
pub use serializer::{render, Serializer};
