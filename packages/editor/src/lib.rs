//! # Folio Editor
//!
//! The book model and everything that reads or changes it.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ parser: generator text → markup tree        │
//! └─────────────────────────────────────────────┘
//!                     ↓  codec
//! ┌─────────────────────────────────────────────┐
//! │ editor: Document + Patch                    │
//! │  - identity index over sections             │
//! │  - merge: apply patches by id               │
//! │  - slice: bounded views for the generator   │
//! │  - stats: progress queries                  │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ workspace: snapshots, patch log, replay     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Identity, not position**: patches address sections by id
//! 2. **Replace whole subtrees**: no line-level diffs, so merges are idempotent
//! 3. **Single point of mutation**: only [`merge`] writes into a [`Document`]
//!
//! ## Usage
//!
//! ```rust,ignore
//! use folio_editor::{parse_document, parse_patch, slice, SliceBudgets, SliceMode};
//!
//! let mut doc = parse_document(&outline_text)?;
//! let patch = parse_patch(&generator_reply)?;
//! let outcome = patch.apply(&mut doc);
//!
//! let view = slice(&doc, "4", SliceMode::Local, &SliceBudgets::default())?;
//! let prompt_context = view.render();
//! ```

pub mod codec;
pub mod document;
mod errors;
pub mod merge;
pub mod patch;
pub mod slice;
pub mod stats;

pub use codec::{fingerprint, parse_document, parse_patch, render_document, render_patch};
pub use document::{
    Character, ContentBlock, Document, DocumentParts, Section, SectionIndex, StoryElements,
};
pub use errors::EditorError;
pub use merge::{apply, MergeOutcome};
pub use patch::{FieldPatch, Patch, SectionPatch};
pub use slice::{
    slice, truncate, ContextSlice, SliceBody, SliceBudgets, SliceMode, SliceSection, ELLIPSIS,
};
pub use stats::{BookStats, SectionStatus};
