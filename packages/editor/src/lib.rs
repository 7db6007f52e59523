//! # Flatmark Editor
//!
//! Flat run model for inline rich-text editing.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ markup: HTML fragment → Node tree           │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ flatten: tree → Document (runs + tag sets)  │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ mutations: add / remove / update over words │
//! │  - split runs at word boundaries            │
//! │  - report inserted runs for re-indexing     │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ render: Document → markup                   │
//! │  - infer nesting of co-opened tags          │
//! │  - allow-list and link policy on write      │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Runs are independent**: every run carries its full tag set
//! 2. **Order is position**: runs store no index
//! 3. **Lenient addressing**: word ranges clamp, run indices do not
//! 4. **Filter on write**: unknown tags are kept in the model and dropped
//!    only when rendering
//!
//! ## Usage
//!
//! ```rust
//! use flatmark_editor::{EditSession, Schema};
//! use std::collections::BTreeMap;
//!
//! let mut session = EditSession::from_html("<p>one two three</p>", Schema::default())?;
//!
//! // Underline "two": two words from it to the end of run 0, one selected
//! let result = session.add_tag(0, 2, 1, "u", BTreeMap::new())?;
//! assert_eq!(result.inserted, 2);
//!
//! assert_eq!(session.render(), "<p>one <u>two</u> three</p>");
//! # Ok::<(), flatmark_editor::EditorError>(())
//! ```

mod document;
mod errors;
mod flatten;
mod model;
mod mutations;
mod render;
mod schema;
mod selection;
mod session;
mod words;

pub use document::Document;
pub use errors::EditorError;
pub use flatten::{Flattened, Flattener};
pub use model::{Run, RunContent, Tag, TagMark, VoidElement, ANCHOR};
pub use mutations::{Mutation, MutationError, MutationResult};
pub use render::{render, Reconstructor};
pub use schema::{LinkPolicy, Schema};
pub use selection::{Selection, SelectionOutcome, TagAction, WordRange};
pub use session::EditSession;
pub use words::Words;

// Re-export the tree source for convenience
pub use flatmark_markup::{parse_fragment, MarkupTree, Node};
