//! # formfold-core
//!
//! The deterministic form-structure engine for Formfold - THE LOGIC.
//!
//! This crate models a dynamic form as an ordered tree of typed nodes and
//! implements the fieldset grouping construct: boundary markers that bracket
//! a group of fields for rendering, conditional display driven by another
//! field's submitted value, and identifier integrity within the parent form.
//!
//! ## Architectural Constraints
//!
//! - Pure Rust: no async, no network, no file I/O
//! - Deterministic: `BTreeMap`/`BTreeSet` where mappings are needed, ordered
//!   `Vec`s where insertion order is the contract
//! - Closed: the set of recognized node kinds is enumerated statically;
//!   nothing is composed into the schema at runtime
//! - Tolerant at the edges: setters normalize rather than reject, with one
//!   exception - the reserved-identifier check, which is the only rejection
//!   a caller must surface

// =============================================================================
// MODULES
// =============================================================================

pub mod condition;
pub mod constants;
pub mod field;
pub mod fieldset;
pub mod form;
pub mod formats;
pub mod render;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{DisplayEntry, DisplayList, FormError, Identifier, LegendInput};

// =============================================================================
// RE-EXPORTS: Node Model
// =============================================================================

pub use field::{FieldKind, FieldNode, FormNode, NodeKind, NoteNode, VocabEntry, Vocabulary};

// =============================================================================
// RE-EXPORTS: Fieldset Container
// =============================================================================

pub use fieldset::{BoundaryMarker, FieldsetContainer, FieldsetItem};

// =============================================================================
// RE-EXPORTS: Parent Form & Evaluation
// =============================================================================

pub use condition::SubmittedValues;
pub use form::{Form, IdentifierNamespace, ParentForm};
pub use render::{RenderStep, render_sequence};

// =============================================================================
// RE-EXPORTS: Formats
// =============================================================================

pub use formats::{DefinitionHeader, form_from_bytes, form_to_bytes};
