//! # Core Type Definitions
//!
//! This module contains the foundation types for the form engine:
//! - `Identifier` - form-scoped node names
//! - `LegendInput` - the tagged bool-or-raw-text legend flag input
//! - `DisplayList` / `DisplayEntry` - ordered label/key mappings
//! - `FormError` - the single error enum for the crate
//!
//! ## Determinism Guarantees
//!
//! All types in this module implement `Ord` where they participate in
//! `BTreeMap`/`BTreeSet` keys, and `DisplayList` preserves insertion order
//! rather than sorting.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// IDENTIFIER
// =============================================================================

/// A node identifier, unique within one form.
///
/// Identifiers are form-scoped: a container has no identifier namespace of
/// its own, and uniqueness is enforced by the parent form's namespace.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(pub String);

impl Identifier {
    /// Create a new identifier from a string.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identifier {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for Identifier {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// =============================================================================
// LEGEND INPUT
// =============================================================================

/// Input to the legend flag setter.
///
/// The setter may be invoked from typed internal code (a native boolean) or
/// from untyped form-submission data (raw text). Rather than inspecting
/// runtime types, the two shapes are modeled as a tagged input resolved
/// through one normalization function.
///
/// The `untagged` representation means JSON `true` and JSON `"1"` both
/// deserialize without the caller having to announce which shape it sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LegendInput {
    /// A native boolean, used as-is.
    Flag(bool),
    /// Raw text from an untyped source; true only for `"1"` or `"True"`.
    Text(String),
}

impl LegendInput {
    /// Resolve the input to a boolean.
    ///
    /// A native flag passes through unchanged. Raw text is true only when it
    /// equals `"1"` or `"True"` (case-sensitive); every other representation
    /// normalizes to false.
    #[must_use]
    pub fn normalize(&self) -> bool {
        match self {
            Self::Flag(value) => *value,
            Self::Text(value) => value == "1" || value == "True",
        }
    }
}

impl From<bool> for LegendInput {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<&str> for LegendInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for LegendInput {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

// =============================================================================
// DISPLAY LIST
// =============================================================================

/// One entry of a `DisplayList`: a stable key and its display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayEntry {
    pub key: String,
    pub label: String,
}

/// An ordered key/label mapping used to populate selection widgets.
///
/// Entries keep insertion order; the list is a view built fresh by its
/// producer, never cached.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisplayList(Vec<DisplayEntry>);

impl DisplayList {
    /// Create a new empty display list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn add(&mut self, key: impl Into<String>, label: impl Into<String>) {
        self.0.push(DisplayEntry {
            key: key.into(),
            label: label.into(),
        });
    }

    /// Look up the label for a key.
    #[must_use]
    pub fn label_for(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.label.as_str())
    }

    /// Iterate entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = &DisplayEntry> {
        self.0.iter()
    }

    /// Iterate keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|entry| entry.key.as_str())
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the Formfold engine.
///
/// - No silent failures for namespace violations
/// - Everything else is normalized rather than rejected; the engine should
///   never panic, and all errors are recoverable
#[derive(Debug, Error)]
pub enum FormError {
    /// The candidate identifier matches a reserved word.
    #[error("the id \"{0}\" is reserved")]
    ReservedIdentifier(String),

    /// The candidate identifier is already used within the form.
    #[error("the id \"{0}\" is already in use")]
    IdentifierTaken(String),

    /// No node with the given identifier exists in the form.
    #[error("unknown node: {0}")]
    UnknownNode(String),

    /// The addressed node exists but is not a fieldset container.
    #[error("not a fieldset: {0}")]
    NotAFieldset(String),

    /// A definition failed boundary validation before reaching the engine.
    #[error("invalid definition: {0}")]
    InvalidDefinition(String),

    /// A serialization error occurred.
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// A deserialization error occurred.
    #[error("deserialization error: {0}")]
    DeserializationError(String),

    /// An I/O error occurred (app layer only; the core performs no I/O).
    #[error("I/O error: {0}")]
    IoError(String),
}

// =============================================================================
// TESTS
// =============================================================================
