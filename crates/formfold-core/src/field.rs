//! # Node Model
//!
//! The closed set of node types a form tree can contain.
//!
//! The original notion of "anything carrying a field marker attribute is a
//! field" is replaced by an explicit, statically enumerated model: a node is
//! a form field exactly when it is a `FormNode::Field` - an own-variant test
//! that can never be satisfied from inherited or ambient context.

use crate::fieldset::FieldsetContainer;
use crate::types::Identifier;
use serde::{Deserialize, Serialize};

// =============================================================================
// VOCABULARY
// =============================================================================

/// One selectable option of a selection field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabEntry {
    /// Stable key submitted with the form.
    pub key: String,
    /// Label shown to the person filling the form in.
    pub label: String,
}

/// The ordered option set of a selection field.
///
/// Native order is definition order; nothing sorts or dedupes entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vocabulary(Vec<VocabEntry>);

impl Vocabulary {
    /// Create a new empty vocabulary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a vocabulary whose labels equal their keys.
    #[must_use]
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            keys.into_iter()
                .map(|key| {
                    let key = key.into();
                    VocabEntry {
                        label: key.clone(),
                        key,
                    }
                })
                .collect(),
        )
    }

    /// Append an option.
    pub fn add(&mut self, key: impl Into<String>, label: impl Into<String>) {
        self.0.push(VocabEntry {
            key: key.into(),
            label: label.into(),
        });
    }

    /// Iterate option keys in native order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|entry| entry.key.as_str())
    }

    /// Join the option keys with the given separator, in native order.
    #[must_use]
    pub fn joined_keys(&self, separator: &str) -> String {
        self.keys().collect::<Vec<_>>().join(separator)
    }

    /// Iterate entries in native order.
    pub fn entries(&self) -> impl Iterator<Item = &VocabEntry> {
        self.0.iter()
    }

    /// Number of options.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check whether the vocabulary is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// =============================================================================
// NODE KINDS
// =============================================================================

/// The closed set of node kinds, used for type filters.
///
/// This is the static replacement for open meta-type strings: enumeration
/// filters match against these discriminants, and nothing outside this enum
/// can ever qualify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Text,
    TextArea,
    Selection,
    Checkbox,
    Note,
    Fieldset,
}

/// The control a field renders as, with its per-kind configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Single-line text input.
    Text,
    /// Multi-line text input.
    TextArea,
    /// Choice among a fixed vocabulary of options.
    Selection { vocabulary: Vocabulary },
    /// Boolean checkbox.
    Checkbox,
}

impl FieldKind {
    /// The discriminant used by type filters.
    #[must_use]
    pub fn node_kind(&self) -> NodeKind {
        match self {
            Self::Text => NodeKind::Text,
            Self::TextArea => NodeKind::TextArea,
            Self::Selection { .. } => NodeKind::Selection,
            Self::Checkbox => NodeKind::Checkbox,
        }
    }

    /// The vocabulary of a selection control, if any.
    #[must_use]
    pub fn vocabulary(&self) -> Option<&Vocabulary> {
        match self {
            Self::Selection { vocabulary } => Some(vocabulary),
            _ => None,
        }
    }
}

// =============================================================================
// FIELD NODE
// =============================================================================

/// A form field: a node that collects a value on submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldNode {
    /// Form-scoped identifier.
    pub identifier: Identifier,
    /// Display title.
    pub title: String,
    /// Help text shown alongside the control.
    #[serde(default)]
    pub description: String,
    /// Whether submission requires a value.
    #[serde(default)]
    pub required: bool,
    /// The control and its configuration.
    pub kind: FieldKind,
}

impl FieldNode {
    /// Create a new field node.
    #[must_use]
    pub fn new(identifier: impl Into<Identifier>, title: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            identifier: identifier.into(),
            title: title.into(),
            description: String::new(),
            required: false,
            kind,
        }
    }

    /// Create a selection field over the given vocabulary.
    #[must_use]
    pub fn selection(
        identifier: impl Into<Identifier>,
        title: impl Into<String>,
        vocabulary: Vocabulary,
    ) -> Self {
        Self::new(identifier, title, FieldKind::Selection { vocabulary })
    }

    /// The discriminant used by type filters.
    #[must_use]
    pub fn node_kind(&self) -> NodeKind {
        self.kind.node_kind()
    }
}

// =============================================================================
// NOTE NODE
// =============================================================================

/// A display-only block of text placed between fields.
///
/// Notes live in the tree but carry no field capability: they collect no
/// value and are skipped by field enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteNode {
    /// Form-scoped identifier.
    pub identifier: Identifier,
    /// The text to display.
    pub text: String,
}

impl NoteNode {
    /// Create a new note node.
    #[must_use]
    pub fn new(identifier: impl Into<Identifier>, text: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            text: text.into(),
        }
    }
}

// =============================================================================
// FORM NODE
// =============================================================================

/// Any node a form or fieldset can contain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormNode {
    /// A value-collecting form field.
    Field(FieldNode),
    /// A display-only text block.
    Note(NoteNode),
    /// A nested grouping container.
    Fieldset(FieldsetContainer),
}

impl FormNode {
    /// The node's form-scoped identifier.
    #[must_use]
    pub fn identifier(&self) -> &Identifier {
        match self {
            Self::Field(field) => &field.identifier,
            Self::Note(note) => &note.identifier,
            Self::Fieldset(fieldset) => fieldset.identifier(),
        }
    }

    /// Field capability probe.
    ///
    /// True exactly for `Field` nodes. This is a test on the node's own
    /// variant; no inherited or ambient context can satisfy it.
    #[must_use]
    pub fn is_form_field(&self) -> bool {
        matches!(self, Self::Field(_))
    }

    /// The discriminant used by type filters.
    #[must_use]
    pub fn node_kind(&self) -> NodeKind {
        match self {
            Self::Field(field) => field.node_kind(),
            Self::Note(_) => NodeKind::Note,
            Self::Fieldset(_) => NodeKind::Fieldset,
        }
    }

    /// View the node as a field, if it is one.
    #[must_use]
    pub fn as_field(&self) -> Option<&FieldNode> {
        match self {
            Self::Field(field) => Some(field),
            _ => None,
        }
    }

    /// View the node as a fieldset, if it is one.
    #[must_use]
    pub fn as_fieldset(&self) -> Option<&FieldsetContainer> {
        match self {
            Self::Fieldset(fieldset) => Some(fieldset),
            _ => None,
        }
    }

    /// Mutable view of the node as a fieldset, if it is one.
    pub fn as_fieldset_mut(&mut self) -> Option<&mut FieldsetContainer> {
        match self {
            Self::Fieldset(fieldset) => Some(fieldset),
            _ => None,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
