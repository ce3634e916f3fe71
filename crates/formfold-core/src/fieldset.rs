//! # Fieldset Container
//!
//! The grouping construct that brackets a subset of a form's fields.
//!
//! A container owns its children, derives start/end boundary markers for
//! rendering, gates its visibility on another field's submitted value, and
//! enforces the reserved-identifier denylist. All setters normalize rather
//! than reject; the identifier check is the single rejection a caller must
//! surface.

use crate::condition::{self, SubmittedValues};
use crate::constants::{CANDIDATE_KEY_SEPARATOR, is_reserved};
use crate::field::{FieldNode, FormNode, NodeKind};
use crate::form::{IdentifierNamespace, ParentForm};
use crate::types::{DisplayList, FormError, Identifier, LegendInput};
use serde::{Deserialize, Serialize};

// =============================================================================
// BOUNDARY MARKER
// =============================================================================

/// Read-only view of a fieldset boundary.
///
/// Markers are not persisted entities: they are recomputed from the
/// container's current state at access time and exist only so the rendering
/// layer can bracket the group without separate boundary logic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryMarker {
    /// Display label; mirrors the container title on the start marker.
    pub label: String,
    /// Marker description slot; distinct from the container's stored help text.
    pub description: String,
    /// Whether the label renders as a visual legend.
    pub show_legend: bool,
    /// The marker's internal name; always the container's identifier once
    /// attachment reconciliation has run.
    pub identifier: Identifier,
}

/// One element of an `enumerate_fields` sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldsetItem<'a> {
    /// Opening boundary, present when markers were requested.
    Start(BoundaryMarker),
    /// A contained field, in storage order.
    Field(&'a FieldNode),
    /// Closing boundary, present when markers were requested.
    End(BoundaryMarker),
}

// =============================================================================
// FIELDSET CONTAINER
// =============================================================================

fn default_use_legend() -> bool {
    true
}

/// A container which groups form fields as a fieldset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldsetContainer {
    identifier: Identifier,
    title: String,
    /// Stored "fieldset help" text shown in the container's edit form.
    #[serde(default)]
    description: String,
    /// The start marker's description slot. Shares its setter input with
    /// `description` but is a distinct stored field; do not collapse them.
    #[serde(default)]
    marker_description: String,
    #[serde(default = "default_use_legend")]
    use_legend: bool,
    #[serde(default)]
    conditional_field: Option<Identifier>,
    #[serde(default)]
    conditional_field_value: Option<String>,
    #[serde(default)]
    children: Vec<FormNode>,
    /// The start marker's display label, kept in sync by `set_title`.
    marker_label: String,
    /// The markers' internal name, kept in sync by `set_identifier` and
    /// healed by `on_attached` for paths that bypass it.
    marker_name: Identifier,
}

impl FieldsetContainer {
    /// Create a new container.
    ///
    /// The reserved-identifier guard applies at creation as well as on
    /// rename; everything else about a fresh container is defaulted
    /// (legend shown, no condition, no children).
    pub fn new(identifier: impl Into<String>, title: impl Into<String>) -> Result<Self, FormError> {
        let identifier = identifier.into();
        if is_reserved(&identifier) {
            return Err(FormError::ReservedIdentifier(identifier));
        }
        let identifier = Identifier::new(identifier);
        let title = title.into();
        Ok(Self {
            marker_label: title.clone(),
            marker_name: identifier.clone(),
            identifier,
            title,
            description: String::new(),
            marker_description: String::new(),
            use_legend: true,
            conditional_field: None,
            conditional_field_value: None,
            children: Vec::new(),
        })
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    /// The container's form-scoped identifier.
    #[must_use]
    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    /// The container title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The stored "fieldset help" text.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Whether the title renders as a visual legend.
    #[must_use]
    pub fn use_legend(&self) -> bool {
        self.use_legend
    }

    /// The field whose submitted value gates this container, if any.
    #[must_use]
    pub fn conditional_field(&self) -> Option<&Identifier> {
        self.conditional_field.as_ref()
    }

    /// The value that evaluates the condition as true, if configured.
    #[must_use]
    pub fn conditional_field_value(&self) -> Option<&str> {
        self.conditional_field_value.as_deref()
    }

    /// The contained nodes, in storage order.
    #[must_use]
    pub fn children(&self) -> &[FormNode] {
        &self.children
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<FormNode> {
        &mut self.children
    }

    // =========================================================================
    // SETTERS
    // =========================================================================

    /// Set the container title and the start marker's label.
    pub fn set_title(&mut self, value: impl Into<String>) {
        let value = value.into();
        self.title = value.clone();
        self.marker_label = value;
    }

    /// Set the start marker's description and the stored help text.
    ///
    /// Both slots receive the same input; they stay separate stored fields
    /// because the marker slot participates in rendering while the stored
    /// slot is the human-facing help text.
    pub fn set_description(&mut self, value: impl Into<String>) {
        let value = value.into();
        self.marker_description = value.clone();
        self.description = value;
    }

    /// Set the legend flag from a native boolean or raw form text.
    ///
    /// Normalization is the single explicit rule in [`LegendInput::normalize`];
    /// malformed text degrades to false, never to an error.
    pub fn set_use_legend(&mut self, value: impl Into<LegendInput>) {
        self.use_legend = value.into().normalize();
    }

    /// Configure which sibling field gates this container's visibility.
    ///
    /// Referential integrity is not checked here; a stale reference is
    /// tolerated and resolves as unsatisfiable at evaluation time.
    pub fn set_conditional_field(&mut self, field: Option<Identifier>) {
        self.conditional_field = field;
    }

    /// Configure the value that evaluates the condition as true.
    pub fn set_conditional_field_value(&mut self, value: Option<String>) {
        self.conditional_field_value = value;
    }

    /// Rename the container.
    ///
    /// The reserved-word check runs before anything else, so a rejection
    /// leaves no partial state. Assignment itself is delegated to the
    /// form's namespace; a collision failure from there propagates
    /// unchanged. On success the markers' internal name is synchronized.
    pub fn set_identifier(
        &mut self,
        namespace: &mut IdentifierNamespace,
        value: impl Into<String>,
    ) -> Result<(), FormError> {
        let value = value.into();
        if is_reserved(&value) {
            return Err(FormError::ReservedIdentifier(value));
        }

        let candidate = Identifier::new(value);
        namespace.assign(&self.identifier, &candidate)?;

        self.identifier = candidate.clone();
        self.marker_name = candidate;
        Ok(())
    }

    /// Raw identifier assignment for duplication and import paths.
    ///
    /// Deliberately leaves `marker_name` untouched; callers must follow up
    /// with [`Self::on_attached`] once the container lands in a form.
    pub(crate) fn rewrite_identifier(&mut self, identifier: Identifier) {
        self.identifier = identifier;
    }

    /// Clone the container's configuration without its children.
    pub(crate) fn clone_shell(&self) -> Self {
        let mut shell = self.clone();
        shell.children.clear();
        shell
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    /// Reconcile the markers' internal name with the current identifier.
    ///
    /// Invoked when the container becomes part of a stored tree. Identifier
    /// changes that bypass [`Self::set_identifier`] (bulk copy, import)
    /// leave the marker name stale; this hook heals it. Idempotent.
    pub fn on_attached(&mut self) {
        if self.marker_name != self.identifier {
            self.marker_name = self.identifier.clone();
        }
    }

    // =========================================================================
    // MARKERS
    // =========================================================================

    /// The start boundary marker, recomputed from current state.
    #[must_use]
    pub fn start_marker(&self) -> BoundaryMarker {
        BoundaryMarker {
            label: self.marker_label.clone(),
            description: self.marker_description.clone(),
            show_legend: self.use_legend,
            identifier: self.marker_name.clone(),
        }
    }

    /// The end boundary marker, recomputed from current state.
    ///
    /// Carries the shared internal name and nothing else; the closing
    /// boundary renders no label or legend of its own.
    #[must_use]
    pub fn end_marker(&self) -> BoundaryMarker {
        BoundaryMarker {
            label: String::new(),
            description: String::new(),
            show_legend: false,
            identifier: self.marker_name.clone(),
        }
    }

    // =========================================================================
    // ENUMERATION
    // =========================================================================

    /// Add a node to the container.
    ///
    /// Ownership is exclusive; form-scoped identifier bookkeeping lives in
    /// [`crate::form::Form`], which is the attachment path for stored trees.
    pub fn add_child(&mut self, node: FormNode) {
        self.children.push(node);
    }

    /// Enumerate the contained fields in storage order.
    ///
    /// A child qualifies only if it carries the field capability on its own
    /// variant; non-field children present in storage are skipped even when
    /// markers are requested. `kinds` optionally restricts the accepted node
    /// kinds. With `include_markers`, the start marker is prepended and the
    /// end marker appended so downstream rendering can bracket the group.
    #[must_use]
    pub fn enumerate_fields(
        &self,
        kinds: Option<&[NodeKind]>,
        include_markers: bool,
    ) -> Vec<FieldsetItem<'_>> {
        let mut items = Vec::new();

        if include_markers {
            items.push(FieldsetItem::Start(self.start_marker()));
        }

        for child in &self.children {
            if !child.is_form_field() {
                continue;
            }
            if kinds.is_some_and(|accepted| !accepted.contains(&child.node_kind())) {
                continue;
            }
            if let FormNode::Field(field) = child {
                items.push(FieldsetItem::Field(field));
            }
        }

        if include_markers {
            items.push(FieldsetItem::End(self.end_marker()));
        }

        items
    }

    // =========================================================================
    // DELEGATED CHECKS & CANDIDATES
    // =========================================================================

    /// Check a candidate identifier with the parent form.
    ///
    /// The container has no namespace of its own; uniqueness is form-scoped.
    #[must_use]
    pub fn check_identifier_available(&self, form: &dyn ParentForm, candidate: &str) -> bool {
        form.check_identifier_available(candidate)
    }

    /// Build the selectable options for the conditional-field setting.
    ///
    /// Every selection-kind sibling of the parent form becomes one entry, in
    /// form order, labeled `"<title> - <keys joined '; '>"`. The list is a
    /// view rebuilt on every call - a sibling's options may change between
    /// calls, so nothing here is cached.
    #[must_use]
    pub fn conditional_field_candidates(&self, form: &dyn ParentForm) -> DisplayList {
        let mut list = DisplayList::new();

        for node in form.objects_of_kind(NodeKind::Selection) {
            let Some(field) = node.as_field() else {
                continue;
            };
            let Some(vocabulary) = field.kind.vocabulary() else {
                continue;
            };
            let label = format!(
                "{} - {}",
                field.title,
                vocabulary.joined_keys(CANDIDATE_KEY_SEPARATOR)
            );
            list.add(field.identifier.as_str(), label);
        }

        list
    }

    // =========================================================================
    // VISIBILITY
    // =========================================================================

    /// Evaluate the conditional-display rule against a submission.
    ///
    /// No rule means always visible; a stale reference means hidden, never
    /// an error.
    #[must_use]
    pub fn is_visible(&self, submitted: &SubmittedValues) -> bool {
        condition::evaluate(
            self.conditional_field.as_ref(),
            self.conditional_field_value.as_deref(),
            submitted,
        )
    }
}

// =============================================================================
// TESTS
// =============================================================================
