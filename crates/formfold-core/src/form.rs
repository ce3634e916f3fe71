//! # Parent Form
//!
//! The form folder: an ordered tree of nodes plus the form-scoped
//! identifier namespace.
//!
//! A container has no identifier namespace of its own. Every availability
//! check and every rename runs through the namespace kept here, and the
//! namespace covers the whole tree - nested children included - so two
//! nodes can never share a name no matter where they sit.

use crate::constants::is_reserved;
use crate::field::{FieldNode, FormNode, NodeKind};
use crate::fieldset::FieldsetContainer;
use crate::types::{FormError, Identifier};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// =============================================================================
// IDENTIFIER NAMESPACE
// =============================================================================

/// The form-scoped identifier registry and rename primitive.
///
/// This is the owning-folder mechanism containers delegate to: it decides
/// availability and performs assignment, and its rejections propagate to
/// callers unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierNamespace {
    names: BTreeSet<String>,
}

impl IdentifierNamespace {
    /// Create a new empty namespace.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether a candidate identifier is unused.
    #[must_use]
    pub fn is_available(&self, candidate: &str) -> bool {
        !self.names.contains(candidate)
    }

    /// Register a new identifier.
    pub fn reserve(&mut self, identifier: &Identifier) -> Result<(), FormError> {
        if !self.names.insert(identifier.as_str().to_owned()) {
            return Err(FormError::IdentifierTaken(identifier.as_str().to_owned()));
        }
        Ok(())
    }

    /// Drop an identifier from the registry.
    pub fn release(&mut self, identifier: &str) {
        self.names.remove(identifier);
    }

    /// The folder-level rename primitive.
    ///
    /// Re-assigning a node its current name is a no-op; a collision with any
    /// other registered name fails with `IdentifierTaken` and changes
    /// nothing.
    pub fn assign(&mut self, current: &Identifier, candidate: &Identifier) -> Result<(), FormError> {
        if candidate == current {
            return Ok(());
        }
        if !self.is_available(candidate.as_str()) {
            return Err(FormError::IdentifierTaken(candidate.as_str().to_owned()));
        }
        self.names.remove(current.as_str());
        self.names.insert(candidate.as_str().to_owned());
        Ok(())
    }
}

// =============================================================================
// PARENT FORM TRAIT
// =============================================================================

/// The interface a container consumes from its parent form.
pub trait ParentForm {
    /// Check whether a candidate identifier is unused anywhere in the form.
    fn check_identifier_available(&self, candidate: &str) -> bool;

    /// The form's direct children of the given kind, in form order.
    fn objects_of_kind(&self, kind: NodeKind) -> Vec<&FormNode>;
}

// =============================================================================
// FORM
// =============================================================================

/// A form: the root folder of a node tree.
///
/// The namespace is rebuilt from the tree on [`Form::reattach`], so it is
/// skipped during serialization rather than persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Form {
    title: String,
    #[serde(default)]
    children: Vec<FormNode>,
    #[serde(skip)]
    namespace: IdentifierNamespace,
}

impl Form {
    /// Create a new empty form.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            children: Vec::new(),
            namespace: IdentifierNamespace::new(),
        }
    }

    /// The form title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The form's direct children, in storage order.
    #[must_use]
    pub fn children(&self) -> &[FormNode] {
        &self.children
    }

    /// Number of direct children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Check whether the form has no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    // =========================================================================
    // TREE MUTATION
    // =========================================================================

    /// Add a node at the top level of the form.
    ///
    /// Registers every identifier in the node's subtree; a fieldset gets its
    /// attachment hook run once it lands in the tree.
    pub fn add_node(&mut self, node: FormNode) -> Result<(), FormError> {
        self.register(&node)?;
        let mut node = node;
        if let FormNode::Fieldset(fieldset) = &mut node {
            fieldset.on_attached();
        }
        self.children.push(node);
        Ok(())
    }

    /// Add a node inside an existing fieldset.
    pub fn add_to_fieldset(&mut self, fieldset_id: &str, node: FormNode) -> Result<(), FormError> {
        match self.find_node(fieldset_id) {
            Some(FormNode::Fieldset(_)) => {}
            Some(_) => return Err(FormError::NotAFieldset(fieldset_id.to_owned())),
            None => return Err(FormError::UnknownNode(fieldset_id.to_owned())),
        }

        self.register(&node)?;
        let mut node = node;
        if let FormNode::Fieldset(fieldset) = &mut node {
            fieldset.on_attached();
        }

        let Some(target) = self.find_fieldset_mut(fieldset_id) else {
            // probed above; unreachable without a concurrent structural change
            return Err(FormError::UnknownNode(fieldset_id.to_owned()));
        };
        target.add_child(node);
        Ok(())
    }

    /// Remove a node (and its subtree) from anywhere in the form.
    ///
    /// Identifiers of the removed subtree are released; children do not
    /// outlive removal from their container.
    pub fn remove_node(&mut self, identifier: &str) -> Result<FormNode, FormError> {
        let Some(node) = Self::remove_in(&mut self.children, identifier) else {
            return Err(FormError::UnknownNode(identifier.to_owned()));
        };
        self.release_subtree(&node);
        Ok(node)
    }

    /// Rename a node.
    ///
    /// Fieldsets route through their own `set_identifier` (reserved check,
    /// marker sync); plain nodes go straight to the namespace primitive
    /// after the same reserved guard.
    pub fn rename(&mut self, current: &str, candidate: &str) -> Result<(), FormError> {
        let Self {
            namespace, children, ..
        } = self;
        let Some(node) = Self::find_in_mut(children, current) else {
            return Err(FormError::UnknownNode(current.to_owned()));
        };
        match node {
            FormNode::Fieldset(fieldset) => fieldset.set_identifier(namespace, candidate),
            FormNode::Field(field) => assign_plain(namespace, &mut field.identifier, candidate),
            FormNode::Note(note) => assign_plain(namespace, &mut note.identifier, candidate),
        }
    }

    /// Duplicate a fieldset's configuration under a new identifier.
    ///
    /// The copy/paste path: the clone's identifier is rewritten directly
    /// rather than through `set_identifier`, and attachment reconciliation
    /// is what brings its marker name back in line.
    pub fn duplicate_fieldset(&mut self, source: &str, new_id: &str) -> Result<(), FormError> {
        if is_reserved(new_id) {
            return Err(FormError::ReservedIdentifier(new_id.to_owned()));
        }
        let copy = match self.find_node(source) {
            Some(FormNode::Fieldset(fieldset)) => fieldset.clone_shell(),
            Some(_) => return Err(FormError::NotAFieldset(source.to_owned())),
            None => return Err(FormError::UnknownNode(source.to_owned())),
        };
        let mut copy = copy;
        copy.rewrite_identifier(Identifier::new(new_id));
        self.add_node(FormNode::Fieldset(copy))
    }

    // =========================================================================
    // LOOKUP
    // =========================================================================

    /// Find any node in the tree by identifier.
    #[must_use]
    pub fn find_node(&self, identifier: &str) -> Option<&FormNode> {
        Self::find_in(&self.children, identifier)
    }

    /// Find a fieldset in the tree by identifier.
    #[must_use]
    pub fn find_fieldset(&self, identifier: &str) -> Option<&FieldsetContainer> {
        self.find_node(identifier).and_then(FormNode::as_fieldset)
    }

    /// Find a fieldset in the tree by identifier, mutably.
    pub fn find_fieldset_mut(&mut self, identifier: &str) -> Option<&mut FieldsetContainer> {
        Self::find_in_mut(&mut self.children, identifier).and_then(FormNode::as_fieldset_mut)
    }

    /// The form's direct field children, in storage order.
    #[must_use]
    pub fn fields(&self) -> Vec<&FieldNode> {
        self.children.iter().filter_map(FormNode::as_field).collect()
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    /// Rebuild the namespace from the tree and run attachment hooks.
    ///
    /// Call after deserializing a definition: the namespace is not
    /// persisted, and imported fieldsets may carry marker names that
    /// drifted from their identifiers. Duplicate identifiers in a
    /// hand-edited definition keep their first registration.
    pub fn reattach(&mut self) {
        let mut identifiers = Vec::new();
        for child in &self.children {
            Self::collect_identifiers(child, &mut identifiers);
        }

        self.namespace = IdentifierNamespace::new();
        for identifier in &identifiers {
            let _ = self.namespace.reserve(identifier);
        }

        Self::reattach_in(&mut self.children);
    }

    fn reattach_in(children: &mut [FormNode]) {
        for child in children {
            if let FormNode::Fieldset(fieldset) = child {
                fieldset.on_attached();
                Self::reattach_in(fieldset.children_mut());
            }
        }
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    fn collect_identifiers(node: &FormNode, out: &mut Vec<Identifier>) {
        out.push(node.identifier().clone());
        if let FormNode::Fieldset(fieldset) = node {
            for child in fieldset.children() {
                Self::collect_identifiers(child, out);
            }
        }
    }

    /// Reserve every identifier in a node's subtree, rejecting the whole
    /// batch before touching the namespace if any name collides.
    fn register(&mut self, node: &FormNode) -> Result<(), FormError> {
        let mut identifiers = Vec::new();
        Self::collect_identifiers(node, &mut identifiers);

        let mut batch = BTreeSet::new();
        for identifier in &identifiers {
            if !batch.insert(identifier.as_str()) || !self.namespace.is_available(identifier.as_str())
            {
                return Err(FormError::IdentifierTaken(identifier.as_str().to_owned()));
            }
        }
        for identifier in &identifiers {
            self.namespace.reserve(identifier)?;
        }
        Ok(())
    }

    fn release_subtree(&mut self, node: &FormNode) {
        let mut identifiers = Vec::new();
        Self::collect_identifiers(node, &mut identifiers);
        for identifier in &identifiers {
            self.namespace.release(identifier.as_str());
        }
    }

    fn find_in<'a>(children: &'a [FormNode], identifier: &str) -> Option<&'a FormNode> {
        for child in children {
            if child.identifier().as_str() == identifier {
                return Some(child);
            }
            if let FormNode::Fieldset(fieldset) = child {
                if let Some(found) = Self::find_in(fieldset.children(), identifier) {
                    return Some(found);
                }
            }
        }
        None
    }

    fn find_in_mut<'a>(children: &'a mut [FormNode], identifier: &str) -> Option<&'a mut FormNode> {
        for child in children {
            if child.identifier().as_str() == identifier {
                return Some(child);
            }
            if let FormNode::Fieldset(fieldset) = child {
                if let Some(found) = Self::find_in_mut(fieldset.children_mut(), identifier) {
                    return Some(found);
                }
            }
        }
        None
    }

    fn remove_in(children: &mut Vec<FormNode>, identifier: &str) -> Option<FormNode> {
        if let Some(position) = children
            .iter()
            .position(|node| node.identifier().as_str() == identifier)
        {
            return Some(children.remove(position));
        }
        for child in children {
            if let FormNode::Fieldset(fieldset) = child {
                if let Some(found) = Self::remove_in(fieldset.children_mut(), identifier) {
                    return Some(found);
                }
            }
        }
        None
    }
}

fn assign_plain(
    namespace: &mut IdentifierNamespace,
    slot: &mut Identifier,
    candidate: &str,
) -> Result<(), FormError> {
    if is_reserved(candidate) {
        return Err(FormError::ReservedIdentifier(candidate.to_owned()));
    }
    let candidate = Identifier::new(candidate);
    namespace.assign(slot, &candidate)?;
    *slot = candidate;
    Ok(())
}

impl ParentForm for Form {
    fn check_identifier_available(&self, candidate: &str) -> bool {
        self.namespace.is_available(candidate)
    }

    fn objects_of_kind(&self, kind: NodeKind) -> Vec<&FormNode> {
        self.children
            .iter()
            .filter(|node| node.node_kind() == kind)
            .collect()
    }
}

// =============================================================================
// TESTS
// =============================================================================
