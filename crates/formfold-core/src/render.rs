//! # Render Planning
//!
//! Assembly of the ordered render sequence for a whole form.
//!
//! The plan says *what* to render and with *what* parameters; markup is the
//! rendering layer's business. Fieldset contents arrive bracketed by their
//! boundary markers, and when a submission is supplied, fieldsets whose
//! condition evaluates false are omitted entirely - marker and contents.

use crate::condition::SubmittedValues;
use crate::field::{FieldNode, FormNode, NoteNode};
use crate::fieldset::BoundaryMarker;
use crate::form::Form;

/// One step of a form's render sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderStep<'a> {
    /// Render a field control.
    Field(&'a FieldNode),
    /// Render a display-only text block.
    Note(&'a NoteNode),
    /// Open a fieldset group.
    FieldsetStart(BoundaryMarker),
    /// Close a fieldset group.
    FieldsetEnd(BoundaryMarker),
}

/// Build the render sequence for a form.
///
/// Without a submission the full structure is planned (the editing view).
/// With one, conditional fieldsets are filtered by visibility first.
#[must_use]
pub fn render_sequence<'a>(
    form: &'a Form,
    submitted: Option<&SubmittedValues>,
) -> Vec<RenderStep<'a>> {
    let mut steps = Vec::new();
    push_children(form.children(), submitted, &mut steps);
    steps
}

fn push_children<'a>(
    children: &'a [FormNode],
    submitted: Option<&SubmittedValues>,
    steps: &mut Vec<RenderStep<'a>>,
) {
    for node in children {
        match node {
            FormNode::Field(field) => steps.push(RenderStep::Field(field)),
            FormNode::Note(note) => steps.push(RenderStep::Note(note)),
            FormNode::Fieldset(fieldset) => {
                if let Some(values) = submitted {
                    if !fieldset.is_visible(values) {
                        continue;
                    }
                }
                steps.push(RenderStep::FieldsetStart(fieldset.start_marker()));
                push_children(fieldset.children(), submitted, steps);
                steps.push(RenderStep::FieldsetEnd(fieldset.end_marker()));
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
