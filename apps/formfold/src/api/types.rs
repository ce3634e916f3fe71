//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.
//!
//! Boundary validation happens here, before anything reaches the engine:
//! identifier and label lengths are capped so oversized payloads are
//! rejected at the edge, while the core setters stay tolerant.

use formfold_core::{
    BoundaryMarker, FieldKind, FieldNode, FieldsetItem, FormError, FormNode, LegendInput, NodeKind,
    NoteNode, RenderStep, SubmittedValues, Vocabulary,
    constants::{MAX_CHILD_COUNT, MAX_IDENTIFIER_LENGTH, MAX_LABEL_LENGTH},
};
use serde::{Deserialize, Serialize};

// =============================================================================
// BOUNDARY VALIDATION
// =============================================================================

/// Validate an identifier's shape at the API boundary.
///
/// Reserved-word and uniqueness rules belong to the engine; this only
/// rejects empty or oversized input before it gets there.
pub fn validate_identifier(identifier: &str) -> Result<(), FormError> {
    if identifier.is_empty() {
        return Err(FormError::InvalidDefinition(
            "identifier must not be empty".to_string(),
        ));
    }
    if identifier.len() > MAX_IDENTIFIER_LENGTH {
        return Err(FormError::InvalidDefinition(format!(
            "identifier length {} exceeds maximum {} bytes",
            identifier.len(),
            MAX_IDENTIFIER_LENGTH
        )));
    }
    Ok(())
}

/// Validate title/label/description text at the API boundary.
pub fn validate_label(text: &str) -> Result<(), FormError> {
    if text.len() > MAX_LABEL_LENGTH {
        return Err(FormError::InvalidDefinition(format!(
            "text length {} exceeds maximum {} bytes",
            text.len(),
            MAX_LABEL_LENGTH
        )));
    }
    Ok(())
}

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// OUTLINE RESPONSE
// =============================================================================

/// One node of the form outline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlineNode {
    pub identifier: String,
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub children: Vec<OutlineNode>,
}

impl OutlineNode {
    /// Build the outline of one node and its subtree.
    #[must_use]
    pub fn from_node(node: &FormNode) -> Self {
        match node {
            FormNode::Field(field) => Self {
                identifier: field.identifier.to_string(),
                kind: field.node_kind(),
                title: Some(field.title.clone()),
                children: Vec::new(),
            },
            FormNode::Note(note) => Self {
                identifier: note.identifier.to_string(),
                kind: NodeKind::Note,
                title: None,
                children: Vec::new(),
            },
            FormNode::Fieldset(fieldset) => Self {
                identifier: fieldset.identifier().to_string(),
                kind: NodeKind::Fieldset,
                title: Some(fieldset.title().to_string()),
                children: fieldset.children().iter().map(Self::from_node).collect(),
            },
        }
    }
}

/// Form structure response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlineResponse {
    pub title: String,
    pub node_count: usize,
    pub nodes: Vec<OutlineNode>,
}

// =============================================================================
// MUTATION RESPONSE
// =============================================================================

/// Generic response for structure-changing requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationResponse {
    pub success: bool,
    pub error: Option<String>,
}

impl MutationResponse {
    pub fn success() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// FIELDSET CREATION
// =============================================================================

/// Request to create a fieldset at the top level of the form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFieldsetRequest {
    pub identifier: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub use_legend: Option<LegendInput>,
}

impl CreateFieldsetRequest {
    /// Boundary validation; engine rules run later.
    pub fn validate(&self) -> Result<(), FormError> {
        validate_identifier(&self.identifier)?;
        validate_label(&self.title)?;
        if let Some(description) = &self.description {
            validate_label(description)?;
        }
        Ok(())
    }
}

// =============================================================================
// EDIT REQUEST
// =============================================================================

/// One fieldset-editing operation (tagged union).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditOp {
    SetTitle { value: String },
    SetDescription { value: String },
    SetUseLegend { value: LegendInput },
    SetConditional {
        #[serde(default)]
        field: Option<String>,
        #[serde(default)]
        value: Option<String>,
    },
    Rename { value: String },
}

impl EditOp {
    /// Boundary validation of the operand.
    pub fn validate(&self) -> Result<(), FormError> {
        match self {
            Self::SetTitle { value } | Self::SetDescription { value } => validate_label(value),
            Self::SetUseLegend { .. } => Ok(()),
            Self::SetConditional { field, value } => {
                if let Some(field) = field {
                    validate_identifier(field)?;
                }
                if let Some(value) = value {
                    validate_label(value)?;
                }
                Ok(())
            }
            Self::Rename { value } => validate_identifier(value),
        }
    }
}

/// Request to edit an existing fieldset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditRequest {
    pub fieldset: String,
    #[serde(flatten)]
    pub op: EditOp,
}

// =============================================================================
// NODE CREATION
// =============================================================================

/// One selectable option of a selection field spec.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionSpec {
    pub key: String,
    #[serde(default)]
    pub label: Option<String>,
}

/// Specification of a node to add (tagged union).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeSpec {
    Text {
        identifier: String,
        title: String,
        #[serde(default)]
        required: bool,
    },
    TextArea {
        identifier: String,
        title: String,
        #[serde(default)]
        required: bool,
    },
    Checkbox {
        identifier: String,
        title: String,
        #[serde(default)]
        required: bool,
    },
    Selection {
        identifier: String,
        title: String,
        #[serde(default)]
        required: bool,
        options: Vec<OptionSpec>,
    },
    Note {
        identifier: String,
        text: String,
    },
}

impl NodeSpec {
    /// Validate the spec and build the engine node.
    pub fn into_node(self) -> Result<FormNode, FormError> {
        match self {
            Self::Text {
                identifier,
                title,
                required,
            } => build_field(identifier, title, required, FieldKind::Text),
            Self::TextArea {
                identifier,
                title,
                required,
            } => build_field(identifier, title, required, FieldKind::TextArea),
            Self::Checkbox {
                identifier,
                title,
                required,
            } => build_field(identifier, title, required, FieldKind::Checkbox),
            Self::Selection {
                identifier,
                title,
                required,
                options,
            } => {
                if options.len() > MAX_CHILD_COUNT {
                    return Err(FormError::InvalidDefinition(format!(
                        "option count {} exceeds maximum {}",
                        options.len(),
                        MAX_CHILD_COUNT
                    )));
                }
                let mut vocabulary = Vocabulary::new();
                for option in options {
                    validate_label(&option.key)?;
                    let label = option.label.unwrap_or_else(|| option.key.clone());
                    validate_label(&label)?;
                    vocabulary.add(option.key, label);
                }
                build_field(
                    identifier,
                    title,
                    required,
                    FieldKind::Selection { vocabulary },
                )
            }
            Self::Note { identifier, text } => {
                validate_identifier(&identifier)?;
                validate_label(&text)?;
                Ok(FormNode::Note(NoteNode::new(identifier, text)))
            }
        }
    }
}

fn build_field(
    identifier: String,
    title: String,
    required: bool,
    kind: FieldKind,
) -> Result<FormNode, FormError> {
    validate_identifier(&identifier)?;
    validate_label(&title)?;
    let mut field = FieldNode::new(identifier, title, kind);
    field.required = required;
    Ok(FormNode::Field(field))
}

/// Request to add a node, at the top level or inside a fieldset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddNodeRequest {
    #[serde(default)]
    pub parent: Option<String>,
    pub node: NodeSpec,
}

/// Request to remove a node from anywhere in the form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveRequest {
    pub identifier: String,
}

// =============================================================================
// IDENTIFIER CHECK
// =============================================================================

/// Request to check a candidate identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckRequest {
    pub identifier: String,
}

/// Identifier check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResponse {
    pub success: bool,
    pub available: bool,
    pub reserved: bool,
    pub error: Option<String>,
}

impl CheckResponse {
    pub fn result(available: bool, reserved: bool) -> Self {
        Self {
            success: true,
            available,
            reserved,
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            available: false,
            reserved: false,
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// ENUMERATION
// =============================================================================

/// Request to enumerate a fieldset's contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumerateRequest {
    pub fieldset: String,
    #[serde(default)]
    pub kinds: Option<Vec<NodeKind>>,
    #[serde(default)]
    pub include_markers: bool,
}

/// Boundary marker JSON representation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkerJson {
    pub label: String,
    pub description: String,
    pub show_legend: bool,
    pub identifier: String,
}

impl From<BoundaryMarker> for MarkerJson {
    fn from(marker: BoundaryMarker) -> Self {
        Self {
            label: marker.label,
            description: marker.description,
            show_legend: marker.show_legend,
            identifier: marker.identifier.to_string(),
        }
    }
}

/// One element of an enumeration response (tagged by role).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum ItemJson {
    Start(MarkerJson),
    Field {
        identifier: String,
        title: String,
        kind: NodeKind,
        required: bool,
    },
    End(MarkerJson),
}

impl ItemJson {
    fn from_item(item: &FieldsetItem<'_>) -> Self {
        match item {
            FieldsetItem::Start(marker) => Self::Start(marker.clone().into()),
            FieldsetItem::Field(field) => Self::from_field(field),
            FieldsetItem::End(marker) => Self::End(marker.clone().into()),
        }
    }

    fn from_field(field: &FieldNode) -> Self {
        Self::Field {
            identifier: field.identifier.to_string(),
            title: field.title.clone(),
            kind: field.node_kind(),
            required: field.required,
        }
    }
}

/// Enumeration response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumerateResponse {
    pub success: bool,
    pub items: Vec<ItemJson>,
    pub error: Option<String>,
}

impl EnumerateResponse {
    pub fn success(items: &[FieldsetItem<'_>]) -> Self {
        Self {
            success: true,
            items: items.iter().map(ItemJson::from_item).collect(),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            items: vec![],
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// CANDIDATES
// =============================================================================

/// Request for a fieldset's conditional-field candidates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidatesRequest {
    pub fieldset: String,
}

/// One conditional-field candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateJson {
    pub key: String,
    pub label: String,
}

/// Candidates response; entries keep sibling order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidatesResponse {
    pub success: bool,
    pub candidates: Vec<CandidateJson>,
    pub error: Option<String>,
}

impl CandidatesResponse {
    pub fn success(candidates: &formfold_core::DisplayList) -> Self {
        Self {
            success: true,
            candidates: candidates
                .entries()
                .map(|entry| CandidateJson {
                    key: entry.key.clone(),
                    label: entry.label.clone(),
                })
                .collect(),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            candidates: vec![],
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// RENDER PLAN
// =============================================================================

/// Request for the form's render sequence.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PlanRequest {
    /// When present, conditional fieldsets are filtered by visibility.
    #[serde(default)]
    pub submitted: Option<SubmittedValues>,
}

/// One step of a render plan (tagged union).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum StepJson {
    Field {
        identifier: String,
        title: String,
        kind: NodeKind,
        required: bool,
    },
    Note {
        identifier: String,
        text: String,
    },
    FieldsetStart(MarkerJson),
    FieldsetEnd(MarkerJson),
}

impl StepJson {
    fn from_step(step: &RenderStep<'_>) -> Self {
        match step {
            RenderStep::Field(field) => Self::Field {
                identifier: field.identifier.to_string(),
                title: field.title.clone(),
                kind: field.node_kind(),
                required: field.required,
            },
            RenderStep::Note(note) => Self::Note {
                identifier: note.identifier.to_string(),
                text: note.text.clone(),
            },
            RenderStep::FieldsetStart(marker) => Self::FieldsetStart(marker.clone().into()),
            RenderStep::FieldsetEnd(marker) => Self::FieldsetEnd(marker.clone().into()),
        }
    }
}

/// Render plan response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanResponse {
    pub success: bool,
    pub steps: Vec<StepJson>,
    pub error: Option<String>,
}

impl PlanResponse {
    pub fn success(steps: &[RenderStep<'_>]) -> Self {
        Self {
            success: true,
            steps: steps.iter().map(StepJson::from_step).collect(),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            steps: vec![],
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// EXPORT RESPONSE
// =============================================================================

/// Export response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportResponse {
    pub success: bool,
    pub data: Option<String>, // Base64 encoded
    pub error: Option<String>,
}

impl ExportResponse {
    pub fn success(data: Vec<u8>) -> Self {
        Self {
            success: true,
            data: Some(base64::Engine::encode(
                &base64::engine::general_purpose::STANDARD,
                &data,
            )),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}
