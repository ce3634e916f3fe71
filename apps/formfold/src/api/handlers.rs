//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.
//!
//! Engine rejections map to 400 with `{success: false, error}` bodies; only
//! serialization and file failures surface as 500. The reserved-identifier
//! rejection in particular reaches the caller verbatim so an editing UI can
//! show it as a validation error on the identifier field.

use super::{
    AppState,
    types::{
        AddNodeRequest, CandidatesRequest, CandidatesResponse, CheckRequest, CheckResponse,
        CreateFieldsetRequest, EditOp, EditRequest, EnumerateRequest, EnumerateResponse,
        ExportResponse, HealthResponse, MutationResponse, OutlineNode, OutlineResponse,
        PlanRequest, PlanResponse, RemoveRequest, validate_identifier,
    },
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use formfold_core::{
    FieldsetContainer, Form, FormError, FormNode, Identifier, ParentForm,
    constants::{MAX_CHILD_COUNT, is_reserved},
    form_to_bytes, render_sequence,
};

/// Map an engine error to the HTTP status it should surface as.
fn error_status(error: &FormError) -> StatusCode {
    match error {
        FormError::ReservedIdentifier(_)
        | FormError::IdentifierTaken(_)
        | FormError::UnknownNode(_)
        | FormError::NotAFieldset(_)
        | FormError::InvalidDefinition(_)
        | FormError::DeserializationError(_) => StatusCode::BAD_REQUEST,
        FormError::SerializationError(_) | FormError::IoError(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn mutation_result(result: Result<(), FormError>) -> (StatusCode, Json<MutationResponse>) {
    match result {
        Ok(()) => (StatusCode::OK, Json(MutationResponse::success())),
        Err(e) => (error_status(&e), Json(MutationResponse::error(e.to_string()))),
    }
}

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// OUTLINE HANDLER
// =============================================================================

/// Get the form structure.
pub async fn outline_handler(State(state): State<AppState>) -> impl IntoResponse {
    let form = state.form.read().await;

    let response = OutlineResponse {
        title: form.title().to_string(),
        node_count: form.len(),
        nodes: form.children().iter().map(OutlineNode::from_node).collect(),
    };

    (StatusCode::OK, Json(response))
}

// =============================================================================
// FIELDSET CREATION HANDLER
// =============================================================================

/// Create a fieldset at the top level of the form.
pub async fn create_fieldset_handler(
    State(state): State<AppState>,
    Json(request): Json<CreateFieldsetRequest>,
) -> impl IntoResponse {
    if let Err(e) = request.validate() {
        return (error_status(&e), Json(MutationResponse::error(e.to_string())));
    }

    let mut fieldset = match FieldsetContainer::new(request.identifier, request.title) {
        Ok(fieldset) => fieldset,
        Err(e) => {
            return (error_status(&e), Json(MutationResponse::error(e.to_string())));
        }
    };
    if let Some(description) = request.description {
        fieldset.set_description(description);
    }
    if let Some(use_legend) = request.use_legend {
        fieldset.set_use_legend(use_legend);
    }

    let mut form = state.form.write().await;
    if form.len() >= MAX_CHILD_COUNT {
        let error = FormError::InvalidDefinition(format!(
            "form already holds the maximum of {} top-level nodes",
            MAX_CHILD_COUNT
        ));
        return (error_status(&error), Json(MutationResponse::error(error.to_string())));
    }
    mutation_result(form.add_node(FormNode::Fieldset(fieldset)))
}

// =============================================================================
// EDIT HANDLER
// =============================================================================

/// Apply one editing operation to an existing fieldset.
pub async fn edit_handler(
    State(state): State<AppState>,
    Json(request): Json<EditRequest>,
) -> impl IntoResponse {
    if let Err(e) = request.op.validate() {
        return (error_status(&e), Json(MutationResponse::error(e.to_string())));
    }

    let mut form = state.form.write().await;
    mutation_result(apply_edit(&mut form, &request.fieldset, request.op))
}

fn apply_edit(form: &mut Form, fieldset_id: &str, op: EditOp) -> Result<(), FormError> {
    match form.find_node(fieldset_id) {
        None => return Err(FormError::UnknownNode(fieldset_id.to_owned())),
        Some(FormNode::Fieldset(_)) => {}
        Some(_) => return Err(FormError::NotAFieldset(fieldset_id.to_owned())),
    }

    // Renames change the namespace, so they go through the form.
    let op = match op {
        EditOp::Rename { value } => return form.rename(fieldset_id, &value),
        other => other,
    };

    let Some(fieldset) = form.find_fieldset_mut(fieldset_id) else {
        return Err(FormError::UnknownNode(fieldset_id.to_owned()));
    };
    match op {
        EditOp::SetTitle { value } => fieldset.set_title(value),
        EditOp::SetDescription { value } => fieldset.set_description(value),
        EditOp::SetUseLegend { value } => fieldset.set_use_legend(value),
        EditOp::SetConditional { field, value } => {
            fieldset.set_conditional_field(field.map(Identifier::new));
            fieldset.set_conditional_field_value(value);
        }
        EditOp::Rename { .. } => {}
    }
    Ok(())
}

// =============================================================================
// NODE HANDLERS
// =============================================================================

/// Add a field or note, at the top level or inside a fieldset.
pub async fn add_node_handler(
    State(state): State<AppState>,
    Json(request): Json<AddNodeRequest>,
) -> impl IntoResponse {
    let node = match request.node.into_node() {
        Ok(node) => node,
        Err(e) => {
            return (error_status(&e), Json(MutationResponse::error(e.to_string())));
        }
    };

    let mut form = state.form.write().await;
    let result = match request.parent.as_deref() {
        Some(parent) => {
            let at_capacity = form
                .find_fieldset(parent)
                .is_some_and(|fieldset| fieldset.children().len() >= MAX_CHILD_COUNT);
            if at_capacity {
                Err(FormError::InvalidDefinition(format!(
                    "fieldset '{}' already holds the maximum of {} nodes",
                    parent, MAX_CHILD_COUNT
                )))
            } else {
                form.add_to_fieldset(parent, node)
            }
        }
        None if form.len() >= MAX_CHILD_COUNT => Err(FormError::InvalidDefinition(format!(
            "form already holds the maximum of {} top-level nodes",
            MAX_CHILD_COUNT
        ))),
        None => form.add_node(node),
    };
    mutation_result(result)
}

/// Remove a node (and its subtree) from anywhere in the form.
pub async fn remove_node_handler(
    State(state): State<AppState>,
    Json(request): Json<RemoveRequest>,
) -> impl IntoResponse {
    let mut form = state.form.write().await;
    mutation_result(form.remove_node(&request.identifier).map(|_| ()))
}

// =============================================================================
// CHECK HANDLER
// =============================================================================

/// Check a candidate identifier for availability and reserved-word status.
pub async fn check_handler(
    State(state): State<AppState>,
    Json(request): Json<CheckRequest>,
) -> impl IntoResponse {
    if let Err(e) = validate_identifier(&request.identifier) {
        return (error_status(&e), Json(CheckResponse::error(e.to_string())));
    }

    let form = state.form.read().await;
    let reserved = is_reserved(&request.identifier);
    let available = !reserved && form.check_identifier_available(&request.identifier);

    (StatusCode::OK, Json(CheckResponse::result(available, reserved)))
}

// =============================================================================
// ENUMERATE HANDLER
// =============================================================================

/// Enumerate a fieldset's contents, optionally bracketed by its markers.
pub async fn enumerate_handler(
    State(state): State<AppState>,
    Json(request): Json<EnumerateRequest>,
) -> impl IntoResponse {
    let form = state.form.read().await;

    let Some(fieldset) = form.find_fieldset(&request.fieldset) else {
        let error = if form.find_node(&request.fieldset).is_some() {
            FormError::NotAFieldset(request.fieldset.clone())
        } else {
            FormError::UnknownNode(request.fieldset.clone())
        };
        return (error_status(&error), Json(EnumerateResponse::error(error.to_string())));
    };

    let items = fieldset.enumerate_fields(request.kinds.as_deref(), request.include_markers);
    (StatusCode::OK, Json(EnumerateResponse::success(&items)))
}

// =============================================================================
// CANDIDATES HANDLER
// =============================================================================

/// The conditional-field candidate list for a fieldset.
pub async fn candidates_handler(
    State(state): State<AppState>,
    Json(request): Json<CandidatesRequest>,
) -> impl IntoResponse {
    let form = state.form.read().await;

    let Some(fieldset) = form.find_fieldset(&request.fieldset) else {
        let error = if form.find_node(&request.fieldset).is_some() {
            FormError::NotAFieldset(request.fieldset.clone())
        } else {
            FormError::UnknownNode(request.fieldset.clone())
        };
        return (error_status(&error), Json(CandidatesResponse::error(error.to_string())));
    };

    let candidates = fieldset.conditional_field_candidates(&*form);
    (StatusCode::OK, Json(CandidatesResponse::success(&candidates)))
}

// =============================================================================
// PLAN HANDLER
// =============================================================================

/// The form's render sequence, filtered by visibility when a submission is
/// supplied.
pub async fn plan_handler(
    State(state): State<AppState>,
    Json(request): Json<PlanRequest>,
) -> impl IntoResponse {
    let form = state.form.read().await;
    let steps = render_sequence(&form, request.submitted.as_ref());
    (StatusCode::OK, Json(PlanResponse::success(&steps)))
}

// =============================================================================
// EXPORT & SAVE HANDLERS
// =============================================================================

/// Export the definition in the binary format (base64-wrapped).
pub async fn export_handler(State(state): State<AppState>) -> impl IntoResponse {
    let form = state.form.read().await;

    match form_to_bytes(&form) {
        Ok(data) => (StatusCode::OK, Json(ExportResponse::success(data))),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ExportResponse::error(format!("Export failed: {}", e))),
        ),
    }
}

/// Write the definition back to the server's definition file.
pub async fn save_handler(State(state): State<AppState>) -> impl IntoResponse {
    let form = state.form.read().await;

    let result = state
        .path
        .as_deref()
        .ok_or_else(|| FormError::IoError("no definition path configured".to_string()))
        .and_then(|path| {
            let bytes = form_to_bytes(&form)?;
            std::fs::write(path, bytes)
                .map_err(|e| FormError::IoError(format!("write failed: {}", e)))
        });
    mutation_result(result)
}
