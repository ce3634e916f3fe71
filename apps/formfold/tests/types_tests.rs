//! Unit tests for API types serialization/deserialization.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use formfold::api::{
    AddNodeRequest, CheckResponse, CreateFieldsetRequest, EditOp, EditRequest, EnumerateRequest,
    ExportResponse, HealthResponse, ItemJson, MutationResponse, NodeSpec, PlanRequest,
};
use formfold_core::{FormError, FormNode, LegendInput, NodeKind};

// =============================================================================
// HEALTH RESPONSE TESTS
// =============================================================================

#[test]
fn test_health_response_default() {
    let health = HealthResponse::default();
    assert_eq!(health.status, "ok");
    assert!(!health.version.is_empty());
}

#[test]
fn test_health_response_serialization() {
    let health = HealthResponse {
        status: "ok".to_string(),
        version: "0.4.2".to_string(),
    };

    let json = serde_json::to_string(&health).unwrap();
    assert!(json.contains("\"status\":\"ok\""));
    assert!(json.contains("\"version\":\"0.4.2\""));
}

// =============================================================================
// CREATE FIELDSET REQUEST TESTS
// =============================================================================

#[test]
fn test_create_request_minimal() {
    let json = r#"{"identifier":"contact_info","title":"Contact"}"#;
    let request: CreateFieldsetRequest = serde_json::from_str(json).unwrap();

    assert_eq!(request.identifier, "contact_info");
    assert_eq!(request.title, "Contact");
    assert!(request.description.is_none());
    assert!(request.use_legend.is_none());
    assert!(request.validate().is_ok());
}

#[test]
fn test_create_request_legend_shapes() {
    let with_bool: CreateFieldsetRequest =
        serde_json::from_str(r#"{"identifier":"a","title":"A","use_legend":true}"#).unwrap();
    assert_eq!(with_bool.use_legend, Some(LegendInput::Flag(true)));

    let with_text: CreateFieldsetRequest =
        serde_json::from_str(r#"{"identifier":"a","title":"A","use_legend":"1"}"#).unwrap();
    assert_eq!(with_text.use_legend, Some(LegendInput::Text("1".to_owned())));
}

#[test]
fn test_create_request_boundary_validation() {
    let empty = CreateFieldsetRequest {
        identifier: String::new(),
        title: "T".to_owned(),
        description: None,
        use_legend: None,
    };
    assert!(matches!(
        empty.validate(),
        Err(FormError::InvalidDefinition(_))
    ));

    let oversized = CreateFieldsetRequest {
        identifier: "x".repeat(4096),
        title: "T".to_owned(),
        description: None,
        use_legend: None,
    };
    assert!(oversized.validate().is_err());
}

// =============================================================================
// EDIT REQUEST TESTS
// =============================================================================

#[test]
fn test_edit_request_flattened_op() {
    let json = r#"{"fieldset":"contact_info","op":"set_title","value":"Reaching you"}"#;
    let request: EditRequest = serde_json::from_str(json).unwrap();

    assert_eq!(request.fieldset, "contact_info");
    assert!(matches!(request.op, EditOp::SetTitle { ref value } if value == "Reaching you"));
}

#[test]
fn test_edit_request_conditional_clears_with_null() {
    let json = r#"{"fieldset":"extras","op":"set_conditional","field":null,"value":null}"#;
    let request: EditRequest = serde_json::from_str(json).unwrap();

    assert!(matches!(
        request.op,
        EditOp::SetConditional {
            field: None,
            value: None
        }
    ));
    assert!(request.op.validate().is_ok());
}

#[test]
fn test_edit_request_rename_validation() {
    let ok = EditOp::Rename {
        value: "reach_info".to_owned(),
    };
    assert!(ok.validate().is_ok());

    let empty = EditOp::Rename {
        value: String::new(),
    };
    assert!(empty.validate().is_err());
}

// =============================================================================
// NODE SPEC TESTS
// =============================================================================

#[test]
fn test_node_spec_selection_deserialization() {
    let json = r#"{
        "parent": "contact_info",
        "node": {
            "kind": "selection",
            "identifier": "country",
            "title": "Country",
            "options": [
                {"key": "US", "label": "United States"},
                {"key": "CA"}
            ]
        }
    }"#;
    let request: AddNodeRequest = serde_json::from_str(json).unwrap();
    assert_eq!(request.parent.as_deref(), Some("contact_info"));

    let node = request.node.into_node().unwrap();
    let FormNode::Field(field) = node else {
        panic!("expected a field node");
    };
    assert_eq!(field.node_kind(), NodeKind::Selection);

    let vocabulary = field.kind.vocabulary().unwrap();
    let keys: Vec<_> = vocabulary.keys().collect();
    assert_eq!(keys, vec!["US", "CA"]);
    // Label defaults to the key when omitted.
    assert_eq!(vocabulary.joined_keys("; "), "US; CA");
}

#[test]
fn test_node_spec_note() {
    let spec: NodeSpec =
        serde_json::from_str(r#"{"kind":"note","identifier":"hint","text":"Read me"}"#).unwrap();
    let node = spec.into_node().unwrap();
    assert!(!node.is_form_field());
    assert_eq!(node.node_kind(), NodeKind::Note);
}

#[test]
fn test_node_spec_rejects_empty_identifier() {
    let spec = NodeSpec::Text {
        identifier: String::new(),
        title: "T".to_owned(),
        required: false,
    };
    assert!(matches!(
        spec.into_node(),
        Err(FormError::InvalidDefinition(_))
    ));
}

// =============================================================================
// ENUMERATE REQUEST TESTS
// =============================================================================

#[test]
fn test_enumerate_request_defaults() {
    let request: EnumerateRequest =
        serde_json::from_str(r#"{"fieldset":"contact_info"}"#).unwrap();

    assert!(request.kinds.is_none());
    assert!(!request.include_markers);
}

#[test]
fn test_enumerate_request_kinds() {
    let request: EnumerateRequest =
        serde_json::from_str(r#"{"fieldset":"x","kinds":["selection","text"]}"#).unwrap();

    assert_eq!(
        request.kinds,
        Some(vec![NodeKind::Selection, NodeKind::Text])
    );
}

// =============================================================================
// ITEM JSON TESTS
// =============================================================================

#[test]
fn test_item_json_role_tags() {
    let field = ItemJson::Field {
        identifier: "email".to_owned(),
        title: "Email".to_owned(),
        kind: NodeKind::Text,
        required: true,
    };
    let json = serde_json::to_string(&field).unwrap();
    assert!(json.contains("\"role\":\"field\""));
    assert!(json.contains("\"kind\":\"text\""));

    let parsed: ItemJson = serde_json::from_str(
        r#"{"role":"start","label":"Contact","description":"","show_legend":true,"identifier":"contact_info"}"#,
    )
    .unwrap();
    assert!(matches!(parsed, ItemJson::Start(marker) if marker.show_legend));
}

// =============================================================================
// PLAN REQUEST TESTS
// =============================================================================

#[test]
fn test_plan_request_default_has_no_submission() {
    let request: PlanRequest = serde_json::from_str("{}").unwrap();
    assert!(request.submitted.is_none());
}

#[test]
fn test_plan_request_with_submission() {
    let request: PlanRequest =
        serde_json::from_str(r#"{"submitted":{"subscribe":"yes"}}"#).unwrap();
    let submitted = request.submitted.unwrap();
    assert_eq!(submitted.get("subscribe"), Some("yes"));
}

// =============================================================================
// RESPONSE CONSTRUCTOR TESTS
// =============================================================================

#[test]
fn test_mutation_response_constructors() {
    let ok = MutationResponse::success();
    assert!(ok.success);
    assert!(ok.error.is_none());

    let failed = MutationResponse::error("the id \"form\" is reserved");
    assert!(!failed.success);
    assert!(failed.error.unwrap().contains("reserved"));
}

#[test]
fn test_check_response_constructors() {
    let free = CheckResponse::result(true, false);
    assert!(free.success);
    assert!(free.available);

    let reserved = CheckResponse::result(false, true);
    assert!(reserved.reserved);
    assert!(!reserved.available);
}

#[test]
fn test_export_response_encodes_base64() {
    let response = ExportResponse::success(vec![1, 2, 3]);
    assert!(response.success);

    let decoded = base64::Engine::decode(
        &base64::engine::general_purpose::STANDARD,
        response.data.unwrap(),
    )
    .unwrap();
    assert_eq!(decoded, vec![1, 2, 3]);
}
