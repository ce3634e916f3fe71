//! Integration tests for the Formfold HTTP API.
//!
//! Uses axum-test to test the API handlers without starting a real server.

// Allow unwrap and panic in tests - these are standard for test code
// Allow holding MutexGuard across await in auth tests - tests are serialized
// intentionally to avoid env var conflicts
#![allow(clippy::unwrap_used, clippy::panic, clippy::await_holding_lock)]

use axum::http::{HeaderValue, StatusCode};
use axum_test::TestServer;
use formfold::api::{
    AppState, CandidatesResponse, CheckResponse, EnumerateResponse, ExportResponse,
    HealthResponse, ItemJson, MutationResponse, OutlineResponse, PlanResponse, StepJson,
    create_router,
};
use formfold::config::ServerConfig;
use formfold_core::{
    FieldKind, FieldNode, FieldsetContainer, Form, FormNode, Identifier, Vocabulary,
    form_from_bytes,
};
use serde_json::json;
use std::sync::Mutex;

/// Mutex to serialize auth tests since they modify env vars.
static AUTH_TEST_MUTEX: Mutex<()> = Mutex::new(());

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Guard wrapper that holds the mutex and ensures cleanup on drop.
struct TestGuard {
    _guard: std::sync::MutexGuard<'static, ()>,
}

impl Drop for TestGuard {
    fn drop(&mut self) {
        // SAFETY: Tests run sequentially under AUTH_TEST_MUTEX, so no concurrent env access.
        unsafe { std::env::remove_var("FORMFOLD_API_KEY") };
    }
}

fn acquire_guard() -> TestGuard {
    let guard = AUTH_TEST_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    // SAFETY: Tests run sequentially under AUTH_TEST_MUTEX, so no concurrent env access.
    unsafe { std::env::remove_var("FORMFOLD_API_KEY") };
    TestGuard { _guard: guard }
}

/// Create a test server with a fresh empty form.
/// Returns a guard that must be kept alive during the test.
fn create_test_server() -> (TestServer, TestGuard) {
    let guard = acquire_guard();
    let state = AppState::new(Form::new("Survey"));
    let router = create_router(state, &ServerConfig::default());
    (TestServer::new(router).unwrap(), guard)
}

/// Create a test server with a populated form:
/// two selection fields, a fieldset with one field, and a conditional
/// fieldset gated on "subscribe".
fn create_populated_test_server() -> (TestServer, TestGuard) {
    let guard = acquire_guard();

    let mut form = Form::new("Survey");
    form.add_node(FormNode::Field(FieldNode::selection(
        "country",
        "Country",
        Vocabulary::from_keys(["US", "CA"]),
    )))
    .unwrap();
    form.add_node(FormNode::Field(FieldNode::selection(
        "state",
        "State",
        Vocabulary::from_keys(["NY", "CA"]),
    )))
    .unwrap();

    let mut contact = FieldsetContainer::new("contact_info", "Contact").unwrap();
    contact.set_description("How to reach you");
    contact.add_child(FormNode::Field(FieldNode::new(
        "email",
        "Email",
        FieldKind::Text,
    )));
    form.add_node(FormNode::Fieldset(contact)).unwrap();

    let mut extras = FieldsetContainer::new("extras", "Extras").unwrap();
    extras.set_conditional_field(Some(Identifier::new("subscribe")));
    extras.set_conditional_field_value(Some("yes".to_owned()));
    extras.add_child(FormNode::Field(FieldNode::new(
        "topics",
        "Topics",
        FieldKind::TextArea,
    )));
    form.add_node(FormNode::Fieldset(extras)).unwrap();

    let state = AppState::new(form);
    let router = create_router(state, &ServerConfig::default());
    (TestServer::new(router).unwrap(), guard)
}

// =============================================================================
// HEALTH ENDPOINT TESTS
// =============================================================================

#[tokio::test]
async fn test_health_returns_ok() {
    let (server, _guard) = create_test_server();

    let response = server.get("/health").await;

    response.assert_status_ok();
    let health: HealthResponse = response.json();
    assert_eq!(health.status, "ok");
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
}

// =============================================================================
// OUTLINE ENDPOINT TESTS
// =============================================================================

#[tokio::test]
async fn test_outline_empty_form() {
    let (server, _guard) = create_test_server();

    let response = server.get("/outline").await;

    response.assert_status_ok();
    let outline: OutlineResponse = response.json();
    assert_eq!(outline.title, "Survey");
    assert_eq!(outline.node_count, 0);
    assert!(outline.nodes.is_empty());
}

#[tokio::test]
async fn test_outline_populated_form() {
    let (server, _guard) = create_populated_test_server();

    let response = server.get("/outline").await;

    response.assert_status_ok();
    let outline: OutlineResponse = response.json();
    assert_eq!(outline.node_count, 4);

    let contact = outline
        .nodes
        .iter()
        .find(|node| node.identifier == "contact_info")
        .expect("contact fieldset in outline");
    assert_eq!(contact.children.len(), 1);
    assert_eq!(contact.children[0].identifier, "email");
}

// =============================================================================
// FIELDSET CREATION TESTS
// =============================================================================

#[tokio::test]
async fn test_create_fieldset() {
    let (server, _guard) = create_test_server();

    let response = server
        .post("/fieldset")
        .json(&json!({
            "identifier": "contact_info",
            "title": "Contact",
            "description": "How to reach you",
            "use_legend": "1"
        }))
        .await;

    response.assert_status_ok();
    let result: MutationResponse = response.json();
    assert!(result.success);

    let outline: OutlineResponse = server.get("/outline").await.json();
    assert_eq!(outline.node_count, 1);
    assert_eq!(outline.nodes[0].identifier, "contact_info");
}

#[tokio::test]
async fn test_create_fieldset_reserved_identifier() {
    let (server, _guard) = create_test_server();

    let response = server
        .post("/fieldset")
        .json(&json!({ "identifier": "form", "title": "Broken" }))
        .await;

    response.assert_status_bad_request();
    let result: MutationResponse = response.json();
    assert!(!result.success);
    assert!(result.error.unwrap().contains("reserved"));

    // Nothing was added.
    let outline: OutlineResponse = server.get("/outline").await.json();
    assert_eq!(outline.node_count, 0);
}

#[tokio::test]
async fn test_create_fieldset_duplicate_identifier() {
    let (server, _guard) = create_populated_test_server();

    let response = server
        .post("/fieldset")
        .json(&json!({ "identifier": "email", "title": "Clash" }))
        .await;

    response.assert_status_bad_request();
    let result: MutationResponse = response.json();
    assert!(!result.success);
    assert!(result.error.unwrap().contains("already in use"));
}

#[tokio::test]
async fn test_create_fieldset_oversized_identifier() {
    let (server, _guard) = create_test_server();

    let response = server
        .post("/fieldset")
        .json(&json!({ "identifier": "x".repeat(500), "title": "Too long" }))
        .await;

    response.assert_status_bad_request();
}

// =============================================================================
// EDIT ENDPOINT TESTS
// =============================================================================

#[tokio::test]
async fn test_edit_title_reflected_in_markers() {
    let (server, _guard) = create_populated_test_server();

    let response = server
        .post("/edit")
        .json(&json!({
            "fieldset": "contact_info",
            "op": "set_title",
            "value": "Reaching you"
        }))
        .await;
    response.assert_status_ok();

    let enumerated: EnumerateResponse = server
        .post("/enumerate")
        .json(&json!({ "fieldset": "contact_info", "include_markers": true }))
        .await
        .json();
    let ItemJson::Start(marker) = &enumerated.items[0] else {
        panic!("expected a start marker first");
    };
    assert_eq!(marker.label, "Reaching you");
}

#[tokio::test]
async fn test_edit_use_legend_accepts_both_shapes() {
    let (server, _guard) = create_populated_test_server();

    // Raw form text.
    let response = server
        .post("/edit")
        .json(&json!({
            "fieldset": "contact_info",
            "op": "set_use_legend",
            "value": "nonsense"
        }))
        .await;
    response.assert_status_ok();

    let enumerated: EnumerateResponse = server
        .post("/enumerate")
        .json(&json!({ "fieldset": "contact_info", "include_markers": true }))
        .await
        .json();
    let ItemJson::Start(marker) = &enumerated.items[0] else {
        panic!("expected a start marker first");
    };
    assert!(!marker.show_legend);

    // Native boolean.
    let response = server
        .post("/edit")
        .json(&json!({
            "fieldset": "contact_info",
            "op": "set_use_legend",
            "value": true
        }))
        .await;
    response.assert_status_ok();

    let enumerated: EnumerateResponse = server
        .post("/enumerate")
        .json(&json!({ "fieldset": "contact_info", "include_markers": true }))
        .await
        .json();
    let ItemJson::Start(marker) = &enumerated.items[0] else {
        panic!("expected a start marker first");
    };
    assert!(marker.show_legend);
}

#[tokio::test]
async fn test_edit_rename_syncs_markers() {
    let (server, _guard) = create_populated_test_server();

    let response = server
        .post("/edit")
        .json(&json!({
            "fieldset": "contact_info",
            "op": "rename",
            "value": "reach_info"
        }))
        .await;
    response.assert_status_ok();

    let enumerated: EnumerateResponse = server
        .post("/enumerate")
        .json(&json!({ "fieldset": "reach_info", "include_markers": true }))
        .await
        .json();
    let ItemJson::Start(start) = &enumerated.items[0] else {
        panic!("expected a start marker first");
    };
    let ItemJson::End(end) = enumerated.items.last().unwrap() else {
        panic!("expected an end marker last");
    };
    assert_eq!(start.identifier, "reach_info");
    assert_eq!(end.identifier, "reach_info");
}

#[tokio::test]
async fn test_edit_rename_reserved_rejected() {
    let (server, _guard) = create_populated_test_server();

    let response = server
        .post("/edit")
        .json(&json!({
            "fieldset": "contact_info",
            "op": "rename",
            "value": "fieldset"
        }))
        .await;

    response.assert_status_bad_request();
    let result: MutationResponse = response.json();
    assert!(result.error.unwrap().contains("reserved"));

    // The container is still addressable under its old name.
    let enumerated = server
        .post("/enumerate")
        .json(&json!({ "fieldset": "contact_info", "include_markers": false }))
        .await;
    enumerated.assert_status_ok();
}

#[tokio::test]
async fn test_edit_unknown_fieldset() {
    let (server, _guard) = create_test_server();

    let response = server
        .post("/edit")
        .json(&json!({ "fieldset": "missing", "op": "set_title", "value": "X" }))
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_edit_non_fieldset_target() {
    let (server, _guard) = create_populated_test_server();

    let response = server
        .post("/edit")
        .json(&json!({ "fieldset": "email", "op": "set_title", "value": "X" }))
        .await;

    response.assert_status_bad_request();
    let result: MutationResponse = response.json();
    assert!(result.error.unwrap().contains("not a fieldset"));
}

// =============================================================================
// NODE ENDPOINT TESTS
// =============================================================================

#[tokio::test]
async fn test_add_field_to_fieldset() {
    let (server, _guard) = create_populated_test_server();

    let response = server
        .post("/node")
        .json(&json!({
            "parent": "contact_info",
            "node": { "kind": "text", "identifier": "phone", "title": "Phone" }
        }))
        .await;
    response.assert_status_ok();

    let enumerated: EnumerateResponse = server
        .post("/enumerate")
        .json(&json!({ "fieldset": "contact_info", "include_markers": false }))
        .await
        .json();
    assert_eq!(enumerated.items.len(), 2);
}

#[tokio::test]
async fn test_add_node_duplicate_identifier_rejected() {
    let (server, _guard) = create_populated_test_server();

    // "email" already exists inside the contact fieldset.
    let response = server
        .post("/node")
        .json(&json!({
            "node": { "kind": "text", "identifier": "email", "title": "Email" }
        }))
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_add_node_to_non_fieldset_parent() {
    let (server, _guard) = create_populated_test_server();

    let response = server
        .post("/node")
        .json(&json!({
            "parent": "email",
            "node": { "kind": "text", "identifier": "phone", "title": "Phone" }
        }))
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_remove_node_releases_identifier() {
    let (server, _guard) = create_populated_test_server();

    let response = server
        .post("/node/remove")
        .json(&json!({ "identifier": "contact_info" }))
        .await;
    response.assert_status_ok();

    // Both the fieldset and its contained field are gone.
    let check: CheckResponse = server
        .post("/check")
        .json(&json!({ "identifier": "email" }))
        .await
        .json();
    assert!(check.available);

    let outline: OutlineResponse = server.get("/outline").await.json();
    assert_eq!(outline.node_count, 3);
}

// =============================================================================
// CHECK ENDPOINT TESTS
// =============================================================================

#[tokio::test]
async fn test_check_identifier_states() {
    let (server, _guard) = create_populated_test_server();

    let reserved: CheckResponse = server
        .post("/check")
        .json(&json!({ "identifier": "form_submit" }))
        .await
        .json();
    assert!(reserved.reserved);
    assert!(!reserved.available);

    let taken: CheckResponse = server
        .post("/check")
        .json(&json!({ "identifier": "country" }))
        .await
        .json();
    assert!(!taken.reserved);
    assert!(!taken.available);

    let free: CheckResponse = server
        .post("/check")
        .json(&json!({ "identifier": "phone" }))
        .await
        .json();
    assert!(free.available);
}

// =============================================================================
// ENUMERATE ENDPOINT TESTS
// =============================================================================

#[tokio::test]
async fn test_enumerate_with_markers() {
    let (server, _guard) = create_populated_test_server();

    let enumerated: EnumerateResponse = server
        .post("/enumerate")
        .json(&json!({ "fieldset": "contact_info", "include_markers": true }))
        .await
        .json();

    assert_eq!(enumerated.items.len(), 3);
    assert!(matches!(enumerated.items[0], ItemJson::Start(_)));
    assert!(matches!(
        &enumerated.items[1],
        ItemJson::Field { identifier, .. } if identifier == "email"
    ));
    assert!(matches!(enumerated.items[2], ItemJson::End(_)));
}

#[tokio::test]
async fn test_enumerate_kind_filter() {
    let (server, _guard) = create_populated_test_server();

    let enumerated: EnumerateResponse = server
        .post("/enumerate")
        .json(&json!({
            "fieldset": "contact_info",
            "kinds": ["selection"],
            "include_markers": false
        }))
        .await
        .json();

    assert!(enumerated.items.is_empty());
}

#[tokio::test]
async fn test_enumerate_unknown_fieldset() {
    let (server, _guard) = create_test_server();

    let response = server
        .post("/enumerate")
        .json(&json!({ "fieldset": "missing" }))
        .await;

    response.assert_status_bad_request();
    let result: EnumerateResponse = response.json();
    assert!(!result.success);
}

// =============================================================================
// CANDIDATES ENDPOINT TESTS
// =============================================================================

#[tokio::test]
async fn test_candidates_in_sibling_order() {
    let (server, _guard) = create_populated_test_server();

    let candidates: CandidatesResponse = server
        .post("/candidates")
        .json(&json!({ "fieldset": "contact_info" }))
        .await
        .json();

    assert!(candidates.success);
    let pairs: Vec<(&str, &str)> = candidates
        .candidates
        .iter()
        .map(|c| (c.key.as_str(), c.label.as_str()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("country", "Country - US; CA"),
            ("state", "State - NY; CA"),
        ]
    );
}

// =============================================================================
// PLAN ENDPOINT TESTS
// =============================================================================

#[tokio::test]
async fn test_plan_editing_view() {
    let (server, _guard) = create_populated_test_server();

    let plan: PlanResponse = server.post("/plan").json(&json!({})).await.json();

    assert!(plan.success);
    // 2 selection fields + 2 fieldsets with markers + 2 contained fields.
    assert_eq!(plan.steps.len(), 8);
}

#[tokio::test]
async fn test_plan_hides_unsatisfied_fieldset() {
    let (server, _guard) = create_populated_test_server();

    let plan: PlanResponse = server
        .post("/plan")
        .json(&json!({ "submitted": { "subscribe": "no" } }))
        .await
        .json();

    let extras_steps = plan
        .steps
        .iter()
        .filter(|step| match step {
            StepJson::FieldsetStart(marker) | StepJson::FieldsetEnd(marker) => {
                marker.identifier == "extras"
            }
            StepJson::Field { identifier, .. } => identifier == "topics",
            StepJson::Note { .. } => false,
        })
        .count();
    assert_eq!(extras_steps, 0, "hidden fieldset must be omitted entirely");
}

#[tokio::test]
async fn test_plan_shows_satisfied_fieldset() {
    let (server, _guard) = create_populated_test_server();

    let plan: PlanResponse = server
        .post("/plan")
        .json(&json!({ "submitted": { "subscribe": "yes" } }))
        .await
        .json();

    assert!(plan.steps.iter().any(|step| matches!(
        step,
        StepJson::FieldsetStart(marker) if marker.identifier == "extras"
    )));
}

// =============================================================================
// EXPORT ENDPOINT TESTS
// =============================================================================

#[tokio::test]
async fn test_export_roundtrips_through_core() {
    let (server, _guard) = create_populated_test_server();

    let response = server.post("/export").await;
    response.assert_status_ok();

    let export: ExportResponse = response.json();
    assert!(export.success);

    let bytes = base64::Engine::decode(
        &base64::engine::general_purpose::STANDARD,
        export.data.unwrap(),
    )
    .unwrap();
    let restored = form_from_bytes(&bytes).unwrap();
    assert_eq!(restored.len(), 4);
    assert!(restored.find_fieldset("contact_info").is_some());
}

// =============================================================================
// SAVE ENDPOINT TESTS
// =============================================================================

#[tokio::test]
async fn test_save_writes_definition_file() {
    let guard = acquire_guard();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("form.ffd");

    let state = AppState::with_path(Form::new("Survey"), path.clone());
    let router = create_router(state, &ServerConfig::default());
    let server = TestServer::new(router).unwrap();

    let response = server.post("/save").await;
    response.assert_status_ok();

    let bytes = std::fs::read(&path).unwrap();
    let restored = form_from_bytes(&bytes).unwrap();
    assert_eq!(restored.title(), "Survey");

    drop(guard);
}

#[tokio::test]
async fn test_save_without_path_fails() {
    let (server, _guard) = create_test_server();

    let response = server.post("/save").await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
}

// =============================================================================
// AUTH TESTS
// =============================================================================

#[tokio::test]
async fn test_auth_blocks_without_key() {
    let guard = acquire_guard();
    // SAFETY: Tests run sequentially under AUTH_TEST_MUTEX.
    unsafe { std::env::set_var("FORMFOLD_API_KEY", "secret-key") };

    let state = AppState::new(Form::new("Survey"));
    let router = create_router(state, &ServerConfig::default());
    let server = TestServer::new(router).unwrap();

    // Health stays open for load balancers.
    server.get("/health").await.assert_status_ok();

    // Everything else requires the key.
    server.get("/outline").await.assert_status_unauthorized();

    let authed = server
        .get("/outline")
        .add_header(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_static("Bearer secret-key"),
        )
        .await;
    authed.assert_status_ok();

    let wrong = server
        .get("/outline")
        .add_header(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_static("Bearer wrong-key"),
        )
        .await;
    wrong.assert_status_unauthorized();

    drop(guard);
}
