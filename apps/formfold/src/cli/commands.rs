//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.
//! All file I/O lives here; the engine itself never touches disk.

use crate::api::{self, AppState, OutlineNode, OutlineResponse, PlanResponse};
use crate::config::ServerConfig;
use formfold_core::{
    Form, FormError, FormNode, NodeKind, ParentForm, RenderStep, SubmittedValues,
    constants::is_reserved, form_from_bytes, form_to_bytes, render_sequence,
};
use std::path::{Path, PathBuf};

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum file size for a form definition (32 MB).
///
/// This prevents memory exhaustion from malicious or accidental large files.
const MAX_DEFINITION_FILE_SIZE: u64 = 32 * 1024 * 1024;

/// Maximum file size for a submitted-values file (1 MB).
const MAX_SUBMISSION_FILE_SIZE: u64 = 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), FormError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| FormError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(FormError::InvalidDefinition(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Validate a file path before reading it.
///
/// This function:
/// 1. Canonicalizes the path to resolve symlinks and ".."
/// 2. Ensures the path exists
/// 3. Ensures the path is a file (not a directory)
fn validate_file_path(path: &Path) -> Result<PathBuf, FormError> {
    // Canonicalize resolves "..", symlinks, and validates existence
    let canonical = path.canonicalize().map_err(|e| {
        FormError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    // Ensure it's a file, not a directory
    if !canonical.is_file() {
        return Err(FormError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Validate an output path before writing.
///
/// For output files, the parent directory must exist and be a directory.
fn validate_output_path(path: &Path) -> Result<PathBuf, FormError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let canonical_parent = parent.canonicalize().map_err(|e| {
        FormError::IoError(format!(
            "Invalid output directory '{}': {}",
            parent.display(),
            e
        ))
    })?;

    if !canonical_parent.is_dir() {
        return Err(FormError::IoError(format!(
            "Output directory '{}' is not a valid directory",
            parent.display()
        )));
    }

    let filename = path
        .file_name()
        .ok_or_else(|| FormError::IoError("Output path has no filename".to_string()))?;

    Ok(canonical_parent.join(filename))
}

// =============================================================================
// DEFINITION FILE ACCESS
// =============================================================================

/// Load a form definition from its binary file.
fn load_form(path: &Path) -> Result<Form, FormError> {
    let canonical = validate_file_path(path)?;
    validate_file_size(&canonical, MAX_DEFINITION_FILE_SIZE)?;

    let bytes = std::fs::read(&canonical).map_err(|e| {
        FormError::IoError(format!("Cannot read '{}': {}", canonical.display(), e))
    })?;
    form_from_bytes(&bytes)
}

/// Load the definition, or start from an empty form if the file is missing.
fn load_or_create_form(path: &Path) -> Result<Form, FormError> {
    if path.exists() {
        load_form(path)
    } else {
        Ok(Form::new("Untitled form"))
    }
}

/// Write a form definition to its binary file.
fn save_form(path: &Path, form: &Form) -> Result<(), FormError> {
    let target = validate_output_path(path)?;
    let bytes = form_to_bytes(form)?;
    std::fs::write(&target, bytes)
        .map_err(|e| FormError::IoError(format!("Cannot write '{}': {}", target.display(), e)))
}

// =============================================================================
// NEW COMMAND
// =============================================================================

/// Initialize a new definition file.
pub fn cmd_new(path: &Path, title: &str, force: bool, json_mode: bool) -> Result<(), FormError> {
    if path.exists() && !force {
        return Err(FormError::IoError(format!(
            "Definition '{}' already exists (use --force to overwrite)",
            path.display()
        )));
    }

    let form = Form::new(title);
    save_form(path, &form)?;

    if json_mode {
        let output = serde_json::json!({
            "created": path.to_string_lossy(),
            "title": title,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Created empty form '{}' at {:?}", title, path);
    Ok(())
}

// =============================================================================
// OUTLINE COMMAND
// =============================================================================

/// Show the form structure.
pub fn cmd_outline(path: &Path, json_mode: bool) -> Result<(), FormError> {
    let form = load_or_create_form(path)?;

    if json_mode {
        let response = OutlineResponse {
            title: form.title().to_string(),
            node_count: form.len(),
            nodes: form.children().iter().map(OutlineNode::from_node).collect(),
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&response).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Form: {}", form.title());
    println!("Definition: {:?}", path);
    println!();
    if form.is_empty() {
        println!("  (no nodes)");
        return Ok(());
    }
    for node in form.children() {
        print_node(node, 1);
    }
    Ok(())
}

fn print_node(node: &FormNode, depth: usize) {
    let indent = "  ".repeat(depth);
    match node {
        FormNode::Field(field) => {
            println!(
                "{}- {} [{}] {}",
                indent,
                field.identifier,
                kind_name(field.node_kind()),
                field.title
            );
        }
        FormNode::Note(note) => {
            println!("{}- {} [note]", indent, note.identifier);
        }
        FormNode::Fieldset(fieldset) => {
            println!(
                "{}+ {} [fieldset] {}",
                indent,
                fieldset.identifier(),
                fieldset.title()
            );
            for child in fieldset.children() {
                print_node(child, depth + 1);
            }
        }
    }
}

fn kind_name(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Text => "text",
        NodeKind::TextArea => "text_area",
        NodeKind::Selection => "selection",
        NodeKind::Checkbox => "checkbox",
        NodeKind::Note => "note",
        NodeKind::Fieldset => "fieldset",
    }
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(
    path: &Path,
    host: Option<String>,
    port: Option<u16>,
    config_path: Option<&Path>,
) -> Result<(), FormError> {
    let mut config = ServerConfig::load(config_path)?;
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }

    let form = load_or_create_form(path)?;

    println!("Formfold Form Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Address:    {}", config.bind_addr());
    println!("  Definition: {:?}", path);
    println!("  Rate limit: {}/s", config.rate_limit);
    println!();
    println!("Endpoints:");
    println!("  GET  /outline    - Form structure");
    println!("  POST /fieldset   - Create a fieldset");
    println!("  POST /edit       - Edit a fieldset");
    println!("  POST /node       - Add a field or note");
    println!("  POST /plan       - Render sequence");
    println!("  POST /save       - Write the definition file");
    println!("  GET  /health     - Health check");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let state = AppState::with_path(form, path.to_path_buf());
    api::run_server(&config, state).await
}

// =============================================================================
// PLAN COMMAND
// =============================================================================

/// Print the render sequence.
pub fn cmd_plan(
    path: &Path,
    submission: Option<&Path>,
    json_mode: bool,
) -> Result<(), FormError> {
    let form = load_or_create_form(path)?;

    let submitted = match submission {
        Some(submission_path) => Some(read_submission(submission_path)?),
        None => None,
    };

    let steps = render_sequence(&form, submitted.as_ref());

    if json_mode {
        let response = PlanResponse::success(&steps);
        println!(
            "{}",
            serde_json::to_string_pretty(&response).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Render plan for '{}':", form.title());
    println!();
    if steps.is_empty() {
        println!("  (nothing to render)");
        return Ok(());
    }
    for step in &steps {
        match step {
            RenderStep::Field(field) => {
                println!(
                    "  field     {} [{}]{}",
                    field.identifier,
                    kind_name(field.node_kind()),
                    if field.required { " (required)" } else { "" }
                );
            }
            RenderStep::Note(note) => println!("  note      {}", note.identifier),
            RenderStep::FieldsetStart(marker) => {
                println!(
                    "  >> start  {} {}",
                    marker.identifier,
                    if marker.show_legend {
                        format!("legend: {}", marker.label)
                    } else {
                        String::new()
                    }
                );
            }
            RenderStep::FieldsetEnd(marker) => println!("  << end    {}", marker.identifier),
        }
    }
    Ok(())
}

/// Read a submitted-values JSON file.
fn read_submission(path: &Path) -> Result<SubmittedValues, FormError> {
    let canonical = validate_file_path(path)?;
    validate_file_size(&canonical, MAX_SUBMISSION_FILE_SIZE)?;

    let raw = std::fs::read_to_string(&canonical).map_err(|e| {
        FormError::IoError(format!("Cannot read '{}': {}", canonical.display(), e))
    })?;
    serde_json::from_str(&raw).map_err(|e| {
        FormError::DeserializationError(format!("Invalid submission file: {}", e))
    })
}

// =============================================================================
// CANDIDATES COMMAND
// =============================================================================

/// Show a fieldset's conditional-field candidates.
pub fn cmd_candidates(path: &Path, fieldset_id: &str, json_mode: bool) -> Result<(), FormError> {
    let form = load_form(path)?;

    let Some(fieldset) = form.find_fieldset(fieldset_id) else {
        return Err(if form.find_node(fieldset_id).is_some() {
            FormError::NotAFieldset(fieldset_id.to_owned())
        } else {
            FormError::UnknownNode(fieldset_id.to_owned())
        });
    };

    let candidates = fieldset.conditional_field_candidates(&form);

    if json_mode {
        println!(
            "{}",
            serde_json::to_string_pretty(&candidates).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Conditional-field candidates for '{}':", fieldset_id);
    if candidates.is_empty() {
        println!("  (no selection fields in this form)");
        return Ok(());
    }
    for entry in candidates.entries() {
        println!("  {}: {}", entry.key, entry.label);
    }
    Ok(())
}

// =============================================================================
// CHECK COMMAND
// =============================================================================

/// Check an identifier for availability.
pub fn cmd_check(path: &Path, identifier: &str, json_mode: bool) -> Result<(), FormError> {
    let form = load_or_create_form(path)?;

    let reserved = is_reserved(identifier);
    let available = !reserved && form.check_identifier_available(identifier);

    if json_mode {
        let output = serde_json::json!({
            "identifier": identifier,
            "reserved": reserved,
            "available": available,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    if reserved {
        println!("'{}' is a reserved identifier", identifier);
    } else if available {
        println!("'{}' is available", identifier);
    } else {
        println!("'{}' is already in use", identifier);
    }
    Ok(())
}

// =============================================================================
// DUPLICATE COMMAND
// =============================================================================

/// Duplicate a fieldset's configuration under a new identifier.
pub fn cmd_duplicate(path: &Path, source: &str, new_id: &str) -> Result<(), FormError> {
    let mut form = load_form(path)?;
    form.duplicate_fieldset(source, new_id)?;
    save_form(path, &form)?;

    println!("Duplicated '{}' as '{}'", source, new_id);
    Ok(())
}

// =============================================================================
// EXPORT / IMPORT COMMANDS
// =============================================================================

/// Export the definition as pretty-printed JSON.
pub fn cmd_export(path: &Path, output: &Path) -> Result<(), FormError> {
    let form = load_form(path)?;
    let target = validate_output_path(output)?;

    let json = serde_json::to_string_pretty(&form)
        .map_err(|e| FormError::SerializationError(e.to_string()))?;
    std::fs::write(&target, json)
        .map_err(|e| FormError::IoError(format!("Cannot write '{}': {}", target.display(), e)))?;

    println!("Exported {} top-level nodes to {:?}", form.len(), output);
    Ok(())
}

/// Import a JSON definition, reconcile it, and save the binary file.
pub fn cmd_import(path: &Path, input: &Path) -> Result<(), FormError> {
    let canonical = validate_file_path(input)?;
    validate_file_size(&canonical, MAX_DEFINITION_FILE_SIZE)?;

    let raw = std::fs::read_to_string(&canonical).map_err(|e| {
        FormError::IoError(format!("Cannot read '{}': {}", canonical.display(), e))
    })?;
    let mut form: Form = serde_json::from_str(&raw)
        .map_err(|e| FormError::DeserializationError(format!("Invalid definition: {}", e)))?;

    // Imported trees may carry drifted marker names; attachment
    // reconciliation brings them back in line and rebuilds the namespace.
    form.reattach();
    save_form(path, &form)?;

    println!("Imported {} top-level nodes into {:?}", form.len(), path);
    Ok(())
}
