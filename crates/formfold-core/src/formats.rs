//! # Definition Format
//!
//! Binary serialization for form definitions.
//!
//! Format: Header (5 bytes) + postcard-serialized form data.
//! - 4 bytes: Magic ("FFLD")
//! - 1 byte: Version
//!
//! All size and header validation happens before payload parsing, and
//! decoding finishes with attachment reconciliation: an imported definition
//! whose marker names drifted from their identifiers comes back healed.
//! File I/O belongs to the app layer; everything here is a pure
//! transformation.

use crate::constants::{FORMAT_VERSION, MAGIC_BYTES, MAX_DEFINITION_PAYLOAD_SIZE};
use crate::form::Form;
use crate::types::FormError;

/// Minimum valid definition size (header only).
const MIN_DEFINITION_SIZE: usize = 5;

// =============================================================================
// DEFINITION HEADER
// =============================================================================

/// The definition header precedes all form data.
#[derive(Debug, Clone, Copy)]
pub struct DefinitionHeader {
    pub magic: [u8; 4],
    pub version: u8,
}

impl DefinitionHeader {
    /// Create a new header with the current format version.
    #[must_use]
    pub fn new() -> Self {
        Self {
            magic: *MAGIC_BYTES,
            version: FORMAT_VERSION,
        }
    }

    /// Validate the header.
    pub fn validate(&self) -> Result<(), FormError> {
        if &self.magic != MAGIC_BYTES {
            return Err(FormError::DeserializationError(
                "invalid magic bytes".to_string(),
            ));
        }
        if self.version != FORMAT_VERSION {
            return Err(FormError::DeserializationError(format!(
                "unsupported version: {} (expected {})",
                self.version, FORMAT_VERSION
            )));
        }
        Ok(())
    }

    /// Write the header to bytes.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; 5] {
        let mut bytes = [0u8; 5];
        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4] = self.version;
        bytes
    }

    /// Read a header from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FormError> {
        if bytes.len() < MIN_DEFINITION_SIZE {
            return Err(FormError::DeserializationError(
                "header too short".to_string(),
            ));
        }
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[0..4]);
        Ok(Self {
            magic,
            version: bytes[4],
        })
    }
}

impl Default for DefinitionHeader {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// SERIALIZATION FUNCTIONS
// =============================================================================

/// Serialize a form definition to bytes (header + payload).
pub fn form_to_bytes(form: &Form) -> Result<Vec<u8>, FormError> {
    let header = DefinitionHeader::new();

    let payload =
        postcard::to_stdvec(form).map_err(|e| FormError::SerializationError(e.to_string()))?;

    let mut result = Vec::with_capacity(MIN_DEFINITION_SIZE + payload.len());
    result.extend_from_slice(&header.to_bytes());
    result.extend_from_slice(&payload);

    Ok(result)
}

/// Deserialize a form definition from bytes.
///
/// Validates minimum size, maximum payload size, and the header - in that
/// order, all before the payload is parsed. The decoded form comes back
/// with its namespace rebuilt and attachment hooks run.
pub fn form_from_bytes(bytes: &[u8]) -> Result<Form, FormError> {
    if bytes.len() < MIN_DEFINITION_SIZE {
        return Err(FormError::DeserializationError(
            "data too short: minimum 5 bytes required".to_string(),
        ));
    }

    if bytes.len() > MAX_DEFINITION_PAYLOAD_SIZE {
        return Err(FormError::DeserializationError(format!(
            "data size {} bytes exceeds maximum allowed {} bytes",
            bytes.len(),
            MAX_DEFINITION_PAYLOAD_SIZE
        )));
    }

    let header = DefinitionHeader::from_bytes(bytes)?;
    header.validate()?;

    let payload = &bytes[MIN_DEFINITION_SIZE..];
    let mut form: Form = postcard::from_bytes(payload).map_err(|e| {
        FormError::DeserializationError(format!("failed to decode form definition: {}", e))
    })?;

    form.reattach();
    Ok(form)
}

// =============================================================================
// TESTS
// =============================================================================
