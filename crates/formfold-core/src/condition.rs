//! # Conditional Display
//!
//! Evaluation of a container's conditional-display rule against a
//! submitted-values map.
//!
//! Evaluation is tolerant by design: a rule referencing a field that no
//! longer exists (or was never submitted) treats the condition as
//! unsatisfiable rather than raising. Referential integrity is resolved
//! here, lazily, never eagerly at configuration time.

use crate::types::Identifier;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// SUBMITTED VALUES
// =============================================================================

/// The raw values of one form submission, keyed by field identifier.
///
/// Values are the untyped strings the submission pipeline produced; this
/// crate only reads them for condition evaluation and never stores them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmittedValues(BTreeMap<String, String>);

impl SubmittedValues {
    /// Create a new empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the submitted value of a field.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.0.insert(field.into(), value.into());
    }

    /// Look up the submitted value of a field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Number of submitted fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check whether anything was submitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SubmittedValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

// =============================================================================
// EVALUATION
// =============================================================================

/// Evaluate a conditional-display rule.
///
/// - No field configured: always visible.
/// - Field configured but absent from the submission (stale reference or
///   simply not answered): the condition is unsatisfiable - hidden.
/// - Otherwise: visible exactly when the submitted value equals the
///   configured value, where an unset configured value compares as the
///   empty string.
#[must_use]
pub fn evaluate(
    field: Option<&Identifier>,
    expected: Option<&str>,
    submitted: &SubmittedValues,
) -> bool {
    let Some(field) = field else {
        return true;
    };
    let Some(actual) = submitted.get(field.as_str()) else {
        return false;
    };
    actual == expected.unwrap_or("")
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(pairs: &[(&str, &str)]) -> SubmittedValues {
        pairs.iter().copied().collect()
    }

    #[test]
    fn no_rule_is_always_visible() {
        let values = submission(&[("country", "US")]);
        assert!(evaluate(None, None, &values));
        assert!(evaluate(None, Some("US"), &values));
    }

    #[test]
    fn matching_value_is_visible() {
        let field = Identifier::new("country");
        let values = submission(&[("country", "US")]);
        assert!(evaluate(Some(&field), Some("US"), &values));
    }

    #[test]
    fn mismatching_value_is_hidden() {
        let field = Identifier::new("country");
        let values = submission(&[("country", "CA")]);
        assert!(!evaluate(Some(&field), Some("US"), &values));
    }

    #[test]
    fn stale_reference_is_unsatisfiable_not_an_error() {
        let field = Identifier::new("removed_field");
        let values = submission(&[("country", "US")]);
        assert!(!evaluate(Some(&field), Some("US"), &values));
    }

    #[test]
    fn unset_expected_value_compares_as_empty() {
        let field = Identifier::new("country");
        assert!(evaluate(Some(&field), None, &submission(&[("country", "")])));
        assert!(!evaluate(Some(&field), None, &submission(&[("country", "US")])));
    }
}
