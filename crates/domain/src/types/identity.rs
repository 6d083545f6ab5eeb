//! Authenticated identity types
//!
//! Minimal identity snapshot supplied by the external authentication
//! provider. Read-only to this system; the provider owns every field.

use serde::{Deserialize, Serialize};

/// Snapshot of the currently authenticated user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Opaque stable identifier, unique per authenticated user
    pub id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl Identity {
    /// Create an identity snapshot with only the stable id populated
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), email: None, first_name: None, last_name: None }
    }

    /// Display name derived from the present name parts.
    ///
    /// Absent parts are skipped rather than rendered as placeholder text;
    /// both parts absent yields an empty string.
    pub fn full_name(&self) -> String {
        let mut parts = Vec::with_capacity(2);
        if let Some(first) = self.first_name.as_deref() {
            parts.push(first);
        }
        if let Some(last) = self.last_name.as_deref() {
            parts.push(last);
        }
        parts.join(" ")
    }

    /// Email address, empty string when the provider has none on file
    pub fn email_or_default(&self) -> String {
        self.email.clone().unwrap_or_default()
    }
}
