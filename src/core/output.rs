//! Public output types for srcmigrate command responses.
//!
//! These are part of the public API for command output, used by CLI commands
//! and by consumers of the srcmigrate library.

use serde::{Deserialize, Serialize};

// ============================================================================
// Batch Operations
// ============================================================================

/// Per-file summary of a migration run.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    pub rewritten: u32,
    pub errors: u32,
    pub items: Vec<BatchResultItem>,
}

/// Individual file result within a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResultItem {
    pub id: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replacements: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_rewritten(&mut self, id: String, replacements: usize) {
        self.rewritten += 1;
        self.items.push(BatchResultItem {
            id,
            status: "rewritten".to_string(),
            replacements: Some(replacements),
            error: None,
        });
    }

    pub fn record_error(&mut self, id: String, error: String) {
        self.errors += 1;
        self.items.push(BatchResultItem {
            id,
            status: "error".to_string(),
            replacements: None,
            error: Some(error),
        });
    }
}
