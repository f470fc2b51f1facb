// Sync Job Domain Model

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{DomainError, Result};
use super::tenant::{TenantId, TenantRecord};
use super::term::TermGroups;

/// Identifier of a document within one tenant's store
pub type DocumentId = i64;

/// Author used when a job document carries none
pub const DEFAULT_AUTHOR_ID: i64 = 1;

/// Scoped metadata keys written on a job document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetaKey {
    Portal,
    PostTypes,
    Taxonomies,
    Author,
}

impl MetaKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetaKey::Portal => "portal",
            MetaKey::PostTypes => "post_types",
            MetaKey::Taxonomies => "taxonomies",
            MetaKey::Author => "author",
        }
    }
}

impl std::fmt::Display for MetaKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single-key metadata filter for document lookup
#[derive(Debug, Clone, PartialEq)]
pub struct MetaFilter {
    pub key: MetaKey,
    pub value: Value,
}

impl MetaFilter {
    pub fn new(key: MetaKey, value: impl Into<Value>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

/// Document row as returned by the scoped store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDocument {
    pub id: DocumentId,
    pub title: String,
}

/// In-memory view of one sync job
///
/// `Default` is the soft-fail state: no tenants, no document, no fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncJobFields {
    pub portal: Option<TenantRecord>,
    pub source: Option<TenantRecord>,
    pub document_id: Option<DocumentId>,
    pub title: String,
    pub author_id: i64,
    pub post_types: Vec<String>,
    pub taxonomies: Vec<String>,
    pub terms: TermGroups,
    pub composite_id: Option<String>,
}

impl Default for SyncJobFields {
    fn default() -> Self {
        Self {
            portal: None,
            source: None,
            document_id: None,
            title: String::new(),
            author_id: DEFAULT_AUTHOR_ID,
            post_types: Vec::new(),
            taxonomies: Vec::new(),
            terms: TermGroups::new(),
            composite_id: None,
        }
    }
}

/// Display title for a job document
///
/// Empty, placeholder and purely numeric titles become `Job #<id>`.
pub fn display_title(raw: &str, id: DocumentId, placeholders: &[String]) -> String {
    let trimmed = raw.trim();
    let is_placeholder = placeholders.iter().any(|p| p == trimmed);
    let is_numeric = !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit());

    if trimmed.is_empty() || is_placeholder || is_numeric {
        format!("Job #{}", id)
    } else {
        raw.to_string()
    }
}

/// External identifier `<source>_<document>`; degenerate `<source>_` without a document
pub fn composite_id(source: TenantId, document: Option<DocumentId>) -> String {
    match document {
        Some(id) => format!("{}_{}", source, id),
        None => format!("{}_", source),
    }
}

/// Decode a name list stored under `key`
///
/// Missing or null values decode to an empty list and a bare string to a
/// one-element list.
pub fn decode_names(key: MetaKey, value: Option<Value>) -> Result<Vec<String>> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::String(s)) if s.is_empty() => Ok(Vec::new()),
        Some(Value::String(s)) => Ok(vec![s]),
        Some(Value::Array(items)) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Ok(s),
                other => Err(DomainError::MalformedMeta {
                    key: key.to_string(),
                    reason: format!("expected string entry, got {}", other),
                }),
            })
            .collect(),
        Some(other) => Err(DomainError::MalformedMeta {
            key: key.to_string(),
            reason: format!("expected list of names, got {}", other),
        }),
    }
}

/// Decode a stored integer id (numbers or numeric strings)
///
/// Non-positive values decode to `None`.
pub fn decode_id(key: MetaKey, value: Option<Value>) -> Result<Option<i64>> {
    let id = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        Some(_) => None,
    };

    match id {
        Some(id) if id > 0 => Ok(Some(id)),
        Some(_) => Ok(None),
        None => Err(DomainError::MalformedMeta {
            key: key.to_string(),
            reason: "expected integer id".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn placeholders() -> Vec<String> {
        vec!["Auto Draft".to_string()]
    }

    #[test]
    fn test_display_title_synthesized() {
        assert_eq!(display_title("", 100, &placeholders()), "Job #100");
        assert_eq!(display_title("Auto Draft", 100, &placeholders()), "Job #100");
        assert_eq!(display_title("42", 7, &placeholders()), "Job #7");
        assert_eq!(display_title("   ", 3, &placeholders()), "Job #3");
    }

    #[test]
    fn test_display_title_kept() {
        assert_eq!(display_title("Weekly Sync", 100, &placeholders()), "Weekly Sync");
        assert_eq!(display_title("Sync 42", 100, &placeholders()), "Sync 42");
    }

    #[test]
    fn test_composite_id() {
        assert_eq!(composite_id(9, Some(100)), "9_100");
        assert_eq!(composite_id(9, None), "9_");
    }

    #[test]
    fn test_decode_names() {
        assert_eq!(
            decode_names(MetaKey::PostTypes, Some(json!(["post", "page"]))).unwrap(),
            vec!["post", "page"]
        );
        assert_eq!(
            decode_names(MetaKey::PostTypes, Some(json!("post"))).unwrap(),
            vec!["post"]
        );
        assert!(decode_names(MetaKey::PostTypes, None).unwrap().is_empty());
        assert!(decode_names(MetaKey::Taxonomies, Some(json!(""))).unwrap().is_empty());
        assert!(decode_names(MetaKey::Taxonomies, Some(json!([1, 2]))).is_err());
        assert!(decode_names(MetaKey::Taxonomies, Some(json!({"a": 1}))).is_err());
    }

    #[test]
    fn test_decode_id() {
        assert_eq!(decode_id(MetaKey::Author, Some(json!(3))).unwrap(), Some(3));
        assert_eq!(decode_id(MetaKey::Author, Some(json!("3"))).unwrap(), Some(3));
        assert_eq!(decode_id(MetaKey::Author, Some(json!(0))).unwrap(), None);
        assert_eq!(decode_id(MetaKey::Author, None).unwrap(), None);
        assert!(decode_id(MetaKey::Author, Some(json!("three"))).is_err());
    }

    #[test]
    fn test_default_fields() {
        let fields = SyncJobFields::default();
        assert_eq!(fields.author_id, DEFAULT_AUTHOR_ID);
        assert!(fields.composite_id.is_none());
        assert!(fields.post_types.is_empty());
        assert!(fields.terms.is_empty());
    }
}
