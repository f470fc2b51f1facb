// Term Domain Model and grouping by taxonomy

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A taxonomy term attached to a job document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermRecord {
    pub term_id: i64,
    pub name: String,
    pub slug: String,
    pub taxonomy: String,
}

impl TermRecord {
    pub fn new(
        term_id: i64,
        name: impl Into<String>,
        slug: impl Into<String>,
        taxonomy: impl Into<String>,
    ) -> Self {
        Self {
            term_id,
            name: name.into(),
            slug: slug.into(),
            taxonomy: taxonomy.into(),
        }
    }
}

/// Terms keyed by taxonomy name, in first-seen taxonomy order
pub type TermGroups = IndexMap<String, Vec<TermRecord>>;

/// Group a flat term list by taxonomy
///
/// Single pass. Keeps first-seen taxonomy order and the insertion order of
/// terms within each taxonomy; duplicates are kept as-is.
pub fn group_terms<I>(terms: I) -> TermGroups
where
    I: IntoIterator<Item = TermRecord>,
{
    let mut groups = TermGroups::new();
    for term in terms {
        groups.entry(term.taxonomy.clone()).or_default().push(term);
    }
    groups
}
