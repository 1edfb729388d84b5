use serde::Serialize;

/// Why a record's `file` was left untouched.
///
/// None of these abort a run; they are collected into a [`RewriteReport`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    #[error("record is not a JSON object")]
    NotAnObject,

    #[error("record has no string `{field}` field")]
    MissingField { field: &'static str },

    #[error("{path} does not start with symlink target {target}")]
    NoMatch { path: String, target: String },

    #[error("{path} starts with symlink target {target} but not at a path component boundary")]
    PartialComponent { path: String, target: String },

    #[error("failed to canonicalize {path}: {message}")]
    Canonicalize { path: String, message: String },
}

/// Which matching strategy produced a rewrite.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// `file` already started with the symlink target.
    Prefix,
    /// `directory` + `file` was canonicalized first.
    Canonical,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SkippedRecord {
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub reason: SkipReason,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RewriteReport {
    pub records: usize,
    pub rewritten_prefix: usize,
    pub rewritten_canonical: usize,
    pub directories_rewritten: usize,
    pub skipped: Vec<SkippedRecord>,
}

impl RewriteReport {
    pub(crate) fn record_rewrite(&mut self, strategy: Strategy) {
        match strategy {
            Strategy::Prefix => self.rewritten_prefix += 1,
            Strategy::Canonical => self.rewritten_canonical += 1,
        }
    }

    /// Number of records whose `file` was rewritten, by either strategy.
    pub fn rewritten(&self) -> usize {
        self.rewritten_prefix + self.rewritten_canonical
    }

    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}
