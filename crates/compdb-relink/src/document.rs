use crate::error::{RelinkError, Result};
use crate::report::RewriteReport;
use crate::rewrite::{rewrite_records, RewriteOptions};
use crate::symlink::ResolvedSymlink;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use std::path::Path;

/// A `compile_commands.json` document.
///
/// Records are kept as raw JSON so fields other than `file` and `directory`
/// pass through untouched, in their original key order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompilationDatabase {
    records: Vec<Value>,
}

impl CompilationDatabase {
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|source| RelinkError::ReadInput {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&bytes, path)
    }

    /// Parse `bytes`; `origin` is only used in error messages.
    pub fn parse(bytes: &[u8], origin: &Path) -> Result<Self> {
        let value: Value =
            serde_json::from_slice(bytes).map_err(|source| RelinkError::ParseInput {
                path: origin.to_path_buf(),
                source,
            })?;
        match value {
            Value::Array(records) => Ok(Self { records }),
            _ => Err(RelinkError::NotAnArray {
                path: origin.to_path_buf(),
            }),
        }
    }

    pub fn records(&self) -> &[Value] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rewrite every record through `symlink`. See [`crate::rewrite`].
    pub fn rewrite(&mut self, symlink: &ResolvedSymlink, options: &RewriteOptions) -> RewriteReport {
        rewrite_records(&mut self.records, symlink, options)
    }

    /// Pretty-printed JSON with 4-space indentation and a trailing newline.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let mut ser =
            serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
        self.records
            .serialize(&mut ser)
            .map_err(RelinkError::Serialize)?;
        out.push(b'\n');
        Ok(out)
    }

    /// Serialize and atomically replace `path`.
    pub fn write(&self, path: &Path) -> Result<()> {
        let bytes = self.to_json_bytes()?;
        crate::fs::atomic_write(path, &bytes).map_err(|source| RelinkError::WriteOutput {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_uses_four_space_indent_and_trailing_newline() {
        let db = CompilationDatabase::parse(
            br#"[{"directory":"/d","file":"a.cpp"}]"#,
            Path::new("compile_commands.json"),
        )
        .unwrap();

        let text = String::from_utf8(db.to_json_bytes().unwrap()).unwrap();
        assert_eq!(
            text,
            "[\n    {\n        \"directory\": \"/d\",\n        \"file\": \"a.cpp\"\n    }\n]\n"
        );
    }

    #[test]
    fn key_order_is_preserved() {
        let db = CompilationDatabase::parse(
            br#"[{"file":"a.cpp","command":"cc a.cpp","directory":"/d"}]"#,
            Path::new("compile_commands.json"),
        )
        .unwrap();

        let text = String::from_utf8(db.to_json_bytes().unwrap()).unwrap();
        let file = text.find("\"file\"").unwrap();
        let command = text.find("\"command\"").unwrap();
        let directory = text.find("\"directory\"").unwrap();
        assert!(file < command && command < directory, "{text}");
    }

    #[test]
    fn non_array_document_is_rejected() {
        let err = CompilationDatabase::parse(br#"{"file":"a.cpp"}"#, Path::new("db.json"))
            .unwrap_err();
        assert!(matches!(err, RelinkError::NotAnArray { .. }), "{err:?}");
    }

    #[test]
    fn malformed_document_is_rejected() {
        let err = CompilationDatabase::parse(b"[{", Path::new("db.json")).unwrap_err();
        assert!(matches!(err, RelinkError::ParseInput { .. }), "{err:?}");
    }

    #[test]
    fn empty_array_round_trips() {
        let db = CompilationDatabase::parse(b"[]", Path::new("db.json")).unwrap();
        assert!(db.is_empty());
        assert_eq!(db.to_json_bytes().unwrap(), b"[]\n");
    }
}
