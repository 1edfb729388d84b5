//! Matching record paths against a symlink target and rewriting them to go
//! through the symlink instead.
//!
//! Two strategies are tried, cheapest first:
//! - [`rewrite_prefixed`]: the path already starts with the target.
//! - [`rewrite_canonicalized`]: relative paths only. `directory/file` is
//!   canonicalized and the result is matched against the target.

use crate::report::{RewriteReport, SkipReason, SkippedRecord, Strategy};
use crate::symlink::ResolvedSymlink;
use crate::SEPARATOR;
use serde_json::Value;

/// Behavior switches for [`rewrite_records`].
#[derive(Clone, Debug, Default)]
pub struct RewriteOptions {
    /// Also rewrite `directory` fields that live under the symlink target.
    pub rewrite_directory: bool,
}

/// Replace the `symlink.target()` prefix of `path` with `symlink.absolute_path()`.
///
/// The prefix must end on a path component boundary, so a target of
/// `/proj/build` never matches `/proj/builds2/a.cpp`.
pub fn rewrite_prefixed(path: &str, symlink: &ResolvedSymlink) -> Result<String, SkipReason> {
    let target = symlink.target();
    let Some(rest) = path.strip_prefix(target) else {
        return Err(SkipReason::NoMatch {
            path: path.to_owned(),
            target: target.to_owned(),
        });
    };

    if rest.is_empty() || rest.starts_with(SEPARATOR) {
        Ok(format!("{}{rest}", symlink.absolute_path()))
    } else if target.ends_with(SEPARATOR) {
        // `target` carried its own trailing separator, which `absolute_path` never does.
        Ok(format!("{}{SEPARATOR}{rest}", symlink.absolute_path()))
    } else {
        Err(SkipReason::PartialComponent {
            path: path.to_owned(),
            target: target.to_owned(),
        })
    }
}

/// Canonicalize `directory/file` and rewrite the result with [`rewrite_prefixed`].
pub fn rewrite_canonicalized(
    directory: &str,
    file: &str,
    symlink: &ResolvedSymlink,
) -> Result<String, SkipReason> {
    let joined = format!("{directory}{SEPARATOR}{file}");
    let canonical = std::fs::canonicalize(&joined).map_err(|err| SkipReason::Canonicalize {
        path: joined.clone(),
        message: err.to_string(),
    })?;
    let canonical = canonical
        .into_os_string()
        .into_string()
        .map_err(|_| SkipReason::Canonicalize {
            path: joined.clone(),
            message: "canonical path is not valid UTF-8".to_owned(),
        })?;

    tracing::trace!(
        target: "compdb_relink.rewrite",
        path = %joined,
        canonical = %canonical,
        "canonicalized relative record path"
    );
    rewrite_prefixed(&canonical, symlink)
}

/// Pick the strategy for a single `file` value.
pub fn rewrite_file(
    file: &str,
    directory: Option<&str>,
    symlink: &ResolvedSymlink,
) -> Result<(String, Strategy), SkipReason> {
    match rewrite_prefixed(file, symlink) {
        Ok(rewritten) => Ok((rewritten, Strategy::Prefix)),
        Err(reason) if file.starts_with(SEPARATOR) => Err(reason),
        Err(_) => {
            let Some(directory) = directory else {
                return Err(SkipReason::MissingField { field: "directory" });
            };
            rewrite_canonicalized(directory, file, symlink)
                .map(|rewritten| (rewritten, Strategy::Canonical))
        }
    }
}

/// Rewrite one record in place.
///
/// Returns the strategy that rewrote `file`, or why it was left alone. The
/// `directory` field, when enabled, is only rewritten for records whose `file`
/// was rewritten; skipped records stay exactly as they were.
pub fn rewrite_record(
    record: &mut Value,
    symlink: &ResolvedSymlink,
    options: &RewriteOptions,
) -> (Result<Strategy, SkipReason>, bool) {
    let Some(object) = record.as_object_mut() else {
        return (Err(SkipReason::NotAnObject), false);
    };

    let directory = object
        .get("directory")
        .and_then(Value::as_str)
        .map(str::to_owned);

    let outcome = match object.get("file").and_then(Value::as_str) {
        None => Err(SkipReason::MissingField { field: "file" }),
        Some(file) => rewrite_file(file, directory.as_deref(), symlink),
    };
    let outcome = outcome.map(|(rewritten, strategy)| {
        object.insert("file".to_owned(), Value::String(rewritten));
        strategy
    });

    let mut directory_rewritten = false;
    if options.rewrite_directory && outcome.is_ok() {
        if let Some(directory) = directory {
            match rewrite_prefixed(&directory, symlink) {
                Ok(rewritten) => {
                    object.insert("directory".to_owned(), Value::String(rewritten));
                    directory_rewritten = true;
                }
                Err(reason) => {
                    tracing::debug!(
                        target: "compdb_relink.rewrite",
                        %reason,
                        "directory left unchanged"
                    );
                }
            }
        }
    }

    (outcome, directory_rewritten)
}

/// Rewrite every record, in order, and summarize what happened.
///
/// Never fails: records that cannot be rewritten are left as they are and
/// listed in [`RewriteReport::skipped`].
pub fn rewrite_records(
    records: &mut [Value],
    symlink: &ResolvedSymlink,
    options: &RewriteOptions,
) -> RewriteReport {
    let mut report = RewriteReport {
        records: records.len(),
        ..RewriteReport::default()
    };

    for (index, record) in records.iter_mut().enumerate() {
        let (outcome, directory_rewritten) = rewrite_record(record, symlink, options);
        if directory_rewritten {
            report.directories_rewritten += 1;
        }
        match outcome {
            Ok(strategy) => report.record_rewrite(strategy),
            Err(reason) => {
                let file = record
                    .get("file")
                    .and_then(Value::as_str)
                    .map(str::to_owned);
                tracing::warn!(
                    target: "compdb_relink.rewrite",
                    index,
                    file = file.as_deref().unwrap_or("<none>"),
                    %reason,
                    "record left unchanged"
                );
                report.skipped.push(SkippedRecord {
                    index,
                    file,
                    reason,
                });
            }
        }
    }

    report
}
