use crate::error::SymlinkError;
use crate::SEPARATOR;
use std::io;
use std::path::{Path, PathBuf};

/// The symlink argument as given on the command line, with a leading `./` and a
/// single trailing separator removed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SymlinkSpec(String);

impl SymlinkSpec {
    pub fn parse(raw: &str) -> Result<Self, SymlinkError> {
        let mut normalized = raw.strip_prefix("./").unwrap_or(raw);
        if let Some(stripped) = normalized.strip_suffix(SEPARATOR) {
            normalized = stripped;
        }
        if normalized.is_empty() {
            return Err(SymlinkError::Empty {
                raw: raw.to_owned(),
            });
        }
        Ok(Self(normalized.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_absolute(&self) -> bool {
        self.0.starts_with(SEPARATOR)
    }

    /// Absolute form of the link. Relative specs are joined onto `cwd`.
    pub fn absolute_path(&self, cwd: &str) -> String {
        if self.is_absolute() {
            self.0.clone()
        } else {
            format!("{}{SEPARATOR}{}", cwd.trim_end_matches(SEPARATOR), self.0)
        }
    }
}

/// A symlink together with the single-hop target it points at.
///
/// `target` is the literal string stored in the link; it is matched byte for
/// byte against record paths and never normalized.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedSymlink {
    symlink: String,
    absolute_path: String,
    target: String,
}

impl ResolvedSymlink {
    /// Resolve `raw` relative to the process's current working directory.
    ///
    /// The working directory is only looked up when `raw` is relative.
    pub fn resolve(raw: &str) -> Result<Self, SymlinkError> {
        Self::resolve_inner(raw, std::env::current_dir)
    }

    /// Like [`ResolvedSymlink::resolve`], but joins relative arguments onto `cwd`.
    pub fn resolve_with_cwd(raw: &str, cwd: &Path) -> Result<Self, SymlinkError> {
        Self::resolve_inner(raw, || Ok(cwd.to_path_buf()))
    }

    pub fn from_parts(
        symlink: impl Into<String>,
        absolute_path: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            symlink: symlink.into(),
            absolute_path: absolute_path.into(),
            target: target.into(),
        }
    }

    fn resolve_inner(
        raw: &str,
        cwd: impl FnOnce() -> io::Result<PathBuf>,
    ) -> Result<Self, SymlinkError> {
        let spec = SymlinkSpec::parse(raw)?;

        let absolute_path = if spec.is_absolute() {
            spec.as_str().to_owned()
        } else {
            let cwd = cwd().map_err(|source| SymlinkError::CwdUnavailable { source })?;
            let cwd = cwd
                .into_os_string()
                .into_string()
                .map_err(|_| SymlinkError::CwdUnavailable {
                    source: io::Error::other("current directory is not valid UTF-8"),
                })?;
            spec.absolute_path(&cwd)
        };

        let target = std::fs::read_link(&absolute_path).map_err(|source| {
            SymlinkError::NotASymlink {
                path: absolute_path.clone(),
                source,
            }
        })?;
        let target = target
            .into_os_string()
            .into_string()
            .map_err(|_| SymlinkError::NonUtf8Target {
                path: absolute_path.clone(),
            })?;

        tracing::debug!(
            target: "compdb_relink.symlink",
            symlink = spec.as_str(),
            absolute_path = %absolute_path,
            link_target = %target,
            "resolved symlink"
        );
        if !target.starts_with(SEPARATOR) {
            tracing::warn!(
                target: "compdb_relink.symlink",
                path = %absolute_path,
                link_target = %target,
                "symlink target is relative; absolute record paths will not match it"
            );
        }

        Ok(Self {
            symlink: spec.0,
            absolute_path,
            target,
        })
    }

    /// Normalized symlink argument.
    pub fn symlink(&self) -> &str {
        &self.symlink
    }

    pub fn absolute_path(&self) -> &str {
        &self.absolute_path
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_strips_leading_dot_slash_and_trailing_separator() {
        assert_eq!(SymlinkSpec::parse("./build/").unwrap().as_str(), "build");
        assert_eq!(SymlinkSpec::parse("./build").unwrap().as_str(), "build");
        assert_eq!(SymlinkSpec::parse("build/").unwrap().as_str(), "build");
        assert_eq!(
            SymlinkSpec::parse("/proj/current/").unwrap().as_str(),
            "/proj/current"
        );
    }

    #[test]
    fn parse_only_strips_one_trailing_separator() {
        assert_eq!(SymlinkSpec::parse("build//").unwrap().as_str(), "build/");
    }

    #[test]
    fn parse_keeps_inner_dot_segments() {
        assert_eq!(
            SymlinkSpec::parse("../out/build").unwrap().as_str(),
            "../out/build"
        );
    }

    #[test]
    fn parse_rejects_empty() {
        assert!(matches!(
            SymlinkSpec::parse("./"),
            Err(SymlinkError::Empty { .. })
        ));
        assert!(matches!(
            SymlinkSpec::parse(""),
            Err(SymlinkError::Empty { .. })
        ));
    }

    #[test]
    fn absolute_path_joins_relative_spec_onto_cwd() {
        let spec = SymlinkSpec::parse("./build").unwrap();
        assert_eq!(spec.absolute_path("/home/u/proj"), "/home/u/proj/build");
        assert_eq!(spec.absolute_path("/"), "/build");

        let spec = SymlinkSpec::parse("/proj/current").unwrap();
        assert_eq!(spec.absolute_path("/home/u/proj"), "/proj/current");
    }

    #[test]
    fn resolve_reports_unavailable_cwd_for_relative_link() {
        let err = ResolvedSymlink::resolve_inner("build", || Err(io::Error::other("gone")))
            .unwrap_err();
        assert!(matches!(err, SymlinkError::CwdUnavailable { .. }), "{err:?}");
    }

    #[test]
    fn resolve_does_not_look_up_cwd_for_absolute_link() {
        let tmp = tempfile::tempdir().unwrap();
        let link = tmp.path().join("build");
        std::os::unix::fs::symlink(tmp.path(), &link).unwrap();

        let resolved = ResolvedSymlink::resolve_inner(link.to_str().unwrap(), || {
            panic!("cwd must not be consulted for an absolute link")
        })
        .unwrap();
        assert_eq!(resolved.absolute_path(), link.to_str().unwrap());
        assert_eq!(resolved.target(), tmp.path().to_str().unwrap());
    }

    #[test]
    fn resolve_rejects_non_utf8_link_target() {
        use std::os::unix::ffi::OsStrExt;

        let tmp = tempfile::tempdir().unwrap();
        let target = std::ffi::OsStr::from_bytes(b"/tmp/\xff");
        std::os::unix::fs::symlink(target, tmp.path().join("build")).unwrap();

        let err = ResolvedSymlink::resolve_with_cwd("./build", tmp.path()).unwrap_err();
        assert!(matches!(err, SymlinkError::NonUtf8Target { .. }), "{err:?}");
    }

    #[test]
    fn resolve_reports_missing_link() {
        let tmp = tempfile::tempdir().unwrap();
        let err = ResolvedSymlink::resolve_with_cwd("./missing", tmp.path()).unwrap_err();
        assert!(matches!(err, SymlinkError::NotASymlink { .. }), "{err:?}");
    }
}
