use std::io;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, RelinkError>;

/// Errors produced while turning the user-supplied symlink argument into a
/// [`crate::ResolvedSymlink`].
#[derive(Debug, thiserror::Error)]
pub enum SymlinkError {
    #[error("symlink path {raw:?} is empty after normalization")]
    Empty { raw: String },

    #[error("failed to determine current working directory")]
    CwdUnavailable {
        #[source]
        source: io::Error,
    },

    #[error("{path} is not a readable symbolic link")]
    NotASymlink {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("target of symbolic link {path} is not valid UTF-8")]
    NonUtf8Target { path: String },
}

/// Fatal errors. Any of these aborts the run before the output file is touched.
#[derive(Debug, thiserror::Error)]
pub enum RelinkError {
    #[error("could not open compilation database {path}")]
    ReadInput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse compilation database {path}")]
    ParseInput {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("compilation database {path} is not a JSON array")]
    NotAnArray { path: PathBuf },

    #[error("failed to serialize compilation database")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to write compilation database {path}")]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Symlink(#[from] SymlinkError),
}
